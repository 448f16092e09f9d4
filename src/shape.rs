//! Shape model and the shape-definition compiler.
//!
//! A shape element (`element=shape`) owns an ordered list of definitions
//! under `shape`, `shape0`, `shape1`, ... Each definition is extend-resolved,
//! parsed through the pest grammar into clauses, and lowered into a typed
//! [`Shape`]. A malformed definition drops that shape only; the element
//! continues with its remaining shapes.

use pest::Parser;

use crate::diag::{Diagnostics, Warning};
use crate::document::{ConfigDocument, Section};
use crate::extend;
use crate::log::debug;
use crate::stroke;
use crate::transform::TransformSet;
use crate::{Rule, SkinParser};

/// Stroke cap words the DSL accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cap {
    #[default]
    Flat,
    Round,
    Square,
    Triangle,
}

impl Cap {
    fn parse(word: &str) -> Option<Cap> {
        match word.trim().to_lowercase().as_str() {
            "flat" => Some(Cap::Flat),
            "round" => Some(Cap::Round),
            "square" => Some(Cap::Square),
            "triangle" => Some(Cap::Triangle),
            _ => None,
        }
    }
}

/// Stroke line-join words the DSL accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Join {
    #[default]
    Miter,
    Bevel,
    Round,
}

impl Join {
    fn parse(word: &str) -> Option<Join> {
        match word.trim().to_lowercase().as_str() {
            "miter" => Some(Join::Miter),
            "bevel" => Some(Join::Bevel),
            "round" => Some(Join::Round),
            _ => None,
        }
    }
}

/// Axis-aligned rectangle in element coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

/// One fully parsed shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    pub radius: f64,
    pub fill_color: String,
    pub stroke_color: String,
    pub stroke_width: i32,
    pub stroke_start_cap: Cap,
    pub stroke_end_cap: Cap,
    pub stroke_dash_cap: Cap,
    pub stroke_dashes: Option<Vec<f64>>,
    pub stroke_line_join: Join,
    pub stroke_miter_limit: f64,
    pub stroke_dash_offset: f64,
    pub transforms: TransformSet,
}

impl Default for Shape {
    fn default() -> Self {
        Shape {
            x: 0.0,
            y: 0.0,
            w: 0.0,
            h: 0.0,
            radius: 0.0,
            fill_color: "#FFFFFF".to_string(),
            stroke_color: "#000000".to_string(),
            stroke_width: 1,
            stroke_start_cap: Cap::Flat,
            stroke_end_cap: Cap::Flat,
            stroke_dash_cap: Cap::Flat,
            stroke_dashes: None,
            stroke_line_join: Join::Miter,
            stroke_miter_limit: 10.0,
            stroke_dash_offset: 0.0,
            transforms: TransformSet::default(),
        }
    }
}

impl Shape {
    /// The shape's own axis-aligned box, ignoring transforms.
    pub fn rect(&self) -> Rect {
        Rect {
            x: self.x,
            y: self.y,
            w: self.w,
            h: self.h,
        }
    }
}

/// Compiled shape list of one element.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeElement {
    pub shapes: Vec<Shape>,
    /// Union of the constituent shapes' axis-aligned boxes.
    pub bounds: Rect,
    /// True when any shape's stroke exceeds simple-border rendering.
    pub requires_svg: bool,
}

/// One parsed clause: a keyword and its comma-separated arguments.
struct Clause {
    keyword: String,
    args: Vec<String>,
}

impl Clause {
    fn text(&self) -> String {
        if self.args.is_empty() {
            self.keyword.clone()
        } else {
            format!("{} {}", self.keyword, self.args.join(","))
        }
    }
}

/// Compile every `element=shape` section in the document. Elements whose
/// shape list comes up empty are dropped entirely.
pub fn compile_document(doc: &mut ConfigDocument, diags: &mut Diagnostics) {
    let names: Vec<String> = doc.sections.keys().cloned().collect();
    let mut dropped = Vec::new();
    for name in names {
        let Some(section) = doc.sections.get_mut(&name) else {
            continue;
        };
        let is_shape = section
            .get("element")
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("shape"));
        if !is_shape {
            continue;
        }
        if !compile_element(&name, section, diags) {
            dropped.push(name);
        }
    }
    for name in dropped {
        doc.remove_section(&name);
    }
}

/// Compile one shape element in place. Returns false when the element should
/// be dropped from the document.
pub fn compile_element(name: &str, section: &mut Section, diags: &mut Diagnostics) -> bool {
    let mut keyed: Vec<(u64, String)> = section
        .keys()
        .filter(|k| extend::is_shape_key(k))
        .map(|k| (shape_index(k), k.to_string()))
        .collect();
    keyed.sort_by_key(|(index, _)| *index);

    let defs: Vec<String> = keyed
        .iter()
        .filter_map(|(_, key)| section.get(key).map(str::to_string))
        .collect();

    let mut shapes = Vec::new();
    for def in &defs {
        if let Some(shape) = parse_shape(def, section, name, diags) {
            shapes.push(shape);
        }
    }
    if shapes.is_empty() {
        diags.warn(Warning::EmptyShapeElement {
            section: name.to_string(),
        });
        return false;
    }
    debug!("[{name}] compiled {} shape(s)", shapes.len());

    // Referenced extend donors are deleted from this element's own property
    // set only; collect them before mutating anything.
    let extend_refs = extend::collect_extend_references(section);

    // Legacy single-shape properties mirror the first shape.
    let first = shapes[0].clone();
    set_geometry(section, first.rect());
    section.set("radius", fmt_num(first.radius));
    section.set("fillcolor", first.fill_color.clone());
    section.set("strokecolor", first.stroke_color.clone());
    section.set("strokewidth", first.stroke_width.to_string());

    let bounds = if shapes.len() > 1 {
        let union = union_rect(&shapes);
        set_geometry(section, union);
        union
    } else {
        first.rect()
    };

    let requires_svg = shapes.iter().any(stroke::needs_advanced_rendering);

    for key in extend_refs {
        section.remove(&key);
    }

    section.shapes = Some(ShapeElement {
        shapes,
        bounds,
        requires_svg,
    });
    true
}

/// Parse one shape-definition string against its owning section.
pub fn parse_shape(
    def: &str,
    owner: &Section,
    owner_name: &str,
    diags: &mut Diagnostics,
) -> Option<Shape> {
    let resolved = extend::resolve(def, owner, owner_name, diags);
    let clauses = match split_clauses(&resolved) {
        Ok(clauses) => clauses,
        Err(detail) => {
            diags.warn(Warning::MalformedShapeDefinition {
                section: owner_name.to_string(),
                detail,
            });
            return None;
        }
    };

    let mut iter = clauses.into_iter();
    let Some(head) = iter.next() else {
        diags.warn(Warning::MalformedShapeDefinition {
            section: owner_name.to_string(),
            detail: "empty shape definition".to_string(),
        });
        return None;
    };

    let mut shape = Shape::default();
    if let Err(detail) = apply_head(&mut shape, &head) {
        diags.warn(Warning::MalformedShapeDefinition {
            section: owner_name.to_string(),
            detail,
        });
        return None;
    }
    for clause in iter {
        apply_style_clause(&mut shape, &clause, owner_name, diags);
    }

    shape.w = shape.w.max(0.0);
    shape.h = shape.h.max(0.0);
    shape.radius = shape.radius.clamp(0.0, shape.w.min(shape.h) / 2.0);
    Some(shape)
}

/// First clause: `<type> <x>,<y>,<w>,<h>[,<radius>]`. Only rectangles are
/// supported; missing trailing coordinates default to 0.
fn apply_head(shape: &mut Shape, head: &Clause) -> Result<(), String> {
    if !head.keyword.eq_ignore_ascii_case("rectangle") {
        return Err(format!("unsupported shape type: {}", head.keyword));
    }
    let mut coords = head.args.clone();
    while coords.last().is_some_and(|c| c.trim().is_empty()) {
        coords.pop();
    }
    if coords.is_empty() {
        return Err("missing coordinate clause".to_string());
    }
    let mut values = [0.0f64; 5];
    for (slot, raw) in values.iter_mut().zip(&coords) {
        *slot = raw
            .trim()
            .parse::<f64>()
            .map_err(|_| format!("unparsable coordinate: {raw}"))?;
    }
    shape.x = values[0];
    shape.y = values[1];
    shape.w = values[2];
    shape.h = values[3];
    shape.radius = values[4];
    Ok(())
}

fn apply_style_clause(
    shape: &mut Shape,
    clause: &Clause,
    owner_name: &str,
    diags: &mut Diagnostics,
) {
    let unknown = |diags: &mut Diagnostics| {
        diags.warn(Warning::UnknownStyleToken {
            section: owner_name.to_string(),
            token: clause.text(),
        });
    };

    match clause.keyword.to_lowercase().as_str() {
        "fill" | "fillcolor" => match color_from_args(&clause.args) {
            Some(color) => shape.fill_color = color,
            None => unknown(diags),
        },
        "stroke" | "strokecolor" => match color_from_args(&clause.args) {
            Some(color) => shape.stroke_color = color,
            None => unknown(diags),
        },
        "strokewidth" => match first_arg(&clause.args).and_then(|a| a.parse::<i32>().ok()) {
            Some(width) => shape.stroke_width = width,
            None => unknown(diags),
        },
        "strokestartcap" => match first_arg(&clause.args).and_then(Cap::parse) {
            Some(cap) => shape.stroke_start_cap = cap,
            None => unknown(diags),
        },
        "strokeendcap" => match first_arg(&clause.args).and_then(Cap::parse) {
            Some(cap) => shape.stroke_end_cap = cap,
            None => unknown(diags),
        },
        "strokedashcap" => match first_arg(&clause.args).and_then(Cap::parse) {
            Some(cap) => shape.stroke_dash_cap = cap,
            None => unknown(diags),
        },
        "strokedashes" => {
            let dashes = crate::params::float_list(&clause.args);
            shape.stroke_dashes = if dashes.is_empty() { None } else { Some(dashes) };
        }
        "strokelinejoin" => match first_arg(&clause.args).and_then(Join::parse) {
            Some(join) => {
                shape.stroke_line_join = join;
                if let Some(limit) = clause.args.get(1).and_then(|a| a.trim().parse::<f64>().ok())
                {
                    shape.stroke_miter_limit = limit;
                }
            }
            None => unknown(diags),
        },
        "strokedashoffset" => {
            match first_arg(&clause.args).and_then(|a| a.parse::<f64>().ok()) {
                Some(offset) => shape.stroke_dash_offset = offset,
                None => unknown(diags),
            }
        }
        "rotate" => shape.transforms.apply_rotate(&clause.args),
        "scale" => shape.transforms.apply_scale(&clause.args),
        "skew" => shape.transforms.apply_skew(&clause.args),
        "offset" => shape.transforms.apply_offset(&clause.args),
        "transformorder" => shape.transforms.apply_order(&clause.args),
        _ => unknown(diags),
    }
}

fn first_arg(args: &[String]) -> Option<&str> {
    let first = args.first()?.trim();
    if first.is_empty() { None } else { Some(first) }
}

/// Colors come either as a single word/hex token or as `r,g,b[,a]` bytes.
fn color_from_args(args: &[String]) -> Option<String> {
    match args.len() {
        1 => first_arg(args).map(str::to_string),
        3 | 4 => {
            let mut bytes = [0u8; 4];
            for (slot, raw) in bytes.iter_mut().zip(args) {
                *slot = raw.trim().parse::<u8>().ok()?;
            }
            if args.len() == 4 {
                Some(format!(
                    "#{:02X}{:02X}{:02X}{:02X}",
                    bytes[0], bytes[1], bytes[2], bytes[3]
                ))
            } else {
                Some(format!("#{:02X}{:02X}{:02X}", bytes[0], bytes[1], bytes[2]))
            }
        }
        _ => None,
    }
}

/// Run the pest grammar and collect trimmed clauses.
fn split_clauses(input: &str) -> Result<Vec<Clause>, String> {
    let mut pairs = SkinParser::parse(Rule::shape_def, input)
        .map_err(|e| e.to_string())?;
    let def = pairs.next().ok_or_else(|| "empty shape definition".to_string())?;

    let mut clauses = Vec::new();
    for pair in def.into_inner() {
        if pair.as_rule() != Rule::clause {
            continue;
        }
        let mut keyword = String::new();
        let mut args = Vec::new();
        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::keyword => keyword = inner.as_str().to_string(),
                Rule::args => {
                    for arg in inner.into_inner() {
                        args.push(arg.as_str().trim().to_string());
                    }
                }
                _ => {}
            }
        }
        clauses.push(Clause { keyword, args });
    }
    Ok(clauses)
}

fn union_rect(shapes: &[Shape]) -> Rect {
    let x = shapes.iter().map(|s| s.x).fold(f64::INFINITY, f64::min);
    let y = shapes.iter().map(|s| s.y).fold(f64::INFINITY, f64::min);
    let right = shapes
        .iter()
        .map(|s| s.x + s.w)
        .fold(f64::NEG_INFINITY, f64::max);
    let bottom = shapes
        .iter()
        .map(|s| s.y + s.h)
        .fold(f64::NEG_INFINITY, f64::max);
    Rect {
        x,
        y,
        w: right - x,
        h: bottom - y,
    }
}

fn set_geometry(section: &mut Section, rect: Rect) {
    for (key, upper, value) in [
        ("x", "X", rect.x),
        ("y", "Y", rect.y),
        ("w", "W", rect.w),
        ("h", "H", rect.h),
    ] {
        section.set(key, fmt_num(value));
        section.set(upper, fmt_num(value));
    }
}

fn fmt_num(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// Numeric suffix of a shape key; bare `shape` and `shape0` both sort first.
fn shape_index(key: &str) -> u64 {
    key.strip_prefix("shape")
        .and_then(|s| if s.is_empty() { Some(0) } else { s.parse().ok() })
        .unwrap_or(0)
}
