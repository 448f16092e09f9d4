//! Stroke rendering attributes.
//!
//! Decides whether a shape needs advanced (vector-path) rendering or can be
//! drawn as a simple bordered box, and derives the attributes for each path.
//! Triangle caps have no native path primitive; they are synthesized as a
//! filled polygon extending past the endpoint.

use glam::DVec2;

use crate::shape::{Cap, Join, Shape};

/// Cap primitives a vector-path renderer understands natively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathCap {
    Butt,
    Round,
    Square,
}

/// Join primitives for a vector-path renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathJoin {
    Miter,
    Bevel,
    Round,
}

/// Resolved stroke attributes for the advanced rendering path.
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeAttrs {
    pub start_cap: PathCap,
    pub end_cap: PathCap,
    pub dash_cap: PathCap,
    pub join: PathJoin,
    /// Carried only when the join is miter.
    pub miter_limit: Option<f64>,
    /// Dash array scaled by the stroke width.
    pub dashes: Option<Vec<f64>>,
    /// Dash offset scaled by the stroke width.
    pub dash_offset: f64,
    /// The start/end cap must be synthesized as a filled triangle polygon.
    pub synthetic_start_cap: bool,
    pub synthetic_end_cap: bool,
}

/// Border style for the simple (non-vector) rendering path. Dash arrays
/// collapse to a binary dotted/dashed choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorderStyle {
    Solid,
    Dashed,
    Dotted,
}

/// Uniform border for the simple rendering path.
#[derive(Debug, Clone, PartialEq)]
pub struct SimpleBorder {
    pub width: i32,
    pub color: String,
    pub style: BorderStyle,
}

/// A synthesized triangle-cap path: a closed polygon filled with the stroke
/// color, drawn with the normal stroke disabled.
#[derive(Debug, Clone, PartialEq)]
pub struct TriangleCapPath {
    pub points: Vec<DVec2>,
    pub fill: String,
}

/// True when the stroke exceeds what a simple bordered box can express.
pub fn needs_advanced_rendering(shape: &Shape) -> bool {
    shape.stroke_start_cap == Cap::Triangle
        || shape.stroke_end_cap == Cap::Triangle
        || shape.stroke_start_cap != Cap::Flat
        || shape.stroke_end_cap != Cap::Flat
        || shape.stroke_dash_cap != Cap::Flat
        || shape.stroke_dashes.as_ref().is_some_and(|d| d.len() > 2)
        || shape.stroke_line_join != Join::Miter
        || shape.stroke_miter_limit != 10.0
        || shape.stroke_dash_offset != 0.0
}

/// Derive vector-path stroke attributes for a shape.
pub fn build_attributes(shape: &Shape) -> StrokeAttrs {
    let scale = f64::from(shape.stroke_width);
    let (join, miter_limit) = match shape.stroke_line_join {
        Join::Round => (PathJoin::Round, None),
        Join::Bevel => (PathJoin::Bevel, None),
        Join::Miter => (PathJoin::Miter, Some(shape.stroke_miter_limit)),
    };
    StrokeAttrs {
        start_cap: cap_primitive(shape.stroke_start_cap),
        end_cap: cap_primitive(shape.stroke_end_cap),
        dash_cap: cap_primitive(shape.stroke_dash_cap),
        join,
        miter_limit,
        dashes: shape
            .stroke_dashes
            .as_ref()
            .map(|d| d.iter().map(|v| v * scale).collect()),
        dash_offset: shape.stroke_dash_offset * scale,
        synthetic_start_cap: shape.stroke_start_cap == Cap::Triangle,
        synthetic_end_cap: shape.stroke_end_cap == Cap::Triangle,
    }
}

/// Map an authored cap to the native primitive. Triangle has none; it falls
/// back to butt and is synthesized separately.
fn cap_primitive(cap: Cap) -> PathCap {
    match cap {
        Cap::Round => PathCap::Round,
        Cap::Square => PathCap::Square,
        Cap::Triangle | Cap::Flat => PathCap::Butt,
    }
}

/// Synthesize the filled polygon for a line with one or two triangle caps.
///
/// The path is extended by the stroke width beyond each triangle-capped
/// endpoint; the resulting polygon is filled with the stroke color instead
/// of stroked. Returns `None` for a zero-length line or when neither cap is
/// a triangle.
pub fn triangle_cap_path(start: DVec2, end: DVec2, shape: &Shape) -> Option<TriangleCapPath> {
    let start_triangle = shape.stroke_start_cap == Cap::Triangle;
    let end_triangle = shape.stroke_end_cap == Cap::Triangle;
    if !start_triangle && !end_triangle {
        return None;
    }
    let delta = end - start;
    if delta.length_squared() == 0.0 {
        return None;
    }
    let dir = delta.normalize();
    let perp = DVec2::new(-dir.y, dir.x);
    let sw = f64::from(shape.stroke_width);
    let half = perp * (sw / 2.0);

    let mut points = Vec::with_capacity(6);
    points.push(start + half);
    if start_triangle {
        points.push(start - dir * sw);
    }
    points.push(start - half);
    points.push(end - half);
    if end_triangle {
        points.push(end + dir * sw);
    }
    points.push(end + half);

    Some(TriangleCapPath {
        points,
        fill: shape.stroke_color.clone(),
    })
}

/// Collapse a stroke into a uniform border for the simple rendering path.
/// Dotted iff the dash array is exactly two equal values, each at most 2.
pub fn simple_border(shape: &Shape) -> SimpleBorder {
    let style = match shape.stroke_dashes.as_deref() {
        None | Some([]) => BorderStyle::Solid,
        Some([a, b]) if a == b && *a <= 2.0 => BorderStyle::Dotted,
        Some(_) => BorderStyle::Dashed,
    };
    SimpleBorder {
        width: shape.stroke_width,
        color: shape.stroke_color.clone(),
        style,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_stroke_is_simple() {
        let shape = Shape::default();
        assert!(!needs_advanced_rendering(&shape));
    }

    #[test]
    fn triggers_for_advanced_rendering() {
        let mut s = Shape::default();
        s.stroke_start_cap = Cap::Triangle;
        assert!(needs_advanced_rendering(&s));

        let mut s = Shape::default();
        s.stroke_end_cap = Cap::Round;
        assert!(needs_advanced_rendering(&s));

        let mut s = Shape::default();
        s.stroke_dash_cap = Cap::Square;
        assert!(needs_advanced_rendering(&s));

        let mut s = Shape::default();
        s.stroke_dashes = Some(vec![1.0, 2.0, 3.0]);
        assert!(needs_advanced_rendering(&s));

        let mut s = Shape::default();
        s.stroke_line_join = Join::Bevel;
        assert!(needs_advanced_rendering(&s));

        let mut s = Shape::default();
        s.stroke_miter_limit = 4.0;
        assert!(needs_advanced_rendering(&s));

        let mut s = Shape::default();
        s.stroke_dash_offset = 1.5;
        assert!(needs_advanced_rendering(&s));
    }

    #[test]
    fn two_entry_dash_array_stays_simple() {
        let mut s = Shape::default();
        s.stroke_dashes = Some(vec![4.0, 2.0]);
        assert!(!needs_advanced_rendering(&s));
    }

    #[test]
    fn dashes_and_offset_scale_with_stroke_width() {
        let mut s = Shape::default();
        s.stroke_width = 3;
        s.stroke_dashes = Some(vec![1.0, 2.0]);
        s.stroke_dash_offset = 0.5;
        let attrs = build_attributes(&s);
        assert_eq!(attrs.dashes, Some(vec![3.0, 6.0]));
        assert_eq!(attrs.dash_offset, 1.5);
    }

    #[test]
    fn miter_limit_is_carried_only_for_miter_joins() {
        let mut s = Shape::default();
        s.stroke_miter_limit = 7.0;
        let attrs = build_attributes(&s);
        assert_eq!(attrs.join, PathJoin::Miter);
        assert_eq!(attrs.miter_limit, Some(7.0));

        s.stroke_line_join = Join::Round;
        let attrs = build_attributes(&s);
        assert_eq!(attrs.join, PathJoin::Round);
        assert_eq!(attrs.miter_limit, None);
    }

    #[test]
    fn triangle_caps_map_to_butt_with_synthesis_flags() {
        let mut s = Shape::default();
        s.stroke_start_cap = Cap::Triangle;
        s.stroke_end_cap = Cap::Square;
        let attrs = build_attributes(&s);
        assert_eq!(attrs.start_cap, PathCap::Butt);
        assert_eq!(attrs.end_cap, PathCap::Square);
        assert!(attrs.synthetic_start_cap);
        assert!(!attrs.synthetic_end_cap);
    }

    #[test]
    fn triangle_polygon_extends_by_stroke_width() {
        let mut s = Shape::default();
        s.stroke_width = 2;
        s.stroke_start_cap = Cap::Triangle;
        s.stroke_end_cap = Cap::Triangle;
        s.stroke_color = "#112233".into();

        // Horizontal line from (0,0) to (10,0); perpendicular is (0,1).
        let path = triangle_cap_path(DVec2::ZERO, DVec2::new(10.0, 0.0), &s).unwrap();
        assert_eq!(path.fill, "#112233");
        assert_eq!(
            path.points,
            vec![
                DVec2::new(0.0, 1.0),
                DVec2::new(-2.0, 0.0),
                DVec2::new(0.0, -1.0),
                DVec2::new(10.0, -1.0),
                DVec2::new(12.0, 0.0),
                DVec2::new(10.0, 1.0),
            ]
        );
    }

    #[test]
    fn triangle_path_absent_without_triangle_caps() {
        let s = Shape::default();
        assert!(triangle_cap_path(DVec2::ZERO, DVec2::new(1.0, 0.0), &s).is_none());
    }

    #[test]
    fn simple_border_collapses_dash_arrays() {
        let mut s = Shape::default();
        assert_eq!(simple_border(&s).style, BorderStyle::Solid);

        s.stroke_dashes = Some(vec![2.0, 2.0]);
        assert_eq!(simple_border(&s).style, BorderStyle::Dotted);

        s.stroke_dashes = Some(vec![4.0, 2.0]);
        assert_eq!(simple_border(&s).style, BorderStyle::Dashed);

        s.stroke_dashes = Some(vec![3.0, 3.0]);
        assert_eq!(simple_border(&s).style, BorderStyle::Dashed);
    }
}
