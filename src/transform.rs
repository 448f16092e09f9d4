//! Transform set and composition.
//!
//! A shape carries up to four named transforms (rotate, scale, skew, offset)
//! plus an explicit order. Composition emits atomic ops in the resolved
//! order, skipping identity transforms entirely. A transform with an
//! explicit anchor is wrapped in `translate(anchor) .. translate(-anchor)`;
//! a transform without one is emitted bare, with no anchor translation at
//! all. The difference in emitted op count is load-bearing for downstream
//! composition and is preserved exactly.

use glam::DVec2;

use crate::params;

/// The four transform kinds, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformKind {
    Rotate,
    Scale,
    Skew,
    Offset,
}

impl TransformKind {
    pub const CANONICAL: [TransformKind; 4] = [
        TransformKind::Rotate,
        TransformKind::Scale,
        TransformKind::Skew,
        TransformKind::Offset,
    ];

    pub fn parse(name: &str) -> Option<TransformKind> {
        match name.trim().to_lowercase().as_str() {
            "rotate" => Some(TransformKind::Rotate),
            "scale" => Some(TransformKind::Scale),
            "skew" => Some(TransformKind::Skew),
            "offset" => Some(TransformKind::Offset),
            _ => None,
        }
    }
}

/// Optional per-axis anchor. `None` on an axis means "geometric center of
/// the element" but only once the transform is anchored at all.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Anchor {
    pub x: Option<f64>,
    pub y: Option<f64>,
}

impl Anchor {
    /// True when the author supplied at least one anchor coordinate.
    pub fn is_explicit(&self) -> bool {
        self.x.is_some() || self.y.is_some()
    }

    /// Resolve against the element size; unset axes default to the center.
    pub fn resolve(&self, width: f64, height: f64) -> DVec2 {
        DVec2::new(
            self.x.unwrap_or(width / 2.0),
            self.y.unwrap_or(height / 2.0),
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rotation {
    /// Angle in degrees.
    pub angle: f64,
    pub anchor: Anchor,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scaling {
    pub x: f64,
    pub y: f64,
    pub anchor: Anchor,
}

impl Default for Scaling {
    fn default() -> Self {
        Scaling {
            x: 1.0,
            y: 1.0,
            anchor: Anchor::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Skewing {
    pub x: f64,
    pub y: f64,
    pub anchor: Anchor,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Offsetting {
    pub x: f64,
    pub y: f64,
}

/// All transforms of one shape plus their application order. The order is
/// always a permutation of the four kinds.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformSet {
    pub rotate: Rotation,
    pub scale: Scaling,
    pub skew: Skewing,
    pub offset: Offsetting,
    pub order: Vec<TransformKind>,
}

impl Default for TransformSet {
    fn default() -> Self {
        TransformSet {
            rotate: Rotation::default(),
            scale: Scaling::default(),
            skew: Skewing::default(),
            offset: Offsetting::default(),
            order: TransformKind::CANONICAL.to_vec(),
        }
    }
}

impl TransformSet {
    /// `rotate <angle>[,anchorX[,anchorY]]`
    pub fn apply_rotate(&mut self, args: &[String]) {
        let n = params::numbers(args);
        self.rotate.angle = params::nth(&n, 0).unwrap_or(0.0);
        self.rotate.anchor.x = params::nth(&n, 1);
        self.rotate.anchor.y = params::nth(&n, 2);
    }

    /// `scale <sx>[,<sy>][,anchorX[,anchorY]]` — one value scales both axes.
    pub fn apply_scale(&mut self, args: &[String]) {
        let n = params::numbers(args);
        let sx = params::nth(&n, 0).unwrap_or(1.0);
        self.scale.x = sx;
        self.scale.y = if n.len() >= 2 {
            params::nth(&n, 1).unwrap_or(sx)
        } else {
            sx
        };
        self.scale.anchor.x = params::nth(&n, 2);
        self.scale.anchor.y = params::nth(&n, 3);
    }

    /// `skew <sx>[,<sy>][,anchorX[,anchorY]]`
    pub fn apply_skew(&mut self, args: &[String]) {
        let n = params::numbers(args);
        self.skew.x = params::nth(&n, 0).unwrap_or(0.0);
        self.skew.y = params::nth(&n, 1).unwrap_or(0.0);
        self.skew.anchor.x = params::nth(&n, 2);
        self.skew.anchor.y = params::nth(&n, 3);
    }

    /// `offset <dx>,<dy>`
    pub fn apply_offset(&mut self, args: &[String]) {
        let n = params::numbers(args);
        self.offset.x = params::nth(&n, 0).unwrap_or(0.0);
        self.offset.y = params::nth(&n, 1).unwrap_or(0.0);
    }

    /// `transformorder <name>,<name>,...` — unknown names are dropped,
    /// duplicates keep their first position, omitted kinds are appended in
    /// canonical order.
    pub fn apply_order(&mut self, args: &[String]) {
        let mut order: Vec<TransformKind> = Vec::with_capacity(4);
        for arg in args {
            if let Some(kind) = TransformKind::parse(arg) {
                if !order.contains(&kind) {
                    order.push(kind);
                }
            }
        }
        for kind in TransformKind::CANONICAL {
            if !order.contains(&kind) {
                order.push(kind);
            }
        }
        self.order = order;
    }
}

/// One atomic transform op, ready for a renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransformOp {
    Translate(DVec2),
    Rotate(f64),
    Scale(DVec2),
    Skew(DVec2),
}

/// Compose a transform set into an ordered op list for an element of the
/// given size.
pub fn compose(set: &TransformSet, width: f64, height: f64) -> Vec<TransformOp> {
    let mut ops = Vec::new();
    for kind in &set.order {
        match kind {
            TransformKind::Rotate => {
                if set.rotate.angle != 0.0 {
                    emit(
                        &mut ops,
                        TransformOp::Rotate(set.rotate.angle),
                        &set.rotate.anchor,
                        width,
                        height,
                    );
                }
            }
            TransformKind::Scale => {
                if set.scale.x != 1.0 || set.scale.y != 1.0 {
                    emit(
                        &mut ops,
                        TransformOp::Scale(DVec2::new(set.scale.x, set.scale.y)),
                        &set.scale.anchor,
                        width,
                        height,
                    );
                }
            }
            TransformKind::Skew => {
                if set.skew.x != 0.0 || set.skew.y != 0.0 {
                    emit(
                        &mut ops,
                        TransformOp::Skew(DVec2::new(set.skew.x, set.skew.y)),
                        &set.skew.anchor,
                        width,
                        height,
                    );
                }
            }
            TransformKind::Offset => {
                if set.offset.x != 0.0 || set.offset.y != 0.0 {
                    ops.push(TransformOp::Translate(DVec2::new(
                        set.offset.x,
                        set.offset.y,
                    )));
                }
            }
        }
    }
    ops
}

fn emit(
    ops: &mut Vec<TransformOp>,
    op: TransformOp,
    anchor: &Anchor,
    width: f64,
    height: f64,
) {
    if anchor.is_explicit() {
        let a = anchor.resolve(width, height);
        ops.push(TransformOp::Translate(a));
        ops.push(op);
        ops.push(TransformOp::Translate(-a));
    } else {
        ops.push(op);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn identity_set_emits_nothing() {
        let set = TransformSet::default();
        assert!(compose(&set, 100.0, 50.0).is_empty());
    }

    #[test]
    fn anchorless_rotate_emits_one_op() {
        let mut set = TransformSet::default();
        set.apply_rotate(&args(&["45"]));
        let ops = compose(&set, 100.0, 50.0);
        assert_eq!(ops, vec![TransformOp::Rotate(45.0)]);
    }

    #[test]
    fn anchored_rotate_is_translate_wrapped() {
        let mut set = TransformSet::default();
        set.apply_rotate(&args(&["45", "10", "20"]));
        let ops = compose(&set, 100.0, 50.0);
        assert_eq!(
            ops,
            vec![
                TransformOp::Translate(DVec2::new(10.0, 20.0)),
                TransformOp::Rotate(45.0),
                TransformOp::Translate(DVec2::new(-10.0, -20.0)),
            ]
        );
    }

    #[test]
    fn partial_anchor_defaults_missing_axis_to_center() {
        let mut set = TransformSet::default();
        set.apply_rotate(&args(&["90", "10"]));
        let ops = compose(&set, 100.0, 50.0);
        assert_eq!(ops[0], TransformOp::Translate(DVec2::new(10.0, 25.0)));
    }

    #[test]
    fn explicit_order_composes_scale_before_rotate() {
        let mut set = TransformSet::default();
        set.apply_rotate(&args(&["30"]));
        set.apply_scale(&args(&["2"]));
        set.apply_order(&args(&["scale", "rotate"]));
        assert_eq!(
            set.order,
            vec![
                TransformKind::Scale,
                TransformKind::Rotate,
                TransformKind::Skew,
                TransformKind::Offset,
            ]
        );
        let ops = compose(&set, 10.0, 10.0);
        assert_eq!(
            ops,
            vec![
                TransformOp::Scale(DVec2::new(2.0, 2.0)),
                TransformOp::Rotate(30.0),
            ]
        );
    }

    #[test]
    fn order_filters_unknown_names_and_dedupes() {
        let mut set = TransformSet::default();
        set.apply_order(&args(&["offset", "wobble", "offset", "skew"]));
        assert_eq!(
            set.order,
            vec![
                TransformKind::Offset,
                TransformKind::Skew,
                TransformKind::Rotate,
                TransformKind::Scale,
            ]
        );
    }

    #[test]
    fn single_scale_value_scales_both_axes() {
        let mut set = TransformSet::default();
        set.apply_scale(&args(&["3"]));
        assert_eq!((set.scale.x, set.scale.y), (3.0, 3.0));
    }

    #[test]
    fn scale_with_anchor() {
        let mut set = TransformSet::default();
        set.apply_scale(&args(&["2", "3", "5", "6"]));
        let ops = compose(&set, 10.0, 10.0);
        assert_eq!(
            ops,
            vec![
                TransformOp::Translate(DVec2::new(5.0, 6.0)),
                TransformOp::Scale(DVec2::new(2.0, 3.0)),
                TransformOp::Translate(DVec2::new(-5.0, -6.0)),
            ]
        );
    }

    #[test]
    fn offset_never_gets_anchor_translation() {
        let mut set = TransformSet::default();
        set.apply_offset(&args(&["4", "5"]));
        let ops = compose(&set, 10.0, 10.0);
        assert_eq!(ops, vec![TransformOp::Translate(DVec2::new(4.0, 5.0))]);
    }
}
