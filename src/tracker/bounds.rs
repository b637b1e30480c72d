//! Predicates deciding whether a predicted box is still inside the
//! observable region. Tracks failing the check are dropped before
//! association.

use serde::{Deserialize, Serialize};

use crate::tracker::rect::Rect;

/// Whether a predicted box is still inside the observable region.
pub trait FrameBounds {
    fn contains(&self, rect: &Rect) -> bool;
}

/// Accepts boxes whose top-left corner is non-negative. NaN coordinates
/// are rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct NonNegativeOrigin;

impl FrameBounds for NonNegativeOrigin {
    fn contains(&self, rect: &Rect) -> bool {
        rect.x >= 0.0 && rect.y >= 0.0
    }
}

/// Accepts boxes whose top-left corner lies inside a `width` x `height`
/// frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameRect {
    pub width: f32,
    pub height: f32,
}

impl FrameRect {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

impl FrameBounds for FrameRect {
    fn contains(&self, rect: &Rect) -> bool {
        rect.x >= 0.0 && rect.y >= 0.0 && rect.x < self.width && rect.y < self.height
    }
}

impl<F> FrameBounds for F
where
    F: Fn(&Rect) -> bool,
{
    fn contains(&self, rect: &Rect) -> bool {
        self(rect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_negative_origin() {
        assert!(NonNegativeOrigin.contains(&Rect::new(0.0, 0.0, 5.0, 5.0)));
        assert!(!NonNegativeOrigin.contains(&Rect::new(-0.5, 3.0, 5.0, 5.0)));
        assert!(!NonNegativeOrigin.contains(&Rect::new(3.0, f32::NAN, 5.0, 5.0)));
    }

    #[test]
    fn test_frame_rect() {
        let frame = FrameRect::new(640.0, 480.0);
        assert!(frame.contains(&Rect::new(600.0, 400.0, 100.0, 100.0)));
        assert!(!frame.contains(&Rect::new(640.0, 10.0, 10.0, 10.0)));
        assert!(!frame.contains(&Rect::new(10.0, 500.0, 10.0, 10.0)));
    }

    #[test]
    fn test_closure_bounds() {
        let right_half = |r: &Rect| r.x >= 320.0;
        assert!(right_half.contains(&Rect::new(400.0, 0.0, 1.0, 1.0)));
        assert!(!right_half.contains(&Rect::new(10.0, 0.0, 1.0, 1.0)));
    }
}
