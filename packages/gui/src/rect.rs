//! Axis-aligned rectangles in virtual UI coordinates.

use vek::*;


/// Axis-aligned rectangle, top-left position plus size. Y grows downward.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Rect {
    pub pos: Vec2<f32>,
    pub size: Extent2<f32>,
}

impl Rect {
    pub fn new(pos: Vec2<f32>, size: Extent2<f32>) -> Self {
        Rect { pos, size }
    }

    /// Right edge.
    pub fn x2(&self) -> f32 {
        self.pos.x + self.size.w
    }

    /// Bottom edge.
    pub fn y2(&self) -> f32 {
        self.pos.y + self.size.h
    }

    /// Whether the point lies inside. Lower bounds inclusive, upper bounds
    /// exclusive, so adjacent rectangles never both claim a point.
    pub fn contains(&self, point: Vec2<f32>) -> bool {
        point.x >= self.pos.x && point.x < self.x2()
            && point.y >= self.pos.y && point.y < self.y2()
    }

    /// Smallest rectangle containing both.
    pub fn union(&self, other: Rect) -> Rect {
        let x1 = self.pos.x.min(other.pos.x);
        let y1 = self.pos.y.min(other.pos.y);
        let x2 = self.x2().max(other.x2());
        let y2 = self.y2().max(other.y2());
        Rect {
            pos: Vec2::new(x1, y1),
            size: Extent2::new(x2 - x1, y2 - y1),
        }
    }
}


#[test]
fn test_contains_bounds() {
    let rect = Rect::new(Vec2::new(10.0, 10.0), Extent2::new(20.0, 10.0));
    assert!(rect.contains(Vec2::new(10.0, 10.0)));
    assert!(rect.contains(Vec2::new(29.9, 19.9)));
    assert!(!rect.contains(Vec2::new(30.0, 15.0)));
    assert!(!rect.contains(Vec2::new(15.0, 20.0)));
    assert!(!rect.contains(Vec2::new(9.9, 15.0)));
}

#[test]
fn test_union_covers_both() {
    let a = Rect::new(Vec2::new(0.0, 0.0), Extent2::new(10.0, 10.0));
    let b = Rect::new(Vec2::new(5.0, 20.0), Extent2::new(10.0, 5.0));
    let u = a.union(b);
    assert_eq!(u.pos, Vec2::new(0.0, 0.0));
    assert_eq!(u.size, Extent2::new(15.0, 25.0));
}
