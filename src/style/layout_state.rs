use glam::Vec2;
use rustc_hash::FxHashMap;

use crate::ui::ElementId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Axis {
    X,
    Y,
}

impl Axis {
    pub(crate) const fn other(self) -> Self {
        match self {
            Axis::X => Axis::Y,
            Axis::Y => Axis::X,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Dimensions {
    pub width: f32,
    pub height: f32,
}

impl Dimensions {
    pub const ZERO: Self = Self::new(0.0, 0.0);

    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub(crate) const fn along(self, axis: Axis) -> f32 {
        match axis {
            Axis::X => self.width,
            Axis::Y => self.height,
        }
    }

    pub(crate) fn along_mut(&mut self, axis: Axis) -> &mut f32 {
        match axis {
            Axis::X => &mut self.width,
            Axis::Y => &mut self.height,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl BoundingBox {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub const fn from_origin(origin: Vec2, size: Dimensions) -> Self {
        Self::new(origin.x, origin.y, size.width, size.height)
    }

    pub const fn origin(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub const fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.x && point.x <= self.right() && point.y >= self.y && point.y <= self.bottom()
    }

    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.x <= other.right()
            && other.x <= self.right()
            && self.y <= other.bottom()
            && other.y <= self.bottom()
    }

    /// Overlap of both boxes; empty (zero-sized) when they are disjoint.
    pub fn intersection(&self, other: &BoundingBox) -> BoundingBox {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        BoundingBox::new(x, y, (right - x).max(0.0), (bottom - y).max(0.0))
    }
}

/// Resolved boxes of the most recently positioned frame, keyed by element id.
#[derive(Debug, Default)]
pub struct LayoutStateTree {
    states: FxHashMap<ElementId, BoundingBox>,
}

impl LayoutStateTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.states.clear();
    }

    pub fn insert(&mut self, id: ElementId, state: BoundingBox) {
        self.states.insert(id, state);
    }

    pub fn get(&self, id: ElementId) -> Option<&BoundingBox> {
        self.states.get(&id)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ElementId, &BoundingBox)> {
        self.states.iter()
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::BoundingBox;

    #[test]
    fn contains_includes_edges() {
        let bbox = BoundingBox::new(10.0, 10.0, 20.0, 5.0);
        assert!(bbox.contains(Vec2::new(10.0, 10.0)));
        assert!(bbox.contains(Vec2::new(30.0, 15.0)));
        assert!(!bbox.contains(Vec2::new(30.1, 12.0)));
    }

    #[test]
    fn disjoint_intersection_is_empty() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BoundingBox::new(20.0, 0.0, 10.0, 10.0);
        assert!(!a.intersects(&b));
        let overlap = a.intersection(&b);
        assert_eq!(overlap.width, 0.0);

        let c = BoundingBox::new(5.0, 5.0, 10.0, 10.0);
        assert_eq!(a.intersection(&c), BoundingBox::new(5.0, 5.0, 5.0, 5.0));
    }
}
