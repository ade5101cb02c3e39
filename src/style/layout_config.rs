use crate::style::Axis;

/// Sizing rule for one axis of an element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SizingAxis {
    /// Wraps the content, clamped to `[min, max]`.
    Fit { min: f32, max: f32 },
    /// Starts at the content size and takes leftover space from the parent.
    Grow { min: f32, max: f32 },
    /// Exactly this many pixels; content larger than this overflows.
    Fixed(f32),
    /// Fraction in `[0, 1]` of the parent's content area.
    Percent(f32),
}

impl SizingAxis {
    pub const fn fit() -> Self {
        Self::Fit {
            min: 0.0,
            max: f32::MAX,
        }
    }

    pub const fn fit_between(min: f32, max: f32) -> Self {
        Self::Fit { min, max }
    }

    pub const fn grow() -> Self {
        Self::Grow {
            min: 0.0,
            max: f32::MAX,
        }
    }

    pub const fn grow_between(min: f32, max: f32) -> Self {
        Self::Grow { min, max }
    }

    pub const fn fixed(px: f32) -> Self {
        Self::Fixed(px)
    }

    pub const fn percent(fraction: f32) -> Self {
        Self::Percent(fraction)
    }

    pub(crate) const fn is_grow(self) -> bool {
        matches!(self, Self::Grow { .. })
    }

    /// Whether the distributor may resize the element along this axis.
    pub(crate) const fn is_resizable(self) -> bool {
        matches!(self, Self::Fit { .. } | Self::Grow { .. })
    }

    pub(crate) const fn max_size(self) -> f32 {
        match self {
            Self::Fit { max, .. } | Self::Grow { max, .. } => max,
            Self::Fixed(px) => px,
            Self::Percent(_) => f32::MAX,
        }
    }
}

impl Default for SizingAxis {
    fn default() -> Self {
        Self::fit()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sizing {
    pub width: SizingAxis,
    pub height: SizingAxis,
}

impl Sizing {
    pub const fn new(width: SizingAxis, height: SizingAxis) -> Self {
        Self { width, height }
    }

    pub const fn fit() -> Self {
        Self::new(SizingAxis::fit(), SizingAxis::fit())
    }

    pub const fn grow() -> Self {
        Self::new(SizingAxis::grow(), SizingAxis::grow())
    }

    pub const fn fixed(width: f32, height: f32) -> Self {
        Self::new(SizingAxis::Fixed(width), SizingAxis::Fixed(height))
    }

    pub(crate) const fn along(self, axis: Axis) -> SizingAxis {
        match axis {
            Axis::X => self.width,
            Axis::Y => self.height,
        }
    }

    pub(crate) fn along_mut(&mut self, axis: Axis) -> &mut SizingAxis {
        match axis {
            Axis::X => &mut self.width,
            Axis::Y => &mut self.height,
        }
    }
}

impl Default for Sizing {
    fn default() -> Self {
        Self::fit()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EdgeInsets {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl EdgeInsets {
    pub const ZERO: Self = Self::all(0.0);

    pub const fn new(top: f32, right: f32, bottom: f32, left: f32) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    pub const fn all(value: f32) -> Self {
        Self::new(value, value, value, value)
    }

    pub const fn symmetric(horizontal: f32, vertical: f32) -> Self {
        Self::new(vertical, horizontal, vertical, horizontal)
    }

    /// Sum of both sides along `axis`.
    pub(crate) fn along(&self, axis: Axis) -> f32 {
        match axis {
            Axis::X => self.left + self.right,
            Axis::Y => self.top + self.bottom,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LayoutDirection {
    #[default]
    LeftToRight,
    TopToBottom,
}

impl LayoutDirection {
    pub(crate) const fn primary_axis(self) -> Axis {
        match self {
            LayoutDirection::LeftToRight => Axis::X,
            LayoutDirection::TopToBottom => Axis::Y,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AlignX {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AlignY {
    #[default]
    Top,
    Center,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ChildAlignment {
    pub x: AlignX,
    pub y: AlignY,
}

impl ChildAlignment {
    pub const fn new(x: AlignX, y: AlignY) -> Self {
        Self { x, y }
    }

    /// Share of free space placed before the children along `axis`.
    pub(crate) const fn factor(self, axis: Axis) -> f32 {
        match axis {
            Axis::X => match self.x {
                AlignX::Left => 0.0,
                AlignX::Center => 0.5,
                AlignX::Right => 1.0,
            },
            Axis::Y => match self.y {
                AlignY::Top => 0.0,
                AlignY::Center => 0.5,
                AlignY::Bottom => 1.0,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LayoutConfig {
    pub sizing: Sizing,
    pub padding: EdgeInsets,
    pub child_gap: f32,
    pub direction: LayoutDirection,
    pub child_alignment: ChildAlignment,
    pub wrap: bool,
}

impl LayoutConfig {
    pub const fn new() -> Self {
        Self {
            sizing: Sizing::fit(),
            padding: EdgeInsets::ZERO,
            child_gap: 0.0,
            direction: LayoutDirection::LeftToRight,
            child_alignment: ChildAlignment::new(AlignX::Left, AlignY::Top),
            wrap: false,
        }
    }

    pub const fn sizing(mut self, sizing: Sizing) -> Self {
        self.sizing = sizing;
        self
    }

    pub const fn width(mut self, width: SizingAxis) -> Self {
        self.sizing.width = width;
        self
    }

    pub const fn height(mut self, height: SizingAxis) -> Self {
        self.sizing.height = height;
        self
    }

    pub const fn padding(mut self, padding: EdgeInsets) -> Self {
        self.padding = padding;
        self
    }

    pub const fn child_gap(mut self, gap: f32) -> Self {
        self.child_gap = gap;
        self
    }

    pub const fn direction(mut self, direction: LayoutDirection) -> Self {
        self.direction = direction;
        self
    }

    pub const fn align(mut self, x: AlignX, y: AlignY) -> Self {
        self.child_alignment = ChildAlignment::new(x, y);
        self
    }

    pub const fn wrap(mut self, wrap: bool) -> Self {
        self.wrap = wrap;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::{AlignX, AlignY, ChildAlignment, EdgeInsets, SizingAxis};
    use crate::style::Axis;

    #[test]
    fn fixed_sizing_caps_at_its_value() {
        let sizing = SizingAxis::fixed(80.0);
        assert_eq!(sizing.max_size(), 80.0);
        assert!(!sizing.is_resizable());
    }

    #[test]
    fn padding_sums_per_axis() {
        let padding = EdgeInsets::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(padding.along(Axis::X), 6.0);
        assert_eq!(padding.along(Axis::Y), 4.0);
    }

    #[test]
    fn alignment_factor_maps_end_to_one() {
        let align = ChildAlignment::new(AlignX::Right, AlignY::Center);
        assert_eq!(align.factor(Axis::X), 1.0);
        assert_eq!(align.factor(Axis::Y), 0.5);
    }
}
