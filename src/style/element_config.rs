use bitflags::bitflags;
use glam::Vec2;

use crate::style::{Axis, Color, Dimensions, EdgeInsets, LayoutConfig, LayoutDirection, Sizing, SizingAxis};
use crate::ui::ElementId;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CornerRadius {
    pub top_left: f32,
    pub top_right: f32,
    pub bottom_left: f32,
    pub bottom_right: f32,
}

impl CornerRadius {
    pub const ZERO: Self = Self::all(0.0);

    pub const fn all(radius: f32) -> Self {
        Self {
            top_left: radius,
            top_right: radius,
            bottom_left: radius,
            bottom_right: radius,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BorderWidth {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
    /// Thickness of the separators drawn in the gaps between children.
    pub between_children: f32,
}

impl BorderWidth {
    pub const fn outside(width: f32) -> Self {
        Self {
            left: width,
            right: width,
            top: width,
            bottom: width,
            between_children: 0.0,
        }
    }

    pub const fn all(width: f32) -> Self {
        Self {
            between_children: width,
            ..Self::outside(width)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.left <= 0.0
            && self.right <= 0.0
            && self.top <= 0.0
            && self.bottom <= 0.0
            && self.between_children <= 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BorderConfig {
    pub color: Color,
    pub width: BorderWidth,
}

impl BorderConfig {
    pub const fn new(color: Color, width: BorderWidth) -> Self {
        Self { color, width }
    }
}

/// Host-side image reference; the engine only carries it to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ImageHandle(pub u64);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageConfig {
    pub handle: ImageHandle,
    pub source_dimensions: Dimensions,
}

impl ImageConfig {
    pub const fn new(handle: ImageHandle, source_dimensions: Dimensions) -> Self {
        Self {
            handle,
            source_dimensions,
        }
    }

    /// Height that keeps the source aspect ratio at `width`.
    pub(crate) fn height_for_width(&self, width: f32) -> Option<f32> {
        let source = self.source_dimensions;
        (source.width > 0.0).then(|| width * source.height / source.width)
    }
}

/// Opaque payload for host-drawn elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CustomData(pub u64);

/// A point on the 3x3 grid of an element's box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AttachPoint {
    #[default]
    LeftTop,
    LeftCenter,
    LeftBottom,
    CenterTop,
    CenterCenter,
    CenterBottom,
    RightTop,
    RightCenter,
    RightBottom,
}

impl AttachPoint {
    pub(crate) const fn factors(self) -> Vec2 {
        let x = match self {
            Self::LeftTop | Self::LeftCenter | Self::LeftBottom => 0.0,
            Self::CenterTop | Self::CenterCenter | Self::CenterBottom => 0.5,
            Self::RightTop | Self::RightCenter | Self::RightBottom => 1.0,
        };
        let y = match self {
            Self::LeftTop | Self::CenterTop | Self::RightTop => 0.0,
            Self::LeftCenter | Self::CenterCenter | Self::RightCenter => 0.5,
            Self::LeftBottom | Self::CenterBottom | Self::RightBottom => 1.0,
        };
        Vec2::new(x, y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AttachPoints {
    pub element: AttachPoint,
    pub parent: AttachPoint,
}

impl AttachPoints {
    pub const fn new(element: AttachPoint, parent: AttachPoint) -> Self {
        Self { element, parent }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AttachTo {
    /// The element that declares the floating element.
    #[default]
    Parent,
    /// Any element declared earlier in the same frame.
    Element(ElementId),
    /// The layout root; such elements are never clipped by scroll containers.
    Root,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PointerCaptureMode {
    /// Elements underneath do not receive hover.
    #[default]
    Capture,
    Passthrough,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloatingConfig {
    pub offset: Vec2,
    pub expand: Dimensions,
    pub z_index: i16,
    pub attach_to: AttachTo,
    pub attach_points: AttachPoints,
    pub pointer_capture: PointerCaptureMode,
}

impl FloatingConfig {
    pub const fn new(attach_to: AttachTo) -> Self {
        Self {
            offset: Vec2::ZERO,
            expand: Dimensions::ZERO,
            z_index: 0,
            attach_to,
            attach_points: AttachPoints::new(AttachPoint::LeftTop, AttachPoint::LeftTop),
            pointer_capture: PointerCaptureMode::Capture,
        }
    }

    pub const fn offset(mut self, offset: Vec2) -> Self {
        self.offset = offset;
        self
    }

    pub const fn expand(mut self, expand: Dimensions) -> Self {
        self.expand = expand;
        self
    }

    pub const fn z_index(mut self, z_index: i16) -> Self {
        self.z_index = z_index;
        self
    }

    pub const fn attach_points(mut self, element: AttachPoint, parent: AttachPoint) -> Self {
        self.attach_points = AttachPoints::new(element, parent);
        self
    }

    pub const fn pointer_capture(mut self, mode: PointerCaptureMode) -> Self {
        self.pointer_capture = mode;
        self
    }
}

impl Default for FloatingConfig {
    fn default() -> Self {
        Self::new(AttachTo::Parent)
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ScrollAxes: u8 {
        const HORIZONTAL = 1 << 0;
        const VERTICAL = 1 << 1;
    }
}

impl ScrollAxes {
    pub(crate) const fn scrolls(self, axis: Axis) -> bool {
        match axis {
            Axis::X => self.contains(Self::HORIZONTAL),
            Axis::Y => self.contains(Self::VERTICAL),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextWrap {
    /// Break at spaces and at explicit newlines.
    #[default]
    Words,
    /// Break only at explicit newlines.
    Newlines,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextConfig {
    pub color: Color,
    pub font_id: u16,
    pub font_size: f32,
    /// Distance between wrapped lines; `0.0` uses the measured height.
    pub line_height: f32,
    pub wrap_mode: TextWrap,
}

impl TextConfig {
    pub const fn new(font_id: u16, font_size: f32) -> Self {
        Self {
            color: Color::rgb(0, 0, 0),
            font_id,
            font_size,
            line_height: 0.0,
            wrap_mode: TextWrap::Words,
        }
    }

    pub const fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub const fn line_height(mut self, line_height: f32) -> Self {
        self.line_height = line_height;
        self
    }

    pub const fn wrap_mode(mut self, wrap_mode: TextWrap) -> Self {
        self.wrap_mode = wrap_mode;
        self
    }
}

impl Default for TextConfig {
    fn default() -> Self {
        Self::new(0, 16.0)
    }
}

/// Everything an element can declare when it is opened.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ElementConfig {
    pub id: Option<ElementId>,
    pub layout: LayoutConfig,
    pub background_color: Option<Color>,
    pub corner_radius: CornerRadius,
    pub border: Option<BorderConfig>,
    pub image: Option<ImageConfig>,
    pub floating: Option<FloatingConfig>,
    pub scroll: ScrollAxes,
    pub custom: Option<CustomData>,
    pub user_data: u64,
}

impl ElementConfig {
    pub const fn new() -> Self {
        Self {
            id: None,
            layout: LayoutConfig::new(),
            background_color: None,
            corner_radius: CornerRadius::ZERO,
            border: None,
            image: None,
            floating: None,
            scroll: ScrollAxes::empty(),
            custom: None,
            user_data: 0,
        }
    }

    pub const fn id(mut self, id: ElementId) -> Self {
        self.id = Some(id);
        self
    }

    pub const fn layout(mut self, layout: LayoutConfig) -> Self {
        self.layout = layout;
        self
    }

    pub const fn sizing(mut self, sizing: Sizing) -> Self {
        self.layout.sizing = sizing;
        self
    }

    pub const fn width(mut self, width: SizingAxis) -> Self {
        self.layout.sizing.width = width;
        self
    }

    pub const fn height(mut self, height: SizingAxis) -> Self {
        self.layout.sizing.height = height;
        self
    }

    pub const fn padding(mut self, padding: EdgeInsets) -> Self {
        self.layout.padding = padding;
        self
    }

    pub const fn child_gap(mut self, gap: f32) -> Self {
        self.layout.child_gap = gap;
        self
    }

    pub const fn direction(mut self, direction: LayoutDirection) -> Self {
        self.layout.direction = direction;
        self
    }

    pub const fn background(mut self, color: Color) -> Self {
        self.background_color = Some(color);
        self
    }

    pub const fn corner_radius(mut self, radius: CornerRadius) -> Self {
        self.corner_radius = radius;
        self
    }

    pub const fn border(mut self, border: BorderConfig) -> Self {
        self.border = Some(border);
        self
    }

    pub const fn image(mut self, image: ImageConfig) -> Self {
        self.image = Some(image);
        self
    }

    pub const fn floating(mut self, floating: FloatingConfig) -> Self {
        self.floating = Some(floating);
        self
    }

    pub const fn scroll(mut self, axes: ScrollAxes) -> Self {
        self.scroll = axes;
        self
    }

    pub const fn custom(mut self, data: CustomData) -> Self {
        self.custom = Some(data);
        self
    }

    pub const fn user_data(mut self, user_data: u64) -> Self {
        self.user_data = user_data;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::{AttachPoint, ElementConfig, ImageConfig, ImageHandle, ScrollAxes};
    use crate::style::{Axis, Dimensions, SizingAxis};

    #[test]
    fn builder_writes_through_to_layout() {
        let config = ElementConfig::new()
            .width(SizingAxis::grow())
            .child_gap(4.0)
            .scroll(ScrollAxes::VERTICAL);
        assert_eq!(config.layout.sizing.width, SizingAxis::grow());
        assert_eq!(config.layout.child_gap, 4.0);
        assert!(config.scroll.scrolls(Axis::Y));
        assert!(!config.scroll.scrolls(Axis::X));
    }

    #[test]
    fn attach_point_factors_cover_the_grid() {
        assert_eq!(AttachPoint::LeftTop.factors().to_array(), [0.0, 0.0]);
        assert_eq!(AttachPoint::CenterBottom.factors().to_array(), [0.5, 1.0]);
        assert_eq!(AttachPoint::RightCenter.factors().to_array(), [1.0, 0.5]);
    }

    #[test]
    fn image_height_follows_aspect_ratio() {
        let image = ImageConfig::new(ImageHandle(1), Dimensions::new(200.0, 100.0));
        assert_eq!(image.height_for_width(50.0), Some(25.0));
        let empty = ImageConfig::new(ImageHandle(1), Dimensions::ZERO);
        assert_eq!(empty.height_for_width(50.0), None);
    }
}
