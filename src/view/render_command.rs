use smol_str::SmolStr;

use crate::style::{BorderWidth, BoundingBox, Color, CornerRadius, CustomData, Dimensions, ImageHandle};
use crate::ui::ElementId;

/// One draw instruction. Array order is paint order, back to front.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderCommand {
    pub id: ElementId,
    pub bounding_box: BoundingBox,
    pub z_index: i16,
    /// Passed through from [`ElementConfig::user_data`](crate::style::ElementConfig).
    pub user_data: u64,
    pub kind: RenderCommandKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommandKind {
    Rectangle {
        color: Color,
        corner_radius: CornerRadius,
    },
    Border {
        color: Color,
        width: BorderWidth,
        corner_radius: CornerRadius,
    },
    /// A single wrapped line of a text run.
    Text {
        text: SmolStr,
        color: Color,
        font_id: u16,
        font_size: f32,
        line_height: f32,
    },
    Image {
        handle: ImageHandle,
        source_dimensions: Dimensions,
        /// The element's background color, if it declared one.
        tint: Option<Color>,
        corner_radius: CornerRadius,
    },
    /// Constrains subsequent draws to `bounding_box` until the matching end.
    ScissorStart,
    ScissorEnd,
    Custom {
        data: CustomData,
        background_color: Option<Color>,
        corner_radius: CornerRadius,
    },
}

impl RenderCommandKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Rectangle { .. } => "rectangle",
            Self::Border { .. } => "border",
            Self::Text { .. } => "text",
            Self::Image { .. } => "image",
            Self::ScissorStart => "scissor_start",
            Self::ScissorEnd => "scissor_end",
            Self::Custom { .. } => "custom",
        }
    }
}

impl RenderCommand {
    pub fn is_scissor(&self) -> bool {
        matches!(
            self.kind,
            RenderCommandKind::ScissorStart | RenderCommandKind::ScissorEnd
        )
    }
}
