use std::ops::Range;

use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use crate::style::{BoundingBox, Dimensions, ElementConfig, TextConfig};
use crate::ui::ElementId;

/// Contiguous run inside one of the arena's flat buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct Span {
    pub start: u32,
    pub len: u32,
}

impl Span {
    pub(crate) const fn new(start: usize, len: usize) -> Self {
        Self {
            start: start as u32,
            len: len as u32,
        }
    }

    pub(crate) const fn range(self) -> Range<usize> {
        self.start as usize..(self.start + self.len) as usize
    }

    pub(crate) const fn is_empty(self) -> bool {
        self.len == 0
    }
}

#[derive(Debug, Clone)]
pub(crate) struct LayoutElement {
    pub id: ElementId,
    pub config: ElementConfig,
    /// Index into [`FrameArena::texts`] for text runs.
    pub text: Option<u32>,
    /// Index into [`FrameArena::roots`] for the layout root and floating elements.
    pub root: Option<u32>,
    pub children: Span,
    /// Wrap lines of this container, filled by the primary-axis distribution.
    pub lines: Span,
    pub dimensions: Dimensions,
    pub min_dimensions: Dimensions,
    pub bounding_box: BoundingBox,
}

impl LayoutElement {
    pub(crate) fn new(id: ElementId, config: ElementConfig) -> Self {
        Self {
            id,
            config,
            text: None,
            root: None,
            children: Span::default(),
            lines: Span::default(),
            dimensions: Dimensions::ZERO,
            min_dimensions: Dimensions::ZERO,
            bounding_box: BoundingBox::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct TextElement {
    pub content: SmolStr,
    pub config: TextConfig,
    pub unwrapped: Dimensions,
    pub min_width: f32,
    pub line_height: f32,
    pub lines: Span,
}

/// One rendered line of a text run, as a byte range of its content.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct WrappedLine {
    pub start: u32,
    pub end: u32,
    pub width: f32,
}

/// Children `[first, first + count)` of a wrap container's child list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct WrapLine {
    pub first: u32,
    pub count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct LayoutRoot {
    pub element: u32,
    /// Element whose box this root is sized against and attached to.
    pub attach_to: u32,
    pub z_index: i16,
    /// Scroll container whose box clips this root.
    pub clip: Option<u32>,
    pub capture: bool,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct OpenElement {
    pub index: u32,
    pub pending_start: usize,
    /// Children declared so far, floating ones included; seeds generated ids.
    pub declared: u32,
}

/// Per-frame element storage; reset, never freed, between frames.
///
/// Elements are stored in declaration (pre-)order, so every parent and every
/// floating attach target has a lower index than the elements that depend on it.
#[derive(Debug)]
pub(crate) struct FrameArena {
    pub elements: Vec<LayoutElement>,
    pub child_indices: Vec<u32>,
    pub texts: Vec<TextElement>,
    pub wrapped_lines: Vec<WrappedLine>,
    pub wrap_lines: Vec<WrapLine>,
    pub roots: Vec<LayoutRoot>,
    pub id_map: FxHashMap<ElementId, u32>,
    pub(crate) open_stack: Vec<OpenElement>,
    pub(crate) pending_children: Vec<u32>,
    pub(crate) skipped_depth: usize,
    pub(crate) capacity: usize,
    pub(crate) capacity_reported: bool,
}

impl FrameArena {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            elements: Vec::with_capacity(capacity),
            child_indices: Vec::with_capacity(capacity),
            texts: Vec::new(),
            wrapped_lines: Vec::new(),
            wrap_lines: Vec::new(),
            roots: Vec::new(),
            id_map: FxHashMap::default(),
            open_stack: Vec::new(),
            pending_children: Vec::with_capacity(capacity),
            skipped_depth: 0,
            capacity,
            capacity_reported: false,
        }
    }

    pub(crate) fn reset(&mut self, capacity: usize) {
        self.elements.clear();
        self.child_indices.clear();
        self.texts.clear();
        self.wrapped_lines.clear();
        self.wrap_lines.clear();
        self.roots.clear();
        self.id_map.clear();
        self.open_stack.clear();
        self.pending_children.clear();
        self.skipped_depth = 0;
        self.capacity = capacity;
        self.capacity_reported = false;
        if self.elements.capacity() < capacity {
            self.elements.reserve(capacity);
        }
    }

    pub(crate) fn children(&self, index: usize) -> &[u32] {
        &self.child_indices[self.elements[index].children.range()]
    }

    pub(crate) fn text_of(&self, index: usize) -> Option<&TextElement> {
        self.elements[index]
            .text
            .map(|text| &self.texts[text as usize])
    }

    /// Wrap lines of `index`, or one line spanning every child when it has none.
    pub(crate) fn lines_of(&self, index: usize) -> Vec<WrapLine> {
        let element = &self.elements[index];
        if element.lines.is_empty() {
            vec![WrapLine {
                first: 0,
                count: element.children.len,
            }]
        } else {
            self.wrap_lines[element.lines.range()].to_vec()
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.elements.len()
    }
}

#[cfg(test)]
mod tests {
    use super::{FrameArena, LayoutElement, Span};
    use crate::style::ElementConfig;
    use crate::ui::ElementId;

    #[test]
    fn span_maps_to_buffer_range() {
        let span = Span::new(3, 2);
        assert_eq!(span.range(), 3..5);
        assert!(Span::default().is_empty());
    }

    #[test]
    fn reset_keeps_allocations_but_drops_elements() {
        let mut arena = FrameArena::with_capacity(8);
        arena
            .elements
            .push(LayoutElement::new(ElementId::new("a"), ElementConfig::new()));
        arena.child_indices.push(0);
        arena.reset(8);
        assert_eq!(arena.len(), 0);
        assert!(arena.child_indices.is_empty());
        assert!(arena.elements.capacity() >= 8);
    }
}
