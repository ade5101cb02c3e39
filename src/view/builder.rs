use smol_str::SmolStr;

use crate::style::{
    Axis, AttachTo, Dimensions, ElementConfig, LayoutConfig, PointerCaptureMode, Sizing, SizingAxis,
    TextConfig,
};
use crate::ui::{ElementId, ErrorSink, LayoutError};
use crate::view::arena::{FrameArena, LayoutElement, LayoutRoot, OpenElement, Span, TextElement};

pub const ROOT_ID: ElementId = ElementId::new("rflayout_root");

impl FrameArena {
    /// Opens the implicit root that spans the layout viewport.
    pub(crate) fn open_root(&mut self, dimensions: Dimensions) {
        let config = ElementConfig::new()
            .id(ROOT_ID)
            .sizing(Sizing::fixed(dimensions.width.max(0.0), dimensions.height.max(0.0)));
        let mut root = LayoutElement::new(ROOT_ID, config);
        root.root = Some(0);
        self.elements.push(root);
        self.id_map.insert(ROOT_ID, 0);
        self.roots.push(LayoutRoot {
            element: 0,
            attach_to: 0,
            z_index: 0,
            clip: None,
            capture: false,
        });
        self.open_stack.push(OpenElement {
            index: 0,
            pending_start: 0,
            declared: 0,
        });
    }

    pub(crate) fn open_element(&mut self, mut config: ElementConfig, errors: &mut ErrorSink) {
        if self.skipped_depth > 0 || !self.has_room(errors) {
            self.skipped_depth += 1;
            return;
        }
        let Some(parent) = self.open_stack.last().map(|open| open.index as usize) else {
            self.skipped_depth += 1;
            return;
        };

        let index = self.elements.len();
        let id = self.resolve_id(config.id, errors);
        config.id = Some(id);
        sanitize_layout(id, &mut config.layout, errors);

        let mut element = LayoutElement::new(id, config);
        if let Some(floating) = config.floating {
            let attach_to = match floating.attach_to {
                AttachTo::Parent => parent,
                AttachTo::Root => 0,
                AttachTo::Element(target) => match self.id_map.get(&target) {
                    Some(&target) => target as usize,
                    None => {
                        errors.report(LayoutError::FloatingTargetNotFound { id, target });
                        parent
                    }
                },
            };
            let clip = match floating.attach_to {
                AttachTo::Root => None,
                _ => self.enclosing_scroll_container(),
            };
            element.root = Some(self.roots.len() as u32);
            self.roots.push(LayoutRoot {
                element: index as u32,
                attach_to: attach_to as u32,
                z_index: floating.z_index,
                clip,
                capture: floating.pointer_capture == PointerCaptureMode::Capture,
            });
        } else {
            self.pending_children.push(index as u32);
        }

        self.id_map.insert(id, index as u32);
        self.elements.push(element);
        self.open_stack.push(OpenElement {
            index: index as u32,
            pending_start: self.pending_children.len(),
            declared: 0,
        });
    }

    pub(crate) fn close_element(&mut self, errors: &mut ErrorSink) {
        if self.skipped_depth > 0 {
            self.skipped_depth -= 1;
            return;
        }
        // the root is closed by `finish_declaration`, never by the host
        if self.open_stack.len() <= 1 {
            errors.report(LayoutError::UnbalancedClose);
            return;
        }
        self.close_top();
    }

    pub(crate) fn add_text(&mut self, content: SmolStr, config: TextConfig, errors: &mut ErrorSink) {
        if self.skipped_depth > 0 || self.open_stack.is_empty() || !self.has_room(errors) {
            return;
        }
        let index = self.elements.len();
        let id = self.resolve_id(None, errors);
        let mut element = LayoutElement::new(id, ElementConfig::new().id(id));
        element.text = Some(self.texts.len() as u32);
        self.texts.push(TextElement {
            content,
            config,
            unwrapped: Dimensions::ZERO,
            min_width: 0.0,
            line_height: 0.0,
            lines: Span::default(),
        });
        self.elements.push(element);
        self.pending_children.push(index as u32);
    }

    /// Closes whatever is still open, including the root. Returns how many
    /// host-opened elements had to be closed implicitly.
    pub(crate) fn finish_declaration(&mut self, errors: &mut ErrorSink) -> usize {
        let unclosed = self.open_stack.len().saturating_sub(1) + self.skipped_depth;
        if unclosed > 0 {
            errors.report(LayoutError::UnclosedElements { count: unclosed });
        }
        self.skipped_depth = 0;
        while !self.open_stack.is_empty() {
            self.close_top();
        }
        unclosed
    }

    pub(crate) fn open_element_id(&self) -> Option<ElementId> {
        if self.skipped_depth > 0 {
            return None;
        }
        self.open_stack
            .last()
            .map(|open| self.elements[open.index as usize].id)
    }

    fn close_top(&mut self) {
        let Some(open) = self.open_stack.pop() else {
            return;
        };
        let start = self.child_indices.len();
        self.child_indices
            .extend(self.pending_children.drain(open.pending_start..));
        let len = self.child_indices.len() - start;
        self.elements[open.index as usize].children = Span::new(start, len);
    }

    fn has_room(&mut self, errors: &mut ErrorSink) -> bool {
        if self.elements.len() < self.capacity {
            return true;
        }
        if !self.capacity_reported {
            self.capacity_reported = true;
            errors.report(LayoutError::ElementCapacityExceeded {
                capacity: self.capacity,
            });
        }
        false
    }

    fn resolve_id(&mut self, requested: Option<ElementId>, errors: &mut ErrorSink) -> ElementId {
        let (parent_id, sibling) = match self.open_stack.last_mut() {
            Some(open) => {
                open.declared += 1;
                (self.elements[open.index as usize].id, open.declared - 1)
            }
            None => (ElementId::NONE, 0),
        };
        let generated = ElementId::child_of(parent_id, sibling);
        match requested {
            Some(id) if !id.is_none() => {
                if self.id_map.contains_key(&id) {
                    errors.report(LayoutError::DuplicateId { id });
                    generated
                } else {
                    id
                }
            }
            _ => generated,
        }
    }

    fn enclosing_scroll_container(&self) -> Option<u32> {
        self.open_stack
            .iter()
            .rev()
            .map(|open| open.index)
            .find(|&index| !self.elements[index as usize].config.scroll.is_empty())
    }
}

fn sanitize_layout(id: ElementId, layout: &mut LayoutConfig, errors: &mut ErrorSink) {
    for axis in [Axis::X, Axis::Y] {
        sanitize_sizing(id, layout.sizing.along_mut(axis), errors);
    }
    let padding = &mut layout.padding;
    for (field, value) in [
        ("padding.top", &mut padding.top),
        ("padding.right", &mut padding.right),
        ("padding.bottom", &mut padding.bottom),
        ("padding.left", &mut padding.left),
    ] {
        clamp_non_negative(id, field, value, errors);
    }
    clamp_non_negative(id, "child_gap", &mut layout.child_gap, errors);
}

fn sanitize_sizing(id: ElementId, sizing: &mut SizingAxis, errors: &mut ErrorSink) {
    match sizing {
        SizingAxis::Fit { min, max } | SizingAxis::Grow { min, max } => {
            clamp_non_negative(id, "sizing min", min, errors);
            clamp_non_negative(id, "sizing max", max, errors);
            if *max < *min {
                errors.report(LayoutError::InvalidSizing {
                    id,
                    min: *min,
                    max: *max,
                });
                *max = *min;
            }
        }
        SizingAxis::Fixed(px) => clamp_non_negative(id, "fixed size", px, errors),
        SizingAxis::Percent(fraction) => {
            if !(0.0..=1.0).contains(fraction) {
                errors.report(LayoutError::InvalidPercent {
                    id,
                    value: *fraction,
                });
                *fraction = if fraction.is_nan() {
                    0.0
                } else {
                    fraction.clamp(0.0, 1.0)
                };
            }
        }
    }
}

fn clamp_non_negative(id: ElementId, field: &'static str, value: &mut f32, errors: &mut ErrorSink) {
    // also catches NaN
    if !(*value >= 0.0) {
        errors.report(LayoutError::NegativeLength {
            id,
            field,
            value: *value,
        });
        *value = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use smol_str::SmolStr;

    use super::ROOT_ID;
    use crate::style::{
        AttachTo, Dimensions, ElementConfig, FloatingConfig, ScrollAxes, SizingAxis, TextConfig,
    };
    use crate::ui::{ElementId, ErrorKind, ErrorSink, LayoutError};
    use crate::view::arena::FrameArena;

    fn recording_sink() -> (ErrorSink, Rc<RefCell<Vec<LayoutError>>>) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let captured = seen.clone();
        let mut sink = ErrorSink::new();
        sink.set_handler(Box::new(move |error: &LayoutError| {
            captured.borrow_mut().push(error.clone())
        }));
        (sink, seen)
    }

    fn arena(capacity: usize) -> FrameArena {
        let mut arena = FrameArena::with_capacity(capacity);
        arena.open_root(Dimensions::new(100.0, 100.0));
        arena
    }

    #[test]
    fn children_are_recorded_in_declaration_order() {
        let (mut errors, seen) = recording_sink();
        let mut arena = arena(16);
        arena.open_element(ElementConfig::new().id(ElementId::new("a")), &mut errors);
        arena.add_text(SmolStr::new("x"), TextConfig::default(), &mut errors);
        arena.open_element(ElementConfig::new(), &mut errors);
        arena.close_element(&mut errors);
        arena.close_element(&mut errors);
        arena.open_element(ElementConfig::new().id(ElementId::new("b")), &mut errors);
        arena.close_element(&mut errors);
        assert_eq!(arena.finish_declaration(&mut errors), 0);

        assert_eq!(arena.children(0), &[1, 4]);
        assert_eq!(arena.children(1), &[2, 3]);
        assert_eq!(arena.elements[0].id, ROOT_ID);
        assert!(arena.elements[2].text.is_some());
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn capacity_overflow_truncates_whole_subtree() {
        let (mut errors, seen) = recording_sink();
        let mut arena = arena(2);
        arena.open_element(ElementConfig::new(), &mut errors);
        arena.close_element(&mut errors);
        arena.open_element(ElementConfig::new(), &mut errors);
        arena.add_text(SmolStr::new("lost"), TextConfig::default(), &mut errors);
        arena.open_element(ElementConfig::new(), &mut errors);
        arena.close_element(&mut errors);
        arena.close_element(&mut errors);
        assert_eq!(arena.finish_declaration(&mut errors), 0);

        assert_eq!(arena.len(), 2);
        assert_eq!(arena.children(0), &[1]);
        let seen = seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].kind(), ErrorKind::Capacity);
    }

    #[test]
    fn unbalanced_close_is_reported_and_ignored() {
        let (mut errors, seen) = recording_sink();
        let mut arena = arena(8);
        arena.close_element(&mut errors);
        assert_eq!(*seen.borrow(), vec![LayoutError::UnbalancedClose]);
        assert_eq!(arena.open_stack.len(), 1);
    }

    #[test]
    fn unclosed_elements_are_closed_at_finish() {
        let (mut errors, seen) = recording_sink();
        let mut arena = arena(8);
        arena.open_element(ElementConfig::new(), &mut errors);
        arena.open_element(ElementConfig::new(), &mut errors);
        assert_eq!(arena.finish_declaration(&mut errors), 2);
        assert_eq!(arena.children(1), &[2]);
        assert_eq!(*seen.borrow(), vec![LayoutError::UnclosedElements { count: 2 }]);
    }

    #[test]
    fn duplicate_id_falls_back_to_generated_id() {
        let (mut errors, seen) = recording_sink();
        let mut arena = arena(8);
        let id = ElementId::new("dup");
        arena.open_element(ElementConfig::new().id(id), &mut errors);
        arena.close_element(&mut errors);
        arena.open_element(ElementConfig::new().id(id), &mut errors);
        arena.close_element(&mut errors);
        arena.finish_declaration(&mut errors);

        assert_eq!(arena.elements[1].id, id);
        assert_ne!(arena.elements[2].id, id);
        assert_eq!(*seen.borrow(), vec![LayoutError::DuplicateId { id }]);
    }

    #[test]
    fn malformed_sizing_is_clamped() {
        let (mut errors, seen) = recording_sink();
        let mut arena = arena(8);
        arena.open_element(
            ElementConfig::new()
                .width(SizingAxis::fit_between(50.0, 10.0))
                .height(SizingAxis::percent(1.5)),
            &mut errors,
        );
        arena.close_element(&mut errors);
        arena.finish_declaration(&mut errors);

        let sizing = arena.elements[1].config.layout.sizing;
        assert_eq!(sizing.width, SizingAxis::fit_between(50.0, 50.0));
        assert_eq!(sizing.height, SizingAxis::percent(1.0));
        assert!(seen.borrow().iter().all(|e| e.kind() == ErrorKind::Data));
        assert_eq!(seen.borrow().len(), 2);
    }

    #[test]
    fn floating_elements_become_roots_clipped_by_scroll_ancestor() {
        let (mut errors, seen) = recording_sink();
        let mut arena = arena(8);
        arena.open_element(
            ElementConfig::new().id(ElementId::new("list")).scroll(ScrollAxes::VERTICAL),
            &mut errors,
        );
        arena.open_element(
            ElementConfig::new().floating(FloatingConfig::new(AttachTo::Parent).z_index(3)),
            &mut errors,
        );
        arena.close_element(&mut errors);
        arena.open_element(
            ElementConfig::new().floating(FloatingConfig::new(AttachTo::Element(ElementId::new("missing")))),
            &mut errors,
        );
        arena.close_element(&mut errors);
        arena.close_element(&mut errors);
        arena.finish_declaration(&mut errors);

        assert!(arena.children(1).is_empty());
        assert_eq!(arena.roots.len(), 3);
        assert_eq!(arena.roots[1].attach_to, 1);
        assert_eq!(arena.roots[1].z_index, 3);
        assert_eq!(arena.roots[1].clip, Some(1));
        assert_eq!(arena.roots[2].attach_to, 1);
        assert!(matches!(
            seen.borrow()[0],
            LayoutError::FloatingTargetNotFound { .. }
        ));
    }
}
