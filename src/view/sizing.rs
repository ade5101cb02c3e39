use crate::style::{Axis, Dimensions, SizingAxis};
use crate::ui::ErrorSink;
use crate::view::arena::{FrameArena, LayoutElement, Span, WrapLine};
use crate::view::text::{EPSILON, measure_text_run, wrap_text_run};
use crate::view::text_cache::TextMeasureCache;

impl FrameArena {
    /// Post-order pass: every element's preferred and minimum size from its
    /// content. Children always have higher indices than their parent, so a
    /// reverse sweep visits them first.
    pub(crate) fn solve_fit(&mut self, cache: &mut TextMeasureCache, errors: &mut ErrorSink) {
        for text in &mut self.texts {
            let metrics = measure_text_run(&text.content, &text.config, cache, errors);
            text.unwrapped = metrics.unwrapped;
            text.min_width = metrics.min_width;
            text.line_height = metrics.line_height;
        }

        self.fit_axes(&[Axis::X, Axis::Y]);
    }

    fn fit_axes(&mut self, axes: &[Axis]) {
        for index in (0..self.elements.len()).rev() {
            let (content, content_min) = self.fit_content(index);
            let element = &mut self.elements[index];
            let sizing = element.config.layout.sizing;
            for &axis in axes {
                let (size, min) = fit_axis(sizing.along(axis), content.along(axis), content_min.along(axis));
                *element.dimensions.along_mut(axis) = size;
                *element.min_dimensions.along_mut(axis) = min;
            }
        }
    }

    /// Pre-order pass: widths first, then text wrapping at the final widths,
    /// then heights, which may depend on the wrapped line count.
    ///
    /// A wrapping column only learns its lines once its height is known. When
    /// any column breaks into several lines, widths are refitted from those
    /// lines and the whole pass runs again.
    pub(crate) fn solve_grow(&mut self, cache: &mut TextMeasureCache, errors: &mut ErrorSink) {
        self.grow_pass(cache, errors);
        if self.has_wrapped_columns() {
            self.fit_axes(&[Axis::X]);
            self.grow_pass(cache, errors);
        }
    }

    fn grow_pass(&mut self, cache: &mut TextMeasureCache, errors: &mut ErrorSink) {
        self.distribute_axis(Axis::X);
        self.wrap_texts(cache, errors);
        self.propagate_heights();
        self.distribute_axis(Axis::Y);
    }

    fn has_wrapped_columns(&self) -> bool {
        self.elements.iter().any(|element| {
            let layout = &element.config.layout;
            layout.wrap && layout.direction.primary_axis() == Axis::Y && element.lines.len > 1
        })
    }

    fn distribute_axis(&mut self, axis: Axis) {
        for index in 0..self.elements.len() {
            if self.elements[index].root.is_some() {
                self.size_floating_root(index, axis);
            }
            self.distribute_children(index, axis);
        }
    }

    fn size_floating_root(&mut self, index: usize, axis: Axis) {
        let element = &self.elements[index];
        let (Some(root), Some(floating)) = (element.root, element.config.floating) else {
            return;
        };
        let target = self.roots[root as usize].attach_to as usize;
        let target_size = self.elements[target].dimensions.along(axis);

        let element = &mut self.elements[index];
        let size = element.dimensions.along_mut(axis);
        match element.config.layout.sizing.along(axis) {
            SizingAxis::Grow { min, max } => *size = clamp(target_size, min, max),
            SizingAxis::Percent(fraction) => *size = target_size * fraction,
            SizingAxis::Fixed(px) => *size = px,
            SizingAxis::Fit { .. } => {}
        }
        *size += floating.expand.along(axis) * 2.0;
    }

    fn distribute_children(&mut self, index: usize, axis: Axis) {
        let element = &self.elements[index];
        if element.children.is_empty() {
            return;
        }
        let layout = element.config.layout;
        let scrolls = element.config.scroll.scrolls(axis);
        let inner = (element.dimensions.along(axis) - layout.padding.along(axis)).max(0.0);
        let is_primary = layout.direction.primary_axis() == axis;
        if is_primary && layout.wrap {
            self.break_lines(index, axis, inner);
        }
        let per_line = layout.wrap && !self.elements[index].lines.is_empty();
        let span = self.elements[index].children;

        for line in self.lines_of(index) {
            let start = (span.start + line.first) as usize;
            let children = &self.child_indices[start..start + line.count as usize];
            let elements = &mut self.elements;
            if is_primary {
                let gaps = layout.child_gap * children.len().saturating_sub(1) as f32;
                distribute_primary(elements, children, axis, inner - gaps, scrolls);
            } else {
                distribute_cross(elements, children, axis, inner, scrolls, per_line);
            }
        }
    }

    /// Greedy assignment of children to lines by their minimum size.
    fn break_lines(&mut self, index: usize, axis: Axis, inner: f32) {
        let element = &self.elements[index];
        let gap = element.config.layout.child_gap;
        let first_line = self.wrap_lines.len();
        let mut line_start = 0u32;
        let mut count = 0u32;
        let mut line_min = 0.0f32;

        for (position, &child) in self.child_indices[element.children.range()].iter().enumerate() {
            let child = &self.elements[child as usize];
            let child_min = match child.config.layout.sizing.along(axis) {
                SizingAxis::Percent(fraction) => inner * fraction,
                _ => child.min_dimensions.along(axis),
            };
            let next = if count == 0 {
                child_min
            } else {
                line_min + gap + child_min
            };
            if count > 0 && next > inner + EPSILON {
                self.wrap_lines.push(WrapLine {
                    first: line_start,
                    count,
                });
                line_start = position as u32;
                count = 0;
                line_min = child_min;
            } else {
                line_min = next;
            }
            count += 1;
        }
        if count > 0 {
            self.wrap_lines.push(WrapLine {
                first: line_start,
                count,
            });
        }
        self.elements[index].lines = Span::new(first_line, self.wrap_lines.len() - first_line);
    }

    fn wrap_texts(&mut self, cache: &mut TextMeasureCache, errors: &mut ErrorSink) {
        for element in &self.elements {
            let Some(text) = element.text else {
                continue;
            };
            let text = &mut self.texts[text as usize];
            let start = self.wrapped_lines.len();
            let count = wrap_text_run(
                &text.content,
                &text.config,
                element.dimensions.width,
                cache,
                errors,
                &mut self.wrapped_lines,
            );
            text.lines = Span::new(start, count);
        }
    }

    /// Refits heights bottom-up now that text runs know their line count.
    fn propagate_heights(&mut self) {
        for index in (0..self.elements.len()).rev() {
            if let Some(text) = self.elements[index].text {
                let text = &self.texts[text as usize];
                let height = text.line_height * text.lines.len as f32;
                let element = &mut self.elements[index];
                element.dimensions.height = height;
                element.min_dimensions.height = height;
                continue;
            }

            let element = &self.elements[index];
            let sizing = element.config.layout.sizing.height;
            if !sizing.is_resizable() {
                continue;
            }
            let (content, content_min) = self.fit_content(index);
            let content_height = match element.config.image {
                Some(image) if element.children.is_empty() => image
                    .height_for_width(element.dimensions.width)
                    .unwrap_or(content.height),
                _ => content.height,
            };
            let (height, min_height) = fit_axis(sizing, content_height, content_min.height);
            let element = &mut self.elements[index];
            element.dimensions.height = height;
            element.min_dimensions.height = min_height;
        }
    }

    /// Preferred and minimum content extent of `index`, padding included.
    fn fit_content(&self, index: usize) -> (Dimensions, Dimensions) {
        if let Some(text) = self.text_of(index) {
            return (
                text.unwrapped,
                Dimensions::new(text.min_width, text.unwrapped.height),
            );
        }

        let element = &self.elements[index];
        let layout = &element.config.layout;
        let children = self.children(index);
        let mut content = Dimensions::ZERO;
        let mut min = Dimensions::ZERO;

        if children.is_empty() {
            if let Some(image) = element.config.image {
                content = image.source_dimensions;
            }
        } else {
            let primary = layout.direction.primary_axis();
            let cross = primary.other();

            // the primary extent is the unbroken run; lines only stack along the cross axis
            let gaps = layout.child_gap * children.len().saturating_sub(1) as f32;
            let mut main = gaps;
            let mut main_min = if layout.wrap { 0.0 } else { gaps };
            for &child in children {
                let child = &self.elements[child as usize];
                main += child.dimensions.along(primary);
                main_min = if layout.wrap {
                    main_min.max(child.min_dimensions.along(primary))
                } else {
                    main_min + child.min_dimensions.along(primary)
                };
            }
            *content.along_mut(primary) = main;
            *min.along_mut(primary) = main_min;

            let lines = self.lines_of(index);
            for line in &lines {
                let line_children = &children[line.first as usize..(line.first + line.count) as usize];
                let mut line_cross = 0.0f32;
                let mut line_cross_min = 0.0f32;
                for &child in line_children {
                    let child = &self.elements[child as usize];
                    line_cross = line_cross.max(child.dimensions.along(cross));
                    line_cross_min = line_cross_min.max(child.min_dimensions.along(cross));
                }
                *content.along_mut(cross) += line_cross;
                *min.along_mut(cross) += line_cross_min;
            }
            let line_gaps = layout.child_gap * lines.len().saturating_sub(1) as f32;
            *content.along_mut(cross) += line_gaps;
            *min.along_mut(cross) += line_gaps;
        }

        for axis in [Axis::X, Axis::Y] {
            let padding = layout.padding.along(axis);
            *content.along_mut(axis) += padding;
            // scrolled content never forces the container open
            *min.along_mut(axis) = if element.config.scroll.scrolls(axis) {
                padding
            } else {
                min.along(axis) + padding
            };
        }
        (content, min)
    }
}

fn fit_axis(sizing: SizingAxis, content: f32, content_min: f32) -> (f32, f32) {
    match sizing {
        SizingAxis::Fixed(px) => (px, px),
        SizingAxis::Fit { min, max } | SizingAxis::Grow { min, max } => {
            (clamp(content, min, max), clamp(content_min, min, max))
        }
        SizingAxis::Percent(_) => (0.0, 0.0),
    }
}

/// Like `f32::clamp`, but never panics on inverted bounds.
pub(crate) fn clamp(value: f32, min: f32, max: f32) -> f32 {
    value.max(min).min(max)
}

fn distribute_primary(
    elements: &mut [LayoutElement],
    children: &[u32],
    axis: Axis,
    available: f32,
    scrolls: bool,
) {
    let basis = available.max(0.0);
    for &child in children {
        let child = &mut elements[child as usize];
        if let SizingAxis::Percent(fraction) = child.config.layout.sizing.along(axis) {
            *child.dimensions.along_mut(axis) = basis * fraction;
        }
    }

    let used: f32 = children
        .iter()
        .map(|&child| elements[child as usize].dimensions.along(axis))
        .sum();
    let free = available - used;
    if free > EPSILON {
        grow_children(elements, children, axis, free);
    } else if free < -EPSILON && !scrolls {
        shrink_children(elements, children, axis, -free);
    }
}

/// Hands out `free` in equal shares, dropping children that reach their max.
fn grow_children(elements: &mut [LayoutElement], children: &[u32], axis: Axis, free: f32) {
    let can_grow = |element: &LayoutElement| {
        let sizing = element.config.layout.sizing.along(axis);
        sizing.is_grow() && element.dimensions.along(axis) < sizing.max_size() - EPSILON
    };
    let mut eligible: Vec<u32> = children
        .iter()
        .copied()
        .filter(|&child| can_grow(&elements[child as usize]))
        .collect();

    let mut remaining = free;
    while remaining > EPSILON && !eligible.is_empty() {
        let share = remaining / eligible.len() as f32;
        for &child in &eligible {
            let element = &mut elements[child as usize];
            let max = element.config.layout.sizing.along(axis).max_size();
            let size = element.dimensions.along_mut(axis);
            let added = share.min(max - *size).max(0.0);
            *size += added;
            remaining -= added;
        }
        eligible.retain(|&child| can_grow(&elements[child as usize]));
    }
}

/// Takes `excess` back in equal shares, never below a child's minimum.
fn shrink_children(elements: &mut [LayoutElement], children: &[u32], axis: Axis, excess: f32) {
    let can_shrink = |element: &LayoutElement| {
        element.config.layout.sizing.along(axis).is_resizable()
            && element.dimensions.along(axis) > element.min_dimensions.along(axis) + EPSILON
    };
    let mut eligible: Vec<u32> = children
        .iter()
        .copied()
        .filter(|&child| can_shrink(&elements[child as usize]))
        .collect();

    let mut remaining = excess;
    while remaining > EPSILON && !eligible.is_empty() {
        let share = remaining / eligible.len() as f32;
        for &child in &eligible {
            let element = &mut elements[child as usize];
            let min = element.min_dimensions.along(axis);
            let size = element.dimensions.along_mut(axis);
            let removed = share.min(*size - min).max(0.0);
            *size -= removed;
            remaining -= removed;
        }
        eligible.retain(|&child| can_shrink(&elements[child as usize]));
    }
}

fn distribute_cross(
    elements: &mut [LayoutElement],
    children: &[u32],
    axis: Axis,
    inner: f32,
    scrolls: bool,
    per_line: bool,
) {
    let line_cross = if per_line {
        children
            .iter()
            .map(|&child| &elements[child as usize])
            .filter(|child| !matches!(child.config.layout.sizing.along(axis), SizingAxis::Percent(_)))
            .fold(0.0f32, |acc, child| acc.max(child.dimensions.along(axis)))
    } else {
        inner
    };

    for &child in children {
        let child = &mut elements[child as usize];
        let sizing = child.config.layout.sizing.along(axis);
        let min_size = child.min_dimensions.along(axis);
        let size = child.dimensions.along_mut(axis);
        match sizing {
            SizingAxis::Fixed(_) => {}
            SizingAxis::Percent(fraction) => *size = inner * fraction,
            SizingAxis::Grow { max, .. } => {
                let limit = if scrolls { line_cross.max(*size) } else { line_cross };
                *size = clamp(limit, min_size, max);
            }
            SizingAxis::Fit { .. } => {
                if !per_line && !scrolls {
                    *size = size.min(inner).max(min_size);
                }
            }
        }
    }
}
