use glam::Vec2;

use crate::style::{Axis, BoundingBox, Dimensions, LayoutStateTree};
use crate::ui::ElementId;
use crate::view::arena::FrameArena;
use crate::view::scroll::ScrollStates;

/// One element's hit area, clipped by the scroll containers above it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct HitEntry {
    pub id: ElementId,
    pub bounding_box: BoundingBox,
    pub clip: Option<BoundingBox>,
}

impl HitEntry {
    pub(crate) fn contains(&self, point: Vec2) -> bool {
        self.bounding_box.contains(point) && self.clip.is_none_or(|clip| clip.contains(point))
    }
}

/// Hit areas of one root, in depth-first declaration order.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct HitLayer {
    pub capture: bool,
    pub entries: Vec<HitEntry>,
}

impl FrameArena {
    /// Assigns every element its final box and returns the roots in paint
    /// order: ascending z-index, declaration order among equals.
    pub(crate) fn position(&mut self, scroll: &mut ScrollStates, frame: u64) -> Vec<usize> {
        for root in 0..self.roots.len() {
            self.position_root(root);
            let element = self.roots[root].element as usize;
            self.position_children(element, scroll, frame);
        }
        let mut order: Vec<usize> = (0..self.roots.len()).collect();
        order.sort_by_key(|&root| self.roots[root].z_index);
        order
    }

    fn position_root(&mut self, root: usize) {
        let root = self.roots[root];
        let index = root.element as usize;
        let element = &self.elements[index];
        let size = element.dimensions;
        let origin = match element.config.floating {
            Some(floating) if index != 0 => {
                let target = self.elements[root.attach_to as usize].bounding_box;
                let expand = Vec2::new(floating.expand.width, floating.expand.height);
                let anchor = target.origin()
                    + Vec2::new(target.width, target.height) * floating.attach_points.parent.factors();
                // attach points refer to the box before expansion
                let unexpanded = Vec2::new(size.width, size.height) - expand * 2.0;
                anchor - unexpanded * floating.attach_points.element.factors() + floating.offset - expand
            }
            _ => Vec2::ZERO,
        };
        self.elements[index].bounding_box = BoundingBox::from_origin(origin, size);
    }

    fn position_children(&mut self, index: usize, scroll: &mut ScrollStates, frame: u64) {
        let element = &self.elements[index];
        let layout = element.config.layout;
        let bounding_box = element.bounding_box;
        let axes = element.config.scroll;
        let id = element.id;
        let span = element.children;
        let per_line = layout.wrap && !element.lines.is_empty();
        let primary = layout.direction.primary_axis();
        let cross = primary.other();
        let gap = layout.child_gap;

        let lines = self.lines_of(index);
        let extents: Vec<(f32, f32)> = lines
            .iter()
            .map(|line| {
                let start = (span.start + line.first) as usize;
                let children = &self.child_indices[start..start + line.count as usize];
                let mut main = gap * children.len().saturating_sub(1) as f32;
                let mut line_cross = 0.0f32;
                for &child in children {
                    let child = &self.elements[child as usize].dimensions;
                    main += child.along(primary);
                    line_cross = line_cross.max(child.along(cross));
                }
                (main, line_cross)
            })
            .collect();
        let block_cross = extents.iter().map(|&(_, line_cross)| line_cross).sum::<f32>()
            + gap * extents.len().saturating_sub(1) as f32;
        let block_main = extents.iter().fold(0.0f32, |acc, &(main, _)| acc.max(main));

        let padding = layout.padding;
        let mut scroll_offset = Vec2::ZERO;
        if !axes.is_empty() {
            let mut content = Dimensions::ZERO;
            *content.along_mut(primary) = block_main + padding.along(primary);
            *content.along_mut(cross) = block_cross + padding.along(cross);
            scroll_offset = scroll.sync(id, axes, content, bounding_box, frame);
        }
        if span.is_empty() {
            return;
        }

        let inner = Dimensions::new(
            (bounding_box.width - padding.along(Axis::X)).max(0.0),
            (bounding_box.height - padding.along(Axis::Y)).max(0.0),
        );
        let origin = bounding_box.origin() + Vec2::new(padding.left, padding.top) - scroll_offset;
        let alignment = layout.child_alignment;

        let mut cross_cursor = if per_line {
            (inner.along(cross) - block_cross).max(0.0) * alignment.factor(cross)
        } else {
            0.0
        };
        for (line, &(line_main, line_cross)) in lines.iter().zip(&extents) {
            let line_cross = if per_line { line_cross } else { inner.along(cross) };
            let mut main_cursor = (inner.along(primary) - line_main).max(0.0) * alignment.factor(primary);
            for position in line.first..line.first + line.count {
                let child = self.child_indices[(span.start + position) as usize] as usize;
                let size = self.elements[child].dimensions;
                let cross_offset = (line_cross - size.along(cross)).max(0.0) * alignment.factor(cross);
                let offset = along_axes(primary, main_cursor, cross_cursor + cross_offset);
                self.elements[child].bounding_box = BoundingBox::from_origin(origin + offset, size);
                main_cursor += size.along(primary) + gap;
            }
            cross_cursor += line_cross + gap;
        }

        for position in span.range() {
            let child = self.child_indices[position] as usize;
            self.position_children(child, scroll, frame);
        }
    }

    pub(crate) fn record_states(&self, tree: &mut LayoutStateTree) {
        tree.clear();
        for element in &self.elements {
            tree.insert(element.id, element.bounding_box);
        }
    }

    /// Hit areas grouped per root, in the given paint order.
    pub(crate) fn hit_layers(&self, order: &[usize]) -> Vec<HitLayer> {
        order
            .iter()
            .map(|&root| {
                let root = self.roots[root];
                let clip = root
                    .clip
                    .map(|container| self.elements[container as usize].bounding_box);
                let mut entries = Vec::new();
                self.collect_hits(root.element as usize, clip, &mut entries);
                HitLayer {
                    capture: root.capture,
                    entries,
                }
            })
            .collect()
    }

    fn collect_hits(&self, index: usize, clip: Option<BoundingBox>, out: &mut Vec<HitEntry>) {
        let element = &self.elements[index];
        out.push(HitEntry {
            id: element.id,
            bounding_box: element.bounding_box,
            clip,
        });
        let child_clip = if element.config.scroll.is_empty() {
            clip
        } else {
            Some(match clip {
                Some(clip) => clip.intersection(&element.bounding_box),
                None => element.bounding_box,
            })
        };
        for &child in self.children(index) {
            self.collect_hits(child as usize, child_clip, out);
        }
    }
}

fn along_axes(primary: Axis, main: f32, cross: f32) -> Vec2 {
    match primary {
        Axis::X => Vec2::new(main, cross),
        Axis::Y => Vec2::new(cross, main),
    }
}
