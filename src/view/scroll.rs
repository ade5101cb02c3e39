use glam::Vec2;
use rustc_hash::FxHashMap;

use crate::style::{Axis, BoundingBox, Dimensions, ScrollAxes};
use crate::ui::{ElementId, PointerPhase, PointerState};
use crate::view::sizing::clamp;

const MOMENTUM_DECAY: f32 = 0.95;
/// Momentum is dropped once it would move the content less than this per update.
const MOMENTUM_CUTOFF_PX: f32 = 0.1;

/// Snapshot of a scroll container as of the last positioning pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollContainerData {
    /// Distance the content is scrolled; positive values reveal content
    /// further right/down.
    pub offset: Vec2,
    pub content_size: Dimensions,
    pub viewport: BoundingBox,
    pub axes: ScrollAxes,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct DragAnchor {
    pointer: Vec2,
    offset: Vec2,
}

#[derive(Debug, Clone, PartialEq)]
struct ScrollState {
    offset: Vec2,
    content_size: Dimensions,
    viewport: BoundingBox,
    axes: ScrollAxes,
    last_seen_frame: u64,
    drag: Option<DragAnchor>,
    /// Pixels per second, carried on after a drag is released.
    momentum: Vec2,
}

impl ScrollState {
    fn new() -> Self {
        Self {
            offset: Vec2::ZERO,
            content_size: Dimensions::ZERO,
            viewport: BoundingBox::default(),
            axes: ScrollAxes::empty(),
            last_seen_frame: 0,
            drag: None,
            momentum: Vec2::ZERO,
        }
    }

    fn max_offset(&self, axis: Axis) -> f32 {
        (self.content_size.along(axis) - self.viewport.dimensions().along(axis)).max(0.0)
    }

    fn clamped(&self, offset: Vec2) -> Vec2 {
        let clamp_axis = |value: f32, axis: Axis| {
            if !self.axes.scrolls(axis) || value.is_nan() {
                0.0
            } else {
                clamp(value, 0.0, self.max_offset(axis))
            }
        };
        Vec2::new(clamp_axis(offset.x, Axis::X), clamp_axis(offset.y, Axis::Y))
    }

    /// Whether moving by `delta` along some axis would change the offset.
    fn can_move(&self, delta: Vec2) -> bool {
        self.clamped(self.offset - delta) != self.offset
    }

    fn data(&self) -> ScrollContainerData {
        ScrollContainerData {
            offset: self.offset,
            content_size: self.content_size,
            viewport: self.viewport,
            axes: self.axes,
        }
    }
}

pub(crate) struct ScrollInput<'a> {
    pub pointer: PointerState,
    /// Hovered element ids, innermost first.
    pub hovered: &'a [ElementId],
    pub enable_drag: bool,
    pub wheel_delta: Vec2,
    pub delta_time: f32,
}

/// Scroll offsets that outlive a frame, keyed by container id.
///
/// Entries are created the first time a container is positioned (or an offset
/// is injected) and are only dropped by an explicit reset.
#[derive(Debug, Default)]
pub(crate) struct ScrollStates {
    states: FxHashMap<ElementId, ScrollState>,
}

impl ScrollStates {
    /// Records this frame's geometry for `id` and returns its clamped offset.
    pub(crate) fn sync(
        &mut self,
        id: ElementId,
        axes: ScrollAxes,
        content_size: Dimensions,
        viewport: BoundingBox,
        frame: u64,
    ) -> Vec2 {
        let state = self.states.entry(id).or_insert_with(ScrollState::new);
        state.axes = axes;
        state.content_size = content_size;
        state.viewport = viewport;
        state.last_seen_frame = frame;
        state.offset = state.clamped(state.offset);
        state.offset
    }

    pub(crate) fn update(&mut self, input: ScrollInput<'_>) {
        let dt = if input.delta_time.is_finite() {
            input.delta_time.max(0.0)
        } else {
            0.0
        };
        let pointer = input.pointer;

        for state in self.states.values_mut() {
            if let Some(anchor) = state.drag {
                if input.enable_drag && pointer.phase.is_down() {
                    let next = state.clamped(anchor.offset - (pointer.position - anchor.pointer));
                    if dt > 0.0 {
                        state.momentum = (next - state.offset) / dt;
                    }
                    state.offset = next;
                    continue;
                }
                state.drag = None;
            } else if state.momentum != Vec2::ZERO && dt > 0.0 {
                let step = state.momentum * dt;
                state.offset = state.clamped(state.offset + step);
                state.momentum *= MOMENTUM_DECAY;
                if step.length() < MOMENTUM_CUTOFF_PX {
                    state.momentum = Vec2::ZERO;
                }
            }
        }

        if input.wheel_delta != Vec2::ZERO {
            let target = input
                .hovered
                .iter()
                .find(|id| self.states.get(id).is_some_and(|state| state.can_move(input.wheel_delta)))
                .copied();
            if let Some(state) = target.and_then(|id| self.states.get_mut(&id)) {
                state.offset = state.clamped(state.offset - input.wheel_delta);
                state.momentum = Vec2::ZERO;
            }
        }

        if input.enable_drag && pointer.phase == PointerPhase::PressedThisFrame {
            let target = input
                .hovered
                .iter()
                .find(|id| self.states.get(id).is_some_and(|state| !state.axes.is_empty()))
                .copied();
            if let Some(state) = target.and_then(|id| self.states.get_mut(&id)) {
                state.drag = Some(DragAnchor {
                    pointer: pointer.position,
                    offset: state.offset,
                });
                state.momentum = Vec2::ZERO;
            }
        }
    }

    /// Stores `offset` as-is; the next positioning pass clamps it.
    pub(crate) fn set_offset(&mut self, id: ElementId, offset: Vec2) {
        let state = self.states.entry(id).or_insert_with(ScrollState::new);
        state.offset = offset;
        state.momentum = Vec2::ZERO;
    }

    pub(crate) fn offset(&self, id: ElementId) -> Option<Vec2> {
        self.states.get(&id).map(|state| state.offset)
    }

    pub(crate) fn data(&self, id: ElementId) -> Option<ScrollContainerData> {
        self.states.get(&id).map(ScrollState::data)
    }

    pub(crate) fn last_seen_frame(&self, id: ElementId) -> Option<u64> {
        self.states.get(&id).map(|state| state.last_seen_frame)
    }

    pub(crate) fn remove(&mut self, id: ElementId) -> bool {
        self.states.remove(&id).is_some()
    }

    pub(crate) fn clear(&mut self) {
        self.states.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.states.len()
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::{ScrollInput, ScrollStates};
    use crate::style::{BoundingBox, Dimensions, ScrollAxes};
    use crate::ui::{ElementId, PointerPhase, PointerState};

    fn list() -> (ScrollStates, ElementId) {
        let id = ElementId::new("list");
        let mut states = ScrollStates::default();
        states.sync(
            id,
            ScrollAxes::VERTICAL,
            Dimensions::new(100.0, 500.0),
            BoundingBox::new(0.0, 0.0, 100.0, 200.0),
            1,
        );
        (states, id)
    }

    fn input(hovered: &[ElementId], phase: PointerPhase, position: Vec2, wheel: Vec2) -> ScrollInput<'_> {
        ScrollInput {
            pointer: PointerState { position, phase },
            hovered,
            enable_drag: true,
            wheel_delta: wheel,
            delta_time: 1.0 / 60.0,
        }
    }

    #[test]
    fn sync_clamps_injected_offsets() {
        let (mut states, id) = list();
        states.set_offset(id, Vec2::new(30.0, -50.0));
        let offset = states.sync(
            id,
            ScrollAxes::VERTICAL,
            Dimensions::new(100.0, 500.0),
            BoundingBox::new(0.0, 0.0, 100.0, 200.0),
            2,
        );
        assert_eq!(offset, Vec2::ZERO);

        states.set_offset(id, Vec2::new(0.0, 9_000.0));
        let offset = states.sync(
            id,
            ScrollAxes::VERTICAL,
            Dimensions::new(100.0, 500.0),
            BoundingBox::new(0.0, 0.0, 100.0, 200.0),
            3,
        );
        assert_eq!(offset, Vec2::new(0.0, 300.0));
        assert_eq!(states.last_seen_frame(id), Some(3));
    }

    #[test]
    fn shrinking_content_snaps_offset_back() {
        let (mut states, id) = list();
        states.set_offset(id, Vec2::new(0.0, 250.0));
        let offset = states.sync(
            id,
            ScrollAxes::VERTICAL,
            Dimensions::new(100.0, 260.0),
            BoundingBox::new(0.0, 0.0, 100.0, 200.0),
            2,
        );
        assert_eq!(offset.y, 60.0);
    }

    #[test]
    fn wheel_scrolls_the_hovered_container() {
        let (mut states, id) = list();
        states.update(input(&[id], PointerPhase::Released, Vec2::ZERO, Vec2::new(0.0, -40.0)));
        assert_eq!(states.offset(id), Some(Vec2::new(0.0, 40.0)));

        states.update(input(&[id], PointerPhase::Released, Vec2::ZERO, Vec2::new(0.0, 100.0)));
        assert_eq!(states.offset(id), Some(Vec2::ZERO));
    }

    #[test]
    fn wheel_skips_containers_that_cannot_move() {
        let (mut states, outer) = list();
        let inner = ElementId::new("inner");
        states.sync(
            inner,
            ScrollAxes::VERTICAL,
            Dimensions::new(50.0, 50.0),
            BoundingBox::new(0.0, 0.0, 50.0, 100.0),
            1,
        );
        states.update(input(&[inner, outer], PointerPhase::Released, Vec2::ZERO, Vec2::new(0.0, -10.0)));
        assert_eq!(states.offset(inner), Some(Vec2::ZERO));
        assert_eq!(states.offset(outer), Some(Vec2::new(0.0, 10.0)));
    }

    #[test]
    fn drag_moves_content_with_pointer_then_coasts() {
        let (mut states, id) = list();
        let hovered = [id];
        states.update(input(&hovered, PointerPhase::PressedThisFrame, Vec2::new(10.0, 150.0), Vec2::ZERO));
        states.update(input(&hovered, PointerPhase::Pressed, Vec2::new(10.0, 120.0), Vec2::ZERO));
        assert_eq!(states.offset(id), Some(Vec2::new(0.0, 30.0)));

        states.update(input(&hovered, PointerPhase::ReleasedThisFrame, Vec2::new(10.0, 120.0), Vec2::ZERO));
        states.update(input(&hovered, PointerPhase::Released, Vec2::new(10.0, 120.0), Vec2::ZERO));
        let coasted = states.offset(id).map(|offset| offset.y).unwrap_or_default();
        assert!(coasted > 30.0);
        assert!(coasted <= 300.0);
    }
}
