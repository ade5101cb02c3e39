use std::sync::OnceLock;

use glam::Vec2;
use smol_str::SmolStr;

use crate::style::{BoundingBox, Dimensions, ElementConfig, LayoutStateTree, TextConfig};
use crate::ui::{ElementId, EngineConfig, ErrorSink, LayoutError, PointerState, Result};
use crate::view::arena::FrameArena;
use crate::view::position::HitLayer;
use crate::view::render_command::RenderCommand;
use crate::view::scroll::{ScrollContainerData, ScrollInput, ScrollStates};
use crate::view::text_cache::{MeasureCacheStats, MeasureText, TextMeasureCache};

/// Where the engine is within the current frame.
///
/// Each solver phase may only run directly after its predecessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Phase {
    #[default]
    Idle,
    Building,
    FitSolved,
    GrowSolved,
    Positioned,
    Emitted,
}

impl Phase {
    /// Outside a frame: input may be fed and a new frame begun.
    pub const fn is_between_frames(self) -> bool {
        matches!(self, Self::Idle | Self::Emitted)
    }
}

pub struct LayoutEngine {
    config: EngineConfig,
    phase: Phase,
    frame: u64,
    arena: FrameArena,
    measure_cache: TextMeasureCache,
    errors: ErrorSink,
    scroll: ScrollStates,
    paint_order: Vec<usize>,
    commands: Vec<RenderCommand>,
    /// Boxes of the last positioned frame.
    layout_states: LayoutStateTree,
    hit_layers: Vec<HitLayer>,
    pointer: PointerState,
    /// Topmost layer first, innermost element first.
    pointer_over: Vec<ElementId>,
}

impl LayoutEngine {
    pub fn new(config: EngineConfig, measure: impl MeasureText + 'static) -> Self {
        Self {
            arena: FrameArena::with_capacity(config.max_element_count),
            measure_cache: TextMeasureCache::new(measure, config.max_measure_cache_entries),
            config,
            phase: Phase::Idle,
            frame: 0,
            errors: ErrorSink::new(),
            scroll: ScrollStates::default(),
            paint_order: Vec::new(),
            commands: Vec::new(),
            layout_states: LayoutStateTree::new(),
            hit_layers: Vec::new(),
            pointer: PointerState::default(),
            pointer_over: Vec::new(),
        }
    }

    pub fn set_error_handler(&mut self, handler: impl FnMut(&LayoutError) + 'static) {
        self.errors.set_handler(Box::new(handler));
    }

    /// Swaps the text measurement callback; cached results are discarded.
    pub fn set_measure_text(&mut self, measure: impl MeasureText + 'static) {
        self.measure_cache.set_measure(measure);
    }

    pub fn reset_measure_text_cache(&mut self) {
        self.measure_cache.clear();
    }

    pub fn measure_cache_stats(&self) -> MeasureCacheStats {
        self.measure_cache.stats()
    }

    /// Takes effect at the next [`begin_layout`](Self::begin_layout).
    pub fn set_layout_dimensions(&mut self, dimensions: Dimensions) {
        self.config.layout_dimensions = dimensions;
    }

    pub fn layout_dimensions(&self) -> Dimensions {
        self.config.layout_dimensions
    }

    pub fn set_culling_enabled(&mut self, enabled: bool) {
        self.config.culling_enabled = enabled;
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // --- input, between frames ---

    /// Hit-tests `position` against the previous frame and advances the
    /// pointer's press state.
    pub fn set_pointer_state(&mut self, position: Vec2, is_down: bool) {
        if !self.allowed_between_frames("set_pointer_state") {
            return;
        }
        self.pointer = PointerState {
            position,
            phase: self.pointer.phase.advance(is_down),
        };
        self.pointer_over.clear();
        for layer in self.hit_layers.iter().rev() {
            for entry in layer.entries.iter().rev() {
                if entry.contains(position) {
                    self.pointer_over.push(entry.id);
                }
            }
            let over_root = layer.entries.first().is_some_and(|root| root.contains(position));
            if layer.capture && over_root {
                break;
            }
        }
    }

    /// Applies wheel and drag input to the scroll containers under the pointer.
    /// A positive wheel delta reveals content above or to the left.
    pub fn update_scroll_containers(&mut self, enable_drag: bool, wheel_delta: Vec2, delta_time: f32) {
        if !self.allowed_between_frames("update_scroll_containers") {
            return;
        }
        self.scroll.update(ScrollInput {
            pointer: self.pointer,
            hovered: &self.pointer_over,
            enable_drag,
            wheel_delta,
            delta_time,
        });
    }

    // --- declaration ---

    /// Starts a new frame. Calling this mid-frame abandons the unfinished frame
    /// and reports a usage error; the new frame is started either way.
    pub fn begin_layout(&mut self) -> Result<()> {
        let previous = self.phase;
        self.frame += 1;
        self.arena.reset(self.config.max_element_count);
        self.measure_cache.begin_frame();
        self.paint_order.clear();
        self.commands.clear();
        self.arena.open_root(self.config.layout_dimensions);
        self.phase = Phase::Building;
        if previous.is_between_frames() {
            Ok(())
        } else {
            Err(self.report(LayoutError::PhaseOrder {
                operation: "begin_layout",
                phase: previous,
            }))
        }
    }

    pub fn open_element(&mut self, config: ElementConfig) {
        if self.building("open_element") {
            self.arena.open_element(config, &mut self.errors);
        }
    }

    pub fn close_element(&mut self) {
        if self.building("close_element") {
            self.arena.close_element(&mut self.errors);
        }
    }

    /// Declares an element whose children are declared by `children`.
    pub fn element(&mut self, config: ElementConfig, children: impl FnOnce(&mut Self)) {
        self.open_element(config);
        children(self);
        self.close_element();
    }

    pub fn text(&mut self, content: impl Into<SmolStr>, config: TextConfig) {
        if self.building("text") {
            self.arena.add_text(content.into(), config, &mut self.errors);
        }
    }

    /// Id of the innermost open element, `None` outside a declaration.
    pub fn open_element_id(&self) -> Option<ElementId> {
        if self.phase != Phase::Building {
            return None;
        }
        self.arena.open_element_id()
    }

    /// Whether the pointer was over the currently open element last frame.
    pub fn hovered(&self) -> bool {
        self.open_element_id().is_some_and(|id| self.pointer_over(id))
    }

    // --- phases ---

    pub fn solve_fit(&mut self) -> Result<()> {
        self.expect_phase("solve_fit", Phase::Building)?;
        self.arena.finish_declaration(&mut self.errors);
        self.arena.solve_fit(&mut self.measure_cache, &mut self.errors);
        self.phase = Phase::FitSolved;
        Ok(())
    }

    pub fn solve_grow(&mut self) -> Result<()> {
        self.expect_phase("solve_grow", Phase::FitSolved)?;
        self.arena.solve_grow(&mut self.measure_cache, &mut self.errors);
        self.phase = Phase::GrowSolved;
        Ok(())
    }

    pub fn position(&mut self) -> Result<()> {
        self.expect_phase("position", Phase::GrowSolved)?;
        self.paint_order = self.arena.position(&mut self.scroll, self.frame);
        self.arena.record_states(&mut self.layout_states);
        self.hit_layers = self.arena.hit_layers(&self.paint_order);
        self.phase = Phase::Positioned;

        if trace_layout_enabled() {
            for element in &self.arena.elements {
                log::trace!(
                    target: "rflayout::layout",
                    "frame={} id={:?} box={:?} min={:?}",
                    self.frame,
                    element.id,
                    element.bounding_box,
                    element.min_dimensions
                );
            }
        }
        Ok(())
    }

    pub fn emit(&mut self) -> Result<&[RenderCommand]> {
        self.expect_phase("emit", Phase::Positioned)?;
        let dimensions = self.config.layout_dimensions;
        let viewport = BoundingBox::new(0.0, 0.0, dimensions.width, dimensions.height);
        self.arena.emit_commands(
            &self.paint_order,
            viewport,
            self.config.culling_enabled,
            &mut self.commands,
        );
        self.phase = Phase::Emitted;
        log::debug!(
            "frame {}: {} elements, {} roots, {} render commands",
            self.frame,
            self.arena.len(),
            self.paint_order.len(),
            self.commands.len()
        );
        Ok(&self.commands)
    }

    /// Runs whichever phases remain for the current frame.
    pub fn end_layout(&mut self) -> &[RenderCommand] {
        if self.phase.is_between_frames() {
            self.report(LayoutError::PhaseOrder {
                operation: "end_layout",
                phase: self.phase,
            });
            return &self.commands;
        }
        // every step below only runs in the phase its predecessor leaves behind
        if self.phase == Phase::Building {
            let _ = self.solve_fit();
        }
        if self.phase == Phase::FitSolved {
            let _ = self.solve_grow();
        }
        if self.phase == Phase::GrowSolved {
            let _ = self.position();
        }
        if self.phase == Phase::Positioned {
            let _ = self.emit();
        }
        &self.commands
    }

    /// Commands of the last emitted frame.
    pub fn render_commands(&self) -> &[RenderCommand] {
        &self.commands
    }

    // --- queries ---

    pub fn pointer_over(&self, id: ElementId) -> bool {
        self.pointer_over.contains(&id)
    }

    pub fn pointer_over_ids(&self) -> &[ElementId] {
        &self.pointer_over
    }

    pub fn pointer_state(&self) -> PointerState {
        self.pointer
    }

    /// Box of `id` in the last positioned frame.
    pub fn element_data(&self, id: ElementId) -> Option<BoundingBox> {
        self.layout_states.get(id).copied()
    }

    pub fn scroll_container_data(&self, id: ElementId) -> Option<ScrollContainerData> {
        self.scroll.data(id)
    }

    pub fn scroll_offset(&self, id: ElementId) -> Option<Vec2> {
        self.scroll.offset(id)
    }

    /// Overrides the offset of `id`; it is clamped the next time the container
    /// is positioned.
    pub fn set_scroll_offset(&mut self, id: ElementId, offset: Vec2) {
        self.scroll.set_offset(id, offset);
    }

    /// Forgets the scroll state of one container, e.g. after it was removed.
    pub fn remove_scroll_state(&mut self, id: ElementId) -> bool {
        self.scroll.remove(id)
    }

    pub fn reset_scroll_state(&mut self) {
        self.scroll.clear();
    }

    /// Whether `id` was positioned as a scroll container in the latest frame.
    pub fn scroll_container_active(&self, id: ElementId) -> bool {
        self.scroll.last_seen_frame(id) == Some(self.frame)
    }

    pub fn scroll_container_count(&self) -> usize {
        self.scroll.len()
    }

    /// Number of the current (or last) frame; starts at 1.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Errors reported through the handler since the engine was created.
    pub fn reported_error_count(&self) -> usize {
        self.errors.reported()
    }

    fn report(&mut self, error: LayoutError) -> LayoutError {
        self.errors.report(error.clone());
        error
    }

    fn expect_phase(&mut self, operation: &'static str, expected: Phase) -> Result<()> {
        if self.phase == expected {
            return Ok(());
        }
        Err(self.report(LayoutError::PhaseOrder {
            operation,
            phase: self.phase,
        }))
    }

    fn building(&mut self, operation: &'static str) -> bool {
        self.expect_phase(operation, Phase::Building).is_ok()
    }

    fn allowed_between_frames(&mut self, operation: &'static str) -> bool {
        if self.phase.is_between_frames() {
            return true;
        }
        self.report(LayoutError::PhaseOrder {
            operation,
            phase: self.phase,
        });
        false
    }
}

fn trace_layout_enabled() -> bool {
    static ENABLED: OnceLock<bool> = OnceLock::new();
    *ENABLED.get_or_init(|| std::env::var("RFLAYOUT_TRACE_LAYOUT").is_ok())
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;

    use super::{LayoutEngine, Phase};
    use crate::style::{Dimensions, ElementConfig, Sizing};
    use crate::ui::{EngineConfig, ErrorKind, LayoutError, PointerPhase};
    use crate::view::text_cache::EstimatedTextMeasure;

    fn engine() -> (LayoutEngine, Rc<RefCell<Vec<LayoutError>>>) {
        let mut engine = LayoutEngine::new(
            EngineConfig::new(Dimensions::new(200.0, 100.0)),
            EstimatedTextMeasure::default(),
        );
        let seen = Rc::new(RefCell::new(Vec::new()));
        let captured = seen.clone();
        engine.set_error_handler(move |error: &LayoutError| captured.borrow_mut().push(error.clone()));
        (engine, seen)
    }

    #[test]
    fn phases_advance_in_order() {
        let (mut engine, seen) = engine();
        assert_eq!(engine.phase(), Phase::Idle);
        assert!(engine.begin_layout().is_ok());
        engine.element(ElementConfig::new().sizing(Sizing::fixed(10.0, 10.0)), |_| {});
        assert!(engine.solve_fit().is_ok());
        assert!(engine.solve_grow().is_ok());
        assert!(engine.position().is_ok());
        assert!(engine.emit().is_ok());
        assert_eq!(engine.phase(), Phase::Emitted);
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn out_of_order_phase_is_rejected_and_reported() {
        let (mut engine, seen) = engine();
        engine.begin_layout().ok();
        let error = engine.position().err();
        assert_eq!(
            error,
            Some(LayoutError::PhaseOrder {
                operation: "position",
                phase: Phase::Building,
            })
        );
        assert_eq!(engine.phase(), Phase::Building);
        assert_eq!(seen.borrow().len(), 1);
        assert_eq!(seen.borrow()[0].kind(), ErrorKind::Usage);
    }

    #[test]
    fn declaring_outside_a_frame_is_ignored() {
        let (mut engine, seen) = engine();
        engine.open_element(ElementConfig::new());
        assert_eq!(seen.borrow().len(), 1);
        assert_eq!(engine.open_element_id(), None);
    }

    #[test]
    fn end_layout_finishes_remaining_phases() {
        let (mut engine, _) = engine();
        engine.begin_layout().ok();
        engine.element(
            ElementConfig::new()
                .sizing(Sizing::fixed(10.0, 10.0))
                .background(crate::style::Color::rgb(1, 2, 3)),
            |_| {},
        );
        assert_eq!(engine.end_layout().len(), 1);
        assert_eq!(engine.phase(), Phase::Emitted);
    }

    #[test]
    fn pointer_hits_use_previous_frame_boxes() {
        let (mut engine, _) = engine();
        let id = crate::ui::ElementId::new("button");
        engine.begin_layout().ok();
        engine.element(ElementConfig::new().id(id).sizing(Sizing::fixed(20.0, 20.0)), |_| {});
        engine.end_layout();

        engine.set_pointer_state(Vec2::new(5.0, 5.0), true);
        assert!(engine.pointer_over(id));
        assert_eq!(engine.pointer_state().phase, PointerPhase::PressedThisFrame);

        engine.begin_layout().ok();
        engine.element(ElementConfig::new().id(id).sizing(Sizing::fixed(20.0, 20.0)), |engine| {
            assert!(engine.hovered());
        });
        engine.end_layout();

        engine.set_pointer_state(Vec2::new(50.0, 5.0), false);
        assert!(!engine.pointer_over(id));
    }

    #[test]
    fn restarting_mid_frame_reports_but_starts_fresh() {
        let (mut engine, seen) = engine();
        engine.begin_layout().ok();
        engine.open_element(ElementConfig::new());
        assert!(engine.begin_layout().is_err());
        assert_eq!(engine.phase(), Phase::Building);
        assert_eq!(engine.open_element_id(), Some(crate::view::ROOT_ID));
        assert_eq!(seen.borrow().len(), 1);
    }
}
