use glam::Vec2;

/// Button state of the pointer relative to the previous `set_pointer_state` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PointerPhase {
    PressedThisFrame,
    Pressed,
    ReleasedThisFrame,
    #[default]
    Released,
}

impl PointerPhase {
    pub(crate) const fn advance(self, is_down: bool) -> Self {
        match (self.is_down(), is_down) {
            (true, true) => Self::Pressed,
            (false, true) => Self::PressedThisFrame,
            (true, false) => Self::ReleasedThisFrame,
            (false, false) => Self::Released,
        }
    }

    pub const fn is_down(self) -> bool {
        matches!(self, Self::PressedThisFrame | Self::Pressed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerState {
    pub position: Vec2,
    pub phase: PointerPhase,
}

#[cfg(test)]
mod tests {
    use super::PointerPhase;

    #[test]
    fn press_and_release_edges_last_one_update() {
        let mut phase = PointerPhase::Released;
        phase = phase.advance(true);
        assert_eq!(phase, PointerPhase::PressedThisFrame);
        phase = phase.advance(true);
        assert_eq!(phase, PointerPhase::Pressed);
        phase = phase.advance(false);
        assert_eq!(phase, PointerPhase::ReleasedThisFrame);
        phase = phase.advance(false);
        assert_eq!(phase, PointerPhase::Released);
    }
}
