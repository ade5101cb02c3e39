use thiserror::Error;

use crate::ui::ElementId;
use crate::view::Phase;

/// Coarse classification handed to error handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A fixed-size internal store ran out; the offending item was skipped.
    Capacity,
    /// The host called the engine incorrectly; output is best-effort.
    Usage,
    /// Malformed configuration; the value was clamped to a safe one.
    Data,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("element capacity of {capacity} exceeded, further elements are skipped this frame")]
    ElementCapacityExceeded { capacity: usize },
    #[error("text measurement cache holds {capacity} entries, new results are not cached")]
    MeasureCacheCapacityExceeded { capacity: usize },
    #[error("close_element called without a matching open_element")]
    UnbalancedClose,
    #[error("{count} element(s) were still open when the declaration ended")]
    UnclosedElements { count: usize },
    #[error("`{operation}` is not allowed in phase {phase:?}")]
    PhaseOrder { operation: &'static str, phase: Phase },
    #[error("element {id:?}: sizing min {min} exceeds max {max}, max raised to min")]
    InvalidSizing { id: ElementId, min: f32, max: f32 },
    #[error("element {id:?}: percent {value} is outside [0, 1]")]
    InvalidPercent { id: ElementId, value: f32 },
    #[error("element {id:?}: {field} of {value} is not a non-negative length, using 0")]
    NegativeLength {
        id: ElementId,
        field: &'static str,
        value: f32,
    },
    #[error("element id {id:?} was declared twice in one frame")]
    DuplicateId { id: ElementId },
    #[error("floating element {id:?} targets {target:?}, which was not declared before it")]
    FloatingTargetNotFound { id: ElementId, target: ElementId },
}

impl LayoutError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ElementCapacityExceeded { .. } | Self::MeasureCacheCapacityExceeded { .. } => {
                ErrorKind::Capacity
            }
            Self::UnbalancedClose | Self::UnclosedElements { .. } | Self::PhaseOrder { .. } => {
                ErrorKind::Usage
            }
            Self::InvalidSizing { .. }
            | Self::InvalidPercent { .. }
            | Self::NegativeLength { .. }
            | Self::DuplicateId { .. }
            | Self::FloatingTargetNotFound { .. } => ErrorKind::Data,
        }
    }
}

pub type Result<T> = std::result::Result<T, LayoutError>;

pub type ErrorHandler = Box<dyn FnMut(&LayoutError)>;

/// Forwards every reported error to the host's handler.
pub(crate) struct ErrorSink {
    handler: ErrorHandler,
    reported: usize,
}

impl ErrorSink {
    pub(crate) fn new() -> Self {
        Self {
            handler: Box::new(|error: &LayoutError| log::warn!("{:?} error: {}", error.kind(), error)),
            reported: 0,
        }
    }

    pub(crate) fn set_handler(&mut self, handler: ErrorHandler) {
        self.handler = handler;
    }

    pub(crate) fn report(&mut self, error: LayoutError) {
        self.reported += 1;
        (self.handler)(&error);
    }

    pub(crate) fn reported(&self) -> usize {
        self.reported
    }
}
