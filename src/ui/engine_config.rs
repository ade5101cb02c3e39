use crate::style::Dimensions;

pub const DEFAULT_MAX_ELEMENT_COUNT: usize = 8192;
pub const DEFAULT_MAX_MEASURE_CACHE_ENTRIES: usize = 16384;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    pub layout_dimensions: Dimensions,
    /// Elements (text runs included) the per-frame arena holds before truncating.
    pub max_element_count: usize,
    pub max_measure_cache_entries: usize,
    /// Drop draw commands whose box lies entirely outside the layout viewport.
    pub culling_enabled: bool,
}

impl EngineConfig {
    pub const fn new(layout_dimensions: Dimensions) -> Self {
        Self {
            layout_dimensions,
            max_element_count: DEFAULT_MAX_ELEMENT_COUNT,
            max_measure_cache_entries: DEFAULT_MAX_MEASURE_CACHE_ENTRIES,
            culling_enabled: true,
        }
    }

    pub const fn layout_dimensions(mut self, dimensions: Dimensions) -> Self {
        self.layout_dimensions = dimensions;
        self
    }

    pub const fn max_element_count(mut self, count: usize) -> Self {
        self.max_element_count = count;
        self
    }

    pub const fn max_measure_cache_entries(mut self, count: usize) -> Self {
        self.max_measure_cache_entries = count;
        self
    }

    pub const fn culling(mut self, enabled: bool) -> Self {
        self.culling_enabled = enabled;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new(Dimensions::new(1024.0, 768.0))
    }
}
