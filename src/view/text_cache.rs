use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use crate::style::Dimensions;
use crate::ui::{ErrorSink, LayoutError};

/// Host-supplied text measurement.
///
/// Must be deterministic for a given `(text, font_id, font_size, available_width)`;
/// results are memoized until [`TextMeasureCache::clear`]. The engine passes
/// `f32::INFINITY` as `available_width` when it wants the single-line extent.
pub trait MeasureText {
    fn measure(&mut self, text: &str, font_id: u16, font_size: f32, available_width: f32) -> Dimensions;
}

impl<F> MeasureText for F
where
    F: FnMut(&str, u16, f32, f32) -> Dimensions,
{
    fn measure(&mut self, text: &str, font_id: u16, font_size: f32, available_width: f32) -> Dimensions {
        self(text, font_id, font_size, available_width)
    }
}

/// Font-less width estimate for hosts without a shaper (headless runs, demos).
///
/// Full-width glyphs are counted as 1em, ASCII as 0.56em, whitespace 0.33em.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EstimatedTextMeasure {
    pub line_height: f32,
}

impl Default for EstimatedTextMeasure {
    fn default() -> Self {
        Self { line_height: 1.25 }
    }
}

impl MeasureText for EstimatedTextMeasure {
    fn measure(&mut self, text: &str, _font_id: u16, font_size: f32, _available_width: f32) -> Dimensions {
        let width = text.chars().map(|ch| estimate_char_width_px(ch, font_size)).sum();
        Dimensions::new(width, font_size * self.line_height)
    }
}

fn estimate_char_width_px(ch: char, font_size: f32) -> f32 {
    if ch == '\t' {
        return font_size * 2.0;
    }
    if ch.is_whitespace() {
        return font_size * 0.33;
    }
    if ch.is_ascii() {
        return font_size * 0.56;
    }
    font_size
}

/// Keyed by the text itself so that equal hashes never alias different strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct MeasureKey {
    text: SmolStr,
    font_id: u16,
    font_size: u32,
    available_width: u32,
}

impl MeasureKey {
    fn new(text: &str, font_id: u16, font_size: f32, available_width: f32) -> Self {
        Self {
            text: SmolStr::new(text),
            font_id,
            font_size: font_size.to_bits(),
            available_width: available_width.to_bits(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MeasureCacheStats {
    pub hits: u64,
    pub misses: u64,
}

pub struct TextMeasureCache {
    measure: Box<dyn MeasureText>,
    entries: FxHashMap<MeasureKey, Dimensions>,
    capacity: usize,
    overflow_reported: bool,
    stats: MeasureCacheStats,
}

impl TextMeasureCache {
    pub fn new(measure: impl MeasureText + 'static, capacity: usize) -> Self {
        Self {
            measure: Box::new(measure),
            entries: FxHashMap::default(),
            capacity,
            overflow_reported: false,
            stats: MeasureCacheStats::default(),
        }
    }

    pub(crate) fn measure(
        &mut self,
        text: &str,
        font_id: u16,
        font_size: f32,
        available_width: f32,
        errors: &mut ErrorSink,
    ) -> Dimensions {
        let key = MeasureKey::new(text, font_id, font_size, available_width);
        if let Some(dimensions) = self.entries.get(&key) {
            self.stats.hits += 1;
            return *dimensions;
        }

        self.stats.misses += 1;
        let measured = self.measure.measure(text, font_id, font_size, available_width);
        let dimensions = Dimensions::new(non_negative(measured.width), non_negative(measured.height));
        if self.entries.len() < self.capacity {
            self.entries.insert(key, dimensions);
        } else if !self.overflow_reported {
            self.overflow_reported = true;
            errors.report(LayoutError::MeasureCacheCapacityExceeded {
                capacity: self.capacity,
            });
        }
        dimensions
    }

    /// Swaps the measurement callback; cached results are dropped with the old fonts.
    pub fn set_measure(&mut self, measure: impl MeasureText + 'static) {
        self.measure = Box::new(measure);
        self.clear();
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.overflow_reported = false;
    }

    pub(crate) fn begin_frame(&mut self) {
        self.overflow_reported = false;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn stats(&self) -> MeasureCacheStats {
        self.stats
    }
}

fn non_negative(value: f32) -> f32 {
    if value.is_nan() { 0.0 } else { value.max(0.0) }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::{EstimatedTextMeasure, MeasureKey, MeasureText, TextMeasureCache};
    use crate::style::Dimensions;
    use crate::ui::ErrorSink;

    fn counting_cache(calls: Rc<Cell<u32>>, capacity: usize) -> TextMeasureCache {
        TextMeasureCache::new(
            move |text: &str, _font_id: u16, _font_size: f32, _width: f32| {
                calls.set(calls.get() + 1);
                Dimensions::new(text.len() as f32 * 7.0, 10.0)
            },
            capacity,
        )
    }

    #[test]
    fn hit_skips_the_callback() {
        let calls = Rc::new(Cell::new(0));
        let mut cache = counting_cache(calls.clone(), 16);
        let mut errors = ErrorSink::new();

        let first = cache.measure("hello", 1, 16.0, f32::INFINITY, &mut errors);
        let second = cache.measure("hello", 1, 16.0, f32::INFINITY, &mut errors);
        assert_eq!(first, Dimensions::new(35.0, 10.0));
        assert_eq!(first, second);
        assert_eq!(calls.get(), 1);
        assert_eq!(cache.stats().hits, 1);
    }

    #[test]
    fn key_includes_font_size_and_width() {
        let calls = Rc::new(Cell::new(0));
        let mut cache = counting_cache(calls.clone(), 16);
        let mut errors = ErrorSink::new();

        cache.measure("hello", 1, 16.0, f32::INFINITY, &mut errors);
        cache.measure("hello", 1, 18.0, f32::INFINITY, &mut errors);
        cache.measure("hello", 2, 16.0, f32::INFINITY, &mut errors);
        cache.measure("hello", 1, 16.0, 40.0, &mut errors);
        assert_eq!(calls.get(), 4);
        assert_eq!(cache.len(), 4);
    }

    #[test]
    fn same_length_texts_never_share_an_entry() {
        let mut cache = TextMeasureCache::new(
            |text: &str, _font_id: u16, _font_size: f32, _width: f32| {
                let width = if text == "ab" { 10.0 } else { 20.0 };
                Dimensions::new(width, 10.0)
            },
            16,
        );
        let mut errors = ErrorSink::new();

        assert_ne!(
            MeasureKey::new("ab", 0, 12.0, f32::INFINITY),
            MeasureKey::new("ba", 0, 12.0, f32::INFINITY)
        );
        assert_eq!(cache.measure("ab", 0, 12.0, f32::INFINITY, &mut errors).width, 10.0);
        assert_eq!(cache.measure("ba", 0, 12.0, f32::INFINITY, &mut errors).width, 20.0);
        assert_eq!(cache.measure("ab", 0, 12.0, f32::INFINITY, &mut errors).width, 10.0);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.stats().hits, 1);
    }

    #[test]
    fn clear_forces_remeasure() {
        let calls = Rc::new(Cell::new(0));
        let mut cache = counting_cache(calls.clone(), 16);
        let mut errors = ErrorSink::new();

        cache.measure("dpi", 0, 12.0, f32::INFINITY, &mut errors);
        cache.clear();
        assert!(cache.is_empty());
        cache.measure("dpi", 0, 12.0, f32::INFINITY, &mut errors);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn full_cache_still_measures_and_reports_once() {
        let calls = Rc::new(Cell::new(0));
        let mut cache = counting_cache(calls.clone(), 1);
        let mut errors = ErrorSink::new();

        cache.measure("a", 0, 12.0, f32::INFINITY, &mut errors);
        let b = cache.measure("bb", 0, 12.0, f32::INFINITY, &mut errors);
        cache.measure("ccc", 0, 12.0, f32::INFINITY, &mut errors);
        assert_eq!(b.width, 14.0);
        assert_eq!(cache.len(), 1);
        assert_eq!(errors.reported(), 1);
    }

    #[test]
    fn estimate_is_not_underestimated_for_wide_glyphs() {
        let mut measure = EstimatedTextMeasure::default();
        let ascii = measure.measure("ab", 0, 10.0, f32::INFINITY);
        let wide = measure.measure("漢字", 0, 10.0, f32::INFINITY);
        assert!(wide.width > ascii.width);
        assert_eq!(ascii.height, 12.5);
    }
}
