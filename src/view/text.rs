use crate::style::{Dimensions, TextConfig, TextWrap};
use crate::ui::ErrorSink;
use crate::view::arena::WrappedLine;
use crate::view::text_cache::TextMeasureCache;

pub(crate) const EPSILON: f32 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct TextMetrics {
    /// Extent with breaks only at explicit newlines (none for `TextWrap::None`).
    pub unwrapped: Dimensions,
    /// Narrowest width the run can wrap to.
    pub min_width: f32,
    pub line_height: f32,
}

struct Measurer<'a> {
    cache: &'a mut TextMeasureCache,
    errors: &'a mut ErrorSink,
    config: &'a TextConfig,
}

impl Measurer<'_> {
    fn width(&mut self, text: &str) -> f32 {
        self.dimensions(text).width
    }

    fn dimensions(&mut self, text: &str) -> Dimensions {
        self.cache.measure(
            text,
            self.config.font_id,
            self.config.font_size,
            f32::INFINITY,
            self.errors,
        )
    }
}

pub(crate) fn measure_text_run(
    content: &str,
    config: &TextConfig,
    cache: &mut TextMeasureCache,
    errors: &mut ErrorSink,
) -> TextMetrics {
    let mut measurer = Measurer {
        cache,
        errors,
        config,
    };

    if config.wrap_mode == TextWrap::None {
        let dimensions = measurer.dimensions(content);
        let line_height = resolve_line_height(config, dimensions.height);
        return TextMetrics {
            unwrapped: Dimensions::new(dimensions.width, line_height),
            min_width: dimensions.width,
            line_height,
        };
    }

    let mut width = 0.0f32;
    let mut natural_line_height = 0.0f32;
    let mut min_width = 0.0f32;
    let mut paragraphs = 0usize;
    for paragraph in content.split('\n') {
        paragraphs += 1;
        let dimensions = measurer.dimensions(paragraph);
        width = width.max(dimensions.width);
        natural_line_height = natural_line_height.max(dimensions.height);
        if config.wrap_mode == TextWrap::Words {
            for word in paragraph.split(' ').filter(|word| !word.is_empty()) {
                min_width = min_width.max(measurer.width(word));
            }
        } else {
            min_width = min_width.max(dimensions.width);
        }
    }

    let line_height = resolve_line_height(config, natural_line_height);
    TextMetrics {
        unwrapped: Dimensions::new(width, line_height * paragraphs as f32),
        min_width,
        line_height,
    }
}

/// Greedy line breaking of `content` at `available_width`. Appends the lines to
/// `out` and returns how many were produced. A single word wider than the
/// available width keeps a line of its own and overflows.
pub(crate) fn wrap_text_run(
    content: &str,
    config: &TextConfig,
    available_width: f32,
    cache: &mut TextMeasureCache,
    errors: &mut ErrorSink,
    out: &mut Vec<WrappedLine>,
) -> usize {
    let mut measurer = Measurer {
        cache,
        errors,
        config,
    };
    let before = out.len();

    if config.wrap_mode == TextWrap::None {
        let width = measurer.width(content);
        push_line(out, 0, content.len(), width);
        return out.len() - before;
    }

    let mut offset = 0usize;
    for paragraph in content.split('\n') {
        let base = offset;
        offset += paragraph.len() + 1;
        let width = measurer.width(paragraph);
        if config.wrap_mode == TextWrap::Newlines || width <= available_width + EPSILON {
            push_line(out, base, base + paragraph.len(), width);
            continue;
        }
        wrap_paragraph(paragraph, base, available_width, &mut measurer, out);
    }
    out.len() - before
}

fn wrap_paragraph(
    paragraph: &str,
    base: usize,
    available_width: f32,
    measurer: &mut Measurer<'_>,
    out: &mut Vec<WrappedLine>,
) {
    let space = measurer.width(" ");
    // (start, end, width) of the line being filled, relative to `paragraph`
    let mut line: Option<(usize, usize, f32)> = None;
    let mut offset = 0usize;
    for word in paragraph.split(' ') {
        let word_start = offset;
        offset += word.len() + 1;
        if word.is_empty() {
            continue;
        }
        let word_end = word_start + word.len();
        let word_width = measurer.width(word);
        line = Some(match line {
            None => (word_start, word_end, word_width),
            Some((start, end, width)) => {
                let spaces = (word_start - end) as f32 * space;
                if width + spaces + word_width <= available_width + EPSILON {
                    (start, word_end, width + spaces + word_width)
                } else {
                    push_line(out, base + start, base + end, width);
                    (word_start, word_end, word_width)
                }
            }
        });
    }
    match line {
        Some((start, end, width)) => push_line(out, base + start, base + end, width),
        None => push_line(out, base, base, 0.0),
    }
}

fn push_line(out: &mut Vec<WrappedLine>, start: usize, end: usize, width: f32) {
    out.push(WrappedLine {
        start: start as u32,
        end: end as u32,
        width,
    });
}

fn resolve_line_height(config: &TextConfig, measured: f32) -> f32 {
    if config.line_height > 0.0 {
        config.line_height
    } else {
        measured
    }
}
