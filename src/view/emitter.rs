use smol_str::SmolStr;

use crate::style::{BoundingBox, LayoutDirection};
use crate::ui::ElementId;
use crate::view::arena::FrameArena;
use crate::view::render_command::{RenderCommand, RenderCommandKind};

const SCISSOR_START_SEED: u32 = 10;
const SCISSOR_END_SEED: u32 = 11;
const SEPARATOR_SEED: u32 = 100;

struct Emitter<'a> {
    arena: &'a FrameArena,
    viewport: BoundingBox,
    culling: bool,
    out: &'a mut Vec<RenderCommand>,
}

impl Emitter<'_> {
    fn push(&mut self, command: RenderCommand) {
        if command.is_scissor() || !self.culling || command.bounding_box.intersects(&self.viewport) {
            self.out.push(command);
        }
    }

    fn scissor(&mut self, id: ElementId, bounding_box: BoundingBox, z_index: i16, user_data: u64, start: bool) {
        let (seed, kind) = if start {
            (SCISSOR_START_SEED, RenderCommandKind::ScissorStart)
        } else {
            (SCISSOR_END_SEED, RenderCommandKind::ScissorEnd)
        };
        self.push(RenderCommand {
            id: id.derived(seed),
            bounding_box,
            z_index,
            user_data,
            kind,
        });
    }

    fn root(&mut self, root: usize) {
        let root = self.arena.roots[root];
        let element = &self.arena.elements[root.element as usize];
        let clip = root
            .clip
            .map(|container| self.arena.elements[container as usize].bounding_box);
        if let Some(clip) = clip {
            self.scissor(element.id, clip, root.z_index, element.config.user_data, true);
        }
        self.element(root.element as usize, root.z_index);
        if let Some(clip) = clip {
            self.scissor(element.id, clip, root.z_index, element.config.user_data, false);
        }
    }

    fn element(&mut self, index: usize, z_index: i16) {
        let arena = self.arena;
        let element = &arena.elements[index];
        let config = &element.config;
        let bounding_box = element.bounding_box;
        let command = |kind| RenderCommand {
            id: element.id,
            bounding_box,
            z_index,
            user_data: config.user_data,
            kind,
        };

        if let Some(image) = config.image {
            self.push(command(RenderCommandKind::Image {
                handle: image.handle,
                source_dimensions: image.source_dimensions,
                tint: config.background_color,
                corner_radius: config.corner_radius,
            }));
        } else if let Some(data) = config.custom {
            self.push(command(RenderCommandKind::Custom {
                data,
                background_color: config.background_color,
                corner_radius: config.corner_radius,
            }));
        } else if let Some(color) = config.background_color {
            self.push(command(RenderCommandKind::Rectangle {
                color,
                corner_radius: config.corner_radius,
            }));
        }

        if let Some(text) = arena.text_of(index) {
            for (line_index, line) in arena.wrapped_lines[text.lines.range()].iter().enumerate() {
                let y = bounding_box.y + text.line_height * line_index as f32;
                self.push(RenderCommand {
                    id: element.id,
                    bounding_box: BoundingBox::new(bounding_box.x, y, line.width, text.line_height),
                    z_index,
                    user_data: config.user_data,
                    kind: RenderCommandKind::Text {
                        text: SmolStr::new(&text.content[line.start as usize..line.end as usize]),
                        color: text.config.color,
                        font_id: text.config.font_id,
                        font_size: text.config.font_size,
                        line_height: text.line_height,
                    },
                });
            }
        }

        if let Some(border) = config.border {
            let width = border.width;
            if width.left > 0.0 || width.right > 0.0 || width.top > 0.0 || width.bottom > 0.0 {
                self.push(command(RenderCommandKind::Border {
                    color: border.color,
                    width,
                    corner_radius: config.corner_radius,
                }));
            }
            if width.between_children > 0.0 && !config.layout.wrap {
                self.separators(index, z_index);
            }
        }

        let clips = !config.scroll.is_empty();
        if clips {
            self.scissor(element.id, bounding_box, z_index, config.user_data, true);
        }
        for &child in arena.children(index) {
            self.element(child as usize, z_index);
        }
        if clips {
            self.scissor(element.id, bounding_box, z_index, config.user_data, false);
        }
    }

    /// Bars centred in the gaps between consecutive children.
    fn separators(&mut self, index: usize, z_index: i16) {
        let arena = self.arena;
        let element = &arena.elements[index];
        let Some(border) = element.config.border else {
            return;
        };
        let thickness = border.width.between_children;
        let parent = element.bounding_box;
        let children = arena.children(index);
        for (position, pair) in children.windows(2).enumerate() {
            let previous = arena.elements[pair[0] as usize].bounding_box;
            let next = arena.elements[pair[1] as usize].bounding_box;
            let bounding_box = match element.config.layout.direction {
                LayoutDirection::LeftToRight => BoundingBox::new(
                    (previous.right() + next.x - thickness) * 0.5,
                    parent.y,
                    thickness,
                    parent.height,
                ),
                LayoutDirection::TopToBottom => BoundingBox::new(
                    parent.x,
                    (previous.bottom() + next.y - thickness) * 0.5,
                    parent.width,
                    thickness,
                ),
            };
            self.push(RenderCommand {
                id: element.id.derived(SEPARATOR_SEED + position as u32),
                bounding_box,
                z_index,
                user_data: element.config.user_data,
                kind: RenderCommandKind::Rectangle {
                    color: border.color,
                    corner_radius: Default::default(),
                },
            });
        }
    }
}

impl FrameArena {
    /// Flattens the positioned frame into `out`, roots in `order`.
    ///
    /// With culling on, draw commands whose box misses `viewport` are dropped;
    /// scissor commands are always kept so brackets stay balanced.
    pub(crate) fn emit_commands(
        &self,
        order: &[usize],
        viewport: BoundingBox,
        culling: bool,
        out: &mut Vec<RenderCommand>,
    ) {
        out.clear();
        let mut emitter = Emitter {
            arena: self,
            viewport,
            culling,
            out,
        };
        for &root in order {
            emitter.root(root);
        }
    }
}

#[cfg(test)]
mod tests {
    use smol_str::SmolStr;

    use crate::style::{
        AttachTo, BorderConfig, BorderWidth, BoundingBox, Color, Dimensions, ElementConfig,
        FloatingConfig, LayoutDirection, ScrollAxes, Sizing, TextConfig,
    };
    use crate::ui::{ElementId, ErrorSink};
    use crate::view::arena::FrameArena;
    use crate::view::render_command::{RenderCommand, RenderCommandKind};
    use crate::view::scroll::ScrollStates;
    use crate::view::text_cache::TextMeasureCache;

    fn emit(culling: bool, build: impl FnOnce(&mut FrameArena, &mut ErrorSink)) -> Vec<RenderCommand> {
        let mut cache = TextMeasureCache::new(
            |text: &str, _font_id: u16, _font_size: f32, _width: f32| {
                Dimensions::new(text.len() as f32 * 7.0, 10.0)
            },
            64,
        );
        let mut errors = ErrorSink::new();
        let mut arena = FrameArena::with_capacity(64);
        arena.open_root(Dimensions::new(200.0, 100.0));
        build(&mut arena, &mut errors);
        arena.finish_declaration(&mut errors);
        arena.solve_fit(&mut cache, &mut errors);
        arena.solve_grow(&mut cache, &mut errors);
        let order = arena.position(&mut ScrollStates::default(), 1);
        let mut out = Vec::new();
        arena.emit_commands(&order, BoundingBox::new(0.0, 0.0, 200.0, 100.0), culling, &mut out);
        out
    }

    fn kinds(commands: &[RenderCommand]) -> Vec<&'static str> {
        commands.iter().map(|command| command.kind.name()).collect()
    }

    #[test]
    fn background_then_border_then_children() {
        let commands = emit(true, |arena, errors| {
            arena.open_element(
                ElementConfig::new()
                    .sizing(Sizing::fixed(50.0, 50.0))
                    .background(Color::rgb(10, 20, 30))
                    .border(BorderConfig::new(Color::rgb(0, 0, 0), BorderWidth::outside(1.0))),
                errors,
            );
            arena.add_text(SmolStr::new("hi"), TextConfig::default(), errors);
            arena.close_element(errors);
        });
        assert_eq!(kinds(&commands), vec!["rectangle", "border", "text"]);
        assert!(matches!(&commands[2].kind, RenderCommandKind::Text { text, .. } if text == "hi"));
    }

    #[test]
    fn wrapped_text_emits_one_command_per_line() {
        let commands = emit(true, |arena, errors| {
            arena.open_element(ElementConfig::new().sizing(Sizing::fixed(40.0, 50.0)), errors);
            arena.add_text(SmolStr::new("Hello World"), TextConfig::default(), errors);
            arena.close_element(errors);
        });
        let lines: Vec<(String, f32)> = commands
            .iter()
            .filter_map(|command| match &command.kind {
                RenderCommandKind::Text { text, .. } => Some((text.to_string(), command.bounding_box.y)),
                _ => None,
            })
            .collect();
        assert_eq!(lines, vec![("Hello".to_string(), 0.0), ("World".to_string(), 10.0)]);
    }

    #[test]
    fn scroll_container_brackets_children_with_scissors() {
        let list = ElementId::new("list");
        let commands = emit(true, |arena, errors| {
            arena.open_element(
                ElementConfig::new()
                    .id(list)
                    .sizing(Sizing::fixed(50.0, 50.0))
                    .scroll(ScrollAxes::VERTICAL),
                errors,
            );
            arena.open_element(
                ElementConfig::new()
                    .sizing(Sizing::fixed(50.0, 20.0))
                    .background(Color::rgb(1, 2, 3)),
                errors,
            );
            arena.close_element(errors);
            arena.close_element(errors);
        });
        assert_eq!(kinds(&commands), vec!["scissor_start", "rectangle", "scissor_end"]);
        assert_eq!(commands[0].bounding_box, BoundingBox::new(0.0, 0.0, 50.0, 50.0));
        assert_eq!(commands[0].id, list.derived(super::SCISSOR_START_SEED));
    }

    #[test]
    fn culling_drops_offscreen_draws_but_keeps_scissors() {
        let build = |arena: &mut FrameArena, errors: &mut ErrorSink| {
            arena.open_element(
                ElementConfig::new()
                    .sizing(Sizing::fixed(50.0, 50.0))
                    .direction(LayoutDirection::TopToBottom)
                    .scroll(ScrollAxes::VERTICAL),
                errors,
            );
            for _ in 0..4 {
                arena.open_element(
                    ElementConfig::new()
                        .sizing(Sizing::fixed(50.0, 40.0))
                        .background(Color::rgb(1, 2, 3)),
                    errors,
                );
                arena.close_element(errors);
            }
            arena.close_element(errors);
        };
        assert_eq!(
            kinds(&emit(true, build)),
            vec!["scissor_start", "rectangle", "rectangle", "rectangle", "scissor_end"]
        );
        assert_eq!(emit(false, build).len(), 6);
    }

    #[test]
    fn floating_layer_paints_after_the_main_tree() {
        let commands = emit(true, |arena, errors| {
            arena.open_element(
                ElementConfig::new()
                    .sizing(Sizing::fixed(50.0, 50.0))
                    .background(Color::rgb(1, 1, 1)),
                errors,
            );
            arena.open_element(
                ElementConfig::new()
                    .sizing(Sizing::fixed(10.0, 10.0))
                    .background(Color::rgb(2, 2, 2))
                    .floating(FloatingConfig::new(AttachTo::Parent).z_index(1)),
                errors,
            );
            arena.close_element(errors);
            arena.close_element(errors);
            arena.open_element(
                ElementConfig::new()
                    .sizing(Sizing::fixed(50.0, 50.0))
                    .background(Color::rgb(3, 3, 3)),
                errors,
            );
            arena.close_element(errors);
        });
        let colors: Vec<Color> = commands
            .iter()
            .filter_map(|command| match command.kind {
                RenderCommandKind::Rectangle { color, .. } => Some(color),
                _ => None,
            })
            .collect();
        assert_eq!(colors, vec![Color::rgb(1, 1, 1), Color::rgb(3, 3, 3), Color::rgb(2, 2, 2)]);
        assert_eq!(commands[2].z_index, 1);
    }

    #[test]
    fn separators_sit_between_children() {
        let commands = emit(true, |arena, errors| {
            arena.open_element(
                ElementConfig::new()
                    .child_gap(10.0)
                    .border(BorderConfig::new(
                        Color::rgb(9, 9, 9),
                        BorderWidth {
                            between_children: 2.0,
                            ..BorderWidth::default()
                        },
                    )),
                errors,
            );
            for _ in 0..3 {
                arena.open_element(ElementConfig::new().sizing(Sizing::fixed(20.0, 20.0)), errors);
                arena.close_element(errors);
            }
            arena.close_element(errors);
        });
        let separators: Vec<f32> = commands.iter().map(|command| command.bounding_box.x).collect();
        assert_eq!(separators, vec![24.0, 54.0]);
    }
}
