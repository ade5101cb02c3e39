use glam::Vec2;
use rflayout::{
    AlignX, AlignY, AttachPoint, AttachTo, BorderConfig, BorderWidth, Color, CornerRadius,
    Dimensions, EdgeInsets, ElementConfig, ElementId, EngineConfig, EstimatedTextMeasure,
    FloatingConfig, LayoutConfig, LayoutDirection, LayoutEngine, RenderCommandKind, ScrollAxes,
    Sizing, SizingAxis, TextConfig,
};

const ITEMS: [&str; 12] = [
    "Inbox", "Starred", "Snoozed", "Sent", "Drafts", "Archive", "Spam", "Trash", "Receipts",
    "Travel", "Work", "Personal",
];

fn declare(engine: &mut LayoutEngine, selected: usize) {
    let text = TextConfig::new(0, 16.0).color(Color::hex("#abb2bf"));
    engine.element(
        ElementConfig::new()
            .sizing(Sizing::grow())
            .padding(EdgeInsets::all(16.0))
            .child_gap(16.0)
            .background(Color::hex("#21252b")),
        |engine| {
            engine.element(
                ElementConfig::new()
                    .id(ElementId::new("sidebar"))
                    .sizing(Sizing::new(SizingAxis::fixed(220.0), SizingAxis::grow()))
                    .direction(LayoutDirection::TopToBottom)
                    .padding(EdgeInsets::symmetric(8.0, 8.0))
                    .child_gap(4.0)
                    .background(Color::hex("#282c34"))
                    .corner_radius(CornerRadius::all(8.0))
                    .scroll(ScrollAxes::VERTICAL)
                    .border(BorderConfig::new(
                        Color::hex("#3e4451"),
                        BorderWidth {
                            between_children: 1.0,
                            ..BorderWidth::outside(1.0)
                        },
                    )),
                |engine| {
                    for (index, label) in ITEMS.iter().enumerate() {
                        let id = ElementId::indexed("sidebar_item", index as u32);
                        let mut item = ElementConfig::new()
                            .id(id)
                            .layout(
                                LayoutConfig::new()
                                    .sizing(Sizing::new(SizingAxis::grow(), SizingAxis::fixed(36.0)))
                                    .padding(EdgeInsets::symmetric(12.0, 0.0))
                                    .align(AlignX::Left, AlignY::Center),
                            )
                            .corner_radius(CornerRadius::all(4.0));
                        if index == selected {
                            item = item.background(Color::hex("#61afef"));
                        }
                        engine.element(item, |engine| {
                            if engine.hovered() {
                                engine.element(
                                    ElementConfig::new()
                                        .background(Color::hex("#000000c0"))
                                        .padding(EdgeInsets::all(6.0))
                                        .floating(
                                            FloatingConfig::new(AttachTo::Parent)
                                                .attach_points(AttachPoint::LeftCenter, AttachPoint::RightCenter)
                                                .offset(Vec2::new(8.0, 0.0))
                                                .z_index(10),
                                        ),
                                    |engine| engine.text(format!("Open {label}"), text),
                                );
                            }
                            engine.text(*label, text);
                        });
                    }
                },
            );
            engine.element(
                ElementConfig::new()
                    .id(ElementId::new("content"))
                    .sizing(Sizing::grow())
                    .direction(LayoutDirection::TopToBottom)
                    .padding(EdgeInsets::all(24.0))
                    .child_gap(12.0)
                    .background(Color::hex("#282c34")),
                |engine| {
                    engine.text(ITEMS[selected], TextConfig::new(0, 28.0).color(Color::rgb(255, 255, 255)));
                    engine.text(
                        "Layout is recomputed from scratch every frame; only scroll offsets and \
                         measured text survive between frames.",
                        text,
                    );
                },
            );
        },
    );
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut engine = LayoutEngine::new(
        EngineConfig::new(Dimensions::new(800.0, 320.0)),
        EstimatedTextMeasure::default(),
    );
    let sidebar = ElementId::new("sidebar");

    // pointer parks over the sidebar and the wheel scrolls it down
    let frames = [
        (Vec2::new(100.0, 60.0), Vec2::ZERO),
        (Vec2::new(100.0, 60.0), Vec2::new(0.0, -60.0)),
        (Vec2::new(100.0, 60.0), Vec2::new(0.0, -600.0)),
    ];
    for (frame, (pointer, wheel)) in frames.into_iter().enumerate() {
        engine.set_pointer_state(pointer, false);
        engine.update_scroll_containers(false, wheel, 1.0 / 60.0);

        if let Err(error) = engine.begin_layout() {
            log::error!("could not start frame {frame}: {error}");
            continue;
        }
        declare(&mut engine, 2);
        let commands = engine.end_layout();

        log::info!("frame {frame}: {} commands", commands.len());
        for command in commands {
            let detail = match &command.kind {
                RenderCommandKind::Text { text, .. } => format!("{text:?}"),
                RenderCommandKind::Rectangle { color, .. } => format!("{:?}", color.to_rgba_u8()),
                _ => String::new(),
            };
            let bounds = command.bounding_box;
            log::info!(
                "  z={:<3} {:<13} ({:>6.1}, {:>6.1}) {:>6.1}x{:<6.1} {}",
                command.z_index,
                command.kind.name(),
                bounds.x,
                bounds.y,
                bounds.width,
                bounds.height,
                detail
            );
        }
        if let Some(data) = engine.scroll_container_data(sidebar) {
            log::info!(
                "sidebar scroll offset {:?} of content {:?}",
                data.offset,
                data.content_size
            );
        }
        log::info!("pointer over {:?}", engine.pointer_over_ids());
    }
}
