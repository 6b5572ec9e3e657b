use crate::app::{HexPokeApp, colors};
use crate::events::{FrameInput, collect_frame_input};
use crate::ui_tabs::Tab;
use eframe::egui;
use hexpokelib::{ByteSpan, ByteView, DeviceMemory, Mode, Navigation, PointerEvent, RowView, hit_test};
use std::time::Duration;

/// Bytes reserved in front of the instruction text of a disassembly line
const INSTRUCTION_COLUMN_BYTES: usize = 3;

/// One painted line and the byte extents needed to resolve clicks on it
struct LineHits {
    rect: egui::Rect,
    spans: Vec<ByteSpan>,
}

/// Font metrics of the editor
#[derive(Clone)]
struct Metrics {
    font: egui::FontId,
    char_width: f32,
    row_height: f32,
}

impl HexPokeApp {
    /// Central panel with the active view. Routes this frame's input to it first.
    pub(crate) fn show_editor(&mut self, ctx: &egui::Context, accept_input: bool) {
        let route_keys = accept_input && !ctx.wants_keyboard_input();
        let input = collect_frame_input(ctx);
        let bytes_per_row = self.config.bytes_per_row;
        let blink_interval = self.config.blink_interval_ms;

        let Some(tab) = self.tabs.active_mut() else {
            egui::CentralPanel::default().show(ctx, |ui| {
                ui.centered_and_justified(|ui| {
                    ui.label("No view selected");
                });
            });
            return;
        };

        if route_keys {
            route_input(tab, &input, &mut self.device);
        }
        if let Some(text) = tab.take_clipboard() {
            ctx.copy_text(text);
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            show_mode_hint(ui, tab.mode(), tab.is_busy());
            ui.separator();

            let metrics = measure(ui);
            let rows = tab.rows();
            let navigation = tab.navigation();

            let lines = egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    rows.iter()
                        .map(|row| draw_line(ui, row, navigation, bytes_per_row, &metrics))
                        .collect::<Vec<_>>()
                })
                .inner;

            if accept_input
                && let Some(event) = pointer_event(&input, &lines)
            {
                tab.handle_pointer(event);
            }
        });

        // Cursor blink
        if tab.mode() == Mode::Edit {
            let dt = ctx.input(|i| i.stable_dt);
            if tab.tick(millis(dt)) {
                ctx.request_repaint();
            }
            ctx.request_repaint_after(Duration::from_millis(blink_interval));
        }
    }
}

/// Feed keys and clipboard events to `tab`, performing remote calls as they come
fn route_input(tab: &mut dyn Tab, input: &FrameInput, device: &mut dyn DeviceMemory) {
    for key in &input.keys {
        tab.handle_key(key);
        tab.pump(device);
    }

    if input.copy {
        tab.copy();
    }
    if let Some(text) = &input.paste {
        tab.paste(text);
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn millis(seconds: f32) -> u64 {
    (seconds.max(0.0) * 1000.0).round() as u64
}

fn measure(ui: &egui::Ui) -> Metrics {
    let font = egui::FontId::monospace(13.0);
    let galley = ui
        .painter()
        .layout_no_wrap("0".to_string(), font.clone(), colors::GRAY_210);

    Metrics {
        font,
        char_width: galley.size().x,
        row_height: galley.size().y + 4.0,
    }
}

fn show_mode_hint(ui: &mut egui::Ui, mode: Mode, busy: bool) {
    ui.horizontal(|ui| {
        let (label, hint) = match mode {
            Mode::Browse => (
                "BROWSE",
                "E: edit | Arrows, PgUp/PgDn: move window | F5: refresh",
            ),
            Mode::Edit => (
                "EDIT",
                "0-9 A-F: type | Shift: select | Ctrl+S: save | Esc: leave",
            ),
        };
        ui.label(egui::RichText::new(label).strong().monospace());
        ui.label(egui::RichText::new(hint).color(colors::GRAY_160));
        if busy {
            ui.spinner();
        }
    });
}

#[allow(clippy::cast_precision_loss)]
fn draw_line(
    ui: &mut egui::Ui,
    row: &RowView,
    navigation: Navigation,
    bytes_per_row: usize,
    metrics: &Metrics,
) -> LineHits {
    let cw = metrics.char_width;
    let (rect, _) = ui.allocate_exact_size(
        egui::vec2(ui.available_width(), metrics.row_height),
        egui::Sense::hover(),
    );
    let painter = ui.painter_at(rect);

    // Address column
    painter.text(
        rect.left_center(),
        egui::Align2::LEFT_CENTER,
        format!("{:04X}", row.address),
        metrics.font.clone(),
        colors::GRAY_160,
    );

    let bytes_left = 6.0f32.mul_add(cw, rect.left());
    let mut spans = Vec::with_capacity(row.bytes.len());

    for (i, byte) in row.bytes.iter().enumerate() {
        // Extra gap every 8 bytes in the hex view
        let group_gap = match navigation {
            Navigation::Rows => (i / 8) as f32 * cw,
            Navigation::Cells => 0.0,
        };
        let left = (i as f32 * 3.0).mul_add(cw, bytes_left) + group_gap;
        let byte_rect = egui::Rect::from_min_size(
            egui::pos2(left, rect.top()),
            egui::vec2(2.0 * cw, metrics.row_height),
        );

        draw_byte(&painter, byte, byte_rect, i, metrics);
        spans.push(ByteSpan {
            byte: byte.position,
            left: byte_rect.left(),
            right: byte_rect.right(),
        });
    }

    // Text column: ASCII in the hex view, the instruction in the disassembly view
    let text_columns = match navigation {
        Navigation::Rows => bytes_per_row * 3 + bytes_per_row / 8,
        Navigation::Cells => INSTRUCTION_COLUMN_BYTES * 3,
    };
    painter.text(
        egui::pos2((text_columns as f32 + 2.0).mul_add(cw, bytes_left), rect.center().y),
        egui::Align2::LEFT_CENTER,
        &row.text,
        metrics.font.clone(),
        colors::GRAY_210,
    );

    LineHits { rect, spans }
}

#[allow(clippy::cast_precision_loss)]
fn draw_byte(
    painter: &egui::Painter,
    byte: &ByteView,
    rect: egui::Rect,
    index: usize,
    metrics: &Metrics,
) {
    let half = rect.width() / 2.0;

    for nibble in 0..2 {
        let nibble_rect = egui::Rect::from_min_size(
            egui::pos2((nibble as f32).mul_add(half, rect.left()), rect.top()),
            egui::vec2(half, rect.height()),
        );

        if byte.selected[nibble] {
            painter.rect_filled(nibble_rect, 0.0, colors::LIGHT_BLUE);
        } else if byte.modified {
            painter.rect_filled(nibble_rect, 0.0, colors::MUD);
        }

        if byte.cursor.is_some_and(|n| usize::from(n) == nibble) {
            let underline = egui::Rect::from_min_max(
                egui::pos2(nibble_rect.left(), nibble_rect.bottom() - 2.0),
                nibble_rect.right_bottom(),
            );
            painter.rect_filled(underline, 0.0, colors::CURSOR);
        }
    }

    // Change color of every other byte for better readability
    let color = if byte.modified {
        colors::MODIFIED
    } else if index % 2 == 0 {
        colors::GRAY_210
    } else {
        colors::GRAY_160
    };
    painter.text(
        rect.left_center(),
        egui::Align2::LEFT_CENTER,
        format!("{:02X}", byte.value),
        metrics.font.clone(),
        color,
    );
}

/// Turn this frame's pointer state into an editor event.
/// Presses must hit a line, drags snap to the nearest one.
fn pointer_event(input: &FrameInput, lines: &[LineHits]) -> Option<PointerEvent> {
    if input.pointer_released {
        return Some(PointerEvent::Up);
    }

    let pos = input.pointer_pos?;

    if input.pointer_pressed {
        let line = lines.iter().find(|l| l.rect.contains(pos))?;
        let nibble = hit_test(&line.spans, pos.x)?;
        return Some(PointerEvent::Down {
            nibble,
            shift: input.shift,
        });
    }

    if input.pointer_down {
        let line = lines
            .iter()
            .find(|l| pos.y < l.rect.bottom())
            .or_else(|| lines.last())?;
        let nibble = hit_test(&line.spans, pos.x)?;
        return Some(PointerEvent::Move { nibble });
    }

    None
}
