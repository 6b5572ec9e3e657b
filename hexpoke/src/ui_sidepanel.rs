use crate::app::{HexPokeApp, colors};
use eframe::egui;
use hexpokelib::Mode;
use hexpokelib::locations::MEMORY_LOCATIONS;

/// Parse a user-entered address: hex, with or without `$` / `0x`
fn parse_address(text: &str) -> Option<i64> {
    let text = text.trim();
    let digits = text
        .strip_prefix('$')
        .or_else(|| text.strip_prefix("0x"))
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    i64::from_str_radix(digits, 16).ok()
}

impl HexPokeApp {
    /// Show the side panel with the window information, jump to address and memory map.
    pub(crate) fn show_side_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::left("left_panel")
            .exact_width(260.0)
            .show(ctx, |ui| {
                ui.add_space(3.0);

                // WINDOW INFORMATION
                egui::CollapsingHeader::new("Window Information")
                    .default_open(true)
                    .show(ui, |ui| {
                        ui.add_space(5.0);
                        self.show_window_info(ui);
                        ui.add_space(5.0);
                    });

                ui.add_space(3.0);

                let browsing = self
                    .tabs
                    .active()
                    .is_some_and(|tab| tab.mode() == Mode::Browse && !tab.is_busy());

                // JUMP TO ADDRESS
                egui::CollapsingHeader::new("Jump To Address")
                    .default_open(true)
                    .show(ui, |ui| {
                        ui.add_space(5.0);
                        ui.add_enabled_ui(browsing, |ui| self.show_jump_to(ui));
                        ui.add_space(5.0);
                    });

                ui.add_space(3.0);

                // MEMORY MAP
                egui::CollapsingHeader::new("Memory Map")
                    .default_open(true)
                    .show(ui, |ui| {
                        ui.add_space(5.0);
                        ui.add_enabled_ui(browsing, |ui| self.show_memory_map(ui));
                        ui.add_space(5.0);
                    });
            });
    }

    fn show_window_info(&self, ui: &mut egui::Ui) {
        let Some(tab) = self.tabs.active() else {
            return;
        };
        let range = tab.address_range();

        egui::Grid::new("window_info_grid")
            .num_columns(2) // two columns: label + value
            .spacing([30.0, 4.0]) // horizontal & vertical spacing
            .show(ui, |ui| {
                ui.label("Range");
                ui.monospace(format!(
                    "${:04X}-${:04X}",
                    range.start_address, range.end_address
                ));
                ui.end_row();

                ui.label("Length");
                ui.label(format!("{} bytes", range.length));
                ui.end_row();

                ui.label("Mode");
                ui.label(match tab.mode() {
                    Mode::Browse => "Browse",
                    Mode::Edit => "Edit",
                });
                ui.end_row();

                if tab.mode() == Mode::Edit {
                    ui.label("Cursor");
                    ui.monospace(
                        tab.cursor_address()
                            .map_or_else(|| "-".to_string(), |a| format!("${a:04X}")),
                    );
                    ui.end_row();
                }
            });

        if tab.is_modified() {
            ui.add_space(3.0);
            ui.label(
                egui::RichText::new("Unsaved changes")
                    .color(colors::MODIFIED)
                    .strong(),
            );
        }

        if let Some(status) = tab.status() {
            ui.add_space(3.0);
            ui.label(egui::RichText::new(status).color(colors::GRAY_160));
        }
    }

    fn show_jump_to(&mut self, ui: &mut egui::Ui) {
        let mut go = false;

        ui.horizontal(|ui| {
            let response = ui.add(
                egui::TextEdit::singleline(&mut self.jump_input)
                    .hint_text("$C000")
                    .desired_width(ui.available_width() - 50.0),
            );
            go |= response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            go |= ui.button("Go").clicked();
        });

        if !go {
            return;
        }

        match parse_address(&self.jump_input) {
            Some(address) => {
                if let Some(tab) = self.tabs.active_mut() {
                    tab.navigate_to_address(address);
                }
            }
            None => self.error = Some(format!("Not a hex address: {}", self.jump_input)),
        }
    }

    fn show_memory_map(&mut self, ui: &mut egui::Ui) {
        egui::Grid::new("memory_map_grid")
            .num_columns(2)
            .spacing([20.0, 2.0])
            .show(ui, |ui| {
                for location in &MEMORY_LOCATIONS {
                    if ui.link(location.name).clicked()
                        && let Some(tab) = self.tabs.active_mut()
                    {
                        tab.navigate_to_address(i64::from(location.address));
                    }
                    ui.monospace(format!("${:04X}", location.address));
                    ui.end_row();
                }
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_address() {
        assert_eq!(parse_address("C000"), Some(0xC000));
        assert_eq!(parse_address(" $d020 "), Some(0xD020));
        assert_eq!(parse_address("0x0400"), Some(0x0400));
        assert_eq!(parse_address("10000"), Some(0x1_0000));
        assert_eq!(parse_address("xyz"), None);
        assert_eq!(parse_address(""), None);
    }
}
