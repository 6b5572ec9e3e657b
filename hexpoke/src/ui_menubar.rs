use crate::HexPokeApp;
use crate::app::{DISASSEMBLY_TAB, MEMORY_TAB};
use crate::ui_popup::PopupType;
use eframe::egui;
use hexpokelib::{ALLOWED_BYTES_PER_ROW, Mode, Navigation};
use log::info;

impl HexPokeApp {
    /// Displays the top menu bar with File, Edit, View, and About buttons
    pub(crate) fn show_menu_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("menubar").show(ctx, |ui| {
            ui.add_space(3.0);

            egui::MenuBar::new().ui(ui, |ui| {
                ui.horizontal(|ui| {
                    self.show_file_menu(ui);
                    self.show_edit_menu(ui);
                    self.show_view_menu(ui);

                    // ABOUT BUTTON
                    if ui.button("About").clicked() {
                        self.popup.open(PopupType::About);
                    }
                });
            });

            ui.add_space(2.0);
        });
    }

    fn show_file_menu(&mut self, ui: &mut egui::Ui) {
        ui.menu_button("File", |ui| {
            // LOAD IMAGE BUTTON
            if ui.button("Load image...").clicked()
                && let Some(path) = rfd::FileDialog::new()
                    .set_title("Load Image Into Memory")
                    .pick_file()
            {
                self.pending_image = Some(path);
                self.popup.open(PopupType::LoadAddress);
            }

            // EXPORT BUTTON
            if ui.button("Export window...").clicked()
                && let Some(tab) = self.tabs.active()
            {
                let range = tab.address_range();
                let bytes = tab.window_bytes();

                if let Some(mut path) = rfd::FileDialog::new()
                    .set_title("Save As")
                    .set_file_name(format!(
                        "mem_{:04X}_{:04X}.bin",
                        range.start_address, range.end_address
                    ))
                    .save_file()
                {
                    if path.extension().is_none() {
                        path.set_extension("bin");
                    }
                    match std::fs::write(&path, &bytes) {
                        Ok(()) => info!("Exported {} bytes to {}", bytes.len(), path.display()),
                        Err(err) => self.error = Some(err.to_string()),
                    }
                }
            }
        });
    }

    fn show_edit_menu(&mut self, ui: &mut egui::Ui) {
        let Some(tab) = self.tabs.active_mut() else {
            return;
        };
        let editing = tab.mode() == Mode::Edit;
        let idle = !tab.is_busy();

        ui.menu_button("Edit", |ui| {
            if ui
                .add_enabled(!editing && idle, egui::Button::new("Edit mode (E)"))
                .clicked()
            {
                tab.enter_edit_mode();
            }

            if ui
                .add_enabled(editing && idle, egui::Button::new("Save (Ctrl+S)"))
                .clicked()
            {
                tab.exit_edit_mode(true);
            }

            if ui
                .add_enabled(editing && idle, egui::Button::new("Leave edit mode (Esc)"))
                .clicked()
            {
                tab.request_exit();
            }

            ui.separator();

            if ui
                .add_enabled(editing, egui::Button::new("Copy (Ctrl+C)"))
                .clicked()
            {
                tab.copy();
            }

            if ui
                .add_enabled(editing, egui::Button::new("Paste text..."))
                .clicked()
            {
                self.popup.open(PopupType::PasteEntry);
            }
        });
    }

    fn show_view_menu(&mut self, ui: &mut egui::Ui) {
        ui.menu_button("View", |ui| {
            // TABS
            if ui.button("Memory").clicked() {
                self.switch_tab(MEMORY_TAB);
            }
            if ui.button("Disassembly").clicked() {
                self.switch_tab(DISASSEMBLY_TAB);
            }

            ui.separator();

            if ui
                .checkbox(&mut self.config.show_all_opcodes, "Show undocumented opcodes")
                .changed()
                && let Some(tab) = self.tabs.get_mut(DISASSEMBLY_TAB)
            {
                tab.set_show_all_opcodes(self.config.show_all_opcodes);
            }

            ui.separator();
            ui.label("Select Bytes per Row:");
            ui.add_space(3.0);

            // RadioButtons to select the hex row width
            let mut changed = false;
            for bytes in ALLOWED_BYTES_PER_ROW {
                changed |= ui
                    .radio_value(&mut self.config.bytes_per_row, bytes, format!("{bytes} bytes"))
                    .changed();
                ui.add_space(1.0);
            }

            if changed
                && let Some(tab) = self.tabs.get_mut(MEMORY_TAB)
                && tab.navigation() == Navigation::Rows
            {
                tab.set_bytes_per_row(self.config.bytes_per_row);
            }
        });
    }
}
