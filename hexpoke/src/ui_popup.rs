use crate::HexPokeApp;
use crate::app::colors;
use eframe::egui;

//  ========================== Popup Type logic ============================= //

#[derive(Clone, PartialEq, Eq)]
pub enum PopupType {
    Error,
    About,
    /// Hex bytes or assembly source typed by hand
    PasteEntry,
    /// Load address for the image picked in the file dialog
    LoadAddress,
}

impl PopupType {
    pub const fn title(&self) -> &'static str {
        match self {
            Self::Error => "Error",
            Self::About => "About",
            Self::PasteEntry => "Paste",
            Self::LoadAddress => "Load Image",
        }
    }
}

//  ========================== Popup logic =================================== //

#[derive(Default)]
pub struct Popup {
    /// Is there a pop-up
    pub(crate) active: bool,
    /// Type of the pop-up. Used to determine the title and content of the window.
    pub(crate) ptype: Option<PopupType>,
    /// Text field content in the pop-up, if present
    text_input: String,
}

impl Popup {
    pub fn open(&mut self, ptype: PopupType) {
        self.active = true;
        self.ptype = Some(ptype);
    }

    /// Clear (aka remove) the pop-up
    pub fn clear(&mut self) {
        self.active = false;
        self.ptype = None;
        self.text_input.clear();
    }
}

//  ========================== HexPoke logic ================================= //

impl HexPokeApp {
    fn display_error(ui: &mut egui::Ui, msg: &str) -> bool {
        ui.label(msg);

        // Add space before close button
        ui.add_space(10.0);

        ui.button(" OK ").clicked()
    }

    fn display_about(ui: &mut egui::Ui) -> bool {
        ui.vertical(|ui| {
            ui.add_space(5.0);

            ui.heading("HexPoke");
            ui.label("Live memory and 6502 disassembly editor");

            ui.add_space(3.0);
            ui.separator();
            ui.add_space(3.0);

            ui.label(
                "Browse device memory in a hex or disassembly view, press E to edit a \
                snapshot nibble by nibble and Ctrl+S to write the changed bytes back in \
                one contiguous block.\n\nIn the disassembly view the cursor follows \
                instruction boundaries and pasted assembly source is assembled in place.",
            );

            ui.add_space(3.0);
            ui.separator();
            ui.add_space(3.0);

            ui.label(format!("v{}", env!("CARGO_PKG_VERSION")));
            ui.add_space(5.0);
        });

        // Keep the window open
        false
    }

    fn display_paste_entry(&mut self, ui: &mut egui::Ui) -> bool {
        ui.label("Hex bytes, or assembly source in the disassembly view:");
        ui.add_space(3.0);

        ui.add(
            egui::TextEdit::multiline(&mut self.popup.text_input)
                .code_editor()
                .desired_rows(8)
                .desired_width(360.0),
        );

        ui.add_space(8.0);
        ui.button(" Paste ").clicked()
    }

    fn display_load_address(&mut self, ui: &mut egui::Ui) -> bool {
        ui.vertical(|ui| {
            ui.add_space(3.0);
            ui.label("Load address (hex):");
            ui.add_space(3.0);

            let response = ui.add(
                egui::TextEdit::singleline(&mut self.popup.text_input).desired_width(120.0),
            );

            // Only allow up to 4 hex digits in the text field
            if response.changed() {
                self.popup.text_input.retain(|c| c.is_ascii_hexdigit());
                self.popup.text_input.truncate(4);
            }
        });

        ui.add_space(8.0);

        ui.button(" OK ").clicked() || ui.input(|i| i.key_pressed(egui::Key::Enter))
    }

    /// Show the pop-up
    pub(crate) fn show_popup(&mut self, ctx: &egui::Context) {
        let content_rect = ctx.content_rect();

        // Block interaction with the app
        egui::Area::new(egui::Id::from("modal_blocker"))
            .order(egui::Order::Background)
            .fixed_pos(content_rect.left_top())
            .show(ctx, |ui| {
                ui.allocate_rect(content_rect, egui::Sense::click());
            });

        // Darken the background
        let painter = ctx.layer_painter(egui::LayerId::new(
            egui::Order::Background,
            egui::Id::new("modal_bg"),
        ));
        painter.rect_filled(content_rect, 0.0, colors::SHADOW);

        let Some(popup_type) = self.popup.ptype.clone() else {
            self.popup.clear();
            return;
        };

        let mut is_open = true;
        let mut close_confirm = false;

        egui::Window::new(popup_type.title())
            .open(&mut is_open)
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| match popup_type {
                PopupType::Error => {
                    let error = self.error.clone().unwrap_or_default();
                    close_confirm = Self::display_error(ui, &error);
                }
                PopupType::About => close_confirm = Self::display_about(ui),
                PopupType::PasteEntry => close_confirm = self.display_paste_entry(ui),
                PopupType::LoadAddress => close_confirm = self.display_load_address(ui),
            });

        let escape = ctx.input(|i| i.key_pressed(egui::Key::Escape));
        if !close_confirm && is_open && !escape {
            return;
        }

        // The window got closed this frame
        match popup_type {
            PopupType::Error => self.error = None,
            PopupType::PasteEntry if close_confirm => {
                let text = std::mem::take(&mut self.popup.text_input);
                self.popup.clear();
                if let Some(tab) = self.tabs.active_mut() {
                    // Paste is only possible with the keyboard handed back
                    tab.set_modal_open(false);
                    tab.paste(&text);
                }
                return;
            }
            PopupType::LoadAddress if close_confirm => {
                let address =
                    u16::from_str_radix(&self.popup.text_input, 16).unwrap_or(self.config.start_address);
                if let Some(path) = self.pending_image.take() {
                    self.load_image(&path, address);
                }
            }
            _ => {}
        }

        self.pending_image = None;
        self.popup.clear();
    }

    /// Ask whether unsaved changes of the active tab may be dropped.
    /// The session also answers to Y/Enter and N/Esc while this is shown.
    pub(crate) fn show_confirm_discard(&mut self, ctx: &egui::Context) {
        let mut answer = None;

        egui::Window::new("Discard changes?")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label("Leave edit mode and drop all unsaved changes?");
                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    if ui.button(" Discard ").clicked() {
                        answer = Some(true);
                    }
                    if ui.button(" Keep editing ").clicked() {
                        answer = Some(false);
                    }
                });
            });

        if let Some(accept) = answer
            && let Some(tab) = self.tabs.active_mut()
        {
            tab.confirm(accept);
        }
    }
}
