use crate::app::{DISASSEMBLY_TAB, HexPokeApp, MEMORY_TAB};
use crate::ui_button;
use eframe::egui;
use hexpokelib::{
    AddressRange, CellLayout, DeviceMemory, EditorSession, KeyEvent, Mode, Navigation,
    PointerEvent, RowView, TabLifecycle, drive,
};

/// What the shell needs from a view, independent of its cell layout
pub trait Tab: TabLifecycle {
    fn title(&self) -> &'static str;

    /// Perform queued remote calls against `device`
    fn pump(&mut self, device: &mut dyn DeviceMemory) -> usize;

    fn mode(&self) -> Mode;
    fn is_busy(&self) -> bool;
    fn is_modified(&self) -> bool;
    fn navigation(&self) -> Navigation;
    fn address_range(&self) -> AddressRange;
    fn cursor_address(&self) -> Option<u16>;
    fn status(&self) -> Option<&str>;
    fn rows(&self) -> Vec<RowView>;
    /// Bytes of the loaded window, edits included
    fn window_bytes(&self) -> Vec<u8>;

    fn handle_key(&mut self, event: &KeyEvent) -> bool;
    fn handle_pointer(&mut self, event: PointerEvent) -> bool;
    fn copy(&mut self) -> Option<String>;
    fn paste(&mut self, text: &str) -> bool;
    fn take_clipboard(&mut self) -> Option<String>;
    fn take_error(&mut self) -> Option<String>;

    fn navigate_to_address(&mut self, address: i64) -> bool;
    fn enter_edit_mode(&mut self) -> bool;
    fn exit_edit_mode(&mut self, save: bool) -> bool;
    fn request_exit(&mut self);
    fn needs_confirmation(&self) -> bool;
    fn confirm(&mut self, accept: bool);

    fn set_modal_open(&mut self, open: bool);
    fn set_bytes_per_row(&mut self, bytes_per_row: usize);
    fn set_show_all_opcodes(&mut self, show: bool);
    fn cursor_visible(&self) -> bool;
    /// Advance the cursor blink. Returns `true` if a redraw is needed.
    fn tick(&mut self, dt_ms: u64) -> bool;
}

impl<L: CellLayout> Tab for EditorSession<L> {
    fn title(&self) -> &'static str {
        match self.editor().navigation() {
            Navigation::Rows => "Memory",
            Navigation::Cells => "Disassembly",
        }
    }

    fn pump(&mut self, device: &mut dyn DeviceMemory) -> usize {
        drive(self, device)
    }

    fn mode(&self) -> Mode {
        Self::mode(self)
    }

    fn is_busy(&self) -> bool {
        Self::is_busy(self)
    }

    fn is_modified(&self) -> bool {
        Self::is_modified(self)
    }

    fn navigation(&self) -> Navigation {
        self.editor().navigation()
    }

    fn address_range(&self) -> AddressRange {
        self.get_address_range()
    }

    fn cursor_address(&self) -> Option<u16> {
        self.editor().cursor_address()
    }

    fn status(&self) -> Option<&str> {
        Self::status(self)
    }

    fn rows(&self) -> Vec<RowView> {
        Self::rows(self)
    }

    fn window_bytes(&self) -> Vec<u8> {
        self.editor().buffer().current().to_vec()
    }

    fn handle_key(&mut self, event: &KeyEvent) -> bool {
        Self::handle_key(self, event)
    }

    fn handle_pointer(&mut self, event: PointerEvent) -> bool {
        Self::handle_pointer(self, event)
    }

    fn copy(&mut self) -> Option<String> {
        Self::copy(self)
    }

    fn paste(&mut self, text: &str) -> bool {
        Self::paste(self, text)
    }

    fn take_clipboard(&mut self) -> Option<String> {
        Self::take_clipboard(self)
    }

    fn take_error(&mut self) -> Option<String> {
        Self::take_error(self)
    }

    fn navigate_to_address(&mut self, address: i64) -> bool {
        Self::navigate_to_address(self, address)
    }

    fn enter_edit_mode(&mut self) -> bool {
        Self::enter_edit_mode(self)
    }

    fn exit_edit_mode(&mut self, save: bool) -> bool {
        Self::exit_edit_mode(self, save)
    }

    fn request_exit(&mut self) {
        Self::request_exit(self);
    }

    fn needs_confirmation(&self) -> bool {
        Self::needs_confirmation(self)
    }

    fn confirm(&mut self, accept: bool) {
        Self::confirm(self, accept);
    }

    fn set_modal_open(&mut self, open: bool) {
        Self::set_modal_open(self, open);
    }

    fn set_bytes_per_row(&mut self, bytes_per_row: usize) {
        Self::set_bytes_per_row(self, bytes_per_row);
    }

    fn set_show_all_opcodes(&mut self, show: bool) {
        Self::set_show_all_opcodes(self, show);
    }

    fn cursor_visible(&self) -> bool {
        Self::cursor_visible(self)
    }

    fn tick(&mut self, dt_ms: u64) -> bool {
        Self::tick(self, dt_ms)
    }
}

impl HexPokeApp {
    /// Show the tab bar with the memory and disassembly views
    pub(crate) fn show_tabs(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("tabs_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                // Modify spacing between tabs
                ui.spacing_mut().item_spacing.x = 2.0;

                let mut clicked = None;

                for id in [MEMORY_TAB, DISASSEMBLY_TAB] {
                    let is_active = self.tabs.active_id() == Some(id);
                    let Some(tab) = self.tabs.get_mut(id) else {
                        continue;
                    };

                    // Mark tabs with unsaved changes
                    let title = if tab.is_modified() {
                        format!("{} *", tab.title())
                    } else {
                        tab.title().to_string()
                    };

                    let response = ui_button::tab_style_button(ui, ("tab", id), is_active, |ui| {
                        ui.label(title);
                    });
                    if response.clicked() && !is_active {
                        clicked = Some(id);
                    }
                }

                // Switch after the loop to avoid borrow checker issues
                if let Some(id) = clicked {
                    self.switch_tab(id);
                }
            });
        });
    }
}
