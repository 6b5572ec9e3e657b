use crate::ui_popup::Popup;
use crate::ui_tabs::Tab;
use hexpokelib::mos6502::Mos6502;
use hexpokelib::{
    DisassemblyLayout, EditorConfig, EditorSession, HexLayout, SimulatedDevice, TabRegistry,
};
use log::{debug, warn};
use std::path::{Path, PathBuf};

pub mod colors {
    use eframe::egui::Color32;

    pub const LIGHT_BLUE: Color32 = Color32::from_rgba_premultiplied(33, 81, 109, 20);
    pub const MUD: Color32 = Color32::from_rgba_premultiplied(54, 44, 19, 20);
    pub const GRAY_160: Color32 = Color32::from_gray(160);
    pub const GRAY_210: Color32 = Color32::from_gray(210);
    pub const CURSOR: Color32 = Color32::from_rgb(230, 180, 60);
    pub const MODIFIED: Color32 = Color32::from_rgb(240, 120, 90);
    pub const SHADOW: Color32 = Color32::from_black_alpha(150);
}

pub const MEMORY_TAB: &str = "memory";
pub const DISASSEMBLY_TAB: &str = "disassembly";

pub struct HexPokeApp {
    /// Memory of the device being edited
    pub device: SimulatedDevice,
    /// Memory and disassembly views
    pub tabs: TabRegistry<dyn Tab>,
    /// Settings loaded at startup
    pub config: EditorConfig,
    /// Pop up handler
    pub popup: Popup,
    /// Image picked in "Load image...", waiting for its load address
    pub pending_image: Option<PathBuf>,
    /// Text field of the "Jump To Address" section
    pub jump_input: String,
    /// Errors outside of the editor sessions
    pub error: Option<String>,
}

impl HexPokeApp {
    pub fn new(config: EditorConfig) -> Self {
        let mut tabs: TabRegistry<dyn Tab> = TabRegistry::new();
        tabs.register(
            MEMORY_TAB,
            Box::new(EditorSession::new(HexLayout, &config)),
        );
        tabs.register(
            DISASSEMBLY_TAB,
            Box::new(EditorSession::new(DisassemblyLayout::new(Mos6502), &config)),
        );

        let mut app = Self {
            device: SimulatedDevice::new(),
            tabs,
            config,
            popup: Popup::default(),
            pending_image: None,
            jump_input: String::new(),
            error: None,
        };
        app.switch_tab(MEMORY_TAB);
        app
    }

    /// Activate tab `id`. The active tab may refuse while it has unsaved changes.
    pub(crate) fn switch_tab(&mut self, id: &str) {
        if self.tabs.active_id() == Some(id) {
            return;
        }
        if self.tabs.activate(id) {
            debug!("Switched to {id} tab");
            self.pump();
        } else {
            warn!("Active tab refused to switch to {id}");
            self.error = Some("Save or discard your changes before switching views".into());
        }
    }

    /// Perform the remote calls the active tab queued
    pub(crate) fn pump(&mut self) {
        if let Some(tab) = self.tabs.active_mut() {
            tab.pump(&mut self.device);
        }
    }

    /// Copy a file into device memory at `address` and reload the view
    pub(crate) fn load_image(&mut self, path: &Path, address: u16) {
        match std::fs::read(path) {
            Ok(bytes) => {
                let count = self.device.load_image(address, &bytes);
                if count < bytes.len() {
                    warn!(
                        "{} bytes of {} did not fit below $FFFF",
                        bytes.len() - count,
                        path.display()
                    );
                }
                self.tabs.refresh_active();
            }
            Err(err) => self.error = Some(format!("Could not read {}: {err}", path.display())),
        }
    }

    /// Is the active tab waiting for a "discard changes?" answer
    pub(crate) fn confirm_pending(&self) -> bool {
        self.tabs.active().is_some_and(|tab| tab.needs_confirmation())
    }
}
