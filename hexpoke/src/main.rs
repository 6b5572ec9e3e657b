#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic
)]
// Tell OS to hide the console window when running.
// This attribute is only applied if the target OS is Windows.
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app;
mod events;
mod ui_button;
mod ui_editor;
mod ui_menubar;
mod ui_popup;
mod ui_sidepanel;
mod ui_tabs;

use crate::ui_popup::PopupType;
use app::HexPokeApp;
use eframe::egui;
use hexpokelib::EditorConfig;
use log::{info, warn};

const CONFIG_PATH: &str = "hexpoke.toml";

fn load_config() -> EditorConfig {
    if !std::path::Path::new(CONFIG_PATH).exists() {
        info!("No {CONFIG_PATH} found, using default settings");
        return EditorConfig::default();
    }

    match EditorConfig::load(CONFIG_PATH) {
        Ok(config) => config,
        Err(err) => {
            warn!("Ignoring {CONFIG_PATH}: {err}");
            EditorConfig::default()
        }
    }
}

fn main() -> eframe::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = load_config();

    let options = eframe::NativeOptions {
        vsync: true,
        viewport: egui::ViewportBuilder::default()
            .with_resizable(true)
            .with_inner_size([1100.0, 720.0]),
        ..Default::default()
    };
    eframe::run_native(
        "HexPoke",
        options,
        Box::new(|_cc| Ok(Box::new(HexPokeApp::new(config)))),
    )
}

impl eframe::App for HexPokeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.show_menu_bar(ctx);
        self.show_tabs(ctx);
        self.show_side_panel(ctx);

        // Errors reported by the active tab end up in a pop-up
        if let Some(tab) = self.tabs.active_mut()
            && let Some(err) = tab.take_error()
        {
            self.error = Some(err);
        }
        if self.error.is_some() && self.popup.ptype != Some(PopupType::Error) {
            self.popup.open(PopupType::Error);
        }

        // Dialogs own the keyboard while shown, including the frame they close in
        let modal = self.popup.active;
        if let Some(tab) = self.tabs.active_mut() {
            tab.set_modal_open(modal);
        }

        if self.popup.active {
            self.show_popup(ctx);
        } else if self.confirm_pending() {
            self.show_confirm_discard(ctx);
        }

        self.show_editor(ctx, !modal);
        self.pump();
    }
}
