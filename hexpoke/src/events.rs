use eframe::egui;
use hexpokelib::{Key, KeyEvent, Modifiers};

/// Input of one frame, translated for the editor sessions
#[derive(Default, Clone)]
pub struct FrameInput {
    /// Key presses in the order they happened
    pub keys: Vec<KeyEvent>,
    /// The platform copy shortcut was used
    pub copy: bool,
    /// Text from the platform paste shortcut
    pub paste: Option<String>,
    pub pointer_pressed: bool,
    pub pointer_down: bool,
    pub pointer_released: bool,
    pub pointer_pos: Option<egui::Pos2>,
    pub shift: bool,
}

#[allow(clippy::enum_glob_use)]
/// Helper for mapping letter and digit keys to chars
const fn key_to_char(key: egui::Key) -> Option<char> {
    use egui::Key::*;
    Some(match key {
        Num0 => '0',
        Num1 => '1',
        Num2 => '2',
        Num3 => '3',
        Num4 => '4',
        Num5 => '5',
        Num6 => '6',
        Num7 => '7',
        Num8 => '8',
        Num9 => '9',
        A => 'A',
        B => 'B',
        C => 'C',
        D => 'D',
        E => 'E',
        F => 'F',
        N => 'N',
        R => 'R',
        S => 'S',
        Y => 'Y',
        _ => return None,
    })
}

const fn translate_key(key: egui::Key) -> Option<Key> {
    Some(match key {
        egui::Key::ArrowLeft => Key::ArrowLeft,
        egui::Key::ArrowRight => Key::ArrowRight,
        egui::Key::ArrowUp => Key::ArrowUp,
        egui::Key::ArrowDown => Key::ArrowDown,
        egui::Key::Home => Key::Home,
        egui::Key::End => Key::End,
        egui::Key::PageUp => Key::PageUp,
        egui::Key::PageDown => Key::PageDown,
        egui::Key::Tab => Key::Tab,
        egui::Key::Enter => Key::Enter,
        egui::Key::Escape => Key::Escape,
        egui::Key::Backspace => Key::Backspace,
        egui::Key::Delete => Key::Delete,
        egui::Key::F5 => Key::F5,
        _ => match key_to_char(key) {
            Some(ch) => Key::Char(ch),
            None => return None,
        },
    })
}

/// Collect events once per frame and return the translated state
pub fn collect_frame_input(ctx: &egui::Context) -> FrameInput {
    ctx.input(|i| {
        let mut input = FrameInput {
            pointer_pressed: i.pointer.primary_pressed(),
            pointer_down: i.pointer.primary_down(),
            pointer_released: i.pointer.primary_released(),
            pointer_pos: i.pointer.interact_pos(),
            shift: i.modifiers.shift,
            ..Default::default()
        };

        for event in &i.events {
            match event {
                // Only presses, repeats included
                egui::Event::Key {
                    key,
                    pressed: true,
                    modifiers,
                    ..
                } => {
                    if let Some(key) = translate_key(*key) {
                        input.keys.push(KeyEvent {
                            key,
                            modifiers: Modifiers {
                                shift: modifiers.shift,
                                ctrl: modifiers.command || modifiers.ctrl,
                            },
                        });
                    }
                }
                egui::Event::Copy => input.copy = true,
                egui::Event::Paste(text) => input.paste = Some(text.clone()),
                _ => {}
            }
        }

        input
    })
}
