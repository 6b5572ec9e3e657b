//! The session controller: Browse/Edit state machine, window loading and the single
//! outstanding remote call.
//!
//! An [`EditorSession`] never talks to the device itself. Operations that need it queue
//! a [`RemoteRequest`] and set the busy flag. The host takes the request with
//! [`EditorSession::take_request`], performs it however it likes and reports back with
//! [`EditorSession::complete_read`] or [`EditorSession::complete_write`]. While busy,
//! anything that would start another remote call is swallowed.
//!
//! [`drive`] performs queued requests synchronously against a [`DeviceMemory`].

use crate::address::{AddressRange, MemoryWindow};
use crate::buffer::Change;
use crate::cellmap::{CellLayout, Navigation};
use crate::commit::plan_commit;
use crate::config::EditorConfig;
use crate::device::DeviceMemory;
use crate::editor::{BlinkTimer, MemoryEditor, RowView};
use crate::error::ApiError;
use crate::input::{Key, KeyEvent, PointerEvent};
use crate::tabs::TabLifecycle;
use log::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Browse,
    Edit,
}

/// Why a window is being read. Decides what happens with the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadPurpose {
    /// Show another window. Failure keeps the previous one.
    Navigate,
    /// Fresh snapshot to edit. Failure stays in Browse.
    EnterEdit,
    /// Ground truth after a successful save
    AfterSave,
    /// Ground truth after discarding edits
    AfterDiscard,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteRequest {
    Read {
        window: MemoryWindow,
        purpose: ReadPurpose,
    },
    Write {
        address: u16,
        bytes: Vec<u8>,
    },
}

#[derive(Debug, Clone)]
pub struct EditorSession<L> {
    editor: MemoryEditor<L>,
    /// Window currently shown
    window: MemoryWindow,
    mode: Mode,
    /// Request the host has not picked up yet
    outbox: Option<RemoteRequest>,
    /// Request waiting for completion. Doubles as the busy flag.
    in_flight: Option<RemoteRequest>,
    /// "Discard changes?" is waiting for an answer
    confirm_discard: bool,
    /// A host dialog owns the keyboard
    modal_open: bool,
    /// Last user-facing error
    error: Option<String>,
    /// Last user-facing notice
    status: Option<String>,
    /// Text the host should put on the system clipboard
    clipboard_out: Option<String>,
    blink: BlinkTimer,
}

impl<L: CellLayout> EditorSession<L> {
    pub fn new(layout: L, config: &EditorConfig) -> Self {
        let length = config.window_length(layout.navigation());
        Self {
            editor: MemoryEditor::new(layout, config),
            window: MemoryWindow::new(i64::from(config.start_address), length),
            mode: Mode::Browse,
            outbox: None,
            in_flight: None,
            confirm_discard: false,
            modal_open: false,
            error: None,
            status: None,
            clipboard_out: None,
            blink: BlinkTimer::new(config.blink_interval_ms),
        }
    }

    // -- State access

    pub const fn mode(&self) -> Mode {
        self.mode
    }

    pub const fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    pub const fn window(&self) -> MemoryWindow {
        self.window
    }

    pub const fn editor(&self) -> &MemoryEditor<L> {
        &self.editor
    }

    pub const fn needs_confirmation(&self) -> bool {
        self.confirm_discard
    }

    pub const fn is_modal_open(&self) -> bool {
        self.modal_open
    }

    /// Suspend keyboard routing while a host dialog is shown
    pub const fn set_modal_open(&mut self, open: bool) {
        self.modal_open = open;
    }

    pub fn is_modified(&self) -> bool {
        self.editor.is_modified()
    }

    pub fn get_changes(&self) -> Vec<Change> {
        self.editor.changes()
    }

    pub const fn get_address_range(&self) -> AddressRange {
        self.window.range()
    }

    pub fn take_error(&mut self) -> Option<String> {
        self.error.take()
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn take_clipboard(&mut self) -> Option<String> {
        self.clipboard_out.take()
    }

    pub const fn set_show_all_opcodes(&mut self, show: bool) {
        self.editor.set_show_all_opcodes(show);
    }

    pub const fn set_bytes_per_row(&mut self, bytes_per_row: usize) {
        self.editor.set_bytes_per_row(bytes_per_row);
    }

    /// Is the edit cursor drawn right now
    pub const fn cursor_visible(&self) -> bool {
        matches!(self.mode, Mode::Edit) && self.blink.is_visible()
    }

    pub fn rows(&self) -> Vec<RowView> {
        self.editor.rows(self.cursor_visible())
    }

    /// Advance the cursor blink. Returns `true` if a redraw is needed.
    pub const fn tick(&mut self, dt_ms: u64) -> bool {
        matches!(self.mode, Mode::Edit) && self.blink.tick(dt_ms)
    }

    // -- Remote call protocol

    fn issue(&mut self, request: RemoteRequest) {
        debug!("Issuing {request:?}");
        self.outbox = Some(request.clone());
        self.in_flight = Some(request);
    }

    /// Hand the queued request to the host
    pub fn take_request(&mut self) -> Option<RemoteRequest> {
        self.outbox.take()
    }

    /// Result of the outstanding read
    pub fn complete_read(&mut self, result: Result<Vec<u8>, ApiError>) {
        let (window, purpose) = match self.in_flight.take() {
            Some(RemoteRequest::Read { window, purpose }) => (window, purpose),
            other => {
                warn!("Ignoring read completion, outstanding request is {other:?}");
                self.in_flight = other;
                return;
            }
        };

        match result {
            Ok(bytes) => {
                if bytes.len() != window.length {
                    warn!(
                        "Read of ${:04X} returned {} bytes, expected {}",
                        window.base_address,
                        bytes.len(),
                        window.length
                    );
                }
                self.window = window;
                self.editor.load(&bytes, window.base_address);

                if purpose == ReadPurpose::EnterEdit {
                    self.mode = Mode::Edit;
                    self.blink.reset();
                    debug!("Entered edit mode at ${:04X}", window.base_address);
                }
            }
            Err(err) => {
                warn!("Read for {purpose:?} failed: {err}");
                self.error = Some(match purpose {
                    ReadPurpose::Navigate => format!("Could not load memory: {err}"),
                    ReadPurpose::EnterEdit => format!("Could not enter edit mode: {err}"),
                    ReadPurpose::AfterSave | ReadPurpose::AfterDiscard => {
                        format!("Could not reload memory: {err}")
                    }
                });
            }
        }
    }

    /// Result of the outstanding write
    pub fn complete_write(&mut self, result: Result<(), ApiError>) {
        let (address, length) = match self.in_flight.take() {
            Some(RemoteRequest::Write { address, bytes }) => (address, bytes.len()),
            other => {
                warn!("Ignoring write completion, outstanding request is {other:?}");
                self.in_flight = other;
                return;
            }
        };

        match result {
            Ok(()) => {
                info!("Wrote {length} bytes at ${address:04X}");
                self.status = Some(format!("Saved {length} bytes at ${address:04X}"));
                self.editor.commit();
                self.mode = Mode::Browse;
                self.issue(RemoteRequest::Read {
                    window: self.window,
                    purpose: ReadPurpose::AfterSave,
                });
            }
            Err(err) => {
                // Stay in Edit with all changes so the user can retry
                warn!("Write of {length} bytes at ${address:04X} failed: {err}");
                self.error = Some(format!("Save failed: {err}"));
            }
        }
    }

    // -- Navigation (Browse only)

    fn navigate(&mut self, window: MemoryWindow) -> bool {
        if self.mode != Mode::Browse || self.is_busy() {
            return false;
        }
        self.issue(RemoteRequest::Read {
            window,
            purpose: ReadPurpose::Navigate,
        });
        true
    }

    pub fn navigate_to_address(&mut self, address: i64) -> bool {
        self.navigate(MemoryWindow::new(address, self.window.length))
    }

    pub fn navigate_left(&mut self) -> bool {
        self.navigate(self.window.shifted(-1))
    }

    pub fn navigate_right(&mut self) -> bool {
        self.navigate(self.window.shifted(1))
    }

    #[allow(clippy::cast_possible_wrap)]
    fn line_step(&self, down: bool) -> i64 {
        match self.editor.navigation() {
            Navigation::Rows => self.editor.bytes_per_row() as i64,
            Navigation::Cells if down => match self.editor.map().cell(0) {
                Some(cell) => cell.byte_length as i64,
                None => 1,
            },
            Navigation::Cells => 1,
        }
    }

    pub fn navigate_up(&mut self) -> bool {
        self.navigate(self.window.shifted(-self.line_step(false)))
    }

    pub fn navigate_down(&mut self) -> bool {
        self.navigate(self.window.shifted(self.line_step(true)))
    }

    #[allow(clippy::cast_possible_wrap)]
    pub fn navigate_prev_page(&mut self) -> bool {
        self.navigate(self.window.shifted(-(self.window.length as i64)))
    }

    /// Next window. The disassembly view continues right after its last decoded
    /// instruction.
    #[allow(clippy::cast_possible_wrap)]
    pub fn navigate_next_page(&mut self) -> bool {
        let map = self.editor.map();
        let step = match self.editor.navigation() {
            Navigation::Cells if !map.is_empty() => map
                .buffer_offset(map.len() - 1)
                .map_or(self.window.length, |last| last + 1),
            _ => self.window.length,
        };
        self.navigate(self.window.shifted(step as i64))
    }

    /// Read the current window again
    pub fn refresh(&mut self) -> bool {
        self.navigate(self.window)
    }

    // -- Edit lifecycle

    /// Take a fresh snapshot of the window and start editing it
    pub fn enter_edit_mode(&mut self) -> bool {
        if self.mode != Mode::Browse || self.is_busy() {
            return false;
        }
        self.issue(RemoteRequest::Read {
            window: self.window,
            purpose: ReadPurpose::EnterEdit,
        });
        true
    }

    /// Leave Edit mode, writing the changes if `save` is set, dropping them otherwise.
    /// Returns `false` if not editing or busy.
    pub fn exit_edit_mode(&mut self, save: bool) -> bool {
        if self.mode != Mode::Edit || self.is_busy() {
            return false;
        }
        self.confirm_discard = false;

        if save {
            match plan_commit(self.editor.buffer()) {
                Some(range) => self.issue(RemoteRequest::Write {
                    address: range.address,
                    bytes: range.bytes,
                }),
                None => {
                    debug!("Nothing to save, leaving edit mode");
                    self.editor.clear_selection();
                    self.mode = Mode::Browse;
                }
            }
        } else {
            debug!("Discarding changes, leaving edit mode");
            self.editor.discard();
            self.mode = Mode::Browse;
            self.issue(RemoteRequest::Read {
                window: self.window,
                purpose: ReadPurpose::AfterDiscard,
            });
        }
        true
    }

    /// Escape: drop the selection, else ask before losing changes, else leave
    pub fn request_exit(&mut self) {
        if self.mode != Mode::Edit || self.editor.clear_selection() {
            return;
        }
        if self.editor.is_modified() {
            self.confirm_discard = true;
        } else {
            self.exit_edit_mode(false);
        }
    }

    /// Answer the "discard changes?" question
    pub fn confirm(&mut self, accept: bool) {
        if !self.confirm_discard {
            return;
        }
        self.confirm_discard = false;
        if accept {
            self.exit_edit_mode(false);
        }
    }

    // -- Clipboard

    /// Hex text of the selection (or the byte under the cursor). Also queued for the
    /// host in [`Self::take_clipboard`].
    pub fn copy(&mut self) -> Option<String> {
        if self.mode != Mode::Edit || self.modal_open {
            return None;
        }
        let text = self.editor.copy_text()?;
        self.clipboard_out = Some(text.clone());
        Some(text)
    }

    /// Paste clipboard (or manually entered) text at the cursor.
    /// Assembly errors end up in the error slot.
    ///
    /// Ignored while a dialog is open. Swallowed while busy or while a "discard
    /// changes?" answer is pending.
    pub fn paste(&mut self, text: &str) -> bool {
        if self.mode != Mode::Edit || self.modal_open {
            return false;
        }
        if self.is_busy() || self.confirm_discard {
            return true;
        }

        match self.editor.paste_text(text) {
            Ok(_) => self.blink.reset(),
            Err(err) => {
                warn!("Paste failed: {err}");
                self.error = Some(err.to_string());
            }
        }
        true
    }

    // -- Input routing

    /// Route a key press. Returns `true` if it was consumed.
    pub fn handle_key(&mut self, event: &KeyEvent) -> bool {
        if self.modal_open {
            return false;
        }

        if self.confirm_discard {
            if event.key == Key::Enter || event.is_char('y') {
                self.confirm(true);
            } else if event.key == Key::Escape || event.is_char('n') {
                self.confirm(false);
            }
            return true;
        }

        match self.mode {
            Mode::Browse => self.handle_browse_key(event),
            Mode::Edit => self.handle_edit_key(event),
        }
    }

    fn handle_browse_key(&mut self, event: &KeyEvent) -> bool {
        if event.modifiers.ctrl {
            return false;
        }

        let action: fn(&mut Self) -> bool = match event.key {
            Key::Char(_) if event.is_char('e') => Self::enter_edit_mode,
            Key::Char(_) if event.is_char('r') => Self::refresh,
            Key::F5 => Self::refresh,
            Key::ArrowLeft => Self::navigate_left,
            Key::ArrowRight => Self::navigate_right,
            Key::ArrowUp => Self::navigate_up,
            Key::ArrowDown => Self::navigate_down,
            Key::PageUp => Self::navigate_prev_page,
            Key::PageDown => Self::navigate_next_page,
            _ => return false,
        };

        if self.is_busy() {
            debug!("Busy, swallowing {:?}", event.key);
        } else {
            action(self);
        }
        true
    }

    fn handle_edit_key(&mut self, event: &KeyEvent) -> bool {
        if event.key == Key::Escape {
            self.request_exit();
            return true;
        }

        if event.modifiers.ctrl && event.is_char('s') {
            self.exit_edit_mode(true);
            return true;
        }

        if event.modifiers.ctrl && event.is_char('c') {
            self.copy();
            return true;
        }

        // The baseline must match what the pending write sends
        let mutates = event.hex_digit().is_some()
            || matches!(event.key, Key::Backspace | Key::Delete);
        if mutates && self.is_busy() {
            return true;
        }

        let consumed = self.editor.handle_key(event);
        if consumed {
            self.blink.reset();
        }
        consumed
    }

    /// Route pointer activity. Only the edit view reacts to it.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> bool {
        if self.mode != Mode::Edit || self.modal_open {
            return false;
        }
        let consumed = self.editor.handle_pointer(event);
        if consumed {
            self.blink.reset();
        }
        consumed
    }
}

impl<L: CellLayout> TabLifecycle for EditorSession<L> {
    fn initialize(&mut self) {
        self.refresh();
    }

    fn activate(&mut self) {
        // The other view may have changed memory meanwhile
        if self.mode == Mode::Browse {
            self.refresh();
        }
    }

    fn deactivate(&mut self) {
        if self.mode == Mode::Edit {
            self.exit_edit_mode(false);
        }
    }

    fn can_deactivate(&self) -> bool {
        !(self.mode == Mode::Edit && self.editor.is_modified()) && !self.is_busy()
    }

    fn refresh(&mut self) {
        self.navigate(self.window);
    }
}

/// Perform every queued request against `device` until the session is idle.
/// Returns the number of remote calls made.
pub fn drive<L, D>(session: &mut EditorSession<L>, device: &mut D) -> usize
where
    L: CellLayout,
    D: DeviceMemory + ?Sized,
{
    let mut calls = 0;

    while let Some(request) = session.take_request() {
        calls += 1;
        match request {
            RemoteRequest::Read { window, .. } => {
                let result = device.read_memory(window.base_address, window.length);
                session.complete_read(result);
            }
            RemoteRequest::Write { address, bytes } => {
                let result = device.write_memory(address, &bytes);
                session.complete_write(result);
            }
        }
    }

    calls
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cellmap::{DisassemblyLayout, HexLayout};
    use crate::device::SimulatedDevice;
    use crate::mos6502::Mos6502;

    fn config() -> EditorConfig {
        EditorConfig {
            start_address: 0xC000,
            hex_window_length: 16,
            ..EditorConfig::default()
        }
    }

    fn browsing() -> (EditorSession<HexLayout>, SimulatedDevice) {
        let mut session = EditorSession::new(HexLayout, &config());
        let mut dev = SimulatedDevice::new();
        session.refresh();
        drive(&mut session, &mut dev);
        (session, dev)
    }

    #[test]
    fn test_initial_window() {
        let session = EditorSession::new(HexLayout, &config());

        assert_eq!(session.mode(), Mode::Browse);
        assert_eq!(
            session.get_address_range(),
            AddressRange {
                start_address: 0xC000,
                end_address: 0xC00F,
                length: 16
            }
        );
    }

    #[test]
    fn test_busy_swallows_remote_keys() {
        // Arrange
        let (mut session, _dev) = browsing();
        assert!(session.navigate_right());
        assert!(session.is_busy());

        // Act & Assert: swallowed, no new request
        assert!(session.handle_key(&KeyEvent::plain(Key::ArrowRight)));
        assert!(session.handle_key(&KeyEvent::plain(Key::Char('e'))));
        assert!(!session.enter_edit_mode());
        assert!(session.take_request().is_some());
        assert!(session.take_request().is_none());

        // Unrelated keys pass through
        assert!(!session.handle_key(&KeyEvent::plain(Key::Char('x'))));
    }

    #[test]
    fn test_navigation_steps() {
        let (mut session, mut dev) = browsing();

        session.navigate_down();
        drive(&mut session, &mut dev);
        assert_eq!(session.window().base_address, 0xC010);

        session.navigate_prev_page();
        drive(&mut session, &mut dev);
        assert_eq!(session.window().base_address, 0xC000);

        session.navigate_to_address(0xFFFF);
        drive(&mut session, &mut dev);
        assert_eq!(session.window().base_address, 0xFFF0);

        session.navigate_left();
        drive(&mut session, &mut dev);
        assert_eq!(session.window().base_address, 0xFFEF);
    }

    #[test]
    fn test_failed_navigation_keeps_window() {
        let (mut session, mut dev) = browsing();
        dev.fail_next_read(ApiError::Transport("timeout".into()));

        session.navigate_to_address(0x2000);
        drive(&mut session, &mut dev);

        assert_eq!(session.window().base_address, 0xC000);
        assert!(session.take_error().is_some());
        assert!(session.take_error().is_none());
        assert!(!session.is_busy());
    }

    #[test]
    fn test_stray_completion_is_ignored() {
        let (mut session, _dev) = browsing();
        session.complete_write(Ok(()));
        session.complete_read(Ok(vec![1, 2, 3]));

        assert_eq!(session.editor().buffer().len(), 16);
        assert_eq!(session.mode(), Mode::Browse);
    }

    #[test]
    fn test_save_without_changes_makes_no_call() {
        let (mut session, mut dev) = browsing();
        session.enter_edit_mode();
        drive(&mut session, &mut dev);
        assert_eq!(session.mode(), Mode::Edit);

        session.handle_key(&KeyEvent::ctrl(Key::Char('s')));

        assert_eq!(session.mode(), Mode::Browse);
        assert!(session.take_request().is_none());
        assert!(dev.writes().is_empty());
    }

    #[test]
    fn test_edits_swallowed_while_saving() {
        // Arrange
        let (mut session, mut dev) = browsing();
        session.enter_edit_mode();
        drive(&mut session, &mut dev);
        session.handle_key(&KeyEvent::plain(Key::Char('1')));
        session.exit_edit_mode(true);

        // Act
        session.handle_key(&KeyEvent::plain(Key::Char('2')));

        // Assert
        assert_eq!(session.editor().buffer().byte(0), Some(0x10));
        drive(&mut session, &mut dev);
        assert_eq!(dev.writes(), &[(0xC000, vec![0x10])]);
        assert_eq!(session.mode(), Mode::Browse);
    }

    #[test]
    fn test_modal_suspends_keys() {
        let (mut session, _dev) = browsing();
        session.set_modal_open(true);

        assert!(!session.handle_key(&KeyEvent::plain(Key::Char('e'))));
        assert!(!session.is_busy());
    }

    #[test]
    fn test_paste_waits_for_confirmation_and_dialogs() {
        // Arrange: an edit with "discard changes?" pending
        let (mut session, mut dev) = browsing();
        session.enter_edit_mode();
        drive(&mut session, &mut dev);
        session.handle_key(&KeyEvent::plain(Key::Char('1')));
        session.handle_key(&KeyEvent::plain(Key::Escape));
        assert!(session.needs_confirmation());

        // Act & Assert: swallowed without touching the buffer
        assert!(session.paste("FF FF"));
        assert_eq!(session.editor().buffer().current()[..2], [0x10, 0x00]);
        assert!(session.needs_confirmation());

        // Keep editing, then open a dialog: paste and copy are ignored
        session.confirm(false);
        session.set_modal_open(true);
        assert!(!session.paste("77"));
        assert_eq!(session.copy(), None);
        assert_eq!(session.editor().buffer().current()[..2], [0x10, 0x00]);

        // Dialog closed: paste goes through at the cursor
        session.set_modal_open(false);
        assert!(session.paste("77"));
        assert_eq!(session.editor().buffer().current()[..2], [0x77, 0x00]);
    }

    #[test]
    fn test_copy_queues_clipboard_text() {
        let (mut session, mut dev) = browsing();
        assert_eq!(session.copy(), None);

        session.enter_edit_mode();
        drive(&mut session, &mut dev);
        session.handle_key(&KeyEvent::ctrl(Key::Char('c')));

        assert_eq!(session.take_clipboard().as_deref(), Some("00"));
    }

    #[test]
    fn test_bad_assembly_paste_reports_error() {
        let mut session = EditorSession::new(DisassemblyLayout::new(Mos6502), &config());
        let mut dev = SimulatedDevice::new();
        session.enter_edit_mode();
        drive(&mut session, &mut dev);

        assert!(session.paste("JMP nowhere"));
        assert!(session.take_error().is_some_and(|e| e.contains("line 1")));
        assert!(!session.is_modified());
    }

    #[test]
    fn test_disassembly_next_page_follows_last_instruction() {
        // Arrange: 96 byte window ending in the middle of a JMP
        let mut dev = SimulatedDevice::new();
        let mut image = vec![0xEA; 95];
        image.push(0x4C);
        dev.load_image(0xC000, &image);

        let mut session = EditorSession::new(DisassemblyLayout::new(Mos6502), &config());
        session.refresh();
        drive(&mut session, &mut dev);
        assert_eq!(session.editor().map().len(), 95);

        // Act
        session.navigate_next_page();
        drive(&mut session, &mut dev);

        // Assert
        assert_eq!(session.window().base_address, 0xC05F);
    }

    #[test]
    fn test_blink_only_in_edit_mode() {
        let (mut session, mut dev) = browsing();
        assert!(!session.tick(10_000));
        assert!(!session.cursor_visible());

        session.enter_edit_mode();
        drive(&mut session, &mut dev);
        assert!(session.cursor_visible());
        assert!(session.tick(400));
        assert!(!session.cursor_visible());
    }
}
