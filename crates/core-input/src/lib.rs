//! Blocking input service.
//!
//! A dedicated thread reads crossterm events and forwards normalized
//! [`TermEvent`]s over a crossbeam channel; the single-threaded runtime
//! selects over that channel next to the message-queue wakeup. The thread
//! exits when the receiver is dropped or the event stream errors out.

use core_events::{Key, Modifiers};
use crossbeam_channel::Sender;
use crossterm::event::{
    Event as CtEvent, KeyCode as CtKey, KeyEvent as CtKeyEvent, KeyEventKind,
    KeyModifiers as CtMods,
};
use std::thread::JoinHandle;
use tracing::{debug, trace};

/// Terminal-side events delivered to the application selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermEvent {
    /// Printable text input.
    Char(char, Modifiers),
    /// Non-character key.
    Key(Key, Modifiers),
    /// New terminal size `(cols, rows)`.
    Resize(i32, i32),
}

pub(crate) fn map_mods(m: CtMods) -> Modifiers {
    let mut out = Modifiers::empty();
    if m.contains(CtMods::SHIFT) {
        out |= Modifiers::SHIFT;
    }
    if m.contains(CtMods::ALT) {
        out |= Modifiers::ALT;
    }
    if m.contains(CtMods::CONTROL) {
        out |= Modifiers::CTRL;
    }
    out
}

/// Translate one crossterm event; `None` for events the core ignores
/// (mouse, focus, release/repeat keys, paste).
pub fn translate(ev: &CtEvent) -> Option<TermEvent> {
    match ev {
        CtEvent::Key(key) => translate_key(key),
        CtEvent::Resize(cols, rows) => Some(TermEvent::Resize(*cols as i32, *rows as i32)),
        _ => None,
    }
}

fn translate_key(key: &CtKeyEvent) -> Option<TermEvent> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    let mods = map_mods(key.modifiers);
    let out = match key.code {
        CtKey::Char(c) => TermEvent::Char(c, mods),
        CtKey::Enter => TermEvent::Key(Key::Enter, mods),
        CtKey::Esc => TermEvent::Key(Key::Esc, mods),
        CtKey::Backspace => TermEvent::Key(Key::Backspace, mods),
        CtKey::Tab | CtKey::BackTab => TermEvent::Key(Key::Tab, mods),
        CtKey::Up => TermEvent::Key(Key::Up, mods),
        CtKey::Down => TermEvent::Key(Key::Down, mods),
        CtKey::Left => TermEvent::Key(Key::Left, mods),
        CtKey::Right => TermEvent::Key(Key::Right, mods),
        CtKey::Home => TermEvent::Key(Key::Home, mods),
        CtKey::End => TermEvent::Key(Key::End, mods),
        CtKey::PageUp => TermEvent::Key(Key::PageUp, mods),
        CtKey::PageDown => TermEvent::Key(Key::PageDown, mods),
        CtKey::Insert => TermEvent::Key(Key::Insert, mods),
        CtKey::Delete => TermEvent::Key(Key::Delete, mods),
        CtKey::F(n) => TermEvent::Key(Key::F(n), mods),
        _ => return None,
    };
    Some(out)
}

/// Spawn the blocking reader thread. The caller keeps the receiver; the
/// thread terminates once the channel is disconnected.
pub fn spawn_input_thread(tx: Sender<TermEvent>) -> JoinHandle<()> {
    std::thread::Builder::new()
        .name("tilewin-input".into())
        .spawn(move || {
            debug!(target: "input", "input thread started");
            loop {
                let ev = match crossterm::event::read() {
                    Ok(ev) => ev,
                    Err(e) => {
                        debug!(target: "input", error = %e, "event read failed; stopping");
                        break;
                    }
                };
                let Some(out) = translate(&ev) else {
                    trace!(target: "input", "ignored event");
                    continue;
                };
                if tx.send(out).is_err() {
                    debug!(target: "input", "receiver dropped; stopping");
                    break;
                }
            }
        })
        .expect("spawn input thread")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: CtKey, mods: CtMods) -> CtEvent {
        CtEvent::Key(CtKeyEvent::new(code, mods))
    }

    #[test]
    fn printable_maps_to_char() {
        let ev = press(CtKey::Char('a'), CtMods::NONE);
        assert_eq!(
            translate(&ev),
            Some(TermEvent::Char('a', Modifiers::empty()))
        );
    }

    #[test]
    fn control_chord_keeps_modifiers() {
        let ev = press(CtKey::Char('s'), CtMods::CONTROL | CtMods::SHIFT);
        assert_eq!(
            translate(&ev),
            Some(TermEvent::Char('s', Modifiers::CTRL | Modifiers::SHIFT))
        );
    }

    #[test]
    fn named_keys_map() {
        let ev = press(CtKey::Left, CtMods::ALT);
        assert_eq!(translate(&ev), Some(TermEvent::Key(Key::Left, Modifiers::ALT)));
        let ev = press(CtKey::F(5), CtMods::NONE);
        assert_eq!(
            translate(&ev),
            Some(TermEvent::Key(Key::F(5), Modifiers::empty()))
        );
    }

    #[test]
    fn resize_maps() {
        assert_eq!(
            translate(&CtEvent::Resize(120, 40)),
            Some(TermEvent::Resize(120, 40))
        );
    }

    #[test]
    fn release_is_ignored() {
        let mut key = CtKeyEvent::new(CtKey::Char('a'), CtMods::NONE);
        key.kind = KeyEventKind::Release;
        assert_eq!(translate(&CtEvent::Key(key)), None);
    }
}
