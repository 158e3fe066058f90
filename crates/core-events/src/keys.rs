//! Normalized key and modifier types delivered to window handlers.
//!
//! Printable input arrives separately as text (`WM_CHAR` at the window
//! layer); `Key` covers only the non-character keys.

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const SHIFT = 1;
        const ALT   = 2;
        const CTRL  = 4;
    }
}

/// Non-character keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Enter,
    Esc,
    Backspace,
    Tab,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    Insert,
    Delete,
    F(u8),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modifier_bits_are_stable() {
        assert_eq!(Modifiers::SHIFT.bits(), 1);
        assert_eq!(Modifiers::ALT.bits(), 2);
        assert_eq!(Modifiers::CTRL.bits(), 4);
    }

    #[test]
    fn modifiers_combine() {
        let m = Modifiers::CTRL | Modifiers::SHIFT;
        assert!(m.contains(Modifiers::CTRL));
        assert!(!m.contains(Modifiers::ALT));
    }
}
