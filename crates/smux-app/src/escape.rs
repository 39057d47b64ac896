//! ANSI escape sequences and key bytes used by the interactive surface.

/// Switch to the alternate screen buffer and home the cursor.
pub const ALT_SCREEN_ENTER: &[u8] = b"\x1b[?1049h\x1b[H";
/// Return to the main screen buffer.
pub const ALT_SCREEN_EXIT: &[u8] = b"\x1b[?1049l";
/// Home the cursor and erase the whole screen.
pub const CLEAR_SCREEN: &[u8] = b"\x1b[1;1H\x1b[2J";
/// Blue background, used to mark the selected menu entry.
pub const HIGHLIGHT: &[u8] = b"\x1b[44m";
/// Reset all graphic attributes.
pub const RESET_ATTRIBUTES: &[u8] = b"\x1b[0m";

pub const KEY_ESC: u8 = 0x1b;
pub const KEY_BRACKET: u8 = b'[';
pub const KEY_ARROW_UP: u8 = b'A';
pub const KEY_ARROW_DOWN: u8 = b'B';
pub const KEY_ENTER: u8 = 13;
pub const KEY_SPACE: u8 = b' ';

/// Cursor movement directions, rendered as CSI sequences.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CursorDir {
    Up,
    Down,
    Left,
    Right,
}

impl CursorDir {
    /// CSI sequence moving the cursor `n` cells in this direction.
    pub fn sequence(self, n: usize) -> String {
        let code = match self {
            CursorDir::Up => 'A',
            CursorDir::Down => 'B',
            CursorDir::Left => 'D',
            CursorDir::Right => 'C',
        };
        format!("\x1b[{n}{code}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_sequences_use_final_bytes_per_direction() {
        assert_eq!(CursorDir::Up.sequence(3), "\x1b[3A");
        assert_eq!(CursorDir::Down.sequence(1), "\x1b[1B");
        assert_eq!(CursorDir::Left.sequence(2), "\x1b[2D");
        assert_eq!(CursorDir::Right.sequence(10), "\x1b[10C");
    }
}
