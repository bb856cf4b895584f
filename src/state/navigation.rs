#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// Keyboard focus among the visible results. `0` means nothing is focused,
/// `1..=V` is a 1-based position in the visible list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NavigationState {
    cursor: usize,
}

impl NavigationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Zero-based visible offset of the focused item.
    pub fn active_offset(&self) -> Option<usize> {
        self.cursor.checked_sub(1)
    }

    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    pub fn focus_offset(&mut self, offset: usize, visible: usize) -> bool {
        if offset >= visible {
            return false;
        }
        self.cursor = offset + 1;
        true
    }

    /// Moves the cursor with wraparound over `visible` items.
    pub fn step(&mut self, direction: Direction, visible: usize) -> usize {
        self.cursor = next_cursor(self.cursor, direction, visible);
        self.cursor
    }

    /// Drops the focus if it no longer points at a visible item.
    pub fn clamp(&mut self, visible: usize) {
        if self.cursor > visible {
            self.cursor = 0;
        }
    }
}

pub fn next_cursor(cursor: usize, direction: Direction, visible: usize) -> usize {
    if visible == 0 {
        return 0;
    }
    match direction {
        Direction::Down => {
            let next = cursor + 1;
            if next > visible { 1 } else { next }
        }
        Direction::Up => {
            if cursor <= 1 {
                visible
            } else {
                (cursor - 1).min(visible)
            }
        }
    }
}
