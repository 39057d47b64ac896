use crate::error::MuxError;
use crate::window::{Window, WindowId};

/// Direction for circular window switching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

/// Ordered collection of windows plus the current-window cursor.
///
/// Windows keep creation order and monotonically increasing ids; ids are
/// never reused. When non-empty, `current` is always a valid index and
/// switching wraps modulo the window count.
pub struct WindowRegistry {
    windows: Vec<Window>,
    current: usize,
    next_id: WindowId,
}

impl WindowRegistry {
    /// Create a new, empty registry.
    pub fn new() -> Self {
        Self {
            windows: Vec::new(),
            current: 0,
            next_id: 1,
        }
    }

    /// Allocate a pty-backed window with the given scrollback capacity,
    /// append it, and make it current. Returns the new window's id.
    pub fn create(&mut self, scrollback_capacity: usize) -> Result<WindowId, MuxError> {
        let id = self.next_id;
        let window = Window::new(id, scrollback_capacity)?;
        self.next_id += 1;
        self.windows.push(window);
        self.current = self.windows.len() - 1;
        log::debug!("created window {} ({} total)", id, self.windows.len());
        Ok(id)
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Index of the current window, `None` when empty.
    pub fn current_index(&self) -> Option<usize> {
        if self.windows.is_empty() {
            None
        } else {
            Some(self.current)
        }
    }

    pub fn current(&self) -> Option<&Window> {
        self.windows.get(self.current)
    }

    pub fn current_mut(&mut self) -> Option<&mut Window> {
        self.windows.get_mut(self.current)
    }

    /// Advance the current index circularly by one in `direction`.
    pub fn switch(&mut self, direction: Direction) -> Result<WindowId, MuxError> {
        if self.windows.is_empty() {
            return Err(MuxError::EmptyRegistry);
        }

        let len = self.windows.len();
        self.current = match direction {
            Direction::Next => (self.current + 1) % len,
            Direction::Previous => (self.current + len - 1) % len,
        };
        Ok(self.windows[self.current].id())
    }

    /// Make the window at `index` current.
    pub fn select(&mut self, index: usize) -> Result<(), MuxError> {
        if index >= self.windows.len() {
            return Err(MuxError::OutOfRange {
                index,
                len: self.windows.len(),
            });
        }
        self.current = index;
        Ok(())
    }

    /// One display label per window, in registry order.
    pub fn labels(&self) -> Vec<String> {
        self.windows.iter().map(Window::label).collect()
    }

    /// Remove and return the current window.
    ///
    /// The next window in creation order (wrapping) becomes current, so a
    /// caller retiring an exited window lands on its neighbour.
    pub fn retire_current(&mut self) -> Result<Window, MuxError> {
        if self.windows.is_empty() {
            return Err(MuxError::EmptyRegistry);
        }

        let window = self.windows.remove(self.current);
        if !self.windows.is_empty() {
            self.current %= self.windows.len();
        } else {
            self.current = 0;
        }
        log::debug!("retired window {} ({} left)", window.id(), self.windows.len());
        Ok(window)
    }
}

impl Default for WindowRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CAP: usize = 512;

    #[test]
    fn test_create_assigns_increasing_ids_and_focus() {
        let mut registry = WindowRegistry::new();
        let id1 = registry.create(CAP).unwrap();
        let id2 = registry.create(CAP).unwrap();
        let id3 = registry.create(CAP).unwrap();

        assert_eq!((id1, id2, id3), (1, 2, 3));
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.current_index(), Some(2));
        assert_eq!(registry.current().unwrap().id(), 3);
    }

    #[test]
    fn test_switch_next_wraps_to_start() {
        let mut registry = WindowRegistry::new();
        registry.create(CAP).unwrap();
        registry.create(CAP).unwrap();
        registry.create(CAP).unwrap();
        registry.select(0).unwrap();

        let start = registry.current_index().unwrap();
        for _ in 0..registry.len() {
            registry.switch(Direction::Next).unwrap();
        }
        assert_eq!(registry.current_index().unwrap(), start);
    }

    #[test]
    fn test_switch_previous_wraps_backward() {
        let mut registry = WindowRegistry::new();
        registry.create(CAP).unwrap();
        registry.create(CAP).unwrap();
        registry.create(CAP).unwrap();
        registry.select(0).unwrap();

        registry.switch(Direction::Previous).unwrap();
        assert_eq!(registry.current_index(), Some(2));

        for _ in 0..registry.len() {
            registry.switch(Direction::Previous).unwrap();
        }
        assert_eq!(registry.current_index(), Some(2));
    }

    #[test]
    fn test_switch_on_empty_registry_errors() {
        let mut registry = WindowRegistry::new();
        assert!(matches!(
            registry.switch(Direction::Next),
            Err(MuxError::EmptyRegistry)
        ));
        assert!(matches!(
            registry.switch(Direction::Previous),
            Err(MuxError::EmptyRegistry)
        ));
    }

    #[test]
    fn test_select_out_of_range_errors() {
        let mut registry = WindowRegistry::new();
        registry.create(CAP).unwrap();

        assert!(registry.select(0).is_ok());
        assert!(matches!(
            registry.select(5),
            Err(MuxError::OutOfRange { index: 5, len: 1 })
        ));
    }

    #[test]
    fn test_labels_in_registry_order() {
        let mut registry = WindowRegistry::new();
        registry.create(CAP).unwrap();
        registry.create(CAP).unwrap();

        let labels = registry.labels();
        assert_eq!(labels.len(), 2);
        assert!(labels[0].starts_with("window 1"));
        assert!(labels[1].starts_with("window 2"));
    }

    #[test]
    fn test_retire_current_focuses_neighbour() {
        let mut registry = WindowRegistry::new();
        registry.create(CAP).unwrap();
        registry.create(CAP).unwrap();
        registry.create(CAP).unwrap();

        registry.select(1).unwrap();
        let retired = registry.retire_current().unwrap();
        assert_eq!(retired.id(), 2);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.current().unwrap().id(), 3);
    }

    #[test]
    fn test_retire_last_index_wraps_to_first() {
        let mut registry = WindowRegistry::new();
        registry.create(CAP).unwrap();
        registry.create(CAP).unwrap();

        // Creation leaves the newest window current (the last index).
        let retired = registry.retire_current().unwrap();
        assert_eq!(retired.id(), 2);
        assert_eq!(registry.current().unwrap().id(), 1);
    }

    #[test]
    fn test_retire_only_window_empties_registry() {
        let mut registry = WindowRegistry::new();
        registry.create(CAP).unwrap();
        registry.retire_current().unwrap();

        assert!(registry.is_empty());
        assert!(registry.current().is_none());
        assert!(matches!(
            registry.retire_current(),
            Err(MuxError::EmptyRegistry)
        ));
    }

    #[test]
    fn test_ids_not_reused_after_retire() {
        let mut registry = WindowRegistry::new();
        registry.create(CAP).unwrap();
        registry.retire_current().unwrap();
        let id = registry.create(CAP).unwrap();
        assert_eq!(id, 2);
    }
}
