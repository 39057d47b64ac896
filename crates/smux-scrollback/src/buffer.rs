/// A circular byte queue which overwrites its oldest bytes when full.
///
/// `start` is the next read position and `end` the next write position;
/// `size` counts the logically valid bytes between them. Once a write
/// overflows the remaining room, `start` snaps to the new `end` and the
/// buffer holds exactly the most recent `capacity` bytes.
///
/// Cloning produces an independent deep copy, which is how callers replay
/// the contents without consuming them: clone, then drain the clone.
#[derive(Clone)]
pub struct ScrollbackBuffer {
    storage: Vec<u8>,
    start: usize,
    end: usize,
    size: usize,
}

impl ScrollbackBuffer {
    /// Create a buffer holding at most `capacity` bytes.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "scrollback capacity must be non-zero");
        Self {
            storage: vec![0u8; capacity],
            start: 0,
            end: 0,
            size: 0,
        }
    }

    /// Number of logically valid bytes.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Fixed capacity chosen at creation.
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Append `data`, overwriting the oldest bytes when the write exceeds
    /// the remaining room. Writes that cross the end of storage split into
    /// at most two copies per wrap.
    pub fn write(&mut self, data: &[u8]) {
        let capacity = self.capacity();
        let overflow = data.len() > capacity - self.size;

        let mut i = 0;
        while i < data.len() {
            let block = (data.len() - i).min(capacity - self.end);
            self.storage[self.end..self.end + block].copy_from_slice(&data[i..i + block]);

            self.end += block;
            if self.end == capacity {
                self.end = 0;
            }
            i += block;
        }

        if overflow {
            self.start = self.end;
            self.size = capacity;
        } else {
            self.size += data.len();
        }
    }

    /// Remove up to `buf.len()` bytes in FIFO order, oldest first.
    ///
    /// Returns the number of bytes copied into `buf`, which is
    /// `min(buf.len(), size())`; an empty buffer yields 0, never an error.
    /// When the unread region wraps past the end of storage the copy splits
    /// into two segments, each clipped to the requested length.
    pub fn read(&mut self, buf: &mut [u8]) -> usize {
        let want = buf.len().min(self.size);
        if want == 0 {
            return 0;
        }

        if self.end > self.start {
            // Unread region is contiguous.
            buf[..want].copy_from_slice(&self.storage[self.start..self.start + want]);
            self.start += want;
        } else {
            let first = want.min(self.capacity() - self.start);
            buf[..first].copy_from_slice(&self.storage[self.start..self.start + first]);
            self.start = (self.start + first) % self.capacity();

            let second = want - first;
            if second > 0 {
                buf[first..want].copy_from_slice(&self.storage[..second]);
                self.start = second;
            }
        }

        self.size -= want;
        want
    }
}
