use crate::foundation::core::FrameDims;
use crate::foundation::error::{TimemaskError, TimemaskResult};
use crate::frame::Frame;

/// Fixed-capacity ring of the most recent frames, addressable oldest to newest.
///
/// Slots live in one contiguous allocation that grows until `capacity` frames are held and is
/// then overwritten in place, so `push` never shifts existing frames.
#[derive(Clone, Debug)]
pub struct FrameBuffer {
    dims: FrameDims,
    capacity: usize,
    frame_len: usize,
    storage: Vec<u8>,
    // Slot that the next push writes to.
    cursor: usize,
    len: usize,
}

impl FrameBuffer {
    pub fn new(capacity: usize, dims: FrameDims) -> TimemaskResult<Self> {
        if capacity == 0 {
            return Err(TimemaskError::validation(
                "frame buffer capacity must be > 0",
            ));
        }
        let frame_len = dims.checked_byte_len()?;
        frame_len
            .checked_mul(capacity)
            .ok_or_else(|| TimemaskError::validation("frame buffer size overflow"))?;
        Ok(Self {
            dims,
            capacity,
            frame_len,
            storage: Vec::new(),
            cursor: 0,
            len: 0,
        })
    }

    pub fn dims(&self) -> FrameDims {
        self.dims
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == self.capacity
    }

    /// Copy `frame` in as the newest entry, evicting the oldest when full.
    pub fn push(&mut self, frame: &Frame) -> TimemaskResult<()> {
        if frame.dims() != self.dims {
            return Err(TimemaskError::geometry(format!(
                "pushed frame is {}, buffer holds {}",
                frame.dims(),
                self.dims
            )));
        }

        let start = self.cursor * self.frame_len;
        if start == self.storage.len() {
            self.storage.extend_from_slice(frame.data());
        } else {
            self.storage[start..start + self.frame_len].copy_from_slice(frame.data());
        }

        self.cursor = (self.cursor + 1) % self.capacity;
        self.len = (self.len + 1).min(self.capacity);
        Ok(())
    }

    /// Frame `index` steps newer than the oldest held frame.
    pub fn at(&self, index: usize) -> TimemaskResult<&[u8]> {
        if index >= self.len {
            return Err(TimemaskError::IndexOutOfRange {
                index,
                len: self.len,
            });
        }
        let slot = (self.oldest_slot() + index) % self.capacity;
        let start = slot * self.frame_len;
        Ok(&self.storage[start..start + self.frame_len])
    }

    pub fn newest(&self) -> Option<&[u8]> {
        self.len.checked_sub(1).and_then(|i| self.at(i).ok())
    }

    pub fn oldest(&self) -> Option<&[u8]> {
        self.at(0).ok()
    }

    /// Drop all frames but keep the allocation.
    pub fn clear(&mut self) {
        self.cursor = 0;
        self.len = 0;
    }

    fn oldest_slot(&self) -> usize {
        (self.cursor + self.capacity - self.len) % self.capacity
    }
}
