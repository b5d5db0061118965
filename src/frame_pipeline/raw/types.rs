//! Raw frame types

use std::fmt;

/// Opaque name of a driver-owned capture buffer.
///
/// Only the driver interprets it, typically to return the buffer to its pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferHandle(pub u64);

/// Non-owning view over a driver-delivered frame.
///
/// The lifetime is the validity window: the bytes belong to the driver's
/// buffer pool and stay valid only until the next buffer is delivered or this
/// one is released. Anything that needs the data longer must call
/// [`RawFrameView::to_owned_frame`].
#[derive(Clone, Copy)]
pub struct RawFrameView<'a> {
    bytes: &'a [u8],
    width: u32,
    height: u32,
    handle: Option<BufferHandle>,
}

impl<'a> RawFrameView<'a> {
    pub fn new(bytes: &'a [u8], width: u32, height: u32) -> Self {
        Self {
            bytes,
            width,
            height,
            handle: None,
        }
    }

    pub fn with_handle(mut self, handle: BufferHandle) -> Self {
        self.handle = Some(handle);
        self
    }

    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn geometry(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn handle(&self) -> Option<BufferHandle> {
        self.handle
    }

    /// Copies the bytes out of the driver buffer.
    pub fn to_owned_frame(&self) -> OwnedRawFrame {
        OwnedRawFrame {
            bytes: self.bytes.to_vec(),
            width: self.width,
            height: self.height,
            handle: self.handle,
        }
    }
}

impl fmt::Debug for RawFrameView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawFrameView")
            .field("len", &self.bytes.len())
            .field("width", &self.width)
            .field("height", &self.height)
            .field("handle", &self.handle)
            .finish()
    }
}

/// Raw frame bytes copied out of the driver pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedRawFrame {
    bytes: Vec<u8>,
    width: u32,
    height: u32,
    handle: Option<BufferHandle>,
}

impl OwnedRawFrame {
    pub fn new(bytes: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            bytes,
            width,
            height,
            handle: None,
        }
    }

    pub fn view(&self) -> RawFrameView<'_> {
        RawFrameView {
            bytes: &self.bytes,
            width: self.width,
            height: self.height,
            handle: self.handle,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn handle(&self) -> Option<BufferHandle> {
        self.handle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owned_copy_outlives_the_driver_buffer() {
        let owned = {
            let pool_buffer = vec![1u8, 2, 3, 4];
            let view = RawFrameView::new(&pool_buffer, 2, 2).with_handle(BufferHandle(7));
            view.to_owned_frame()
        };

        assert_eq!(owned.bytes(), &[1, 2, 3, 4]);
        assert_eq!(owned.handle(), Some(BufferHandle(7)));
        let view = owned.view();
        assert_eq!(view.geometry(), (2, 2));
        assert_eq!(view.len(), 4);

        let rebuilt = OwnedRawFrame::new(vec![1, 2, 3, 4], 2, 2);
        assert_eq!(rebuilt.bytes(), owned.bytes());
        assert_eq!(rebuilt.handle(), None);
    }
}
