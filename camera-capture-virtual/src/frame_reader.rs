//! Scripted frame reader: a bounded pool with latest-wins acquisition,
//! matching the two-deep buffer discipline of a real reader.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use camera_capture_core::{
    FrameListener, FrameReader, FrameSize, HardwareFrame, PixelFormat, PlaneView, TargetHandle,
};

/// Frame contents pushed into a virtual reader by a test.
#[derive(Debug, Clone)]
pub struct FrameData {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    /// Per plane: (bytes_per_row, bytes_per_pixel, bytes).
    pub planes: Vec<(u32, u32, Vec<u8>)>,
}

impl FrameData {
    pub fn new(width: u32, height: u32, format: PixelFormat, planes: Vec<(u32, u32, Vec<u8>)>) -> Self {
        Self {
            width,
            height,
            format,
            planes,
        }
    }

    /// A single-plane JPEG frame, the shape a still reader delivers.
    pub fn jpeg(width: u32, height: u32, bytes: Vec<u8>) -> Self {
        Self::new(width, height, PixelFormat::Jpeg, vec![(width, 1, bytes)])
    }

    /// A three-plane YUV 4:2:0 frame with synthetic plane contents.
    pub fn yuv(width: u32, height: u32, fill: u8) -> Self {
        let luma = vec![fill; (width * height) as usize];
        let chroma = vec![fill; (width * height / 4).max(1) as usize];
        Self::new(
            width,
            height,
            PixelFormat::Yuv420,
            vec![
                (width, 1, luma),
                (width / 2, 2, chroma.clone()),
                (width / 2, 2, chroma),
            ],
        )
    }
}

pub(crate) struct ReaderState {
    pub(crate) target: TargetHandle,
    pub(crate) size: FrameSize,
    pub(crate) format: PixelFormat,
    pub(crate) max_frames: usize,
    pub(crate) queue: VecDeque<FrameData>,
    pub(crate) listener: Option<FrameListener>,
    pub(crate) dropped: u64,
    pub(crate) closed: bool,
}

impl ReaderState {
    /// Enqueue a frame, evicting the oldest when the pool is full.
    pub(crate) fn push(&mut self, frame: FrameData) {
        if self.queue.len() >= self.max_frames {
            self.queue.pop_front();
            self.dropped += 1;
        }
        self.queue.push_back(frame);
    }
}

/// A hardware frame handed out by [`VirtualFrameReader::acquire_latest`].
struct VirtualFrame {
    data: FrameData,
}

impl HardwareFrame for VirtualFrame {
    fn width(&self) -> u32 {
        self.data.width
    }

    fn height(&self) -> u32 {
        self.data.height
    }

    fn format(&self) -> PixelFormat {
        self.data.format
    }

    fn plane_count(&self) -> usize {
        self.data.planes.len()
    }

    fn plane(&self, index: usize) -> PlaneView<'_> {
        let (bytes_per_row, bytes_per_pixel, ref bytes) = self.data.planes[index];
        PlaneView {
            bytes_per_row,
            bytes_per_pixel,
            bytes,
        }
    }
}

pub(crate) struct VirtualFrameReader {
    pub(crate) state: Arc<Mutex<ReaderState>>,
}

impl FrameReader for VirtualFrameReader {
    fn target(&self) -> TargetHandle {
        self.state.lock().target
    }

    fn set_frame_listener(&mut self, listener: Option<FrameListener>) {
        self.state.lock().listener = listener;
    }

    fn acquire_latest(&mut self) -> Option<Box<dyn HardwareFrame>> {
        let mut state = self.state.lock();
        if state.queue.is_empty() {
            return None;
        }
        // Everything but the newest frame is discarded.
        while state.queue.len() > 1 {
            state.queue.pop_front();
            state.dropped += 1;
        }
        let data = state.queue.pop_back()?;
        Some(Box::new(VirtualFrame { data }))
    }

    fn close(&mut self) {
        let mut state = self.state.lock();
        state.closed = true;
        state.listener = None;
        state.queue.clear();
    }
}
