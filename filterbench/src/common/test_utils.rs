use std::sync::Arc;

use crate::prelude::*;

/// Device context for GPU tests, or `None` (with a note on stderr) when the
/// machine has no usable adapter.
pub fn test_gpu() -> Option<Gpu> {
    match Gpu::new(&DeviceSelector::default()) {
        Ok(gpu) => Some(gpu),
        Err(e) => {
            eprintln!("Skipping test - no GPU available: {}", e);
            None
        }
    }
}

/// A filter whose status messages are collected for inspection.
pub fn collecting_filter(kind: FilterKind) -> (Filter, Arc<CollectingStatus>) {
    let sink = Arc::new(CollectingStatus::default());
    let filter = Filter::with_status(kind, Status::shared(sink.clone()));
    (filter, sink)
}

/// Deterministic opaque noise image.
pub fn noise(width: u32, height: u32) -> Image {
    Image::new_random(width, height, 0x5EED).unwrap()
}
