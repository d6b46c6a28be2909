// Error handling
pub use crate::common::{Error, Result};

// Status channel
pub use crate::common::{CollectingStatus, Status, StatusSink, TracingStatus};

// Image model
pub use crate::image::{CHANNELS, Image, LUMA_WEIGHTS};

// Filters
pub use crate::filters::{
    DEFAULT_TOLERANCE, Filter, FilterKind, MAX_REPORTED_MISMATCHES, ReferenceCache,
    display_precision,
};

// Backends
pub use crate::backends::{ExecutionParams, Method, Stage, Timing};

// Devices
pub use crate::gpu::{DeviceSelector, DeviceType, Gpu, PlatformInfo, WorkgroupSize, list_platforms};

// Driver
pub use crate::registry::Registry;
