pub(crate) mod error;
pub(crate) mod status;
#[cfg(test)]
pub(crate) mod test_utils;

pub use error::{Error, Result};
pub use status::{CollectingStatus, Status, StatusSink, TracingStatus};
