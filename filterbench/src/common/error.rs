use thiserror::Error;

/// Errors produced by a single filter/backend invocation.
///
/// A failed verification is not an error: it is reported as `Ok(false)`.
#[derive(Debug, Error)]
pub enum Error {
    /// Bad user selection: unknown filter or method, out-of-range device
    /// index, invalid workgroup shape, mismatched image dimensions.
    #[error("{0}")]
    Configuration(String),
    /// Device, queue or kernel program could not be acquired.
    #[error("Error during operation '{operation}': {message}")]
    ResourceAcquisition { operation: String, message: String },
    /// Dispatch, synchronization or transfer failed mid-run.
    #[error("Error during operation '{operation}': {message}")]
    Execution { operation: String, message: String },
}

impl Error {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Error::Configuration(message.into())
    }

    pub(crate) fn acquisition(operation: &str, message: impl ToString) -> Self {
        Error::ResourceAcquisition {
            operation: operation.to_string(),
            message: message.to_string(),
        }
    }

    pub(crate) fn execution(operation: &str, message: impl ToString) -> Self {
        Error::Execution {
            operation: operation.to_string(),
            message: message.to_string(),
        }
    }
}

impl From<wgpu::RequestDeviceError> for Error {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        Error::acquisition("creating device", e)
    }
}

impl From<wgpu::PollError> for Error {
    fn from(e: wgpu::PollError) -> Self {
        Error::execution("waiting for device", e)
    }
}

impl From<wgpu::BufferAsyncError> for Error {
    fn from(e: wgpu::BufferAsyncError) -> Self {
        Error::execution("mapping output buffer", e)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
