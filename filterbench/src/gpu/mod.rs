mod device_selector;
mod gpu_image;
mod workgroup;

pub use device_selector::{DeviceSelector, DeviceType, PlatformInfo, list_platforms};
pub use workgroup::WorkgroupSize;

pub(crate) use gpu_image::{DimsUniform, GpuInput, GpuOutput, InputLayout};

use crate::common::{Error, Result};

/// Device context for one backend invocation.
///
/// Owns the wgpu device and queue. Dropping it releases the device; nothing
/// is shared between invocations.
#[derive(Debug)]
pub struct Gpu {
    info: wgpu::AdapterInfo,
    device: wgpu::Device,
    queue: wgpu::Queue,
}

impl Gpu {
    /// Creates a device context on the adapter picked by `selector`.
    pub fn new(selector: &DeviceSelector) -> Result<Self> {
        let instance = device_selector::create_instance();
        let adapter = device_selector::select_adapter(&instance, selector)?;
        let info = adapter.get_info();

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("filterbench_device"),
            required_limits: adapter.limits(),
            ..Default::default()
        }))?;

        tracing::debug!("created device context on {} ({:?})", info.name, info.backend);

        Ok(Self {
            info,
            device,
            queue,
        })
    }

    pub fn info(&self) -> &wgpu::AdapterInfo {
        &self.info
    }

    /// Human-readable device name, e.g. `"NVIDIA GeForce RTX 3080 (Vulkan, DiscreteGpu)"`.
    pub fn name(&self) -> String {
        format!(
            "{} ({:?}, {:?})",
            self.info.name, self.info.backend, self.info.device_type
        )
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn limits(&self) -> wgpu::Limits {
        self.device.limits()
    }

    /// Blocks until every submitted command buffer has completed.
    pub fn wait(&self) -> Result<()> {
        self.device.poll(wgpu::PollType::wait_indefinitely())?;
        Ok(())
    }

    /// Records and submits one 2D dispatch of `pipeline`. Does not wait.
    pub(crate) fn dispatch(
        &self,
        label: &str,
        pipeline: &wgpu::ComputePipeline,
        bind_group: &wgpu::BindGroup,
        (groups_x, groups_y): (u32, u32),
    ) {
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some(label) });

        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some(label),
                timestamp_writes: None,
            });
            pass.set_pipeline(pipeline);
            pass.set_bind_group(0, bind_group, &[]);
            pass.dispatch_workgroups(groups_x, groups_y, 1);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
    }

    /// Runs `f` with device errors captured instead of reaching the
    /// uncaptured-error handler.
    ///
    /// `to_error` turns the captured message into the caller's error kind,
    /// so setup failures become resource-acquisition errors and dispatch
    /// failures become execution errors.
    pub(crate) fn capture<T>(
        &self,
        operation: &str,
        to_error: fn(&str, String) -> Error,
        f: impl FnOnce() -> T,
    ) -> Result<T> {
        self.device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);

        let value = f();

        let validation = pollster::block_on(self.device.pop_error_scope());
        let out_of_memory = pollster::block_on(self.device.pop_error_scope());

        match validation.or(out_of_memory) {
            Some(err) => Err(to_error(operation, err.to_string())),
            None => Ok(value),
        }
    }
}

impl Drop for Gpu {
    fn drop(&mut self) {
        tracing::trace!("released device context on {}", self.info.name);
    }
}

/// Error constructor for failures while acquiring resources.
pub(crate) fn acquisition_error(operation: &str, message: String) -> Error {
    Error::acquisition(operation, message)
}

/// Error constructor for failures while running.
pub(crate) fn execution_error(operation: &str, message: String) -> Error {
    Error::execution(operation, message)
}
