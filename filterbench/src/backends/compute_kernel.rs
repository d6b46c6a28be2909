//! Kernel programs assembled and built from source at run time.
//!
//! The program is specialized for the selected device's input layout and
//! workgroup shape, built on that device, and its build diagnostics are
//! forwarded to the status channel when the build fails. Copy runs once per
//! input layout and additionally reports the achieved memory bandwidth. Its
//! input holds several copies of the image and every dispatch reads the next
//! one, so the figure is not served from cache.

use std::fmt::Write as _;

use super::{ExecutionParams, Stage, Timing, run_timed};
use crate::common::{Error, Result, Status};
use crate::filters::{Filter, FilterKind};
use crate::gpu::{
    DimsUniform, Gpu, GpuInput, GpuOutput, InputLayout, WorkgroupSize, acquisition_error,
    execution_error,
};
use crate::image::Image;
use crate::kernels;

/// Copy variants, one per input layout.
const COPY_VARIANTS: [(&str, InputLayout); 3] = [
    ("buffer", InputLayout::LinearBuffer),
    ("image_float", InputLayout::ImageUnorm),
    ("image_int", InputLayout::ImageUint),
];

pub(crate) fn run(
    filter: &mut Filter,
    input: &Image,
    output: &mut Image,
    params: &ExecutionParams,
) -> Result<bool> {
    let _span = tracing::debug_span!("compute_kernel", filter = filter.name()).entered();
    let status = filter.status().clone();

    tracing::trace!(stage = %Stage::Setup);
    let gpu = Gpu::new(&params.device)?;
    status.report(format!("Using device: {}", gpu.name()));

    let workgroup = params.workgroup_or_default();
    workgroup.validate(&gpu.limits())?;

    if filter.kind() == FilterKind::Copy {
        return run_copy_variants(filter, &gpu, workgroup, input, output, params);
    }

    let kernel = KernelRun::prepare(
        &gpu,
        &status,
        filter.kind(),
        InputLayout::ImageUnorm,
        workgroup,
        input,
        1,
    )?;

    status.report("Running compute kernel");
    let timing = kernel.timed(params.iterations)?;
    status.report("Finished compute kernel");

    kernel.download(output)?;
    drop(kernel);
    tracing::trace!(stage = %Stage::Teardown);

    Ok(filter.report_results(input, output, params, &timing))
}

fn run_copy_variants(
    filter: &mut Filter,
    gpu: &Gpu,
    workgroup: WorkgroupSize,
    input: &Image,
    output: &mut Image,
    params: &ExecutionParams,
) -> Result<bool> {
    let status = filter.status().clone();
    let mut passed = true;

    for (name, layout) in COPY_VARIANTS {
        let slices = copy_slices(&gpu.limits(), layout, input, params.iterations);
        tracing::debug!(variant = name, slices, "uploading copy input");
        let kernel = KernelRun::prepare(
            gpu,
            &status,
            FilterKind::Copy,
            layout,
            workgroup,
            input,
            slices,
        )?;

        status.report(format!("Running compute kernel ({name})"));
        let timing = kernel.timed(params.iterations)?;
        kernel.download(output)?;
        drop(kernel);

        let bandwidth = match copy_bandwidth_gbps(input.size_in_bytes(), &timing, params.iterations)
        {
            Some(gbps) => format!("{gbps:.1} GB/s"),
            None => "N/A".to_string(),
        };
        let verified = filter.report_results(input, output, params, &timing);
        let outcome = match (params.verify, verified) {
            (false, _) => "",
            (true, true) => " (passed)",
            (true, false) => " (failed)",
        };
        status.report(format!("{name:>12}: {bandwidth}{outcome}"));

        passed &= verified;
    }

    Ok(passed)
}

/// One input copy per dispatch, warm-up included, as far as the device
/// allows.
fn copy_slices(
    limits: &wgpu::Limits,
    layout: InputLayout,
    input: &Image,
    iterations: u32,
) -> u32 {
    let wanted = iterations.saturating_add(1);
    wanted.min(GpuInput::max_slices(limits, layout, input.size_in_bytes()))
}

/// Bytes read plus bytes written per second, in GB/s.
fn copy_bandwidth_gbps(image_bytes: usize, timing: &Timing, iterations: u32) -> Option<f64> {
    let seconds = timing.elapsed().as_secs_f64();
    (iterations > 0 && seconds > 0.0)
        .then(|| 2.0 * image_bytes as f64 * iterations as f64 / seconds * 1e-9)
}

/// A built program with its resources bound, ready to dispatch.
struct KernelRun<'a> {
    gpu: &'a Gpu,
    pipeline: wgpu::ComputePipeline,
    bind_group: wgpu::BindGroup,
    dispatch_size: (u32, u32),
    output: GpuOutput,
    dims: DimsUniform,
    dims_buffer: wgpu::Buffer,
    slices: u32,
    _input: GpuInput,
}

impl<'a> KernelRun<'a> {
    fn prepare(
        gpu: &'a Gpu,
        status: &Status,
        kind: FilterKind,
        layout: InputLayout,
        workgroup: WorkgroupSize,
        input: &Image,
        slices: u32,
    ) -> Result<Self> {
        let source = kernels::runtime_source(kind, layout, workgroup);
        let label = format!("{kind}_kernel");
        let pipeline = build_program(gpu, status, &label, &source)?;

        let (width, height) = input.dims();
        let dims = DimsUniform::new(width, height);
        let (gpu_input, output, dims_buffer, bind_group) =
            gpu.capture("allocating kernel resources", acquisition_error, || {
                let gpu_input = GpuInput::upload(gpu, input, layout, slices);
                let output = GpuOutput::new(gpu, width, height);
                let dims_buffer = dims.create_buffer(gpu);

                let bind_group = gpu.device().create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("compute_kernel_bind_group"),
                    layout: &pipeline.get_bind_group_layout(0),
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: gpu_input.binding(),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: output.binding(),
                        },
                        wgpu::BindGroupEntry {
                            binding: 2,
                            resource: dims_buffer.as_entire_binding(),
                        },
                    ],
                });

                (gpu_input, output, dims_buffer, bind_group)
            })?;

        Ok(Self {
            gpu,
            pipeline,
            bind_group,
            dispatch_size: workgroup.dispatch_size(width, height),
            output,
            dims,
            dims_buffer,
            slices: slices.max(1),
            _input: gpu_input,
        })
    }

    fn timed(&self, iterations: u32) -> Result<Timing> {
        let mut dispatched = 0u32;

        self.gpu.capture("running kernel", execution_error, || {
            run_timed(
                iterations,
                || {
                    if self.slices > 1 {
                        let slice = dispatched % self.slices;
                        self.dims.with_slice(slice).write(self.gpu, &self.dims_buffer);
                    }
                    dispatched = dispatched.wrapping_add(1);
                    self.gpu.dispatch(
                        "compute_kernel_dispatch",
                        &self.pipeline,
                        &self.bind_group,
                        self.dispatch_size,
                    );
                    Ok(())
                },
                || self.gpu.wait(),
            )
        })?
    }

    fn download(&self, output: &mut Image) -> Result<()> {
        self.output.download(self.gpu, output)
    }
}

/// Builds `source` into a compute pipeline with an inferred layout.
///
/// On failure the compiler messages are reported on `status` as a build
/// log before the error is returned.
pub(crate) fn build_program(
    gpu: &Gpu,
    status: &Status,
    label: &str,
    source: &str,
) -> Result<wgpu::ComputePipeline> {
    let device = gpu.device();

    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });
    let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
        label: Some(label),
        layout: None,
        module: &module,
        entry_point: Some(kernels::ENTRY_POINT),
        compilation_options: Default::default(),
        cache: None,
    });
    let error = pollster::block_on(device.pop_error_scope());

    let Some(error) = error else {
        return Ok(pipeline);
    };

    let info = pollster::block_on(module.get_compilation_info());
    status.report(build_log(&info, &error));

    Err(Error::acquisition("building program", error))
}

fn build_log(info: &wgpu::CompilationInfo, error: &wgpu::Error) -> String {
    let mut log = String::from("Build log:");

    for message in &info.messages {
        let severity = format!("{:?}", message.message_type).to_lowercase();
        let _ = match &message.location {
            Some(location) => write!(
                log,
                "\n{}:{}: {}: {}",
                location.line_number, location.line_position, severity, message.message
            ),
            None => write!(log, "\n{}: {}", severity, message.message),
        };
    }
    if info.messages.is_empty() {
        let _ = write!(log, "\n{error}");
    }

    log
}
