//! Precompiled GPU schedule.
//!
//! The kernel source is fixed at build time: linear buffer input and
//! 16×4 tiles. Input is copied to the device before the warm-up and the
//! output copied back after the timed loop; neither transfer is timed.

mod pipeline;

use pipeline::NativeGpuPipeline;

use super::{ExecutionParams, Stage, run_timed};
use crate::common::Result;
use crate::filters::Filter;
use crate::gpu::{
    DimsUniform, Gpu, GpuInput, GpuOutput, InputLayout, acquisition_error, execution_error,
};
use crate::image::Image;
use crate::kernels::NATIVE_TILE;

pub(crate) fn run(
    filter: &mut Filter,
    input: &Image,
    output: &mut Image,
    params: &ExecutionParams,
) -> Result<bool> {
    let _span = tracing::debug_span!("native_gpu", filter = filter.name()).entered();
    let status = filter.status().clone();

    tracing::trace!(stage = %Stage::Setup);
    let gpu = Gpu::new(&params.device)?;
    status.report(format!("Using device: {}", gpu.name()));

    let pipeline = NativeGpuPipeline::new(&gpu, filter.kind())?;

    let (width, height) = input.dims();
    let (_gpu_input, gpu_output, _dims, bind_group) =
        gpu.capture("copying input to device", acquisition_error, || {
            let gpu_input = GpuInput::upload(&gpu, input, InputLayout::LinearBuffer, 1);
            let gpu_output = GpuOutput::new(&gpu, width, height);
            let dims = DimsUniform::new(width, height).create_buffer(&gpu);

            let bind_group = gpu.device().create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("native_gpu_bind_group"),
                layout: &pipeline.bind_group_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: gpu_input.binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: gpu_output.binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: dims.as_entire_binding(),
                    },
                ],
            });

            (gpu_input, gpu_output, dims, bind_group)
        })?;

    let dispatch_size = NATIVE_TILE.dispatch_size(width, height);

    status.report("Running native GPU filter");
    let timing = gpu.capture("running native GPU filter", execution_error, || {
        run_timed(
            params.iterations,
            || {
                gpu.dispatch(
                    "native_gpu_dispatch",
                    &pipeline.compute_pipeline,
                    &bind_group,
                    dispatch_size,
                );
                Ok(())
            },
            || gpu.wait(),
        )
    })??;
    status.report("Finished native GPU filter");

    gpu_output.download(&gpu, output)?;
    tracing::trace!(stage = %Stage::Teardown);

    Ok(filter.report_results(input, output, params, &timing))
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;
    use crate::common::test_utils::test_gpu;
    use crate::filters::FilterKind;

    #[test]
    fn every_native_kernel_builds() {
        let Some(gpu) = test_gpu() else {
            return;
        };

        for kind in FilterKind::iter() {
            NativeGpuPipeline::new(&gpu, kind).unwrap();
        }
    }
}
