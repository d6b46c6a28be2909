use crate::common::Result;
use crate::filters::FilterKind;
use crate::gpu::{Gpu, acquisition_error};
use crate::kernels;

/// Compute pipeline of one filter's precompiled GPU kernel.
#[derive(Debug)]
pub(crate) struct NativeGpuPipeline {
    pub(super) compute_pipeline: wgpu::ComputePipeline,
    pub(super) bind_group_layout: wgpu::BindGroupLayout,
}

impl NativeGpuPipeline {
    pub fn new(gpu: &Gpu, kind: FilterKind) -> Result<Self> {
        gpu.capture("loading native kernel", acquisition_error, || {
            Self::create(gpu, kind)
        })
    }

    fn create(gpu: &Gpu, kind: FilterKind) -> Self {
        let device = gpu.device();

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("native_gpu_shader"),
            source: wgpu::ShaderSource::Wgsl(kernels::native_source(kind).into()),
        });

        let storage = |binding, read_only| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::COMPUTE,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Storage { read_only },
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("native_gpu_bind_group_layout"),
            entries: &[
                // Input pixels
                storage(0, true),
                // Output pixels
                storage(1, false),
                // Dims uniform
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("native_gpu_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let compute_pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("native_gpu_pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: Some(kernels::ENTRY_POINT),
            compilation_options: Default::default(),
            cache: None,
        });

        Self {
            compute_pipeline,
            bind_group_layout,
        }
    }
}
