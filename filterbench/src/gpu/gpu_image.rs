use std::sync::mpsc;

use wgpu::util::DeviceExt;

use super::Gpu;
use crate::common::{Error, Result};
use crate::image::Image;

/// How the input image is presented to a kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InputLayout {
    /// Packed RGBA8 words in a storage buffer.
    LinearBuffer,
    /// `Rgba8Unorm` texture, sampled as normalized floats.
    ImageUnorm,
    /// `Rgba8Uint` texture, sampled as raw integers.
    ImageUint,
}

/// Input image resident on the device, stored as `slices` identical
/// copies stacked one after another. Released when dropped.
#[derive(Debug)]
pub(crate) enum GpuInput {
    Buffer(wgpu::Buffer),
    Texture {
        texture: wgpu::Texture,
        view: wgpu::TextureView,
    },
}

impl GpuInput {
    /// Uploads `slices` copies of `image` (textures get at least two). The
    /// write is complete once the next submission is.
    pub fn upload(gpu: &Gpu, image: &Image, layout: InputLayout, slices: u32) -> Self {
        let format = match layout {
            InputLayout::LinearBuffer => {
                let contents = image.bytes().repeat(slices.max(1) as usize);
                let buffer = gpu
                    .device()
                    .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some("input_buffer"),
                        contents: &contents,
                        usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
                    });
                return GpuInput::Buffer(buffer);
            }
            InputLayout::ImageUnorm => wgpu::TextureFormat::Rgba8Unorm,
            InputLayout::ImageUint => wgpu::TextureFormat::Rgba8Uint,
        };

        // GL only allocates an array texture for two or more layers.
        let layers = slices.max(2);
        let contents = image.bytes().repeat(layers as usize);
        let size = wgpu::Extent3d {
            width: image.width(),
            height: image.height(),
            depth_or_array_layers: layers,
        };

        let texture = gpu.device().create_texture(&wgpu::TextureDescriptor {
            label: Some("input_image"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        gpu.queue().write_texture(
            texture.as_image_copy(),
            &contents,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(image.row_bytes() as u32),
                rows_per_image: Some(image.height()),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("input_image_view"),
            dimension: Some(wgpu::TextureViewDimension::D2Array),
            ..Default::default()
        });

        GpuInput::Texture { texture, view }
    }

    /// Most copies of `image_bytes` that fit into one input resource.
    pub fn max_slices(limits: &wgpu::Limits, layout: InputLayout, image_bytes: usize) -> u32 {
        let image_bytes = image_bytes.max(1) as u64;
        let by_size = match layout {
            InputLayout::LinearBuffer => {
                let binding = limits.max_storage_buffer_binding_size as u64;
                limits.max_buffer_size.min(binding) / image_bytes
            }
            InputLayout::ImageUnorm | InputLayout::ImageUint => {
                let layers = limits.max_texture_array_layers as u64;
                (limits.max_buffer_size / image_bytes).min(layers)
            }
        };

        by_size.clamp(1, u32::MAX as u64) as u32
    }

    pub fn binding(&self) -> wgpu::BindingResource<'_> {
        match self {
            GpuInput::Buffer(buffer) => buffer.as_entire_binding(),
            GpuInput::Texture { view, .. } => wgpu::BindingResource::TextureView(view),
        }
    }
}

impl Drop for GpuInput {
    fn drop(&mut self) {
        match self {
            GpuInput::Buffer(buffer) => buffer.destroy(),
            GpuInput::Texture { texture, .. } => texture.destroy(),
        }
    }
}

/// Output image on the device: one packed RGBA8 word per pixel.
#[derive(Debug)]
pub(crate) struct GpuOutput {
    buffer: wgpu::Buffer,
    width: u32,
    height: u32,
}

impl GpuOutput {
    pub fn new(gpu: &Gpu, width: u32, height: u32) -> Self {
        let buffer = gpu.device().create_buffer(&wgpu::BufferDescriptor {
            label: Some("output_buffer"),
            size: width as u64 * height as u64 * 4,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });

        Self {
            buffer,
            width,
            height,
        }
    }

    pub fn binding(&self) -> wgpu::BindingResource<'_> {
        self.buffer.as_entire_binding()
    }

    /// Copies the device buffer back into `output`. Blocks until done.
    pub fn download(&self, gpu: &Gpu, output: &mut Image) -> Result<()> {
        if output.dims() != (self.width, self.height) {
            return Err(Error::config(format!(
                "Cannot download {}x{} device output into {}",
                self.width, self.height, output
            )));
        }

        let size = self.buffer.size();
        let staging = gpu.device().create_buffer(&wgpu::BufferDescriptor {
            label: Some("output_staging"),
            size,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut encoder = gpu
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("output_download_encoder"),
            });
        encoder.copy_buffer_to_buffer(&self.buffer, 0, &staging, 0, size);
        gpu.queue().submit(std::iter::once(encoder.finish()));

        let (tx, rx) = mpsc::channel();
        let slice = staging.slice(..);
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });

        gpu.wait()?;
        rx.recv()
            .map_err(|e| Error::execution("mapping output buffer", e))??;

        {
            let data = slice.get_mapped_range();
            output.bytes_mut().copy_from_slice(&data);
        }
        staging.unmap();
        staging.destroy();

        Ok(())
    }
}

impl Drop for GpuOutput {
    fn drop(&mut self) {
        self.buffer.destroy();
    }
}

/// Image dimensions and the input slice to read, as seen by every kernel
/// (`struct Dims` in WGSL).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct DimsUniform {
    pub width: u32,
    pub height: u32,
    pub slice: u32,
    _padding: u32,
}

impl DimsUniform {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            slice: 0,
            _padding: 0,
        }
    }

    pub fn with_slice(self, slice: u32) -> Self {
        Self { slice, ..self }
    }

    pub fn create_buffer(&self, gpu: &Gpu) -> wgpu::Buffer {
        gpu.device()
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("dims_uniform"),
                contents: bytemuck::bytes_of(self),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            })
    }

    /// Queues an update of `buffer`; it applies to the next submission.
    pub fn write(&self, gpu: &Gpu, buffer: &wgpu::Buffer) {
        gpu.queue().write_buffer(buffer, 0, bytemuck::bytes_of(self));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::test_utils::test_gpu;
    use crate::gpu::acquisition_error;

    #[test]
    fn output_download_matches_dimensions() {
        let Some(gpu) = test_gpu() else {
            return;
        };

        let output = GpuOutput::new(&gpu, 3, 2);
        let mut image = Image::new_filled(3, 2, [9, 9, 9, 9]).unwrap();
        output.download(&gpu, &mut image).unwrap();

        assert_eq!(image.dims(), (3, 2));
    }

    #[test]
    fn download_rejects_other_dimensions() {
        let Some(gpu) = test_gpu() else {
            return;
        };

        let output = GpuOutput::new(&gpu, 3, 2);
        let mut image = Image::new_empty(2, 3).unwrap();

        let result = output.download(&gpu, &mut image);

        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn uploads_every_layout() {
        let Some(gpu) = test_gpu() else {
            return;
        };

        let image = Image::new_random(5, 3, 1).unwrap();
        for layout in [
            InputLayout::LinearBuffer,
            InputLayout::ImageUnorm,
            InputLayout::ImageUint,
        ] {
            let input = gpu
                .capture("uploading input", acquisition_error, || {
                    GpuInput::upload(&gpu, &image, layout, 3)
                })
                .unwrap();
            let _ = input.binding();
        }
        gpu.wait().unwrap();
    }

    #[test]
    fn slice_count_is_bounded_by_device_limits() {
        let limits = wgpu::Limits {
            max_buffer_size: 1000,
            max_storage_buffer_binding_size: 400,
            max_texture_array_layers: 3,
            ..wgpu::Limits::default()
        };

        assert_eq!(GpuInput::max_slices(&limits, InputLayout::LinearBuffer, 100), 4);
        assert_eq!(GpuInput::max_slices(&limits, InputLayout::ImageUnorm, 100), 3);
        assert_eq!(GpuInput::max_slices(&limits, InputLayout::ImageUint, 500), 2);
        assert_eq!(GpuInput::max_slices(&limits, InputLayout::LinearBuffer, 4096), 1);
    }

    #[test]
    fn dims_uniform_matches_wgsl_layout() {
        let dims = DimsUniform::new(7, 5).with_slice(2);

        assert_eq!(std::mem::size_of::<DimsUniform>(), 16);
        assert_eq!(bytemuck::cast::<_, [u32; 4]>(dims), [7, 5, 2, 0]);
    }
}
