//! WGSL sources for the GPU backends.
//!
//! Every filter contributes one body defining
//! `fn filter_pixel(x: i32, y: i32) -> vec4<f32>`, written against a
//! `load(x, y)` helper that clamps coordinates to the image and reads the
//! input slice selected by `dims.slice`. The backends differ only in the
//! prelude placed in front of it:
//!
//! * the native GPU backend links a fixed buffer prelude and 16×4 tiles at
//!   compile time ([`native_source`]),
//! * the compute-kernel backend picks the input layout and workgroup shape
//!   when it runs and builds the program then ([`runtime_source`]).

use crate::filters::FilterKind;
use crate::gpu::{InputLayout, WorkgroupSize};

const COMMON: &str = include_str!("common.wgsl");
const LOAD_BUFFER: &str = include_str!("load_buffer.wgsl");
const LOAD_IMAGE: &str = include_str!("load_image.wgsl");
const LOAD_IMAGE_UINT: &str = include_str!("load_image_uint.wgsl");
const MAIN_RUNTIME: &str = include_str!("main_runtime.wgsl");

macro_rules! tiled_kernel {
    ($body:literal) => {
        concat!(
            include_str!("common.wgsl"),
            include_str!("load_buffer.wgsl"),
            include_str!("main_tiled.wgsl"),
            include_str!($body),
        )
    };
}

const NATIVE_COPY: &str = tiled_kernel!("copy.wgsl");
const NATIVE_BLUR: &str = tiled_kernel!("blur.wgsl");
const NATIVE_SHARPEN: &str = tiled_kernel!("sharpen.wgsl");
const NATIVE_SOBEL: &str = tiled_kernel!("sobel.wgsl");
const NATIVE_BILATERAL: &str = tiled_kernel!("bilateral.wgsl");

/// Workgroup shape baked into the native GPU kernels.
pub(crate) const NATIVE_TILE: WorkgroupSize = WorkgroupSize::new(16, 4);

/// Entry point shared by every composed program.
pub(crate) const ENTRY_POINT: &str = "main";

fn filter_body(kind: FilterKind) -> &'static str {
    match kind {
        FilterKind::Copy => include_str!("copy.wgsl"),
        FilterKind::Blur => include_str!("blur.wgsl"),
        FilterKind::Sharpen => include_str!("sharpen.wgsl"),
        FilterKind::Sobel => include_str!("sobel.wgsl"),
        FilterKind::Bilateral => include_str!("bilateral.wgsl"),
    }
}

/// Complete program for the native GPU backend.
pub(crate) fn native_source(kind: FilterKind) -> &'static str {
    match kind {
        FilterKind::Copy => NATIVE_COPY,
        FilterKind::Blur => NATIVE_BLUR,
        FilterKind::Sharpen => NATIVE_SHARPEN,
        FilterKind::Sobel => NATIVE_SOBEL,
        FilterKind::Bilateral => NATIVE_BILATERAL,
    }
}

/// Program text for the compute-kernel backend, assembled for one input
/// layout and workgroup shape.
pub(crate) fn runtime_source(
    kind: FilterKind,
    layout: InputLayout,
    workgroup: WorkgroupSize,
) -> String {
    let load = match layout {
        InputLayout::LinearBuffer => LOAD_BUFFER,
        InputLayout::ImageUnorm => LOAD_IMAGE,
        InputLayout::ImageUint => LOAD_IMAGE_UINT,
    };
    let main = MAIN_RUNTIME
        .replace("WORKGROUP_X", &workgroup.x.to_string())
        .replace("WORKGROUP_Y", &workgroup.y.to_string());

    format!("{COMMON}\n{load}\n{main}\n{}", filter_body(kind))
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn every_filter_defines_filter_pixel() {
        for kind in FilterKind::iter() {
            assert!(
                filter_body(kind).contains("fn filter_pixel(x: i32, y: i32) -> vec4<f32>"),
                "{kind} body has no filter_pixel"
            );
            assert!(native_source(kind).contains("@workgroup_size(16, 4, 1)"));
            assert!(native_source(kind).ends_with(filter_body(kind)));
        }
    }

    #[test]
    fn runtime_source_substitutes_workgroup_shape() {
        let source = runtime_source(
            FilterKind::Blur,
            InputLayout::ImageUnorm,
            WorkgroupSize::new(8, 32),
        );

        assert!(source.contains("@workgroup_size(8, 32, 1)"));
        assert!(!source.contains("WORKGROUP_X"));
        assert!(!source.contains("WORKGROUP_Y"));
        assert!(source.contains("texture_2d_array<f32>"));
    }

    #[test]
    fn runtime_source_follows_input_layout() {
        let shape = WorkgroupSize::DEFAULT;

        let buffer = runtime_source(FilterKind::Copy, InputLayout::LinearBuffer, shape);
        let uint = runtime_source(FilterKind::Copy, InputLayout::ImageUint, shape);

        assert!(buffer.contains("var<storage, read> src: array<u32>"));
        assert!(uint.contains("texture_2d_array<u32>"));
        assert!(buffer.contains("dims.slice"));
    }
}
