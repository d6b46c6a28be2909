//! Sobel gradient magnitude of the luma channel, written as opaque gray.

use super::stencil::{load, neighbor_cols, neighbor_rows, store};
use crate::image::{Image, LUMA_WEIGHTS};

/// Indexed `[i + 1][j + 1]` for gx and `[j + 1][i + 1]` for gy, where `i`
/// is the horizontal offset and `j` the vertical one.
const MASK: [[f32; 3]; 3] = [[-1.0, -2.0, -1.0], [0.0, 0.0, 0.0], [1.0, 2.0, 1.0]];

pub(super) fn reference_row(input: &Image, output: &mut Image, y: i32) {
    for x in 0..output.width() as i32 {
        let mut gx = 0.0f32;
        let mut gy = 0.0f32;
        for j in -1..=1 {
            for i in -1..=1 {
                let luma = input.get_pixel_grayscale(x + i, y + j);
                gx += luma * MASK[(i + 1) as usize][(j + 1) as usize];
                gy += luma * MASK[(j + 1) as usize][(i + 1) as usize];
            }
        }

        output.set_pixel_grayscale(x, y, (gx * gx + gy * gy).sqrt());
    }
}

#[inline(always)]
fn luma(px: [f32; 4]) -> f32 {
    px[0] * LUMA_WEIGHTS[0] + px[1] * LUMA_WEIGHTS[1] + px[2] * LUMA_WEIGHTS[2]
}

pub(crate) fn native_row(input: &Image, y: usize, out: &mut [u8]) {
    let width = input.width() as usize;
    let rows = neighbor_rows::<3>(input, y);

    for x in 0..width {
        let cols = neighbor_cols::<3>(x, width);
        let mut gx = 0.0f32;
        let mut gy = 0.0f32;
        for (j, row) in rows.iter().enumerate() {
            for (i, &cx) in cols.iter().enumerate() {
                let l = luma(load(row, cx));
                gx += l * MASK[i][j];
                gy += l * MASK[j][i];
            }
        }

        let magnitude = (gx * gx + gy * gy).sqrt();
        store(out, x, [magnitude, magnitude, magnitude, 1.0]);
    }
}
