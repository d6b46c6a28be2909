//! 3×3 Laplacian sharpen: `sum / 8 + center`, where the mask is 8 at the
//! center and -1 elsewhere.

use super::stencil::{load, neighbor_cols, neighbor_rows, store};
use crate::image::Image;

const MASK: [[f32; 3]; 3] = [[-1.0, -1.0, -1.0], [-1.0, 8.0, -1.0], [-1.0, -1.0, -1.0]];

pub(super) fn reference_row(input: &Image, output: &mut Image, y: i32) {
    for x in 0..output.width() as i32 {
        let mut sum = [0.0f32; 3];
        for j in -1..=1 {
            for i in -1..=1 {
                let weight = MASK[(j + 1) as usize][(i + 1) as usize];
                for (c, acc) in sum.iter_mut().enumerate() {
                    *acc += input.get_pixel(x + i, y + j, c) * weight;
                }
            }
        }

        for (c, acc) in sum.into_iter().enumerate() {
            output.set_pixel(x, y, c, acc / 8.0 + input.get_pixel(x, y, c));
        }
        output.set_pixel(x, y, 3, input.get_pixel(x, y, 3));
    }
}

pub(crate) fn native_row(input: &Image, y: usize, out: &mut [u8]) {
    let width = input.width() as usize;
    let rows = neighbor_rows::<3>(input, y);

    for x in 0..width {
        let cols = neighbor_cols::<3>(x, width);
        let mut sum = [0.0f32; 4];
        for (mask_row, row) in MASK.iter().zip(rows) {
            for (&weight, &cx) in mask_row.iter().zip(&cols) {
                let px = load(row, cx);
                for c in 0..3 {
                    sum[c] += px[c] * weight;
                }
            }
        }

        let center = load(rows[1], x);
        store(
            out,
            x,
            [
                sum[0] / 8.0 + center[0],
                sum[1] / 8.0 + center[1],
                sum[2] / 8.0 + center[2],
                center[3],
            ],
        );
    }
}
