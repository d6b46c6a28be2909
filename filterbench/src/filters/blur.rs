//! 5×5 box mean of the color channels. Alpha passes through.

use super::stencil::{load, neighbor_cols, neighbor_rows, store};
use crate::image::Image;

const RADIUS: i32 = 2;
const DIAMETER: usize = 2 * RADIUS as usize + 1;
const TAPS: f32 = (DIAMETER * DIAMETER) as f32;

pub(super) fn reference_row(input: &Image, output: &mut Image, y: i32) {
    for x in 0..output.width() as i32 {
        let mut sum = [0.0f32; 3];
        for j in -RADIUS..=RADIUS {
            for i in -RADIUS..=RADIUS {
                for (c, acc) in sum.iter_mut().enumerate() {
                    *acc += input.get_pixel(x + i, y + j, c);
                }
            }
        }

        for (c, acc) in sum.into_iter().enumerate() {
            output.set_pixel(x, y, c, acc / TAPS);
        }
        output.set_pixel(x, y, 3, input.get_pixel(x, y, 3));
    }
}

pub(crate) fn native_row(input: &Image, y: usize, out: &mut [u8]) {
    let width = input.width() as usize;
    let rows = neighbor_rows::<DIAMETER>(input, y);

    for x in 0..width {
        let cols = neighbor_cols::<DIAMETER>(x, width);
        let mut sum = [0.0f32; 4];
        for row in rows {
            for &cx in &cols {
                let px = load(row, cx);
                for c in 0..3 {
                    sum[c] += px[c];
                }
            }
        }

        let alpha = load(rows[DIAMETER / 2], x)[3];
        store(out, x, [sum[0] / TAPS, sum[1] / TAPS, sum[2] / TAPS, alpha]);
    }
}
