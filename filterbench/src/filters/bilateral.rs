//! 5×5 bilateral filter: Gaussian in distance (sigma 3 px) times Gaussian
//! in RGB distance (sigma 0.2). Alpha passes through.

use super::stencil::{load, neighbor_cols, neighbor_rows, store};
use crate::image::Image;

const RADIUS: i32 = 2;
const DIAMETER: usize = 2 * RADIUS as usize + 1;
const SPATIAL_SIGMA: f32 = 3.0;
const COLOR_SIGMA: f32 = 0.2;

#[inline(always)]
fn gaussian(distance: f32, sigma: f32) -> f32 {
    let d = distance / sigma;
    (-0.5 * d * d).exp()
}

fn spatial_weight(i: i32, j: i32) -> f32 {
    gaussian(((i * i + j * j) as f32).sqrt(), SPATIAL_SIGMA)
}

pub(super) fn reference_row(input: &Image, output: &mut Image, y: i32) {
    for x in 0..output.width() as i32 {
        let center = [
            input.get_pixel(x, y, 0),
            input.get_pixel(x, y, 1),
            input.get_pixel(x, y, 2),
        ];

        let mut coeff = 0.0f32;
        let mut sum = [0.0f32; 3];
        for j in -RADIUS..=RADIUS {
            for i in -RADIUS..=RADIUS {
                let tap = [
                    input.get_pixel(x + i, y + j, 0),
                    input.get_pixel(x + i, y + j, 1),
                    input.get_pixel(x + i, y + j, 2),
                ];
                let distance = tap
                    .iter()
                    .zip(&center)
                    .map(|(a, b)| (a - b) * (a - b))
                    .sum::<f32>()
                    .sqrt();

                let weight = spatial_weight(i, j) * gaussian(distance, COLOR_SIGMA);
                coeff += weight;
                for c in 0..3 {
                    sum[c] += tap[c] * weight;
                }
            }
        }

        for (c, acc) in sum.into_iter().enumerate() {
            output.set_pixel(x, y, c, acc / coeff);
        }
        output.set_pixel(x, y, 3, input.get_pixel(x, y, 3));
    }
}

pub(crate) fn native_row(input: &Image, y: usize, out: &mut [u8]) {
    let width = input.width() as usize;
    let rows = neighbor_rows::<DIAMETER>(input, y);
    let spatial: [[f32; DIAMETER]; DIAMETER] = std::array::from_fn(|j| {
        std::array::from_fn(|i| spatial_weight(i as i32 - RADIUS, j as i32 - RADIUS))
    });

    for x in 0..width {
        let cols = neighbor_cols::<DIAMETER>(x, width);
        let center = load(rows[DIAMETER / 2], x);

        let mut coeff = 0.0f32;
        let mut sum = [0.0f32; 4];
        for (weights, row) in spatial.iter().zip(rows) {
            for (&near, &cx) in weights.iter().zip(&cols) {
                let tap = load(row, cx);
                let dr = tap[0] - center[0];
                let dg = tap[1] - center[1];
                let db = tap[2] - center[2];
                let distance = (dr * dr + dg * dg + db * db).sqrt();

                let weight = near * gaussian(distance, COLOR_SIGMA);
                coeff += weight;
                for c in 0..3 {
                    sum[c] += tap[c] * weight;
                }
            }
        }

        store(
            out,
            x,
            [sum[0] / coeff, sum[1] / coeff, sum[2] / coeff, center[3]],
        );
    }
}
