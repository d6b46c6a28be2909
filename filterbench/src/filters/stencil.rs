//! Row-level helpers for the native CPU kernels.
//!
//! Border replication is resolved once per row and column instead of per
//! tap, and pixels are handled as four `f32` lanes.

use crate::image::{CHANNELS, Image, quantize};

/// Rows `y - N/2 ..= y + N/2` of `input`, clamped to the image.
#[inline]
pub(crate) fn neighbor_rows<const N: usize>(input: &Image, y: usize) -> [&[u8]; N] {
    let row_bytes = input.row_bytes();
    let height = input.height() as usize;
    let bytes = input.bytes();

    std::array::from_fn(|k| {
        let row = clamp_index(y as isize + k as isize - (N / 2) as isize, height);
        &bytes[row * row_bytes..(row + 1) * row_bytes]
    })
}

/// Columns `x - N/2 ..= x + N/2`, clamped to `width`.
#[inline(always)]
pub(crate) fn neighbor_cols<const N: usize>(x: usize, width: usize) -> [usize; N] {
    std::array::from_fn(|k| clamp_index(x as isize + k as isize - (N / 2) as isize, width))
}

#[inline(always)]
fn clamp_index(index: isize, len: usize) -> usize {
    index.clamp(0, len as isize - 1) as usize
}

#[inline(always)]
pub(crate) fn load(row: &[u8], x: usize) -> [f32; 4] {
    let p = &row[x * CHANNELS..x * CHANNELS + CHANNELS];
    [
        p[0] as f32 / 255.0,
        p[1] as f32 / 255.0,
        p[2] as f32 / 255.0,
        p[3] as f32 / 255.0,
    ]
}

#[inline(always)]
pub(crate) fn store(row: &mut [u8], x: usize, pixel: [f32; 4]) {
    let p = &mut row[x * CHANNELS..x * CHANNELS + CHANNELS];
    for (dst, value) in p.iter_mut().zip(pixel) {
        *dst = quantize(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_and_columns_replicate_the_border() {
        let image = Image::new_with_data(2, 3, (0..24).collect()).unwrap();

        let rows = neighbor_rows::<5>(&image, 0);
        assert_eq!(rows[0], rows[2]);
        assert_eq!(rows[1], rows[2]);
        assert_eq!(rows[4][0], 16);

        assert_eq!(neighbor_cols::<5>(1, 2), [0, 0, 1, 1, 1]);
        assert_eq!(neighbor_cols::<3>(0, 1), [0, 0, 0]);
    }

    #[test]
    fn load_and_store_round_trip_a_pixel() {
        let mut row = vec![0u8; 8];
        store(&mut row, 1, [1.0, 0.5, 0.0, 2.0]);

        assert_eq!(&row[4..], &[255, 128, 0, 255]);
        assert_eq!(load(&row, 1)[0], 1.0);
    }
}
