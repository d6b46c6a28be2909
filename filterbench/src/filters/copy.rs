use crate::image::Image;

pub(super) fn reference_row(input: &Image, output: &mut Image, y: i32) {
    let row_bytes = input.row_bytes();
    let start = y as usize * row_bytes;
    output.bytes_mut()[start..start + row_bytes]
        .copy_from_slice(&input.bytes()[start..start + row_bytes]);
}

pub(crate) fn native_row(input: &Image, y: usize, out: &mut [u8]) {
    let row_bytes = input.row_bytes();
    out.copy_from_slice(&input.bytes()[y * row_bytes..(y + 1) * row_bytes]);
}
