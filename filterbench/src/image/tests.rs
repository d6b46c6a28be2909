use crate::prelude::*;

use super::quantize;

#[test]
fn new_empty_is_zeroed() {
    let img = Image::new_empty(3, 2).unwrap();
    assert_eq!(img.dims(), (3, 2));
    assert_eq!(img.size_in_bytes(), 3 * 2 * 4);
    assert_eq!(img.row_bytes(), 12);
    assert!(img.bytes().iter().all(|&b| b == 0));
}

#[test]
fn zero_dimensions_are_rejected() {
    assert!(matches!(
        Image::new_empty(0, 4),
        Err(Error::Configuration(_))
    ));
    assert!(matches!(
        Image::new_empty(4, 0),
        Err(Error::Configuration(_))
    ));
}

#[test]
fn data_length_must_match_dimensions() {
    assert!(Image::new_with_data(2, 2, vec![0; 16]).is_ok());
    assert!(matches!(
        Image::new_with_data(2, 2, vec![0; 15]),
        Err(Error::Configuration(_))
    ));
}

#[test]
fn get_pixel_normalizes_bytes() {
    let img = Image::new_with_data(1, 1, vec![0, 51, 255, 128]).unwrap();
    assert_eq!(img.get_pixel(0, 0, 0), 0.0);
    assert!((img.get_pixel(0, 0, 1) - 0.2).abs() < 1e-6);
    assert_eq!(img.get_pixel(0, 0, 2), 1.0);
    assert!((img.get_pixel(0, 0, 3) - 128.0 / 255.0).abs() < 1e-6);
}

#[test]
fn out_of_bounds_reads_replicate_the_border() {
    // 2x2 image with distinct red values per pixel.
    let mut bytes = vec![0u8; 16];
    bytes[0] = 10;
    bytes[4] = 20;
    bytes[8] = 30;
    bytes[12] = 40;
    let img = Image::new_with_data(2, 2, bytes).unwrap();

    let red = |x, y| (img.get_pixel(x, y, 0) * 255.0).round() as u8;

    assert_eq!(red(-5, -5), 10);
    assert_eq!(red(7, -1), 20);
    assert_eq!(red(-1, 9), 30);
    assert_eq!(red(100, 100), 40);
}

#[test]
fn one_by_one_image_tolerates_any_coordinate() {
    let mut img = Image::new_with_data(1, 1, vec![1, 2, 3, 4]).unwrap();
    for (x, y) in [(-2, -2), (0, 0), (1, 0), (0, 1), (i32::MAX, i32::MIN)] {
        assert_eq!(img.get_pixel(x, y, 2), 3.0 / 255.0);
    }

    img.set_pixel(42, -42, 0, 1.0);
    assert_eq!(img.bytes(), &[255, 2, 3, 4]);
}

#[test]
fn set_pixel_clamps_and_rounds() {
    let mut img = Image::new_empty(1, 1).unwrap();
    img.set_pixel(0, 0, 0, -0.5);
    img.set_pixel(0, 0, 1, 1.5);
    img.set_pixel(0, 0, 2, 0.5);
    img.set_pixel(0, 0, 3, 100.0 / 255.0);
    assert_eq!(img.bytes(), &[0, 255, 128, 100]);
}

#[test]
fn normalized_round_trip_is_exact_for_every_byte() {
    for b in 0..=255u8 {
        assert_eq!(quantize(b as f32 / 255.0), b);
    }
}

#[test]
fn grayscale_uses_luma_weights() {
    let img = Image::new_with_data(1, 1, vec![255, 0, 0, 255]).unwrap();
    assert!((img.get_pixel_grayscale(0, 0) - 0.299).abs() < 1e-6);

    let white = Image::new_with_data(1, 1, vec![255, 255, 255, 0]).unwrap();
    assert!((white.get_pixel_grayscale(0, 0) - 1.0).abs() < 1e-5);
}

#[test]
fn set_pixel_grayscale_broadcasts_and_forces_opaque() {
    let mut img = Image::new_empty(2, 1).unwrap();
    img.set_pixel_grayscale(1, 0, 0.2);
    assert_eq!(&img.bytes()[4..8], &[51, 51, 51, 255]);
    assert_eq!(&img.bytes()[0..4], &[0, 0, 0, 0]);
}

#[test]
fn copy_from_copies_pixels() {
    let src = Image::new_with_data(1, 2, vec![1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
    let mut dst = src.new_like();
    dst.copy_from(&src).unwrap();
    assert_eq!(dst, src);
}

#[test]
fn copy_from_rejects_other_dimensions() {
    let src = Image::new_random(3, 2, 1).unwrap();
    let mut dst = Image::new_empty(2, 3).unwrap();

    let result = dst.copy_from(&src);

    assert!(matches!(result, Err(Error::Configuration(_))));
    assert!(dst.bytes().iter().all(|&b| b == 0));
}

#[test]
fn random_images_are_reproducible_and_opaque() {
    let a = Image::new_random(7, 5, 42).unwrap();
    let b = Image::new_random(7, 5, 42).unwrap();
    let c = Image::new_random(7, 5, 43).unwrap();

    assert_eq!(a, b);
    assert_ne!(a, c);
    assert!(a.bytes().chunks_exact(4).all(|px| px[3] == 255));
}

#[test]
fn filled_image_repeats_the_pixel() {
    let img = Image::new_filled(3, 3, [1, 2, 3, 4]).unwrap();
    assert!(img.bytes().chunks_exact(4).all(|px| px == [1, 2, 3, 4]));
}
