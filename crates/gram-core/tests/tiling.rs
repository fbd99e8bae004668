use gram_core::prelude::*;
use image::{DynamicImage, GenericImageView, Luma, GrayImage, Rgb, RgbImage, Rgba, RgbaImage};

#[test]
fn tiled_image_has_target_size_and_repeats_tile() {
    let mut t = RgbImage::new(10, 10);
    t.put_pixel(5, 5, Rgb([0, 255, 0]));
    let tiled = tile(&DynamicImage::ImageRgb8(t), Extent::new(25, 25)).expect("tile");

    assert_eq!(tiled.dimensions(), (25, 25));
    let rgb = tiled.as_rgb8().expect("rgb stays rgb");
    assert_eq!(rgb.get_pixel(5, 5).0, [0, 255, 0]);
    assert_eq!(rgb.get_pixel(15, 5).0, [0, 255, 0]);
    assert_eq!(rgb.get_pixel(15, 15).0, [0, 255, 0]);
    // third column of tiles is cropped at x = 25, so (25, 5) does not exist
    // and (20..25) only holds the left half of the tile
    assert_eq!(rgb.get_pixel(24, 5).0, [0, 0, 0]);
}

#[test]
fn every_pixel_matches_tile_modulo() {
    use rand::{Rng, SeedableRng};
    let mut rng = rand::rngs::StdRng::seed_from_u64(7);

    for _ in 0..20 {
        let tw = rng.gen_range(1..=9);
        let th = rng.gen_range(1..=9);
        let mut t = RgbaImage::new(tw, th);
        for p in t.pixels_mut() {
            *p = Rgba([rng.r#gen(), rng.r#gen(), rng.r#gen(), 255]);
        }
        let w = rng.gen_range(1..=40);
        let h = rng.gen_range(1..=40);

        let out = tile(&DynamicImage::ImageRgba8(t.clone()), Extent::new(w, h)).expect("tile");
        let out = out.as_rgba8().expect("rgba");
        assert_eq!(out.dimensions(), (w, h));
        for y in 0..h {
            for x in 0..w {
                assert_eq!(
                    out.get_pixel(x, y),
                    t.get_pixel(x % tw, y % th),
                    "pixel ({x}, {y}) for tile {tw}x{th} on {w}x{h}"
                );
            }
        }
    }
}

#[test]
fn tiling_keeps_grey_color_model() {
    let t = GrayImage::from_pixel(3, 2, Luma([42]));
    let out = tile(&DynamicImage::ImageLuma8(t), Extent::new(7, 5)).expect("tile");
    assert_eq!(color_model(&out), Some((ColorModel::Grey, Depth::U8)));
    assert_eq!(out.as_luma8().expect("grey").get_pixel(6, 4).0, [42]);
}

#[test]
fn tile_larger_than_target_is_cropped() {
    let t = RgbImage::from_pixel(50, 50, Rgb([1, 2, 3]));
    let out = tile(&DynamicImage::ImageRgb8(t), Extent::new(8, 4)).expect("tile");
    assert_eq!(out.dimensions(), (8, 4));
    assert_eq!(out.as_rgb8().expect("rgb").get_pixel(7, 3).0, [1, 2, 3]);
}

#[test]
fn zero_sized_tile_gives_blank_canvas() {
    let t = RgbImage::new(0, 0);
    let out = tile(&DynamicImage::ImageRgb8(t), Extent::new(4, 4)).expect("tile");
    assert_eq!(out.dimensions(), (4, 4));
    assert!(out.as_rgb8().expect("rgb").pixels().all(|p| p.0 == [0, 0, 0]));
}

#[test]
fn zero_sized_target_is_empty() {
    let t = RgbImage::from_pixel(2, 2, Rgb([9, 9, 9]));
    let out = tile(&DynamicImage::ImageRgb8(t), Extent::new(0, 5)).expect("tile");
    assert_eq!(out.dimensions(), (0, 5));
}
