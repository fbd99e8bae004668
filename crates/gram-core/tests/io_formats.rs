use gram_core::error::GramError;
use gram_core::prelude::*;
use image::{DynamicImage, GenericImageView, ImageBuffer, Luma, Rgb, RgbImage, Rgba, RgbaImage};
use ndarray::Array3;

#[test]
fn format_follows_extension() {
    assert_eq!("PNG".parse::<FileFormat>().expect("png"), FileFormat::Png);
    assert_eq!("tif".parse::<FileFormat>().expect("tif"), FileFormat::Tiff);
    assert_eq!("jpeg".parse::<FileFormat>().expect("jpeg"), FileFormat::Jpeg);
    assert_eq!("txt".parse::<FileFormat>().expect("txt"), FileFormat::Txt);
    assert_eq!("NPY".parse::<FileFormat>().expect("npy"), FileFormat::Npy);
    assert!(matches!(
        "bmp".parse::<FileFormat>(),
        Err(GramError::UnsupportedFormat(_))
    ));
    assert!(matches!(
        FileFormat::from_path(std::path::Path::new("no_extension")),
        Err(GramError::UnsupportedFormat(_))
    ));
}

#[test]
fn png_round_trip_keeps_pixels() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let dir = tmp.path();
    let path = dir.join("a.png");
    let mut img = RgbImage::from_pixel(5, 4, Rgb([10, 20, 30]));
    img.put_pixel(4, 3, Rgb([200, 0, 100]));
    save_image(&DynamicImage::ImageRgb8(img), &path).expect("save");

    let back = load_image(&path).expect("load");
    assert_eq!(back.dimensions(), (5, 4));
    assert_eq!(back.to_rgb8().get_pixel(4, 3).0, [200, 0, 100]);
}

#[test]
fn tiff_keeps_16_bit_grey() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let dir = tmp.path();
    let path = dir.join("depth.tif");
    let img: ImageBuffer<Luma<u16>, Vec<u16>> = ImageBuffer::from_pixel(3, 3, Luma([4000]));
    save_image(&DynamicImage::ImageLuma16(img), &path).expect("save");

    let back = load_image(&path).expect("load");
    assert_eq!(color_model(&back), Some((ColorModel::Grey, Depth::U16)));
    assert_eq!(back.as_luma16().expect("l16").get_pixel(2, 2).0, [4000]);
}

#[test]
fn unsupported_extensions_are_rejected() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let dir = tmp.path();
    let img = DynamicImage::ImageRgb8(RgbImage::new(2, 2));
    assert!(matches!(
        save_image(&img, dir.join("a.bmp")),
        Err(GramError::UnsupportedFormat(_))
    ));
    assert!(matches!(
        save_image(&img, dir.join("a.txt")),
        Err(GramError::UnsupportedFormat(_))
    ));
    assert!(matches!(
        load_image(dir.join("a.gif")),
        Err(GramError::UnsupportedFormat(_))
    ));
    let a = Array3::<f64>::zeros((1, 1, 1));
    assert!(matches!(
        save_array(&a, dir.join("a.png"), &TxtOptions::default()),
        Err(GramError::UnsupportedFormat(_))
    ));
}

#[test]
fn jpeg_refuses_alpha() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let dir = tmp.path();
    let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(2, 2, Rgba([1, 2, 3, 4])));
    assert!(matches!(
        save_image(&img, dir.join("a.jpg")),
        Err(GramError::Conversion(_))
    ));
    let rgb = DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 8, Rgb([90, 90, 90])));
    save_image(&rgb, dir.join("b.jpg")).expect("rgb jpeg");
    assert_eq!(load_image(dir.join("b.jpg")).expect("load").dimensions(), (8, 8));
}

#[test]
fn txt_array_round_trip_with_precision() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let dir = tmp.path();
    let path = dir.join("dtm.txt");
    let a = Array3::from_shape_fn((2, 3, 1), |(r, c, _)| r as f64 + c as f64 * 0.25 + 0.001);
    save_array(&a, &path, &TxtOptions::default()).expect("save");

    let text = std::fs::read_to_string(&path).expect("read");
    assert_eq!(text.lines().next(), Some("0.00 0.25 0.50"));

    let back = load_array(&path, &TxtOptions::default()).expect("load");
    assert_eq!(back.dim(), (2, 3, 1));
    assert_eq!(back[[1, 2, 0]], 1.5);
}

#[test]
fn txt_with_custom_delimiter() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let dir = tmp.path();
    let path = dir.join("grid.txt");
    let opts = TxtOptions::default().delimiter(',').precision(1);
    let a = Array3::from_elem((2, 2, 1), 3.0);
    save_array(&a, &path, &opts).expect("save");
    assert_eq!(
        std::fs::read_to_string(&path).expect("read"),
        "3.0,3.0\n3.0,3.0\n"
    );
    assert_eq!(load_array(&path, &opts).expect("load"), a);
}

#[test]
fn txt_rejects_ragged_rows_and_bad_options() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let dir = tmp.path();
    let path = dir.join("ragged.txt");
    std::fs::write(&path, "1 2 3\n4 5\n").expect("write");
    assert!(matches!(
        load_array(&path, &TxtOptions::default()),
        Err(GramError::InvalidInput(_))
    ));
    assert!(TxtOptions::default().delimiter('.').validate().is_err());
    assert!(TxtOptions::default().precision(40).validate().is_err());
}

#[test]
fn txt_holds_only_one_band() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let dir = tmp.path();
    let a = Array3::<f64>::zeros((2, 2, 3));
    assert!(matches!(
        save_array(&a, dir.join("rgb.txt"), &TxtOptions::default()),
        Err(GramError::Conversion(_))
    ));
}

#[test]
fn json_array_round_trip() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let dir = tmp.path();
    let path = dir.join("a.json");
    let a = Array3::from_shape_fn((3, 2, 2), |(r, c, b)| (r + c) as f64 / (b + 1) as f64);
    save_array(&a, &path, &TxtOptions::default()).expect("save");
    assert_eq!(load_array(&path, &TxtOptions::default()).expect("load"), a);
}

#[test]
fn npy_round_trip_keeps_bands() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let path = tmp.path().join("stack.npy");
    let a = Array3::from_shape_fn((4, 3, 2), |(r, c, b)| r as f64 * 0.5 - c as f64 + b as f64 * 100.0);
    save_array(&a, &path, &TxtOptions::default()).expect("save");
    assert_eq!(load_array(&path, &TxtOptions::default()).expect("load"), a);
}

#[test]
fn single_band_npy_is_stored_as_a_grid() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let path = tmp.path().join("dtm.npy");
    let a = dtm(3, 4, 1.0, 0.5);
    save_array(&a, &path, &TxtOptions::default()).expect("save");

    let grid: ndarray::Array2<f64> = ndarray_npy::read_npy(&path).expect("2-D npy");
    assert_eq!(grid.dim(), (3, 4));
    assert_eq!(grid[[2, 3]], 2.5);
    assert_eq!(load_array(&path, &TxtOptions::default()).expect("load"), a);
}

#[test]
fn npy_of_other_ranks_is_rejected() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let path = tmp.path().join("line.npy");
    ndarray_npy::write_npy(&path, &ndarray::arr1(&[1.0f64, 2.0, 3.0])).expect("write");
    assert!(matches!(
        load_array(&path, &TxtOptions::default()),
        Err(GramError::Conversion(_))
    ));
}
