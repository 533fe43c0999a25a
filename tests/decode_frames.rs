use page_split::classify::classify;
use page_split::config::Config;
use page_split::data::FilterData;
use page_split::decode::{decode_frame, frame_count};
use page_split::image_id::ImageId;
use page_split::layout::LayoutType;
use page_split::rotation::OrthogonalRotation;
use page_split::rule::Rule;
use page_split::util::image_signature;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tiff::encoder::{Rational, TiffEncoder, colortype};
use tiff::tags::ResolutionUnit;

/// 300x200 white grayscale PNG, optionally with a pHYs chunk.
fn write_png(path: &Path, dpi: Option<(f64, f64)>) {
    let file = BufWriter::new(File::create(path).unwrap());
    let mut encoder = png::Encoder::new(file, 300, 200);
    encoder.set_color(png::ColorType::Grayscale);
    encoder.set_depth(png::BitDepth::Eight);
    if let Some((x, y)) = dpi {
        encoder.set_pixel_dims(Some(png::PixelDimensions {
            xppu: (x / 0.0254).round() as u32,
            yppu: (y / 0.0254).round() as u32,
            unit: png::Unit::Meter,
        }));
    }
    let mut writer = encoder.write_header().unwrap();
    writer.write_image_data(&vec![255u8; 300 * 200]).unwrap();
}

/// Two frames: 40x20 landscape, then 20x40 portrait at 600x300 dpi.
fn write_two_page_tiff(path: &Path) {
    let file = BufWriter::new(File::create(path).unwrap());
    let mut encoder = TiffEncoder::new(file).unwrap();
    encoder
        .write_image::<colortype::Gray8>(40, 20, &vec![255u8; 800])
        .unwrap();
    let mut second = encoder.new_image::<colortype::Gray8>(20, 40).unwrap();
    second.resolution_unit(ResolutionUnit::Inch);
    second.x_resolution(Rational { n: 600, d: 1 });
    second.y_resolution(Rational { n: 300, d: 1 });
    let mut pixels = vec![255u8; 800];
    pixels[0] = 0;
    second.write_data(&pixels).unwrap();
}

fn layout_type(cfg: &Config, id: &ImageId) -> LayoutType {
    let data = FilterData::load(cfg, id, OrthogonalRotation::None).unwrap();
    classify(Rule::AutoDetect, &data.metadata(), OrthogonalRotation::None).layout_type
}

fn png_in(dir: &Path, name: &str, dpi: Option<(f64, f64)>) -> PathBuf {
    let path = dir.join(name);
    write_png(&path, dpi);
    path
}

#[test]
fn single_image_files_have_only_page_zero() {
    let dir = tempfile::tempdir().unwrap();
    let path = png_in(dir.path(), "plain.png", None);

    assert_eq!(frame_count(&path).unwrap(), 1);
    assert!(FilterData::load(&Config::default(), &ImageId::new(&path, 0), OrthogonalRotation::None).is_ok());
    let err = FilterData::load(&Config::default(), &ImageId::new(&path, 5), OrthogonalRotation::None);
    assert!(err.is_err());
}

#[test]
fn tiff_pages_decode_their_own_frame() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("book.tif");
    write_two_page_tiff(&path);

    assert_eq!(frame_count(&path).unwrap(), 2);

    let first = decode_frame(&path, 0).unwrap();
    let second = decode_frame(&path, 1).unwrap();
    assert_eq!((first.image.width(), first.image.height()), (40, 20));
    assert_eq!((second.image.width(), second.image.height()), (20, 40));
    assert_ne!(image_signature(&first.image), image_signature(&second.image));

    assert!(first.dpi.is_none());
    let (x, y) = second.dpi.unwrap();
    assert!((x - 600.0).abs() < 1e-6 && (y - 300.0).abs() < 1e-6);

    assert!(decode_frame(&path, 2).is_err());
}

#[test]
fn tiff_page_index_reaches_classification() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("book.tif");
    write_two_page_tiff(&path);

    let cfg = Config::default();
    assert_eq!(layout_type(&cfg, &ImageId::new(&path, 0)), LayoutType::TwoPages);
    assert_eq!(layout_type(&cfg, &ImageId::new(&path, 1)), LayoutType::SinglePage);
}

#[test]
fn stored_resolution_changes_the_classification() {
    let dir = tempfile::tempdir().unwrap();
    let plain = png_in(dir.path(), "plain.png", None);
    // 300x200 px at 600x300 dpi is 0.5 x 0.67 inches: portrait.
    let tagged = png_in(dir.path(), "tagged.png", Some((600.0, 300.0)));

    let cfg = Config::default();
    assert_eq!(layout_type(&cfg, &ImageId::from_path(&plain)), LayoutType::TwoPages);
    assert_eq!(layout_type(&cfg, &ImageId::from_path(&tagged)), LayoutType::SinglePage);

    let data = FilterData::load(&cfg, &ImageId::from_path(&tagged), OrthogonalRotation::None).unwrap();
    let (x, y) = data.metadata().dpi.unwrap();
    assert!((x - 600.0).abs() < 0.1 && (y - 300.0).abs() < 0.1);
}

#[test]
fn configured_resolution_is_only_a_fallback() {
    let dir = tempfile::tempdir().unwrap();
    let plain = png_in(dir.path(), "plain.png", None);
    let tagged = png_in(dir.path(), "tagged.png", Some((600.0, 300.0)));

    let mut cfg = Config::default();
    cfg.split.default_dpi_x = 600.0;
    cfg.split.default_dpi_y = 300.0;
    assert_eq!(layout_type(&cfg, &ImageId::from_path(&plain)), LayoutType::SinglePage);

    // A fallback that would say "spread" loses to the file's own pHYs.
    cfg.split.default_dpi_x = 100.0;
    cfg.split.default_dpi_y = 1000.0;
    assert_eq!(layout_type(&cfg, &ImageId::from_path(&plain)), LayoutType::TwoPages);
    assert_eq!(layout_type(&cfg, &ImageId::from_path(&tagged)), LayoutType::SinglePage);
}
