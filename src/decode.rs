use anyhow::{Context, Result, anyhow, bail};
use exif::{In, Tag as ExifTag};
use image::{DynamicImage, ImageBuffer, ImageFormat, ImageReader, Pixel};
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use tiff::ColorType as TiffColorType;
use tiff::decoder::{Decoder as TiffDecoder, DecodingResult, ifd::Value};
use tiff::tags::Tag as TiffTag;
use tracing::debug;

const INCHES_PER_METER: f64 = 39.370_078_740_157_48;
const CM_PER_INCH: f64 = 2.54;

// TIFF/EXIF ResolutionUnit values.
const UNIT_INCH: u32 = 2;
const UNIT_CENTIMETER: u32 = 3;

/// One image out of a file, with the resolution stored next to it.
#[derive(Debug, Clone)]
pub struct DecodedFrame {
    pub image: DynamicImage,
    /// Horizontal and vertical dots per inch, when the file records a
    /// physical unit.
    pub dpi: Option<(f64, f64)>,
}

/// Decode frame `page` of `path`. Only TIFF files hold more than one
/// frame; asking for a frame that does not exist is an error.
pub fn decode_frame(path: &Path, page: u32) -> Result<DecodedFrame> {
    let format = guess_format(path)?;
    if format == Some(ImageFormat::Tiff) {
        return decode_tiff_frame(path, page);
    }
    if page != 0 {
        bail!("{} holds a single image; page {page} does not exist", path.display());
    }
    let image = decode_first(path)?;
    let dpi = match format {
        Some(ImageFormat::Png) => png_dpi(path),
        _ => exif_dpi(path),
    };
    Ok(DecodedFrame { image, dpi })
}

/// Number of frames in `path`: the IFD count for TIFF, 1 for anything else.
pub fn frame_count(path: &Path) -> Result<u32> {
    if guess_format(path)? != Some(ImageFormat::Tiff) {
        return Ok(1);
    }
    let mut decoder = open_tiff(path)?;
    let mut n = 1;
    while decoder.more_images() {
        decoder
            .next_image()
            .with_context(|| format!("reading TIFF directory {n}: {}", path.display()))?;
        n += 1;
    }
    Ok(n)
}

fn guess_format(path: &Path) -> Result<Option<ImageFormat>> {
    Ok(ImageReader::open(path)
        .with_context(|| format!("open image: {}", path.display()))?
        .with_guessed_format()
        .with_context(|| format!("detect image format: {}", path.display()))?
        .format())
}

fn decode_first(path: &Path) -> Result<DynamicImage> {
    ImageReader::open(path)
        .with_context(|| format!("open image: {}", path.display()))?
        .with_guessed_format()
        .with_context(|| format!("detect image format: {}", path.display()))?
        .decode()
        .with_context(|| format!("decode image: {}", path.display()))
}

fn open_tiff(path: &Path) -> Result<TiffDecoder<BufReader<File>>> {
    let file = File::open(path).with_context(|| format!("open image: {}", path.display()))?;
    TiffDecoder::new(BufReader::new(file))
        .with_context(|| format!("reading TIFF header: {}", path.display()))
}

fn decode_tiff_frame(path: &Path, page: u32) -> Result<DecodedFrame> {
    let mut decoder = open_tiff(path)?;
    decoder
        .seek_to_image(page as usize)
        .map_err(|e| anyhow!("{}: page {page} does not exist: {e}", path.display()))?;
    let dpi = tiff_dpi(&mut decoder);

    // The first frame goes through the general decoder, which covers more
    // sample layouts than the per-frame path below.
    let image = if page == 0 {
        decode_first(path)?
    } else {
        read_tiff_pixels(&mut decoder)
            .with_context(|| format!("decode page {page}: {}", path.display()))?
    };
    Ok(DecodedFrame { image, dpi })
}

fn read_tiff_pixels<R: Read + Seek>(decoder: &mut TiffDecoder<R>) -> Result<DynamicImage> {
    let (w, h) = decoder.dimensions()?;
    let color = decoder.colortype()?;
    let image = match (decoder.read_image()?, color) {
        (DecodingResult::U8(d), TiffColorType::Gray(8)) => DynamicImage::ImageLuma8(buffer(w, h, d)?),
        (DecodingResult::U8(d), TiffColorType::GrayA(8)) => DynamicImage::ImageLumaA8(buffer(w, h, d)?),
        (DecodingResult::U8(d), TiffColorType::RGB(8)) => DynamicImage::ImageRgb8(buffer(w, h, d)?),
        (DecodingResult::U8(d), TiffColorType::RGBA(8)) => DynamicImage::ImageRgba8(buffer(w, h, d)?),
        (DecodingResult::U16(d), TiffColorType::Gray(16)) => DynamicImage::ImageLuma16(buffer(w, h, d)?),
        (DecodingResult::U16(d), TiffColorType::RGB(16)) => DynamicImage::ImageRgb16(buffer(w, h, d)?),
        (DecodingResult::U16(d), TiffColorType::RGBA(16)) => DynamicImage::ImageRgba16(buffer(w, h, d)?),
        (_, other) => bail!("unsupported TIFF color type {other:?}"),
    };
    Ok(image)
}

fn buffer<P: Pixel>(w: u32, h: u32, data: Vec<P::Subpixel>) -> Result<ImageBuffer<P, Vec<P::Subpixel>>> {
    ImageBuffer::from_raw(w, h, data).ok_or_else(|| anyhow!("pixel data does not fill {w}x{h}"))
}

fn tiff_dpi<R: Read + Seek>(decoder: &mut TiffDecoder<R>) -> Option<(f64, f64)> {
    let x = tiff_number(decoder.find_tag(TiffTag::XResolution).ok()??)?;
    let y = tiff_number(decoder.find_tag(TiffTag::YResolution).ok()??)?;
    let unit = match decoder.find_tag(TiffTag::ResolutionUnit).ok().flatten() {
        Some(Value::Short(u)) => u32::from(u),
        Some(Value::Unsigned(u)) => u,
        _ => UNIT_INCH,
    };
    to_dpi(x, y, unit)
}

fn tiff_number(value: Value) -> Option<f64> {
    match value {
        Value::Rational(n, d) if d != 0 => Some(f64::from(n) / f64::from(d)),
        Value::Unsigned(n) => Some(f64::from(n)),
        Value::Short(n) => Some(f64::from(n)),
        Value::Float(f) => Some(f64::from(f)),
        Value::Double(f) => Some(f),
        _ => None,
    }
}

fn png_dpi(path: &Path) -> Option<(f64, f64)> {
    let file = File::open(path).ok()?;
    let reader = match png::Decoder::new(BufReader::new(file)).read_info() {
        Ok(reader) => reader,
        Err(err) => {
            debug!("no PNG header info for {}: {err}", path.display());
            return None;
        }
    };
    let dims = reader.info().pixel_dims?;
    match dims.unit {
        png::Unit::Meter => Some((
            f64::from(dims.xppu) / INCHES_PER_METER,
            f64::from(dims.yppu) / INCHES_PER_METER,
        ))
        .filter(|(x, y)| *x > 0.0 && *y > 0.0),
        png::Unit::Unspecified => None,
    }
}

fn exif_dpi(path: &Path) -> Option<(f64, f64)> {
    let file = File::open(path).ok()?;
    let exif = exif::Reader::new()
        .read_from_container(&mut BufReader::new(file))
        .ok()?;
    let axis = |tag: ExifTag| match exif.get_field(tag, In::PRIMARY)?.value {
        exif::Value::Rational(ref v) => v.first().map(|r| r.to_f64()),
        _ => None,
    };
    let unit = exif
        .get_field(ExifTag::ResolutionUnit, In::PRIMARY)
        .and_then(|f| f.value.get_uint(0))
        .unwrap_or(UNIT_INCH);
    to_dpi(axis(ExifTag::XResolution)?, axis(ExifTag::YResolution)?, unit)
}

/// Resolution in dots per inch, or `None` when the unit is not physical.
fn to_dpi(x: f64, y: f64, unit: u32) -> Option<(f64, f64)> {
    let scale = match unit {
        UNIT_INCH => 1.0,
        UNIT_CENTIMETER => CM_PER_INCH,
        _ => return None,
    };
    let (x, y) = (x * scale, y * scale);
    (x.is_finite() && y.is_finite() && x > 0.0 && y > 0.0).then_some((x, y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolution_units() {
        assert_eq!(to_dpi(300.0, 150.0, UNIT_INCH), Some((300.0, 150.0)));
        let (x, _) = to_dpi(100.0, 100.0, UNIT_CENTIMETER).unwrap();
        assert!((x - 254.0).abs() < 1e-9);
        // Unit 1 only fixes the aspect ratio of a pixel.
        assert_eq!(to_dpi(1.0, 1.0, 1), None);
        assert_eq!(to_dpi(0.0, 300.0, UNIT_INCH), None);
    }

    #[test]
    fn rational_tags_divide() {
        assert_eq!(tiff_number(Value::Rational(600, 2)), Some(300.0));
        assert_eq!(tiff_number(Value::Rational(600, 0)), None);
    }
}
