use anyhow::{Context, Result};
use image::codecs::jpeg::{JpegEncoder, PixelDensity};
use image::imageops::FilterType;
use image::DynamicImage;
use std::fs;
use std::io::BufReader;
use std::path::Path;

use crate::config::PrintProfile;

/// Width and height in pixels.
pub type Dims = (u32, u32);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownscaleOutcome {
    /// A print-ready JPEG was written to the destination.
    Downscaled { original: Dims, resized: Dims },
    /// Re-encoding would not make the file smaller; caller copies instead.
    Copied,
    /// The source could not be decoded; caller copies instead.
    Failed(String),
}

/// Write a print-ready JPEG of `src` to `dst`.
///
/// Nothing is written unless the outcome is `Downscaled`. Only errors while
/// writing `dst` are returned as `Err`.
pub fn downscale(src: &Path, dst: &Path, profile: &PrintProfile) -> Result<DownscaleOutcome> {
    // Format comes from the file's magic bytes, so a mislabeled extension still decodes.
    let decoded = image::ImageReader::open(src)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(image::ImageError::from)
        .and_then(|reader| reader.decode());
    let img = match decoded {
        Ok(img) => img,
        Err(e) => return Ok(DownscaleOutcome::Failed(e.to_string())),
    };
    let img = DynamicImage::ImageRgb8(apply_orientation(img, read_orientation(src)).to_rgb8());

    let original = (img.width(), img.height());
    let resized = target_dims(original, profile);
    let img = if resized == original {
        img
    } else {
        img.resize_exact(resized.0, resized.1, FilterType::Lanczos3)
    };

    let encoded = match encode_jpeg(&img, profile) {
        Ok(buf) => buf,
        Err(e) => return Ok(DownscaleOutcome::Failed(e.to_string())),
    };
    let original_size = fs::metadata(src)
        .with_context(|| format!("Cannot read size of {}", src.display()))?
        .len();
    if original_size < encoded.len() as u64 {
        return Ok(DownscaleOutcome::Copied);
    }

    fs::write(dst, &encoded).with_context(|| format!("Cannot write {}", dst.display()))?;
    Ok(DownscaleOutcome::Downscaled { original, resized })
}

/// Size that covers the print area while keeping the aspect ratio.
///
/// Landscape images target `long x short`, everything else `short x long`.
/// Images already smaller than the target on either side are left alone.
pub fn target_dims((width, height): Dims, profile: &PrintProfile) -> Dims {
    let (target_w, target_h) = if width > height {
        (profile.long_side, profile.short_side)
    } else {
        (profile.short_side, profile.long_side)
    };
    if width < target_w || height < target_h {
        return (width, height);
    }
    let scale = f64::min(
        width as f64 / target_w as f64,
        height as f64 / target_h as f64,
    );
    (
        (width as f64 / scale).round() as u32,
        (height as f64 / scale).round() as u32,
    )
}

fn encode_jpeg(img: &DynamicImage, profile: &PrintProfile) -> image::ImageResult<Vec<u8>> {
    let mut buf = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut buf, profile.quality);
    encoder.set_pixel_density(PixelDensity::dpi(profile.dpi));
    img.write_with_encoder(encoder)?;
    Ok(buf)
}

fn read_orientation(path: &Path) -> Option<u32> {
    let file = fs::File::open(path).ok()?;
    let mut reader = BufReader::new(file);
    let exif = exif::Reader::new().read_from_container(&mut reader).ok()?;
    exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY)?
        .value
        .get_uint(0)
}

fn apply_orientation(img: DynamicImage, orientation: Option<u32>) -> DynamicImage {
    match orientation {
        Some(3) => img.rotate180(),
        Some(6) => img.rotate90(),
        Some(8) => img.rotate270(),
        _ => img,
    }
}
