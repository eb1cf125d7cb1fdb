//! QR code rasterization and PNG/data URL packing.

use std::io::Cursor;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use qrcode::QrCode;
use tracing::debug;

use crate::{DataUrl, EncodeError, QualityOptions};

const DARK: Luma<u8> = Luma([0u8]);
const LIGHT: Luma<u8> = Luma([255u8]);

/// Render `data` as a square grayscale QR image `quality.width` pixels wide,
/// surrounded by `quality.margin` modules of quiet zone.
pub fn render_qr(data: &str, quality: &QualityOptions) -> Result<GrayImage, EncodeError> {
    quality.validate()?;

    let code = QrCode::new(data.as_bytes()).map_err(|e| EncodeError::Qr(e.to_string()))?;
    let modules = code.to_colors();
    let module_count = code.width() as u32;
    let total = module_count + 2 * quality.margin;

    let scale = (quality.width / total).max(1);
    let img_size = total * scale;

    let mut img = GrayImage::from_pixel(img_size, img_size, LIGHT);

    for (i, color) in modules.iter().enumerate() {
        if *color != qrcode::Color::Dark {
            continue;
        }
        let x = (i as u32) % module_count + quality.margin;
        let y = (i as u32) / module_count + quality.margin;
        for dx in 0..scale {
            for dy in 0..scale {
                img.put_pixel(x * scale + dx, y * scale + dy, DARK);
            }
        }
    }

    if img_size == quality.width {
        return Ok(img);
    }

    debug!(
        modules = module_count,
        from = img_size,
        to = quality.width,
        "Scaling QR image to target width"
    );
    Ok(imageops::resize(
        &img,
        quality.width,
        quality.width,
        FilterType::Nearest,
    ))
}

/// Render `data` and encode the image as PNG bytes.
pub fn encode_png(data: &str, quality: &QualityOptions) -> Result<Vec<u8>, EncodeError> {
    let img = render_qr(data, quality)?;
    let mut cursor = Cursor::new(Vec::new());
    DynamicImage::ImageLuma8(img).write_to(&mut cursor, ImageFormat::Png)?;
    Ok(cursor.into_inner())
}

/// Render `data` into a `data:image/png;base64,...` URL.
pub fn encode_data_url(data: &str, quality: &QualityOptions) -> Result<DataUrl, EncodeError> {
    let png = encode_png(data, quality)?;
    Ok(format!("data:image/png;base64,{}", STANDARD.encode(png)))
}
