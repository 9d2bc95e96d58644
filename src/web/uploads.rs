use std::io::Cursor;
use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{codecs::jpeg::JpegEncoder, imageops::FilterType, GenericImageView};
use tokio::fs;

use crate::config::UploadConfig;
use crate::error::{AppError, Result};

/// URL prefix under which stored images are served.
pub const UPLOADS_URL_PREFIX: &str = "uploads/";

/// Decode `data`, shrink it so the longer edge fits `max_edge` and re-encode it
/// as JPEG. Images already within bounds keep their size.
///
/// Returns the JPEG bytes with the final width and height.
pub fn resize_to_jpeg(data: &[u8], max_edge: u32, quality: u8) -> Result<(Vec<u8>, u32, u32)> {
    let img = image::load_from_memory(data)?;
    let (width, height) = img.dimensions();

    let img = if width.max(height) > max_edge {
        img.resize(max_edge, max_edge, FilterType::Lanczos3)
    } else {
        img
    };

    let rgb = img.to_rgb8();
    let mut buf = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100)).encode_image(&rgb)?;

    Ok((buf.into_inner(), rgb.width(), rgb.height()))
}

/// Run an upload through the resize pipeline and write it to
/// `{uploads_dir}/{stem}.jpg`.
/// Returns the relative path stored on the record (e.g. "uploads/gallery-17.jpg").
pub async fn save_uploaded_image(
    uploads_dir: &Path,
    stem: &str,
    data: Vec<u8>,
    limits: &UploadConfig,
) -> Result<String> {
    if data.len() > limits.max_file_bytes {
        return Err(AppError::PayloadTooLarge(format!(
            "Image exceeds the {} upload limit",
            human_size(limits.max_file_bytes)
        )));
    }
    if stem.is_empty() || stem.contains(['/', '\\', '.']) {
        return Err(AppError::Internal(format!("Invalid upload name: {}", stem)));
    }

    let (max_edge, quality) = (limits.max_edge, limits.jpeg_quality);
    let (jpeg, width, height) =
        tokio::task::spawn_blocking(move || resize_to_jpeg(&data, max_edge, quality)).await??;

    fs::create_dir_all(uploads_dir).await?;
    let file_name = format!("{}.jpg", stem);
    fs::write(uploads_dir.join(&file_name), &jpeg).await?;

    tracing::debug!("Stored {} ({}x{}, {} bytes)", file_name, width, height, jpeg.len());
    Ok(format!("{}{}", UPLOADS_URL_PREFIX, file_name))
}

fn human_size(bytes: usize) -> String {
    const MIB: usize = 1024 * 1024;
    if bytes >= MIB {
        format!("{} MB", bytes / MIB)
    } else {
        format!("{} KB", bytes.div_ceil(1024))
    }
}

/// Decode a base64 `data:image/...;base64,` URL into raw bytes.
pub fn decode_data_url(url: &str) -> Result<Vec<u8>> {
    let invalid = || AppError::BadRequest("Image must be a base64 data URL".to_string());

    let rest = url.trim().strip_prefix("data:").ok_or_else(invalid)?;
    let (header, payload) = rest.split_once(',').ok_or_else(invalid)?;
    let mime = header.strip_suffix(";base64").ok_or_else(invalid)?;
    if !mime.starts_with("image/") {
        return Err(AppError::BadRequest(format!("Unsupported image type: {}", mime)));
    }

    let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| AppError::BadRequest(format!("Invalid base64 image data: {}", e)))
}

/// Delete a stored upload by its relative URL path (e.g. "uploads/gallery-17.jpg").
///
/// Best effort: anything outside the uploads directory is ignored, and a
/// missing file or failed removal is only logged.
pub async fn delete_uploaded_file(uploads_dir: &Path, url_path: &str) {
    let Some(file_name) = url_path.strip_prefix(UPLOADS_URL_PREFIX) else {
        return;
    };
    if file_name.is_empty() || file_name.contains("..") || file_name.contains(['/', '\\']) {
        tracing::warn!("Refusing to delete suspicious upload path {}", url_path);
        return;
    }

    match fs::remove_file(uploads_dir.join(file_name)).await {
        Ok(()) => tracing::debug!("Deleted upload {}", url_path),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!("Failed to delete upload {}: {}", url_path, e),
    }
}
