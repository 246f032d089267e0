//! # Image Sources
//!
//! Reads the intrinsic size of an image from the same kinds of sources a
//! schema can name: `data:` URIs, file paths and raw base64 strings. Only
//! the header is parsed; pixels are never decoded.

use std::io::Cursor;

use base64::Engine;
use image::ImageFormat;

/// Pixel dimensions `(width, height)` of the image behind `src`.
pub fn load_image_dimensions(src: &str) -> Result<(u32, u32), String> {
    let bytes = source_bytes(src)?;
    let format = match image::guess_format(&bytes) {
        Ok(format @ (ImageFormat::Png | ImageFormat::Jpeg)) => format,
        _ => return Err("Unsupported image format (expected JPEG or PNG)".to_string()),
    };

    image::io::Reader::with_format(Cursor::new(bytes), format)
        .into_dimensions()
        .map_err(|e| format!("Failed to read image dimensions: {}", e))
}

fn source_bytes(src: &str) -> Result<Vec<u8>, String> {
    if let Some(uri) = src.strip_prefix("data:") {
        let (_, payload) = uri
            .split_once(',')
            .ok_or_else(|| "Invalid data URI: no payload after the media type".to_string())?;
        return decode(payload);
    }

    // Base64 may contain '/', so only explicit prefixes count as paths.
    if ["/", "./", "../"].iter().any(|prefix| src.starts_with(prefix)) {
        return std::fs::read(src).map_err(|e| format!("Failed to read image file '{}': {}", src, e));
    }

    decode(src)
}

fn decode(encoded: &str) -> Result<Vec<u8>, String> {
    base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(|e| format!("Base64 decode error: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbaImage::new(width, height);
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(
            encoder,
            img.as_raw(),
            width,
            height,
            image::ColorType::Rgba8,
        )
        .unwrap();
        buf
    }

    fn encode(bytes: &[u8]) -> String {
        base64::engine::general_purpose::STANDARD.encode(bytes)
    }

    #[test]
    fn test_png_data_uri_dimensions() {
        let uri = format!("data:image/png;base64,{}", encode(&png_bytes(3, 2)));
        assert_eq!(load_image_dimensions(&uri).unwrap(), (3, 2));
    }

    #[test]
    fn test_raw_base64_dimensions() {
        assert_eq!(
            load_image_dimensions(&encode(&png_bytes(5, 7))).unwrap(),
            (5, 7)
        );
    }

    #[test]
    fn test_png_file_dimensions() {
        let path = std::env::temp_dir().join(format!("pdf-schema-{}.png", std::process::id()));
        std::fs::write(&path, png_bytes(4, 9)).unwrap();
        let result = load_image_dimensions(path.to_str().unwrap());
        std::fs::remove_file(&path).unwrap();
        assert_eq!(result.unwrap(), (4, 9));
    }

    #[test]
    fn test_invalid_data_uri() {
        assert!(load_image_dimensions("data:image/png;base64").is_err());
    }

    #[test]
    fn test_missing_file() {
        assert!(load_image_dimensions("./does/not/exist.png").is_err());
    }

    #[test]
    fn test_unsupported_format() {
        assert!(load_image_dimensions(&encode(&[0u8, 1, 2, 3, 4])).is_err());
        // A GIF header is recognised, but not accepted.
        let gif = encode(b"GIF89a\x01\x00\x01\x00\x00\x00\x00");
        let err = load_image_dimensions(&gif).unwrap_err();
        assert!(err.contains("Unsupported image format"));
    }

    #[test]
    fn test_truncated_png() {
        let mut bytes = png_bytes(2, 2);
        bytes.truncate(12);
        assert!(load_image_dimensions(&encode(&bytes)).is_err());
    }
}
