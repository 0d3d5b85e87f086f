//! Raster export of the visible board.

use thiserror::Error;

/// File name hosts should use when saving the export.
pub const EXPORT_FILE_NAME: &str = "board_image.png";
/// MIME type of the exported bytes.
pub const EXPORT_MIME: &str = "image/png";

/// Export errors.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Surface failed to rasterize: {0}")]
    Surface(String),
    #[error("Bitmap size mismatch: {width}x{height} needs {expected} bytes, got {actual}")]
    SizeMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
    #[error("Empty bitmap")]
    Empty,
    #[error("PNG encoding failed: {0}")]
    Encoding(#[from] png::EncodingError),
}

/// A rasterized board at pixel ratio 1: 8-bit RGBA, row-major, unpremultiplied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl Bitmap {
    /// Create a new bitmap, checking the buffer length.
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self, ExportError> {
        check_dimensions(width, height, rgba.len())?;
        Ok(Self { width, height, rgba })
    }

    /// A bitmap filled with one color.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixels = width as usize * height as usize;
        Self {
            width,
            height,
            rgba: rgba.repeat(pixels),
        }
    }

    /// Pixel at (x, y), if in range.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let px = self.rgba.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}

fn check_dimensions(width: u32, height: u32, len: usize) -> Result<(), ExportError> {
    if width == 0 || height == 0 {
        return Err(ExportError::Empty);
    }
    let expected = width as usize * height as usize * 4;
    if len != expected {
        return Err(ExportError::SizeMismatch {
            width,
            height,
            expected,
            actual: len,
        });
    }
    Ok(())
}

/// Encoded export, ready for the host to download or save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedImage {
    pub file_name: String,
    pub mime: &'static str,
    pub width: u32,
    pub height: u32,
    pub bytes: Vec<u8>,
}

/// Encode a bitmap as a lossless PNG.
pub fn encode_png(bitmap: &Bitmap) -> Result<ExportedImage, ExportError> {
    check_dimensions(bitmap.width, bitmap.height, bitmap.rgba.len())?;

    let mut bytes = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut bytes, bitmap.width, bitmap.height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(&bitmap.rgba)?;
    }
    log::info!(
        "Exported {}x{} board as {} ({} bytes)",
        bitmap.width,
        bitmap.height,
        EXPORT_FILE_NAME,
        bytes.len()
    );
    Ok(ExportedImage {
        file_name: EXPORT_FILE_NAME.to_string(),
        mime: EXPORT_MIME,
        width: bitmap.width,
        height: bitmap.height,
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

    #[test]
    fn test_encode_png() {
        let bitmap = Bitmap::filled(4, 3, [255, 0, 0, 255]);
        let image = encode_png(&bitmap).unwrap();
        assert_eq!(image.file_name, "board_image.png");
        assert_eq!(image.mime, "image/png");
        assert_eq!(&image.bytes[..8], &PNG_SIGNATURE);

        let decoder = png::Decoder::new(image.bytes.as_slice());
        let mut reader = decoder.read_info().unwrap();
        let mut buf = vec![0; reader.output_buffer_size()];
        let info = reader.next_frame(&mut buf).unwrap();
        assert_eq!((info.width, info.height), (4, 3));
        assert_eq!(&buf[..info.buffer_size()], bitmap.rgba.as_slice());
    }

    #[test]
    fn test_size_mismatch() {
        assert!(matches!(
            Bitmap::new(2, 2, vec![0; 3]),
            Err(ExportError::SizeMismatch { expected: 16, actual: 3, .. })
        ));
        let bad = Bitmap { width: 2, height: 2, rgba: vec![0; 8] };
        assert!(matches!(encode_png(&bad), Err(ExportError::SizeMismatch { .. })));
    }

    #[test]
    fn test_empty_bitmap() {
        assert!(matches!(Bitmap::new(0, 5, Vec::new()), Err(ExportError::Empty)));
        let empty = Bitmap { width: 0, height: 0, rgba: Vec::new() };
        assert!(matches!(encode_png(&empty), Err(ExportError::Empty)));
    }

    #[test]
    fn test_pixel_lookup() {
        let bitmap = Bitmap::filled(2, 2, [1, 2, 3, 4]);
        assert_eq!(bitmap.pixel(1, 1), Some([1, 2, 3, 4]));
        assert_eq!(bitmap.pixel(2, 0), None);
    }
}
