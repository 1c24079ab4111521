use image::{DynamicImage, ImageFormat, ImageReader};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Uploads larger than this are refused before decoding (10 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Extensions picked up when walking a directory.
pub const IMAGE_EXTENSIONS: [&str; 8] = ["jpg", "jpeg", "png", "gif", "bmp", "tiff", "tif", "webp"];

#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Not an image file: {path}")]
    NotAnImage { path: String },

    #[error("File is {size} bytes, limit is {limit} bytes: {path}")]
    TooLarge { path: String, size: u64, limit: u64 },

    #[error("Failed to decode {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: image::ImageError,
    },
}

impl IntakeError {
    /// The file passed validation but its pixels could not be read.
    pub fn is_decode_failure(&self) -> bool {
        matches!(self, IntakeError::Decode { .. })
    }
}

/// Check that `path` is a reasonably sized image and return its format.
pub fn validate(path: &Path, max_bytes: u64) -> Result<ImageFormat, IntakeError> {
    let size = fs::metadata(path)?.len();
    if size > max_bytes {
        return Err(IntakeError::TooLarge {
            path: path.display().to_string(),
            size,
            limit: max_bytes,
        });
    }

    let reader = ImageReader::open(path)?.with_guessed_format()?;
    // Only formats the decoder recognises count as images.
    reader.format().ok_or_else(|| IntakeError::NotAnImage {
        path: path.display().to_string(),
    })
}

/// Validate and decode `path`.
pub fn load(path: &Path, max_bytes: u64) -> Result<DynamicImage, IntakeError> {
    let format = validate(path, max_bytes)?;
    log::debug!("Decoding {} as {}", path.display(), format.to_mime_type());

    let mut reader = ImageReader::open(path)?;
    reader.set_format(format);
    reader.decode().map_err(|source| IntakeError::Decode {
        path: path.display().to_string(),
        source,
    })
}

/// Whether `path` has one of [`IMAGE_EXTENSIONS`] (case-insensitive).
pub fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};
    use tempfile::TempDir;

    fn create_test_image(
        path: &Path,
        width: u32,
        height: u32,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let img = ImageBuffer::from_fn(width, height, |x, y| {
            let intensity = ((x + y) % 256) as u8;
            Rgb([intensity, intensity, intensity])
        });

        img.save(path)?;
        Ok(())
    }

    #[test]
    fn test_load_valid_png() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("desk.png");
        create_test_image(&path, 64, 48).unwrap();

        assert_eq!(validate(&path, DEFAULT_MAX_UPLOAD_BYTES).unwrap(), ImageFormat::Png);
        let img = load(&path, DEFAULT_MAX_UPLOAD_BYTES).unwrap();
        assert_eq!((img.width(), img.height()), (64, 48));
    }

    #[test]
    fn test_format_is_sniffed_not_taken_from_extension() {
        let temp_dir = TempDir::new().unwrap();
        let png = temp_dir.path().join("desk.png");
        create_test_image(&png, 8, 8).unwrap();
        let renamed = temp_dir.path().join("desk.dat");
        fs::rename(&png, &renamed).unwrap();

        assert_eq!(validate(&renamed, DEFAULT_MAX_UPLOAD_BYTES).unwrap(), ImageFormat::Png);
    }

    #[test]
    fn test_accepts_any_recognised_format() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("desk.bmp");
        create_test_image(&path, 16, 12).unwrap();

        assert_eq!(validate(&path, DEFAULT_MAX_UPLOAD_BYTES).unwrap(), ImageFormat::Bmp);
        let img = load(&path, DEFAULT_MAX_UPLOAD_BYTES).unwrap();
        assert_eq!((img.width(), img.height()), (16, 12));
    }

    #[test]
    fn test_rejects_oversized_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("big.png");
        create_test_image(&path, 32, 32).unwrap();

        let err = validate(&path, 10).unwrap_err();
        assert!(matches!(err, IntakeError::TooLarge { limit: 10, .. }));
        assert!(!err.is_decode_failure());
    }

    #[test]
    fn test_rejects_non_image() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("notes.txt");
        fs::write(&path, b"just some text, definitely not pixels").unwrap();

        let err = load(&path, DEFAULT_MAX_UPLOAD_BYTES).unwrap_err();
        assert!(matches!(err, IntakeError::NotAnImage { .. }));
    }

    #[test]
    fn test_truncated_image_is_a_decode_failure() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.png");
        create_test_image(&path, 128, 128).unwrap();
        let bytes = fs::read(&path).unwrap();
        fs::write(&path, &bytes[..bytes.len() / 2]).unwrap();

        let err = load(&path, DEFAULT_MAX_UPLOAD_BYTES).unwrap_err();
        assert!(err.is_decode_failure());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nope.jpg");
        let err = validate(&missing, DEFAULT_MAX_UPLOAD_BYTES).unwrap_err();
        assert!(matches!(err, IntakeError::Io(_)));
    }

    #[test]
    fn test_has_image_extension() {
        assert!(has_image_extension(Path::new("a/b/desk.JPG")));
        assert!(has_image_extension(Path::new("desk.webp")));
        assert!(!has_image_extension(Path::new("desk.txt")));
        assert!(!has_image_extension(Path::new("desk")));
    }
}
