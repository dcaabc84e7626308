use image::imageops::FilterType;
use image::DynamicImage;
use std::path::{Path, PathBuf};

use crate::models::job::{ImageOperation, UnsupportedOperation};

/// Fixed resize target. Aspect ratio is not preserved; known limitation.
pub const RESIZE_WIDTH: u32 = 100;
pub const RESIZE_HEIGHT: u32 = 100;

/// Decode/transform/encode step for one named operation.
///
/// Every failure mode is an explicit `CodecError` value; callers map it to
/// job state rather than relying on unwinding.
pub struct ImageCodec;

impl ImageCodec {
    /// Apply `operation` to the image at `input` and write the result to
    /// `output`. Decoding and encoding are CPU-bound, so the work runs on
    /// the blocking pool.
    pub async fn process(
        input: PathBuf,
        operation: String,
        output: PathBuf,
    ) -> Result<PathBuf, CodecError> {
        tokio::task::spawn_blocking(move || Self::process_sync(&input, &operation, &output))
            .await?
    }

    fn process_sync(
        input: &Path,
        operation: &str,
        output: &Path,
    ) -> Result<PathBuf, CodecError> {
        let operation: ImageOperation = operation.parse()?;
        let img = image::open(input)?;

        let transformed = match operation {
            ImageOperation::Grayscale => DynamicImage::ImageLuma8(img.to_luma8()),
            ImageOperation::Resize => {
                img.resize_exact(RESIZE_WIDTH, RESIZE_HEIGHT, FilterType::Triangle)
            }
        };

        // Output format follows the file extension, which the output path
        // inherits from the upload.
        transformed.save(output)?;
        Ok(output.to_path_buf())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error(transparent)]
    Unsupported(#[from] UnsupportedOperation),

    #[error("image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("codec task aborted: {0}")]
    Join(#[from] tokio::task::JoinError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ColorType, RgbImage};

    fn write_test_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
        let path = dir.join(name);
        let img = RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
        });
        img.save(&path).unwrap();
        path
    }

    #[tokio::test]
    async fn test_grayscale_produces_single_channel() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_test_png(dir.path(), "in.png", 64, 48);
        let output = dir.path().join("out.png");

        let result = ImageCodec::process(input, "grayscale".into(), output.clone())
            .await
            .unwrap();
        assert_eq!(result, output);

        let img = image::open(&output).unwrap();
        assert_eq!(img.color(), ColorType::L8);
        // Dimensions are untouched by grayscale.
        assert_eq!((img.width(), img.height()), (64, 48));
    }

    #[tokio::test]
    async fn test_resize_is_exactly_100x100() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_test_png(dir.path(), "in.png", 640, 120);
        let output = dir.path().join("out.png");

        ImageCodec::process(input, "resize".into(), output.clone()).await.unwrap();

        let img = image::open(&output).unwrap();
        // Aspect ratio is intentionally not preserved.
        assert_eq!((img.width(), img.height()), (RESIZE_WIDTH, RESIZE_HEIGHT));
    }

    #[tokio::test]
    async fn test_unknown_operation_is_typed_error() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_test_png(dir.path(), "in.png", 8, 8);
        let output = dir.path().join("out.png");

        let err = ImageCodec::process(input, "rot13".into(), output.clone())
            .await
            .unwrap_err();
        assert!(matches!(err, CodecError::Unsupported(_)));
        assert!(!err.to_string().is_empty());
        // Failed jobs write nothing.
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_missing_input_fails_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("no-such.png");
        let output = dir.path().join("out.png");

        let err = ImageCodec::process(input, "grayscale".into(), output.clone())
            .await
            .unwrap_err();
        assert!(matches!(err, CodecError::Image(_)));
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_jpeg_input_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("in.jpg");
        RgbImage::from_fn(32, 32, |_, _| image::Rgb([200, 10, 10]))
            .save(&path)
            .unwrap();
        let output = dir.path().join("out.jpg");

        ImageCodec::process(path, "grayscale".into(), output.clone()).await.unwrap();
        assert_eq!(image::open(&output).unwrap().color(), ColorType::L8);
    }
}
