use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat, imageops::FilterType};

use crate::{
    config::options::ImageSize,
    foundation::error::{RunnerError, RunnerResult},
};

/// Shrink `img` to fit inside `target`, keeping its aspect ratio.
///
/// Images already within bounds are returned unchanged; this never upscales.
pub fn fit_within(img: DynamicImage, target: ImageSize) -> DynamicImage {
    if img.width() <= target.width && img.height() <= target.height {
        return img;
    }
    img.resize(target.width, target.height, FilterType::Lanczos3)
}

/// Open an image file, reporting failures as post-processing errors.
pub fn open_image(path: &Path) -> RunnerResult<DynamicImage> {
    image::open(path).map_err(|e| {
        RunnerError::post_process(format!("failed to open image '{}': {e}", path.display()))
    })
}

/// Downscale the image at `path` to fit `target` and replace the file.
///
/// The result is written to a sibling temporary file first and renamed over the original, so
/// an interrupted save leaves the rendered image in place.
#[tracing::instrument(skip_all, fields(path = %path.display()))]
pub fn downscale_in_place(path: &Path, target: ImageSize) -> RunnerResult<()> {
    let format = ImageFormat::from_path(path).map_err(|e| {
        RunnerError::post_process(format!(
            "unsupported image format for '{}': {e}",
            path.display()
        ))
    })?;

    let img = fit_within(open_image(path)?, target);
    tracing::debug!(width = img.width(), height = img.height(), "downscaled");

    let tmp = temp_sibling(path);
    img.save_with_format(&tmp, format).map_err(|e| {
        let _ = std::fs::remove_file(&tmp);
        RunnerError::post_process(format!("failed to write '{}': {e}", tmp.display()))
    })?;
    std::fs::rename(&tmp, path).map_err(|e| {
        let _ = std::fs::remove_file(&tmp);
        RunnerError::post_process(format!(
            "failed to replace '{}' with downscaled image: {e}",
            path.display()
        ))
    })?;
    Ok(())
}

fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.resize-tmp"))
}

#[cfg(test)]
#[path = "../../tests/unit/postprocess/resize.rs"]
mod tests;
