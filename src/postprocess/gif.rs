use std::{collections::HashSet, path::Path, process::Command};

use image::{
    Delay, Frame, RgbaImage,
    codecs::gif::{GifEncoder, Repeat},
};

use crate::{
    config::{locate::is_on_path, options::ImageSize},
    foundation::error::{RunnerError, RunnerResult},
    postprocess::resize::{fit_within, open_image},
};

/// Palette cap for assembled animations.
pub const GIF_MAX_COLORS: u32 = 64;

// NeuQuant sampling factor: 1 is slowest and best, 30 fastest.
const QUANT_SAMPLE_FACTOR: i32 = 10;

const GIFSICLE: &str = "gifsicle";

/// Load rendered animation frames, optionally shrinking each to fit `target`.
pub fn load_frames<P: AsRef<Path>>(
    paths: &[P],
    target: ImageSize,
    downscale: bool,
) -> RunnerResult<Vec<RgbaImage>> {
    paths
        .iter()
        .map(|p| {
            let img = open_image(p.as_ref())?;
            let img = if downscale { fit_within(img, target) } else { img };
            Ok(img.to_rgba8())
        })
        .collect()
}

/// Reduce `frames` to at most `max_colors` distinct colors using one palette shared by every
/// frame. Returns `false` when the frames already fit and were left untouched.
///
/// `max_colors` is clamped to `2..=256`, the range a GIF palette can hold.
pub fn limit_colors(frames: &mut [RgbaImage], max_colors: u32) -> bool {
    let max_colors = max_colors.clamp(2, 256) as usize;
    if distinct_colors_within(frames, max_colors) {
        return false;
    }

    let samples: Vec<u8> = frames
        .iter()
        .flat_map(|f| f.as_raw().iter().copied())
        .collect();
    let quant = color_quant::NeuQuant::new(QUANT_SAMPLE_FACTOR, max_colors, &samples);
    for frame in frames.iter_mut() {
        for pixel in frame.pixels_mut() {
            quant.map_pixel(&mut pixel.0);
        }
    }
    true
}

fn distinct_colors_within(frames: &[RgbaImage], max_colors: usize) -> bool {
    let mut seen = HashSet::new();
    for pixel in frames.iter().flat_map(|f| f.pixels()) {
        if seen.insert(pixel.0) && seen.len() > max_colors {
            return false;
        }
    }
    true
}

/// Write `frames` as one animated GIF that loops forever, showing each frame for `delay_ms`.
#[tracing::instrument(skip(frames), fields(frames = frames.len(), out = %out.display()))]
pub fn write_animated_gif(frames: Vec<RgbaImage>, out: &Path, delay_ms: u32) -> RunnerResult<()> {
    if frames.is_empty() {
        return Err(RunnerError::post_process("cannot write a gif with no frames"));
    }

    let delay = Delay::from_numer_denom_ms(delay_ms, 1);
    let mut bytes = Vec::new();
    {
        let mut encoder = GifEncoder::new(&mut bytes);
        encoder
            .set_repeat(Repeat::Infinite)
            .map_err(|e| RunnerError::post_process(format!("gif repeat: {e}")))?;
        encoder
            .encode_frames(
                frames
                    .into_iter()
                    .map(|buf| Frame::from_parts(buf, 0, 0, delay)),
            )
            .map_err(|e| RunnerError::post_process(format!("gif encode: {e}")))?;
    }

    std::fs::write(out, bytes).map_err(|e| {
        RunnerError::post_process(format!("failed to write '{}': {e}", out.display()))
    })
}

/// Outcome of [`optimize_gif`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GifOptimization {
    /// `gifsicle` rewrote the file.
    Optimized,
    /// `gifsicle` is not installed; the file was left as encoded.
    Skipped,
}

/// Run a lossy `gifsicle --optimize` pass over `path` in place.
///
/// The palette cap is already enforced by [`limit_colors`]; a missing `gifsicle` only costs file
/// size, so it is skipped with a warning.
pub fn optimize_gif(path: &Path, max_colors: u32) -> RunnerResult<GifOptimization> {
    run_optimizer(GIFSICLE, path, max_colors)
}

pub(crate) fn run_optimizer(
    program: &str,
    path: &Path,
    max_colors: u32,
) -> RunnerResult<GifOptimization> {
    if !is_on_path(program) {
        tracing::warn!(
            program,
            path = %path.display(),
            "optimizer not found on PATH; leaving animation unoptimized"
        );
        return Ok(GifOptimization::Skipped);
    }

    let output = Command::new(program)
        .args(["--batch", "--optimize", "--colors", &max_colors.to_string()])
        .arg(path)
        .output()
        .map_err(|e| RunnerError::post_process(format!("failed to run {program}: {e}")))?;

    if !output.status.success() {
        return Err(RunnerError::post_process(format!(
            "{program} exited with status {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }
    Ok(GifOptimization::Optimized)
}

#[cfg(test)]
#[path = "../../tests/unit/postprocess/gif.rs"]
mod tests;
