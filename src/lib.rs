//! Drive the OpenSCAD application from Rust.
//!
//! A [`RenderConfig`] describes one invocation: script, output file, image size, view toggles,
//! camera, color scheme, script variables, customizer parameters and so on. A [`Runner`] turns it
//! into an OpenSCAD command line, runs the process, and returns a [`RunOutcome`] with the
//! captured output sorted into echo, warning and error lines.
//!
//! # Pipeline overview
//!
//! 1. **Plan**: work out output paths (numbered frames for animations, a throwaway file for
//!    test-only runs).
//! 2. **Invoke**: build the argument list and launch OpenSCAD without a shell.
//! 3. **Classify**: split stderr by the `ECHO:` / `WARNING:` / `ERROR:` / `TRACE:` prefixes and
//!    decide success.
//! 4. **Post-process** (successful renders only): downscale antialiased images, or assemble
//!    animation frames into a looping GIF capped at 64 colors, then optimize it with the system
//!    `gifsicle` when it is installed.
//!
//! A failed render is not an `Err`: check [`RunOutcome::good`] and [`RunOutcome::errors`].
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod config;
mod foundation;
mod invoke;
mod postprocess;
mod runner;

pub use config::locate::{OPENSCAD_ENV, is_on_path, locate_openscad};
pub use config::options::{Camera, ColorScheme, ImageSize, RenderConfig, RenderMode};
pub use foundation::error::{RunnerError, RunnerResult};
pub use invoke::args::{OutputPlan, build_args, drop_empty_args, plan_output, quote_command_line};
pub use invoke::classify::{ClassifiedLines, LineKind, classify_line, split_output};
pub use invoke::launcher::{Launcher, ProcessOutput, SystemLauncher};
pub use postprocess::gif::{
    GIF_MAX_COLORS, GifOptimization, limit_colors, load_frames, optimize_gif, write_animated_gif,
};
pub use postprocess::resize::{downscale_in_place, fit_within, open_image};
pub use runner::controller::Runner;
pub use runner::outcome::RunOutcome;
