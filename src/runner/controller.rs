use std::path::{Path, PathBuf};

use crate::{
    config::{
        locate::locate_openscad,
        options::{RenderConfig, RenderMode},
    },
    foundation::error::{RunnerError, RunnerResult},
    invoke::{
        args::{OutputPlan, build_args, drop_empty_args, plan_output, quote_command_line},
        classify::{ClassifiedLines, split_output},
        launcher::{Launcher, SystemLauncher},
    },
    postprocess::{
        gif::{GIF_MAX_COLORS, limit_colors, load_frames, optimize_gif, write_animated_gif},
        resize::downscale_in_place,
    },
    runner::outcome::{RunOutcome, is_success},
};

/// Runs OpenSCAD for one [`RenderConfig`] and post-processes what it renders.
///
/// ```no_run
/// use openscad_runner::{RenderConfig, RenderMode, Runner};
///
/// let cfg = RenderConfig::new("model.scad", "model.png")
///     .with_render_mode(RenderMode::Render)
///     .with_antialias(2.0)
///     .with_var("size", 10);
/// let outcome = Runner::new(cfg)?.run()?;
/// if !outcome.good() {
///     for line in outcome.errors() {
///         eprintln!("{line}");
///     }
/// }
/// # Ok::<(), openscad_runner::RunnerError>(())
/// ```
pub struct Runner {
    config: RenderConfig,
    executable: PathBuf,
    launcher: Box<dyn Launcher>,
}

impl std::fmt::Debug for Runner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runner")
            .field("config", &self.config)
            .field("executable", &self.executable)
            .finish_non_exhaustive()
    }
}

impl Runner {
    /// Create a runner using the platform's OpenSCAD executable.
    pub fn new(config: RenderConfig) -> RunnerResult<Self> {
        Ok(Self::with_executable(config, locate_openscad()?))
    }

    /// Create a runner for an explicit OpenSCAD executable.
    pub fn with_executable(config: RenderConfig, executable: impl Into<PathBuf>) -> Self {
        Self {
            config,
            executable: executable.into(),
            launcher: Box::new(SystemLauncher),
        }
    }

    /// Replace how the process is started.
    pub fn with_launcher(mut self, launcher: impl Launcher + 'static) -> Self {
        self.launcher = Box::new(launcher);
        self
    }

    /// The configuration this runner executes.
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// The OpenSCAD executable this runner launches.
    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// The full command line, program first, before any platform filtering.
    pub fn command_line(&self) -> RunnerResult<Vec<String>> {
        let plan = plan_output(&self.config)?;
        Ok(self.full_command(&plan))
    }

    fn full_command(&self, plan: &OutputPlan) -> Vec<String> {
        let mut cmd = vec![self.executable.to_string_lossy().into_owned()];
        cmd.extend(build_args(&self.config, plan));
        cmd
    }

    /// Run OpenSCAD once and post-process its output.
    ///
    /// Returns `Err` only when the run cannot happen (bad configuration, executable missing) or
    /// when post-processing a successful render fails. OpenSCAD's own failures are reported
    /// through [`RunOutcome::good`] and [`RunOutcome::errors`].
    #[tracing::instrument(skip(self), fields(script = %self.config.script.display()))]
    pub fn run(&self) -> RunnerResult<RunOutcome> {
        let cfg = &self.config;
        let plan = plan_output(cfg)?;

        let mut cmdline = self.full_command(&plan);
        if cfg.verbose {
            println!("{}", quote_command_line(&cmdline));
        }
        tracing::debug!(cmdline = %quote_command_line(&cmdline), "launching openscad");
        if cfg!(windows) {
            cmdline = drop_empty_args(cmdline);
        }

        let output = self.launcher.launch(&self.executable, &cmdline[1..])?;
        let stdout = split_output(&output.stdout);
        let stderr = split_output(&output.stderr);
        let classified = ClassifiedLines::from_lines(&stderr);
        let success = is_success(output.code, &classified, cfg.hard_warnings);

        if let Some(throwaway) = &plan.throwaway {
            remove_if_exists(throwaway).inspect_err(|e| log_dropped_lines(e, &classified))?;
        }

        let script = read_script_lines(&cfg.script);

        if success && cfg.render_mode != RenderMode::TestOnly {
            self.post_process(&plan)
                .inspect_err(|e| log_dropped_lines(e, &classified))?;
        }

        tracing::info!(
            code = ?output.code,
            success,
            echos = classified.echos.len(),
            warnings = classified.warnings.len(),
            errors = classified.errors.len(),
            "openscad run finished"
        );

        Ok(RunOutcome {
            cmdline,
            return_code: output.code,
            stdout,
            stderr,
            classified,
            script,
            success,
            complete: true,
        })
    }

    fn post_process(&self, plan: &OutputPlan) -> RunnerResult<()> {
        let cfg = &self.config;

        if !plan.frames.is_empty() {
            tracing::debug!(frames = plan.frames.len(), "assembling animation");
            let mut frames = load_frames(&plan.frames, cfg.imgsize, cfg.needs_downscale())?;
            for frame in &plan.frames {
                remove_if_exists(frame)?;
            }
            if limit_colors(&mut frames, GIF_MAX_COLORS) {
                tracing::debug!(max_colors = GIF_MAX_COLORS, "quantized animation palette");
            }
            write_animated_gif(frames, &plan.final_out, cfg.animate_duration)?;
            optimize_gif(&plan.final_out, GIF_MAX_COLORS)?;
        } else if cfg.needs_downscale() && cfg.is_raster_output() {
            downscale_in_place(&plan.final_out, cfg.imgsize)?;
        }
        Ok(())
    }
}

fn remove_if_exists(path: &Path) -> RunnerResult<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(RunnerError::post_process(format!(
            "failed to remove '{}': {e}",
            path.display()
        ))),
    }
}

// An `Err` from `run` carries no outcome, so the captured diagnostics go to the log instead.
fn log_dropped_lines(err: &RunnerError, classified: &ClassifiedLines) {
    tracing::error!(
        error = %err,
        echos = ?classified.echos,
        warnings = ?classified.warnings,
        errors = ?classified.errors,
        "openscad run aborted after launch"
    );
}

// The script copy is a diagnostic convenience; an unreadable script leaves it empty.
fn read_script_lines(path: &Path) -> Vec<String> {
    match std::fs::read_to_string(path) {
        Ok(text) => text.lines().map(str::to_string).collect(),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "could not re-read script");
            Vec::new()
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/runner/controller.rs"]
mod tests;
