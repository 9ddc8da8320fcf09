use std::path::{Path, PathBuf};

use crate::{
    config::options::{ColorScheme, RenderConfig, RenderMode, lower_extension},
    foundation::error::{RunnerError, RunnerResult},
};

/// Where OpenSCAD writes and where the finished result ends up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputPlan {
    /// Path passed to `-o`.
    pub openscad_out: PathBuf,
    /// Path the caller asked for.
    pub final_out: PathBuf,
    /// Numbered frame files OpenSCAD writes when animating; empty otherwise.
    pub frames: Vec<PathBuf>,
    /// Terminal-output file written in test-only mode and deleted afterwards.
    pub throwaway: Option<PathBuf>,
}

/// Work out the output paths for `cfg`.
///
/// Animation requires a `.gif` output and a non-zero frame count, in every render mode. Frames
/// are named after the output stem with dots replaced by underscores, followed by a five digit
/// index: `out.gif` gives `out00000.png`, `out00001.png`, and so on.
pub fn plan_output(cfg: &RenderConfig) -> RunnerResult<OutputPlan> {
    let final_out = cfg.outfile.clone();

    if let Some(frame_count) = cfg.animate {
        if lower_extension(&final_out).as_deref() != Some("gif") {
            return Err(RunnerError::validation(format!(
                "can only animate to a gif file, got '{}'",
                final_out.display()
            )));
        }
        if frame_count == 0 {
            return Err(RunnerError::validation(
                "animation frame count must be non-zero",
            ));
        }
    }

    if cfg.render_mode == RenderMode::TestOnly {
        return Ok(OutputPlan {
            openscad_out: throwaway_path(&final_out),
            throwaway: Some(throwaway_path(&final_out)),
            final_out,
            frames: Vec::new(),
        });
    }

    let Some(frame_count) = cfg.animate else {
        return Ok(OutputPlan {
            openscad_out: final_out.clone(),
            final_out,
            frames: Vec::new(),
            throwaway: None,
        });
    };

    let stem = final_out
        .file_stem()
        .map(|s| s.to_string_lossy().replace('.', "_"))
        .unwrap_or_default();
    let dir = final_out.parent().unwrap_or_else(|| Path::new(""));

    Ok(OutputPlan {
        openscad_out: dir.join(format!("{stem}.png")),
        frames: (0..frame_count)
            .map(|i| dir.join(format!("{stem}{i:05}.png")))
            .collect(),
        final_out,
        throwaway: None,
    })
}

fn throwaway_path(outfile: &Path) -> PathBuf {
    outfile.with_extension("term")
}

/// Build the OpenSCAD argument list (without the program name) for `cfg`.
pub fn build_args(cfg: &RenderConfig, plan: &OutputPlan) -> Vec<String> {
    let mut args = vec!["-o".to_string(), path_arg(&plan.openscad_out)];

    if cfg.render_mode != RenderMode::TestOnly {
        push_render_args(&mut args, cfg);
    }

    if let Some(p) = &cfg.deps_file {
        args.extend(["-d".to_string(), path_arg(p)]);
    }
    if let Some(p) = &cfg.make_file {
        args.extend(["-m".to_string(), path_arg(p)]);
    }
    for (name, value) in &cfg.set_vars {
        args.extend(["-D".to_string(), format!("{name}={value}")]);
    }
    if let Some(p) = &cfg.customizer_file {
        args.extend(["-p".to_string(), path_arg(p)]);
    }
    for (name, value) in &cfg.customizer_params {
        args.extend(["-P".to_string(), format!("{name}={value}")]);
    }
    if cfg.hard_warnings {
        args.push("--hardwarnings".to_string());
    }
    if cfg.quiet {
        args.push("--quiet".to_string());
    }
    args.push(path_arg(&cfg.script));
    args
}

fn push_render_args(args: &mut Vec<String>, cfg: &RenderConfig) {
    if cfg.is_raster_output() {
        let size = cfg.imgsize.scaled(cfg.antialias);
        args.push(format!("--imgsize={},{}", size.width, size.height));
    }

    let view: Vec<&str> = [
        (cfg.show_axes, "axes"),
        (cfg.show_scales, "scales"),
        (cfg.show_edges, "edges"),
        (cfg.show_crosshairs, "crosshairs"),
        (cfg.render_mode == RenderMode::Wireframe, "wireframe"),
    ]
    .into_iter()
    .filter_map(|(on, name)| on.then_some(name))
    .collect();
    if !view.is_empty() {
        args.push(format!("--view={}", view.join(",")));
    }

    if let Some(camera) = &cfg.camera {
        args.extend(["--camera".to_string(), camera.to_arg()]);
    }
    if cfg.color_scheme != ColorScheme::Cornfield {
        args.extend([
            "--colorscheme".to_string(),
            cfg.color_scheme.openscad_name().to_string(),
        ]);
    }
    let projection = if cfg.orthographic { "o" } else { "p" };
    args.push(format!("--projection={projection}"));
    if cfg.auto_center {
        args.push("--autocenter".to_string());
    }
    if cfg.view_all {
        args.push("--viewall".to_string());
    }
    if let Some(frames) = cfg.animate {
        args.extend(["--animate".to_string(), frames.to_string()]);
    }

    let mode_flag = match cfg.render_mode {
        RenderMode::Render | RenderMode::Wireframe => Some(("--render", "")),
        RenderMode::Preview => Some(("--preview", "")),
        RenderMode::ThrownTogether => Some(("--preview", "throwntogether")),
        RenderMode::TestOnly => None,
    };
    if let Some((flag, value)) = mode_flag {
        args.extend([flag.to_string(), value.to_string()]);
    }

    if let Some(limit) = cfg.csg_limit {
        args.extend(["--csglimit".to_string(), limit.to_string()]);
    }
}

fn path_arg(p: &Path) -> String {
    p.to_string_lossy().into_owned()
}

/// Remove empty arguments. Windows argument escaping turns them into something OpenSCAD rejects.
pub fn drop_empty_args(args: Vec<String>) -> Vec<String> {
    args.into_iter().filter(|a| !a.is_empty()).collect()
}

/// Render a command line for display, single-quoting arguments that are empty or contain a space.
pub fn quote_command_line<S: AsRef<str>>(parts: &[S]) -> String {
    parts
        .iter()
        .map(|part| {
            let part = part.as_ref();
            if part.is_empty() || part.contains(' ') {
                format!("'{part}'")
            } else {
                part.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
#[path = "../../tests/unit/invoke/args.rs"]
mod tests;
