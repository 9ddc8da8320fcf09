use std::{path::PathBuf, process::ExitCode};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use openscad_runner::{
    Camera, ColorScheme, ImageSize, RenderConfig, RenderMode, Runner, quote_command_line,
};

#[derive(Parser, Debug)]
#[command(name = "openscad-runner", version)]
struct Cli {
    /// Maximum log level written to stderr (error, warn, info, debug, trace).
    #[arg(long, global = true, default_value_t = tracing::Level::WARN)]
    log_level: tracing::Level,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run OpenSCAD and post-process the rendered image.
    Run(ConfigArgs),
    /// Print the OpenSCAD command line without running it.
    Cmdline(ConfigArgs),
}

#[derive(Parser, Debug)]
struct ConfigArgs {
    /// JSON configuration; flags given here override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Script to process.
    script: Option<PathBuf>,

    /// Output file (.png, .gif, .stl, ...).
    #[arg(short = 'o', long = "out")]
    out: Option<PathBuf>,

    /// Final image size, e.g. `800x600`.
    #[arg(long)]
    size: Option<ImageSize>,

    /// Render larger by this factor, then downscale.
    #[arg(long)]
    antialias: Option<f64>,

    /// Number of animation frames (requires .gif output).
    #[arg(long)]
    animate: Option<u32>,

    /// Milliseconds per animation frame.
    #[arg(long)]
    duration: Option<u32>,

    /// Rendering mode: test_only, render, preview, thrown_together, wireframe.
    #[arg(long)]
    mode: Option<RenderMode>,

    /// Hide the axes.
    #[arg(long)]
    no_axes: bool,

    /// Hide the axis scales.
    #[arg(long)]
    no_scales: bool,

    /// Show face edges.
    #[arg(long)]
    edges: bool,

    /// Show the camera crosshairs.
    #[arg(long)]
    crosshairs: bool,

    /// Camera as comma separated numbers (6 or 7 components, shorter lists are zero-padded).
    #[arg(long, allow_hyphen_values = true)]
    camera: Option<Camera>,

    /// Orthographic projection.
    #[arg(long)]
    ortho: bool,

    /// Center the shape in the image.
    #[arg(long)]
    autocenter: bool,

    /// Fit the whole shape in view.
    #[arg(long)]
    viewall: bool,

    /// Color scheme, e.g. `metallic` or `"Tomorrow Night"`.
    #[arg(long)]
    colorscheme: Option<ColorScheme>,

    /// Maximum number of CSG elements to render.
    #[arg(long)]
    csglimit: Option<u64>,

    /// Write Makefile dependencies to this file.
    #[arg(short = 'd', long = "deps")]
    deps: Option<PathBuf>,

    /// Makefile to run for missing dependencies.
    #[arg(short = 'm', long = "make")]
    make: Option<PathBuf>,

    /// Script variable, repeatable.
    #[arg(short = 'D', value_name = "NAME=VALUE", value_parser = parse_assignment)]
    define: Vec<(String, String)>,

    /// Customizer parameter file.
    #[arg(short = 'p', long = "customizer-file")]
    customizer_file: Option<PathBuf>,

    /// Customizer parameter, repeatable.
    #[arg(short = 'P', value_name = "NAME=VALUE", value_parser = parse_assignment)]
    param: Vec<(String, String)>,

    /// Treat warnings as errors.
    #[arg(long)]
    hardwarnings: bool,

    /// Only report warnings and errors.
    #[arg(long)]
    quiet: bool,

    /// Print the command line before running.
    #[arg(long)]
    verbose: bool,

    /// OpenSCAD executable (defaults to $OPENSCAD, then the platform location).
    #[arg(long)]
    openscad: Option<PathBuf>,
}

fn parse_assignment(s: &str) -> Result<(String, String), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{s}'"))?;
    if name.is_empty() {
        return Err(format!("missing name in '{s}'"));
    }
    Ok((name.to_string(), value.to_string()))
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_writer(std::io::stderr)
        .init();

    match cli.cmd {
        Command::Run(args) => cmd_run(args),
        Command::Cmdline(args) => cmd_cmdline(args),
    }
}

fn build_config(args: &ConfigArgs) -> anyhow::Result<RenderConfig> {
    let mut cfg = match &args.config {
        Some(path) => RenderConfig::from_json_path(path)?,
        None => {
            let script = args
                .script
                .clone()
                .context("a SCRIPT argument or --config is required")?;
            let out = args
                .out
                .clone()
                .context("--out is required without --config")?;
            RenderConfig::new(script, out)
        }
    };

    if let Some(script) = &args.script {
        cfg.script = script.clone();
    }
    if let Some(out) = &args.out {
        cfg.outfile = out.clone();
    }
    if let Some(size) = args.size {
        cfg.imgsize = size;
    }
    if let Some(aa) = args.antialias {
        cfg.antialias = aa;
    }
    if let Some(frames) = args.animate {
        cfg.animate = Some(frames);
    }
    if let Some(ms) = args.duration {
        cfg.animate_duration = ms;
    }
    if let Some(mode) = args.mode {
        cfg.render_mode = mode;
    }
    cfg.show_axes &= !args.no_axes;
    cfg.show_scales &= !args.no_scales;
    cfg.show_edges |= args.edges;
    cfg.show_crosshairs |= args.crosshairs;
    if let Some(camera) = &args.camera {
        cfg.camera = Some(camera.clone());
    }
    cfg.orthographic |= args.ortho;
    cfg.auto_center |= args.autocenter;
    cfg.view_all |= args.viewall;
    if let Some(scheme) = args.colorscheme {
        cfg.color_scheme = scheme;
    }
    if let Some(limit) = args.csglimit {
        cfg.csg_limit = Some(limit);
    }
    if let Some(deps) = &args.deps {
        cfg.deps_file = Some(deps.clone());
    }
    if let Some(make) = &args.make {
        cfg.make_file = Some(make.clone());
    }
    cfg.set_vars.extend(args.define.iter().cloned());
    if let Some(file) = &args.customizer_file {
        cfg.customizer_file = Some(file.clone());
    }
    cfg.customizer_params.extend(args.param.iter().cloned());
    cfg.hard_warnings |= args.hardwarnings;
    cfg.quiet |= args.quiet;
    cfg.verbose |= args.verbose;

    Ok(cfg)
}

fn make_runner(args: &ConfigArgs) -> anyhow::Result<Runner> {
    let cfg = build_config(args)?;
    let runner = match &args.openscad {
        Some(exe) => Runner::with_executable(cfg, exe),
        None => Runner::new(cfg).context("locate OpenSCAD")?,
    };
    Ok(runner)
}

fn cmd_run(args: ConfigArgs) -> anyhow::Result<ExitCode> {
    let runner = make_runner(&args)?;
    let outcome = runner.run().with_context(|| {
        format!("run OpenSCAD on '{}'", runner.config().script.display())
    })?;

    for line in outcome.echos() {
        println!("{line}");
    }
    for line in outcome.warnings().iter().chain(outcome.errors()) {
        eprintln!("{line}");
    }

    if outcome.good() {
        if runner.config().render_mode != RenderMode::TestOnly {
            eprintln!("wrote {}", runner.config().outfile.display());
        }
        Ok(ExitCode::SUCCESS)
    } else {
        match outcome.return_code() {
            Some(code) => eprintln!("openscad failed (exit code {code})"),
            None => eprintln!("openscad failed (terminated by signal)"),
        }
        Ok(ExitCode::FAILURE)
    }
}

fn cmd_cmdline(args: ConfigArgs) -> anyhow::Result<ExitCode> {
    let runner = make_runner(&args)?;
    println!("{}", quote_command_line(&runner.command_line()?));
    Ok(ExitCode::SUCCESS)
}
