use std::{
    collections::BTreeMap,
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
};

use anyhow::Context as _;

use crate::foundation::error::{RunnerError, RunnerResult};

/// Rendering strategy requested from OpenSCAD.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    /// Run the script only, producing no image.
    TestOnly,
    /// Full CGAL/manifold render.
    Render,
    /// Fast OpenCSG preview.
    #[default]
    Preview,
    /// Preview with all CSG operands shown together.
    ThrownTogether,
    /// Full render drawn as a wireframe.
    Wireframe,
}

impl RenderMode {
    /// Every mode, in declaration order.
    pub const ALL: [RenderMode; 5] = [
        Self::TestOnly,
        Self::Render,
        Self::Preview,
        Self::ThrownTogether,
        Self::Wireframe,
    ];

    /// Human readable label.
    pub fn label(self) -> &'static str {
        match self {
            Self::TestOnly => "Test",
            Self::Render => "Render",
            Self::Preview => "Preview",
            Self::ThrownTogether => "Thrown Together",
            Self::Wireframe => "Wireframe",
        }
    }

    fn key(self) -> &'static str {
        match self {
            Self::TestOnly => "test_only",
            Self::Render => "render",
            Self::Preview => "preview",
            Self::ThrownTogether => "thrown_together",
            Self::Wireframe => "wireframe",
        }
    }
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for RenderMode {
    type Err = RunnerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize_name(s);
        Self::ALL
            .into_iter()
            .find(|m| normalize_name(m.key()) == wanted || normalize_name(m.label()) == wanted)
            .ok_or_else(|| RunnerError::validation(format!("unknown render mode '{s}'")))
    }
}

/// Built-in OpenSCAD color palettes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorScheme {
    /// OpenSCAD's default palette.
    #[default]
    Cornfield,
    /// `Metallic` palette.
    Metallic,
    /// `Sunset` palette.
    Sunset,
    /// `Starnight` palette.
    Starnight,
    /// `BeforeDawn` palette.
    BeforeDawn,
    /// `Nature` palette.
    Nature,
    /// `DeepOcean` palette.
    DeepOcean,
    /// `Solarized` palette.
    Solarized,
    /// `Tomorrow` palette.
    Tomorrow,
    /// `Tomorrow Night` palette.
    TomorrowNight,
    /// `Monotone` palette.
    Monotone,
}

impl ColorScheme {
    /// Every scheme, in declaration order.
    pub const ALL: [ColorScheme; 11] = [
        Self::Cornfield,
        Self::Metallic,
        Self::Sunset,
        Self::Starnight,
        Self::BeforeDawn,
        Self::Nature,
        Self::DeepOcean,
        Self::Solarized,
        Self::Tomorrow,
        Self::TomorrowNight,
        Self::Monotone,
    ];

    /// Name accepted by `openscad --colorscheme`.
    pub fn openscad_name(self) -> &'static str {
        match self {
            Self::Cornfield => "Cornfield",
            Self::Metallic => "Metallic",
            Self::Sunset => "Sunset",
            Self::Starnight => "Starnight",
            Self::BeforeDawn => "BeforeDawn",
            Self::Nature => "Nature",
            Self::DeepOcean => "DeepOcean",
            Self::Solarized => "Solarized",
            Self::Tomorrow => "Tomorrow",
            Self::TomorrowNight => "Tomorrow Night",
            Self::Monotone => "Monotone",
        }
    }
}

impl fmt::Display for ColorScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.openscad_name())
    }
}

impl FromStr for ColorScheme {
    type Err = RunnerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize_name(s);
        Self::ALL
            .into_iter()
            .find(|c| normalize_name(c.openscad_name()) == wanted)
            .ok_or_else(|| RunnerError::validation(format!("unknown color scheme '{s}'")))
    }
}

// "Tomorrow Night", "tomorrow_night" and "tomorrownight" all compare equal.
fn normalize_name(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Target image size in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ImageSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl ImageSize {
    /// Create a size from width and height.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Size multiplied by `factor`, truncated toward zero.
    pub fn scaled(self, factor: f64) -> Self {
        Self {
            width: (f64::from(self.width) * factor) as u32,
            height: (f64::from(self.height) * factor) as u32,
        }
    }
}

impl Default for ImageSize {
    fn default() -> Self {
        Self::new(640, 480)
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for ImageSize {
    type Err = RunnerError;

    /// Parses `640x480` or `640,480`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || RunnerError::validation(format!("invalid image size '{s}', expected WxH"));
        let (w, h) = s.split_once(['x', 'X', ',']).ok_or_else(bad)?;
        let width = w.trim().parse::<u32>().map_err(|_| bad())?;
        let height = h.trim().parse::<u32>().map_err(|_| bad())?;
        Ok(Self { width, height })
    }
}

/// Camera placement.
///
/// Either `[translate_x, y, z, rot_x, y, z, dist]` or `[eye_x, y, z, center_x, y, z]`. Shorter
/// lists are zero-padded to six components when passed to OpenSCAD.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Camera(pub Vec<f64>);

impl Camera {
    /// Components OpenSCAD expects at minimum.
    pub const MIN_COMPONENTS: usize = 6;

    /// Components padded with zeros up to [`Camera::MIN_COMPONENTS`].
    pub fn padded(&self) -> Vec<f64> {
        let mut out = self.0.clone();
        if out.len() < Self::MIN_COMPONENTS {
            out.resize(Self::MIN_COMPONENTS, 0.0);
        }
        out
    }

    /// The `--camera` argument value.
    pub fn to_arg(&self) -> String {
        self.padded()
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl From<Vec<f64>> for Camera {
    fn from(v: Vec<f64>) -> Self {
        Self(v)
    }
}

impl FromStr for Camera {
    type Err = RunnerError;

    /// Parses a comma separated list of numbers.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split(',')
            .map(|part| {
                part.trim().parse::<f64>().map_err(|_| {
                    RunnerError::validation(format!("invalid camera component '{part}'"))
                })
            })
            .collect::<RunnerResult<Vec<_>>>()
            .map(Self)
    }
}

/// Everything that controls one OpenSCAD invocation.
///
/// Build it with [`RenderConfig::new`] and the `with_*` methods, or load it from JSON with
/// [`RenderConfig::from_json_path`]. A [`Runner`](crate::Runner) takes ownership and never mutates
/// it.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RenderConfig {
    /// The `.scad` script to process.
    pub script: PathBuf,
    /// The file to write. Its extension selects the output format.
    pub outfile: PathBuf,
    /// Final image size for `.png` / `.gif` output.
    #[serde(default)]
    pub imgsize: ImageSize,
    /// Render at `imgsize * antialias`, then downscale to `imgsize`.
    #[serde(default = "default_antialias")]
    pub antialias: f64,
    /// Number of animation frames. Requires `.gif` output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animate: Option<u32>,
    /// Milliseconds per animation frame.
    #[serde(default = "default_animate_duration")]
    pub animate_duration: u32,
    /// Rendering strategy.
    #[serde(default)]
    pub render_mode: RenderMode,
    /// Show the axes.
    #[serde(default = "default_true")]
    pub show_axes: bool,
    /// Show the scale ticks along the axes.
    #[serde(default = "default_true")]
    pub show_scales: bool,
    /// Show the edges of every face.
    #[serde(default)]
    pub show_edges: bool,
    /// Show the crosshairs at the camera translation center.
    #[serde(default)]
    pub show_crosshairs: bool,
    /// Camera placement; OpenSCAD picks one when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub camera: Option<Camera>,
    /// Orthographic instead of perspective projection.
    #[serde(default)]
    pub orthographic: bool,
    /// Center the shape when the script does not set `$vpt`, `$vpr` or `$vpd`.
    #[serde(default)]
    pub auto_center: bool,
    /// Fit the whole shape in view when the script does not set `$vpd`.
    #[serde(default)]
    pub view_all: bool,
    /// Color palette.
    #[serde(default)]
    pub color_scheme: ColorScheme,
    /// Maximum number of CSG elements to render.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub csg_limit: Option<u64>,
    /// Write Makefile dependencies here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deps_file: Option<PathBuf>,
    /// Makefile to run when a dependency is missing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub make_file: Option<PathBuf>,
    /// Script variables passed as `-D name=value`.
    #[serde(default, deserialize_with = "de_scalar_map")]
    pub set_vars: BTreeMap<String, String>,
    /// Customizer parameter set file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customizer_file: Option<PathBuf>,
    /// Customizer parameters passed as `-P name=value`.
    #[serde(default, deserialize_with = "de_scalar_map")]
    pub customizer_params: BTreeMap<String, String>,
    /// Treat warnings as fatal.
    #[serde(default)]
    pub hard_warnings: bool,
    /// Suppress non-error, non-warning output.
    #[serde(default)]
    pub quiet: bool,
    /// Print the command line to stdout before each run.
    #[serde(default)]
    pub verbose: bool,
}

fn default_antialias() -> f64 {
    1.0
}

fn default_animate_duration() -> u32 {
    250
}

fn default_true() -> bool {
    true
}

fn de_scalar_map<'de, D>(de: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::Deserialize as _;
    use serde::de::Error as _;

    let raw = BTreeMap::<String, serde_json::Value>::deserialize(de)?;
    raw.into_iter()
        .map(|(k, v)| {
            let s = match v {
                serde_json::Value::String(s) => s,
                serde_json::Value::Number(n) => n.to_string(),
                serde_json::Value::Bool(b) => b.to_string(),
                other => {
                    return Err(D::Error::custom(format!(
                        "value for '{k}' must be a string, number or bool, got {other}"
                    )));
                }
            };
            Ok((k, s))
        })
        .collect()
}

impl RenderConfig {
    /// Configuration with every option at its default.
    pub fn new(script: impl Into<PathBuf>, outfile: impl Into<PathBuf>) -> Self {
        Self {
            script: script.into(),
            outfile: outfile.into(),
            imgsize: ImageSize::default(),
            antialias: default_antialias(),
            animate: None,
            animate_duration: default_animate_duration(),
            render_mode: RenderMode::default(),
            show_axes: true,
            show_scales: true,
            show_edges: false,
            show_crosshairs: false,
            camera: None,
            orthographic: false,
            auto_center: false,
            view_all: false,
            color_scheme: ColorScheme::default(),
            csg_limit: None,
            deps_file: None,
            make_file: None,
            set_vars: BTreeMap::new(),
            customizer_file: None,
            customizer_params: BTreeMap::new(),
            hard_warnings: false,
            quiet: false,
            verbose: false,
        }
    }

    /// Load a configuration from a JSON document.
    ///
    /// Relative `script` and `outfile` paths are kept as written; they resolve against the
    /// process working directory, not the document.
    pub fn from_json_path(path: &Path) -> RunnerResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    /// Parse a configuration from JSON text.
    pub fn from_json_str(text: &str) -> RunnerResult<Self> {
        serde_json::from_str(text).map_err(|e| RunnerError::serde(format!("config: {e}")))
    }

    /// Whether the configured output is a raster image OpenSCAD sizes with `--imgsize`.
    pub fn is_raster_output(&self) -> bool {
        matches!(lower_extension(&self.outfile).as_deref(), Some("png" | "gif"))
    }

    /// Whether post-processing has to resample images.
    pub fn needs_downscale(&self) -> bool {
        self.antialias != 1.0
    }

    /// Set the final image size.
    pub fn with_imgsize(mut self, width: u32, height: u32) -> Self {
        self.imgsize = ImageSize::new(width, height);
        self
    }

    /// Set the antialias factor.
    pub fn with_antialias(mut self, factor: f64) -> Self {
        self.antialias = factor;
        self
    }

    /// Render `frames` animation frames into a GIF.
    pub fn with_animation(mut self, frames: u32, duration_ms: u32) -> Self {
        self.animate = Some(frames);
        self.animate_duration = duration_ms;
        self
    }

    /// Set the rendering strategy.
    pub fn with_render_mode(mut self, mode: RenderMode) -> Self {
        self.render_mode = mode;
        self
    }

    /// Toggle axes, scales, edges and crosshairs in one go.
    pub fn with_view(mut self, axes: bool, scales: bool, edges: bool, crosshairs: bool) -> Self {
        self.show_axes = axes;
        self.show_scales = scales;
        self.show_edges = edges;
        self.show_crosshairs = crosshairs;
        self
    }

    /// Set the camera placement.
    pub fn with_camera(mut self, camera: impl Into<Camera>) -> Self {
        self.camera = Some(camera.into());
        self
    }

    /// Use orthographic projection.
    pub fn with_orthographic(mut self, orthographic: bool) -> Self {
        self.orthographic = orthographic;
        self
    }

    /// Center the shape in the image.
    pub fn with_auto_center(mut self, auto_center: bool) -> Self {
        self.auto_center = auto_center;
        self
    }

    /// Fit the whole shape in view.
    pub fn with_view_all(mut self, view_all: bool) -> Self {
        self.view_all = view_all;
        self
    }

    /// Set the color palette.
    pub fn with_color_scheme(mut self, scheme: ColorScheme) -> Self {
        self.color_scheme = scheme;
        self
    }

    /// Cap the number of rendered CSG elements.
    pub fn with_csg_limit(mut self, limit: u64) -> Self {
        self.csg_limit = Some(limit);
        self
    }

    /// Write Makefile dependencies to `path`.
    pub fn with_deps_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.deps_file = Some(path.into());
        self
    }

    /// Run the Makefile at `path` for missing dependencies.
    pub fn with_make_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.make_file = Some(path.into());
        self
    }

    /// Set one script variable (`-D name=value`). The value is passed verbatim, so string
    /// literals need their own quotes.
    pub fn with_var(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.set_vars.insert(name.into(), value.to_string());
        self
    }

    /// Read customizer parameters from `path`.
    pub fn with_customizer_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.customizer_file = Some(path.into());
        self
    }

    /// Set one customizer parameter (`-P name=value`).
    pub fn with_customizer_param(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.customizer_params.insert(name.into(), value.to_string());
        self
    }

    /// Treat warnings as fatal.
    pub fn with_hard_warnings(mut self, on: bool) -> Self {
        self.hard_warnings = on;
        self
    }

    /// Suppress informational output.
    pub fn with_quiet(mut self, on: bool) -> Self {
        self.quiet = on;
        self
    }

    /// Print the command line before running.
    pub fn with_verbose(mut self, on: bool) -> Self {
        self.verbose = on;
        self
    }
}

pub(crate) fn lower_extension(path: &Path) -> Option<String> {
    path.extension().map(|e| e.to_string_lossy().to_ascii_lowercase())
}

#[cfg(test)]
#[path = "../../tests/unit/config/options.rs"]
mod tests;
