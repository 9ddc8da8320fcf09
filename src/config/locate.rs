use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};

use crate::foundation::error::{RunnerError, RunnerResult};

/// Environment variable that overrides executable discovery.
pub const OPENSCAD_ENV: &str = "OPENSCAD";

const MACOS_APP_BINARY: &str = "/Applications/OpenSCAD.app/Contents/MacOS/OpenSCAD";
const WINDOWS_INSTALL_PATHS: [&str; 2] = [
    "C:\\Program Files\\OpenSCAD\\openscad.com",
    "C:\\Program Files (x86)\\OpenSCAD\\openscad.com",
];

/// Find the OpenSCAD executable for the current platform.
///
/// `$OPENSCAD` wins when set. Otherwise macOS uses the app bundle binary, Windows searches `PATH`
/// and then the default install directories, and everything else relies on `openscad` being on
/// `PATH`.
pub fn locate_openscad() -> RunnerResult<PathBuf> {
    resolve_executable(
        std::env::var_os(OPENSCAD_ENV),
        std::env::consts::OS,
        std::env::var_os("PATH"),
        |p| p.is_file(),
    )
}

pub(crate) fn resolve_executable(
    env_override: Option<OsString>,
    os: &str,
    path_var: Option<OsString>,
    is_file: impl Fn(&Path) -> bool,
) -> RunnerResult<PathBuf> {
    if let Some(p) = env_override.filter(|p| !p.is_empty()) {
        return Ok(PathBuf::from(p));
    }

    match os {
        "macos" => Ok(PathBuf::from(MACOS_APP_BINARY)),
        "windows" => {
            let on_path = path_var.iter().flat_map(|v| std::env::split_paths(v)).any(|dir| {
                ["openscad.exe", "openscad.com"]
                    .iter()
                    .any(|name| is_file(&dir.join(name)))
            });
            if on_path {
                return Ok(PathBuf::from("openscad"));
            }
            WINDOWS_INSTALL_PATHS
                .iter()
                .map(PathBuf::from)
                .find(|p| is_file(p))
                .ok_or_else(|| {
                    RunnerError::launch(
                        "can't find the OpenSCAD executable; is OpenSCAD on your PATH?",
                    )
                })
        }
        _ => Ok(PathBuf::from("openscad")),
    }
}

/// Whether `program` can be spawned with `--version` and exits cleanly.
pub fn is_on_path(program: &str) -> bool {
    std::process::Command::new(program)
        .arg("--version")
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/config/locate.rs"]
mod tests;
