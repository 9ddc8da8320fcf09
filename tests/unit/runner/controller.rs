use std::{cell::RefCell, rc::Rc};

use super::*;
use crate::invoke::launcher::ProcessOutput;

#[derive(Clone, Default)]
struct Recording {
    calls: Rc<RefCell<Vec<(PathBuf, Vec<String>)>>>,
    stderr: &'static str,
    code: i32,
}

impl Launcher for Recording {
    fn launch(&self, program: &Path, args: &[String]) -> RunnerResult<ProcessOutput> {
        self.calls
            .borrow_mut()
            .push((program.to_path_buf(), args.to_vec()));
        Ok(ProcessOutput {
            code: Some(self.code),
            stdout: Vec::new(),
            stderr: self.stderr.as_bytes().to_vec(),
        })
    }
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = PathBuf::from("target").join("unit_controller").join(name);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn command_line_starts_with_executable() {
    let cfg = RenderConfig::new("m.scad", "m.stl").with_render_mode(RenderMode::Render);
    let runner = Runner::with_executable(cfg, "/usr/local/bin/openscad");
    let cmd = runner.command_line().unwrap();
    assert_eq!(cmd[0], "/usr/local/bin/openscad");
    assert_eq!(cmd.last().map(String::as_str), Some("m.scad"));
}

#[test]
fn invalid_animation_never_launches() {
    let launcher = Recording::default();
    let calls = launcher.calls.clone();
    let cfg = RenderConfig::new("m.scad", "m.png").with_animation(4, 100);
    let err = Runner::with_executable(cfg, "openscad")
        .with_launcher(launcher)
        .run()
        .unwrap_err();
    assert!(matches!(err, RunnerError::Validation(_)));
    assert!(calls.borrow().is_empty());
}

#[test]
fn launched_args_exclude_program_and_outcome_records_it() {
    let dir = scratch_dir("args");
    let script = dir.join("m.scad");
    std::fs::write(&script, "cube(10);\necho(\"done\");\n").unwrap();

    let launcher = Recording {
        stderr: "ECHO: \"done\"\n",
        ..Default::default()
    };
    let calls = launcher.calls.clone();
    let cfg = RenderConfig::new(&script, dir.join("m.stl")).with_render_mode(RenderMode::Render);
    let outcome = Runner::with_executable(cfg, "openscad")
        .with_launcher(launcher)
        .run()
        .unwrap();

    let calls = calls.borrow();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, PathBuf::from("openscad"));
    assert_eq!(outcome.cmdline()[0], "openscad");
    assert_eq!(&outcome.cmdline()[1..], calls[0].1.as_slice());
    assert_eq!(outcome.echos(), ["ECHO: \"done\""]);
    assert_eq!(outcome.script(), ["cube(10);", "echo(\"done\");"]);
    assert!(outcome.good() && outcome.is_complete());
}

#[test]
fn failed_run_skips_post_processing_but_completes() {
    let dir = scratch_dir("failed");
    let out = dir.join("never.png");
    let _ = std::fs::remove_file(&out);

    let launcher = Recording {
        stderr: "ERROR: Parser error\n",
        code: 1,
        ..Default::default()
    };
    // antialias would require an image to exist; a failed run must not touch it.
    let cfg = RenderConfig::new(dir.join("missing.scad"), &out).with_antialias(2.0);
    let outcome = Runner::with_executable(cfg, "openscad")
        .with_launcher(launcher)
        .run()
        .unwrap();
    assert!(!outcome.good());
    assert!(outcome.is_complete());
    assert!(outcome.script().is_empty());
    assert!(!out.exists());
}

#[test]
fn remove_if_exists_tolerates_missing_files() {
    let dir = scratch_dir("remove");
    let path = dir.join("gone.term");
    std::fs::write(&path, "x").unwrap();
    remove_if_exists(&path).unwrap();
    assert!(!path.exists());
    remove_if_exists(&path).unwrap();
}

#[derive(Clone, Default)]
struct LogBuffer(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

impl std::io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[test]
fn post_processing_failure_logs_captured_lines() {
    let dir = scratch_dir("lost_frames");
    let script = dir.join("m.scad");
    std::fs::write(&script, "cube(1);\n").unwrap();

    // Reports success but writes no frames, so assembling the animation fails.
    let launcher = Recording {
        stderr: "ECHO: 42\nWARNING: Ignoring unknown variable 'q'\n",
        ..Default::default()
    };
    let cfg = RenderConfig::new(&script, dir.join("spin.gif")).with_animation(2, 100);

    let logs = LogBuffer::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_max_level(tracing::Level::ERROR)
        .with_writer(move || writer.clone())
        .finish();
    let err = tracing::subscriber::with_default(subscriber, || {
        Runner::with_executable(cfg, "openscad")
            .with_launcher(launcher)
            .run()
            .unwrap_err()
    });

    assert!(matches!(err, RunnerError::PostProcess(_)));
    let text = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
    assert!(text.contains("ECHO: 42"), "{text}");
    assert!(text.contains("Ignoring unknown variable"), "{text}");
}
