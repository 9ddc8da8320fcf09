use super::*;
use crate::config::options::ColorScheme;

fn args_for(cfg: &RenderConfig) -> Vec<String> {
    let plan = plan_output(cfg).unwrap();
    build_args(cfg, &plan)
}

fn has_pair(args: &[String], flag: &str, value: &str) -> bool {
    args.windows(2).any(|w| w[0] == flag && w[1] == value)
}

#[test]
fn default_preview_png_invocation() {
    let cfg = RenderConfig::new("model.scad", "out.png");
    assert_eq!(
        args_for(&cfg),
        vec![
            "-o",
            "out.png",
            "--imgsize=640,480",
            "--view=axes,scales",
            "--projection=p",
            "--preview",
            "",
            "model.scad",
        ]
    );
}

#[test]
fn render_mode_with_variables() {
    let cfg = RenderConfig::new("model.scad", "out.png")
        .with_render_mode(RenderMode::Render)
        .with_var("size", 10);
    let args = args_for(&cfg);
    assert!(has_pair(&args, "-D", "size=10"));
    assert!(has_pair(&args, "--render", ""));
    assert!(has_pair(&args, "-o", "out.png"));
    assert_eq!(args.last().map(String::as_str), Some("model.scad"));
}

#[test]
fn antialias_scales_requested_size() {
    let cfg = RenderConfig::new("m.scad", "out.png").with_antialias(2.0);
    assert!(args_for(&cfg).contains(&"--imgsize=1280,960".to_string()));
}

#[test]
fn non_raster_output_has_no_imgsize() {
    let cfg = RenderConfig::new("m.scad", "out.stl").with_render_mode(RenderMode::Render);
    assert!(!args_for(&cfg).iter().any(|a| a.starts_with("--imgsize")));
}

#[test]
fn view_flags_and_wireframe() {
    let cfg = RenderConfig::new("m.scad", "out.png")
        .with_view(false, false, true, true)
        .with_render_mode(RenderMode::Wireframe);
    let args = args_for(&cfg);
    assert!(args.contains(&"--view=edges,crosshairs,wireframe".to_string()));
    assert!(has_pair(&args, "--render", ""));

    let hidden = RenderConfig::new("m.scad", "out.png").with_view(false, false, false, false);
    assert!(!args_for(&hidden).iter().any(|a| a.starts_with("--view")));
}

#[test]
fn thrown_together_uses_preview_argument() {
    let cfg = RenderConfig::new("m.scad", "out.png").with_render_mode(RenderMode::ThrownTogether);
    assert!(has_pair(&args_for(&cfg), "--preview", "throwntogether"));
}

#[test]
fn camera_is_zero_padded() {
    let cfg = RenderConfig::new("m.scad", "out.png").with_camera(vec![10.0, 20.0]);
    assert!(has_pair(&args_for(&cfg), "--camera", "10,20,0,0,0,0"));
}

#[test]
fn color_scheme_only_when_not_default() {
    let default = RenderConfig::new("m.scad", "out.png");
    assert!(!args_for(&default).contains(&"--colorscheme".to_string()));

    let night = default.with_color_scheme(ColorScheme::TomorrowNight);
    assert!(has_pair(&args_for(&night), "--colorscheme", "Tomorrow Night"));
}

#[test]
fn optional_flags_in_order() {
    let cfg = RenderConfig::new("m.scad", "out.png")
        .with_orthographic(true)
        .with_auto_center(true)
        .with_view_all(true)
        .with_csg_limit(500)
        .with_deps_file("deps.mk")
        .with_make_file("Makefile")
        .with_customizer_file("params.json")
        .with_customizer_param("set", "\"large\"")
        .with_hard_warnings(true)
        .with_quiet(true);
    let args = args_for(&cfg);
    let tail: Vec<&str> = args
        .iter()
        .skip_while(|a| a.as_str() != "--projection=o")
        .map(String::as_str)
        .collect();
    assert_eq!(
        tail,
        vec![
            "--projection=o",
            "--autocenter",
            "--viewall",
            "--preview",
            "",
            "--csglimit",
            "500",
            "-d",
            "deps.mk",
            "-m",
            "Makefile",
            "-p",
            "params.json",
            "-P",
            "set=\"large\"",
            "--hardwarnings",
            "--quiet",
            "m.scad",
        ]
    );
}

#[test]
fn test_only_is_minimal() {
    let cfg = RenderConfig::new("m.scad", "out.png")
        .with_render_mode(RenderMode::TestOnly)
        .with_var("x", 1)
        .with_camera(vec![1.0]);
    assert_eq!(
        args_for(&cfg),
        vec!["-o", "out.term", "-D", "x=1", "m.scad"]
    );
}

#[test]
fn animation_plans_numbered_frames() {
    let cfg = RenderConfig::new("m.scad", "anims/spin.v2.gif").with_animation(3, 100);
    let plan = plan_output(&cfg).unwrap();
    assert_eq!(plan.openscad_out, PathBuf::from("anims/spin_v2.png"));
    assert_eq!(
        plan.frames,
        vec![
            PathBuf::from("anims/spin_v200000.png"),
            PathBuf::from("anims/spin_v200001.png"),
            PathBuf::from("anims/spin_v200002.png"),
        ]
    );
    assert_eq!(plan.final_out, PathBuf::from("anims/spin.v2.gif"));
    assert!(has_pair(&build_args(&cfg, &plan), "--animate", "3"));
}

#[test]
fn animation_requires_gif_output() {
    let cfg = RenderConfig::new("m.scad", "spin.png").with_animation(3, 100);
    assert!(matches!(plan_output(&cfg), Err(RunnerError::Validation(_))));

    let upper = RenderConfig::new("m.scad", "spin.GIF").with_animation(3, 100);
    assert!(plan_output(&upper).is_ok());

    let zero = RenderConfig::new("m.scad", "spin.gif").with_animation(0, 100);
    assert!(matches!(plan_output(&zero), Err(RunnerError::Validation(_))));
}

#[test]
fn animation_requires_gif_output_even_in_test_only_mode() {
    let png = RenderConfig::new("m.scad", "spin.png")
        .with_render_mode(RenderMode::TestOnly)
        .with_animation(5, 100);
    assert!(matches!(plan_output(&png), Err(RunnerError::Validation(_))));

    let zero = RenderConfig::new("m.scad", "spin.gif")
        .with_render_mode(RenderMode::TestOnly)
        .with_animation(0, 100);
    assert!(matches!(plan_output(&zero), Err(RunnerError::Validation(_))));

    let gif = RenderConfig::new("m.scad", "spin.gif")
        .with_render_mode(RenderMode::TestOnly)
        .with_animation(5, 100);
    let plan = plan_output(&gif).unwrap();
    assert_eq!(plan.openscad_out, PathBuf::from("spin.term"));
    assert!(plan.frames.is_empty());
}

#[test]
fn quoting_wraps_spaces_and_empty_args() {
    let line = quote_command_line(&["openscad", "--preview", "", "--colorscheme", "Tomorrow Night"]);
    assert_eq!(line, "openscad --preview '' --colorscheme 'Tomorrow Night'");
}

#[test]
fn empty_args_can_be_dropped() {
    let args = vec!["--render".to_string(), String::new(), "m.scad".to_string()];
    assert_eq!(drop_empty_args(args), vec!["--render", "m.scad"]);
}
