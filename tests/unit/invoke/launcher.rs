use super::*;

#[test]
fn missing_program_is_a_launch_error() {
    let err = SystemLauncher
        .launch(Path::new("openscad-runner-no-such-program-xyz"), &[])
        .unwrap_err();
    assert!(matches!(err, RunnerError::Launch(_)));
    assert!(err.to_string().contains("openscad-runner-no-such-program-xyz"));
}

#[cfg(unix)]
#[test]
fn captures_both_streams_and_exit_code() {
    let args = vec![
        "-c".to_string(),
        "echo out; echo 'ECHO: 1' >&2; exit 3".to_string(),
    ];
    let out = SystemLauncher.launch(Path::new("sh"), &args).unwrap();
    assert_eq!(out.code, Some(3));
    assert_eq!(out.stdout, b"out\n");
    assert_eq!(out.stderr, b"ECHO: 1\n");
}
