use super::*;

#[test]
fn prefixes_are_case_sensitive_and_anchored() {
    assert_eq!(classify_line("ECHO: \"hi\""), LineKind::Echo);
    assert_eq!(classify_line("WARNING: Ignoring unknown variable 'q'"), LineKind::Warning);
    assert_eq!(classify_line("ERROR: Parser error in file m.scad"), LineKind::Error);
    assert_eq!(classify_line("TRACE: called by 'cube'"), LineKind::Error);
    assert_eq!(classify_line("echo: lower"), LineKind::Other);
    assert_eq!(classify_line(" ERROR: indented"), LineKind::Other);
    assert_eq!(classify_line("Compiling design (CSG Tree generation)..."), LineKind::Other);
    assert_eq!(classify_line(""), LineKind::Other);
}

#[test]
fn buckets_keep_order() {
    let stderr = [
        "Parsing design (AST generation)...",
        "ECHO: 1",
        "WARNING: first",
        "ECHO: 2",
        "ERROR: Assertion failed",
        "TRACE: called by 'check'",
        "WARNING: second",
    ];
    let c = ClassifiedLines::from_lines(&stderr);
    assert_eq!(c.echos, vec!["ECHO: 1", "ECHO: 2"]);
    assert_eq!(c.warnings, vec!["WARNING: first", "WARNING: second"]);
    assert_eq!(c.errors, vec!["ERROR: Assertion failed", "TRACE: called by 'check'"]);
}

#[test]
fn split_output_handles_crlf_and_bad_bytes() {
    let lines = split_output(b"ECHO: a\r\nWARNING: b\n\xffERROR\n");
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "ECHO: a");
    assert_eq!(lines[1], "WARNING: b");
    assert!(lines[2].ends_with("ERROR"));
    assert!(split_output(b"").is_empty());
}
