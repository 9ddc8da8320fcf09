/// Category of one OpenSCAD stderr line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LineKind {
    /// `ECHO:` output from `echo()`.
    Echo,
    /// `WARNING:` diagnostics.
    Warning,
    /// `ERROR:` diagnostics and their `TRACE:` stack lines.
    Error,
    /// Anything else (progress, statistics, blank lines).
    Other,
}

/// Classify a stderr line by its prefix.
pub fn classify_line(line: &str) -> LineKind {
    if line.starts_with("ECHO:") {
        LineKind::Echo
    } else if line.starts_with("WARNING:") {
        LineKind::Warning
    } else if line.starts_with("ERROR:") || line.starts_with("TRACE:") {
        LineKind::Error
    } else {
        LineKind::Other
    }
}

/// Echo, warning and error lines picked out of a stderr capture, in original order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClassifiedLines {
    /// Lines starting with `ECHO:`.
    pub echos: Vec<String>,
    /// Lines starting with `WARNING:`.
    pub warnings: Vec<String>,
    /// Lines starting with `ERROR:` or `TRACE:`.
    pub errors: Vec<String>,
}

impl ClassifiedLines {
    /// Sort each line into its bucket; unclassified lines are skipped.
    pub fn from_lines<S: AsRef<str>>(lines: &[S]) -> Self {
        let mut out = Self::default();
        for line in lines {
            let line = line.as_ref();
            let bucket = match classify_line(line) {
                LineKind::Echo => &mut out.echos,
                LineKind::Warning => &mut out.warnings,
                LineKind::Error => &mut out.errors,
                LineKind::Other => continue,
            };
            bucket.push(line.to_string());
        }
        out
    }
}

/// Decode captured process output and split it into lines.
///
/// Invalid UTF-8 is replaced rather than rejected. `\r\n` endings are handled and a trailing
/// newline does not produce an extra empty line.
pub fn split_output(bytes: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(bytes)
        .lines()
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/invoke/classify.rs"]
mod tests;
