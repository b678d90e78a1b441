use std::path::Path;

use netreg_config::{Diagnostic, Severity, validate};

const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Print config diagnostics. Returns `false` if any of them is an error.
pub fn check(path: Option<&Path>, verbose: bool) -> bool {
    let result = validate(path);

    match result.config_path {
        Some(ref path) => eprintln!("Checking {}\n", path.display()),
        None => eprintln!("No config file found; checking defaults.\n"),
    }

    let shown: Vec<&Diagnostic> = result
        .diagnostics
        .iter()
        .filter(|d| verbose || d.severity != Severity::Info)
        .collect();
    for d in &shown {
        eprintln!("  {}", render(d));
    }
    if !shown.is_empty() {
        eprintln!();
    }

    let errors = result.count(Severity::Error);
    let warnings = result.count(Severity::Warning);
    if errors == 0 && warnings == 0 {
        eprintln!("No issues found.");
    } else {
        eprintln!("{errors} error(s), {warnings} warning(s)");
    }

    errors == 0
}

fn render(d: &Diagnostic) -> String {
    let color = match d.severity {
        Severity::Error => RED,
        Severity::Warning => YELLOW,
        Severity::Info => CYAN,
    };
    if d.path.is_empty() {
        format!("{BOLD}{color}{}{RESET} {}", d.severity, d.message)
    } else {
        format!(
            "{BOLD}{color}{}{RESET} [{}] {}: {}",
            d.severity, d.category, d.path, d.message
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn render_includes_path_and_category() {
        let line = render(&Diagnostic {
            severity: Severity::Error,
            category: "duplicate",
            path: "channels[1].name".into(),
            message: "already declared".into(),
        });
        assert!(line.contains("error"));
        assert!(line.ends_with("[duplicate] channels[1].name: already declared"));
    }

    #[test]
    fn check_fails_on_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("netreg.toml");
        std::fs::write(&path, "[[channels]]\nname = \"Bad\"\nversion = \"1\"\n").unwrap();
        assert!(!check(Some(&path), false));

        std::fs::write(&path, "[[channels]]\nname = \"ok:fine\"\nversion = \"1\"\n").unwrap();
        assert!(check(Some(&path), true));
    }
}
