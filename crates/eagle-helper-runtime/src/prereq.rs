use std::fmt;

/// A missing external tool with actionable install instructions.
#[derive(Debug)]
pub struct MissingPrereq {
    pub name: &'static str,
    pub purpose: &'static str,
    pub install_hint: &'static str,
}

impl fmt::Display for MissingPrereq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "  - {}: {} (install: {})",
            self.name, self.purpose, self.install_hint
        )
    }
}

pub fn command_exists(name: &str) -> bool {
    which::which(name).is_ok()
}

pub fn git_available() -> bool {
    command_exists("git")
}

/// Check the optional tools the helper can use.
/// None of them are required; an empty list means every feature is available.
pub fn check_optional_tools() -> Vec<MissingPrereq> {
    let mut missing = Vec::new();

    if !git_available() {
        missing.push(MissingPrereq {
            name: "git",
            purpose: "syncing the shared eagle-utils helper files",
            install_hint: "https://git-scm.com/downloads | brew install git | winget install Git.Git",
        });
    }

    missing
}

/// Format a list of missing tools into a user-facing warning.
pub fn format_missing(missing: &[MissingPrereq]) -> String {
    use std::fmt::Write as _;
    let mut msg = String::from("missing optional tools:\n");
    for m in missing {
        let _ = writeln!(msg, "{m}");
    }
    msg.push_str("\nManifest generation still works; helper functionality will be limited.");
    msg
}
