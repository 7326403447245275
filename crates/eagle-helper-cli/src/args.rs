//! argv preprocessing that has to happen before clap sees the arguments.
//!
//! Two jobs: rewrite the multi-letter short flags older scripts use (clap
//! only knows single-character shorts), and pick out the handful of
//! top-level flags needed before the localized parser can be built.

/// Multi-letter shorts and the long flag each one stands for.
const LEGACY_SHORTS: &[(&str, &str)] = &[
    ("-sc", "--skip-check"),
    ("-smd", "--skip-manifest-details"),
    ("-sl", "--skip-locales"),
    ("-ld", "--locales-default"),
    ("-ll", "--locales-languages"),
    ("-lf", "--locales-full"),
];

/// Rewrite legacy shorts to their long form. Everything after a bare `--`
/// is left alone.
pub fn normalize<I: IntoIterator<Item = String>>(args: I) -> Vec<String> {
    let mut passthrough = false;
    args.into_iter()
        .map(|arg| {
            if passthrough {
                return arg;
            }
            if arg == "--" {
                passthrough = true;
                return arg;
            }
            expand_legacy(&arg).unwrap_or(arg)
        })
        .collect()
}

fn expand_legacy(arg: &str) -> Option<String> {
    let (flag, value) = match arg.split_once('=') {
        Some((flag, value)) => (flag, Some(value)),
        None => (arg, None),
    };
    let long = LEGACY_SHORTS
        .iter()
        .find(|(short, _)| *short == flag)
        .map(|(_, long)| *long)?;
    Some(match value {
        Some(v) => format!("{long}={v}"),
        None => long.to_owned(),
    })
}

/// Flags read ahead of the real parse.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct EarlyFlags {
    pub language: Option<String>,
    pub skip_check: bool,
    pub verbose: bool,
    pub trace: bool,
}

impl EarlyFlags {
    /// Scan normalized argv (program name first). `--language` and
    /// `--skip-check` only count before the subcommand; the logging flags
    /// are global.
    pub fn scan(args: &[String]) -> Self {
        let mut flags = Self::default();
        let mut top_level = true;
        let mut iter = args.iter().skip(1);
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--" => break,
                "--verbose" => flags.verbose = true,
                "--trace" => flags.trace = true,
                _ if !top_level => {}
                "-l" | "--language" => flags.language = iter.next().cloned(),
                "-p" | "--path" => {
                    iter.next();
                }
                "--skip-check" => flags.skip_check = true,
                other => {
                    if let Some(value) = other
                        .strip_prefix("--language=")
                        .or_else(|| attached_language(other))
                    {
                        flags.language = Some(value.to_owned());
                    } else if !other.starts_with('-') {
                        top_level = false;
                    }
                }
            }
        }
        flags
    }
}

/// `-lja_JP` or `-l=ja_JP`.
fn attached_language(arg: &str) -> Option<&str> {
    let rest = arg.strip_prefix("-l")?;
    if rest.is_empty() {
        return None;
    }
    Some(rest.strip_prefix('=').unwrap_or(rest))
}
