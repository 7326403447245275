use super::{exit_with, json_pretty, manifest_error, split_list, EXIT_SUCCESS};
use clap::builder::{BoolishValueParser, PossibleValuesParser, TypedValueParser};
use clap::error::ErrorKind;
use clap::{ArgAction, Args, Parser};
use eagle_helper_core::{I18n, Workspace};
use eagle_helper_schema::{
    add_background_service, add_inspector, add_window, manifest, setup_locales, Arch, LocaleSet,
    Manifest, ManifestOptions, Platform, WindowEntry, DEFAULT_VERSION,
};
use std::path::PathBuf;

/// Words that start a chained step after the `init` flags.
pub const STEP_NAMES: &[&str] = &["window", "service", "inspector"];

#[derive(Debug, Args)]
#[command(after_help = "Steps may be chained after the flags, each with its own flags:\n  \
    eagle-helper init MyPlugin window --url index.html service --url worker.html")]
pub struct InitArgs {
    /// Plugin name, used unless --name is given.
    #[arg(value_name = "NAME")]
    pub plugin: String,
    /// The id of the plugin (a random UUID when omitted).
    #[arg(long)]
    pub id: Option<String>,
    /// The version of the plugin.
    #[arg(long = "version", value_name = "VERSION", default_value = DEFAULT_VERSION)]
    pub plugin_version: String,
    /// The platform of the plugin.
    #[arg(
        long,
        default_value = "all",
        value_parser = PossibleValuesParser::new(Platform::NAMES.iter().copied())
            .try_map(|s| s.parse::<Platform>())
    )]
    pub platform: Platform,
    /// The architecture of the plugin.
    #[arg(
        long,
        default_value = "all",
        value_parser = PossibleValuesParser::new(Arch::NAMES.iter().copied())
            .try_map(|s| s.parse::<Arch>())
    )]
    pub arch: Arch,
    /// The display name of the plugin.
    #[arg(long = "name", value_name = "NAME")]
    pub display_name: Option<String>,
    /// The logo of the plugin.
    #[arg(long)]
    pub logo: Option<String>,
    /// The keywords of the plugin (comma-separated).
    #[arg(long)]
    pub keywords: Option<String>,
    /// Whether to use devtools.
    #[arg(
        short = 'd',
        long,
        value_name = "BOOL",
        action = ArgAction::Set,
        default_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    pub devtools: bool,
    /// Whether to use locales.
    #[arg(
        short = 'l',
        long,
        value_name = "BOOL",
        action = ArgAction::Set,
        default_value = "false",
        value_parser = BoolishValueParser::new()
    )]
    pub use_locales: bool,
    /// The default language of the plugin (-ld).
    #[arg(long, value_name = "CODE", default_value = "en")]
    pub locales_default: String,
    /// The languages of the plugin, comma-separated (-ll). Defaults to the lite set.
    #[arg(long, value_name = "CODES")]
    pub locales_languages: Option<String>,
    /// Use the full set of locales (-lf).
    #[arg(long, default_value_t = false)]
    pub locales_full: bool,
    /// Chained steps: window, service, inspector.
    #[arg(value_name = "STEP", trailing_var_arg = true, allow_hyphen_values = true)]
    pub chain: Vec<String>,
}

impl InitArgs {
    pub fn manifest_options(&self) -> ManifestOptions {
        let name = self
            .display_name
            .clone()
            .unwrap_or_else(|| self.plugin.clone());
        ManifestOptions {
            plugin_id: self.id.clone(),
            version: Some(self.plugin_version.clone()),
            platform: self.platform,
            arch: self.arch,
            name: Some(name),
            logo: self.logo.clone(),
            keywords: self.keywords.as_deref().map(split_list),
            devtools: Some(self.devtools),
        }
    }

    /// `--locales-full` wins; otherwise the given list, else the lite set.
    pub fn locale_set(&self) -> LocaleSet {
        if self.locales_full {
            return LocaleSet::full();
        }
        match self.locales_languages.as_deref().map(LocaleSet::parse_custom) {
            Some(set) if !set.is_empty() => set,
            _ => LocaleSet::lite(),
        }
    }
}

/// Flags shared by `window` and `service` steps.
#[derive(Debug, Parser)]
pub struct WindowArgs {
    /// The URL of the window.
    #[arg(long)]
    pub url: String,
    /// The width of the window.
    #[arg(long)]
    pub width: Option<u32>,
    /// The height of the window.
    #[arg(long)]
    pub height: Option<u32>,
    /// The minimum width of the window.
    #[arg(long)]
    pub min_width: Option<u32>,
    /// The minimum height of the window.
    #[arg(long)]
    pub min_height: Option<u32>,
    /// The maximum width of the window.
    #[arg(long)]
    pub max_width: Option<u32>,
    /// The maximum height of the window.
    #[arg(long)]
    pub max_height: Option<u32>,
    /// Whether the window should always be on top.
    #[arg(long, value_name = "BOOL", action = ArgAction::Set, value_parser = BoolishValueParser::new())]
    pub always_on_top: Option<bool>,
    /// Whether the window should have a frame.
    #[arg(long, value_name = "BOOL", action = ArgAction::Set, value_parser = BoolishValueParser::new())]
    pub frame: Option<bool>,
    /// Whether the window can be fullscreened.
    #[arg(long, value_name = "BOOL", action = ArgAction::Set, value_parser = BoolishValueParser::new())]
    pub fullscreenable: Option<bool>,
    /// Whether the window can be maximized.
    #[arg(long, value_name = "BOOL", action = ArgAction::Set, value_parser = BoolishValueParser::new())]
    pub maximizable: Option<bool>,
    /// Whether the window can be minimized.
    #[arg(long, value_name = "BOOL", action = ArgAction::Set, value_parser = BoolishValueParser::new())]
    pub minimizable: Option<bool>,
    /// Whether the window can be resized.
    #[arg(long, value_name = "BOOL", action = ArgAction::Set, value_parser = BoolishValueParser::new())]
    pub resizable: Option<bool>,
    /// The background color of the window.
    #[arg(long, value_name = "COLOR")]
    pub background_color: Option<String>,
    /// Whether multiple windows can be opened.
    #[arg(long, value_name = "BOOL", action = ArgAction::Set, value_parser = BoolishValueParser::new())]
    pub multiple: Option<bool>,
    /// Whether to run after installation.
    #[arg(long, value_name = "BOOL", action = ArgAction::Set, value_parser = BoolishValueParser::new())]
    pub run_after_install: Option<bool>,
    /// Whether to use devtools.
    #[arg(
        long,
        value_name = "BOOL",
        action = ArgAction::Set,
        default_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    pub devtools: bool,
}

impl From<WindowArgs> for WindowEntry {
    fn from(a: WindowArgs) -> Self {
        Self {
            url: a.url,
            width: a.width,
            height: a.height,
            min_width: a.min_width,
            min_height: a.min_height,
            max_width: a.max_width,
            max_height: a.max_height,
            always_on_top: a.always_on_top,
            frame: a.frame,
            fullscreenable: a.fullscreenable,
            maximizable: a.maximizable,
            minimizable: a.minimizable,
            resizable: a.resizable,
            background_color: a.background_color,
            multiple: a.multiple,
            run_after_install: a.run_after_install,
            devtools: Some(a.devtools),
        }
    }
}

#[derive(Debug, Parser)]
pub struct InspectorArgs {
    /// File types the inspector handles (comma-separated).
    #[arg(long)]
    pub types: Option<String>,
}

/// One chained step after `init`, already validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Window(WindowEntry),
    Service(WindowEntry),
    Inspector(Vec<String>),
}

impl Step {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Window(_) => "window",
            Self::Service(_) => "service",
            Self::Inspector(_) => "inspector",
        }
    }

    fn apply(self, doc: &mut Manifest) {
        match self {
            Self::Window(entry) => add_window(doc, entry),
            Self::Service(entry) => add_background_service(doc, entry),
            Self::Inspector(types) => add_inspector(doc, &types),
        }
    }
}

/// Top-level flags declared `global`. Once a step word starts the chain,
/// clap hands every later token to `chain`, these included.
const GLOBAL_FLAGS: &[&str] = &["--json", "--verbose", "--trace"];

/// Remove global flags from the chain tokens. Returns the remaining tokens
/// and whether `--json` was among them. Logging has already read
/// `--verbose` and `--trace` from the raw argv.
pub fn strip_global_flags(tokens: &[String]) -> (Vec<String>, bool) {
    let json = tokens.iter().any(|t| t == "--json");
    let rest = tokens
        .iter()
        .filter(|t| !GLOBAL_FLAGS.contains(&t.as_str()))
        .cloned()
        .collect();
    (rest, json)
}

/// An option token whose value is the next token.
fn takes_value(token: &str) -> bool {
    token.starts_with('-') && !token.contains('=') && !matches!(token, "-h" | "--help")
}

/// Cut the trailing tokens into `(step, args)` segments.
///
/// A step name only starts a new segment when it is not the value of the
/// preceding option, so `--url window` stays a URL.
pub fn split_chain(tokens: &[String]) -> Result<Vec<(&str, &[String])>, String> {
    let Some(first) = tokens.first() else {
        return Ok(Vec::new());
    };
    if !STEP_NAMES.contains(&first.as_str()) {
        return Err(format!(
            "unknown init step '{first}' (expected: {})",
            STEP_NAMES.join(", ")
        ));
    }

    let starts: Vec<usize> = tokens
        .iter()
        .enumerate()
        .filter(|(i, tok)| {
            STEP_NAMES.contains(&tok.as_str()) && (*i == 0 || !takes_value(&tokens[i - 1]))
        })
        .map(|(i, _)| i)
        .collect();

    let segments = starts
        .iter()
        .enumerate()
        .map(|(n, &start)| {
            let end = starts.get(n + 1).copied().unwrap_or(tokens.len());
            (tokens[start].as_str(), &tokens[start + 1..end])
        })
        .collect();
    Ok(segments)
}

fn parse_with<P: Parser>(step: &str, args: &[String]) -> Result<P, clap::Error> {
    let argv = std::iter::once(format!("eagle-helper init {step}")).chain(args.iter().cloned());
    P::try_parse_from(argv)
}

/// Parse every chained step up front so a bad flag late in the chain
/// aborts before anything is written.
pub fn parse_steps(tokens: &[String]) -> Result<Vec<Step>, clap::Error> {
    let segments =
        split_chain(tokens).map_err(|msg| clap::Error::raw(ErrorKind::InvalidSubcommand, msg))?;
    segments
        .into_iter()
        .map(|(step, args)| match step {
            "window" => parse_with::<WindowArgs>(step, args).map(|a| Step::Window(a.into())),
            "service" => parse_with::<WindowArgs>(step, args).map(|a| Step::Service(a.into())),
            _ => parse_with::<InspectorArgs>(step, args)
                .map(|a| Step::Inspector(a.types.as_deref().map(split_list).unwrap_or_default())),
        })
        .collect()
}

/// Build, write, and extend the manifest. Returns the written document.
pub fn execute(
    args: &InitArgs,
    steps: Vec<Step>,
    workspace: &Workspace,
) -> Result<(Manifest, PathBuf, Vec<PathBuf>), String> {
    let mut doc = manifest(args.manifest_options());
    let scaffold = if args.use_locales {
        let languages = args.locale_set();
        Some(
            setup_locales(&mut doc, &args.locales_default, &languages)
                .map_err(|e| manifest_error(&e))?,
        )
    } else {
        None
    };

    let created = match scaffold {
        Some(s) => s
            .materialize(workspace.root())
            .map_err(|e| manifest_error(&e))?,
        None => Vec::new(),
    };
    let path = workspace
        .save_manifest(&doc)
        .map_err(|e| manifest_error(&e))?;

    for step in steps {
        tracing::debug!("init step: {}", step.name());
        step.apply(&mut doc);
        workspace
            .save_manifest(&doc)
            .map_err(|e| manifest_error(&e))?;
    }
    Ok((doc, path, created))
}

pub fn run(
    args: &InitArgs,
    workspace: &Workspace,
    i18n: &mut I18n,
    json: bool,
) -> Result<u8, String> {
    let (chain, trailing_json) = strip_global_flags(&args.chain);
    let json = json || trailing_json;
    let steps = match parse_steps(&chain) {
        Ok(steps) => steps,
        Err(e) => exit_with(i18n, &e),
    };
    let (doc, path, created) = execute(args, steps, workspace)?;

    if json {
        let payload = serde_json::json!({
            "status": "written",
            "path": path,
            "id": doc.id,
            "windows": doc.main.windows.len(),
            "services": doc.main.services.len(),
            "inspector": doc.inspector,
            "locales": doc.locales,
            "created_tables": created,
        });
        println!("{}", json_pretty(&payload)?);
    } else {
        println!(
            "{}",
            i18n.format("init.written", &[("path", path.display().to_string())])
        );
        if !created.is_empty() {
            let dir = workspace.root().join(eagle_helper_schema::LOCALES_DIR);
            println!(
                "{}",
                i18n.format(
                    "init.locales_created",
                    &[
                        ("count", created.len().to_string()),
                        ("dir", dir.display().to_string()),
                    ],
                )
            );
        }
    }
    Ok(EXIT_SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Parser)]
    struct Harness {
        #[command(flatten)]
        init: InitArgs,
    }

    fn init_args(args: &[&str]) -> InitArgs {
        Harness::try_parse_from(std::iter::once("init").chain(args.iter().copied()))
            .unwrap()
            .init
    }

    fn tokens(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn defaults_match_documented_values() {
        let args = init_args(&["Demo"]);
        assert_eq!(args.plugin_version, "1.0.0");
        assert_eq!(args.platform, Platform::All);
        assert_eq!(args.arch, Arch::All);
        assert!(args.devtools);
        assert!(!args.use_locales);
        assert_eq!(args.locales_default, "en");
        assert!(args.chain.is_empty());

        let opts = args.manifest_options();
        assert_eq!(opts.name.as_deref(), Some("Demo"));
        assert_eq!(opts.devtools, Some(true));
        assert!(opts.keywords.is_none());
    }

    #[test]
    fn name_flag_overrides_positional() {
        let args = init_args(&["demo-dir", "--name", "Pretty Name", "--keywords", "a, b"]);
        let opts = args.manifest_options();
        assert_eq!(opts.name.as_deref(), Some("Pretty Name"));
        assert_eq!(opts.keywords, Some(vec!["a".to_owned(), "b".to_owned()]));
    }

    #[test]
    fn choice_flags_parse_and_reject() {
        let args = init_args(&["Demo", "--platform", "mac", "--arch", "x64", "-d", "no"]);
        assert_eq!(args.platform, Platform::Mac);
        assert_eq!(args.arch, Arch::X64);
        assert!(!args.devtools);

        let err = Harness::try_parse_from(["init", "Demo", "--platform", "linux"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidValue);
    }

    #[test]
    fn locale_set_selection() {
        assert_eq!(init_args(&["D"]).locale_set(), LocaleSet::lite());
        assert_eq!(
            init_args(&["D", "--locales-full"]).locale_set(),
            LocaleSet::full()
        );
        let custom = init_args(&["D", "--locales-languages", "fr_FR, it_IT"]).locale_set();
        assert_eq!(custom.as_slice(), ["fr_FR", "it_IT"]);
        let both = init_args(&["D", "--locales-full", "--locales-languages", "fr_FR"]);
        assert_eq!(both.locale_set(), LocaleSet::full());
    }

    #[test]
    fn chain_tokens_land_in_trailing_args() {
        let args = init_args(&["Demo", "--version", "2.0.0", "window", "--url", "a.html"]);
        assert_eq!(args.plugin_version, "2.0.0");
        assert_eq!(args.chain, ["window", "--url", "a.html"]);
    }

    #[test]
    fn split_chain_segments() {
        let t = tokens(&[
            "window", "--url", "a.html", "service", "--url", "b.html", "inspector",
        ]);
        let segments = split_chain(&t).unwrap();
        let names: Vec<&str> = segments.iter().map(|(n, _)| *n).collect();
        assert_eq!(names, ["window", "service", "inspector"]);
        assert_eq!(segments[0].1, ["--url", "a.html"]);
        assert!(segments[2].1.is_empty());
    }

    #[test]
    fn split_chain_keeps_step_word_as_option_value() {
        let t = tokens(&["window", "--url", "service", "--width", "10"]);
        let segments = split_chain(&t).unwrap();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].1, ["--url", "service", "--width", "10"]);

        let t = tokens(&["window", "--url=x", "service", "--url", "y"]);
        assert_eq!(split_chain(&t).unwrap().len(), 2);
    }

    #[test]
    fn split_chain_rejects_unknown_first_step() {
        let err = split_chain(&tokens(&["panel", "--url", "x"])).unwrap_err();
        assert!(err.contains("unknown init step 'panel'"));
        assert!(split_chain(&[]).unwrap().is_empty());
    }

    #[test]
    fn global_flags_after_a_step_leave_the_chain() {
        let args = init_args(&["Demo", "window", "--url", "a.html", "--verbose", "--json"]);
        assert_eq!(args.chain, ["window", "--url", "a.html", "--verbose", "--json"]);

        let (chain, json) = strip_global_flags(&args.chain);
        assert!(json);
        assert_eq!(chain, ["window", "--url", "a.html"]);
        let steps = parse_steps(&chain).unwrap();
        assert_eq!(steps, [Step::Window(WindowEntry::new("a.html").with_devtools(true))]);
    }

    #[test]
    fn trailing_trace_does_not_swallow_next_step() {
        let t = tokens(&["window", "--url", "a.html", "--trace", "service", "--url", "b.html"]);
        let (chain, json) = strip_global_flags(&t);
        assert!(!json);
        let names: Vec<&str> = parse_steps(&chain).unwrap().iter().map(Step::name).collect();
        assert_eq!(names, ["window", "service"]);
    }

    #[test]
    fn window_step_maps_every_flag() {
        let t = tokens(&[
            "window",
            "--url",
            "index.html",
            "--width",
            "800",
            "--min-height",
            "200",
            "--always-on-top",
            "yes",
            "--background-color",
            "#fff",
            "--run-after-install",
            "true",
        ]);
        let steps = parse_steps(&t).unwrap();
        let Step::Window(entry) = &steps[0] else {
            panic!("expected window step");
        };
        assert_eq!(entry.url, "index.html");
        assert_eq!(entry.width, Some(800));
        assert_eq!(entry.min_height, Some(200));
        assert_eq!(entry.always_on_top, Some(true));
        assert_eq!(entry.background_color.as_deref(), Some("#fff"));
        assert_eq!(entry.run_after_install, Some(true));
        assert_eq!(entry.devtools, Some(true));
        assert!(entry.frame.is_none());

        let value = serde_json::to_value(entry).unwrap();
        assert_eq!(value["minHeight"], 200);
        assert_eq!(value["alwaysOnTop"], true);
        assert!(value.get("maxWidth").is_none());
    }

    #[test]
    fn window_step_requires_url() {
        let err = parse_steps(&tokens(&["service", "--width", "5"])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn inspector_step_collects_types() {
        let steps = parse_steps(&tokens(&["inspector", "--types", "png, jpg"])).unwrap();
        assert_eq!(
            steps,
            [Step::Inspector(vec!["png".to_owned(), "jpg".to_owned()])]
        );
        let bare = parse_steps(&tokens(&["inspector"])).unwrap();
        assert_eq!(bare, [Step::Inspector(Vec::new())]);
    }

    #[test]
    fn execute_writes_manifest_with_steps_and_locales() {
        let dir = tempfile::tempdir().unwrap();
        let ws = Workspace::new(dir.path());
        let args = init_args(&[
            "Demo",
            "--id",
            "demo",
            "-l",
            "true",
            "window",
            "--url",
            "index.html",
            "service",
            "--url",
            "worker.html",
            "inspector",
            "--types",
            "png",
        ]);
        let steps = parse_steps(&args.chain).unwrap();
        let (doc, path, created) = execute(&args, steps, &ws).unwrap();

        assert_eq!(path, dir.path().join("manifest.json"));
        assert_eq!(created.len(), 4);
        let saved = ws.load_manifest().unwrap();
        assert_eq!(saved, doc);
        assert_eq!(saved.id, "demo");
        assert_eq!(saved.main.windows[0].url, "index.html");
        assert_eq!(saved.main.services[0].url, "worker.html");
        assert_eq!(saved.inspector.unwrap().types, ["png"]);
        assert_eq!(saved.locales.unwrap().default, "en");
    }

    #[test]
    fn execute_leaves_no_manifest_when_tables_fail() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(eagle_helper_schema::LOCALES_DIR), "not a dir").unwrap();
        let ws = Workspace::new(dir.path());
        let args = init_args(&["Demo", "-l", "true"]);
        let err = execute(&args, Vec::new(), &ws).unwrap_err();
        assert!(err.starts_with("manifest error:"));
        assert!(!ws.manifest_exists());
    }

    #[test]
    fn execute_rejects_unsafe_locale_code() {
        let dir = tempfile::tempdir().unwrap();
        let ws = Workspace::new(dir.path());
        let args = init_args(&["Demo", "-l", "true", "--locales-languages", "../evil"]);
        let err = execute(&args, Vec::new(), &ws).unwrap_err();
        assert!(err.starts_with("manifest error:"));
        assert!(!ws.manifest_exists());
    }
}
