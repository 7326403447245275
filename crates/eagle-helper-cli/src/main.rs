mod args;
mod commands;

use args::EarlyFlags;
use clap::{Command, CommandFactory, FromArgMatches, Parser, Subcommand};
use clap_complete::Shell;
use commands::init::InitArgs;
use commands::{
    exit_with, persist_strings, spin_fail, spin_ok, spinner, EXIT_FAILURE, EXIT_MANIFEST_ERROR,
    MANIFEST_ERROR_PREFIX,
};
use eagle_helper_core::{
    HelperConfig, HelperHome, I18n, WalkOptions, Workspace, DEFAULT_LANGUAGE,
};
use eagle_helper_remote::{HttpTranslator, DEFAULT_SOURCE_LANGUAGE};
use eagle_helper_runtime::SyncOutcome;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Setting this to `1` has the same effect as `--skip-check`.
const SKIP_SYNC_ENV: &str = "EAGLE_HELPER_SKIP_SYNC";
const LOG_ENV: &str = "EAGLE_HELPER_LOG";

#[derive(Debug, Parser)]
#[command(name = "eagle-helper", about = "Scaffold manifests for Eagle plugins")]
struct Cli {
    /// Set the language of the helper.
    #[arg(short = 'l', long, value_name = "LANG")]
    language: Option<String>,

    /// Show the version of the helper.
    #[arg(short = 'v', long = "version", default_value_t = false)]
    show_version: bool,

    /// Skip the utils sync and translate check (-sc).
    #[arg(long, default_value_t = false)]
    skip_check: bool,

    /// Set the path of the plugin (created when missing).
    #[arg(short = 'p', long, value_name = "PATH")]
    path: Option<PathBuf>,

    /// Output results as structured JSON.
    #[arg(long, default_value_t = false, global = true)]
    json: bool,

    /// Enable verbose (debug) logging output.
    #[arg(long, default_value_t = false, global = true)]
    verbose: bool,

    /// Enable trace-level logging (more detailed than --verbose).
    #[arg(long, default_value_t = false, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Initialize a new plugin.
    Init(InitArgs),
    /// Interactively walk through the plugin init process.
    Walk {
        /// Skip the manifest details step (-smd).
        #[arg(long, default_value_t = false)]
        skip_manifest_details: bool,
        /// Skip the locales step (-sl).
        #[arg(long, default_value_t = false)]
        skip_locales: bool,
    },
    /// Internal commands.
    Internal {
        #[command(subcommand)]
        command: InternalCommand,
    },
    /// Check which optional helper features are available.
    Doctor,
    /// Generate shell completions for bash, zsh, fish, elvish, or powershell.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
    /// Generate man pages in the specified directory.
    ManPages {
        /// Output directory for man pages.
        #[arg(default_value = "man")]
        dir: PathBuf,
    },
}

#[derive(Debug, Subcommand)]
enum InternalCommand {
    /// Show the i18n cache.
    #[command(name = "i18ncache")]
    I18nCache,
    /// Translate a piece of text with the local model.
    Translate {
        /// Text to translate.
        text: String,
        /// Target language code.
        #[arg(long, value_name = "LANG")]
        to: String,
        /// Source language code.
        #[arg(long, value_name = "LANG", default_value = DEFAULT_SOURCE_LANGUAGE)]
        from: String,
    },
}

/// Top-level argument ids and the catalog key of their help text.
const ARG_HELP: &[(&str, &str)] = &[
    ("language", "cli.help.language"),
    ("show_version", "cli.help.version"),
    ("skip_check", "cli.help.skip_check"),
    ("path", "cli.help.path"),
];

/// Subcommands and the catalog key of their description.
const SUBCOMMAND_ABOUT: &[(&str, &str)] = &[
    ("init", "cli.init.help"),
    ("walk", "cli.walk.help"),
    ("internal", "cli.internal.help"),
    ("doctor", "cli.doctor.help"),
    ("completions", "cli.completions.help"),
    ("man-pages", "cli.man_pages.help"),
];

/// The clap command with descriptions resolved in the active language.
fn localized_command(i18n: &mut I18n) -> Command {
    let mut cmd = Cli::command().about(i18n.text("cli.about"));
    for (id, key) in ARG_HELP {
        let text = i18n.text(key);
        cmd = cmd.mut_arg(*id, |a| a.help(text));
    }
    for (name, key) in SUBCOMMAND_ABOUT {
        let text = i18n.text(key);
        cmd = cmd.mut_subcommand(*name, |c| c.about(text));
    }

    let steps = format!(
        "Chained steps:\n  window     {}\n  service    {}\n  inspector  {}",
        i18n.text("cli.init.window.help"),
        i18n.text("cli.service.help"),
        i18n.text("cli.inspector.help"),
    );
    let i18ncache = i18n.text("cli.builtin.i18ncache.help");
    let translate = i18n.text("cli.internal.translate.help");
    cmd.mut_subcommand("init", |c| c.after_help(steps))
        .mut_subcommand("internal", |c| {
            c.mut_subcommand("i18ncache", |s| s.about(i18ncache))
                .mut_subcommand("translate", |s| s.about(translate))
        })
}

fn init_logging(early: &EarlyFlags) {
    let default_level = if early.trace {
        "trace"
    } else if early.verbose {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env(LOG_ENV)
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(home: &HelperHome) -> HelperConfig {
    home.load_config().unwrap_or_else(|e| {
        eprintln!("warning: {e}");
        HelperConfig::default()
    })
}

/// Select the UI language and, when it is not English, attach the local
/// translator if it answers the probe.
fn setup_i18n(
    early: &EarlyFlags,
    home: &HelperHome,
    config: &HelperConfig,
    skip_check: bool,
) -> I18n {
    let language = early
        .language
        .clone()
        .or_else(|| config.language.clone())
        .unwrap_or_else(|| DEFAULT_LANGUAGE.to_owned());
    let language = language.trim();
    let language = match eagle_helper_schema::validate_locale_code(language) {
        Ok(()) => language,
        Err(e) => {
            eprintln!("warning: {e}");
            DEFAULT_LANGUAGE
        }
    };
    let mut i18n = I18n::new();
    i18n.set_language(language, Some(home.string_table_path(language)));

    if skip_check || !i18n.needs_translation() {
        return i18n;
    }
    let translator = HttpTranslator::new(config.translator.clone());
    if translator.able_to_translate() {
        tracing::debug!("translator attached for {}", i18n.language());
        i18n.set_translator(Box::new(translator));
    } else {
        eprintln!("warning: {}", i18n.text("cli.translate_unavailable"));
    }
    i18n
}

fn sync_utils(home: &HelperHome, config: &HelperConfig, i18n: &mut I18n) {
    let repo = &config.utils_repo;
    let values = [("repo", repo.name.clone())];
    let pb = spinner(&i18n.format("cli.sync.running", &values));
    match eagle_helper_runtime::sync_repo(repo, home.root()) {
        SyncOutcome::Cloned(_) => spin_ok(&pb, &i18n.format("cli.sync.cloned", &values)),
        SyncOutcome::Updated(_) => spin_ok(&pb, &i18n.format("cli.sync.updated", &values)),
        SyncOutcome::Unavailable(reason) => {
            let msg = i18n.format(
                "cli.sync.unavailable",
                &[("repo", repo.name.clone()), ("reason", reason)],
            );
            spin_fail(&pb, &msg);
            tracing::info!("{msg}");
        }
    }
}

fn open_workspace(path: Option<&Path>) -> Result<Workspace, String> {
    Workspace::open(path).map_err(|e| e.to_string())
}

#[allow(clippy::too_many_lines)]
fn main() -> ExitCode {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let msg = info.to_string();
        if msg.contains("Broken pipe")
            || msg.contains("broken pipe")
            || msg.contains("os error 32")
            || msg.contains("failed printing to stdout")
        {
            std::process::exit(0);
        }
        default_hook(info);
    }));

    let argv = args::normalize(std::env::args_os().map(|a| a.to_string_lossy().into_owned()));
    let early = EarlyFlags::scan(&argv);
    init_logging(&early);

    let home = match HelperHome::locate() {
        Ok(home) => home,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(EXIT_FAILURE);
        }
    };
    let config = load_config(&home);
    let skip_check = early.skip_check || std::env::var(SKIP_SYNC_ENV).as_deref() == Ok("1");
    let mut i18n = setup_i18n(&early, &home, &config, skip_check);

    let matches = match localized_command(&mut i18n).try_get_matches_from(&argv) {
        Ok(m) => m,
        Err(e) => exit_with(&mut i18n, &e),
    };
    let cli = match Cli::from_arg_matches(&matches) {
        Ok(cli) => cli,
        Err(e) => exit_with(&mut i18n, &e),
    };

    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION").to_owned();
        println!("{}", i18n.format("cli.version", &[("version", version)]));
        persist_strings(&mut i18n);
        return ExitCode::SUCCESS;
    }
    let Some(command) = cli.command else {
        let _ = localized_command(&mut i18n).print_help();
        persist_strings(&mut i18n);
        return ExitCode::SUCCESS;
    };

    if !skip_check {
        sync_utils(&home, &config, &mut i18n);
    }
    if !eagle_helper_runtime::git_available() {
        eprintln!("warning: {}", i18n.text("cli.git_not_installed"));
    }

    let json_output = cli.json;
    let path = cli.path.as_deref();
    let result = match command {
        Commands::Init(args) => open_workspace(path)
            .and_then(|ws| commands::init::run(&args, &ws, &mut i18n, json_output)),
        Commands::Walk {
            skip_manifest_details,
            skip_locales,
        } => open_workspace(path).and_then(|ws| {
            let opts = WalkOptions {
                skip_manifest_details,
                skip_locales,
            };
            commands::walk::run(&ws, opts, &mut i18n, json_output)
        }),
        Commands::Internal { command } => match command {
            InternalCommand::I18nCache => commands::internal::i18ncache(&i18n, json_output),
            InternalCommand::Translate { text, to, from } => commands::internal::translate(
                &config.translator,
                &text,
                &to,
                &from,
                json_output,
            ),
        },
        Commands::Doctor => {
            open_workspace(path).and_then(|ws| commands::doctor::run(&home, &ws, json_output))
        }
        Commands::Completions { shell } => {
            commands::completions::run(localized_command(&mut i18n), shell)
        }
        Commands::ManPages { dir } => {
            commands::man_pages::run(&localized_command(&mut i18n), &dir)
        }
    };

    persist_strings(&mut i18n);

    match result {
        Ok(code) => ExitCode::from(code),
        Err(msg) => {
            eprintln!("error: {msg}");
            let code = if msg.starts_with(MANIFEST_ERROR_PREFIX) {
                EXIT_MANIFEST_ERROR
            } else {
                EXIT_FAILURE
            };
            ExitCode::from(code)
        }
    }
}
