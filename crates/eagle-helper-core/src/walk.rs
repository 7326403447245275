//! The interactive `walk` wizard.
//!
//! The wizard moves through a fixed sequence of [`WalkStep`]s. Each collection
//! step either takes a value the user confirmed or silently adopts the
//! documented default. Nothing touches the disk before `WriteManifest`, and a
//! workspace that already has a manifest ends the walk at `Start`.

use crate::i18n::I18n;
use crate::workspace::Workspace;
use crate::CoreError;
use eagle_helper_schema::{
    manifest, setup_locales, validate_locale_code, Arch, LocaleSet, Manifest, ManifestOptions,
    Platform,
};
use std::fmt;
use std::path::PathBuf;

pub const DEFAULT_LOGO: &str = "/logo.png";

/// Locale set choices offered by the wizard, in display order.
const LOCALE_MODES: &[&str] = &["full", "lite", "custom"];
const DEFAULT_LOCALE_MODE: usize = 1;

/// Source of answers for the wizard. The terminal implementation lives in
/// the CLI; tests script the answers.
pub trait Prompter {
    /// Free text. `default` is offered and returned on empty input.
    fn input(&mut self, prompt: &str, default: Option<&str>) -> Result<String, CoreError>;
    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool, CoreError>;
    /// Pick one of `items`; returns its index.
    fn select(&mut self, prompt: &str, items: &[&str], default: usize)
        -> Result<usize, CoreError>;
    /// Show a message (validation hints, re-prompt notices).
    fn notify(&mut self, message: &str);
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkOptions {
    pub skip_manifest_details: bool,
    pub skip_locales: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkStep {
    Start,
    CollectIdentity,
    CollectPlatformArch,
    CollectBranding,
    LocalesPrompt,
    WriteManifest,
    End,
}

impl WalkStep {
    /// The step after `self`, or `None` once the walk has ended.
    pub fn next(self, opts: WalkOptions) -> Option<Self> {
        match self {
            Self::Start => Some(Self::CollectIdentity),
            Self::CollectIdentity => Some(Self::CollectPlatformArch),
            Self::CollectPlatformArch => Some(Self::CollectBranding),
            Self::CollectBranding if opts.skip_locales => Some(Self::WriteManifest),
            Self::CollectBranding => Some(Self::LocalesPrompt),
            Self::LocalesPrompt => Some(Self::WriteManifest),
            Self::WriteManifest => Some(Self::End),
            Self::End => None,
        }
    }
}

impl fmt::Display for WalkStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Start => "start",
            Self::CollectIdentity => "collect_identity",
            Self::CollectPlatformArch => "collect_platform_arch",
            Self::CollectBranding => "collect_branding",
            Self::LocalesPrompt => "locales_prompt",
            Self::WriteManifest => "write_manifest",
            Self::End => "end",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalkOutcome {
    /// A manifest already existed; nothing was prompted or written.
    Aborted,
    Written {
        path: PathBuf,
        manifest: Manifest,
        created_tables: Vec<PathBuf>,
    },
}

/// Answers gathered so far.
#[derive(Debug, Default)]
struct Draft {
    options: ManifestOptions,
    locales: Option<(String, LocaleSet)>,
}

/// Run the wizard against `workspace`.
pub fn run_walk(
    workspace: &Workspace,
    opts: WalkOptions,
    i18n: &mut I18n,
    prompter: &mut dyn Prompter,
) -> Result<WalkOutcome, CoreError> {
    let mut draft = Draft::default();
    let mut step = WalkStep::Start;
    let mut outcome = WalkOutcome::Aborted;

    loop {
        tracing::debug!("walk step: {step}");
        match step {
            WalkStep::Start => {
                if workspace.manifest_exists() {
                    return Ok(WalkOutcome::Aborted);
                }
            }
            WalkStep::CollectIdentity => collect_identity(&mut draft, opts, i18n, prompter)?,
            WalkStep::CollectPlatformArch => {
                collect_platform_arch(&mut draft, opts, i18n, prompter)?;
            }
            WalkStep::CollectBranding => collect_branding(&mut draft, opts, i18n, prompter)?,
            WalkStep::LocalesPrompt => collect_locales(&mut draft, i18n, prompter)?,
            WalkStep::WriteManifest => {
                outcome = write(workspace, std::mem::take(&mut draft))?;
            }
            WalkStep::End => {}
        }
        match step.next(opts) {
            Some(next) => step = next,
            None => return Ok(outcome),
        }
    }
}

/// Ask `question`; on yes, return the answer to `prompt`.
fn optional_text(
    detail_prompts: bool,
    question: &str,
    prompt: &str,
    prompter: &mut dyn Prompter,
) -> Result<Option<String>, CoreError> {
    if !detail_prompts || !prompter.confirm(question, false)? {
        return Ok(None);
    }
    let answer = prompter.input(prompt, None)?;
    let answer = answer.trim();
    Ok((!answer.is_empty()).then(|| answer.to_owned()))
}

fn collect_identity(
    draft: &mut Draft,
    opts: WalkOptions,
    i18n: &mut I18n,
    prompter: &mut dyn Prompter,
) -> Result<(), CoreError> {
    let name = loop {
        let answer = prompter.input(&i18n.text("walk.name"), None)?;
        let answer = answer.trim();
        if !answer.is_empty() {
            break answer.to_owned();
        }
        prompter.notify(&i18n.text("walk.name_required"));
    };
    draft.options.name = Some(name);

    let details = !opts.skip_manifest_details;
    draft.options.plugin_id = optional_text(
        details,
        &i18n.text("walk.id"),
        &i18n.text("walk.id.prompt"),
        prompter,
    )?;
    draft.options.version = optional_text(
        details,
        &i18n.text("walk.version"),
        &i18n.text("walk.version.prompt"),
        prompter,
    )?;
    Ok(())
}

fn collect_platform_arch(
    draft: &mut Draft,
    opts: WalkOptions,
    i18n: &mut I18n,
    prompter: &mut dyn Prompter,
) -> Result<(), CoreError> {
    if opts.skip_manifest_details {
        return Ok(());
    }
    if prompter.confirm(&i18n.text("walk.platform"), false)? {
        let idx = prompter.select(&i18n.text("walk.platform.prompt"), Platform::NAMES, 0)?;
        draft.options.platform = Platform::all().get(idx).copied().unwrap_or_default();
    }
    if prompter.confirm(&i18n.text("walk.arch"), false)? {
        let idx = prompter.select(&i18n.text("walk.arch.prompt"), Arch::NAMES, 0)?;
        draft.options.arch = Arch::all().get(idx).copied().unwrap_or_default();
    }
    Ok(())
}

fn collect_branding(
    draft: &mut Draft,
    opts: WalkOptions,
    i18n: &mut I18n,
    prompter: &mut dyn Prompter,
) -> Result<(), CoreError> {
    let details = !opts.skip_manifest_details;
    let logo = optional_text(
        details,
        &i18n.text("walk.logo"),
        &i18n.text("walk.logo.prompt"),
        prompter,
    )?;
    draft.options.logo = Some(logo.unwrap_or_else(|| DEFAULT_LOGO.to_owned()));

    let keywords = optional_text(
        details,
        &i18n.text("walk.keywords"),
        &i18n.text("walk.keywords.prompt"),
        prompter,
    )?;
    draft.options.keywords = Some(keywords.map(|k| split_list(&k)).unwrap_or_default());
    Ok(())
}

fn collect_locales(
    draft: &mut Draft,
    i18n: &mut I18n,
    prompter: &mut dyn Prompter,
) -> Result<(), CoreError> {
    if !prompter.confirm(&i18n.text("walk.locales_support"), false)? {
        return Ok(());
    }

    let default_language = loop {
        let answer = prompter.input(&i18n.text("walk.locales_default"), Some("en"))?;
        let answer = answer.trim().to_owned();
        if validate_locale_code(&answer).is_ok() {
            break answer;
        }
        prompter.notify(&i18n.format("walk.invalid_locale", &[("code", answer)]));
    };

    let mode = prompter.select(
        &i18n.text("walk.locales_set"),
        LOCALE_MODES,
        DEFAULT_LOCALE_MODE,
    )?;
    let languages = match LOCALE_MODES.get(mode).and_then(|m| LocaleSet::named(m)) {
        Some(set) => set,
        None => loop {
            let answer = prompter.input(&i18n.text("walk.locales_custom"), None)?;
            let set = LocaleSet::parse_custom(&answer);
            let bad = set
                .iter()
                .find(|c| validate_locale_code(c).is_err())
                .map(str::to_owned);
            match bad {
                Some(code) => {
                    let msg = i18n.format("walk.invalid_locale", &[("code", code)]);
                    prompter.notify(&msg);
                }
                None if set.is_empty() => {
                    let msg = i18n.format("walk.invalid_locale", &[("code", String::new())]);
                    prompter.notify(&msg);
                }
                None => break set,
            }
        },
    };

    draft.locales = Some((default_language, languages));
    Ok(())
}

fn write(workspace: &Workspace, draft: Draft) -> Result<WalkOutcome, CoreError> {
    let mut doc = manifest(draft.options);
    let scaffold = match &draft.locales {
        Some((default_language, languages)) => {
            Some(setup_locales(&mut doc, default_language, languages)?)
        }
        None => None,
    };

    if workspace.manifest_exists() {
        return Ok(WalkOutcome::Aborted);
    }
    // Tables first: a manifest on disk makes the next walk abort.
    let created_tables = match scaffold {
        Some(s) => s.materialize(workspace.root())?,
        None => Vec::new(),
    };
    let path = workspace.save_manifest(&doc)?;
    Ok(WalkOutcome::Written {
        path,
        manifest: doc,
        created_tables,
    })
}

fn split_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}
