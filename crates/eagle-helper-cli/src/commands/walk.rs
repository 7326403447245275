use super::{json_pretty, manifest_error, EXIT_SUCCESS};
use dialoguer::{Confirm, Input, Select};
use eagle_helper_core::{
    run_walk, CoreError, I18n, Prompter, WalkOptions, WalkOutcome, Workspace,
};
use std::io::{stderr, stdin, IsTerminal};

/// Terminal prompts through dialoguer. Refuses to prompt when stdin or
/// stderr is not a terminal.
struct TermPrompter {
    interactive: bool,
}

impl TermPrompter {
    fn new() -> Self {
        Self {
            interactive: stdin().is_terminal() && stderr().is_terminal(),
        }
    }

    fn ensure_tty(&self) -> Result<(), CoreError> {
        if self.interactive {
            Ok(())
        } else {
            Err(CoreError::Prompt(
                "interactive prompts require a TTY".to_owned(),
            ))
        }
    }
}

fn prompt_failed(e: dialoguer::Error) -> CoreError {
    CoreError::Prompt(e.to_string())
}

impl Prompter for TermPrompter {
    fn input(&mut self, prompt: &str, default: Option<&str>) -> Result<String, CoreError> {
        self.ensure_tty()?;
        let mut input = Input::new().with_prompt(prompt).allow_empty(true);
        if let Some(d) = default {
            input = input.default(d.to_owned());
        }
        let answer: String = input.interact_text().map_err(prompt_failed)?;
        Ok(answer)
    }

    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool, CoreError> {
        self.ensure_tty()?;
        Confirm::new()
            .with_prompt(prompt)
            .default(default)
            .interact()
            .map_err(prompt_failed)
    }

    fn select(
        &mut self,
        prompt: &str,
        items: &[&str],
        default: usize,
    ) -> Result<usize, CoreError> {
        self.ensure_tty()?;
        Select::new()
            .with_prompt(prompt)
            .items(items)
            .default(default)
            .interact()
            .map_err(prompt_failed)
    }

    fn notify(&mut self, message: &str) {
        eprintln!("{message}");
    }
}

pub fn run(
    workspace: &Workspace,
    opts: WalkOptions,
    i18n: &mut I18n,
    json: bool,
) -> Result<u8, String> {
    if !json {
        println!("{}", i18n.text("walk.welcome"));
    }

    let mut prompter = TermPrompter::new();
    let outcome = run_walk(workspace, opts, i18n, &mut prompter).map_err(|e| match e {
        CoreError::Manifest(inner) => manifest_error(&inner),
        other => other.to_string(),
    })?;

    match outcome {
        WalkOutcome::Aborted => {
            eprintln!("{}", i18n.text("walk.manifest_exists"));
            if json {
                let payload = serde_json::json!({
                    "status": "aborted",
                    "path": workspace.manifest_path(),
                });
                println!("{}", json_pretty(&payload)?);
            }
        }
        WalkOutcome::Written {
            path,
            manifest,
            created_tables,
        } => {
            if json {
                let payload = serde_json::json!({
                    "status": "written",
                    "path": path,
                    "manifest": manifest,
                    "created_tables": created_tables,
                });
                println!("{}", json_pretty(&payload)?);
            } else {
                println!(
                    "{}",
                    i18n.format("walk.written", &[("path", path.display().to_string())])
                );
            }
        }
    }
    Ok(EXIT_SUCCESS)
}
