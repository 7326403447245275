use super::{colorize_status, json_pretty, EXIT_FAILURE, EXIT_SUCCESS};
use eagle_helper_core::{HelperConfig, HelperHome, Workspace};
use eagle_helper_remote::HttpTranslator;

pub fn run(home: &HelperHome, workspace: &Workspace, json_output: bool) -> Result<u8, String> {
    let mut checks: Vec<Check> = Vec::new();
    let mut all_pass = true;

    check_tools(&mut checks);
    let config = check_config(home, &mut checks, &mut all_pass);
    check_translator(&config, &mut checks);
    check_utils_repo(home, &config, &mut checks);
    check_manifest(workspace, &mut checks, &mut all_pass);

    print_results(&checks, all_pass, json_output)
}

fn check_tools(checks: &mut Vec<Check>) {
    let missing = eagle_helper_runtime::check_optional_tools();
    if missing.is_empty() {
        checks.push(Check::pass("git", "git is installed"));
    } else {
        checks.push(Check::warn(
            "git",
            &eagle_helper_runtime::format_missing(&missing),
        ));
    }
}

fn check_config(home: &HelperHome, checks: &mut Vec<Check>, all_pass: &mut bool) -> HelperConfig {
    let path = home.config_path();
    if !path.exists() {
        checks.push(Check::info(
            "config",
            &format!("No {} (using defaults)", path.display()),
        ));
        return HelperConfig::default();
    }
    match home.load_config() {
        Ok(config) => {
            checks.push(Check::pass(
                "config",
                &format!("Config {} is valid", path.display()),
            ));
            config
        }
        Err(e) => {
            *all_pass = false;
            checks.push(Check::fail("config", &e.to_string()));
            HelperConfig::default()
        }
    }
}

fn check_translator(config: &HelperConfig, checks: &mut Vec<Check>) {
    let translator = HttpTranslator::new(config.translator.clone());
    let endpoint = &config.translator.endpoint;
    if translator.able_to_translate() {
        checks.push(Check::pass(
            "translator",
            &format!(
                "Translation server at {endpoint} is reachable (model {})",
                config.translator.model
            ),
        ));
    } else {
        checks.push(Check::warn(
            "translator",
            &format!("Translation server at {endpoint} is not reachable; built-in English messages are used"),
        ));
    }
}

fn check_utils_repo(home: &HelperHome, config: &HelperConfig, checks: &mut Vec<Check>) {
    let dir = config.utils_repo.checkout_dir(home.root());
    if dir.join(".git").exists() {
        checks.push(Check::pass(
            "utils_repo",
            &format!("{} checked out at {}", config.utils_repo.name, dir.display()),
        ));
    } else {
        checks.push(Check::info(
            "utils_repo",
            &format!(
                "{} not synced yet (fetched on the next run without --skip-check)",
                config.utils_repo.name
            ),
        ));
    }
}

fn check_manifest(workspace: &Workspace, checks: &mut Vec<Check>, all_pass: &mut bool) {
    let path = workspace.manifest_path();
    if !workspace.manifest_exists() {
        checks.push(Check::info(
            "manifest",
            &format!("No manifest at {} (run init or walk)", path.display()),
        ));
        return;
    }
    match workspace.load_manifest() {
        Ok(doc) => checks.push(Check::pass(
            "manifest",
            &format!(
                "Manifest {} is valid ({} windows, {} services)",
                doc.id,
                doc.main.windows.len(),
                doc.main.services.len()
            ),
        )),
        Err(e) => {
            *all_pass = false;
            checks.push(Check::fail(
                "manifest",
                &format!("{}: {e}", path.display()),
            ));
        }
    }
}

fn print_results(checks: &[Check], all_pass: bool, json_output: bool) -> Result<u8, String> {
    if json_output {
        let json = serde_json::json!({
            "healthy": all_pass,
            "checks": checks.iter().map(|c| serde_json::json!({
                "name": c.name,
                "status": c.status,
                "message": c.message,
            })).collect::<Vec<_>>(),
        });
        println!("{}", json_pretty(&json)?);
    } else {
        println!("Eagle Helper Doctor\n");
        for check in checks {
            println!("  {} {}", colorize_status(check.status), check.message);
        }
        println!();
        if all_pass {
            println!("All checks passed.");
        } else {
            println!("Some checks failed. See above for details.");
        }
    }
    Ok(if all_pass { EXIT_SUCCESS } else { EXIT_FAILURE })
}

struct Check {
    name: &'static str,
    status: &'static str,
    message: String,
}

impl Check {
    fn new(name: &'static str, status: &'static str, message: &str) -> Self {
        Self {
            name,
            status,
            message: message.to_owned(),
        }
    }

    fn pass(name: &'static str, message: &str) -> Self {
        Self::new(name, "pass", message)
    }

    fn fail(name: &'static str, message: &str) -> Self {
        Self::new(name, "fail", message)
    }

    fn warn(name: &'static str, message: &str) -> Self {
        Self::new(name, "warn", message)
    }

    fn info(name: &'static str, message: &str) -> Self {
        Self::new(name, "info", message)
    }
}
