//! CLI subprocess integration tests.
//!
//! These tests invoke the `eagle-helper` binary as a subprocess and verify
//! exit codes, stdout content, and the files written into the plugin
//! directory.

use std::io::Read;
use std::path::Path;
use std::process::{Command, Output};
use std::sync::Arc;

/// A helper home and a plugin directory, both scratch.
struct Sandbox {
    home: tempfile::TempDir,
    plugin: tempfile::TempDir,
}

impl Sandbox {
    fn new() -> Self {
        Self {
            home: tempfile::tempdir().unwrap(),
            plugin: tempfile::tempdir().unwrap(),
        }
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_eagle-helper"));
        // No network in tests: skip the utils sync and the translator probe.
        cmd.env("EAGLE_HELPER_SKIP_SYNC", "1")
            .env("EAGLE_HELPER_HOME", self.home.path())
            .env_remove("EAGLE_HELPER_LOG")
            .current_dir(self.plugin.path());
        cmd
    }

    fn run(&self, args: &[&str]) -> Output {
        self.cmd().args(args).output().unwrap()
    }

    fn manifest_path(&self) -> std::path::PathBuf {
        self.plugin.path().join("manifest.json")
    }

    fn manifest(&self) -> serde_json::Value {
        read_json(&self.manifest_path())
    }
}

/// Chat-completion server that translates every string to the same text.
/// Dropping it stops the accept loop.
struct FakeTranslator {
    url: String,
    server: Arc<tiny_http::Server>,
    handle: Option<std::thread::JoinHandle<()>>,
}

impl FakeTranslator {
    const TRANSLATION: &'static str = "翻訳済み";

    fn start() -> Self {
        let server = Arc::new(tiny_http::Server::http("127.0.0.1:0").unwrap());
        let port = server.server_addr().to_ip().unwrap().port();
        let srv = Arc::clone(&server);
        let handle = std::thread::spawn(move || {
            let body = serde_json::json!({
                "choices": [{"message": {
                    "role": "assistant",
                    "content": format!("<think>ok</think>{}", Self::TRANSLATION),
                }}]
            })
            .to_string();
            for mut request in srv.incoming_requests() {
                let mut sink = String::new();
                let _ = request.as_reader().read_to_string(&mut sink);
                let _ = request.respond(tiny_http::Response::from_string(body.clone()));
            }
        });
        Self {
            url: format!("http://127.0.0.1:{port}"),
            server,
            handle: Some(handle),
        }
    }
}

impl Drop for FakeTranslator {
    fn drop(&mut self) {
        self.server.unblock();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn assert_success(output: &Output) {
    assert!(
        output.status.success(),
        "expected exit 0, got {:?}. stderr: {}",
        output.status.code(),
        stderr(output)
    );
}

#[test]
fn cli_version_exits_zero() {
    let sb = Sandbox::new();
    for flag in ["-v", "--version"] {
        let output = sb.run(&[flag]);
        assert_success(&output);
        assert!(
            stdout(&output).contains("Eagle Helper v1.0.0"),
            "version output: {}",
            stdout(&output)
        );
    }
}

#[test]
fn cli_without_subcommand_prints_help() {
    let sb = Sandbox::new();
    let output = sb.run(&[]);
    assert_success(&output);
    let out = stdout(&output);
    assert!(out.contains("init"), "help must list 'init': {out}");
    assert!(out.contains("walk"), "help must list 'walk': {out}");
    assert!(!sb.manifest_path().exists());
}

#[test]
fn cli_help_exits_zero() {
    let sb = Sandbox::new();
    let output = sb.run(&["--help"]);
    assert_success(&output);
    assert!(stdout(&output).contains("Scaffold manifests for Eagle plugins"));

    let output = sb.run(&["init", "--help"]);
    assert_success(&output);
    let out = stdout(&output);
    assert!(out.contains("--locales-languages"));
    assert!(out.contains("Add a window to the plugin"));
}

#[test]
fn cli_help_uses_stored_translations() {
    let sb = Sandbox::new();
    let table = sb.home.path().join("i18n").join("ja_JP.json");
    std::fs::create_dir_all(table.parent().unwrap()).unwrap();
    std::fs::write(&table, r#"{"cli.init.help": "新しいプラグインを初期化する"}"#).unwrap();

    let output = sb.run(&["-l", "ja_JP", "--help"]);
    assert_success(&output);
    assert!(stdout(&output).contains("新しいプラグインを初期化する"));
}

#[test]
fn cli_translated_help_is_saved_before_exit() {
    let translator = FakeTranslator::start();
    for args in [&["-l", "ja_JP", "--help"][..], &["-l", "ja_JP", "-v"][..]] {
        let sb = Sandbox::new();
        std::fs::write(
            sb.home.path().join("config.json"),
            serde_json::json!({"translator": {"endpoint": translator.url}}).to_string(),
        )
        .unwrap();

        let output = sb
            .cmd()
            .env_remove("EAGLE_HELPER_SKIP_SYNC")
            .args(args)
            .output()
            .unwrap();
        assert_success(&output);
        if args[2] == "--help" {
            assert!(stdout(&output).contains(FakeTranslator::TRANSLATION));
        }

        let table = sb.home.path().join("i18n").join("ja_JP.json");
        assert!(table.exists(), "{args:?} left no string table");
        assert_eq!(read_json(&table)["cli.about"], FakeTranslator::TRANSLATION);
    }
}

#[test]
fn cli_init_writes_manifest() {
    let sb = Sandbox::new();
    let output = sb.run(&["init", "Demo", "--id", "demo-id", "--keywords", "a, b"]);
    assert_success(&output);
    assert!(stdout(&output).contains("manifest.json"));

    let doc = sb.manifest();
    assert_eq!(doc["id"], "demo-id");
    assert_eq!(doc["name"], "Demo");
    assert_eq!(doc["version"], "1.0.0");
    assert_eq!(doc["platform"], "all");
    assert_eq!(doc["arch"], "all");
    assert_eq!(doc["devtools"], true);
    assert_eq!(doc["keywords"], serde_json::json!(["a", "b"]));
    assert!(doc.get("logo").is_none(), "unset fields must be omitted");
    assert!(doc.get("locales").is_none());
    assert!(doc.get("main").is_none());

    let raw = std::fs::read_to_string(sb.manifest_path()).unwrap();
    assert!(raw.contains("\n    \"id\": \"demo-id\""), "4-space indent: {raw}");
    assert!(!raw.contains("null"));
}

#[test]
fn cli_init_generates_uuid_without_id() {
    let sb = Sandbox::new();
    assert_success(&sb.run(&["init", "Demo"]));
    let id = sb.manifest()["id"].as_str().unwrap().to_owned();
    assert_eq!(id.len(), 36);
    assert_eq!(id.matches('-').count(), 4);
}

#[test]
fn cli_init_preserves_non_ascii() {
    let sb = Sandbox::new();
    assert_success(&sb.run(&["init", "插件", "--name", "Éclair"]));
    let raw = std::fs::read_to_string(sb.manifest_path()).unwrap();
    assert!(raw.contains("\"Éclair\""), "non-ASCII must not be escaped: {raw}");
}

#[test]
fn cli_init_chain_adds_windows_services_inspector() {
    let sb = Sandbox::new();
    let output = sb.run(&[
        "init",
        "Demo",
        "--platform",
        "win",
        "window",
        "--url",
        "index.html",
        "--width",
        "800",
        "--height",
        "600",
        "--always-on-top",
        "false",
        "window",
        "--url",
        "settings.html",
        "service",
        "--url",
        "worker.html",
        "--run-after-install",
        "true",
        "inspector",
        "--types",
        "png,jpg",
    ]);
    assert_success(&output);

    let doc = sb.manifest();
    assert_eq!(doc["platform"], "win");
    let windows = doc["main"]["windows"].as_array().unwrap();
    assert_eq!(windows.len(), 2);
    assert_eq!(windows[0]["url"], "index.html");
    assert_eq!(windows[0]["width"], 800);
    assert_eq!(windows[0]["alwaysOnTop"], false);
    assert_eq!(windows[0]["devtools"], true);
    assert!(windows[0].get("minWidth").is_none());
    assert_eq!(windows[1]["url"], "settings.html");
    assert!(windows[1].get("width").is_none());

    let services = doc["main"]["services"].as_array().unwrap();
    assert_eq!(services.len(), 1);
    assert_eq!(services[0]["runAfterInstall"], true);
    assert_eq!(doc["inspector"]["types"], serde_json::json!(["png", "jpg"]));
}

#[test]
fn cli_init_bad_step_flag_writes_nothing() {
    let sb = Sandbox::new();
    let output = sb.run(&["init", "Demo", "window", "--url", "a.html", "service"]);
    assert!(!output.status.success(), "service without --url must fail");
    assert!(!sb.manifest_path().exists());

    let output = sb.run(&["init", "Demo", "panel", "--url", "a.html"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("unknown init step 'panel'"));
    assert!(!sb.manifest_path().exists());
}

#[test]
fn cli_init_locales_with_legacy_shorts() {
    let sb = Sandbox::new();
    let output = sb.run(&[
        "init", "Demo", "-l", "true", "-ld", "ja_JP", "-ll", "en, de_DE",
    ]);
    assert_success(&output);

    let doc = sb.manifest();
    assert_eq!(doc["locales"]["default"], "ja_JP");
    assert_eq!(
        doc["locales"]["languages"],
        serde_json::json!(["en", "de_DE", "ja_JP"])
    );
    for code in ["en", "de_DE", "ja_JP"] {
        let table = sb.plugin.path().join("_locales").join(format!("{code}.json"));
        assert_eq!(read_json(&table), serde_json::json!({}));
    }
}

#[test]
fn cli_init_locales_full_set() {
    let sb = Sandbox::new();
    assert_success(&sb.run(&["init", "Demo", "--use-locales", "true", "-lf"]));
    let languages = sb.manifest()["locales"]["languages"]
        .as_array()
        .unwrap()
        .len();
    assert_eq!(languages, 8);
    let tables = std::fs::read_dir(sb.plugin.path().join("_locales"))
        .unwrap()
        .count();
    assert_eq!(tables, 8);
}

#[test]
fn cli_init_locales_default_to_lite_set() {
    let sb = Sandbox::new();
    assert_success(&sb.run(&["init", "Demo", "-l", "yes"]));
    assert_eq!(
        sb.manifest()["locales"]["languages"],
        serde_json::json!(["en", "zh_CN", "zh_TW", "ja_JP"])
    );
}

#[test]
fn cli_init_keeps_existing_string_tables() {
    let sb = Sandbox::new();
    let dir = sb.plugin.path().join("_locales");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("en.json"), r#"{"title": "Hello"}"#).unwrap();

    assert_success(&sb.run(&["init", "Demo", "-l", "true"]));
    assert_eq!(
        read_json(&dir.join("en.json")),
        serde_json::json!({"title": "Hello"})
    );
    assert!(dir.join("zh_TW.json").exists());
}

#[test]
fn cli_init_invalid_locale_is_manifest_error() {
    let sb = Sandbox::new();
    let output = sb.run(&["init", "Demo", "-l", "true", "-ll", "en,../../evil"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("manifest error"));
    assert!(!sb.manifest_path().exists());
}

#[test]
fn cli_init_json_output() {
    let sb = Sandbox::new();
    let output = sb.run(&["--json", "init", "Demo", "--id", "x", "window", "--url", "a"]);
    assert_success(&output);
    let payload: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(payload["status"], "written");
    assert_eq!(payload["id"], "x");
    assert_eq!(payload["windows"], 1);
}

#[test]
fn cli_global_flags_after_chained_step() {
    let sb = Sandbox::new();
    let output = sb.run(&[
        "init", "Demo", "--id", "x", "window", "--url", "a.html", "--verbose", "--json",
    ]);
    assert_success(&output);
    let payload: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(payload["status"], "written");
    assert_eq!(payload["windows"], 1);
    assert_eq!(sb.manifest()["main"]["windows"][0]["url"], "a.html");
}

#[test]
fn cli_path_creates_missing_directory() {
    let sb = Sandbox::new();
    let target = sb.plugin.path().join("nested").join("plugin");
    let output = sb.run(&["-p", &target.to_string_lossy(), "init", "Demo"]);
    assert_success(&output);
    assert!(target.join("manifest.json").exists());
    assert!(!sb.manifest_path().exists());
}

#[test]
fn cli_walk_aborts_on_existing_manifest() {
    let sb = Sandbox::new();
    let original = "{\"id\": \"keep-me\"}\n";
    std::fs::write(sb.manifest_path(), original).unwrap();

    let output = sb.run(&["walk"]);
    assert_success(&output);
    assert!(stdout(&output).contains("Welcome to the plugin init process"));
    assert!(stderr(&output).contains("Manifest already exists, aborting"));
    assert_eq!(
        std::fs::read_to_string(sb.manifest_path()).unwrap(),
        original
    );
}

#[test]
fn cli_walk_requires_tty() {
    let sb = Sandbox::new();
    let output = sb.run(&["walk", "-smd", "-sl"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("TTY"));
    assert!(!sb.manifest_path().exists());
}

#[test]
fn cli_i18ncache_reports_resolved_strings() {
    let sb = Sandbox::new();
    let output = sb.run(&["--json", "internal", "i18ncache"]);
    assert_success(&output);
    let payload: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(payload["language"], "en");
    assert_eq!(payload["translator"], false);
    assert_eq!(
        payload["cache"]["cli.about"],
        "Scaffold manifests for Eagle plugins"
    );
}

#[test]
fn cli_invalid_language_falls_back_to_english() {
    let sb = Sandbox::new();
    let output = sb.run(&["-l", "../x", "--json", "internal", "i18ncache"]);
    assert_success(&output);
    assert!(stderr(&output).contains("invalid locale code"));
    let payload: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(payload["language"], "en");
}

#[test]
fn cli_doctor_json_lists_checks() {
    let sb = Sandbox::new();
    let output = sb.run(&["doctor", "--json"]);
    let payload: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let names: Vec<&str> = payload["checks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    for expected in ["git", "config", "translator", "utils_repo", "manifest"] {
        assert!(names.contains(&expected), "missing check {expected}");
    }
    assert_eq!(payload["healthy"], true);
    assert_success(&output);
}

#[test]
fn cli_completions_bash() {
    let sb = Sandbox::new();
    let output = sb.run(&["completions", "bash"]);
    assert_success(&output);
    assert!(stdout(&output).contains("eagle-helper"));
}

#[test]
fn cli_man_pages_include_nested_commands() {
    let sb = Sandbox::new();
    let dir = sb.plugin.path().join("man");
    let output = sb.run(&["man-pages", &dir.to_string_lossy()]);
    assert_success(&output);
    for page in [
        "eagle-helper.1",
        "eagle-helper-init.1",
        "eagle-helper-walk.1",
        "eagle-helper-internal-translate.1",
    ] {
        assert!(dir.join(page).exists(), "missing {page}");
    }
}
