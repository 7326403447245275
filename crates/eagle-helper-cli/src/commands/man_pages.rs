use super::completions::BIN_NAME;
use super::EXIT_SUCCESS;
use clap::Command;
use std::path::Path;

fn render(cmd: Command, path: &Path) -> Result<(), String> {
    let man = clap_mangen::Man::new(cmd);
    let mut buf = Vec::new();
    man.render(&mut buf)
        .map_err(|e| format!("man page render failed: {e}"))?;
    std::fs::write(path, &buf).map_err(|e| format!("failed to write {}: {e}", path.display()))
}

/// One page for the binary and one per subcommand, nested ones included
/// (`eagle-helper-internal-translate.1`).
pub fn run(cmd: &Command, dir: &Path) -> Result<u8, String> {
    std::fs::create_dir_all(dir).map_err(|e| format!("failed to create dir: {e}"))?;
    render(cmd.clone(), &dir.join(format!("{BIN_NAME}.1")))?;

    let mut pending: Vec<(String, Command)> = cmd
        .get_subcommands()
        .map(|sub| (format!("{BIN_NAME}-{}", sub.get_name()), sub.clone()))
        .collect();
    while let Some((page, sub)) = pending.pop() {
        pending.extend(
            sub.get_subcommands()
                .map(|nested| (format!("{page}-{}", nested.get_name()), nested.clone())),
        );
        render(sub, &dir.join(format!("{page}.1")))?;
    }
    println!("man pages written to {}", dir.display());
    Ok(EXIT_SUCCESS)
}
