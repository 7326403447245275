use super::EXIT_SUCCESS;
use clap::Command;
use clap_complete::Shell;

/// Binary name completions are registered under.
pub const BIN_NAME: &str = "eagle-helper";

#[allow(clippy::unnecessary_wraps)]
pub fn run(mut cmd: Command, shell: Shell) -> Result<u8, String> {
    clap_complete::generate(shell, &mut cmd, BIN_NAME, &mut std::io::stdout());
    Ok(EXIT_SUCCESS)
}
