use std::{
    fs::File,
    io::{self, Write},
    path::PathBuf,
};

use clap::{Args, CommandFactory};
use clap_complete::Shell;
use eyre::{Context, Result};
use tracing::info;

use super::Cli;

#[derive(Args)]
pub struct CompletionsCommand {
    /// Shell to generate completions for
    shell: Shell,

    /// Write the script to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl CompletionsCommand {
    pub fn run(&self) -> Result<()> {
        match &self.output {
            Some(path) => {
                let mut file = File::create(path)
                    .wrap_err_with(|| format!("Failed to create {}", path.display()))?;
                render(self.shell, &mut file)?;
                info!(shell = %self.shell, path = %path.display(), "wrote completions");
                Ok(())
            }
            None => render(self.shell, &mut io::stdout().lock()),
        }
    }
}

/// Write the completion script for `shell`, named after the binary.
fn render(shell: Shell, out: &mut dyn Write) -> Result<()> {
    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    clap_complete::generate(shell, &mut cmd, bin_name, out);
    out.flush().wrap_err("Failed to write completions")
}
