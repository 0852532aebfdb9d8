use std::path::PathBuf;

use clap::Args;
use eyre::Result;

use crate::{
    ops::{self, Settings},
    reports::{Report, TerminalOutput},
};

#[derive(Args)]
pub struct CheckCommand {
    /// Path to the template JSON document
    pub template: PathBuf,

    /// Path to archgen.toml (defaults to ./archgen.toml when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

impl CheckCommand {
    /// Run the check command
    pub fn run(&self) -> Result<()> {
        let settings = Settings::load(self.config.as_deref(), None);
        let report = ops::check(&self.template, &settings)?;
        report.render(&mut TerminalOutput::new());
        Ok(())
    }
}
