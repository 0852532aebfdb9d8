use std::path::PathBuf;

use clap::{Args, ValueEnum};
use eyre::{Context, Result};

use crate::{
    ops::{self, Settings},
    reports::{Report, SummaryReport, TerminalOutput},
};

/// How the output model is printed.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// The output model as pretty-printed JSON
    Json,
    /// An indented listing of packages, types and fields
    #[default]
    Summary,
}

#[derive(Args)]
pub struct GenerateCommand {
    /// Path to the template JSON document
    pub template: PathBuf,

    /// Path to archgen.toml (defaults to ./archgen.toml when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Base package of the generated types, overriding the manifest
    #[arg(short, long)]
    pub package: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Summary)]
    pub format: OutputFormat,
}

impl GenerateCommand {
    /// Run the generate command
    pub fn run(&self) -> Result<()> {
        let settings = Settings::load(self.config.as_deref(), self.package.as_deref());
        let generation = ops::generate(&self.template, &settings)?;

        match self.format {
            OutputFormat::Json => {
                for diag in &generation.diagnostics {
                    eprintln!("{}", diag);
                }
                let json = serde_json::to_string_pretty(&generation.output)
                    .wrap_err("Failed to serialize output model")?;
                println!("{}", json);
            }
            OutputFormat::Summary => {
                SummaryReport::new(&generation).render(&mut TerminalOutput::new());
            }
        }
        Ok(())
    }
}
