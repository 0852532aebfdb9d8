//! Check command report data structures.

use std::path::{Path, PathBuf};

use archgen_codegen::{Diagnostic, Generation, GenerationStats};

use super::output::{Output, Report};

/// Report data from a generation run whose output is discarded.
#[derive(Debug)]
pub struct CheckReport {
    /// Path to the template file.
    pub template_path: PathBuf,
    /// Name of the root record.
    pub root_name: Option<String>,
    pub diagnostics: Vec<Diagnostic>,
    pub stats: GenerationStats,
}

impl CheckReport {
    pub fn new(template_path: &Path, generation: &Generation) -> Self {
        Self {
            template_path: template_path.to_path_buf(),
            root_name: generation.output.root().map(|root| root.to_string()),
            diagnostics: generation.diagnostics.clone(),
            stats: generation.stats,
        }
    }

    /// Number of warning diagnostics.
    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity.is_warning())
            .count()
    }
}

impl Report for CheckReport {
    fn render(&self, out: &mut dyn Output) {
        render_diagnostics(&self.diagnostics, out);

        out.preformatted(&format!("✓ {} generates cleanly", self.template_path.display()));
        out.newline();
        if let Some(root) = &self.root_name {
            out.key_value_indented("root", root);
        }
        out.key_value_indented("types", &stats_line(&self.stats));
        let warnings = self.warning_count();
        if warnings > 0 {
            out.key_value_indented("warnings", &warnings.to_string());
        }
    }
}

/// Print every diagnostic in walk order.
pub(super) fn render_diagnostics(diagnostics: &[Diagnostic], out: &mut dyn Output) {
    for diag in diagnostics {
        out.diagnostic(&diag.to_string());
    }
}

pub(super) fn stats_line(stats: &GenerationStats) -> String {
    format!(
        "{} record{}, {} interface{}, {} enum{} ({} reused)",
        stats.records,
        plural(stats.records),
        stats.interfaces,
        plural(stats.interfaces),
        stats.enums,
        plural(stats.enums),
        stats.reused
    )
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "" } else { "s" }
}
