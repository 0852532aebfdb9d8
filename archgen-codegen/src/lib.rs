//! Type generation for archgen.
//!
//! This crate walks a template tree and turns it into an [`OutputModel`]:
//! records for nested nodes, interfaces for choice groups, and enumerations
//! for coded value sets. Rendering the model into source text is left to
//! downstream emitters.
//!
//! # Example
//!
//! ```
//! use archgen_codegen::{GeneratorConfig, generate};
//! use archgen_core::RmTypeRegistry;
//! use archgen_ir::{Template, TemplateNode};
//!
//! let template = Template {
//!     template_id: "vitals".into(),
//!     tree: TemplateNode::new("vitals", "Vitals", "COMPOSITION", "/")
//!         .with_child(TemplateNode::new("note", "Note", "DV_TEXT", "/note")),
//! };
//!
//! let registry = RmTypeRegistry::openehr();
//! let generation = generate(&template, &registry, &GeneratorConfig::default()).unwrap();
//! let root = generation.output.root_record().unwrap();
//! assert_eq!(root.name, "Composition");
//! assert_eq!(generation.output.root().unwrap().package, "org.ehrbase.generated.composition");
//! ```

mod builder;
pub mod config;
pub mod context;
pub mod diagnostic;
pub mod error;
pub mod naming;
pub mod structure;
pub mod valueset;

use archgen_core::TypeResolver;
use archgen_ir::{GeneratedType, OutputModel, Template};
use tracing::{debug, info};

use crate::{builder::TypeBuilder, context::GenerationContext};

pub use config::{
    GeneratorConfig, SHARED_DEFINITION_PACKAGE, registry_from_manifest, well_known_code_phrase,
};
pub use diagnostic::{Diagnostic, Phase, Severity};
pub use error::GenerateError;
pub use naming::NamingConvention;

/// Result of a successful generation run.
#[derive(Debug, Clone)]
pub struct Generation {
    pub output: OutputModel,
    /// Non-fatal conditions met during the run, in walk order.
    pub diagnostics: Vec<Diagnostic>,
    pub stats: GenerationStats,
}

impl Generation {
    /// Returns true if any diagnostic is a warning.
    pub fn has_warnings(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity.is_warning())
    }
}

/// Counts of what a run produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerationStats {
    pub records: usize,
    pub interfaces: usize,
    pub enums: usize,
    /// References served from a dedup cache instead of a new type.
    pub reused: usize,
}

impl GenerationStats {
    fn of(output: &OutputModel, reused: usize) -> Self {
        Self {
            records: output.records().count(),
            interfaces: output.interfaces().count(),
            enums: output.enums().count(),
            reused,
        }
    }
}

/// Generator bound to a configuration and a type resolver.
pub struct Generator<'a> {
    config: &'a GeneratorConfig,
    resolver: &'a dyn TypeResolver,
}

impl<'a> Generator<'a> {
    pub fn new(config: &'a GeneratorConfig, resolver: &'a dyn TypeResolver) -> Self {
        Self { config, resolver }
    }

    /// Run one generation over `template`.
    ///
    /// Every run starts from a fresh context, so one generator can be used
    /// for any number of templates.
    pub fn generate(&self, template: &Template) -> Result<Generation, GenerateError> {
        let template_id = template.template_id.trim();
        if template_id.is_empty() {
            return Err(GenerateError::EmptyTemplateId);
        }

        info!(template_id, "generating types");
        let ctx = GenerationContext::new(
            self.config.package.clone(),
            template_id,
            NamingConvention::for_language(self.config.naming),
            self.config.class_name_max_width,
        );
        let mut builder = TypeBuilder::new(self.resolver, self.config, ctx);
        let mut root = builder.build(&template.tree)?;
        root.template_id = Some(template_id.to_string());

        let mut ctx = builder.ctx;
        let package = ctx.root_package();
        let root_ref = ctx.output.push(package, GeneratedType::Record(root));
        debug!(root = %root_ref, types = ctx.output.len(), "generation finished");
        ctx.output.set_root(root_ref);

        let stats = GenerationStats::of(&ctx.output, ctx.reused);
        Ok(Generation {
            output: ctx.output,
            diagnostics: ctx.diagnostics,
            stats,
        })
    }
}

/// Generate the output model of `template` in one call.
pub fn generate(
    template: &Template,
    resolver: &dyn TypeResolver,
    config: &GeneratorConfig,
) -> Result<Generation, GenerateError> {
    Generator::new(config, resolver).generate(template)
}
