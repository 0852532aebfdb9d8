//! Indented summary of an output model.

use archgen_codegen::Generation;
use archgen_ir::{GeneratedField, GeneratedType, RecordType};

use super::{
    check::{render_diagnostics, stats_line},
    output::{Output, Report},
};

/// Package, type and field listing of one generation run.
pub struct SummaryReport<'a> {
    generation: &'a Generation,
}

impl<'a> SummaryReport<'a> {
    pub fn new(generation: &'a Generation) -> Self {
        Self { generation }
    }
}

impl Report for SummaryReport<'_> {
    fn render(&self, out: &mut dyn Output) {
        render_diagnostics(&self.generation.diagnostics, out);

        for (package, types) in self.generation.output.packages() {
            out.section(&format!("package {}", package));
            for ty in types {
                render_type(ty, out);
            }
            out.newline();
        }
        out.preformatted(&stats_line(&self.generation.stats));
    }
}

fn render_type(ty: &GeneratedType, out: &mut dyn Output) {
    match ty {
        GeneratedType::Record(record) => {
            out.item(1, &record_heading(record));
            for field in &record.fields {
                out.item(2, &field_line(field));
            }
        }
        GeneratedType::Interface(interface) => {
            out.item(1, &format!("interface {}", interface.name));
            for implementor in &interface.implementors {
                out.item(2, &format!("| {}", implementor.name));
            }
        }
        GeneratedType::Enum(enumeration) => {
            out.item(
                1,
                &format!("enum {} ({})", enumeration.name, enumeration.terminology_id),
            );
            for constant in &enumeration.constants {
                out.item(
                    2,
                    &format!("{} = {} \"{}\"", constant.identifier, constant.code, constant.value),
                );
            }
        }
    }
}

fn record_heading(record: &RecordType) -> String {
    let mut heading = format!("record {}", record.name);
    if let Some(interface) = &record.implements {
        heading.push_str(&format!(": {}", interface.name));
    }
    if let Some(discriminant) = &record.discriminant {
        heading.push_str(&format!(" [{}]", discriminant));
    }
    if let Some(archetype) = &record.archetype_id {
        heading.push_str(&format!(" @{}", archetype));
    }
    if let Some(template) = &record.template_id {
        heading.push_str(&format!(" @template {}", template));
    }
    heading
}

fn field_line(field: &GeneratedField) -> String {
    let mut line = format!("{}: {}", field.name, field.ty);
    if !field.source_path.is_empty() {
        line.push_str(&format!(" <- {}", field.source_path));
    }
    if field.is_identity {
        line.push_str(" (identity)");
    }
    line
}

#[cfg(test)]
mod tests {
    use archgen_codegen::{GeneratorConfig, generate};
    use archgen_core::RmTypeRegistry;
    use archgen_ir::{Template, TemplateNode};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::reports::BufferOutput;

    #[test]
    fn test_render_summary() {
        let template = Template {
            template_id: "vitals".into(),
            tree: TemplateNode::new("vitals", "Vitals", "COMPOSITION", "/")
                .with_child(TemplateNode::new("note", "Note", "DV_COUNT", "/note").with_max(-1)),
        };
        let generation = generate(
            &template,
            &RmTypeRegistry::openehr(),
            &GeneratorConfig::default().with_package("org.example"),
        )
        .unwrap();

        let mut out = BufferOutput::default();
        SummaryReport::new(&generation).render(&mut out);

        assert!(out.stderr.is_empty());
        assert_eq!(
            out.stdout,
            [
                "package org.example.composition",
                "  record Composition @template vitals",
                "    magnitude: list<integer> <- note|magnitude",
                "    versionUid: rm:VERSION_UID (identity)",
                "",
                "1 record, 0 interfaces, 0 enums (0 reused)",
            ]
        );
    }
}
