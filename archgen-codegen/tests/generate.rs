//! Generation scenarios over small hand-built template trees.
//!
//! Each test builds a template, runs the generator, and checks the shape of
//! the resulting output model.

use std::collections::HashSet;
use std::str::FromStr;

use archgen_codegen::{
    GenerateError, Generation, Generator, GeneratorConfig, NamingConvention, Phase,
    SHARED_DEFINITION_PACKAGE, generate, registry_from_manifest,
};
use archgen_core::RmTypeRegistry;
use archgen_ir::{
    FieldType, GeneratedType, RecordType, ScalarType, Template, TemplateNode, Term,
    TerminologyBinding, TypeRef,
};
use archgen_manifest::{Language, Manifest};
use pretty_assertions::assert_eq;

const DEFINITION: &str = "org.example.composition.definition";

/// Resolver without leaf expansion, so every leaf maps to one field.
fn registry() -> RmTypeRegistry {
    let mut registry = RmTypeRegistry::new();
    registry
        .register("DV_TEXT", ScalarType::Text)
        .register("DV_COUNT", ScalarType::Integer)
        .register("DV_DURATION", ScalarType::Duration)
        .register("DV_CODED_TEXT", ScalarType::rm(ScalarType::CODED_TEXT))
        .register("CODE_PHRASE", ScalarType::rm(ScalarType::CODE_PHRASE))
        .register("DV_INTERVAL", ScalarType::rm("DV_INTERVAL"));
    registry
}

fn config() -> GeneratorConfig {
    GeneratorConfig::default().with_package("org.example")
}

fn template(children: Vec<TemplateNode>) -> Template {
    let tree = children.into_iter().fold(
        TemplateNode::new("vitals", "Vitals", "COMPOSITION", "/"),
        TemplateNode::with_child,
    );
    Template {
        template_id: "vitals".into(),
        tree,
    }
}

fn run(template: &Template) -> Generation {
    generate(template, &registry(), &config()).expect("Failed to generate types")
}

fn leaf(name: &str, rm_type: &str, path: &str) -> TemplateNode {
    TemplateNode::new(name.to_lowercase(), name, rm_type, path)
}

fn record<'a>(generation: &'a Generation, name: &str) -> &'a RecordType {
    generation
        .output
        .find(name)
        .and_then(GeneratedType::as_record)
        .unwrap_or_else(|| panic!("no record named {}", name))
}

fn field_names(record: &RecordType) -> Vec<&str> {
    record.fields.iter().map(|f| f.name.as_str()).collect()
}

fn definition(name: &str) -> FieldType {
    FieldType::Named(TypeRef::new(DEFINITION, name))
}

fn coded(terms: &[(&str, &str)]) -> TerminologyBinding {
    TerminologyBinding::coded(
        "local",
        terms
            .iter()
            .map(|(code, label)| Term::new(*code, *label))
            .collect(),
    )
}

fn device(path: &str) -> TemplateNode {
    TemplateNode::new("device", "Device", "CLUSTER", path).with_child(leaf(
        "Name",
        "DV_TEXT",
        &format!("{}/name", path),
    ))
}

/// Two archetyped observations, each with its own history.
fn observations() -> Template {
    let bp = TemplateNode::new("bp", "Blood pressure", "OBSERVATION", "/content[bp]")
        .archetype("openEHR-EHR-OBSERVATION.blood_pressure.v2")
        .with_child(
            TemplateNode::new("data", "History", "HISTORY", "/content[bp]/data").with_child(
                leaf("Systolic", "DV_COUNT", "/content[bp]/data/systolic"),
            ),
        );
    let pulse = TemplateNode::new("pulse", "Pulse", "OBSERVATION", "/content[pulse]")
        .archetype("openEHR-EHR-OBSERVATION.pulse.v2")
        .with_child(
            TemplateNode::new("data", "History", "HISTORY", "/content[pulse]/data")
                .with_child(leaf("Rate", "DV_COUNT", "/content[pulse]/data/rate")),
        );
    template(vec![bp, pulse])
}

#[test]
fn test_root_record() {
    let generation = run(&template(vec![leaf("Note", "DV_TEXT", "/note")]));

    let root_ref = generation.output.root().expect("root is set");
    assert_eq!(root_ref.package, "org.example.composition");

    let root = generation.output.root_record().expect("root is a record");
    assert_eq!(root.name, "Composition");
    assert_eq!(root.template_id.as_deref(), Some("vitals"));
    assert_eq!(field_names(root), ["note", "versionUid"]);

    let note = root.field("note").unwrap();
    assert_eq!(note.ty, FieldType::Scalar(ScalarType::Text));
    assert_eq!(note.source_path, "note");

    let identity = root.field("versionUid").unwrap();
    assert!(identity.is_identity);
    assert_eq!(identity.source_path, "");
    assert_eq!(
        identity.ty,
        FieldType::Scalar(ScalarType::rm(ScalarType::VERSION_UID))
    );
}

#[test]
fn test_identity_field_disabled() {
    let config = GeneratorConfig {
        identity_field: false,
        ..config()
    };
    let generation = generate(
        &template(vec![leaf("Note", "DV_TEXT", "/note")]),
        &registry(),
        &config,
    )
    .unwrap();
    assert_eq!(field_names(generation.output.root_record().unwrap()), ["note"]);
}

#[test]
fn test_deterministic() {
    let template = observations();
    let registry = registry();
    let config = config();
    let generator = Generator::new(&config, &registry);

    let first = generator.generate(&template).unwrap();
    let second = generator.generate(&template).unwrap();
    assert_eq!(first.output, second.output);
    assert_eq!(
        serde_json::to_string(&first.output).unwrap(),
        serde_json::to_string(&second.output).unwrap()
    );
}

#[test]
fn test_identical_subtrees_share_one_record() {
    let generation = run(&template(vec![device("/a"), device("/b")]));

    let root = generation.output.root_record().unwrap();
    assert_eq!(field_names(root), ["device", "bDevice", "versionUid"]);
    assert_eq!(root.fields[0].ty, definition("Cluster"));
    assert_eq!(root.fields[1].ty, definition("Cluster"));

    assert_eq!(generation.stats.records, 2);
    assert_eq!(generation.stats.reused, 1);
    assert_eq!(field_names(record(&generation, "Cluster")), ["name"]);
}

#[test]
fn test_different_subtrees_get_distinct_records() {
    let larger = device("/c").with_child(leaf("Serial", "DV_TEXT", "/c/serial"));
    let generation = run(&template(vec![device("/a"), larger]));

    let root = generation.output.root_record().unwrap();
    assert_eq!(root.fields[0].ty, definition("Cluster"));
    assert_eq!(root.fields[1].ty, definition("DeviceCluster"));
    assert_eq!(
        field_names(record(&generation, "DeviceCluster")),
        ["name", "serial"]
    );
    assert_eq!(generation.stats.reused, 0);
}

#[test]
fn test_archetype_names_widen_nested_types() {
    let generation = run(&observations());

    let bp = record(&generation, "Observation");
    assert_eq!(
        bp.archetype_id.as_deref(),
        Some("openEHR-EHR-OBSERVATION.blood_pressure.v2")
    );
    assert_eq!(bp.fields[0].ty, definition("BloodPressureHistory"));

    let pulse = record(&generation, "PulseObservation");
    assert_eq!(pulse.fields[0].ty, definition("PulseHistory"));

    let root = generation.output.root_record().unwrap();
    assert_eq!(root.archetype_id, None);
    assert_eq!(field_names(root), ["bloodPressure", "pulse", "versionUid"]);
}

#[test]
fn test_names_unique_and_valid() {
    let generation = run(&template(vec![
        leaf("Type", "DV_TEXT", "/type"),
        leaf("1st reading", "DV_TEXT", "/first"),
        leaf("Value", "DV_TEXT", "/a"),
        leaf("Value", "DV_TEXT", "/b"),
        leaf("Value", "DV_TEXT", "/c"),
        device("/d"),
        device("/e").with_child(leaf("Value", "DV_TEXT", "/e/value")),
        device("/f").with_child(leaf("Other", "DV_TEXT", "/f/other")),
    ]));
    let naming = NamingConvention::for_language(Language::Rust);

    let root = generation.output.root_record().unwrap();
    assert_eq!(root.field("typeType").unwrap().source_path, "type");
    assert_eq!(root.field("n1stReading").unwrap().source_path, "first");

    for record in generation.output.records() {
        let mut seen = HashSet::new();
        for field in &record.fields {
            assert!(seen.insert(&field.name), "duplicate field {}", field.name);
            assert!(
                naming.is_valid_identifier(&field.name),
                "invalid field {}",
                field.name
            );
        }
    }

    let mut type_names = HashSet::new();
    for (_, ty) in generation.output.types() {
        assert!(type_names.insert(ty.name()), "duplicate type {}", ty.name());
        assert!(naming.is_valid_identifier(ty.name()));
    }
}

#[test]
fn test_cardinality_preserved() {
    let generation = run(&template(vec![
        leaf("Tag", "DV_TEXT", "/tag").with_max(-1),
        leaf("Title", "DV_TEXT", "/title"),
        device("/item").with_max(3),
    ]));

    let root = generation.output.root_record().unwrap();
    assert_eq!(
        root.field("tag").unwrap().ty,
        FieldType::List(Box::new(FieldType::Scalar(ScalarType::Text)))
    );
    assert_eq!(
        root.field("title").unwrap().ty,
        FieldType::Scalar(ScalarType::Text)
    );

    let item = &root.field_at("item").unwrap().ty;
    assert!(item.is_list());
    assert_eq!(item.target().map(|t| t.name.as_str()), Some("Cluster"));
}

#[test]
fn test_expanded_leaf_fields_keep_cardinality() {
    let template = template(vec![leaf("Weight", "DV_QUANTITY", "/weight").with_max(-1)]);
    let generation = generate(&template, &RmTypeRegistry::openehr(), &config()).unwrap();

    let root = generation.output.root_record().unwrap();
    assert_eq!(field_names(root), ["magnitude", "units", "versionUid"]);
    assert_eq!(
        root.field_at("weight|magnitude").unwrap().ty,
        FieldType::List(Box::new(FieldType::Scalar(ScalarType::Decimal)))
    );
    assert_eq!(
        root.field_at("weight|units").unwrap().ty,
        FieldType::List(Box::new(FieldType::Scalar(ScalarType::Text)))
    );
}

fn result_cluster(name: &str, path: &str) -> TemplateNode {
    TemplateNode::new(name.to_lowercase(), name, "CLUSTER", path)
        .with_child(leaf("Value", "DV_TEXT", &format!("{}/value", path)))
        .with_child(leaf("Value", "DV_COUNT", &format!("{}/value", path)))
        .with_child(leaf("Comment", "DV_TEXT", &format!("{}/comment", path)))
}

#[test]
fn test_choice_group() {
    let generation = run(&template(vec![result_cluster("Result", "/result")]));

    let interfaces: Vec<_> = generation.output.interfaces().collect();
    assert_eq!(interfaces.len(), 1);
    let interface = interfaces[0];
    assert_eq!(interface.name, "Choice");
    assert_eq!(
        interface.implementors,
        vec![
            TypeRef::new(DEFINITION, "Text"),
            TypeRef::new(DEFINITION, "Count"),
        ]
    );

    let interface_ref = TypeRef::new(DEFINITION, "Choice");
    let mut discriminants = Vec::new();
    for implementor in &interface.implementors {
        let variant = record(&generation, &implementor.name);
        assert_eq!(variant.implements.as_ref(), Some(&interface_ref));
        discriminants.push(variant.discriminant.clone().unwrap());
    }
    assert_eq!(discriminants, ["DV_TEXT", "DV_COUNT"]);

    let text = record(&generation, "Text");
    assert_eq!(field_names(text), ["value"]);
    assert_eq!(text.fields[0].source_path, "");

    let cluster = record(&generation, "Cluster");
    assert_eq!(field_names(cluster), ["comment", "value"]);
    let selector = cluster.field("value").unwrap();
    assert!(selector.is_variant_selector);
    assert_eq!(selector.ty, FieldType::Named(interface_ref));
    assert_eq!(selector.source_path, "/value");
}

#[test]
fn test_identical_choice_groups_share_one_interface() {
    let other = result_cluster("Other", "/other").with_child(leaf("Note", "DV_TEXT", "/other/note"));
    let generation = run(&template(vec![result_cluster("Result", "/result"), other]));

    assert_eq!(generation.stats.interfaces, 1);
    assert_eq!(generation.stats.reused, 1);
    let second = record(&generation, "OtherCluster");
    assert_eq!(second.field("value").unwrap().ty, definition("Choice"));
}

#[test]
fn test_multi_alternative_makes_choice_a_list() {
    let result = TemplateNode::new("result", "Result", "CLUSTER", "/result")
        .with_child(leaf("Value", "DV_TEXT", "/result/value"))
        .with_child(leaf("Value", "DV_COUNT", "/result/value").with_max(-1))
        .with_child(leaf("Comment", "DV_TEXT", "/result/comment"));
    let generation = run(&template(vec![result]));

    let cluster = record(&generation, "Cluster");
    assert_eq!(
        cluster.field("value").unwrap().ty,
        FieldType::List(Box::new(definition("Choice")))
    );
}

#[test]
fn test_event_split_into_point_and_interval() {
    let history = TemplateNode::new("data", "History", "HISTORY", "/data").with_child(
        TemplateNode::new("any_event", "Any event", "EVENT", "/data/events")
            .with_max(-1)
            .with_child(leaf("Comment", "DV_TEXT", "/data/events/comment")),
    );
    let generation = run(&template(vec![history]));

    assert_eq!(generation.stats.interfaces, 1);
    let variants: Vec<_> = generation
        .output
        .records()
        .filter(|r| r.implements.is_some())
        .collect();
    assert_eq!(variants.len(), 2);

    let interval = variants
        .iter()
        .find(|r| r.discriminant.as_deref() == Some("INTERVAL_EVENT"))
        .expect("interval variant");
    let point = variants
        .iter()
        .find(|r| r.discriminant.as_deref() == Some("POINT_EVENT"))
        .expect("point variant");

    assert_eq!(interval.fields.len(), 3);
    assert!(interval.field_at("/comment").is_some());
    assert_eq!(
        interval.field_at("/width").unwrap().ty,
        FieldType::Scalar(ScalarType::Duration)
    );
    assert!(interval.field_at("/math_function").is_some());

    assert_eq!(point.fields.len(), 1);
    assert!(point.field_at("/comment").is_some());

    let history = record(&generation, "History");
    assert_eq!(field_names(history), ["anyEvent"]);
    let selector = history.field_at("/events").unwrap();
    assert!(selector.is_variant_selector);
    assert!(selector.ty.is_list());
}

#[test]
fn test_event_next_to_choice_group() {
    let history = TemplateNode::new("data", "History", "HISTORY", "/data")
        .with_child(leaf("Summary", "DV_TEXT", "/data/summary"))
        .with_child(leaf("Summary", "DV_COUNT", "/data/summary"))
        .with_child(
            TemplateNode::new("any_event", "Any event", "EVENT", "/data/events")
                .with_child(leaf("Comment", "DV_TEXT", "/data/events/comment")),
        );
    let generation = run(&template(vec![history]));

    assert_eq!(generation.stats.interfaces, 2);
    let history = record(&generation, "History");
    assert_eq!(field_names(history), ["summary", "anyEvent"]);
    assert!(history.fields.iter().all(|f| f.is_variant_selector));
    assert!(history.field_at("").is_none());

    assert_eq!(history.fields[0].ty, definition("Choice"));
    assert_eq!(history.fields[1].ty, definition("AnyEventChoice"));

    let events = generation
        .output
        .find("AnyEventChoice")
        .and_then(GeneratedType::as_interface)
        .expect("event interface");
    let implementors: Vec<_> = events.implementors.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(implementors, ["Event", "PointEvent"]);
}

#[test]
fn test_value_sets_memoized() {
    let generation = run(&template(vec![
        leaf("Position", "DV_CODED_TEXT", "/position")
            .with_input(coded(&[("at1000", "Sitting"), ("at1001", "Standing")])),
        leaf("Posture", "DV_CODED_TEXT", "/posture")
            .with_input(coded(&[("at1001", "Standing"), ("at1000", "Sitting")])),
    ]));

    let root = generation.output.root_record().unwrap();
    assert_eq!(root.field("position").unwrap().ty, definition("Position"));
    assert_eq!(root.field("posture").unwrap().ty, definition("Position"));

    let enums: Vec<_> = generation.output.enums().collect();
    assert_eq!(enums.len(), 1);
    let identifiers: Vec<_> = enums[0]
        .constants
        .iter()
        .map(|c| c.identifier.as_str())
        .collect();
    assert_eq!(identifiers, ["SITTING", "STANDING"]);
    assert_eq!(enums[0].terminology_id, "local");
}

#[test]
fn test_unbound_coded_text_stays_scalar() {
    let generation = run(&template(vec![leaf("Position", "DV_CODED_TEXT", "/position")]));
    let root = generation.output.root_record().unwrap();
    assert_eq!(
        root.field("position").unwrap().ty,
        FieldType::Scalar(ScalarType::rm(ScalarType::CODED_TEXT))
    );
    assert_eq!(generation.stats.enums, 0);
}

#[test]
fn test_territory_uses_shared_enumeration() {
    let generation = run(&template(vec![
        leaf("territory", "CODE_PHRASE", "/territory")
            .with_input(coded(&[("AT", "Austria"), ("DE", "Germany")])),
    ]));

    let root = generation.output.root_record().unwrap();
    assert_eq!(
        root.field("territory").unwrap().ty,
        FieldType::Named(TypeRef::new(SHARED_DEFINITION_PACKAGE, "Territory"))
    );
    assert_eq!(generation.stats.enums, 0);
}

#[test]
fn test_expanded_setting_uses_shared_enumeration() {
    let template = template(vec![leaf("setting", "DV_CODED_TEXT", "/context/setting")]);
    let generation = generate(&template, &RmTypeRegistry::openehr(), &config()).unwrap();

    let root = generation.output.root_record().unwrap();
    assert_eq!(
        root.field_at("context/setting|value").unwrap().ty,
        FieldType::Scalar(ScalarType::Text)
    );
    assert_eq!(
        root.field_at("context/setting|defining_code").unwrap().ty,
        FieldType::Named(TypeRef::new(
            SHARED_DEFINITION_PACKAGE,
            "SettingDefiningCode"
        ))
    );
}

#[test]
fn test_node_with_only_choice_children_becomes_leaf() {
    let range = TemplateNode::new("range", "Range", "DV_INTERVAL", "/range")
        .with_child(leaf("Lower", "DV_COUNT", "/range/lower"))
        .with_child(leaf("Lower", "DV_TEXT", "/range/lower"));
    let generation = run(&template(vec![range]));

    let interval = record(&generation, "Interval");
    assert_eq!(field_names(interval), ["range", "lower"]);
    assert_eq!(interval.fields[0].source_path, "");
    assert_eq!(
        interval.fields[0].ty,
        FieldType::Scalar(ScalarType::rm("DV_INTERVAL"))
    );
    assert!(interval.fields[1].is_variant_selector);
}

#[test]
fn test_unresolved_enclosing_node_reported() {
    let element = TemplateNode::new("result", "Result", "ELEMENT", "/result")
        .with_child(leaf("Value", "DV_COUNT", "/result/value"))
        .with_child(leaf("Value", "DV_TEXT", "/result/value"));
    let generation = run(&template(vec![element]));

    let element = record(&generation, "Element");
    assert_eq!(field_names(element), ["value"]);
    assert!(generation.has_warnings());
    assert_eq!(generation.diagnostics[0].location.as_deref(), Some("/result"));
}

#[test]
fn test_unresolvable_leaf_is_skipped() {
    let generation = run(&template(vec![
        leaf("Mystery", "DV_MYSTERY", "/mystery"),
        leaf("Note", "DV_TEXT", "/note"),
    ]));

    let root = generation.output.root_record().unwrap();
    assert_eq!(field_names(root), ["note", "versionUid"]);

    let warnings: Vec<_> = generation
        .diagnostics
        .iter()
        .filter(|d| d.severity.is_warning())
        .collect();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].phase, Phase::Resolve);
    assert_eq!(warnings[0].location.as_deref(), Some("/mystery"));
}

#[test]
fn test_manifest_types_resolve_leaves() {
    let manifest = Manifest::from_str(
        r#"
[generator]
package = "org.example"

[types]
DV_MYSTERY = "integer"
"#,
    )
    .expect("Failed to parse manifest");
    let config = GeneratorConfig::from_manifest(&manifest);
    let registry = registry_from_manifest(&manifest);

    let template = template(vec![leaf("Mystery", "DV_MYSTERY", "/mystery")]);
    let generation = generate(&template, &registry, &config).unwrap();
    let root = generation.output.root_record().unwrap();
    assert_eq!(
        root.field("mystery").unwrap().ty,
        FieldType::Scalar(ScalarType::Integer)
    );
    assert!(generation.diagnostics.is_empty());
}

#[test]
fn test_long_type_names_abbreviated() {
    let config = GeneratorConfig {
        class_name_max_width: 8,
        ..config()
    };
    let generation = generate(&observations(), &registry(), &config).unwrap();

    assert_eq!(generation.output.root_record().unwrap().name, "Composi_");
    assert!(generation.output.find("BloodPr_").is_some());
    for (_, ty) in generation.output.types() {
        assert!(ty.name().chars().count() <= 8, "{} too long", ty.name());
    }
}

#[test]
fn test_path_not_nested() {
    let tree = TemplateNode::new("root", "Root", "COMPOSITION", "/data")
        .with_child(leaf("Stray", "DV_TEXT", "/elsewhere"));
    let template = Template {
        template_id: "t".into(),
        tree,
    };

    let err = generate(&template, &registry(), &config()).unwrap_err();
    assert_eq!(
        err,
        GenerateError::PathNotNested {
            path: "/elsewhere".into(),
            parent: "/data".into(),
        }
    );
}

#[test]
fn test_empty_template_id() {
    let mut template = template(vec![leaf("Note", "DV_TEXT", "/note")]);
    template.template_id = "  ".into();
    let err = generate(&template, &registry(), &config()).unwrap_err();
    assert_eq!(err, GenerateError::EmptyTemplateId);
}
