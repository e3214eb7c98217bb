//! Both pipelines over one descriptor set.

use aep_lint::{
    ConfigLayer, ConfigSequence, DescriptorInputs, DualPipeline, FileDescriptorSet, Pipeline,
    ProblemKind,
};

const LIBRARY: &str = r#"{"file": [
  {
    "name": "google/api/resource.proto",
    "package": "google.api",
    "messageType": [{"name": "ResourceDescriptor", "field": [{"name": "type_name", "number": 1}]}]
  },
  {
    "name": "acme/v1/library.proto",
    "package": "acme.v1",
    "dependency": ["google/api/resource.proto"],
    "messageType": [
      {"name": "Book", "field": [{"name": "author_name", "number": 1}, {"name": "title", "number": 2}]},
      {"name": "BookQuery"}
    ],
    "service": [{
      "name": "Library",
      "method": [
        {"name": "GetBook", "inputType": ".acme.v1.BookQuery", "outputType": ".acme.v1.GetBookResponse"},
        {"name": "GetShelf", "inputType": ".acme.v1.ShelfQuery", "outputType": ".acme.v1.ShelfResponse"}
      ]
    }],
    "sourceCodeInfo": {"location": [
      {"path": [4, 0], "span": [3, 0, 6, 1]},
      {"path": [4, 0, 2, 0], "span": [4, 2, 25]},
      {"path": [6, 0, 2, 0], "span": [10, 2, 50]},
      {"path": [6, 0, 2, 1], "span": [14, 2, 60],
       "leadingComments": " (-- api-linter: core::0131=disabled\n     aep.dev/not-precedent: test. --)\n"}
    ]}
  },
  {
    "name": "acme/v2/library.proto",
    "package": "acme.v2",
    "messageType": [{"name": "Shelf", "field": [{"name": "owner_name", "number": 1}]}]
  }
]}"#;

fn inputs(targets: &[&str]) -> DescriptorInputs {
    let set = FileDescriptorSet::parse(LIBRARY).unwrap();
    let targets: Vec<String> = targets.iter().map(ToString::to_string).collect();
    DescriptorInputs::from_set(set, &targets).unwrap()
}

fn messages(problems: &[aep_lint::Problem]) -> Vec<String> {
    problems.iter().map(|p| p.rule_id.to_string()).collect()
}

#[test]
fn both_pipelines_report_into_one_entry_per_file() {
    let pipeline = DualPipeline::with_builtin_rules(ConfigSequence::with_defaults()).unwrap();
    let results = pipeline
        .run_inputs(&inputs(&["acme/v1/library.proto", "acme/v2/library.proto"]))
        .unwrap();

    let paths: Vec<&str> = results.iter().map(|r| r.file_path.as_str()).collect();
    assert_eq!(paths, vec!["acme/v1/library.proto", "acme/v2/library.proto"]);

    let v1 = &results[0];
    // GetShelf is suppressed for core::0131 by its comment.
    assert_eq!(
        messages(&v1.legacy),
        vec![
            "core::0122::name-suffix",
            "core::0131::request-message-name",
            "core::0131::response-message-name",
        ]
    );
    assert_eq!(messages(v1.problems(Pipeline::Native)), vec!["core::0122::name-suffix"]);
    assert_eq!(v1.legacy[0].location.map(|l| l.line), Some(5));
    assert_eq!(v1.legacy[1].descriptor, "acme.v1.Library.GetBook");

    let v2 = &results[1];
    assert_eq!(v2.legacy.len(), 1);
    assert_eq!(v2.native.len(), 1);
}

#[test]
fn imports_are_never_linted() {
    let pipeline = DualPipeline::with_builtin_rules(ConfigSequence::with_defaults()).unwrap();
    let results = pipeline
        .run_inputs(&inputs(&["acme/v2/library.proto"]))
        .unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].file_path, "acme/v2/library.proto");
}

#[test]
fn config_applies_to_both_pipelines() {
    let configs = ConfigSequence::with_defaults()
        .with_overrides(&[], &["core::0122".to_string()])
        .unwrap();
    let pipeline = DualPipeline::with_builtin_rules(configs).unwrap();
    let results = pipeline
        .run_inputs(&inputs(&["acme/v1/library.proto", "acme/v2/library.proto"]))
        .unwrap();
    assert!(results[0].native.is_empty());
    assert_eq!(results[0].legacy.len(), 2);
    assert!(!results[1].has_problems());
}

#[test]
fn path_scoped_disable() {
    let mut configs = ConfigSequence::with_defaults();
    configs.push(
        ConfigLayer::builder()
            .include("acme/v2/*.proto")
            .disable("core")
            .build()
            .unwrap(),
    );
    let pipeline = DualPipeline::with_builtin_rules(configs).unwrap();
    let results = pipeline.run_inputs(&inputs(&[])).unwrap();
    let by_path = |path: &str| results.iter().find(|r| r.file_path == path).unwrap();
    assert!(by_path("acme/v1/library.proto").has_problems());
    assert!(!by_path("acme/v2/library.proto").has_problems());
    // Without targets the dependency is linted too.
    assert!(by_path("google/api/resource.proto").has_problems());
}

#[test]
fn ignore_comment_disables_reports_suppressed_problems() {
    let pipeline = DualPipeline::with_builtin_rules(ConfigSequence::with_defaults())
        .unwrap()
        .ignore_comment_disables(true);
    let results = pipeline
        .run_inputs(&inputs(&["acme/v1/library.proto"]))
        .unwrap();
    assert_eq!(results[0].legacy.len(), 5);
    assert!(results[0]
        .legacy
        .iter()
        .all(|p| p.kind == ProblemKind::Violation));
}

#[test]
fn results_serialize_with_pipeline_tags() {
    let pipeline = DualPipeline::with_builtin_rules(ConfigSequence::with_defaults()).unwrap();
    let results = pipeline
        .run_inputs(&inputs(&["acme/v2/library.proto"]))
        .unwrap();
    let json = serde_json::to_value(&results).unwrap();
    assert_eq!(json[0]["file_path"], "acme/v2/library.proto");
    assert_eq!(json[0]["legacy"][0]["rule_id"], "core::0122::name-suffix");
    assert_eq!(json[0]["native"][0]["rule_id"], "core::0122::name-suffix");
}
