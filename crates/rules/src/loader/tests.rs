//! Tests for the rule loader module.

use std::fs;

use notify::event::{CreateKind, DataChange, ModifyKind, RemoveKind};
use notify::{Event, EventKind};
use tempfile::TempDir;

use super::watcher::handle_fs_event;
use super::*;
use crate::schema::{Operator, Rule};
use crate::store::RuleStore;

const VALID_RULES_YAML: &str = r#"
- name: Overcurrent
  parameter: Ia
  operator: ">"
  threshold: 300
- name: Undervoltage
  parameter: Va
  operator: "<"
  threshold: 200.5
"#;

fn temp_loader() -> (TempDir, RuleLoader) {
    let dir = TempDir::new().expect("create tempdir");
    let path = dir.path().join("rules.yml");
    let loader = RuleLoader::new(path, RuleStore::new());
    (dir, loader)
}

fn event_for(kind: EventKind, path: &std::path::Path) -> Event {
    Event::new(kind).add_path(path.to_path_buf())
}

#[test]
fn load_rules_preserves_order() {
    let (_dir, loader) = temp_loader();
    fs::write(loader.path(), VALID_RULES_YAML).unwrap();

    assert_eq!(loader.load().unwrap(), 2);

    let rules = loader.store().snapshot();
    assert_eq!(rules[0].name, "Overcurrent");
    assert_eq!(rules[0].operator, Operator::GreaterThan);
    assert_eq!(rules[1].name, "Undervoltage");
    assert_eq!(rules[1].threshold, 200.5);
}

#[test]
fn json_rules_are_accepted() {
    let rules = parse_rules(
        r#"[{"name": "Freq", "parameter": "f", "operator": "==", "threshold": 50}]"#,
    )
    .unwrap();
    assert_eq!(rules, vec![Rule::new("Freq", "f", "=", 50.0)]);
}

#[test]
fn unknown_operator_is_kept() {
    let rules = parse_rules(
        r#"
- name: Weird
  parameter: x
  operator: ">="
  threshold: 1
"#,
    )
    .unwrap();
    assert_eq!(rules[0].operator, Operator::Unrecognized(">=".into()));
}

#[test]
fn empty_name_or_parameter_is_rejected() {
    let err = parse_rules(
        r#"
- name: ""
  parameter: Ia
  operator: ">"
  threshold: 1
"#,
    )
    .unwrap_err();
    assert!(matches!(err, RuleError::Validation(_)));

    let err = parse_rules(
        r#"
- name: NoParam
  parameter: "  "
  operator: ">"
  threshold: 1
"#,
    )
    .unwrap_err();
    assert!(err.to_string().contains("parameter"));
}

#[test]
fn non_finite_threshold_is_rejected() {
    let err = parse_rules(
        r#"
- name: Nan
  parameter: Ia
  operator: ">"
  threshold: .nan
"#,
    )
    .unwrap_err();
    assert!(matches!(err, RuleError::Validation(_)));
}

#[test]
fn failed_load_leaves_store_untouched() {
    let (_dir, loader) = temp_loader();
    loader.store().replace(vec![Rule::new("Keep", "Ia", ">", 1.0)]);

    // Missing file.
    assert!(matches!(loader.load(), Err(RuleError::Io(_))));

    // Malformed file.
    fs::write(loader.path(), "- name: [unclosed").unwrap();
    assert!(matches!(loader.load(), Err(RuleError::Parse(_))));

    assert_eq!(loader.store().len(), 1);
    assert_eq!(loader.store().snapshot()[0].name, "Keep");
}

#[test]
fn modify_event_reloads_store() {
    let (_dir, loader) = temp_loader();
    fs::write(loader.path(), VALID_RULES_YAML).unwrap();
    loader.load().unwrap();

    fs::write(
        loader.path(),
        r#"
- name: Overfrequency
  parameter: f
  operator: ">"
  threshold: 50.5
"#,
    )
    .unwrap();

    let event = event_for(
        EventKind::Modify(ModifyKind::Data(DataChange::Content)),
        loader.path(),
    );
    let file_name = loader.path().file_name().unwrap();
    handle_fs_event(&event, loader.path(), file_name, loader.store());

    let rules = loader.store().snapshot();
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].name, "Overfrequency");
}

#[test]
fn invalid_edit_keeps_previous_rules() {
    let (_dir, loader) = temp_loader();
    fs::write(loader.path(), VALID_RULES_YAML).unwrap();
    loader.load().unwrap();

    fs::write(loader.path(), "not: [a, rule, list").unwrap();
    let event = event_for(EventKind::Create(CreateKind::File), loader.path());
    let file_name = loader.path().file_name().unwrap();
    handle_fs_event(&event, loader.path(), file_name, loader.store());

    assert_eq!(loader.store().len(), 2);
}

#[test]
fn removal_and_unrelated_files_are_ignored() {
    let (dir, loader) = temp_loader();
    fs::write(loader.path(), VALID_RULES_YAML).unwrap();
    loader.load().unwrap();
    let file_name = loader.path().file_name().unwrap();

    let other = dir.path().join("other.yml");
    fs::write(&other, "- name: Other\n  parameter: x\n  operator: '>'\n  threshold: 0\n").unwrap();
    let event = event_for(EventKind::Create(CreateKind::File), &other);
    handle_fs_event(&event, loader.path(), file_name, loader.store());
    assert_eq!(loader.store().snapshot()[0].name, "Overcurrent");

    fs::remove_file(loader.path()).unwrap();
    let event = event_for(EventKind::Remove(RemoveKind::File), loader.path());
    handle_fs_event(&event, loader.path(), file_name, loader.store());
    assert_eq!(loader.store().len(), 2);
}

#[test]
fn watch_starts_on_existing_directory() {
    let (_dir, mut loader) = temp_loader();
    fs::write(loader.path(), VALID_RULES_YAML).unwrap();
    loader.watch().unwrap();
    assert!(loader.is_watching());
}
