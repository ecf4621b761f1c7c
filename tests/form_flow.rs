//! End-to-end form flow tests
//!
//! Drives the full path a rendered form takes: fetch (stubbed) -> flatten
//! -> compile rules -> validate values -> react to discriminator changes.

use schema_form::{
    visible_fields, CheckResult, DiscriminatorWatch, EntityKind, FieldValue, PatternTable,
    Schema, SchemaSource, SchemaStore, ValidationMessage,
};

fn service_schema() -> Schema {
    serde_json::from_str(include_str!("fixtures/service.json")).unwrap()
}

fn route_schema() -> Schema {
    serde_json::from_str(include_str!("fixtures/route.json")).unwrap()
}

/// Run every rule declared by the schema against the given form values,
/// collecting failure messages per field.
fn check_all(schema: &Schema, state: &schema_form::FormState) -> Vec<(String, CheckResult)> {
    let patterns = PatternTable::new();
    let mut failures = Vec::new();
    for item in schema.field_items() {
        let value = state.get(&item.key).cloned().unwrap_or(FieldValue::Null);
        for rule in item.rules() {
            let result = rule.compile(&patterns).check(&value);
            if !result.is_pass() {
                failures.push((item.key.clone(), result));
            }
        }
    }
    failures
}

#[test]
fn test_service_defaults_validate_cleanly() {
    let schema = service_schema();
    let mut state = schema.initial_state();
    assert_eq!(state.get("protocol"), Some(&FieldValue::Str("http".into())));
    assert_eq!(state.get("port"), Some(&FieldValue::Number(80.0)));

    state.set("name", "my-service");
    state.set("host", "example.com");
    state.set("path", "/api");

    assert!(check_all(&schema, &state).is_empty());
}

#[test]
fn test_service_bad_values_report_per_rule() {
    let schema = service_schema();
    let mut state = schema.initial_state();
    state.set("protocol", "carrier_pigeon");
    state.set("port", 70000.0);
    state.set("path", "api//v1");

    let failures = check_all(&schema, &state);
    let messages: Vec<(&str, Option<&str>)> = failures
        .iter()
        .map(|(key, result)| (key.as_str(), result.message()))
        .collect();

    assert!(messages.contains(&(
        "protocol",
        Some("Value should be one of: grpc,grpcs,http,https,tcp,tls,tls_passthrough,udp")
    )));
    assert!(messages.contains(&("port", Some("Value should between 0 and 65535"))));
    assert!(messages.contains(&("path", Some("Value should start with: /"))));
    assert!(messages.contains(&("path", Some("must not have empty segments"))));
}

#[test]
fn test_service_protocol_transition_flow() {
    let schema = service_schema();
    let items = schema.field_items();
    let mut state = schema.initial_state();
    state.set("path", "/api");

    let mut watch = DiscriminatorWatch::new(EntityKind::Service);
    // Initial observation fires for the default protocol
    assert!(watch.observe(&mut state));

    // http keeps path but hides the tls fields
    let visible = visible_fields(EntityKind::Service, &items, &state);
    assert!(visible.iter().any(|i| i.key == "path"));
    assert!(!visible.iter().any(|i| i.key == "tls_verify"));

    // Switch to tcp: path is hidden and nulled
    state.set("protocol", "tcp");
    assert!(watch.observe(&mut state));
    assert_eq!(state.get("path"), Some(&FieldValue::Null));
    let visible = visible_fields(EntityKind::Service, &items, &state);
    assert!(!visible.iter().any(|i| i.key == "path"));

    // Switch to https: everything is back with explicit defaults
    state.set("protocol", "https");
    assert!(watch.observe(&mut state));
    assert_eq!(state.get("path"), Some(&FieldValue::Str(String::new())));
    assert_eq!(state.get("tls_verify"), Some(&FieldValue::Bool(false)));
    assert_eq!(
        state.get("ca_certificates"),
        Some(&FieldValue::List(Vec::new()))
    );
    let visible = visible_fields(EntityKind::Service, &items, &state);
    assert_eq!(visible.len(), items.len());
}

#[test]
fn test_route_protocol_selection_rules() {
    let schema = route_schema();
    let patterns = PatternTable::new();
    let protocols = schema.descriptor("protocols").unwrap();
    let rules = protocols.rules();
    assert_eq!(rules.len(), 2);
    assert_eq!(rules[0].kind(), "len_min");
    assert_eq!(rules[1].kind(), "mutually_exclusive_subsets");

    let exclusive = rules[1].compile(&patterns);
    assert!(exclusive.check(&FieldValue::set(["tcp", "udp"])).is_pass());
    assert_eq!(
        exclusive.check(&FieldValue::set(["http", "grpc"])),
        CheckResult::Fail("conflict options".to_string())
    );
    assert_eq!(
        exclusive.check(&FieldValue::set(Vec::<String>::new())),
        CheckResult::Fail("Please choose one option".to_string())
    );

    // len_min is strict: a single protocol does not satisfy len_min 1
    let len_min = rules[0].compile(&patterns);
    assert_eq!(len_min.check(&FieldValue::set(["http"])), CheckResult::Reject);
    assert!(len_min.check(&FieldValue::set(["http", "https"])).is_pass());
}

#[test]
fn test_route_discriminator_change_flow() {
    let schema = route_schema();
    let items = schema.field_items();
    let mut state = schema.initial_state();

    // Default {http, https} comes from the schema as an ordered set
    let defaults = state.get("protocols").unwrap().as_set().unwrap();
    assert_eq!(defaults.iter().next().map(String::as_str), Some("http"));

    let mut watch = DiscriminatorWatch::new(EntityKind::Route);
    assert!(watch.observe(&mut state));
    assert_eq!(state.get("destinations"), Some(&FieldValue::Null));
    assert_eq!(state.get("strip_path"), Some(&FieldValue::Bool(true)));

    // Select tcp: L7 routing fields disappear and are nulled
    state.set("protocols", FieldValue::set(["tcp"]));
    assert!(watch.observe(&mut state));
    for key in ["headers", "hosts", "methods", "paths"] {
        assert_eq!(state.get(key), Some(&FieldValue::Null), "field {}", key);
    }
    assert!(matches!(state.get("destinations"), Some(FieldValue::Set(s)) if s.is_empty()));
    assert!(matches!(state.get("sources"), Some(FieldValue::Set(s)) if s.is_empty()));

    let visible = visible_fields(EntityKind::Route, &items, &state);
    let keys: Vec<&str> = visible.iter().map(|i| i.key.as_str()).collect();
    assert!(keys.contains(&"destinations"));
    assert!(keys.contains(&"sources"));
    assert!(!keys.contains(&"hosts"));
    assert!(!keys.contains(&"paths"));
}

#[test]
fn test_values_file_round_trip() {
    let schema = route_schema();
    let values = serde_json::json!({
        "name": "my-route",
        "protocols": ["grpc", "grpcs"],
        "strip_path": true
    });
    let state = schema.state_from_json(&values);

    // Arrays promote to ordered sets for set-typed fields
    let protocols = state.get("protocols").unwrap().as_set().unwrap();
    assert_eq!(protocols.iter().next().map(String::as_str), Some("grpc"));

    let failures = check_all(&schema, &state);
    assert!(failures.is_empty(), "unexpected failures: {:?}", failures);
}

struct StaticSource;

impl SchemaSource for StaticSource {
    fn fetch_entity_schema(&self, entity: EntityKind) -> schema_form::Result<Schema> {
        match entity {
            EntityKind::Service => Ok(service_schema()),
            EntityKind::Route => Ok(route_schema()),
            other => Err(schema_form::SchemaFormError::FetchFailed {
                entity: other.to_string(),
                reason: "no fixture".to_string(),
            }),
        }
    }

    fn fetch_plugin_schema(&self, plugin: &str) -> schema_form::Result<Schema> {
        Err(schema_form::SchemaFormError::FetchFailed {
            entity: plugin.to_string(),
            reason: "no fixture".to_string(),
        })
    }

    fn validate_entity(
        &self,
        _entity: EntityKind,
        _form: &serde_json::Value,
    ) -> schema_form::Result<ValidationMessage> {
        Ok(ValidationMessage {
            message: "schema validation successful".to_string(),
        })
    }
}

#[test]
fn test_store_fronts_the_fixture_source() {
    let mut store = SchemaStore::new(StaticSource);

    let schema = store.entity_schema(EntityKind::Route).unwrap();
    assert!(schema.descriptor("protocols").is_some());

    // Absent schema is "cannot render yet", not a crash
    assert!(store.entity_schema(EntityKind::Consumer).is_none());
    assert!(store.plugin_schema("basic-auth").is_none());

    let verdict = store
        .validate_entity(EntityKind::Route, &serde_json::json!({"name": "r"}))
        .unwrap();
    assert_eq!(verdict.message, "schema validation successful");
}
