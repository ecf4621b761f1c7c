//! Schema types and field flattening
//!
//! The admin API describes every entity and plugin as
//! `{"fields": [{name: desc}, ...]}`, an ordered list of single-entry maps.
//! [`Schema::field_items`] flattens that into renderable [`FieldItem`]s; the
//! rule engine only ever reads an item's `key` and its raw descriptor.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::SchemaFormError;
use crate::validator::{MatchAnyRule, MatchRule, ValidatorRule};
use crate::value::{FieldValue, FormState};

/// Entity kinds with schema-driven forms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Service,
    Route,
    Consumer,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Service => "service",
            EntityKind::Route => "route",
            EntityKind::Consumer => "consumer",
        }
    }

    /// Collection segment of the admin API path, e.g. `/schemas/services`
    pub fn collection(&self) -> &'static str {
        match self {
            EntityKind::Service => "services",
            EntityKind::Route => "routes",
            EntityKind::Consumer => "consumers",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = SchemaFormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "service" => Ok(EntityKind::Service),
            "route" => Ok(EntityKind::Route),
            "consumer" => Ok(EntityKind::Consumer),
            other => Err(SchemaFormError::UnknownEntity(other.to_string())),
        }
    }
}

/// Wire type of a schema field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    String,
    Integer,
    Number,
    Boolean,
    Map,
    Set,
    Array,
    Record,
    Foreign,
}

/// Input control a field renders as
///
/// The mapping is a projection for the rendering layer; nothing in the core
/// dispatches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlKind {
    Input,
    Number,
    Checkbox,
    Select,
    MultiSelect,
    Tags,
    KeyValue,
    Record,
}

/// One field descriptor as delivered by the schema endpoint
///
/// Validation rules sit directly on the descriptor under their kind name;
/// [`SchemaFieldDesc::rules`] collects the declared ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaFieldDesc {
    #[serde(rename = "type")]
    pub field_type: FieldType,

    #[serde(default)]
    pub required: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,

    // Validation rule descriptors, one optional slot per recognized kind
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub between: Option<[f64; 2]>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub one_of: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starts_with: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub len_min: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_none: Option<MatchRule>,

    #[serde(rename = "match", default, skip_serializing_if = "Option::is_none")]
    pub match_pattern: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_all: Option<Vec<MatchRule>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_any: Option<MatchAnyRule>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mutually_exclusive_subsets: Option<Vec<Vec<String>>>,

    /// Element descriptor for `set` and `array` fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elements: Option<Box<SchemaFieldDesc>>,

    /// Nested field list for `record` fields (and record-typed elements)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<IndexMap<String, SchemaFieldDesc>>>,
}

impl SchemaFieldDesc {
    /// Collect the validation rules this descriptor declares, in the fixed
    /// kind scan order.
    pub fn rules(&self) -> Vec<ValidatorRule> {
        let mut rules = Vec::new();
        if let Some([min, max]) = self.between {
            rules.push(ValidatorRule::Between { min, max });
        }
        if let Some(values) = &self.one_of {
            rules.push(ValidatorRule::OneOf {
                values: values.clone(),
            });
        }
        if let Some(prefix) = &self.starts_with {
            rules.push(ValidatorRule::StartsWith {
                prefix: prefix.clone(),
            });
        }
        if let Some(len) = self.len_min {
            rules.push(ValidatorRule::LenMin { len });
        }
        if let Some(rule) = &self.match_none {
            rules.push(ValidatorRule::MatchNone {
                pattern: rule.pattern.clone(),
                err: rule.err.clone(),
            });
        }
        if let Some(pattern) = &self.match_pattern {
            rules.push(ValidatorRule::Match {
                pattern: pattern.clone(),
            });
        }
        if let Some(sub_rules) = &self.match_all {
            rules.push(ValidatorRule::MatchAll {
                rules: sub_rules.clone(),
            });
        }
        if let Some(rule) = &self.match_any {
            rules.push(ValidatorRule::MatchAny {
                patterns: rule.patterns.clone(),
                err: rule.err.clone(),
            });
        }
        if let Some(groups) = &self.mutually_exclusive_subsets {
            rules.push(ValidatorRule::MutuallyExclusiveSubsets {
                groups: groups.clone(),
            });
        }
        rules
    }

    /// Initial form value for this field.
    ///
    /// JSON arrays become sets for set-typed fields, lists otherwise; a
    /// field without a declared default starts out null.
    pub fn default_value(&self) -> FieldValue {
        match &self.default {
            Some(serde_json::Value::Array(items)) if self.field_type == FieldType::Set => {
                FieldValue::set(items.iter().filter_map(|v| v.as_str().map(String::from)))
            }
            Some(value) => FieldValue::from_json(value),
            None => FieldValue::Null,
        }
    }

    fn control(&self) -> ControlKind {
        match self.field_type {
            FieldType::Boolean => ControlKind::Checkbox,
            FieldType::Integer | FieldType::Number => ControlKind::Number,
            FieldType::String | FieldType::Foreign => {
                if self.one_of.is_some() {
                    ControlKind::Select
                } else {
                    ControlKind::Input
                }
            }
            FieldType::Set | FieldType::Array => {
                let element_choices = self
                    .elements
                    .as_ref()
                    .map(|el| el.one_of.is_some())
                    .unwrap_or(false);
                if element_choices {
                    ControlKind::MultiSelect
                } else {
                    ControlKind::Tags
                }
            }
            FieldType::Map => ControlKind::KeyValue,
            FieldType::Record => ControlKind::Record,
        }
    }
}

/// A flattened, renderable projection of one schema field
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldItem {
    pub key: String,
    pub label: String,
    pub field_type: FieldType,
    pub control: ControlKind,
    /// Flattened fields of record-typed elements (set/array of records)
    pub list_items: Option<Vec<FieldItem>>,
    /// Flattened fields of a record-typed field
    pub record_fields: Option<Vec<FieldItem>>,
    /// The raw descriptor; the rule engine reads rules from here
    pub desc: SchemaFieldDesc,
}

impl FieldItem {
    pub fn from_desc(key: &str, desc: &SchemaFieldDesc) -> Self {
        let list_items = desc
            .elements
            .as_ref()
            .and_then(|el| el.fields.as_ref())
            .map(|fields| flatten_fields(fields));
        let record_fields = desc.fields.as_ref().map(|fields| flatten_fields(fields));

        Self {
            key: key.to_string(),
            label: humanize(key),
            field_type: desc.field_type,
            control: desc.control(),
            list_items,
            record_fields,
            desc: desc.clone(),
        }
    }

    /// Validation rules declared on this field
    pub fn rules(&self) -> Vec<ValidatorRule> {
        self.desc.rules()
    }
}

/// An entity or plugin schema as fetched from the admin API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    pub fields: Vec<IndexMap<String, SchemaFieldDesc>>,
}

impl Schema {
    /// Flatten the schema into renderable field items, preserving field
    /// declaration order.
    pub fn field_items(&self) -> Vec<FieldItem> {
        flatten_fields(&self.fields)
    }

    /// Build the initial form state from declared defaults
    pub fn initial_state(&self) -> FormState {
        self.fields
            .iter()
            .flat_map(|entry| entry.iter())
            .map(|(key, desc)| (key.clone(), desc.default_value()))
            .collect()
    }

    /// Build form state from a JSON object, promoting arrays to sets for
    /// set-typed fields. Keys without a descriptor convert as plain JSON.
    pub fn state_from_json(&self, json: &serde_json::Value) -> FormState {
        let empty = serde_json::Map::new();
        let object = json.as_object().unwrap_or(&empty);
        object
            .iter()
            .map(|(key, value)| {
                let is_set_field = self
                    .descriptor(key)
                    .map(|desc| desc.field_type == FieldType::Set)
                    .unwrap_or(false);
                let field_value = match value {
                    serde_json::Value::Array(items) if is_set_field => FieldValue::set(
                        items.iter().filter_map(|v| v.as_str().map(String::from)),
                    ),
                    other => FieldValue::from_json(other),
                };
                (key.clone(), field_value)
            })
            .collect()
    }

    /// Descriptor for a field key, if declared
    pub fn descriptor(&self, key: &str) -> Option<&SchemaFieldDesc> {
        self.fields
            .iter()
            .flat_map(|entry| entry.iter())
            .find(|(name, _)| name.as_str() == key)
            .map(|(_, desc)| desc)
    }
}

fn flatten_fields(fields: &[IndexMap<String, SchemaFieldDesc>]) -> Vec<FieldItem> {
    fields
        .iter()
        .flat_map(|entry| entry.iter())
        .map(|(key, desc)| FieldItem::from_desc(key, desc))
        .collect()
}

/// "ca_certificates" -> "Ca Certificates"
fn humanize(key: &str) -> String {
    key.split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
