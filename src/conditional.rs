//! Conditional field resolution
//!
//! Service and route forms carry a discriminator field (`protocol` scalar
//! for services, `protocols` set for routes) whose value decides which
//! other fields are relevant. The hidden-field tables here are static,
//! defined once per entity kind.
//!
//! Two code paths, strictly separated:
//! - [`visible_fields`] is the pure read side: it filters the flattened
//!   field list for the current discriminator and never touches form state.
//! - [`apply_discriminator_change`] is the only path allowed to mutate
//!   stored values, and [`DiscriminatorWatch`] ensures it runs only when
//!   the discriminator actually changed.
//!
//! Entity kinds without a discriminator behave as identity: every field
//! visible, no resets. The reset transition is idempotent, so repeated
//! notifications for the same value are harmless.

use indexmap::{IndexMap, IndexSet};
use tracing::debug;

use crate::schema::{EntityKind, FieldItem};
use crate::value::{FieldValue, FormState};

/// The service protocol that shows the full field set
const SERVICE_FULL_PROTOCOL: &str = "https";

/// Service fields hidden (nulled) per protocol
fn service_hidden_fields(protocol: &str) -> &'static [&'static str] {
    match protocol {
        "https" => &[],
        "http" | "tls_passthrough" => &["tls_verify", "ca_certificates"],
        "grpc" | "grpcs" | "tcp" | "udp" | "tls" => &["path", "tls_verify", "ca_certificates"],
        _ => &[],
    }
}

/// Route fields hidden (nulled) per first selected protocol
fn route_hidden_fields(protocol: &str) -> &'static [&'static str] {
    match protocol {
        "https" | "http" => &["destinations", "sources"],
        "grpc" | "grpcs" => &["destinations", "methods", "sources", "strip_path"],
        "tcp" | "udp" | "tls" | "tls_passthrough" => &["headers", "hosts", "methods", "paths"],
        _ => &[],
    }
}

/// Every route field under conditional control; non-hidden members are
/// reset to their type default on a protocol change
const ROUTE_CONDITIONAL_FIELDS: [&str; 7] = [
    "destinations",
    "sources",
    "headers",
    "hosts",
    "methods",
    "paths",
    "strip_path",
];

/// Filter the flattened field list down to the fields visible for the
/// current discriminator value(s). Read-only.
pub fn visible_fields<'a>(
    entity: EntityKind,
    all_fields: &'a [FieldItem],
    state: &FormState,
) -> Vec<&'a FieldItem> {
    let hidden: &[&str] = match entity {
        EntityKind::Service => match state.protocol() {
            Some(protocol) if protocol != SERVICE_FULL_PROTOCOL => service_hidden_fields(protocol),
            _ => &[],
        },
        EntityKind::Route => match state.protocols().and_then(|set| set.iter().next()) {
            Some(first) => route_hidden_fields(first),
            None => &[],
        },
        _ => &[],
    };

    all_fields
        .iter()
        .filter(|item| !hidden.contains(&item.key.as_str()))
        .collect()
}

/// Apply the reset transition for the entity's current discriminator.
///
/// This is the only code path that mutates form values. Callers should go
/// through [`DiscriminatorWatch`] so it only runs on an actual change.
pub fn apply_discriminator_change(entity: EntityKind, state: &mut FormState) {
    match entity {
        EntityKind::Service => apply_service_change(state),
        EntityKind::Route => apply_route_change(state),
        _ => {}
    }
}

fn apply_service_change(state: &mut FormState) {
    let protocol = match state.protocol() {
        Some(p) => p.to_string(),
        None => return,
    };
    debug!(protocol = %protocol, "service protocol change");

    if protocol == SERVICE_FULL_PROTOCOL {
        state.set("path", "");
        state.set("tls_verify", false);
        state.set("ca_certificates", FieldValue::List(Vec::new()));
    }
    for field in service_hidden_fields(&protocol) {
        state.set(*field, FieldValue::Null);
    }
    // http and tls_passthrough keep path visible but must never leave it
    // null
    if matches!(protocol.as_str(), "http" | "tls_passthrough") {
        let path_is_null = matches!(state.get("path"), Some(FieldValue::Null) | None);
        if path_is_null {
            state.set("path", "");
        }
    }
}

fn apply_route_change(state: &mut FormState) {
    let first = match state.protocols().and_then(|set| set.iter().next()) {
        Some(p) => p.clone(),
        None => return,
    };
    debug!(protocol = %first, "route protocols change");

    let hidden = route_hidden_fields(&first);
    for field in hidden {
        state.set(*field, FieldValue::Null);
    }
    for field in ROUTE_CONDITIONAL_FIELDS.iter().filter(|f| !hidden.contains(f)) {
        let value = match *field {
            "destinations" | "sources" | "methods" => FieldValue::Set(IndexSet::new()),
            "hosts" | "paths" => FieldValue::List(Vec::new()),
            "headers" => FieldValue::Map(IndexMap::new()),
            "strip_path" => FieldValue::Bool(true),
            _ => FieldValue::Str(String::new()),
        };
        state.set(*field, value);
    }
}

/// Watches one form's discriminator and fires the reset transition only on
/// an actual value change.
///
/// States are the distinct discriminator values plus "not set yet"; the
/// machine is re-entrant for the life of the form and has no terminal
/// state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscriminatorWatch {
    entity: EntityKind,
    last: Option<Discriminator>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Discriminator {
    Protocol(String),
    /// Selected protocols in insertion order; order participates in
    /// equality because the first element drives behavior
    Protocols(Vec<String>),
}

impl DiscriminatorWatch {
    pub fn new(entity: EntityKind) -> Self {
        Self { entity, last: None }
    }

    pub fn entity(&self) -> EntityKind {
        self.entity
    }

    fn current(&self, state: &FormState) -> Option<Discriminator> {
        match self.entity {
            EntityKind::Service => state
                .protocol()
                .map(|p| Discriminator::Protocol(p.to_string())),
            EntityKind::Route => state
                .protocols()
                .map(|set| Discriminator::Protocols(set.iter().cloned().collect())),
            _ => None,
        }
    }

    /// Observe the current form state. Runs the reset transition and
    /// returns `true` iff the discriminator moved to a new, non-empty
    /// value since the last observation.
    pub fn observe(&mut self, state: &mut FormState) -> bool {
        let current = self.current(state);
        if current.is_none() || current == self.last {
            return false;
        }
        self.last = current;
        apply_discriminator_change(self.entity, state);
        true
    }
}
