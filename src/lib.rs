//! Schema-driven form engine
//!
//! Renders configuration forms from a declarative entity/plugin schema and
//! validates user input against schema-derived rules before submission.
//!
//! ## Features
//!
//! - **Validator Factory**: compiles declared rule descriptors into pure
//!   checker functions (`one_of`, `between`, Lua-pattern matches, ...)
//! - **Pattern Table**: fixed mapping from the schema source's Lua patterns
//!   to native regex matchers, permissive on unknown entries
//! - **Conditional Fields**: protocol-driven field visibility and value
//!   resets for service and route forms
//! - **Schema Store**: per-session memoization in front of the admin API
//!   schema endpoints
//!
//! ## Data flow
//!
//! ```text
//! SchemaSource (HTTP boundary)
//!   └── SchemaStore (memoized)
//!         └── Schema::field_items() -> Vec<FieldItem>
//!               ├── FieldItem::rules() -> ValidatorRule::compile() -> Checker
//!               └── visible_fields() / DiscriminatorWatch::observe()
//! ```
//!
//! Checkers run against current form values at validation time; whether
//! that happens on submit or on field blur is the caller's choice (see
//! [`config::ValidationTrigger`]).

pub mod conditional;
pub mod config;
pub mod error;
pub mod pattern;
pub mod schema;
pub mod store;
pub mod validator;
pub mod value;

pub use conditional::{apply_discriminator_change, visible_fields, DiscriminatorWatch};
pub use error::{Result, SchemaFormError};
pub use pattern::PatternTable;
pub use schema::{ControlKind, EntityKind, FieldItem, FieldType, Schema, SchemaFieldDesc};
pub use store::{SchemaSource, SchemaStore, ValidationMessage};
pub use validator::{CheckResult, Checker, MatchAnyRule, MatchRule, ValidatorRule, VALIDATOR_KINDS};
pub use value::{FieldValue, FormState};
