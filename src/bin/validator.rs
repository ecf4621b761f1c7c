//! Form Validator CLI
//!
//! Runs schema-declared validation rules against form values and shows
//! which fields a discriminator value leaves visible.

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use schema_form::config::FormConfig;
use schema_form::{
    visible_fields, CheckResult, EntityKind, FieldItem, FieldValue, FormState, PatternTable,
    Schema,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "form-validator")]
#[command(about = "Validate form values against entity schemas")]
struct Cli {
    /// Path to a config file
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check form values against a schema's declared rules
    Check {
        /// Schema JSON file
        #[arg(short, long)]
        schema: PathBuf,
        /// Form values JSON file
        #[arg(short, long)]
        values: PathBuf,
        /// Entity kind; hidden fields are skipped when given
        #[arg(short, long)]
        entity: Option<EntityKind>,
    },

    /// Show the fields visible for the discriminator in a values file
    Fields {
        /// Schema JSON file
        #[arg(short, long)]
        schema: PathBuf,
        /// Entity kind
        #[arg(short, long)]
        entity: EntityKind,
        /// Service protocol
        #[arg(long)]
        protocol: Option<String>,
        /// Route protocols, comma separated; order is significant
        #[arg(long, value_delimiter = ',')]
        protocols: Vec<String>,
    },

    /// List the validation rules each field declares
    Rules {
        /// Schema JSON file
        #[arg(short, long)]
        schema: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = FormConfig::load_from(cli.config.as_deref())?;

    match cli.command {
        Commands::Check {
            schema,
            values,
            entity,
        } => {
            let schema = load_schema(&schema)?;
            let values_json: serde_json::Value = serde_json::from_str(
                &fs::read_to_string(&values)
                    .with_context(|| format!("reading values file {:?}", values))?,
            )?;
            let state = schema.state_from_json(&values_json);

            let patterns = PatternTable::new();
            let items = schema.field_items();
            let checked: Vec<&FieldItem> = match entity {
                Some(kind) => visible_fields(kind, &items, &state),
                None => items.iter().collect(),
            };

            let mut failures = 0;
            for item in checked {
                let value = state.get(&item.key).cloned().unwrap_or(FieldValue::Null);
                for rule in item.rules() {
                    match rule.compile(&patterns).check(&value) {
                        CheckResult::Pass => {}
                        CheckResult::Fail(msg) => {
                            failures += 1;
                            println!("❌ {} ({}): {}", item.key, rule.kind(), msg);
                        }
                        CheckResult::Reject => {
                            failures += 1;
                            println!("❌ {} ({})", item.key, rule.kind());
                        }
                    }
                }
            }

            if failures == 0 {
                println!("✅ All checks passed");
                if config.validation.server_side {
                    println!("  (server-side validation against {} not run offline)",
                        config.api.base_url);
                }
            } else {
                println!();
                println!("❌ {} check(s) failed", failures);
                std::process::exit(1);
            }
            Ok(())
        }

        Commands::Fields {
            schema,
            entity,
            protocol,
            protocols,
        } => {
            let schema = load_schema(&schema)?;
            let mut state = FormState::new();
            if let Some(protocol) = protocol {
                state.set("protocol", protocol);
            }
            if !protocols.is_empty() {
                state.set("protocols", FieldValue::set(protocols));
            }

            let items = schema.field_items();
            let visible = visible_fields(entity, &items, &state);
            println!("{} of {} fields visible:", visible.len(), items.len());
            for item in visible {
                println!("  {:<20} {:<22} {:?}", item.key, item.label, item.control);
            }
            Ok(())
        }

        Commands::Rules { schema } => {
            let schema = load_schema(&schema)?;
            for item in schema.field_items() {
                let rules = item.rules();
                if rules.is_empty() {
                    continue;
                }
                println!("{}:", item.key);
                for rule in rules {
                    println!("  {} {}", rule.kind(), serde_json::to_string(&rule)?);
                }
            }
            Ok(())
        }
    }
}

fn load_schema(path: &PathBuf) -> anyhow::Result<Schema> {
    let content =
        fs::read_to_string(path).with_context(|| format!("reading schema file {:?}", path))?;
    serde_json::from_str(&content).with_context(|| format!("parsing schema file {:?}", path))
}
