//! Command-line surface of the `club-ledger` binary.
//!
//! Each command runs once against the configured database and returns the text to
//! print. Key-value commands print JSON.

use crate::{
    config::{database, settings::Settings},
    core::{calendar, event_type, key_value},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use sea_orm::DatabaseConnection;
use std::path::PathBuf;
use tracing::{info, instrument};

#[derive(Parser, Debug)]
#[command(
    name = "club-ledger",
    about = "Club ledger: billing cascades and key-value synchronisation",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Create the tables and seed the configured event types
    Init,
    /// Print the rows stored under a key as a JSON array
    Get {
        /// One of the supported keys, e.g. club-events
        key: String,
    },
    /// Replace the rows under a key with the JSON array in a file
    Set {
        key: String,
        /// JSON file holding the new array
        file: PathBuf,
        /// User recorded as creator of events without `created_by`
        #[arg(long)]
        actor: String,
    },
    /// Delete every row stored under a key
    Clear { key: String },
    /// Compute the due date for an issue date (YYYY-MM-DD)
    DueDate {
        #[arg(value_parser = parse_date)]
        date: NaiveDate,
        /// Business days to add; defaults to the configured value
        #[arg(long)]
        days: Option<u32>,
    },
}

fn parse_date(raw: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

fn unsupported(key: &str) -> Error {
    Error::Config {
        message: format!("Unsupported key '{key}'"),
    }
}

/// Runs one command and returns its output.
#[instrument(skip(db, settings))]
pub async fn execute(
    db: &DatabaseConnection,
    settings: &Settings,
    command: Command,
) -> Result<String> {
    match command {
        Command::Init => {
            database::create_tables(db).await?;
            let seeded = event_type::seed_event_types(db, &settings.event_types).await?;
            let types = event_type::get_all_event_types(db).await?;
            info!("Database initialised, {} event types seeded", seeded);
            let names: Vec<&str> = types.iter().map(|t| t.name.as_str()).collect();
            Ok(format!(
                "Database ready ({seeded} event types seeded, {} known: {})",
                types.len(),
                names.join(", ")
            ))
        }
        Command::Get { key } => {
            let value = key_value::get(db, &key)
                .await?
                .ok_or_else(|| unsupported(&key))?;
            Ok(serde_json::to_string_pretty(&value)?)
        }
        Command::Set { key, file, actor } => {
            let contents = std::fs::read_to_string(&file)?;
            let value: serde_json::Value = serde_json::from_str(&contents)?;
            let summary = key_value::set(db, &settings.billing, &key, value, &actor)
                .await?
                .ok_or_else(|| unsupported(&key))?;
            Ok(serde_json::to_string_pretty(&summary)?)
        }
        Command::Clear { key } => {
            let summary = key_value::delete(db, &key)
                .await?
                .ok_or_else(|| unsupported(&key))?;
            Ok(serde_json::to_string_pretty(&summary)?)
        }
        Command::DueDate { date, days } => {
            let days = days.unwrap_or(settings.billing.due_business_days);
            Ok(calendar::add_business_days(date, days).to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::new_id;
    use crate::test_utils::*;

    #[test]
    fn test_parse_commands() {
        let cli = Cli::try_parse_from(["club-ledger", "get", "club-events"]).unwrap();
        assert_eq!(
            cli.command,
            Command::Get {
                key: "club-events".to_string()
            }
        );

        let cli = Cli::try_parse_from([
            "club-ledger",
            "set",
            "club-presencas",
            "presencas.json",
            "--actor",
            "u1",
        ])
        .unwrap();
        assert_eq!(
            cli.command,
            Command::Set {
                key: "club-presencas".to_string(),
                file: PathBuf::from("presencas.json"),
                actor: "u1".to_string(),
            }
        );

        let cli =
            Cli::try_parse_from(["club-ledger", "due-date", "2024-01-01", "--days", "3"]).unwrap();
        assert_eq!(
            cli.command,
            Command::DueDate {
                date: ymd(2024, 1, 1),
                days: Some(3),
            }
        );
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(Cli::try_parse_from(["club-ledger", "due-date", "01/01/2024"]).is_err());
        assert!(Cli::try_parse_from(["club-ledger", "set", "club-events", "f.json"]).is_err());
        assert!(Cli::try_parse_from(["club-ledger"]).is_err());
    }

    #[tokio::test]
    async fn test_due_date_uses_configured_days() -> Result<()> {
        let db = setup_test_db().await?;
        let settings = Settings::default();

        let output = execute(
            &db,
            &settings,
            Command::DueDate {
                date: ymd(2024, 1, 1),
                days: None,
            },
        )
        .await?;
        assert_eq!(output, "2024-01-11");

        let output = execute(
            &db,
            &settings,
            Command::DueDate {
                date: ymd(2024, 1, 5),
                days: Some(1),
            },
        )
        .await?;
        assert_eq!(output, "2024-01-08");
        Ok(())
    }

    #[tokio::test]
    async fn test_set_then_get_from_file() -> Result<()> {
        let db = setup_test_db().await?;
        let settings = Settings::default();
        let path = std::env::temp_dir().join(format!("club-ledger-{}.json", new_id()));
        std::fs::write(&path, r#"[{"id": "t1", "name": "Treino"}]"#)?;

        let output = execute(
            &db,
            &settings,
            Command::Set {
                key: "club-eventos-tipos".to_string(),
                file: path.clone(),
                actor: "nobody".to_string(),
            },
        )
        .await;
        std::fs::remove_file(&path)?;
        let summary: serde_json::Value = serde_json::from_str(&output?)?;
        assert_eq!(summary["key"], "club-eventos-tipos");
        assert_eq!(summary["inserted"], 1);

        let output = execute(
            &db,
            &settings,
            Command::Get {
                key: "club-eventos-tipos".to_string(),
            },
        )
        .await?;
        let rows: serde_json::Value = serde_json::from_str(&output)?;
        assert_eq!(rows[0]["name"], "Treino");
        Ok(())
    }

    #[tokio::test]
    async fn test_init_reports_event_types() -> Result<()> {
        let db = setup_test_db().await?;
        let settings = crate::config::settings::parse_settings(
            "[[event_types]]\nname = \"Treino\"\n\n[[event_types]]\nname = \"Prova\"\n",
        )?;

        let output = execute(&db, &settings, Command::Init).await?;
        assert_eq!(
            output,
            "Database ready (2 event types seeded, 2 known: Prova, Treino)"
        );

        let output = execute(&db, &settings, Command::Init).await?;
        assert!(output.starts_with("Database ready (0 event types seeded, 2 known"));
        Ok(())
    }

    #[tokio::test]
    async fn test_unsupported_key_is_an_error() -> Result<()> {
        let db = setup_test_db().await?;
        let settings = Settings::default();

        let result = execute(
            &db,
            &settings,
            Command::Clear {
                key: "club-socios".to_string(),
            },
        )
        .await;
        assert!(matches!(result, Err(Error::Config { .. })));
        Ok(())
    }
}
