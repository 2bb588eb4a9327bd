//! Database configuration module.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated with `Schema::create_table_from_entity` so the schema always
//! matches the entity definitions, and creation is idempotent (`IF NOT EXISTS`), which
//! lets the binary call it on every start.

use crate::entities::{
    Attendance, Competition, CompetitionRegistration, CompetitionResult, Convocation,
    ConvocationAthlete, ConvocationGroup, Event, EventType, FinancialEntry, Invoice,
    InvoiceItem, Movement, MovementItem, Product, Race, RaceResult, Sale, User,
};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema};
use std::path::Path;
use tracing::{debug, info, instrument};

const DEFAULT_DATABASE_URL: &str = "sqlite://data/club_ledger.sqlite?mode=rwc";

/// Gets the database URL from environment variable or returns default `SQLite` path.
///
/// This function looks for `DATABASE_URL` in the environment and falls back to
/// a default local `SQLite` file if not found.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database named by `DATABASE_URL`.
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    debug!("Connecting to database at {}", database_url);
    ensure_parent_dir(&database_url)?;
    Database::connect(&database_url).await.map_err(Into::into)
}

/// Creates the directory of a file-backed `SQLite` URL; `mode=rwc` only creates the file.
fn ensure_parent_dir(database_url: &str) -> Result<()> {
    let Some(path) = database_url.strip_prefix("sqlite://") else {
        return Ok(());
    };
    let path = path.split('?').next().unwrap_or(path);
    if let Some(parent) = Path::new(path)
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
    {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

async fn create_table<E>(db: &DatabaseConnection, schema: &Schema, entity: E) -> Result<()>
where
    E: EntityTrait,
{
    let builder = db.get_database_backend();
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(builder.build(&statement)).await?;
    Ok(())
}

/// Creates every table of the ledger if it does not exist yet.
///
/// Parents are created before children so foreign keys resolve on backends that
/// check them at DDL time.
#[instrument(skip(db))]
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let schema = Schema::new(db.get_database_backend());

    create_table(db, &schema, User).await?;
    create_table(db, &schema, EventType).await?;
    create_table(db, &schema, Event).await?;
    create_table(db, &schema, Competition).await?;
    create_table(db, &schema, Race).await?;
    create_table(db, &schema, Invoice).await?;
    create_table(db, &schema, InvoiceItem).await?;
    create_table(db, &schema, FinancialEntry).await?;
    create_table(db, &schema, CompetitionRegistration).await?;
    create_table(db, &schema, ConvocationGroup).await?;
    create_table(db, &schema, Movement).await?;
    create_table(db, &schema, MovementItem).await?;
    create_table(db, &schema, ConvocationAthlete).await?;
    create_table(db, &schema, Convocation).await?;
    create_table(db, &schema, Attendance).await?;
    create_table(db, &schema, CompetitionResult).await?;
    create_table(db, &schema, RaceResult).await?;
    create_table(db, &schema, Product).await?;
    create_table(db, &schema, Sale).await?;

    info!("Database tables ensured.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{convocation_athlete, event, invoice, movement, sale};
    use sea_orm::QuerySelect;

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        // Test that tables exist by querying them
        let _: Vec<event::Model> = Event::find().limit(1).all(&db).await?;
        let _: Vec<invoice::Model> = Invoice::find().limit(1).all(&db).await?;
        let _: Vec<movement::Model> = Movement::find().limit(1).all(&db).await?;
        let _: Vec<sale::Model> = Sale::find().limit(1).all(&db).await?;
        let _: Vec<convocation_athlete::Model> =
            ConvocationAthlete::find().limit(1).all(&db).await?;

        Ok(())
    }

    #[tokio::test]
    async fn test_create_tables_is_idempotent() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;
        create_tables(&db).await?;
        Ok(())
    }

    #[test]
    fn test_ensure_parent_dir_creates_directory() -> Result<()> {
        let dir = std::env::temp_dir().join(format!("club-ledger-{}", crate::core::new_id()));
        let url = format!("sqlite://{}/ledger.sqlite?mode=rwc", dir.display());

        ensure_parent_dir(&url)?;
        assert!(dir.is_dir());
        std::fs::remove_dir_all(&dir)?;

        // In-memory URLs have no directory
        ensure_parent_dir("sqlite::memory:")?;
        Ok(())
    }

    #[test]
    fn test_default_database_url_is_sqlite() {
        assert!(DEFAULT_DATABASE_URL.starts_with("sqlite://"));
    }
}
