use clap::Parser;
use club_ledger::{
    cli::{self, Cli},
    config::{database, settings},
    core::event_type,
    errors::Result,
};
use dotenvy::dotenv;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();

    let cli = Cli::parse();

    // 3. Load settings, falling back to defaults when config.toml is absent
    let settings = settings::load_settings_or_default("config.toml")
        .inspect_err(|e| error!("Failed to load settings: {}", e))?;

    // 4. Connect and make sure every table exists
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|()| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to initialize database: {}", e))?;

    // 5. Seed configured event types
    event_type::seed_event_types(&db, &settings.event_types)
        .await
        .inspect_err(|e| error!("Failed to seed event types: {}", e))?;

    // 6. Run the command
    let output = cli::execute(&db, &settings, cli.command)
        .await
        .inspect_err(|e| error!("Command failed: {}", e))?;
    println!("{output}");

    Ok(())
}
