mod config;
mod plan_cmds;
mod serve_cmd;

#[cfg(test)]
mod test_util;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use sqlx::PgPool;

use dayplan_core::model::{ModelConfig, OpenAiChatModel};
use dayplan_core::schedule::{ScheduleConfig, ScheduleService};
use dayplan_db::pool;

use config::DayplanConfig;

#[derive(Parser)]
#[command(name = "dayplan", about = "LLM-backed daily planner")]
struct Cli {
    /// Database URL (overrides DAYPLAN_DATABASE_URL env var)
    #[arg(long, global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a dayplan config file (no database required)
    Init {
        /// PostgreSQL connection URL
        #[arg(long, default_value = "postgresql://localhost:5432/dayplan")]
        db_url: String,
        /// Model identifier to request from the chat-completions API
        #[arg(long)]
        model: Option<String>,
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Initialize the dayplan database (requires config file or env vars)
    DbInit,
    /// Run the HTTP API
    Serve {
        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        bind: String,
        /// Port to listen on
        #[arg(long, default_value_t = 8000)]
        port: u16,
    },
    /// Plan a day from a free-text description
    Plan {
        /// What needs doing today
        description: String,
        /// Start time of the first task (HH:MM)
        #[arg(long, default_value = "09:00")]
        start: String,
    },
    /// Show a stored task list with completion marks
    Show {
        /// Task list ID
        list_id: String,
    },
}

/// Execute the `dayplan init` command: write config file.
fn cmd_init(db_url: &str, model: Option<String>, force: bool) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let cfg = config::ConfigFile {
        database: config::DatabaseSection {
            url: db_url.to_string(),
        },
        llm: config::LlmSection {
            model: model.clone(),
            ..Default::default()
        },
    };

    config::save_config_to(&path, &cfg)?;

    println!("Config written to {}", path.display());
    println!("  database.url = {db_url}");
    println!(
        "  llm.model = {}",
        model.as_deref().unwrap_or(ModelConfig::DEFAULT_MODEL)
    );
    println!();
    println!(
        "Set {} (or llm.api_key in the config file) before planning.",
        ModelConfig::API_KEY_ENV
    );
    println!("Next: run `dayplan db-init` to create and migrate the database.");

    Ok(())
}

/// Execute the `dayplan db-init` command: create database and run migrations.
async fn cmd_db_init(cli_db_url: Option<&str>) -> anyhow::Result<()> {
    let resolved = DayplanConfig::resolve(cli_db_url)?;

    println!("Initializing dayplan database...");

    pool::ensure_database_exists(&resolved.db_config).await?;
    let db_pool = pool::create_pool(&resolved.db_config).await?;
    pool::run_migrations(&db_pool).await?;

    let (lists, tasks) = pool::row_counts(&db_pool).await?;
    println!("Database ready.");
    println!("  task_lists: {lists} rows");
    println!("  tasks: {tasks} rows");

    db_pool.close().await;

    println!("dayplan db-init complete.");
    Ok(())
}

/// Wire the configured model and the pool into a schedule service.
fn build_service(db_pool: &PgPool, model_config: &ModelConfig) -> anyhow::Result<ScheduleService> {
    let model = OpenAiChatModel::new(model_config.clone())?;
    tracing::debug!(config = ?model_config, "model client ready");
    Ok(ScheduleService::new(
        db_pool.clone(),
        Arc::new(model),
        ScheduleConfig {
            model_timeout: model_config.timeout,
        },
    ))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init {
            db_url,
            model,
            force,
        } => {
            cmd_init(&db_url, model, force)?;
        }
        Commands::DbInit => {
            cmd_db_init(cli.database_url.as_deref()).await?;
        }
        Commands::Serve { bind, port } => {
            let resolved = DayplanConfig::resolve(cli.database_url.as_deref())?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let result = match build_service(&db_pool, &resolved.model_config) {
                Ok(service) => serve_cmd::run_serve(service, &bind, port).await,
                Err(e) => Err(e),
            };
            db_pool.close().await;
            result?;
        }
        Commands::Plan { description, start } => {
            let resolved = DayplanConfig::resolve(cli.database_url.as_deref())?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let result = match build_service(&db_pool, &resolved.model_config) {
                Ok(service) => plan_cmds::run_plan(&service, &description, &start).await,
                Err(e) => Err(e),
            };
            db_pool.close().await;
            result?;
        }
        Commands::Show { list_id } => {
            let resolved = DayplanConfig::resolve(cli.database_url.as_deref())?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let result = plan_cmds::run_show(&db_pool, &list_id).await;
            db_pool.close().await;
            result?;
        }
    }

    Ok(())
}
