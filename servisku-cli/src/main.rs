//! servisku CLI - repair-shop backend server and admin utilities
//!
//! Subcommands:
//! - `serve`: run the HTTP API server
//! - `seed-admin`: create the first admin-role account

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing::info;

use servisku_core::{hash_password, ROLE_ADMIN};
use servisku_server::{serve, ServerConfig};

mod tracing_setup;

#[derive(Parser, Debug)]
#[command(
    name = "servisku",
    author,
    version,
    about = "Backend for a phone-repair shop: tickets, inventory, staff, and reports"
)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API server
    Serve(ServeArgs),
    /// Create an admin-role user account
    SeedAdmin(SeedAdminArgs),
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Port to listen on (overrides SERVISKU_PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Bind address (overrides SERVISKU_HOST)
    #[arg(short, long)]
    bind: Option<String>,

    /// Database URL (overrides DATABASE_URL)
    #[arg(long)]
    database_url: Option<String>,
}

#[derive(Args, Debug)]
struct SeedAdminArgs {
    #[arg(long)]
    username: String,

    #[arg(long)]
    password: String,

    /// Display name; defaults to the username
    #[arg(long)]
    nama: Option<String>,

    /// Database URL (overrides DATABASE_URL)
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    tracing_setup::init_tracing(cli.debug)?;

    match cli.command {
        Commands::Serve(args) => {
            let mut config = ServerConfig::default();
            if let Some(port) = args.port {
                config.port = port;
            }
            if let Some(bind) = args.bind {
                config.host = bind;
            }
            if let Some(url) = args.database_url {
                config.database_url = url;
            }
            serve(config).await.context("server failed")?;
        }
        Commands::SeedAdmin(args) => seed_admin(args).await?,
    }

    Ok(())
}

async fn seed_admin(args: SeedAdminArgs) -> Result<()> {
    let database_url = args
        .database_url
        .unwrap_or_else(|| ServerConfig::default().database_url);

    let options: SqliteConnectOptions = database_url
        .parse::<SqliteConnectOptions>()
        .context("invalid database URL")?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .context("failed to open database")?;

    servisku_server::migrations::run(&pool).await?;

    let exists: Option<(String,)> = sqlx::query_as("SELECT username FROM user WHERE username = ?")
        .bind(&args.username)
        .fetch_optional(&pool)
        .await?;
    if exists.is_some() {
        anyhow::bail!("user '{}' already exists", args.username);
    }

    let hashed = hash_password(&args.password)?;
    let nama = args.nama.unwrap_or_else(|| args.username.clone());

    sqlx::query("INSERT INTO user (nama, username, password, role) VALUES (?, ?, ?, ?)")
        .bind(&nama)
        .bind(&args.username)
        .bind(&hashed)
        .bind(ROLE_ADMIN)
        .execute(&pool)
        .await?;

    info!("Admin user '{}' created", args.username);
    Ok(())
}
