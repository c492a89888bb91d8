use std::{path::PathBuf, sync::Arc};

use anyhow::Context;
use clap::{Parser, Subcommand};

use recipe_api::{
    actions::users,
    config::Config,
    jwt::AuthKeys,
    logging,
    memory::MemoryRepository,
    postgres::{self, PgRepository},
    repository::Repository,
    routes,
    state::AppState,
    wait_for_db::{wait_for_db, WaitOptions},
};

#[derive(Parser)]
#[command(name = "recipe_api")]
#[command(about = "Recipe and user account REST service")]
#[command(version)]
struct Cli {
    /// Path to a TOML config file (defaults to ./config.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply migrations and serve the HTTP API
    Serve {
        /// Keep everything in memory instead of connecting to PostgreSQL
        #[arg(long)]
        in_memory: bool,
    },
    /// Apply pending database migrations
    Migrate,
    /// Block until the database accepts connections
    WaitForDb {
        /// Give up after this many attempts
        #[arg(long)]
        max_attempts: Option<u32>,
    },
    /// Create a user with staff and superuser permissions
    CreateSuperuser {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long, default_value = "")]
        name: String,
    },
}

async fn connect(config: &Config) -> anyhow::Result<PgRepository> {
    let url = config.database_url()?;
    let pool = postgres::connect(url, config.database.max_connections)
        .await
        .context("failed to connect to database")?;

    Ok(PgRepository::new(pool))
}

async fn serve(config: Config, in_memory: bool) -> anyhow::Result<()> {
    let repo: Arc<dyn Repository> = if in_memory {
        log::warn!("Using in-memory storage; data is lost on exit");
        Arc::new(MemoryRepository::new())
    } else {
        let repo = connect(&config).await?;
        postgres::migrate(repo.pool()).await?;
        Arc::new(repo)
    };

    let keys = AuthKeys::new(&config.signing_secret(), config.token_lifetime())?;
    let state = AppState::new(repo, keys);
    let address = config.bind_address()?;

    let (address, server) = warp::serve(routes::api(state)).bind_with_graceful_shutdown(
        address,
        async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                log::error!("Failed to listen for shutdown signal: {e}");
            }
        },
    );
    log::info!("Listening on http://{address}");
    server.await;
    log::info!("Server stopped");

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    logging::init_logging();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve { in_memory } => serve(config, in_memory).await?,
        Commands::Migrate => {
            let repo = connect(&config).await?;
            postgres::migrate(repo.pool()).await?;
        }
        Commands::WaitForDb { max_attempts } => {
            let options = WaitOptions {
                max_attempts,
                ..WaitOptions::default()
            };
            wait_for_db(config.database_url()?, options).await?;
        }
        Commands::CreateSuperuser {
            email,
            password,
            name,
        } => {
            let repo = connect(&config).await?;
            let user = users::create_superuser(&repo, &email, &password, &name).await?;
            println!("Superuser {} created", user.email);
        }
    }

    Ok(())
}
