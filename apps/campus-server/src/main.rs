use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use runtime::{AppConfig, CliArgs, DatabaseConfig};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use axum::{routing::get, Extension, Json, Router};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use tower_http::{
    cors::CorsLayer, limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer,
};

use events::domain::ports::Notifier;
use events::infra::email::{LogNotifier, SmtpNotifier};
use users::api::rest::auth::AuthCodec;
use users::config::UsersConfig;
use users::contract::client::UsersApi;
use users::gateways::local::UsersLocalClient;

/// Expand a sqlite DSN into an absolute-path DSN using a base directory.
/// - Keeps "sqlite::memory:" as-is.
/// - Normalizes backslashes into forward slashes (important on Windows).
fn absolutize_sqlite_dsn(dsn: &str, base_dir: &Path, create_dirs: bool) -> Result<String> {
    if dsn.eq_ignore_ascii_case("sqlite::memory:") || dsn.eq_ignore_ascii_case("sqlite://:memory:")
    {
        return Ok("sqlite::memory:".to_string());
    }
    let db_path = dsn
        .strip_prefix("sqlite://")
        .ok_or_else(|| anyhow!("DSN must start with sqlite:// (got: {})", dsn))?;

    let (path_str, query) = match db_path.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (db_path, None),
    };

    let mut p = PathBuf::from(path_str);
    if p.as_os_str().is_empty() {
        return Err(anyhow!("Empty SQLite path in DSN"));
    }
    if p.is_relative() {
        p = base_dir.join(p);
    }

    if let Some(dir) = p.parent() {
        if create_dirs {
            std::fs::create_dir_all(dir)?;
        }
    }

    // Rebuild DSN with absolute path and normalized slashes; "mode=rwc"
    // lets SQLite create the file on first start.
    let mut out = String::from("sqlite://");
    out.push_str(&p.to_string_lossy().replace('\\', "/"));
    match query {
        Some(q) if q.contains("mode=") => {
            out.push('?');
            out.push_str(q);
        }
        Some(q) => {
            out.push_str("?mode=rwc&");
            out.push_str(q);
        }
        None => out.push_str("?mode=rwc"),
    }
    Ok(out)
}

/// Detect DB backend from URL scheme (sqlite/postgres/mysql).
fn detect_from_dsn(cfg: &DatabaseConfig) -> Result<&'static str> {
    let raw = cfg.url.trim();
    if raw.is_empty() {
        return Err(anyhow!("Database URL not configured"));
    }

    // "sqlite::memory:" has no authority part, so split on the first colon.
    let scheme = raw.split(':').next().unwrap_or_default();
    match scheme.to_ascii_lowercase().as_str() {
        "sqlite" | "sqlite3" => Ok("sqlite"),
        "postgres" | "postgresql" => Ok("postgres"),
        "mysql" | "mariadb" => Ok("mysql"),
        other => Err(anyhow!("Unsupported database type: {}", other)),
    }
}

/// Campus Events Server - college event management backend
#[derive(Parser)]
#[command(name = "campus-server")]
#[command(about = "Campus Events Server - college event management backend")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Use an in-memory database
    #[arg(long)]
    mock: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Check configuration
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // CLI args passed down to config/app
    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        port: cli.port,
        print_config: cli.print_config,
        verbose: cli.verbose,
        mock: cli.mock,
    };

    // Load configuration (normalized home_dir is applied inside)
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;

    // Apply CLI overrides (port / verbosity)
    config.apply_cli_overrides(&args);

    // Initialize logging
    let logging_config = config.logging.as_ref().cloned().unwrap_or_default();
    runtime::logging::init_logging_from_config(&logging_config, Path::new(&config.server.home_dir));
    tracing::info!("Campus Events Server starting");

    // Print config and exit if requested
    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    // Execute command
    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config, args).await,
        Commands::Check => check_config(config).await,
    }
}

async fn connect_database(config: &AppConfig, args: &CliArgs) -> Result<DatabaseConnection> {
    let db_config = config
        .database
        .clone()
        .ok_or_else(|| anyhow!("No database configuration found"))?;

    let _backend = detect_from_dsn(&db_config)?;

    // Use URL from config; override with in-memory SQLite when --mock is set
    let mut final_dsn = if args.mock {
        "sqlite::memory:".to_string()
    } else {
        db_config.url.trim().to_owned()
    };

    // Absolutize sqlite DSNs to avoid cwd issues
    if final_dsn.starts_with("sqlite://") {
        let base_dir = PathBuf::from(&config.server.home_dir);
        final_dsn = absolutize_sqlite_dsn(&final_dsn, &base_dir, true)?;
    }

    let mut opts = ConnectOptions::new(final_dsn.clone());
    opts.max_connections(db_config.max_conns.unwrap_or(10))
        .acquire_timeout(Duration::from_secs(5));

    tracing::info!("Connecting to database: {}", final_dsn);
    let db = Database::connect(opts).await?;

    users::infra::storage::migrations::Migrator::up(&db, None).await?;
    events::infra::storage::migrations::Migrator::up(&db, None).await?;
    tracing::info!("Database migrations applied");

    Ok(db)
}

fn build_router(config: &AppConfig, db: DatabaseConnection) -> Result<Router> {
    let users_config = UsersConfig {
        registration_number_digits: config.auth.registration_number_digits,
        admin_email: config.auth.admin_email.clone(),
        admin_password: config.auth.admin_password.clone(),
        ..UsersConfig::default()
    };

    let users_repo = Arc::new(users::infra::storage::sea_orm_repo::SeaOrmUsersRepository::new(
        db.clone(),
    ));
    let users_service = Arc::new(users::domain::service::Service::new(
        users_repo,
        users_config,
    ));
    let users_client: Arc<dyn UsersApi> = Arc::new(UsersLocalClient::new(users_service.clone()));

    let notifier: Arc<dyn Notifier> = match &config.email {
        Some(email) => Arc::new(SmtpNotifier::new(
            &email.smtp_host,
            email.smtp_port,
            email.username.clone(),
            email.password.clone(),
            &email.from_name,
            &email.from_address,
        )?),
        None => Arc::new(LogNotifier),
    };

    let events_repo = Arc::new(
        events::infra::storage::sea_orm_repo::SeaOrmEventsRepository::new(db),
    );
    let events_service = Arc::new(events::domain::service::Service::new(
        events_repo,
        users_client,
        notifier,
        events::config::EventsConfig::default(),
    ));

    let codec = Arc::new(AuthCodec::new(
        &config.auth.jwt_secret,
        config.auth.token_ttl_hours,
    ));

    let api = users::api::rest::routes::router(users_service)
        .merge(events::api::rest::routes::router(events_service));

    let timeout = match config.server.timeout_sec {
        0 => 30,
        n => n,
    };

    let router = Router::new()
        .route("/health", get(health_check))
        .nest("/api", api)
        .layer(Extension(codec))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(timeout)))
        .layer(CorsLayer::permissive())
        .layer(RequestBodyLimitLayer::new(16 * 1024 * 1024));

    Ok(router)
}

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn run_server(config: AppConfig, args: CliArgs) -> Result<()> {
    let db = connect_database(&config, &args).await?;
    let router = build_router(&config, db)?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = wait_for_shutdown().await {
                tracing::error!("Shutdown signal handling failed: {}", e);
            }
            tracing::info!("Shutting down");
        })
        .await?;

    Ok(())
}

async fn check_config(config: AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");

    if let Some(db_config) = &config.database {
        detect_from_dsn(db_config)?;
    }

    tracing::info!("Configuration is valid");
    println!("Configuration check passed");
    println!("{}", config.to_yaml()?);

    Ok(())
}

async fn wait_for_shutdown() -> Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigint = signal(SignalKind::interrupt())?; // Ctrl+C
        tokio::select! {
            _ = sigterm.recv() => {},
            _ = sigint.recv()  => {},
            _ = tokio::signal::ctrl_c() => {}, // fallback
        }
        Ok(())
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
        Ok(())
    }
}
