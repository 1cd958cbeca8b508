use clap::Parser;
use std::process;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use sidequests::{AppState, Args, ServerError, resolve_db_path, router};
use sidequests_db::Database;

/// Initialize logging from `RUST_LOG`, defaulting to `info`
///
/// Examples:
/// - `RUST_LOG=debug` - show debug and above
/// - `RUST_LOG=sidequests_db=trace` - trace the store only
fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_level(true)
        .init();
}

#[tokio::main]
async fn main() {
    init_logging();

    if let Err(e) = run_app().await {
        eprintln!("error: {}", e.full_message());
        process::exit(1);
    }
}

/// Main application logic - separated for testability
async fn run_app() -> Result<(), ServerError> {
    let args = Args::parse();

    let db_path = resolve_db_path(args.db.clone());
    let db = Database::connect(&db_path).await?;
    db.init().await?;
    info!("Database ready at {}", db_path.display());

    let credentials = args.credentials();
    if !credentials.is_configured() {
        warn!("ADMIN_USERNAME / ADMIN_PASSWORD not set; every login will be rejected");
    }

    let app = router(AppState::new(db, credentials));

    let addr = args.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|source| ServerError::Serve {
            addr: addr.clone(),
            source,
        })?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|source| ServerError::Serve { addr, source })?;

    info!("Server shut down");
    Ok(())
}

/// Resolves on Ctrl-C. Never resolves if the handler can't be installed.
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl-C, shutting down"),
        Err(e) => {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
