/*
 * Responsibility
 * - .env -> tracing -> Config -> panic hook -> Router
 * - Bind the listener and serve until Ctrl-C / SIGTERM
 */
use std::any::Any;
use std::future::Future;
use std::path::Path;
use std::{panic, process};

use axum::Router;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::config::{self, Config};
use crate::error::AppError;

const DEFAULT_LOG_FILTER: &str = "info";

/// Everything that must be read from the environment before the server starts.
///
/// `.env` is loaded first so `RUST_LOG` and the `Config` keys can both come from it.
fn prepare(env_file: Option<&Path>) -> Result<(Config, EnvFilter), AppError> {
    config::load_env_file(env_file)?;

    // RUST_LOG wins when set, e.g.
    // RUST_LOG=info,hello_logging=debug cargo run
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let config = Config::from_env()?;

    Ok((config, filter))
}

fn init_tracing(filter: EnvFilter) {
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

/// Report panics through tracing, then hand them to the default hook.
///
/// With `abort_on_panic` the process aborts instead. That is only wanted when
/// someone asked for it with `APP_ENV=development`; otherwise a panicking
/// request only loses its own connection task.
fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        let location = info
            .location()
            .map(ToString::to_string)
            .unwrap_or_default();
        tracing::error!(
            payload = panic_message(info.payload()),
            %location,
            abort = abort_on_panic,
            "panic"
        );

        if abort_on_panic {
            process::abort();
        }
        default_hook(info);
    }))
}

pub async fn run() -> Result<(), AppError> {
    let (config, filter) = prepare(None)?;
    init_tracing(filter);
    init_panic_hook(config.abort_on_panic);

    let listener = TcpListener::bind(config.addr)
        .await
        .map_err(|source| AppError::Bind {
            addr: config.addr,
            source,
        })?;

    tracing::info!(
        "starting API in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    serve(listener, api::routes(), shutdown_signal()).await?;

    tracing::info!("server stopped");
    Ok(())
}

/// Serve `router` on `listener` until `shutdown` resolves.
///
/// In-flight requests are allowed to finish before this returns.
pub async fn serve<F>(listener: TcpListener, router: Router, shutdown: F) -> Result<(), AppError>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(AppError::Serve)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
