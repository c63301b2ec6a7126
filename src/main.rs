use std::{future::IntoFuture, pin::pin, process, sync::Arc, time::Duration};

use axum::{ServiceExt, extract::Request};
use breve::{
    application::{error::AppError, posts::PostService, render::render_service},
    config::{self, CliArgs},
    infra::{db::SqliteRepositories, error::InfraError, http, telemetry},
};
use clap::Parser;
use tokio::sync::watch;
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let cli = CliArgs::parse();
    let settings = config::load(&cli)
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    let pool = SqliteRepositories::connect(
        &settings.database.url,
        settings.database.max_connections.get(),
    )
    .await
    .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    SqliteRepositories::run_migrations(&pool)
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    let repositories = Arc::new(SqliteRepositories::new(pool));

    let posts = Arc::new(PostService::new(
        repositories.clone(),
        repositories.clone(),
        render_service(),
    ));

    let state = http::HttpState {
        posts,
        db: repositories,
    };
    let router = http::build_router(state);

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(
        target = "breve::server",
        addr = %settings.server.addr,
        base_url = %settings.server.base_url,
        "server running"
    );

    serve_until_shutdown(listener, router, settings.server.graceful_shutdown).await
}

/// Run the server until a shutdown signal arrives, then give in-flight
/// connections at most `grace` to drain before the process exits.
async fn serve_until_shutdown(
    listener: tokio::net::TcpListener,
    router: http::AppRouter,
    grace: Duration,
) -> Result<(), AppError> {
    let (drain_tx, mut drain_rx) = watch::channel(false);

    let server = axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service(router),
    )
    .with_graceful_shutdown(async move {
        shutdown_signal().await;
        let _ = drain_tx.send(true);
    });
    let mut server = pin!(server.into_future());

    tokio::select! {
        result = &mut server => {
            result.map_err(|err| AppError::unexpected(format!("server error: {err}")))?;
        }
        _ = drain_rx.changed() => {
            match tokio::time::timeout(grace, &mut server).await {
                Ok(result) => {
                    result.map_err(|err| AppError::unexpected(format!("server error: {err}")))?;
                }
                Err(_) => warn!(
                    target = "breve::server",
                    grace_seconds = grace.as_secs(),
                    "drain window elapsed, abandoning open connections"
                ),
            }
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to listen for shutdown signal");
        return;
    }
    info!(
        target = "breve::server",
        "shutdown signal received, draining connections"
    );
}
