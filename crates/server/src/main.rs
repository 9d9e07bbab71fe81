//! Noticeboard server entry point.

use std::sync::Arc;

use noticeboard_api::{AppState, app};
use noticeboard_common::Config;
use noticeboard_core::{
    AccountService, MailerService, NoOpMailer, NoticePublisher, NoticeService, NotificationFanout,
    SmtpMailer, TokenService,
};
use noticeboard_db::repositories::{AccountRepository, NoticeRepository};
use noticeboard_scheduler::{SchedulerConfig, run_scheduler};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "noticeboard=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting noticeboard server...");

    // Load configuration
    let config = Config::load()?;

    // Connect to database
    let db = noticeboard_db::init(&config).await?;
    info!("Connected to database");

    info!("Running database migrations...");
    noticeboard_db::migrate(&db).await?;
    info!("Migrations completed");

    let db = Arc::new(db);

    // Initialize repositories
    let notice_repo = NoticeRepository::new(Arc::clone(&db));
    let account_repo = AccountRepository::new(Arc::clone(&db));

    // Mail transport
    let mailer: MailerService = if config.mail.enabled {
        info!(host = %config.mail.smtp_host, port = config.mail.smtp_port, "SMTP mail enabled");
        Arc::new(SmtpMailer::from_config(&config.mail)?)
    } else {
        warn!("Mail disabled, notice notifications will only be logged");
        Arc::new(NoOpMailer)
    };

    // Initialize services
    let fanout = NotificationFanout::new(
        account_repo.clone(),
        mailer,
        config.mail.link_base_url.clone(),
    );
    let publisher = NoticePublisher::new(notice_repo.clone(), fanout);
    let token_service = TokenService::new(&config.auth);

    let state = AppState {
        notice_service: NoticeService::new(notice_repo, publisher.clone()),
        account_service: AccountService::new(account_repo, token_service.clone()),
        token_service,
        require_auth_for_reads: config.auth.require_auth_for_reads,
    };

    // Build router
    let router = app(state)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    // Start publication scheduler
    let scheduler = if config.scheduler.enabled {
        let scheduler_config = SchedulerConfig::from(&config.scheduler);
        info!(
            interval_secs = scheduler_config.publish_interval.as_secs(),
            "Starting publication scheduler"
        );
        Some(run_scheduler(scheduler_config, Arc::new(publisher)))
    } else {
        info!("Publication scheduler disabled");
        None
    };

    // Start server with graceful shutdown
    let listener =
        tokio::net::TcpListener::bind((config.server.host.as_str(), config.server.port)).await?;
    info!(public_url = %config.server.url, "Listening on {}", listener.local_addr()?);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(scheduler) = scheduler {
        scheduler.abort();
        info!("Publication scheduler stopped");
    }

    info!("Server shutdown complete");
    Ok(())
}
