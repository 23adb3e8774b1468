//src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::{AppConfig, AppState};
use crate::docs::ApiDoc;
use crate::middleware::auth::auth_guard;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    // Se a configuração falhar, a aplicação não deve iniciar.
    let config = AppConfig::from_env()?;
    let app_state = AppState::new(config).await?;

    sqlx::migrate!().run(&app_state.db_pool).await?;
    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    if app_state.config.scheduler_enabled {
        app_state.scheduler.start();
    } else {
        tracing::warn!("Agendador de estatísticas desativado (STATS_SCHEDULER_ENABLED=false)");
    }

    // Rotas por funcionário (o handler confere se o principal pode acessar o id)
    let employee_routes = Router::new()
        .route("/{employee_id}/stats", get(handlers::stats::get_employee_stats))
        .route("/{employee_id}/stats/init", post(handlers::stats::initialize_stats))
        .route("/{employee_id}/sales", post(handlers::ledger::record_sale))
        .route("/{employee_id}/receipts", post(handlers::ledger::record_receipt));

    // Rotas administrativas (guarda RequireRole<AdminOnly> nos handlers)
    let admin_routes = Router::new()
        .route("/rollover/daily", post(handlers::admin::trigger_daily_rollover))
        .route("/rollover/weekly", post(handlers::admin::trigger_weekly_rollover))
        .route("/reset-monthly", post(handlers::admin::reset_monthly))
        .route("/scheduler", get(handlers::admin::scheduler_status))
        .route("/scheduler/start", post(handlers::admin::start_scheduler))
        .route("/scheduler/stop", post(handlers::admin::stop_scheduler));

    let protected = Router::new()
        .nest("/api/employees", employee_routes)
        .nest("/api/admin/stats", admin_routes)
        .route("/api/events", get(handlers::events::stream_events))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(protected)
        .with_state(app_state.clone());

    let listener = TcpListener::bind(&app_state.config.bind_addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);

    let scheduler = app_state.scheduler.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Falha ao escutar o sinal de desligamento: {}", e);
            }
            tracing::info!("Desligando...");
            scheduler.stop();
        })
        .await?;

    Ok(())
}
