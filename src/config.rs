// src/config.rs

use std::{env, sync::Arc, time::Duration};

use anyhow::{anyhow, Context};
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::{EmployeeRepository, LedgerRepository, StatsRepository},
    services::{
        auth::AuthService,
        dashboard_events::DashboardEvents,
        employee_locks::EmployeeLocks,
        ledger_service::LedgerService,
        scheduler::StatsScheduler,
        stats_engine::StatsEngine,
        stats_query::StatsQueryService,
    },
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub db_max_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub scheduler_enabled: bool,
    pub events_channel_capacity: usize,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    // Função pura sobre uma busca de chave, para testar sem mexer no ambiente do processo
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| lookup(key).ok_or_else(|| anyhow!("{} deve ser definida", key));

        fn parsed<T: std::str::FromStr>(raw: Option<String>, key: &str, default: T) -> anyhow::Result<T>
        where
            T::Err: std::fmt::Display,
        {
            match raw {
                None => Ok(default),
                Some(value) => value
                    .trim()
                    .parse::<T>()
                    .map_err(|e| anyhow!("{} inválida ('{}'): {}", key, value, e)),
            }
        }

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
            db_max_connections: parsed(lookup("DB_MAX_CONNECTIONS"), "DB_MAX_CONNECTIONS", 5)?,
            db_acquire_timeout_secs: parsed(
                lookup("DB_ACQUIRE_TIMEOUT_SECS"),
                "DB_ACQUIRE_TIMEOUT_SECS",
                3,
            )?,
            scheduler_enabled: parsed(
                lookup("STATS_SCHEDULER_ENABLED"),
                "STATS_SCHEDULER_ENABLED",
                true,
            )?,
            events_channel_capacity: parsed(
                lookup("EVENTS_CHANNEL_CAPACITY"),
                "EVENTS_CHANNEL_CAPACITY",
                256,
            )?,
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: Arc<AppConfig>,
    pub auth_service: AuthService,
    pub stats_engine: StatsEngine,
    pub stats_query: StatsQueryService,
    pub ledger_service: LedgerService,
    pub scheduler: StatsScheduler,
    pub events: DashboardEvents,
}

impl AppState {
    pub async fn new(config: AppConfig) -> anyhow::Result<Self> {
        let db_pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(config.db_acquire_timeout_secs))
            .connect(&config.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let employees = Arc::new(EmployeeRepository::new(db_pool.clone()));
        let ledger = Arc::new(LedgerRepository::new(db_pool.clone()));
        let stats_store = Arc::new(StatsRepository::new(db_pool.clone()));

        let events = DashboardEvents::new(config.events_channel_capacity);
        let stats_engine = StatsEngine::new(
            employees.clone(),
            ledger.clone(),
            stats_store,
            EmployeeLocks::new(),
        );
        let stats_query = StatsQueryService::new(stats_engine.clone(), employees.clone());
        let ledger_service = LedgerService::new(
            employees.clone(),
            ledger,
            stats_engine.clone(),
            events.clone(),
        );
        let scheduler = StatsScheduler::new(stats_engine.clone());
        let auth_service = AuthService::new(employees, config.jwt_secret.clone());

        Ok(Self {
            db_pool,
            config: Arc::new(config),
            auth_service,
            stats_engine,
            stats_query,
            ledger_service,
            scheduler,
            events,
        })
    }
}
