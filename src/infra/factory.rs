use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use sqlx::{postgres::{PgPoolOptions, PgConnectOptions}, sqlite::{SqlitePoolOptions, SqliteJournalMode, SqliteConnectOptions}};
use sqlx::{PgPool, SqlitePool, ConnectOptions};
use tracing::info;
use tracing::log::LevelFilter;

use crate::config::Config;
use crate::error::AppError;
use crate::state::AppState;
use crate::domain::services::auth_service::AuthService;
use crate::infra::repositories::{
    postgres_tenant_repo::PostgresTenantRepo, postgres_member_repo::PostgresMemberRepo,
    postgres_instructor_repo::PostgresInstructorRepo, postgres_class_repo::PostgresClassRepo,
    postgres_reservation_repo::PostgresReservationRepo,
    sqlite_tenant_repo::SqliteTenantRepo, sqlite_member_repo::SqliteMemberRepo,
    sqlite_instructor_repo::SqliteInstructorRepo, sqlite_class_repo::SqliteClassRepo,
    sqlite_reservation_repo::SqliteReservationRepo,
};

pub async fn bootstrap_state(config: &Config) -> Result<AppState, AppError> {
    let database_url = &config.database_url;

    if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        info!("Initializing PostgreSQL connection...");

        let opts: PgConnectOptions = database_url.parse()
            .map_err(|e| AppError::InternalWithMsg(format!("Invalid Postgres URL: {}", e)))?;
        let opts = opts.log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect_with(opts)
            .await?;

        run_postgres_migrations(&pool).await?;
        postgres_state(pool, config)
    } else {
        info!("Initializing SQLite connection with WAL Mode...");

        let opts = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| AppError::InternalWithMsg(format!("Invalid SQLite connection string: {}", e)))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5))
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await?;

        run_sqlite_migrations(&pool).await?;
        sqlite_state(pool, config)
    }
}

/// Builds the state over an already migrated Postgres pool.
pub fn postgres_state(pool: PgPool, config: &Config) -> Result<AppState, AppError> {
    Ok(AppState {
        config: config.clone(),
        tenant_repo: Arc::new(PostgresTenantRepo::new(pool.clone())),
        member_repo: Arc::new(PostgresMemberRepo::new(pool.clone())),
        instructor_repo: Arc::new(PostgresInstructorRepo::new(pool.clone())),
        class_repo: Arc::new(PostgresClassRepo::new(pool.clone())),
        reservation_repo: Arc::new(PostgresReservationRepo::new(pool)),
        auth_service: Arc::new(AuthService::new(config)?),
    })
}

/// Builds the state over an already migrated SQLite pool.
pub fn sqlite_state(pool: SqlitePool, config: &Config) -> Result<AppState, AppError> {
    Ok(AppState {
        config: config.clone(),
        tenant_repo: Arc::new(SqliteTenantRepo::new(pool.clone())),
        member_repo: Arc::new(SqliteMemberRepo::new(pool.clone())),
        instructor_repo: Arc::new(SqliteInstructorRepo::new(pool.clone())),
        class_repo: Arc::new(SqliteClassRepo::new(pool.clone())),
        reservation_repo: Arc::new(SqliteReservationRepo::new(pool)),
        auth_service: Arc::new(AuthService::new(config)?),
    })
}

pub async fn run_postgres_migrations(pool: &PgPool) -> Result<(), AppError> {
    sqlx::migrate!("./migrations/postgres")
        .run(pool)
        .await
        .map_err(|e| AppError::InternalWithMsg(format!("Postgres migrations failed: {}", e)))
}

pub async fn run_sqlite_migrations(pool: &SqlitePool) -> Result<(), AppError> {
    sqlx::migrate!("./migrations/sqlite")
        .run(pool)
        .await
        .map_err(|e| AppError::InternalWithMsg(format!("SQLite migrations failed: {}", e)))
}
