//! Backend entry-point: wires REST endpoints, persistence, and OpenAPI docs.

mod server;

use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use backend::inbound::http::health::HealthState;
use backend::outbound::persistence::{run_pending_migrations, DbPool, PoolConfig};
use server::{AppSettings, ServerConfig};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load()
        .map_err(|err| std::io::Error::other(format!("configuration: {err}")))?;

    let mut config = ServerConfig::new(settings.bind_addr()?, settings.media_root())
        .with_admin_emails(settings.admin_emails.clone());

    if let Some(endpoint) = settings.identity_endpoint()? {
        config = config.with_identity_provider(endpoint, settings.identity_timeout());
    } else {
        warn!("no identity endpoint configured; all credentials will be rejected");
    }

    match settings.database_url.as_deref() {
        Some(database_url) => {
            run_pending_migrations(database_url)
                .await
                .map_err(|err| std::io::Error::other(format!("migrations: {err}")))?;
            let pool = DbPool::new(PoolConfig::new(database_url))
                .await
                .map_err(|err| std::io::Error::other(format!("database pool: {err}")))?;
            config = config.with_db_pool(pool);
        }
        None => {
            warn!("no database configured; persistence uses fixtures");
        }
    }

    let health_state = web::Data::new(HealthState::new());
    let server = server::create_server(health_state, config)?;
    info!("server started");
    server.await
}
