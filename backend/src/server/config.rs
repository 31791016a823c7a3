//! HTTP server configuration objects.
//!
//! [`AppSettings`] is the environment-driven surface loaded via OrthoConfig;
//! [`ServerConfig`] is the resolved form handed to server construction after
//! the pool and adapters have been prepared.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

use backend::outbound::persistence::DbPool;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_MEDIA_ROOT: &str = "./media";
const DEFAULT_IDENTITY_TIMEOUT_SECS: u64 = 10;

/// Configuration values loaded from the environment at startup.
///
/// The admin allow-list lives here, not in source: operators grant admin
/// access by listing e-mail addresses in `BACKEND_ADMIN_EMAILS`.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "BACKEND")]
pub struct AppSettings {
    /// Socket address the HTTP listener binds to.
    pub bind_addr: Option<String>,
    /// PostgreSQL connection URL. Absent means fixture persistence, for
    /// local smoke runs only.
    pub database_url: Option<String>,
    /// Root directory for the filesystem object store.
    pub media_root: Option<PathBuf>,
    /// Whoami endpoint of the external identity provider.
    pub identity_endpoint: Option<String>,
    /// Timeout for identity provider calls, in seconds.
    pub identity_timeout_secs: Option<u64>,
    /// Comma-separated admin e-mail allow-list.
    #[ortho_config(default = Vec::new())]
    pub admin_emails: Vec<String>,
}

impl AppSettings {
    /// Resolved bind address.
    pub fn bind_addr(&self) -> Result<SocketAddr, std::io::Error> {
        self.bind_addr
            .as_deref()
            .unwrap_or(DEFAULT_BIND_ADDR)
            .parse()
            .map_err(|err| std::io::Error::other(format!("invalid bind address: {err}")))
    }

    /// Resolved media store root.
    pub fn media_root(&self) -> PathBuf {
        self.media_root
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MEDIA_ROOT))
    }

    /// Parsed identity endpoint, if configured.
    pub fn identity_endpoint(&self) -> Result<Option<Url>, std::io::Error> {
        self.identity_endpoint
            .as_deref()
            .map(|raw| {
                Url::parse(raw).map_err(|err| {
                    std::io::Error::other(format!("invalid identity endpoint: {err}"))
                })
            })
            .transpose()
    }

    /// Resolved identity call timeout.
    pub fn identity_timeout(&self) -> Duration {
        Duration::from_secs(
            self.identity_timeout_secs
                .unwrap_or(DEFAULT_IDENTITY_TIMEOUT_SECS)
                .max(1),
        )
    }
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) media_root: PathBuf,
    pub(crate) identity_endpoint: Option<Url>,
    pub(crate) identity_timeout: Duration,
    pub(crate) admin_emails: Vec<String>,
    pub(crate) db_pool: Option<DbPool>,
}

impl ServerConfig {
    /// Construct a server configuration from resolved settings.
    #[must_use]
    pub fn new(bind_addr: SocketAddr, media_root: PathBuf) -> Self {
        Self {
            bind_addr,
            media_root,
            identity_endpoint: None,
            identity_timeout: Duration::from_secs(DEFAULT_IDENTITY_TIMEOUT_SECS),
            admin_emails: Vec::new(),
            db_pool: None,
        }
    }

    /// Attach the identity provider endpoint and call timeout.
    #[must_use]
    pub fn with_identity_provider(mut self, endpoint: Url, timeout: Duration) -> Self {
        self.identity_endpoint = Some(endpoint);
        self.identity_timeout = timeout;
        self
    }

    /// Attach the admin e-mail allow-list.
    #[must_use]
    pub fn with_admin_emails(mut self, emails: Vec<String>) -> Self {
        self.admin_emails = emails;
        self
    }

    /// Attach a database connection pool for persistence adapters.
    ///
    /// When provided, repository-backed implementations replace the
    /// fixtures.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
