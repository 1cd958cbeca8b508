//! Command-line and environment configuration

use std::path::PathBuf;

use clap::Parser;
use sidequests_db::Database;

/// Environment variable name for the database path
pub const DB_PATH_ENV: &str = "SIDEQUESTS_DB_PATH";

/// SideQuests - ranked quest and objective lists
#[derive(Parser, Debug)]
#[command(name = "sidequests")]
#[command(version)]
#[command(about = "Ranked quest and objective lists served over HTTP", long_about = None)]
pub struct Args {
    /// Path to the database directory (can also be set via SIDEQUESTS_DB_PATH env var)
    #[arg(long)]
    pub db: Option<PathBuf>,

    /// Bind address
    #[arg(long, default_value = "0.0.0.0", env = "SIDEQUESTS_HOST")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = 8080, env = "SIDEQUESTS_PORT")]
    pub port: u16,

    /// Username accepted at the login form
    #[arg(long, env = "ADMIN_USERNAME")]
    pub admin_username: Option<String>,

    /// Password accepted at the login form
    #[arg(long, env = "ADMIN_PASSWORD", hide_env_values = true)]
    pub admin_password: Option<String>,
}

impl Args {
    /// Socket address string to bind, e.g. `0.0.0.0:8080`
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Admin credentials from the parsed arguments
    pub fn credentials(&self) -> Credentials {
        Credentials {
            username: self.admin_username.clone(),
            password: self.admin_password.clone(),
        }
    }
}

/// The single admin account allowed to log in
#[derive(Clone, Default)]
pub struct Credentials {
    username: Option<String>,
    password: Option<String>,
}

impl Credentials {
    /// Credentials that accept exactly `username` / `password`
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            password: Some(password.into()),
        }
    }

    /// Whether both username and password are configured
    pub fn is_configured(&self) -> bool {
        self.username.is_some() && self.password.is_some()
    }

    /// Check a login attempt. Always false when unconfigured.
    pub fn verify(&self, username: &str, password: &str) -> bool {
        match (&self.username, &self.password) {
            (Some(expected_user), Some(expected_pass)) => {
                expected_user == username && expected_pass == password
            }
            _ => false,
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Get the database path from command line, environment variable, or default.
///
/// Priority:
/// 1. Command line --db argument
/// 2. SIDEQUESTS_DB_PATH environment variable (if non-empty)
/// 3. Default path (`.sidequests/data` under the working directory)
pub fn resolve_db_path(cli_db: Option<PathBuf>) -> PathBuf {
    if let Some(path) = cli_db {
        return path;
    }

    if let Ok(env_path) = std::env::var(DB_PATH_ENV)
        && !env_path.is_empty()
    {
        return PathBuf::from(env_path);
    }

    Database::default_path()
}
