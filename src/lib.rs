//! SideQuests server library
//!
//! Exposes the router and its state so integration tests can drive the
//! service without binding a socket. The binary is in `main.rs`.

pub mod config;
mod error;
pub mod routes;
pub mod session;
pub mod templates;

pub use config::{Args, Credentials, resolve_db_path};
pub use error::ServerError;
pub use routes::{AppState, router};
pub use session::SessionStore;
