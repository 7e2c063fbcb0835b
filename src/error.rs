//! Unified infrastructure error type.

use crate::config::ConfigError;

/// The error type returned by startup and [`Server::serve`](crate::Server::serve).
///
/// Request-level failures (404, 401, validation) are HTTP
/// [`Response`](crate::Response) values, not `Error`s. This type surfaces
/// what stops the process: configuration, the database, binding a port.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database: {0}")]
    Database(#[from] sqlx::Error),
    #[error("template: {0}")]
    Template(#[from] handlebars::TemplateError),
}
