//! Server configuration read from the command line and the environment.

use std::env;

use axum::http::{
    HeaderValue, Method,
    header::{AUTHORIZATION, CONTENT_TYPE},
};
use clap::Parser;
use tower_http::cors::CorsLayer;

use crate::{Error, auth::TokenKeys};

/// The name of the environment variable holding the token signing secret.
pub const JWT_SECRET_VAR: &str = "JWT_SECRET";

/// The REST API server for budget_planner.
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// File path to the application SQLite database.
    #[arg(long, env = "DATABASE_PATH")]
    pub db_path: String,

    /// The port to serve the API from.
    #[arg(short, long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// The origin allowed to make cross-origin requests, e.g. the web frontend.
    #[arg(long, env = "ALLOWED_ORIGIN", default_value = "http://localhost:3000")]
    pub allowed_origin: String,
}

impl Config {
    /// Build the token keys from the `JWT_SECRET` environment variable.
    ///
    /// The secret is only read from the environment so that it does not show
    /// up in the process list.
    ///
    /// # Errors
    ///
    /// Returns [Error::MissingSecret] if the variable is unset or empty.
    pub fn token_keys(&self) -> Result<TokenKeys, Error> {
        let secret = env::var(JWT_SECRET_VAR).map_err(|_| Error::MissingSecret)?;

        TokenKeys::new(&secret)
    }

    /// Build a CORS layer that lets the configured origin call the API.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidOrigin] if the origin is not a valid header value.
    pub fn cors_layer(&self) -> Result<CorsLayer, Error> {
        let origin = self
            .allowed_origin
            .parse::<HeaderValue>()
            .map_err(|_| Error::InvalidOrigin(self.allowed_origin.clone()))?;

        Ok(CorsLayer::new()
            .allow_origin(origin)
            .allow_headers([AUTHORIZATION, CONTENT_TYPE])
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE]))
    }
}
