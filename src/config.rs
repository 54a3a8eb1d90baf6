use std::env;

use crate::error::AppError;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub jwt_public_key: String, // Ed25519 public key (PEM) of the identity provider
    pub auth_issuer: String,
    pub auth_audience: String,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| AppError::InternalWithMsg("DATABASE_URL must be set".into()))?;
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .map_err(|_| AppError::InternalWithMsg("PORT must be a number".into()))?;
        let jwt_public_key = env::var("JWT_PUBLIC_KEY")
            .map_err(|_| AppError::InternalWithMsg("JWT_PUBLIC_KEY must be set (Ed25519 Public Key)".into()))?;

        Ok(Self {
            database_url,
            port,
            jwt_public_key,
            auth_issuer: env::var("AUTH_ISSUER").unwrap_or_else(|_| "https://auth.studio-booking.local".to_string()),
            auth_audience: env::var("AUTH_AUDIENCE").unwrap_or_else(|_| "studio-booking".to_string()),
        })
    }
}
