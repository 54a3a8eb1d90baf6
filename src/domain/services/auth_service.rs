use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use tracing::debug;

use crate::config::Config;
use crate::domain::models::auth::{Caller, Claims};
use crate::error::AppError;

/// Verifies bearer tokens minted by the identity provider.
pub struct AuthService {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl AuthService {
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let decoding_key = DecodingKey::from_ed_pem(config.jwt_public_key.as_bytes())
            .map_err(|e| AppError::InternalWithMsg(format!("Invalid JWT public key PEM: {}", e)))?;

        let mut validation = Validation::new(Algorithm::EdDSA);
        validation.set_audience(&[config.auth_audience.as_str()]);
        validation.set_issuer(&[config.auth_issuer.as_str()]);

        Ok(Self { decoding_key, validation })
    }

    pub fn verify(&self, token: &str) -> Result<Caller, AppError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            debug!("Token rejected: {}", e);
            AppError::Unauthorized
        })?;

        Ok(Caller {
            user_id: data.claims.sub,
            tenant_id: data.claims.tenant_id,
            role: data.claims.role,
        })
    }
}
