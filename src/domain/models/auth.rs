use serde::{Deserialize, Serialize};

use super::member::Role;

/// Claims issued by the identity provider.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String,
    pub sub: String,
    pub aud: String,
    pub exp: usize,
    pub iat: usize,

    #[serde(rename = "https://studio-booking.app/claims/tenant_id")]
    pub tenant_id: String,

    #[serde(rename = "https://studio-booking.app/claims/role")]
    pub role: Role,
}

/// The authenticated caller of a request.
#[derive(Debug, Clone)]
pub struct Caller {
    pub user_id: String,
    pub tenant_id: String,
    pub role: Role,
}

impl Caller {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
