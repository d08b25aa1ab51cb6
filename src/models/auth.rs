//! Identity of the caller, carried in a signed access token.
//!
//! Tokens are issued by the external auth service. Pages receive them once via
//! `/auth/callback` and keep them in the identity cookie; API clients send
//! them as `Authorization: Bearer <token>`.

use std::future::{Ready, ready};

use actix_identity::IdentityExt;
use actix_web::dev::Payload;
use actix_web::error::{ErrorInternalServerError, ErrorUnauthorized};
use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, web};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::domain::types::TypeConstraintError;
use crate::domain::user::{NewUser, UserRole};
use crate::models::config::ServerConfig;

/// Claims of a verified access token.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub sub: String,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub exp: usize,
}

impl AuthenticatedUser {
    /// Verifies the signature and expiry of `token`.
    pub fn from_jwt(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        let data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(data.claims)
    }

    pub fn to_jwt(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Profile used to upsert the local user record.
    pub fn to_new_user(&self) -> Result<NewUser, TypeConstraintError> {
        NewUser::try_new(self.email.as_str(), self.name.as_str(), self.role.as_str())
    }
}

fn bearer_token(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(|token| token.trim().to_string())
}

impl FromRequest for AuthenticatedUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let Some(config) = req.app_data::<web::Data<ServerConfig>>() else {
            log::error!("Server config is not registered");
            return ready(Err(ErrorInternalServerError("misconfigured")));
        };

        let token = bearer_token(req).or_else(|| {
            req.get_identity()
                .ok()
                .and_then(|identity| identity.id().ok())
        });

        let Some(token) = token else {
            return ready(Err(ErrorUnauthorized("not signed in")));
        };

        ready(
            AuthenticatedUser::from_jwt(&token, &config.secret).map_err(|err| {
                log::warn!("Rejected access token: {err}");
                ErrorUnauthorized("invalid token")
            }),
        )
    }
}
