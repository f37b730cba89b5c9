//! Session token codec.
//!
//! Sessions travel as HS256-signed JWTs with the claims
//! `{id, root, token_type, exp}`. Decoding fails closed: anything that is not
//! a well-formed, correctly signed, unexpired token is rejected.

use crate::domain::config::SessionConfig;
use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use shared_types::SessionType;
use std::fmt;
use thiserror::Error;

/// Decoded identity of a caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub subject_id: String,
    pub is_root_admin: bool,
    pub session_type: SessionType,
    /// Unix seconds. `0` until the session is signed.
    pub expires_at: i64,
}

impl Session {
    /// Unsigned session; the expiry is assigned on encode.
    pub fn new(subject_id: impl Into<String>, is_root_admin: bool, session_type: SessionType) -> Self {
        Self {
            subject_id: subject_id.into(),
            is_root_admin,
            session_type,
            expires_at: 0,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    id: String,
    root: bool,
    token_type: String,
    exp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("missing required token claims")]
    MissingIdentity,
    #[error("session expiration must be > 0")]
    MissingExpiration,
    /// No token presented.
    #[error("unauthorized")]
    Unauthorized,
    /// Wrong key or algorithm.
    #[error("invalid token signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("malformed token")]
    Malformed,
    #[error("token encoding failed: {0}")]
    Encoding(String),
}

/// Token lifetime per session type, in hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifetimePolicy {
    pub user_hours: u64,
    pub integration_hours: u64,
    pub default_hours: u64,
}

impl LifetimePolicy {
    pub fn hours(&self, session_type: SessionType) -> u64 {
        match session_type {
            SessionType::User => self.user_hours,
            SessionType::Integration => self.integration_hours,
            SessionType::Unspecified => self.default_hours,
        }
    }
}

impl From<&SessionConfig> for LifetimePolicy {
    fn from(config: &SessionConfig) -> Self {
        Self {
            user_hours: config.user_lifetime_hours,
            integration_hours: config.integration_lifetime_hours,
            default_hours: config.default_lifetime_hours,
        }
    }
}

/// Signs and verifies session tokens with one process-wide secret.
#[derive(Clone)]
pub struct SessionCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    lifetimes: LifetimePolicy,
}

impl SessionCodec {
    pub fn new(secret: &[u8], lifetimes: LifetimePolicy) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            lifetimes,
        }
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(config.jwt_secret.as_bytes(), LifetimePolicy::from(config))
    }

    pub fn lifetimes(&self) -> LifetimePolicy {
        self.lifetimes
    }

    /// Sign a session. An unset expiry is filled in from the lifetime policy;
    /// an explicit one is kept.
    pub fn encode(&self, session: &Session) -> Result<String, SessionError> {
        if session.subject_id.is_empty() {
            return Err(SessionError::MissingIdentity);
        }

        let expires_at = if session.expires_at > 0 {
            session.expires_at
        } else {
            self.expiry_for(session.session_type)?
        };

        let claims = Claims {
            id: session.subject_id.clone(),
            root: session.is_root_admin,
            token_type: session.session_type.as_str().to_string(),
            exp: expires_at,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| SessionError::Encoding(e.to_string()))
    }

    /// Build, sign and return a fresh session and its token.
    pub fn issue(
        &self,
        subject_id: impl Into<String>,
        is_root_admin: bool,
        session_type: SessionType,
    ) -> Result<(Session, String), SessionError> {
        let mut session = Session::new(subject_id, is_root_admin, session_type);
        if session.subject_id.is_empty() {
            return Err(SessionError::MissingIdentity);
        }
        session.expires_at = self.expiry_for(session_type)?;
        let token = self.encode(&session)?;
        Ok((session, token))
    }

    /// Verify a token and return the session it carries.
    pub fn decode(&self, token: &str) -> Result<Session, SessionError> {
        if token.is_empty() {
            return Err(SessionError::Unauthorized);
        }

        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                    SessionError::InvalidSignature
                }
                ErrorKind::ExpiredSignature => SessionError::Expired,
                _ => SessionError::Malformed,
            }
        })?;

        let claims = data.claims;
        if claims.id.is_empty() {
            return Err(SessionError::Malformed);
        }

        Ok(Session {
            subject_id: claims.id,
            is_root_admin: claims.root,
            session_type: SessionType::from_tag(&claims.token_type),
            expires_at: claims.exp,
        })
    }

    fn expiry_for(&self, session_type: SessionType) -> Result<i64, SessionError> {
        let hours = self.lifetimes.hours(session_type);
        if hours == 0 {
            return Err(SessionError::MissingExpiration);
        }
        let seconds = i64::try_from(hours.saturating_mul(3600)).unwrap_or(i64::MAX);
        Ok(Utc::now().timestamp().saturating_add(seconds))
    }
}

impl fmt::Debug for SessionCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCodec")
            .field("lifetimes", &self.lifetimes)
            .finish_non_exhaustive()
    }
}
