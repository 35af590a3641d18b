//! services/api/src/adapters/identity.rs
//!
//! This module contains the identity adapter. Bearer tokens are Firebase ID
//! tokens; rather than verifying them locally, the adapter asks the Identity
//! Toolkit which account a token belongs to.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use studentflow_core::domain::UserId;
use studentflow_core::ports::{IdentityService, PortError, PortResult};
use tracing::warn;

pub const IDENTITY_TOOLKIT_URL: &str = "https://identitytoolkit.googleapis.com/v1";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LookupRequest<'a> {
    id_token: &'a str,
}

#[derive(Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<LookupUser>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupUser {
    local_id: String,
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `IdentityService` against Firebase Authentication.
#[derive(Clone)]
pub struct FirebaseIdentityAdapter {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl FirebaseIdentityAdapter {
    /// Creates a new `FirebaseIdentityAdapter`.
    pub fn new(api_key: String) -> Result<Self, reqwest::Error> {
        Self::with_base_url(api_key, IDENTITY_TOOLKIT_URL.to_string())
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            http,
            api_key,
            base_url,
        })
    }
}

/// Expired, revoked and malformed tokens come back as 400 or 401. Quota (429),
/// a misconfigured key (403) and server errors are the provider's problem.
fn lookup_failure(status: reqwest::StatusCode) -> Option<PortError> {
    match status {
        s if s.is_success() => None,
        reqwest::StatusCode::BAD_REQUEST | reqwest::StatusCode::UNAUTHORIZED => {
            Some(PortError::Unauthorized)
        }
        s => Some(PortError::Unavailable(format!(
            "Identity provider answered {}",
            s
        ))),
    }
}

//=========================================================================================
// `IdentityService` Trait Implementation
//=========================================================================================

#[async_trait]
impl IdentityService for FirebaseIdentityAdapter {
    async fn verify_token(&self, token: &str) -> PortResult<UserId> {
        let response = self
            .http
            .post(format!("{}/accounts:lookup", self.base_url))
            .query(&[("key", self.api_key.as_str())])
            .json(&LookupRequest { id_token: token })
            .send()
            .await
            .map_err(|e| PortError::Unavailable(format!("Identity provider unreachable: {}", e)))?;

        let status = response.status();
        if let Some(err) = lookup_failure(status) {
            warn!("Identity lookup failed with {}", status);
            return Err(err);
        }

        let body: LookupResponse = response
            .json()
            .await
            .map_err(|e| PortError::Unavailable(format!("Unreadable identity response: {}", e)))?;

        body.users
            .into_iter()
            .next()
            .map(|user| UserId(user.local_id))
            .ok_or(PortError::Unauthorized)
    }
}
