use crate::{configuration::Configuration, error::Error};
use async_trait::async_trait;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, warn};

pub const ANONYMOUS_USER_ID: &str = "U_anonymous_user";
pub const DEV_USER_ID: &str = "U_dev_user";
pub const FALLBACK_USER_ID: &str = "U_fallback_user";

/// LINE profile of the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub user_id: String,
    pub display_name: String,
    #[serde(default)]
    pub picture_url: Option<String>,
}

impl Profile {
    fn placeholder(user_id: &str, display_name: &str) -> Self {
        Self {
            user_id: user_id.into(),
            display_name: display_name.into(),
            picture_url: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AuthMode {
    /// Every request needs a token accepted by LINE.
    Strict,
    /// Requests without a usable token continue as a placeholder user.
    AllowAnonymousFallback,
}

#[async_trait]
pub trait IdentityVerifier: Send + Sync + 'static {
    /// `bearer` is the token from the `Authorization: Bearer` header, if any.
    async fn verify(&self, bearer: Option<&str>) -> Result<Profile, Error>;
}

pub struct LineIdentityVerifier {
    client: reqwest::Client,
    profile_url: String,
    mode: AuthMode,
    dev_token: Option<String>,
}

impl LineIdentityVerifier {
    pub fn new(profile_url: String, mode: AuthMode, dev_token: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap_or_default();
        Self {
            client,
            profile_url,
            mode,
            dev_token,
        }
    }

    pub fn from_configuration<C: Configuration>(configuration: &C) -> Self {
        Self::new(
            configuration.line_profile_url(),
            configuration.auth_mode(),
            configuration.dev_token(),
        )
    }

    fn fallback(&self, user_id: &str, display_name: &str, err: Error) -> Result<Profile, Error> {
        match self.mode {
            AuthMode::Strict => Err(err),
            AuthMode::AllowAnonymousFallback => Ok(Profile::placeholder(user_id, display_name)),
        }
    }
}

#[async_trait]
impl IdentityVerifier for LineIdentityVerifier {
    async fn verify(&self, bearer: Option<&str>) -> Result<Profile, Error> {
        let Some(token) = bearer.filter(|token| !token.is_empty()) else {
            return self.fallback(ANONYMOUS_USER_ID, "Guest", Error::Unauthorized);
        };

        if self.mode == AuthMode::AllowAnonymousFallback
            && self.dev_token.as_deref() == Some(token)
        {
            return Ok(Profile::placeholder(DEV_USER_ID, "Developer"));
        }

        let response = match self
            .client
            .get(&self.profile_url)
            .bearer_auth(token)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                error!(?err, "LINE profile request failed");
                return self.fallback(
                    FALLBACK_USER_ID,
                    "User",
                    Error::Infrastructure(format!("LINE profile request failed: {err}")),
                );
            }
        };

        if !response.status().is_success() {
            warn!(status = %response.status(), "LINE rejected access token");
            return self.fallback(FALLBACK_USER_ID, "User", Error::Unauthorized);
        }

        response.json::<Profile>().await.map_err(|err| {
            Error::Infrastructure(format!("Malformed LINE profile response: {err}"))
        })
    }
}

/// Extracts the token of an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header: Option<&str>) -> Option<&str> {
    header
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
}
