//! Credential exchange and session establishment.

use crate::client::ApiClient;
use crate::error::HarnessError;
use crate::requests;
use crate::validators;
use tracing::info;

/// Credentials of the pre-provisioned test account.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Exchanges credentials for a bearer token.
///
/// Every write operation in the lifecycle sequences depends on this token,
/// so any failure here (rejected credentials, unreachable server, missing or
/// empty token in the response) is fatal for the whole run.
pub async fn authenticate(
    api: &ApiClient,
    credentials: &Credentials,
) -> Result<String, HarnessError> {
    let request = requests::user::login(&credentials.email, &credentials.password);
    let response = api
        .execute(&request)
        .await
        .map_err(|e| HarnessError::Authentication(e.to_string()))?;

    if !response.is_success() {
        return Err(HarnessError::Authentication(format!(
            "login rejected with status {}: {}",
            response.status, response.body
        )));
    }

    let json = response
        .json()
        .map_err(|e| HarnessError::Authentication(e.to_string()))?;
    let token = validators::non_empty_string(&json, "token")
        .map_err(|e| HarnessError::Authentication(e.to_string()))?;

    Ok(token.to_string())
}

/// An authenticated session against one RecipeBook server.
///
/// Owns the client and the bearer token for the duration of one ordered
/// sequence; dropping it has no server-side effect.
pub struct Session {
    pub api: ApiClient,
    pub token: String,
}

impl Session {
    /// Authenticates once and bundles the token with the client.
    pub async fn establish(
        api: ApiClient,
        credentials: &Credentials,
    ) -> Result<Self, HarnessError> {
        let token = authenticate(&api, credentials).await?;
        info!("authenticated as {}", credentials.email);
        Ok(Self { api, token })
    }
}
