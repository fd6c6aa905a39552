use std::time::Duration;

use reqwest::{Client, StatusCode};
use tokio::runtime::Handle;
use tracing::debug;

use tether_types::models::UserId;
use tether_types::profile::{BriefProfile, ProfileResolver, ResolveError};

/// Resolves brief profiles from the identity service at
/// `GET {base}/users/{id}/profile`.
///
/// `resolve` blocks on the runtime handle, so it must only be called from
/// blocking threads. The API layer runs every query under `spawn_blocking`.
pub struct HttpProfileResolver {
    client: Client,
    base_url: String,
    timeout: Duration,
    runtime: Handle,
}

impl HttpProfileResolver {
    pub fn new(base_url: String, timeout: Duration, runtime: Handle) -> Self {
        Self {
            client: Client::new(),
            base_url,
            timeout,
            runtime,
        }
    }

    async fn fetch(&self, user_id: UserId) -> Result<BriefProfile, ResolveError> {
        let url = format!("{}/users/{}/profile", self.base_url, user_id);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ResolveError::Unavailable(e.to_string()))?;

        match resp.status() {
            StatusCode::NOT_FOUND => Err(ResolveError::NotFound(user_id)),
            status if !status.is_success() => {
                Err(ResolveError::Unavailable(format!("identity service returned {}", status)))
            }
            _ => resp
                .json::<BriefProfile>()
                .await
                .map_err(|e| ResolveError::Unavailable(e.to_string())),
        }
    }
}

impl ProfileResolver for HttpProfileResolver {
    fn resolve(&self, user_id: UserId) -> Result<BriefProfile, ResolveError> {
        let timeout = self.timeout;
        self.runtime.block_on(async {
            match tokio::time::timeout(timeout, self.fetch(user_id)).await {
                Ok(result) => result,
                Err(_) => {
                    debug!("Profile lookup for {} timed out", user_id);
                    Err(ResolveError::Timeout(timeout.as_millis() as u64))
                }
            }
        })
    }
}
