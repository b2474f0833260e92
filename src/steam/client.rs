use crate::config::SteamLookupConfig;
use crate::domain::{EndpointUrl, NumericAppId};
use crate::steam::{AppDetailsResponse, GameDetails, MetadataCache, SteamLookupError};
use tracing::{debug, instrument};

/// Looks up store metadata, serving repeated lookups from the cache
pub struct SteamClient {
    client: reqwest::Client,
    endpoint: EndpointUrl,
    cache: MetadataCache,
}

impl SteamClient {
    pub fn new(client: reqwest::Client, config: &SteamLookupConfig) -> Self {
        Self {
            client,
            endpoint: config.endpoint.clone(),
            cache: MetadataCache::new(config.cache_ttl),
        }
    }

    /// `Ok(None)` when the store does not know the app or reports failure
    #[instrument(skip(self), fields(app_id = %app_id))]
    pub async fn game_details(
        &self,
        app_id: &NumericAppId,
    ) -> Result<Option<GameDetails>, SteamLookupError> {
        if let Some(details) = self.cache.get(app_id) {
            debug!("Serving game details from cache");
            return Ok(Some(details));
        }

        let response = self
            .client
            .get(self.endpoint.as_ref())
            .query(&[("appids", app_id.as_ref())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SteamLookupError::Status(status));
        }

        let mut answer: AppDetailsResponse = response.json().await?;
        let details = answer
            .remove(app_id.as_ref())
            .filter(|entry| entry.success)
            .and_then(|entry| entry.data);

        if let Some(details) = &details {
            self.cache.insert(app_id.clone(), details.clone());
        }

        Ok(details)
    }
}
