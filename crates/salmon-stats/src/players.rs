//! Read-only Salmon Stats queries.

use tracing::instrument;

use crate::client::SalmonStats;
use crate::error::Result;
use crate::http::{ApiRequest, Target};
use crate::models::{PlayerMetadata, PlayerSummary, StatsResult};

impl SalmonStats {
    /// Salmon Stats metadata for player `nsaid`.
    #[instrument(skip(self))]
    pub async fn get_metadata(&self, nsaid: &str) -> Result<Vec<PlayerMetadata>> {
        let request = ApiRequest::get(Target::Stats, "players/metadata").query("ids", nsaid);
        self.execute_json(&request).await
    }

    /// Salmon Stats profile summary for player `nsaid`.
    #[instrument(skip(self))]
    pub async fn get_player_metadata(&self, nsaid: &str) -> Result<Vec<PlayerSummary>> {
        let request = ApiRequest::get(Target::Stats, "players").segment(nsaid);
        self.execute_json(&request).await
    }

    /// A result as stored by Salmon Stats, by its Salmon Stats id.
    #[instrument(skip(self))]
    pub async fn get_uploaded_result(&self, salmon_id: u64) -> Result<StatsResult> {
        let request = ApiRequest::get(Target::Stats, "results").segment(salmon_id);
        self.execute_json(&request).await
    }
}
