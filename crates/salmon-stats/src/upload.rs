//! Uploading results to Salmon Stats.

use std::collections::HashMap;

use futures::future::try_join_all;
use tracing::{debug, info, instrument, warn};

use crate::client::SalmonStats;
use crate::error::{Error, Result};
use crate::http::{ApiRequest, Target};
use crate::models::{CoopResult, UploadBatch, UploadRecord, UploadResponse};

impl SalmonStats {
    /// Submit `records` to Salmon Stats in a single request.
    #[instrument(skip(self, records), fields(records = records.len()))]
    pub async fn upload_records(&self, records: Vec<UploadRecord>) -> Result<Vec<UploadResponse>> {
        let batch: UploadBatch = records.into_iter().collect();
        let request = ApiRequest::post(Target::Stats, "results").json(&batch)?;
        let responses: Vec<UploadResponse> = self.execute_json(&request).await?;
        debug!(submitted = batch.len(), accepted = responses.len(), "Uploaded batch");
        Ok(responses)
    }

    /// Fetch result `job_id` from the game and upload it.
    #[instrument(skip(self))]
    pub async fn upload_result(&self, job_id: u64) -> Result<Vec<UploadResponse>> {
        let result = self.get_result(job_id).await?;
        self.upload_records(vec![UploadRecord::from(result)]).await
    }

    /// Upload every result newer than `job_id`.
    ///
    /// Results are submitted in batches of `upload_batch_size`, all batches
    /// concurrently. A failure at any stage, fetching included, fails the
    /// whole upload with [`Error::BadRequest`]. On success each response is
    /// paired with the result it was submitted for, ordered by job id.
    #[instrument(skip(self))]
    pub async fn upload_results(&self, job_id: u64) -> Result<Vec<(UploadResponse, CoopResult)>> {
        let results = self.get_results_since(job_id).await.map_err(|e| {
            warn!(error = %e, "Fetching results to upload failed");
            Error::bad_request(e)
        })?;
        if results.is_empty() {
            info!("Nothing to upload");
            return Ok(Vec::new());
        }

        let batch_size = self.config.upload_batch_size;
        let batches = results
            .chunks(batch_size)
            .map(|chunk| chunk.iter().map(UploadRecord::from).collect::<Vec<_>>());

        let responses = try_join_all(batches.map(|records| self.upload_records(records)))
            .await
            .map_err(|e| {
                warn!(error = %e, "Batch upload failed");
                Error::bad_request(e)
            })?;

        let responses: Vec<UploadResponse> = responses.into_iter().flatten().collect();
        info!(
            results = results.len(),
            responses = responses.len(),
            "Uploaded results"
        );
        Ok(correlate(responses, results))
    }
}

/// Pair every upload response with the submitted result of the same job id.
///
/// Responses and results that have no counterpart are logged and dropped.
/// The output is ordered by job id.
pub fn correlate(
    mut responses: Vec<UploadResponse>,
    results: Vec<CoopResult>,
) -> Vec<(UploadResponse, CoopResult)> {
    let mut by_job: HashMap<u64, CoopResult> = results
        .into_iter()
        .map(|result| (result.job_id, result))
        .collect();

    responses.sort_by_key(|response| response.job_id);

    let mut pairs = Vec::with_capacity(responses.len());
    for response in responses {
        match by_job.remove(&response.job_id) {
            Some(result) => pairs.push((response, result)),
            None => warn!(
                job_id = response.job_id,
                salmon_id = response.salmon_id,
                "Upload response matches no submitted result"
            ),
        }
    }

    if !by_job.is_empty() {
        let mut missing: Vec<u64> = by_job.into_keys().collect();
        missing.sort_unstable();
        warn!(?missing, "Submitted results without an upload response");
    }

    pairs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(job_id: u64) -> CoopResult {
        CoopResult {
            job_id,
            player_id: Some("nsaid".to_string()),
            schedule_id: None,
            start_at: 0,
            members: Vec::new(),
            danger_rate: 100.0,
            clear_waves: 3,
            fail_reason_id: None,
            grade_point: None,
            golden_egg_delivered: 0,
            power_egg_collected: 0,
            boss_appearances: Default::default(),
            boss_appearance_count: 0,
            boss_elimination_count: 0,
            schedule: None,
            player_results: Vec::new(),
            waves: Vec::new(),
        }
    }

    fn response(job_id: u64) -> UploadResponse {
        UploadResponse {
            job_id,
            salmon_id: job_id * 10,
            created: true,
        }
    }

    #[test]
    fn pairs_by_job_id_regardless_of_order() {
        let responses = vec![response(3), response(1), response(2)];
        let results = vec![result(2), result(3), result(1)];

        let pairs = correlate(responses, results);
        let ids: Vec<(u64, u64)> = pairs
            .iter()
            .map(|(response, result)| (response.job_id, result.job_id))
            .collect();
        assert_eq!(ids, vec![(1, 1), (2, 2), (3, 3)]);
    }

    #[test]
    fn unmatched_entries_are_dropped() {
        let responses = vec![response(1), response(9)];
        let results = vec![result(1), result(2)];

        let pairs = correlate(responses, results);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].0.salmon_id, 10);
        assert_eq!(pairs[0].1.job_id, 1);
    }

    #[test]
    fn record_keeps_job_id_and_uploader() {
        let record = UploadRecord::from(&result(77));
        assert_eq!(record.job_id, 77);
        assert_eq!(record.uploader_player_id.as_deref(), Some("nsaid"));

        let json = serde_json::to_value(UploadBatch::from_iter([record])).unwrap();
        assert_eq!(json["results"][0]["job_id"], 77);
        assert_eq!(json["results"][0]["result"]["job_id"], 77);
    }
}
