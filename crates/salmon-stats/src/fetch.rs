//! Result retrieval from the game-companion API.

use futures::{StreamExt, TryStreamExt, stream};
use tracing::{debug, info, instrument, warn};

use crate::client::SalmonStats;
use crate::error::{Error, Result};
use crate::http::{ApiRequest, Target};
use crate::models::{CoopResult, ResultPage, ResultSummary};

/// The game only keeps this many of the most recent results.
pub const MAX_STORED_RESULTS: u64 = 50;

/// Outcome of a best-effort range fetch.
#[derive(Debug, Default)]
pub struct RangeFetch {
    /// Results of every page that succeeded, in page order.
    pub results: Vec<CoopResult>,
    /// Pages that failed, with their error.
    pub failures: Vec<(u32, Error)>,
}

impl RangeFetch {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

impl SalmonStats {
    /// Fetch one result by job id.
    #[instrument(skip(self))]
    pub async fn get_result(&self, job_id: u64) -> Result<CoopResult> {
        let request = ApiRequest::get(Target::Game, "results").segment(job_id);
        let result: CoopResult = self.execute_json(&request).await?;
        let nsaid = self.account().await.nsaid;
        Ok(result.with_player_id(nsaid))
    }

    /// Fetch one page of results for the current account.
    ///
    /// `page` is 1-based.
    #[instrument(skip(self))]
    pub async fn get_results(&self, page: u32, count: u32) -> Result<Vec<CoopResult>> {
        if page == 0 {
            return Err(Error::invalid_argument("page index is 1-based"));
        }
        if count == 0 {
            return Err(Error::invalid_argument("count must be positive"));
        }

        let request = ApiRequest::get(Target::Game, "results")
            .query("page", page)
            .query("count", count);
        let response: ResultPage = self.execute_json(&request).await?;
        let nsaid = self.account().await.nsaid;

        debug!(page, results = response.results.len(), "Fetched result page");
        Ok(response
            .results
            .into_iter()
            .map(|result| result.with_player_id(nsaid.clone()))
            .collect())
    }

    /// Fetch pages `from..=to` one at a time and concatenate them in page order.
    ///
    /// Fails on the first page error. See [`Self::get_results_range_partial`]
    /// for a variant that keeps going.
    #[instrument(skip(self))]
    pub async fn get_results_range(&self, from: u32, to: u32) -> Result<Vec<CoopResult>> {
        let count = self.config.page_size;
        let pages: Vec<Vec<CoopResult>> = stream::iter(from..=to)
            .map(|page| self.get_results(page, count))
            .buffered(1)
            .try_collect()
            .await?;

        let results: Vec<CoopResult> = pages.into_iter().flatten().collect();
        info!(from, to, results = results.len(), "Fetched result range");
        Ok(results)
    }

    /// Fetch pages `from..=to` one at a time, keeping the results of the pages
    /// that succeed and recording the pages that fail.
    #[instrument(skip(self))]
    pub async fn get_results_range_partial(&self, from: u32, to: u32) -> RangeFetch {
        let count = self.config.page_size;
        let mut pages = stream::iter(from..=to)
            .map(|page| async move { (page, self.get_results(page, count).await) })
            .buffered(1);

        let mut fetch = RangeFetch::default();
        while let Some((page, outcome)) = pages.next().await {
            match outcome {
                Ok(results) => fetch.results.extend(results),
                Err(e) => {
                    warn!(page, error = %e, "Failed to fetch result page");
                    fetch.failures.push((page, e));
                }
            }
        }

        info!(
            from,
            to,
            results = fetch.results.len(),
            failed_pages = fetch.failures.len(),
            "Fetched result range"
        );
        fetch
    }

    /// Job id of the most recent result the game has for this account.
    pub async fn latest_job_id(&self) -> Result<Option<u64>> {
        let request = ApiRequest::get(Target::Game, "results/summary");
        let summary: ResultSummary = self.execute_json(&request).await?;
        Ok(summary.latest_job_id)
    }

    /// Fetch every stored result newer than `job_id`, oldest first.
    ///
    /// Only the last [`MAX_STORED_RESULTS`] results are reachable, so older
    /// ids are skipped.
    #[instrument(skip(self))]
    pub async fn get_results_since(&self, job_id: u64) -> Result<Vec<CoopResult>> {
        let Some(latest) = self.latest_job_id().await? else {
            debug!("No results stored for this account");
            return Ok(Vec::new());
        };

        let first = job_id.saturating_add(1).max(latest.saturating_sub(MAX_STORED_RESULTS - 1));
        if first > latest {
            debug!(latest, "No new results");
            return Ok(Vec::new());
        }

        let results: Vec<CoopResult> = stream::iter(first..=latest)
            .map(|id| self.get_result(id))
            .buffered(1)
            .try_collect()
            .await?;

        info!(first, latest, results = results.len(), "Fetched new results");
        Ok(results)
    }
}
