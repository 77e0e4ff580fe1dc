//! Upload payloads for Salmon Stats.

use serde::{Deserialize, Serialize};

use super::result::CoopResult;

/// A result in the shape Salmon Stats accepts, tagged with its job id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadRecord {
    pub job_id: u64,
    /// NSA id of the uploading player.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploader_player_id: Option<String>,
    pub result: CoopResult,
}

impl From<&CoopResult> for UploadRecord {
    fn from(result: &CoopResult) -> Self {
        Self {
            job_id: result.job_id,
            uploader_player_id: result.player_id.clone(),
            result: result.clone(),
        }
    }
}

impl From<CoopResult> for UploadRecord {
    fn from(result: CoopResult) -> Self {
        Self {
            job_id: result.job_id,
            uploader_player_id: result.player_id.clone(),
            result,
        }
    }
}

/// Request body of the upload endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadBatch {
    pub results: Vec<UploadRecord>,
}

impl UploadBatch {
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

impl FromIterator<UploadRecord> for UploadBatch {
    fn from_iter<I: IntoIterator<Item = UploadRecord>>(iter: I) -> Self {
        Self {
            results: iter.into_iter().collect(),
        }
    }
}

/// Salmon Stats' answer for one uploaded record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    /// Job id of the submitted record.
    pub job_id: u64,
    /// Id Salmon Stats stored the result under.
    pub salmon_id: u64,
    /// `false` when Salmon Stats already had this result.
    #[serde(default)]
    pub created: bool,
}
