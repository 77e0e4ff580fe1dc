//! Payloads served by Salmon Stats.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::result::{CoopResult, PlayerResult, Schedule, Wave};
use super::types::BossType;
use crate::error::{Error, Result};

/// A result as stored by Salmon Stats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsResult {
    /// Salmon Stats id of the result.
    pub id: u64,
    pub schedule_id: String,
    /// `YYYY-MM-DD HH:MM:SS` in UTC.
    pub start_at: String,
    pub members: Vec<String>,
    #[serde(default)]
    pub boss_appearances: BTreeMap<BossType, u32>,
    pub uploader_user_id: u64,
    pub clear_waves: u8,
    #[serde(default)]
    pub fail_reason_id: Option<u8>,
    /// Decimal string, e.g. `"200.0"`.
    pub danger_rate: String,
    pub created_at: String,
    pub updated_at: String,
    pub golden_egg_delivered: u32,
    pub power_egg_collected: u32,
    pub boss_appearance_count: u32,
    pub boss_elimination_count: u32,
    pub is_eligible_for_no_night_record: bool,
    #[serde(default)]
    pub member_accounts: Option<Vec<MemberAccount>>,
    #[serde(default)]
    pub schedule: Option<Schedule>,
    pub player_results: Vec<PlayerResult>,
    pub waves: Vec<Wave>,
}

impl StatsResult {
    /// Convert into the game-side result shape, tagged with `player_id`.
    ///
    /// Salmon Stats does not echo the game's job id, so the converted result
    /// carries the Salmon Stats id in its place.
    pub fn into_coop_result(self, player_id: impl Into<String>) -> Result<CoopResult> {
        let start_at = parse_stats_time(&self.start_at)?;
        let danger_rate = self.danger_rate.trim().parse::<f64>().map_err(|e| {
            Error::Decode(format!("danger_rate {:?}: {e}", self.danger_rate))
        })?;

        Ok(CoopResult {
            job_id: self.id,
            player_id: Some(player_id.into()),
            schedule_id: Some(self.schedule_id),
            start_at,
            members: self.members,
            danger_rate,
            clear_waves: self.clear_waves,
            fail_reason_id: self.fail_reason_id,
            grade_point: None,
            golden_egg_delivered: self.golden_egg_delivered,
            power_egg_collected: self.power_egg_collected,
            boss_appearances: self.boss_appearances,
            boss_appearance_count: self.boss_appearance_count,
            boss_elimination_count: self.boss_elimination_count,
            schedule: self.schedule,
            player_results: self.player_results,
            waves: self.waves,
        })
    }
}

fn parse_stats_time(raw: &str) -> Result<i64> {
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Ok(naive.and_utc().timestamp());
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.timestamp())
        .map_err(|e| Error::Decode(format!("timestamp {raw:?}: {e}")))
}

/// A crew member's Salmon Stats account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberAccount {
    pub player_id: String,
    pub name: String,
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub twitter_avatar: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub user_id: Option<u64>,
    #[serde(default)]
    pub is_primary: Option<u8>,
    #[serde(default)]
    pub is_custom_name: Option<bool>,
    #[serde(default)]
    pub is_registered: Option<bool>,
}

/// Entry of `players/metadata`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerMetadata {
    pub player_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub twitter_avatar: Option<String>,
    #[serde(default)]
    pub is_registered: Option<bool>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Entry of `players/{nsaid}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSummary {
    pub player_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub total: Option<PlayerTotals>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Lifetime totals of a player on Salmon Stats.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTotals {
    pub games: u64,
    pub clear_games: u64,
    pub golden_eggs: u64,
    pub power_eggs: u64,
    pub rescue: u64,
    pub death: u64,
    pub boss_elimination_count: u64,
}
