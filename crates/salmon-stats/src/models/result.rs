//! Coop results as served by the game-companion API.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::types::{BossType, SpecialId, StageId};

/// One completed Salmon Run job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoopResult {
    /// Job identifier, unique per player and stable across re-fetches.
    #[serde(alias = "id")]
    pub job_id: u64,
    /// NSA id of the account the result was fetched for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule_id: Option<String>,
    /// Unix timestamp (seconds) the job started.
    pub start_at: i64,
    /// NSA ids of every member of the crew.
    #[serde(default)]
    pub members: Vec<String>,
    pub danger_rate: f64,
    pub clear_waves: u8,
    #[serde(default)]
    pub fail_reason_id: Option<u8>,
    #[serde(default)]
    pub grade_point: Option<i32>,
    pub golden_egg_delivered: u32,
    pub power_egg_collected: u32,
    #[serde(default)]
    pub boss_appearances: BTreeMap<BossType, u32>,
    pub boss_appearance_count: u32,
    pub boss_elimination_count: u32,
    #[serde(default)]
    pub schedule: Option<Schedule>,
    pub player_results: Vec<PlayerResult>,
    pub waves: Vec<Wave>,
}

impl CoopResult {
    /// Whether the crew cleared all three waves.
    pub fn is_clear(&self) -> bool {
        self.clear_waves >= 3
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.start_at, 0)
    }

    /// The stats of the player of record, when they appear in this result.
    pub fn my_result(&self) -> Option<&PlayerResult> {
        let player_id = self.player_id.as_deref()?;
        self.player_results
            .iter()
            .find(|player| player.player_id == player_id)
    }

    /// Tag this result with the account it was fetched for.
    pub fn with_player_id(mut self, player_id: impl Into<String>) -> Self {
        self.player_id = Some(player_id.into());
        self
    }
}

/// Per-player statistics of a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerResult {
    pub player_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub golden_eggs: u32,
    pub power_eggs: u32,
    pub rescue: u32,
    pub death: u32,
    pub special_id: SpecialId,
    pub boss_elimination_count: u32,
    #[serde(default)]
    pub grade_point: Option<i32>,
    pub boss_eliminations: BossEliminations,
    /// Special uses per wave.
    #[serde(default)]
    pub special_uses: Vec<SpecialUse>,
    /// Weapon used in each wave.
    #[serde(default)]
    pub weapons: Vec<WeaponUse>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BossEliminations {
    pub counts: BTreeMap<BossType, u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialUse {
    pub count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponUse {
    pub weapon_id: i32,
}

/// Rotation the job was played in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub schedule_id: String,
    pub end_at: String,
    pub weapons: Vec<i32>,
    pub stage_id: StageId,
    #[serde(default)]
    pub rare_weapon_id: Option<i32>,
}

/// Per-wave statistics of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wave {
    pub wave: u8,
    pub event_id: u8,
    pub water_id: u8,
    pub golden_egg_quota: u32,
    pub golden_egg_appearances: u32,
    pub golden_egg_delivered: u32,
    pub power_egg_collected: u32,
}

/// One page of the result listing endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResultPage {
    pub results: Vec<CoopResult>,
}

/// Response of the result summary endpoint.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ResultSummary {
    /// Most recent job id known to the game for this account, if any.
    pub latest_job_id: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESULT_JSON: &str = r#"{
        "id": 3210,
        "schedule_id": "2021-04-10 08:00:00",
        "start_at": 1618045200,
        "members": ["a1b2", "c3d4"],
        "danger_rate": 200.0,
        "clear_waves": 3,
        "fail_reason_id": null,
        "golden_egg_delivered": 62,
        "power_egg_collected": 2810,
        "boss_appearances": {"3": 2, "6": 5},
        "boss_appearance_count": 7,
        "boss_elimination_count": 6,
        "schedule": {
            "schedule_id": "2021-04-10 08:00:00",
            "end_at": "2021-04-11 20:00:00",
            "weapons": [0, 1010, 2030, -1],
            "stage_id": 2,
            "rare_weapon_id": null
        },
        "player_results": [
            {
                "player_id": "a1b2",
                "golden_eggs": 31,
                "power_eggs": 1400,
                "rescue": 2,
                "death": 1,
                "special_id": 7,
                "boss_elimination_count": 4,
                "boss_eliminations": {"counts": {"3": 1, "6": 3}},
                "special_uses": [{"count": 1}, {"count": 0}, {"count": 1}],
                "weapons": [{"weapon_id": 1010}, {"weapon_id": 2030}, {"weapon_id": 0}]
            },
            {
                "player_id": "c3d4",
                "golden_eggs": 31,
                "power_eggs": 1410,
                "rescue": 1,
                "death": 2,
                "special_id": 9,
                "boss_elimination_count": 2,
                "boss_eliminations": {"counts": {"6": 2}}
            }
        ],
        "waves": [
            {"wave": 1, "event_id": 0, "water_id": 1, "golden_egg_quota": 18,
             "golden_egg_appearances": 30, "golden_egg_delivered": 20, "power_egg_collected": 900}
        ]
    }"#;

    #[test]
    fn decodes_result_with_id_alias() {
        let result: CoopResult = serde_json::from_str(RESULT_JSON).unwrap();
        assert_eq!(result.job_id, 3210);
        assert!(result.player_id.is_none());
        assert!(result.is_clear());
        assert_eq!(result.boss_appearances[&BossType::Steelhead], 5);
        assert_eq!(
            result.schedule.as_ref().map(|s| s.stage_id),
            Some(StageId::MaroonersBay)
        );
        assert_eq!(result.player_results[1].special_id, SpecialId::Splashdown);
        assert!(result.player_results[1].weapons.is_empty());
        assert_eq!(
            result.started_at().map(|t| t.to_rfc3339()),
            Some("2021-04-10T09:00:00+00:00".to_string())
        );
    }

    #[test]
    fn player_of_record_lookup() {
        let result: CoopResult = serde_json::from_str(RESULT_JSON).unwrap();
        assert!(result.my_result().is_none());

        let result = result.with_player_id("c3d4");
        let me = result.my_result().unwrap();
        assert_eq!(me.death, 2);
        assert_eq!(me.boss_eliminations.counts[&BossType::Steelhead], 2);
    }

    #[test]
    fn serializes_job_id_and_player_id() {
        let result: CoopResult = serde_json::from_str(RESULT_JSON).unwrap();
        let value = serde_json::to_value(result.with_player_id("a1b2")).unwrap();
        assert_eq!(value["job_id"], 3210);
        assert_eq!(value["player_id"], "a1b2");
        assert!(value.get("id").is_none());
    }
}
