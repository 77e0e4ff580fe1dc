//! Response and request models for the game-companion API and Salmon Stats.

pub mod result;
pub mod stats;
pub mod types;
pub mod upload;

pub use result::{
    BossEliminations, CoopResult, PlayerResult, ResultPage, ResultSummary, Schedule, SpecialUse,
    Wave, WeaponUse,
};
pub use stats::{MemberAccount, PlayerMetadata, PlayerSummary, PlayerTotals, StatsResult};
pub use types::{BossType, SpecialId, StageId, UnknownId};
pub use upload::{UploadBatch, UploadRecord, UploadResponse};
