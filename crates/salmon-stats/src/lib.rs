//! Salmon Run result client.
//!
//! Fetches Splatoon 2 Salmon Run results from the game-companion API and
//! uploads them to [Salmon Stats](https://salmon-stats.yuki.games).
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use salmon_stats::{SalmonStats, credentials::{Account, MemoryCredentialStore}};
//!
//! let client = SalmonStats::builder()
//!     .credential_store(Arc::new(MemoryCredentialStore::with_api_token("token")))
//!     .account(Account::new("nsaid", "iksm_session", "session_token"))
//!     .build()?;
//!
//! let uploaded = client.upload_results(last_uploaded_job_id).await?;
//! ```

pub mod client;
pub mod config;
pub mod credentials;
pub mod error;
pub mod fetch;
pub mod http;
pub mod models;
pub mod players;
pub mod upload;

pub use client::{SalmonStats, SalmonStatsBuilder};
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use fetch::RangeFetch;
