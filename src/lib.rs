pub mod campaign;
pub mod cipher;
mod config;
mod error;
pub mod executor;
pub mod identity;
pub mod payload;
pub mod render;
pub mod results;
pub mod stats;

pub use campaign::CampaignRunner;
pub use cipher::{CipherBackend, RustCryptoBackend};
pub use config::{
    Algorithm, AlgorithmConfig, CampaignConfig, FillMode, KeyPolicy, OutputNamespacing,
    PayloadSource, PayloadSpec, Scenario, DEFAULT_ASSOCIATED_DATA_LEN, IMAGE_ASSET, KEY_LEN,
    MAX_SYNTHETIC_MB, VIDEO_ASSET,
};
pub use error::{Error, Result};
pub use identity::{OutputPaths, RunIdentity};
pub use results::{AlgorithmRun, Campaign, TimingObservation};
pub use stats::RunSummary;
