use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Length of every key used by the built-in algorithms.
pub const KEY_LEN: usize = 16;
/// Associated-data length the AEAD configurations use unless told otherwise.
pub const DEFAULT_ASSOCIATED_DATA_LEN: usize = 32;

/// Cipher construction under measurement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// AES-128 in counter mode with a 128-bit big-endian counter block.
    Aes128Ctr,
    Ascon128,
    Ascon128a,
    Aes128Gcm,
}

impl Algorithm {
    pub const ALL: [Algorithm; 4] = [
        Algorithm::Ascon128,
        Algorithm::Ascon128a,
        Algorithm::Aes128Ctr,
        Algorithm::Aes128Gcm,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Algorithm::Aes128Ctr => "AES-128",
            Algorithm::Ascon128 => "ASCON-128",
            Algorithm::Ascon128a => "ASCON-128a",
            Algorithm::Aes128Gcm => "AES-128-GCM",
        }
    }

    pub fn nonce_len(self) -> usize {
        match self {
            Algorithm::Aes128Ctr | Algorithm::Ascon128 | Algorithm::Ascon128a => 16,
            Algorithm::Aes128Gcm => 12,
        }
    }

    /// Whether the construction authenticates associated data.
    pub fn is_aead(self) -> bool {
        !matches!(self, Algorithm::Aes128Ctr)
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "aes-128" | "aes-128-ctr" | "aes128" => Ok(Algorithm::Aes128Ctr),
            "ascon-128" | "ascon128" => Ok(Algorithm::Ascon128),
            "ascon-128a" | "ascon128a" => Ok(Algorithm::Ascon128a),
            "aes-128-gcm" | "aes128gcm" => Ok(Algorithm::Aes128Gcm),
            other => Err(Error::Config(format!("unknown algorithm: {other}"))),
        }
    }
}

/// One comparison target and the parameters needed to invoke it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlgorithmConfig {
    pub label: String,
    pub algorithm: Algorithm,
    pub key_len: usize,
    pub nonce_len: usize,
    pub associated_data_len: usize,
}

impl AlgorithmConfig {
    /// Build the configuration for `algorithm`. Associated data only applies
    /// to AEAD constructions; counter mode always gets none.
    pub fn new(algorithm: Algorithm, associated_data_len: usize) -> Self {
        Self {
            label: algorithm.label().to_string(),
            algorithm,
            key_len: KEY_LEN,
            nonce_len: algorithm.nonce_len(),
            associated_data_len: if algorithm.is_aead() {
                associated_data_len
            } else {
                0
            },
        }
    }

    pub fn aes128_ctr() -> Self {
        Self::new(Algorithm::Aes128Ctr, 0)
    }

    pub fn ascon128() -> Self {
        Self::new(Algorithm::Ascon128, DEFAULT_ASSOCIATED_DATA_LEN)
    }

    pub fn ascon128a() -> Self {
        Self::new(Algorithm::Ascon128a, DEFAULT_ASSOCIATED_DATA_LEN)
    }

    pub fn aes128_gcm() -> Self {
        Self::new(Algorithm::Aes128Gcm, DEFAULT_ASSOCIATED_DATA_LEN)
    }

    fn validate(&self) -> Result<()> {
        if self.key_len != KEY_LEN {
            return Err(Error::Config(format!(
                "{}: key length {} (expected {KEY_LEN})",
                self.label, self.key_len
            )));
        }
        if self.nonce_len != self.algorithm.nonce_len() {
            return Err(Error::Config(format!(
                "{}: nonce length {} (expected {})",
                self.label,
                self.nonce_len,
                self.algorithm.nonce_len()
            )));
        }
        if !self.algorithm.is_aead() && self.associated_data_len != 0 {
            return Err(Error::Config(format!(
                "{}: counter mode takes no associated data",
                self.label
            )));
        }
        Ok(())
    }
}

/// Where the bytes of a payload come from.
#[derive(Clone, Debug, PartialEq)]
pub enum PayloadSource {
    Synthetic,
    /// Whole contents of an external file. The nominal size of the owning
    /// `PayloadSpec` is only a label for these.
    Asset(PathBuf),
}

/// Requested payload: a nominal size in megabytes and its source.
#[derive(Clone, Debug, PartialEq)]
pub struct PayloadSpec {
    pub size_mb: f64,
    pub source: PayloadSource,
}

impl PayloadSpec {
    pub fn synthetic(size_mb: f64) -> Self {
        Self {
            size_mb,
            source: PayloadSource::Synthetic,
        }
    }

    pub fn asset(size_mb: f64, path: impl Into<PathBuf>) -> Self {
        Self {
            size_mb,
            source: PayloadSource::Asset(path.into()),
        }
    }

    /// Reject sizes that are negative, non-finite, or (for synthetic
    /// payloads) above [`MAX_SYNTHETIC_MB`].
    pub fn check(&self) -> Result<()> {
        if !self.size_mb.is_finite() || self.size_mb < 0.0 {
            return Err(Error::Config(format!(
                "payload size must be a finite, non-negative number of MB, got {}",
                self.size_mb
            )));
        }
        if self.source == PayloadSource::Synthetic && self.size_mb > MAX_SYNTHETIC_MB {
            return Err(Error::Config(format!(
                "synthetic payload of {} MB exceeds the {MAX_SYNTHETIC_MB} MB ceiling",
                self.size_mb
            )));
        }
        Ok(())
    }

    /// Axis label, e.g. `0.1MB` or `2MB`.
    pub fn label(&self) -> String {
        format!("{}MB", self.size_mb)
    }
}

/// Content of synthetic payloads.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FillMode {
    /// Uniformly random bytes; bit-identical across runs only with a fixed seed.
    #[default]
    Random,
    /// 0..=255 repeating; always bit-identical.
    Pattern,
}

/// How keys are drawn across the campaign matrix. Keys are never shared
/// between sizes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum KeyPolicy {
    /// A fresh key for every algorithm x size cell.
    #[default]
    PerCell,
    /// One key per size, reused by every algorithm.
    SharedAcrossAlgorithms,
}

/// Layout of persisted result and chart files.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputNamespacing {
    /// `perfResult.json` and `perfChart.svg` directly in the output directory.
    Flat,
    /// Files nested under a directory named by the host signature, suffixed
    /// with the input tag when one is set.
    #[default]
    PlatformTagged,
}

/// Built-in comparison scenarios.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scenario {
    Synthetic,
    Image,
    Video,
}

impl Scenario {
    pub fn tag(self) -> &'static str {
        match self {
            Scenario::Synthetic => "synthetic",
            Scenario::Image => "image",
            Scenario::Video => "video",
        }
    }
}

impl FromStr for Scenario {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "synthetic" => Ok(Scenario::Synthetic),
            "image" => Ok(Scenario::Image),
            "video" => Ok(Scenario::Video),
            other => Err(Error::Config(format!("unknown scenario: {other}"))),
        }
    }
}

/// Largest synthetic payload a campaign will allocate, in MB.
pub const MAX_SYNTHETIC_MB: f64 = 4096.0;

/// Default location and nominal size of the image asset.
pub const IMAGE_ASSET: (&str, f64) = ("assets/image.jpg", 2.7);
/// Default location and nominal size of the video asset.
pub const VIDEO_ASSET: (&str, f64) = ("assets/video.mp4", 10.0);

/// Everything a campaign needs, passed in by the caller.
#[derive(Clone, Debug, PartialEq)]
pub struct CampaignConfig {
    pub algorithms: Vec<AlgorithmConfig>,
    pub payloads: Vec<PayloadSpec>,
    pub fill: FillMode,
    pub key_policy: KeyPolicy,
    /// Seed for keys, nonces and synthetic payloads. `None` draws from entropy.
    pub seed: Option<u64>,
    pub output_dir: PathBuf,
    pub namespacing: OutputNamespacing,
    /// Input-type tag used in output paths and chart titles.
    pub input_tag: Option<String>,
}

impl Default for CampaignConfig {
    fn default() -> Self {
        Self {
            algorithms: vec![
                AlgorithmConfig::ascon128(),
                AlgorithmConfig::ascon128a(),
                AlgorithmConfig::aes128_ctr(),
            ],
            payloads: [0.1, 0.4, 1.0, 2.0]
                .into_iter()
                .map(PayloadSpec::synthetic)
                .collect(),
            fill: FillMode::default(),
            key_policy: KeyPolicy::default(),
            seed: None,
            output_dir: PathBuf::from("results"),
            namespacing: OutputNamespacing::default(),
            input_tag: None,
        }
    }
}

impl CampaignConfig {
    /// Preset for one of the built-in scenarios. Asset scenarios put the
    /// asset after two small synthetic sizes on the same axis.
    pub fn for_scenario(scenario: Scenario, asset: Option<PathBuf>) -> Self {
        let payloads = match scenario {
            Scenario::Synthetic => Self::default().payloads,
            Scenario::Image | Scenario::Video => {
                let (default_path, nominal) = if scenario == Scenario::Image {
                    IMAGE_ASSET
                } else {
                    VIDEO_ASSET
                };
                let path = asset.unwrap_or_else(|| PathBuf::from(default_path));
                vec![
                    PayloadSpec::synthetic(0.1),
                    PayloadSpec::synthetic(0.4),
                    PayloadSpec::asset(nominal, path),
                ]
            }
        };
        Self {
            payloads,
            input_tag: Some(scenario.tag().to_string()),
            ..Default::default()
        }
    }

    /// Set the associated-data length of every AEAD configuration.
    pub fn with_associated_data_len(mut self, len: usize) -> Self {
        for alg in &mut self.algorithms {
            *alg = AlgorithmConfig::new(alg.algorithm, len);
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.algorithms.is_empty() {
            return Err(Error::Config("no algorithms configured".into()));
        }
        if self.payloads.is_empty() {
            return Err(Error::Config("no payload sizes configured".into()));
        }
        for alg in &self.algorithms {
            alg.validate()?;
        }
        for spec in &self.payloads {
            spec.check()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn campaign_config_default_values() {
        let cfg = CampaignConfig::default();
        let labels: Vec<_> = cfg.algorithms.iter().map(|a| a.label.as_str()).collect();
        assert_eq!(labels, ["ASCON-128", "ASCON-128a", "AES-128"]);
        let sizes: Vec<_> = cfg.payloads.iter().map(PayloadSpec::label).collect();
        assert_eq!(sizes, ["0.1MB", "0.4MB", "1MB", "2MB"]);
        assert_eq!(cfg.fill, FillMode::Random);
        assert_eq!(cfg.key_policy, KeyPolicy::PerCell);
        assert_eq!(cfg.namespacing, OutputNamespacing::PlatformTagged);
        assert!(cfg.seed.is_none());
        assert!(cfg.input_tag.is_none());
        cfg.validate().unwrap();
    }

    #[test]
    fn counter_mode_never_takes_associated_data() {
        let cfg = AlgorithmConfig::new(Algorithm::Aes128Ctr, 32);
        assert_eq!(cfg.associated_data_len, 0);
        assert_eq!(cfg.nonce_len, 16);
    }

    #[test]
    fn ascon_defaults_to_32_bytes_of_associated_data() {
        assert_eq!(AlgorithmConfig::ascon128().associated_data_len, 32);
        assert_eq!(AlgorithmConfig::ascon128a().associated_data_len, 32);
        assert_eq!(AlgorithmConfig::aes128_gcm().nonce_len, 12);
    }

    #[test]
    fn with_associated_data_len_only_touches_aead() {
        let cfg = CampaignConfig::default().with_associated_data_len(0);
        assert!(cfg.algorithms.iter().all(|a| a.associated_data_len == 0));
        let cfg = cfg.with_associated_data_len(8);
        let lens: Vec<_> = cfg.algorithms.iter().map(|a| a.associated_data_len).collect();
        assert_eq!(lens, [8, 8, 0]);
    }

    #[test]
    fn payload_labels() {
        assert_eq!(PayloadSpec::synthetic(0.1).label(), "0.1MB");
        assert_eq!(PayloadSpec::synthetic(1.0).label(), "1MB");
        assert_eq!(PayloadSpec::asset(2.7, "a.jpg").label(), "2.7MB");
    }

    #[test]
    fn algorithm_from_str() {
        assert_eq!("AES-128".parse::<Algorithm>().unwrap(), Algorithm::Aes128Ctr);
        assert_eq!("ascon-128a".parse::<Algorithm>().unwrap(), Algorithm::Ascon128a);
        assert_eq!("Ascon-128".parse::<Algorithm>().unwrap(), Algorithm::Ascon128);
        assert_eq!("aes-128-gcm".parse::<Algorithm>().unwrap(), Algorithm::Aes128Gcm);
        assert!("des".parse::<Algorithm>().is_err());
    }

    #[test]
    fn image_scenario_appends_asset() {
        let cfg = CampaignConfig::for_scenario(Scenario::Image, None);
        assert_eq!(cfg.input_tag.as_deref(), Some("image"));
        assert_eq!(cfg.payloads.len(), 3);
        assert_eq!(
            cfg.payloads[2],
            PayloadSpec::asset(2.7, PathBuf::from("assets/image.jpg"))
        );
        let cfg = CampaignConfig::for_scenario(Scenario::Video, Some("clip.mp4".into()));
        assert_eq!(cfg.payloads[2].source, PayloadSource::Asset("clip.mp4".into()));
    }

    #[test]
    fn validate_rejects_bad_configs() {
        let empty = CampaignConfig {
            algorithms: Vec::new(),
            ..Default::default()
        };
        assert!(matches!(empty.validate(), Err(Error::Config(_))));

        let negative = CampaignConfig {
            payloads: vec![PayloadSpec::synthetic(-1.0)],
            ..Default::default()
        };
        assert!(matches!(negative.validate(), Err(Error::Config(_))));

        let nan = CampaignConfig {
            payloads: vec![PayloadSpec::synthetic(f64::NAN)],
            ..Default::default()
        };
        assert!(nan.validate().is_err());

        let mut bad_nonce = AlgorithmConfig::ascon128();
        bad_nonce.nonce_len = 12;
        let cfg = CampaignConfig {
            algorithms: vec![bad_nonce],
            ..Default::default()
        };
        assert!(matches!(cfg.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn oversized_synthetic_payload_is_rejected() {
        let huge = CampaignConfig {
            payloads: vec![PayloadSpec::synthetic(1e20)],
            fill: FillMode::Pattern,
            ..Default::default()
        };
        assert!(matches!(huge.validate(), Err(Error::Config(_))));

        let at_ceiling = CampaignConfig {
            payloads: vec![PayloadSpec::synthetic(MAX_SYNTHETIC_MB)],
            ..Default::default()
        };
        at_ceiling.validate().unwrap();
    }

    #[test]
    fn asset_label_is_not_capped() {
        // Asset sizes are labels only; nothing is allocated from them.
        PayloadSpec::asset(1e20, "big.mp4").check().unwrap();
    }

    #[test]
    fn zero_size_is_allowed() {
        let cfg = CampaignConfig {
            payloads: vec![PayloadSpec::synthetic(0.0)],
            ..Default::default()
        };
        cfg.validate().unwrap();
    }
}
