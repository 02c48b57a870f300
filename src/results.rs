use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;

use crate::error::{Error, Result};

/// Elapsed time of one round trip at one payload size.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimingObservation {
    pub size: String,
    #[serde(rename = "executionTimeInSeconds")]
    pub execution_time_in_seconds: f64,
    /// Actual payload length. Not persisted; zero for loaded campaigns.
    #[serde(skip)]
    pub payload_bytes: usize,
}

/// All observations for one algorithm, in size order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AlgorithmRun {
    pub algorithm: String,
    #[serde(rename = "perfMetrics")]
    pub perf_metrics: Vec<TimingObservation>,
}

impl AlgorithmRun {
    pub fn new(algorithm: impl Into<String>) -> Self {
        Self {
            algorithm: algorithm.into(),
            perf_metrics: Vec::new(),
        }
    }

    pub fn push(&mut self, observation: TimingObservation) {
        self.perf_metrics.push(observation);
    }

    pub fn size_labels(&self) -> impl Iterator<Item = &str> {
        self.perf_metrics.iter().map(|m| m.size.as_str())
    }
}

/// One full comparison: runs in algorithm order over a shared size axis.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Campaign {
    pub runs: Vec<AlgorithmRun>,
}

impl Campaign {
    pub fn new(runs: Vec<AlgorithmRun>) -> Self {
        Self { runs }
    }

    /// Shared size axis, taken from the first run.
    pub fn size_labels(&self) -> Vec<&str> {
        self.runs
            .first()
            .map(|r| r.size_labels().collect())
            .unwrap_or_default()
    }

    /// Check that every run covers the same sizes in the same order and that
    /// every timing is a finite, non-negative number.
    pub fn validate(&self) -> Result<()> {
        let Some(first) = self.runs.first() else {
            return Err(Error::MalformedCampaign("campaign has no runs".into()));
        };
        let axis: Vec<&str> = first.size_labels().collect();
        if axis.is_empty() {
            return Err(Error::MalformedCampaign("campaign has no observations".into()));
        }
        for (i, run) in self.runs.iter().enumerate() {
            if run.perf_metrics.len() != axis.len() {
                return Err(Error::MalformedCampaign(format!(
                    "run {i} ({}) has {} observations, run 0 has {}",
                    run.algorithm,
                    run.perf_metrics.len(),
                    axis.len()
                )));
            }
            if !run.size_labels().eq(axis.iter().copied()) {
                return Err(Error::MalformedCampaign(format!(
                    "run {i} ({}) disagrees with run 0 on the size axis",
                    run.algorithm
                )));
            }
            if let Some(bad) = run
                .perf_metrics
                .iter()
                .find(|m| {
                    !m.execution_time_in_seconds.is_finite() || m.execution_time_in_seconds < 0.0
                })
            {
                return Err(Error::MalformedCampaign(format!(
                    "run {i} ({}) has invalid timing {} at {}",
                    run.algorithm, bad.execution_time_in_seconds, bad.size
                )));
            }
        }
        Ok(())
    }
}

/// Serialize `campaign` as an indented JSON array.
pub fn to_json(campaign: &Campaign) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
    campaign.serialize(&mut ser)?;
    Ok(out)
}

/// Write `data` to `path`, replacing any existing file and creating missing
/// parent directories.
///
/// The bytes go to a sibling temporary file first and are renamed into place,
/// so a failed write never leaves a partial file behind.
pub(crate) fn write_atomic(path: &Path, data: &[u8]) -> std::io::Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp = Path::new(&tmp_name);

    let write = || -> std::io::Result<()> {
        let mut file = std::fs::File::create(tmp)?;
        file.write_all(data)?;
        file.sync_all()?;
        std::fs::rename(tmp, path)
    };
    write().inspect_err(|_| {
        let _ = std::fs::remove_file(tmp);
    })
}

/// Write `campaign` to `path` as JSON, replacing any existing file. A failed
/// write leaves no partial result behind.
pub fn persist(campaign: &Campaign, path: &Path) -> Result<()> {
    let mut data = to_json(campaign)?;
    data.push(b'\n');
    write_atomic(path, &data).map_err(|source| Error::Persistence {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::info!(path = %path.display(), runs = campaign.runs.len(), "results persisted");
    Ok(())
}

/// Read a campaign previously written by [`persist`].
pub fn load(path: &Path) -> Result<Campaign> {
    let data = std::fs::read(path)?;
    Ok(serde_json::from_slice(&data)?)
}
