use std::fmt;
use std::path::{Path, PathBuf};

use sysinfo::System;

use crate::config::OutputNamespacing;

const RESULTS_STEM: &str = "perfResult";
const CHART_STEM: &str = "perfChart";

/// Host signature used to namespace output files.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunIdentity {
    pub system: String,
    pub release: String,
    pub arch: Option<String>,
}

impl RunIdentity {
    pub fn detect() -> Self {
        Self {
            system: System::name().unwrap_or_else(|| std::env::consts::OS.to_string()),
            release: System::kernel_version().unwrap_or_else(|| "unknown".to_string()),
            arch: Some(std::env::consts::ARCH.to_string()),
        }
    }

    /// Filesystem-safe signature, e.g. `Ubuntu-6.5.0-14-generic-x86_64`.
    pub fn signature(&self) -> String {
        let mut parts = vec![self.system.as_str(), self.release.as_str()];
        if let Some(arch) = &self.arch {
            parts.push(arch);
        }
        parts
            .into_iter()
            .map(sanitize)
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join("-")
    }
}

impl fmt::Display for RunIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.system, self.release)?;
        if let Some(arch) = &self.arch {
            write!(f, " {arch}")?;
        }
        Ok(())
    }
}

fn sanitize(part: &str) -> String {
    part.trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Where one campaign's result file and chart go.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputPaths {
    pub results: PathBuf,
    pub chart: PathBuf,
}

impl OutputPaths {
    pub fn new(
        dir: &Path,
        namespacing: OutputNamespacing,
        identity: &RunIdentity,
        input_tag: Option<&str>,
    ) -> Self {
        match namespacing {
            OutputNamespacing::Flat => Self {
                results: dir.join(format!("{RESULTS_STEM}.json")),
                chart: dir.join(format!("{CHART_STEM}.svg")),
            },
            OutputNamespacing::PlatformTagged => {
                let dir = dir.join(identity.signature());
                let suffix = input_tag.map(|t| format!("_{}", sanitize(t))).unwrap_or_default();
                Self {
                    results: dir.join(format!("{RESULTS_STEM}{suffix}.json")),
                    chart: dir.join(format!("{CHART_STEM}{suffix}.svg")),
                }
            }
        }
    }
}

/// Chart title carrying the host and the input tag.
pub fn chart_title(identity: &RunIdentity, input_tag: Option<&str>) -> String {
    match input_tag {
        Some(tag) => format!("Algorithm Comparison ({identity}, {tag})"),
        None => format!("Algorithm Comparison ({identity})"),
    }
}
