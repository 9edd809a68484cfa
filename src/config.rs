//! Portal constants, term settings and local paths

use crate::error::{ErrorKind, Result};
use std::path::PathBuf;
use std::time::Duration;

pub const LOGIN_URL: &str = "https://byyt.ustb.edu.cn/";
pub const API_URL: &str = "https://byyt.ustb.edu.cn/Xsxk/addGouwuche";

pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(3);

pub const DATA_FILE_NAME: &str = "courses_data.json";

/// Academic term the registration request is issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermConfig {
    /// 学年, e.g. `2025-2026`
    pub xn: String,
    /// 学期, e.g. `2`
    pub xq: String,
}

impl TermConfig {
    pub fn new(xn: impl Into<String>, xq: impl Into<String>) -> Self {
        Self {
            xn: xn.into(),
            xq: xq.into(),
        }
    }

    /// Combined year and term, e.g. `2025-20262`.
    pub fn xnxq(&self) -> String {
        format!("{}{}", self.xn, self.xq)
    }
}

impl Default for TermConfig {
    fn default() -> Self {
        Self::new("2025-2026", "2")
    }
}

/// Delay between two registration attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollInterval(u64);

impl PollInterval {
    pub const MIN_MS: u64 = 100;
    pub const MAX_MS: u64 = 10_000;
    pub const DEFAULT_MS: u64 = 500;

    pub fn from_millis(ms: u64) -> Result<Self> {
        if !(Self::MIN_MS..=Self::MAX_MS).contains(&ms) {
            return Err(ErrorKind::ConfigError(format!(
                "interval {ms} ms outside {}..={} ms",
                Self::MIN_MS,
                Self::MAX_MS
            ))
            .into());
        }
        Ok(Self(ms))
    }

    pub fn as_millis(self) -> u64 {
        self.0
    }

    pub fn as_duration(self) -> Duration {
        Duration::from_millis(self.0)
    }
}

impl Default for PollInterval {
    fn default() -> Self {
        Self(Self::DEFAULT_MS)
    }
}

/// Location of the persisted course list.
///
/// An explicit path wins; otherwise the platform data directory is used
/// (`~/.local/share/ustb-lesson/` on Linux).
pub fn data_file_path(explicit: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path);
    }
    let data = dirs::data_dir().ok_or_else(|| {
        ErrorKind::ConfigError("Could not determine data directory".to_string())
    })?;
    Ok(data.join("ustb-lesson").join(DATA_FILE_NAME))
}
