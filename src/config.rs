// src/config.rs
use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

pub const ENV_CONFIG_PATH: &str = "FEED_EXPORT_CONFIG";
pub const ENV_URL: &str = "FEED_EXPORT_URL";
pub const ENV_OUTPUT: &str = "FEED_EXPORT_OUTPUT";
pub const ENV_LABELS: &str = "FEED_EXPORT_LABELS";
pub const ENV_ON_MISSING: &str = "FEED_EXPORT_ON_MISSING";
pub const ENV_TIMEOUT_SECS: &str = "FEED_EXPORT_TIMEOUT_SECS";

pub const DEFAULT_FEED_URL: &str = "https://scon.stj.jus.br/SCON/PesquisaProntaFeed";
pub const DEFAULT_OUTPUT_PATH: &str = "data/output.csv";
const DEFAULT_TOML_PATH: &str = "config/feed_export.toml";
const DEFAULT_JSON_PATH: &str = "config/feed_export.json";

/// Column labels, sentinels and console message in one language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Labels {
    pub title: &'static str,
    pub date: &'static str,
    pub link: &'static str,
    pub description: &'static str,
    /// Written when an entry has no publish date.
    pub no_date: &'static str,
    /// Written when an entry has no summary.
    pub no_description: &'static str,
    pub success: &'static str,
}

impl Labels {
    pub const ENGLISH: Labels = Labels {
        title: "Title",
        date: "Date",
        link: "Link",
        description: "Description",
        no_date: "no date",
        no_description: "no description",
        success: "CSV file generated successfully at",
    };

    pub const PORTUGUESE: Labels = Labels {
        title: "Título",
        date: "Data",
        link: "Link",
        description: "Descrição",
        no_date: "Sem data",
        no_description: "Sem descrição",
        success: "Arquivo CSV gerado com sucesso em",
    };

    pub fn header(&self) -> [&'static str; 4] {
        [self.title, self.date, self.link, self.description]
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LabelSet {
    #[default]
    #[serde(rename = "en", alias = "english")]
    English,
    #[serde(rename = "pt-br", alias = "pt", alias = "portuguese")]
    Portuguese,
}

impl LabelSet {
    pub fn labels(&self) -> Labels {
        match self {
            LabelSet::English => Labels::ENGLISH,
            LabelSet::Portuguese => Labels::PORTUGUESE,
        }
    }
}

impl FromStr for LabelSet {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Ok(LabelSet::English),
            "pt-br" | "pt" | "portuguese" => Ok(LabelSet::Portuguese),
            other => bail!("unknown label set {other:?} (expected \"en\" or \"pt-br\")"),
        }
    }
}

/// What to do with an entry lacking a title or link.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingFieldPolicy {
    /// Abort the export with `ExportError::MissingField`.
    #[default]
    Fail,
    /// Drop the entry and keep going.
    Skip,
}

impl FromStr for MissingFieldPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fail" => Ok(MissingFieldPolicy::Fail),
            "skip" => Ok(MissingFieldPolicy::Skip),
            other => {
                bail!("unknown missing-field policy {other:?} (expected \"fail\" or \"skip\")")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub feed_url: String,
    pub output_path: PathBuf,
    pub labels: LabelSet,
    pub on_missing: MissingFieldPolicy,
    /// Whole-request timeout; unset means wait for the transport.
    pub timeout_secs: Option<u64>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            feed_url: DEFAULT_FEED_URL.to_string(),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            labels: LabelSet::default(),
            on_missing: MissingFieldPolicy::default(),
            timeout_secs: None,
        }
    }
}

impl ExportConfig {
    /// Load from an explicit path. Supports TOML or JSON formats.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading export config from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        parse_config(&content, ext.as_str())
            .with_context(|| format!("parsing export config {}", path.display()))
    }

    /// Load using env var + fallbacks, then apply env overrides:
    /// 1) $FEED_EXPORT_CONFIG
    /// 2) config/feed_export.toml
    /// 3) config/feed_export.json
    /// 4) built-in defaults
    pub fn load_default() -> Result<Self> {
        let base = if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!(
                    "{ENV_CONFIG_PATH} points to non-existent path {}",
                    pb.display()
                ));
            }
            Self::load_from(&pb)?
        } else if Path::new(DEFAULT_TOML_PATH).exists() {
            Self::load_from(Path::new(DEFAULT_TOML_PATH))?
        } else if Path::new(DEFAULT_JSON_PATH).exists() {
            Self::load_from(Path::new(DEFAULT_JSON_PATH))?
        } else {
            Self::default()
        };

        let cfg = base.with_overrides(|key| std::env::var(key).ok())?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Apply `FEED_EXPORT_*` overrides read through `get`. Blank values are ignored.
    pub fn with_overrides<F>(mut self, get: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| get(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get(ENV_URL) {
            self.feed_url = url.trim().to_string();
        }
        if let Some(out) = get(ENV_OUTPUT) {
            self.output_path = PathBuf::from(out.trim());
        }
        if let Some(v) = get(ENV_LABELS) {
            self.labels = v
                .parse::<LabelSet>()
                .with_context(|| format!("parsing {ENV_LABELS}"))?;
        }
        if let Some(v) = get(ENV_ON_MISSING) {
            self.on_missing = v
                .parse::<MissingFieldPolicy>()
                .with_context(|| format!("parsing {ENV_ON_MISSING}"))?;
        }
        if let Some(v) = get(ENV_TIMEOUT_SECS) {
            let secs = v
                .trim()
                .parse::<u64>()
                .with_context(|| format!("parsing {ENV_TIMEOUT_SECS}={v:?}"))?;
            self.timeout_secs = Some(secs);
        }
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.feed_url.trim().is_empty() {
            bail!("feed_url must not be empty");
        }
        if self.output_path.file_name().is_none() {
            bail!(
                "output_path {:?} does not name a file",
                self.output_path.display().to_string()
            );
        }
        if self.timeout_secs == Some(0) {
            bail!("timeout_secs must be positive when set");
        }
        Ok(())
    }

    pub fn labels(&self) -> Labels {
        self.labels.labels()
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

fn parse_config(s: &str, hint_ext: &str) -> Result<ExportConfig> {
    // Hinted format first, the other one as fallback; report the hinted error.
    match hint_ext {
        "json" => parse_json(s).or_else(|e| parse_toml(s).map_err(|_| e)),
        _ => parse_toml(s).or_else(|e| parse_json(s).map_err(|_| e)),
    }
}

fn parse_toml(s: &str) -> Result<ExportConfig> {
    Ok(toml::from_str(s)?)
}

fn parse_json(s: &str) -> Result<ExportConfig> {
    Ok(serde_json::from_str(s)?)
}
