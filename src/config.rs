use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub global: Global,
    #[serde(default)]
    pub paths: Paths,
    #[serde(default)]
    pub split: Split,
    #[serde(default)]
    pub limits: Limits,
    #[serde(default)]
    pub output: Output,
    #[serde(default)]
    pub logging: Logging,
    #[serde(default)]
    pub debug: Debug,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config: {}", path.display()))?;
        let cfg: Config = toml::from_str(&raw).with_context(|| "parsing TOML")?;
        Ok(cfg)
    }

    /// Load `path` if given, else fall back to defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Global {
    pub job_name: String,
    /// Worker threads for per-image runs; 0 lets rayon decide.
    pub max_parallel_images: usize,
    pub print_summary: bool,
}
impl Default for Global {
    fn default() -> Self {
        Self {
            job_name: "default".into(),
            max_parallel_images: 0,
            print_summary: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Paths {
    pub settings_file: String,
    pub out_dir: String,
    pub debug_dir: String,
}
impl Default for Paths {
    fn default() -> Self {
        Self {
            settings_file: ".page-split/settings.json".into(),
            out_dir: "out".into(),
            debug_dir: "out/debug".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Split {
    /// Luma below this counts as ink.
    pub bw_threshold: u8,
    /// Minimum share of ink pixels for the projection to be trusted.
    pub min_content_ratio: f32,
    /// A side holding less than this share of the ink is an offcut.
    pub offcut_mass_ratio: f32,
    /// Share of the width at each edge excluded from the gutter search.
    pub edge_exclusion_ratio: f32,
    /// Resolution assumed for files that record none. Either axis at 0
    /// means square pixels.
    pub default_dpi_x: f64,
    pub default_dpi_y: f64,
}
impl Default for Split {
    fn default() -> Self {
        Self {
            bw_threshold: 128,
            min_content_ratio: 0.002,
            offcut_mass_ratio: 0.08,
            edge_exclusion_ratio: 0.12,
            default_dpi_x: 0.0,
            default_dpi_y: 0.0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Cancel outstanding runs after this many seconds; 0 disables.
    pub job_timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Output {
    pub write_sub_pages: bool,
    pub write_report_json: bool,
    pub report_filename: String,
    pub image_format: String,
}
impl Default for Output {
    fn default() -> Self {
        Self {
            write_sub_pages: false,
            write_report_json: true,
            report_filename: "report.json".into(),
            image_format: "png".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Logging {
    pub level: String,
    pub json: bool,
    pub write_to_file: bool,
    pub file_path: String,
}
impl Default for Logging {
    fn default() -> Self {
        Self {
            level: "info".into(),
            json: false,
            write_to_file: false,
            file_path: "".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Debug {
    /// Collect intermediate images from the split-line search.
    pub enabled: bool,
    pub dump_effective_config: bool,
}
impl Default for Debug {
    fn default() -> Self {
        Self {
            enabled: false,
            dump_effective_config: true,
        }
    }
}
