use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// User preference for how an image is to be split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Rule {
    #[default]
    AutoDetect,
    SinglePage,
    TwoPages,
}

impl FromStr for Rule {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "auto" | "auto_detect" => Ok(Rule::AutoDetect),
            "single" | "single_page" => Ok(Rule::SinglePage),
            "two" | "two_pages" => Ok(Rule::TwoPages),
            other => Err(anyhow!("unknown layout rule: {other} (expected auto|single|two)")),
        }
    }
}
