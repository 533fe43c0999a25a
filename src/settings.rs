use crate::{image_id::ImageId, params::Params, rule::Rule, util::ensure_dir};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

/// Read side of the per-image rule storage.
pub trait RuleRepository: Send + Sync {
    fn rule_for(&self, image: &ImageId) -> Rule;
}

/// Keyed storage of per-image [`Params`].
pub trait ParamsStore: Send + Sync {
    fn page_params(&self, image: &ImageId) -> Option<Params>;
    fn set_page_params(&self, image: &ImageId, params: Params);
    fn clear_page_params(&self, image: &ImageId) -> Option<Params>;
}

/// Rule and params storage behind one handle.
pub trait SettingsStore: RuleRepository + ParamsStore {}

impl<T: RuleRepository + ParamsStore> SettingsStore for T {}

#[derive(Debug, Default)]
struct State {
    default_rule: Rule,
    rules: BTreeMap<ImageId, Rule>,
    params: BTreeMap<ImageId, Params>,
}

/// Rules and cached layouts for every image of a project.
///
/// Shared between worker runs; each access locks briefly and never holds
/// the lock across a computation.
#[derive(Debug, Default)]
pub struct Settings {
    state: Mutex<State>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SettingsFile {
    #[serde(default)]
    default_rule: Rule,
    #[serde(default)]
    rules: Vec<RuleEntry>,
    #[serde(default)]
    params: Vec<ParamsEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RuleEntry {
    image: ImageId,
    rule: Rule,
}

#[derive(Debug, Serialize, Deserialize)]
struct ParamsEntry {
    image: ImageId,
    params: Params,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from `path`; a missing file yields empty settings.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("settings file {} not found; starting empty", path.display());
            return Ok(Self::new());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading settings: {}", path.display()))?;
        let file: SettingsFile = serde_json::from_str(&raw)
            .with_context(|| format!("parsing settings: {}", path.display()))?;
        let state = State {
            default_rule: file.default_rule,
            rules: file.rules.into_iter().map(|e| (e.image, e.rule)).collect(),
            params: file.params.into_iter().map(|e| (e.image, e.params)).collect(),
        };
        debug!(
            "loaded settings rules={} params={}",
            state.rules.len(),
            state.params.len()
        );
        Ok(Self {
            state: Mutex::new(state),
        })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let file = {
            let state = self.lock();
            SettingsFile {
                default_rule: state.default_rule,
                rules: state
                    .rules
                    .iter()
                    .map(|(image, rule)| RuleEntry {
                        image: image.clone(),
                        rule: *rule,
                    })
                    .collect(),
                params: state
                    .params
                    .iter()
                    .map(|(image, params)| ParamsEntry {
                        image: image.clone(),
                        params: params.clone(),
                    })
                    .collect(),
            }
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            ensure_dir(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(&file)?)
            .with_context(|| format!("writing settings: {}", path.display()))
    }

    pub fn set_rule(&self, image: &ImageId, rule: Rule) {
        self.lock().rules.insert(image.clone(), rule);
    }

    /// Make `rule` the default and drop every per-image override.
    pub fn set_rule_for_all(&self, rule: Rule) {
        let mut state = self.lock();
        state.default_rule = rule;
        state.rules.clear();
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // Every update is a single map operation; poisoning is ignored.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl RuleRepository for Settings {
    fn rule_for(&self, image: &ImageId) -> Rule {
        let state = self.lock();
        state.rules.get(image).copied().unwrap_or(state.default_rule)
    }
}

impl ParamsStore for Settings {
    fn page_params(&self, image: &ImageId) -> Option<Params> {
        self.lock().params.get(image).cloned()
    }

    fn set_page_params(&self, image: &ImageId, params: Params) {
        self.lock().params.insert(image.clone(), params);
    }

    fn clear_page_params(&self, image: &ImageId) -> Option<Params> {
        self.lock().params.remove(image)
    }
}
