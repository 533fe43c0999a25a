use crate::{
    image_id::ImageId,
    layout::{AutoManualMode, PageLayout},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobReport {
    pub job_name: String,
    pub started: String,
    pub finished: String,
    pub total_images: usize,
    pub total_logical_pages: usize,
    pub items: Vec<ItemReport>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    Ok,
    Cancelled,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemReport {
    pub image: ImageId,
    pub status: ItemStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<PageLayout>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<AutoManualMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_pages: Option<u8>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub outputs: Vec<PathBuf>,
}

impl JobReport {
    pub fn count(&self, status: ItemStatus) -> usize {
        self.items.iter().filter(|i| i.status == status).count()
    }

    pub fn attach_outputs(&mut self, outputs: &BTreeMap<ImageId, Vec<PathBuf>>) {
        for item in &mut self.items {
            if let Some(paths) = outputs.get(&item.image) {
                item.outputs = paths.clone();
            }
        }
    }
}
