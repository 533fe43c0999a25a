use super::{FilterUiInterface, ImageView, OptionsPanel, UiData};
use crate::{image_id::ImageId, locator::DebugImages, util::ensure_dir};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// One materialized page-split result.
#[derive(Debug, Clone, Serialize)]
pub struct ShownImage {
    pub image: ImageId,
    pub ui_data: Option<UiData>,
    pub debug_images: Vec<PathBuf>,
}

/// UI without a screen: records what would be displayed and writes debug
/// images to disk. Used by the command line and by tests.
#[derive(Default)]
pub struct HeadlessUi {
    debug_dir: Option<PathBuf>,
    panel: Option<Arc<OptionsPanel>>,
    view: Option<ImageView>,
    shown: Vec<ShownImage>,
    outputs: BTreeMap<ImageId, Vec<PathBuf>>,
}

impl HeadlessUi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_debug_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.debug_dir = Some(dir.into());
        self
    }

    pub fn options_panel(&self) -> Option<&Arc<OptionsPanel>> {
        self.panel.as_ref()
    }

    /// The view most recently installed.
    pub fn image_view_mut(&mut self) -> Option<&mut ImageView> {
        self.view.as_mut()
    }

    pub fn shown(&self) -> &[ShownImage] {
        &self.shown
    }

    pub fn outputs(&self) -> &BTreeMap<ImageId, Vec<PathBuf>> {
        &self.outputs
    }

    fn write_debug_images(&self, image: &ImageId, dbg: &DebugImages) -> Vec<PathBuf> {
        let Some(dir) = self.debug_dir.as_deref() else {
            return Vec::new();
        };
        match write_debug_images(dir, image, dbg) {
            Ok(paths) => paths,
            Err(err) => {
                warn!(%image, "failed to write debug images: {err:#}");
                Vec::new()
            }
        }
    }
}

fn write_debug_images(dir: &Path, image: &ImageId, dbg: &DebugImages) -> anyhow::Result<Vec<PathBuf>> {
    ensure_dir(dir)?;
    let mut paths = Vec::with_capacity(dbg.len());
    for (idx, (label, img)) in dbg.iter().enumerate() {
        let path = dir.join(format!("{}_{idx:02}_{label}.png", image.stem()));
        img.save(&path)?;
        debug!("debug image {}", path.display());
        paths.push(path);
    }
    Ok(paths)
}

impl FilterUiInterface for HeadlessUi {
    fn set_options_panel(&mut self, panel: Arc<OptionsPanel>) {
        self.panel = Some(panel);
    }

    fn set_image_view(&mut self, view: ImageView, debug: Option<DebugImages>) {
        let debug_images = debug
            .as_ref()
            .map(|dbg| self.write_debug_images(view.image_id(), dbg))
            .unwrap_or_default();
        let ui_data = self.panel.as_ref().and_then(|p| p.ui_data());
        self.shown.push(ShownImage {
            image: view.image_id().clone(),
            ui_data,
            debug_images,
        });
        self.view = Some(view);
    }

    fn show_outputs(&mut self, image: &ImageId, outputs: Vec<PathBuf>) {
        self.outputs.insert(image.clone(), outputs);
    }
}
