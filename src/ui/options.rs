use super::UiData;
use crate::{
    image_id::ImageId,
    layout::{AutoManualMode, PageLayout},
    params::Params,
    settings::SettingsStore,
};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{info, warn};

#[derive(Debug, Default)]
struct PanelState {
    image: Option<ImageId>,
    ui_data: Option<UiData>,
}

/// Options panel state for the image currently on screen.
///
/// Also where manual edits land: a layout set by the user is stored as
/// `MANUAL` params with the dependencies of the displayed run.
pub struct OptionsPanel {
    settings: Arc<dyn SettingsStore>,
    state: Mutex<PanelState>,
}

impl OptionsPanel {
    pub fn new(settings: Arc<dyn SettingsStore>) -> Self {
        Self {
            settings,
            state: Mutex::new(PanelState::default()),
        }
    }

    pub fn post_update_ui(&self, image: &ImageId, ui_data: UiData) {
        let mut state = self.lock();
        state.image = Some(image.clone());
        state.ui_data = Some(ui_data);
    }

    pub fn current_image(&self) -> Option<ImageId> {
        self.lock().image.clone()
    }

    pub fn ui_data(&self) -> Option<UiData> {
        self.lock().ui_data.clone()
    }

    pub fn manual_page_layout_set(&self, layout: PageLayout) {
        let mut state = self.lock();
        let PanelState {
            image: Some(image),
            ui_data: Some(ui_data),
        } = &mut *state
        else {
            warn!("manual layout ignored: no image is shown");
            return;
        };

        ui_data.set_manual_layout(layout);
        self.settings.set_page_params(
            image,
            Params::new(layout, ui_data.dependencies().clone(), AutoManualMode::Manual),
        );
        info!(%image, kind = ?layout.kind(), "manual layout stored");
    }

    /// Drop the stored layout of the shown image so the next run detects
    /// it again.
    pub fn reset_to_auto(&self) {
        let mut state = self.lock();
        let Some(image) = state.image.clone() else {
            return;
        };
        self.settings.clear_page_params(&image);
        if let Some(ui_data) = state.ui_data.as_mut() {
            ui_data.mode = AutoManualMode::Auto;
        }
        info!(%image, "layout reset to automatic");
    }

    fn lock(&self) -> MutexGuard<'_, PanelState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}
