use crate::{
    dependencies::Dependencies,
    layout::{AutoManualMode, PageLayout},
};
use serde::{Deserialize, Serialize};

/// Stored result for one image: the layout, what it was computed from,
/// and who decided it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Params {
    page_layout: PageLayout,
    dependencies: Dependencies,
    mode: AutoManualMode,
}

impl Params {
    pub fn new(page_layout: PageLayout, dependencies: Dependencies, mode: AutoManualMode) -> Self {
        Self {
            page_layout,
            dependencies,
            mode,
        }
    }

    pub fn page_layout(&self) -> &PageLayout {
        &self.page_layout
    }

    pub fn dependencies(&self) -> &Dependencies {
        &self.dependencies
    }

    pub fn mode(&self) -> AutoManualMode {
        self.mode
    }

    /// The cached layout if it is still valid for `current`.
    pub fn layout_if_valid(&self, current: &Dependencies) -> Option<PageLayout> {
        current
            .matches(&self.dependencies, self.mode)
            .then_some(self.page_layout)
    }
}
