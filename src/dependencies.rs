use crate::{layout::AutoManualMode, rotation::OrthogonalRotation, util::image_signature};
use image::DynamicImage;
use serde::{Deserialize, Serialize};

/// Everything about the input that a stored layout was derived from.
///
/// A stored layout stays valid only while a freshly built `Dependencies`
/// still [`matches`](Dependencies::matches) the one saved with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependencies {
    content_signature: String,
    pre_rotation: OrthogonalRotation,
    single_page: bool,
}

impl Dependencies {
    pub fn new(image: &DynamicImage, pre_rotation: OrthogonalRotation, single_page: bool) -> Self {
        Self::from_parts(image_signature(image), pre_rotation, single_page)
    }

    pub fn from_parts(
        content_signature: impl Into<String>,
        pre_rotation: OrthogonalRotation,
        single_page: bool,
    ) -> Self {
        Self {
            content_signature: content_signature.into(),
            pre_rotation,
            single_page,
        }
    }

    pub fn content_signature(&self) -> &str {
        &self.content_signature
    }

    pub fn pre_rotation(&self) -> OrthogonalRotation {
        self.pre_rotation
    }

    pub fn single_page(&self) -> bool {
        self.single_page
    }

    /// A manual layout survives a changed single-page hint but not a
    /// different image or rotation. An automatic one needs every field.
    pub fn matches(&self, cached: &Dependencies, mode: AutoManualMode) -> bool {
        if self.content_signature != cached.content_signature {
            return false;
        }
        if self.pre_rotation != cached.pre_rotation {
            return false;
        }
        match mode {
            AutoManualMode::Manual => true,
            AutoManualMode::Auto => self.single_page == cached.single_page,
        }
    }
}
