pub mod projection;

use crate::{layout::PageLayout, rotation::OrthogonalRotation};
use anyhow::Result;
use image::{DynamicImage, GrayImage};

pub use projection::ProjectionLocator;

/// Finds where an image should be cut.
///
/// Called only on a cache miss. Implementations must be deterministic:
/// the same pixels, rotation, threshold and flag give the same layout.
pub trait SplitLineLocator: Send + Sync {
    fn find_split_line(
        &self,
        image: &DynamicImage,
        pre_rotation: OrthogonalRotation,
        bw_threshold: u8,
        single_page: bool,
        debug: Option<&mut DebugImages>,
    ) -> Result<PageLayout>;
}

/// Intermediate images collected while locating a split line.
#[derive(Debug, Default, Clone)]
pub struct DebugImages {
    items: Vec<(String, GrayImage)>,
}

impl DebugImages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, label: impl Into<String>, image: GrayImage) {
        self.items.push((label.into(), image));
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &GrayImage)> {
        self.items.iter().map(|(label, img)| (label.as_str(), img))
    }
}
