use crate::{image_id::ImageId, layout::LayoutType};
use std::collections::BTreeMap;
use std::sync::Mutex;

/// Receives the number of logical pages found in each image.
pub trait PageCountRegistry: Send + Sync {
    fn set_logical_pages_in_image(&self, image: &ImageId, num_pages: u8);
}

/// Ordered list of images and how many logical pages each one holds.
/// Later stages number and navigate pages from this.
#[derive(Debug, Default)]
pub struct PageSequence {
    pages: Mutex<BTreeMap<ImageId, u8>>,
}

impl PageSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn logical_pages_in_image(&self, image: &ImageId) -> Option<u8> {
        self.pages
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(image)
            .copied()
    }

    /// Total logical pages over every image seen so far.
    pub fn total_logical_pages(&self) -> usize {
        self.pages
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .map(|&n| usize::from(n))
            .sum()
    }

    pub fn len(&self) -> usize {
        self.pages.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PageCountRegistry for PageSequence {
    fn set_logical_pages_in_image(&self, image: &ImageId, num_pages: u8) {
        self.pages
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(image.clone(), num_pages.clamp(1, 2));
    }
}

/// Metadata the single/two page heuristic needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageMetadata {
    pub width: u32,
    pub height: u32,
    /// Horizontal and vertical resolution; `None` means square pixels.
    pub dpi: Option<(f64, f64)>,
}

/// Guess the page count from the physical aspect ratio of the rotated
/// image: wider than tall means a two-page spread.
pub fn advise_number_of_logical_pages(
    metadata: &ImageMetadata,
    rotation: crate::rotation::OrthogonalRotation,
) -> LayoutType {
    let (w, h) = rotation.rotate_size((f64::from(metadata.width), f64::from(metadata.height)));
    let (dpi_x, dpi_y) = metadata
        .dpi
        .filter(|(x, y)| *x > 0.0 && *y > 0.0)
        .map(|d| rotation.rotate_size(d))
        .unwrap_or((1.0, 1.0));
    if w * dpi_y > h * dpi_x {
        LayoutType::TwoPages
    } else {
        LayoutType::SinglePage
    }
}
