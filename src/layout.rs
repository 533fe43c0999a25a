use serde::{Deserialize, Serialize};

/// Single-vs-two-page classification of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LayoutType {
    SinglePage,
    TwoPages,
}

impl LayoutType {
    pub fn num_logical_pages(self) -> u8 {
        match self {
            LayoutType::SinglePage => 1,
            LayoutType::TwoPages => 2,
        }
    }

    pub fn is_single_page(self) -> bool {
        self == LayoutType::SinglePage
    }
}

/// Whether a stored layout came from detection or was fixed by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AutoManualMode {
    #[default]
    Auto,
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Split line in the coordinates of the pre-rotated image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplitLine {
    pub top: Point,
    pub bottom: Point,
}

impl SplitLine {
    pub fn vertical(x: f64, height: f64) -> Self {
        Self {
            top: Point { x, y: 0.0 },
            bottom: Point { x, y: height },
        }
    }

    /// Mean horizontal position, which is where a straight cut is made.
    pub fn mean_x(&self) -> f64 {
        (self.top.x + self.bottom.x) / 2.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LayoutKind {
    SinglePageUncut,
    LeftPagePlusOffcut,
    RightPagePlusOffcut,
    TwoPages,
}

/// Where an image is cut. Replaced wholesale, never edited in place.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageLayout {
    kind: LayoutKind,
    split_line: Option<SplitLine>,
}

impl PageLayout {
    pub fn single_page_uncut() -> Self {
        Self {
            kind: LayoutKind::SinglePageUncut,
            split_line: None,
        }
    }

    pub fn left_page_plus_offcut(line: SplitLine) -> Self {
        Self {
            kind: LayoutKind::LeftPagePlusOffcut,
            split_line: Some(line),
        }
    }

    pub fn right_page_plus_offcut(line: SplitLine) -> Self {
        Self {
            kind: LayoutKind::RightPagePlusOffcut,
            split_line: Some(line),
        }
    }

    pub fn two_pages(line: SplitLine) -> Self {
        Self {
            kind: LayoutKind::TwoPages,
            split_line: Some(line),
        }
    }

    pub fn kind(&self) -> LayoutKind {
        self.kind
    }

    pub fn split_line(&self) -> Option<&SplitLine> {
        self.split_line.as_ref()
    }

    pub fn num_sub_pages(&self) -> u8 {
        match self.kind {
            LayoutKind::TwoPages => 2,
            _ => 1,
        }
    }

    /// Whether every part this layout describes is non-empty on an image
    /// `width` pixels wide. A cut on or past an edge is not.
    pub fn fits_width(&self, width: u32) -> bool {
        match self.split_line {
            None => width > 0,
            Some(line) => {
                let x = line.mean_x().round();
                x.is_finite() && x >= 1.0 && x < f64::from(width)
            }
        }
    }

    /// Horizontal spans `[start, end)` of the sub-pages kept by this
    /// layout, for an image `width` pixels wide.
    pub fn sub_page_spans(&self, width: u32) -> Vec<(u32, u32)> {
        let cut = self
            .split_line
            .map(|l| l.mean_x().round().clamp(0.0, f64::from(width)) as u32);
        match (self.kind, cut) {
            (LayoutKind::TwoPages, Some(x)) => vec![(0, x), (x, width)],
            (LayoutKind::LeftPagePlusOffcut, Some(x)) => vec![(0, x)],
            (LayoutKind::RightPagePlusOffcut, Some(x)) => vec![(x, width)],
            _ => vec![(0, width)],
        }
        .into_iter()
        .filter(|(start, end)| end > start)
        .collect()
    }
}
