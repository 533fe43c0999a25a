use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Identity of one scanned image: source file plus page index inside it
/// (multi-page containers such as TIFF hold more than one image).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ImageId {
    pub path: PathBuf,
    #[serde(default)]
    pub page: u32,
}

impl ImageId {
    pub fn new(path: impl Into<PathBuf>, page: u32) -> Self {
        Self {
            path: path.into(),
            page,
        }
    }

    pub fn from_path(path: &Path) -> Self {
        Self::new(path, 0)
    }

    /// File stem used when naming derived outputs.
    pub fn stem(&self) -> String {
        let stem = self
            .path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("image");
        if self.page == 0 {
            stem.to_string()
        } else {
            format!("{stem}_p{}", self.page)
        }
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.page == 0 {
            write!(f, "{}", self.path.display())
        } else {
            write!(f, "{}#{}", self.path.display(), self.page)
        }
    }
}
