use crate::{
    layout::LayoutType,
    page_sequence::{ImageMetadata, advise_number_of_logical_pages},
    rotation::OrthogonalRotation,
    rule::Rule,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub layout_type: LayoutType,
    /// What the heuristic said, when it was consulted. Shown to the user
    /// even if a rule overrides it later.
    pub auto_detected: Option<LayoutType>,
}

impl Classification {
    pub fn single_page(&self) -> bool {
        self.layout_type.is_single_page()
    }
}

pub fn classify(
    rule: Rule,
    metadata: &ImageMetadata,
    pre_rotation: OrthogonalRotation,
) -> Classification {
    match rule {
        Rule::AutoDetect => {
            let advised = advise_number_of_logical_pages(metadata, pre_rotation);
            Classification {
                layout_type: advised,
                auto_detected: Some(advised),
            }
        }
        Rule::SinglePage => forced(LayoutType::SinglePage),
        Rule::TwoPages => forced(LayoutType::TwoPages),
    }
}

fn forced(layout_type: LayoutType) -> Classification {
    Classification {
        layout_type,
        auto_detected: None,
    }
}
