use anyhow::{Result, anyhow};
use image::DynamicImage;
use serde::{Deserialize, Serialize};

/// Rotation applied to the raw image before any layout work, in
/// multiples of 90 degrees clockwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OrthogonalRotation {
    #[default]
    None,
    Cw90,
    Cw180,
    Cw270,
}

impl OrthogonalRotation {
    pub fn from_degrees(degrees: i32) -> Result<Self> {
        match degrees.rem_euclid(360) {
            0 => Ok(Self::None),
            90 => Ok(Self::Cw90),
            180 => Ok(Self::Cw180),
            270 => Ok(Self::Cw270),
            other => Err(anyhow!("rotation must be a multiple of 90 degrees: {other}")),
        }
    }

    pub fn degrees(self) -> u32 {
        match self {
            Self::None => 0,
            Self::Cw90 => 90,
            Self::Cw180 => 180,
            Self::Cw270 => 270,
        }
    }

    pub fn next_clockwise(self) -> Self {
        match self {
            Self::None => Self::Cw90,
            Self::Cw90 => Self::Cw180,
            Self::Cw180 => Self::Cw270,
            Self::Cw270 => Self::None,
        }
    }

    fn swaps_axes(self) -> bool {
        matches!(self, Self::Cw90 | Self::Cw270)
    }

    /// Rotate a `(width, height)` pair.
    pub fn rotate_size<T>(self, size: (T, T)) -> (T, T) {
        if self.swaps_axes() {
            (size.1, size.0)
        } else {
            size
        }
    }

    pub fn apply(self, image: &DynamicImage) -> DynamicImage {
        match self {
            Self::None => image.clone(),
            Self::Cw90 => image.rotate90(),
            Self::Cw180 => image.rotate180(),
            Self::Cw270 => image.rotate270(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degrees_round_trip_and_wrap() {
        assert_eq!(OrthogonalRotation::from_degrees(-90).unwrap(), OrthogonalRotation::Cw270);
        assert_eq!(OrthogonalRotation::from_degrees(450).unwrap().degrees(), 90);
        assert!(OrthogonalRotation::from_degrees(45).is_err());
    }

    #[test]
    fn quarter_turns_swap_size() {
        assert_eq!(OrthogonalRotation::Cw90.rotate_size((4, 3)), (3, 4));
        assert_eq!(OrthogonalRotation::Cw180.rotate_size((4, 3)), (4, 3));
        assert_eq!(OrthogonalRotation::Cw270.next_clockwise(), OrthogonalRotation::None);
    }
}
