use serde::{Deserialize, Serialize};

use crate::detection::domain::detection_filter::FilterSettings;
use crate::shared::constants::{closest_size, DEFAULT_IMGSZ, IMGSZ_OPTIONS};

pub const CONF_RANGE: std::ops::RangeInclusive<f64> = 0.05..=0.95;
pub const IOU_RANGE: std::ops::RangeInclusive<f64> = 0.10..=0.90;

/// Parameters handed to the model for one prediction.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct InferenceSettings {
    /// Base confidence; also the fallback minimum for classes without
    /// their own threshold.
    pub conf: f64,
    pub iou: f64,
    pub imgsz: u32,
    /// Also predict on the mirrored image and merge the results.
    pub tta: bool,
}

impl InferenceSettings {
    /// Returns a copy with `imgsz` snapped to a supported size.
    pub fn snapped(mut self) -> Self {
        self.imgsz = closest_size(self.imgsz, IMGSZ_OPTIONS);
        self
    }
}

impl Default for InferenceSettings {
    fn default() -> Self {
        Preset::Minimum.inference(DEFAULT_IMGSZ)
    }
}

/// Threshold bundles offered in the advanced settings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    #[default]
    Minimum,
    Recommended,
    Strict,
}

impl Preset {
    pub const ALL: &[Preset] = &[Preset::Minimum, Preset::Recommended, Preset::Strict];

    pub fn inference(self, imgsz: u32) -> InferenceSettings {
        let (conf, iou) = match self {
            Preset::Minimum => (0.05, 0.10),
            Preset::Recommended => (0.25, 0.45),
            Preset::Strict => (0.35, 0.50),
        };
        InferenceSettings {
            conf,
            iou,
            imgsz: closest_size(imgsz, IMGSZ_OPTIONS),
            tta: false,
        }
    }

    pub fn filter(self) -> FilterSettings {
        match self {
            Preset::Minimum => FilterSettings {
                bottle_min: 0.0,
                can_min: 0.0,
                cap_min: 0.0,
                min_area_pct: 0.0,
            },
            Preset::Recommended => FilterSettings {
                bottle_min: 0.60,
                can_min: 0.55,
                cap_min: 0.65,
                min_area_pct: 0.3,
            },
            Preset::Strict => FilterSettings {
                bottle_min: 0.70,
                can_min: 0.70,
                cap_min: 0.75,
                min_area_pct: 0.5,
            },
        }
    }
}

impl std::fmt::Display for Preset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Preset::Minimum => write!(f, "Minimum filters"),
            Preset::Recommended => write!(f, "Recommended"),
            Preset::Strict => write!(f, "Strict"),
        }
    }
}

impl std::str::FromStr for Preset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "minimum" | "min" => Ok(Preset::Minimum),
            "recommended" => Ok(Preset::Recommended),
            "strict" => Ok(Preset::Strict),
            other => Err(format!(
                "Preset must be one of: minimum, recommended, strict, got '{other}'"
            )),
        }
    }
}
