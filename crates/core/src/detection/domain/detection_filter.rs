use serde::{Deserialize, Serialize};

use crate::shared::constants::{BOTTLE, CAN, CAP};
use crate::shared::detection::Detection;

pub const CLASS_MIN_RANGE: std::ops::RangeInclusive<f64> = 0.0..=1.0;
pub const MIN_AREA_PCT_RANGE: std::ops::RangeInclusive<f64> = 0.0..=5.0;

/// Post-model thresholds applied to every prediction.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FilterSettings {
    pub bottle_min: f64,
    pub can_min: f64,
    pub cap_min: f64,
    /// Ignore boxes smaller than this percentage of the image area.
    pub min_area_pct: f64,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            bottle_min: 0.0,
            can_min: 0.0,
            cap_min: 0.0,
            min_area_pct: 0.0,
        }
    }
}

impl FilterSettings {
    /// Minimum score for `class_name`, or `None` for classes without one.
    pub fn class_min(&self, class_name: &str) -> Option<f64> {
        match class_name {
            BOTTLE => Some(self.bottle_min),
            CAN => Some(self.can_min),
            CAP => Some(self.cap_min),
            _ => None,
        }
    }
}

/// Detections that survived filtering plus a per-name tally.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FilterOutcome {
    pub kept: Vec<Detection>,
    /// Class name → kept count, in first-seen order.
    pub counts: Vec<(String, usize)>,
}

impl FilterOutcome {
    pub fn count(&self, class_name: &str) -> usize {
        self.counts
            .iter()
            .find(|(name, _)| name == class_name)
            .map_or(0, |(_, n)| *n)
    }

    /// Sorted unique class names among the kept detections.
    pub fn labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = self.counts.iter().map(|(n, _)| n.clone()).collect();
        labels.sort();
        labels
    }

    /// Counts ordered by descending count, ties by name.
    pub fn counts_descending(&self) -> Vec<(String, usize)> {
        let mut sorted = self.counts.clone();
        sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        sorted
    }
}

/// Drops detections below their class threshold or below the minimum box area.
///
/// Classes without their own threshold use `base_conf`. The minimum area is
/// `min_area_pct` percent of `image_width * image_height`.
pub fn filter_detections(
    detections: &[Detection],
    settings: &FilterSettings,
    base_conf: f64,
    image_width: u32,
    image_height: u32,
) -> FilterOutcome {
    let min_area = (settings.min_area_pct / 100.0) * (image_width as f64 * image_height as f64);

    let mut outcome = FilterOutcome::default();
    for det in detections {
        let class_min = settings.class_min(&det.class_name).unwrap_or(base_conf);
        if det.score < class_min {
            continue;
        }
        if det.area() < min_area {
            continue;
        }

        match outcome.counts.iter_mut().find(|(n, _)| *n == det.class_name) {
            Some((_, n)) => *n += 1,
            None => outcome.counts.push((det.class_name.clone(), 1)),
        }
        outcome.kept.push(det.clone());
    }

    log::debug!(
        "Kept {}/{} detections (min area {:.1}px²)",
        outcome.kept.len(),
        detections.len(),
        min_area
    );
    outcome
}
