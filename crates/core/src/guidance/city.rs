use std::collections::BTreeMap;

use thiserror::Error;

use super::guidance_entry::GuidanceEntry;
use super::shibuya;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum GuidanceError {
    #[error("unknown city '{0}', available: {1}")]
    UnknownCity(String, String),
}

/// A ward whose sorting rules are available.
#[derive(Clone, Debug)]
pub struct City {
    pub id: &'static str,
    pub label: &'static str,
    guide: BTreeMap<&'static str, GuidanceEntry>,
}

impl City {
    /// Every city with guidance content. Only Shibuya so far.
    pub fn all() -> Vec<City> {
        vec![City {
            id: "shibuya",
            label: "Shibuya (Tokyo)",
            guide: shibuya::entries().into_iter().collect(),
        }]
    }

    pub fn from_id(id: &str) -> Result<City, GuidanceError> {
        Self::find(|c| c.id.eq_ignore_ascii_case(id.trim()), id)
    }

    /// Look up by display label, e.g. `Shibuya (Tokyo)`.
    pub fn from_label(label: &str) -> Result<City, GuidanceError> {
        Self::find(|c| c.label == label.trim(), label)
    }

    /// Accepts either an id (`shibuya`) or a display label (`Shibuya (Tokyo)`).
    pub fn lookup(query: &str) -> Result<City, GuidanceError> {
        Self::from_id(query).or_else(|_| Self::from_label(query))
    }

    pub fn default_city() -> City {
        Self::all().swap_remove(0)
    }

    fn find(pred: impl Fn(&City) -> bool, query: &str) -> Result<City, GuidanceError> {
        let all = Self::all();
        let ids = all.iter().map(|c| c.id).collect::<Vec<_>>().join(", ");
        all.into_iter()
            .find(|c| pred(c))
            .ok_or_else(|| GuidanceError::UnknownCity(query.to_string(), ids))
    }

    pub fn entry(&self, class_name: &str) -> Option<&GuidanceEntry> {
        self.guide.get(class_name)
    }

    /// Detected labels that have an entry in this city's guide, sorted and unique.
    pub fn guide_labels<S: AsRef<str>>(&self, detected: &[S]) -> Vec<String> {
        let mut labels: Vec<String> = detected
            .iter()
            .map(|s| s.as_ref())
            .filter(|s| self.guide.contains_key(*s))
            .map(str::to_string)
            .collect();
        labels.sort();
        labels.dedup();
        labels
    }

    pub fn covered_labels(&self) -> Vec<&'static str> {
        self.guide.keys().copied().collect()
    }
}
