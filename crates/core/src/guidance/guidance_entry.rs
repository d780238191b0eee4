use serde::Serialize;

/// A "did you know" line with its source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Fact {
    pub text: &'static str,
    pub url: &'static str,
}

/// Hand-authored sorting instructions for one detected class.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GuidanceEntry {
    pub title: &'static str,
    pub emoji: &'static str,
    pub materials: &'static str,
    pub why_separate: &'static [&'static str],
    pub steps: &'static [&'static str],
    pub recycles_to: &'static [&'static str],
    pub facts: &'static [Fact],
    /// Step photos or process diagrams.
    pub images: &'static [&'static str],
    /// Recycling marks.
    pub icons: &'static [&'static str],
    /// Official local guidance page.
    pub link: &'static str,
    pub poster: Option<&'static str>,
}
