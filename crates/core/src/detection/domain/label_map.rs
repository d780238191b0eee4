use std::collections::BTreeMap;

use crate::shared::constants::CLASS_NAMES;

/// Class-id → display name.
///
/// Built from the names embedded in the checkpoint when present,
/// otherwise from the fallback [`CLASS_NAMES`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabelMap {
    names: BTreeMap<usize, String>,
    from_checkpoint: bool,
}

impl LabelMap {
    pub fn fallback() -> Self {
        Self {
            names: CLASS_NAMES
                .iter()
                .enumerate()
                .map(|(i, n)| (i, n.to_string()))
                .collect(),
            from_checkpoint: false,
        }
    }

    pub fn from_names(names: BTreeMap<usize, String>) -> Self {
        Self {
            names,
            from_checkpoint: true,
        }
    }

    /// Parses the ultralytics `names` metadata, e.g. `{0: 'Drink can', 1: "Cap"}`.
    ///
    /// Returns `None` for anything that is not a non-empty dict literal.
    pub fn parse_metadata(raw: &str) -> Option<Self> {
        let body = raw.trim().strip_prefix('{')?.strip_suffix('}')?;
        let mut names = BTreeMap::new();
        let mut rest = body.trim();

        while !rest.is_empty() {
            let (key, after_key) = rest.split_once(':')?;
            let id: usize = key.trim().parse().ok()?;

            let after_key = after_key.trim_start();
            let quote = after_key.chars().next().filter(|c| *c == '\'' || *c == '"')?;
            let value_and_rest = &after_key[1..];
            let end = value_and_rest.find(quote)?;
            names.insert(id, value_and_rest[..end].to_string());

            rest = value_and_rest[end + 1..].trim_start();
            rest = rest.strip_prefix(',').unwrap_or(rest).trim_start();
        }

        if names.is_empty() {
            None
        } else {
            Some(Self::from_names(names))
        }
    }

    /// Name for `class_id`, or the id itself when the map has no entry.
    pub fn name(&self, class_id: usize) -> String {
        self.names
            .get(&class_id)
            .cloned()
            .unwrap_or_else(|| class_id.to_string())
    }

    pub fn names(&self) -> Vec<&str> {
        self.names.values().map(String::as_str).collect()
    }

    pub fn is_from_checkpoint(&self) -> bool {
        self.from_checkpoint
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for LabelMap {
    fn default() -> Self {
        Self::fallback()
    }
}
