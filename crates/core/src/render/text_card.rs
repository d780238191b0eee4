use std::fmt::Write as _;

use crate::guidance::guidance_entry::GuidanceEntry;

/// Terminal rendering of a guidance card.
pub fn render_text_card(entry: &GuidanceEntry, count: Option<usize>) -> String {
    let mut out = String::new();
    let _ = write!(out, "{} {}", entry.emoji, entry.title);
    if let Some(n) = count {
        let _ = write!(out, "  [Detected: {n}]");
    }
    out.push('\n');

    if !entry.materials.is_empty() {
        let _ = writeln!(out, "Material: {}", entry.materials);
    }
    section(&mut out, "Why separate?", entry.why_separate.iter().copied(), false);
    section(&mut out, "How to put out", entry.steps.iter().copied(), true);
    if !entry.recycles_to.is_empty() {
        let _ = writeln!(out, "\nCommonly recycled into: {}", entry.recycles_to.join(" · "));
    }
    if !entry.facts.is_empty() {
        out.push_str("\nDid you know?\n");
        for fact in entry.facts {
            let _ = writeln!(out, "  - {}\n    {}", fact.text, fact.url);
        }
    }

    out.push('\n');
    if let Some(poster) = entry.poster {
        let _ = writeln!(out, "Local poster: {poster}");
    }
    let _ = writeln!(out, "Official local guidance: {}", entry.link);
    out
}

fn section<'a>(out: &mut String, title: &str, items: impl ExactSizeIterator<Item = &'a str>, numbered: bool) {
    if items.len() == 0 {
        return;
    }
    let _ = writeln!(out, "\n{title}");
    for (i, item) in items.enumerate() {
        if numbered {
            let _ = writeln!(out, "  {}. {item}", i + 1);
        } else {
            let _ = writeln!(out, "  - {item}");
        }
    }
}
