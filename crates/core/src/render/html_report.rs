use std::fmt::Write as _;
use std::path::Path;

use super::theme::CSS;
use crate::detection::domain::detection_filter::FilterOutcome;
use crate::guidance::city::City;
use crate::guidance::guidance_entry::GuidanceEntry;
use crate::guidance::impact::{CARBON_CREDIT_NOTES, CARBON_LINKS, SDG_FOCUS};

pub const NO_DETECTIONS: &str = "No detections";
pub const ALL_FILTERED: &str =
    "All detections were filtered by thresholds. Try lowering per-class thresholds or min box area.";
pub const NO_GUIDANCE: &str = "No local guidance to show for these detections.";

/// What the detection section of the page shows.
#[derive(Debug)]
pub enum ResultView<'a> {
    NoDetections,
    AllFiltered,
    Detected {
        outcome: &'a FilterOutcome,
        /// Relative URL of the annotated image.
        annotated_src: Option<&'a str>,
    },
}

/// Self-contained results page: theme, header, how-to, detection results,
/// guidance cards and the impact section.
pub struct HtmlReport<'a> {
    city: &'a City,
    result: ResultView<'a>,
    input_src: Option<&'a str>,
    logo_src: Option<&'a str>,
}

impl<'a> HtmlReport<'a> {
    pub fn new(city: &'a City, result: ResultView<'a>) -> Self {
        Self {
            city,
            result,
            input_src: None,
            logo_src: None,
        }
    }

    pub fn with_input_image(mut self, src: &'a str) -> Self {
        self.input_src = Some(src);
        self
    }

    pub fn with_logo(mut self, src: &'a str) -> Self {
        self.logo_src = Some(src);
        self
    }

    pub fn write_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.render())
    }

    pub fn render(&self) -> String {
        let mut html = String::new();
        html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
        html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
        html.push_str("<title>When AI Sees Litter</title>\n<style>");
        html.push_str(CSS);
        html.push_str("</style>\n</head>\n<body>\n<main>\n");

        self.header(&mut html);
        self.hero(&mut html);
        self.detect_section(&mut html);
        impact_section(&mut html);

        html.push_str("</main>\n</body>\n</html>\n");
        html
    }

    fn header(&self, html: &mut String) {
        html.push_str("<div class=\"brand\">");
        if let Some(logo) = self.logo_src {
            let _ = write!(html, "<img src=\"{}\" alt=\"logo\">", escape(logo));
        }
        html.push_str("<div class=\"name\">When AI Sees Litter</div></div>\n");

        let _ = write!(
            html,
            "<div class=\"section citybar\"><span>City / Ward: <b>{}</b></span>\
             <div class=\"citybadge\">More cities coming soon</div></div>\n",
            escape(self.city.label)
        );
    }

    fn hero(&self, html: &mut String) {
        let _ = write!(
            html,
            "<div class=\"hero\">\n  <h1>Scan litter. Get local sorting guidance.</h1>\n  \
             <p><span class=\"pill\">Quick Detect</span> works on PET bottles, drink cans, and \
             plastic bottle caps. — <b>{}</b></p>\n</div>\n",
            escape(self.city.label)
        );
    }

    fn detect_section(&self, html: &mut String) {
        html.push_str("<div class=\"section\">\n<h4>How to use</h4>\n<ol class=\"howto\">\n");
        html.push_str("  <li>Pass an <b>image file</b> (or pipe a camera shot on stdin).</li>\n");
        html.push_str("  <li>Run <b>litter-scan detect</b>.</li>\n");
        html.push_str(
            "  <li>Follow the card(s) below for disposal steps — tailored to your selected city.</li>\n",
        );
        html.push_str("</ol>\n");

        if let Some(src) = self.input_src {
            let _ = write!(
                html,
                "<figure class=\"result\"><img src=\"{}\" alt=\"Input\"><figcaption class=\"caption\">Input</figcaption></figure>\n",
                escape(src)
            );
        }

        match &self.result {
            ResultView::NoDetections => notice(html, NO_DETECTIONS),
            ResultView::AllFiltered => notice(html, ALL_FILTERED),
            ResultView::Detected {
                outcome,
                annotated_src,
            } => self.detections(html, outcome, *annotated_src),
        }

        html.push_str("</div>\n");
    }

    fn detections(&self, html: &mut String, outcome: &FilterOutcome, annotated_src: Option<&str>) {
        html.push_str("<h3>Detections</h3>\n");
        if let Some(src) = annotated_src {
            let _ = write!(
                html,
                "<div class=\"result\"><img src=\"{}\" alt=\"Detections\"></div>\n",
                escape(src)
            );
        }

        html.push_str("<details><summary>Raw detections (debug)</summary>\n<table class=\"debug\">\n");
        html.push_str("<tr><th>x1</th><th>y1</th><th>x2</th><th>y2</th><th>class_id</th><th>class_name</th><th>score</th></tr>\n");
        for d in &outcome.kept {
            let _ = writeln!(
                html,
                "<tr><td>{:.1}</td><td>{:.1}</td><td>{:.1}</td><td>{:.1}</td><td>{}</td><td>{}</td><td>{:.3}</td></tr>",
                d.xyxy[0],
                d.xyxy[1],
                d.xyxy[2],
                d.xyxy[3],
                d.class_id,
                escape(&d.class_name),
                d.score
            );
        }
        html.push_str("</table>\n</details>\n");

        if !outcome.counts.is_empty() {
            html.push_str("<details><summary>Counts (debug)</summary>\n<table class=\"debug\">\n");
            for (name, count) in outcome.counts_descending() {
                let _ = writeln!(html, "<tr><td>{}</td><td>{count}</td></tr>", escape(&name));
            }
            html.push_str("</table>\n</details>\n");
        }

        let guide_labels = self.city.guide_labels(&outcome.labels());
        if guide_labels.is_empty() {
            let _ = writeln!(html, "<p class=\"caption\">{NO_GUIDANCE}</p>");
            return;
        }
        let _ = writeln!(
            html,
            "<h3>Disposal instructions — {}</h3>",
            escape(self.city.label)
        );
        for label in &guide_labels {
            if let Some(entry) = self.city.entry(label) {
                guidance_card(html, entry, outcome.count(label));
            }
        }
    }
}

fn notice(html: &mut String, message: &str) {
    let _ = writeln!(html, "<div class=\"notice\">{}</div>", escape(message));
}

fn link(html: &mut String, url: &str, label: &str) {
    let _ = write!(
        html,
        "<a class=\"eco-link\" href=\"{}\" target=\"_blank\" rel=\"noopener\">{}</a>",
        escape(url),
        escape(label)
    );
}

fn list(html: &mut String, title: &str, items: &[&str]) {
    let _ = writeln!(html, "<div class=\"eco-section-title\">{title}</div>");
    html.push_str("<ul class=\"eco-list\">");
    for item in items {
        let _ = write!(html, "<li>{}</li>", escape(item));
    }
    html.push_str("</ul>\n");
}

fn guidance_text(html: &mut String, entry: &GuidanceEntry) {
    if !entry.materials.is_empty() {
        let _ = writeln!(
            html,
            "<div class=\"eco-meta\"><strong>Material:</strong> {}</div>",
            escape(entry.materials)
        );
    }
    if !entry.why_separate.is_empty() {
        list(html, "Why separate?", entry.why_separate);
    }
    list(html, "How to put out", entry.steps);

    if !entry.recycles_to.is_empty() {
        html.push_str("<div class=\"eco-section-title\">Commonly recycled into</div>\n<div class=\"chip-row\">");
        for item in entry.recycles_to {
            let _ = write!(html, "<div class=\"chip\">{}</div>", escape(item));
        }
        html.push_str("</div>\n");
    }

    if !entry.facts.is_empty() {
        let texts: Vec<&str> = entry.facts.iter().map(|f| f.text).collect();
        list(html, "Did you know?", &texts);
        html.push_str("<div class=\"eco-links\">");
        for fact in entry.facts {
            link(html, fact.url, "Learn more");
        }
        html.push_str("</div>\n");
    }
}

/// One card per detected class, with a `Detected: N` badge.
fn guidance_card(html: &mut String, entry: &GuidanceEntry, count: usize) {
    let _ = write!(
        html,
        "<div class=\"eco-card\">\n<div class=\"eco-head\"><div class=\"eco-emoji\">{}</div>\
         <div class=\"eco-title\">{}</div><div class=\"eco-badge\">Detected: {count}</div></div>\n",
        entry.emoji,
        escape(entry.title)
    );

    if !entry.icons.is_empty() {
        html.push_str("<div class=\"eco-icons\">");
        for icon in entry.icons {
            let _ = write!(html, "<img src=\"{}\" alt=\"\">", escape(icon));
        }
        html.push_str("</div>\n");
    }

    if entry.images.is_empty() {
        guidance_text(html, entry);
    } else {
        // More than three step photos are shown as a thumbnail grid.
        let class = if entry.images.len() > 3 {
            "eco-images grid"
        } else {
            "eco-images"
        };
        let _ = write!(html, "<div class=\"eco-body\"><div class=\"{class}\">");
        for img in entry.images {
            let _ = write!(html, "<img src=\"{}\" alt=\"\">", escape(img));
        }
        html.push_str("</div><div class=\"eco-text\">\n");
        guidance_text(html, entry);
        html.push_str("</div></div>\n");
    }

    html.push_str("<div class=\"eco-links\">");
    if let Some(poster) = entry.poster {
        link(html, poster, "Open local poster");
    }
    link(html, entry.link, "Official local guidance (site)");
    html.push_str("</div>\n</div>\n");
}

fn impact_section(html: &mut String) {
    html.push_str("<div class=\"section\">\n<h4>Impact &amp; SDGs</h4>\n<ul>");
    for note in CARBON_CREDIT_NOTES {
        let _ = write!(html, "<li>{}</li>", escape(note));
    }
    html.push_str("</ul>\n<div class=\"link-chips\">\n");
    for chip in CARBON_LINKS {
        let _ = writeln!(
            html,
            "  <a class=\"link-chip\" href=\"{}\" target=\"_blank\" rel=\"noopener\">{}</a>",
            escape(chip.url),
            escape(chip.label)
        );
    }
    html.push_str("</div>\n<p><b>Our SDGs focus:</b></p>\n<div class=\"sdg-row\">\n");
    for goal in SDG_FOCUS {
        let _ = writeln!(
            html,
            "  <a class=\"sdg-card\" href=\"{}\" target=\"_blank\" rel=\"noopener\"><span class=\"num\">{}</span><span class=\"txt\">{}</span></a>",
            goal.url(),
            goal.number,
            escape(goal.name)
        );
    }
    html.push_str("</div>\n</div>\n");
}

/// Minimal HTML escaping for text and attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::domain::detection_filter::{filter_detections, FilterSettings};
    use crate::shared::constants::{BOTTLE, CAN, CAP};
    use crate::shared::detection::Detection;

    fn outcome(names: &[&str]) -> FilterOutcome {
        let dets: Vec<Detection> = names
            .iter()
            .enumerate()
            .map(|(i, n)| Detection::new([i as f64, 0.0, i as f64 + 10.0, 10.0], 0, *n, 0.9))
            .collect();
        filter_detections(&dets, &FilterSettings::default(), 0.05, 100, 100)
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape(r#"<a href="x">&'</a>"#), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;&lt;/a&gt;");
    }

    #[test]
    fn test_static_sections_always_render() {
        let city = City::default_city();
        let html = HtmlReport::new(&city, ResultView::NoDetections).render();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("Scan litter. Get local sorting guidance."));
        assert!(html.contains("Shibuya (Tokyo)"));
        assert!(html.contains("More cities coming soon"));
        assert!(html.contains("Impact &amp; SDGs"));
        assert!(html.contains("Japan J-Credit (official)"));
        assert!(html.contains("Life Below Water"));
        assert!(!html.contains("Detections</h3>"));
    }

    #[test]
    fn test_status_notices() {
        let city = City::default_city();
        let none = HtmlReport::new(&city, ResultView::NoDetections).render();
        assert!(none.contains(NO_DETECTIONS));
        let filtered = HtmlReport::new(&city, ResultView::AllFiltered).render();
        assert!(filtered.contains("All detections were filtered by thresholds."));
    }

    #[test]
    fn test_cards_render_in_label_order_with_counts() {
        let city = City::default_city();
        let outcome = outcome(&[CAP, CAN, CAN]);
        let html = HtmlReport::new(
            &city,
            ResultView::Detected {
                outcome: &outcome,
                annotated_src: Some("annotated.png"),
            },
        )
        .render();

        assert!(html.contains("<img src=\"annotated.png\" alt=\"Detections\">"));
        assert!(html.contains("Disposal instructions — Shibuya (Tokyo)"));
        let can = html.find("Aluminum or steel can").unwrap();
        let cap = html.find("Plastic bottle cap (plastic item)").unwrap();
        assert!(can < cap);
        assert!(html.contains("Detected: 2"));
        assert!(html.contains("Detected: 1"));
        assert!(!html.contains("PET bottle (resource)"));
        assert!(html.contains("Open local poster"));
    }

    #[test]
    fn test_pet_card_uses_thumbnail_grid() {
        let city = City::default_city();
        let outcome = outcome(&[BOTTLE]);
        let html = HtmlReport::new(
            &city,
            ResultView::Detected {
                outcome: &outcome,
                annotated_src: None,
            },
        )
        .render();
        assert!(html.contains("eco-images grid"));
        assert!(html.contains("ph07.png"));
    }

    #[test]
    fn test_unknown_labels_show_no_guidance_caption() {
        let city = City::default_city();
        let outcome = outcome(&["<script>"]);
        let html = HtmlReport::new(
            &city,
            ResultView::Detected {
                outcome: &outcome,
                annotated_src: None,
            },
        )
        .render();
        assert!(html.contains(NO_GUIDANCE));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_write_to_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("report.html");
        let city = City::default_city();
        HtmlReport::new(&city, ResultView::NoDetections)
            .with_logo("logo.png")
            .write_to(&path)
            .unwrap();
        let html = std::fs::read_to_string(path).unwrap();
        assert!(html.contains("<img src=\"logo.png\" alt=\"logo\">"));
    }
}
