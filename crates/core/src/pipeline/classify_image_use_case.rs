use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::detection::domain::detection_filter::{filter_detections, FilterOutcome, FilterSettings};
use crate::detection::domain::inference_settings::InferenceSettings;
use crate::detection::domain::litter_detector::{DetectError, LitterDetector};
use crate::guidance::city::City;
use crate::imaging::image_writer::ImageWriter;
use crate::render::box_drawer::BoxDrawer;
use crate::render::html_report::{HtmlReport, ResultView};
use crate::shared::detection::Detection;
use crate::shared::frame::Frame;

/// Result of one detection run.
#[derive(Debug)]
pub enum ClassifyOutcome {
    /// The model returned no boxes at all.
    NoDetections,
    /// The model found boxes but every one was below a threshold.
    AllFiltered { raw: usize },
    Detected {
        outcome: FilterOutcome,
        annotated: Frame,
    },
}

impl ClassifyOutcome {
    pub fn kept(&self) -> &[Detection] {
        match self {
            ClassifyOutcome::Detected { outcome, .. } => &outcome.kept,
            _ => &[],
        }
    }
}

/// Optional files written after a run.
#[derive(Clone, Debug, Default)]
pub struct OutputPaths {
    pub annotated: Option<PathBuf>,
    pub report: Option<PathBuf>,
    pub json: Option<PathBuf>,
    /// Copy of the input shown at the top of the report.
    pub input: Option<PathBuf>,
    /// Brand image shown in the report header.
    pub logo: Option<PathBuf>,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    city: &'a str,
    inference: &'a InferenceSettings,
    filter: &'a FilterSettings,
    detections: &'a [Detection],
    counts: Vec<(String, usize)>,
}

/// Single-image pipeline: detect → filter → draw → write.
pub struct ClassifyImageUseCase {
    detector: Box<dyn LitterDetector>,
    drawer: BoxDrawer,
    image_writer: Box<dyn ImageWriter>,
}

impl ClassifyImageUseCase {
    pub fn new(
        detector: Box<dyn LitterDetector>,
        drawer: BoxDrawer,
        image_writer: Box<dyn ImageWriter>,
    ) -> Self {
        Self {
            detector,
            drawer,
            image_writer,
        }
    }

    /// Runs the model on `frame` and applies the post-filters.
    pub fn execute(
        &mut self,
        frame: &Frame,
        inference: &InferenceSettings,
        filter: &FilterSettings,
    ) -> Result<ClassifyOutcome, DetectError> {
        let raw = self.detector.detect(frame, &inference.snapped())?;
        if raw.is_empty() {
            log::info!("No detections");
            return Ok(ClassifyOutcome::NoDetections);
        }

        let outcome = filter_detections(&raw, filter, inference.conf, frame.width(), frame.height());
        if outcome.kept.is_empty() {
            log::info!("All {} detections were filtered by thresholds", raw.len());
            return Ok(ClassifyOutcome::AllFiltered { raw: raw.len() });
        }

        for (name, count) in &outcome.counts {
            log::info!("{name}: {count}");
        }
        let annotated = self.drawer.draw(frame, &outcome.kept);
        Ok(ClassifyOutcome::Detected { outcome, annotated })
    }

    /// Writes whichever of the annotated image, JSON dump and HTML page were requested.
    pub fn write_outputs(
        &self,
        result: &ClassifyOutcome,
        city: &City,
        inference: &InferenceSettings,
        filter: &FilterSettings,
        outputs: &OutputPaths,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let annotated_path = match (&outputs.annotated, &outputs.report, result) {
            (Some(path), _, _) => Some(path.clone()),
            (None, Some(report), ClassifyOutcome::Detected { .. }) => {
                Some(sibling(report, "annotated.png"))
            }
            _ => None,
        };

        if let (Some(path), ClassifyOutcome::Detected { annotated, .. }) = (&annotated_path, result) {
            self.image_writer.write(path, annotated)?;
            log::info!("Annotated image written to {}", path.display());
        }

        if let Some(path) = &outputs.json {
            let empty = FilterOutcome::default();
            let outcome = match result {
                ClassifyOutcome::Detected { outcome, .. } => outcome,
                _ => &empty,
            };
            let report = JsonReport {
                city: city.id,
                inference,
                filter,
                detections: &outcome.kept,
                counts: outcome.counts_descending(),
            };
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, serde_json::to_string_pretty(&report)?)?;
            log::info!("Detections written to {}", path.display());
        }

        if let Some(path) = &outputs.report {
            let annotated_src = annotated_path.as_deref().map(|p| relative_src(path, p));
            let input_src = outputs.input.as_deref().map(|p| relative_src(path, p));
            let logo_src = outputs.logo.as_deref().map(|p| relative_src(path, p));
            let view = match result {
                ClassifyOutcome::NoDetections => ResultView::NoDetections,
                ClassifyOutcome::AllFiltered { .. } => ResultView::AllFiltered,
                ClassifyOutcome::Detected { outcome, .. } => ResultView::Detected {
                    outcome,
                    annotated_src: annotated_src.as_deref(),
                },
            };
            let mut report = HtmlReport::new(city, view);
            if let Some(src) = input_src.as_deref() {
                report = report.with_input_image(src);
            }
            if let Some(src) = logo_src.as_deref() {
                report = report.with_logo(src);
            }
            report.write_to(path)?;
            log::info!("Report written to {}", path.display());
        }

        Ok(())
    }
}

/// `<report stem>_<suffix>` next to the report.
fn sibling(report: &Path, suffix: &str) -> PathBuf {
    let stem = report
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("report");
    report.with_file_name(format!("{stem}_{suffix}"))
}

/// Image URL as seen from the report: a bare file name when both live in
/// the same directory, else the absolute path.
fn relative_src(report: &Path, image: &Path) -> String {
    let same_dir = report.parent().unwrap_or(Path::new("")) == image.parent().unwrap_or(Path::new(""));
    match (same_dir, image.file_name()) {
        (true, Some(name)) => name.to_string_lossy().into_owned(),
        _ => std::fs::canonicalize(image)
            .unwrap_or_else(|_| image.to_path_buf())
            .to_string_lossy()
            .into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::domain::label_map::LabelMap;
    use crate::shared::constants::{BOTTLE, CAN};
    use std::sync::{Arc, Mutex};

    // --- Stubs ---

    struct StubDetector {
        detections: Vec<Detection>,
        seen: Arc<Mutex<Vec<InferenceSettings>>>,
    }

    impl LitterDetector for StubDetector {
        fn detect(
            &mut self,
            _frame: &Frame,
            settings: &InferenceSettings,
        ) -> Result<Vec<Detection>, DetectError> {
            self.seen.lock().unwrap().push(*settings);
            Ok(self.detections.clone())
        }

        fn labels(&self) -> LabelMap {
            LabelMap::fallback()
        }
    }

    struct StubImageWriter {
        written: Arc<Mutex<Vec<PathBuf>>>,
    }

    impl ImageWriter for StubImageWriter {
        fn write(&self, path: &Path, _frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
            self.written.lock().unwrap().push(path.to_path_buf());
            Ok(())
        }
    }

    // --- Helpers ---

    fn frame() -> Frame {
        Frame::new(vec![0; 100 * 100 * 3], 100, 100)
    }

    fn det(name: &str, score: f64, size: f64) -> Detection {
        Detection::new([10.0, 10.0, 10.0 + size, 10.0 + size], 0, name, score)
    }

    fn use_case(
        detections: Vec<Detection>,
    ) -> (
        ClassifyImageUseCase,
        Arc<Mutex<Vec<InferenceSettings>>>,
        Arc<Mutex<Vec<PathBuf>>>,
    ) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let written = Arc::new(Mutex::new(Vec::new()));
        let uc = ClassifyImageUseCase::new(
            Box::new(StubDetector {
                detections,
                seen: seen.clone(),
            }),
            BoxDrawer::new(),
            Box::new(StubImageWriter {
                written: written.clone(),
            }),
        );
        (uc, seen, written)
    }

    // --- Tests ---

    #[test]
    fn test_no_raw_detections() {
        let (mut uc, _, _) = use_case(vec![]);
        let result = uc
            .execute(&frame(), &InferenceSettings::default(), &FilterSettings::default())
            .unwrap();
        assert!(matches!(result, ClassifyOutcome::NoDetections));
        assert!(result.kept().is_empty());
    }

    #[test]
    fn test_everything_filtered() {
        let (mut uc, _, _) = use_case(vec![det(CAN, 0.3, 20.0)]);
        let filter = FilterSettings {
            can_min: 0.5,
            ..FilterSettings::default()
        };
        let result = uc
            .execute(&frame(), &InferenceSettings::default(), &filter)
            .unwrap();
        assert!(matches!(result, ClassifyOutcome::AllFiltered { raw: 1 }));
    }

    #[test]
    fn test_kept_detections_and_annotation() {
        let (mut uc, _, _) = use_case(vec![det(CAN, 0.9, 20.0), det(BOTTLE, 0.9, 1.0)]);
        let filter = FilterSettings {
            min_area_pct: 1.0,
            ..FilterSettings::default()
        };
        let result = uc
            .execute(&frame(), &InferenceSettings::default(), &filter)
            .unwrap();
        match result {
            ClassifyOutcome::Detected { outcome, annotated } => {
                assert_eq!(outcome.kept.len(), 1);
                assert_eq!(outcome.count(CAN), 1);
                assert_eq!((annotated.width(), annotated.height()), (100, 100));
            }
            other => panic!("expected detections, got {other:?}"),
        }
    }

    #[test]
    fn test_imgsz_is_snapped_before_inference() {
        let (mut uc, seen, _) = use_case(vec![]);
        let inference = InferenceSettings {
            imgsz: 700,
            ..InferenceSettings::default()
        };
        uc.execute(&frame(), &inference, &FilterSettings::default())
            .unwrap();
        assert_eq!(seen.lock().unwrap()[0].imgsz, 640);
    }

    #[test]
    fn test_report_writes_annotated_sibling_and_json() {
        let dir = tempfile::tempdir().unwrap();
        let (mut uc, _, written) = use_case(vec![det(CAN, 0.9, 20.0)]);
        let inference = InferenceSettings::default();
        let filter = FilterSettings::default();
        let result = uc.execute(&frame(), &inference, &filter).unwrap();

        let outputs = OutputPaths {
            report: Some(dir.path().join("page.html")),
            json: Some(dir.path().join("dets.json")),
            ..OutputPaths::default()
        };
        let city = City::default_city();
        uc.write_outputs(&result, &city, &inference, &filter, &outputs)
            .unwrap();

        assert_eq!(
            written.lock().unwrap().as_slice(),
            &[dir.path().join("page_annotated.png")]
        );
        let html = std::fs::read_to_string(dir.path().join("page.html")).unwrap();
        assert!(html.contains("src=\"page_annotated.png\""));
        assert!(html.contains("Detected: 1"));

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(dir.path().join("dets.json")).unwrap())
                .unwrap();
        assert_eq!(json["city"], "shibuya");
        assert_eq!(json["detections"][0]["class_name"], CAN);
        assert_eq!(json["counts"][0][1], 1);
    }

    #[test]
    fn test_no_detections_writes_no_image() {
        let dir = tempfile::tempdir().unwrap();
        let (mut uc, _, written) = use_case(vec![]);
        let inference = InferenceSettings::default();
        let filter = FilterSettings::default();
        let result = uc.execute(&frame(), &inference, &filter).unwrap();

        let outputs = OutputPaths {
            annotated: Some(dir.path().join("a.png")),
            report: Some(dir.path().join("page.html")),
            ..OutputPaths::default()
        };
        uc.write_outputs(&result, &City::default_city(), &inference, &filter, &outputs)
            .unwrap();

        assert!(written.lock().unwrap().is_empty());
        let html = std::fs::read_to_string(dir.path().join("page.html")).unwrap();
        assert!(html.contains("No detections"));
    }

    #[test]
    fn test_report_header_shows_logo() {
        let dir = tempfile::tempdir().unwrap();
        let logo = dir.path().join("logo.png");
        std::fs::write(&logo, b"png").unwrap();
        let (mut uc, _, _) = use_case(vec![]);
        let inference = InferenceSettings::default();
        let filter = FilterSettings::default();
        let result = uc.execute(&frame(), &inference, &filter).unwrap();

        let outputs = OutputPaths {
            report: Some(dir.path().join("page.html")),
            logo: Some(logo),
            ..OutputPaths::default()
        };
        uc.write_outputs(&result, &City::default_city(), &inference, &filter, &outputs)
            .unwrap();

        let html = std::fs::read_to_string(dir.path().join("page.html")).unwrap();
        assert!(html.contains("<img src=\"logo.png\" alt=\"logo\">"));
    }

    #[test]
    fn test_report_without_logo_has_no_logo_tag() {
        let dir = tempfile::tempdir().unwrap();
        let (mut uc, _, _) = use_case(vec![]);
        let inference = InferenceSettings::default();
        let filter = FilterSettings::default();
        let result = uc.execute(&frame(), &inference, &filter).unwrap();

        let outputs = OutputPaths {
            report: Some(dir.path().join("page.html")),
            ..OutputPaths::default()
        };
        uc.write_outputs(&result, &City::default_city(), &inference, &filter, &outputs)
            .unwrap();

        let html = std::fs::read_to_string(dir.path().join("page.html")).unwrap();
        assert!(!html.contains("alt=\"logo\""));
    }

    #[test]
    fn test_sibling_name() {
        assert_eq!(
            sibling(Path::new("/tmp/out/page.html"), "annotated.png"),
            PathBuf::from("/tmp/out/page_annotated.png")
        );
    }

    #[test]
    fn test_relative_src_same_dir() {
        assert_eq!(
            relative_src(Path::new("/a/b/page.html"), Path::new("/a/b/x.png")),
            "x.png"
        );
    }
}
