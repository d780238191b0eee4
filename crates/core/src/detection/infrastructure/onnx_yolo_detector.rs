/// YOLO litter detector using ONNX Runtime via `ort`.
///
/// Handles letterbox preprocessing, inference, class-aware NMS and
/// mapping boxes back to source-image pixels. Optional test-time
/// augmentation merges predictions from the mirrored image.
use std::path::Path;

use crate::detection::domain::inference_settings::InferenceSettings;
use crate::detection::domain::label_map::LabelMap;
use crate::detection::domain::litter_detector::{DetectError, LitterDetector};
use crate::shared::detection::Detection;
use crate::shared::frame::Frame;

use super::execution_provider::open_session;

/// Metadata key ultralytics writes the class names under.
const NAMES_METADATA_KEY: &str = "names";

/// Number of box values preceding the class scores in each output row.
const BOX_VALUES: usize = 4;

/// YOLO detector backed by an ONNX Runtime session.
pub struct OnnxYoloDetector {
    session: ort::session::Session,
    labels: LabelMap,
    /// `(width, height)` fixed by the graph, if any. Dynamic graphs use
    /// the requested `imgsz` instead.
    fixed_input_size: Option<(u32, u32)>,
}

impl OnnxYoloDetector {
    /// Load a YOLO ONNX export and read its class names and input shape.
    pub fn new(model_path: &Path) -> Result<Self, DetectError> {
        let session = open_session(model_path)?;

        // NCHW: [1, 3, H, W]; dynamic dims are reported as -1.
        let fixed_input_size = session.inputs().first().and_then(|input| {
            if let ort::value::ValueType::Tensor { ref shape, .. } = input.dtype() {
                if shape.len() >= 4 && shape[2] > 0 && shape[3] > 0 {
                    Some((shape[3] as u32, shape[2] as u32))
                } else {
                    None
                }
            } else {
                None
            }
        });

        let labels = session
            .metadata()
            .ok()
            .and_then(|meta| meta.custom(NAMES_METADATA_KEY))
            .and_then(|raw| LabelMap::parse_metadata(&raw))
            .unwrap_or_else(|| {
                log::info!("Model carries no class names, using fallback labels");
                LabelMap::fallback()
            });

        log::info!(
            "Loaded {} ({} classes, input {})",
            model_path.display(),
            labels.len(),
            fixed_input_size.map_or("dynamic".to_string(), |(w, h)| format!("{w}x{h}"))
        );

        Ok(Self {
            session,
            labels,
            fixed_input_size,
        })
    }

    fn predict_once(
        &mut self,
        frame: &Frame,
        settings: &InferenceSettings,
    ) -> Result<Vec<Detection>, DetectError> {
        let (input_w, input_h) = self
            .fixed_input_size
            .unwrap_or((settings.imgsz, settings.imgsz));
        let (input_tensor, scale, pad_x, pad_y) = letterbox(frame, input_w, input_h);

        let input_value = ort::value::Tensor::from_array(input_tensor)
            .map_err(|e| DetectError::Inference(e.to_string()))?;
        let outputs = self
            .session
            .run(ort::inputs![input_value])
            .map_err(|e| DetectError::Inference(e.to_string()))?;
        if outputs.len() == 0 {
            return Err(DetectError::Output("model produced no outputs".into()));
        }
        let tensor = outputs[0]
            .try_extract_array::<f32>()
            .map_err(|e| DetectError::Output(e.to_string()))?;
        let shape = tensor.shape().to_vec();
        let data = tensor
            .as_slice()
            .ok_or_else(|| DetectError::Output("output tensor is not contiguous".into()))?;

        let rows = decode_rows(data, &shape)?;
        let geometry = Letterbox {
            scale,
            pad_x: pad_x as f64,
            pad_y: pad_y as f64,
            width: frame.width() as f64,
            height: frame.height() as f64,
        };

        Ok(rows
            .iter()
            .filter_map(|row| parse_row(row, settings.conf, &geometry, &self.labels))
            .collect())
    }
}

impl LitterDetector for OnnxYoloDetector {
    fn detect(
        &mut self,
        frame: &Frame,
        settings: &InferenceSettings,
    ) -> Result<Vec<Detection>, DetectError> {
        let plain = self.predict_once(frame, settings)?;
        let flipped = if settings.tta {
            self.predict_once(&frame.flipped_horizontal(), settings)?
        } else {
            Vec::new()
        };

        let kept = merge_tta(plain, flipped, frame.width() as f64, settings.iou);
        log::debug!("Model returned {} boxes after NMS", kept.len());
        Ok(kept)
    }

    fn labels(&self) -> LabelMap {
        self.labels.clone()
    }
}

// ---------------------------------------------------------------------------
// Preprocessing
// ---------------------------------------------------------------------------

/// Letterbox-resize a frame to `target_w` × `target_h`.
///
/// Returns `(NCHW float32 tensor, scale, pad_x, pad_y)`.
fn letterbox(frame: &Frame, target_w: u32, target_h: u32) -> (ndarray::Array4<f32>, f64, u32, u32) {
    let fw = frame.width() as f64;
    let fh = frame.height() as f64;

    let scale = (target_w as f64 / fw).min(target_h as f64 / fh);
    let new_w = ((fw * scale).round() as u32).min(target_w);
    let new_h = ((fh * scale).round() as u32).min(target_h);
    let pad_x = (target_w - new_w) / 2;
    let pad_y = (target_h - new_h) / 2;

    // Padding is 114/255 gray, the YOLO convention.
    let gray = 114.0f32 / 255.0;
    let mut tensor =
        ndarray::Array4::<f32>::from_elem((1, 3, target_h as usize, target_w as usize), gray);

    let src = frame.as_ndarray();
    let src_h = frame.height() as usize;
    let src_w = frame.width() as usize;

    for y in 0..new_h as usize {
        let src_y = ((y as f64 / scale) as usize).min(src_h - 1);
        for x in 0..new_w as usize {
            let src_x = ((x as f64 / scale) as usize).min(src_w - 1);
            let ty = pad_y as usize + y;
            let tx = pad_x as usize + x;
            for c in 0..3 {
                tensor[[0, c, ty, tx]] = src[[src_y, src_x, c]] as f32 / 255.0;
            }
        }
    }

    (tensor, scale, pad_x, pad_y)
}

// ---------------------------------------------------------------------------
// Postprocessing
// ---------------------------------------------------------------------------

struct Letterbox {
    scale: f64,
    pad_x: f64,
    pad_y: f64,
    width: f64,
    height: f64,
}

/// Split the raw output into one row per candidate box.
///
/// YOLOv8-style exports produce `[1, 4 + classes, boxes]`; some exports are
/// already transposed to `[1, boxes, 4 + classes]`. Both are accepted.
fn decode_rows(data: &[f32], shape: &[usize]) -> Result<Vec<Vec<f32>>, DetectError> {
    if shape.len() != 3 {
        return Err(DetectError::Output(format!(
            "unexpected YOLO output shape: {shape:?}"
        )));
    }
    let transposed = shape[1] < shape[2];
    let (num_dets, num_feats) = if transposed {
        (shape[2], shape[1])
    } else {
        (shape[1], shape[2])
    };
    if num_feats <= BOX_VALUES {
        return Err(DetectError::Output(format!(
            "output rows have no class scores: {shape:?}"
        )));
    }
    if data.len() < num_dets * num_feats {
        return Err(DetectError::Output(format!(
            "output holds {} values, shape {shape:?} needs {}",
            data.len(),
            num_dets * num_feats
        )));
    }

    Ok((0..num_dets)
        .map(|i| {
            if transposed {
                (0..num_feats).map(|f| data[f * num_dets + i]).collect()
            } else {
                data[i * num_feats..(i + 1) * num_feats].to_vec()
            }
        })
        .collect())
}

/// Turn one `[cx, cy, w, h, score_0, .., score_n]` row into a detection,
/// or `None` when its best class score is below `conf`.
fn parse_row(row: &[f32], conf: f64, geometry: &Letterbox, labels: &LabelMap) -> Option<Detection> {
    let (class_id, score) = row[BOX_VALUES..]
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))?;
    let score = *score as f64;
    if score < conf {
        return None;
    }

    let cx = row[0] as f64;
    let cy = row[1] as f64;
    let w = row[2] as f64;
    let h = row[3] as f64;

    let to_src_x = |v: f64| ((v - geometry.pad_x) / geometry.scale).clamp(0.0, geometry.width);
    let to_src_y = |v: f64| ((v - geometry.pad_y) / geometry.scale).clamp(0.0, geometry.height);

    Some(Detection::new(
        [
            to_src_x(cx - w / 2.0),
            to_src_y(cy - h / 2.0),
            to_src_x(cx + w / 2.0),
            to_src_y(cy + h / 2.0),
        ],
        class_id,
        labels.name(class_id),
        score,
    ))
}

/// Map a box predicted on the mirrored image back onto the original.
fn unflip(mut det: Detection, width: f64) -> Detection {
    let [x1, y1, x2, y2] = det.xyxy;
    det.xyxy = [width - x2, y1, width - x1, y2];
    det
}

/// Merge the plain pass with the mirrored pass (boxes still in mirrored
/// coordinates) and run one class-aware NMS over both.
fn merge_tta(
    mut plain: Vec<Detection>,
    flipped: Vec<Detection>,
    width: f64,
    iou_thresh: f64,
) -> Vec<Detection> {
    plain.extend(flipped.into_iter().map(|d| unflip(d, width)));
    nms(&mut plain, iou_thresh)
}

/// Class-aware greedy NMS: sort by score descending, suppress overlapping
/// boxes of the same class.
fn nms(dets: &mut [Detection], iou_thresh: f64) -> Vec<Detection> {
    dets.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut keep = Vec::new();
    let mut suppressed = vec![false; dets.len()];

    for i in 0..dets.len() {
        if suppressed[i] {
            continue;
        }
        keep.push(dets[i].clone());
        for j in (i + 1)..dets.len() {
            if suppressed[j] || dets[j].class_id != dets[i].class_id {
                continue;
            }
            if dets[i].iou(&dets[j]) > iou_thresh {
                suppressed[j] = true;
            }
        }
    }
    keep
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
