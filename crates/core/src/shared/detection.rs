use serde::{Deserialize, Serialize};

/// One labelled box in source-image pixel coordinates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// `[x1, y1, x2, y2]`.
    pub xyxy: [f64; 4],
    pub class_id: usize,
    pub class_name: String,
    pub score: f64,
}

impl Detection {
    pub fn new(xyxy: [f64; 4], class_id: usize, class_name: impl Into<String>, score: f64) -> Self {
        Self {
            xyxy,
            class_id,
            class_name: class_name.into(),
            score,
        }
    }

    pub fn width(&self) -> f64 {
        (self.xyxy[2] - self.xyxy[0]).max(0.0)
    }

    pub fn height(&self) -> f64 {
        (self.xyxy[3] - self.xyxy[1]).max(0.0)
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// The label drawn next to the box, e.g. `Drink can 0.87`.
    pub fn label(&self) -> String {
        format!("{} {:.2}", self.class_name, self.score)
    }

    pub fn iou(&self, other: &Detection) -> f64 {
        bbox_iou(&self.xyxy, &other.xyxy)
    }
}

pub fn bbox_iou(a: &[f64; 4], b: &[f64; 4]) -> f64 {
    let x1 = a[0].max(b[0]);
    let y1 = a[1].max(b[1]);
    let x2 = a[2].min(b[2]);
    let y2 = a[3].min(b[3]);

    let inter = (x2 - x1).max(0.0) * (y2 - y1).max(0.0);
    if inter == 0.0 {
        return 0.0;
    }
    let area_a = (a[2] - a[0]) * (a[3] - a[1]);
    let area_b = (b[2] - b[0]) * (b[3] - b[1]);
    inter / (area_a + area_b - inter)
}
