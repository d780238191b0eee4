use std::path::{Path, PathBuf};

use ab_glyph::{FontVec, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;
use thiserror::Error;

use super::theme::BOX_COLOR;
use crate::shared::detection::Detection;
use crate::shared::frame::Frame;

const LABEL_FONT_SIZE: f32 = 16.0;
/// Rough per-character width used when no font is loaded.
const LABEL_CHAR_WIDTH: f32 = 8.0;
const LABEL_TEXT_HEIGHT: u32 = 12;
const BOX_THICKNESS: i32 = 2;
const TEXT_COLOR: Rgb<u8> = Rgb([255, 255, 255]);

#[derive(Error, Debug)]
pub enum FontError {
    #[error("failed to read font {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{0} is not a usable TrueType/OpenType font")]
    Invalid(PathBuf),
}

/// Draws detection boxes with `name score` labels onto a copy of the frame.
///
/// Label text needs a font. Without one only the label bar is drawn so
/// boxes stay readable by colour and position.
pub struct BoxDrawer {
    font: Option<FontVec>,
    scale: PxScale,
}

impl BoxDrawer {
    pub fn new() -> Self {
        Self {
            font: None,
            scale: PxScale::from(LABEL_FONT_SIZE),
        }
    }

    pub fn with_font_file(path: &Path) -> Result<Self, FontError> {
        let bytes = std::fs::read(path).map_err(|source| FontError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let font = FontVec::try_from_vec(bytes).map_err(|_| FontError::Invalid(path.to_path_buf()))?;
        Ok(Self {
            font: Some(font),
            scale: PxScale::from(LABEL_FONT_SIZE),
        })
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    pub fn draw(&self, frame: &Frame, detections: &[Detection]) -> Frame {
        let mut image = frame.to_rgb_image();
        for det in detections {
            self.draw_one(&mut image, det);
        }
        Frame::from_rgb_image(image)
    }

    fn draw_one(&self, image: &mut RgbImage, det: &Detection) {
        let (w, h) = (image.width() as i32, image.height() as i32);
        if w == 0 || h == 0 {
            return;
        }
        let x1 = (det.xyxy[0] as i32).clamp(0, w - 1);
        let y1 = (det.xyxy[1] as i32).clamp(0, h - 1);
        let x2 = (det.xyxy[2] as i32).clamp(0, w - 1);
        let y2 = (det.xyxy[3] as i32).clamp(0, h - 1);

        for t in 0..BOX_THICKNESS {
            let bw = x2 - x1 - 2 * t + 1;
            let bh = y2 - y1 - 2 * t + 1;
            if bw > 0 && bh > 0 {
                draw_hollow_rect_mut(
                    image,
                    Rect::at(x1 + t, y1 + t).of_size(bw as u32, bh as u32),
                    BOX_COLOR,
                );
            }
        }

        let label = det.label();
        let (tw, th) = self.text_size(&label);
        let place = label_placement(x1, y1, tw as i32, th as i32, w, h);

        let bg_w = place.bg_x2 - place.bg_x1;
        let bg_h = place.bg_y2 - place.bg_y1;
        if bg_w > 0 && bg_h > 0 {
            draw_filled_rect_mut(
                image,
                Rect::at(place.bg_x1, place.bg_y1).of_size(bg_w as u32, bg_h as u32),
                BOX_COLOR,
            );
        }
        if let Some(font) = &self.font {
            draw_text_mut(
                image,
                TEXT_COLOR,
                place.text_x,
                place.text_y,
                self.scale,
                font,
                &label,
            );
        }
    }

    fn text_size(&self, label: &str) -> (u32, u32) {
        match &self.font {
            Some(font) => text_size(self.scale, font, label),
            None => (
                (label.chars().count() as f32 * LABEL_CHAR_WIDTH) as u32,
                LABEL_TEXT_HEIGHT,
            ),
        }
    }
}

impl Default for BoxDrawer {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, PartialEq, Eq)]
struct LabelPlacement {
    text_x: i32,
    text_y: i32,
    bg_x1: i32,
    bg_y1: i32,
    bg_x2: i32,
    bg_y2: i32,
}

/// Label bar sits just above the box; it moves inside the box when it
/// would leave the top edge and is pushed left to stay inside the image.
fn label_placement(x1: i32, y1: i32, tw: i32, th: i32, w: i32, h: i32) -> LabelPlacement {
    let mut baseline = y1 - 4;
    if baseline - th - 4 < 0 {
        baseline = (y1 + th + 6).min(h - 2);
    }
    let text_x = x1.min(w - tw - 6).max(0);

    LabelPlacement {
        text_x: text_x + 3,
        text_y: baseline - th - 2,
        bg_x1: text_x,
        bg_y1: (baseline - th - 4).max(0),
        bg_x2: (text_x + tw + 6).min(w - 1),
        bg_y2: (baseline + 2).min(h - 1),
    }
}
