//! Layout of the shareable card and the share/export notices.
//!
//! Geometry is in CSS pixels at scale 1; the exporter multiplies by
//! `EXPORT_SCALE`.

use thiserror::Error;

pub const CARD_WIDTH: f64 = 340.0;
pub const CARD_HEIGHT: f64 = 640.0;
pub const CONTENT_TOP: f64 = 112.0;
pub const SIDE_PADDING: f64 = 16.0;
pub const PHOTO_WIDTH_FRACTION: f64 = 0.85;
pub const PHOTO_ASPECT: f64 = 4.0 / 5.0; // width / height
pub const PHOTO_BORDER: f64 = 6.0;
pub const PHOTO_RADIUS: f64 = 12.0;
pub const MESSAGE_GAP: f64 = 32.0;
pub const MESSAGE_PADDING: f64 = 16.0;
pub const MESSAGE_FONT_PX: f64 = 18.0;
pub const MESSAGE_LINE_HEIGHT: f64 = 29.0;
pub const EXPORT_SCALE: f64 = 3.0;

pub const SAVE_FAILED_NOTICE: &str = "Saving failed, please take a screenshot instead!";
pub const LINK_COPIED_NOTICE: &str = "Link copied!";
pub const COPY_FAILED_NOTICE: &str = "Copy failed";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ShareError {
    #[error("export failed: {0}")]
    Export(String),
    #[error("clipboard unavailable: {0}")]
    Clipboard(String),
}

impl ShareError {
    pub fn notice(&self) -> &'static str {
        match self {
            ShareError::Export(_) => SAVE_FAILED_NOTICE,
            ShareError::Clipboard(_) => COPY_FAILED_NOTICE,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn inset(&self, d: f64) -> Rect {
        Rect {
            x: self.x + d,
            y: self.y + d,
            w: (self.w - 2.0 * d).max(0.0),
            h: (self.h - 2.0 * d).max(0.0),
        }
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CardLayout {
    pub card: Rect,
    /// Outer photo frame, border included.
    pub photo: Rect,
    /// Photo area inside the border.
    pub photo_inner: Rect,
    pub message_box: Option<Rect>,
    pub message_lines: Vec<String>,
}

impl CardLayout {
    /// Lay out the card for `message`, measuring text with `measure` (pixel
    /// width of a string at `MESSAGE_FONT_PX`).
    pub fn compute(message: &str, measure: impl Fn(&str) -> f64) -> CardLayout {
        let card = Rect {
            x: 0.0,
            y: 0.0,
            w: CARD_WIDTH,
            h: CARD_HEIGHT,
        };
        let content_w = CARD_WIDTH - 2.0 * SIDE_PADDING;
        let photo_w = content_w * PHOTO_WIDTH_FRACTION;
        let photo = Rect {
            x: (CARD_WIDTH - photo_w) / 2.0,
            y: CONTENT_TOP,
            w: photo_w,
            h: photo_w / PHOTO_ASPECT,
        };

        let trimmed = message.trim();
        let (message_box, message_lines) = if trimmed.is_empty() {
            (None, Vec::new())
        } else {
            let lines = wrap_lines(trimmed, photo_w - 2.0 * MESSAGE_PADDING, &measure);
            let h = lines.len() as f64 * MESSAGE_LINE_HEIGHT + 2.0 * MESSAGE_PADDING;
            let rect = Rect {
                x: photo.x,
                y: photo.bottom() + MESSAGE_GAP,
                w: photo_w,
                h,
            };
            (Some(rect), lines)
        };

        CardLayout {
            card,
            photo,
            photo_inner: photo.inset(PHOTO_BORDER),
            message_box,
            message_lines,
        }
    }
}

/// Greedy word wrap. Explicit newlines are kept; words wider than the line
/// are broken per character (this also covers text without spaces).
pub fn wrap_lines(text: &str, max_width: f64, measure: impl Fn(&str) -> f64) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if line.is_empty() {
                word.to_string()
            } else {
                format!("{line} {word}")
            };
            if measure(&candidate) <= max_width {
                line = candidate;
                continue;
            }
            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
            if measure(word) <= max_width {
                line = word.to_string();
                continue;
            }
            for ch in word.chars() {
                line.push(ch);
                if measure(&line) > max_width && line.chars().count() > 1 {
                    line.pop();
                    lines.push(std::mem::take(&mut line));
                    line.push(ch);
                }
            }
        }
        lines.push(line);
    }
    lines
}

/// Source rectangle for drawing an `sw x sh` image into `dw x dh` with
/// object-fit: cover.
pub fn cover_crop(sw: f64, sh: f64, dw: f64, dh: f64) -> Rect {
    if sw <= 0.0 || sh <= 0.0 || dw <= 0.0 || dh <= 0.0 {
        return Rect {
            x: 0.0,
            y: 0.0,
            w: sw.max(0.0),
            h: sh.max(0.0),
        };
    }
    let src_aspect = sw / sh;
    let dst_aspect = dw / dh;
    if src_aspect > dst_aspect {
        let w = sh * dst_aspect;
        Rect {
            x: (sw - w) / 2.0,
            y: 0.0,
            w,
            h: sh,
        }
    } else {
        let h = sw / dst_aspect;
        Rect {
            x: 0.0,
            y: (sh - h) / 2.0,
            w: sw,
            h,
        }
    }
}

pub fn export_filename(unix_millis: u64) -> String {
    format!("WishVerse_Card_{unix_millis}.png")
}
