//! Marker compositing on RGB rasters.
//!
//! Pixel centers sit on integer coordinates, so a marker at `(10.0, 20.0)`
//! is centered on pixel column 10, row 20. Edges are anti-aliased with a
//! one-pixel linear ramp on the distance to the outline.

use image::{Rgb, RgbImage};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use scantron_core::QuestionId;

use crate::style::{Color, MarkStyle};

/// A marker placed for one resolved answer-key entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub question_id: QuestionId,
    pub answer_label: String,
    pub center: Point2<f64>,
}

/// Draw every marker onto a fresh copy of `reference`.
///
/// `reference` is only read; the returned buffer is newly allocated.
pub fn composite(reference: &RgbImage, markers: &[Marker], style: &MarkStyle) -> RgbImage {
    let mut out = reference.clone();
    for marker in markers {
        draw_marker(&mut out, marker.center, style);
    }
    out
}

/// Blend one circular marker into `img` in place.
///
/// The fill covers the disk of `style.radius`; the border is a ring of
/// `style.border_width` centered on the outline and is painted over the
/// fill. Both are blended with `style.opacity`. Parts outside the image are
/// clipped.
pub fn draw_marker(img: &mut RgbImage, center: Point2<f64>, style: &MarkStyle) {
    if img.width() == 0 || img.height() == 0 || style.opacity <= 0.0 {
        return;
    }

    let cx = center.x as f32;
    let cy = center.y as f32;
    let extent = style.outer_extent();

    let Some((x0, x1)) = clip_span(cx - extent, cx + extent, img.width()) else {
        return;
    };
    let Some((y0, y1)) = clip_span(cy - extent, cy + extent, img.height()) else {
        return;
    };

    let half_width = 0.5 * style.border_width;
    for y in y0..=y1 {
        for x in x0..=x1 {
            let d = (x as f32 - cx).hypot(y as f32 - cy);
            let px = img.get_pixel_mut(x, y);

            if let Some(fill) = style.fill {
                let coverage = ramp(style.radius + 0.5 - d);
                blend(px, fill, style.opacity * coverage);
            }
            if let Some(border) = style.border {
                if style.border_width > 0.0 {
                    let coverage =
                        ramp(half_width + 0.5 - (d - style.radius).abs()).min(style.border_width);
                    blend(px, border, style.opacity * coverage);
                }
            }
        }
    }
}

/// Inclusive pixel range covering `[lo, hi]`, clipped to `0..len`.
fn clip_span(lo: f32, hi: f32, len: u32) -> Option<(u32, u32)> {
    let max = len as f32 - 1.0;
    if hi < 0.0 || lo > max {
        return None;
    }
    let start = lo.floor().max(0.0) as u32;
    let end = hi.ceil().min(max) as u32;
    Some((start, end))
}

#[inline]
fn ramp(v: f32) -> f32 {
    v.clamp(0.0, 1.0)
}

#[inline]
fn blend(px: &mut Rgb<u8>, color: Color, alpha: f32) {
    if alpha <= 0.0 {
        return;
    }
    for (dst, src) in px.0.iter_mut().zip(color.0) {
        let v = f32::from(*dst) * (1.0 - alpha) + f32::from(src) * alpha;
        *dst = v.round().clamp(0.0, 255.0) as u8;
    }
}
