use std::error::Error;
use std::fmt::{Display, Formatter};

use ndarray::Array2;
use sketchraster_helpers::{PenMove, Point, Stroke};

/// Line width, in pixels, used for every rendered stroke.
pub const STROKE_WIDTH: f32 = 3.0;
/// Pixel intensity of rendered ink; the canvas background stays at 0.
pub const INK: u8 = 255;
/// Fraction of the target canvas the drawing's bounding box is scaled to,
/// leaving a margin so strokes never touch the canvas edge.
pub const FIT_MARGIN: f32 = 0.9;

/// Errors that can occur while fitting strokes to a canvas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    /// The drawing contains no points at all, so it has no bounding box.
    EmptyDrawing,
}

impl Display for NormalizeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            NormalizeError::EmptyDrawing => {
                write!(f, "Cannot normalize a drawing with no points")
            }
        }
    }
}

impl Error for NormalizeError {}

/// Reconstructs absolute-coordinate strokes from delta-encoded pen moves.
///
/// The pen starts at (0, 0); each move shifts it by `(dx, dy)` and records
/// the new position in the current stroke. A move with `lift == 1` closes
/// the stroke; any other lift value keeps the pen down. A non-empty
/// trailing stroke is kept even when the final move does not lift the pen,
/// so truncated drawings lose no points.
///
/// Decoding an empty move sequence yields an empty stroke set.
pub fn decode_drawing(drawing: &[PenMove]) -> Vec<Stroke> {
    let mut strokes: Vec<Stroke> = Vec::new();
    let mut points: Vec<Point> = Vec::new();
    let mut x = 0i32;
    let mut y = 0i32;

    for mv in drawing {
        x += mv.dx;
        y += mv.dy;
        points.push(Point::new(x as f32, y as f32));
        if mv.lifts_pen() {
            strokes.push(Stroke::new(std::mem::take(&mut points)));
        }
    }

    if !points.is_empty() {
        strokes.push(Stroke::new(points));
    }

    strokes
}

/// Rescales and translates strokes so their bounding box fits a canvas of
/// `target_size = (width, height)` pixels.
///
/// One uniform scale factor is used for both axes (the smaller of the two
/// axis-wise ratios, shrunk by [`FIT_MARGIN`]), so the drawing keeps its
/// aspect ratio. The bounding box is first translated to originate at
/// (0, 0), which makes the minimum output coordinate exactly 0 on each
/// axis. A bounding box with zero width or height is clamped to 1 before
/// dividing.
///
/// # Errors
///
/// Returns [`NormalizeError::EmptyDrawing`] when the strokes contain no
/// points at all.
pub fn normalize_strokes(
    strokes: &[Stroke],
    target_size: (u32, u32),
) -> Result<Vec<Stroke>, NormalizeError> {
    let (min_x, min_y, max_x, max_y) =
        bounding_rect(strokes).ok_or(NormalizeError::EmptyDrawing)?;

    let mut width = max_x - min_x;
    let mut height = max_y - min_y;
    if width == 0.0 {
        width = 1.0;
    }
    if height == 0.0 {
        height = 1.0;
    }

    let (target_w, target_h) = target_size;
    let scale = f32::min(target_w as f32 / width, target_h as f32 / height) * FIT_MARGIN;

    let normalized = strokes
        .iter()
        .map(|stroke| {
            let points = stroke
                .points
                .iter()
                .map(|p| Point::new((p.x - min_x) * scale, (p.y - min_y) * scale))
                .collect();
            Stroke::new(points)
        })
        .collect();

    Ok(normalized)
}

/// Draws normalized strokes onto a fresh single-channel canvas of
/// `canvas_size = (width, height)` pixels.
///
/// The canvas is returned as an array of shape `(height, width)` with
/// background 0. Every stroke with at least two points is drawn as a
/// connected polyline at intensity [`INK`] and width [`STROKE_WIDTH`];
/// degenerate strokes contribute nothing. A pixel is inked exactly when
/// its center lies within half the stroke width of a segment, which gives
/// round caps and joints and no anti-aliasing.
pub fn rasterize_strokes(strokes: &[Stroke], canvas_size: (u32, u32)) -> Array2<u8> {
    let (width, height) = canvas_size;
    let mut canvas = Array2::zeros((height as usize, width as usize));

    for stroke in strokes {
        if stroke.is_degenerate() {
            continue;
        }
        for pair in stroke.points.windows(2) {
            draw_segment(&mut canvas, pair[0], pair[1]);
        }
    }

    canvas
}

/// Runs the full per-item transform: decode, fit to the canvas, draw.
///
/// # Errors
///
/// Returns [`NormalizeError::EmptyDrawing`] when `drawing` is empty.
pub fn render_drawing(
    drawing: &[PenMove],
    canvas_size: (u32, u32),
) -> Result<Array2<u8>, NormalizeError> {
    let strokes = decode_drawing(drawing);
    let strokes = normalize_strokes(&strokes, canvas_size)?;
    Ok(rasterize_strokes(&strokes, canvas_size))
}

/// Bounding box over every point of every stroke, as
/// `(min_x, min_y, max_x, max_y)`. `None` when there are no points.
fn bounding_rect(strokes: &[Stroke]) -> Option<(f32, f32, f32, f32)> {
    let mut rect: Option<(f32, f32, f32, f32)> = None;
    for stroke in strokes {
        for p in &stroke.points {
            rect = Some(match rect {
                None => (p.x, p.y, p.x, p.y),
                Some((min_x, min_y, max_x, max_y)) => (
                    f32::min(min_x, p.x),
                    f32::min(min_y, p.y),
                    f32::max(max_x, p.x),
                    f32::max(max_y, p.y),
                ),
            });
        }
    }
    rect
}

/// Inks every pixel whose center is within half the stroke width of the
/// segment `a`-`b`. Only the segment's padded bounding box is scanned.
fn draw_segment(canvas: &mut Array2<u8>, a: Point, b: Point) {
    let (rows, cols) = canvas.dim();
    let half = STROKE_WIDTH / 2.0;

    let x_lo = clamp_index(f32::min(a.x, b.x) - half, cols);
    let x_hi = clamp_index(f32::max(a.x, b.x) + half + 1.0, cols);
    let y_lo = clamp_index(f32::min(a.y, b.y) - half, rows);
    let y_hi = clamp_index(f32::max(a.y, b.y) + half + 1.0, rows);

    for y in y_lo..y_hi {
        for x in x_lo..x_hi {
            let center = Point::new(x as f32 + 0.5, y as f32 + 0.5);
            if dist_sq_to_segment(center, a, b) <= half * half {
                canvas[[y, x]] = INK;
            }
        }
    }
}

fn clamp_index(v: f32, limit: usize) -> usize {
    if v <= 0.0 {
        0
    } else {
        (v.floor() as usize).min(limit)
    }
}

/// Squared distance from `p` to the closed segment `a`-`b`. A zero-length
/// segment degenerates to the distance to `a`.
fn dist_sq_to_segment(p: Point, a: Point, b: Point) -> f32 {
    let abx = b.x - a.x;
    let aby = b.y - a.y;
    let apx = p.x - a.x;
    let apy = p.y - a.y;

    let len_sq = abx * abx + aby * aby;
    let t = if len_sq == 0.0 {
        0.0
    } else {
        ((apx * abx + apy * aby) / len_sq).clamp(0.0, 1.0)
    };

    let cx = a.x + t * abx;
    let cy = a.y + t * aby;
    let dx = p.x - cx;
    let dy = p.y - cy;
    dx * dx + dy * dy
}
