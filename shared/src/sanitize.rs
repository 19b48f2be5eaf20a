use crate::{Point, Stroke};

pub const DEFAULT_LINE_WIDTH: f64 = 2.0;
pub const DEFAULT_ERASER_SIZE: f64 = 10.0;
pub const MIN_WIDTH: f64 = 1.0;
pub const MAX_WIDTH: f64 = 60.0;
pub const MAX_POINTS_PER_STROKE: usize = 5000;
const MAX_COLOR_LEN: usize = 32;

pub fn sanitize_color(mut color: String) -> String {
    if color.is_empty() {
        return "#000000".to_string();
    }
    if color.len() > MAX_COLOR_LEN {
        let mut end = MAX_COLOR_LEN;
        while !color.is_char_boundary(end) {
            end -= 1;
        }
        color.truncate(end);
    }
    color
}

pub fn sanitize_width(width: f64, fallback: f64) -> f64 {
    let width = if width.is_finite() { width } else { fallback };
    width.clamp(MIN_WIDTH, MAX_WIDTH)
}

pub fn sanitize_points(points: Vec<Point>) -> Vec<Point> {
    points
        .into_iter()
        .filter(|point| point.is_finite())
        .take(MAX_POINTS_PER_STROKE)
        .collect()
}

pub fn sanitize_stroke(mut stroke: Stroke) -> Option<Stroke> {
    stroke.color = sanitize_color(stroke.color);
    stroke.line_width = sanitize_width(stroke.line_width, DEFAULT_LINE_WIDTH);
    stroke.points = sanitize_points(stroke.points);
    if stroke.points.is_empty() {
        return None;
    }
    Some(stroke)
}
