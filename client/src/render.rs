use web_sys::CanvasRenderingContext2d;

use sketchsync_shared::{Point, Stroke};

use crate::state::Mirror;
use crate::surface::Surface;

pub struct CanvasSurface {
    pub ctx: CanvasRenderingContext2d,
    pub width: f64,
    pub height: f64,
}

impl CanvasSurface {
    pub fn new(ctx: CanvasRenderingContext2d) -> Self {
        ctx.set_line_cap("round");
        ctx.set_line_join("round");
        Self {
            ctx,
            width: 0.0,
            height: 0.0,
        }
    }
}

impl Surface for CanvasSurface {
    fn clear(&mut self) {
        self.ctx.clear_rect(0.0, 0.0, self.width, self.height);
    }

    fn stroke_path(&mut self, points: &[Point], color: &str, width: f64) {
        let Some(first) = points.first() else {
            return;
        };
        self.ctx.set_stroke_style_str(color);
        self.ctx.set_line_width(width);
        self.ctx.begin_path();
        self.ctx.move_to(first.x, first.y);
        for point in points {
            self.ctx.line_to(point.x, point.y);
        }
        self.ctx.stroke();
    }
}

pub fn draw_dot(surface: &mut impl Surface, point: Point, color: &str, width: f64) {
    surface.stroke_path(&[point], color, width);
}

pub fn draw_segment(surface: &mut impl Surface, from: Point, to: Point, color: &str, width: f64) {
    surface.stroke_path(&[from, to], color, width);
}

pub fn draw_stroke(surface: &mut impl Surface, stroke: &Stroke) {
    if !stroke.is_pen() || stroke.points.is_empty() {
        return;
    }
    surface.stroke_path(&stroke.points, &stroke.color, stroke.line_width);
}

pub fn redraw_all(surface: &mut impl Surface, mirror: &Mirror) {
    surface.clear();
    for (_, strokes) in mirror.iter() {
        for stroke in strokes {
            draw_stroke(surface, stroke);
        }
    }
}
