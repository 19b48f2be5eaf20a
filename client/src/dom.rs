use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    CanvasRenderingContext2d, Document, Element, HtmlButtonElement, HtmlCanvasElement,
    PointerEvent, Window,
};

use sketchsync_shared::Point;

use crate::state::TOOLBAR_HEIGHT;

pub const POINTER_EVENTS: [&str; 5] = [
    "pointerdown",
    "pointermove",
    "pointerup",
    "pointerleave",
    "pointercancel",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    Lost,
}

impl PointerPhase {
    pub fn from_event_type(event_type: &str) -> Option<Self> {
        match event_type {
            "pointerdown" => Some(Self::Down),
            "pointermove" => Some(Self::Move),
            "pointerup" => Some(Self::Up),
            "pointerleave" | "pointercancel" => Some(Self::Lost),
            _ => None,
        }
    }
}

pub fn get_element<T: JsCast>(document: &Document, id: &str) -> Result<T, JsValue> {
    let element = document
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("Missing element: {id}")))?;
    element
        .dyn_into::<T>()
        .map_err(|_| JsValue::from_str(&format!("Invalid element type: {id}")))
}

pub fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, JsValue> {
    canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("Missing 2d context"))?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(|_| JsValue::from_str("Invalid 2d context"))
}

pub fn set_tool_button(button: &HtmlButtonElement, active: bool) {
    let classes = button.class_list();
    let _ = if active {
        classes.add_1("active")
    } else {
        classes.remove_1("active")
    };
}

pub fn set_body_cursor(document: &Document, cursor: &str) {
    if let Some(body) = document.body() {
        let _ = body.style().set_property("cursor", cursor);
    }
}

pub fn set_text(element: &Element, text: &str) {
    element.set_text_content(Some(text));
}

pub fn board_size(window: &Window) -> (f64, f64) {
    let width = window
        .inner_width()
        .ok()
        .and_then(|value| value.as_f64())
        .unwrap_or(0.0);
    let height = window
        .inner_height()
        .ok()
        .and_then(|value| value.as_f64())
        .unwrap_or(0.0);
    (width.max(0.0), (height - TOOLBAR_HEIGHT).max(0.0))
}

pub fn resize_canvases(
    board: &HtmlCanvasElement,
    board_ctx: &CanvasRenderingContext2d,
    cursor: &HtmlCanvasElement,
    width: f64,
    height: f64,
) {
    for canvas in [board, cursor] {
        canvas.set_width(width as u32);
        canvas.set_height(height as u32);
    }
    board_ctx.set_line_cap("round");
    board_ctx.set_line_join("round");
}

pub fn event_to_point(canvas: &HtmlCanvasElement, event: &PointerEvent) -> Option<Point> {
    let rect = canvas.get_bounding_client_rect();
    if rect.width() <= 0.0 || rect.height() <= 0.0 {
        return None;
    }
    let point = Point::new(
        event.client_x() as f64 - rect.left(),
        event.client_y() as f64 - rect.top(),
    );
    point.is_finite().then_some(point)
}

pub fn clear_cursor(ctx: &CanvasRenderingContext2d, canvas: &HtmlCanvasElement) {
    ctx.clear_rect(0.0, 0.0, canvas.width() as f64, canvas.height() as f64);
}

pub fn draw_eraser_cursor(
    ctx: &CanvasRenderingContext2d,
    canvas: &HtmlCanvasElement,
    point: Point,
    radius: f64,
) {
    clear_cursor(ctx, canvas);
    ctx.begin_path();
    let _ = ctx.arc(point.x, point.y, radius, 0.0, std::f64::consts::TAU);
    ctx.set_stroke_style_str("#000");
    ctx.set_line_width(1.0);
    ctx.stroke();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_registered_event_has_a_phase() {
        let phases = POINTER_EVENTS
            .iter()
            .map(|name| PointerPhase::from_event_type(name))
            .collect::<Vec<_>>();
        assert!(phases.iter().all(Option::is_some));
        assert_eq!(
            PointerPhase::from_event_type("pointercancel"),
            Some(PointerPhase::Lost)
        );
        assert_eq!(PointerPhase::from_event_type("click"), None);
    }

    #[test]
    fn page_leaves_touch_gestures_to_the_canvas() {
        let page = include_str!("../../public/index.html");
        let rule = page
            .lines()
            .find(|line| line.contains("#board canvas"))
            .unwrap_or_default();
        assert!(rule.contains("touch-action: none"), "{rule}");
    }
}
