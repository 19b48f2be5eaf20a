use std::cell::RefCell;
use std::rc::Rc;

use js_sys::Function;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    CanvasRenderingContext2d, Document, Element, Event, HtmlButtonElement, HtmlCanvasElement,
    HtmlInputElement, PointerEvent, Window,
};

use sketchsync_shared::{ClientMessage, Point, Tool};

use crate::dom::{
    board_size, clear_cursor, context_2d, draw_eraser_cursor, event_to_point, get_element,
    resize_canvases, set_body_cursor, set_text, set_tool_button, PointerPhase, POINTER_EVENTS,
};
use crate::persistence::{load_user_id, store_user_id};
use crate::reconcile::{apply_server_message, Outcome};
use crate::render::{redraw_all, CanvasSurface};
use crate::session::LocalSession;
use crate::state::{Mirror, ToolSettings};
use crate::util::make_stroke_id;
use crate::ws::{connect_ws, WsEvent, WsSender};

const RECONNECT_DELAY_MS: i32 = 1000;

struct App {
    window: Window,
    document: Document,
    canvas: HtmlCanvasElement,
    cursor_canvas: HtmlCanvasElement,
    cursor_ctx: CanvasRenderingContext2d,
    surface: CanvasSurface,
    mirror: Mirror,
    session: LocalSession,
    socket: Option<Rc<WsSender>>,
    pen_button: HtmlButtonElement,
    eraser_button: HtmlButtonElement,
    online_count: Element,
    user_label: Element,
}

impl App {
    fn send(&self, message: &ClientMessage) {
        if let Some(socket) = &self.socket {
            socket.send(message);
        }
    }

    fn redraw(&mut self) {
        redraw_all(&mut self.surface, &self.mirror);
    }

    fn resize(&mut self) {
        let (width, height) = board_size(&self.window);
        resize_canvases(
            &self.canvas,
            &self.surface.ctx,
            &self.cursor_canvas,
            width,
            height,
        );
        self.surface.width = width;
        self.surface.height = height;
        self.redraw();
    }

    fn select_tool(&mut self, tool: Tool) {
        self.session.set_tool(tool);
        set_tool_button(&self.pen_button, tool == Tool::Pen);
        set_tool_button(&self.eraser_button, tool == Tool::Eraser);
        let cursor = match tool {
            Tool::Pen => "crosshair",
            Tool::Eraser => "none",
        };
        set_body_cursor(&self.document, cursor);
        clear_cursor(&self.cursor_ctx, &self.cursor_canvas);
    }

    fn pointer_down(&mut self, point: Point) {
        let message =
            self.session
                .begin(&mut self.mirror, &mut self.surface, point, make_stroke_id());
        if let Some(message) = message {
            self.send(&message);
        }
    }

    fn pointer_move(&mut self, point: Point) {
        if self.session.settings().tool == Tool::Eraser {
            let radius = self.session.settings().eraser_size;
            draw_eraser_cursor(&self.cursor_ctx, &self.cursor_canvas, point, radius);
        }
        let message = self
            .session
            .extend(&mut self.mirror, &mut self.surface, point);
        if let Some(message) = message {
            self.send(&message);
        }
    }

    fn pointer_up(&mut self) {
        if let Some(message) = self.session.end(&mut self.mirror) {
            self.send(&message);
        }
    }

    fn clear_all(&mut self) {
        self.mirror.clear();
        self.redraw();
        self.send(&ClientMessage::ClearAll);
    }

    fn handle_ws_event(&mut self, event: WsEvent) -> bool {
        match event {
            WsEvent::Open => {
                log::info!("connected");
                let existing_user_id = load_user_id(&self.window);
                self.send(&ClientMessage::Register { existing_user_id });
            }
            WsEvent::Message(message) => {
                log::debug!("received {}", message.kind());
                match apply_server_message(&mut self.mirror, message) {
                    Outcome::Joined {
                        user_id,
                        color,
                        user_count,
                    } => {
                        store_user_id(&self.window, &user_id);
                        let short: String = user_id.chars().take(6).collect();
                        set_text(&self.user_label, &format!("ID: {short}"));
                        set_text(&self.online_count, &format!("Online: {user_count}"));
                        self.session.identify(user_id, color);
                        self.redraw();
                    }
                    Outcome::Redraw => self.redraw(),
                    Outcome::UserCount(count) => {
                        set_text(&self.online_count, &format!("Online: {count}"));
                    }
                    Outcome::Ignored => {}
                }
            }
            WsEvent::Error => log::warn!("websocket error"),
            WsEvent::Close => {
                log::warn!("disconnected, retrying in {RECONNECT_DELAY_MS}ms");
                self.socket = None;
                return true;
            }
        }
        false
    }
}

fn connect(app: &Rc<RefCell<App>>) -> Result<(), JsValue> {
    let window = app.borrow().window.clone();
    let handler_app = app.clone();
    let socket = connect_ws(&window, move |event| {
        let closed = handler_app.borrow_mut().handle_ws_event(event);
        if closed {
            schedule_reconnect(&handler_app);
        }
    })?;
    app.borrow_mut().socket = Some(socket);
    Ok(())
}

fn schedule_reconnect(app: &Rc<RefCell<App>>) {
    let window = app.borrow().window.clone();
    let retry_app = app.clone();
    let retry = Closure::once_into_js(move || {
        if let Err(err) = connect(&retry_app) {
            log::error!("reconnect failed: {err:?}");
            schedule_reconnect(&retry_app);
        }
    });
    let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
        retry.unchecked_ref::<Function>(),
        RECONNECT_DELAY_MS,
    );
}

fn handle_pointer(app: &mut App, event: &PointerEvent) {
    let Some(phase) = PointerPhase::from_event_type(&event.type_()) else {
        return;
    };
    match phase {
        PointerPhase::Down => {
            if event.button() != 0 {
                return;
            }
            event.prevent_default();
            let _ = app.canvas.set_pointer_capture(event.pointer_id());
            if let Some(point) = event_to_point(&app.canvas, event) {
                app.pointer_down(point);
            }
        }
        PointerPhase::Move => {
            if let Some(point) = event_to_point(&app.canvas, event) {
                app.pointer_move(point);
            }
        }
        PointerPhase::Up => app.pointer_up(),
        PointerPhase::Lost => {
            app.pointer_up();
            clear_cursor(&app.cursor_ctx, &app.cursor_canvas);
        }
    }
}

fn on_pointer(
    target: &HtmlCanvasElement,
    event_name: &str,
    app: &Rc<RefCell<App>>,
    handler: fn(&mut App, &PointerEvent),
) -> Result<(), JsValue> {
    let app = app.clone();
    let callback = Closure::<dyn FnMut(PointerEvent)>::new(move |event: PointerEvent| {
        handler(&mut app.borrow_mut(), &event);
    });
    target.add_event_listener_with_callback(event_name, callback.as_ref().unchecked_ref())?;
    callback.forget();
    Ok(())
}

fn on_click(
    target: &Element,
    app: &Rc<RefCell<App>>,
    handler: fn(&mut App),
) -> Result<(), JsValue> {
    let app = app.clone();
    let callback = Closure::<dyn FnMut(Event)>::new(move |_| {
        handler(&mut app.borrow_mut());
    });
    target.add_event_listener_with_callback("click", callback.as_ref().unchecked_ref())?;
    callback.forget();
    Ok(())
}

#[wasm_bindgen(start)]
pub fn run() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("Missing window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("Missing document"))?;

    let canvas: HtmlCanvasElement = get_element(&document, "drawing-board")?;
    let cursor_canvas: HtmlCanvasElement = get_element(&document, "cursor-canvas")?;
    let pen_button: HtmlButtonElement = get_element(&document, "pen-tool")?;
    let eraser_button: HtmlButtonElement = get_element(&document, "eraser-tool")?;
    let clear_button: HtmlButtonElement = get_element(&document, "clear-all")?;
    let online_count: Element = get_element(&document, "online-count")?;
    let user_label: Element = get_element(&document, "user-id")?;

    let surface = CanvasSurface::new(context_2d(&canvas)?);
    let cursor_ctx = context_2d(&cursor_canvas)?;

    let app = Rc::new(RefCell::new(App {
        window: window.clone(),
        document: document.clone(),
        canvas: canvas.clone(),
        cursor_canvas,
        cursor_ctx,
        surface,
        mirror: Mirror::new(),
        session: LocalSession::new(ToolSettings::default()),
        socket: None,
        pen_button: pen_button.clone(),
        eraser_button: eraser_button.clone(),
        online_count,
        user_label,
    }));

    {
        let mut app = app.borrow_mut();
        app.resize();
        app.select_tool(Tool::Pen);
    }

    {
        let resize_app = app.clone();
        let onresize = Closure::<dyn FnMut()>::new(move || {
            resize_app.borrow_mut().resize();
        });
        window.add_event_listener_with_callback("resize", onresize.as_ref().unchecked_ref())?;
        onresize.forget();
    }

    for event_name in POINTER_EVENTS {
        on_pointer(&canvas, event_name, &app, handle_pointer)?;
    }

    on_click(&pen_button, &app, |app| app.select_tool(Tool::Pen))?;
    on_click(&eraser_button, &app, |app| app.select_tool(Tool::Eraser))?;
    on_click(&clear_button, &app, |app| {
        let confirmed = app
            .window
            .confirm_with_message("Clear everyone's strokes?")
            .unwrap_or(false);
        if confirmed {
            app.clear_all();
        }
    })?;

    let radios = document.query_selector_all("input[name=\"eraser-size\"]")?;
    for index in 0..radios.length() {
        let Some(radio) = radios
            .item(index)
            .and_then(|node| node.dyn_into::<HtmlInputElement>().ok())
        else {
            continue;
        };
        let size_app = app.clone();
        let input = radio.clone();
        let onchange = Closure::<dyn FnMut(Event)>::new(move |_| {
            match input.value().parse::<f64>() {
                Ok(size) => size_app.borrow_mut().session.set_eraser_size(size),
                Err(_) => log::warn!("invalid eraser size {:?}", input.value()),
            }
        });
        radio.add_event_listener_with_callback("change", onchange.as_ref().unchecked_ref())?;
        onchange.forget();
    }

    connect(&app)
}
