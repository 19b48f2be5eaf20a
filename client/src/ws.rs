use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CloseEvent, Event, MessageEvent, WebSocket, Window};

use sketchsync_shared::{ClientMessage, ServerMessage};

use crate::net::websocket_url;

#[derive(Debug)]
pub enum WsEvent {
    Open,
    Close,
    Error,
    Message(ServerMessage),
}

pub struct WsSender {
    socket: WebSocket,
}

impl WsSender {
    pub fn is_open(&self) -> bool {
        self.socket.ready_state() == WebSocket::OPEN
    }

    pub fn send(&self, message: &ClientMessage) {
        if !self.is_open() {
            return;
        }
        match bincode::encode_to_vec(message, bincode::config::standard()) {
            Ok(payload) => {
                let _ = self.socket.send_with_u8_array(&payload);
            }
            Err(error) => log::error!("failed to encode message: {error}"),
        }
    }
}

fn decode_message(event: &MessageEvent) -> Option<ServerMessage> {
    let Some(text) = event.data().as_string() else {
        log::error!("WS message data is not a string");
        return None;
    };
    parse_server_text(&text)
}

fn parse_server_text(text: &str) -> Option<ServerMessage> {
    match serde_json::from_str::<ServerMessage>(text) {
        Ok(message) => Some(message),
        Err(error) => {
            let snippet: String = text.chars().take(200).collect();
            log::error!("WS message JSON parse error: {error} payload={snippet:?}");
            None
        }
    }
}

pub fn connect_ws(
    window: &Window,
    on_event: impl 'static + FnMut(WsEvent),
) -> Result<Rc<WsSender>, JsValue> {
    let ws_url = websocket_url(window)?;
    let socket = WebSocket::new(&ws_url)?;

    let sender = Rc::new(WsSender {
        socket: socket.clone(),
    });

    let on_event = Rc::new(RefCell::new(on_event));

    {
        let on_event = on_event.clone();
        let onopen = Closure::<dyn FnMut(Event)>::new(move |_| {
            on_event.borrow_mut()(WsEvent::Open);
        });
        socket.set_onopen(Some(onopen.as_ref().unchecked_ref()));
        onopen.forget();
    }

    {
        let on_event = on_event.clone();
        let onclose = Closure::<dyn FnMut(CloseEvent)>::new(move |_| {
            on_event.borrow_mut()(WsEvent::Close);
        });
        socket.set_onclose(Some(onclose.as_ref().unchecked_ref()));
        onclose.forget();
    }

    {
        let on_event = on_event.clone();
        let onerror = Closure::<dyn FnMut(Event)>::new(move |_| {
            on_event.borrow_mut()(WsEvent::Error);
        });
        socket.set_onerror(Some(onerror.as_ref().unchecked_ref()));
        onerror.forget();
    }

    {
        let on_event = on_event.clone();
        let onmessage = Closure::<dyn FnMut(MessageEvent)>::new(move |event: MessageEvent| {
            if let Some(message) = decode_message(&event) {
                on_event.borrow_mut()(WsEvent::Message(message));
            }
        });
        socket.set_onmessage(Some(onmessage.as_ref().unchecked_ref()));
        onmessage.forget();
    }

    {
        let socket = socket.clone();
        let onbeforeunload = Closure::<dyn FnMut(Event)>::new(move |_| {
            let _ = socket.close();
        });
        window.add_event_listener_with_callback(
            "beforeunload",
            onbeforeunload.as_ref().unchecked_ref(),
        )?;
        onbeforeunload.forget();
    }

    Ok(sender)
}
