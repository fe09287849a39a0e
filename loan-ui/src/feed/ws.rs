use std::cell::RefCell;
use std::rc::Rc;

use dioxus_logger::tracing::{debug, error, info};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{CloseEvent, ErrorEvent, Event, MessageEvent, WebSocket};

use crate::feed::controller::Liveness;

// ── WebSocket event type ─────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FeedWsEvent {
    Connected,
    Message(String),
    Error(String),
    Closed,
}

// ── Subscription runtime ─────────────────────────────────────────────────────

/// Live chat subscription for one user.
///
/// Dropping it closes the liveness token first, so callbacks already queued
/// by the browser become no-ops, then detaches handlers and closes the
/// socket.
pub struct FeedSubscription {
    ws: WebSocket,
    liveness: Liveness,
    _on_open: Closure<dyn FnMut(Event)>,
    _on_message: Closure<dyn FnMut(MessageEvent)>,
    _on_error: Closure<dyn FnMut(ErrorEvent)>,
    _on_close: Closure<dyn FnMut(CloseEvent)>,
}

impl FeedSubscription {
    pub fn open<F>(user_id: &str, liveness: Liveness, on_event: F) -> Result<Self, String>
    where
        F: FnMut(FeedWsEvent) + 'static,
    {
        let ws_url = build_feed_ws_url(crate::api::api_base(), user_id);
        info!("Opening chat subscription: {}", ws_url);

        let ws = WebSocket::new(&ws_url).map_err(|e| format!("websocket open failed: {e:?}"))?;
        let on_event = Rc::new(RefCell::new(on_event));

        let live_open = liveness.clone();
        let event_open = on_event.clone();
        let on_open = Closure::wrap(Box::new(move |_e: Event| {
            if live_open.is_live() {
                event_open.borrow_mut()(FeedWsEvent::Connected);
            }
        }) as Box<dyn FnMut(Event)>);
        ws.set_onopen(Some(on_open.as_ref().unchecked_ref()));

        let live_message = liveness.clone();
        let event_message = on_event.clone();
        let on_message = Closure::wrap(Box::new(move |e: MessageEvent| {
            if !live_message.is_live() {
                return;
            }
            let Ok(text) = e.data().dyn_into::<js_sys::JsString>() else {
                return;
            };
            let text = text.as_string().unwrap_or_default();
            debug!("Chat subscription message: {}", text);
            event_message.borrow_mut()(FeedWsEvent::Message(text));
        }) as Box<dyn FnMut(MessageEvent)>);
        ws.set_onmessage(Some(on_message.as_ref().unchecked_ref()));

        let live_error = liveness.clone();
        let event_error = on_event.clone();
        let on_error = Closure::wrap(Box::new(move |e: ErrorEvent| {
            error!("Chat subscription error: {}", e.message());
            if live_error.is_live() {
                event_error.borrow_mut()(FeedWsEvent::Error(e.message()));
            }
        }) as Box<dyn FnMut(ErrorEvent)>);
        ws.set_onerror(Some(on_error.as_ref().unchecked_ref()));

        let live_close = liveness.clone();
        let event_close = on_event;
        let on_close = Closure::wrap(Box::new(move |_e: CloseEvent| {
            if live_close.is_live() {
                info!("Chat subscription closed by server");
                event_close.borrow_mut()(FeedWsEvent::Closed);
            }
        }) as Box<dyn FnMut(CloseEvent)>);
        ws.set_onclose(Some(on_close.as_ref().unchecked_ref()));

        Ok(Self {
            ws,
            liveness,
            _on_open: on_open,
            _on_message: on_message,
            _on_error: on_error,
            _on_close: on_close,
        })
    }
}

impl Drop for FeedSubscription {
    fn drop(&mut self) {
        self.liveness.close();
        self.ws.set_onopen(None);
        self.ws.set_onmessage(None);
        self.ws.set_onerror(None);
        self.ws.set_onclose(None);
        let _ = self.ws.close();
        debug!("Chat subscription torn down");
    }
}

// ── URL helpers ──────────────────────────────────────────────────────────────

pub fn build_feed_ws_url(api_base: &str, user_id: &str) -> String {
    let ws_base = http_to_ws_url(api_base);
    let user = js_sys::encode_uri_component(user_id)
        .as_string()
        .unwrap_or_else(|| user_id.to_string());
    format!("{ws_base}/ws/chats?user_id={user}")
}

pub fn http_to_ws_url(http_url: &str) -> String {
    let protocol = || {
        web_sys::window()
            .and_then(|window| window.location().protocol().ok())
            .unwrap_or_else(|| "http:".to_string())
    };
    let host = || {
        web_sys::window()
            .and_then(|window| window.location().host().ok())
            .unwrap_or_else(|| "localhost".to_string())
    };
    ws_base_for(http_url, protocol, host)
}

fn ws_base_for(
    http_url: &str,
    protocol: impl FnOnce() -> String,
    host: impl FnOnce() -> String,
) -> String {
    if let Some(rest) = http_url.strip_prefix("http://") {
        format!("ws://{rest}")
    } else if let Some(rest) = http_url.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if http_url.is_empty() {
        let host = host();
        if protocol() == "https:" {
            format!("wss://{host}")
        } else {
            format!("ws://{host}")
        }
    } else {
        format!("ws://{http_url}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ws_base_from_explicit_urls() {
        let never = || -> String { unreachable!() };
        assert_eq!(ws_base_for("http://localhost:8080", never, never), "ws://localhost:8080");
        assert_eq!(ws_base_for("https://api.example", never, never), "wss://api.example");
        assert_eq!(ws_base_for("api.example", never, never), "ws://api.example");
    }

    #[test]
    fn ws_base_from_page_origin() {
        assert_eq!(
            ws_base_for("", || "https:".to_string(), || "loans.example".to_string()),
            "wss://loans.example"
        );
        assert_eq!(
            ws_base_for("", || "http:".to_string(), || "127.0.0.1:3000".to_string()),
            "ws://127.0.0.1:3000"
        );
    }
}
