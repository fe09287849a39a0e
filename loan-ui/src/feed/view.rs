use chrono::{DateTime, Utc};
use dioxus::prelude::*;
use dioxus_logger::tracing::{error, info, warn};
use futures_util::StreamExt;
use gloo_timers::future::TimeoutFuture;
use shared_types::{ChatRequest, ChatTurn, Document, END_SESSION_MESSAGE};

use crate::api::{fetch_turns, send_chat};
use crate::config::ui_config;
use crate::feed::attachments::{turn_documents, AttachmentKind};
use crate::feed::controller::{Delivery, FeedController};
use crate::feed::state::ScrollSignal;
use crate::feed::ws::{FeedSubscription, FeedWsEvent};
use crate::flow::state::FlowCommand;
use crate::styles::CHAT_STYLES;

const FEED_END_ID: &str = "chat-feed-end";

#[derive(Clone, Debug, PartialEq)]
enum Connection {
    Connecting,
    Live,
    Offline(String),
}

/// Chat feed for one user. Mount it keyed by user id so a new identity gets
/// a fresh controller and subscription.
#[component]
pub fn ChatFeed(user_id: String) -> Element {
    let flow = use_coroutine_handle::<FlowCommand>();
    let user_id_signal = use_signal(|| user_id.clone());
    let mut controller = use_signal(|| FeedController::new(ui_config().bridge.clone()));
    let mut subscription = use_signal(|| None::<FeedSubscription>);
    let mut connection = use_signal(|| Connection::Connecting);
    let mut scroll_tick = use_signal(|| 0_u64);
    let mut input_text = use_signal(String::new);
    let mut sending = use_signal(|| false);

    use_drop(move || {
        controller.write().teardown();
        subscription.write().take();
    });

    // Initial load
    use_hook(move || {
        spawn(async move {
            refresh_turns(user_id_signal(), controller, scroll_tick).await;
        });
    });

    // Subscription pump: socket callbacks only enqueue, this task applies.
    use_hook(move || {
        let (tx, mut rx) = futures::channel::mpsc::unbounded::<FeedWsEvent>();
        let liveness = controller.read().liveness();
        match FeedSubscription::open(&user_id_signal(), liveness, move |event| {
            let _ = tx.unbounded_send(event);
        }) {
            Ok(runtime) => subscription.set(Some(runtime)),
            Err(e) => {
                error!("Chat subscription failed: {}", e);
                connection.set(Connection::Offline(e));
                return;
            }
        }

        spawn(async move {
            while let Some(event) = rx.next().await {
                match event {
                    FeedWsEvent::Connected => connection.set(Connection::Live),
                    FeedWsEvent::Closed => {
                        connection.set(Connection::Offline("Connection closed".to_string()))
                    }
                    FeedWsEvent::Error(message) => connection.set(Connection::Offline(message)),
                    FeedWsEvent::Message(text) => {
                        let delivery = controller.write().deliver_raw(&text, Utc::now());
                        match delivery {
                            Delivery::Applied { commands, scroll } => {
                                for command in commands {
                                    flow.send(command);
                                }
                                schedule_scroll(scroll, scroll_tick);
                                spawn(async move {
                                    refresh_turns(user_id_signal(), controller, scroll_tick).await;
                                });
                            }
                            Delivery::Connected => connection.set(Connection::Live),
                            Delivery::Failed(message) => {
                                connection.set(Connection::Offline(message))
                            }
                            Delivery::Dropped | Delivery::Ignored => {}
                        }
                    }
                }
            }
        });
    });

    // Scroll manager
    use_effect(move || {
        if scroll_tick() == 0 {
            return;
        }
        if let Some(end) = web_sys::window()
            .and_then(|window| window.document())
            .and_then(|document| document.get_element_by_id(FEED_END_ID))
        {
            end.scroll_into_view();
        }
    });

    let mut submit = move |text: String| {
        if text.trim().is_empty() || sending() {
            return;
        }
        let turn = ChatTurn::new(user_id_signal(), text);
        let request = ChatRequest::for_turn(&turn, Vec::<Document>::new());
        if request.ends_session() {
            info!("Ending agent session for {}", request.user_id);
        }
        if let Some(signal) = controller.write().push_pending(turn) {
            schedule_scroll(signal, scroll_tick);
        }
        sending.set(true);
        spawn(async move {
            if let Err(e) = send_chat(&request).await {
                error!("Failed to send message: {}", e);
                controller.write().mark_undelivered(&request.id);
                connection.set(Connection::Offline(e.to_string()));
            }
            sending.set(false);
        });
    };

    let send_message = use_callback(move |_| {
        let text = input_text();
        input_text.set(String::new());
        submit(text);
    });

    let end_session = use_callback(move |_| {
        submit(END_SESSION_MESSAGE.to_string());
    });

    let onkeydown = use_callback(move |e: KeyboardEvent| {
        if e.key() == Key::Enter && !e.modifiers().shift() {
            e.prevent_default();
            send_message.call(());
        }
    });

    let feed = controller.read();
    let turns: Vec<(ChatTurn, bool)> = feed
        .state()
        .visible_turns()
        .map(|turn| (turn.clone(), feed.state().is_undelivered(&turn.id)))
        .collect();
    let responding = feed.state().responding();
    drop(feed);

    let (status_class, status_label) = match connection() {
        Connection::Connecting => ("status-dot status-dot--pending", "Connecting".to_string()),
        Connection::Live => ("status-dot", "Live".to_string()),
        Connection::Offline(reason) => ("status-dot status-dot--offline", reason),
    };

    rsx! {
        style { {CHAT_STYLES} }

        div {
            class: "chat-container",

            div {
                class: "chat-header",
                div {
                    class: "chat-title",
                    span { class: "chat-icon", "🏠" }
                    span { "Loan Assistant" }
                }
                div {
                    class: "chat-status",
                    span { class: status_class, "●" }
                    span { "{status_label}" }
                    button {
                        class: "end-session-button",
                        disabled: sending(),
                        onclick: move |_| end_session.call(()),
                        "End session"
                    }
                }
            }

            div {
                class: "messages-scroll-area",
                div {
                    class: "messages-list",
                    if turns.is_empty() {
                        div {
                            class: "empty-state",
                            div { class: "empty-icon", "💬" }
                            p { "Ask about a loan" }
                            span { "Rates, eligibility, documents or a pre-approval letter" }
                        }
                    } else {
                        for (turn, undelivered) in turns {
                            TurnBubbles { key: "{turn.id}", turn: turn.clone(), undelivered }
                        }
                    }
                    if responding {
                        LoadingIndicator {}
                    }
                    div { id: FEED_END_ID }
                }
            }

            div {
                class: "chat-input-area",
                div {
                    class: "input-wrapper",
                    textarea {
                        class: "chat-textarea",
                        placeholder: "Type a message...",
                        value: "{input_text}",
                        rows: "1",
                        oninput: move |e: FormEvent| input_text.set(e.value()),
                        onkeydown,
                    }
                    button {
                        class: "send-button",
                        disabled: sending() || input_text.read().trim().is_empty(),
                        onclick: move |_| send_message.call(()),
                        if sending() {
                            div { class: "spinner", span { "◐" } }
                        } else {
                            span { "➤" }
                        }
                    }
                }
                div {
                    class: "input-hint",
                    "Press Enter to send, Shift+Enter for new line"
                }
            }
        }
    }
}

async fn refresh_turns(
    user_id: String,
    mut controller: Signal<FeedController>,
    scroll_tick: Signal<u64>,
) {
    match fetch_turns(&user_id).await {
        Ok(turns) => {
            if let Some(signal) = controller.write().sync(turns) {
                schedule_scroll(signal, scroll_tick);
            }
        }
        Err(e) => warn!("Failed to refresh turns: {}", e),
    }
}

fn schedule_scroll(signal: ScrollSignal, mut scroll_tick: Signal<u64>) {
    match signal {
        ScrollSignal::Idle => {}
        ScrollSignal::Now => scroll_tick += 1,
        ScrollSignal::After(delay_ms) => {
            spawn(async move {
                TimeoutFuture::new(delay_ms).await;
                scroll_tick += 1;
            });
        }
    }
}

#[component]
pub fn TurnBubbles(turn: ChatTurn, undelivered: bool) -> Element {
    let documents = turn_documents(&turn);
    let human = turn.human_text().unwrap_or_default().to_string();
    let reply = turn.bot_reply().map(ToString::to_string);

    rsx! {
        div {
            class: "message-row user-row",
            div { class: "avatar user-avatar", "Y" }
            div {
                class: "message-content",
                div {
                    class: "message-header",
                    span { class: "sender-name", "You" }
                    span { class: "message-time", "{format_timestamp(turn.created_at)}" }
                    if undelivered {
                        span { class: "failed-badge", "Not delivered" }
                    }
                }
                div { class: "message-bubble user-bubble", "{human}" }
                if !documents.is_empty() {
                    AttachmentList { documents }
                }
            }
        }
        if let Some(reply) = reply {
            div {
                class: "message-row assistant-row",
                div { class: "avatar assistant-avatar", "A" }
                div {
                    class: "message-content",
                    div {
                        class: "message-header",
                        span { class: "sender-name", "Assistant" }
                    }
                    div { class: "message-bubble assistant-bubble", "{reply}" }
                }
            }
        }
    }
}

#[component]
pub fn AttachmentList(documents: Vec<Document>) -> Element {
    rsx! {
        div {
            class: "attachment-list",
            for document in documents {
                {attachment_view(document)}
            }
        }
    }
}

fn attachment_view(document: Document) -> Element {
    match AttachmentKind::classify(&document) {
        AttachmentKind::Pdf => rsx! {
            a {
                key: "{document.id}",
                class: "attachment attachment--pdf",
                href: "{document.image_url}",
                target: "_blank",
                rel: "noopener noreferrer",
                span { class: "attachment-icon", "📄" }
                span { "{document.title}" }
            }
        },
        AttachmentKind::Image => rsx! {
            a {
                key: "{document.id}",
                class: "attachment attachment--image",
                href: "{document.image_url}",
                target: "_blank",
                rel: "noopener noreferrer",
                img {
                    class: "attachment-thumb",
                    src: "{document.image_url}",
                    alt: "{document.title}",
                }
            }
        },
        AttachmentKind::Other => rsx! {
            span {
                key: "{document.id}",
                class: "attachment attachment--other",
                "{document.title}"
            }
        },
    }
}

#[component]
pub fn LoadingIndicator() -> Element {
    rsx! {
        div {
            class: "message-row assistant-row",
            div { class: "avatar assistant-avatar", "A" }
            div {
                class: "message-content",
                div {
                    class: "message-header",
                    span { class: "sender-name", "Assistant" }
                }
                div {
                    class: "typing-indicator",
                    span {}
                    span {}
                    span {}
                }
            }
        }
    }
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%H:%M").to_string()
}
