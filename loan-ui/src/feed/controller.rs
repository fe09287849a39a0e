use std::cell::Cell;
use std::rc::Rc;

use chrono::{DateTime, Utc};
use dioxus_logger::tracing::{debug, error, warn};
use shared_types::{ChatTurn, SubscriptionMessage};

use crate::bridge::{classify, BridgeSettings};
use crate::feed::state::{FeedState, ScrollSignal};
use crate::flow::state::FlowCommand;

/// Shared flag that goes false once the owning subscription is torn down.
#[derive(Clone, Debug)]
pub struct Liveness(Rc<Cell<bool>>);

impl Liveness {
    pub fn new() -> Self {
        Self(Rc::new(Cell::new(true)))
    }

    pub fn is_live(&self) -> bool {
        self.0.get()
    }

    pub fn close(&self) {
        self.0.set(false);
    }
}

impl Default for Liveness {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of routing one delivered turn.
#[derive(Clone, Debug, PartialEq)]
pub struct EventRoute {
    pub commands: Vec<FlowCommand>,
    pub accepted: bool,
}

/// Decode a turn's payload and classify its trace.
///
/// A malformed payload is logged and the whole event rejected.
pub fn route_event(turn: &ChatTurn, settings: &BridgeSettings, now: DateTime<Utc>) -> EventRoute {
    let payload = match turn.parse_payload() {
        Ok(payload) => payload,
        Err(e) => {
            warn!("Dropping chat event: {}", e);
            return EventRoute {
                commands: Vec::new(),
                accepted: false,
            };
        }
    };

    let trace = payload.as_ref().and_then(|payload| payload.trace.as_ref());
    let commands = if trace.is_some() || turn.bot_reply().is_some() {
        classify(trace, turn, settings, now)
    } else {
        Vec::new()
    };

    EventRoute {
        commands,
        accepted: true,
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Delivery {
    Applied {
        commands: Vec<FlowCommand>,
        scroll: ScrollSignal,
    },
    Dropped,
    Ignored,
    Connected,
    Failed(String),
}

/// Feed state for one mount and one user, gated by a [`Liveness`] token.
pub struct FeedController {
    state: FeedState,
    settings: BridgeSettings,
    liveness: Liveness,
}

impl FeedController {
    pub fn new(settings: BridgeSettings) -> Self {
        Self {
            state: FeedState::default(),
            settings,
            liveness: Liveness::new(),
        }
    }

    pub fn state(&self) -> &FeedState {
        &self.state
    }

    pub fn liveness(&self) -> Liveness {
        self.liveness.clone()
    }

    pub fn is_live(&self) -> bool {
        self.liveness.is_live()
    }

    pub fn teardown(&mut self) {
        self.liveness.close();
    }

    pub fn deliver_raw(&mut self, raw: &str, now: DateTime<Utc>) -> Delivery {
        if !self.is_live() {
            return Delivery::Ignored;
        }
        match serde_json::from_str::<SubscriptionMessage>(raw) {
            Ok(message) => self.deliver(message, now),
            Err(e) => {
                warn!("Dropping unreadable subscription message: {}", e);
                Delivery::Dropped
            }
        }
    }

    pub fn deliver(&mut self, message: SubscriptionMessage, now: DateTime<Utc>) -> Delivery {
        if !self.is_live() {
            debug!("Subscription torn down; ignoring message");
            return Delivery::Ignored;
        }

        match message {
            SubscriptionMessage::Connected => Delivery::Connected,
            SubscriptionMessage::Error { message } => {
                error!("Chat subscription error: {}", message);
                Delivery::Failed(message)
            }
            SubscriptionMessage::Chat { chat } => {
                let route = route_event(&chat, &self.settings, now);
                if !route.accepted {
                    return Delivery::Dropped;
                }
                let scroll = self.state.upsert(chat);
                Delivery::Applied {
                    commands: route.commands,
                    scroll,
                }
            }
        }
    }

    /// Merge a re-fetched list. `None` once torn down.
    pub fn sync(&mut self, fetched: Vec<ChatTurn>) -> Option<ScrollSignal> {
        if !self.is_live() {
            return None;
        }
        Some(self.state.sync(fetched))
    }

    pub fn push_pending(&mut self, turn: ChatTurn) -> Option<ScrollSignal> {
        if !self.is_live() {
            return None;
        }
        Some(self.state.push_pending(turn))
    }

    pub fn mark_undelivered(&mut self, turn_id: &str) -> Option<ScrollSignal> {
        if !self.is_live() {
            return None;
        }
        Some(self.state.mark_undelivered(turn_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::graph::NodeId;

    fn chat(id: &str, bot: Option<&str>, payload: Option<&str>) -> ChatTurn {
        ChatTurn {
            id: id.to_string(),
            user_id: "user-1".to_string(),
            human: Some("What rate can I get?".to_string()),
            bot: bot.map(ToString::to_string),
            payload: payload.map(ToString::to_string),
            created_at: Utc::now(),
        }
    }

    fn message(turn: ChatTurn) -> SubscriptionMessage {
        SubscriptionMessage::Chat { chat: turn }
    }

    const INPUT_TRACE: &str = r#"{"trace": {"type": "trace", "content": {"action": "modelInvocationInput", "text": "rate question"}}}"#;

    #[test]
    fn trace_event_yields_commands_and_upserts() {
        let mut controller = FeedController::new(BridgeSettings::default());
        let delivery = controller.deliver(message(chat("a", None, Some(INPUT_TRACE))), Utc::now());

        let Delivery::Applied { commands, scroll } = delivery else {
            panic!("expected applied delivery");
        };
        assert!(!commands.is_empty());
        assert_eq!(scroll, ScrollSignal::After(crate::feed::state::FEED_SCROLL_DELAY_MS));
        assert_eq!(controller.state().visible_turns().count(), 1);
        assert!(controller.state().responding());
    }

    #[test]
    fn reply_without_trace_still_routes() {
        let route = route_event(
            &chat("a", Some("Approved"), None),
            &BridgeSettings::default(),
            Utc::now(),
        );
        assert!(route.accepted);
        assert!(route.commands.iter().any(|command| matches!(
            command,
            FlowCommand::AddNodeTrace {
                node: NodeId::Response,
                ..
            }
        )));
    }

    #[test]
    fn event_without_trace_or_reply_has_no_commands() {
        let route = route_event(
            &chat("a", None, Some(r#"{"documents": []}"#)),
            &BridgeSettings::default(),
            Utc::now(),
        );
        assert!(route.accepted);
        assert!(route.commands.is_empty());
    }

    #[test]
    fn malformed_payload_leaves_state_unchanged() {
        let mut controller = FeedController::new(BridgeSettings::default());
        controller.deliver(message(chat("a", Some("Hello"), None)), Utc::now());
        let before = controller.state().clone();

        let delivery =
            controller.deliver(message(chat("b", Some("Hi"), Some("{not json"))), Utc::now());
        assert_eq!(delivery, Delivery::Dropped);
        assert_eq!(controller.state(), &before);

        // Later events still flow.
        let delivery = controller.deliver(message(chat("c", None, None)), Utc::now());
        assert!(matches!(delivery, Delivery::Applied { .. }));
        assert_eq!(controller.state().turns().len(), 2);
    }

    #[test]
    fn unreadable_message_is_dropped() {
        let mut controller = FeedController::new(BridgeSettings::default());
        assert_eq!(controller.deliver_raw("{not json", Utc::now()), Delivery::Dropped);
        assert!(controller.state().turns().is_empty());
    }

    #[test]
    fn raw_message_is_decoded() {
        let mut controller = FeedController::new(BridgeSettings::default());
        let raw = r#"{"type": "chat", "chat": {"id": "t1", "userID": "u1", "human": "hi", "createdAt": "2025-01-10T09:30:00Z"}}"#;
        assert!(matches!(
            controller.deliver_raw(raw, Utc::now()),
            Delivery::Applied { .. }
        ));
        assert_eq!(
            controller.deliver_raw(r#"{"type": "connected"}"#, Utc::now()),
            Delivery::Connected
        );
    }

    #[test]
    fn no_writes_after_teardown() {
        let mut controller = FeedController::new(BridgeSettings::default());
        controller.deliver(message(chat("a", None, None)), Utc::now());
        let before = controller.state().clone();

        let token = controller.liveness();
        token.close();
        assert!(!controller.is_live());

        assert_eq!(
            controller.deliver(message(chat("b", Some("late"), None)), Utc::now()),
            Delivery::Ignored
        );
        assert_eq!(controller.sync(vec![chat("c", None, None)]), None);
        assert_eq!(controller.push_pending(chat("d", None, None)), None);
        assert_eq!(controller.mark_undelivered("a"), None);
        assert_eq!(controller.state(), &before);
    }

    #[test]
    fn failed_send_clears_typing_indicator() {
        let mut controller = FeedController::new(BridgeSettings::default());
        let pending = ChatTurn::new("user-1", "Can I refinance?");
        let id = pending.id.clone();
        controller.push_pending(pending);
        assert!(controller.state().responding());

        assert_eq!(controller.mark_undelivered(&id), Some(ScrollSignal::Idle));
        assert!(!controller.state().responding());
        assert!(controller.state().is_undelivered(&id));
    }

    #[test]
    fn transport_errors_are_reported() {
        let mut controller = FeedController::new(BridgeSettings::default());
        let delivery = controller.deliver(
            SubscriptionMessage::Error {
                message: "socket closed".to_string(),
            },
            Utc::now(),
        );
        assert_eq!(delivery, Delivery::Failed("socket closed".to_string()));
    }
}
