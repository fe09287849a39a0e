use std::collections::BTreeSet;

use shared_types::ChatTurn;

/// Delay before scrolling while a reply is still pending.
pub const FEED_SCROLL_DELAY_MS: u32 = 100;

/// What the scroll manager should do after a list update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScrollSignal {
    Idle,
    Now,
    After(u32),
}

/// Ordered chat turns for one user.
///
/// Turns are only ever inserted or completed, never removed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FeedState {
    turns: Vec<ChatTurn>,
    responding: bool,
    /// Locally submitted turns the backend never accepted.
    undelivered: BTreeSet<String>,
}

impl FeedState {
    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    /// Turns shown in the feed: those with a human utterance.
    pub fn visible_turns(&self) -> impl Iterator<Item = &ChatTurn> {
        self.turns.iter().filter(|turn| turn.human_text().is_some())
    }

    pub fn responding(&self) -> bool {
        self.responding
    }

    pub fn is_undelivered(&self, turn_id: &str) -> bool {
        self.undelivered.contains(turn_id)
    }

    /// Merge a re-fetched list and recompute the responding indicator.
    pub fn sync(&mut self, fetched: Vec<ChatTurn>) -> ScrollSignal {
        for turn in fetched {
            self.merge(turn);
        }
        self.sort();
        self.refresh_responding()
    }

    /// Insert or complete a single turn.
    pub fn upsert(&mut self, turn: ChatTurn) -> ScrollSignal {
        self.merge(turn);
        self.sort();
        self.refresh_responding()
    }

    /// Optimistically add a turn the user just submitted.
    pub fn push_pending(&mut self, turn: ChatTurn) -> ScrollSignal {
        self.upsert(turn)
    }

    /// The submit request for `turn_id` failed; it will get no reply.
    pub fn mark_undelivered(&mut self, turn_id: &str) -> ScrollSignal {
        if self.turns.iter().any(|turn| turn.id == turn_id) {
            self.undelivered.insert(turn_id.to_string());
        }
        self.refresh_responding()
    }

    fn merge(&mut self, incoming: ChatTurn) {
        // Anything echoed back by the backend was delivered after all.
        self.undelivered.remove(&incoming.id);
        let Some(existing) = self.turns.iter_mut().find(|turn| turn.id == incoming.id) else {
            self.turns.push(incoming);
            return;
        };

        let has_human = incoming.human_text().is_some();
        let has_bot = incoming.bot_reply().is_some();
        let has_payload = incoming
            .payload
            .as_deref()
            .is_some_and(|payload| !payload.trim().is_empty());

        if has_human {
            existing.human = incoming.human;
        }
        if has_bot {
            existing.bot = incoming.bot;
        }
        if has_payload {
            existing.payload = incoming.payload;
        }
    }

    fn sort(&mut self) {
        self.turns
            .sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
    }

    fn refresh_responding(&mut self) -> ScrollSignal {
        let Some(latest) = self.turns.last() else {
            self.responding = false;
            return ScrollSignal::Idle;
        };

        if latest.bot_reply().is_some() {
            self.responding = false;
            ScrollSignal::Now
        } else if latest.awaiting_reply() && !self.undelivered.contains(&latest.id) {
            self.responding = true;
            ScrollSignal::After(FEED_SCROLL_DELAY_MS)
        } else {
            self.responding = false;
            ScrollSignal::Idle
        }
    }
}
