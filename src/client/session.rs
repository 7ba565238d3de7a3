use log::{ debug, warn };
use std::collections::HashMap;
use std::fmt::Display;
use std::time::{ Duration, Instant };
use thiserror::Error;

use crate::models::chat::{ Conversation, Message, MessageIdClock, Sender };

/// How long the "copied" mark stays on a message.
pub const COPIED_INDICATOR_DURATION: Duration = Duration::from_secs(2);

pub const FAILURE_TEXT: &str = "Sorry, I couldn't get a reply from Dost AI. Please try again.";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubmitError {
    #[error("prompt is empty")]
    EmptyPrompt,

    #[error("a request is already in flight")]
    RequestInFlight,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Pending { prompt: String },
}

/// Everything the chat view shows, owned in one place.
///
/// A relay round trip is two explicit steps: [`ChatSession::submit`] moves
/// `Idle -> Pending` and hands back the prompt to send, and
/// [`ChatSession::settle`] moves `Pending -> Idle` with either the reply or an
/// error bubble. Submitting while pending is rejected.
#[derive(Debug, Clone)]
pub struct ChatSession {
    conversation: Conversation,
    pub input: String,
    phase: Phase,
    ids: MessageIdClock,
    copied: HashMap<i64, Instant>,
    revision: u64,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatSession {
    pub fn new() -> Self {
        Self::with_conversation(Conversation::seeded())
    }

    pub fn with_conversation(conversation: Conversation) -> Self {
        let ids = MessageIdClock::starting_after(conversation.last_id());
        Self {
            conversation,
            input: String::new(),
            phase: Phase::Idle,
            ids,
            copied: HashMap::new(),
            revision: 0,
        }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.phase, Phase::Pending { .. })
    }

    pub fn input_enabled(&self) -> bool {
        !self.is_pending()
    }

    pub fn can_submit(&self) -> bool {
        self.input_enabled() && !self.input.trim().is_empty()
    }

    /// Bumped on every conversation change; the view follows the latest
    /// message whenever it moves.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn push_input(&mut self, c: char) {
        if self.input_enabled() {
            self.input.push(c);
        }
    }

    pub fn pop_input(&mut self) {
        if self.input_enabled() {
            self.input.pop();
        }
    }

    /// Appends the user message right away and returns the prompt to relay.
    pub fn submit(&mut self) -> Result<String, SubmitError> {
        if self.input.trim().is_empty() {
            return Err(SubmitError::EmptyPrompt);
        }
        if self.is_pending() {
            return Err(SubmitError::RequestInFlight);
        }

        let prompt = std::mem::take(&mut self.input);
        let id = self.ids.next_id();
        self.append(Message::new(id, prompt.clone(), Sender::User));
        self.phase = Phase::Pending { prompt: prompt.clone() };
        debug!("Submitted message {} ({} chars)", id, prompt.len());
        Ok(prompt)
    }

    /// Applies the relay outcome. Returns false if nothing was pending.
    pub fn settle<E: Display>(&mut self, outcome: Result<String, E>) -> bool {
        if !self.is_pending() {
            warn!("Ignoring relay outcome with no request pending");
            return false;
        }

        let id = self.ids.next_id();
        let message = match outcome {
            Ok(text) => Message::new(id, text, Sender::Bot),
            Err(e) => {
                warn!("Relay call failed: {}", e);
                Message::error(id, FAILURE_TEXT)
            }
        };
        self.append(message);
        self.phase = Phase::Idle;
        true
    }

    pub fn mark_copied(&mut self, id: i64, now: Instant) {
        self.copied.insert(id, now + COPIED_INDICATOR_DURATION);
    }

    pub fn is_copied(&self, id: i64, now: Instant) -> bool {
        self.copied.get(&id).is_some_and(|expires| now < *expires)
    }

    /// Drops expired copy marks. Returns true if any were removed.
    pub fn expire_copied(&mut self, now: Instant) -> bool {
        let before = self.copied.len();
        self.copied.retain(|_, expires| now < *expires);
        before != self.copied.len()
    }

    fn append(&mut self, message: Message) {
        let conversation = std::mem::replace(&mut self.conversation, Conversation::empty());
        self.conversation = conversation.appended(message);
        self.revision += 1;
    }
}
