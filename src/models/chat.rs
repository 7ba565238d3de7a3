use chrono::{ DateTime, Local };
use serde::{ Deserialize, Serialize };

pub const GREETING: &str = "Hello, and welcome to Dost AI! How can I help you today?";
pub const GREETING_ID: i64 = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub text: String,
    pub sender: Sender,
    pub timestamp: DateTime<Local>,
    /// Set on the bubble shown when a relay call fails.
    #[serde(default)]
    pub is_error: bool,
}

impl Message {
    pub fn new(id: i64, text: impl Into<String>, sender: Sender) -> Self {
        Self {
            id,
            text: text.into(),
            sender,
            timestamp: Local::now(),
            is_error: false,
        }
    }

    pub fn error(id: i64, text: impl Into<String>) -> Self {
        Self {
            is_error: true,
            ..Self::new(id, text, Sender::Bot)
        }
    }

    /// Localized hour:minute, e.g. `14:05`.
    pub fn formatted_time(&self) -> String {
        self.timestamp.format("%H:%M").to_string()
    }
}

/// Hands out message ids from the wall clock in milliseconds, bumped past the
/// previous id so two messages created in the same millisecond never collide.
#[derive(Clone, Debug)]
pub struct MessageIdClock {
    last: i64,
}

impl MessageIdClock {
    pub fn starting_after(last: i64) -> Self {
        Self { last }
    }

    pub fn next_id(&mut self) -> i64 {
        self.next_id_at(Local::now().timestamp_millis())
    }

    pub fn next_id_at(&mut self, now_millis: i64) -> i64 {
        self.last = now_millis.max(self.last + 1);
        self.last
    }
}

/// Ordered message history. Insertion order is display order.
#[derive(Clone, Debug, PartialEq)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn empty() -> Self {
        Self { messages: Vec::new() }
    }

    /// A fresh conversation holding only the bot greeting.
    pub fn seeded() -> Self {
        Self::empty().appended(Message::new(GREETING_ID, GREETING, Sender::Bot))
    }

    pub fn appended(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn get(&self, index: usize) -> Option<&Message> {
        self.messages.get(index)
    }

    pub fn last_id(&self) -> i64 {
        self.messages.iter().map(|m| m.id).max().unwrap_or(0)
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::seeded()
    }
}
