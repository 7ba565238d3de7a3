use log::{ error, info };
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;

use super::clipboard::Clipboard;
use super::relay::{ Relay, RelayCallError };
use super::session::{ ChatSession, SubmitError };

pub type RelayOutcome = Result<String, RelayCallError>;
pub type OutcomeReceiver = mpsc::UnboundedReceiver<RelayOutcome>;

/// Where the transcript is scrolled to. `follow` pins the view to the newest
/// message and is switched back on by every conversation change.
#[derive(Debug, Clone, Default)]
pub struct ScrollState {
    pub offset: u16,
    pub follow: bool,
    seen_revision: u64,
}

pub struct App {
    pub session: ChatSession,
    relay: Arc<dyn Relay>,
    clipboard: Box<dyn Clipboard>,
    outcome_tx: mpsc::UnboundedSender<RelayOutcome>,

    pub selected: Option<usize>,
    pub scroll: ScrollState,
    pub status_message: Option<String>,
    pub frame: u64,
    pub should_quit: bool,
}

impl App {
    /// Relay replies arrive on the returned receiver; feed each one back
    /// through [`App::apply_outcome`].
    pub fn new(relay: Arc<dyn Relay>, clipboard: Box<dyn Clipboard>) -> (Self, OutcomeReceiver) {
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();
        let app = Self {
            session: ChatSession::new(),
            relay,
            clipboard,
            outcome_tx,
            selected: None,
            scroll: ScrollState { follow: true, ..ScrollState::default() },
            status_message: None,
            frame: 0,
            should_quit: false,
        };
        (app, outcome_rx)
    }

    pub fn submit(&mut self) -> Result<(), SubmitError> {
        let prompt = self.session.submit()?;
        self.selected = None;
        self.follow_latest();

        let relay = Arc::clone(&self.relay);
        let tx = self.outcome_tx.clone();
        tokio::spawn(async move {
            let outcome = relay.generate(&prompt).await;
            if tx.send(outcome).is_err() {
                error!("Chat loop stopped before the relay answered");
            }
        });
        Ok(())
    }

    pub fn apply_outcome(&mut self, outcome: RelayOutcome) {
        if self.session.settle(outcome) {
            self.follow_latest();
        }
    }

    pub fn select_previous(&mut self) {
        let len = self.session.conversation().len();
        self.selected = match self.selected {
            _ if len == 0 => None,
            None => Some(len - 1),
            Some(i) => Some(i.saturating_sub(1)),
        };
    }

    pub fn select_next(&mut self) {
        let len = self.session.conversation().len();
        self.selected = match self.selected {
            Some(i) if i + 1 < len => Some(i + 1),
            _ => None,
        };
    }

    /// Copies the selected message, or the newest one when nothing is selected.
    pub fn copy_selected(&mut self, now: Instant) {
        let conversation = self.session.conversation();
        let message = match self.selected {
            Some(i) => conversation.get(i),
            None => conversation.last(),
        };
        let Some(message) = message else {
            return;
        };
        let (id, text) = (message.id, message.text.clone());

        match self.clipboard.copy(&text) {
            Ok(()) => {
                info!("Copied message {} to clipboard", id);
                self.session.mark_copied(id, now);
            }
            Err(e) => {
                error!("Clipboard write failed: {}", e);
                self.status_message = Some(format!("Copy failed: {}", e));
            }
        }
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.scroll.follow = false;
        self.scroll.offset = self.scroll.offset.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.scroll.offset = self.scroll.offset.saturating_add(lines);
    }

    pub fn on_tick(&mut self, now: Instant) {
        self.frame = self.frame.wrapping_add(1);
        self.session.expire_copied(now);
    }

    fn follow_latest(&mut self) {
        if self.scroll.seen_revision != self.session.revision() {
            self.scroll.seen_revision = self.session.revision();
            self.scroll.follow = true;
        }
    }
}
