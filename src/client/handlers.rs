use crate::client::app::App;
use crate::client::session::SubmitError;
use crossterm::event::{ KeyCode, KeyModifiers };
use std::time::Instant;

const PAGE: u16 = 10;

pub fn handle_key_event(app: &mut App, key: KeyCode, modifiers: KeyModifiers) {
    let ctrl = modifiers.contains(KeyModifiers::CONTROL);
    match key {
        KeyCode::Esc => {
            app.should_quit = true;
        }
        KeyCode::Char('c') if ctrl => {
            app.should_quit = true;
        }
        KeyCode::Char('y') if ctrl => {
            app.copy_selected(Instant::now());
        }
        KeyCode::Enter => {
            app.status_message = None;
            match app.submit() {
                Ok(()) | Err(SubmitError::EmptyPrompt) => {}
                Err(SubmitError::RequestInFlight) => {
                    app.status_message = Some("Still waiting for the last reply.".to_string());
                }
            }
        }
        KeyCode::Char(c) if !ctrl => {
            // Clear status message when typing
            if app.status_message.is_some() {
                app.status_message = None;
            }
            app.session.push_input(c);
        }
        KeyCode::Backspace => {
            app.session.pop_input();
        }
        KeyCode::Up => app.select_previous(),
        KeyCode::Down => app.select_next(),
        KeyCode::PageUp => app.scroll_up(PAGE),
        KeyCode::PageDown => app.scroll_down(PAGE),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::clipboard::Clipboard;
    use crate::client::relay::{ Relay, RelayCallError };
    use async_trait::async_trait;
    use std::io;
    use std::sync::Arc;

    struct SlowRelay;

    #[async_trait]
    impl Relay for SlowRelay {
        async fn generate(&self, _prompt: &str) -> Result<String, RelayCallError> {
            futures::future::pending().await
        }
    }

    struct NoClipboard;

    impl Clipboard for NoClipboard {
        fn copy(&mut self, _text: &str) -> io::Result<()> {
            Ok(())
        }
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            handle_key_event(app, KeyCode::Char(c), KeyModifiers::NONE);
        }
    }

    #[tokio::test]
    async fn enter_submits_typed_prompt() {
        let (mut app, _rx) = App::new(Arc::new(SlowRelay), Box::new(NoClipboard));
        type_text(&mut app, "hey");
        handle_key_event(&mut app, KeyCode::Enter, KeyModifiers::NONE);

        assert!(app.session.is_pending());
        assert_eq!(app.session.conversation().last().unwrap().text, "hey");
        assert!(app.session.input.is_empty());
    }

    #[tokio::test]
    async fn second_enter_while_pending_only_sets_status() {
        let (mut app, _rx) = App::new(Arc::new(SlowRelay), Box::new(NoClipboard));
        type_text(&mut app, "one");
        handle_key_event(&mut app, KeyCode::Enter, KeyModifiers::NONE);
        app.session.input = "two".into();
        handle_key_event(&mut app, KeyCode::Enter, KeyModifiers::NONE);

        assert_eq!(app.session.conversation().len(), 2);
        assert!(app.status_message.is_some());
    }

    #[test]
    fn enter_on_blank_input_does_nothing() {
        let (mut app, _rx) = App::new(Arc::new(SlowRelay), Box::new(NoClipboard));
        type_text(&mut app, "   ");
        handle_key_event(&mut app, KeyCode::Enter, KeyModifiers::NONE);
        assert!(!app.session.is_pending());
        assert_eq!(app.session.conversation().len(), 1);
        assert!(app.status_message.is_none());
    }

    #[test]
    fn ctrl_c_quits_without_typing() {
        let (mut app, _rx) = App::new(Arc::new(SlowRelay), Box::new(NoClipboard));
        handle_key_event(&mut app, KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(app.should_quit);
        assert!(app.session.input.is_empty());
    }
}
