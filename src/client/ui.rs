use crate::client::app::App;
use crate::client::markdown;
use crate::models::chat::{ Message, Sender };
use ratatui::{
    layout::{ Alignment, Constraint, Direction, Layout, Rect },
    style::{ Color, Modifier, Style },
    text::{ Line, Span },
    widgets::{ Block, Borders, Paragraph, Wrap },
};
use std::time::Instant;

const ASSISTANT_NAME: &str = "Dost AI";
const DISCLAIMER: &str =
    "Dost AI may produce inaccurate information. Consider verifying important information.";
const PLACEHOLDER: &str = "Message Dost AI...";

pub fn ui(f: &mut ratatui::Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0), // Messages
            Constraint::Length(3), // Input
            Constraint::Length(1), // Footer
        ])
        .split(f.area());

    render_header(f, chunks[0]);
    render_messages(f, app, chunks[1]);
    render_input(f, app, chunks[2]);
    render_footer(f, app, chunks[3]);
}

fn render_header(f: &mut ratatui::Frame, area: Rect) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            ASSISTANT_NAME,
            Style::default().fg(Color::Indexed(61)).add_modifier(Modifier::BOLD)
        ),
        Span::styled("  ●", Style::default().fg(Color::Green)),
    ])).block(Block::default().borders(Borders::BOTTOM));
    f.render_widget(header, area);
}

fn render_messages(f: &mut ratatui::Frame, app: &mut App, area: Rect) {
    let lines = transcript_lines(app, Instant::now());
    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false });

    let total = u16::try_from(paragraph.line_count(area.width)).unwrap_or(u16::MAX);
    let max_offset = total.saturating_sub(area.height);
    if app.scroll.follow || app.scroll.offset >= max_offset {
        app.scroll.offset = max_offset;
        app.scroll.follow = true;
    }

    f.render_widget(paragraph.scroll((app.scroll.offset, 0)), area);
}

/// Every message in order, then the typing bubble while a reply is pending.
pub fn transcript_lines(app: &App, now: Instant) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for (index, message) in app.session.conversation().messages().iter().enumerate() {
        let selected = app.selected == Some(index);
        let copied = app.session.is_copied(message.id, now);
        lines.extend(message_lines(message, selected, copied));
        lines.push(Line::default());
    }

    if app.session.is_pending() {
        lines.push(Line::from(Span::styled(ASSISTANT_NAME, bot_name_style())));
        lines.push(Line::from(Span::styled(typing_dots(app.frame), Style::default().fg(Color::Gray))));
    }
    lines
}

fn message_lines(message: &Message, selected: bool, copied: bool) -> Vec<Line<'static>> {
    let (name, name_style, body_style, alignment) = match message.sender {
        Sender::User => (
            "You",
            Style::default().fg(Color::Indexed(105)).add_modifier(Modifier::BOLD),
            Style::default().fg(Color::White),
            Alignment::Right,
        ),
        Sender::Bot if message.is_error => (
            ASSISTANT_NAME,
            bot_name_style(),
            Style::default().fg(Color::Red),
            Alignment::Left,
        ),
        Sender::Bot => (
            ASSISTANT_NAME,
            bot_name_style(),
            Style::default().fg(Color::Gray),
            Alignment::Left,
        ),
    };

    let mut header = vec![
        Span::styled(name, name_style),
        Span::styled(format!(" · {}", message.formatted_time()), Style::default().fg(Color::DarkGray)),
    ];
    if copied {
        header.push(Span::styled(" ✓ copied", Style::default().fg(Color::Green)));
    } else if selected {
        header.push(Span::styled(" ⧉ ctrl+y", Style::default().fg(Color::DarkGray)));
    }
    if selected {
        header.insert(0, Span::styled("▶ ", Style::default().fg(Color::Yellow)));
    }

    let mut lines = vec![Line::from(header).alignment(alignment)];
    lines.extend(
        markdown::render(&message.text, body_style)
            .into_iter()
            .map(|line| line.alignment(alignment))
    );
    lines
}

fn bot_name_style() -> Style {
    Style::default().fg(Color::Indexed(61)).add_modifier(Modifier::BOLD)
}

fn typing_dots(frame: u64) -> String {
    match frame % 3 {
        0 => "●  ·  ·".to_string(),
        1 => "·  ●  ·".to_string(),
        _ => "·  ·  ●".to_string(),
    }
}

fn render_input(f: &mut ratatui::Frame, app: &App, area: Rect) {
    let enabled = app.session.input_enabled();
    let send_hint = if app.session.can_submit() {
        Span::styled(" Enter ➤ ", Style::default().fg(Color::White).bg(Color::Indexed(61)))
    } else {
        Span::styled(" Enter ➤ ", Style::default().fg(Color::DarkGray))
    };

    let (text, style) = if !enabled {
        ("Waiting for Dost AI...".to_string(), Style::default().fg(Color::DarkGray))
    } else if app.session.input.is_empty() {
        (PLACEHOLDER.to_string(), Style::default().fg(Color::DarkGray))
    } else {
        (app.session.input.clone(), Style::default().fg(Color::White))
    };

    let border_style = if enabled {
        Style::default().fg(Color::Indexed(61))
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let input = Paragraph::new(text)
        .style(style)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title_bottom(Line::from(send_hint).right_aligned())
        );
    f.render_widget(input, area);

    if enabled {
        let width = app.session.input.chars().count() as u16;
        f.set_cursor_position((area.x + width.min(area.width.saturating_sub(3)) + 1, area.y + 1));
    }
}

fn render_footer(f: &mut ratatui::Frame, app: &App, area: Rect) {
    let footer = match &app.status_message {
        Some(status) => Paragraph::new(status.as_str()).style(Style::default().fg(Color::Yellow)),
        None => Paragraph::new(DISCLAIMER).style(Style::default().fg(Color::DarkGray)),
    };
    f.render_widget(footer.alignment(Alignment::Center), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::clipboard::Clipboard;
    use crate::client::relay::{ Relay, RelayCallError };
    use crate::models::chat::GREETING;
    use async_trait::async_trait;
    use ratatui::{ backend::TestBackend, Terminal };
    use std::io;
    use std::sync::Arc;

    struct NoRelay;

    #[async_trait]
    impl Relay for NoRelay {
        async fn generate(&self, _prompt: &str) -> Result<String, RelayCallError> {
            Ok(String::new())
        }
    }

    struct NoClipboard;

    impl Clipboard for NoClipboard {
        fn copy(&mut self, _text: &str) -> io::Result<()> {
            Ok(())
        }
    }

    fn screen(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 20)).unwrap();
        terminal.draw(|f| ui(f, app)).unwrap();
        let buffer = terminal.backend().buffer();
        let width = buffer.area.width as usize;
        buffer
            .content()
            .chunks(width)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn plain(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn initial_screen_shows_greeting_and_placeholder() {
        let (mut app, _rx) = App::new(Arc::new(NoRelay), Box::new(NoClipboard));
        let text = screen(&mut app);
        assert!(text.contains(GREETING));
        assert!(text.contains(PLACEHOLDER));
        assert!(text.contains(DISCLAIMER));
    }

    #[test]
    fn typing_bubble_only_while_pending() {
        let (mut app, _rx) = App::new(Arc::new(NoRelay), Box::new(NoClipboard));
        let now = Instant::now();
        let idle = transcript_lines(&app, now);
        assert!(!idle.iter().any(|l| plain(l).contains('●')));

        app.session.input = "hi".into();
        app.session.submit().unwrap();
        let pending = transcript_lines(&app, now);
        assert!(pending.iter().any(|l| plain(l).contains('●')));
        // The typing bubble is drawn, not appended.
        assert_eq!(app.session.conversation().len(), 2);

        app.session.settle(Ok::<_, String>("hello".to_string()));
        let settled = transcript_lines(&app, now);
        assert!(!settled.iter().any(|l| plain(l).contains('●')));
    }

    #[test]
    fn user_messages_are_right_aligned() {
        let (mut app, _rx) = App::new(Arc::new(NoRelay), Box::new(NoClipboard));
        app.session.input = "question".into();
        app.session.submit().unwrap();
        let lines = transcript_lines(&app, Instant::now());
        let body = lines.iter().find(|l| plain(l) == "question").unwrap();
        assert_eq!(body.alignment, Some(Alignment::Right));
        let greeting = lines.iter().find(|l| plain(l) == GREETING).unwrap();
        assert_eq!(greeting.alignment, Some(Alignment::Left));
    }

    #[test]
    fn copied_marker_follows_indicator() {
        let (mut app, _rx) = App::new(Arc::new(NoRelay), Box::new(NoClipboard));
        let now = Instant::now();
        app.copy_selected(now);
        let lines = transcript_lines(&app, now);
        assert!(lines.iter().any(|l| plain(l).contains("copied")));

        let later = now + crate::client::session::COPIED_INDICATOR_DURATION;
        app.on_tick(later);
        let lines = transcript_lines(&app, later);
        assert!(!lines.iter().any(|l| plain(l).contains("copied")));
    }
}
