//! Markdown to styled terminal lines.
//!
//! Covers the block and inline elements model replies actually use. Soft
//! line breaks become real line breaks so the text keeps its own layout.

use pulldown_cmark::{ CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd };
use ratatui::style::{ Color, Modifier, Style };
use ratatui::text::{ Line, Span };

pub fn render(text: &str, base: Style) -> Vec<Line<'static>> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let mut writer = LineWriter::new(base);
    for event in Parser::new_ext(text, options) {
        writer.handle(event);
    }
    writer.finish()
}

struct LineWriter {
    base: Style,
    lines: Vec<Line<'static>>,
    current: Vec<Span<'static>>,
    styles: Vec<Style>,
    lists: Vec<Option<u64>>,
    quote_depth: usize,
    in_code_block: bool,
    pending_gap: bool,
}

impl LineWriter {
    fn new(base: Style) -> Self {
        Self {
            base,
            lines: Vec::new(),
            current: Vec::new(),
            styles: Vec::new(),
            lists: Vec::new(),
            quote_depth: 0,
            in_code_block: false,
            pending_gap: false,
        }
    }

    fn handle(&mut self, event: Event<'_>) {
        match event {
            Event::Start(Tag::Paragraph) => {}
            Event::End(TagEnd::Paragraph) => self.end_block(),
            Event::Start(Tag::Heading { level, .. }) => {
                let style = match level {
                    HeadingLevel::H1 => Style::new().add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
                    _ => Style::new().add_modifier(Modifier::BOLD),
                };
                self.styles.push(style);
            }
            Event::End(TagEnd::Heading(_)) => {
                self.styles.pop();
                self.end_block();
            }
            Event::Start(Tag::BlockQuote(_)) => {
                self.flush();
                self.quote_depth += 1;
                self.styles.push(Style::new().add_modifier(Modifier::ITALIC));
            }
            Event::End(TagEnd::BlockQuote(_)) => {
                self.styles.pop();
                self.quote_depth = self.quote_depth.saturating_sub(1);
                self.end_block();
            }
            Event::Start(Tag::CodeBlock(kind)) => {
                self.flush();
                self.in_code_block = true;
                if let CodeBlockKind::Fenced(lang) = kind {
                    if !lang.is_empty() {
                        self.push_span(Span::styled(format!("[{}]", lang), self.style().fg(Color::DarkGray)));
                        self.flush();
                    }
                }
            }
            Event::End(TagEnd::CodeBlock) => {
                self.in_code_block = false;
                self.end_block();
            }
            Event::Start(Tag::List(start)) => {
                self.flush();
                self.lists.push(start);
            }
            Event::End(TagEnd::List(_)) => {
                self.lists.pop();
                if self.lists.is_empty() {
                    self.end_block();
                }
            }
            Event::Start(Tag::Item) => {
                self.flush();
                let depth = self.lists.len().saturating_sub(1);
                let marker = match self.lists.last_mut() {
                    Some(Some(n)) => {
                        let marker = format!("{}. ", n);
                        *n += 1;
                        marker
                    }
                    _ => "• ".to_string(),
                };
                self.push_span(Span::styled(format!("{}{}", "  ".repeat(depth), marker), self.style()));
            }
            Event::End(TagEnd::Item) => self.flush(),
            Event::Start(Tag::Emphasis) => self.styles.push(Style::new().add_modifier(Modifier::ITALIC)),
            Event::Start(Tag::Strong) => self.styles.push(Style::new().add_modifier(Modifier::BOLD)),
            Event::Start(Tag::Strikethrough) => self.styles.push(Style::new().add_modifier(Modifier::CROSSED_OUT)),
            Event::Start(Tag::Link { .. }) => self.styles.push(Style::new().add_modifier(Modifier::UNDERLINED)),
            Event::End(TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough | TagEnd::Link) => {
                self.styles.pop();
            }
            Event::Text(text) => {
                if self.in_code_block {
                    self.code_text(&text);
                } else {
                    self.text(&text);
                }
            }
            Event::Code(code) => {
                let style = self.style().fg(Color::Yellow);
                self.push_span(Span::styled(code.to_string(), style));
            }
            Event::Html(html) | Event::InlineHtml(html) => self.text(&html),
            Event::SoftBreak | Event::HardBreak => self.flush(),
            Event::Rule => {
                self.flush();
                self.push_span(Span::styled("────────".to_string(), self.style().fg(Color::DarkGray)));
                self.end_block();
            }
            Event::TaskListMarker(checked) => {
                let marker = if checked { "[x] " } else { "[ ] " };
                self.push_span(Span::styled(marker.to_string(), self.style()));
            }
            _ => {}
        }
    }

    fn style(&self) -> Style {
        self.styles.iter().fold(self.base, |acc, s| acc.patch(*s))
    }

    fn text(&mut self, text: &str) {
        let mut pieces = text.split('\n').peekable();
        while let Some(piece) = pieces.next() {
            if !piece.is_empty() {
                self.push_span(Span::styled(piece.to_string(), self.style()));
            }
            if pieces.peek().is_some() {
                self.flush();
            }
        }
    }

    fn code_text(&mut self, text: &str) {
        let style = self.style().fg(Color::Yellow);
        let body = text.strip_suffix('\n').unwrap_or(text);
        for line in body.split('\n') {
            self.push_span(Span::styled(format!("  {}", line), style));
            self.flush();
        }
    }

    fn push_span(&mut self, span: Span<'static>) {
        if self.current.is_empty() {
            if self.pending_gap && !self.lines.is_empty() {
                self.lines.push(Line::default());
            }
            self.pending_gap = false;
            if self.quote_depth > 0 {
                self.current.push(Span::styled("│ ".repeat(self.quote_depth), self.base.fg(Color::DarkGray)));
            }
        }
        self.current.push(span);
    }

    fn flush(&mut self) {
        if !self.current.is_empty() {
            self.lines.push(Line::from(std::mem::take(&mut self.current)));
        }
    }

    fn end_block(&mut self) {
        self.flush();
        self.pending_gap = true;
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        self.flush();
        self.lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(lines: &[Line<'_>]) -> Vec<String> {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn plain_text_is_unchanged() {
        let lines = render("4", Style::default());
        assert_eq!(plain(&lines), vec!["4"]);
    }

    #[test]
    fn paragraphs_are_separated_by_blank_line() {
        let lines = render("first\n\nsecond", Style::default());
        assert_eq!(plain(&lines), vec!["first", "", "second"]);
    }

    #[test]
    fn soft_breaks_stay_line_breaks() {
        let lines = render("one\ntwo\nthree", Style::default());
        assert_eq!(plain(&lines), vec!["one", "two", "three"]);
    }

    #[test]
    fn strong_text_is_bold() {
        let lines = render("a **b** c", Style::default());
        assert_eq!(plain(&lines), vec!["a b c"]);
        let bold = lines[0].spans.iter().find(|s| s.content == "b").unwrap();
        assert!(bold.style.add_modifier.contains(Modifier::BOLD));
        let normal = lines[0].spans.iter().find(|s| s.content == "a ").unwrap();
        assert!(!normal.style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn lists_get_markers() {
        let bullets = render("- apples\n- pears", Style::default());
        assert_eq!(plain(&bullets), vec!["• apples", "• pears"]);
        let numbered = render("1. one\n2. two", Style::default());
        assert_eq!(plain(&numbered), vec!["1. one", "2. two"]);
    }

    #[test]
    fn code_blocks_keep_indentation() {
        let lines = render("```rust\nfn main() {\n    x();\n}\n```", Style::default());
        assert_eq!(
            plain(&lines),
            vec!["[rust]", "  fn main() {", "      x();", "  }"]
        );
    }

    #[test]
    fn block_quotes_are_prefixed() {
        let lines = render("> quoted", Style::default());
        assert_eq!(plain(&lines), vec!["│ quoted"]);
    }

    #[test]
    fn no_trailing_blank_line() {
        let lines = render("# Title\n\nbody\n", Style::default());
        assert_eq!(plain(&lines), vec!["Title", "", "body"]);
    }
}
