//! Draws review Markdown as styled terminal lines for the rendered view.

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Parser, Tag, TagEnd};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

use super::highlight::Highlighter;
use super::styles;
use crate::review::render::markdown_options;

/// Keeps the last conversion so redraws skip re-parsing and re-highlighting
pub struct MarkdownCache {
    hl: Highlighter,
    source: String,
    lines: Vec<Line<'static>>,
}

impl MarkdownCache {
    pub fn new() -> Self {
        Self {
            hl: Highlighter::new(),
            source: String::new(),
            lines: Vec::new(),
        }
    }

    pub fn lines(&mut self, markdown: &str) -> &[Line<'static>] {
        if self.source != markdown || (self.lines.is_empty() && !markdown.is_empty()) {
            self.lines = to_lines(markdown, &self.hl);
            self.source = markdown.to_string();
        }
        &self.lines
    }
}

/// Convert Markdown into lines ready for a `Paragraph`
pub fn to_lines(markdown: &str, hl: &Highlighter) -> Vec<Line<'static>> {
    let mut b = LineBuilder::new(hl);
    for event in Parser::new_ext(markdown, markdown_options()) {
        b.event(event);
    }
    b.finish()
}

struct LineBuilder<'h> {
    hl: &'h Highlighter,
    lines: Vec<Line<'static>>,
    current: Vec<Span<'static>>,
    style_stack: Vec<Style>,
    /// `None` = bullet list, `Some(n)` = next number of an ordered list
    list_stack: Vec<Option<u64>>,
    quote_depth: usize,
    /// Language token and accumulated source of the open code block
    code: Option<(Option<String>, String)>,
    link_dest: Option<String>,
}

impl<'h> LineBuilder<'h> {
    fn new(hl: &'h Highlighter) -> Self {
        Self {
            hl,
            lines: Vec::new(),
            current: Vec::new(),
            style_stack: vec![Style::default().fg(styles::TEXT)],
            list_stack: Vec::new(),
            quote_depth: 0,
            code: None,
            link_dest: None,
        }
    }

    fn style(&self) -> Style {
        self.style_stack
            .iter()
            .fold(Style::default(), |acc, s| acc.patch(*s))
    }

    fn push_style(&mut self, style: Style) {
        self.style_stack.push(style);
    }

    fn pop_style(&mut self) {
        if self.style_stack.len() > 1 {
            self.style_stack.pop();
        }
    }

    fn push_span(&mut self, text: impl Into<String>, style: Style) {
        self.current.push(Span::styled(text.into(), style));
    }

    /// Finish the line in progress, prefixing block quote bars
    fn flush(&mut self) {
        if self.current.is_empty() {
            return;
        }
        let mut spans = self.quote_prefix();
        spans.append(&mut self.current);
        self.lines.push(Line::from(spans));
    }

    fn quote_prefix(&self) -> Vec<Span<'static>> {
        (0..self.quote_depth)
            .map(|_| Span::styled("│ ", Style::default().fg(styles::PURPLE)))
            .collect()
    }

    /// Separate blocks with one empty line
    fn blank(&mut self) {
        self.flush();
        if self.lines.last().is_some_and(|l| l.width() > 0) {
            self.lines.push(Line::default());
        }
    }

    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => {
                if let Some((_, buf)) = self.code.as_mut() {
                    buf.push_str(&text);
                } else {
                    let style = self.style();
                    self.push_span(text.to_string(), style);
                }
            }
            Event::Code(code) => self.push_span(code.to_string(), styles::inline_code_style()),
            // Raw HTML is shown as the literal source, never interpreted
            Event::Html(raw) | Event::InlineHtml(raw) => {
                let style = self.style();
                for (i, part) in raw.trim_end_matches('\n').split('\n').enumerate() {
                    if i > 0 {
                        self.flush();
                    }
                    self.push_span(part.to_string(), style);
                }
            }
            Event::SoftBreak => {
                let style = self.style();
                self.push_span(" ", style);
            }
            Event::HardBreak => self.flush(),
            Event::Rule => {
                self.blank();
                self.push_span("─".repeat(40), Style::default().fg(styles::BORDER));
                self.flush();
            }
            Event::TaskListMarker(done) => {
                let (mark, color) = if done { ("[x] ", styles::GREEN) } else { ("[ ] ", styles::DIM) };
                self.push_span(mark, Style::default().fg(color));
            }
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {
                if self.list_stack.is_empty() {
                    self.blank();
                }
            }
            Tag::Heading { level, .. } => {
                self.blank();
                self.push_style(styles::heading_style(heading_level(level)));
            }
            Tag::BlockQuote(_) => {
                if self.quote_depth == 0 {
                    self.blank();
                }
                self.quote_depth += 1;
                self.push_style(styles::quote_style());
            }
            Tag::CodeBlock(kind) => {
                self.blank();
                let lang = match kind {
                    CodeBlockKind::Fenced(info) => info.split_whitespace().next().map(str::to_string),
                    CodeBlockKind::Indented => None,
                };
                self.code = Some((lang, String::new()));
            }
            Tag::List(start) => {
                if self.list_stack.is_empty() {
                    self.blank();
                } else {
                    self.flush();
                }
                self.list_stack.push(start);
            }
            Tag::Item => {
                self.flush();
                let depth = self.list_stack.len().saturating_sub(1);
                let marker = match self.list_stack.last_mut() {
                    Some(Some(n)) => {
                        let m = format!("{}. ", n);
                        *n += 1;
                        m
                    }
                    _ => "• ".to_string(),
                };
                self.push_span(
                    format!("{}{}", "  ".repeat(depth), marker),
                    Style::default().fg(styles::CYAN),
                );
            }
            Tag::Emphasis => self.push_style(Style::default().add_modifier(Modifier::ITALIC)),
            Tag::Strong => self.push_style(Style::default().add_modifier(Modifier::BOLD)),
            Tag::Strikethrough => self.push_style(Style::default().add_modifier(Modifier::CROSSED_OUT)),
            Tag::Link { dest_url, .. } => {
                self.link_dest = Some(dest_url.to_string());
                self.push_style(styles::link_style());
            }
            Tag::Table(_) | Tag::HtmlBlock => self.blank(),
            Tag::TableHead => self.push_style(Style::default().add_modifier(Modifier::BOLD)),
            Tag::TableCell => {
                if !self.current.is_empty() {
                    self.push_span(" │ ", Style::default().fg(styles::BORDER));
                }
            }
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => self.flush(),
            TagEnd::Heading(_) => {
                self.flush();
                self.pop_style();
            }
            TagEnd::BlockQuote(_) => {
                self.flush();
                self.pop_style();
                self.quote_depth = self.quote_depth.saturating_sub(1);
            }
            TagEnd::CodeBlock => {
                if let Some((lang, source)) = self.code.take() {
                    let base = Style::default().bg(styles::CODE_BG);
                    for line in self.hl.highlight_block(&source, lang.as_deref(), base) {
                        let mut spans = self.quote_prefix();
                        spans.push(Span::styled("  ", base));
                        spans.extend(line.spans);
                        self.lines.push(Line::from(spans));
                    }
                }
            }
            TagEnd::List(_) => {
                self.flush();
                self.list_stack.pop();
            }
            TagEnd::Item => self.flush(),
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough => self.pop_style(),
            TagEnd::Link => {
                self.pop_style();
                if let Some(dest) = self.link_dest.take().filter(|d| !d.is_empty()) {
                    self.push_span(format!(" ({})", dest), Style::default().fg(styles::DIM));
                }
            }
            TagEnd::TableHead => {
                self.flush();
                self.pop_style();
            }
            TagEnd::TableRow | TagEnd::HtmlBlock => self.flush(),
            _ => {}
        }
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        self.flush();
        while self.lines.last().is_some_and(|l| l.width() == 0) {
            self.lines.pop();
        }
        self.lines
    }
}

fn heading_level(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}
