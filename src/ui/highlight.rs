use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use syntect::easy::HighlightLines;
use syntect::highlighting::ThemeSet;
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

/// Syntax highlighting state, loaded once and reused for every code block.
pub struct Highlighter {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
}

impl Highlighter {
    pub fn new() -> Self {
        Highlighter {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
        }
    }

    /// Highlight a fenced code block, one styled line per source line.
    /// `lang` is the fence's info token (`rust`, `py`, `toml`, ...); unknown or
    /// missing languages render as plain text on `base_style`.
    pub fn highlight_block(&self, code: &str, lang: Option<&str>, base_style: Style) -> Vec<Line<'static>> {
        let syntax = lang
            .and_then(|l| self.syntax_set.find_syntax_by_token(l))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        // Use a dark theme that works well with our dark TUI background
        let theme = &self.theme_set.themes["base16-ocean.dark"];
        let mut highlighter = HighlightLines::new(syntax, theme);

        LinesWithEndings::from(code)
            .map(|line| match highlighter.highlight_line(line, &self.syntax_set) {
                Ok(ranges) => Line::from(
                    ranges
                        .into_iter()
                        .map(|(syn_style, text)| {
                            let fg = Color::Rgb(
                                syn_style.foreground.r,
                                syn_style.foreground.g,
                                syn_style.foreground.b,
                            );
                            Span::styled(text.trim_end_matches('\n').to_string(), base_style.fg(fg))
                        })
                        .collect::<Vec<_>>(),
                ),
                Err(_) => Line::from(Span::styled(
                    line.trim_end_matches('\n').to_string(),
                    base_style,
                )),
            })
            .collect()
    }
}
