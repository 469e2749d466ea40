use std::collections::HashSet;

use nu_ansi_term::{Color, Style};
use reedline::Highlighter;
use reedline::StyledText;

use super::read;

pub struct Commands {
    names: HashSet<&'static str>,
}

impl Commands {
    pub fn new(names: impl IntoIterator<Item = &'static str>) -> Self {
        Self {
            names: names.into_iter().collect(),
        }
    }

    fn style(&self, token: &str, first: bool) -> Style {
        let cmd_color = Color::LightMagenta;
        let attr_color = Color::LightRed;
        let num_color = Color::Cyan;
        let str_color = Color::LightGreen;
        let const_color = Color::LightBlue;
        let bracket_color = Color::Purple;
        let comment_color = Color::DarkGray;

        match token {
            _ if first && self.names.contains(token) => Style::new().bold().fg(cmd_color),
            "[" | "]" => Style::new().fg(bracket_color),
            "nil" | "true" | "false" => Style::new().fg(const_color),
            s if s.starts_with(';') => Style::new().fg(comment_color),
            s if s.starts_with('"') => Style::new().fg(str_color),
            s if s.parse::<f64>().is_ok() => Style::new().fg(num_color),
            _ => Style::new().fg(attr_color),
        }
    }
}

impl Highlighter for Commands {
    fn highlight(&self, line: &str, _cursor: usize) -> StyledText {
        let mut styled_text = StyledText::new();
        let mut tokens = read::tokenize_with_whitespace(line);
        let mut first = true;

        while let Some(token) = tokens.next() {
            let trimmed = token.trim_start();

            if trimmed.is_empty() {
                styled_text.push((Style::new(), token.to_owned()));
                continue;
            }

            let lead = &token[..token.len() - trimmed.len()];
            if !lead.is_empty() {
                styled_text.push((Style::new(), lead.to_owned()));
            }

            styled_text.push((self.style(trimmed, first), trimmed.to_owned()));
            first = false;
        }

        styled_text
    }
}
