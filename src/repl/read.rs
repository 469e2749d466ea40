use std::sync::OnceLock;

use regex::Regex;
use tap::Pipe;

use super::stream::TokenStream;
use super::ReplErr;
use crate::value::Value;

fn token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();

    RE.get_or_init(|| {
        Regex::new(r#"[\s]*([\[\]]|"(?:\\.|[^\\"])*"?|;.*|[^\s\[\]";]*)"#)
            .expect("token regex is valid")
    })
}

/// Split input into tokens: brackets, string literals, bare words.
/// `;` starts a comment running to the end of the line.
pub fn tokenize(input: &str) -> TokenStream<'_> {
    token_re()
        .find_iter(input)
        .map(|it| it.as_str().trim())
        .filter(|it| !it.is_empty() && !it.starts_with(';'))
        .collect()
}

/// Same split, but whitespace stays attached so the pieces add up to `input`.
pub fn tokenize_with_whitespace(input: &str) -> TokenStream<'_> {
    token_re().find_iter(input).map(|it| it.as_str()).collect()
}

impl TokenStream<'_> {
    /// Reads one literal: `nil`, `true`, `false`, integers, floats,
    /// `"strings"`, `[lists]`. Any other word reads as a string.
    pub fn parse_value(&mut self) -> Result<Value, ReplErr> {
        let token = self
            .next()
            .ok_or_else(|| ReplErr::Parse("expected a value".into()))?;

        match token {
            "[" => self.parse_list()?,
            "]" => Err(ReplErr::Parse("unexpected `]`".into()))?,
            "nil" => Value::Nil,
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),

            string if string.starts_with('"') => {
                if string.len() == 1 || !string.ends_with('"') {
                    return Err(ReplErr::Parse("missing closing `\"`".into()));
                }

                unescaper::unescape(&string[1..string.len() - 1])
                    .map_err(|err| {
                        ReplErr::Parse(format!("failed to unescape {string}: {err}").into())
                    })?
                    .pipe(Value::from)
            }

            word => word
                .parse::<i64>()
                .map(Value::Int)
                .or_else(|_| word.parse::<f64>().map(Value::Float))
                .unwrap_or_else(|_| Value::from(word)),
        }
        .pipe(Ok)
    }

    fn parse_list(&mut self) -> Result<Value, ReplErr> {
        let mut list = im::Vector::new();

        loop {
            match self.peek() {
                Some("]") => {
                    self.next();
                    break;
                }
                None => return Err(ReplErr::Parse("missing closing `]`".into())),
                Some(_) => list.push_back(self.parse_value()?),
            }
        }

        Ok(Value::List(list))
    }
}
