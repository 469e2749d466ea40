//! `lazyq`, an interactive explorer for a [`LazyObject`].

use std::path::PathBuf;

use ecow::{eco_format, EcoString};
use reedline::{DefaultPrompt, DefaultPromptSegment, FileBackedHistory, Reedline, Signal};
use thiserror::Error;

use crate::object::LazyObject;
use crate::value::{LazyErr, Value};

use self::command::{Command, COMMAND_NAMES};

pub mod command;
pub mod read;
mod highlighter;
mod stream;

pub use stream::TokenStream;

const HISTORY_SIZE: usize = 50;

#[derive(Error, Debug)]
pub enum ReplErr {
    #[error("Interrupted, Stop")]
    Stop,

    #[error("Fatal Error: {0:#}")]
    Fatal(anyhow::Error),

    #[error("Parse Error: {0}")]
    Parse(EcoString),

    #[error(transparent)]
    Lazy(#[from] LazyErr),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Which compute function the explored object uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ComputeMode {
    /// `"<name> has been computed"`
    #[default]
    Echo,
    /// length of the name
    Len,
    /// the name in upper case
    Upper,
}

impl ComputeMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "echo" => Some(Self::Echo),
            "len" => Some(Self::Len),
            "upper" => Some(Self::Upper),
            _ => None,
        }
    }

    pub fn compute(self, name: &str) -> Value {
        match self {
            Self::Echo => Value::Str(eco_format!("{name} has been computed")),
            Self::Len => Value::from(name.len()),
            Self::Upper => Value::from(name.to_uppercase()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplConfig {
    pub mode: ComputeMode,
    pub constrained: Option<Vec<EcoString>>,
    pub history: PathBuf,
    pub log_filter: String,
}

impl ReplConfig {
    /// `lazyq [echo|len|upper] [attr ...]`, plus `LAZYQ_HISTORY` and `LAZYQ_LOG`.
    pub fn from_env() -> Self {
        let history = std::env::var_os("LAZYQ_HISTORY").map_or_else(default_history, PathBuf::from);
        let log_filter = std::env::var("LAZYQ_LOG").unwrap_or_else(|_| "warn".to_owned());

        Self::from_args(std::env::args().skip(1), history, log_filter)
    }

    pub fn from_args(
        args: impl IntoIterator<Item = String>,
        history: PathBuf,
        log_filter: String,
    ) -> Self {
        let mut args = args.into_iter().peekable();

        let mode = args.peek().and_then(|it| ComputeMode::parse(it));
        if mode.is_some() {
            args.next();
        }

        let constrained = args.map(EcoString::from).collect::<Vec<_>>();

        Self {
            mode: mode.unwrap_or_default(),
            constrained: (!constrained.is_empty()).then_some(constrained),
            history,
            log_filter,
        }
    }

    pub fn object(&self) -> LazyObject {
        let mode = self.mode;
        let obj = LazyObject::new(move |name| Ok(mode.compute(name)));

        match &self.constrained {
            Some(names) => obj.constrained_attrs(names.iter().cloned()),
            None => obj,
        }
    }
}

fn default_history() -> PathBuf {
    directories_next::ProjectDirs::from("io", "lazy-objects", "lazyq").map_or_else(
        || PathBuf::from(".lazyq-history"),
        |it| it.data_dir().join("lazyq-history.txt"),
    )
}

pub struct Term {
    prompt: DefaultPrompt,
    reedline: Reedline,
}

impl Term {
    pub fn new(history: PathBuf) -> Result<Self, ReplErr> {
        let history = FileBackedHistory::with_file(HISTORY_SIZE, history)
            .map_err(|err| ReplErr::Fatal(anyhow::anyhow!("cannot open history: {err}")))?;
        let highlighter = highlighter::Commands::new(COMMAND_NAMES);

        Ok(Self {
            prompt: DefaultPrompt {
                left_prompt: DefaultPromptSegment::Basic("lazyq".to_owned()),
                right_prompt: DefaultPromptSegment::Empty,
            },
            reedline: Reedline::create()
                .with_history(Box::new(history))
                .with_highlighter(Box::new(highlighter)),
        })
    }

    fn read_line(&mut self) -> Result<String, ReplErr> {
        match self.reedline.read_line(&self.prompt) {
            Ok(Signal::Success(line)) => Ok(line),
            Ok(Signal::CtrlD | Signal::CtrlC) => Err(ReplErr::Stop),
            any => Err(ReplErr::Fatal(anyhow::anyhow!("REPL Err: {any:?}"))),
        }
    }
}

pub struct Repl {
    term: Term,
    obj: LazyObject,
}

impl std::fmt::Debug for Repl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(stringify!(Repl))
            .field("obj", &self.obj)
            .finish_non_exhaustive()
    }
}

impl Repl {
    pub fn new(config: &ReplConfig) -> Result<Self, ReplErr> {
        tracing::debug!(?config, "starting lazyq");

        Ok(Self {
            term: Term::new(config.history.clone())?,
            obj: config.object(),
        })
    }

    pub const fn object(&self) -> &LazyObject {
        &self.obj
    }

    /// read, execute, print once
    pub fn rep(&mut self) -> Result<(), ReplErr> {
        let line = self.term.read_line()?;
        let cmd = Command::try_from(read::tokenize(&line))?;

        cmd.execute(&self.obj, &mut std::io::stdout().lock())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(args: &[&str]) -> ReplConfig {
        ReplConfig::from_args(
            args.iter().map(|it| (*it).to_owned()),
            PathBuf::from("history.txt"),
            "warn".to_owned(),
        )
    }

    #[test]
    fn args_select_mode_and_constraint() {
        let cfg = config(&[]);
        assert_eq!(cfg.mode, ComputeMode::Echo);
        assert_eq!(cfg.constrained, None);

        let cfg = config(&["len", "a", "bcd"]);
        assert_eq!(cfg.mode, ComputeMode::Len);
        assert_eq!(cfg.constrained, Some(vec!["a".into(), "bcd".into()]));

        let cfg = config(&["x", "len"]);
        assert_eq!(cfg.mode, ComputeMode::Echo);
        assert_eq!(cfg.constrained, Some(vec!["x".into(), "len".into()]));
    }

    #[test]
    fn configured_object() {
        let obj = config(&["upper", "hi"]).object();

        assert_eq!(obj.get("hi").unwrap(), Value::from("HI"));
        assert!(obj.get("ho").is_err());

        let obj = config(&[]).object();
        assert_eq!(obj.get("hello").unwrap(), Value::from("hello has been computed"));
    }
}
