use std::io::Write;

use ecow::EcoString;

use super::stream::TokenStream;
use super::ReplErr;
use crate::object::LazyObject;
use crate::value::Value;

pub const HELP: &str = "\
<name> | get <name>     read an attribute, computing it if needed
set <name> <literal>    assign a value (nil, true, 1, 2.5, \"str\", [list])
del <name>              forget a cached value
iter                    every (name, value) of constrained_attrs
dir                     list the introspectable names
repr                    show the object and its cache
help                    this text
bye                     leave (Ctrl-D works too)";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Get(EcoString),
    Set(EcoString, Value),
    Del(EcoString),
    Iter,
    Dir,
    Repr,
    Help,
    Bye,
    Empty,
}

pub const COMMAND_NAMES: [&str; 8] = ["get", "set", "del", "iter", "dir", "repr", "help", "bye"];

impl TryFrom<TokenStream<'_>> for Command {
    type Error = ReplErr;

    fn try_from(mut tokens: TokenStream<'_>) -> Result<Self, Self::Error> {
        let name = |tokens: &mut TokenStream<'_>, form: &str| {
            tokens
                .next()
                .map(EcoString::from)
                .ok_or_else(|| ReplErr::Parse(format!("Correct Form: {form}").into()))
        };

        let cmd = match tokens.next() {
            None => Self::Empty,
            Some("get") => Self::Get(name(&mut tokens, "get <name>")?),
            Some("set") => {
                let attr = name(&mut tokens, "set <name> <literal>")?;
                Self::Set(attr, tokens.parse_value()?)
            }
            Some("del") => Self::Del(name(&mut tokens, "del <name>")?),
            Some("iter") => Self::Iter,
            Some("dir") => Self::Dir,
            Some("repr") => Self::Repr,
            Some("help") => Self::Help,
            Some("bye") => Self::Bye,
            Some(attr) => Self::Get(attr.into()),
        };

        if tokens.is_eof() {
            Ok(cmd)
        } else {
            Err(ReplErr::Parse(
                format!("unexpected input: {}", tokens.rest().join(" ")).into(),
            ))
        }
    }
}

impl Command {
    /// Runs the command against `obj`, printing results to `out`.
    /// Attribute errors are returned, not printed.
    pub fn execute(self, obj: &LazyObject, out: &mut impl Write) -> Result<(), ReplErr> {
        match self {
            Self::Get(name) => writeln!(out, ";; => {}", obj.get(&name)?)?,
            Self::Set(name, val) => obj.set(name, val),
            Self::Del(name) => match obj.delete(&name) {
                Some(old) => writeln!(out, ";; forgot {old}")?,
                None => writeln!(out, ";; {name} was not cached")?,
            },
            Self::Iter => {
                for pair in obj.iter()? {
                    let (name, val) = pair?;
                    writeln!(out, "{name} {val}")?;
                }
            }
            Self::Dir => {
                let names = obj.dir();
                writeln!(out, "{}", crate::value::fmt_names(&names))?;
            }
            Self::Repr => writeln!(out, "{obj}")?,
            Self::Help => writeln!(out, "{HELP}")?,
            Self::Bye => return Err(ReplErr::Stop),
            Self::Empty => {}
        }

        Ok(())
    }
}
