use core::fmt;

use colored::Colorize;

use crate::value::{Func, Value};

/// Plain representation, strings are quoted.
impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => f.write_str("nil"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x:?}"),
            Self::Str(s) => write!(f, "{s:?}"),
            Self::List(l) => {
                write!(f, "[")?;
                write_list(f, l, |f, it| write!(f, "{it:?}"))?;
                write!(f, "]")
            }
            Self::Func(func) => write!(f, "{func:?}"),
        }
    }
}

/// `{}` is the coloured form used by the REPL,
/// `{:#}` prints strings raw, like `println` would.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            match self {
                Self::Str(s) => write!(f, "{s}"),
                Self::List(l) => {
                    write!(f, "[")?;
                    write_list(f, l, |f, it| write!(f, "{it:#}"))?;
                    write!(f, "]")
                }
                other => write!(f, "{other:?}"),
            }
        } else {
            match self {
                Self::Nil => write!(f, "{}", "nil".bold().blue()),
                Self::Bool(b) => write!(f, "{}", b.to_string().bright_blue()),
                Self::Int(i) => write!(f, "{}", i.to_string().cyan()),
                Self::Float(x) => write!(f, "{}", format!("{x:?}").cyan()),
                Self::Str(s) => write!(f, "{}", format!("{s:?}").bright_green()),
                Self::List(l) => {
                    write!(f, "{}", "[".purple())?;
                    write_list(f, l, |f, it| write!(f, "{it}"))?;
                    write!(f, "{}", "]".purple())
                }
                Self::Func(func) => write!(f, "{}", func.to_string().red()),
            }
        }
    }
}

impl fmt::Display for Func {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<func {}>", self.name())
    }
}

fn write_list(
    f: &mut fmt::Formatter,
    list: &im::Vector<Value>,
    mut each: impl FnMut(&mut fmt::Formatter, &Value) -> fmt::Result,
) -> fmt::Result {
    let mut iter = list.iter();

    if let Some(first) = iter.next() {
        each(f, first)?;
    }

    for it in iter {
        write!(f, " ")?;
        each(f, it)?;
    }

    Ok(())
}

/// `{name: value, ...}` in insertion order, with the plain representation.
pub(crate) fn write_attrs<'a>(
    f: &mut fmt::Formatter,
    attrs: impl IntoIterator<Item = (&'a str, &'a Value)>,
) -> fmt::Result {
    write!(f, "{{")?;

    let mut iter = attrs.into_iter();

    if let Some((k, v)) = iter.next() {
        write!(f, "{k}: {v:?}")?;
    }

    for (k, v) in iter {
        write!(f, ", {k}: {v:?}")?;
    }

    write!(f, "}}")
}

#[cfg(test)]
mod tests {
    use crate::value;

    #[test]
    fn debug_is_plain() {
        let list = value!(list value!(int 1), value!(str "two"), value!(nil));

        assert_eq!(format!("{list:?}"), r#"[1 "two" nil]"#);
        assert_eq!(format!("{:?}", value!(float 1.0)), "1.0");
    }

    #[test]
    fn alternate_display_is_raw() {
        assert_eq!(format!("{:#}", value!(str "hi")), "hi");
        assert_eq!(
            format!("{:#}", value!(list value!(str "a"), value!(int 2))),
            "[a 2]"
        );
    }
}
