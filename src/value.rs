use std::rc::Rc;

use ecow::EcoString;
use thiserror::Error;

pub type LResult<T> = Result<T, LazyErr>;

pub mod cast;
pub mod macros;

type FuncT = dyn Fn(&[Value]) -> anyhow::Result<Value>;

/// cheap to clone, only contains small values (with copy),
/// `EcoString`s, persistent vectors or `Rc`s
#[derive(Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(EcoString),
    List(im::Vector<Value>),
    Func(Func),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Nil,
    Bool,
    Int,
    Float,
    Str,
    List,
    Func,
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Nil => "nil",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::Str => "str",
            Self::List => "list",
            Self::Func => "func",
        };

        f.write_str(name)
    }
}

/// A named native callable. Carries the documentation text of whatever it wraps.
#[derive(Clone)]
pub struct Func {
    name: EcoString,
    doc: Option<EcoString>,
    f: Rc<FuncT>,
}

// Two Funcs are equal only if they share the same closure
impl PartialEq for Func {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && Rc::ptr_eq(&self.f, &other.f)
    }
}

impl std::fmt::Debug for Func {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<func {}>", self.name)
    }
}

impl Func {
    pub fn new(
        name: impl Into<EcoString>,
        f: impl Fn(&[Value]) -> anyhow::Result<Value> + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            doc: None,
            f: Rc::new(f),
        }
    }

    #[must_use]
    pub fn with_doc(mut self, doc: impl Into<EcoString>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    #[inline]
    pub fn call(&self, args: &[Value]) -> LResult<Value> {
        (self.f)(args).map_err(LazyErr::Compute)
    }
}

#[derive(Error, Debug)]
pub enum LazyErr {
    #[error("DecorationError: {0}")]
    Decoration(EcoString),

    #[error("Attribute {name} is not in the list of allowed attributes: {}", fmt_names(.allowed))]
    NotAllowed {
        name: EcoString,
        allowed: Vec<EcoString>,
    },

    #[error("'{owner}' object has no attribute '{name}'")]
    NoAttribute { owner: EcoString, name: EcoString },

    #[error("'{owner}' attribute '{name}' is read-only")]
    ReadOnly { owner: EcoString, name: EcoString },

    #[error("You are trying to iterate on a {0} but the attributes to iter upon are not defined (constrained_attrs is None)")]
    NotIterable(EcoString),

    #[error("'{0}' is not callable")]
    NotCallable(EcoString),

    #[error("Takes {expected} positional arguments but {found} were given")]
    TooManyArgs { expected: usize, found: usize },

    #[error("Got an unexpected keyword argument '{0}'")]
    UnexpectedKeyword(EcoString),

    #[error("Got multiple values for argument '{0}'")]
    MultipleValues(EcoString),

    #[error("Invalid parameter list: {0}")]
    Schema(EcoString),

    #[error("Type error, expected: {expected}, found: {found}")]
    TypeConv { expected: ValueType, found: EcoString },

    #[error(transparent)]
    Compute(#[from] anyhow::Error),
}

pub(crate) fn fmt_names(names: &[EcoString]) -> String {
    let inner = names
        .iter()
        .map(|it| format!("'{it}'"))
        .collect::<Vec<_>>()
        .join(", ");

    format!("[{inner}]")
}

impl Value {
    #[must_use]
    pub const fn get_type(&self) -> ValueType {
        match self {
            Self::Nil => ValueType::Nil,
            Self::Bool(_) => ValueType::Bool,
            Self::Int(_) => ValueType::Int,
            Self::Float(_) => ValueType::Float,
            Self::Str(_) => ValueType::Str,
            Self::List(_) => ValueType::List,
            Self::Func(_) => ValueType::Func,
        }
    }

    #[must_use]
    pub const fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int(value.into())
    }
}

impl From<usize> for Value {
    // saturates, attribute values are never that large in practice
    fn from(value: usize) -> Self {
        Self::Int(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Str(value.into())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Str(value.into())
    }
}

impl From<EcoString> for Value {
    fn from(value: EcoString) -> Self {
        Self::Str(value)
    }
}

impl From<Func> for Value {
    fn from(value: Func) -> Self {
        Self::Func(value)
    }
}

impl<T: Into<Self>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Self::List(value.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Nil, Into::into)
    }
}

impl FromIterator<Value> for Value {
    fn from_iter<T: IntoIterator<Item = Value>>(iter: T) -> Self {
        Self::List(iter.into_iter().collect())
    }
}
