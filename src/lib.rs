#![warn(clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate
)]

//! Attribute utilities: memoized properties, constructors that bind their
//! arguments onto the instance, attributes attached to classes while they
//! are assembled, and [`LazyObject`], whose attributes come from one
//! compute function.

pub mod cache;
pub mod class;
pub mod init;
pub mod lazy;
pub mod object;
pub mod print;
pub mod repl;
pub mod value;

#[cfg(test)]
mod tests;

pub use cache::{AttrCache, HasAttrs};
pub use class::{attributer, AttrDecorator, Class, ClassAttr, ClassBuilder, Object};
pub use init::{CallArgs, LazyInit, Param, ParamKind, Params};
pub use lazy::LazyProperty;
pub use object::{AttrIter, LazyObject};
pub use value::{Func, LResult, LazyErr, Value, ValueType};
