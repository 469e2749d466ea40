//! Constructor binding: every argument a constructor receives becomes an
//! attribute of the instance under the parameter's name.

use std::fmt::Display;
use std::rc::Rc;

use ecow::{eco_format, EcoString, EcoVec};
use indexmap::IndexMap;
use tap::Pipe;

use crate::cache::HasAttrs;
use crate::value::{LResult, LazyErr, Value};

#[derive(Debug, Clone, PartialEq)]
pub enum ParamKind {
    Required,
    Defaulted(Value),
    /// collects surplus positional arguments, `LazyInit` refuses these
    VarPositional,
    /// collects surplus named arguments
    VarKeyword,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    name: EcoString,
    kind: ParamKind,
}

impl Param {
    pub fn required(name: impl Into<EcoString>) -> Self {
        Self {
            name: name.into(),
            kind: ParamKind::Required,
        }
    }

    pub fn defaulted(name: impl Into<EcoString>, default: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            kind: ParamKind::Defaulted(default.into()),
        }
    }

    pub fn var_positional(name: impl Into<EcoString>) -> Self {
        Self {
            name: name.into(),
            kind: ParamKind::VarPositional,
        }
    }

    pub fn var_keyword(name: impl Into<EcoString>) -> Self {
        Self {
            name: name.into(),
            kind: ParamKind::VarKeyword,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn kind(&self) -> &ParamKind {
        &self.kind
    }

    pub const fn has_default(&self) -> bool {
        matches!(self.kind, ParamKind::Defaulted(_))
    }

    pub const fn default(&self) -> Option<&Value> {
        match &self.kind {
            ParamKind::Defaulted(val) => Some(val),
            _ => None,
        }
    }
}

impl Display for Param {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            ParamKind::Required => write!(f, "{}", self.name),
            ParamKind::Defaulted(val) => write!(f, "{}={val:?}", self.name),
            ParamKind::VarPositional => write!(f, "*{}", self.name),
            ParamKind::VarKeyword => write!(f, "**{}", self.name),
        }
    }
}

/// Declared parameter list of a constructor, in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    params: EcoVec<Param>,
}

impl Params {
    /// Validates the declaration: names are unique, required parameters come
    /// before defaulted ones, at most one of each variadic kind, and the
    /// var-keyword parameter is last.
    pub fn new(params: impl IntoIterator<Item = Param>) -> LResult<Self> {
        let mut seen = Vec::<EcoString>::new();
        let mut seen_default = false;
        let mut seen_var_positional = false;
        let mut seen_var_keyword = false;

        let proto = params
            .into_iter()
            .map(|it| {
                let err = |msg: &str| Err(LazyErr::Schema(eco_format!("{msg}: {it}")));

                if seen.contains(&it.name) {
                    return err("duplicate parameter");
                }
                if seen_var_keyword {
                    return err("parameter after the var-keyword parameter");
                }

                match it.kind {
                    ParamKind::Required if seen_default => {
                        return err("required parameter follows a defaulted one");
                    }
                    ParamKind::Required => {}
                    ParamKind::Defaulted(_) => seen_default = true,
                    ParamKind::VarPositional if seen_var_positional => {
                        return err("multiple var-positional parameters");
                    }
                    ParamKind::VarPositional => seen_var_positional = true,
                    ParamKind::VarKeyword => seen_var_keyword = true,
                }

                seen.push(it.name.clone());
                Ok(it)
            })
            .collect::<LResult<EcoVec<_>>>()?;

        Self { params: proto }.pipe(Ok)
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    pub fn required(&self) -> impl Iterator<Item = &Param> {
        self.params
            .iter()
            .filter(|it| matches!(it.kind, ParamKind::Required))
    }

    pub fn defaulted(&self) -> impl Iterator<Item = &Param> {
        self.params.iter().filter(|it| it.has_default())
    }

    pub fn var_positional(&self) -> Option<&Param> {
        self.params
            .iter()
            .find(|it| matches!(it.kind, ParamKind::VarPositional))
    }

    pub fn var_keyword(&self) -> Option<&Param> {
        self.params
            .iter()
            .find(|it| matches!(it.kind, ParamKind::VarKeyword))
    }

    pub fn declares(&self, name: &str) -> bool {
        self.params.iter().any(|it| {
            it.name == name
                && matches!(it.kind, ParamKind::Required | ParamKind::Defaulted(_))
        })
    }
}

impl Display for Params {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(")?;

        if let Some(first) = self.params.first() {
            write!(f, "{first}")?;
        }

        for param in self.params.iter().skip(1) {
            write!(f, ", {param}")?;
        }

        write!(f, ")")
    }
}

/// Concrete arguments of one call: positional values, then named values in
/// the order they were given.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallArgs {
    positional: Vec<Value>,
    named: IndexMap<EcoString, Value>,
}

impl CallArgs {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn arg(mut self, val: impl Into<Value>) -> Self {
        self.positional.push(val.into());
        self
    }

    /// a repeated name replaces the earlier value
    #[must_use]
    pub fn kwarg(mut self, name: impl Into<EcoString>, val: impl Into<Value>) -> Self {
        self.named.insert(name.into(), val.into());
        self
    }

    pub fn positional(&self) -> &[Value] {
        &self.positional
    }

    pub fn named(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.named.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn get_named(&self, name: &str) -> Option<&Value> {
        self.named.get(name)
    }
}

type Body<O> = dyn Fn(&O, &CallArgs) -> anyhow::Result<()>;

/// A constructor wrapped so that its arguments are bound onto the instance
/// before its body runs.
///
/// Required parameters that receive no value are left unbound, no error is
/// raised for them. Defaulted parameters are bound only when the caller
/// supplies a value that is not `nil`, their declared default is never bound.
pub struct LazyInit<O> {
    params: Params,
    body: Rc<Body<O>>,
}

impl<O> Clone for LazyInit<O> {
    fn clone(&self) -> Self {
        Self {
            params: self.params.clone(),
            body: Rc::clone(&self.body),
        }
    }
}

impl<O> std::fmt::Debug for LazyInit<O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LazyInit")
            .field("params", &format_args!("{}", self.params))
            .finish_non_exhaustive()
    }
}

impl<O: HasAttrs> LazyInit<O> {
    /// Fails right away if `params` declares a var-positional parameter.
    pub fn new(
        params: Params,
        body: impl Fn(&O, &CallArgs) -> anyhow::Result<()> + 'static,
    ) -> LResult<Self> {
        if let Some(varargs) = params.var_positional() {
            return Err(LazyErr::Decoration(eco_format!(
                "`lazy_init` does not handle var-positional parameters (*{})",
                varargs.name
            )));
        }

        Ok(Self {
            params,
            body: Rc::new(body),
        })
    }

    /// A constructor with no body of its own.
    pub fn binding(params: Params) -> LResult<Self> {
        Self::new(params, |_, _| Ok(()))
    }

    pub const fn params(&self) -> &Params {
        &self.params
    }

    pub fn call(&self, this: &O, args: &CallArgs) -> LResult<()> {
        self.check_shape(args)?;

        let attrs = this.attrs();
        let required = self.params.required().collect::<Vec<_>>();
        let defaulted = self.params.defaulted().collect::<Vec<_>>();
        let mut positional = args.positional.iter();

        for param in &required {
            if let Some(val) = positional
                .next()
                .or_else(|| args.named.get(param.name.as_str()))
            {
                attrs.set(param.name.clone(), val.clone());
            } else {
                tracing::debug!(name = %param.name, "required parameter received no value");
            }
        }

        for param in &defaulted {
            match positional
                .next()
                .or_else(|| args.named.get(param.name.as_str()))
            {
                Some(val) if !val.is_nil() => {
                    attrs.set(param.name.clone(), val.clone());
                }
                _ => tracing::trace!(name = %param.name, "defaulted parameter left unbound"),
            }
        }

        for (name, val) in &args.named {
            if !self.params.declares(name) {
                attrs.set(name.clone(), val.clone());
            }
        }

        (self.body)(this, args)?;

        Ok(())
    }

    /// Rejects argument lists the constructor itself could not accept.
    fn check_shape(&self, args: &CallArgs) -> LResult<()> {
        let declared = self.params.required().count() + self.params.defaulted().count();

        if args.positional.len() > declared {
            return Err(LazyErr::TooManyArgs {
                expected: declared,
                found: args.positional.len(),
            });
        }

        let by_position = self
            .params
            .params
            .iter()
            .filter(|it| matches!(it.kind, ParamKind::Required | ParamKind::Defaulted(_)))
            .take(args.positional.len())
            .collect::<Vec<_>>();

        for name in args.named.keys() {
            if by_position.iter().any(|it| it.name == *name) {
                return Err(LazyErr::MultipleValues(name.clone()));
            }

            if !self.params.declares(name) && self.params.var_keyword().is_none() {
                return Err(LazyErr::UnexpectedKeyword(name.clone()));
            }
        }

        Ok(())
    }
}
