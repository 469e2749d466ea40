use std::rc::Rc;

use colored::Colorize;
use ecow::EcoString;

use crate::cache::{AttrCache, HasAttrs};
use crate::value::{Func, LResult, LazyErr, Value};

const COMPUTE_FUNCTION: &str = "compute_function";
const CONSTRAINED_ATTRS: &str = "constrained_attrs";

type ComputeT = dyn Fn(&str) -> anyhow::Result<Value>;

/// An object whose attributes are computed on first access by a single
/// compute function and cached afterwards.
///
/// Without `constrained_attrs` any name can be computed. With it, only the
/// listed names can, and iteration walks exactly that list in order.
#[derive(Clone)]
pub struct LazyObject {
    compute: Rc<ComputeT>,
    constrained: Option<Rc<[EcoString]>>,
    cache: AttrCache,
}

impl LazyObject {
    pub const TYPE_NAME: &'static str = "LazyObject";

    pub fn new(compute: impl Fn(&str) -> anyhow::Result<Value> + 'static) -> Self {
        Self {
            compute: Rc::new(compute),
            constrained: None,
            cache: AttrCache::new(),
        }
    }

    /// Restricts the computable names to `names`, which also become the
    /// iteration order.
    #[must_use]
    pub fn constrained_attrs<S: Into<EcoString>>(
        mut self,
        names: impl IntoIterator<Item = S>,
    ) -> Self {
        self.constrained = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Stores `val` under `name` without going through the compute function.
    #[must_use]
    pub fn seed(self, name: impl Into<EcoString>, val: impl Into<Value>) -> Self {
        self.cache.set(name, val.into());
        self
    }

    pub fn constrained(&self) -> Option<&[EcoString]> {
        self.constrained.as_deref()
    }

    pub fn is_allowed(&self, name: &str) -> bool {
        self.constrained
            .as_ref()
            .map_or(true, |allowed| allowed.iter().any(|it| it == name))
    }

    pub fn is_cached(&self, name: &str) -> bool {
        self.cache.contains(name)
    }

    pub fn get(&self, name: &str) -> LResult<Value> {
        if let Some(val) = self.cache.get(name) {
            return Ok(val);
        }

        if let Some(val) = self.builtin(name) {
            return Ok(val);
        }

        if let Some(allowed) = self.constrained.as_ref().filter(|_| !self.is_allowed(name)) {
            tracing::debug!(name, "attribute outside of constrained_attrs");
            return Err(LazyErr::NotAllowed {
                name: name.into(),
                allowed: allowed.to_vec(),
            });
        }

        tracing::debug!(name, "computing attribute");
        let val = (self.compute)(name)?;
        self.cache.set(name, val.clone());

        Ok(val)
    }

    /// `compute_function` as a callable taking the attribute name, and
    /// `constrained_attrs` as a list (nil when unconstrained).
    fn builtin(&self, name: &str) -> Option<Value> {
        match name {
            COMPUTE_FUNCTION => {
                let compute = Rc::clone(&self.compute);
                let f = Func::new(COMPUTE_FUNCTION, move |args| match args {
                    [name] => compute(name.as_str()?),
                    _ => anyhow::bail!("{COMPUTE_FUNCTION} takes 1 argument, got {}", args.len()),
                });
                Some(Value::Func(f))
            }
            CONSTRAINED_ATTRS => match &self.constrained {
                Some(names) => Some(names.iter().cloned().map(Value::Str).collect()),
                None => Some(Value::Nil),
            },
            _ => None,
        }
    }

    /// Explicit assignment, allowed for any name.
    pub fn set(&self, name: impl Into<EcoString>, val: impl Into<Value>) {
        self.cache.set(name, val.into());
    }

    /// Forgets a cached value, the next read computes it again.
    #[allow(clippy::must_use_candidate)]
    pub fn delete(&self, name: &str) -> Option<Value> {
        self.cache.remove(name)
    }

    /// `(name, value)` for every name of `constrained_attrs`, computing the
    /// ones that are not cached yet. Fails when the object is unconstrained.
    pub fn iter(&self) -> LResult<AttrIter<'_>> {
        let names = self
            .constrained
            .clone()
            .ok_or_else(|| LazyErr::NotIterable(Self::TYPE_NAME.into()))?;

        Ok(AttrIter {
            obj: self,
            names,
            pos: 0,
        })
    }

    pub fn pairs(&self) -> LResult<Vec<(EcoString, Value)>> {
        self.iter()?.collect()
    }

    /// The two fixed names, then the constrained names if there are any.
    pub fn dir(&self) -> Vec<EcoString> {
        let fixed = [COMPUTE_FUNCTION, CONSTRAINED_ATTRS].map(EcoString::from);

        fixed
            .into_iter()
            .chain(self.constrained.iter().flat_map(|it| it.iter().cloned()))
            .collect()
    }
}

impl HasAttrs for LazyObject {
    fn attrs(&self) -> &AttrCache {
        &self.cache
    }
}

pub struct AttrIter<'a> {
    obj: &'a LazyObject,
    names: Rc<[EcoString]>,
    pos: usize,
}

impl Iterator for AttrIter<'_> {
    type Item = LResult<(EcoString, Value)>;

    fn next(&mut self) -> Option<Self::Item> {
        let name = self.names.get(self.pos)?.clone();
        self.pos += 1;

        Some(self.obj.get(&name).map(|val| (name, val)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.names.len() - self.pos;
        (left, Some(left))
    }
}

impl ExactSizeIterator for AttrIter<'_> {}

impl std::fmt::Debug for LazyObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({:?})", Self::TYPE_NAME, self.cache)
    }
}

impl std::fmt::Display for LazyObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if f.alternate() {
            return write!(f, "{self:?}");
        }

        write!(f, "{}{}", Self::TYPE_NAME.yellow(), "({".purple())?;

        for (i, (name, val)) in self.cache.snapshot().into_iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {val}", name.red())?;
        }

        write!(f, "{}", "})".purple())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use proptest::prelude::*;

    use super::*;
    use crate::value;

    fn computed(name: &str) -> anyhow::Result<Value> {
        Ok(value!(str format!("{name} has been computed")))
    }

    fn length(name: &str) -> anyhow::Result<Value> {
        Ok(Value::from(name.len()))
    }

    fn counting(hits: &Rc<Cell<usize>>) -> LazyObject {
        let hits = Rc::clone(hits);
        LazyObject::new(move |name| {
            hits.set(hits.get() + 1);
            computed(name)
        })
    }

    #[test]
    fn unconstrained_computes_any_name() {
        let hits = Rc::new(Cell::new(0));
        let obj = counting(&hits);

        assert_eq!(obj.get("hello").unwrap(), value!(str "hello has been computed"));
        assert_eq!(obj.get("hello").unwrap(), value!(str "hello has been computed"));
        assert_eq!(
            obj.get("another_greeting_word").unwrap(),
            value!(str "another_greeting_word has been computed")
        );
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn constrained_rejects_other_names() {
        let obj = LazyObject::new(length).constrained_attrs(["a", "bcd"]);

        assert_eq!(obj.get("bcd").unwrap(), value!(int 3));

        let err = obj.get("xyz").unwrap_err();
        assert!(matches!(&err, LazyErr::NotAllowed { name, .. } if name == "xyz"));
        assert_eq!(
            err.to_string(),
            "Attribute xyz is not in the list of allowed attributes: ['a', 'bcd']"
        );
        assert!(!obj.is_cached("xyz"));
    }

    #[test]
    fn seeds_and_sets_bypass_constraint() {
        let obj = LazyObject::new(|_| anyhow::bail!("never computed"))
            .constrained_attrs(["a"])
            .seed("extra", 1);

        assert_eq!(obj.get("extra").unwrap(), value!(int 1));

        obj.set("a", "given");
        obj.set("other", "also given");
        assert_eq!(obj.get("a").unwrap(), value!(str "given"));
        assert_eq!(obj.get("other").unwrap(), value!(str "also given"));
    }

    #[test]
    fn iterates_in_declaration_order() {
        let obj = LazyObject::new(length)
            .constrained_attrs(["bcd", "a"])
            .seed("a", 100);

        let pairs = obj.pairs().unwrap();
        assert_eq!(
            pairs,
            [
                (EcoString::from("bcd"), value!(int 3)),
                (EcoString::from("a"), value!(int 100)),
            ]
        );
        assert_eq!(obj.iter().unwrap().len(), 2);
    }

    #[test]
    fn reiterating_recomputes_nothing() {
        let hits = Rc::new(Cell::new(0));
        let obj = counting(&hits).constrained_attrs(["x", "y"]);

        let first = obj.pairs().unwrap();
        let second = obj.pairs().unwrap();

        assert_eq!(first, second);
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn unconstrained_is_not_iterable() {
        let obj = LazyObject::new(computed);
        let err = obj.iter().err().unwrap();

        assert!(matches!(err, LazyErr::NotIterable(_)));
        assert!(obj.pairs().is_err());
    }

    #[test]
    fn iteration_stops_at_compute_error() {
        let obj = LazyObject::new(|name| match name {
            "bad" => anyhow::bail!("cannot compute {name}"),
            _ => Ok(Value::Nil),
        })
        .constrained_attrs(["ok", "bad", "never"]);

        let err = obj.pairs().unwrap_err();
        assert_eq!(err.to_string(), "cannot compute bad");
        assert!(obj.is_cached("ok"));
        assert!(!obj.is_cached("never"));
    }

    #[test]
    fn delete_recomputes() {
        let hits = Rc::new(Cell::new(0));
        let obj = counting(&hits);

        obj.get("a").unwrap();
        assert_eq!(obj.delete("a"), Some(value!(str "a has been computed")));
        assert_eq!(obj.delete("a"), None);
        obj.get("a").unwrap();

        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn dir_lists_fixed_then_constrained() {
        let obj = LazyObject::new(length);
        assert_eq!(obj.dir(), ["compute_function", "constrained_attrs"]);

        let obj = obj.constrained_attrs(["a", "bcd"]);
        assert_eq!(obj.dir(), ["compute_function", "constrained_attrs", "a", "bcd"]);
    }

    #[test]
    fn every_dir_name_is_readable() {
        let obj = LazyObject::new(length).constrained_attrs(["a", "bcd"]);

        for name in obj.dir() {
            assert!(obj.get(&name).is_ok(), "{name} is listed but unreadable");
        }
        assert_eq!(
            obj.get("constrained_attrs").unwrap(),
            value!(list value!(str "a"), value!(str "bcd"))
        );

        let Value::Func(compute) = obj.get("compute_function").unwrap() else {
            panic!("compute_function is not callable");
        };
        assert_eq!(compute.call(&[value!(str "hello")]).unwrap(), value!(int 5));
        assert!(!obj.is_cached("hello"));
    }

    #[test]
    fn fixed_names_skip_the_compute_function() {
        let hits = Rc::new(Cell::new(0));
        let obj = counting(&hits);

        assert_eq!(obj.get("constrained_attrs").unwrap(), Value::Nil);
        assert!(matches!(obj.get("compute_function").unwrap(), Value::Func(_)));
        assert_eq!(hits.get(), 0);
        assert_eq!(format!("{obj:?}"), "LazyObject({})");
    }

    #[test]
    fn representation_shows_cache() {
        let obj = LazyObject::new(computed).seed("n", 1);
        obj.get("hello").unwrap();

        assert_eq!(
            format!("{obj:?}"),
            r#"LazyObject({n: 1, hello: "hello has been computed"})"#
        );
        assert_eq!(format!("{obj:#}"), format!("{obj:?}"));
    }

    proptest! {
        #[test]
        fn reads_compute_once(name in "[a-z_]{1,12}", reads in 1usize..20) {
            let hits = Rc::new(Cell::new(0));
            let obj = counting(&hits);

            for _ in 0..reads {
                prop_assert_eq!(obj.get(&name).unwrap(), computed(&name).unwrap());
            }
            prop_assert_eq!(hits.get(), 1);
        }

        #[test]
        fn iteration_follows_constraint(
            names in proptest::collection::hash_set("[a-z]{1,6}", 0..8)
        ) {
            let names = names.into_iter().collect::<Vec<_>>();
            let obj = LazyObject::new(length).constrained_attrs(names.iter().map(String::as_str));

            let yielded = obj.pairs().unwrap();
            prop_assert_eq!(yielded.len(), names.len());
            for ((name, val), expected) in yielded.iter().zip(&names) {
                prop_assert_eq!(name.as_str(), expected.as_str());
                prop_assert_eq!(val, &Value::from(expected.len()));
            }
        }
    }
}
