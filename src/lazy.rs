use std::rc::Rc;

use ecow::{eco_format, EcoString};

use crate::cache::HasAttrs;
use crate::value::{LResult, Value};

type Getter<O> = dyn Fn(&O) -> anyhow::Result<Value>;

/// A cached accessor over an instance's attributes.
///
/// The computed value lives in the private slot `_<name>`; once it is there
/// `get` returns it without calling the compute function again.
pub struct LazyProperty<O> {
    name: EcoString,
    slot: EcoString,
    doc: Option<EcoString>,
    compute: Rc<Getter<O>>,
}

impl<O> Clone for LazyProperty<O> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            slot: self.slot.clone(),
            doc: self.doc.clone(),
            compute: Rc::clone(&self.compute),
        }
    }
}

impl<O> std::fmt::Debug for LazyProperty<O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LazyProperty")
            .field("name", &self.name)
            .field("slot", &self.slot)
            .finish_non_exhaustive()
    }
}

impl<O: HasAttrs> LazyProperty<O> {
    pub fn new(
        name: impl Into<EcoString>,
        compute: impl Fn(&O) -> anyhow::Result<Value> + 'static,
    ) -> Self {
        Self::from_rc(name, Rc::new(compute))
    }

    pub(crate) fn from_rc(name: impl Into<EcoString>, compute: Rc<Getter<O>>) -> Self {
        let name = name.into();

        Self {
            slot: Self::slot_for(&name),
            name,
            doc: None,
            compute,
        }
    }

    #[must_use]
    pub fn with_doc(mut self, doc: impl Into<EcoString>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    pub fn slot_for(name: &str) -> EcoString {
        eco_format!("_{name}")
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn slot(&self) -> &str {
        &self.slot
    }

    pub fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    pub fn get(&self, this: &O) -> LResult<Value> {
        if let Some(val) = this.attrs().get(&self.slot) {
            return Ok(val);
        }

        tracing::debug!(name = %self.name, "computing lazy property");
        let val = (self.compute)(this)?;
        this.attrs().set(self.slot.clone(), val.clone());

        Ok(val)
    }

    pub fn set(&self, this: &O, val: Value) {
        this.attrs().set(self.slot.clone(), val);
    }

    pub fn delete(&self, this: &O) {
        this.attrs().remove(&self.slot);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::cache::AttrCache;
    use crate::value;

    fn counting(hits: &Rc<Cell<usize>>) -> LazyProperty<AttrCache> {
        let hits = Rc::clone(hits);
        LazyProperty::new("bar", move |_: &AttrCache| {
            hits.set(hits.get() + 1);
            Ok(value!(list value!(int 1), value!(int 2), value!(int 3)))
        })
        .with_doc("A list of ints.")
    }

    #[test]
    fn computes_once() {
        let hits = Rc::new(Cell::new(0));
        let prop = counting(&hits);
        let this = AttrCache::new();

        for _ in 0..5 {
            assert_eq!(prop.get(&this).unwrap(), value!(vec![1, 2, 3]));
        }

        assert_eq!(hits.get(), 1);
        assert_eq!(this.get("_bar"), Some(value!(vec![1, 2, 3])));
    }

    #[test]
    fn set_then_delete() {
        let hits = Rc::new(Cell::new(0));
        let prop = counting(&hits);
        let this = AttrCache::new();

        prop.set(&this, value!(vec![4, 5, 6]));
        assert_eq!(prop.get(&this).unwrap(), value!(vec![4, 5, 6]));
        assert_eq!(this.get("_bar"), Some(value!(vec![4, 5, 6])));
        assert_eq!(hits.get(), 0);

        prop.delete(&this);
        assert!(!this.contains("_bar"));
        assert_eq!(prop.get(&this).unwrap(), value!(vec![1, 2, 3]));
        assert_eq!(hits.get(), 1);

        // deleting an absent slot is fine
        prop.delete(&this);
        prop.delete(&this);
    }

    #[test]
    fn carries_doc() {
        let prop = counting(&Rc::new(Cell::new(0)));
        assert!(prop.doc().unwrap().starts_with("A list of ints."));
        assert_eq!(prop.slot(), "_bar");
    }

    #[test]
    fn compute_failure_leaves_slot_empty() {
        let prop = LazyProperty::new("boom", |_: &AttrCache| Err(anyhow::anyhow!("nope")));
        let this = AttrCache::new();

        assert_eq!(prop.get(&this).unwrap_err().to_string(), "nope");
        assert!(this.is_empty());
    }
}
