use std::rc::Rc;

use ecow::EcoString;
use fxhash::FxBuildHasher;
use indexmap::IndexMap;

use crate::cache::{AttrCache, HasAttrs};
use crate::init::{CallArgs, LazyInit};
use crate::lazy::LazyProperty;
use crate::value::{Func, LResult, LazyErr, Value};

/// Signature shared by every function attached to a class: the instance,
/// then the call arguments (empty for property reads).
pub type MethodT = dyn Fn(&Object, &[Value]) -> anyhow::Result<Value>;
pub type Method = Rc<MethodT>;

#[derive(Clone)]
pub enum ClassAttr {
    /// plain callable, reading it yields a `Func` bound to the instance
    Method(Method),
    /// read-only accessor, computed on every read
    Property(Method),
    /// cached accessor, see [`LazyProperty`]
    Lazy(LazyProperty<Object>),
    /// shared constant
    Const(Value),
}

impl std::fmt::Debug for ClassAttr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Method(_) => write!(f, "<method>"),
            Self::Property(_) => write!(f, "<property>"),
            Self::Lazy(prop) => write!(f, "<lazy property {}>", prop.slot()),
            Self::Const(val) => write!(f, "{val:?}"),
        }
    }
}

/// How a function is turned into a class attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AttrDecorator {
    #[default]
    Identity,
    Property,
    LazyProperty,
}

impl AttrDecorator {
    pub fn decorate(self, name: &str, func: Method) -> ClassAttr {
        match self {
            Self::Identity => ClassAttr::Method(func),
            Self::Property => ClassAttr::Property(func),
            Self::LazyProperty => {
                let getter = move |this: &Object| func(this, &[]);
                ClassAttr::Lazy(LazyProperty::from_rc(name, Rc::new(getter)))
            }
        }
    }
}

#[derive(Debug)]
pub struct Class {
    name: EcoString,
    attrs: IndexMap<EcoString, ClassAttr, FxBuildHasher>,
    init: Option<LazyInit<Object>>,
}

/// Assembles a class. Attributes are fixed once `build` is called.
#[derive(Debug)]
pub struct ClassBuilder {
    class: Class,
}

impl Class {
    pub fn builder(name: impl Into<EcoString>) -> ClassBuilder {
        ClassBuilder {
            class: Self {
                name: name.into(),
                attrs: IndexMap::default(),
                init: None,
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attr(&self, name: &str) -> Option<&ClassAttr> {
        self.attrs.get(name)
    }

    pub fn attr_names(&self) -> impl Iterator<Item = &str> {
        self.attrs.keys().map(EcoString::as_str)
    }

    /// Creates an instance and runs the constructor on it. Without a
    /// constructor the class takes no arguments.
    pub fn instantiate(self: &Rc<Self>, args: &CallArgs) -> LResult<Object> {
        let obj = Object::new(Rc::clone(self));

        match &self.init {
            Some(init) => init.call(&obj, args)?,
            None if args.positional().is_empty() && args.named().next().is_none() => {}
            None => {
                return Err(LazyErr::TooManyArgs {
                    expected: 0,
                    found: args.positional().len() + args.named().count(),
                })
            }
        }

        tracing::debug!(class = %self.name, "instantiated");
        Ok(obj)
    }
}

impl ClassBuilder {
    #[must_use]
    pub fn init(mut self, init: LazyInit<Object>) -> Self {
        self.class.init = Some(init);
        self
    }

    /// Attaches `attr` under `name`, replacing whatever was there.
    #[must_use]
    pub fn attr(mut self, name: impl Into<EcoString>, attr: ClassAttr) -> Self {
        let name = name.into();
        tracing::debug!(class = %self.class.name, %name, ?attr, "attaching attribute");
        self.class.attrs.insert(name, attr);
        self
    }

    #[must_use]
    pub fn method(
        self,
        name: impl Into<EcoString>,
        f: impl Fn(&Object, &[Value]) -> anyhow::Result<Value> + 'static,
    ) -> Self {
        self.attr(name, ClassAttr::Method(Rc::new(f)))
    }

    #[must_use]
    pub fn property(
        self,
        name: impl Into<EcoString>,
        f: impl Fn(&Object) -> anyhow::Result<Value> + 'static,
    ) -> Self {
        self.attr(name, ClassAttr::Property(Rc::new(move |this: &Object, _: &[Value]| f(this))))
    }

    #[must_use]
    pub fn lazy_property(self, prop: LazyProperty<Object>) -> Self {
        let name = EcoString::from(prop.name());
        self.attr(name, ClassAttr::Lazy(prop))
    }

    #[must_use]
    pub fn constant(self, name: impl Into<EcoString>, val: impl Into<Value>) -> Self {
        self.attr(name, ClassAttr::Const(val.into()))
    }

    /// Applies a class decorator such as the one returned by [`attributer`].
    #[must_use]
    pub fn with(self, decorator: impl FnOnce(Self) -> Self) -> Self {
        decorator(self)
    }

    pub fn build(self) -> Rc<Class> {
        Rc::new(self.class)
    }
}

/// Returns a class decorator attaching `decorator(func)` under `attr_name`.
///
/// ```ignore
/// let student = Class::builder("Student")
///     .with(attributer("greeting", greet, AttrDecorator::Property))
///     .build();
/// ```
pub fn attributer(
    attr_name: impl Into<EcoString>,
    func: impl Fn(&Object, &[Value]) -> anyhow::Result<Value> + 'static,
    decorator: AttrDecorator,
) -> impl FnOnce(ClassBuilder) -> ClassBuilder {
    let attr_name = attr_name.into();
    let func: Method = Rc::new(func);

    move |class| {
        let attr = decorator.decorate(&attr_name, func);
        class.attr(attr_name, attr)
    }
}

struct ObjectInner {
    class: Rc<Class>,
    attrs: AttrCache,
}

/// Cheap handle to an instance of a [`Class`].
#[derive(Clone)]
pub struct Object(Rc<ObjectInner>);

impl HasAttrs for Object {
    fn attrs(&self) -> &AttrCache {
        &self.0.attrs
    }
}

impl std::fmt::Debug for Object {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({:?})", self.0.class.name, self.0.attrs)
    }
}

impl Object {
    fn new(class: Rc<Class>) -> Self {
        Self(Rc::new(ObjectInner {
            class,
            attrs: AttrCache::new(),
        }))
    }

    pub fn class(&self) -> &Rc<Class> {
        &self.0.class
    }

    fn no_attr(&self, name: &str) -> LazyErr {
        LazyErr::NoAttribute {
            owner: self.0.class.name.clone(),
            name: name.into(),
        }
    }

    /// Accessors on the class shadow instance attributes of the same name,
    /// instance attributes shadow methods and constants.
    pub fn get(&self, name: &str) -> LResult<Value> {
        let class_attr = self.0.class.attr(name);

        match class_attr {
            Some(ClassAttr::Property(f)) => return Ok(f(self, &[])?),
            Some(ClassAttr::Lazy(prop)) => return prop.get(self),
            _ => {}
        }

        if let Some(val) = self.attrs().get(name) {
            return Ok(val);
        }

        match class_attr {
            // weak, so a bound method stored back on its instance is no cycle
            Some(ClassAttr::Method(f)) => {
                let (this, f) = (Rc::downgrade(&self.0), Rc::clone(f));
                let owner = self.0.class.name.clone();

                Ok(Value::Func(Func::new(name, move |args| {
                    let this = this
                        .upgrade()
                        .map(Object)
                        .ok_or_else(|| anyhow::anyhow!("'{owner}' object was dropped"))?;
                    f(&this, args)
                })))
            }
            Some(ClassAttr::Const(val)) => Ok(val.clone()),
            _ => Err(self.no_attr(name)),
        }
    }

    pub fn set(&self, name: &str, val: impl Into<Value>) -> LResult<()> {
        match self.0.class.attr(name) {
            Some(ClassAttr::Lazy(prop)) => prop.set(self, val.into()),
            Some(ClassAttr::Property(_)) => {
                return Err(LazyErr::ReadOnly {
                    owner: self.0.class.name.clone(),
                    name: name.into(),
                })
            }
            _ => {
                self.attrs().set(name, val.into());
            }
        }

        Ok(())
    }

    pub fn delete(&self, name: &str) -> LResult<()> {
        match self.0.class.attr(name) {
            Some(ClassAttr::Lazy(prop)) => {
                prop.delete(self);
                Ok(())
            }
            _ => self
                .attrs()
                .remove(name)
                .map(drop)
                .ok_or_else(|| self.no_attr(name)),
        }
    }

    pub fn call(&self, name: &str, args: &[Value]) -> LResult<Value> {
        match self.get(name)? {
            Value::Func(f) => f.call(args),
            _ => Err(LazyErr::NotCallable(name.into())),
        }
    }
}
