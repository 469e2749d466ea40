use std::cell::Cell;
use std::rc::Rc;

use ecow::EcoString;

use crate::{
    attributer, call_args, value, AttrDecorator, CallArgs, Class, HasAttrs, LazyErr, LazyInit,
    LazyObject, LazyProperty, Object, Param, Params, Value,
};

fn foo_with_bar(hits: &Rc<Cell<usize>>) -> Rc<Class> {
    let hits = Rc::clone(hits);
    let bar = LazyProperty::new("bar", move |_: &Object| {
        hits.set(hits.get() + 1);
        Ok(value!(vec![1, 2, 3]))
    })
    .with_doc("A list of ints.");

    Class::builder("Foo").lazy_property(bar).build()
}

#[test]
fn lazy_property_on_a_class() {
    let hits = Rc::new(Cell::new(0));
    let foo = foo_with_bar(&hits);
    let a = foo.instantiate(&CallArgs::new()).unwrap();

    assert_eq!(a.get("bar").unwrap(), value!(vec![1, 2, 3]));
    assert_eq!(a.get("_bar").unwrap(), value!(vec![1, 2, 3]));
    a.get("bar").unwrap();
    assert_eq!(hits.get(), 1);

    a.set("bar", value!(vec![4, 5, 6])).unwrap();
    assert_eq!(a.get("bar").unwrap(), value!(vec![4, 5, 6]));
    assert_eq!(a.get("_bar").unwrap(), value!(vec![4, 5, 6]));

    a.delete("bar").unwrap();
    assert!(!a.attrs().contains("_bar"));
    assert_eq!(a.get("bar").unwrap(), value!(vec![1, 2, 3]));
    assert_eq!(hits.get(), 2);

    let Some(crate::ClassAttr::Lazy(prop)) = foo.attr("bar") else {
        panic!("bar is not a lazy property");
    };
    assert!(prop.doc().unwrap().starts_with("A list of ints."));
}

#[test]
fn lazy_init_binds_arguments() {
    let params = Params::new([
        Param::required("a"),
        Param::defaulted("b", 3),
        Param::var_keyword("kwargs"),
    ])
    .unwrap();
    let foo = Class::builder("Foo")
        .init(LazyInit::binding(params).unwrap())
        .build();

    let a = foo.instantiate(&call_args![1; "b" => 2, "c" => 4]).unwrap();

    assert_eq!(a.get("a").unwrap(), value!(int 1));
    assert_eq!(a.get("b").unwrap(), value!(int 2));
    assert_eq!(a.get("c").unwrap(), value!(int 4));
}

#[test]
fn lazy_init_refuses_var_positional() {
    let params = Params::new([Param::required("a"), Param::var_positional("args")]).unwrap();

    assert!(matches!(
        LazyInit::<Object>::binding(params),
        Err(LazyErr::Decoration(_))
    ));
}

#[test]
fn lazy_attributer() {
    let params = Params::new([Param::required("a")]).unwrap();
    let foo = Class::builder("Foo")
        .init(LazyInit::binding(params).unwrap())
        .with(attributer(
            "bar",
            |this, _| Ok(Value::Int(this.get("a")?.as_int()? + 4)),
            AttrDecorator::Property,
        ))
        .build();

    let a = foo.instantiate(&call_args![1]).unwrap();
    assert_eq!(a.get("bar").unwrap(), value!(int 5));
}

#[test]
fn attributer_greeting() {
    let student = Class::builder("Student")
        .with(attributer(
            "greeting",
            |this, _| Ok(Value::Str(ecow::eco_format!("Bonjour {:#}", this.get("name")?))),
            AttrDecorator::Property,
        ))
        .build();

    let s = student.instantiate(&CallArgs::new()).unwrap();
    assert!(s.get("greeting").is_err());

    s.set("name", "Ada").unwrap();
    assert_eq!(s.get("greeting").unwrap(), value!(str "Bonjour Ada"));
}

#[test]
fn lazy_object_unconstrained() {
    let hits = Rc::new(Cell::new(0));
    let counter = Rc::clone(&hits);
    let obj = LazyObject::new(move |name| {
        counter.set(counter.get() + 1);
        Ok(value!(str format!("{name} computed")))
    });

    assert_eq!(obj.get("hello").unwrap(), value!(str "hello computed"));
    assert_eq!(obj.get("hello").unwrap(), value!(str "hello computed"));
    assert_eq!(hits.get(), 1);
    assert!(matches!(obj.iter(), Err(LazyErr::NotIterable(_))));
}

#[test]
fn lazy_object_constrained() {
    let obj = LazyObject::new(|x| Ok(Value::from(x.len()))).constrained_attrs(["a", "bcd"]);

    assert_eq!(obj.get("bcd").unwrap(), value!(int 3));
    assert!(matches!(obj.get("xyz"), Err(LazyErr::NotAllowed { .. })));
    assert_eq!(
        obj.pairs().unwrap(),
        [
            (EcoString::from("a"), value!(int 1)),
            (EcoString::from("bcd"), value!(int 3))
        ]
    );
}

#[test]
fn lazy_property_on_a_lazy_object() {
    let obj = LazyObject::new(|x| Ok(Value::from(x.len()))).constrained_attrs(["abc"]);
    let total = LazyProperty::new("total", |this: &LazyObject| {
        Ok(Value::Int(this.get("abc")?.as_int()? * 10))
    });

    assert_eq!(total.get(&obj).unwrap(), value!(int 30));
    assert!(obj.is_cached("_total"));
    assert_eq!(format!("{obj:?}"), "LazyObject({abc: 3, _total: 30})");
}
