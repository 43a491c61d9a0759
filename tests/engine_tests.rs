use disposable::*;
use serde_json::json;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

#[ctor::ctor]
fn __init_test_logger() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default()).is_test(true).try_init();
}

#[cfg(test)]
mod engine_tests {
    use super::*;

    struct Counter {
        disposed: bool,
        count: Rc<Cell<usize>>,
    }

    impl Disposable for Counter {
        fn is_disposed(&self) -> bool {
            self.disposed
        }

        fn dispose(&mut self) -> Result<(), DisposeError> {
            self.count.set(self.count.get() + 1);
            self.disposed = true;
            Ok(())
        }
    }

    fn counter(count: &Rc<Cell<usize>>) -> DisposableRef {
        into_ref(Counter {
            disposed: false,
            count: Rc::clone(count),
        })
    }

    #[test]
    fn test_dispose_resources_of_plain_object() {
        let mut obj = Value::from(json!({"a": [], "b": {}, "c": "keep"}));

        dispose_resources_of(&mut obj, &[FieldKey::from("a"), FieldKey::from("b")]).unwrap();

        assert_eq!(obj.to_json(), json!({"a": null, "b": null, "c": "keep"}));
    }

    #[test]
    fn test_dispose_resources_of_on_absent_target_is_noop() {
        let mut nothing = Value::Null;
        dispose_resources_of(&mut nothing, &[FieldKey::from("a")]).unwrap();
        assert_eq!(nothing, Value::Null);

        let mut undefined = Value::Undefined;
        dispose_resources_of(&mut undefined, &[FieldKey::from("a")]).unwrap();
        assert_eq!(undefined, Value::Undefined);
    }

    #[test]
    fn test_dispose_resources_of_cascades_in_order() {
        let order: Rc<RefCell<Vec<&'static str>>> = Rc::new(RefCell::new(Vec::new()));
        let cap = Rc::new(Capability::<DisposableObject>::new());
        let mut record = Record::new();
        for name in ["first", "second", "third"] {
            let seen = Rc::clone(&order);
            let nested_cap = Rc::new(Capability::<DisposableObject>::new().with_finalize(move |_host| {
                seen.borrow_mut().push(name);
                Ok(())
            }));
            record.set(name, DisposableObject::new(&nested_cap).into_ref());
        }
        let mut host = DisposableObject::with_fields(&cap, record);

        dispose_resources_of(&mut host, &[FieldKey::from("third"), FieldKey::from("first")]).unwrap();

        assert_eq!(*order.borrow(), vec!["third", "first"]);
        assert!(!is_disposed_of(host.get("second").unwrap()));
        // Field disposal alone does not flip the host's own flag.
        assert!(!host.is_disposed());
    }

    #[test]
    fn test_dispose_instance_on_disposable() {
        let count = Rc::new(Cell::new(0));
        let mut value = Value::Disposable(counter(&count));

        dispose_instance(&mut value).unwrap();
        dispose_instance(&mut value).unwrap();

        assert_eq!(count.get(), 1);
        assert!(is_disposed_of(&value));
    }

    #[test]
    fn test_dispose_instance_on_plain_object() {
        let count = Rc::new(Cell::new(0));
        let mut record = Record::from_json(json!({"name": "cache", "entries": [1, 2]})).unwrap();
        record.set("conn", counter(&count));
        let mut value = Value::Object(record);

        dispose_instance(&mut value).unwrap();
        assert_eq!(count.get(), 1);
        assert_eq!(value.to_json(), json!({"name": null, "entries": null, "conn": null}));

        dispose_instance(&mut value).unwrap();
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_dispose_instance_on_array() {
        let count = Rc::new(Cell::new(0));
        let mut value = Value::Array(vec![Value::from(1), Value::Disposable(counter(&count)), Value::from("s")]);

        dispose_instance(&mut value).unwrap();

        assert_eq!(count.get(), 1);
        assert_eq!(value, Value::Array(vec![Value::Null, Value::Null, Value::Null]));
    }

    #[test]
    fn test_dispose_instance_on_scalars() {
        for mut value in [Value::Null, Value::Undefined, Value::from(3), Value::from("text"), Value::from(true)] {
            let before = value.clone();
            dispose_instance(&mut value).unwrap();
            assert_eq!(value, before);
        }
    }

    #[test]
    fn test_is_disposed_of() {
        assert!(is_disposed_of(&Value::Null));
        assert!(is_disposed_of(&Value::Undefined));
        assert!(!is_disposed_of(&Value::from(0)));
        assert!(!is_disposed_of(&Value::from("")));
        assert!(!is_disposed_of(&Value::Object(Record::new())));

        let cap = Rc::new(Capability::<DisposableObject>::new());
        let obj = DisposableObject::new(&cap).into_ref();
        let value = Value::Disposable(obj.clone());
        assert!(!is_disposed_of(&value));
        obj.borrow_mut().dispose().unwrap();
        assert!(is_disposed_of(&value));
    }

    #[test]
    fn test_is_disposed_of_ignores_unrelated_borrow() {
        let cap = Rc::new(Capability::<DisposableObject>::new());
        let obj = DisposableObject::new(&cap).into_ref();
        let value = Value::Disposable(obj.clone());

        let _guard = obj.borrow_mut();
        assert!(!is_disposed_of(&value));
    }

    #[test]
    fn test_is_disposed_of_while_disposal_in_progress() {
        let observed: Rc<RefCell<Vec<bool>>> = Rc::new(RefCell::new(Vec::new()));
        let parent_slot: Rc<RefCell<Value>> = Rc::new(RefCell::new(Value::Undefined));

        let seen = Rc::clone(&observed);
        let slot = Rc::clone(&parent_slot);
        let child_cap = Rc::new(Capability::<DisposableObject>::new().with_finalize(move |_host| {
            seen.borrow_mut().push(is_disposed_of(&slot.borrow()));
            Ok(())
        }));
        let cap = Rc::new(Capability::<DisposableObject>::new());
        let child = DisposableObject::new(&child_cap).into_ref();
        let parent = Rc::new(RefCell::new(DisposableObject::new(&cap)));
        parent.borrow_mut().set("child", Value::Disposable(child));
        *parent_slot.borrow_mut() = Value::Disposable(parent.clone());

        parent.borrow_mut().dispose().unwrap();

        assert_eq!(*observed.borrow(), vec![true]);
        *parent_slot.borrow_mut() = Value::Null;
    }

    #[test]
    fn test_dispose_resources_of_array_does_not_grow() {
        let mut value = Value::Array(vec![Value::from(1), Value::from(2)]);

        dispose_resources_of(&mut value, &[FieldKey::from("1"), FieldKey::from("5")]).unwrap();

        assert_eq!(value, Value::Array(vec![Value::from(1), Value::Null]));
    }

    #[test]
    fn test_is_capability_bearing() {
        let count = Rc::new(Cell::new(0));
        assert!(is_capability_bearing(&Value::Disposable(counter(&count))));
        assert!(!is_capability_bearing(&Value::Null));
        assert!(!is_capability_bearing(&Value::Undefined));
        assert!(!is_capability_bearing(&Value::from(1)));
        assert!(!is_capability_bearing(&Value::from(json!({"dispose": true, "isDisposed": true}))));
    }

    #[test]
    fn test_json_snapshot_of_disposable() {
        let count = Rc::new(Cell::new(0));
        let nested = counter(&count);
        let mut record = Record::new();
        record.set("conn", nested.clone());
        record.set("secret", "hidden");
        record.set_non_enumerable("secret");
        let value = Value::Object(record);

        assert_eq!(value.to_json(), json!({"conn": {"disposed": false}}));
        nested.borrow_mut().dispose().unwrap();
        assert_eq!(value.to_json(), json!({"conn": {"disposed": true}}));
    }

    #[test]
    fn test_record_from_json_rejects_non_objects() {
        let err = Record::from_json(json!([1, 2])).unwrap_err();
        assert_eq!(err, DisposeError::Custom("expected a JSON object, got array".to_string()));
    }
}
