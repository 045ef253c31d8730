/// Builds a [`Value`](crate::Value) from a JSON-like literal.
///
/// Object keys are inserted in the order they are written.
///
/// ```rust
/// use serde_ordered::{ordered, to_string};
///
/// let value = ordered!({
///     "name": "serde_ordered",
///     "tags": ["json", "yaml"],
///     "stable": true,
///     "parent": null
/// });
/// assert_eq!(
///     to_string(&value).unwrap(),
///     r#"{"name":"serde_ordered","tags":["json","yaml"],"stable":true,"parent":null}"#
/// );
/// ```
#[macro_export]
macro_rules! ordered {
    (null) => {
        $crate::Value::<::std::string::String>::Null
    };

    (true) => {
        $crate::Value::<::std::string::String>::Bool(true)
    };

    (false) => {
        $crate::Value::<::std::string::String>::Bool(false)
    };

    ([]) => {
        $crate::Value::<::std::string::String>::Array(vec![])
    };

    ([ $($elem:tt),* $(,)? ]) => {
        $crate::Value::<::std::string::String>::Array(vec![$($crate::ordered!($elem)),*])
    };

    ({}) => {
        $crate::Value::<::std::string::String>::Object($crate::OrderedMap::new())
    };

    ({ $($key:literal : $value:tt),* $(,)? }) => {{
        let mut object = $crate::OrderedMap::new();
        $(
            object.insert($key.to_string(), $crate::ordered!($value));
        )*
        $crate::Value::<::std::string::String>::Object(object)
    }};

    // Any other expression goes through its `Serialize` impl.
    ($s:expr) => {
        $crate::to_value::<_, ::std::string::String>(&$s)
            .unwrap_or($crate::Value::<::std::string::String>::Null)
    };
}

#[cfg(test)]
mod tests {
    use crate::{Number, OrderedMap, Value};

    #[test]
    fn test_ordered_macro_primitives() {
        assert_eq!(ordered!(null), Value::Null);
        assert_eq!(ordered!(true), Value::Bool(true));
        assert_eq!(ordered!(42), Value::Number(Number::Integer(42)));
        assert_eq!(ordered!(-7), Value::Number(Number::Integer(-7)));
        assert_eq!(ordered!(3.5), Value::Number(Number::Float(3.5)));
        assert_eq!(ordered!("hello"), Value::String("hello".to_string()));
    }

    #[test]
    fn test_ordered_macro_keeps_key_order() {
        let obj = ordered!({
            "zebra": 1,
            "apple": [1, "two", null],
            "mango": {}
        });

        let map = obj.as_object().unwrap();
        let keys: Vec<_> = map.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["zebra", "apple", "mango"]);
        assert_eq!(map.get("mango"), Some(&Value::Object(OrderedMap::new())));
    }
}
