use super::*;
use pretty_assertions::assert_eq;

#[test]
fn kinds_have_user_facing_names() {
    assert_eq!(Value::Float(1.0).kind().as_str(), "float");
    assert_eq!(Value::from("s").kind().as_str(), "string");
    assert_eq!(Value::Bool(true).kind().as_str(), "bool");
    assert_eq!(Value::array(vec![]).kind().as_str(), "array");
    assert_eq!(Value::Void.kind().as_str(), "void");
}

#[test]
fn equality_is_structural() {
    let a = Value::array(vec![Value::Float(1.0), Value::from("x")]);
    let b = Value::array(vec![Value::Float(1.0), Value::from("x")]);
    assert_eq!(a, b);
    assert_ne!(a, Value::array(vec![Value::Float(1.0)]));
    assert_ne!(Value::Float(f64::NAN), Value::Float(f64::NAN));
}

#[test]
fn display_matches_println_output() {
    assert_eq!(Value::Float(5.0).to_string(), "5");
    assert_eq!(Value::Float(2.5).to_string(), "2.5");
    assert_eq!(Value::from("hi").to_string(), "hi");
    let nested = Value::array(vec![Value::Float(1.0), Value::array(vec![Value::Bool(false)])]);
    assert_eq!(nested.to_string(), "[1 [false]]");
}

#[test]
fn accessors_reject_other_kinds() {
    assert_eq!(Value::Float(3.0).as_float(), Some(3.0));
    assert_eq!(Value::Bool(true).as_float(), None);
    assert_eq!(Value::from("a").as_bool(), None);
    assert_eq!(Value::from("a").as_str(), Some("a"));
    assert!(Value::Void.as_array().is_none());
}

#[test]
fn values_are_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Value>();
}
