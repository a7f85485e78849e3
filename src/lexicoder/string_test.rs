use super::*;

#[test]
fn round_trips() {
    let c = StringCoder::utf8();
    let v = Value::Str("hello".to_string());
    let enc = c.encode(&v).unwrap();
    assert_eq!(c.decode(&enc).unwrap(), v);
}

#[test]
fn rejects_empty() {
    let c = StringCoder::utf8();
    assert!(c.encode(&Value::Str(String::new())).is_err());
    assert!(c.decode(&[]).is_err());
}

#[test]
fn order_matches_str_order() {
    let c = StringCoder::utf8();
    let a = c.encode(&Value::Str("abc".into())).unwrap();
    let b = c.encode(&Value::Str("abd".into())).unwrap();
    assert!(a < b);
}

#[test]
fn charset_param_round_trips_config() {
    let c = StringCoder::with_charset("latin1".to_string());
    assert_eq!(c.config(), "string(latin1)");
}
