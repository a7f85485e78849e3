use super::*;
use crate::lexicoder::{LongCoder, StringCoder};

fn coder() -> TupleCoder {
    TupleCoder::new(vec![Box::new(StringCoder::utf8()), Box::new(LongCoder)])
}

#[test]
fn round_trips() {
    let c = coder();
    let v = Value::Tuple(vec![Value::Str("a".into()), Value::Long(2)]);
    let enc = c.encode(&v).unwrap();
    assert_eq!(c.decode(&enc).unwrap(), v);
}

#[test]
fn rejects_wrong_arity_encode() {
    let c = coder();
    let v = Value::Tuple(vec![Value::Str("a".into())]);
    assert!(c.encode(&v).is_err());
}

#[test]
fn scenario_tuple_ordering() {
    // spec.md §8 scenario 5
    let c = coder();
    let a = c
        .encode(&Value::Tuple(vec![Value::Str("a".into()), Value::Long(2)]))
        .unwrap();
    let b = c
        .encode(&Value::Tuple(vec![Value::Str("a".into()), Value::Long(3)]))
        .unwrap();
    let d = c
        .encode(&Value::Tuple(vec![Value::Str("b".into()), Value::Long(0)]))
        .unwrap();
    assert!(a < b);
    assert!(b < d);
}

#[test]
fn config_round_trips_through_factory() {
    use crate::lexicoder::from_config;
    let c = coder();
    let tag = c.config();
    assert_eq!(tag, "tuple(string|long)");
    let rebuilt = from_config(&tag).unwrap();
    let v = Value::Tuple(vec![Value::Str("z".into()), Value::Long(9)]);
    assert_eq!(rebuilt.decode(&rebuilt.encode(&v).unwrap()).unwrap(), v);
}
