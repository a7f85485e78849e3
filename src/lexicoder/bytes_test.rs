use super::*;

#[test]
fn round_trips() {
    let c = BytesCoder;
    let v = Value::Bytes(vec![1, 2, 3]);
    let enc = c.encode(&v).unwrap();
    assert_eq!(c.decode(&enc).unwrap(), v);
}

#[test]
fn rejects_empty_both_ways() {
    let c = BytesCoder;
    assert!(c.encode(&Value::Bytes(vec![])).is_err());
    assert!(c.decode(&[]).is_err());
}

#[test]
fn config_round_trips() {
    let c = BytesCoder;
    assert_eq!(c.config(), "bytes");
}
