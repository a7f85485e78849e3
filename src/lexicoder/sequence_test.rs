use super::*;
use crate::lexicoder::LongCoder;

fn coder() -> SequenceCoder {
    SequenceCoder::new(Box::new(LongCoder))
}

#[test]
fn round_trips() {
    let c = coder();
    let v = Value::Seq(vec![Value::Long(1), Value::Long(2), Value::Long(3)]);
    let enc = c.encode(&v).unwrap();
    assert_eq!(c.decode(&enc).unwrap(), v);
}

#[test]
fn empty_sequence_encodes_empty() {
    let c = coder();
    let enc = c.encode(&Value::Seq(vec![])).unwrap();
    assert!(enc.is_empty());
}

#[test]
fn element_wise_order_preserved() {
    let c = coder();
    let a = c
        .encode(&Value::Seq(vec![Value::Long(1), Value::Long(2)]))
        .unwrap();
    let b = c
        .encode(&Value::Seq(vec![Value::Long(1), Value::Long(3)]))
        .unwrap();
    assert!(a < b);
}

#[test]
fn shorter_prefix_sorts_first() {
    let c = coder();
    let short = c.encode(&Value::Seq(vec![Value::Long(1)])).unwrap();
    let long = c
        .encode(&Value::Seq(vec![Value::Long(1), Value::Long(0)]))
        .unwrap();
    assert!(short < long);
}
