use super::*;

#[test]
fn factory_dispatches_known_tags() {
    for tag in ["bytes", "string", "long", "double", "instant"] {
        assert!(from_config(tag).is_ok(), "tag {} should resolve", tag);
    }
}

#[test]
fn factory_rejects_unknown_tag() {
    assert!(from_config("frobnicate").is_err());
}

#[test]
fn factory_rejects_wrong_arity() {
    assert!(from_config("bytes(x)").is_err());
    assert!(from_config("sequence()").is_err());
    assert!(from_config("tuple()").is_err());
}

#[test]
fn factory_builds_nested_composites() {
    let tag = "tuple(sequence(long)|reverse(string))";
    let coder = from_config(tag).unwrap();
    assert_eq!(coder.config(), tag);
}

#[test]
fn escape_round_trips() {
    let src = vec![0x00, 0x01, 0x02, 0xff];
    let mut buf = vec![];
    escape(&src, &mut buf);
    assert_eq!(unescape(&buf).unwrap(), src);
}

#[test]
fn join_split_round_trips() {
    let elems = vec![vec![1u8, 2], vec![], vec![3, 0, 1]]
        .into_iter()
        .map(|raw| {
            let mut buf = vec![];
            escape(&raw, &mut buf);
            buf
        })
        .collect::<Vec<_>>();
    let joined = join_escaped(&elems);
    let split = split_escaped(&joined).unwrap();
    let unescaped: Vec<Vec<u8>> = split;
    assert_eq!(unescaped, vec![vec![1u8, 2], vec![], vec![3, 0, 1]]);
}
