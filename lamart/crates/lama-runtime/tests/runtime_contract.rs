//! Runtime Contract Tests - initialize, box, unbox, make_array, element_at

mod common;

use common::{b, manual_runtime};
use lama_runtime::{box_int, unbox, RuntimeError, Value};
use quickcheck_macros::quickcheck;

#[test]
fn test_element_at_of_fresh_array() -> anyhow::Result<()> {
    let mut rt = manual_runtime();

    let array = rt.make_array(box_int(3)?, &[box_int(1)?, box_int(2)?, box_int(3)?])?;
    let second = rt.element_at(array, box_int(1)?)?;

    assert_eq!(unbox(second)?, 2);
    Ok(())
}

#[test]
fn test_box_unbox_edges() -> anyhow::Result<()> {
    for n in [0, 1, -1, -2, Value::MIN_INT, Value::MAX_INT] {
        assert_eq!(unbox(box_int(n)?)?, n, "round trip of {}", n);
    }
    assert_eq!(box_int(0)?.raw(), 1);
    assert_eq!(box_int(3)?.raw(), 7);
    assert_eq!(box_int(-1)?.raw(), -1);
    Ok(())
}

#[test]
fn test_box_out_of_range() {
    assert!(box_int(Value::MAX_INT + 1).is_err());
    assert!(box_int(Value::MIN_INT - 1).is_err());
}

#[test]
fn test_unbox_reference_fails() -> anyhow::Result<()> {
    let mut rt = manual_runtime();
    let array = rt.make_array(b(0), &[])?;

    assert!(matches!(unbox(array), Err(RuntimeError::Gc(_))));
    Ok(())
}

#[test]
fn test_elements_keep_order() -> anyhow::Result<()> {
    let mut rt = manual_runtime();
    let items: Vec<Value> = (0..10).map(|i| b(i * i)).collect();
    let array = rt.make_array(b(10), &items)?;

    for (i, expected) in items.iter().enumerate() {
        assert_eq!(rt.element_at(array, b(i as i64))?, *expected);
    }
    Ok(())
}

#[test]
fn test_arrays_are_independent() -> anyhow::Result<()> {
    let mut rt = manual_runtime();
    let first = rt.make_array(b(1), &[b(10)])?;
    let second = rt.make_array(b(1), &[b(20)])?;

    assert_ne!(first, second);
    rt.store_element(first, b(0), b(11))?;
    assert_eq!(unbox(rt.element_at(second, b(0))?)?, 20);
    Ok(())
}

#[test]
fn test_out_of_bounds() -> anyhow::Result<()> {
    let mut rt = manual_runtime();
    let array = rt.make_array(b(3), &[b(3), b(1), b(2)])?;

    for index in [3, 4, -1, Value::MAX_INT] {
        match rt.element_at(array, b(index)) {
            Err(RuntimeError::IndexOutOfRange { index: i, length }) => {
                assert_eq!(i, index);
                assert_eq!(length, 3);
            }
            other => panic!("index {} should be out of range, got {:?}", index, other),
        }
    }
    Ok(())
}

#[test]
fn test_count_must_match() -> anyhow::Result<()> {
    let mut rt = manual_runtime();

    assert!(matches!(
        rt.make_array(b(4), &[b(1), b(2), b(3)]),
        Err(RuntimeError::ArityMismatch {
            declared: 4,
            provided: 3
        })
    ));

    let not_a_count = rt.make_array(b(0), &[])?;
    assert!(matches!(
        rt.make_array(not_a_count, &[]),
        Err(RuntimeError::UnexpectedValue { .. })
    ));
    Ok(())
}

#[quickcheck]
fn prop_box_unbox_identity(n: i64) -> bool {
    let n = n >> 1;
    matches!(box_int(n).and_then(unbox), Ok(m) if m == n)
}

#[quickcheck]
fn prop_element_at_returns_stored(items: Vec<i32>, pick: usize) -> bool {
    if items.is_empty() {
        return true;
    }
    let mut rt = manual_runtime();
    let boxed: Vec<Value> = items.iter().map(|&n| b(n as i64)).collect();
    let array = match rt.make_array(b(boxed.len() as i64), &boxed) {
        Ok(array) => array,
        Err(_) => return false,
    };
    let i = pick % items.len();
    matches!(
        rt.element_at(array, b(i as i64)).and_then(unbox),
        Ok(n) if n == items[i] as i64
    )
}
