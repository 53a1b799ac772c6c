//! GC Correctness Tests - Reachability and Reclamation
//!
//! These tests verify that the collector:
//! - Reclaims unreachable objects
//! - Preserves everything reachable from roots and pinned handles
//! - Traces through every object kind
//! - Reports reclaimed references as stale

mod common;

use common::{assert_live, assert_reclaimed, read_ints, GcFixture};
use lama_gc::{GcError, ObjectBody, Value};

#[test]
fn test_unreachable_objects_collected() {
    let mut fixture = GcFixture::manual();
    let garbage = fixture.garbage(|f| f.int_array(&[1, 2, 3]));

    let report = fixture.collect();

    assert_eq!(report.freed_objects, 1);
    assert_eq!(report.live_objects, 0);
    assert_reclaimed(&fixture.gc, garbage, "unscoped array");
}

#[test]
fn test_reachable_through_every_kind() {
    let mut fixture = GcFixture::manual();
    let root = fixture.garbage(|f| {
        let text = f.string("leaf");
        let inner = f.array(vec![text]);
        let sexp = f
            .gc
            .allocate(ObjectBody::Sexp {
                tag: Value::box_wrapping(42),
                fields: vec![inner],
            })
            .unwrap();
        let closure = f
            .gc
            .allocate(ObjectBody::Closure {
                entry: Value::box_wrapping(0x1000),
                captures: vec![sexp],
            })
            .unwrap();
        f.gc.register_root(closure).unwrap();
        closure
    });

    let report = fixture.collect();

    assert_eq!(report.freed_objects, 0);
    assert_eq!(report.live_objects, 4);
    assert_live(&fixture.gc, root, "registered closure");
}

#[test]
fn test_cyclic_garbage_collected() {
    let mut fixture = GcFixture::manual();
    let (a, b) = {
        let mark = fixture.gc.open_scope();
        let a = fixture.array(vec![Value::ZERO]);
        let b = fixture.array(vec![a]);
        fixture
            .gc
            .update(a, |body| {
                if let ObjectBody::Array(items) = body {
                    items[0] = b;
                }
                Ok(())
            })
            .unwrap();
        fixture.gc.close_scope(mark).unwrap();
        (a, b)
    };

    let report = fixture.collect();

    assert_eq!(report.freed_objects, 2);
    assert_reclaimed(&fixture.gc, a, "cycle member a");
    assert_reclaimed(&fixture.gc, b, "cycle member b");
}

#[test]
fn test_contents_survive_collection() {
    let mut fixture = GcFixture::manual();
    let array = fixture.int_array(&[3, 1, 2, 3]);

    for _ in 0..3 {
        fixture.garbage(|f| f.int_array(&[9; 16]));
        fixture.collect();
    }

    assert_eq!(read_ints(&fixture.gc, array).unwrap(), vec![3, 1, 2, 3]);
}

#[test]
fn test_slot_reuse_does_not_alias() {
    let mut fixture = GcFixture::manual();
    let old = fixture.garbage(|f| f.int_array(&[1]));
    fixture.collect();

    let new = fixture.int_array(&[2]);

    assert_eq!(old.as_ref().unwrap().index, new.as_ref().unwrap().index);
    assert_ne!(old, new);
    assert_reclaimed(&fixture.gc, old, "reused slot");
    assert_eq!(read_ints(&fixture.gc, new).unwrap(), vec![2]);
}

#[test]
fn test_dangling_word_rejected() {
    let fixture = GcFixture::manual();
    let bogus = Value::from_raw(0x0000_0001_0000_0100);

    assert!(matches!(
        fixture.gc.get(bogus),
        Err(GcError::InvalidReference { .. })
    ));
    assert!(matches!(
        fixture.gc.get(Value::box_wrapping(5)),
        Err(GcError::UnexpectedValue { .. })
    ));
}

#[test]
fn test_repeated_collection_is_stable() {
    let mut fixture = GcFixture::manual();
    let keep = fixture.int_array(&[7]);

    let first = fixture.collect();
    let second = fixture.collect();

    assert_eq!(first.live_objects, second.live_objects);
    assert_eq!(second.freed_objects, 0);
    assert_eq!(second.cycle, 2);
    assert_live(&fixture.gc, keep, "pinned array");
}
