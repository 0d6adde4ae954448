use super::*;

#[test]
fn allocate_and_index() {
    let mut heap = Heap::new(16);
    let n = heap.integer(3).unwrap();
    let s = heap.string("abc").unwrap();
    assert_eq!(heap.len(), 2);
    assert!(heap[n].is_number());
    assert!(heap[s].is_string());
}

#[test]
fn ceiling_counts_live_cells() {
    let mut heap = Heap::new(2);
    let a = heap.integer(1).unwrap();
    heap.integer(2).unwrap();
    assert_eq!(heap.integer(3), Err(OutOfMemory));

    let stats = heap.collect(vec![a]);
    assert_eq!(stats.swept, 1);
    assert!(heap.integer(4).is_ok());
}

#[test]
fn sweep_releases_unreachable() {
    let mut heap = Heap::new(16);
    let keep = heap.symbol("keep").unwrap();
    let drop = heap.symbol("drop").unwrap();
    let stats = heap.collect(vec![keep]);

    assert_eq!(stats, GcStats { marked: 1, swept: 1, live: 1 });
    assert!(heap.contains(keep));
    assert!(!heap.contains(drop));
    assert!(heap.get(drop).is_none());
}

#[test]
fn reused_slot_invalidates_stale_handle() {
    let mut heap = Heap::new(16);
    let old = heap.integer(1).unwrap();
    heap.collect(Vec::new());
    let new = heap.integer(2).unwrap();

    assert!(!heap.contains(old));
    assert!(heap.contains(new));
    assert!(old != new);
}

#[test]
#[should_panic]
fn indexing_a_swept_cell_panics() {
    let mut heap = Heap::new(16);
    let gone = heap.integer(1).unwrap();
    heap.collect(Vec::new());
    let _ = &heap[gone];
}

#[test]
fn mark_follows_lists_and_procedures() {
    let mut heap = Heap::new(64);
    let x = heap.symbol("x").unwrap();
    let formals = heap.list(vec![x]).unwrap();
    let body = heap.symbol("x").unwrap();
    let captured_value = heap.integer(9).unwrap();
    let name = heap.symbol("y").unwrap();
    let pair = heap.list(vec![name, captured_value]).unwrap();
    let procedure = heap
        .allocate(Cell::Procedure(Procedure {
            formals,
            body,
            captured: vec![pair].into_boxed_slice(),
        }))
        .unwrap();
    let root = heap.list(vec![procedure]).unwrap();
    heap.integer(100).unwrap();

    let stats = heap.collect(vec![root]);
    assert_eq!(stats.marked, 8);
    assert_eq!(stats.swept, 1);
    assert_eq!(heap.len(), 8);
}

#[test]
fn shared_structure_and_cycles() {
    let mut heap = Heap::new(64);
    let shared = heap.integer(1).unwrap();
    let a = heap.list(vec![shared, shared]).unwrap();
    let b = heap.list(vec![a, shared]).unwrap();
    if let Cell::List(ref mut elements) = heap[a] {
        elements.push(b);
    }

    let stats = heap.collect(vec![b, a]);
    assert_eq!(stats.marked, 3);
    assert_eq!(stats.swept, 0);

    // marks are cleared, so the next cycle sees everything again
    let again = heap.collect(vec![b]);
    assert_eq!(again.marked, 3);
}

#[test]
fn many_cycles_keep_registry_exact() {
    let mut heap = Heap::new(1024);
    let root = heap.list(Vec::new()).unwrap();
    for i in 0..50 {
        let n = heap.integer(i).unwrap();
        if i % 10 == 0 {
            if let Cell::List(ref mut elements) = heap[root] {
                elements.push(n);
            }
        }
        for _ in 0..5 {
            heap.string("garbage").unwrap();
        }
        heap.collect(vec![root]);
    }
    assert_eq!(heap.len(), 6);
}

#[test]
fn structural_equality() {
    let mut heap = Heap::new(64);
    let a1 = heap.integer(1).unwrap();
    let s1 = heap.symbol("s").unwrap();
    let l1 = heap.list(vec![a1, s1]).unwrap();
    let a2 = heap.integer(1).unwrap();
    let s2 = heap.symbol("s").unwrap();
    let l2 = heap.list(vec![a2, s2]).unwrap();
    let str_s = heap.string("s").unwrap();

    assert!(heap.equal(l1, l2));
    assert!(heap.equal(s1, s2));
    assert!(!heap.equal(s1, str_s));
    assert!(!heap.equal(a1, l1));
}
