//! End-to-end MHashTree scenarios at realistic sizes.

use vellum_mutable::MHashTree;

fn scenario_key(i: usize) -> String {
    format!("Key {}, squared is {}", i, i * i)
}

#[test]
fn empty_tree() {
    let tree: MHashTree<i32> = MHashTree::new();
    assert_eq!(tree.count(), 0);
    assert!(tree.get("foo").is_none());

    let mut tree = tree;
    assert!(!tree.remove("foo"));
}

#[test]
fn tiny_insert() {
    let mut tree = MHashTree::new();
    tree.insert("foo", 123);
    assert_eq!(tree.get("foo"), Some(&123));
    assert_eq!(tree.count(), 1);

    let mut dump = Vec::new();
    tree.dump(&mut dump).unwrap();
    assert!(!dump.is_empty());
}

#[test]
fn tiny_remove() {
    let mut tree = MHashTree::new();
    tree.insert("foo", 123);
    assert!(tree.remove("foo"));
    assert!(tree.get("foo").is_none());
    assert_eq!(tree.count(), 0);
}

#[test]
fn bigger_insert() {
    const N: usize = 1000;
    let keys: Vec<String> = (0..N).map(scenario_key).collect();

    let mut tree = MHashTree::new();
    for (i, key) in keys.iter().enumerate() {
        tree.insert(key.as_bytes(), (i + 1) as i64);
        assert_eq!(tree.count(), i + 1);
    }
    for (i, key) in keys.iter().enumerate() {
        assert_eq!(tree.get(key.as_bytes()), Some(&((i + 1) as i64)));
    }
}

#[test]
fn bigger_remove() {
    const N: usize = 10_000;
    let keys: Vec<String> = (0..N).map(scenario_key).collect();

    let mut tree = MHashTree::new();
    for (i, key) in keys.iter().enumerate() {
        tree.insert(key.as_bytes(), (i + 1) as i64);
    }
    for i in (0..N).step_by(3) {
        assert!(tree.remove(keys[i].as_bytes()));
    }
    for (i, key) in keys.iter().enumerate() {
        let expected = if i % 3 == 0 { None } else { Some((i + 1) as i64) };
        assert_eq!(tree.get(key.as_bytes()).copied(), expected);
    }
    assert_eq!(tree.count(), N - 1 - N / 3);
}

#[test]
fn count_matches_reachable_entries() {
    let mut tree = MHashTree::new();
    for i in 0..500 {
        tree.insert(scenario_key(i), i);
    }
    for i in (0..500).step_by(7) {
        tree.remove(scenario_key(i).as_bytes());
    }
    // Re-insert some removed keys, overwrite some survivors.
    for i in (0..500).step_by(14) {
        tree.insert(scenario_key(i), -1);
    }

    let mut reachable = 0;
    tree.for_each(|key, value| {
        reachable += 1;
        let text = std::str::from_utf8(key).unwrap();
        assert!(text.starts_with("Key "));
        assert!(*value >= -1);
    });
    assert_eq!(reachable, tree.count());
}

#[test]
fn remove_reports_presence() {
    let mut tree = MHashTree::new();
    tree.insert("present", 1u64);
    assert!(tree.remove("present"));
    assert!(!tree.remove("present"));
    assert!(!tree.remove("never-inserted"));
}
