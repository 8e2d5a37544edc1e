//! Tree Tests
//!
//! Tests verify:
//! - Query/add/remove semantics
//! - Duplicate and missing key handling
//! - Length validation errors
//! - BST ordering after every kind of removal
//! - Dump format
//! - Teardown

use treekv::{KvError, Tree};

// =============================================================================
// Helper Functions
// =============================================================================

fn keys(tree: &Tree) -> Vec<String> {
    tree.entries().into_iter().map(|(k, _)| k).collect()
}

fn assert_sorted(tree: &Tree) {
    let keys = keys(tree);
    for pair in keys.windows(2) {
        assert!(pair[0] < pair[1], "out of order: {:?}", pair);
    }
}

fn dump_to_string(tree: &Tree) -> String {
    let mut out = Vec::new();
    tree.dump(&mut out).unwrap();
    String::from_utf8(out).unwrap()
}

fn build(pairs: &[(&str, &str)]) -> Tree {
    let tree = Tree::new();
    for (k, v) in pairs {
        tree.add(k, v).unwrap();
    }
    tree
}

// =============================================================================
// Basic Operations Tests
// =============================================================================

#[test]
fn test_new_tree_is_empty() {
    let tree = Tree::new();
    assert!(tree.is_empty());
    assert_eq!(tree.len(), 0);
    assert!(tree.entries().is_empty());
}

#[test]
fn test_add_and_query() {
    let tree = Tree::new();
    tree.add("key1", "value1").unwrap();

    assert_eq!(tree.query("key1").unwrap(), "value1");
    assert_eq!(tree.len(), 1);
    assert!(!tree.is_empty());
}

#[test]
fn test_query_missing_key() {
    let tree = build(&[("m", "1")]);
    assert!(matches!(tree.query("a"), Err(KvError::KeyNotFound)));
    assert!(matches!(tree.query("z"), Err(KvError::KeyNotFound)));
}

#[test]
fn test_add_duplicate_keeps_first_value() {
    let tree = Tree::new();
    tree.add("k", "v1").unwrap();

    assert!(matches!(tree.add("k", "v2"), Err(KvError::DuplicateKey)));
    assert_eq!(tree.query("k").unwrap(), "v1");
    assert_eq!(tree.len(), 1);
}

#[test]
fn test_remove_then_query() {
    let tree = build(&[("a", "1"), ("b", "2")]);
    tree.remove("a").unwrap();

    assert!(matches!(tree.query("a"), Err(KvError::KeyNotFound)));
    assert_eq!(tree.query("b").unwrap(), "2");
}

#[test]
fn test_remove_missing_leaves_tree_unchanged() {
    let tree = build(&[("m", "1"), ("c", "2"), ("t", "3")]);
    let before = dump_to_string(&tree);

    assert!(matches!(tree.remove("q"), Err(KvError::KeyNotFound)));
    assert_eq!(dump_to_string(&tree), before);
}

#[test]
fn test_remove_from_empty_tree() {
    let tree = Tree::new();
    assert!(matches!(tree.remove("x"), Err(KvError::KeyNotFound)));
}

#[test]
fn test_readd_after_remove() {
    let tree = build(&[("k", "old")]);
    tree.remove("k").unwrap();
    tree.add("k", "new").unwrap();
    assert_eq!(tree.query("k").unwrap(), "new");
}

// =============================================================================
// Validation Tests
// =============================================================================

#[test]
fn test_key_too_long_is_not_duplicate() {
    let tree = Tree::with_max_len(8);
    let long = "k".repeat(9);

    match tree.add(&long, "v") {
        Err(KvError::KeyTooLong { len, max }) => {
            assert_eq!(len, 9);
            assert_eq!(max, 8);
        }
        other => panic!("expected KeyTooLong, got {:?}", other),
    }
    assert!(tree.is_empty());
}

#[test]
fn test_value_too_long() {
    let tree = Tree::with_max_len(8);
    assert!(matches!(
        tree.add("k", &"v".repeat(9)),
        Err(KvError::ValueTooLong { len: 9, max: 8 })
    ));
    assert!(matches!(tree.query("k"), Err(KvError::KeyNotFound)));
}

#[test]
fn test_lengths_at_bound_are_accepted() {
    let tree = Tree::new();
    let key = "k".repeat(256);
    let value = "v".repeat(256);
    tree.add(&key, &value).unwrap();
    assert_eq!(tree.query(&key).unwrap(), value);
    assert_eq!(tree.max_len(), 256);
}

#[test]
fn test_empty_key_rejected() {
    let tree = Tree::new();
    assert!(matches!(tree.add("", "v"), Err(KvError::IllFormed(_))));
    assert!(matches!(tree.query(""), Err(KvError::IllFormed(_))));
    assert!(matches!(tree.remove(""), Err(KvError::IllFormed(_))));
}

// =============================================================================
// Removal Shape Tests
// =============================================================================

#[test]
fn test_remove_leaf() {
    let tree = build(&[("b", "1"), ("a", "2"), ("c", "3")]);
    tree.remove("a").unwrap();
    assert_eq!(keys(&tree), vec!["b", "c"]);
}

#[test]
fn test_remove_node_with_only_left_child() {
    let tree = build(&[("d", "1"), ("b", "2"), ("a", "3")]);
    tree.remove("b").unwrap();
    assert_eq!(keys(&tree), vec!["a", "d"]);
    assert_eq!(tree.query("a").unwrap(), "3");
}

#[test]
fn test_remove_node_with_only_right_child() {
    let tree = build(&[("b", "1"), ("d", "2"), ("e", "3")]);
    tree.remove("d").unwrap();
    assert_eq!(keys(&tree), vec!["b", "e"]);
}

#[test]
fn test_remove_two_children_successor_is_right_child() {
    let tree = build(&[("b", "1"), ("a", "2"), ("c", "3")]);
    tree.remove("b").unwrap();

    assert_eq!(keys(&tree), vec!["a", "c"]);
    assert_eq!(dump_to_string(&tree), "(root)\n (null)\n c 3\n  a 2\n   (null)\n   (null)\n  (null)\n");
}

#[test]
fn test_remove_two_children_successor_deep_in_left_spine() {
    //        m
    //      /   \
    //     c     t
    //          / \
    //         p   w
    //          \
    //           q
    let tree = build(&[("m", "1"), ("c", "2"), ("t", "3"), ("p", "4"), ("w", "5"), ("q", "6")]);
    tree.remove("m").unwrap();

    assert_eq!(keys(&tree), vec!["c", "p", "q", "t", "w"]);
    // `p` takes m's place; its right child `q` moves up under `t`.
    assert_eq!(
        dump_to_string(&tree),
        "(root)\n (null)\n p 4\n  c 2\n   (null)\n   (null)\n  t 3\n   q 6\n    (null)\n    (null)\n   w 5\n    (null)\n    (null)\n"
    );
    assert_eq!(tree.query("q").unwrap(), "6");
}

#[test]
fn test_sorted_after_mixed_operations() {
    let tree = Tree::new();
    let words = [
        "pear", "apple", "zebra", "mango", "kiwi", "banana", "cherry", "date", "fig", "grape", "lemon",
        "nut", "olive", "plum", "quince",
    ];
    for (i, w) in words.iter().enumerate() {
        tree.add(w, &i.to_string()).unwrap();
    }
    for w in ["pear", "banana", "zebra", "mango", "apple"] {
        tree.remove(w).unwrap();
        assert_sorted(&tree);
    }
    assert_eq!(tree.len(), words.len() - 5);
}

// =============================================================================
// Dump Tests
// =============================================================================

#[test]
fn test_dump_empty_tree() {
    let tree = Tree::new();
    assert_eq!(dump_to_string(&tree), "(root)\n (null)\n (null)\n");
}

#[test]
fn test_dump_preorder_indented() {
    let tree = build(&[("b", "1"), ("a", "2"), ("c", "3")]);
    let expected = "\
(root)
 (null)
 b 1
  a 2
   (null)
   (null)
  c 3
   (null)
   (null)
";
    assert_eq!(dump_to_string(&tree), expected);
}

// =============================================================================
// Teardown Tests
// =============================================================================

#[test]
fn test_teardown_frees_all_nodes() {
    let tree = build(&[("b", "1"), ("a", "2"), ("c", "3"), ("d", "4")]);
    assert_eq!(tree.teardown(), 4);
    assert!(tree.is_empty());
    assert_eq!(dump_to_string(&tree), "(root)\n (null)\n (null)\n");
}

#[test]
fn test_tree_usable_after_teardown() {
    let tree = build(&[("a", "1")]);
    tree.teardown();
    tree.add("a", "2").unwrap();
    assert_eq!(tree.query("a").unwrap(), "2");
}

#[test]
fn test_teardown_of_degenerate_tree() {
    // Sorted inserts build a list; teardown must not recurse per level.
    let tree = Tree::new();
    for i in 0..5_000 {
        tree.add(&format!("{:08}", i), "v").unwrap();
    }
    assert_eq!(tree.teardown(), 5_000);
}
