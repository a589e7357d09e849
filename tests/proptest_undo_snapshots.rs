//! Property-based tests for the undo snapshot stack.

use contentmodel_rust::{Snapshot, Snapshots, UndoSnapshotsService};
use proptest::prelude::*;

// ============================================================================
// Strategies
// ============================================================================

#[derive(Clone, Debug)]
enum Op {
    /// Add a snapshot whose HTML is `<p>{n}</p>` padded to `len` bytes.
    Add { n: u8, len: usize },
    Move(isize),
}

fn html(n: u8, len: usize) -> String {
    let base = format!("<p>{n}</p>");
    let pad = len.saturating_sub(base.len());
    format!("{base}{}", "x".repeat(pad))
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (any::<u8>(), 0usize..40).prop_map(|(n, len)| Op::Add { n, len }),
        prop_oneof![Just(-1isize), Just(1isize)].prop_map(Op::Move),
    ]
}

/// Distinct HTML strings of varying size.
fn distinct_htmls() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(0usize..60, 1..40).prop_map(|lens| {
        lens.into_iter()
            .enumerate()
            .map(|(i, len)| format!("<p>{i}</p>{}", "y".repeat(len)))
            .collect()
    })
}

fn add(stack: &mut Snapshots, html: &str) {
    stack.add_snapshot(Snapshot::new(html), false);
}

// ============================================================================
// Cursor and stack properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// The cursor never leaves the stack, and moving never edits it.
    #[test]
    fn cursor_stays_in_bounds(ops in prop::collection::vec(op_strategy(), 0..60)) {
        let mut stack = Snapshots::new(1_000);
        for op in ops {
            match op {
                Op::Add { n, len } => add(&mut stack, &html(n, len)),
                Op::Move(step) => {
                    let before = stack.snapshots().to_vec();
                    let can_move = stack.can_move(step);
                    let moved = stack.move_by(step);
                    prop_assert_eq!(moved.is_some(), can_move);
                    prop_assert_eq!(stack.snapshots(), before.as_slice());
                }
            }
            match stack.current_index() {
                Some(index) => prop_assert!(index < stack.len()),
                None => prop_assert!(stack.is_empty()),
            }
        }
    }

    /// Size accounting holds after every add and eviction drops the oldest
    /// entries first.
    #[test]
    fn total_size_never_exceeds_max(htmls in distinct_htmls(), max_size in 20usize..200) {
        let mut stack = Snapshots::new(max_size);
        let mut accepted = Vec::new();
        for html in &htmls {
            add(&mut stack, html);
            if html.len() <= max_size {
                accepted.push(html.clone());
            }
            prop_assert!(stack.total_size() <= max_size);
            let sum: usize = stack.snapshots().iter().map(Snapshot::size).sum();
            prop_assert_eq!(stack.total_size(), sum);

            let kept: Vec<String> = stack.snapshots().iter().map(|s| s.html.clone()).collect();
            prop_assert!(accepted.ends_with(&kept));
            if !kept.is_empty() {
                prop_assert_eq!(stack.current_index(), Some(kept.len() - 1));
            }
        }
    }

    /// Adding identical HTML twice never grows the stack.
    #[test]
    fn identical_snapshot_collapses(htmls in distinct_htmls(), pick in any::<prop::sample::Index>()) {
        let mut stack = Snapshots::new(usize::MAX);
        for html in &htmls {
            add(&mut stack, html);
        }
        let len = stack.len();
        let top = stack.current().map(|s| s.html.clone()).unwrap();
        add(&mut stack, &top);
        prop_assert_eq!(stack.len(), len);

        // Also after moving the cursor back.
        let steps = pick.index(len);
        for _ in 0..steps {
            stack.move_by(-1);
        }
        let current = stack.current().map(|s| s.html.clone()).unwrap();
        add(&mut stack, &current);
        prop_assert_eq!(stack.len(), len);
    }

    /// One snapshot after the auto-complete one arms it; a second disarms.
    #[test]
    fn auto_complete_window_is_one_step(prefix in distinct_htmls()) {
        let mut stack = Snapshots::new(usize::MAX);
        for html in &prefix {
            add(&mut stack, html);
        }
        stack.add_snapshot(Snapshot::new("<p>auto</p>"), true);
        prop_assert!(!stack.can_undo_auto_complete());

        add(&mut stack, "<p>after auto</p>");
        prop_assert!(stack.can_undo_auto_complete());

        add(&mut stack, "<p>one more</p>");
        prop_assert!(!stack.can_undo_auto_complete());
    }
}

// ============================================================================
// Redo destruction
// ============================================================================

#[test]
fn test_adding_after_undo_discards_redo() {
    let mut stack = Snapshots::default();
    add(&mut stack, "A");
    add(&mut stack, "B");
    assert_eq!(stack.move_by(-1).map(|s| s.html), Some("A".to_string()));
    add(&mut stack, "C");

    assert!(!stack.can_move(1));
    assert!(stack.move_by(1).is_none());
    let htmls: Vec<&str> = stack.snapshots().iter().map(|s| s.html.as_str()).collect();
    assert_eq!(htmls, vec!["A", "C"]);
    assert_eq!(stack.total_size(), 2);
}

#[test]
fn test_oversized_snapshot_is_rejected() {
    let mut stack = Snapshots::new(4);
    add(&mut stack, "abc");
    add(&mut stack, "too large");
    assert_eq!(stack.len(), 1);
    assert_eq!(stack.current().map(|s| s.html.as_str()), Some("abc"));
}
