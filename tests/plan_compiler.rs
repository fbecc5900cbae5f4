// tests/plan_compiler.rs
mod common;
use crate::common::builders::{group, noop};
use crate::common::init_tracing;

use planrun::errors::PlanrunError;
use planrun::plan::{NodeState, Tree};
use planrun::{compile, compile_steps, ConcurrencyLimit, Mode, NodeId, PlanNode, Step, Task};

fn id(n: usize) -> NodeId {
    NodeId::new(n)
}

fn node(tree: &Tree, n: usize) -> &planrun::plan::Node {
    tree.node(id(n)).expect("node exists")
}

/// [[[fn1, fn2], [fn3, fn4]], fn5]
fn fork_join_plan() -> Vec<PlanNode> {
    vec![
        group(vec![
            group(vec![noop("fn1"), noop("fn2")]),
            group(vec![noop("fn3"), noop("fn4")]),
        ]),
        noop("fn5"),
    ]
}

#[test]
fn ids_are_assigned_in_pre_order_starting_at_one() {
    init_tracing();

    let tree = compile(fork_join_plan(), ConcurrencyLimit::unbounded());

    assert_eq!(tree.len(), 9);
    assert_eq!(tree.leaf_count(), 5);
    assert_eq!(tree.root().id(), NodeId::ROOT);
    assert_eq!(tree.root().parent(), None);

    let labels: Vec<_> = (3..=8)
        .filter_map(|n| node(&tree, n).label().map(str::to_string))
        .collect();
    assert_eq!(labels, vec!["fn1", "fn2", "fn3", "fn4", "fn5"]);
    assert!(!node(&tree, 5).is_leaf());
}

#[test]
fn modes_alternate_by_depth_starting_with_series() {
    let tree = compile(fork_join_plan(), ConcurrencyLimit::unbounded());

    assert_eq!(tree.root().mode(), Some(Mode::Series));
    assert_eq!(node(&tree, 1).mode(), Some(Mode::Parallel));
    assert_eq!(node(&tree, 2).mode(), Some(Mode::Series));
    assert_eq!(node(&tree, 5).mode(), Some(Mode::Series));
    assert_eq!(node(&tree, 3).mode(), None);
}

#[test]
fn series_siblings_are_chained_and_parallel_siblings_are_not() {
    let tree = compile(fork_join_plan(), ConcurrencyLimit::unbounded());

    // Top level (series): fn5 waits for the parallel container.
    assert_eq!(node(&tree, 1).master(), None);
    assert_eq!(node(&tree, 8).master(), Some(id(1)));
    assert_eq!(node(&tree, 1).slave(), Some(id(8)));

    // Parallel group: both branches free.
    assert_eq!(node(&tree, 2).master(), None);
    assert_eq!(node(&tree, 5).master(), None);
    assert_eq!(node(&tree, 2).slave(), None);

    // Inner series chains.
    assert_eq!(node(&tree, 4).master(), Some(id(3)));
    assert_eq!(node(&tree, 7).master(), Some(id(6)));
    assert_eq!(node(&tree, 3).slave(), Some(id(4)));
    assert_eq!(node(&tree, 4).slave(), None);
}

#[test]
fn parents_and_children_agree() {
    let tree = compile(fork_join_plan(), ConcurrencyLimit::unbounded());

    assert_eq!(tree.children_of(NodeId::ROOT), &[id(1), id(8)]);
    assert_eq!(tree.children_of(id(1)), &[id(2), id(5)]);
    assert_eq!(tree.children_of(id(2)), &[id(3), id(4)]);
    assert!(tree.children_of(id(3)).is_empty());

    for n in tree.nodes().skip(1) {
        let parent = n.parent().expect("non-root has a parent");
        assert!(tree.children_of(parent).contains(&n.id()));
    }
}

#[test]
fn freshly_compiled_nodes_are_pending() {
    let tree = compile(fork_join_plan(), ConcurrencyLimit::unbounded());
    assert!(tree.nodes().all(|n| n.state() == NodeState::Pending));
    assert!(tree.nodes().all(|n| !n.is_finished()));
}

#[test]
fn empty_plan_compiles_to_a_childless_root() {
    let tree = compile(Vec::new(), ConcurrencyLimit::unbounded());

    assert_eq!(tree.len(), 1);
    assert_eq!(tree.leaf_count(), 0);
    assert!(tree.root().children().is_empty());
    assert_eq!(tree.root().mode(), Some(Mode::Series));
}

#[test]
fn leaves_and_groups_at_one_depth_share_the_mode() {
    // [a, [b, c], d]
    let tree = compile(
        vec![noop("a"), group(vec![noop("b"), noop("c")]), noop("d")],
        ConcurrencyLimit::unbounded(),
    );

    assert_eq!(node(&tree, 1).master(), None);
    assert_eq!(node(&tree, 2).master(), Some(id(1)));
    assert_eq!(node(&tree, 5).master(), Some(id(2)));

    assert_eq!(node(&tree, 2).mode(), Some(Mode::Parallel));
    assert_eq!(node(&tree, 3).master(), None);
    assert_eq!(node(&tree, 4).master(), None);
}

#[test]
fn deep_nesting_keeps_alternating() {
    let depth = 40;
    let mut plan = noop("deepest");
    for _ in 0..depth {
        plan = group(vec![plan]);
    }
    let tree = compile(vec![plan], ConcurrencyLimit::unbounded());

    assert_eq!(tree.len(), depth + 2);
    for d in 1..=depth {
        let expected = if d % 2 == 1 { Mode::Parallel } else { Mode::Series };
        assert_eq!(node(&tree, d).mode(), Some(expected), "depth {d}");
    }
    assert!(node(&tree, depth + 1).is_leaf());
}

#[test]
fn explicit_steps_set_the_mode_directly() {
    let steps = vec![
        Step::Series(vec![
            Task::named("a", || async { Ok(()) }).into(),
            Task::named("b", || async { Ok(()) }).into(),
        ]),
        Step::Parallel(vec![
            Task::named("c", || async { Ok(()) }).into(),
            Task::named("d", || async { Ok(()) }).into(),
        ]),
    ];
    let tree = compile_steps(steps, ConcurrencyLimit::unbounded());

    assert_eq!(node(&tree, 1).mode(), Some(Mode::Series));
    assert_eq!(node(&tree, 3).master(), Some(id(2)));
    assert_eq!(node(&tree, 4).mode(), Some(Mode::Parallel));
    assert_eq!(node(&tree, 4).master(), Some(id(1)));
    assert_eq!(node(&tree, 6).master(), None);
}

#[test]
fn lowering_nested_lists_produces_alternating_steps() {
    let steps = Step::lower(
        vec![group(vec![group(vec![noop("x")])])],
        Mode::Series,
    );
    match steps.as_slice() {
        [Step::Parallel(inner)] => match inner.as_slice() {
            [Step::Series(leaves)] => assert!(matches!(leaves.as_slice(), [Step::Task(_)])),
            other => panic!("expected a series group, got {other:?}"),
        },
        other => panic!("expected a parallel group, got {other:?}"),
    }
}

#[test]
fn tree_display_outlines_the_plan() {
    let tree = compile(fork_join_plan(), ConcurrencyLimit::unbounded());

    let expected = "\
#0 series
  #1 parallel
    #2 series
      #3 task fn1
      #4 task fn2 (after #3)
    #5 series
      #6 task fn3
      #7 task fn4 (after #6)
  #8 task fn5 (after #1)
";
    assert_eq!(tree.to_string(), expected);
}

#[test]
fn zero_concurrency_limit_is_rejected() {
    match ConcurrencyLimit::new(0) {
        Err(PlanrunError::InvalidLimit(0)) => {}
        other => panic!("expected InvalidLimit, got {other:?}"),
    }

    let limit = ConcurrencyLimit::new(3).expect("valid limit");
    assert_eq!(limit.get(), Some(3));
    assert!(limit.has_capacity(2));
    assert!(!limit.has_capacity(3));
    assert_eq!(ConcurrencyLimit::default(), ConcurrencyLimit::unbounded());
    assert!(ConcurrencyLimit::unbounded().has_capacity(usize::MAX - 1));
}

#[test]
fn compiled_tree_carries_its_limit() {
    let limit = ConcurrencyLimit::new(2).expect("valid limit");
    let tree = compile(vec![noop("a")], limit);
    assert_eq!(tree.limit(), limit);
    assert_eq!(tree.limit().to_string(), "2");
    assert_eq!(ConcurrencyLimit::unbounded().to_string(), "unbounded");
}

#[test]
fn mode_display_and_flip() {
    assert_eq!(Mode::Parallel.to_string(), "parallel");
    assert_eq!(Mode::Series.flipped(), Mode::Parallel);
}
