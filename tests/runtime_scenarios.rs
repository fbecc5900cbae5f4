// tests/runtime_scenarios.rs
//
// Runs plans on the real Tokio backend. Each plan gets a terminal task
// appended by `run_and_wait`, which is the only way to learn that a run is
// over.
mod common;
use crate::common::builders::{group, leaf, limit, run_and_wait};
use crate::common::init_tracing;
use crate::common::timeline::{Mark, Timeline};

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::oneshot;

use planrun::{
    compile, run, ConcurrencyLimit, NodeId, OutcomeTally, PlanNode, RunOptions, TaskObserver,
    TaskOutcome,
};

const SHORT: Duration = Duration::from_millis(10);
const LONG: Duration = Duration::from_millis(40);

#[tokio::test]
async fn single_task_is_invoked_once() {
    init_tracing();
    let timeline = Timeline::new();

    run_and_wait(vec![leaf(timeline.task("fn1", SHORT))], limit(1), RunOptions::default()).await;

    assert_eq!(timeline.invocations("fn1"), 1);
    assert_eq!(
        timeline.marks(),
        vec![Mark::Start("fn1".into()), Mark::End("fn1".into())]
    );
}

#[tokio::test]
async fn nested_list_members_overlap() {
    let timeline = Timeline::new();
    let plan = vec![group(vec![
        leaf(timeline.task("fn1", LONG)),
        leaf(timeline.task("fn2", LONG)),
    ])];

    run_and_wait(plan, limit(5), RunOptions::default()).await;

    assert_eq!(timeline.max_running(), 2);
    let starts = timeline.starts();
    assert_eq!(starts, vec!["fn1", "fn2"]);
}

#[tokio::test]
async fn series_leaves_never_overlap() {
    let timeline = Timeline::new();
    let plan = vec![
        leaf(timeline.task("fn1", SHORT)),
        leaf(timeline.task("fn2", SHORT)),
    ];

    run_and_wait(plan, limit(5), RunOptions::default()).await;

    assert_eq!(
        timeline.marks(),
        vec![
            Mark::Start("fn1".into()),
            Mark::End("fn1".into()),
            Mark::Start("fn2".into()),
            Mark::End("fn2".into()),
        ]
    );
    assert_eq!(timeline.max_running(), 1);
}

#[tokio::test]
async fn fork_join_respects_order_and_limit() {
    let timeline = Timeline::new();
    let plan = vec![
        group(vec![
            group(vec![
                leaf(timeline.task("fn1", SHORT)),
                leaf(timeline.task("fn2", LONG)),
            ]),
            group(vec![
                leaf(timeline.task("fn3", LONG)),
                leaf(timeline.task("fn4", SHORT)),
            ]),
        ]),
        leaf(timeline.task("fn5", SHORT)),
    ];

    run_and_wait(plan, limit(2), RunOptions::default()).await;

    let starts = timeline.starts();
    assert_eq!(&starts[..2], &["fn1", "fn3"]);
    assert!(timeline.max_running() <= 2);

    let start = |n: &str| timeline.start_of(n).expect("started");
    let end = |n: &str| timeline.end_of(n).expect("ended");
    assert!(start("fn2") > end("fn1"));
    assert!(start("fn4") > end("fn3"));
    assert!(start("fn5") > end("fn2").max(end("fn4")));

    for name in ["fn1", "fn2", "fn3", "fn4", "fn5"] {
        assert_eq!(timeline.invocations(name), 1, "{name}");
    }
}

#[tokio::test]
async fn empty_plan_runs_without_error() {
    // No task is ever invoked, so there is nothing to wait for.
    run(compile(Vec::new(), limit(1)));

    // With a terminal task the run still reaches the end.
    run_and_wait(Vec::new(), limit(1), RunOptions::default()).await;
}

#[tokio::test]
async fn failed_task_does_not_stop_the_series() {
    let timeline = Timeline::new();
    let plan = vec![
        leaf(timeline.failing_task("fn1", SHORT)),
        leaf(timeline.task("fn2", SHORT)),
    ];

    run_and_wait(plan, limit(1), RunOptions::default()).await;

    assert_eq!(timeline.invocations("fn2"), 1);
    assert!(timeline.start_of("fn2") > timeline.end_of("fn1"));
}

#[tokio::test]
async fn panicking_task_counts_as_settled() {
    let timeline = Timeline::new();
    let plan = vec![
        leaf(timeline.panicking_task("fn1")),
        leaf(timeline.task("fn2", SHORT)),
    ];

    run_and_wait(plan, limit(1), RunOptions::default()).await;

    assert_eq!(timeline.invocations("fn1"), 1);
    assert_eq!(timeline.invocations("fn2"), 1);
}

#[tokio::test]
async fn concurrency_limit_caps_a_wide_parallel_group() {
    let timeline = Timeline::new();
    let plan = vec![group(
        (0..12)
            .map(|i| leaf(timeline.task(&format!("t{i}"), SHORT)))
            .collect(),
    )];

    run_and_wait(plan, limit(3), RunOptions::default()).await;

    assert_eq!(timeline.max_running(), 3);
    for i in 0..12 {
        assert_eq!(timeline.invocations(&format!("t{i}")), 1);
    }
}

#[tokio::test]
async fn unbounded_limit_lets_everything_overlap() {
    let timeline = Timeline::new();
    let plan = vec![group(
        (0..8)
            .map(|i| leaf(timeline.task(&format!("t{i}"), LONG)))
            .collect(),
    )];

    run_and_wait(plan, ConcurrencyLimit::unbounded(), RunOptions::default()).await;

    assert_eq!(timeline.max_running(), 8);
}

#[tokio::test]
async fn tasks_share_data_through_captured_state() {
    let slot: Arc<Mutex<Option<String>>> = Arc::new(Mutex::new(None));
    let (seen_tx, seen_rx) = oneshot::channel::<Option<String>>();

    let producer = {
        let slot = Arc::clone(&slot);
        planrun::Task::named("fetch", move || async move {
            *slot.lock().unwrap() = Some("raw data".to_string());
            Ok(())
        })
    };
    let consumer = {
        let slot = Arc::clone(&slot);
        planrun::Task::named("analyze", move || async move {
            let value = slot.lock().unwrap().clone();
            let _ = seen_tx.send(value);
            Ok(())
        })
    };

    run(compile(vec![leaf(producer), leaf(consumer)], limit(1)));

    let seen = crate::common::with_timeout(seen_rx).await.expect("consumer ran");
    assert_eq!(seen.as_deref(), Some("raw data"));
}

#[derive(Default)]
struct Recorder {
    events: Mutex<Vec<(String, Option<bool>)>>,
}

impl TaskObserver for Recorder {
    fn task_started(&self, _node: NodeId, label: Option<&str>) {
        self.events
            .lock()
            .unwrap()
            .push((label.unwrap_or_default().to_string(), None));
    }

    fn task_settled(&self, _node: NodeId, label: Option<&str>, outcome: &TaskOutcome) {
        self.events
            .lock()
            .unwrap()
            .push((label.unwrap_or_default().to_string(), Some(outcome.is_success())));
    }
}

#[tokio::test]
async fn observer_sees_starts_and_outcomes() {
    let timeline = Timeline::new();
    let recorder = Arc::new(Recorder::default());
    let plan = vec![
        leaf(timeline.task("ok", SHORT)),
        leaf(timeline.failing_task("bad", SHORT)),
    ];

    run_and_wait(plan, limit(1), RunOptions::default().with_observer(recorder.clone())).await;

    let events = recorder.events.lock().unwrap().clone();
    assert_eq!(
        &events[..4],
        &[
            ("ok".to_string(), None),
            ("ok".to_string(), Some(true)),
            ("bad".to_string(), None),
            ("bad".to_string(), Some(false)),
        ]
    );
    assert_eq!(events[4], ("terminal".to_string(), None));
}

#[tokio::test]
async fn outcome_tally_counts_failures() {
    let timeline = Timeline::new();
    let tally = Arc::new(OutcomeTally::new());
    let plan: Vec<PlanNode> = vec![group(vec![
        leaf(timeline.task("a", SHORT)),
        leaf(timeline.failing_task("b", SHORT)),
        leaf(timeline.panicking_task("c")),
    ])];

    run_and_wait(plan, limit(2), RunOptions::default().with_observer(tally.clone())).await;

    // The terminal task has started; its own settlement may still be in flight.
    assert_eq!(tally.started(), 4);
    assert_eq!(tally.failed(), 2);
    assert!(tally.succeeded() >= 1);
}

#[cfg(unix)]
#[tokio::test]
async fn shell_commands_settle_by_exit_status() {
    use planrun::exec::shell_task;

    let tally = Arc::new(OutcomeTally::new());
    let plan = vec![
        leaf(shell_task(None, "true")),
        leaf(shell_task(Some("always fails"), "exit 3")),
        leaf(shell_task(None, "echo still running")),
    ];

    run_and_wait(plan, limit(1), RunOptions::default().with_observer(tally.clone())).await;

    // Includes the terminal task once its settlement has been observed.
    assert_eq!(tally.started(), 4);
    assert_eq!(tally.failed(), 1);
    assert!((2..=3).contains(&tally.succeeded()), "{}", tally.succeeded());
}
