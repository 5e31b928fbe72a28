// revgate: serialized gateway to a version-control working copy
//
// SPDX-FileCopyrightText: 2026 revgate contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! End-to-end scheduling behavior over simulated tool invocations.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use revgate::sched::{RequestScheduler, SingleFlight, Throttler};

/// A pretend external tool: records every invocation and refuses to run
/// concurrently with itself.
struct FakeTool {
    log: Mutex<Vec<String>>,
    running: AtomicUsize,
    overlaps: AtomicUsize,
}

impl FakeTool {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            log: Mutex::new(Vec::new()),
            running: AtomicUsize::new(0),
            overlaps: AtomicUsize::new(0),
        })
    }

    async fn invoke(self: Arc<Self>, command: String) -> anyhow::Result<String> {
        if self.running.fetch_add(1, Ordering::SeqCst) > 0 {
            self.overlaps.fetch_add(1, Ordering::SeqCst);
        }
        self.log.lock().unwrap().push(command.clone());
        tokio::time::sleep(Duration::from_millis(3)).await;
        self.running.fetch_sub(1, Ordering::SeqCst);
        Ok(format!("output of {command}"))
    }
}

#[tokio::test(start_paused = true)]
async fn test_mixed_burst_serializes_and_coalesces() {
    let sched = RequestScheduler::<String>::new();
    let tool = FakeTool::new();

    let invoke = |command: &str| {
        let tool = Arc::clone(&tool);
        let command = command.to_string();
        async move { tool.invoke(command).await }
    };

    // A realistic burst: two editors ask for status, one asks for a log,
    // and an update runs in between. Status requests coalesce onto the
    // in-flight registration; everything else runs in arrival order, one
    // invocation at a time.
    let (status_a, update, status_b, log) = tokio::join!(
        sched.acquire(invoke("status /wc"), Some("status:/wc")),
        sched.acquire(invoke("update /wc"), None),
        sched.acquire(invoke("status /wc"), Some("status:/wc")),
        sched.acquire(invoke("log /wc"), Some("log:/wc")),
    );

    assert_eq!(status_a.unwrap(), "output of status /wc");
    assert_eq!(status_b.unwrap(), "output of status /wc");
    assert_eq!(update.unwrap(), "output of update /wc");
    assert_eq!(log.unwrap(), "output of log /wc");

    assert_eq!(tool.overlaps.load(Ordering::SeqCst), 0);
    assert_eq!(
        *tool.log.lock().unwrap(),
        ["status /wc", "update /wc", "log /wc"]
    );
}

#[tokio::test(start_paused = true)]
async fn test_coalesced_failure_then_clean_retry() {
    let sched = RequestScheduler::<String>::new();
    let attempts = Arc::new(AtomicUsize::new(0));

    let flaky = || {
        let attempts = Arc::clone(&attempts);
        async move {
            if attempts.fetch_add(1, Ordering::SeqCst) == 0 {
                anyhow::bail!("working copy locked; previous operation did not finish");
            }
            Ok("clean".to_string())
        }
    };

    let (a, b) = tokio::join!(
        sched.acquire(flaky(), Some("cleanup:/wc")),
        sched.acquire(flaky(), Some("cleanup:/wc")),
    );
    let a = a.unwrap_err().to_string();
    let b = b.unwrap_err().to_string();
    assert!(a.contains("working copy locked"));
    assert_eq!(a, b);

    // The key is free again; a retry runs a fresh invocation.
    let retry = sched.acquire(flaky(), Some("cleanup:/wc")).await.unwrap();
    assert_eq!(retry, "clean");
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_throttled_refresh_feeding_the_scheduler() {
    let sched = Arc::new(RequestScheduler::<String>::new());
    let tool = FakeTool::new();

    // UI-style refresh: many triggers, but each trigger only needs the
    // result of the *next* refresh, and refreshes are throttled.
    let refresh = Throttler::new({
        let sched = Arc::clone(&sched);
        let tool = Arc::clone(&tool);
        move |root: &'static str| {
            let sched = Arc::clone(&sched);
            let tool = Arc::clone(&tool);
            async move {
                sched
                    .acquire(tool.invoke(format!("status {root}")), Some("status"))
                    .await
                    .map_err(|err| err.to_string())
            }
        }
    });

    let (a, b, c, d) = tokio::join!(
        refresh.call("/wc"),
        refresh.call("/wc"),
        refresh.call("/wc"),
        refresh.call("/wc"),
    );
    assert_eq!(a.unwrap().unwrap(), "output of status /wc");
    assert_eq!(d.unwrap().unwrap(), "output of status /wc");
    b.unwrap().unwrap();
    c.unwrap().unwrap();

    // Four triggers collapse into at most two tool runs: the in-flight one
    // plus one trailing run for the triggers that arrived during it.
    assert!(tool.log.lock().unwrap().len() <= 2);
}

#[tokio::test(start_paused = true)]
async fn test_single_flight_isolates_working_copies() {
    let flights = SingleFlight::<String>::new();
    let tool = FakeTool::new();

    let lookup = |root: &'static str| {
        let tool = Arc::clone(&tool);
        async move { tool.invoke(format!("info {root}")).await }
    };

    // Same root joins the in-flight lookup; a different root runs its own.
    let (a, b, c) = tokio::join!(
        flights.run("info:/wc1", lookup("/wc1")),
        flights.run("info:/wc1", lookup("/wc1")),
        flights.run("info:/wc2", lookup("/wc2")),
    );
    assert_eq!(a.unwrap(), "output of info /wc1");
    assert_eq!(b.unwrap(), "output of info /wc1");
    assert_eq!(c.unwrap(), "output of info /wc2");

    let log = tool.log.lock().unwrap();
    assert_eq!(log.len(), 2);
    assert!(log.contains(&"info /wc1".to_string()));
    assert!(log.contains(&"info /wc2".to_string()));
}
