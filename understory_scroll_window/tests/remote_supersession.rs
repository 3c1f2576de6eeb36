// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Remote sources: out-of-order resolutions, loading, partial failure, and shutdown.
//!
//! Each `fetch_range` call waits on its own gate, so tests decide exactly
//! which request finishes first.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures_util::future::BoxFuture;
use tokio::sync::Semaphore;
use understory_scroll_window::{
    EngineOptions, EnginePhase, FetchError, InitialPosition, RangeSource, ResolutionOutcome,
    RowFetcher, ScrollWindowEngine,
};
use understory_window_geometry::LayoutConfig;

#[derive(Debug, PartialEq)]
struct Record {
    position: usize,
}

struct GatedFetcher {
    rows: usize,
    gates: Vec<Arc<Semaphore>>,
    calls: AtomicUsize,
    failing: HashSet<usize>,
}

impl GatedFetcher {
    fn new(rows: usize, requests: usize) -> Arc<Self> {
        Self::failing(rows, requests, [])
    }

    fn failing(
        rows: usize,
        requests: usize,
        failing: impl IntoIterator<Item = usize>,
    ) -> Arc<Self> {
        Arc::new(Self {
            rows,
            gates: (0..requests).map(|_| Arc::new(Semaphore::new(0))).collect(),
            calls: AtomicUsize::new(0),
            failing: failing.into_iter().collect(),
        })
    }

    fn open(&self, request: usize) {
        self.gates[request].add_permits(1);
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl RowFetcher<Record> for GatedFetcher {
    fn row_count(&self) -> usize {
        self.rows
    }

    fn fetch_row(&self, position: usize) -> BoxFuture<'static, Result<Record, FetchError>> {
        Box::pin(async move { Ok(Record { position }) })
    }

    fn fetch_range(
        &self,
        start: usize,
        end: usize,
    ) -> BoxFuture<'static, Vec<(usize, Result<Record, FetchError>)>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let gate = Arc::clone(&self.gates[call]);
        let failing = self.failing.clone();
        Box::pin(async move {
            let _permit = gate.acquire().await.expect("gate closed");
            (start..=end)
                .map(|position| {
                    let result = if failing.contains(&position) {
                        Err(FetchError::new(position, "upstream timed out"))
                    } else {
                        Ok(Record { position })
                    };
                    (position, result)
                })
                .collect()
        })
    }
}

fn engine(fetcher: &Arc<GatedFetcher>) -> ScrollWindowEngine<Record> {
    let layout = LayoutConfig::new(56.0, 6, 3).unwrap().with_min_index(1);
    let source = RangeSource::remote_shared(Arc::clone(fetcher) as Arc<dyn RowFetcher<Record>>);
    ScrollWindowEngine::new(layout, source).unwrap()
}

#[tokio::test]
async fn late_stale_resolution_does_not_overwrite_newer_window() {
    let fetcher = GatedFetcher::new(100, 2);
    let mut engine = engine(&fetcher);

    engine.on_initial_mount(InitialPosition::Top);
    let first = engine.latest_token();
    engine.on_scroll(2000.0);
    let second = engine.latest_token();
    assert_eq!(engine.phase(), EnginePhase::Loading);
    assert_eq!(engine.pending_requests(), 2);

    fetcher.open(1);
    let outcome = engine.wait_for_resolution().await;
    assert_eq!(outcome, Some(ResolutionOutcome::Applied(second)));
    assert_eq!(engine.phase(), EnginePhase::Settled);
    let applied = engine.snapshot();
    // floor((2000 - 168) / 56) = 32
    assert_eq!(applied.anchor_index, 33);
    assert_eq!(applied.visible_rows[0].row.position, 32);

    fetcher.open(0);
    let outcome = engine.wait_for_resolution().await;
    assert_eq!(outcome, Some(ResolutionOutcome::Superseded(first)));
    let after = engine.snapshot();
    assert_eq!(after.token, second);
    assert_eq!(after.anchor_index, 33);
    assert_eq!(engine.pending_requests(), 0);
    assert_eq!(engine.wait_for_resolution().await, None);
}

#[tokio::test]
async fn stale_resolution_arriving_first_keeps_the_published_window() {
    let fetcher = GatedFetcher::new(100, 3);
    let mut engine = engine(&fetcher);

    engine.on_initial_mount(InitialPosition::Top);
    fetcher.open(0);
    engine.settle().await;
    let settled = engine.snapshot();

    engine.on_scroll(560.0);
    let middle = engine.latest_token();
    engine.on_scroll(2000.0);
    let newest = engine.latest_token();
    assert_eq!(engine.pending_requests(), 2);

    fetcher.open(1);
    let outcome = engine.wait_for_resolution().await;
    assert_eq!(outcome, Some(ResolutionOutcome::Superseded(middle)));
    assert_eq!(engine.phase(), EnginePhase::Loading);
    assert!(Arc::ptr_eq(&engine.snapshot(), &settled));
    assert_eq!(engine.snapshot().visible_rows[0].row.position, 0);

    fetcher.open(2);
    let outcome = engine.wait_for_resolution().await;
    assert_eq!(outcome, Some(ResolutionOutcome::Applied(newest)));
    assert_eq!(engine.snapshot().anchor_index, 33);
}

#[tokio::test]
async fn previous_rows_stay_published_while_loading() {
    let fetcher = GatedFetcher::new(100, 2);
    let mut engine = engine(&fetcher);
    let mut window = engine.subscribe();

    engine.on_initial_mount(InitialPosition::Top);
    fetcher.open(0);
    engine.settle().await;
    let _ = window.borrow_and_update();
    let settled = engine.snapshot();
    assert_eq!(settled.visible_rows.len(), 12);

    engine.on_scroll(2000.0);
    assert_eq!(engine.phase(), EnginePhase::Loading);
    assert!(!window.has_changed().unwrap());
    let loading = engine.snapshot();
    assert_eq!(loading.token, settled.token);
    assert_eq!(loading.anchor_index, 1);
    assert_eq!(loading.visible_rows.len(), 12);
    assert_eq!(loading.visible_rows[0].row.position, 0);

    fetcher.open(1);
    engine.settle().await;
    assert!(window.has_changed().unwrap());
    assert_eq!(engine.snapshot().visible_rows[0].row.position, 32);
}

#[tokio::test]
async fn hung_request_does_not_block_a_later_one() {
    let fetcher = GatedFetcher::new(100, 2);
    let mut engine = engine(&fetcher);

    engine.on_initial_mount(InitialPosition::Top);
    engine.on_scroll(560.0);
    fetcher.open(1);
    engine.settle().await;

    assert_eq!(engine.phase(), EnginePhase::Settled);
    assert_eq!(engine.snapshot().token, engine.latest_token());
    assert_eq!(engine.pending_requests(), 1);
}

#[tokio::test]
async fn partial_failure_yields_a_degraded_window() {
    let fetcher = GatedFetcher::failing(100, 1, [3, 7]);
    let mut engine = engine(&fetcher);

    engine.on_initial_mount(InitialPosition::Top);
    fetcher.open(0);
    engine.settle().await;

    let state = engine.snapshot();
    assert!(state.is_degraded);
    assert!(!state.is_empty);
    assert_eq!(state.count, 12);
    assert_eq!(state.visible_rows.len(), 10);
    assert!(state.visible_rows.iter().all(|r| r.index != 4 && r.index != 8));
    assert_eq!(state.failed_indices.as_slice(), [4, 8]);
    assert_eq!(state.failures[0].position, 3);
    assert_eq!(state.bottom_spacer_height, 4928.0);
    // Failed rows still take up a row each.
    let rows = state.visible_rows.len() + state.failed_indices.len();
    assert_eq!(rows, state.count);
    assert_eq!(
        state.top_spacer_height + rows as f64 * 56.0 + state.bottom_spacer_height,
        state.total_height
    );
}

#[tokio::test]
async fn shutdown_aborts_in_flight_fetches() {
    let fetcher = GatedFetcher::new(100, 2);
    let mut engine = engine(&fetcher);

    engine.on_initial_mount(InitialPosition::Top);
    engine.shutdown();
    assert_eq!(engine.pending_requests(), 0);
    assert_eq!(engine.phase(), EnginePhase::Idle);

    fetcher.open(0);
    tokio::task::yield_now().await;
    assert_eq!(engine.poll_resolutions(), 0);
    assert_eq!(engine.snapshot().token.get(), 0);

    engine.on_scroll(1000.0);
    assert_eq!(fetcher.calls(), 1);
}

#[tokio::test]
async fn aborting_superseded_fetches_is_opt_in() {
    let fetcher = GatedFetcher::new(100, 2);
    let options = EngineOptions::default().with_abort_superseded(true);
    let mut engine = engine(&fetcher).with_options(options);

    engine.on_initial_mount(InitialPosition::Top);
    engine.on_scroll(1000.0);
    assert_eq!(engine.pending_requests(), 1);

    fetcher.open(1);
    assert!(matches!(
        engine.wait_for_resolution().await,
        Some(ResolutionOutcome::Applied(_))
    ));
}

#[tokio::test]
async fn empty_remote_source_settles_without_fetching() {
    let fetcher = GatedFetcher::new(0, 1);
    let mut engine = engine(&fetcher);

    engine.on_initial_mount(InitialPosition::Top);
    assert_eq!(engine.phase(), EnginePhase::Settled);
    assert!(engine.snapshot().is_empty);
    assert_eq!(fetcher.calls(), 0);
}
