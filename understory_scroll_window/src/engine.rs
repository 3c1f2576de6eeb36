// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The scroll window engine: scroll events in, window states out.

use std::sync::Arc;

use hashbrown::HashMap;
use smallvec::SmallVec;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, watch};
use tokio::task::AbortHandle;
use tracing::{debug, info, trace, warn};
use understory_dataset::{DatasetCommand, Row, Rows};
use understory_window_geometry::{
    LayoutConfig, LayoutSettings, ScrollAlign, Window, compute_window, scroll_offset_for_index,
};

use crate::source::RangeFetch;
use crate::{
    EngineOptions, EnginePhase, FetchError, RangeSource, RequestToken, Result, VisibleRow,
    WindowState,
};

/// Where the list starts when it is first mounted.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InitialPosition {
    /// Scroll offset `0`.
    #[default]
    Top,
    /// An explicit scroll offset.
    Offset(f64),
    /// The offset that puts this index at the top of the viewport.
    Index(usize),
}

/// What happened to one resolution taken off the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolutionOutcome {
    /// It was the latest request and is now the published state.
    Applied(RequestToken),
    /// A newer request had been issued; it was discarded.
    Superseded(RequestToken),
    /// The engine was shut down; it was discarded.
    Ignored(RequestToken),
}

/// A finished remote fetch waiting to be applied.
pub(crate) struct Resolution<R> {
    token: RequestToken,
    window: Window<f64>,
    fetch: RangeFetch<R>,
}

/// Turns scroll, resize, and dataset events into window states.
///
/// Every event recomputes the window and issues a new [`RequestToken`].
/// Local sources resolve on the spot. Remote fetches run on the Tokio runtime
/// and come back through [`poll_resolutions`](Self::poll_resolutions),
/// [`wait_for_resolution`](Self::wait_for_resolution), or the driver spawned
/// by [`spawn`](crate::spawn). A resolution is applied only if its token is
/// the most recently issued one, so a slow early request can never overwrite
/// a later one.
///
/// The published [`WindowState`] is swapped whole and can be observed with
/// [`snapshot`](Self::snapshot) or [`subscribe`](Self::subscribe).
pub struct ScrollWindowEngine<R: Send + Sync + 'static> {
    layout: LayoutConfig<f64>,
    source: RangeSource<R>,
    options: EngineOptions,
    runtime: Option<Handle>,
    scroll_offset: f64,
    phase: EnginePhase,
    latest: RequestToken,
    in_flight: HashMap<RequestToken, AbortHandle>,
    resolved_tx: mpsc::UnboundedSender<Resolution<R>>,
    resolved_rx: mpsc::UnboundedReceiver<Resolution<R>>,
    published: watch::Sender<Arc<WindowState<R>>>,
    shut_down: bool,
}

impl<R: Send + Sync + 'static> ScrollWindowEngine<R> {
    /// Creates an engine over `source`.
    ///
    /// Remote sources spawn their fetches on the current Tokio runtime, so
    /// this needs to run inside one.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NoRuntime`](crate::EngineError::NoRuntime) for a
    /// remote source outside a Tokio runtime.
    pub fn new(layout: LayoutConfig<f64>, source: RangeSource<R>) -> Result<Self> {
        let runtime = if source.is_remote() {
            Some(Handle::try_current()?)
        } else {
            None
        };
        Ok(Self::build(layout, source, runtime))
    }

    /// Creates an engine from plain settings.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Layout`](crate::EngineError::Layout) for unusable
    /// settings, or as [`new`](Self::new).
    pub fn from_settings(settings: LayoutSettings, source: RangeSource<R>) -> Result<Self> {
        Self::new(LayoutConfig::try_from(settings)?, source)
    }

    /// Creates an engine whose remote fetches run on `runtime`.
    #[must_use]
    pub fn with_runtime(
        layout: LayoutConfig<f64>,
        source: RangeSource<R>,
        runtime: Handle,
    ) -> Self {
        Self::build(layout, source, Some(runtime))
    }

    fn build(layout: LayoutConfig<f64>, source: RangeSource<R>, runtime: Option<Handle>) -> Self {
        let (resolved_tx, resolved_rx) = mpsc::unbounded_channel();
        let (published, _) = watch::channel(Arc::new(WindowState::unloaded(layout.min_index())));
        Self {
            layout,
            source,
            options: EngineOptions::default(),
            runtime,
            scroll_offset: 0.0,
            phase: EnginePhase::Idle,
            latest: RequestToken::default(),
            in_flight: HashMap::new(),
            resolved_tx,
            resolved_rx,
            published,
            shut_down: false,
        }
    }

    /// Replaces the engine options.
    #[must_use]
    pub fn with_options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    /// Current layout. Its row count is the one used for the latest request.
    pub fn layout(&self) -> &LayoutConfig<f64> {
        &self.layout
    }

    /// The row source.
    pub fn source(&self) -> &RangeSource<R> {
        &self.source
    }

    /// Engine options.
    pub fn options(&self) -> EngineOptions {
        self.options
    }

    /// Current phase.
    pub fn phase(&self) -> EnginePhase {
        self.phase
    }

    /// Last scroll offset, after sanitizing.
    pub fn scroll_offset(&self) -> f64 {
        self.scroll_offset
    }

    /// Most recently issued token.
    pub fn latest_token(&self) -> RequestToken {
        self.latest
    }

    /// Remote fetches spawned but not yet taken off the queue.
    pub fn pending_requests(&self) -> usize {
        self.in_flight.len()
    }

    /// Returns `true` once [`shutdown`](Self::shutdown) has run.
    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    /// The latest published state.
    pub fn snapshot(&self) -> Arc<WindowState<R>> {
        Arc::clone(&self.published.borrow())
    }

    /// A receiver that sees every published state.
    pub fn subscribe(&self) -> watch::Receiver<Arc<WindowState<R>>> {
        self.published.subscribe()
    }

    /// First window after the list appears.
    pub fn on_initial_mount(&mut self, position: InitialPosition) {
        let offset = match position {
            InitialPosition::Top => 0.0,
            InitialPosition::Offset(offset) => offset,
            InitialPosition::Index(index) => {
                self.layout.set_row_count(self.source.len());
                scroll_offset_for_index(&self.layout, index, ScrollAlign::Start, 0.0)
            }
        };
        debug!(?position, offset, "initial mount");
        self.on_scroll(offset);
    }

    /// The host scrolled to `offset`.
    ///
    /// Negative and non-finite offsets act like `0`; offsets past the end
    /// anchor on the last row.
    pub fn on_scroll(&mut self, offset: f64) {
        if self.ignore_after_shutdown("scroll") {
            return;
        }
        self.scroll_offset = if offset.is_finite() && offset > 0.0 {
            offset
        } else {
            0.0
        };
        self.dispatch();
    }

    /// The viewport now fits `viewport_item_count` rows.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Layout`](crate::EngineError::Layout) for zero;
    /// the layout and the published state are left alone. After shutdown the
    /// resize is ignored.
    pub fn on_resize(&mut self, viewport_item_count: usize) -> Result<()> {
        if self.ignore_after_shutdown("resize") {
            return Ok(());
        }
        self.layout.set_viewport_item_count(viewport_item_count)?;
        self.dispatch();
        Ok(())
    }

    /// The source changed its length or order; recompute at the last offset.
    pub fn on_dataset_mutated(&mut self) {
        if self.ignore_after_shutdown("dataset mutation") {
            return;
        }
        self.dispatch();
    }

    /// Scrolls so that `index` is visible with `align`, returning the new
    /// offset for the host to adopt.
    pub fn scroll_to_index(&mut self, index: usize, align: ScrollAlign) -> f64 {
        self.layout.set_row_count(self.source.len());
        let offset = scroll_offset_for_index(&self.layout, index, align, self.scroll_offset);
        self.on_scroll(offset);
        self.scroll_offset
    }

    /// Stops the engine. In-flight fetches are aborted and later events and
    /// resolutions are ignored. The last published state stays readable.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        let aborted = self.in_flight.len();
        self.abort_in_flight();
        self.shut_down = true;
        self.phase = EnginePhase::Idle;
        info!(aborted, latest = %self.latest, "scroll window engine shut down");
    }

    /// Applies every resolution already queued, without waiting.
    ///
    /// Returns how many were taken off the queue.
    pub fn poll_resolutions(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(resolution) = self.resolved_rx.try_recv() {
            self.handle_resolution(resolution);
            handled += 1;
        }
        handled
    }

    /// Waits for the next remote fetch to finish and handles it.
    ///
    /// Returns `None` immediately when nothing is in flight. A fetch that
    /// never completes keeps this waiting; use a timeout if that matters.
    pub async fn wait_for_resolution(&mut self) -> Option<ResolutionOutcome> {
        if self.in_flight.is_empty() {
            return None;
        }
        let resolution = self.resolved_rx.recv().await?;
        Some(self.handle_resolution(resolution))
    }

    /// Waits until the latest request is applied.
    pub async fn settle(&mut self) {
        while self.phase == EnginePhase::Loading {
            if self.wait_for_resolution().await.is_none() {
                break;
            }
        }
    }

    pub(crate) async fn next_resolution(&mut self) -> Option<Resolution<R>> {
        self.resolved_rx.recv().await
    }

    pub(crate) fn handle_resolution(&mut self, resolution: Resolution<R>) -> ResolutionOutcome {
        let Resolution {
            token,
            window,
            fetch,
        } = resolution;
        self.in_flight.remove(&token);
        if self.shut_down {
            trace!(%token, "ignoring resolution after shutdown");
            return ResolutionOutcome::Ignored(token);
        }
        if token != self.latest {
            trace!(%token, latest = %self.latest, "dropping superseded resolution");
            return ResolutionOutcome::Superseded(token);
        }
        let min_index = self.layout.min_index();
        let rows = fetch
            .rows
            .into_iter()
            .map(|positioned| VisibleRow {
                index: positioned.position + min_index,
                row: positioned.row,
            })
            .collect();
        self.publish(token, &window, rows, fetch.failures);
        ResolutionOutcome::Applied(token)
    }

    fn ignore_after_shutdown(&self, event: &'static str) -> bool {
        if self.shut_down {
            trace!(event, "ignoring event after shutdown");
        }
        self.shut_down
    }

    fn dispatch(&mut self) {
        self.latest = self.latest.next();
        let token = self.latest;
        // Count and rows must come from the same view of a local dataset.
        let local_view = match &self.source {
            RangeSource::Local(local) => Some(local.dataset().snapshot()),
            RangeSource::Remote(_) => None,
        };
        let row_count = match &local_view {
            Some(view) => view.len(),
            None => self.source.len(),
        };
        self.layout.set_row_count(row_count);
        let window = compute_window(&self.layout, self.scroll_offset);
        let min_index = self.layout.min_index();
        debug!(
            %token,
            offset = self.scroll_offset,
            anchor = window.anchor_index,
            count = window.count,
            rows = row_count,
            "window requested"
        );

        if let Some(view) = local_view {
            let rows = local_rows(&view, &window, min_index);
            self.publish(token, &window, rows, SmallVec::new());
            return;
        }
        if window.is_empty() {
            self.publish(token, &window, Vec::new(), SmallVec::new());
            return;
        }
        let RangeSource::Remote(remote) = &self.source else {
            return;
        };
        let positions = window.positions(min_index);
        let fetch = remote.fetch(positions.start, positions.end - 1);
        if self.options.abort_superseded {
            self.abort_in_flight();
        }
        self.spawn_fetch(token, window, fetch);
    }

    fn spawn_fetch(
        &mut self,
        token: RequestToken,
        window: Window<f64>,
        fetch: futures_util::future::BoxFuture<'static, RangeFetch<R>>,
    ) {
        let Some(runtime) = &self.runtime else {
            // Only remote sources reach here, and they always carry a runtime.
            return;
        };
        let resolved_tx = self.resolved_tx.clone();
        let task = runtime.spawn(async move {
            let fetch = fetch.await;
            // The engine may already be gone.
            let _ = resolved_tx.send(Resolution {
                token,
                window,
                fetch,
            });
        });
        self.in_flight.insert(token, task.abort_handle());
        self.phase = EnginePhase::Loading;
    }

    fn abort_in_flight(&mut self) {
        for (token, handle) in self.in_flight.drain() {
            trace!(%token, "aborting fetch");
            handle.abort();
        }
    }

    fn publish(
        &mut self,
        token: RequestToken,
        window: &Window<f64>,
        rows: Vec<VisibleRow<R>>,
        failures: SmallVec<[FetchError; 4]>,
    ) {
        if !failures.is_empty() {
            warn!(
                %token,
                anchor = window.anchor_index,
                count = window.count,
                failed = failures.len(),
                "window degraded: some rows failed to load"
            );
            for failure in &failures {
                debug!(%token, %failure, "row fetch failed");
            }
        }
        let min_index = self.layout.min_index();
        let state = WindowState::from_window(token, window, min_index, rows, failures);
        debug!(
            %token,
            anchor = state.anchor_index,
            visible = state.visible_rows.len(),
            empty = state.is_empty,
            "window applied"
        );
        self.published.send_replace(Arc::new(state));
        self.phase = EnginePhase::Settled;
    }
}

impl<R: Row> ScrollWindowEngine<R> {
    /// Applies a user command to the source, then recomputes the window.
    ///
    /// Local datasets apply the command directly; remote fetchers receive it
    /// through [`RowFetcher::on_command`](crate::RowFetcher::on_command).
    pub fn on_command(&mut self, command: &DatasetCommand) {
        if self.ignore_after_shutdown("command") {
            return;
        }
        debug!(?command, "dataset command");
        match &self.source {
            RangeSource::Local(local) => local.dataset().apply(command),
            RangeSource::Remote(remote) => remote.fetcher().on_command(command),
        }
        self.on_dataset_mutated();
    }
}

fn local_rows<R>(view: &Rows<R>, window: &Window<f64>, min_index: usize) -> Vec<VisibleRow<R>> {
    let positions = window.positions(min_index);
    let Some(rows) = view.get(positions) else {
        return Vec::new();
    };
    rows.iter()
        .zip(window.indices())
        .map(|(row, index)| VisibleRow {
            index,
            row: Arc::clone(row),
        })
        .collect()
}

impl<R: Send + Sync + 'static> Drop for ScrollWindowEngine<R> {
    fn drop(&mut self) {
        self.abort_in_flight();
    }
}

impl<R: Send + Sync + 'static> core::fmt::Debug for ScrollWindowEngine<R> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ScrollWindowEngine")
            .field("layout", &self.layout)
            .field("source", &self.source)
            .field("options", &self.options)
            .field("scroll_offset", &self.scroll_offset)
            .field("phase", &self.phase)
            .field("latest", &self.latest)
            .field("in_flight", &self.in_flight.len())
            .field("shut_down", &self.shut_down)
            .finish_non_exhaustive()
    }
}
