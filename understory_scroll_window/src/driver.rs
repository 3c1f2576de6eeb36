// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Runs an engine as a Tokio task fed by a channel of host events.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error};
use understory_dataset::{DatasetCommand, Row};
use understory_window_geometry::ScrollAlign;

use crate::{InitialPosition, Result, ScrollWindowEngine, WindowState};

/// An event from the host, processed in arrival order by the driver.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// See [`ScrollWindowEngine::on_initial_mount`].
    Mount(InitialPosition),
    /// See [`ScrollWindowEngine::on_scroll`].
    Scroll(f64),
    /// See [`ScrollWindowEngine::on_resize`].
    Resize(usize),
    /// See [`ScrollWindowEngine::on_dataset_mutated`].
    DatasetMutated,
    /// See [`ScrollWindowEngine::on_command`].
    Command(DatasetCommand),
    /// See [`ScrollWindowEngine::scroll_to_index`].
    ScrollToIndex(usize, ScrollAlign),
    /// Shut the engine down and end the driver task.
    Shutdown,
}

/// Host-side handle to a spawned engine.
#[derive(Debug)]
pub struct EngineHandle<R> {
    events: mpsc::UnboundedSender<EngineEvent>,
    window: watch::Receiver<Arc<WindowState<R>>>,
}

impl<R> Clone for EngineHandle<R> {
    fn clone(&self) -> Self {
        Self {
            events: self.events.clone(),
            window: self.window.clone(),
        }
    }
}

impl<R> EngineHandle<R> {
    /// Queues `event`. Returns `false` if the driver has stopped.
    pub fn send(&self, event: EngineEvent) -> bool {
        self.events.send(event).is_ok()
    }

    /// Queues a scroll to `offset`.
    pub fn scroll(&self, offset: f64) -> bool {
        self.send(EngineEvent::Scroll(offset))
    }

    /// Queues a user command.
    pub fn command(&self, command: DatasetCommand) -> bool {
        self.send(EngineEvent::Command(command))
    }

    /// Asks the driver to shut the engine down.
    pub fn shutdown(&self) -> bool {
        self.send(EngineEvent::Shutdown)
    }

    /// The latest published state.
    pub fn snapshot(&self) -> Arc<WindowState<R>> {
        Arc::clone(&self.window.borrow())
    }

    /// A receiver for published states.
    pub fn window(&self) -> watch::Receiver<Arc<WindowState<R>>> {
        self.window.clone()
    }
}

/// Moves `engine` onto a Tokio task.
///
/// The task applies host events and remote resolutions as they arrive and
/// stops after [`EngineEvent::Shutdown`] or once every handle is dropped,
/// returning the engine.
///
/// # Errors
///
/// Returns [`EngineError::NoRuntime`](crate::EngineError::NoRuntime) outside a
/// Tokio runtime.
pub fn spawn<R: Row>(
    engine: ScrollWindowEngine<R>,
) -> Result<(EngineHandle<R>, JoinHandle<ScrollWindowEngine<R>>)> {
    let runtime = tokio::runtime::Handle::try_current()?;
    let (events, rx) = mpsc::unbounded_channel();
    let handle = EngineHandle {
        events,
        window: engine.subscribe(),
    };
    let task = runtime.spawn(run(engine, rx));
    Ok((handle, task))
}

async fn run<R: Row>(
    mut engine: ScrollWindowEngine<R>,
    mut events: mpsc::UnboundedReceiver<EngineEvent>,
) -> ScrollWindowEngine<R> {
    debug!("scroll window driver started");
    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(EngineEvent::Shutdown) | None => break,
                Some(event) => apply(&mut engine, event),
            },
            Some(resolution) = engine.next_resolution() => {
                engine.handle_resolution(resolution);
            }
        }
    }
    engine.shutdown();
    engine
}

fn apply<R: Row>(engine: &mut ScrollWindowEngine<R>, event: EngineEvent) {
    match event {
        EngineEvent::Mount(position) => engine.on_initial_mount(position),
        EngineEvent::Scroll(offset) => engine.on_scroll(offset),
        EngineEvent::Resize(viewport_item_count) => {
            if let Err(err) = engine.on_resize(viewport_item_count) {
                error!(%err, viewport_item_count, "rejected resize");
            }
        }
        EngineEvent::DatasetMutated => engine.on_dataset_mutated(),
        EngineEvent::Command(command) => engine.on_command(&command),
        EngineEvent::ScrollToIndex(index, align) => {
            engine.scroll_to_index(index, align);
        }
        EngineEvent::Shutdown => engine.shutdown(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use understory_dataset::{DatasetCommand, DatasetController, FieldValue, Row};
    use understory_window_geometry::LayoutConfig;

    use super::{EngineEvent, spawn};
    use crate::{InitialPosition, RangeSource, ScrollWindowEngine};

    struct Num {
        n: i64,
        label: String,
    }

    impl Num {
        fn new(n: i64) -> Self {
            Self {
                n,
                label: n.to_string(),
            }
        }
    }

    impl Row for Num {
        type Key = i64;

        fn key(&self) -> i64 {
            self.n
        }

        fn field(&self, name: &str) -> Option<FieldValue<'_>> {
            match name {
                "n" => Some(FieldValue::Integer(self.n)),
                "label" => Some(FieldValue::Text(&self.label)),
                _ => None,
            }
        }
    }

    #[tokio::test]
    async fn driver_publishes_and_returns_the_engine() {
        let dataset = Arc::new(DatasetController::new((0..100).map(Num::new)));
        let layout = LayoutConfig::new(56.0, 6, 3).unwrap().with_min_index(1);
        let engine = ScrollWindowEngine::new(layout, RangeSource::local(dataset)).unwrap();
        let (handle, task) = spawn(engine).unwrap();
        let mut window = handle.window();

        assert!(handle.send(EngineEvent::Mount(InitialPosition::Top)));
        assert!(handle.scroll(1000.0));
        let state = window.wait_for(|s| s.anchor_index == 15).await.unwrap();
        assert_eq!(state.visible_rows[0].row.n, 14);
        drop(state);

        assert!(handle.command(DatasetCommand::FilterText {
            field: "label".into(),
            query: "7".into(),
        }));
        assert!(handle.shutdown());
        let engine = task.await.unwrap();
        assert!(engine.is_shut_down());
        // 7, 17, 27, ..., 97 and 70..=79 without double-counting 77
        assert_eq!(engine.layout().row_count(), 19);
        assert!(!handle.scroll(0.0));
    }
}
