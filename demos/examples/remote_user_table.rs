// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A user directory served by a slow, occasionally failing remote.
//!
//! This example shows:
//! - a `RowFetcher` whose latency varies per row, so ranges resolve out of order,
//! - the engine running on its own task via `spawn`,
//! - only the latest request reaching the published window,
//! - a degraded window when one row cannot be fetched.
//!
//! Run:
//! - `RUST_LOG=debug cargo run -p understory_demos --example remote_user_table`

use std::time::Duration;

use futures_util::future::BoxFuture;
use tracing_subscriber::EnvFilter;
use understory_dataset::{FieldValue, Row};
use understory_scroll_window::{
    EngineEvent, FetchError, InitialPosition, RangeSource, RowFetcher, ScrollWindowEngine,
    WindowState, spawn,
};
use understory_window_geometry::LayoutSettings;

const COMPANIES: [&str; 5] = ["Acme", "Globex", "Initech", "Umbrella", "Hooli"];
const FIRST_NAMES: [&str; 6] = ["Ada", "Grace", "Linus", "Barbara", "Ken", "Margaret"];
const LAST_NAMES: [&str; 4] = ["Lovelace", "Hopper", "Liskov", "Thompson"];

/// One directory entry.
#[derive(Clone, Debug)]
struct UserRecord {
    company: String,
    username: String,
    name: String,
    email: String,
}

impl UserRecord {
    fn generate(id: usize) -> Self {
        let first = FIRST_NAMES[id % FIRST_NAMES.len()];
        let last = LAST_NAMES[id % LAST_NAMES.len()];
        let username = format!("{}{id}", first.to_lowercase());
        Self {
            company: COMPANIES[id % COMPANIES.len()].to_owned(),
            email: format!("{username}@example.com"),
            username,
            name: format!("{first} {last}"),
        }
    }
}

impl Row for UserRecord {
    type Key = String;

    fn key(&self) -> String {
        self.username.clone()
    }

    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        let value = match name {
            "company" => &self.company,
            "username" => &self.username,
            "name" => &self.name,
            "email" => &self.email,
            _ => return None,
        };
        Some(FieldValue::Text(value))
    }
}

/// Simulated directory service.
struct Directory {
    users: usize,
    unreachable: usize,
}

impl RowFetcher<UserRecord> for Directory {
    fn row_count(&self) -> usize {
        self.users
    }

    fn fetch_row(&self, position: usize) -> BoxFuture<'static, Result<UserRecord, FetchError>> {
        let unreachable = self.unreachable;
        Box::pin(async move {
            // Rows near the top of the list are served slowest.
            let latency = 200_u64.saturating_sub(position as u64 * 2).max(10);
            tokio::time::sleep(Duration::from_millis(latency)).await;
            if position == unreachable {
                return Err(FetchError::new(position, "directory shard offline"));
            }
            Ok(UserRecord::generate(position))
        })
    }
}

fn print_window(label: &str, window: &WindowState<UserRecord>) {
    println!(
        "{label}: token {} anchor {} count {} spacers {:.0}/{:.0}{}",
        window.token,
        window.anchor_index,
        window.count,
        window.top_spacer_height,
        window.bottom_spacer_height,
        if window.is_degraded { " (degraded)" } else { "" },
    );
    for visible in window.visible_rows.iter().take(3) {
        let user = &visible.row;
        println!(
            "  #{:<4} {:<10} {:<12} {:<18} {}",
            visible.index, user.company, user.username, user.name, user.email
        );
    }
    for index in &window.failed_indices {
        println!("  #{index:<4} <unavailable>");
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let directory = Directory {
        users: 100,
        unreachable: 50,
    };
    let engine = ScrollWindowEngine::from_settings(
        LayoutSettings::default(),
        RangeSource::remote(directory),
    )
    .expect("default layout is valid");
    let (handle, task) = spawn(engine).expect("inside a Tokio runtime");
    let mut window = handle.window();

    // Mount at row 6, then scroll well past it before the first range lands.
    handle.send(EngineEvent::Mount(InitialPosition::Index(6)));
    handle.scroll(2000.0);

    window
        .wait_for(|state| state.token.get() == 2)
        .await
        .expect("driver running");
    print_window("after fast scroll", &handle.snapshot());

    // A window containing the offline row still renders, minus that row.
    handle.scroll(2600.0);
    window
        .wait_for(|state| state.token.get() == 3)
        .await
        .expect("driver running");
    print_window("over offline row", &handle.snapshot());

    handle.shutdown();
    let engine = task.await.expect("driver task");
    println!("stopped after {}", engine.latest_token());
}
