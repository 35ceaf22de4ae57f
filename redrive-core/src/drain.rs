//! The concurrent drain protocol: a fixed pool of independent pollers
//! racing against the shared source, each looping
//! receive -> deliver -> delete until its own empty-receive streak says
//! the queue is drained.
//!
//! ```text
//! (DLQ) <--receive/delete-- [poller 0] --deliver--> (sink)
//!       <--receive/delete-- [poller 1] --deliver-->
//!       <--receive/delete-- [poller N] --deliver-->
//! ```
//!
//! Pollers share nothing mutable; the source holds an in-flight message
//! invisible to the other pollers for the visibility window, so no two
//! pollers process the same message concurrently. Delivery is
//! at-least-once: a crash between a successful deliver and its delete
//! leaves the message re-deliverable.

use std::sync::Arc;

use futures::future::try_join_all;
use tracing::{debug, info};

use crate::config::Settings;
use crate::sink::SinkWriter;
use crate::source::DlqSource;
use crate::{Error, Result};

/// Counts consecutive empty receives. The source polls a subset of its
/// internal shards per request and can report empty while messages
/// remain, so a single empty receive is not evidence of exhaustion; a
/// long enough streak is taken as drained.
#[derive(Debug)]
pub struct EmptyStreak {
    count: u32,
    threshold: u32,
}

impl EmptyStreak {
    pub fn new(threshold: u32) -> Self {
        EmptyStreak {
            count: 0,
            threshold,
        }
    }

    /// Records the size of one receive. Returns true once the streak of
    /// empty receives has reached the threshold.
    pub fn record(&mut self, received: usize) -> bool {
        if received == 0 {
            self.count += 1;
        } else {
            self.count = 0;
        }
        self.count >= self.threshold
    }

    pub fn count(&self) -> u32 {
        self.count
    }
}

/// One worker driving the receive -> deliver -> delete cycle against
/// the shared source and sink until its own empty streak fires.
struct Poller {
    id: usize,
    source: DlqSource,
    sink: Arc<SinkWriter>,
    keep: bool,
    streak: EmptyStreak,
}

impl Poller {
    async fn run(mut self) -> Result<()> {
        loop {
            let batch = self.source.receive_batch().await?;
            if self.streak.record(batch.len()) {
                info!(poller = self.id, "Empty-receive threshold reached, poller done");
                return Ok(());
            }
            if batch.is_empty() {
                continue;
            }

            self.sink.deliver(&batch).await?;

            if !self.keep {
                self.source.delete_batch(&batch).await?;
            }

            debug!(poller = self.id, count = batch.len(), "Forwarded batch");
        }
    }
}

/// Runs `settings.concurrency` pollers against the same source and sink
/// and waits for all of them. The first failure wins and is reported;
/// sibling pollers already in flight are detached rather than
/// cancelled, so they run to their own terminal point.
pub async fn run_drain(
    source: DlqSource,
    sink: Arc<SinkWriter>,
    settings: &Settings,
) -> Result<()> {
    let handles: Vec<_> = (0..settings.concurrency)
        .map(|id| {
            let poller = Poller {
                id,
                source: source.clone(),
                sink: Arc::clone(&sink),
                keep: settings.keep,
                streak: EmptyStreak::new(settings.max_empty_receives),
            };
            tokio::spawn(poller.run())
        })
        .collect();

    try_join_all(handles.into_iter().map(|handle| async move {
        handle
            .await
            .map_err(|e| Error::Join(format!("joining poller: {e}")))?
    }))
    .await?;

    info!(concurrency = settings.concurrency, "All pollers finished");
    Ok(())
}
