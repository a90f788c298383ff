//! In-flight resolution deduplication.
//!
//! The cache only knows about settled resolutions; this type closes the
//! gap while one is still in flight. The first caller for an origin URL
//! becomes the leader and owes the coalescer a settlement; every caller
//! arriving before that settlement subscribes to it and receives the
//! leader's [`Resolution`] directly, so the transform runs at most once
//! per URL no matter how many consumers ask concurrently.
//!
//! A leader that goes away without settling (dropped future, panic)
//! closes its channel instead of delivering a value; waiters then race
//! for leadership themselves rather than hanging.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::watch;

use super::Resolution;

/// Per-URL settlement channel: `None` while in flight, `Some` once the
/// leader has settled.
type SettlementSender = watch::Sender<Option<Resolution>>;

/// Deduplicates concurrent resolutions for the same origin URL.
#[derive(Debug, Clone)]
pub struct ResolutionCoalescer {
    in_flight: Arc<tokio::sync::Mutex<HashMap<String, SettlementSender>>>,
}

impl ResolutionCoalescer {
    /// Create a coalescer with no in-flight resolutions.
    pub fn new() -> Self {
        Self {
            in_flight: Arc::new(tokio::sync::Mutex::new(HashMap::new())),
        }
    }

    /// Join the resolution for an origin URL.
    ///
    /// The first caller gets [`CoalescingSlot::Leader`] and must run the
    /// transform, then hand the terminal result to
    /// [`SettlementGuard::settle`]. Every concurrent caller gets
    /// [`CoalescingSlot::Settled`] carrying the leader's result once it
    /// arrives.
    pub async fn acquire(&self, url: &str) -> CoalescingSlot {
        loop {
            let mut rx = {
                let mut in_flight = self.in_flight.lock().await;
                match in_flight.get(url) {
                    Some(sender) => sender.subscribe(),
                    None => {
                        let (sender, _) = watch::channel(None);
                        in_flight.insert(url.to_string(), sender.clone());
                        return CoalescingSlot::Leader(SettlementGuard {
                            url: url.to_string(),
                            coalescer: self.clone(),
                            sender: Some(sender),
                        });
                    }
                }
            };

            match rx.wait_for(|settlement| settlement.is_some()).await {
                Ok(settlement) => {
                    if let Some(resolution) = settlement.clone() {
                        return CoalescingSlot::Settled(resolution);
                    }
                }
                // The leader went away without settling; race for
                // leadership on the next iteration
                Err(_) => {}
            };
        }
    }

    /// Current number of in-flight resolutions.
    pub async fn in_flight_count(&self) -> usize {
        self.in_flight.lock().await.len()
    }

    /// Drop a URL's settlement channel. Releasing the map's sender clone
    /// closes the channel once the leader's clone is gone too.
    async fn remove_in_flight(&self, url: &str) {
        let mut in_flight = self.in_flight.lock().await;
        in_flight.remove(url);
    }
}

impl Default for ResolutionCoalescer {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of joining an in-flight resolution.
#[derive(Debug)]
pub enum CoalescingSlot {
    /// First caller for the URL: run the transform and settle the guard
    /// with the terminal result.
    Leader(SettlementGuard),

    /// Another caller led this URL; this is its terminal result.
    Settled(Resolution),
}

impl CoalescingSlot {
    /// Whether this caller owes the coalescer a settlement.
    pub fn is_leader(&self) -> bool {
        matches!(self, CoalescingSlot::Leader(_))
    }
}

/// The leader's obligation to settle. Held for the duration of the
/// transform; if dropped unsettled, waiters are released to retry instead
/// of receiving a value.
#[derive(Debug)]
pub struct SettlementGuard {
    url: String,
    coalescer: ResolutionCoalescer,
    /// Taken by `settle`; still present in `drop` means the leader never
    /// delivered.
    sender: Option<SettlementSender>,
}

impl SettlementGuard {
    /// Deliver the terminal result to every waiter and retire the
    /// in-flight entry.
    pub async fn settle(mut self, resolution: Resolution) {
        if let Some(sender) = self.sender.take() {
            let _ = sender.send(Some(resolution));
        }
        self.coalescer.remove_in_flight(&self.url).await;
    }
}

impl Drop for SettlementGuard {
    fn drop(&mut self) {
        // Abandoned without settling: retire the entry so the channel
        // closes and waiters stop waiting. Drop is not async, so the map
        // cleanup is spawned.
        if self.sender.take().is_some() {
            let coalescer = self.coalescer.clone();
            let url = std::mem::take(&mut self.url);
            tokio::spawn(async move {
                coalescer.remove_in_flight(&url).await;
            });
        }
    }
}
