//! Best-effort submission of location updates.
//!
//! Updates are frequent and perishable. A failed submission is logged and the
//! update is dropped: there is no retry queue, no backoff and no persistence.

use std::sync::Arc;

use futures::FutureExt;
use log::{debug, error};

use crate::collaborators::Submitter;
use crate::scheduler::TaskQueue;
use crate::LocationUpdate;

/// Hands location updates to the integration client off the caller's path.
#[derive(Clone)]
pub struct UpdateSubmitter {
    submitter: Arc<dyn Submitter>,
    queue: Arc<dyn TaskQueue>,
}

impl UpdateSubmitter {
    pub fn new(submitter: Arc<dyn Submitter>, queue: Arc<dyn TaskQueue>) -> Self {
        Self { submitter, queue }
    }

    /// Schedule transmission of `update` and return immediately.
    ///
    /// Submissions are independent of each other; no ordering is guaranteed
    /// between two updates scheduled in quick succession.
    pub fn submit(&self, update: LocationUpdate) {
        let submitter = Arc::clone(&self.submitter);

        self.queue.submit(
            async move {
                match submitter.submit_location_update(&update).await {
                    Ok(()) => debug!(
                        "[UpdateSubmitter] Location update sent ({}, {})",
                        update.gps.latitude, update.gps.longitude
                    ),
                    Err(e) => error!("[UpdateSubmitter] Could not send location update: {}", e),
                }
            }
            .boxed(),
        );
    }
}
