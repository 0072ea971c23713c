//! Announcement worker.
//!
//! Subscribes to the attack topic and forwards every announcement to the
//! [`Broadcaster`]. It runs after the store writes have committed, so a
//! failed or slow broadcast can only lose the post.

use std::sync::Arc;

use tokio::sync::{broadcast, oneshot};
use tracing::{debug, info, warn};

use crate::directory::Broadcaster;
use crate::events::Event;

pub struct AnnouncementWorker {
    events: broadcast::Receiver<Event>,
    broadcaster: Arc<dyn Broadcaster>,
    shutdown_rx: oneshot::Receiver<()>,
}

impl AnnouncementWorker {
    pub fn new(
        events: broadcast::Receiver<Event>,
        broadcaster: Arc<dyn Broadcaster>,
        shutdown_rx: oneshot::Receiver<()>,
    ) -> Self {
        Self {
            events,
            broadcaster,
            shutdown_rx,
        }
    }

    /// Main worker loop.
    pub async fn run(mut self) {
        loop {
            tokio::select! {
                biased;

                event = self.events.recv() => match event {
                    Ok(Event::Attack(attack)) => {
                        for text in attack.announcements() {
                            if let Err(e) = self.broadcaster.publish(text).await {
                                warn!("Failed to broadcast announcement: {}", e);
                            }
                        }
                    }
                    Ok(other) => debug!("Ignoring non-attack event {:?}", other.topic()),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!("Announcement worker lagged, {} announcements dropped", skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        info!("Event bus closed, shutting down AnnouncementWorker");
                        break;
                    }
                },
                _ = &mut self.shutdown_rx => {
                    info!("AnnouncementWorker shutting down");
                    break;
                }
            }
        }
    }
}
