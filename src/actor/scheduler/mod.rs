//! Scheduler Actor - one per scene
//!
//! Turns edit events into render requests and render results into scene
//! state:
//! - Events are fingerprinted; a request is only made when the fingerprint
//!   moves away from the last accepted one
//! - Bursts are coalesced by the debouncer into one pending request
//! - On expiry the in-flight render is cancelled and the next generation
//!   is handed to the renderer
//! - Results come back tagged with their generation; only the current one
//!   reaches the scene

mod debouncer;
mod dispatch;


use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::messages::SceneEvent;
use crate::core::DocumentSnapshot;
use crate::freshness::Fingerprint;
use crate::renderer::{RenderResult, Renderer};
use crate::scene::SceneState;
use debouncer::Debouncer;

/// How long shutdown waits for a cancelled render to wind down.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// The render currently handed to the renderer.
struct InFlight {
    generation: u64,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

pub struct Scheduler {
    rx: mpsc::Receiver<SceneEvent>,
    renderer: Arc<dyn Renderer>,
    state: SceneState,
    state_tx: watch::Sender<Arc<SceneState>>,
    debouncer: Debouncer,
    /// Latest snapshot seen, for pane changes and refreshes
    latest: Option<DocumentSnapshot>,
    /// Fingerprint of the last accepted request
    accepted: Option<Fingerprint>,
    /// Last allocated generation
    generation: u64,
    in_flight: Option<InFlight>,
    done_tx: mpsc::UnboundedSender<RenderResult>,
    done_rx: mpsc::UnboundedReceiver<RenderResult>,
}

impl Scheduler {
    pub fn new(
        rx: mpsc::Receiver<SceneEvent>,
        renderer: Arc<dyn Renderer>,
        state: SceneState,
        state_tx: watch::Sender<Arc<SceneState>>,
        debounce: Duration,
    ) -> Self {
        let (done_tx, done_rx) = mpsc::unbounded_channel();
        Self {
            rx,
            renderer,
            generation: state.generation,
            state,
            state_tx,
            debouncer: Debouncer::new(debounce),
            latest: None,
            accepted: None,
            in_flight: None,
            done_tx,
            done_rx,
        }
    }

    /// Publish the current state to observers.
    fn publish(&self) {
        self.state_tx.send_replace(Arc::new(self.state.clone()));
    }
}
