use std::ops::ControlFlow;

use tokio_util::sync::CancellationToken;

use super::debouncer::Pending;
use super::{InFlight, SHUTDOWN_GRACE, Scheduler};
use crate::actor::messages::SceneEvent;
use crate::core::{DocumentSnapshot, PaneMode};
use crate::freshness::fingerprint;
use crate::renderer::{RenderRequest, RenderResult};
use crate::scene;

impl Scheduler {
    /// Main event loop
    pub async fn run(mut self) {
        loop {
            tokio::select! {
                biased;

                // Completions first: a busy event queue must not hold back results
                Some(result) = self.done_rx.recv() => self.on_complete(result),

                event = self.rx.recv() => {
                    // All handles dropped counts as shutdown
                    let Some(event) = event else { break };
                    if self.dispatch(event).is_break() {
                        break;
                    }
                }

                _ = tokio::time::sleep(self.debouncer.sleep_duration()), if self.debouncer.is_pending() => {
                    self.on_expiry();
                }
            }
        }

        self.shutdown().await;
    }

    /// Dispatch event to handler
    fn dispatch(&mut self, event: SceneEvent) -> ControlFlow<()> {
        match event {
            SceneEvent::Edit(snapshot) => {
                self.latest = Some(snapshot.clone());
                self.consider(snapshot, self.state.pane, false);
            }
            SceneEvent::SetPane(pane) => self.on_pane(pane),
            SceneEvent::Refresh => {
                if let Some(snapshot) = self.latest.clone() {
                    self.consider(snapshot, self.state.pane, true);
                }
            }
            SceneEvent::ClearLog => {
                scene::clear_log(&mut self.state);
                self.publish();
            }
            SceneEvent::AppendNotice(entry) => {
                scene::push_notice(&mut self.state, entry);
                self.publish();
            }
            SceneEvent::Shutdown => {
                crate::debug!("scheduler"; "shutting down");
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }

    fn on_pane(&mut self, pane: PaneMode) {
        if pane == self.state.pane {
            return;
        }
        self.state.pane = pane;
        self.publish();

        if let Some(snapshot) = self.latest.clone() {
            self.consider(snapshot, pane, false);
        }
    }

    /// Enter or refresh the pending state, unless the fingerprint is back
    /// at the last accepted one.
    fn consider(&mut self, snapshot: DocumentSnapshot, pane: PaneMode, force: bool) {
        let fingerprint = fingerprint(&snapshot, pane);

        if !force && self.accepted == Some(fingerprint) {
            if self.debouncer.clear() {
                crate::debug!("scheduler"; "back to accepted state, pending request dropped");
            }
            return;
        }

        self.debouncer.push(Pending {
            snapshot,
            pane,
            fingerprint,
        });
    }

    /// Debounce expired: supersede the in-flight render with a new generation.
    fn on_expiry(&mut self) {
        let Some(pending) = self.debouncer.take_if_ready() else {
            return;
        };

        if let Some(in_flight) = self.in_flight.take() {
            in_flight.cancel.cancel();
            crate::debug!("scheduler"; "generation {} superseded", in_flight.generation);
        }

        self.generation += 1;
        let generation = self.generation;
        self.accepted = Some(pending.fingerprint);
        let source = pending.snapshot.source.clone();

        if !pending.pane.shows_preview() {
            scene::park(&mut self.state, generation, source);
            self.publish();
            crate::debug!("scheduler"; "generation {} needs no preview", generation);
            return;
        }

        scene::begin(&mut self.state, generation, source);
        self.publish();

        let cancel = CancellationToken::new();
        let request = RenderRequest {
            generation,
            snapshot: pending.snapshot,
            pane: pending.pane,
        };
        let render = self.renderer.render(request, cancel.clone());
        let done_tx = self.done_tx.clone();
        let task = tokio::spawn(async move {
            // Scheduler gone means nobody wants the result
            let _ = done_tx.send(render.await);
        });

        crate::debug!("scheduler"; "generation {} started", generation);
        self.in_flight = Some(InFlight {
            generation,
            cancel,
            task,
        });
    }

    /// Render finished; only the current generation is reconciled.
    fn on_complete(&mut self, result: RenderResult) {
        if result.generation != self.generation {
            crate::debug!("scheduler"; "dropped result of stale generation {}", result.generation);
            return;
        }

        if self
            .in_flight
            .as_ref()
            .is_some_and(|f| f.generation == result.generation)
        {
            self.in_flight = None;
        }

        if scene::apply(result, &mut self.state) {
            self.publish();
        }
    }

    async fn shutdown(&mut self) {
        self.debouncer.clear();
        let Some(in_flight) = self.in_flight.take() else {
            return;
        };

        in_flight.cancel.cancel();
        if tokio::time::timeout(SHUTDOWN_GRACE, in_flight.task).await.is_err() {
            crate::debug!("scheduler"; "generation {} still winding down", in_flight.generation);
        }
    }
}
