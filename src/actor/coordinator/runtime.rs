use std::time::Duration;

use crossbeam::channel::Receiver;

use crate::actor::output::OutputActor;
use crate::actor::watcher::WatcherActor;
use crate::scene::SceneHandle;

/// Let the output actor print the final state before exiting.
const OUTPUT_DRAIN: Duration = Duration::from_millis(500);

/// Run all actors until shutdown or until the watcher stops.
pub(super) async fn run_actors(
    watcher: WatcherActor,
    output: OutputActor,
    scene: SceneHandle,
    shutdown_rx: Option<Receiver<()>>,
) {
    let output_handle = tokio::spawn(output.run());
    let mut watcher_handle = tokio::spawn(watcher.run());

    if let Some(rx) = shutdown_rx {
        loop {
            if rx.try_recv().is_ok() {
                crate::debug!("actor"; "shutdown signal received");
                break;
            }
            tokio::select! {
                _ = &mut watcher_handle => break,
                _ = tokio::time::sleep(Duration::from_millis(100)) => {}
            }
        }
    } else {
        let _ = (&mut watcher_handle).await;
    }

    watcher_handle.abort();
    // Cancels the in-flight render and stops the scheduler
    scene.close().await;

    let _ = tokio::time::timeout(OUTPUT_DRAIN, output_handle).await;
}
