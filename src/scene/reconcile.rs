//! Scene state transitions.
//!
//! `apply` is the only path from a render result into the scene. It drops
//! anything that does not answer the current generation.

use super::{RenderStatus, SceneState};
use crate::core::SourceId;
use crate::diagnostic::LogEntry;
use crate::renderer::{RenderOutcome, RenderResult};

/// Reconcile a render result. Returns whether the state changed.
pub fn apply(result: RenderResult, state: &mut SceneState) -> bool {
    if result.generation != state.generation {
        crate::debug!("scene"; "discard stale generation {} (current {})", result.generation, state.generation);
        return false;
    }

    match result.outcome {
        RenderOutcome::Success(artifact) => {
            state.artifact = Some(artifact);
            state.log = result.log;
            state.status = RenderStatus::Succeeded;
        }
        RenderOutcome::Failed { .. } => {
            state.artifact = None;
            state.log = result.log;
            state.status = RenderStatus::Failed;
        }
        RenderOutcome::Cancelled => return false,
    }
    true
}

/// A request for `generation` was handed to the renderer.
pub(crate) fn begin(state: &mut SceneState, generation: u64, source: SourceId) {
    state.generation = generation;
    state.source = source;
    state.status = RenderStatus::Rendering;
}

/// A request for `generation` was accepted but needs no render.
pub(crate) fn park(state: &mut SceneState, generation: u64, source: SourceId) {
    state.generation = generation;
    state.source = source;
    state.status = RenderStatus::Idle;
}

pub(crate) fn clear_log(state: &mut SceneState) {
    state.log.clear();
}

pub(crate) fn push_notice(state: &mut SceneState, entry: LogEntry) {
    state.log.push(entry);
}
