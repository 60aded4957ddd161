//! Renderer process termination.
//!
//! Renderers run in their own process group so helpers they start (e.g. an
//! ABC or LilyPond converter) go down with them.

use std::time::Duration;

use tokio::process::Child;

/// Ask the process group to stop, then kill it after `grace`.
#[cfg_attr(not(unix), allow(unused_variables))]
pub(super) async fn terminate(child: &mut Child, pid: Option<u32>, grace: Duration) {
    #[cfg(unix)]
    if let Some(pid) = pid {
        signal_group(pid, nix::sys::signal::Signal::SIGTERM);
        let _ = tokio::time::timeout(grace, child.wait()).await;
        // Stragglers in the group outlive the leader's exit
        signal_group(pid, nix::sys::signal::Signal::SIGKILL);
        reap(child, grace).await;
        return;
    }

    let _ = child.start_kill();
    reap(child, grace).await;
}

/// Kill the process group without a grace period.
#[cfg_attr(not(unix), allow(unused_variables))]
pub(super) async fn kill(child: &mut Child, pid: Option<u32>, grace: Duration) {
    #[cfg(unix)]
    if let Some(pid) = pid {
        signal_group(pid, nix::sys::signal::Signal::SIGKILL);
    }

    let _ = child.start_kill();
    reap(child, grace).await;
}

async fn reap(child: &mut Child, limit: Duration) {
    if tokio::time::timeout(limit, child.wait()).await.is_err() {
        crate::debug!("render"; "renderer did not exit within {:?}", limit);
    }
}

#[cfg(unix)]
fn signal_group(pid: u32, signal: nix::sys::signal::Signal) {
    use nix::sys::signal::killpg;
    use nix::unistd::Pid;

    let Ok(raw) = i32::try_from(pid) else {
        return;
    };
    // ESRCH: the whole group is already gone
    if let Err(err) = killpg(Pid::from_raw(raw), signal)
        && err != nix::errno::Errno::ESRCH
    {
        crate::debug!("render"; "{:?} to group {}: {}", signal, raw, err);
    }
}
