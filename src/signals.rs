//! Shutdown signal handling for the compass loop.
//!
//! SIGINT and SIGTERM (and SIGHUP when the terminal goes away) clear a shared
//! `running` flag. The compass command polls the flag between pumps and tears
//! the session down cleanly instead of being killed mid-update.

use anyhow::{Context, Result};
use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGTERM};
use signal_hook::iterator::{Handle, Signals};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

/// Signal handling state shared between threads
pub struct SignalState {
    /// Cleared once a shutdown signal arrives
    pub running: Arc<AtomicBool>,
    handle: Handle,
    thread: Option<JoinHandle<()>>,
}

impl SignalState {
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl Drop for SignalState {
    fn drop(&mut self) {
        self.handle.close();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

/// Register shutdown signals and spawn the thread watching them.
pub fn setup_signal_handler(debug_enabled: bool) -> Result<SignalState> {
    let running = Arc::new(AtomicBool::new(true));

    let mut signals =
        Signals::new([SIGINT, SIGTERM, SIGHUP]).context("failed to register signal handlers")?;
    let handle = signals.handle();
    let running_clone = Arc::clone(&running);

    let thread = thread::spawn(move || {
        for sig in signals.forever() {
            if debug_enabled {
                log_pipe!();
                log_debug!("Received signal {}", signal_name(sig));
            }
            running_clone.store(false, Ordering::SeqCst);
        }
    });

    Ok(SignalState {
        running,
        handle,
        thread: Some(thread),
    })
}

fn signal_name(sig: i32) -> &'static str {
    match sig {
        SIGINT => "SIGINT",
        SIGTERM => "SIGTERM",
        SIGHUP => "SIGHUP",
        _ => "unknown",
    }
}
