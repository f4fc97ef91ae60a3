//! Process-wide drag-drop subsystem initialization.
//!
//! Registration can fail because the subsystem was never initialized on the
//! UI thread. In that case a target initializes it itself, retries once, and
//! gives the initialization back when it is destroyed. Initializations are
//! counted so several targets in one process share a single one.

use std::sync::{Mutex, PoisonError};

use crate::error::{Error, RegisterError, Result};

pub trait Subsystem: Sync {
    fn initialize(&self) -> Result<()>;
    fn uninitialize(&self);
}

pub struct SubsystemCounter {
    subsystem: &'static dyn Subsystem,
    count: Mutex<usize>,
}

impl SubsystemCounter {
    pub const fn new(subsystem: &'static dyn Subsystem) -> Self {
        Self { subsystem, count: Mutex::new(0) }
    }

    /// Initializes the subsystem if no lease is outstanding.
    pub fn acquire(&'static self) -> Result<SubsystemLease> {
        let mut count = self.count.lock().unwrap_or_else(PoisonError::into_inner);
        if *count == 0 {
            self.subsystem.initialize()?;
        }
        *count += 1;
        Ok(SubsystemLease { counter: self })
    }

    /// Takes a lease only if the subsystem is already up.
    pub fn join(&'static self) -> Option<SubsystemLease> {
        let mut count = self.count.lock().unwrap_or_else(PoisonError::into_inner);
        if *count == 0 {
            return None;
        }
        *count += 1;
        Some(SubsystemLease { counter: self })
    }

    pub fn leases(&self) -> usize {
        *self.count.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn give_back(&self) {
        let mut count = self.count.lock().unwrap_or_else(PoisonError::into_inner);
        *count -= 1;
        if *count == 0 {
            self.subsystem.uninitialize();
        }
    }
}

/// One counted initialization, undone on drop.
pub struct SubsystemLease {
    counter: &'static SubsystemCounter,
}

impl Drop for SubsystemLease {
    fn drop(&mut self) {
        self.counter.give_back();
    }
}

impl std::fmt::Debug for SubsystemLease {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubsystemLease").finish_non_exhaustive()
    }
}

#[derive(Debug, Default)]
pub struct Registration {
    pub registered: bool,
    /// Present when the subsystem was initialized for this registration or
    /// was already held up by another one.
    pub lease: Option<SubsystemLease>,
}

/// Runs `register`. When it fails with [`RegisterError::OutOfMemory`] the
/// subsystem is initialized and `register` is retried exactly once. A final
/// failure is logged, never returned.
///
/// A registration that succeeds while another target holds the subsystem up
/// joins that initialization, so it outlives neither.
pub fn register_with_retry<F>(subsystem: &'static SubsystemCounter, mut register: F) -> Registration
where
    F: FnMut() -> std::result::Result<(), RegisterError>,
{
    let mut lease = None;
    let mut result = register();

    if result == Err(RegisterError::OutOfMemory) {
        match subsystem.acquire() {
            Ok(acquired) => {
                tracing::debug!("drag-drop subsystem initialized, retrying registration");
                lease = Some(acquired);
                result = register();
            }
            Err(e) => tracing::warn!("{}", e),
        }
    }

    match result {
        Ok(()) if lease.is_none() => lease = subsystem.join(),
        Ok(()) => {}
        Err(e) => tracing::warn!("{}", Error::from(e)),
    }

    Registration { registered: result.is_ok(), lease }
}
