use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, TryLockError};
use std::thread::{self, JoinHandle};

use super::outcome::{SessionStatus, TickOutcome, TickTicket};
use super::SessionFacade;
use crate::error::EngineError;
use crate::progress::Progress;
use crate::store::{UserRecord, UserStore};

/// A snapshot of what needs writing, detached from the session so the
/// writes can happen without holding the session lock.
pub struct PersistJob {
    pub(crate) progress: Progress,
    pub(crate) progress_dir: PathBuf,
    pub(crate) records: Vec<UserRecord>,
    pub(crate) store_path: PathBuf,
    pub(crate) store: Arc<dyn UserStore>,
}

impl PersistJob {
    pub fn run(&self) -> bool {
        let mut ok = true;
        if let Err(e) = self.progress.save(&self.progress_dir) {
            log::error!("{}", EngineError::Persistence(format!("{e:#}")));
            ok = false;
        }
        if let Err(e) = self.store.save(&self.store_path, &self.records) {
            log::error!("{}", EngineError::Persistence(format!("{e:#}")));
            ok = false;
        }
        if ok {
            log::info!("saved {}", self.progress.file_name());
        }
        ok
    }
}

/// The session behind a mutex, shared by the input path and the polling
/// path. All mutation goes through the lock; polling never waits for it.
#[derive(Clone)]
pub struct SharedSession {
    inner: Arc<Mutex<SessionFacade>>,
    /// Sequence of the latest snapshot taken, assigned under the session lock.
    snapshots: Arc<AtomicU64>,
    /// Sequence of the latest snapshot written. Writers hold this lock for
    /// the whole write, so saves never interleave.
    written: Arc<Mutex<u64>>,
}

impl SharedSession {
    pub fn new(facade: SessionFacade) -> Self {
        Self {
            inner: Arc::new(Mutex::new(facade)),
            snapshots: Arc::new(AtomicU64::new(0)),
            written: Arc::new(Mutex::new(0)),
        }
    }

    /// Run `f` with exclusive access to the session.
    pub fn with<R>(&self, f: impl FnOnce(&mut SessionFacade) -> R) -> R {
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    /// Status for a redraw, or `None` if the session is busy right now.
    pub fn poll(&self) -> Option<SessionStatus> {
        self.try_with(SessionFacade::poll_status)
    }

    pub fn begin_tick(&self) -> TickTicket {
        self.with(|facade| facade.begin_tick())
    }

    /// Apply a tick without blocking. `None` means the lock was held; the
    /// caller keeps the elapsed time and tries again on its next tick.
    pub fn tick(&self, ticket: TickTicket, elapsed_ms: u64) -> Option<TickOutcome> {
        self.try_with(|facade| facade.apply_tick(ticket, elapsed_ms))
    }

    /// Snapshot under the lock, then write on a worker thread. `None` when
    /// nobody is logged in. A snapshot older than one already on disk is
    /// dropped rather than written over it.
    pub fn save_in_background(&self) -> Option<JoinHandle<bool>> {
        let (sequence, job) = self.snapshot()?;
        let session = self.clone();
        Some(thread::spawn(move || session.write(sequence, &job)))
    }

    pub(crate) fn snapshot(&self) -> Option<(u64, PersistJob)> {
        self.with(|facade| {
            let job = facade.persist_job()?;
            let sequence = self.snapshots.fetch_add(1, Ordering::SeqCst) + 1;
            Some((sequence, job))
        })
    }

    pub(crate) fn write(&self, sequence: u64, job: &PersistJob) -> bool {
        let mut written = self.written.lock().unwrap_or_else(PoisonError::into_inner);
        if *written > sequence {
            log::debug!("skipping save {sequence}, save {} is already on disk", *written);
            return true;
        }
        let ok = job.run();
        *written = sequence;
        ok
    }

    fn try_with<R>(&self, f: impl FnOnce(&mut SessionFacade) -> R) -> Option<R> {
        match self.inner.try_lock() {
            Ok(mut guard) => Some(f(&mut guard)),
            Err(TryLockError::Poisoned(poisoned)) => Some(f(&mut poisoned.into_inner())),
            Err(TryLockError::WouldBlock) => None,
        }
    }
}
