#![forbid(unsafe_code)]

//! Single-threaded task spawning for mount resolution.
//!
//! Component factories return futures, so the router needs somewhere to run
//! them. The [`Spawn`] seam keeps the router agnostic: hosts with their own
//! scheduler implement it, everything else gets [`LocalExecutor`], a thin
//! handle over `futures::executor::LocalPool`.
//!
//! # Design
//!
//! The pool is deliberately not `Send`; the whole router is a
//! single-threaded cooperative system and `Rc`-held state flows through
//! spawned tasks. [`LocalExecutor::drive`] refuses to re-enter itself: a
//! task that calls `drive` on a clone of its own executor gets `false`
//! back instead of a deadlock or a panic.

use futures::executor::{LocalPool, LocalSpawner};
use futures::future::LocalBoxFuture;
use futures::task::LocalSpawnExt;
use std::cell::RefCell;
use std::rc::Rc;

/// Where the router submits mount-resolution tasks.
pub trait Spawn {
    /// Queues a task for execution on the host's scheduler.
    fn spawn_local(&self, task: LocalBoxFuture<'static, ()>);
}

/// Clonable handle over a shared `LocalPool`.
pub struct LocalExecutor {
    pool: Rc<RefCell<LocalPool>>,
    spawner: LocalSpawner,
}

impl LocalExecutor {
    /// Creates a fresh pool and a handle to it.
    #[must_use]
    pub fn new() -> Self {
        let pool = LocalPool::new();
        let spawner = pool.spawner();
        Self { pool: Rc::new(RefCell::new(pool)), spawner }
    }

    /// Runs queued tasks until all are complete or stalled on a pending
    /// future. Returns `false` when called re-entrantly from inside a task
    /// already being driven.
    pub fn drive(&self) -> bool {
        let Ok(mut pool) = self.pool.try_borrow_mut() else {
            return false;
        };
        pool.run_until_stalled();
        true
    }
}

impl Default for LocalExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for LocalExecutor {
    fn clone(&self) -> Self {
        Self { pool: Rc::clone(&self.pool), spawner: self.spawner.clone() }
    }
}

impl Spawn for LocalExecutor {
    fn spawn_local(&self, task: LocalBoxFuture<'static, ()>) {
        if let Err(err) = self.spawner.spawn_local(task) {
            tracing::error!(message = "task.spawn_failed", error = %err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;
    use futures::channel::oneshot;
    use std::cell::Cell;

    #[test]
    fn spawned_task_runs_when_driven() {
        let executor = LocalExecutor::new();
        let ran = Rc::new(Cell::new(false));
        let flag = Rc::clone(&ran);
        executor.spawn_local(async move { flag.set(true) }.boxed_local());
        assert!(!ran.get());
        assert!(executor.drive());
        assert!(ran.get());
    }

    #[test]
    fn pending_task_survives_a_stalled_drive() {
        let executor = LocalExecutor::new();
        let (tx, rx) = oneshot::channel::<u32>();
        let seen = Rc::new(Cell::new(0));
        let sink = Rc::clone(&seen);
        executor.spawn_local(
            async move {
                if let Ok(value) = rx.await {
                    sink.set(value);
                }
            }
            .boxed_local(),
        );
        executor.drive();
        assert_eq!(seen.get(), 0);
        tx.send(7).unwrap();
        executor.drive();
        assert_eq!(seen.get(), 7);
    }

    #[test]
    fn reentrant_drive_is_refused_not_fatal() {
        let executor = LocalExecutor::new();
        let inner = executor.clone();
        let refused = Rc::new(Cell::new(false));
        let flag = Rc::clone(&refused);
        executor.spawn_local(
            async move {
                flag.set(!inner.drive());
            }
            .boxed_local(),
        );
        assert!(executor.drive());
        assert!(refused.get());
    }

    #[test]
    fn clones_share_one_pool() {
        let executor = LocalExecutor::new();
        let other = executor.clone();
        let ran = Rc::new(Cell::new(false));
        let flag = Rc::clone(&ran);
        other.spawn_local(async move { flag.set(true) }.boxed_local());
        executor.drive();
        assert!(ran.get());
    }
}
