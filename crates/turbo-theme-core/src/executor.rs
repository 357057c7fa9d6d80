//! Spawning of local (non-`Send`) futures on the UI thread.

use futures::executor::LocalSpawner;
use futures::future::LocalBoxFuture;
use futures::task::LocalSpawnExt;

/// Runs futures to completion on the current thread.
pub trait Executor {
    /// Detach a future. It runs until completion; nothing awaits it.
    fn spawn(&self, task: LocalBoxFuture<'static, ()>);
}

impl Executor for LocalSpawner {
    fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
        // Fails only once the owning pool is gone, when nothing could run it anyway.
        let _ = self.spawn_local(task);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::LocalPool;
    use futures::FutureExt;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_local_spawner_runs_task() {
        let mut pool = LocalPool::new();
        let spawner = pool.spawner();
        let done = Rc::new(Cell::new(false));

        let flag = Rc::clone(&done);
        Executor::spawn(&spawner, async move { flag.set(true) }.boxed_local());
        assert!(!done.get());

        pool.run_until_stalled();
        assert!(done.get());
    }
}
