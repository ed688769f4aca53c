use std::{
    mem,
    pin::Pin,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Weak,
    },
    task::{Context, Poll, Waker},
};

use futures::task::{waker_ref, ArcWake};
use parking_lot::Mutex;
use slotmap::new_key_type;

use crate::error::{Error, Result};

use super::Effect;

struct SharedTaskData {
    aborted: AtomicBool,
    /// Set once the executor has picked up the task
    waker: Mutex<Option<Weak<TaskWaker>>>,
}

/// Represents a handle to a running task.
pub struct TaskHandle {
    shared: Weak<SharedTaskData>,
}

impl TaskHandle {
    pub fn abort_on_drop(self) -> AbortTaskHandle {
        AbortTaskHandle(self)
    }

    /// Aborts the task remotely.
    ///
    /// The task is woken so that the executor drops it on the next update, even if nothing else
    /// would ever wake it again.
    pub fn abort(&self) {
        if let Some(shared) = self.shared.upgrade() {
            shared.aborted.store(true, Ordering::SeqCst);

            let waker = shared.waker.lock().as_ref().and_then(Weak::upgrade);
            if let Some(waker) = waker {
                ArcWake::wake_by_ref(&waker);
            }
        }
    }

    /// Returns true if the task has neither finished nor been aborted
    pub fn is_running(&self) -> bool {
        self.shared
            .upgrade()
            .is_some_and(|shared| !shared.aborted.load(Ordering::Relaxed))
    }
}

impl std::fmt::Debug for TaskHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskHandle")
            .field("running", &self.is_running())
            .finish()
    }
}

/// Variant of a task handle which aborts the task when dropped
#[derive(Debug)]
pub struct AbortTaskHandle(TaskHandle);

impl AbortTaskHandle {
    pub fn abort(&self) {
        self.0.abort()
    }
}

impl Drop for AbortTaskHandle {
    fn drop(&mut self) {
        self.abort()
    }
}

new_key_type! {
    struct TaskKey;
}

struct TaskWaker {
    key: TaskKey,
    shared: Arc<Shared>,
    sent: AtomicBool,
}

impl ArcWake for TaskWaker {
    fn wake_by_ref(arc_self: &Arc<Self>) {
        if arc_self
            .sent
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
        {
            arc_self.shared.push_ready(arc_self.key);
        } else {
            tracing::trace!("Task already woken");
        }
    }
}

/// Represents a unit of effect execution which runs using `T`
pub(crate) struct Task<T> {
    effect: Pin<Box<dyn Effect<T>>>,

    shared: Arc<SharedTaskData>,
}

impl<T> Task<T> {
    pub(crate) fn new(effect: Pin<Box<dyn Effect<T>>>) -> (Task<T>, TaskHandle) {
        let shared = Arc::new(SharedTaskData {
            aborted: AtomicBool::new(false),
            waker: Mutex::new(None),
        });

        let handle = TaskHandle {
            shared: Arc::downgrade(&shared),
        };

        let task = Self { effect, shared };

        (task, handle)
    }

    fn update(&mut self, waker: &Arc<TaskWaker>, state: &mut T) -> Poll<()> {
        if self.shared.aborted.load(Ordering::Relaxed) {
            tracing::info!("Task aborted remotely");
            return Poll::Ready(());
        }

        let waker = waker_ref(waker);
        let mut cx = Context::from_waker(&waker);

        self.effect.as_mut().poll_effect(state, &mut cx)
    }
}

struct Shared {
    /// Tasks which are ready to be polled again
    ready: Mutex<Vec<TaskKey>>,
    /// Wakes whoever drives the executor
    waker: Mutex<Option<Waker>>,
}

impl Shared {
    fn push_ready(&self, key: TaskKey) {
        self.ready.lock().push(key);
        self.wake();
    }

    fn wake(&self) {
        if let Some(waker) = &*self.waker.lock() {
            waker.wake_by_ref();
        }
    }
}

/// Executes `Tasks` against a shared state `T`.
///
/// Tasks are only polled when woken, and each poll receives mutable access to the state. Tasks
/// spawned while polling are picked up on the next update.
pub struct Executor<T> {
    tasks: slotmap::SlotMap<TaskKey, (Task<T>, Arc<TaskWaker>)>,
    new_tasks_tx: flume::Sender<Task<T>>,
    new_tasks_rx: flume::Receiver<Task<T>>,
    shared: Arc<Shared>,
}

impl<T> Executor<T> {
    pub fn new() -> Self {
        let shared = Arc::new(Shared {
            ready: Default::default(),
            waker: Default::default(),
        });

        let (new_tasks_tx, new_tasks_rx) = flume::unbounded();

        Self {
            tasks: Default::default(),
            new_tasks_tx,
            new_tasks_rx,
            shared,
        }
    }

    pub fn spawner(&self) -> TaskSpawner<T> {
        TaskSpawner {
            tx: self.new_tasks_tx.clone(),
            shared: Arc::downgrade(&self.shared),
        }
    }

    /// Returns true if there are tasks waiting to be polled
    pub fn has_pending(&self) -> bool {
        !self.new_tasks_rx.is_empty() || !self.shared.ready.lock().is_empty()
    }

    /// Returns true if no tasks are alive
    pub fn is_idle(&self) -> bool {
        self.tasks.is_empty() && self.new_tasks_rx.is_empty()
    }

    /// Poll until there are tasks ready to update
    pub fn poll_update(&mut self, cx: &mut Context<'_>, state: &mut T) -> Poll<()> {
        // Register before checking to not miss a wakeup in between
        *self.shared.waker.lock() = Some(cx.waker().clone());

        if self.has_pending() {
            self.update(state);
            Poll::Ready(())
        } else {
            Poll::Pending
        }
    }

    /// Updates the executor, polling ready tasks using the provided state
    pub fn update(&mut self, state: &mut T) {
        let mut processing = mem::take(&mut *self.shared.ready.lock());

        // Drain all new tasks and put them into the slotmap
        for new_task in self.new_tasks_rx.try_iter() {
            let key = self.tasks.insert_with_key(|key| {
                let waker = Arc::new(TaskWaker {
                    key,
                    shared: self.shared.clone(),
                    sent: AtomicBool::new(false),
                });

                *new_task.shared.waker.lock() = Some(Arc::downgrade(&waker));
                (new_task, waker)
            });

            processing.push(key);
        }

        for key in processing {
            let Some((task, waker)) = self.tasks.get_mut(key) else {
                tracing::debug!(?key, "No such task");
                continue;
            };

            // Reset the waker so that it is ready to use again
            waker.sent.store(false, Ordering::SeqCst);

            // Poll the task, removing the task if ready
            if task.update(waker, state).is_ready() {
                self.tasks.remove(key);
            }
        }
    }
}

impl<T> Default for Executor<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Allows spawning tasks
pub struct TaskSpawner<T> {
    tx: flume::Sender<Task<T>>,
    shared: Weak<Shared>,
}

impl<T> Clone for TaskSpawner<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            shared: self.shared.clone(),
        }
    }
}

impl<T> TaskSpawner<T> {
    /// Spawns a new task.
    pub fn spawn<E>(&self, effect: E) -> Result<TaskHandle>
    where
        E: 'static + Effect<T>,
    {
        self.spawn_boxed(Box::pin(effect))
    }

    pub fn spawn_boxed(&self, effect: Pin<Box<dyn Effect<T>>>) -> Result<TaskHandle> {
        let shared = self.shared.upgrade().ok_or(Error::ExecutorStopped)?;

        let (task, handle) = Task::new(effect);

        self.tx.send(task).map_err(|_| Error::ExecutorStopped)?;
        shared.wake();

        Ok(handle)
    }
}

#[cfg(test)]
mod test {
    use futures::{channel::oneshot, Future};

    use super::*;

    /// Pushes the received value into the state
    struct Collect(oneshot::Receiver<i32>);

    impl Effect<Vec<i32>> for Collect {
        fn poll_effect(
            mut self: Pin<&mut Self>,
            state: &mut Vec<i32>,
            cx: &mut Context<'_>,
        ) -> Poll<()> {
            match Pin::new(&mut self.0).poll(cx) {
                Poll::Ready(Ok(value)) => {
                    state.push(value);
                    Poll::Ready(())
                }
                Poll::Ready(Err(_)) => Poll::Ready(()),
                Poll::Pending => Poll::Pending,
            }
        }
    }

    #[test]
    fn wakes_only_woken_tasks() {
        let mut executor = Executor::new();
        let spawner = executor.spawner();
        let mut state = Vec::new();

        let (tx1, rx1) = oneshot::channel();
        let (tx2, rx2) = oneshot::channel();

        spawner.spawn(Collect(rx1)).unwrap();
        spawner.spawn(Collect(rx2)).unwrap();

        assert!(executor.has_pending());
        executor.update(&mut state);
        assert!(state.is_empty());
        assert!(!executor.has_pending());
        assert!(!executor.is_idle());

        tx2.send(2).unwrap();
        assert!(executor.has_pending());
        executor.update(&mut state);
        assert_eq!(state, [2]);

        tx1.send(1).unwrap();
        executor.update(&mut state);
        assert_eq!(state, [2, 1]);
        assert!(executor.is_idle());
    }

    #[test]
    fn abort() {
        let mut executor = Executor::new();
        let spawner = executor.spawner();
        let mut state = Vec::new();

        let (tx, rx) = oneshot::channel();
        let handle = spawner.spawn(Collect(rx)).unwrap();
        executor.update(&mut state);
        assert!(handle.is_running());

        drop(handle.abort_on_drop());

        tx.send(5).unwrap();
        executor.update(&mut state);

        assert!(state.is_empty());
        assert!(executor.is_idle());
    }

    #[test]
    fn abort_wakes_task() {
        let mut executor = Executor::new();
        let spawner = executor.spawner();
        let mut state = Vec::new();

        // Never completes
        let (_tx, rx) = oneshot::channel();
        let handle = spawner.spawn(Collect(rx)).unwrap();
        executor.update(&mut state);
        assert!(!executor.has_pending());

        handle.abort();
        assert!(!handle.is_running());
        assert!(executor.has_pending());

        executor.update(&mut state);
        assert!(executor.is_idle());
        assert!(!executor.has_pending());
    }

    #[test]
    fn abort_before_first_update() {
        let mut executor = Executor::new();
        let spawner = executor.spawner();
        let mut state = Vec::new();

        let (_tx, rx) = oneshot::channel();
        spawner.spawn(Collect(rx)).unwrap().abort();

        executor.update(&mut state);
        assert!(executor.is_idle());
    }

    #[test]
    fn spawn_without_executor() {
        let executor = Executor::<Vec<i32>>::new();
        let spawner = executor.spawner();
        drop(executor);

        let (_tx, rx) = oneshot::channel();
        let res = spawner.spawn(Collect(rx));

        assert!(matches!(res, Err(Error::ExecutorStopped)));
    }
}
