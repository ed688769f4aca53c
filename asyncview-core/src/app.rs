use flax::Entity;
use futures::future::poll_fn;

use crate::{effect::Executor, Frame, Widget};

/// Owns the widget tree and drives the effects attached to it.
///
/// The app does not run on its own; call [`App::update`] from an event loop, or await
/// [`App::run`].
pub struct App {
    frame: Frame,
    executor: Executor<Frame>,
}

impl App {
    pub fn new() -> Self {
        let executor = Executor::new();
        let frame = Frame::new(executor.spawner());

        Self { frame, executor }
    }

    /// Mounts a root widget
    pub fn mount(&mut self, widget: impl Widget) -> Entity {
        self.frame.mount_root(widget)
    }

    /// Polls all effects which are ready
    pub fn update(&mut self) {
        self.executor.update(&mut self.frame)
    }

    /// Updates until no effect is ready to make progress.
    ///
    /// Does not return if an effect keeps waking itself.
    pub fn run_until_stalled(&mut self) {
        while self.executor.has_pending() {
            self.update();
        }
    }

    /// Waits until at least one effect is ready and updates the app once
    pub async fn update_async(&mut self) {
        poll_fn(|cx| self.executor.poll_update(cx, &mut self.frame)).await
    }

    /// Runs the app until every effect has finished
    pub async fn run(&mut self) {
        while !self.executor.is_idle() {
            self.update_async().await;
        }
    }

    /// Returns true if no effects are running
    pub fn is_idle(&self) -> bool {
        self.executor.is_idle()
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn frame_mut(&mut self) -> &mut Frame {
        &mut self.frame
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}
