//! Renders a view for each state of a single asynchronous operation.
//!
//! An [`AsyncResult`] observes one [`AsyncOperation`] and mounts exactly one child at a time,
//! chosen by its [`Resolvers`] from the latest [`Observation`]:
//!
//! | state                                 | view                                      |
//! |---------------------------------------|-------------------------------------------|
//! | none                                  | `on_none`, or `Placeholder::None`         |
//! | waiting                               | `on_waiting`, or `Placeholder::Loading`   |
//! | active                                | `on_active`, or `Placeholder::Loading`    |
//! | done with an error, or without data   | `on_future_error`, or `Placeholder::Error`|
//! | done with data rejected by `validate` | `on_data_error`, or `Placeholder::Error`  |
//! | done with data                        | the required `done` view                  |
mod observation;
mod resolvers;

pub use observation::*;
pub use resolvers::*;

use futures::{Future, Stream};

use crate::{
    components::connection_state,
    effect::AsyncOperation,
    widget::Widget,
    Scope,
};

/// Widget which swaps its child as the observed operation progresses
pub struct AsyncResult<T, E> {
    operation: AsyncOperation<T, E>,
    resolvers: Resolvers<T, Box<dyn Widget>>,
}

impl<T, E> AsyncResult<T, E>
where
    T: 'static,
    E: 'static,
{
    /// Observe a future, showing `done` once it resolves successfully
    pub fn new<W>(
        fut: impl 'static + Future<Output = Result<T, E>>,
        done: impl 'static + Fn(&mut Scope<'_>, &T) -> W,
    ) -> Self
    where
        W: 'static + Widget,
    {
        Self::from_operation(AsyncOperation::future(fut), done)
    }

    /// Observe a stream, where each item is reported as active until the stream ends
    pub fn from_stream<W>(
        stream: impl 'static + Stream<Item = Result<T, E>>,
        done: impl 'static + Fn(&mut Scope<'_>, &T) -> W,
    ) -> Self
    where
        W: 'static + Widget,
    {
        Self::from_operation(AsyncOperation::stream(stream), done)
    }

    pub fn from_operation<W>(
        operation: AsyncOperation<T, E>,
        done: impl 'static + Fn(&mut Scope<'_>, &T) -> W,
    ) -> Self
    where
        W: 'static + Widget,
    {
        Self {
            operation,
            resolvers: Resolvers::new(move |scope, data| boxed(done(scope, data))),
        }
    }

    pub fn on_none<W: 'static + Widget>(
        mut self,
        f: impl 'static + Fn(&mut Scope<'_>) -> W,
    ) -> Self {
        self.resolvers = self.resolvers.with_none(move |scope| boxed(f(scope)));
        self
    }

    pub fn on_waiting<W: 'static + Widget>(
        mut self,
        f: impl 'static + Fn(&mut Scope<'_>) -> W,
    ) -> Self {
        self.resolvers = self.resolvers.with_waiting(move |scope| boxed(f(scope)));
        self
    }

    pub fn on_active<W: 'static + Widget>(
        mut self,
        f: impl 'static + Fn(&mut Scope<'_>) -> W,
    ) -> Self {
        self.resolvers = self.resolvers.with_active(move |scope| boxed(f(scope)));
        self
    }

    /// Shown when the operation fails or completes without data
    pub fn on_future_error<W: 'static + Widget>(
        mut self,
        f: impl 'static + Fn(&mut Scope<'_>) -> W,
    ) -> Self {
        self.resolvers = self
            .resolvers
            .with_future_error(move |scope| boxed(f(scope)));
        self
    }

    /// Shown when the validator rejects the data.
    ///
    /// Kept apart from [`Self::on_future_error`] even though both default to the same
    /// error placeholder.
    pub fn on_data_error<W: 'static + Widget>(
        mut self,
        f: impl 'static + Fn(&mut Scope<'_>, &T) -> W,
    ) -> Self {
        self.resolvers = self
            .resolvers
            .with_data_error(move |scope, data| boxed(f(scope, data)));
        self
    }

    /// Only show the done view for data accepted by `validator`
    pub fn validate(mut self, validator: impl 'static + Fn(&T) -> bool) -> Self {
        self.resolvers = self.resolvers.with_validator(validator);
        self
    }
}

fn boxed(widget: impl 'static + Widget) -> Box<dyn Widget> {
    Box::new(widget)
}

impl<T, E> Widget for AsyncResult<T, E>
where
    T: 'static,
    E: 'static,
{
    fn mount(self, scope: &mut Scope<'_>) {
        let Self {
            operation,
            resolvers,
        } = self;

        // The operation has not been polled yet
        let initial = Observation::<T, E>::none();
        scope.set(connection_state(), initial.state());
        let view = resolvers.resolve(scope, &initial);
        let mut child = Some(scope.attach(view));

        scope.use_observer(operation, move |scope, observation| {
            scope.set(connection_state(), observation.state());

            if let Some(id) = child.take() {
                scope.detach(id);
            }

            let view = resolvers.resolve(scope, observation);
            child = Some(scope.attach(view));
        });
    }
}

impl<T, E> std::fmt::Debug for AsyncResult<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncResult")
            .field("operation", &self.operation)
            .finish_non_exhaustive()
    }
}
