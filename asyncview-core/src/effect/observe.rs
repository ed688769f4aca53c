use std::{
    pin::Pin,
    task::{Context, Poll},
};

use futures::{
    future::LocalBoxFuture, stream::LocalBoxStream, Future, FutureExt, Stream, StreamExt,
};
use pin_project::pin_project;

use crate::async_result::{ConnectionState, Observation};

use super::Effect;

/// Stream items handled in a single poll before yielding back to the executor
const MAX_ITEMS_PER_POLL: usize = 32;

/// A single asynchronous operation producing values of `T` or failing with `E`
pub enum AsyncOperation<T, E> {
    /// Resolves once
    Future(LocalBoxFuture<'static, Result<T, E>>),
    /// Produces intermediate results until it ends
    Stream(LocalBoxStream<'static, Result<T, E>>),
}

impl<T, E> AsyncOperation<T, E> {
    pub fn future(fut: impl 'static + Future<Output = Result<T, E>>) -> Self {
        Self::Future(fut.boxed_local())
    }

    pub fn stream(stream: impl 'static + Stream<Item = Result<T, E>>) -> Self {
        Self::Stream(stream.boxed_local())
    }
}

impl<T, E> std::fmt::Debug for AsyncOperation<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Future(_) => f.write_str("AsyncOperation::Future"),
            Self::Stream(_) => f.write_str("AsyncOperation::Stream"),
        }
    }
}

/// An effect which drives an operation and invokes `func` with a new [`Observation`] for each
/// state transition.
///
/// The initial `none` state is never reported as the operation has not started when the effect
/// is created. `waiting` is reported the first time the operation is not immediately ready, and
/// the final `done` observation is reported exactly once before the effect completes.
#[pin_project]
pub struct ObserveEffect<T, E, F> {
    operation: AsyncOperation<T, E>,
    observation: Observation<T, E>,
    func: F,
}

impl<T, E, F> ObserveEffect<T, E, F> {
    pub fn new(operation: AsyncOperation<T, E>, func: F) -> Self {
        Self {
            operation,
            observation: Observation::none(),
            func,
        }
    }
}

impl<Data, T, E, F> Effect<Data> for ObserveEffect<T, E, F>
where
    F: FnMut(&mut Data, &Observation<T, E>),
{
    fn poll_effect(self: Pin<&mut Self>, data: &mut Data, cx: &mut Context<'_>) -> Poll<()> {
        let p = self.project();
        let observation = p.observation;
        let func = p.func;

        match p.operation {
            AsyncOperation::Future(fut) => match fut.poll_unpin(cx) {
                Poll::Ready(result) => {
                    *observation = Observation::from_result(ConnectionState::Done, result);
                    (func)(data, observation);
                    Poll::Ready(())
                }
                Poll::Pending => {
                    if observation.state() == ConnectionState::None {
                        *observation = Observation::waiting();
                        (func)(data, observation);
                    }

                    Poll::Pending
                }
            },
            AsyncOperation::Stream(stream) => {
                for _ in 0..MAX_ITEMS_PER_POLL {
                    match stream.poll_next_unpin(cx) {
                        Poll::Ready(Some(result)) => {
                            *observation =
                                Observation::from_result(ConnectionState::Active, result);
                            (func)(data, observation);
                        }
                        Poll::Ready(None) => {
                            // Completion keeps the latest data or error
                            let last = std::mem::take(observation);
                            *observation = last.with_state(ConnectionState::Done);
                            (func)(data, observation);
                            return Poll::Ready(());
                        }
                        Poll::Pending => {
                            if observation.state() == ConnectionState::None {
                                *observation = Observation::waiting();
                                (func)(data, observation);
                            }

                            return Poll::Pending;
                        }
                    }
                }

                // Still ready, let other effects run first
                cx.waker().wake_by_ref();
                Poll::Pending
            }
        }
    }
}
