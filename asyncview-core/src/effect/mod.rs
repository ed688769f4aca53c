mod executor;
mod observe;

pub use executor::*;
pub use observe::*;

use std::{
    pin::Pin,
    task::{Context, Poll},
};

/// A unit of asynchronous work which runs with access to `Data` each time it is polled.
///
/// Effects are the bridge between futures and the widget tree: the executor polls them with the
/// current state, and they complete by returning [`Poll::Ready`].
pub trait Effect<Data> {
    fn poll_effect(self: Pin<&mut Self>, data: &mut Data, cx: &mut Context<'_>) -> Poll<()>;
}
