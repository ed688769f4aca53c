mod app;
pub mod async_result;
pub mod components;
pub mod effect;
mod error;
mod frame;
mod scope;
mod widget;

pub use app::*;
pub use error::*;
pub use frame::*;
pub use scope::*;
pub use widget::*;
