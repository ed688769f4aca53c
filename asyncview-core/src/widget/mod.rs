pub mod common;

pub use common::{Placeholder, Text};

use crate::{components::widget_name, Scope};

/// A widget is a low level primitive.
///
/// When a widget is mounted it will attach its state and functionality to a node in the UI.
pub trait Widget: BoxedWidget {
    /// Mount the widget by attaching data and functionality within the supplied scope
    fn mount(self, scope: &mut Scope<'_>);
}

/// Allow calling the consuming widget on a boxed trait object
pub trait BoxedWidget {
    fn mount_boxed(self: Box<Self>, scope: &mut Scope<'_>);
}

impl<W> BoxedWidget for W
where
    W: Widget,
{
    fn mount_boxed(self: Box<Self>, scope: &mut Scope<'_>) {
        // Name the node after the concrete widget rather than the box
        scope.set(widget_name(), tynm::type_name::<W>());
        (*self).mount(scope)
    }
}

impl Widget for Box<dyn Widget> {
    fn mount(self, scope: &mut Scope<'_>) {
        self.mount_boxed(scope)
    }
}
