use flax::*;
use palette::Srgba;

use crate::{async_result::ConnectionState, effect::AbortTaskHandle, widget::common::Placeholder};

component! {
    /// Aborts the stored effects when dropped
    pub(crate) tasks: Vec<AbortTaskHandle>,
    pub(crate) ordered_children: Vec<Entity> => [ Debuggable ],

    /// Type name of the widget mounted to the node
    pub widget_name: String => [ Debuggable ],

    pub text: String => [ Debuggable ],

    pub color: Srgba => [ Debuggable ],

    /// Set on nodes rendered as one of the default views
    pub placeholder: Placeholder => [ Debuggable ],

    /// Most recent raw state of the operation an `AsyncResult` observes
    pub connection_state: ConnectionState => [ Debuggable ],
}
