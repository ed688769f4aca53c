use std::task::{Context, Poll};

use flax::{component::ComponentValue, components::child_of, Component, Entity};
use pin_project::pin_project;

use crate::{
    async_result::Observation,
    components::{ordered_children, tasks, widget_name},
    effect::{AsyncOperation, Effect, ObserveEffect},
    Frame, Widget,
};

/// Represents the scope of a widget.
///
/// A scope is a handle to a single node in the frame, and is passed to widgets while they are
/// mounted and to their effects each time they run.
pub struct Scope<'a> {
    frame: &'a mut Frame,
    id: Entity,
}

impl<'a> Scope<'a> {
    pub(crate) fn new(frame: &'a mut Frame, id: Entity) -> Self {
        Self { frame, id }
    }

    /// Observes an asynchronous operation, invoking `func` for every state change.
    pub fn use_observer<T, E, F>(&mut self, operation: AsyncOperation<T, E>, func: F)
    where
        T: 'static,
        E: 'static,
        F: 'static + FnMut(&mut Scope<'_>, &Observation<T, E>),
    {
        self.use_effect(ObserveEffect::new(operation, func))
    }

    /// Spawns the effect inside the given scope.
    ///
    /// The effect is aborted when the node is despawned.
    pub fn use_effect<E>(&mut self, effect: E)
    where
        E: 'static + for<'x> Effect<Scope<'x>>,
    {
        // lift Frame => Scope
        let effect = ScopedEffect { id: self.id, effect };

        match self.frame.spawner.spawn(effect) {
            Ok(handle) => self.push(tasks(), handle.abort_on_drop()),
            Err(err) => tracing::error!(id = ?self.id, "Failed to spawn effect: {err}"),
        }
    }

    /// Set a component for the widget
    pub fn set<T: ComponentValue>(&mut self, component: Component<T>, value: T) -> &mut Self {
        if let Err(err) = self.frame.world.set(self.id, component, value) {
            tracing::error!(id = ?self.id, "Failed to set {component:?}: {err}");
        }

        self
    }

    /// Returns a copy of a component value of the node
    pub fn get<T: ComponentValue + Clone>(&self, component: Component<T>) -> Option<T> {
        self.frame.get(self.id, component)
    }

    fn push<T: ComponentValue>(&mut self, component: Component<Vec<T>>, value: T) {
        if self.frame.world.has(self.id, component) {
            if let Ok(mut values) = self.frame.world.get_mut(self.id, component) {
                values.push(value);
            }
        } else {
            self.set(component, vec![value]);
        }
    }

    /// Mounts a widget as the last child of this node
    #[tracing::instrument(
        level = "debug",
        skip(self, widget),
        fields(parent = ?self.id, widget = %tynm::type_name::<W>())
    )]
    pub fn attach<W: Widget>(&mut self, widget: W) -> Entity {
        let id = self.frame.world.spawn();

        if let Err(err) = self.frame.world.set(id, child_of(self.id), ()) {
            tracing::error!("Failed to parent {id:?}: {err}");
        }

        self.push(ordered_children(), id);

        let mut child = Scope::new(&mut *self.frame, id);
        child.set(widget_name(), tynm::type_name::<W>());
        widget.mount(&mut child);

        id
    }

    /// Removes a child and all its descendants
    #[tracing::instrument(level = "debug", skip(self), fields(parent = ?self.id))]
    pub fn detach(&mut self, id: Entity) {
        if let Ok(mut children) = self.frame.world.get_mut(self.id, ordered_children()) {
            children.retain(|&child| child != id);
        }

        if let Err(err) = self.frame.despawn(id) {
            tracing::error!("Failed to detach {id:?}: {err}");
        }
    }

    /// Returns the children of the node
    pub fn children(&self) -> Vec<Entity> {
        self.frame.children(self.id)
    }

    /// Returns the entity id
    pub fn id(&self) -> Entity {
        self.id
    }

    pub fn frame(&self) -> &Frame {
        &*self.frame
    }
}

/// Lifts a scope local effect to the frame.
#[pin_project]
struct ScopedEffect<E> {
    #[pin]
    effect: E,
    id: Entity,
}

impl<E> Effect<Frame> for ScopedEffect<E>
where
    E: for<'x> Effect<Scope<'x>>,
{
    fn poll_effect(
        self: std::pin::Pin<&mut Self>,
        frame: &mut Frame,
        cx: &mut Context<'_>,
    ) -> Poll<()> {
        let p = self.project();

        if !frame.world.is_alive(*p.id) {
            return Poll::Ready(());
        }

        let mut scope = Scope::new(frame, *p.id);
        p.effect.poll_effect(&mut scope, cx)
    }
}
