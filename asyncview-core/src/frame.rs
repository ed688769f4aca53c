use flax::{component::ComponentValue, components::child_of, Component, Entity, World};

use crate::{components::ordered_children, effect::TaskSpawner, Error, Result, Scope, Widget};

/// Contains the UI state
///
/// Similar to an Html *Document*
pub struct Frame {
    pub(crate) world: World,
    /// Handle allowing spawning of tasks
    pub(crate) spawner: TaskSpawner<Frame>,
}

impl Frame {
    pub fn new(spawner: TaskSpawner<Frame>) -> Self {
        Self {
            world: World::new(),
            spawner,
        }
    }

    /// Mounts a widget into a new node without a parent
    pub fn mount_root(&mut self, widget: impl Widget) -> Entity {
        let id = self.world.spawn();
        let mut scope = Scope::new(self, id);
        widget.mount(&mut scope);
        id
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn is_alive(&self, id: Entity) -> bool {
        self.world.is_alive(id)
    }

    /// Returns a copy of a component value of a node
    pub fn get<T: ComponentValue + Clone>(&self, id: Entity, component: Component<T>) -> Option<T> {
        self.world.get(id, component).ok().map(|v| (*v).clone())
    }

    /// Returns the children of a node in the order they were attached
    pub fn children(&self, id: Entity) -> Vec<Entity> {
        self.get(id, ordered_children()).unwrap_or_default()
    }

    /// Removes a node and all its descendants.
    ///
    /// Effects of the removed nodes are aborted.
    pub fn despawn(&mut self, id: Entity) -> Result<()> {
        if !self.world.is_alive(id) {
            return Err(Error::NoSuchNode(id));
        }

        self.world.despawn_recursive(id, child_of)?;
        Ok(())
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame").field("world", &self.world).finish()
    }
}
