use flax::Entity;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Executor is not running")]
    ExecutorStopped,
    #[error("Entity {0:?} is not part of the frame")]
    NoSuchNode(Entity),
    #[error(transparent)]
    World(#[from] flax::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
