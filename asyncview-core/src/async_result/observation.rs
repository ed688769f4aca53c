/// The raw state of an asynchronous operation as reported by its observer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConnectionState {
    /// The operation has not been polled yet
    #[default]
    None,
    /// The operation has been polled but has not produced anything
    Waiting,
    /// The operation is producing intermediate results
    Active,
    /// The operation has finished. Terminal.
    Done,
}

/// A point-in-time snapshot of an operation's state along with the latest data or error it
/// produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation<T, E> {
    state: ConnectionState,
    data: Option<T>,
    error: Option<E>,
}

impl<T, E> Default for Observation<T, E> {
    fn default() -> Self {
        Self::none()
    }
}

impl<T, E> Observation<T, E> {
    pub fn none() -> Self {
        Self {
            state: ConnectionState::None,
            data: None,
            error: None,
        }
    }

    pub fn waiting() -> Self {
        Self::none().with_state(ConnectionState::Waiting)
    }

    pub fn active_data(data: T) -> Self {
        Self {
            state: ConnectionState::Active,
            data: Some(data),
            error: None,
        }
    }

    pub fn active_error(error: E) -> Self {
        Self {
            state: ConnectionState::Active,
            data: None,
            error: Some(error),
        }
    }

    pub fn done_data(data: T) -> Self {
        Self::active_data(data).with_state(ConnectionState::Done)
    }

    pub fn done_error(error: E) -> Self {
        Self::active_error(error).with_state(ConnectionState::Done)
    }

    /// Finished without producing data or an error
    pub fn done_empty() -> Self {
        Self::none().with_state(ConnectionState::Done)
    }

    /// Construct an observation from a produced result
    pub fn from_result(state: ConnectionState, result: Result<T, E>) -> Self {
        match result {
            Ok(data) => Self::active_data(data),
            Err(error) => Self::active_error(error),
        }
        .with_state(state)
    }

    /// Keeps the data and error, replacing the state
    #[must_use]
    pub fn with_state(mut self, state: ConnectionState) -> Self {
        self.state = state;
        self
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn error(&self) -> Option<&E> {
        self.error.as_ref()
    }

    pub fn has_data(&self) -> bool {
        self.data.is_some()
    }

    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    /// Classifies the observation into the outcome which decides what is rendered.
    ///
    /// A finished operation only counts as [`Lifecycle::Done`] if it produced data, did not fail,
    /// and the data passes `validator` if one is given.
    pub fn classify(&self, validator: Option<&dyn Fn(&T) -> bool>) -> Lifecycle<'_, T, E> {
        match self.state {
            ConnectionState::None => Lifecycle::None,
            ConnectionState::Waiting => Lifecycle::Waiting,
            ConnectionState::Active => Lifecycle::Active,
            ConnectionState::Done => match (&self.error, &self.data) {
                (Some(error), _) => Lifecycle::Failed(Failure::Error(error)),
                (None, None) => Lifecycle::Failed(Failure::MissingData),
                (None, Some(data)) => match validator {
                    Some(validator) if !validator(data) => Lifecycle::Rejected(data),
                    _ => Lifecycle::Done(data),
                },
            },
        }
    }
}

/// What a finished operation resolved to, with validation applied
#[derive(Debug, PartialEq, Eq)]
pub enum Lifecycle<'a, T, E> {
    None,
    Waiting,
    Active,
    /// The operation did not produce usable data
    Failed(Failure<'a, E>),
    /// The data was rejected by the validator
    Rejected(&'a T),
    Done(&'a T),
}

impl<'a, T, E> Lifecycle<'a, T, E> {
    /// Short description used for logging
    pub fn kind(&self) -> &'static str {
        match self {
            Lifecycle::None => "none",
            Lifecycle::Waiting => "waiting",
            Lifecycle::Active => "active",
            Lifecycle::Failed(Failure::Error(_)) => "failed",
            Lifecycle::Failed(Failure::MissingData) => "missing data",
            Lifecycle::Rejected(_) => "rejected",
            Lifecycle::Done(_) => "done",
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum Failure<'a, E> {
    /// The operation itself failed
    Error(&'a E),
    /// The operation finished without a value
    MissingData,
}
