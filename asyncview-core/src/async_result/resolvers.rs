use crate::{widget::Placeholder, Scope};

use super::{Lifecycle, Observation};

type Resolver<V> = Box<dyn Fn(&mut Scope<'_>) -> V>;
type DataResolver<T, V> = Box<dyn Fn(&mut Scope<'_>, &T) -> V>;
type Validator<T> = Box<dyn Fn(&T) -> bool>;

/// Produces a view `V` for each state of an operation.
///
/// Only the view for successfully resolved data is required; every other state falls back to a
/// [`Placeholder`] when unset.
pub struct Resolvers<T, V> {
    done: DataResolver<T, V>,
    none: Option<Resolver<V>>,
    waiting: Option<Resolver<V>>,
    active: Option<Resolver<V>>,
    future_error: Option<Resolver<V>>,
    data_error: Option<DataResolver<T, V>>,
    validator: Option<Validator<T>>,
}

impl<T, V> Resolvers<T, V>
where
    V: From<Placeholder>,
{
    pub fn new(done: impl 'static + Fn(&mut Scope<'_>, &T) -> V) -> Self {
        Self {
            done: Box::new(done),
            none: None,
            waiting: None,
            active: None,
            future_error: None,
            data_error: None,
            validator: None,
        }
    }

    /// Shown before the operation has started
    pub fn with_none(mut self, f: impl 'static + Fn(&mut Scope<'_>) -> V) -> Self {
        self.none = Some(Box::new(f));
        self
    }

    /// Shown while waiting for the first result
    pub fn with_waiting(mut self, f: impl 'static + Fn(&mut Scope<'_>) -> V) -> Self {
        self.waiting = Some(Box::new(f));
        self
    }

    /// Shown while the operation is producing intermediate results
    pub fn with_active(mut self, f: impl 'static + Fn(&mut Scope<'_>) -> V) -> Self {
        self.active = Some(Box::new(f));
        self
    }

    /// Shown when the operation failed or finished without data
    pub fn with_future_error(mut self, f: impl 'static + Fn(&mut Scope<'_>) -> V) -> Self {
        self.future_error = Some(Box::new(f));
        self
    }

    /// Shown when the validator rejects the data
    pub fn with_data_error(mut self, f: impl 'static + Fn(&mut Scope<'_>, &T) -> V) -> Self {
        self.data_error = Some(Box::new(f));
        self
    }

    /// Data must pass the validator for the done view to be shown
    pub fn with_validator(mut self, f: impl 'static + Fn(&T) -> bool) -> Self {
        self.validator = Some(Box::new(f));
        self
    }

    /// Classifies the observation
    pub fn classify<'a, E>(&self, observation: &'a Observation<T, E>) -> Lifecycle<'a, T, E> {
        observation.classify(self.validator.as_deref())
    }

    /// Selects and invokes exactly one resolver for the observation
    pub fn resolve<E>(&self, scope: &mut Scope<'_>, observation: &Observation<T, E>) -> V {
        let lifecycle = self.classify(observation);
        tracing::debug!(
            state = ?observation.state(),
            lifecycle = lifecycle.kind(),
            "Resolving view"
        );

        match lifecycle {
            Lifecycle::None => Self::or_default(&self.none, scope, Placeholder::None),
            Lifecycle::Waiting => Self::or_default(&self.waiting, scope, Placeholder::Loading),
            Lifecycle::Active => Self::or_default(&self.active, scope, Placeholder::Loading),
            Lifecycle::Failed(_) => {
                Self::or_default(&self.future_error, scope, Placeholder::Error)
            }
            Lifecycle::Rejected(data) => match &self.data_error {
                Some(f) => f(scope, data),
                None => Placeholder::Error.into(),
            },
            Lifecycle::Done(data) => (self.done)(scope, data),
        }
    }

    fn or_default(
        resolver: &Option<Resolver<V>>,
        scope: &mut Scope<'_>,
        default: Placeholder,
    ) -> V {
        match resolver {
            Some(f) => f(scope),
            None => default.into(),
        }
    }
}

#[cfg(test)]
mod test {
    use std::{cell::Cell, rc::Rc};

    use flax::Entity;

    use crate::{async_result::ConnectionState, App, Frame};

    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum View {
        Default(Placeholder),
        Custom(&'static str),
        Data(&'static str, i32),
    }

    impl From<Placeholder> for View {
        fn from(value: Placeholder) -> Self {
            Self::Default(value)
        }
    }

    type Obs = Observation<i32, String>;

    fn node(app: &mut App) -> (&mut Frame, Entity) {
        let id = app.mount(Placeholder::None);
        (app.frame_mut(), id)
    }

    fn resolve(resolvers: &Resolvers<i32, View>, observation: &Obs) -> View {
        let mut app = App::new();
        let (frame, id) = node(&mut app);
        resolvers.resolve(&mut Scope::new(frame, id), observation)
    }

    fn minimal() -> Resolvers<i32, View> {
        Resolvers::new(|_, &v| View::Data("done", v))
    }

    fn full() -> Resolvers<i32, View> {
        minimal()
            .with_none(|_| View::Custom("none"))
            .with_waiting(|_| View::Custom("waiting"))
            .with_active(|_| View::Custom("active"))
            .with_future_error(|_| View::Custom("future error"))
            .with_data_error(|_, &v| View::Data("data error", v))
    }

    fn all_states() -> Vec<Obs> {
        vec![
            Obs::none(),
            Obs::active_data(1).with_state(ConnectionState::None),
            Obs::active_error("boom".into()).with_state(ConnectionState::None),
            Obs::waiting(),
            Obs::active_data(2).with_state(ConnectionState::Waiting),
            Obs::active_data(3),
            Obs::active_error("boom".into()),
            Obs::done_data(4),
            Obs::done_data(5),
            Obs::done_error("boom".into()),
            Obs::done_empty(),
        ]
    }

    #[test]
    fn defaults() {
        let resolvers = minimal();
        let views = all_states()
            .iter()
            .map(|obs| resolve(&resolvers, obs))
            .collect::<Vec<_>>();

        use Placeholder::*;
        assert_eq!(
            views,
            [
                View::Default(None),
                View::Default(None),
                View::Default(None),
                View::Default(Loading),
                View::Default(Loading),
                View::Default(Loading),
                View::Default(Loading),
                View::Data("done", 4),
                View::Data("done", 5),
                View::Default(Error),
                View::Default(Error),
            ]
        );
    }

    #[test]
    fn overrides() {
        let resolvers = full();
        let views = all_states()
            .iter()
            .map(|obs| resolve(&resolvers, obs))
            .collect::<Vec<_>>();

        assert_eq!(
            views,
            [
                View::Custom("none"),
                View::Custom("none"),
                View::Custom("none"),
                View::Custom("waiting"),
                View::Custom("waiting"),
                View::Custom("active"),
                View::Custom("active"),
                View::Data("done", 4),
                View::Data("done", 5),
                View::Custom("future error"),
                View::Custom("future error"),
            ]
        );
    }

    #[test]
    fn validator() {
        let is_even = |v: &i32| v % 2 == 0;

        let resolvers = minimal().with_validator(is_even);
        assert_eq!(resolve(&resolvers, &Obs::done_data(4)), View::Data("done", 4));
        assert_eq!(
            resolve(&resolvers, &Obs::done_data(5)),
            View::Default(Placeholder::Error)
        );

        let resolvers = full().with_validator(is_even);
        assert_eq!(resolve(&resolvers, &Obs::done_data(4)), View::Data("done", 4));
        assert_eq!(
            resolve(&resolvers, &Obs::done_data(5)),
            View::Data("data error", 5)
        );

        // A failed operation never reaches validation
        assert_eq!(
            resolve(&resolvers, &Obs::done_error("boom".into())),
            View::Custom("future error")
        );
    }

    #[test]
    fn rejected_data_never_invokes_done() {
        let calls = Rc::new(Cell::new(0));

        let resolvers = {
            let calls = calls.clone();
            Resolvers::new(move |_, &v| {
                calls.set(calls.get() + 1);
                View::Data("done", v)
            })
            .with_validator(|_| false)
        };

        assert_eq!(
            resolve(&resolvers, &Obs::done_data(4)),
            View::Default(Placeholder::Error)
        );
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn idempotent() {
        let resolvers = full().with_validator(|v| *v > 2);

        for obs in all_states() {
            let first = resolve(&resolvers, &obs);
            let second = resolve(&resolvers, &obs);
            assert_eq!(first, second);
            assert_eq!(resolvers.classify(&obs), resolvers.classify(&obs));
        }
    }

    #[test]
    fn strings() {
        let resolvers: Resolvers<String, View> = Resolvers::new(|_, v: &String| match v.as_str() {
            "hello" => View::Custom("hello"),
            _ => View::Custom("other"),
        });

        let mut app = App::new();
        let (frame, id) = node(&mut app);
        let view = resolvers.resolve(
            &mut Scope::new(frame, id),
            &Observation::<String, ()>::done_data("hello".into()),
        );

        assert_eq!(view, View::Custom("hello"));
    }
}
