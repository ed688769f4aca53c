use palette::Srgba;

use crate::{
    components::{color, placeholder, text, widget_name},
    Scope, Widget,
};

/// A leaf widget displaying a string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Text(pub String);

impl Text {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }
}

impl Widget for Text {
    fn mount(self, scope: &mut Scope<'_>) {
        scope.set(text(), self.0);
    }
}

/// Stateless views shown for an operation when no other view has been provided
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placeholder {
    /// Nothing to show yet
    None,
    /// Indeterminate progress
    Loading,
    /// Warning indicator
    Error,
}

impl Placeholder {
    pub fn color(&self) -> Srgba {
        match self {
            Placeholder::None => Srgba::new(0.5, 0.5, 0.5, 1.0),
            Placeholder::Loading => Srgba::new(0.2, 0.5, 0.9, 1.0),
            Placeholder::Error => Srgba::new(1.0, 0.7, 0.0, 1.0),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Placeholder::None => "none",
            Placeholder::Loading => "loading",
            Placeholder::Error => "error",
        }
    }
}

impl Widget for Placeholder {
    fn mount(self, scope: &mut Scope<'_>) {
        scope
            .set(placeholder(), self)
            .set(color(), self.color())
            .set(widget_name(), format!("Placeholder({})", self.name()));
    }
}

impl From<Placeholder> for Box<dyn Widget> {
    fn from(value: Placeholder) -> Self {
        Box::new(value)
    }
}

#[cfg(test)]
mod test {
    use crate::App;

    use super::*;

    #[test]
    fn placeholders_are_leaves() {
        let mut app = App::new();

        for view in [Placeholder::None, Placeholder::Loading, Placeholder::Error] {
            let id = app.mount(view);
            let frame = app.frame();

            assert_eq!(frame.get(id, placeholder()), Some(view));
            assert_eq!(frame.get(id, color()), Some(view.color()));
            assert!(frame.children(id).is_empty());
        }

        // Nothing to run
        assert!(app.is_idle());
    }

    #[test]
    fn boxed() {
        let mut app = App::new();
        let view: Box<dyn Widget> = Placeholder::Error.into();
        let id = app.mount(view);

        assert_eq!(app.frame().get(id, placeholder()), Some(Placeholder::Error));
        assert_eq!(
            app.frame().get(id, widget_name()).as_deref(),
            Some("Placeholder(error)")
        );
    }
}
