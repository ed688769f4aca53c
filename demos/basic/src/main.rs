use std::{convert::Infallible, time::Duration};

use asyncview_core::{
    async_result::AsyncResult,
    components::{connection_state, placeholder, text, widget_name},
    App, Frame, Scope, Text, Widget,
};
use flax::Entity;
use futures::StreamExt;
use tokio::time::{interval, sleep};
use tokio_stream::wrappers::IntervalStream;
use tracing_subscriber::{prelude::*, EnvFilter};
use tracing_tree::HierarchicalLayer;

async fn fetch_greeting() -> Result<String, Infallible> {
    sleep(Duration::from_millis(300)).await;
    Ok("hello".into())
}

async fn fetch_count(count: i32) -> Result<i32, Infallible> {
    sleep(Duration::from_millis(500)).await;
    Ok(count)
}

async fn connect() -> Result<i32, String> {
    sleep(Duration::from_millis(400)).await;
    Err("connection refused".into())
}

fn is_even(v: &i32) -> bool {
    v % 2 == 0
}

struct Dashboard;

impl Widget for Dashboard {
    fn mount(self, scope: &mut Scope<'_>) {
        scope.attach(AsyncResult::new(fetch_greeting(), |_, v: &String| {
            Text::new(format!("{v}, world"))
        }));

        scope.attach(
            AsyncResult::new(fetch_count(4), |_, v: &i32| Text::new(format!("{v} is even")))
                .validate(is_even),
        );

        scope.attach(
            AsyncResult::new(fetch_count(5), |_, v: &i32| Text::new(format!("{v} is even")))
                .validate(is_even)
                .on_data_error(|_, v: &i32| Text::new(format!("{v} is odd"))),
        );

        scope.attach(AsyncResult::new(connect(), |_, v: &i32| {
            Text::new(format!("connected to {v}"))
        }));

        let ticks = IntervalStream::new(interval(Duration::from_millis(200)))
            .skip(1)
            .take(3)
            .enumerate()
            .map(|(i, _)| Ok::<_, Infallible>(i + 1));

        scope.attach(
            AsyncResult::from_stream(ticks, |_, v: &usize| Text::new(format!("{v} ticks")))
                .on_active(|_| Text::new("ticking")),
        );
    }
}

fn describe(frame: &Frame, id: Entity) -> String {
    let name = frame
        .get(id, widget_name())
        .unwrap_or_else(|| "root".into());

    let mut desc = match (frame.get(id, text()), frame.get(id, placeholder())) {
        (Some(text), _) => format!("{name} {text:?}"),
        (None, Some(placeholder)) => format!("<{}>", placeholder.name()),
        (None, None) => name,
    };

    if let Some(state) = frame.get(id, connection_state()) {
        desc.push_str(&format!(" [{state:?}]"));
    }

    desc
}

fn log_tree(frame: &Frame, id: Entity, depth: usize) {
    tracing::info!("{:indent$}{}", "", describe(frame, id), indent = depth * 2);

    for child in frame.children(id) {
        log_tree(frame, child, depth + 1);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            HierarchicalLayer::new(4)
                .with_thread_ids(false)
                .with_indent_lines(false)
                .with_verbose_entry(true)
                .with_verbose_exit(true),
        )
        .init();

    let mut app = App::new();
    let root = app.mount(Dashboard);
    log_tree(app.frame(), root, 0);

    while !app.is_idle() {
        app.update_async().await;
        log_tree(app.frame(), root, 0);
    }

    anyhow::ensure!(
        app.frame().children(root).len() == 5,
        "Dashboard lost a child"
    );

    Ok(())
}
