//! A small todo page driven through the selection wrapper
//!
//! Run with `RUST_LOG=debug` to see registrations and animation steps.

use dom::{DomRect, Event, ReadyState, Window, WindowConfig};
use miniquery::{listener, MiniQuery};
use std::time::Duration;

const PAGE: &str = r#"<html><head><style>
    .done { color: gray }
    #details { max-height: 0px }
</style></head><body>
  <h1>Todo</h1>
  <ul id="todos"><li>Write parser</li><li>Ship it</li></ul>
  <form id="add"><input name="title" value=""><input type="submit" value="Add"></form>
  <div id="details">Some details</div>
</body></html>"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let window = Window::from_html(
        PAGE,
        WindowConfig {
            url: "https://todo.example/".to_string(),
            ready_state: ReadyState::Loading,
            ..WindowConfig::default()
        },
    )?;
    let mq = MiniQuery::new(window);

    let app = mq.clone();
    mq.ready(move || {
        let todos = app.clone();
        app.select("#todos li").on(
            "click",
            &listener(move |e: &Event| {
                todos.select(e.target).toggle_class("done", None);
            }),
        );

        let form = app.clone();
        app.select("#add").on(
            "submit",
            &listener(move |_: &Event| {
                let title = form.select("input[name=title]").val().unwrap_or_default();
                if !title.is_empty() {
                    form.select("#todos").append(format!("<li>{}</li>", title));
                }
                println!("submitted: {}", form.select("#add").serialize());
            }),
        );
    });
    mq.window().set_ready_state(ReadyState::Complete);

    mq.select("#todos li").first().trigger("click");
    mq.select("input[name=title]").set_val("Write docs");
    mq.select("#add").trigger("submit");
    println!("todos: {}", mq.select("#todos").html().unwrap_or_default());
    println!("done: {}", mq.select(".done").text().unwrap_or_default());

    let details = mq.select("#details");
    if let Some(node) = details.get(0) {
        let mut document = mq.window().document_mut();
        document.set_layout(node, DomRect::new(0.0, 400.0, 600.0, 0.0))?;
        document.set_scroll_size(node, 600.0, 90.0)?;
    }
    let slide = details.slide_toggle_for(Duration::from_millis(200));
    mq.window().run_for(100.0);
    println!("halfway: max-height {}", details.css("max-height").unwrap_or_default());
    mq.window().run_for(100.0);
    println!(
        "expanded: max-height {} (active: {})",
        details.css("max-height").unwrap_or_default(),
        slide.is_active()
    );

    details.scroll_to();
    mq.window().run_for(500.0);
    println!("window scrolled to {}", mq.window().scroll_y());

    mq.redirect("/archive");
    println!("now at {}", mq.window().href());
    Ok(())
}
