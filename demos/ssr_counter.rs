//! A counter page rendered through the store middleware.
//!
//! Run with `RUST_LOG=debug` to watch the store lifecycle.

use render_store::render::RenderCallback;
use render_store::store::reducer;
use render_store::{
    create_factory, rendering_middleware, Action, Environment, Next, Page, RenderEngine,
    RenderOptions, Renderable, RenderingOptions, Request, RequestHandler, Response,
    ReducerStoreFactory, StateContainerOptions,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Renders the state as a tiny HTML document.
struct HtmlEngine;

impl HtmlEngine {
    fn handler(mode: &'static str, options: RenderOptions) -> RequestHandler {
        RequestHandler::plain(move |request, response, next| {
            let after = options.after.clone();
            let target = response.clone();
            let finish = move |error| {
                let Some(after) = after else { return };
                after(
                    error,
                    Arc::new(move |state: &Value, done: RenderCallback| {
                        target.send(format!("<main data-mode=\"{mode}\">{state}</main>"));
                        done(Ok(()))
                    }),
                    next,
                );
            };
            match options.before.as_ref() {
                Some(before) => before(&options, &request, &response, Box::new(finish)),
                None => {
                    let state = response.locals().to_state();
                    response.send(format!("<main data-mode=\"{mode}\">{state}</main>"));
                    finish(None)
                }
            }
        })
    }
}

impl RenderEngine for HtmlEngine {
    fn middleware(&self, _: Arc<dyn Renderable>, options: RenderOptions) -> RequestHandler {
        Self::handler("render", options)
    }

    fn hydrating_middleware(&self, _: Arc<dyn Renderable>, options: RenderOptions) -> RequestHandler {
        Self::handler("hydrate", options)
    }
}

fn counter_page() -> Page {
    Page::new("counter").with_reducer(reducer(|state, action| match action.kind() {
        "increment" => {
            let count = state["count"].as_i64().unwrap_or(0);
            let mut next = state.clone();
            next["count"] = json!(count + 1);
            next
        }
        _ => state.clone(),
    }))
}

fn main() -> render_store::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,render_store=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("=== Server render ===\n");
    let server = rendering_middleware(
        counter_page(),
        RenderingOptions::new()
            .engine(HtmlEngine)
            .environment(Environment::Server),
    )?;
    let response = Response::new();
    response.locals().insert("count", json!(0));
    server.call(None, Request::get("/"), response.clone(), Next::noop());
    println!("   {}", response.body().unwrap_or_default());

    println!("\n=== Client hydration ===\n");
    let client = rendering_middleware(
        counter_page(),
        RenderingOptions::new()
            .engine(HtmlEngine)
            .environment(Environment::Client),
    )?;
    let response = Response::new();
    response.locals().insert("count", json!(0));
    client.call(None, Request::get("/"), response.clone(), Next::noop());
    println!("   after route change: {}", response.body().unwrap_or_default());

    response.locals().dispatch("$dispatch", Action::new("increment"))?;
    response.locals().dispatch("$dispatch", Action::new("increment"))?;
    println!("   after two increments: {}", response.body().unwrap_or_default());

    println!("\n=== Single-page navigation ===\n");
    let engine = Arc::new(HtmlEngine);
    let factory = create_factory(
        StateContainerOptions::new()
            .render_middleware_factory(move |page: Arc<dyn Renderable>, options: RenderOptions| {
                engine.hydrating_middleware(page, options)
            })
            .store_factory(ReducerStoreFactory)
            .environment(Environment::Client),
    )?;

    let first = Response::new();
    factory
        .middleware(counter_page())?
        .call(None, Request::get("/one"), first.clone(), Next::noop());
    let second = Response::new();
    factory
        .middleware(counter_page())?
        .call(None, Request::get("/two"), second.clone(), Next::noop());

    first.locals().dispatch("$dispatch", Action::new("increment"))?;
    second.locals().dispatch("$dispatch", Action::new("increment"))?;
    println!("   first page (detached): {}", first.body().unwrap_or_default());
    println!("   second page (live):    {}", second.body().unwrap_or_default());

    Ok(())
}
