//! Integration tests for Render Store

use render_store::render::{after_hook, before_hook, RenderCallback};
use render_store::store::{listener, Listener, Reducer, StateChange};
use render_store::{
    create_factory, state_container, Action, Environment, Error, Next, Page, Payload,
    RenderOptions, Renderable, Request, RequestHandler, Response, StateContainerOptions, Store,
    Unsubscribe,
};
use serde_json::{json, Value};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

/// A store that records everything and counts detaches per subscription.
#[derive(Default)]
struct StubStore {
    state: Mutex<Value>,
    reducer: Option<Reducer>,
    listeners: Arc<Mutex<Vec<(usize, Listener)>>>,
    next_id: AtomicUsize,
    detaches: Arc<AtomicUsize>,
    dispatched: Mutex<Vec<Action>>,
}

impl StubStore {
    fn new(reducer: Reducer, initial: Value) -> Self {
        Self {
            state: Mutex::new(initial),
            reducer: Some(reducer),
            ..Default::default()
        }
    }

    fn kinds(&self) -> Vec<String> {
        self.dispatched
            .lock()
            .unwrap()
            .iter()
            .map(|action| action.kind().to_string())
            .collect()
    }

    fn listener_count(&self) -> usize {
        self.listeners.lock().unwrap().len()
    }
}

impl Store for StubStore {
    fn state(&self) -> Value {
        self.state.lock().unwrap().clone()
    }

    fn dispatch(&self, action: Action) {
        self.dispatched.lock().unwrap().push(action.clone());
        let reducer = self.reducer.clone().unwrap();
        let previous = self.state();
        let next = reducer(&previous, &action);
        *self.state.lock().unwrap() = next.clone();

        let listeners: Vec<Listener> = self
            .listeners
            .lock()
            .unwrap()
            .iter()
            .map(|(_, l)| l.clone())
            .collect();
        for l in listeners {
            l(&StateChange {
                state: &next,
                previous: &previous,
                action: &action,
            });
        }
    }

    fn subscribe(&self, listener: Listener) -> Unsubscribe {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.listeners.lock().unwrap().push((id, listener));
        let listeners = self.listeners.clone();
        let detaches = self.detaches.clone();
        Unsubscribe::new(move || {
            detaches.fetch_add(1, Ordering::SeqCst);
            listeners.lock().unwrap().retain(|(entry, _)| *entry != id);
        })
    }
}

/// Store factory handing out `StubStore`s and keeping them for inspection.
#[derive(Clone, Default)]
struct StubStores {
    created: Arc<Mutex<Vec<Arc<StubStore>>>>,
    /// Detaches seen on earlier stores at the moment each store was built.
    detaches_at_build: Arc<Mutex<Vec<usize>>>,
}

impl StubStores {
    fn factory(&self) -> impl render_store::StoreFactory {
        let created = self.created.clone();
        let detaches_at_build = self.detaches_at_build.clone();
        move |reducer: Reducer, initial: Value| -> Arc<dyn Store> {
            let earlier: usize = created
                .lock()
                .unwrap()
                .iter()
                .map(|store| store.detaches.load(Ordering::SeqCst))
                .sum();
            detaches_at_build.lock().unwrap().push(earlier);

            let store = Arc::new(StubStore::new(reducer, initial));
            created.lock().unwrap().push(store.clone());
            store
        }
    }

    fn count(&self) -> usize {
        self.created.lock().unwrap().len()
    }

    fn get(&self, index: usize) -> Arc<StubStore> {
        self.created.lock().unwrap()[index].clone()
    }
}

/// Render middleware that runs `before`, then `after`, counting renders.
#[derive(Clone, Default)]
struct StubRenderer {
    renders: Arc<AtomicUsize>,
    /// Runs between the hook installation and `before`.
    pre_before: Arc<Mutex<Option<Box<dyn Fn(&Response) + Send + Sync>>>>,
}

impl StubRenderer {
    fn factory(&self) -> impl render_store::RenderMiddlewareFactory {
        let stub = self.clone();
        move |_page: Arc<dyn Renderable>, options: RenderOptions| -> RequestHandler {
            let stub = stub.clone();
            RequestHandler::plain(move |request, response, next| {
                if let Some(pre) = stub.pre_before.lock().unwrap().as_ref() {
                    pre(&response);
                }
                let after = options.after.clone();
                let renders = stub.renders.clone();
                let rendered = response.clone();
                let finish = move |error| {
                    if let Some(after) = after {
                        after(
                            error,
                            Arc::new(move |state: &Value, done: RenderCallback| {
                                renders.fetch_add(1, Ordering::SeqCst);
                                rendered.send(state.to_string());
                                done(Ok(()))
                            }),
                            next,
                        );
                    }
                };
                match options.before.as_ref() {
                    Some(before) => before(&options, &request, &response, Box::new(finish)),
                    None => finish(None),
                }
            })
        }
    }

    fn renders(&self) -> usize {
        self.renders.load(Ordering::SeqCst)
    }
}

fn client_options(renderer: &StubRenderer, stores: &StubStores) -> StateContainerOptions {
    StateContainerOptions::new()
        .render_middleware_factory(renderer.factory())
        .store_factory(stores.factory())
        .environment(Environment::Client)
}

#[test]
fn construction_fails_without_collaborators() {
    let renderer = StubRenderer::default();
    let stores = StubStores::default();

    let missing_store = StateContainerOptions::new().render_middleware_factory(renderer.factory());
    assert!(matches!(
        state_container(Page::new("home"), missing_store),
        Err(Error::MissingCollaborator("createStore"))
    ));

    let missing_renderer = StateContainerOptions::new().store_factory(stores.factory());
    assert!(matches!(
        state_container(Page::new("home"), missing_renderer),
        Err(Error::MissingCollaborator("renderMiddlewareFactory"))
    ));

    assert!(create_factory(StateContainerOptions::new()).is_err());
    assert_eq!(stores.count(), 0);
}

#[test]
fn server_requests_build_no_store() {
    let renderer = StubRenderer::default();
    let stores = StubStores::default();
    let handler = state_container(
        Page::new("home"),
        StateContainerOptions::new()
            .render_middleware_factory(renderer.factory())
            .store_factory(stores.factory()),
    )
    .unwrap();

    let response = Response::new();
    Environment::Server.scope(|| {
        handler.call(None, Request::get("/"), response.clone(), Next::noop());
    });

    assert_eq!(stores.count(), 0);
    assert_eq!(renderer.renders(), 0);
    assert!(!response.locals().is_bound("$subscribe"));
}

#[test]
fn scoped_client_environment_is_honoured() {
    let renderer = StubRenderer::default();
    let stores = StubStores::default();
    let handler = state_container(
        Page::new("home"),
        StateContainerOptions::new()
            .render_middleware_factory(renderer.factory())
            .store_factory(stores.factory()),
    )
    .unwrap();

    Environment::Client.scope(|| {
        handler.call(None, Request::get("/"), Response::new(), Next::noop());
    });
    assert_eq!(stores.count(), 1);
}

#[test]
fn dispatch_before_store_fails_then_succeeds() {
    let renderer = StubRenderer::default();
    let stores = StubStores::default();

    // A handler reaching for the store before `before` runs finds nothing.
    let early = Arc::new(Mutex::new(Vec::new()));
    let early_clone = early.clone();
    *renderer.pre_before.lock().unwrap() = Some(Box::new(move |response: &Response| {
        let result = response.locals().dispatch("$dispatch", Action::new("noop"));
        early_clone.lock().unwrap().push(result.map_err(|e| e.to_string()));
    }));

    let handler = state_container(
        Page::new("home"),
        client_options(&renderer, &stores).before(before_hook(|_, _, response, done| {
            assert!(response
                .locals()
                .dispatch("$dispatch", Action::new("noop"))
                .is_ok());
            done(None)
        })),
    )
    .unwrap();

    let response = Response::new();
    response.locals().insert("count", json!(1));
    handler.call(None, Request::get("/"), response.clone(), Next::noop());

    assert_eq!(
        *early.lock().unwrap(),
        vec![Err::<(), String>("no dispatch function bound to locals key `$dispatch`".to_string())]
    );

    // After the request, the same dispatch forwards to the store and the
    // identity reducer leaves the state alone.
    response
        .locals()
        .dispatch("$dispatch", Action::new("noop"))
        .unwrap();
    let store = stores.get(0);
    assert_eq!(store.state(), json!({"count": 1}));
    assert_eq!(store.kinds(), vec!["noop", "$routeChange", "noop"]);
    assert_eq!(stores.count(), 1);
}

#[test]
fn request_cycle_rejects_store_access_before_creation() {
    let cycle = render_store::runtime::RequestCycle::new();
    assert_eq!(
        cycle.dispatch(Action::new("noop")).unwrap_err().to_string(),
        "cannot call dispatch until store is created"
    );
    assert_eq!(
        cycle.subscribe(listener(|_| {})).unwrap_err().to_string(),
        "cannot call subscribe until store is created"
    );
    assert!(cycle.store().is_none());
}

#[test]
fn route_change_carries_request_response_and_handle() {
    let renderer = StubRenderer::default();
    let stores = StubStores::default();
    let handler = state_container(
        Page::new("home"),
        client_options(&renderer, &stores).config(render_store::MiddlewareConfig {
            route_change_action: "ROUTE".to_string(),
            ..Default::default()
        }),
    )
    .unwrap();

    let request = Request::get("/profile");
    let response = Response::new();
    handler.call(None, request.clone(), response.clone(), Next::noop());

    let store = stores.get(0);
    let dispatched = store.dispatched.lock().unwrap();
    assert_eq!(dispatched.len(), 1);
    let action = &dispatched[0];
    assert_eq!(action.kind(), "ROUTE");
    match action.payload() {
        Payload::RouteChange {
            unsubscribe,
            request: carried_request,
            response: carried_response,
        } => {
            assert!(carried_request.ptr_eq(&request));
            assert!(carried_response.ptr_eq(&response));
            assert!(unsubscribe.is_active());
        }
        other => panic!("unexpected payload {other:?}"),
    }
    assert_eq!(renderer.renders(), 1);
}

#[test]
fn unsubscribe_is_idempotent_and_stops_renders() {
    let renderer = StubRenderer::default();
    let stores = StubStores::default();
    let handler = state_container(Page::new("home"), client_options(&renderer, &stores)).unwrap();

    let response = Response::new();
    handler.call(None, Request::get("/"), response.clone(), Next::noop());
    assert_eq!(renderer.renders(), 1);

    let store = stores.get(0);
    let handle = store.dispatched.lock().unwrap()[0]
        .unsubscribe()
        .cloned()
        .unwrap();

    response
        .locals()
        .dispatch("$dispatch", Action::new("tick"))
        .unwrap();
    assert_eq!(renderer.renders(), 2);

    assert!(handle.call());
    assert!(!handle.call());
    assert_eq!(store.detaches.load(Ordering::SeqCst), 1);

    response
        .locals()
        .dispatch("$dispatch", Action::new("tick"))
        .unwrap();
    assert_eq!(renderer.renders(), 2);
    assert_eq!(store.listener_count(), 0);
}

#[test]
fn subscribe_binding_forwards_to_the_store() {
    let renderer = StubRenderer::default();
    let stores = StubStores::default();
    let handler = state_container(Page::new("home"), client_options(&renderer, &stores)).unwrap();

    let response = Response::new();
    handler.call(None, Request::get("/"), response.clone(), Next::noop());

    let heard = Arc::new(AtomicUsize::new(0));
    let heard_clone = heard.clone();
    let handle = response
        .locals()
        .subscribe(
            "$subscribe",
            listener(move |_| {
                heard_clone.fetch_add(1, Ordering::SeqCst);
            }),
        )
        .unwrap();
    response
        .locals()
        .dispatch("$dispatch", Action::new("tick"))
        .unwrap();
    handle.call();
    response
        .locals()
        .dispatch("$dispatch", Action::new("tick"))
        .unwrap();

    assert_eq!(heard.load(Ordering::SeqCst), 1);
}

#[test]
fn custom_keys_are_used_for_bindings() {
    let renderer = StubRenderer::default();
    let stores = StubStores::default();
    let config = serde_json::from_value(json!({
        "dispatchKey": "dispatch",
        "subscribeKey": "subscribe",
    }))
    .unwrap();
    let handler = state_container(
        Page::new("home"),
        client_options(&renderer, &stores).config(config),
    )
    .unwrap();

    let response = Response::new();
    handler.call(None, Request::get("/"), response.clone(), Next::noop());
    assert!(response.locals().is_bound("dispatch"));
    assert!(response.locals().is_bound("subscribe"));
    assert!(!response.locals().is_bound("$dispatch"));
}

#[test]
fn error_aware_handler_passes_the_error_through() {
    let renderer = StubRenderer::default();
    let stores = StubStores::default();
    let seen = Arc::new(Mutex::new(None));
    let seen_clone = seen.clone();

    let handler = state_container(
        Page::new("home"),
        client_options(&renderer, &stores)
            .handle_errors(true)
            .after(after_hook(move |error, _, next| {
                *seen_clone.lock().unwrap() = error.as_ref().map(ToString::to_string);
                next.call(None);
            })),
    )
    .unwrap();

    // The stub renderer is a plain handler, so a pending error skips it.
    let forwarded = Arc::new(AtomicUsize::new(0));
    let forwarded_clone = forwarded.clone();
    handler.call(
        Some(Error::render("upstream")),
        Request::get("/"),
        Response::new(),
        Next::new(move |err| {
            assert!(err.is_some());
            forwarded_clone.fetch_add(1, Ordering::SeqCst);
        }),
    );
    assert_eq!(forwarded.load(Ordering::SeqCst), 1);
    assert!(seen.lock().unwrap().is_none());
    assert_eq!(stores.count(), 0);

    handler.call(None, Request::get("/"), Response::new(), Next::noop());
    assert_eq!(stores.count(), 1);
}

#[test]
fn factory_releases_previous_route_before_next_store() {
    let renderer = StubRenderer::default();
    let stores = StubStores::default();
    let factory = create_factory(client_options(&renderer, &stores)).unwrap();
    let handler = factory.middleware(Page::new("home")).unwrap();

    handler.call(None, Request::get("/first"), Response::new(), Next::noop());
    let first = stores.get(0);
    let u1 = first.dispatched.lock().unwrap()[0]
        .unsubscribe()
        .cloned()
        .unwrap();
    let held = factory.slot().held().unwrap();
    assert!(held.same_handle(&u1));
    // The factory's own route-change listener detached itself.
    assert_eq!(first.detaches.load(Ordering::SeqCst), 1);
    assert_eq!(first.listener_count(), 1);

    let other_page = factory.middleware(Page::new("about")).unwrap();
    other_page.call(None, Request::get("/second"), Response::new(), Next::noop());

    // U1 had already run when the second store was built, and ran once.
    assert_eq!(*stores.detaches_at_build.lock().unwrap(), vec![0, 2]);
    assert!(!u1.is_active());
    assert_eq!(first.detaches.load(Ordering::SeqCst), 2);
    assert_eq!(first.listener_count(), 0);

    let second = stores.get(1);
    let u2 = second.dispatched.lock().unwrap()[0]
        .unsubscribe()
        .cloned()
        .unwrap();
    assert!(factory.slot().held().unwrap().same_handle(&u2));
    assert!(u2.is_active());

    // Old store changes no longer render.
    let renders = renderer.renders();
    first.dispatch(Action::new("late"));
    assert_eq!(renderer.renders(), renders);
}

/// Render middleware that holds `after` back until the caller releases it.
#[derive(Clone, Default)]
struct DeferredRenderer {
    pending: Arc<Mutex<Vec<Box<dyn FnOnce() + Send>>>>,
    renders: Arc<AtomicUsize>,
}

impl DeferredRenderer {
    fn factory(&self) -> impl render_store::RenderMiddlewareFactory {
        let stub = self.clone();
        move |_page: Arc<dyn Renderable>, options: RenderOptions| -> RequestHandler {
            let stub = stub.clone();
            RequestHandler::plain(move |request, response, next| {
                let after = options.after.clone();
                let pending = stub.pending.clone();
                let renders = stub.renders.clone();
                let finish = move |error: Option<Error>| {
                    let Some(after) = after else { return };
                    pending.lock().unwrap().push(Box::new(move || {
                        after(
                            error,
                            Arc::new(move |_: &Value, done: RenderCallback| {
                                renders.fetch_add(1, Ordering::SeqCst);
                                done(Ok(()))
                            }),
                            next,
                        )
                    }));
                };
                match options.before.as_ref() {
                    Some(before) => before(&options, &request, &response, Box::new(finish)),
                    None => finish(None),
                }
            })
        }
    }

    fn release(&self) {
        let pending: Vec<_> = self.pending.lock().unwrap().drain(..).collect();
        for run in pending {
            run();
        }
    }
}

#[test]
fn deferred_after_hook_keeps_the_client_branch() {
    let renderer = DeferredRenderer::default();
    let stores = StubStores::default();
    let handler = state_container(
        Page::new("home"),
        StateContainerOptions::new()
            .render_middleware_factory(renderer.factory())
            .store_factory(stores.factory()),
    )
    .unwrap();

    let response = Response::new();
    Environment::Client.scope(|| {
        handler.call(None, Request::get("/"), response.clone(), Next::noop());
    });
    assert_eq!(stores.count(), 1);
    assert!(response.locals().is_bound("$dispatch"));

    // `after` runs outside the client scope and on another thread.
    let worker = renderer.clone();
    std::thread::spawn(move || worker.release()).join().unwrap();

    let store = stores.get(0);
    assert_eq!(store.kinds(), vec!["$routeChange"]);
    assert_eq!(renderer.renders.load(Ordering::SeqCst), 1);
    assert_eq!(store.listener_count(), 1);
}
