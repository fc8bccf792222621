use serde::{Deserialize, Serialize};

/// Scalar settings of the store middleware.
///
/// Deserializes from the camelCase option names, with every key optional:
///
/// ```
/// use render_store::MiddlewareConfig;
/// use serde_json::json;
///
/// let config: MiddlewareConfig =
///     serde_json::from_value(json!({ "dispatchKey": "dispatch" })).unwrap();
/// assert_eq!(config.dispatch_key, "dispatch");
/// assert_eq!(config.subscribe_key, "$subscribe");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MiddlewareConfig {
    /// Build an `(error, request, response, next)` handler instead of a
    /// `(request, response, next)` one.
    pub handle_errors: bool,
    /// Locals key the dispatch function is bound under.
    pub dispatch_key: String,
    /// Locals key the subscribe function is bound under.
    pub subscribe_key: String,
    /// Type of the action dispatched at the start of each render cycle.
    pub route_change_action: String,
    /// Type of the action dispatched when a re-render fails.
    pub render_error_action: String,
}

impl Default for MiddlewareConfig {
    fn default() -> Self {
        Self {
            handle_errors: false,
            dispatch_key: "$dispatch".to_string(),
            subscribe_key: "$subscribe".to_string(),
            route_change_action: "$routeChange".to_string(),
            render_error_action: "$renderError".to_string(),
        }
    }
}

/// Settings of the rendering middleware: the shared settings plus the
/// choice of render path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderingConfig {
    #[serde(flatten)]
    pub base: MiddlewareConfig,
    /// Render without hydrating server-rendered markup.
    pub no_hydrate: bool,
}
