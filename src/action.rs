//! Actions dispatched into a store.

use crate::error::{Error, Result};
use crate::host::{Request, Response};
use crate::store::Unsubscribe;
use serde_json::{Map, Value};

/// A typed message describing a state-changing event.
///
/// `kind` plays the role of the action's `type`. The payload holds whatever
/// the kind needs; the two synthetic actions the middleware dispatches have
/// their own payload variants.
#[derive(Debug, Clone)]
pub struct Action {
    kind: String,
    payload: Payload,
}

/// Kind-specific action data.
#[derive(Debug, Clone)]
pub enum Payload {
    Empty,
    /// Free-form application data.
    Data(Value),
    /// Dispatched once per request right before control returns to the host.
    RouteChange {
        unsubscribe: Unsubscribe,
        request: Request,
        response: Response,
    },
    /// Dispatched by the generic middleware when a re-render fails.
    RenderError {
        error: Error,
        unsubscribe: Option<Unsubscribe>,
    },
}

impl Action {
    /// An action with no payload.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            payload: Payload::Empty,
        }
    }

    /// An action carrying application data.
    pub fn with_data(kind: impl Into<String>, data: Value) -> Self {
        Self {
            kind: kind.into(),
            payload: Payload::Data(data),
        }
    }

    /// The route-change action: the render unsubscribe plus the request and response.
    pub fn route_change(
        kind: impl Into<String>,
        unsubscribe: Unsubscribe,
        request: Request,
        response: Response,
    ) -> Self {
        Self {
            kind: kind.into(),
            payload: Payload::RouteChange {
                unsubscribe,
                request,
                response,
            },
        }
    }

    /// A render-error action carrying the failure and, once known, the render unsubscribe.
    pub fn render_error(
        kind: impl Into<String>,
        error: Error,
        unsubscribe: Option<Unsubscribe>,
    ) -> Self {
        Self {
            kind: kind.into(),
            payload: Payload::RenderError { error, unsubscribe },
        }
    }

    /// Parse a JSON action of the form `{"type": "...", ...}`.
    ///
    /// Every field other than `type` ends up in [`Payload::Data`]; an action
    /// with nothing but a type gets [`Payload::Empty`].
    pub fn from_json(value: Value) -> Result<Self> {
        let Value::Object(mut fields) = value else {
            return Err(Error::MissingActionType);
        };
        let kind = match fields.remove("type") {
            Some(Value::String(kind)) => kind,
            _ => return Err(Error::MissingActionType),
        };
        if fields.is_empty() {
            Ok(Self::new(kind))
        } else {
            Ok(Self::with_data(kind, Value::Object(fields)))
        }
    }

    /// The action's type.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The typed payload.
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Application data, if this is a data action.
    pub fn data(&self) -> Option<&Value> {
        match &self.payload {
            Payload::Data(data) => Some(data),
            _ => None,
        }
    }

    /// The unsubscribe handle carried by route-change and render-error actions.
    pub fn unsubscribe(&self) -> Option<&Unsubscribe> {
        match &self.payload {
            Payload::RouteChange { unsubscribe, .. } => Some(unsubscribe),
            Payload::RenderError { unsubscribe, .. } => unsubscribe.as_ref(),
            _ => None,
        }
    }

    /// The request a route change was made for.
    pub fn request(&self) -> Option<&Request> {
        match &self.payload {
            Payload::RouteChange { request, .. } => Some(request),
            _ => None,
        }
    }

    /// The response a route change was made for.
    pub fn response(&self) -> Option<&Response> {
        match &self.payload {
            Payload::RouteChange { response, .. } => Some(response),
            _ => None,
        }
    }

    /// The failure carried by a render-error action.
    pub fn error(&self) -> Option<&Error> {
        match &self.payload {
            Payload::RenderError { error, .. } => Some(error),
            _ => None,
        }
    }

    /// JSON view of the action. Handles and request objects are not
    /// serializable and are left out.
    pub fn to_json(&self) -> Value {
        let mut fields = match &self.payload {
            Payload::Data(Value::Object(map)) => map.clone(),
            Payload::Data(other) => {
                let mut map = Map::new();
                map.insert("data".to_string(), other.clone());
                map
            }
            Payload::RenderError { error, .. } => {
                let mut map = Map::new();
                map.insert("error".to_string(), Value::String(error.to_string()));
                map
            }
            Payload::Empty | Payload::RouteChange { .. } => Map::new(),
        };
        fields.insert("type".to_string(), Value::String(self.kind.clone()));
        Value::Object(fields)
    }
}
