//! Route registration and the axum adapter.
//!
//! The node never owns a web server. It is handed something that can mount
//! handlers, registers its single route, and leaves serving to the caller.

use std::sync::Arc;

use axum::body::Bytes;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{on, MethodFilter};
use axum::Router;
use sso_sync::{InboundHandler, InboundReply, ReplyBody};
use tokio::net::TcpListener;

use crate::error::{NodeError, Result};
use crate::node::{build_router, SsoNode};

/// HTTP methods a route can be mounted under.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RouteMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl From<RouteMethod> for MethodFilter {
    fn from(method: RouteMethod) -> Self {
        match method {
            RouteMethod::Get => MethodFilter::GET,
            RouteMethod::Post => MethodFilter::POST,
            RouteMethod::Put => MethodFilter::PUT,
            RouteMethod::Delete => MethodFilter::DELETE,
        }
    }
}

/// Something a node can mount request handlers on.
pub trait RouteRegistrar {
    fn add_route(&mut self, method: RouteMethod, path: &str, handler: Arc<dyn InboundHandler>);
}

/// [`RouteRegistrar`] over an [`axum::Router`].
#[derive(Default)]
pub struct AxumRegistrar {
    router: Router,
    mounted: Vec<(RouteMethod, String)>,
}

impl AxumRegistrar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount onto an existing router.
    pub fn with_router(router: Router) -> Self {
        Self {
            router,
            mounted: Vec::new(),
        }
    }

    /// Routes mounted so far, in registration order.
    pub fn routes(&self) -> &[(RouteMethod, String)] {
        &self.mounted
    }

    pub fn into_router(self) -> Router {
        self.router
    }
}

impl RouteRegistrar for AxumRegistrar {
    fn add_route(&mut self, method: RouteMethod, path: &str, handler: Arc<dyn InboundHandler>) {
        let route = on(method.into(), move |body: Bytes| {
            let handler = Arc::clone(&handler);
            async move { reply_response(handler.handle(&body).await) }
        });
        let router = std::mem::take(&mut self.router);
        self.router = router.route(path, route);
        self.mounted.push((method, path.to_owned()));
    }
}

/// Render an inbound reply as an HTTP response.
pub fn reply_response(reply: InboundReply) -> Response {
    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    match reply.body {
        ReplyBody::Json(records) => (status, Json(records)).into_response(),
        ReplyBody::Text(text) => (status, text).into_response(),
    }
}

/// Serve `node` on `listener` until `shutdown` resolves.
pub async fn serve<F>(node: &SsoNode, listener: TcpListener, shutdown: F) -> Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let app = build_router(node);
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(addr = %addr, peers = node.topology().len(), "sso node listening");
    }
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(NodeError::Server)
}
