//! Tower middleware wiring the [`SessionStore`] into request handling.
//!
//! The layer is the session registry: it builds one [`Session`] per request,
//! inserts it into the request extensions (so repeated lookups within the
//! request return the same handle), and after the inner service responds it
//! persists the session if the handler modified it.

use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use http::{Request, Response};
use tower_cookies::CookieManager;
use tower_layer::Layer;
use tower_service::Service;

use crate::{session::Session, store::SessionStore};

#[derive(Debug, Clone)]
pub struct SessionManagerLayer {
    store: Arc<SessionStore>,
}

impl SessionManagerLayer {
    #[must_use]
    pub fn new(store: SessionStore) -> Self {
        Self {
            store: Arc::new(store),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionManager<S> {
    inner: S,
    store: Arc<SessionStore>,
}

impl<S> Layer<S> for SessionManagerLayer {
    type Service = CookieManager<SessionManager<S>>;

    fn layer(&self, inner: S) -> Self::Service {
        CookieManager::new(SessionManager {
            inner,
            store: self.store.clone(),
        })
    }
}

impl<ReqBody, ResBody, S> Service<Request<ReqBody>> for SessionManager<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send,
    ReqBody: Send + 'static,
    ResBody: Default + Send,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<ReqBody>) -> Self::Future {
        let store = self.store.clone();

        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            let cookies = match req.extensions().get::<tower_cookies::Cookies>().cloned() {
                Some(cookies) => cookies,
                None => {
                    let mut res = Response::default();
                    *res.status_mut() = http::StatusCode::INTERNAL_SERVER_ERROR;
                    return Ok(res);
                }
            };

            let (session, hydrate_err) = store.new_session(&cookies).await;
            if let Some(err) = hydrate_err {
                // Decode and load failures degrade to a fresh session.
                tracing::warn!(err = %err, "session hydration failed, starting fresh");
            }
            req.extensions_mut().insert(session.clone());

            let res = inner.call(req).await?;

            if session.is_modified()
                && !res.status().is_server_error()
                && let Err(err) = store.save(&cookies, &session).await
            {
                // The client must not believe a session was established when
                // it was not.
                tracing::error!(err = %err, "session save failed");
                let mut res = Response::default();
                *res.status_mut() = http::StatusCode::INTERNAL_SERVER_ERROR;
                return Ok(res);
            }

            Ok(res)
        })
    }
}
