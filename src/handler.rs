//! Handler trait and type erasure.
//!
//! # How async handlers are stored
//!
//! Both the page router and the REST dispatcher keep handlers of *different*
//! concrete types in one collection, so each handler is hidden behind a trait
//! object (`dyn ErasedHandler`). A handler receives the shared application
//! state `S` and a per-request argument `A`: the [`Request`](crate::Request)
//! for pages, a [`Call`](crate::dispatch::Call) for REST endpoints.
//!
//! ```text
//! async fn list(app: Arc<App>, call: Call) -> Response { … }  ← user writes this
//!        ↓ dispatcher.map(Method::Get, "/post", list)
//! list.into_boxed_handler()                                    ← blanket impl
//!        ↓
//! Arc::new(FnHandler(list))                                    ← stored once
//!        ↓  BoxedHandler<S, A> = Arc<dyn ErasedHandler<S, A>>
//! handler.call(state, call)  at request time                   ← one vtable call
//! ```
//!
//! Handlers are resolved at registration time; nothing is looked up by name
//! while a request is being served.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::response::{IntoResponse, Response};

// ── Internal types ────────────────────────────────────────────────────────────

/// A heap-allocated, type-erased future that resolves to a [`Response`].
pub(crate) type BoxFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// Internal dispatch interface.
///
/// `#[doc(hidden)] pub` rather than `pub(crate)` because it appears in the
/// return type of the public `Handler` trait's `into_boxed_handler` method.
#[doc(hidden)]
pub trait ErasedHandler<S, A> {
    fn call(&self, state: S, arg: A) -> BoxFuture;
}

/// A type-erased handler shared across concurrent requests.
#[doc(hidden)]
pub type BoxedHandler<S, A> = Arc<dyn ErasedHandler<S, A> + Send + Sync + 'static>;

// ── Public Handler trait ──────────────────────────────────────────────────────

/// Implemented for every valid handler.
///
/// Automatically satisfied for any `async fn` (or closure returning a future)
/// with the shape:
///
/// ```text
/// async fn name(state: S, arg: A) -> impl IntoResponse
/// ```
///
/// The trait is sealed: only the blanket impl below can satisfy it.
pub trait Handler<S, A>: private::Sealed<S, A> + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler<S, A>;
}

mod private {
    pub trait Sealed<S, A> {}
}

// ── Blanket implementations ───────────────────────────────────────────────────

impl<F, Fut, R, S, A> private::Sealed<S, A> for F
where
    F: Fn(S, A) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
}

impl<F, Fut, R, S, A> Handler<S, A> for F
where
    F: Fn(S, A) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
    S: 'static,
    A: 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler<S, A> {
        Arc::new(FnHandler(self))
    }
}

// ── Concrete wrapper ──────────────────────────────────────────────────────────

/// Newtype wrapper that holds a concrete handler `F` and implements
/// [`ErasedHandler`], bridging the typed world to the trait-object world.
struct FnHandler<F>(F);

impl<F, Fut, R, S, A> ErasedHandler<S, A> for FnHandler<F>
where
    F: Fn(S, A) -> Fut + Send + Sync,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn call(&self, state: S, arg: A) -> BoxFuture {
        let fut = (self.0)(state, arg);
        Box::pin(async move { fut.await.into_response() })
    }
}
