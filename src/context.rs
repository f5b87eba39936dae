//! Ambient query-tag context.
//!
//! Replaces "which request am I serving?" stack inspection with explicit
//! scopes: request-handling code enters a [`QueryContext`] and every statement
//! executed while the scope is alive can resolve it. Scopes nest; the
//! innermost one wins.

use std::fmt::Display;
use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;
use std::task::Poll;

use pin_project::pin_project;

/// One entry on the context stack.
#[derive(Debug, Default, Clone)]
struct ContextFrame {
    tag: Option<String>,
    request_path: Option<String>,
}

impl ContextFrame {
    /// Explicit tag first, request path second; empty strings count as unset.
    fn resolve(&self) -> Option<&str> {
        self.tag
            .as_deref()
            .filter(|tag| !tag.is_empty())
            .or_else(|| {
                self.request_path
                    .as_deref()
                    .filter(|path| !path.is_empty())
            })
    }
}

thread_local! {
    static CONTEXT_STACK: std::cell::RefCell<Vec<ContextFrame>> =
        const { std::cell::RefCell::new(Vec::new()) };
}

/// A source of request paths for annotation fallback.
///
/// Implement this for your framework's request type so a [`QueryContext`]
/// built with [`QueryContext::with_request`] can label queries with the route
/// being served.
pub trait RequestPath {
    /// The path of the request, e.g. `/login`.
    fn path(&self) -> &str;
}

/// Context for the queries executed within one scope.
///
/// Holds an optional explicit tag and an optional request path. The tag takes
/// precedence when both are set.
///
/// # Example
///
/// ```rust
/// use sea_orm_query_tag::{resolve_tag, QueryContext};
///
/// let _scope = QueryContext::new().with_tag("billing-backfill").enter();
/// assert_eq!(resolve_tag().as_deref(), Some("billing-backfill"));
/// ```
#[derive(Debug, Default)]
pub struct QueryContext {
    frame: ContextFrame,
}

impl QueryContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an explicit diagnostic tag.
    ///
    /// Any displayable value is accepted and coerced to its string form.
    pub fn with_tag(mut self, tag: impl Display) -> Self {
        self.frame.tag = Some(tag.to_string());
        self
    }

    /// Set the request whose path labels queries when no explicit tag is set.
    ///
    /// The path is captured at this point; the request is not retained.
    pub fn with_request<R: RequestPath + ?Sized>(mut self, request: &R) -> Self {
        self.frame.request_path = Some(request.path().to_owned());
        self
    }

    /// Push this context onto the current thread's stack.
    ///
    /// The context stays active until the returned guard is dropped.
    pub fn enter(self) -> ContextGuard {
        CONTEXT_STACK.with(|stack| stack.borrow_mut().push(self.frame));
        ContextGuard {
            _not_send: PhantomData,
        }
    }
}

/// Keeps a [`QueryContext`] active; pops it on drop.
#[derive(Debug)]
pub struct ContextGuard {
    // Keeps the guard on the thread that entered the scope.
    _not_send: PhantomData<*const ()>,
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        CONTEXT_STACK.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}

/// Resolve the tag for the current point of execution.
///
/// Walks the active scopes innermost first. In each scope the explicit tag is
/// checked before the request path; the first non-empty value wins. Returns
/// `None` when no scope carries either, in which case no annotation is
/// applied.
pub fn resolve_tag() -> Option<String> {
    CONTEXT_STACK.with(|stack| {
        stack
            .borrow()
            .iter()
            .rev()
            .find_map(|frame| frame.resolve().map(str::to_owned))
    })
}

/// A future that re-enters a [`QueryContext`] on every poll.
///
/// Needed when the executor may move the future between threads: a plain
/// [`ContextGuard`] only covers the thread it was created on.
#[pin_project]
pub struct TaggedFuture<F> {
    #[pin]
    inner: F,
    frame: Option<ContextFrame>,
}

impl<F: Future> Future for TaggedFuture<F> {
    type Output = F::Output;

    fn poll(self: Pin<&mut Self>, cx: &mut std::task::Context<'_>) -> Poll<Self::Output> {
        let this = self.project();

        let frame = this.frame.take().unwrap_or_default();
        CONTEXT_STACK.with(|stack| stack.borrow_mut().push(frame));
        let result = this.inner.poll(cx);
        *this.frame = CONTEXT_STACK.with(|stack| stack.borrow_mut().pop());

        result
    }
}

/// Extension trait for running a future inside a [`QueryContext`].
pub trait FutureExt: Future + Sized {
    /// Run this future with `context` active for every statement it executes.
    fn in_query_context(self, context: QueryContext) -> TaggedFuture<Self>;
}

impl<F: Future> FutureExt for F {
    fn in_query_context(self, context: QueryContext) -> TaggedFuture<Self> {
        TaggedFuture {
            inner: self,
            frame: Some(context.frame),
        }
    }
}
