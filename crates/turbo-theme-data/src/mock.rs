//! Scripted in-memory transport.
//!
//! Replies are matched on method and URL path (query string ignored).
//! One-shot replies are consumed first, in the order they were queued;
//! otherwise the latest standing reply for the route answers. Unmatched
//! requests get a 404.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use async_trait::async_trait;
use futures::channel::oneshot;

use crate::{FetchError, Method, Request, Response, Transport};

type Reply = Result<Response, FetchError>;

enum Outcome {
    Ready(Reply),
    Deferred(oneshot::Receiver<Reply>),
}

struct Expectation {
    method: Method,
    path: String,
    once: bool,
    outcome: Option<Outcome>,
    standing: Option<Reply>,
}

#[derive(Default)]
struct MockState {
    expectations: Vec<Expectation>,
    requests: Vec<Request>,
}

/// A transport whose replies are scripted by the test.
#[derive(Clone, Default)]
pub struct MockTransport {
    state: Rc<RefCell<MockState>>,
}

/// Completes a deferred reply.
pub struct DeferredReply {
    sender: oneshot::Sender<Reply>,
}

impl DeferredReply {
    /// Resolve the pending request with a JSON response.
    pub fn respond(self, status: u16, body: serde_json::Value) {
        let _ = self.sender.send(Ok(Response::json_body(status, &body)));
    }

    /// Resolve the pending request with an error.
    pub fn fail(self, error: FetchError) {
        let _ = self.sender.send(Err(error));
    }
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every matching request with `status` and a JSON body.
    pub fn respond(&self, method: Method, path: &str, status: u16, body: serde_json::Value) {
        self.standing(method, path, Ok(Response::json_body(status, &body)));
    }

    /// Fail every matching request with `error`.
    pub fn fail(&self, method: Method, path: &str, error: FetchError) {
        self.standing(method, path, Err(error));
    }

    /// Answer the next matching request only.
    pub fn respond_once(&self, method: Method, path: &str, status: u16, body: serde_json::Value) {
        self.once(
            method,
            path,
            Outcome::Ready(Ok(Response::json_body(status, &body))),
        );
    }

    /// Hold the next matching request open until the returned handle resolves it.
    pub fn defer(&self, method: Method, path: &str) -> DeferredReply {
        let (sender, receiver) = oneshot::channel();
        self.once(method, path, Outcome::Deferred(receiver));
        DeferredReply { sender }
    }

    /// Every request sent so far.
    pub fn requests(&self) -> Vec<Request> {
        self.state.borrow().requests.clone()
    }

    /// Number of requests sent to `path`.
    pub fn request_count(&self, path: &str) -> usize {
        self.state
            .borrow()
            .requests
            .iter()
            .filter(|r| r.path() == path)
            .count()
    }

    fn standing(&self, method: Method, path: &str, reply: Reply) {
        self.state.borrow_mut().expectations.push(Expectation {
            method,
            path: path.to_string(),
            once: false,
            outcome: None,
            standing: Some(reply),
        });
    }

    fn once(&self, method: Method, path: &str, outcome: Outcome) {
        self.state.borrow_mut().expectations.push(Expectation {
            method,
            path: path.to_string(),
            once: true,
            outcome: Some(outcome),
            standing: None,
        });
    }

    fn take_outcome(&self, request: &Request) -> Outcome {
        let mut state = self.state.borrow_mut();
        state.requests.push(request.clone());

        let matches =
            |e: &Expectation| e.method == request.method && e.path == request.path();

        if let Some(idx) = state.expectations.iter().position(|e| e.once && matches(e)) {
            let mut expectation = state.expectations.remove(idx);
            if let Some(outcome) = expectation.outcome.take() {
                return outcome;
            }
        }

        let standing = state
            .expectations
            .iter()
            .rev()
            .find(|e| !e.once && matches(e))
            .and_then(|e| e.standing.clone());

        Outcome::Ready(standing.unwrap_or_else(|| Ok(Response::new(404, HashMap::new(), Vec::new()))))
    }
}

#[async_trait(?Send)]
impl Transport for MockTransport {
    async fn send(&self, request: Request) -> Result<Response, FetchError> {
        match self.take_outcome(&request) {
            Outcome::Ready(reply) => reply,
            Outcome::Deferred(receiver) => receiver
                .await
                .unwrap_or_else(|_| Err(FetchError::Transport("request aborted".to_string()))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use serde_json::json;

    #[test]
    fn test_once_then_standing() {
        let mock = MockTransport::new();
        mock.respond(Method::Get, "/cart.js", 200, json!({"item_count": 1}));
        mock.respond_once(Method::Get, "/cart.js", 500, json!({}));

        let first = block_on(mock.send(Request::get("/cart.js"))).unwrap();
        let second = block_on(mock.send(Request::get("/cart.js?x=1"))).unwrap();

        assert_eq!(first.status, 500);
        assert_eq!(second.status, 200);
        assert_eq!(mock.request_count("/cart.js"), 2);
    }

    #[test]
    fn test_unmatched_is_404() {
        let mock = MockTransport::new();
        mock.respond(Method::Post, "/cart.js", 200, json!({}));
        let reply = block_on(mock.send(Request::get("/cart.js"))).unwrap();
        assert_eq!(reply.status, 404);
    }

    #[test]
    fn test_deferred_reply() {
        let mock = MockTransport::new();
        let pending = mock.defer(Method::Get, "/slow");
        pending.respond(201, json!({"ok": true}));

        let reply = block_on(mock.send(Request::get("/slow"))).unwrap();
        assert_eq!(reply.status, 201);
    }

    #[test]
    fn test_dropped_deferred_is_transport_error() {
        let mock = MockTransport::new();
        drop(mock.defer(Method::Get, "/slow"));
        let err = block_on(mock.send(Request::get("/slow"))).unwrap_err();
        assert!(err.is_transport());
    }
}
