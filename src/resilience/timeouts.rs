//! Timeout enforcement.
//!
//! # Responsibilities
//! - Fix one deadline per request when forwarding starts
//! - Bound the upstream call and the relayed response body by that deadline
//!
//! # Design Decisions
//! - Uses Tokio's timer; the inner future is dropped on expiry
//! - Timeout errors are distinct from other errors
//! - A deadline hit before the response head returns 504 Gateway Timeout;
//!   one hit while the body streams ends the body with an error, so the
//!   caller sees a truncated response

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use axum::body::{Body, Bytes, HttpBody};
use hyper::body::{Frame, SizeHint};
use thiserror::Error;
use tokio::time::{Instant, Sleep};

/// The deadline passed before the operation completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("deadline of {0:?} elapsed")]
pub struct DeadlineElapsed(pub Duration);

/// The instant by which one request has to be fully answered.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    at: Instant,
    budget: Duration,
}

impl Deadline {
    /// A deadline `budget` from now.
    pub fn after(budget: Duration) -> Self {
        Self {
            at: Instant::now() + budget,
            budget,
        }
    }

    /// Run `fut` to completion or until the deadline, whichever is first.
    pub async fn run<F>(&self, fut: F) -> Result<F::Output, DeadlineElapsed>
    where
        F: Future,
    {
        tokio::time::timeout_at(self.at, fut)
            .await
            .map_err(|_| DeadlineElapsed(self.budget))
    }

    /// Wrap `body` so it fails with [`DeadlineElapsed`] if it is still
    /// streaming when the deadline passes.
    pub fn bound_body(&self, body: Body) -> Body {
        Body::new(DeadlineBody {
            inner: body,
            timer: Box::pin(tokio::time::sleep_until(self.at)),
            budget: self.budget,
            expired: false,
        })
    }
}

struct DeadlineBody {
    inner: Body,
    timer: Pin<Box<Sleep>>,
    budget: Duration,
    expired: bool,
}

impl HttpBody for DeadlineBody {
    type Data = Bytes;
    type Error = axum::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Bytes>, axum::Error>>> {
        let this = self.get_mut();
        if this.expired {
            return Poll::Ready(None);
        }

        if let Poll::Ready(frame) = Pin::new(&mut this.inner).poll_frame(cx) {
            return Poll::Ready(frame);
        }

        if this.timer.as_mut().poll(cx).is_ready() {
            this.expired = true;
            tracing::warn!(
                budget_ms = this.budget.as_millis() as u64,
                "Response body still streaming at request deadline, cutting it off"
            );
            return Poll::Ready(Some(Err(axum::Error::new(DeadlineElapsed(this.budget)))));
        }

        Poll::Pending
    }

    fn is_end_stream(&self) -> bool {
        self.expired || self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        self.inner.size_hint()
    }
}
