//! No-op navigation client: every leg succeeds instantly.
//!
//! Used by unit tests and benches where motion timing is irrelevant.

use std::{future::Future, pin::Pin, task::Poll};

use tower::Service;

use crate::delivery::{
    api::types::{NavRequest, NavResponse},
    error::DeliveryError,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct NavNop;

impl Service<NavRequest> for NavNop {
    type Response = NavResponse;
    type Error = DeliveryError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _: &mut std::task::Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: NavRequest) -> Self::Future {
        Box::pin(async move {
            match request {
                NavRequest::MoveTo(_) => Ok(NavResponse::Arrived),
                NavRequest::Undock => Ok(NavResponse::Undocked),
            }
        })
    }
}
