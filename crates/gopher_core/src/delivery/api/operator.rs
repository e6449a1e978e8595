//! Operator API service.

use std::{future::Future, pin::Pin, task::Poll};

use tower::Service;

use crate::delivery::{
    api::types::{OperatorRequest, OperatorResponse},
    core::{interaction::Interactions, semantics::SemanticMap},
    error::DeliveryError,
};

/// Facade for humans and supervising tools: button presses, notification
/// feeds and semantic map administration.
#[derive(Clone)]
pub struct OperatorApiService {
    semantics: SemanticMap,
    interactions: Interactions,
}

impl OperatorApiService {
    pub fn new(semantics: SemanticMap, interactions: Interactions) -> Self {
        Self { semantics, interactions }
    }
}

impl Service<OperatorRequest> for OperatorApiService {
    type Response = OperatorResponse;
    type Error = DeliveryError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _: &mut std::task::Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: OperatorRequest) -> Self::Future {
        let this = self.clone();
        Box::pin(async move {
            match request {
                OperatorRequest::Press(button) => {
                    #[cfg(feature = "gopher_tracing")]
                    tracing::info!("[operator] Press: {:?}", button);
                    this.interactions.press(button);
                    Ok(OperatorResponse::Ack)
                }
                OperatorRequest::WatchNotifications => {
                    Ok(OperatorResponse::Notifications(this.interactions.watch()))
                }
                OperatorRequest::AddLocation(location) => {
                    if location.unique_name.is_empty() {
                        return Err(DeliveryError::InvalidSemanticMap(
                            "location without a unique name".to_string(),
                        ));
                    }
                    #[cfg(feature = "gopher_tracing")]
                    tracing::info!("[operator] AddLocation: {}", location.unique_name);
                    this.semantics.insert(location);
                    Ok(OperatorResponse::Ack)
                }
                OperatorRequest::GetLocations => {
                    Ok(OperatorResponse::Locations(this.semantics.list()))
                }
                OperatorRequest::GetLocation(name) => this
                    .semantics
                    .get(&name)
                    .map(OperatorResponse::Location)
                    .ok_or(DeliveryError::UnknownLocation(name)),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delivery::core::semantics::Location;

    #[tokio::test]
    async fn test_operator_location_admin() {
        let mut operator = OperatorApiService::new(SemanticMap::new(), Interactions::new());

        assert!(matches!(
            operator
                .call(OperatorRequest::AddLocation(Location {
                    unique_name: "sofa".to_string(),
                    name: "Sofa".to_string(),
                    ..Default::default()
                }))
                .await
                .unwrap(),
            OperatorResponse::Ack
        ));

        let OperatorResponse::Location(location) =
            operator.call(OperatorRequest::GetLocation("sofa".to_string())).await.unwrap()
        else {
            panic!("Expected Location");
        };
        assert_eq!(location.name, "Sofa");

        assert_eq!(
            operator
                .call(OperatorRequest::GetLocation("void".to_string()))
                .await
                .unwrap_err(),
            DeliveryError::UnknownLocation("void".to_string())
        );
    }

    #[tokio::test]
    async fn test_operator_rejects_anonymous_locations() {
        let mut operator = OperatorApiService::new(SemanticMap::new(), Interactions::new());
        assert!(matches!(
            operator
                .call(OperatorRequest::AddLocation(Location::default()))
                .await
                .unwrap_err(),
            DeliveryError::InvalidSemanticMap(_)
        ));
    }
}
