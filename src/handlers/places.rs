use async_trait::async_trait;
use axum::http::StatusCode;

use super::{failure_reply, Handler, HandlerRequest, Reply};
use crate::upstream::{PlaceQuery, PlacesClient, UpstreamOutcome};

pub struct PlacesHandler {
    client: PlacesClient,
}

impl PlacesHandler {
    pub fn new(client: PlacesClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Handler for PlacesHandler {
    async fn handle(&self, request: HandlerRequest) -> Reply {
        let query = PlaceQuery::from_params(&request.query, self.client.config());

        match self.client.nearby(&query).await {
            UpstreamOutcome::Success(results) => Reply::ok(results),
            UpstreamOutcome::ProviderError(payload) => Reply::json(StatusCode::BAD_REQUEST, payload),
            UpstreamOutcome::TransportFailure(e) => failure_reply(
                self.client.config().error_detail,
                "Places lookup failed",
                e.to_json(),
            ),
        }
    }
}
