use axum::extract::DefaultBodyLimit;
use std::time::Duration;
use tower::layer::util::{Identity, Stack};
use tower::ServiceBuilder;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::HttpMakeClassifier;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

type Layers = Stack<
    TimeoutLayer,
    Stack<
        DefaultBodyLimit,
        Stack<RequestBodyLimitLayer, Stack<CorsLayer, Stack<TraceLayer<HttpMakeClassifier>, Identity>>>,
    >,
>;

/// `body_limit` is the only request size cap; axum's extractor default is
/// switched off so it cannot undercut it.
pub fn stack(body_limit: usize, timeout: Duration) -> ServiceBuilder<Layers> {
    let trace = TraceLayer::new_for_http();
    let cors = CorsLayer::permissive();
    let limit = RequestBodyLimitLayer::new(body_limit);

    ServiceBuilder::new()
        .layer(trace)
        .layer(cors)
        .layer(limit)
        .layer(DefaultBodyLimit::disable())
        .layer(TimeoutLayer::new(timeout))
}
