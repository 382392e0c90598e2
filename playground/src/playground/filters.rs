use crate::responder::Responder;
use common_env::{METRICS_PATH, RANDO_PATH};
use http::header::CONTENT_TYPE;
use http::{Method, Response, StatusCode};
use hyper::Body;
use log::error;
use playground_metrics::PlaygroundMetrics;
use std::convert::Infallible;
use std::sync::Arc;
use warp::{reply, Filter};

pub fn routes(
    responder: Arc<Responder>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    let prometheus_metric = prometheus_metric(responder.metrics().clone());
    let rando = rando(responder);
    prometheus_metric.or(rando)
}

/// `ANY /rando`
pub fn rando(
    responder: Arc<Responder>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::path(RANDO_PATH.trim_start_matches('/'))
        .and(warp::path::end())
        .and(warp::method())
        .and(with_responder(responder))
        .and_then(|method: Method, responder: Arc<Responder>| async move {
            // outlives the connection when the client hangs up mid-delay
            let handled =
                tokio::spawn(async move { responder.handle(&method, RANDO_PATH).await });
            let status = handled.await.unwrap_or_else(|e| {
                error!("rando handler failed: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            });
            Ok::<_, Infallible>(reply::with_status(reply(), status))
        })
}

/// `GET /metrics`
pub fn prometheus_metric(
    metrics: Arc<PlaygroundMetrics>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::get()
        .and(warp::path(METRICS_PATH.trim_start_matches('/')))
        .and(warp::path::end())
        .map(move || match metrics.encode() {
            Ok(buffer) => Response::builder()
                .status(200)
                .header(CONTENT_TYPE, metrics.format_type())
                .body(Body::from(buffer)),
            Err(e) => {
                error!("failed to export metrics: {}", e);
                Response::builder()
                    .status(500)
                    .body(Body::from("Error exporting metrics"))
            }
        })
        .map(|response: Result<Response<Body>, http::Error>| {
            response.unwrap_or_else(|e| {
                error!("failed to build metrics response: {}", e);
                let mut response = Response::new(Body::empty());
                *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
                response
            })
        })
}

fn with_responder(
    responder: Arc<Responder>,
) -> impl Filter<Extract = (Arc<Responder>,), Error = Infallible> + Clone {
    warp::any().map(move || responder.clone())
}
