use std::{convert::Infallible, future::Future, net::SocketAddr, sync::Arc};

use emission_zk_prover::{Error, PREPARATION_STARTED, ProofService};
use hyper::{
    Body, Request, Response, Server, StatusCode,
    header::{CONTENT_TYPE, HeaderValue},
    service::{make_service_fn, service_fn},
};

pub const PREPARE_DOWNLOAD: &str = "/prepare-download";
pub const SUBMIT_PROOF: &str = "/submit-proof";

/// HTTP status reported for a failed submission.
pub fn status_for(err: &Error) -> StatusCode {
    match err {
        Error::NotReady => StatusCode::BAD_REQUEST,
        Error::DeadlineExceeded { .. } => StatusCode::GATEWAY_TIMEOUT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn text(status: StatusCode, body: impl Into<Body>) -> Response<Body> {
    let mut response = Response::new(body.into());
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"));
    response
}

/// Route a single request. Both routes accept any method.
pub async fn handle(
    service: Arc<ProofService>,
    req: Request<Body>,
) -> Result<Response<Body>, Infallible> {
    let response = match req.uri().path() {
        PREPARE_DOWNLOAD => {
            // Detached, the outcome only reaches the logs.
            drop(service.prepare_download());
            text(StatusCode::OK, PREPARATION_STARTED)
        }
        SUBMIT_PROOF => match service.submit_proof().await {
            Ok(submitted) => match serde_json::to_vec(&submitted) {
                Ok(body) => {
                    let mut response = Response::new(Body::from(body));
                    response
                        .headers_mut()
                        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                    response
                }
                Err(e) => text(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            },
            Err(e) => {
                tracing::error!(error = %e, "proof submission failed");
                text(status_for(&e), e.to_string())
            }
        },
        path => {
            tracing::debug!(path, "no such route");
            text(StatusCode::NOT_FOUND, "404 page not found")
        }
    };
    Ok(response)
}

/// Bind `addr` and serve `service` until `shutdown` resolves.
///
/// Returns the bound address, useful when binding port 0, and the server future.
pub fn serve(
    service: Arc<ProofService>,
    addr: SocketAddr,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> eyre::Result<(SocketAddr, impl Future<Output = hyper::Result<()>>)> {
    let make_service = make_service_fn(move |_conn| {
        let service = Arc::clone(&service);
        async move {
            Ok::<_, Infallible>(service_fn(move |req| handle(Arc::clone(&service), req)))
        }
    });

    let server = Server::try_bind(&addr)?.serve(make_service);
    let local_addr = server.local_addr();
    tracing::info!(addr = %local_addr, "listening");

    Ok((local_addr, server.with_graceful_shutdown(shutdown)))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use emission_zk_integration::DevServiceBuilder;
    use emission_zk_prover::Stage;
    use hyper::{Client, body::to_bytes};
    use tokio::sync::oneshot;

    use super::*;

    fn dev_service(values: &[u64]) -> Arc<ProofService> {
        Arc::new(DevServiceBuilder::default().slot_values(values).build().service)
    }

    async fn call(service: &Arc<ProofService>, path: &str) -> (StatusCode, String) {
        let req = Request::get(path).body(Body::empty()).unwrap();
        let response = handle(Arc::clone(service), req).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body()).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[test]
    fn error_statuses() {
        assert_eq!(status_for(&Error::NotReady), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_for(&Error::DeadlineExceeded {
                stage: Stage::WaitFinality,
                started: true,
            }),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            status_for(&Error::Stage {
                stage: Stage::GenerateProof,
                src: "unsatisfied".to_string()
            }),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn submit_before_prepare_is_a_bad_request() {
        let service = dev_service(&[10_000]);

        let (status, body) = call(&service, SUBMIT_PROOF).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, "Circuit not prepared yet. Please try again later.");
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let service = dev_service(&[]);
        let (status, _) = call(&service, "/proofs").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn prepare_then_submit() {
        let service = dev_service(&[10_000, 10_000]);

        let (status, body) = call(&service, PREPARE_DOWNLOAD).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, PREPARATION_STARTED);

        for _ in 0..100 {
            if service.gate().compiled().await.is_some() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        let (status, body) = call(&service, SUBMIT_PROOF).await;
        assert_eq!(status, StatusCode::OK, "{body}");

        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert!(json["request_id"].as_str().unwrap().starts_with("0x"));
        assert!(json["transaction"].as_str().unwrap().starts_with("0x"));
        assert!(json["fee"].is_u64());
    }

    #[tokio::test]
    async fn serves_over_tcp_until_shutdown() {
        let service = dev_service(&[10_000]);
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let (addr, server) = serve(service, SocketAddr::from(([127, 0, 0, 1], 0)), async {
            let _ = shutdown_rx.await;
        })
        .unwrap();
        let server = tokio::spawn(server);

        let uri = format!("http://{addr}{PREPARE_DOWNLOAD}").parse().unwrap();
        let response = Client::new().get(uri).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body()).await.unwrap();
        assert_eq!(&body[..], PREPARATION_STARTED.as_bytes());

        shutdown_tx.send(()).unwrap();
        server.await.unwrap().unwrap();
    }
}
