//! HTTP/1 front end for the table engine.

use std::convert::Infallible;
use std::sync::Arc;

use http_body_util::Full;
use hyper::Request;
use hyper::Response;
use hyper::StatusCode;
use hyper::body::Bytes;
use hyper::body::Incoming;
use hyper::header::CONTENT_TYPE;
use hyper::header::HeaderValue;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use log::debug;
use log::info;
use log::warn;
use serde_json::json;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use super::TableEngine;

/// Serves the engine until `cancel` fires.
///
/// The last path segment selects the action, so `/api/table/data?page=2`
/// runs `data`. Successful answers are JSON with status 200. Failures carry
/// their status and a `{statusCode, statusMessage}` body.
pub async fn serve(
    listener: TcpListener,
    engine: Arc<TableEngine>,
    cancel: CancellationToken,
) -> std::io::Result<()> {
    info!("Table engine listening on {}", listener.local_addr()?);

    loop {
        let (stream, peer) = tokio::select! {
            _ = cancel.cancelled() => {
                info!("Table engine shutting down");
                return Ok(());
            }
            accepted = listener.accept() => match accepted {
                Ok(accepted) => accepted,
                Err(e) => {
                    warn!("Accept failed: {}", e);
                    continue;
                }
            },
        };

        let io = TokioIo::new(stream);
        let engine = Arc::clone(&engine);
        tokio::spawn(async move {
            let service = service_fn(move |req: Request<Incoming>| {
                let engine = Arc::clone(&engine);
                async move { Ok::<_, Infallible>(respond(&engine, &req)) }
            });
            if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                debug!("Connection from {} ended with error: {}", peer, e);
            }
        });
    }
}

fn respond<B>(engine: &TableEngine, req: &Request<B>) -> Response<Full<Bytes>> {
    let action = action_of(req.uri().path());
    let query = req.uri().query().unwrap_or_default();

    match engine.handle(action, query) {
        Ok(body) => json_response(StatusCode::OK, &body),
        Err(e) => {
            warn!("Table engine error on '{}': {}", action, e);
            let status =
                StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            let body = json!({
                "statusCode": e.status_code(),
                "statusMessage": e.status_message(),
            });
            json_response(status, &body)
        }
    }
}

/// Returns the last non-empty path segment.
fn action_of(path: &str) -> &str {
    path.trim_end_matches('/').rsplit('/').next().unwrap_or_default()
}

fn json_response(status: StatusCode, body: &serde_json::Value) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from(body.to_string())));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Column;
    use crate::model::Record;
    use http_body_util::BodyExt;

    fn engine() -> TableEngine {
        TableEngine::new(
            vec![Column::new("name", "Name").sortable()],
            vec![
                Record::new().set("name", "Bob"),
                Record::new().set("name", "Alice"),
            ],
        )
        .unwrap()
    }

    async fn body_json(response: Response<Full<Bytes>>) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_action_of() {
        assert_eq!(action_of("/api/table/data"), "data");
        assert_eq!(action_of("/api/table/relation-options/"), "relation-options");
        assert_eq!(action_of("/"), "");
    }

    #[tokio::test]
    async fn test_respond_ok() {
        let req = Request::get("/api/table/data?sort=name:asc").body(()).unwrap();
        let response = respond(&engine(), &req);
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(CONTENT_TYPE).unwrap(),
            "application/json"
        );
        let body = body_json(response).await;
        assert_eq!(body["items"][0]["name"], "Alice");
        assert_eq!(body["pagination"]["total"], 2);
    }

    #[tokio::test]
    async fn test_respond_error() {
        let req = Request::get("/api/table/bogus").body(()).unwrap();
        let response = respond(&engine(), &req);
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["statusCode"], 400);
        assert_eq!(body["statusMessage"], "Unknown action: bogus");
    }
}
