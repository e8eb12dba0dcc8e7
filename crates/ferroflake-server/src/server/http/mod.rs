//! The HTTP front: every request to `/` gets one new ID, decomposed.

use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::any,
};
use ferroflake::IdGeneratorAsyncTokioExt;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

use crate::server::service::SharedGenerator;

const JSON_UTF8: &str = "application/json; charset=utf-8";

/// Builds the router. Any method on `/` generates an ID.
pub fn router<G>(generator: Arc<G>) -> Router
where
    G: SharedGenerator,
{
    Router::new()
        .route("/", any(next_id::<G>))
        .layer(TraceLayer::new_for_http())
        .with_state(generator)
}

async fn next_id<G>(State(generator): State<Arc<G>>) -> Response
where
    G: SharedGenerator,
{
    let id = match generator.try_next_id_async().await {
        Ok(id) => id,
        Err(e) => {
            tracing::error!(error = %e, "failed to generate id");
            return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response();
        }
    };

    match serde_json::to_vec(&id.decompose()) {
        Ok(body) => (StatusCode::OK, [(header::CONTENT_TYPE, JSON_UTF8)], body).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

/// Serves HTTP on `listener` until `shutdown` is cancelled, then drains
/// in-flight requests.
///
/// Returning, including on error, cancels `shutdown`.
pub async fn serve<G>(
    listener: TcpListener,
    generator: Arc<G>,
    shutdown: CancellationToken,
) -> std::io::Result<()>
where
    G: SharedGenerator,
{
    let guard = shutdown.clone().drop_guard();
    axum::serve(listener, router(generator))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;
    drop(guard);
    tracing::info!("http listener stopped");
    Ok(())
}
