use ferroflake::IdGeneratorAsyncTokioExt;

use super::codec::Response;
use crate::server::service::SharedGenerator;

/// Runs `GET`/`GETS` for `keys`, generating one ID per key in order.
///
/// Values are buffered until every key has an ID. If any generation fails
/// the whole batch is dropped and a single `ERROR` is returned.
pub async fn get<G>(generator: &G, keys: Vec<Vec<u8>>) -> Response
where
    G: SharedGenerator,
{
    let mut values = Vec::with_capacity(keys.len());
    for key in keys {
        match generator.try_next_id_async().await {
            Ok(id) => values.push((key, id)),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    key = %String::from_utf8_lossy(&key),
                    "failed to generate id"
                );
                return Response::Error;
            }
        }
    }
    Response::Values(values)
}
