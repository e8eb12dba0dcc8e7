//! The memcached text protocol front.
//!
//! Clients ask for IDs with `GET`/`GETS`; every requested key is answered
//! with a freshly generated ID as its value. Nothing is stored.

pub mod codec;
pub mod command;
pub mod error;

use std::{io, sync::Arc, time::Duration};

use futures::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_util::{codec::Framed, sync::CancellationToken};

use self::{
    codec::{Command, MemcacheCodec, Response},
    error::ConnectionError,
};
use crate::server::service::SharedGenerator;

/// Pause after an accept failure that is not tied to a single connection,
/// such as running out of file descriptors.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Accepts connections until `shutdown` is cancelled, serving each on its
/// own task.
///
/// Accept errors are logged and skipped; listener-wide ones pause the loop
/// for [`ACCEPT_BACKOFF`] first. Returning cancels `shutdown`, so the other
/// front stops with this one.
pub async fn serve<G>(
    listener: TcpListener,
    generator: Arc<G>,
    max_line_length: usize,
    shutdown: CancellationToken,
) where
    G: SharedGenerator,
{
    let _guard = shutdown.clone().drop_guard();

    loop {
        let accepted = tokio::select! {
            () = shutdown.cancelled() => break,
            accepted = listener.accept() => accepted,
        };
        let (socket, peer) = match accepted {
            Ok(conn) => conn,
            Err(e) if is_connection_error(&e) => {
                tracing::debug!(error = %e, "memcache connection dropped before accept");
                continue;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to accept memcache connection");
                tokio::select! {
                    () = shutdown.cancelled() => break,
                    () = tokio::time::sleep(ACCEPT_BACKOFF) => continue,
                }
            }
        };

        let generator = Arc::clone(&generator);
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            tracing::debug!(%peer, "memcache connection opened");
            if let Err(e) = handle_connection(socket, &*generator, max_line_length, &shutdown).await
            {
                tracing::warn!(%peer, error = %e, "memcache connection failed");
            }
            tracing::debug!(%peer, "memcache connection closed");
        });
    }

    tracing::info!("memcache listener stopped");
}

/// Errors that concern only the connection being accepted, not the listener.
fn is_connection_error(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::ConnectionRefused
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::ConnectionReset
    )
}

/// Serves one client until EOF, `QUIT`, an I/O error, or shutdown.
async fn handle_connection<G>(
    socket: TcpStream,
    generator: &G,
    max_line_length: usize,
    shutdown: &CancellationToken,
) -> Result<(), ConnectionError>
where
    G: SharedGenerator,
{
    let mut framed = Framed::new(socket, MemcacheCodec::new(max_line_length));

    loop {
        let frame = tokio::select! {
            () = shutdown.cancelled() => return Ok(()),
            frame = framed.next() => frame,
        };

        let response = match frame {
            None | Some(Ok(Ok(Command::Quit))) => return Ok(()),
            Some(Err(e)) => return Err(e),
            Some(Ok(Ok(Command::Get { keys }))) => command::get(generator, keys).await,
            Some(Ok(Err(e))) => {
                tracing::debug!(error = %e, "rejected memcache command");
                Response::Error
            }
        };

        framed.send(response).await?;
    }
}
