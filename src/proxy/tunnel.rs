//! CONNECT tunneling
//!
//! The destination is dialed before the client connection is taken over, so a
//! dial failure can still be reported as an ordinary HTTP error. Tunneled
//! traffic is opaque and never recorded in history.

use crate::proxy::types::*;
use axum::body::Body;
use http::{Request, Response};
use hyper::ext::ReasonPhrase;
use hyper::upgrade::OnUpgrade;
use hyper_util::rt::TokioIo;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tracing::{debug, info, warn};

/// Port dialed when the CONNECT authority carries none
pub const DEFAULT_TUNNEL_PORT: u16 = 443;

pub const CONNECTION_ESTABLISHED: &[u8] = b"Connection established";

/// The `host:port` a CONNECT request asks to reach.
pub fn connect_target<B>(request: &Request<B>) -> ProxyResult<String> {
    let authority = request
        .uri()
        .authority()
        .ok_or_else(|| ProxyError::InvalidConnectTarget(request.uri().to_string()))?;

    let port = authority.port_u16().unwrap_or(DEFAULT_TUNNEL_PORT);
    Ok(format!("{}:{}", authority.host(), port))
}

/// Dial the destination, take over the client connection and relay bytes in
/// both directions until either side finishes.
pub async fn establish(mut request: Request<Body>) -> ProxyResult<Response<Body>> {
    let target = connect_target(&request)?;

    let upstream = TcpStream::connect(&target)
        .await
        .map_err(|source| ProxyError::TunnelDial {
            target: target.clone(),
            source,
        })?;

    let on_upgrade = request
        .extensions_mut()
        .remove::<OnUpgrade>()
        .ok_or(ProxyError::HijackUnsupported)?;

    info!(destination = %target, "Tunnel established");

    tokio::spawn(async move {
        match on_upgrade.await {
            Ok(upgraded) => relay(TokioIo::new(upgraded), upstream, &target).await,
            Err(e) => warn!(destination = %target, error = %e, "Connection upgrade failed"),
        }
    });

    let mut response = Response::new(Body::empty());
    response
        .extensions_mut()
        .insert(ReasonPhrase::from_static(CONNECTION_ESTABLISHED));
    Ok(response)
}

/// Copy bytes both ways; the first direction to end closes both connections.
async fn relay<C>(client: C, mut upstream: TcpStream, target: &str)
where
    C: AsyncRead + AsyncWrite + Unpin,
{
    let (mut client_read, mut client_write) = tokio::io::split(client);
    let (mut upstream_read, mut upstream_write) = upstream.split();

    tokio::select! {
        result = tokio::io::copy(&mut client_read, &mut upstream_write) => {
            debug!(destination = %target, result = ?result, "Client side of tunnel finished");
        }
        result = tokio::io::copy(&mut upstream_read, &mut client_write) => {
            debug!(destination = %target, result = ?result, "Upstream side of tunnel finished");
        }
    }

    info!(destination = %target, "Tunnel closed");
}
