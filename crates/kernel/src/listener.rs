use futures_util::future::BoxFuture;
use hyper::{body::Incoming, service::Service, Request, Response};
use hyper_util::rt::{self, TokioIo};

use std::{convert::Infallible, net::SocketAddr};
use tokio::net::TcpStream;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

use crate::{
    extension::{EnterTime, PeerAddr},
    utils::with_length,
    BoxError, CgBody,
};

/// Listener embodies the concept of a logical endpoint where a Gateway accepts network connections.
#[derive(Clone)]
pub struct CgListen<S> {
    conn_builder: hyper_util::server::conn::auto::Builder<rt::TokioExecutor>,
    pub socket_addr: SocketAddr,
    pub service: S,
    pub cancel_token: CancellationToken,
    pub listener_id: String,
}

impl<S> std::fmt::Debug for CgListen<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CgListen").field("socket_addr", &self.socket_addr).field("listener_id", &self.listener_id).finish_non_exhaustive()
    }
}

impl<S> CgListen<S> {
    pub fn new(socket_addr: SocketAddr, service: S, cancel_token: CancellationToken) -> Self {
        let listener_id = format!("{socket_addr}");
        Self {
            conn_builder: hyper_util::server::conn::auto::Builder::new(rt::TokioExecutor::new()),
            socket_addr,
            service,
            cancel_token,
            listener_id,
        }
    }
}

#[derive(Clone)]
struct HyperServiceAdapter<S>
where
    S: hyper::service::Service<Request<CgBody>, Error = Infallible, Response = Response<CgBody>> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    service: S,
    peer: SocketAddr,
}
impl<S> HyperServiceAdapter<S>
where
    S: hyper::service::Service<Request<CgBody>, Error = Infallible, Response = Response<CgBody>> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    pub fn new(service: S, peer: SocketAddr) -> Self {
        Self { service, peer }
    }
}

impl<S> hyper::service::Service<Request<Incoming>> for HyperServiceAdapter<S>
where
    S: hyper::service::Service<Request<CgBody>, Error = Infallible, Response = Response<CgBody>> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response<CgBody>;
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    #[inline]
    fn call(&self, req: Request<Incoming>) -> Self::Future {
        // the service is likely an `ArcHyperService`, so cloning it is cheap
        let enter_time = EnterTime::new();
        let service = self.service.clone();
        let mut req = req.map(CgBody::new);
        req.extensions_mut().insert(PeerAddr(self.peer));
        req.extensions_mut().insert(enter_time);

        Box::pin(async move {
            let mut resp = match service.call(req).await {
                Ok(resp) => resp,
                Err(never) => match never {},
            };
            with_length(&mut resp);
            let status = resp.status();
            if status.is_server_error() {
                tracing::warn!(status = ?status, headers = ?resp.headers(), "server error response");
            } else if status.is_client_error() {
                tracing::debug!(status = ?status, headers = ?resp.headers(), "client error response");
            } else if status.is_success() {
                tracing::trace!(status = ?status, headers = ?resp.headers(), "success response");
            }
            tracing::trace!(latency = ?enter_time.elapsed(), "request finished");
            Ok(resp)
        })
    }
}

impl<S> CgListen<S>
where
    S: hyper::service::Service<Request<CgBody>, Error = Infallible, Response = Response<CgBody>> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    #[instrument(skip(stream, service, conn_builder))]
    async fn accept(conn_builder: hyper_util::server::conn::auto::Builder<rt::TokioExecutor>, stream: TcpStream, peer_addr: SocketAddr, service: S) {
        tracing::debug!("[Cg.Listen] Accepted connection");
        let service = HyperServiceAdapter::new(service, peer_addr);
        let io = TokioIo::new(stream);
        let conn_result = conn_builder.serve_connection(io, service).await;
        if let Err(e) = conn_result {
            tracing::warn!("[Cg.Listen] Connection closed with error {e}")
        } else {
            tracing::debug!("[Cg.Listen] Connection closed");
        }
    }

    /// Accept connections until the cancel token is cancelled.
    ///
    /// # Errors
    /// If the socket address can't be bound.
    #[instrument()]
    pub async fn listen(self) -> Result<(), BoxError> {
        tracing::debug!("[Cg.Listen] start binding...");
        let listener = tokio::net::TcpListener::bind(self.socket_addr).await?;
        let cancel_token = self.cancel_token;
        tracing::info!("[Cg.Listen] start listening on {}", self.socket_addr);
        loop {
            let accepted = tokio::select! {
                () = cancel_token.cancelled() => {
                    tracing::warn!("[Cg.Listen] cancelled");
                    return Ok(());
                },
                accepted = listener.accept() => accepted
            };
            match accepted {
                Ok((stream, peer_addr)) => {
                    let service = self.service.clone();
                    let builder = self.conn_builder.clone();
                    tokio::spawn(Self::accept(builder, stream, peer_addr, service));
                }
                Err(e) => {
                    tracing::warn!("[Cg.Listen] Accept tcp connection error: {:?}", e);
                }
            }
        }
    }
}
