use std::net::TcpListener;
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::Endpoint;
use crate::SystemError;
use crate::Result;

/// One connect attempt, bounded by `connect_timeout`.
pub(crate) async fn is_server_ready(
    addr: &str,
    connect_timeout: Duration,
) -> bool {
    matches!(
        timeout(connect_timeout, TcpStream::connect(addr)).await,
        Ok(Ok(_))
    )
}

/// Reserves `count` distinct OS-assigned ports on `host`.
///
/// All listeners are held until every port is known, then dropped together;
/// the ports are only reserved by convention after that.
pub(crate) fn reserve_ports(
    host: &str,
    count: usize,
) -> Result<Vec<Endpoint>> {
    let mut listeners = Vec::with_capacity(count);
    for _ in 0..count {
        let listener = TcpListener::bind((host, 0)).map_err(|source| {
            SystemError::PortReservation {
                host: host.to_string(),
                source,
            }
        })?;
        listeners.push(listener);
    }

    listeners
        .iter()
        .map(|listener| {
            listener
                .local_addr()
                .map(|addr| Endpoint::new(host, addr.port()))
                .map_err(|source| {
                    SystemError::PortReservation {
                        host: host.to_string(),
                        source,
                    }
                    .into()
                })
        })
        .collect()
}
