use std::time::Duration;

use tokio::net::lookup_host;
use tokio::time::timeout;
use tracing::debug;

use crate::core::assembler::Connectivity;
use crate::utils::url::host_and_port;

const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Cheap reachability guess: can the API host name be resolved?
///
/// A URL that cannot be parsed counts as online so the request itself
/// reports the real problem.
pub async fn probe_connectivity(base_url: &str) -> Connectivity {
    let Some(target) = host_and_port(base_url) else {
        return Connectivity::Online;
    };

    let lookup = timeout(PROBE_TIMEOUT, lookup_host(target.as_str())).await;
    match lookup {
        Ok(Ok(mut addrs)) => {
            if addrs.next().is_some() {
                Connectivity::Online
            } else {
                debug!(%target, "host resolved to no addresses");
                Connectivity::Offline
            }
        }
        Ok(Err(err)) => {
            debug!(%target, "host lookup failed: {err}");
            Connectivity::Offline
        }
        Err(_) => {
            debug!(%target, "host lookup timed out");
            Connectivity::Offline
        }
    }
}
