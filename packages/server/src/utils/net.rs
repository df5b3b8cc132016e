use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use hickory_resolver::TokioAsyncResolver;
use tokio::net::UdpSocket;
use tracing::{debug, warn};

use crate::identity::UNKNOWN_NAME;

const LOOKUP_TIMEOUT: Duration = Duration::from_secs(2);

/// Address of this machine on the local network, or `"localhost"`.
///
/// Connecting a UDP socket selects the outbound interface without sending
/// any packet.
pub async fn local_ip() -> String {
    let probe = async {
        let socket = UdpSocket::bind("0.0.0.0:0").await?;
        socket.connect("8.8.8.8:80").await?;
        Ok::<_, std::io::Error>(socket.local_addr()?.ip())
    };
    match probe.await {
        Ok(ip) if !ip.is_unspecified() => ip.to_string(),
        Ok(_) => "localhost".to_string(),
        Err(e) => {
            debug!(error = %e, "Could not determine local address");
            "localhost".to_string()
        }
    }
}

/// Names a reverse lookup found for an address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostNames {
    pub hostname: String,
    pub fqdn: String,
}

impl HostNames {
    pub fn unknown() -> Self {
        Self {
            hostname: UNKNOWN_NAME.to_string(),
            fqdn: UNKNOWN_NAME.to_string(),
        }
    }

    /// Split a PTR answer such as `laptop.lan.` into host and fully qualified name.
    pub fn from_ptr(name: &str) -> Self {
        let fqdn = name.trim_end_matches('.');
        if fqdn.is_empty() {
            return Self::unknown();
        }
        let hostname = fqdn.split('.').next().unwrap_or(fqdn);
        Self {
            hostname: hostname.to_string(),
            fqdn: fqdn.to_string(),
        }
    }
}

/// Reverse DNS for device info. Lookups never fail; unknown names are
/// reported as [`UNKNOWN_NAME`].
#[derive(Clone)]
pub struct HostResolver {
    inner: Option<Arc<TokioAsyncResolver>>,
}

impl HostResolver {
    /// Resolver using the system DNS configuration. Falls back to disabled if
    /// the configuration cannot be read.
    pub fn system() -> Self {
        match TokioAsyncResolver::tokio_from_system_conf() {
            Ok(resolver) => Self {
                inner: Some(Arc::new(resolver)),
            },
            Err(e) => {
                warn!(error = %e, "System DNS configuration unavailable, hostname lookups disabled");
                Self::disabled()
            }
        }
    }

    pub fn disabled() -> Self {
        Self { inner: None }
    }

    pub async fn lookup(&self, ip: IpAddr) -> HostNames {
        let Some(resolver) = &self.inner else {
            return HostNames::unknown();
        };

        match tokio::time::timeout(LOOKUP_TIMEOUT, resolver.reverse_lookup(ip)).await {
            Ok(Ok(lookup)) => lookup
                .iter()
                .next()
                .map(|ptr| HostNames::from_ptr(&ptr.to_string()))
                .unwrap_or_else(HostNames::unknown),
            Ok(Err(e)) => {
                debug!(%ip, error = %e, "Reverse lookup failed");
                HostNames::unknown()
            }
            Err(_) => {
                debug!(%ip, "Reverse lookup timed out");
                HostNames::unknown()
            }
        }
    }
}
