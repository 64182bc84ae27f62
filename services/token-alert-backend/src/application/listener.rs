use std::net::ToSocketAddrs;
use std::{fmt, net::TcpListener};

#[derive(Debug)]
pub enum Error {
    AddressResolution {
        context: String,
    },
    AddressDefinition {
        context: String,
        source: std::io::Error,
    },
    TcpListener {
        context: String,
        source: std::io::Error,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::AddressResolution { context } => {
                write!(fmt, "Could not resolve server address: {context}")
            }
            Error::AddressDefinition { context, source } => {
                write!(fmt, "Invalid server address: {context} | {source}")
            }
            Error::TcpListener { context, source } => {
                write!(fmt, "Could not build TCP listener: {context} | {source}")
            }
        }
    }
}

impl std::error::Error for Error {}

/// Binds to the first address `host` resolves to. Port 0 picks a free port.
pub fn listen_with_host_port(host: &str, port: u16) -> Result<TcpListener, Error> {
    let addr = (host, port)
        .to_socket_addrs()
        .map_err(|err| Error::AddressDefinition {
            context: format!("HTTP Server: Could not resolve address {host}:{port}"),
            source: err,
        })?
        .next()
        .ok_or_else(|| Error::AddressResolution {
            context: format!("HTTP Server: No address for {host}:{port}"),
        })?;

    TcpListener::bind(addr).map_err(|err| Error::TcpListener {
        context: format!("HTTP Server: Could not listen on address {host}:{port}"),
        source: err,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_zero_binds_a_free_port() {
        let listener = listen_with_host_port("127.0.0.1", 0).expect("listener");
        assert_ne!(listener.local_addr().unwrap().port(), 0);
    }

    #[test]
    fn unresolvable_host_is_an_error() {
        assert!(listen_with_host_port("not a host", 8000).is_err());
    }
}
