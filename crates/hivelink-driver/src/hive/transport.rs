//! Socket setup and the SASL PLAIN handshake.

use std::io::{Read, Write};
use std::net::{TcpStream, ToSocketAddrs};

use hivelink_common::config::{ConnectionConfig, TransportMode};
use log::debug;
use secrecy::ExposeSecret;
use thrift::protocol::{TBinaryInputProtocol, TBinaryOutputProtocol};
use thrift::transport::{
    TBufferedReadTransport, TBufferedWriteTransport, TFramedReadTransport, TFramedWriteTransport,
};

use crate::error::{DriverError, DriverResult};
use crate::hive::rpc::TcliClient;

pub(crate) const SASL_START: u8 = 0x01;
pub(crate) const SASL_OK: u8 = 0x02;
pub(crate) const SASL_BAD: u8 = 0x03;
pub(crate) const SASL_ERROR: u8 = 0x04;
pub(crate) const SASL_COMPLETE: u8 = 0x05;

const SASL_MECHANISM: &str = "PLAIN";
/// The upper bound of a SASL payload accepted from the server.
const SASL_MAX_PAYLOAD: usize = 1 << 20;
/// The identity sent when no user or password is configured.
const ANONYMOUS: &str = "anonymous";

/// Connects to the server and returns a client for the configured transport.
pub(crate) fn open_client(config: &ConnectionConfig) -> DriverResult<TcliClient> {
    let mut stream = connect_socket(config)?;
    let read_half = stream.try_clone()?;
    let client = match config.transport {
        TransportMode::Sasl => {
            sasl_plain_handshake(
                &mut stream,
                &config.user,
                config.password.expose_secret(),
            )?;
            TcliClient::new(
                TBinaryInputProtocol::new(TFramedReadTransport::new(read_half), false),
                TBinaryOutputProtocol::new(TFramedWriteTransport::new(stream), true),
            )
        }
        TransportMode::NoSasl => TcliClient::new(
            TBinaryInputProtocol::new(TBufferedReadTransport::new(read_half), false),
            TBinaryOutputProtocol::new(TBufferedWriteTransport::new(stream), true),
        ),
    };
    Ok(client)
}

fn connect_socket(config: &ConnectionConfig) -> DriverResult<TcpStream> {
    let address = config.address();
    let candidates = address
        .to_socket_addrs()
        .map_err(|e| DriverError::connection(format!("failed to resolve {address}: {e}")))?;
    let mut last_error = None;
    for candidate in candidates {
        let result = match config.connect_timeout() {
            Some(timeout) => TcpStream::connect_timeout(&candidate, timeout),
            None => TcpStream::connect(candidate),
        };
        match result {
            Ok(stream) => {
                stream.set_read_timeout(config.socket_timeout())?;
                stream.set_write_timeout(config.socket_timeout())?;
                stream.set_nodelay(true)?;
                debug!("connected to {candidate} for {address}");
                return Ok(stream);
            }
            Err(e) => {
                debug!("failed to connect to {candidate}: {e}");
                last_error = Some(e);
            }
        }
    }
    Err(match last_error {
        Some(e) => DriverError::connection(format!("failed to connect to {address}: {e}")),
        None => DriverError::connection(format!("no address found for {address}")),
    })
}

/// Authenticates with the PLAIN mechanism.
/// The server answers with `COMPLETE` on success and `BAD` or `ERROR` otherwise.
pub(crate) fn sasl_plain_handshake<S>(stream: &mut S, user: &str, password: &str) -> DriverResult<()>
where
    S: Read + Write,
{
    let user = if user.is_empty() { ANONYMOUS } else { user };
    let password = if password.is_empty() {
        ANONYMOUS
    } else {
        password
    };
    let mut credentials = Vec::with_capacity(user.len() + password.len() + 2);
    credentials.push(0);
    credentials.extend_from_slice(user.as_bytes());
    credentials.push(0);
    credentials.extend_from_slice(password.as_bytes());

    write_sasl_message(stream, SASL_START, SASL_MECHANISM.as_bytes())?;
    write_sasl_message(stream, SASL_OK, &credentials)?;
    stream.flush()?;

    let (status, payload) = read_sasl_message(stream)?;
    match status {
        SASL_COMPLETE => {
            debug!("SASL handshake completed for user {user}");
            Ok(())
        }
        SASL_BAD | SASL_ERROR => Err(DriverError::connection(format!(
            "SASL authentication failed: {}",
            String::from_utf8_lossy(&payload)
        ))),
        other => Err(DriverError::connection(format!(
            "unexpected SASL status: {other}"
        ))),
    }
}

/// Writes a status byte followed by a big-endian length and the payload.
pub(crate) fn write_sasl_message<W: Write>(
    writer: &mut W,
    status: u8,
    payload: &[u8],
) -> DriverResult<()> {
    let length = u32::try_from(payload.len())
        .map_err(|_| DriverError::protocol("SASL payload is too large"))?;
    writer.write_all(&[status])?;
    writer.write_all(&length.to_be_bytes())?;
    writer.write_all(payload)?;
    Ok(())
}

pub(crate) fn read_sasl_message<R: Read>(reader: &mut R) -> DriverResult<(u8, Vec<u8>)> {
    let mut header = [0u8; 5];
    reader
        .read_exact(&mut header)
        .map_err(|e| DriverError::connection(format!("failed to read SASL response: {e}")))?;
    let [status, length @ ..] = header;
    let length = u32::from_be_bytes(length) as usize;
    if length > SASL_MAX_PAYLOAD {
        return Err(DriverError::protocol(format!(
            "SASL payload of {length} bytes exceeds the limit"
        )));
    }
    let mut payload = vec![0u8; length];
    reader.read_exact(&mut payload)?;
    Ok((status, payload))
}
