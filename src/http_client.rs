//! HTTP agent construction and bounded response helpers.

use std::io::{self, Read};
use std::time::Duration;

/// Build an agent that gives up on slow or unreachable hosts.
///
/// `request_timeout` bounds the whole exchange (upload, server work and download).
pub(crate) fn agent_with_timeouts(connect_timeout: Duration, request_timeout: Duration) -> ureq::Agent {
    ureq::AgentBuilder::new()
        .timeout_connect(connect_timeout)
        .timeout_read(request_timeout)
        .timeout_write(request_timeout)
        .timeout(connect_timeout + request_timeout)
        .build()
}

/// Read a response into memory, enforcing a maximum byte size.
pub(crate) fn read_response_bytes(
    response: ureq::Response,
    max_bytes: usize,
) -> Result<Vec<u8>, io::Error> {
    check_content_length(&response, max_bytes)?;
    let reader = response.into_reader();
    let mut limited = reader.take(max_bytes as u64 + 1);
    let mut bytes = Vec::new();
    limited.read_to_end(&mut bytes)?;
    if bytes.len() > max_bytes {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Response exceeded {max_bytes} bytes"),
        ));
    }
    Ok(bytes)
}

/// Read a response body as text, truncating instead of failing when it is too large.
pub(crate) fn read_body_lossy(response: ureq::Response, max_bytes: usize) -> String {
    let mut bytes = Vec::new();
    let _ = response
        .into_reader()
        .take(max_bytes as u64)
        .read_to_end(&mut bytes);
    String::from_utf8_lossy(&bytes).trim().to_string()
}

fn check_content_length(response: &ureq::Response, max_bytes: usize) -> Result<(), io::Error> {
    let Some(length) = response.header("Content-Length") else {
        return Ok(());
    };
    let Ok(length) = length.parse::<u64>() else {
        return Ok(());
    };
    if length > max_bytes as u64 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Response too large: {length} bytes"),
        ));
    }
    Ok(())
}
