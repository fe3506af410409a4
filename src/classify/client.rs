use std::io;

use tracing::{debug, info};
use uuid::Uuid;

use super::{ClassifyError, PredictionResponse};
use crate::config::ClassifierSettings;
use crate::http_client;
use crate::wav::WavBytes;

/// Form field that carries the WAV upload.
pub const MULTIPART_FIELD_NAME: &str = "file";
const UPLOAD_CONTENT_TYPE: &str = "audio/wav";
const MAX_ERROR_BODY_BYTES: usize = 4 * 1024;

/// Blocking client for the remote classifier.
#[derive(Clone, Debug)]
pub struct ClassifierClient {
    endpoint: String,
    upload_file_name: String,
    max_response_bytes: usize,
    agent: ureq::Agent,
}

impl ClassifierClient {
    pub fn new(endpoint: impl Into<String>, settings: &ClassifierSettings) -> Self {
        Self {
            endpoint: endpoint.into(),
            upload_file_name: settings.upload_file_name.clone(),
            max_response_bytes: settings.max_response_bytes,
            agent: http_client::agent_with_timeouts(
                settings.connect_timeout(),
                settings.request_timeout(),
            ),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Upload `wav` as a multipart file field and parse the prediction.
    ///
    /// Non-2xx answers are failures; nothing is retried.
    pub fn predict(&self, wav: &WavBytes) -> Result<PredictionResponse, ClassifyError> {
        let boundary = format!("bangercheck-{}", Uuid::new_v4().simple());
        let body = multipart_file_body(&boundary, &self.upload_file_name, wav.as_bytes());
        info!(
            "Uploading {} byte sample to {}",
            wav.len(),
            self.endpoint
        );
        let request = self
            .agent
            .post(&self.endpoint)
            .set("Accept", "application/json")
            .set(
                "Content-Type",
                &format!("multipart/form-data; boundary={boundary}"),
            );

        let response = match request.send_bytes(&body) {
            Ok(response) => response,
            Err(ureq::Error::Status(status, response)) => {
                let body = http_client::read_body_lossy(response, MAX_ERROR_BODY_BYTES);
                return Err(ClassifyError::Status { status, body });
            }
            Err(ureq::Error::Transport(err)) => {
                return Err(ClassifyError::Network(err.to_string()));
            }
        };
        let status = response.status();
        let bytes = http_client::read_response_bytes(response, self.max_response_bytes)
            .map_err(body_read_error)?;
        debug!("Classifier answered HTTP {status} with {} bytes", bytes.len());
        PredictionResponse::parse(&bytes)
    }
}

/// Oversized bodies are the service's fault; anything else broke in transit.
fn body_read_error(err: io::Error) -> ClassifyError {
    match err.kind() {
        io::ErrorKind::InvalidData => ClassifyError::InvalidResponse(err.to_string()),
        _ => ClassifyError::Network(format!("reading response failed: {err}")),
    }
}

/// Build a `multipart/form-data` body holding a single file part.
pub(crate) fn multipart_file_body(boundary: &str, file_name: &str, payload: &[u8]) -> Vec<u8> {
    let file_name = file_name.replace(['"', '\r', '\n'], "_");
    let head = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"{MULTIPART_FIELD_NAME}\"; filename=\"{file_name}\"\r\n\
         Content-Type: {UPLOAD_CONTENT_TYPE}\r\n\r\n"
    );
    let tail = format!("\r\n--{boundary}--\r\n");
    let mut body = Vec::with_capacity(head.len() + payload.len() + tail.len());
    body.extend_from_slice(head.as_bytes());
    body.extend_from_slice(payload);
    body.extend_from_slice(tail.as_bytes());
    body
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_client::test_server::{find, serve_and_stall, serve_once};
    use crate::wav::WavEncoder;
    use std::time::Duration;

    fn client(endpoint: &str) -> ClassifierClient {
        let settings = ClassifierSettings {
            connect_timeout_seconds: 2,
            request_timeout_seconds: 5,
            ..ClassifierSettings::default()
        };
        ClassifierClient::new(endpoint, &settings)
    }

    fn json_response(status: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        )
    }

    fn sample_wav() -> WavBytes {
        WavEncoder.encode(&[0.0, 0.5, -0.5, 1.0], 22_050).unwrap()
    }

    #[test]
    fn multipart_body_wraps_payload_between_boundaries() {
        let body = multipart_file_body("XYZ", "processed_audio.wav", b"RIFFdata");
        let text = String::from_utf8(body).unwrap();
        assert_eq!(
            text,
            "--XYZ\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"processed_audio.wav\"\r\n\
             Content-Type: audio/wav\r\n\r\n\
             RIFFdata\r\n--XYZ--\r\n"
        );
    }

    #[test]
    fn multipart_file_name_cannot_break_the_header() {
        let body = multipart_file_body("B", "a\"b\r\n.wav", b"");
        let text = String::from_utf8(body).unwrap();
        assert!(text.contains("filename=\"a_b__.wav\""));
    }

    #[test]
    fn successful_upload_returns_parsed_prediction() {
        let (url, request) = serve_once(json_response(
            "200 OK",
            r#"{"prediction":"bangers","score":0.81}"#,
        ));
        let wav = sample_wav();
        let prediction = client(&url).predict(&wav).unwrap();
        assert_eq!(prediction.prediction, "bangers");
        assert_eq!(prediction.score, 0.81);

        let request = request.recv_timeout(Duration::from_secs(5)).unwrap();
        let head_end = find(&request, b"\r\n\r\n").unwrap();
        let head = String::from_utf8_lossy(&request[..head_end]).to_ascii_lowercase();
        assert!(head.starts_with("post "));
        assert!(head.contains("content-type: multipart/form-data; boundary=bangercheck-"));
        assert!(find(&request, b"filename=\"processed_audio.wav\"").is_some());
        assert!(find(&request, wav.as_bytes()).is_some());
    }

    #[test]
    fn non_2xx_status_is_a_hard_failure() {
        let (url, _request) = serve_once(json_response("503 Service Unavailable", "overloaded"));
        let err = client(&url).predict(&sample_wav()).unwrap_err();
        match err {
            ClassifyError::Status { status, body } => {
                assert_eq!(status, 503);
                assert_eq!(body, "overloaded");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn malformed_json_is_an_invalid_response() {
        let (url, _request) = serve_once(json_response("200 OK", "{\"prediction\":"));
        let err = client(&url).predict(&sample_wav()).unwrap_err();
        assert!(matches!(err, ClassifyError::InvalidResponse(_)), "{err}");
    }

    #[test]
    fn oversized_body_is_an_invalid_response() {
        let settings = ClassifierSettings {
            max_response_bytes: 1024,
            ..ClassifierSettings::default()
        };
        let padding = " ".repeat(4096);
        let (url, _request) = serve_once(json_response(
            "200 OK",
            &format!("{{\"prediction\":\"bangers\",\"score\":0.9}}{padding}"),
        ));
        let err = ClassifierClient::new(url, &settings)
            .predict(&sample_wav())
            .unwrap_err();
        assert!(matches!(err, ClassifyError::InvalidResponse(_)), "{err}");
    }

    #[test]
    fn body_that_stops_arriving_is_a_network_error() {
        let settings = ClassifierSettings {
            connect_timeout_seconds: 1,
            request_timeout_seconds: 1,
            ..ClassifierSettings::default()
        };
        let (url, _request) = serve_and_stall(
            "HTTP/1.1 200 OK\r\nContent-Length: 60\r\n\r\n{\"predic".to_string(),
            Duration::from_secs(5),
        );
        let err = ClassifierClient::new(url, &settings)
            .predict(&sample_wav())
            .unwrap_err();
        assert!(matches!(err, ClassifyError::Network(_)), "{err}");
    }

    #[test]
    fn connection_closed_mid_body_is_a_network_error() {
        let (url, _request) = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Length: 60\r\nConnection: close\r\n\r\n{\"predic".to_string(),
        );
        let err = client(&url).predict(&sample_wav()).unwrap_err();
        assert!(matches!(err, ClassifyError::Network(_)), "{err}");
    }

    #[test]
    fn unreachable_host_is_a_network_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);
        let err = client(&url).predict(&sample_wav()).unwrap_err();
        assert!(matches!(err, ClassifyError::Network(_)), "{err}");
    }
}
