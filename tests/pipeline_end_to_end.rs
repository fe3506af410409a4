mod support;

use std::time::Duration;

use bangercheck::audio::{AudioNormalizer, RawAudioInput, SymphoniaDecoder};
use bangercheck::classify::{ClassificationRule, ClassifierClient, Verdict};
use bangercheck::config::ClassifierSettings;
use bangercheck::pipeline::{BangerCheck, PipelineError, PipelineRunner};
use support::server::{find, serve_json_once};
use support::wav::{plateau_frame, sine_frame, stereo_wav_bytes};

const SOURCE_RATE: u32 = 44_100;

fn pipeline(endpoint: &str) -> BangerCheck<SymphoniaDecoder> {
    let settings = ClassifierSettings {
        connect_timeout_seconds: 2,
        request_timeout_seconds: 10,
        ..ClassifierSettings::default()
    };
    BangerCheck::new(
        AudioNormalizer::new(SymphoniaDecoder),
        ClassifierClient::new(endpoint, &settings),
        ClassificationRule::default(),
    )
}

fn wav_input(bytes: Vec<u8>) -> RawAudioInput {
    RawAudioInput::new(bytes, "audio/wav").with_file_name("track.wav")
}

fn u32_at(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap())
}

#[test]
fn thirty_second_stereo_track_is_cut_to_the_middle_ten_seconds() {
    let bytes = stereo_wav_bytes(SOURCE_RATE, SOURCE_RATE as usize * 30, plateau_frame(SOURCE_RATE, 10));
    let normalizer = AudioNormalizer::new(SymphoniaDecoder);
    let sample = normalizer.normalize(wav_input(bytes)).unwrap();

    assert_eq!(sample.sample_rate(), 22_050);
    assert_eq!(sample.len(), 220_500);
    assert!(
        sample.samples().iter().all(|value| (value - 0.5).abs() < 1e-3),
        "window strayed outside the middle plateau"
    );
}

#[test]
fn short_track_keeps_its_full_length() {
    let bytes = stereo_wav_bytes(SOURCE_RATE, SOURCE_RATE as usize * 3, sine_frame(SOURCE_RATE));
    let wav = pipeline("http://127.0.0.1:9").prepare(wav_input(bytes)).unwrap();

    assert_eq!(wav.sample_count(), 66_150);
    assert_eq!(wav.len(), 44 + 66_150 * 2);
}

#[test]
fn runner_uploads_the_canonical_wav_and_reports_the_verdict() {
    let (url, request) = serve_json_once("200 OK", r#"{"prediction":"bangers","score":0.81}"#);
    let runner = PipelineRunner::new(pipeline(&url));
    let bytes = stereo_wav_bytes(SOURCE_RATE, SOURCE_RATE as usize * 30, sine_frame(SOURCE_RATE));

    let classification = runner
        .submit(wav_input(bytes))
        .unwrap()
        .wait_timeout(Duration::from_secs(60))
        .expect("pipeline finished")
        .unwrap();
    assert_eq!(classification.verdict, Verdict::Banger);
    assert_eq!(classification.prediction, "bangers");
    assert_eq!(classification.score, 0.81);

    let request = request.recv_timeout(Duration::from_secs(5)).unwrap();
    assert!(find(&request, b"name=\"file\"; filename=\"processed_audio.wav\"").is_some());
    let riff = find(&request, b"RIFF").expect("wav payload in request");
    assert_eq!(u32_at(&request, riff + 4), 441_036);
    assert_eq!(&request[riff + 8..riff + 12], b"WAVE");
    assert_eq!(u32_at(&request, riff + 24), 22_050);
    assert_eq!(u32_at(&request, riff + 40), 441_000);
}

#[test]
fn score_above_threshold_overrides_a_negative_label() {
    let (url, _request) = serve_json_once("200 OK", r#"{"prediction":"not_bangers","score":0.9}"#);
    let bytes = stereo_wav_bytes(SOURCE_RATE, SOURCE_RATE as usize, sine_frame(SOURCE_RATE));
    let classification = pipeline(&url).run(wav_input(bytes)).unwrap();
    assert_eq!(classification.verdict, Verdict::Banger);
}

#[test]
fn low_score_with_negative_label_is_not_a_banger() {
    let (url, _request) = serve_json_once("200 OK", r#"{"prediction":"not_bangers","score":0.2}"#);
    let bytes = stereo_wav_bytes(SOURCE_RATE, SOURCE_RATE as usize, sine_frame(SOURCE_RATE));
    let classification = pipeline(&url).run(wav_input(bytes)).unwrap();
    assert_eq!(classification.verdict, Verdict::NotBanger);
}

#[test]
fn undecodable_bytes_fail_before_any_upload() {
    let input = RawAudioInput::new(b"definitely not audio".to_vec(), "audio/mpeg");
    let err = pipeline("http://127.0.0.1:9").run(input).unwrap_err();
    assert!(matches!(err, PipelineError::Decode { .. }), "{err}");
}

#[test]
fn server_error_surfaces_as_a_service_failure() {
    let (url, _request) = serve_json_once("500 Internal Server Error", r#"{"detail":"boom"}"#);
    let bytes = stereo_wav_bytes(SOURCE_RATE, SOURCE_RATE as usize, sine_frame(SOURCE_RATE));
    let err = pipeline(&url).run(wav_input(bytes)).unwrap_err();
    assert!(matches!(err, PipelineError::Service { .. }), "{err}");
}

#[test]
fn unreachable_classifier_is_a_network_failure() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}/predict", listener.local_addr().unwrap());
    drop(listener);
    let bytes = stereo_wav_bytes(SOURCE_RATE, SOURCE_RATE as usize, sine_frame(SOURCE_RATE));
    let err = pipeline(&url).run(wav_input(bytes)).unwrap_err();
    assert!(matches!(err, PipelineError::Network { .. }), "{err}");
}
