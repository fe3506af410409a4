//! Command-line front end: score one audio file with the remote classifier.

use std::path::{Path, PathBuf};
use std::time::Duration;

use bangercheck::audio::{AudioNormalizer, RawAudioInput, SymphoniaDecoder};
use bangercheck::classify::{Classification, ClassifierClient};
use bangercheck::config::{self, AppSettings};
use bangercheck::logging;
use bangercheck::pipeline::{BangerCheck, Pending, PipelineError, PipelineRunner};

const PROGRESS_INTERVAL: Duration = Duration::from_secs(5);

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let Some(options) = parse_args(std::env::args().skip(1).collect())? else {
        return Ok(());
    };
    if let Err(err) = logging::init() {
        eprintln!("Logging disabled: {err}");
    }
    let config_path = match &options.config_path {
        Some(path) => path.clone(),
        None => config::config_path().map_err(|err| err.to_string())?,
    };
    if options.write_config {
        return write_default_config(&config_path);
    }
    let Some(input_path) = options.input.as_ref() else {
        return Err(format!("Missing input file.\n\n{}", help_text()));
    };

    let mut settings = config::load_from(&config_path).map_err(|err| err.to_string())?;
    if let Some(endpoint) = &options.endpoint {
        settings.classifier.endpoint = Some(endpoint.clone());
    }
    let runner = build_runner(&settings, options.dry_run)?;

    let input = RawAudioInput::from_path(input_path)
        .map_err(|err| format!("Failed to read {}: {err}", input_path.display()))?;
    let pending = runner
        .submit_prepare(input)
        .map_err(|err| err.to_string())?;
    let wav = wait_with_progress(pending, "Preparing sample").map_err(|err| err.to_string())?;

    if let Some(path) = &options.save_wav {
        std::fs::write(path, wav.as_bytes())
            .map_err(|err| format!("Failed to write {}: {err}", path.display()))?;
        tracing::info!("Saved normalized sample to {}", path.display());
    }
    if options.dry_run {
        println!(
            "Prepared {} samples ({} bytes); classifier not contacted.",
            wav.sample_count(),
            wav.len()
        );
        return Ok(());
    }

    let pending = runner.submit_wav(wav).map_err(|err| err.to_string())?;
    let classification =
        wait_with_progress(pending, "Waiting for the classifier").map_err(|err| err.to_string())?;
    print_classification(&classification, &settings);
    Ok(())
}

fn build_runner(
    settings: &AppSettings,
    dry_run: bool,
) -> Result<PipelineRunner<SymphoniaDecoder>, String> {
    let normalize = settings
        .normalize
        .to_settings()
        .map_err(|err| err.to_string())?;
    let endpoint = match (&settings.classifier.endpoint, dry_run) {
        (Some(endpoint), _) => endpoint.clone(),
        (None, true) => String::new(),
        (None, false) => {
            return Err(
                "No classifier endpoint configured. Set `classifier.endpoint` in config.toml \
                 or pass --endpoint <URL>."
                    .to_string(),
            );
        }
    };
    Ok(PipelineRunner::new(BangerCheck::new(
        AudioNormalizer::with_settings(SymphoniaDecoder, normalize),
        ClassifierClient::new(endpoint, &settings.classifier),
        settings.classifier.rule(),
    )))
}

fn wait_with_progress<T>(pending: Pending<T>, stage: &str) -> Result<T, PipelineError> {
    loop {
        if let Some(result) = pending.wait_timeout(PROGRESS_INTERVAL) {
            return result;
        }
        tracing::info!("{stage}...");
    }
}

fn print_classification(classification: &Classification, settings: &AppSettings) {
    let headline = if classification.verdict.is_banger() {
        "BANGER"
    } else {
        "NOT A BANGER"
    };
    println!(
        "{headline} (score {:.2}, prediction \"{}\")",
        classification.score, classification.prediction
    );
    let label_says_banger = classification
        .prediction
        .eq_ignore_ascii_case(&settings.classifier.positive_label);
    if classification.verdict.is_banger() && !label_says_banger {
        println!(
            "Note: the label disagrees; the score is above {:.2}.",
            settings.classifier.score_threshold
        );
    }
}

fn write_default_config(path: &Path) -> Result<(), String> {
    if path.exists() {
        return Err(format!("{} already exists; not overwriting.", path.display()));
    }
    config::save_to_path(&AppSettings::default(), path).map_err(|err| err.to_string())?;
    println!("Wrote default settings to {}", path.display());
    Ok(())
}

#[derive(Debug, Default, PartialEq)]
struct Options {
    input: Option<PathBuf>,
    config_path: Option<PathBuf>,
    endpoint: Option<String>,
    save_wav: Option<PathBuf>,
    dry_run: bool,
    write_config: bool,
}

fn parse_args(args: Vec<String>) -> Result<Option<Options>, String> {
    let mut options = Options::default();
    let mut idx = 0usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "-h" | "--help" => {
                println!("{}", help_text());
                return Ok(None);
            }
            "--config" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--config requires a value".to_string())?;
                options.config_path = Some(PathBuf::from(value));
            }
            "--endpoint" => {
                idx += 1;
                let value = args
                    .get(idx)
                    .map(|value| value.trim())
                    .filter(|value| !value.is_empty())
                    .ok_or_else(|| "--endpoint requires a non-empty URL".to_string())?;
                options.endpoint = Some(value.to_string());
            }
            "--save-wav" => {
                idx += 1;
                let value =
                    args.get(idx).ok_or_else(|| "--save-wav requires a value".to_string())?;
                options.save_wav = Some(PathBuf::from(value));
            }
            "--dry-run" => {
                options.dry_run = true;
            }
            "--write-config" => {
                options.write_config = true;
            }
            unknown if unknown.starts_with('-') && unknown != "-" => {
                return Err(format!("Unknown argument: {unknown}\n\n{}", help_text()));
            }
            path => {
                if options.input.is_some() {
                    return Err("Only one input file can be classified at a time".to_string());
                }
                options.input = Some(PathBuf::from(path));
            }
        }
        idx += 1;
    }
    Ok(Some(options))
}

fn help_text() -> &'static str {
    "bangercheck: ask the classifier whether a track is a banger\n\n\
Usage:\n  bangercheck [OPTIONS] <FILE>\n\n\
Options:\n  \
--config <PATH>    Settings file (default: <config dir>/.bangercheck/config.toml)\n  \
--endpoint <URL>   Classifier endpoint, overriding the settings file\n  \
--save-wav <PATH>  Also write the normalized 10s WAV sample to PATH\n  \
--dry-run          Prepare the sample without contacting the classifier\n  \
--write-config     Write a settings file with the defaults and exit\n  \
-h, --help         Show this help"
}
