use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

use chatfold_core::capture::read_updates;
use chatfold_core::{FoldError, Response, apply_many, fold};
use tracing::info;

/// Command-line arguments.
#[derive(Debug, Clone, clap::Parser)]
#[command(name = "chatfold-replay", version, about)]
pub struct ReplayArgs {
    /// JSON-lines capture with one update per line (`-` reads stdin).
    pub input: PathBuf,
    /// Print only the concatenated text instead of the response JSON.
    #[arg(long)]
    pub text: bool,
    /// Pretty-print the response JSON.
    #[arg(long)]
    pub pretty: bool,
    /// Fold the first N updates, then apply the rest onto that response.
    #[arg(long, value_name = "N")]
    pub split_at: Option<usize>,
}

#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Fold(#[from] FoldError),
    #[error("failed to serialize response: {0}")]
    Serialize(#[from] serde_json::Error),
}

fn open_input(path: &PathBuf) -> Result<Box<dyn BufRead>, ReplayError> {
    if path.as_os_str() == "-" {
        return Ok(Box::new(BufReader::new(std::io::stdin())));
    }
    let file = File::open(path).map_err(|source| ReplayError::Open {
        path: path.clone(),
        source,
    })?;
    Ok(Box::new(BufReader::new(file)))
}

/// Folds the capture named by `args`, in one or two passes.
pub fn replay(args: &ReplayArgs) -> Result<Response, ReplayError> {
    let mut updates = read_updates(open_input(&args.input)?)?;
    let total = updates.len();
    let response = match args.split_at {
        Some(split) => {
            let rest = updates.split_off(split.min(total));
            let mut response = fold(updates);
            apply_many(&mut response, rest);
            response
        }
        None => fold(updates),
    };
    info!(
        updates = total,
        messages = response.messages.len(),
        split_at = ?args.split_at,
        "capture folded"
    );
    Ok(response)
}

/// Runs a replay and renders its output.
pub fn run(args: &ReplayArgs) -> Result<String, ReplayError> {
    let response = replay(args)?;
    if args.text {
        return Ok(response.text());
    }
    let rendered = if args.pretty {
        serde_json::to_string_pretty(&response)?
    } else {
        serde_json::to_string(&response)?
    };
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser as _;

    const CAPTURE: &str = r#"# two messages, usage lifted out of content
{"role":"assistant","message_id":"m1","contents":[{"type":"text","text":"Hel"}]}
{"contents":[{"type":"text","text":"lo"},{"type":"usage","counters":{"input_tokens":3}}]}
{"role":"user","message_id":"m1","contents":[{"type":"text","text":"hi"}]}
{"finish_reason":"stop","contents":[{"type":"usage","counters":{"output_tokens":2}}]}
"#;

    fn capture_file() -> tempfile::NamedTempFile {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), CAPTURE).unwrap();
        file
    }

    fn args(path: &std::path::Path, extra: &[&str]) -> ReplayArgs {
        let mut argv = vec!["chatfold-replay", path.to_str().unwrap()];
        argv.extend_from_slice(extra);
        ReplayArgs::try_parse_from(argv).unwrap()
    }

    #[test]
    fn replay_folds_capture() {
        let file = capture_file();
        let response = replay(&args(file.path(), &[])).unwrap();
        assert_eq!(response.messages.len(), 2);
        assert_eq!(response.messages[0].text(), "Hello");
        assert_eq!(response.messages[1].role(), "user");
        assert_eq!(response.finish_reason.as_deref(), Some("stop"));
        let usage = response.usage.unwrap();
        assert_eq!(usage.input_tokens, Some(3));
        assert_eq!(usage.output_tokens, Some(2));
    }

    #[test]
    fn split_replay_matches_single_pass() {
        let file = capture_file();
        let single = replay(&args(file.path(), &[])).unwrap();
        for split in ["0", "1", "2", "3", "4", "10"] {
            let split_response = replay(&args(file.path(), &["--split-at", split])).unwrap();
            assert_eq!(split_response, single, "split at {split}");
        }
    }

    #[test]
    fn text_output_concatenates_messages() {
        let file = capture_file();
        assert_eq!(run(&args(file.path(), &["--text"])).unwrap(), "Hellohi");
    }

    #[test]
    fn json_output_lists_messages() {
        let file = capture_file();
        let rendered = run(&args(file.path(), &["--pretty"])).unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value["messages"].as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn missing_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = replay(&args(&dir.path().join("nope.jsonl"), &[])).unwrap_err();
        assert!(matches!(err, ReplayError::Open { .. }));
    }

    #[test]
    fn malformed_line_is_reported_with_line_number() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "{\"role\":\"assistant\"}\n{oops\n").unwrap();
        let err = replay(&args(file.path(), &[])).unwrap_err();
        assert!(matches!(err, ReplayError::Fold(FoldError::Decode { line: 2, .. })));
    }
}
