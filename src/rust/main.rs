use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use sentiment_analyzer::{
    load_artifacts, run_session, ArtifactPaths, InteractiveHost, RuntimeConfig, SessionSummary,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding model.onnx and vectorizer.onnx
    /// [default: $SENTIMENT_ANALYZER_HOME, else the current directory]
    #[arg(short, long)]
    artifacts_dir: Option<PathBuf>,

    /// Classifier file, overriding the one in the artifacts directory
    #[arg(long)]
    model: Option<PathBuf>,

    /// Vectorizer file, overriding the one in the artifacts directory
    #[arg(long)]
    vectorizer: Option<PathBuf>,

    /// Expected SHA-256 of the classifier file
    #[arg(long)]
    model_sha256: Option<String>,

    /// Expected SHA-256 of the vectorizer file
    #[arg(long)]
    vectorizer_sha256: Option<String>,

    /// ONNX Runtime threads (0 lets the runtime decide)
    #[arg(long, default_value_t = 0)]
    threads: usize,

    /// Analyze a single sentence and exit
    #[arg(short, long)]
    text: Option<String>,
}

impl Args {
    fn artifact_paths(&self) -> ArtifactPaths {
        let mut paths = ArtifactPaths::resolve(self.artifacts_dir.as_deref());
        if let Some(model) = &self.model {
            paths.model_path = model.clone();
        }
        if let Some(vectorizer) = &self.vectorizer {
            paths.vectorizer_path = vectorizer.clone();
        }
        paths.model_sha256 = self.model_sha256.clone();
        paths.vectorizer_sha256 = self.vectorizer_sha256.clone();
        paths
    }
}

/// Prompt-and-answer host on stdin/stdout.
struct TerminalHost<R, W> {
    input: R,
    output: W,
    prompt: bool,
    halted: bool,
}

impl<R: BufRead, W: Write> TerminalHost<R, W> {
    fn new(input: R, output: W, prompt: bool) -> Self {
        Self { input, output, prompt, halted: false }
    }

    fn say(&mut self, line: &str) {
        // A closed stdout leaves nothing to report to.
        let _ = writeln!(self.output, "{}", line);
    }
}

impl<R: BufRead, W: Write> InteractiveHost for TerminalHost<R, W> {
    fn user_text(&mut self) -> Option<String> {
        if self.halted {
            return None;
        }
        if self.prompt {
            let _ = write!(self.output, "> ");
            let _ = self.output.flush();
        }
        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
        }
    }

    fn show_positive(&mut self) {
        self.say("🙂 Positive Sentiment Detected!");
    }

    fn show_negative(&mut self) {
        self.say("☹️ Negative Sentiment Detected!");
    }

    fn show_error(&mut self, message: &str) {
        let _ = writeln!(io::stderr(), "{}", message);
    }

    fn halt_interaction(&mut self) {
        self.halted = true;
    }
}

/// Fails when loading failed, or when the single `--text` submission did.
fn exit_status(summary: &SessionSummary, one_shot: bool, model_path: &Path) -> Result<()> {
    if summary.halted {
        anyhow::bail!("Model could not be loaded from {}", model_path.display());
    }
    if one_shot && summary.errors > 0 {
        anyhow::bail!("Sentiment could not be predicted for the given text");
    }
    Ok(())
}

fn main() -> Result<()> {
    sentiment_analyzer::init_logger();
    let args = Args::parse();

    let paths = args.artifact_paths();
    let config = RuntimeConfig::default().with_threads(args.threads);

    info!("=== Sentiment Analyzer ===");
    info!("Model: {:?}", paths.model_path);
    info!("Vectorizer: {:?}", paths.vectorizer_path);

    let start_time = Instant::now();
    let loaded = load_artifacts(&paths, &config);
    info!("Artifacts loaded in {:.2?}", start_time.elapsed());

    let summary = match &args.text {
        Some(text) => {
            let input = io::Cursor::new(format!("{}\n", text));
            let mut host = TerminalHost::new(input, io::stdout(), false);
            run_session(&mut host, loaded)
        }
        None => {
            let stdin = io::stdin();
            let mut host = TerminalHost::new(stdin.lock(), io::stdout(), true);
            println!("Type your sentence below and press Enter to predict sentiment!");
            run_session(&mut host, loaded)
        }
    };

    io::stdout().flush().context("Failed to flush output")?;
    exit_status(&summary, args.text.is_some(), &paths.model_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides() {
        let args = Args::parse_from([
            "sentiment_analyzer",
            "--artifacts-dir",
            "/srv/sentiment",
            "--vectorizer",
            "/tmp/tfidf.onnx",
            "--model-sha256",
            "abc",
        ]);
        let paths = args.artifact_paths();
        assert_eq!(paths.model_path, PathBuf::from("/srv/sentiment/model.onnx"));
        assert_eq!(paths.vectorizer_path, PathBuf::from("/tmp/tfidf.onnx"));
        assert_eq!(paths.model_sha256.as_deref(), Some("abc"));
        assert!(paths.vectorizer_sha256.is_none());
    }

    #[test]
    fn test_home_dir_comes_from_environment_once() {
        std::env::set_var("SENTIMENT_ANALYZER_HOME", "/srv/from-env");

        let args = Args::parse_from(["sentiment_analyzer"]);
        assert!(args.artifacts_dir.is_none());
        assert_eq!(
            args.artifact_paths().model_path,
            PathBuf::from("/srv/from-env/model.onnx")
        );

        let args = Args::parse_from(["sentiment_analyzer", "-a", "/srv/flag"]);
        assert_eq!(
            args.artifact_paths().model_path,
            PathBuf::from("/srv/flag/model.onnx")
        );

        std::env::remove_var("SENTIMENT_ANALYZER_HOME");
    }

    #[test]
    fn test_exit_status() {
        let model = Path::new("model.onnx");
        let served = SessionSummary { positive: 1, ..Default::default() };
        let failed = SessionSummary { errors: 1, ..Default::default() };
        let halted = SessionSummary { halted: true, errors: 1, ..Default::default() };

        assert!(exit_status(&served, true, model).is_ok());
        assert!(exit_status(&served, false, model).is_ok());
        // An interactive session reports per-line errors and keeps going
        assert!(exit_status(&failed, false, model).is_ok());
        assert!(exit_status(&failed, true, model).is_err());
        assert!(exit_status(&halted, false, model).is_err());
        assert!(exit_status(&halted, true, model).is_err());
    }

    #[test]
    fn test_terminal_host_reads_lines() {
        let input = io::Cursor::new("first line\r\nsecond\n");
        let mut host = TerminalHost::new(input, Vec::new(), false);
        assert_eq!(host.user_text().as_deref(), Some("first line"));
        assert_eq!(host.user_text().as_deref(), Some("second"));
        assert_eq!(host.user_text(), None);
    }

    #[test]
    fn test_terminal_host_stops_after_halt() {
        let input = io::Cursor::new("ignored\n");
        let mut host = TerminalHost::new(input, Vec::new(), false);
        host.halt_interaction();
        assert_eq!(host.user_text(), None);
    }

    #[test]
    fn test_terminal_host_output() {
        let mut host = TerminalHost::new(io::Cursor::new(""), Vec::new(), false);
        host.show_positive();
        host.show_negative();
        let printed = String::from_utf8(host.output).unwrap();
        assert!(printed.contains("Positive Sentiment Detected!"));
        assert!(printed.contains("Negative Sentiment Detected!"));
    }
}
