//! The boundary between the analyzer and whatever front-end collects text
//! and displays results.

use log::{error, info};

use crate::sentiment::{AnalyzerError, Sentiment, SentimentAnalyzer};

/// Capabilities an interactive front-end provides to the session driver.
pub trait InteractiveHost {
    /// Next submission, or `None` once the user is done.
    fn user_text(&mut self) -> Option<String>;

    fn show_positive(&mut self);

    fn show_negative(&mut self);

    fn show_error(&mut self, message: &str);

    /// Stops accepting input for the rest of the process.
    fn halt_interaction(&mut self);
}

/// Counts of what happened during one session.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub positive: usize,
    pub negative: usize,
    pub errors: usize,
    pub skipped: usize,
    pub halted: bool,
}

/// Drives a host until it runs out of input.
///
/// A failed load is shown once and halts the host. Per-request failures are
/// shown and the session keeps going; nothing is retried.
pub fn run_session<H: InteractiveHost>(
    host: &mut H,
    loaded: Result<SentimentAnalyzer, AnalyzerError>,
) -> SessionSummary {
    let mut summary = SessionSummary::default();

    let analyzer = match loaded {
        Ok(analyzer) => analyzer,
        Err(e) => {
            error!("Startup failed: {}", e);
            host.show_error(&format!("Error loading model: {}", e));
            host.halt_interaction();
            summary.halted = true;
            return summary;
        }
    };

    while let Some(text) = host.user_text() {
        match analyzer.analyze(&text) {
            Ok(None) => summary.skipped += 1,
            Ok(Some(analysis)) => match analysis.sentiment {
                Sentiment::Positive => {
                    summary.positive += 1;
                    host.show_positive();
                }
                Sentiment::Negative => {
                    summary.negative += 1;
                    host.show_negative();
                }
            },
            Err(e) => {
                error!("Prediction failed: {}", e);
                summary.errors += 1;
                host.show_error(&format!("Error during prediction: {}", e));
            }
        }
    }

    info!(
        "Session finished: {} positive, {} negative, {} errors, {} skipped",
        summary.positive, summary.negative, summary.errors, summary.skipped
    );
    summary
}
