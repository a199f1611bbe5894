use std::future::Future;
use std::pin::Pin;

pub type OracleFuture = Pin<Box<dyn Future<Output = Result<String, OracleError>> + Send>>;

#[derive(Debug, Clone)]
pub enum OracleError {
    Timeout,
    Provider(String),
}

impl std::fmt::Display for OracleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OracleError::Timeout => write!(f, "definition lookup timed out"),
            OracleError::Provider(reason) => write!(f, "definition provider failed: {}", reason),
        }
    }
}

impl std::error::Error for OracleError {}

/// Seam for the external generative-text service. The relay loop never calls
/// the provider directly; it spawns the returned future as an independent
/// task so unrelated events keep flowing while a lookup is in flight.
pub trait DefinitionOracle: Send + Sync {
    fn query(&self, question: &str) -> OracleFuture;
}

/// Word-wraps a raw answer at ten words per line for whiteboard display.
pub fn format_answer(answer: &str) -> String {
    let mut formatted = String::new();
    for (i, word) in answer.split_whitespace().enumerate() {
        if i > 0 {
            formatted.push(if i % 10 == 0 { '\n' } else { ' ' });
        }
        formatted.push_str(word);
    }
    formatted
}
