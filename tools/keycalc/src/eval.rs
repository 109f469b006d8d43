//! One-shot evaluation of a token list

use anyhow::{Context, Result};
use keycalc_engine::{Calculator, Session, SessionConfig, Snapshot};
use tracing::debug;

use crate::input;

/// Feed `tokens` to a fresh session and return the final snapshot
///
/// Unknown tokens are rejected before anything is dispatched.
pub async fn evaluate(tokens: &[String], engine: &SessionConfig) -> Result<Snapshot> {
    let actions = input::parse_tokens(tokens.iter().map(String::as_str))?;
    debug!(count = actions.len(), "Evaluating actions");

    let (session, handle) = Session::new(Calculator::new(), engine.clone());
    let task = tokio::spawn(session.run());

    handle.dispatch_all(actions)?;
    let snapshot = handle.snapshot().await?;

    handle.shutdown();
    task.await.context("Session task failed")?;
    Ok(snapshot)
}
