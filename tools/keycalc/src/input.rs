//! Token parsing for the REPL and `eval`

use keycalc_engine::{action_for_key, Action, UnknownInput};

/// Resolve one token into the actions it stands for
///
/// A token is a keyboard key, a button name, or a run of digits and
/// decimal points that is entered one key at a time (`12.5`).
pub fn parse_token(token: &str) -> Result<Vec<Action>, UnknownInput> {
    if let Some(action) = action_for_key(token) {
        return Ok(vec![action]);
    }
    if let Ok(action) = token.parse::<Action>() {
        return Ok(vec![action]);
    }
    if is_number_run(token) {
        return Ok(token.chars().filter_map(|c| action_for_key(&c.to_string())).collect());
    }
    Err(UnknownInput::new("button", token))
}

/// Resolve a whitespace-separated line; nothing is returned unless every
/// token is known
pub fn parse_line(line: &str) -> Result<Vec<Action>, UnknownInput> {
    parse_tokens(line.split_whitespace())
}

pub fn parse_tokens<'a>(
    tokens: impl IntoIterator<Item = &'a str>,
) -> Result<Vec<Action>, UnknownInput> {
    let mut actions = Vec::new();
    for token in tokens {
        actions.extend(parse_token(token)?);
    }
    Ok(actions)
}

fn is_number_run(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| c.is_ascii_digit() || c == '.')
}
