//! Reduction of an attempt set to one authoritative outcome.
//!
//! # Priority
//! 1. First healthy attempt (succeeded with 200)
//! 2. First attempt that succeeded with any other code
//! 3. Most frequent status code, lowest code on a tie, annotated with the
//!    attempt count
//! 4. First attempt unchanged (no attempt carried a status code)

use std::collections::BTreeMap;

use crate::probe::Outcome;

/// Pick the outcome that represents `attempts`. `None` only for an empty set.
pub fn consensus(attempts: Vec<Outcome>, max_attempts: u32) -> Option<Outcome> {
    if let Some(index) = attempts.iter().position(Outcome::is_healthy) {
        return attempts.into_iter().nth(index);
    }
    if let Some(index) = attempts.iter().position(|o| o.succeeded) {
        return attempts.into_iter().nth(index);
    }

    if let Some(code) = most_frequent_code(&attempts) {
        let index = attempts.iter().position(|o| o.status_code == Some(code))?;
        let mut chosen = attempts.into_iter().nth(index)?;
        chosen.message = format!("{} (after {} attempts)", chosen.message, max_attempts);
        return Some(chosen);
    }

    attempts.into_iter().next()
}

/// Mode of the non-null status codes; the smallest code wins a tie.
fn most_frequent_code(attempts: &[Outcome]) -> Option<u16> {
    let mut counts: BTreeMap<u16, usize> = BTreeMap::new();
    for code in attempts.iter().filter_map(|o| o.status_code) {
        *counts.entry(code).or_default() += 1;
    }

    // Ascending key order plus strict comparison keeps the lowest tied code.
    let mut best: Option<(u16, usize)> = None;
    for (code, count) in counts {
        match best {
            Some((_, best_count)) if count <= best_count => {}
            _ => best = Some((code, count)),
        }
    }
    best.map(|(code, _)| code)
}
