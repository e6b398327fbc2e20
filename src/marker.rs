//! Read-marker advancement logic
//!
//! Computes how far a channel's read marker can move past a leading run of
//! bot-authored messages. Pure functions, no I/O.

use crate::slack::Message;

/// What the sweep should do with a channel after scanning its messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advancement {
    /// Advance the remote marker to this timestamp.
    Clear(String),
    /// Leave the marker where it is.
    NoOp,
}

/// Compute the new marker timestamp for an oldest-first message sequence.
///
/// The candidate starts at the first message's ts and moves forward through
/// pairs of consecutive messages:
/// - both messages authored by `bot_id`: candidate moves to the second ts;
/// - the first of the pair is not the bot: scan stops, candidate keeps its
///   previous value;
/// - the first is the bot but the second is not: candidate moves to the
///   first's ts and the scan stops.
///
/// A sequence with fewer than two messages produces no pairs, so the
/// candidate stays at its initial value. In particular a lone trailing bot
/// message is never marked read on its own; that matches the long-standing
/// behavior of this tool and is pinned by tests below.
pub fn advance_marker(messages: &[Message], bot_id: &str) -> Option<String> {
    let mut ts = messages.first().map(|m| m.ts.clone());

    for pair in messages.windows(2) {
        let (current, next) = (&pair[0], &pair[1]);
        let current_is_bot = current.bot_id.as_deref() == Some(bot_id);
        let next_is_bot = next.bot_id.as_deref() == Some(bot_id);

        // Both from the bot: keep sliding forward.
        if current_is_bot && next_is_bot {
            ts = Some(next.ts.clone());
            continue;
        }

        // A human message at the front of the window: stop where we are.
        if !current_is_bot {
            break;
        }

        // Bot followed by a human: the bot message is the last clearable one.
        ts = Some(current.ts.clone());
        break;
    }

    ts
}

/// Decide between clearing and a no-op by comparing the scan result against
/// the first message's timestamp. Equality is by value; two absent
/// timestamps are equal.
pub fn decide(messages: &[Message], bot_id: &str) -> Advancement {
    let first_ts = messages.first().map(|m| m.ts.clone());
    let new_ts = advance_marker(messages, bot_id);

    match new_ts {
        Some(ts) if Some(&ts) != first_ts.as_ref() => Advancement::Clear(ts),
        _ => Advancement::NoOp,
    }
}

/// Shift a Slack timestamp one second back, keeping the fractional part.
///
/// The history fetch uses this so the marker's own boundary message is
/// included and re-examined. Slack timestamps look like
/// `"1700000000.000500"`; if the seconds part does not parse the input is
/// returned unchanged.
pub fn boundary_before(ts: &str) -> String {
    let (seconds, fraction) = match ts.split_once('.') {
        Some((s, f)) => (s, Some(f)),
        None => (ts, None),
    };

    let Ok(seconds) = seconds.parse::<u64>() else {
        return ts.to_string();
    };
    let seconds = seconds.saturating_sub(1);

    match fraction {
        Some(f) => format!("{}.{}", seconds, f),
        None => seconds.to_string(),
    }
}
