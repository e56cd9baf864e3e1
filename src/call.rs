//! Callsign handling: normalization, plausibility checks, bust analysis and
//! the dictionary output ordering.
//!
//! A "bust" is a mis-copied callsign that differs from the true call by a
//! single small edit: an inserted or dropped character, one substituted
//! character, or two adjacent characters swapped.

use std::cmp::Ordering;

use hashbrown::{HashMap, HashSet};

/// Normalizes a raw logged callsign: uppercase, with any trailing `/QRP` or
/// `/QRPP` marker removed.
pub fn normalize(raw: &str) -> String {
    let upper = raw.to_ascii_uppercase();
    if let Some(stripped) = upper.strip_suffix("/QRPP") {
        return stripped.to_string();
    }
    if let Some(stripped) = upper.strip_suffix("/QRP") {
        return stripped.to_string();
    }
    upper
}

/// Whether `call` looks like a real callsign: at least three characters, only
/// `A–Z`, `0–9` and `/`, and containing at least one letter and one digit.
pub fn is_plausible(call: &str) -> bool {
    call.len() >= 3
        && call
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit() || b == b'/')
        && call.bytes().any(|b| b.is_ascii_uppercase())
        && call.bytes().any(|b| b.is_ascii_digit())
}

/// Is `copied` a plausible bust of `call`?
///
/// Symmetric and irreflexive. Calls whose lengths differ by two or more are
/// never busts of each other.
pub fn is_bust(call: &str, copied: &str) -> bool {
    if call == copied {
        return false;
    }

    let (cl, pl) = (call.len(), copied.len());
    if cl.abs_diff(pl) >= 2 {
        return false;
    }

    if cl != pl {
        let (longer, shorter) = if cl > pl { (call, copied) } else { (copied, call) };

        if longer.contains(shorter) {
            return true;
        }

        // one extra character somewhere in the interior of the longer call
        for posn in 1..longer.len() - 1 {
            let mut tmp = String::with_capacity(longer.len() - 1);
            tmp.push_str(&longer[..posn]);
            tmp.push_str(&longer[posn + 1..]);

            if tmp == shorter {
                return true;
            }
        }

        return false;
    }

    // same length; exactly one differing character?
    let differences = call
        .bytes()
        .zip(copied.bytes())
        .filter(|(a, b)| a != b)
        .count();

    if differences == 1 {
        return true;
    }

    // adjacent-character inversion?
    let bytes = call.as_bytes();
    for posn in 0..bytes.len() - 1 {
        let mut tmp = bytes.to_vec();
        tmp.swap(posn, posn + 1);

        if tmp == copied.as_bytes() {
            return true;
        }
    }

    false
}

/// For each call in `calls`, the other members of `calls` that are plausible
/// busts of it. The mapping is symmetric; a call with no busts has no entry.
pub fn possible_busts(calls: &HashSet<String>) -> HashMap<String, HashSet<String>> {
    let mut rv: HashMap<String, HashSet<String>> = HashMap::new();
    let calls: Vec<&String> = calls.iter().collect();

    for (n, call1) in calls.iter().enumerate() {
        for call2 in &calls[n + 1..] {
            if is_bust(call1, call2) {
                rv.entry((*call1).clone()).or_default().insert((*call2).clone());
                rv.entry((*call2).clone()).or_default().insert((*call1).clone());
            }
        }
    }

    rv
}

/// The dictionary output ordering: calls sort by the portion starting at
/// their last digit, then by the prefix before it. This groups calls by
/// their numeric area across the whole dictionary.
pub fn scp_order(a: &str, b: &str) -> Ordering {
    let (a_prefix, a_area) = split_at_last_digit(a);
    let (b_prefix, b_area) = split_at_last_digit(b);

    a_area
        .cmp(b_area)
        .then_with(|| a_prefix.cmp(b_prefix))
        .then_with(|| a.cmp(b))
}

fn split_at_last_digit(call: &str) -> (&str, &str) {
    match call.rfind(|c: char| c.is_ascii_digit()) {
        Some(posn) => call.split_at(posn),
        None => ("", call),
    }
}
