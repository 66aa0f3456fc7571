//! Tokenization and matching primitives for the reference executor.
//!
//! Matching here is deliberately simple: lowercase tokens split on
//! non-alphanumeric boundaries, edit-distance fuzziness scaled to term
//! length, and positional phrase matching with slop. Production engines do
//! more per analyzer; these primitives exist so the evaluator's ranking
//! arithmetic is exact and testable.

use strsim::levenshtein;

/// Split `text` into lowercase alphanumeric tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}

/// Automatic edit-distance budget for a term, scaled to its length:
/// 0 below 3 characters, 1 up to 5, 2 from 6.
pub fn auto_fuzziness(term: &str) -> usize {
    match term.chars().count() {
        0..=2 => 0,
        3..=5 => 1,
        _ => 2,
    }
}

/// Returns `true` if `candidate` matches `term` within the automatic
/// edit-distance budget, after `prefix_length` characters match exactly.
pub fn fuzzy_term_match(term: &str, candidate: &str, prefix_length: usize) -> bool {
    if term == candidate {
        return true;
    }
    let budget = auto_fuzziness(term);
    if budget == 0 {
        return false;
    }
    if prefix_length > 0 {
        let term_prefix: String = term.chars().take(prefix_length).collect();
        let cand_prefix: String = candidate.chars().take(prefix_length).collect();
        if term_prefix != cand_prefix {
            return false;
        }
    }
    levenshtein(term, candidate) <= budget
}

/// Returns `true` if any token in `tokens` matches `term`, exactly or
/// (when `fuzzy`) within the automatic edit-distance budget.
pub fn any_token_matches(tokens: &[String], term: &str, fuzzy: bool, prefix_length: usize) -> bool {
    tokens.iter().any(|t| {
        if t == term {
            true
        } else if fuzzy {
            fuzzy_term_match(term, t, prefix_length)
        } else {
            false
        }
    })
}

/// Number of matching clauses required by a percentage minimum, never
/// below one for a non-empty clause list.
pub fn required_matches(total: usize, pct: Option<u8>) -> usize {
    if total == 0 {
        return 0;
    }
    match pct {
        Some(p) => {
            let needed = (total as f64 * f64::from(p) / 100.0).floor() as usize;
            needed.max(1)
        }
        None => 1,
    }
}

/// Returns `true` if `phrase` occurs in `tokens` in order, with at most
/// `slop` extra positions spread between consecutive phrase terms.
pub fn phrase_matches(tokens: &[String], phrase: &[String], slop: u32) -> bool {
    if phrase.is_empty() {
        return false;
    }
    if phrase.len() == 1 {
        return tokens.iter().any(|t| t == &phrase[0]);
    }
    'starts: for (start, tok) in tokens.iter().enumerate() {
        if tok != &phrase[0] {
            continue;
        }
        let mut budget = slop as usize;
        let mut pos = start;
        for term in &phrase[1..] {
            // Next occurrence within the remaining positional budget.
            let window_end = (pos + 2 + budget).min(tokens.len());
            let Some(found) = tokens[pos + 1..window_end].iter().position(|t| t == term) else {
                continue 'starts;
            };
            budget -= found;
            pos = pos + 1 + found;
        }
        return true;
    }
    false
}

/// Extract tagged highlight fragments from `text`.
///
/// Finds case-insensitive (ASCII) occurrences of `terms`, wraps each in the
/// tag pair, and returns up to `max_fragments` windows of roughly
/// `fragment_size` characters centered on the matches.
pub fn highlight_fragments(
    text: &str,
    terms: &[String],
    fragment_size: usize,
    max_fragments: usize,
    pre_tag: &str,
    post_tag: &str,
) -> Vec<String> {
    if text.is_empty() || terms.is_empty() || max_fragments == 0 {
        return Vec::new();
    }

    // Byte ranges of every term occurrence, in document order.
    let mut matches: Vec<(usize, usize)> = Vec::new();
    for term in terms {
        if term.is_empty() {
            continue;
        }
        let mut from = 0;
        while let Some(at) = find_ignore_ascii_case(text, term, from) {
            matches.push((at, at + term.len()));
            from = at + term.len();
        }
    }
    matches.sort_unstable();
    matches.dedup();

    let mut fragments = Vec::new();
    let mut covered_until = 0;
    for &(start, end) in &matches {
        if fragments.len() >= max_fragments {
            break;
        }
        if start < covered_until {
            continue;
        }
        let half = fragment_size.saturating_sub(end - start) / 2;
        let frag_start = floor_char_boundary(text, start.saturating_sub(half));
        let frag_end = ceil_char_boundary(text, (end + half).min(text.len()));

        // Every match inside this window gets tagged.
        let mut out = String::with_capacity(frag_end - frag_start + 16);
        let mut cursor = frag_start;
        for &(m_start, m_end) in &matches {
            if m_start < cursor || m_end > frag_end {
                continue;
            }
            out.push_str(&text[cursor..m_start]);
            out.push_str(pre_tag);
            out.push_str(&text[m_start..m_end]);
            out.push_str(post_tag);
            cursor = m_end;
        }
        out.push_str(&text[cursor..frag_end]);
        fragments.push(out);
        covered_until = frag_end;
    }
    fragments
}

/// ASCII-case-insensitive substring search starting at byte `from`.
fn find_ignore_ascii_case(haystack: &str, needle: &str, from: usize) -> Option<usize> {
    let hay = haystack.as_bytes();
    let ned = needle.as_bytes();
    if ned.is_empty() || from + ned.len() > hay.len() {
        return None;
    }
    (from..=hay.len() - ned.len()).find(|&i| {
        haystack.is_char_boundary(i) && hay[i..i + ned.len()].eq_ignore_ascii_case(ned)
    })
}

fn floor_char_boundary(text: &str, mut at: usize) -> usize {
    while at > 0 && !text.is_char_boundary(at) {
        at -= 1;
    }
    at
}

fn ceil_char_boundary(text: &str, mut at: usize) -> usize {
    while at < text.len() && !text.is_char_boundary(at) {
        at += 1;
    }
    at
}

// ============================================================================
// Tests
// ============================================================================
