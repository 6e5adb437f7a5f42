//! Answer scoring for quiz sessions.
//!
//! Card contents are free text (definitions, explanations), so an answer is
//! accepted when either string contains the other or when their
//! Levenshtein-based similarity clears [`SIMILARITY_THRESHOLD`].
//!
//! The containment shortcut is lenient: a single common word found inside a
//! long reference is accepted regardless of edit distance.

use serde::{Deserialize, Serialize};

/// Similarity above which a non-containing answer still counts as correct.
pub const SIMILARITY_THRESHOLD: f64 = 0.6;

/// Which rule decided the verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    /// The answer appears inside the reference.
    AnswerInReference,
    /// The reference appears inside the answer.
    ReferenceInAnswer,
    /// Similarity is above the threshold.
    Similar,
    NoMatch,
}

/// Detailed result of scoring a typed answer against a card's content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerEvaluation {
    pub is_correct: bool,
    /// Similarity score between 0.0 and 1.0.
    pub similarity: f64,
    pub match_kind: MatchKind,
    /// Case-folded, trimmed answer.
    pub answer_normalized: String,
    /// Case-folded, trimmed reference.
    pub reference_normalized: String,
}

/// Score a typed answer against the reference content.
pub fn evaluate_answer(answer: &str, reference: &str) -> AnswerEvaluation {
    let answer_normalized = normalize(answer);
    let reference_normalized = normalize(reference);

    let similarity = normalized_similarity(&answer_normalized, &reference_normalized);

    // An empty needle would match everything.
    let match_kind = if !answer_normalized.is_empty()
        && reference_normalized.contains(answer_normalized.as_str())
    {
        MatchKind::AnswerInReference
    } else if !reference_normalized.is_empty()
        && answer_normalized.contains(reference_normalized.as_str())
    {
        MatchKind::ReferenceInAnswer
    } else if similarity > SIMILARITY_THRESHOLD {
        MatchKind::Similar
    } else {
        MatchKind::NoMatch
    };

    AnswerEvaluation {
        is_correct: match_kind != MatchKind::NoMatch,
        similarity,
        match_kind,
        answer_normalized,
        reference_normalized,
    }
}

/// Whether `answer` should count as a correct answer for `reference`.
pub fn is_correct_answer(answer: &str, reference: &str) -> bool {
    evaluate_answer(answer, reference).is_correct
}

fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Calculate Levenshtein distance between two strings.
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    let m = a_chars.len();
    let n = b_chars.len();

    if m == 0 {
        return n;
    }
    if n == 0 {
        return m;
    }

    let mut prev = (0..=n).collect::<Vec<_>>();
    let mut curr = vec![0; n + 1];

    for i in 1..=m {
        curr[0] = i;

        for j in 1..=n {
            let cost = usize::from(a_chars[i - 1] != b_chars[j - 1]);

            curr[j] = (prev[j] + 1) // deletion
                .min(curr[j - 1] + 1) // insertion
                .min(prev[j - 1] + cost); // substitution
        }

        std::mem::swap(&mut prev, &mut curr);
    }

    prev[n]
}

/// Normalized similarity in `[0.0, 1.0]`; two empty strings score 0.
pub fn normalized_similarity(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 0.0;
    }

    let distance = levenshtein_distance(a, b);
    (max_len - distance) as f64 / max_len as f64
}
