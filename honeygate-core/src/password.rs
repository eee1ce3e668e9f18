//! Typo-tolerant credential checking
//!
//! A submitted password is classified against one known secret as an exact
//! match, a near miss ("typo"), or plainly wrong, using Levenshtein edit
//! distance. The typo band exists so an honest near-miss is forgiven
//! instead of counted as an attack; the lockout tracker must never be fed a
//! typo verdict.

use serde::Serialize;

/// Demonstration secret, compared against every login attempt.
pub const DEMO_SECRET: &str = "SecurePass123!";

/// Edit distance up to which a non-matching password counts as a typo.
pub const MAX_TYPO_DISTANCE: usize = 2;

/// Classification of a submitted password.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PasswordVerdict {
    Correct,
    Typo,
    Wrong,
}

/// Compares submitted passwords against a single configured secret.
#[derive(Debug, Clone)]
pub struct PasswordChecker {
    secret: String,
}

impl PasswordChecker {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Classify a submitted password.
    ///
    /// Exact equality short-circuits; otherwise the edit distance decides
    /// between [`PasswordVerdict::Typo`] (distance at most
    /// [`MAX_TYPO_DISTANCE`]) and [`PasswordVerdict::Wrong`]. Comparison
    /// runs input-to-secret only.
    pub fn check(&self, input: &str) -> PasswordVerdict {
        if input == self.secret {
            return PasswordVerdict::Correct;
        }

        if levenshtein(input, &self.secret) <= MAX_TYPO_DISTANCE {
            PasswordVerdict::Typo
        } else {
            PasswordVerdict::Wrong
        }
    }
}

impl Default for PasswordChecker {
    fn default() -> Self {
        Self::new(DEMO_SECRET)
    }
}

/// Levenshtein edit distance between two strings, over Unicode scalar
/// values.
///
/// Standard dynamic-programming recurrence: a `(len(a)+1) x (len(b)+1)`
/// table where each cell is the minimum of deletion, insertion, and
/// substitution costs. O(len(a) * len(b)) time and space, which is fine at
/// password lengths; adversarially long inputs would want the two-row
/// variant.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let mut matrix = vec![vec![0usize; b.len() + 1]; a.len() + 1];

    for (i, row) in matrix.iter_mut().enumerate() {
        row[0] = i;
    }
    for j in 0..=b.len() {
        matrix[0][j] = j;
    }

    for i in 1..=a.len() {
        for j in 1..=b.len() {
            if a[i - 1] == b[j - 1] {
                matrix[i][j] = matrix[i - 1][j - 1];
            } else {
                let deletion = matrix[i - 1][j] + 1;
                let insertion = matrix[i][j - 1] + 1;
                let substitution = matrix[i - 1][j - 1] + 1;
                matrix[i][j] = deletion.min(insertion).min(substitution);
            }
        }
    }

    matrix[a.len()][b.len()]
}
