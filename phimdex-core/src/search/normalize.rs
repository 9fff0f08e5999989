use serde::{Deserialize, Serialize};

/// How keywords and record fields are normalized before comparison.
///
/// `Exact` lower-cases and trims only, so Vietnamese diacritics must match
/// as written. `FoldDiacritics` additionally transliterates to ASCII, which
/// lets `"han quoc"` find `"Hàn Quốc"`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Normalization {
    #[default]
    Exact,
    FoldDiacritics,
}

impl Normalization {
    pub fn from_fold_flag(fold_diacritics: bool) -> Self {
        if fold_diacritics {
            Normalization::FoldDiacritics
        } else {
            Normalization::Exact
        }
    }

    pub fn apply(self, text: &str) -> String {
        let lowered = text.trim().to_lowercase();
        match self {
            Normalization::Exact => lowered,
            Normalization::FoldDiacritics => {
                deunicode::deunicode(&lowered).to_lowercase()
            }
        }
    }
}

pub(crate) fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// `1 - levenshtein / max_len` over characters; `0.0` when either side is
/// empty.
pub(crate) fn similarity(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    strsim::normalized_levenshtein(a, b)
}

/// Upper bound of [`similarity`] from lengths alone. Levenshtein distance is
/// at least the length difference.
pub(crate) fn similarity_ceiling(a_len: usize, b_len: usize) -> f64 {
    let longer = a_len.max(b_len);
    if longer == 0 {
        return 0.0;
    }
    1.0 - (a_len.abs_diff(b_len) as f64 / longer as f64)
}

/// Case-insensitive, diacritic-folded key approximating locale collation
/// for name sorting.
pub(crate) fn collation_key(text: &str) -> String {
    deunicode::deunicode(text.trim()).to_lowercase()
}

/// True when `phrase` occurs in `text` on whitespace boundaries.
pub(crate) fn contains_phrase(text: &str, phrase: &str) -> bool {
    if phrase.is_empty() {
        return false;
    }
    padded(text).contains(&padded(phrase))
}

fn padded(text: &str) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    format!(" {} ", words.join(" "))
}
