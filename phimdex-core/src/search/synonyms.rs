//! Keyword stems mapped to their Vietnamese and English variants.
//!
//! The table is what lets `"hàn quốc"` find a record whose country is listed
//! as `"Korea"`: the keyword resolves to an entry, and the entry's variants
//! are looked up in the record's searchable text.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CatalogError, Result};
use crate::search::normalize::{Normalization, contains_phrase, similarity};

/// Similarity above which a misspelled keyword still resolves to an entry.
pub const SYNONYM_FUZZY_THRESHOLD: f64 = 0.8;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynonymEntry {
    pub stem: String,
    /// Lower-cased variants; always includes the stem itself.
    pub variants: Vec<String>,
}

impl SynonymEntry {
    pub fn new<I, S>(stem: &str, variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let stem = stem.trim().to_lowercase();
        let mut cleaned: Vec<String> = Vec::new();
        for variant in variants {
            let variant = variant.as_ref().trim().to_lowercase();
            if !variant.is_empty() && !cleaned.contains(&variant) {
                cleaned.push(variant);
            }
        }
        if !stem.is_empty() && !cleaned.contains(&stem) {
            cleaned.insert(0, stem.clone());
        }
        Self {
            stem,
            variants: cleaned,
        }
    }

    fn forms(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.stem.as_str())
            .chain(self.variants.iter().map(String::as_str))
    }
}

/// Immutable stem → variants table. Entry order is significant: earlier
/// entries win when several resolve at the same stage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SynonymTable {
    entries: Vec<SynonymEntry>,
    /// Each entry's forms under `Normalization::Exact`, index-aligned with
    /// `entries`.
    exact_forms: Vec<Vec<String>>,
    /// Same, under `Normalization::FoldDiacritics`.
    folded_forms: Vec<Vec<String>>,
}

#[cfg(test)]
thread_local! {
    static RESOLVE_CALLS: std::cell::Cell<usize> = const { std::cell::Cell::new(0) };
}

/// Number of `resolve` calls made on this thread.
#[cfg(test)]
pub(crate) fn resolve_calls() -> usize {
    RESOLVE_CALLS.with(std::cell::Cell::get)
}

static BUILTIN: Lazy<Arc<SynonymTable>> =
    Lazy::new(|| {
        Arc::new(SynonymTable::from_pairs(BUILTIN_PAIRS.iter().copied()))
    });

const BUILTIN_PAIRS: &[(&str, &[&str])] = &[
    // Countries
    ("korea", &["hàn quốc", "han quoc", "korean", "south korea", "kdrama"]),
    ("china", &["trung quốc", "trung quoc", "chinese", "hoa ngữ", "cdrama"]),
    ("japan", &["nhật bản", "nhat ban", "japanese", "jdrama"]),
    ("thailand", &["thái lan", "thai lan", "thai"]),
    (
        "usa",
        &["âu mỹ", "au my", "mỹ", "america", "american", "united states"],
    ),
    (
        "uk",
        &["vương quốc anh", "anh quốc", "united kingdom", "british", "england"],
    ),
    ("hong kong", &["hồng kông", "hong kong", "hongkong", "tvb"]),
    ("taiwan", &["đài loan", "dai loan", "taiwanese"]),
    ("india", &["ấn độ", "an do", "indian", "bollywood"]),
    ("france", &["pháp", "french"]),
    // Genres
    ("action", &["hành động", "hanh dong"]),
    ("horror", &["kinh dị", "kinh di", "scary"]),
    ("comedy", &["hài hước", "hai huoc", "hài", "funny"]),
    ("romance", &["tình cảm", "tinh cam", "lãng mạn", "romantic", "love"]),
    (
        "animation",
        &["hoạt hình", "hoat hinh", "anime", "cartoon", "hoathinh"],
    ),
    (
        "sci-fi",
        &["viễn tưởng", "vien tuong", "khoa học", "science fiction", "scifi"],
    ),
    ("drama", &["chính kịch", "chinh kich"]),
    ("adventure", &["phiêu lưu", "phieu luu"]),
    ("martial arts", &["võ thuật", "vo thuat", "kung fu", "kiếm hiệp"]),
    ("historical", &["cổ trang", "co trang", "lịch sử", "period"]),
    ("crime", &["hình sự", "hinh su", "trinh thám", "detective"]),
    ("fantasy", &["thần thoại", "than thoai", "huyền huyễn", "tiên hiệp"]),
    ("psychological", &["tâm lý", "tam ly", "tâm lí", "psychology"]),
    ("family", &["gia đình", "gia dinh"]),
    ("school", &["học đường", "hoc duong", "high school"]),
    ("war", &["chiến tranh", "chien tranh"]),
    ("music", &["âm nhạc", "am nhac", "musical"]),
    ("sports", &["thể thao", "the thao", "sport"]),
    ("documentary", &["tài liệu", "tai lieu"]),
    ("mystery", &["bí ẩn", "bi an", "huyền bí"]),
    // Franchises
    (
        "marvel",
        &["avengers", "iron man", "spider-man", "người nhện", "mcu"],
    ),
    ("dc", &["dc comics", "batman", "superman", "justice league"]),
    ("conan", &["thám tử lừng danh conan", "detective conan"]),
    ("one piece", &["đảo hải tặc", "dao hai tac"]),
    ("doraemon", &["đôrêmon", "mèo máy"]),
    ("harry potter", &["hogwarts", "wizarding world"]),
];

impl SynonymTable {
    /// The built-in table, constructed once per process.
    pub fn builtin() -> Arc<SynonymTable> {
        Arc::clone(&BUILTIN)
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, S, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, V)>,
        S: AsRef<str>,
        V: IntoIterator,
        V::Item: AsRef<str>,
    {
        pairs
            .into_iter()
            .map(|(stem, variants)| SynonymEntry::new(stem.as_ref(), variants))
            .collect()
    }

    /// Builds a table from a `stem -> [variants]` map. Entries are ordered
    /// by stem.
    pub fn from_map(map: BTreeMap<String, Vec<String>>) -> Self {
        map.into_iter()
            .map(|(stem, variants)| SynonymEntry::new(&stem, variants))
            .collect()
    }

    /// Loads a substitute table from a JSON or TOML file holding a
    /// `stem -> [variants]` map. The format follows the file extension;
    /// anything other than `.toml` is read as JSON.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let is_toml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

        let map: BTreeMap<String, Vec<String>> = if is_toml {
            toml::from_str(&contents).map_err(|err| {
                CatalogError::InvalidSynonyms(format!(
                    "{}: {err}",
                    path.display()
                ))
            })?
        } else {
            serde_json::from_str(&contents)?
        };

        let table = Self::from_map(map);
        debug!(
            path = %path.display(),
            entries = table.len(),
            "Loaded synonym table"
        );
        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[SynonymEntry] {
        &self.entries
    }

    pub fn get(&self, stem: &str) -> Option<&SynonymEntry> {
        let stem = stem.trim().to_lowercase();
        self.entries.iter().find(|entry| entry.stem == stem)
    }

    /// Variants for `keyword`, compared as-is (lower-cased and trimmed).
    pub fn expand(&self, keyword: &str) -> Option<&[String]> {
        self.resolve(keyword, Normalization::Exact)
            .map(|entry| entry.variants.as_slice())
    }

    /// Resolves a keyword to an entry in three stages, first hit wins:
    /// an exact stem/variant hit, then a stem/variant occurring as a
    /// whole phrase inside the keyword, then the closest stem/variant
    /// whose similarity exceeds [`SYNONYM_FUZZY_THRESHOLD`].
    pub fn resolve(
        &self,
        keyword: &str,
        normalization: Normalization,
    ) -> Option<&SynonymEntry> {
        #[cfg(test)]
        RESOLVE_CALLS.with(|calls| calls.set(calls.get() + 1));

        let keyword = normalization.apply(keyword);
        if keyword.is_empty() {
            return None;
        }

        let indexed = || self.entries.iter().zip(self.forms(normalization));

        if let Some((entry, _)) =
            indexed().find(|(_, forms)| forms.iter().any(|form| *form == keyword))
        {
            return Some(entry);
        }

        if let Some((entry, _)) = indexed().find(|(_, forms)| {
            forms.iter().any(|form| contains_phrase(&keyword, form))
        }) {
            return Some(entry);
        }

        let mut best: Option<(&SynonymEntry, f64)> = None;
        for (entry, forms) in indexed() {
            for form in forms {
                let score = similarity(&keyword, form);
                if score > SYNONYM_FUZZY_THRESHOLD
                    && best.is_none_or(|(_, current)| score > current)
                {
                    best = Some((entry, score));
                }
            }
        }
        best.map(|(entry, _)| entry)
    }

    fn forms(&self, normalization: Normalization) -> &[Vec<String>] {
        match normalization {
            Normalization::Exact => &self.exact_forms,
            Normalization::FoldDiacritics => &self.folded_forms,
        }
    }
}

fn normalized_forms(
    entries: &[SynonymEntry],
    normalization: Normalization,
) -> Vec<Vec<String>> {
    entries
        .iter()
        .map(|entry| {
            let mut forms: Vec<String> = Vec::new();
            for form in entry.forms().map(|form| normalization.apply(form)) {
                if !form.is_empty() && !forms.contains(&form) {
                    forms.push(form);
                }
            }
            forms
        })
        .collect()
}

impl FromIterator<SynonymEntry> for SynonymTable {
    fn from_iter<T: IntoIterator<Item = SynonymEntry>>(iter: T) -> Self {
        let entries: Vec<SynonymEntry> = iter
            .into_iter()
            .filter(|entry| !entry.variants.is_empty())
            .collect();
        Self {
            exact_forms: normalized_forms(&entries, Normalization::Exact),
            folded_forms: normalized_forms(
                &entries,
                Normalization::FoldDiacritics,
            ),
            entries,
        }
    }
}
