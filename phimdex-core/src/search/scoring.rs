//! Keyword relevance scoring.
//!
//! A record's score is the sum of weighted per-field contributions:
//! substring containment (shorter fields that contain the keyword score
//! higher), edit-distance similarity on title fields, keyword-token hits,
//! a flat bonus when the keyword's synonyms appear in the record's
//! taxonomy or cast, and exact/prefix title bonuses. A score of zero means
//! no match.

use std::sync::Arc;

use phimdex_model::MovieRecord;
use serde::{Deserialize, Serialize};

use crate::search::normalize::{
    Normalization, char_len, similarity, similarity_ceiling,
};
use crate::search::synonyms::SynonymTable;

/// Containment contribution is `CONTAINMENT_SCALE * keyword_len / field_len`,
/// floored at 1.
pub const CONTAINMENT_SCALE: f64 = 10.0;
/// Fuzzy contribution is `similarity * FUZZY_SCALE`.
pub const FUZZY_SCALE: f64 = 5.0;
/// Similarity must exceed this for a fuzzy contribution.
pub const FUZZY_THRESHOLD: f64 = 0.7;
/// Score of every record when the keyword is empty.
pub const MATCH_ALL_SCORE: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub name: f64,
    pub origin_name: f64,
    pub slug: f64,
    pub secondary: f64,
    pub token_bonus: f64,
    pub smart_match_bonus: f64,
    pub exact_bonus: f64,
    pub prefix_bonus: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            name: 3.0,
            origin_name: 2.5,
            slug: 2.0,
            secondary: 1.0,
            token_bonus: 1.0,
            smart_match_bonus: 4.0,
            exact_bonus: 5.0,
            prefix_bonus: 3.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchField {
    Name,
    OriginName,
    Slug,
    /// Country, category, cast, directors and synopsis combined.
    Secondary,
    /// Taxonomy and cast, searched for synonym variants.
    Synonyms,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    Containment,
    Fuzzy,
    Token,
    SmartMatch,
    Exact,
    Prefix,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldContribution {
    pub field: MatchField,
    pub kind: MatchKind,
    pub points: f64,
}

/// A record with its relevance score and the contributions behind it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredCandidate {
    pub record: MovieRecord,
    pub relevance_score: f64,
    pub match_details: Vec<FieldContribution>,
}

impl ScoredCandidate {
    pub fn is_match(&self) -> bool {
        self.relevance_score > 0.0
    }
}

/// A keyword normalized and resolved against the synonym table, reusable
/// across every record of one query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedKeyword {
    keyword: String,
    synonym_variants: Vec<String>,
}

impl PreparedKeyword {
    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    /// Normalized variants of the resolved synonym entry; empty when the
    /// keyword resolves to none.
    pub fn synonym_variants(&self) -> &[String] {
        &self.synonym_variants
    }
}

/// Scores records against a keyword. Cheap to clone; the synonym table is
/// shared.
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    synonyms: Arc<SynonymTable>,
    weights: ScoringWeights,
    normalization: Normalization,
}

impl Default for ScoringEngine {
    fn default() -> Self {
        Self::new(SynonymTable::builtin())
    }
}

impl ScoringEngine {
    pub fn new(synonyms: Arc<SynonymTable>) -> Self {
        Self {
            synonyms,
            weights: ScoringWeights::default(),
            normalization: Normalization::default(),
        }
    }

    pub fn with_weights(mut self, weights: ScoringWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_normalization(mut self, normalization: Normalization) -> Self {
        self.normalization = normalization;
        self
    }

    pub fn synonyms(&self) -> &SynonymTable {
        &self.synonyms
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    pub fn normalization(&self) -> Normalization {
        self.normalization
    }

    /// Normalizes `keyword` and resolves it against the synonym table.
    /// `None` for an empty keyword, which matches everything.
    pub fn prepare(&self, keyword: &str) -> Option<PreparedKeyword> {
        let normalized = self.normalization.apply(keyword);
        if normalized.is_empty() {
            return None;
        }

        let synonym_variants = self
            .synonyms
            .resolve(&normalized, self.normalization)
            .map(|entry| {
                entry
                    .variants
                    .iter()
                    .map(|variant| self.normalization.apply(variant))
                    .filter(|variant| !variant.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Some(PreparedKeyword {
            keyword: normalized,
            synonym_variants,
        })
    }

    /// Relevance of `record` for `keyword`; `0.0` means no match.
    pub fn score(&self, keyword: &str, record: &MovieRecord) -> f64 {
        self.score_prepared(self.prepare(keyword).as_ref(), record)
    }

    pub fn score_detailed(
        &self,
        keyword: &str,
        record: &MovieRecord,
    ) -> ScoredCandidate {
        self.score_detailed_prepared(self.prepare(keyword).as_ref(), record)
    }

    pub fn score_prepared(
        &self,
        keyword: Option<&PreparedKeyword>,
        record: &MovieRecord,
    ) -> f64 {
        match keyword {
            Some(keyword) => total(&self.contributions(keyword, record)),
            None => MATCH_ALL_SCORE,
        }
    }

    /// Scores against a keyword from [`ScoringEngine::prepare`], so a
    /// whole candidate list shares one synonym resolution.
    pub fn score_detailed_prepared(
        &self,
        keyword: Option<&PreparedKeyword>,
        record: &MovieRecord,
    ) -> ScoredCandidate {
        let (relevance_score, match_details) = match keyword {
            Some(keyword) => {
                let contributions = self.contributions(keyword, record);
                (total(&contributions), contributions)
            }
            None => (MATCH_ALL_SCORE, Vec::new()),
        };
        ScoredCandidate {
            record: record.clone(),
            relevance_score,
            match_details,
        }
    }

    fn contributions(
        &self,
        prepared: &PreparedKeyword,
        record: &MovieRecord,
    ) -> Vec<FieldContribution> {
        let normalize = |text: &str| self.normalization.apply(text);
        let keyword = prepared.keyword.as_str();

        let weights = &self.weights;
        let name = normalize(&record.name);
        let origin = normalize(&record.origin_name);
        let slug = normalize(&record.slug);
        let secondary = normalize(&secondary_text(record));

        let fields = [
            (MatchField::Name, &name, weights.name, true),
            (MatchField::OriginName, &origin, weights.origin_name, true),
            (MatchField::Slug, &slug, weights.slug, true),
            (MatchField::Secondary, &secondary, weights.secondary, false),
        ];

        let mut contributions = Vec::new();
        for (field, text, weight, allow_fuzzy) in fields {
            if let Some((kind, raw)) = field_match(keyword, text, allow_fuzzy)
            {
                contributions.push(FieldContribution {
                    field,
                    kind,
                    points: raw * weight,
                });
            }
        }

        for token in keyword.split_whitespace() {
            if name.contains(token) || origin.contains(token) {
                contributions.push(FieldContribution {
                    field: MatchField::Name,
                    kind: MatchKind::Token,
                    points: weights.token_bonus,
                });
            }
        }

        if !prepared.synonym_variants.is_empty() {
            let searchable = normalize(&synonym_text(record));
            let hit = prepared
                .synonym_variants
                .iter()
                .any(|variant| searchable.contains(variant.as_str()));
            if hit {
                contributions.push(FieldContribution {
                    field: MatchField::Synonyms,
                    kind: MatchKind::SmartMatch,
                    points: weights.smart_match_bonus,
                });
            }
        }

        if name == keyword || origin == keyword {
            contributions.push(FieldContribution {
                field: title_field(&name, keyword),
                kind: MatchKind::Exact,
                points: weights.exact_bonus,
            });
        }
        if name.starts_with(keyword) || origin.starts_with(keyword) {
            contributions.push(FieldContribution {
                field: prefix_field(&name, keyword),
                kind: MatchKind::Prefix,
                points: weights.prefix_bonus,
            });
        }

        contributions
    }
}

fn total(contributions: &[FieldContribution]) -> f64 {
    contributions
        .iter()
        .map(|contribution| contribution.points)
        .sum::<f64>()
        .max(0.0)
}

fn title_field(name: &str, keyword: &str) -> MatchField {
    if name == keyword {
        MatchField::Name
    } else {
        MatchField::OriginName
    }
}

fn prefix_field(name: &str, keyword: &str) -> MatchField {
    if name.starts_with(keyword) {
        MatchField::Name
    } else {
        MatchField::OriginName
    }
}

/// Containment first; fuzzy similarity only when containment fails and the
/// field allows it.
fn field_match(
    keyword: &str,
    text: &str,
    allow_fuzzy: bool,
) -> Option<(MatchKind, f64)> {
    if text.is_empty() {
        return None;
    }

    if text.contains(keyword) {
        let ratio = char_len(keyword) as f64 / char_len(text) as f64;
        return Some((
            MatchKind::Containment,
            (CONTAINMENT_SCALE * ratio).max(1.0),
        ));
    }

    if !allow_fuzzy
        || similarity_ceiling(char_len(keyword), char_len(text))
            <= FUZZY_THRESHOLD
    {
        return None;
    }

    let score = similarity(keyword, text);
    (score > FUZZY_THRESHOLD).then_some((MatchKind::Fuzzy, score * FUZZY_SCALE))
}

fn taxa_names(record: &MovieRecord) -> impl Iterator<Item = &str> {
    record
        .country
        .iter()
        .chain(record.category.iter())
        .map(|taxon| taxon.name.as_str())
}

fn secondary_text(record: &MovieRecord) -> String {
    taxa_names(record)
        .chain(record.actors.iter().map(String::as_str))
        .chain(record.directors.iter().map(String::as_str))
        .chain(std::iter::once(record.content.as_str()))
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Taxonomy names and slugs plus cast; what synonym variants are looked up
/// in.
fn synonym_text(record: &MovieRecord) -> String {
    record
        .country
        .iter()
        .chain(record.category.iter())
        .flat_map(|taxon| [taxon.name.as_str(), taxon.slug.as_str()])
        .chain(record.actors.iter().map(String::as_str))
        .chain(record.directors.iter().map(String::as_str))
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> ScoringEngine {
        ScoringEngine::default()
    }

    fn points(candidate: &ScoredCandidate, kind: MatchKind) -> f64 {
        candidate
            .match_details
            .iter()
            .filter(|c| c.kind == kind)
            .map(|c| c.points)
            .sum()
    }

    #[test]
    fn empty_keyword_matches_everything() {
        let record = MovieRecord::new("Anything", "anything");
        assert_eq!(engine().score("", &record), MATCH_ALL_SCORE);
        assert_eq!(engine().score("   ", &record), MATCH_ALL_SCORE);
    }

    #[test]
    fn unrelated_keyword_scores_zero() {
        let record = MovieRecord::new("Mắt Biếc", "mat-biec")
            .with_origin_name("Dreamy Eyes");
        assert_eq!(engine().score("zzzz qqqq", &record), 0.0);
    }

    #[test]
    fn containment_favours_tighter_fields() {
        let short = MovieRecord::new("Batman", "batman");
        let long = MovieRecord::new("Batman Begins Again Forever", "x");
        let short = engine().score_detailed("batman", &short);
        let long = engine().score_detailed("batman", &long);

        let short_name = short
            .match_details
            .iter()
            .find(|c| c.field == MatchField::Name && c.kind == MatchKind::Containment)
            .unwrap();
        // full containment: 10 * 6/6 * name weight 3
        assert_eq!(short_name.points, 30.0);
        assert!(short.relevance_score > long.relevance_score);
    }

    #[test]
    fn containment_is_floored_at_one() {
        let record = MovieRecord::new(
            "a very long title that happens to include x somewhere in it",
            "",
        );
        let candidate = engine().score_detailed("x", &record);
        let name = candidate
            .match_details
            .iter()
            .find(|c| c.field == MatchField::Name)
            .unwrap();
        assert_eq!(name.points, 3.0);
    }

    #[test]
    fn misspelled_title_matches_fuzzily() {
        let record = MovieRecord::new("Interstellar", "interstellar");
        let candidate = engine().score_detailed("intersteller", &record);
        assert!(points(&candidate, MatchKind::Fuzzy) > 0.0);
        assert_eq!(points(&candidate, MatchKind::Containment), 0.0);
    }

    #[test]
    fn secondary_text_is_never_fuzzy_matched() {
        let record = MovieRecord::new("Mắt Biếc", "mat-biec")
            .with_country("Việt Nam", "viet-nam");
        assert_eq!(engine().score("vietnam", &record), 0.0);
    }

    #[test]
    fn exact_match_beats_substring_match() {
        let exact = MovieRecord::new("Parasite", "parasite");
        let partial = MovieRecord::new("Parasite Eve", "parasite-eve");
        let exact_score = engine().score("parasite", &exact);
        let partial_score = engine().score("parasite", &partial);
        assert!(exact_score > partial_score);

        let detailed = engine().score_detailed("parasite", &exact);
        assert_eq!(points(&detailed, MatchKind::Exact), 5.0);
        assert_eq!(points(&detailed, MatchKind::Prefix), 3.0);
    }

    #[test]
    fn tokens_found_in_titles_add_bonus() {
        let record = MovieRecord::new("Người Nhện Xa Nhà", "nguoi-nhen-xa-nha")
            .with_origin_name("Spider-Man: Far From Home");
        let candidate = engine().score_detailed("far home", &record);
        assert_eq!(points(&candidate, MatchKind::Token), 2.0);
    }

    #[test]
    fn synonyms_match_taxonomy_in_other_language() {
        let record = MovieRecord::new("Hạ Cánh Nơi Anh", "ha-canh-noi-anh")
            .with_origin_name("Crash Landing on You")
            .with_country("Korea", "korea");
        let candidate = engine().score_detailed("hàn quốc", &record);
        assert_eq!(points(&candidate, MatchKind::SmartMatch), 4.0);
        assert!(candidate.is_match());
    }

    #[test]
    fn prepared_keyword_scores_like_a_raw_one() {
        let engine = engine();
        let prepared = engine.prepare("  Hàn Quốc ").unwrap();
        assert_eq!(prepared.keyword(), "hàn quốc");
        assert!(prepared.synonym_variants().iter().any(|v| v == "korea"));
        assert!(engine.prepare("   ").is_none());

        let records = [
            MovieRecord::new("Hạ Cánh Nơi Anh", "ha-canh-noi-anh")
                .with_country("Korea", "korea"),
            MovieRecord::new("Batman", "batman"),
        ];
        for record in &records {
            assert_eq!(
                engine.score_prepared(Some(&prepared), record),
                engine.score("hàn quốc", record)
            );
        }
        assert_eq!(engine.score_prepared(None, &records[1]), MATCH_ALL_SCORE);
    }

    #[test]
    fn folding_lets_unaccented_keywords_match() {
        let record = MovieRecord::new("Mắt Biếc", "mat-biec")
            .with_country("Việt Nam", "viet-nam");
        let folding = engine().with_normalization(Normalization::FoldDiacritics);
        assert!(folding.score("viet nam", &record) > 0.0);
        assert_eq!(engine().score("viet nam", &record), 0.0);
        assert!(
            folding.score("mat biec", &record)
                > engine().score("mat biec", &record)
        );
    }

    #[test]
    fn weights_are_configurable() {
        let record = MovieRecord::new("Batman", "");
        let heavy = engine().with_weights(ScoringWeights {
            name: 10.0,
            ..ScoringWeights::default()
        });
        assert!(heavy.score("batman", &record) > engine().score("batman", &record));
    }

    #[test]
    fn negative_weights_never_produce_negative_scores() {
        let record = MovieRecord::new("Batman", "batman");
        let hostile = engine().with_weights(ScoringWeights {
            name: -100.0,
            ..ScoringWeights::default()
        });
        assert_eq!(hostile.score("batman", &record), 0.0);
    }
}
