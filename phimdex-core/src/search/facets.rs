use std::collections::HashSet;

use phimdex_model::{MovieRecord, Taxon};
use serde::Serialize;

/// Distinct taxonomy present in a record set, for filter dropdowns.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Facets {
    pub categories: Vec<Taxon>,
    pub countries: Vec<Taxon>,
    /// Newest first; unknown years (`0`) are left out.
    pub years: Vec<u32>,
}

impl Facets {
    /// Terms are keyed by slug (or by lower-cased name when the slug is
    /// empty) and keep the first spelling seen, in order of appearance.
    pub fn from_records(records: &[MovieRecord]) -> Self {
        let mut categories = TermSet::default();
        let mut countries = TermSet::default();
        let mut years: Vec<u32> = Vec::new();

        for record in records {
            record.category.iter().for_each(|t| categories.insert(t));
            record.country.iter().for_each(|t| countries.insert(t));
            if record.year > 0 && !years.contains(&record.year) {
                years.push(record.year);
            }
        }

        years.sort_unstable_by(|a, b| b.cmp(a));
        Self {
            categories: categories.terms,
            countries: countries.terms,
            years,
        }
    }
}

#[derive(Default)]
struct TermSet {
    seen: HashSet<String>,
    terms: Vec<Taxon>,
}

impl TermSet {
    fn insert(&mut self, taxon: &Taxon) {
        let key = if taxon.slug.is_empty() {
            taxon.name.to_lowercase()
        } else {
            taxon.slug.clone()
        };
        if !key.is_empty() && self.seen.insert(key) {
            self.terms.push(taxon.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_distinct_terms_and_years() {
        let records = vec![
            MovieRecord::new("A", "a")
                .with_year(2019)
                .with_category("Hành Động", "hanh-dong")
                .with_country("Hàn Quốc", "han-quoc"),
            MovieRecord::new("B", "b")
                .with_year(2023)
                .with_category("Hành động", "hanh-dong")
                .with_category("Hài Hước", "hai-huoc"),
            MovieRecord::new("C", "c").with_country("Việt Nam", ""),
        ];

        let facets = Facets::from_records(&records);
        assert_eq!(
            facets.categories,
            vec![
                Taxon::new("Hành Động", "hanh-dong"),
                Taxon::new("Hài Hước", "hai-huoc")
            ]
        );
        assert_eq!(facets.countries.len(), 2);
        assert_eq!(facets.years, vec![2023, 2019]);
    }
}
