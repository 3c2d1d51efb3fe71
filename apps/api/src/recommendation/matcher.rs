//! Lexical matching against the course repository.
//!
//! Two independent modes:
//! - candidate search: any query term as a case-insensitive substring of
//!   title, description or content (`match_candidates`)
//! - title reconciliation: oracle-named titles mapped back to catalog
//!   records by exact, case-insensitive title (`match_titles`)

use std::collections::{BTreeSet, HashSet};

use tracing::debug;

use crate::catalog::repository::{CourseRepository, RepositoryError};
use crate::models::course::CourseRow;

/// A case-insensitive any-of substring pattern.
///
/// Always holds at least one term, and every term is lower-case ASCII
/// alphanumeric, so it can never degrade into a match-everything query and
/// needs no escaping when handed to a storage backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermPattern {
    terms: Vec<String>,
}

impl TermPattern {
    /// Returns `None` when no usable term remains.
    pub fn new(terms: &BTreeSet<String>) -> Option<Self> {
        let terms: Vec<String> = terms
            .iter()
            .filter(|t| !t.is_empty() && t.chars().all(|c| c.is_ascii_alphanumeric()))
            .map(|t| t.to_ascii_lowercase())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        if terms.is_empty() {
            None
        } else {
            Some(Self { terms })
        }
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn matches_text(&self, text: &str) -> bool {
        let text = text.to_lowercase();
        self.terms.iter().any(|t| text.contains(t.as_str()))
    }

    pub fn matches(&self, course: &CourseRow) -> bool {
        self.matches_text(&course.title)
            || self.matches_text(&course.description)
            || self.matches_text(&course.content)
    }
}

/// Builds the candidate set for `terms` with a single repository query.
/// An empty term set yields an empty candidate set without querying.
pub async fn match_candidates(
    terms: &BTreeSet<String>,
    repository: &dyn CourseRepository,
) -> Result<Vec<CourseRow>, RepositoryError> {
    let Some(pattern) = TermPattern::new(terms) else {
        return Ok(Vec::new());
    };

    let candidates = repository.find_matching(&pattern).await?;
    debug!(
        "Lexical match on {:?} found {} candidates",
        pattern.terms(),
        candidates.len()
    );
    Ok(candidates)
}

fn normalize_title(title: &str) -> String {
    title.trim().to_lowercase()
}

/// Catalog courses whose title equals one of `recommendations` after
/// trimming and lower-casing both sides. Result follows repository order.
pub async fn match_titles(
    recommendations: &[String],
    repository: &dyn CourseRepository,
) -> Result<Vec<CourseRow>, RepositoryError> {
    let wanted: HashSet<String> = recommendations.iter().map(|r| normalize_title(r)).collect();
    if wanted.is_empty() {
        return Ok(Vec::new());
    }

    let matched: Vec<CourseRow> = repository
        .find_all()
        .await?
        .into_iter()
        .filter(|course| wanted.contains(&normalize_title(&course.title)))
        .collect();

    debug!(
        "Title reconciliation matched {} of {} recommendations",
        matched.len(),
        wanted.len()
    );
    Ok(matched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recommendation::testing::{course, StubRepository};
    use crate::recommendation::tokenizer::tokenize;

    fn titles(courses: &[CourseRow]) -> Vec<&str> {
        courses.iter().map(|c| c.title.as_str()).collect()
    }

    #[test]
    fn test_pattern_rejects_empty_terms() {
        assert!(TermPattern::new(&BTreeSet::new()).is_none());
        let junk: BTreeSet<String> = ["", "a-b"].iter().map(|s| s.to_string()).collect();
        assert!(TermPattern::new(&junk).is_none());
    }

    #[test]
    fn test_pattern_matches_any_field_case_insensitively() {
        let pattern = TermPattern::new(&tokenize("kubernetes")).unwrap();
        assert!(pattern.matches(&course("Kubernetes in Practice", "", "")));
        assert!(pattern.matches(&course("Ops", "Deploying with KUBERNETES", "")));
        assert!(pattern.matches(&course("Ops", "", "module 3: kubernetes operators")));
        assert!(!pattern.matches(&course("Ops", "Docker", "compose")));
    }

    #[tokio::test]
    async fn test_match_candidates_only_returns_courses_containing_a_term() {
        let repo = StubRepository::new(vec![
            course("Data Science Fundamentals", "statistics and pandas", ""),
            course("Web Dev", "HTML and CSS", ""),
            course("How to Become an Engineer", "career talk", ""),
            course("Poetry", "verse", "no overlap here"),
        ]);
        let terms = tokenize("I want to become a data scientist!");

        let found = match_candidates(&terms, &repo).await.unwrap();

        assert_eq!(
            titles(&found),
            vec!["Data Science Fundamentals", "How to Become an Engineer"]
        );
        let pattern = TermPattern::new(&terms).unwrap();
        assert!(found.iter().all(|c| pattern.matches(c)));
        assert_eq!(repo.matching_calls(), 1);
    }

    #[tokio::test]
    async fn test_match_candidates_empty_terms_never_queries() {
        let repo = StubRepository::new(vec![course("Web Dev", "HTML", "")]);

        let found = match_candidates(&BTreeSet::new(), &repo).await.unwrap();

        assert!(found.is_empty());
        assert_eq!(repo.matching_calls(), 0);
    }

    #[tokio::test]
    async fn test_match_candidates_propagates_repository_error() {
        let repo = StubRepository::failing();
        let err = match_candidates(&tokenize("rust"), &repo).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_match_titles_is_case_insensitive_and_keeps_repository_order() {
        let repo = StubRepository::new(vec![
            course("Intro to AI", "", ""),
            course("Web Dev", "", ""),
        ]);
        let recs = vec!["Intro To AI".to_string(), "bogus course".to_string()];

        let found = match_titles(&recs, &repo).await.unwrap();

        assert_eq!(titles(&found), vec!["Intro to AI"]);
    }

    #[tokio::test]
    async fn test_match_titles_follows_repository_not_recommendation_order() {
        let repo = StubRepository::new(vec![
            course("Algorithms", "", ""),
            course("Databases", "", ""),
            course("Compilers", "", ""),
        ]);
        let recs = vec![
            "  compilers ".to_string(),
            "ALGORITHMS".to_string(),
            "algorithms".to_string(),
        ];

        let found = match_titles(&recs, &repo).await.unwrap();

        assert_eq!(titles(&found), vec!["Algorithms", "Compilers"]);
    }

    #[tokio::test]
    async fn test_match_titles_rejects_partial_titles() {
        let repo = StubRepository::new(vec![course("Intro to AI", "", "")]);
        let found = match_titles(&["Intro".to_string()], &repo).await.unwrap();
        assert!(found.is_empty());
    }
}
