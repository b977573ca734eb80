//! Search index over the record corpus.
//!
//! One [`SearchDocument`] is derived per record: a map from logical
//! queryable attribute to the comma-joined payloads reachable through
//! that attribute's registered paths, translated per the record's own
//! standard. Documents are never stored; they are rebuilt from forms.
//!
//! The index holds immutable generations. [`SearchIndex::rebuild`] scans
//! the full corpus, builds token postings over the default (`AnyText`)
//! field, and swaps the new generation in atomically. Rebuilds serialize
//! against each other; readers are never blocked and finish their query
//! against whichever generation they started with.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};
use std::time::Instant;

use serde::{Deserialize, Serialize};

use meridian_core::{RecordId, RecordStore, StoredRecord};

use crate::error::{CatalogError, Result};
use crate::metrics::record_index_rebuild;
use crate::queryable::{QueryableRegistry, QUERYABLE_ATTRIBUTES};

/// The derived search representation of one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchDocument {
    /// Record identifier.
    pub id: RecordId,
    /// Record title.
    pub title: String,
    /// Queryable attribute name to comma-joined payloads.
    pub fields: BTreeMap<String, String>,
}

impl SearchDocument {
    /// Builds the document for a stored record.
    #[must_use]
    pub fn build(record: &StoredRecord, queryables: &QueryableRegistry) -> Self {
        let mut fields = BTreeMap::new();
        for attribute in QUERYABLE_ATTRIBUTES {
            let Some(paths) = queryables.paths(record.standard, attribute) else {
                continue;
            };
            let payloads: Vec<&str> = paths
                .iter()
                .flat_map(|path| record.form.leaf_payloads_at(path))
                .collect();
            if !payloads.is_empty() {
                fields.insert(attribute.to_string(), payloads.join(", "));
            }
        }
        Self {
            id: record.id.clone(),
            title: record.form.title.clone(),
            fields,
        }
    }

    fn any_text(&self) -> String {
        let mut text = self.title.to_lowercase();
        if let Some(any) = self.fields.get("AnyText") {
            text.push(' ');
            text.push_str(&any.to_lowercase());
        }
        text
    }
}

/// One parsed free-text query term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryTerm {
    /// A single word, matched against the token postings.
    Word(String),
    /// A quoted phrase, matched as a substring of the default field.
    Phrase(String),
}

/// Comparison operator for a field constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldOp {
    /// Case-insensitive equality against any comma-joined segment.
    Equals,
    /// Case-insensitive pattern match; `%` matches any run of characters.
    Like,
}

/// The index's compiled query form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexQuery {
    /// Matches every document.
    MatchAll,
    /// All terms must match the default field.
    Text(Vec<QueryTerm>),
    /// A constraint on one queryable attribute.
    Field {
        /// Logical attribute name.
        attribute: String,
        /// Comparison operator.
        op: FieldOp,
        /// Comparison value or pattern.
        value: String,
    },
    /// Every branch must match.
    And(Vec<IndexQuery>),
    /// At least one branch must match.
    Or(Vec<IndexQuery>),
}

impl IndexQuery {
    /// Parses a free-text query string (words and quoted phrases).
    ///
    /// An empty string matches everything.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::BadQuery`] for unterminated or empty
    /// phrases.
    pub fn parse_text(input: &str) -> Result<Self> {
        let mut terms = Vec::new();
        let mut chars = input.chars().peekable();
        while let Some(&c) = chars.peek() {
            if c.is_whitespace() {
                chars.next();
            } else if c == '"' {
                chars.next();
                let mut phrase = String::new();
                let mut closed = false;
                for next in chars.by_ref() {
                    if next == '"' {
                        closed = true;
                        break;
                    }
                    phrase.push(next);
                }
                if !closed {
                    return Err(CatalogError::bad_query(format!(
                        "unterminated phrase in '{input}'"
                    )));
                }
                if phrase.trim().is_empty() {
                    return Err(CatalogError::bad_query("empty phrase"));
                }
                terms.push(QueryTerm::Phrase(phrase.to_lowercase()));
            } else {
                let mut word = String::new();
                while let Some(&next) = chars.peek() {
                    if next.is_whitespace() || next == '"' {
                        break;
                    }
                    word.push(next);
                    chars.next();
                }
                terms.push(QueryTerm::Word(word.to_lowercase()));
            }
        }
        if terms.is_empty() {
            Ok(Self::MatchAll)
        } else {
            Ok(Self::Text(terms))
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortOrder {
    /// Smallest value first.
    Ascending,
    /// Largest value first.
    Descending,
}

/// An explicit sort key over a queryable attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    /// Logical attribute to sort by.
    pub attribute: String,
    /// Sort direction.
    pub order: SortOrder,
}

/// The outcome of a search: total match count and one page of ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHits {
    /// Number of documents matching the query, before pagination.
    pub total: usize,
    /// The requested page of record ids.
    pub ids: Vec<RecordId>,
}

#[derive(Debug, Default)]
struct Generation {
    documents: BTreeMap<RecordId, SearchDocument>,
    /// Token to (record, term frequency) postings over the default field.
    postings: HashMap<String, HashMap<RecordId, u32>>,
    /// Lowercased default field per record, for phrase matches.
    any_text: HashMap<RecordId, String>,
}

impl Generation {
    fn build(records: &[StoredRecord], queryables: &QueryableRegistry) -> Self {
        let mut generation = Self::default();
        for record in records {
            let document = SearchDocument::build(record, queryables);
            let text = document.any_text();
            for token in tokenize(&text) {
                *generation
                    .postings
                    .entry(token)
                    .or_default()
                    .entry(record.id.clone())
                    .or_insert(0) += 1;
            }
            generation.any_text.insert(record.id.clone(), text);
            generation.documents.insert(record.id.clone(), document);
        }
        generation
    }

    /// Returns the relevance score of `id` against `query`, or `None`
    /// when the document does not match.
    fn evaluate(&self, query: &IndexQuery, id: &RecordId) -> Option<u32> {
        match query {
            IndexQuery::MatchAll => Some(0),
            IndexQuery::Text(terms) => {
                let mut score = 0;
                for term in terms {
                    let count = match term {
                        QueryTerm::Word(word) => self
                            .postings
                            .get(word)
                            .and_then(|postings| postings.get(id))
                            .copied()
                            .unwrap_or(0),
                        QueryTerm::Phrase(phrase) => {
                            let text = self.any_text.get(id).map_or("", String::as_str);
                            u32::try_from(text.matches(phrase.as_str()).count()).unwrap_or(u32::MAX)
                        }
                    };
                    if count == 0 {
                        return None;
                    }
                    score += count;
                }
                Some(score)
            }
            IndexQuery::Field {
                attribute,
                op,
                value,
            } => {
                let document = self.documents.get(id)?;
                let field = document.fields.get(attribute)?;
                let matched = match op {
                    FieldOp::Equals => field
                        .split(", ")
                        .any(|segment| segment.eq_ignore_ascii_case(value)),
                    FieldOp::Like => like_match(&field.to_lowercase(), &value.to_lowercase()),
                };
                matched.then_some(0)
            }
            IndexQuery::And(branches) => {
                let mut score = 0;
                for branch in branches {
                    score += self.evaluate(branch, id)?;
                }
                Some(score)
            }
            IndexQuery::Or(branches) => branches
                .iter()
                .filter_map(|branch| self.evaluate(branch, id))
                .max(),
        }
    }
}

/// Matches `text` against a `%`-wildcard pattern (both lowercased).
fn like_match(text: &str, pattern: &str) -> bool {
    let pieces: Vec<&str> = pattern.split('%').collect();
    let mut position = 0;
    for (index, piece) in pieces.iter().enumerate() {
        if piece.is_empty() {
            continue;
        }
        match text[position..].find(piece) {
            Some(found) => {
                // Without a leading wildcard the first piece must anchor
                // at the start; without a trailing one, at the end.
                if index == 0 && found != 0 {
                    return false;
                }
                position += found + piece.len();
            }
            None => return false,
        }
    }
    if let Some(last) = pieces.last() {
        if !last.is_empty() && !text.ends_with(last) {
            return false;
        }
    }
    true
}

fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// The searchable view of the corpus.
///
/// Shared across concurrently running worker requests; all methods take
/// `&self`.
#[derive(Debug)]
pub struct SearchIndex {
    current: RwLock<Arc<Generation>>,
    rebuild_guard: tokio::sync::Mutex<()>,
}

impl Default for SearchIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchIndex {
    /// Creates an index with an empty generation.
    #[must_use]
    pub fn new() -> Self {
        Self {
            current: RwLock::new(Arc::new(Generation::default())),
            rebuild_guard: tokio::sync::Mutex::new(()),
        }
    }

    /// Rebuilds the index from the full corpus and swaps the new
    /// generation in. Returns the number of documents indexed.
    ///
    /// Rebuilds are exclusive against each other but never block
    /// concurrent searches, which keep reading the previous generation.
    ///
    /// # Errors
    ///
    /// Returns an error if the corpus cannot be listed.
    pub async fn rebuild(
        &self,
        store: &dyn RecordStore,
        queryables: &QueryableRegistry,
    ) -> Result<usize> {
        let _exclusive = self.rebuild_guard.lock().await;
        let started = Instant::now();
        let records = store.list().await?;
        let generation = Generation::build(&records, queryables);
        let count = generation.documents.len();

        let mut current = self.current.write().map_err(|_| {
            CatalogError::from(meridian_core::Error::internal("index lock poisoned"))
        })?;
        *current = Arc::new(generation);
        drop(current);

        record_index_rebuild(count as u64, started.elapsed().as_secs_f64());
        tracing::info!(documents = count, "search index rebuilt");
        Ok(count)
    }

    fn snapshot(&self) -> Arc<Generation> {
        self.current
            .read()
            .map(|generation| Arc::clone(&generation))
            .unwrap_or_default()
    }

    /// Executes a query, returning the total match count and the
    /// requested page of ids.
    ///
    /// Without a sort key, results are ranked by relevance (descending
    /// term frequency); ties and all sorted queries break ties by id so
    /// pagination is stable.
    #[must_use]
    pub fn search(
        &self,
        query: &IndexQuery,
        sort: Option<&SortKey>,
        offset: usize,
        limit: usize,
    ) -> SearchHits {
        let generation = self.snapshot();
        let mut matches: Vec<(&RecordId, u32)> = generation
            .documents
            .keys()
            .filter_map(|id| generation.evaluate(query, id).map(|score| (id, score)))
            .collect();

        match sort {
            Some(key) => {
                matches.sort_by(|(a, _), (b, _)| {
                    let left = field_of(&generation, a, &key.attribute);
                    let right = field_of(&generation, b, &key.attribute);
                    let ordering = left.cmp(&right).then_with(|| a.cmp(b));
                    match key.order {
                        SortOrder::Ascending => ordering,
                        SortOrder::Descending => ordering.reverse(),
                    }
                });
            }
            None => {
                matches.sort_by(|(a, sa), (b, sb)| sb.cmp(sa).then_with(|| a.cmp(b)));
            }
        }

        let total = matches.len();
        let ids = matches
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|(id, _)| id.clone())
            .collect();
        SearchHits { total, ids }
    }

    /// Returns the current generation's document for a record.
    #[must_use]
    pub fn document(&self, id: &RecordId) -> Option<SearchDocument> {
        self.snapshot().documents.get(id).cloned()
    }

    /// Number of documents in the current generation.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshot().documents.len()
    }

    /// Whether the current generation is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn field_of<'g>(generation: &'g Generation, id: &RecordId, attribute: &str) -> &'g str {
    generation
        .documents
        .get(id)
        .and_then(|document| document.fields.get(attribute))
        .map_or("", String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use meridian_core::{Form, MemoryStore, Path, Standard};

    fn dc_record(id: &str, title: &str, subject: &str, date: &str) -> StoredRecord {
        let mut form = Form::new(title);
        let root = form
            .push_node(None, Path::parse("Record").unwrap(), "Record")
            .unwrap();
        form.push_leaf(Some(root), Path::parse("title").unwrap(), "CharacterString", title)
            .unwrap();
        form.push_leaf(
            Some(root),
            Path::parse("subject").unwrap(),
            "CharacterString",
            subject,
        )
        .unwrap();
        form.push_leaf(Some(root), Path::parse("date").unwrap(), "Date", date)
            .unwrap();
        StoredRecord {
            id: RecordId::new(id).unwrap(),
            standard: Standard::DublinCore,
            form,
        }
    }

    async fn seeded_index() -> (SearchIndex, MemoryStore, QueryableRegistry) {
        let store = MemoryStore::new();
        store
            .put(dc_record("r2020", "Lake Survey 2020", "lakes", "2020-05-01"))
            .await
            .unwrap();
        store
            .put(dc_record("r2021", "Lake Survey 2021", "lakes", "2021-05-01"))
            .await
            .unwrap();
        store
            .put(dc_record("atlas", "River Atlas", "rivers", "2019-01-01"))
            .await
            .unwrap();

        let queryables = QueryableRegistry::bundled();
        let index = SearchIndex::new();
        index.rebuild(&store, &queryables).await.unwrap();
        (index, store, queryables)
    }

    #[tokio::test]
    async fn free_text_search_matches_and_counts() {
        let (index, _store, _queryables) = seeded_index().await;
        let query = IndexQuery::parse_text("Lake").unwrap();
        let hits = index.search(&query, None, 0, 10);
        assert_eq!(hits.total, 2);
    }

    #[tokio::test]
    async fn pagination_with_sort_by_date() {
        let (index, _store, _queryables) = seeded_index().await;
        let query = IndexQuery::parse_text("Lake").unwrap();

        let ascending = SortKey {
            attribute: "Modified".into(),
            order: SortOrder::Ascending,
        };
        let hits = index.search(&query, Some(&ascending), 0, 1);
        assert_eq!(hits.total, 2);
        assert_eq!(hits.ids[0].as_str(), "r2020");

        let descending = SortKey {
            attribute: "Modified".into(),
            order: SortOrder::Descending,
        };
        let hits = index.search(&query, Some(&descending), 0, 1);
        assert_eq!(hits.ids[0].as_str(), "r2021");
    }

    #[tokio::test]
    async fn phrase_queries_match_substrings() {
        let (index, _store, _queryables) = seeded_index().await;
        let query = IndexQuery::parse_text("\"lake survey 2021\"").unwrap();
        let hits = index.search(&query, None, 0, 10);
        assert_eq!(hits.total, 1);
        assert_eq!(hits.ids[0].as_str(), "r2021");
    }

    #[tokio::test]
    async fn field_constraints_evaluate() {
        let (index, _store, _queryables) = seeded_index().await;
        let query = IndexQuery::Field {
            attribute: "Subject".into(),
            op: FieldOp::Equals,
            value: "rivers".into(),
        };
        let hits = index.search(&query, None, 0, 10);
        assert_eq!(hits.total, 1);
        assert_eq!(hits.ids[0].as_str(), "atlas");

        let like = IndexQuery::Field {
            attribute: "Title".into(),
            op: FieldOp::Like,
            value: "%survey%".into(),
        };
        assert_eq!(index.search(&like, None, 0, 10).total, 2);
    }

    #[tokio::test]
    async fn boolean_combinators() {
        let (index, _store, _queryables) = seeded_index().await;
        let query = IndexQuery::And(vec![
            IndexQuery::parse_text("survey").unwrap(),
            IndexQuery::Field {
                attribute: "Subject".into(),
                op: FieldOp::Equals,
                value: "lakes".into(),
            },
        ]);
        assert_eq!(index.search(&query, None, 0, 10).total, 2);

        let either = IndexQuery::Or(vec![
            IndexQuery::parse_text("atlas").unwrap(),
            IndexQuery::parse_text("\"survey 2020\"").unwrap(),
        ]);
        assert_eq!(index.search(&either, None, 0, 10).total, 2);
    }

    #[tokio::test]
    async fn rebuild_reflects_new_records() {
        let (index, store, queryables) = seeded_index().await;
        store
            .put(dc_record("bay", "Bay Soundings", "bays", "2022-03-01"))
            .await
            .unwrap();

        // Not visible until the next rebuild.
        let query = IndexQuery::parse_text("soundings").unwrap();
        assert_eq!(index.search(&query, None, 0, 10).total, 0);

        index.rebuild(&store, &queryables).await.unwrap();
        assert_eq!(index.search(&query, None, 0, 10).total, 1);
    }

    #[test]
    fn bad_queries_are_structured_errors() {
        assert!(matches!(
            IndexQuery::parse_text("\"unterminated"),
            Err(CatalogError::BadQuery { .. })
        ));
        assert!(matches!(
            IndexQuery::parse_text("\"  \""),
            Err(CatalogError::BadQuery { .. })
        ));
    }

    #[test]
    fn empty_query_matches_all() {
        assert_eq!(IndexQuery::parse_text("").unwrap(), IndexQuery::MatchAll);
    }

    #[test]
    fn like_match_wildcards() {
        assert!(like_match("lake survey 2020", "%survey%"));
        assert!(like_match("lake survey 2020", "lake%"));
        assert!(like_match("lake survey 2020", "%2020"));
        assert!(!like_match("lake survey 2020", "river%"));
        assert!(!like_match("lake survey 2020", "%2021"));
    }
}
