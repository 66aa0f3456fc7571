//! Linear-scan reference executor.
//!
//! [`MemoryIndex`] holds documents in process and evaluates query trees
//! directly, scoring with the same additive boost arithmetic the plan
//! builders assume of the production engine. It backs tests and small
//! deployments; it makes no attempt at sub-linear retrieval.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use biblio_core::{Error, IndexedDocument, Result};

use crate::ast::{field, BoolQuery, QueryNode};
use crate::backend::{SearchExecutor, SearchHit, SearchHits};
use crate::plan::{SearchPlan, SortOrder};
use crate::text;

/// In-process document index.
pub struct MemoryIndex {
    docs: RwLock<HashMap<String, IndexedDocument>>,
    queries: AtomicU64,
}

impl MemoryIndex {
    /// New empty index.
    pub fn new() -> Self {
        Self {
            docs: RwLock::new(HashMap::new()),
            queries: AtomicU64::new(0),
        }
    }

    /// Insert or replace a document.
    pub fn insert(&self, doc: IndexedDocument) {
        if let Ok(mut docs) = self.docs.write() {
            docs.insert(doc.id.clone(), doc);
        }
    }

    /// Insert or replace many documents.
    pub fn insert_many(&self, docs: impl IntoIterator<Item = IndexedDocument>) {
        if let Ok(mut map) = self.docs.write() {
            for doc in docs {
                map.insert(doc.id.clone(), doc);
            }
        }
    }

    /// Remove a document by id.
    pub fn remove(&self, id: &str) {
        if let Ok(mut docs) = self.docs.write() {
            docs.remove(id);
        }
    }

    /// Number of stored documents.
    pub fn len(&self) -> usize {
        self.docs.read().map(|d| d.len()).unwrap_or(0)
    }

    /// Returns `true` if the index holds no documents.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of plans executed so far. Lets callers assert that a code
    /// path never reached the index.
    pub fn query_count(&self) -> u64 {
        self.queries.load(Ordering::Relaxed)
    }

    fn evaluate(node: &QueryNode, doc: &IndexedDocument) -> Option<f32> {
        match node {
            QueryNode::Bool(q) => Self::evaluate_bool(q, doc),
            QueryNode::Match(q) => {
                let query_terms = text::tokenize(&q.text);
                if query_terms.is_empty() {
                    return None;
                }
                let doc_tokens = analyzed_tokens(doc, &q.field);
                let matched = query_terms
                    .iter()
                    .filter(|t| {
                        text::any_token_matches(&doc_tokens, t, q.fuzziness_auto, q.prefix_length)
                    })
                    .count();
                let required = text::required_matches(query_terms.len(), q.minimum_should_match_pct);
                if matched >= required.max(1) {
                    Some(q.boost * matched as f32 / query_terms.len() as f32)
                } else {
                    None
                }
            }
            QueryNode::MatchPhrase(q) => {
                let phrase = text::tokenize(&q.text);
                if phrase.is_empty() {
                    return None;
                }
                let doc_tokens = analyzed_tokens(doc, &q.field);
                if text::phrase_matches(&doc_tokens, &phrase, q.slop) {
                    Some(q.boost)
                } else {
                    None
                }
            }
            QueryNode::MultiMatch(q) => {
                let query_terms = text::tokenize(&q.text);
                if query_terms.is_empty() {
                    return None;
                }
                // Field weights steer production scoring; here all blended
                // fields contribute equally to the matched fraction.
                let mut doc_tokens = Vec::new();
                for (f, _) in &q.fields {
                    doc_tokens.extend(analyzed_tokens(doc, f));
                }
                let matched = query_terms
                    .iter()
                    .filter(|t| text::any_token_matches(&doc_tokens, t, false, 0))
                    .count();
                let required = text::required_matches(query_terms.len(), q.minimum_should_match_pct);
                if matched >= required.max(1) {
                    Some(q.boost * matched as f32 / query_terms.len() as f32)
                } else {
                    None
                }
            }
            QueryNode::Term(q) => {
                if raw_values(doc, &q.field).iter().any(|v| v == &q.value) {
                    Some(q.boost)
                } else {
                    None
                }
            }
            QueryNode::Terms(q) => {
                let values = raw_values(doc, &q.field);
                if q.values.iter().any(|v| values.contains(v)) {
                    Some(q.boost)
                } else {
                    None
                }
            }
            QueryNode::Prefix(q) => {
                let prefix = q.value.to_lowercase();
                if prefix.is_empty() {
                    return None;
                }
                let matched = analyzed_tokens(doc, &q.field)
                    .iter()
                    .any(|t| t.starts_with(&prefix))
                    || raw_values(doc, &q.field)
                        .iter()
                        .any(|v| v.to_lowercase().starts_with(&prefix));
                if matched { Some(q.boost) } else { None }
            }
            QueryNode::Fuzzy(q) => {
                let term = q.value.to_lowercase();
                let matched = analyzed_tokens(doc, &q.field)
                    .iter()
                    .any(|t| text::fuzzy_term_match(&term, t, q.prefix_length));
                if matched { Some(q.boost) } else { None }
            }
            QueryNode::Ids(q) => {
                if q.values.iter().any(|v| v == &doc.id) {
                    Some(q.boost)
                } else {
                    None
                }
            }
            QueryNode::RangeGt(q) => {
                let value = numeric_value(doc, &q.field)?;
                if value > q.value { Some(q.boost) } else { None }
            }
            QueryNode::MoreLikeThis(q) => {
                let terms = significant_terms(&q.like_text, q.min_term_freq, q.max_query_terms);
                if terms.is_empty() {
                    return None;
                }
                let mut doc_tokens = Vec::new();
                for f in &q.fields {
                    doc_tokens.extend(analyzed_tokens(doc, f));
                }
                let matched = terms
                    .iter()
                    .filter(|t| text::any_token_matches(&doc_tokens, t, false, 0))
                    .count();
                let required = text::required_matches(terms.len(), q.minimum_should_match_pct);
                if matched >= required.max(1) {
                    Some(q.boost * matched as f32 / terms.len() as f32)
                } else {
                    None
                }
            }
            QueryNode::FunctionScore(q) => {
                Self::evaluate(&q.filter, doc)?;
                let value = numeric_value(doc, &q.field).unwrap_or(q.missing);
                Some(q.boost * ((value * q.factor).ln_1p()) as f32)
            }
        }
    }

    fn evaluate_bool(q: &BoolQuery, doc: &IndexedDocument) -> Option<f32> {
        let mut score = 0.0f32;
        for clause in &q.must {
            score += Self::evaluate(clause, doc)?;
        }
        for clause in &q.filter {
            Self::evaluate(clause, doc)?;
        }
        for clause in &q.must_not {
            if Self::evaluate(clause, doc).is_some() {
                return None;
            }
        }
        let mut should_matched = 0u32;
        for clause in &q.should {
            if let Some(s) = Self::evaluate(clause, doc) {
                should_matched += 1;
                score += s;
            }
        }
        if should_matched < q.effective_minimum_should_match() {
            return None;
        }
        Some(score * q.boost)
    }

    fn highlight_hit(plan: &SearchPlan, doc: &IndexedDocument) -> HashMap<String, Vec<String>> {
        let Some(spec) = &plan.highlight else {
            return HashMap::new();
        };
        let mut highlights = HashMap::new();
        for hf in &spec.fields {
            let mut terms = Vec::new();
            collect_query_terms(&plan.query, base_field(&hf.field), &mut terms);
            terms.sort_unstable();
            terms.dedup();
            let texts = analyzed_source(doc, &hf.field);
            let mut fragments = Vec::new();
            for source in texts {
                if fragments.len() >= hf.number_of_fragments {
                    break;
                }
                fragments.extend(text::highlight_fragments(
                    &source,
                    &terms,
                    hf.fragment_size,
                    hf.number_of_fragments - fragments.len(),
                    &spec.pre_tag,
                    &spec.post_tag,
                ));
            }
            if !fragments.is_empty() {
                highlights.insert(hf.field.clone(), fragments);
            }
        }
        highlights
    }
}

impl Default for MemoryIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SearchExecutor for MemoryIndex {
    async fn execute(&self, plan: &SearchPlan) -> Result<SearchHits> {
        self.queries.fetch_add(1, Ordering::Relaxed);
        let docs = self
            .docs
            .read()
            .map_err(|_| Error::search("memory index lock poisoned"))?;

        let mut scored: Vec<(f32, IndexedDocument)> = docs
            .values()
            .filter_map(|doc| Self::evaluate(&plan.query, doc).map(|s| (s, doc.clone())))
            .filter(|(s, _)| plan.min_score.is_none_or(|floor| *s >= floor))
            .collect();
        drop(docs);

        sort_hits(&mut scored, plan);

        let total = scored.len() as u64;
        let offset = plan.page.offset();
        let hits = scored
            .into_iter()
            .skip(offset)
            .take(plan.page.size)
            .map(|(score, document)| SearchHit {
                id: document.id.clone(),
                score,
                highlights: Self::highlight_hit(plan, &document),
                document,
            })
            .collect();

        Ok(SearchHits { hits, total })
    }

    async fn fetch(&self, id: &str) -> Result<Option<IndexedDocument>> {
        let docs = self
            .docs
            .read()
            .map_err(|_| Error::search("memory index lock poisoned"))?;
        Ok(docs.get(id).cloned())
    }
}

fn sort_hits(scored: &mut [(f32, IndexedDocument)], plan: &SearchPlan) {
    scored.sort_by(|(score_a, a), (score_b, b)| {
        if plan.sort.is_empty() {
            return score_b
                .total_cmp(score_a)
                .then_with(|| b.created_at.cmp(&a.created_at))
                .then_with(|| a.id.cmp(&b.id));
        }
        for spec in &plan.sort {
            let ord = match spec.field.as_str() {
                "_score" => score_a.total_cmp(score_b),
                field::FILENAME_LOWERCASE => {
                    a.filename.to_lowercase().cmp(&b.filename.to_lowercase())
                }
                field::CONTENT_KEYWORD => a.content.cmp(&b.content),
                field::CREATED_AT => a.created_at.cmp(&b.created_at),
                _ => std::cmp::Ordering::Equal,
            };
            let ord = match spec.order {
                SortOrder::Asc => ord,
                SortOrder::Desc => ord.reverse(),
            };
            if ord != std::cmp::Ordering::Equal {
                return ord;
            }
        }
        a.id.cmp(&b.id)
    });
}

/// First path segment of a field, e.g. `content` for `content.korean`.
fn base_field(path: &str) -> &str {
    path.split('.').next().unwrap_or(path)
}

/// Source strings an analyzed field variant draws tokens from.
fn analyzed_source(doc: &IndexedDocument, field_path: &str) -> Vec<String> {
    if field_path == field::EXTRACTED_METADATA_VALUE {
        return doc.extracted_metadata.values().cloned().collect();
    }
    match base_field(field_path) {
        "content" => vec![doc.content.clone()],
        "filename" => vec![doc.filename.clone()],
        "majors" => doc.majors.iter().cloned().collect(),
        "courseCodes" => doc.course_codes.iter().cloned().collect(),
        "courseLevel" => vec![doc.course_level.clone()],
        "categories" => doc.categories.iter().cloned().collect(),
        "tags" => doc.tags.iter().cloned().collect(),
        "language" => vec![doc.language.clone()],
        _ => Vec::new(),
    }
}

fn analyzed_tokens(doc: &IndexedDocument, field_path: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    for source in analyzed_source(doc, field_path) {
        tokens.extend(text::tokenize(&source));
    }
    tokens
}

/// Exact values a term-level query compares against.
fn raw_values(doc: &IndexedDocument, field_path: &str) -> Vec<String> {
    match field_path {
        field::FILENAME_RAW => vec![doc.filename.clone()],
        field::FILENAME_LOWERCASE => vec![doc.filename.to_lowercase()],
        field::MAJORS => doc.majors.iter().cloned().collect(),
        field::COURSE_CODES => doc.course_codes.iter().cloned().collect(),
        field::COURSE_LEVEL => vec![doc.course_level.clone()],
        field::CATEGORIES => doc.categories.iter().cloned().collect(),
        field::TAGS => doc.tags.iter().cloned().collect(),
        field::LANGUAGE => vec![doc.language.clone()],
        field::USER_ID => vec![doc.user_id.to_string()],
        field::SHARED_WITH => doc.shared_with.iter().map(|u| u.to_string()).collect(),
        field::ID => vec![doc.id.clone()],
        field::DELETED => vec![doc.deleted.to_string()],
        field::SHARING_TYPE => serde_enum_value(&doc.sharing_type),
        field::DOCUMENT_TYPE => serde_enum_value(&doc.document_type),
        field::REPORT_STATUS => doc
            .report_status
            .as_ref()
            .map(serde_enum_value)
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

/// Snake-case wire name of a unit enum variant.
fn serde_enum_value<T: serde::Serialize>(value: &T) -> Vec<String> {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::String(s)) => vec![s],
        _ => Vec::new(),
    }
}

fn numeric_value(doc: &IndexedDocument, field_path: &str) -> Option<f64> {
    match field_path {
        field::RECOMMENDATION_COUNT => Some(doc.recommendation_count as f64),
        field::FAVORITE_COUNT => Some(doc.favorite_count as f64),
        "fileSize" => Some(doc.file_size as f64),
        "currentVersion" => Some(f64::from(doc.current_version)),
        _ => None,
    }
}

/// Significant terms of a reference text: tokens occurring at least
/// `min_term_freq` times, most frequent first, capped at `max_terms`.
fn significant_terms(like_text: &str, min_term_freq: u32, max_terms: usize) -> Vec<String> {
    let mut freq: HashMap<String, u32> = HashMap::new();
    for token in text::tokenize(like_text) {
        *freq.entry(token).or_insert(0) += 1;
    }
    let mut terms: Vec<(String, u32)> = freq
        .into_iter()
        .filter(|(_, n)| *n >= min_term_freq)
        .collect();
    terms.sort_by(|(ta, na), (tb, nb)| nb.cmp(na).then_with(|| ta.cmp(tb)));
    terms.truncate(max_terms);
    terms.into_iter().map(|(t, _)| t).collect()
}

/// Collect query tokens that target `base` (for highlighting).
fn collect_query_terms(node: &QueryNode, base: &str, out: &mut Vec<String>) {
    match node {
        QueryNode::Bool(q) => {
            for clause in q.must.iter().chain(&q.should).chain(&q.filter) {
                collect_query_terms(clause, base, out);
            }
        }
        QueryNode::Match(q) => {
            if base_field(&q.field) == base {
                out.extend(text::tokenize(&q.text));
            }
        }
        QueryNode::MatchPhrase(q) => {
            if base_field(&q.field) == base {
                out.extend(text::tokenize(&q.text));
            }
        }
        QueryNode::MultiMatch(q) => {
            if q.fields.iter().any(|(f, _)| base_field(f) == base) {
                out.extend(text::tokenize(&q.text));
            }
        }
        QueryNode::Prefix(q) => {
            if base_field(&q.field) == base {
                out.push(q.value.to_lowercase());
            }
        }
        QueryNode::Fuzzy(q) => {
            if base_field(&q.field) == base {
                out.push(q.value.to_lowercase());
            }
        }
        QueryNode::FunctionScore(q) => collect_query_terms(&q.filter, base, out),
        QueryNode::Term(_)
        | QueryNode::Terms(_)
        | QueryNode::Ids(_)
        | QueryNode::RangeGt(_)
        | QueryNode::MoreLikeThis(_) => {}
    }
}

// ============================================================================
// Tests
// ============================================================================
