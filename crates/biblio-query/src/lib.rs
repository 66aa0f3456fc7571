//! Biblio Query — backend-neutral query AST and the search executor seam.
//!
//! The discovery core never speaks a concrete search engine's DSL. It builds
//! a [`SearchPlan`] — a boolean tree of match / term / range / function-score
//! nodes with boosts, minimum-should-match, a minimum total score, sort and
//! highlight specs — and hands it to a [`SearchExecutor`]. A thin adapter
//! translates the plan for the production inverted-index engine; the
//! [`MemoryIndex`] in this crate evaluates it directly against an in-process
//! document collection, which keeps every ranking rule unit-testable without
//! a live index.
//!
//! # Modules
//!
//! - [`ast`]: query tree nodes
//! - [`plan`]: the executable plan (query + sort + highlight + paging)
//! - [`backend`]: the `SearchExecutor` trait and hit types
//! - [`memory`]: linear-scan reference executor
//! - [`text`]: tokenization and matching primitives shared by the evaluator

pub mod ast;
pub mod backend;
pub mod memory;
pub mod plan;
pub mod text;

pub use ast::{field, BoolQuery, QueryNode};
pub use backend::{SearchExecutor, SearchHit, SearchHits};
pub use memory::MemoryIndex;
pub use plan::{HighlightField, HighlightSpec, SearchPlan, SortOrder, SortSpec};
