//! Full-text mirror of the issue store.
//!
//! One tantivy document per issue, document id = relational id. Scalar and
//! enum fields are indexed; the whole record is kept in a stored-only
//! `source` field so search results can be materialized without touching the
//! relational store. The attachment blob travels opaquely inside `source`
//! and is never tokenized.

use std::path::Path;
use std::sync::Mutex;

use tantivy::collector::{Count, TopDocs};
use tantivy::directory::MmapDirectory;
use tantivy::query::{QueryParser, TermQuery};
use tantivy::schema::{
    Field, IndexRecordOption, Schema, Value, FAST, INDEXED, STORED, STRING, TEXT,
};
use tantivy::{Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument, Term};

use crate::error::{AppError, AppResult};
use crate::models::Issue;
use crate::pagination::PageRequest;

/// Schema fields of the issue index
struct IssueFields {
    id: Field,
    name: Field,
    description: Field,
    comment: Field,
    state: Field,
    priority: Field,
    created: Field,
    source: Field,
}

fn issue_schema() -> (Schema, IssueFields) {
    let mut builder = Schema::builder();
    let fields = IssueFields {
        id: builder.add_i64_field("id", INDEXED | STORED | FAST),
        name: builder.add_text_field("name", TEXT),
        description: builder.add_text_field("description", TEXT),
        comment: builder.add_text_field("comment", TEXT),
        // raw tokens so `state:OPEN` style terms match exactly
        state: builder.add_text_field("state", STRING),
        priority: builder.add_text_field("priority", STRING),
        created: builder.add_text_field("created", STRING),
        source: builder.add_text_field("source", STORED),
    };
    (builder.build(), fields)
}

/// Search index adapter for issues
pub struct IssueSearchIndex {
    index: Index,
    writer: Mutex<IndexWriter>,
    reader: IndexReader,
    fields: IssueFields,
}

impl IssueSearchIndex {
    /// Opens (or creates) the on-disk index under the given directory
    pub fn open(dir: &Path, writer_heap_bytes: usize) -> AppResult<Self> {
        std::fs::create_dir_all(dir)
            .map_err(|e| AppError::Internal(format!("Failed to create index dir: {}", e)))?;

        let (schema, _) = issue_schema();
        let directory = MmapDirectory::open(dir).map_err(tantivy::TantivyError::from)?;
        let index = Index::open_or_create(directory, schema)?;

        Self::from_index(index, writer_heap_bytes)
    }

    /// Creates a RAM-backed index, used by tests
    pub fn in_memory() -> AppResult<Self> {
        let (schema, _) = issue_schema();
        let index = Index::create_in_ram(schema);

        Self::from_index(index, 15_000_000)
    }

    fn from_index(index: Index, writer_heap_bytes: usize) -> AppResult<Self> {
        let (_, fields) = issue_schema();
        let writer = index.writer(writer_heap_bytes)?;
        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()?;

        Ok(Self {
            index,
            writer: Mutex::new(writer),
            reader,
            fields,
        })
    }

    /// Upserts an issue document, replacing any existing document with the
    /// same id
    pub fn index(&self, issue: &Issue) -> AppResult<()> {
        let id = issue
            .id
            .ok_or_else(|| AppError::Internal("Cannot index an issue without an id".to_string()))?;
        let source = serde_json::to_string(issue)
            .map_err(|e| AppError::Internal(format!("Failed to serialize issue {}: {}", id, e)))?;

        let mut document = TantivyDocument::default();
        document.add_i64(self.fields.id, id);
        document.add_text(self.fields.name, &issue.name);
        document.add_text(self.fields.description, &issue.description);
        document.add_text(self.fields.created, issue.created.to_string());
        document.add_text(self.fields.source, source);
        if let Some(comment) = &issue.comment {
            document.add_text(self.fields.comment, comment);
        }
        if let Some(state) = issue.state {
            document.add_text(self.fields.state, state.as_str());
        }
        if let Some(priority) = issue.priority {
            document.add_text(self.fields.priority, priority.as_str());
        }

        let mut writer = self.lock_writer()?;
        writer.delete_term(Term::from_field_i64(self.fields.id, id));
        writer.add_document(document)?;
        writer.commit()?;
        drop(writer);

        self.reader.reload()?;
        Ok(())
    }

    /// Removes the document with the given id, if present
    pub fn delete_by_id(&self, id: i64) -> AppResult<()> {
        let mut writer = self.lock_writer()?;
        writer.delete_term(Term::from_field_i64(self.fields.id, id));
        writer.commit()?;
        drop(writer);

        self.reader.reload()?;
        Ok(())
    }

    /// Whether a document with the given id exists in the index
    pub fn exists_by_id(&self, id: i64) -> AppResult<bool> {
        let searcher = self.reader.searcher();
        let query = TermQuery::new(
            Term::from_field_i64(self.fields.id, id),
            IndexRecordOption::Basic,
        );
        let count = searcher.search(&query, &Count)?;

        Ok(count > 0)
    }

    /// Runs a free-text query against the index
    ///
    /// The query grammar is tantivy's: bare terms match across name,
    /// description and comment; `field:value` terms reach any indexed field.
    /// Results are relevance-ordered. Returns (issues, total_count).
    pub fn search(&self, query: &str, page: &PageRequest) -> AppResult<(Vec<Issue>, i64)> {
        let searcher = self.reader.searcher();
        let parser = QueryParser::for_index(
            &self.index,
            vec![self.fields.name, self.fields.description, self.fields.comment],
        );
        let parsed = parser
            .parse_query(query)
            .map_err(|e| AppError::Query(e.to_string()))?;

        let limit = page.limit() as usize;
        let offset = page.offset() as usize;
        let (top_docs, total_count) = searcher.search(
            &parsed,
            &(TopDocs::with_limit(limit).and_offset(offset), Count),
        )?;

        let mut issues = Vec::with_capacity(top_docs.len());
        for (_score, address) in top_docs {
            let document: TantivyDocument = searcher.doc(address)?;
            let source = document
                .get_first(self.fields.source)
                .and_then(|value| value.as_str())
                .ok_or_else(|| {
                    AppError::Internal("Indexed document is missing its source field".to_string())
                })?;
            let issue: Issue = serde_json::from_str(source).map_err(|e| {
                AppError::Internal(format!("Failed to deserialize indexed issue: {}", e))
            })?;
            issues.push(issue);
        }

        Ok((issues, total_count as i64))
    }

    /// Drops every document, used before an index rebuild
    pub fn clear(&self) -> AppResult<()> {
        let mut writer = self.lock_writer()?;
        writer.delete_all_documents()?;
        writer.commit()?;
        drop(writer);

        self.reader.reload()?;
        Ok(())
    }

    fn lock_writer(&self) -> AppResult<std::sync::MutexGuard<'_, IndexWriter>> {
        self.writer
            .lock()
            .map_err(|_| AppError::Internal("Search index writer lock poisoned".to_string()))
    }
}
