//! Embedded backend storing the index on local disk with Tantivy.

mod analyzer;
mod fuzzy;
mod ranges;
mod schema;

use std::{
    collections::HashSet,
    fs, mem,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard},
};

use serde_json::json;
use sift_highlight::language_color;
use tantivy::{
    DocAddress, Index, IndexReader, IndexWriter, Order, ReloadPolicy, Searcher, TantivyDocument,
    TantivyError, Term,
    aggregation::{AggregationCollector, AggregationLimits, agg_req::Aggregations},
    collector::{Count, TopDocs},
    directory::MmapDirectory,
    query::{BooleanQuery, Occur, Query, TermQuery},
    schema::{IndexRecordOption, Value},
    tokenizer::TextAnalyzer,
};
use tracing::{debug, info};

use self::{
    analyzer::{CODE_TOKENIZER, build_analyzer, query_terms},
    fuzzy::FuzzyMatcher,
    ranges::extract_match_ranges,
    schema::{CodeSchema, names},
};
use crate::{
    batch::{BatchPlanner, BulkOp},
    changeset::Changeset,
    document::CodeDocument,
    error::IndexError,
    id::DocumentId,
    indexer::{
        Indexer, LANGUAGE_AGG, LanguageFacet, RawSearchResult, SearchHits, SearchQuery,
        parse_language_facets,
    },
    source::BlobSource,
};

/// Heap size for the index writer (50 MB).
const WRITER_HEAP_SIZE: usize = 50_000_000;

/// Writer lifecycle. Tantivy allows one writer per directory, so it is only created when a
/// write needs it.
enum WriterSlot {
    /// No write has happened yet.
    Idle,
    /// The writer and its directory lock.
    Open(IndexWriter),
    /// Closed; further writes fail.
    Closed,
}

/// Tantivy-backed [`Indexer`].
pub struct TantivyIndexer {
    /// Directory holding the index.
    path: PathBuf,
    /// Schema with field handles.
    schema: CodeSchema,
    /// The opened index.
    index: Index,
    /// Reader, reloaded after every commit and before every search.
    reader: IndexReader,
    /// Writer, created on first write.
    writer: Mutex<WriterSlot>,
    /// Tokenizer used for content and keywords.
    analyzer: TextAnalyzer,
    /// Fuzzy expansion of keyword terms.
    fuzzy: FuzzyMatcher,
    /// Changeset to bulk operation planning.
    planner: BatchPlanner,
}

impl TantivyIndexer {
    /// Opens the index at `path`, creating it if needed.
    ///
    /// Returns the indexer and whether the index already existed. Opening only reads, so any
    /// number of indexers may share a directory. The directory lock is taken by the first write.
    pub fn open(path: &Path, planner: BatchPlanner) -> Result<(Self, bool), IndexError> {
        let schema = CodeSchema::new();
        fs::create_dir_all(path)?;

        let dir = MmapDirectory::open(path).map_err(|e| {
            let err: TantivyError = e.into();
            IndexError::open_index(path.to_path_buf(), &err)
        })?;
        let existed = Index::exists(&dir).map_err(|e| {
            let err: TantivyError = e.into();
            IndexError::open_index(path.to_path_buf(), &err)
        })?;

        let index = Index::open_or_create(dir, schema.schema().clone())
            .map_err(|e| IndexError::open_index(path.to_path_buf(), &e))?;

        let analyzer = build_analyzer();
        index.tokenizers().register(CODE_TOKENIZER, analyzer.clone());

        let reader: IndexReader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()
            .map_err(|e| IndexError::open_index(path.to_path_buf(), &e))?;

        if existed {
            debug!(path = %path.display(), "opened existing index");
        } else {
            info!(path = %path.display(), "created index");
        }

        Ok((
            Self {
                path: path.to_path_buf(),
                schema,
                index,
                reader,
                writer: Mutex::new(WriterSlot::Idle),
                analyzer,
                fuzzy: FuzzyMatcher::new(),
                planner,
            },
            existed,
        ))
    }

    /// Returns the index directory.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the number of committed documents.
    pub fn num_docs(&self) -> u64 {
        self.reader.searcher().num_docs()
    }

    /// Locks the writer.
    fn writer(&self) -> Result<MutexGuard<'_, WriterSlot>, IndexError> {
        self.writer
            .lock()
            .map_err(|_| IndexError::Write(String::from("index writer lock poisoned")))
    }

    /// Runs `stage` against the writer, then commits and reloads the reader.
    ///
    /// The writer is created on first use. Staged changes are rolled back if `stage` fails.
    fn write_batch<F>(&self, stage: F) -> Result<(), IndexError>
    where
        F: FnOnce(&mut IndexWriter, &CodeSchema) -> Result<(), IndexError>,
    {
        let mut guard = self.writer()?;
        if matches!(*guard, WriterSlot::Idle) {
            let writer = self
                .index
                .writer(WRITER_HEAP_SIZE)
                .map_err(|e| IndexError::write(&e))?;
            debug!(path = %self.path.display(), "acquired index writer");
            *guard = WriterSlot::Open(writer);
        }
        let WriterSlot::Open(writer) = &mut *guard else {
            return Err(IndexError::Write(String::from("index is closed")));
        };

        if let Err(e) = stage(writer, &self.schema) {
            writer.rollback().map_err(|e| IndexError::commit(&e))?;
            return Err(e);
        }
        writer.commit().map_err(|e| IndexError::commit(&e))?;
        self.reader.reload().map_err(|e| IndexError::commit(&e))?;
        Ok(())
    }

    /// Builds the document query, or `None` when the keyword has no searchable terms.
    fn compile(
        &self,
        matched_terms: &HashSet<String>,
        repo_ids: &[i64],
        language: Option<&str>,
    ) -> Option<BooleanQuery> {
        let content: Vec<(Occur, Box<dyn Query>)> = matched_terms
            .iter()
            .map(|term| {
                let term = Term::from_field_text(self.schema.content, term);
                let query: Box<dyn Query> =
                    Box::new(TermQuery::new(term, IndexRecordOption::WithFreqs));
                (Occur::Should, query)
            })
            .collect();
        if content.is_empty() {
            return None;
        }

        let mut clauses: Vec<(Occur, Box<dyn Query>)> =
            vec![(Occur::Must, Box::new(BooleanQuery::new(content)))];

        if !repo_ids.is_empty() {
            let repos: Vec<(Occur, Box<dyn Query>)> = repo_ids
                .iter()
                .map(|&id| {
                    let term = Term::from_field_i64(self.schema.repo_id, id);
                    let query: Box<dyn Query> =
                        Box::new(TermQuery::new(term, IndexRecordOption::Basic));
                    (Occur::Should, query)
                })
                .collect();
            clauses.push((Occur::Must, Box::new(BooleanQuery::new(repos))));
        }

        if let Some(language) = language {
            let term = Term::from_field_text(self.schema.language, language);
            clauses.push((
                Occur::Must,
                Box::new(TermQuery::new(term, IndexRecordOption::Basic)),
            ));
        }

        Some(BooleanQuery::new(clauses))
    }

    /// Builds the language terms aggregation collector.
    fn facet_collector(limit: usize) -> Result<AggregationCollector, IndexError> {
        let request: Aggregations = serde_json::from_value(json!({
            LANGUAGE_AGG: {
                "terms": {
                    "field": names::LANGUAGE,
                    "size": limit.max(1),
                    "order": { "_count": "desc" },
                }
            }
        }))?;
        Ok(AggregationCollector::from_aggs(
            request,
            AggregationLimits::default(),
        ))
    }

    /// Counts matches per language for `query`.
    fn facets(
        searcher: &Searcher,
        query: &BooleanQuery,
        limit: usize,
    ) -> Result<Vec<LanguageFacet>, IndexError> {
        let results = searcher
            .search(query, &Self::facet_collector(limit)?)
            .map_err(|e| IndexError::search(&e))?;
        let mut facets = parse_language_facets(&serde_json::to_value(results)?)?;
        facets.truncate(limit);
        Ok(facets)
    }

    /// Loads a hit and locates its matches.
    fn to_result(
        &self,
        searcher: &Searcher,
        address: DocAddress,
        matched_terms: &HashSet<String>,
    ) -> Result<Option<RawSearchResult>, IndexError> {
        let doc: TantivyDocument = searcher.doc(address).map_err(|e| IndexError::search(&e))?;
        let text = |field| {
            doc.get_first(field)
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string()
        };

        let key = text(self.schema.id);
        let id: DocumentId = match key.parse() {
            Ok(id) => id,
            Err(e) => {
                debug!(key = %key, error = %e, "skipping hit with malformed id");
                return Ok(None);
            }
        };
        let content = text(self.schema.content);
        let language = text(self.schema.language);
        let positions = extract_match_ranges(&self.analyzer, &content, matched_terms);

        Ok(Some(RawSearchResult {
            repo_id: id.repo_id,
            path: id.path,
            commit_id: text(self.schema.commit_id),
            updated_at: doc
                .get_first(self.schema.updated_at)
                .and_then(|v| v.as_i64())
                .unwrap_or(0),
            color: language_color(&language).to_string(),
            language,
            content,
            positions,
        }))
    }
}

/// Stages one document, replacing any previous version.
fn stage_upsert(
    writer: &IndexWriter,
    schema: &CodeSchema,
    doc: &CodeDocument,
) -> Result<(), IndexError> {
    let key = doc.id.to_string();
    writer.delete_term(Term::from_field_text(schema.id, &key));

    let mut tantivy_doc = TantivyDocument::new();
    tantivy_doc.add_text(schema.id, &key);
    tantivy_doc.add_i64(schema.repo_id, doc.id.repo_id);
    tantivy_doc.add_text(schema.content, &doc.content);
    tantivy_doc.add_text(schema.commit_id, &doc.commit_id);
    tantivy_doc.add_text(schema.language, &doc.language);
    tantivy_doc.add_i64(schema.updated_at, doc.updated_at);

    writer
        .add_document(tantivy_doc)
        .map_err(|e| IndexError::write(&e))?;
    Ok(())
}

impl Indexer for TantivyIndexer {
    fn index(
        &self,
        repo_id: i64,
        commit: &str,
        changes: &Changeset,
        blobs: &dyn BlobSource,
    ) -> Result<(), IndexError> {
        let ops = self.planner.plan(repo_id, commit, changes, blobs)?;
        if ops.is_empty() {
            return Ok(());
        }
        self.write_batch(|writer, schema| {
            for op in &ops {
                match op {
                    BulkOp::Upsert(doc) => stage_upsert(writer, schema, doc)?,
                    BulkOp::Delete(id) => {
                        writer.delete_term(Term::from_field_text(schema.id, &id.to_string()));
                    }
                }
            }
            Ok(())
        })?;
        info!(repo_id, commit, operations = ops.len(), "indexed changeset");
        Ok(())
    }

    fn delete(&self, repo_id: i64) -> Result<(), IndexError> {
        self.write_batch(|writer, schema| {
            writer.delete_term(Term::from_field_i64(schema.repo_id, repo_id));
            Ok(())
        })?;
        info!(repo_id, "deleted repository from index");
        Ok(())
    }

    fn search(&self, query: &SearchQuery) -> Result<SearchHits, IndexError> {
        // Picks up commits made through other handles on the same directory.
        self.reader.reload().map_err(|e| IndexError::search(&e))?;
        let searcher = self.reader.searcher();
        let terms = query_terms(&self.analyzer, &query.keyword);
        let matched = self
            .fuzzy
            .matched_terms(&searcher, self.schema.content, &terms)?;
        let language = Some(query.language.as_str()).filter(|l| !l.is_empty());

        let Some(page_query) = self.compile(&matched, &query.repo_ids, language) else {
            return Ok(SearchHits::default());
        };

        let top = TopDocs::with_limit(query.page_size.max(1))
            .and_offset(query.offset())
            .order_by_fast_field::<i64>(names::REPO_ID, Order::Asc);

        let (total, docs, languages) = if query.needs_separate_facets() {
            let facet_query = self
                .compile(&matched, &query.repo_ids, None)
                .unwrap_or_else(|| page_query.clone());
            let languages = Self::facets(&searcher, &facet_query, query.facet_limit)?;
            let (total, docs) = searcher
                .search(&page_query, &(Count, top))
                .map_err(|e| IndexError::search(&e))?;
            (total, docs, languages)
        } else {
            let collector = Self::facet_collector(query.facet_limit)?;
            let (total, docs, aggs) = searcher
                .search(&page_query, &(Count, top, collector))
                .map_err(|e| IndexError::search(&e))?;
            let mut languages = parse_language_facets(&serde_json::to_value(aggs)?)?;
            languages.truncate(query.facet_limit);
            (total, docs, languages)
        };

        let mut results = Vec::with_capacity(docs.len());
        for (_, address) in docs.into_iter().take(query.page_size) {
            if let Some(result) = self.to_result(&searcher, address, &matched)? {
                results.push(result);
            }
        }

        debug!(
            keyword = %query.keyword,
            terms = matched.len(),
            total,
            "searched index"
        );
        Ok(SearchHits {
            total: total as u64,
            results,
            languages,
        })
    }

    fn close(&self) -> Result<(), IndexError> {
        let slot = mem::replace(&mut *self.writer()?, WriterSlot::Closed);
        if let WriterSlot::Open(writer) = slot {
            writer
                .wait_merging_threads()
                .map_err(|e| IndexError::commit(&e))?;
        }
        Ok(())
    }
}
