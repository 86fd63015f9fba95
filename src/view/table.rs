use chrono::NaiveDate;
use tracing::debug;

use crate::{
    cache::QueryKey,
    client::QueryState,
    export::{ExportBundle, ExportFilters},
    models::{PaginationInfo, SearchResponse, UsageEvent},
    query::{Endpoint, QueryBuilder, QueryInput, QueryParams},
};

/// Date range and company selection of the event explorer. Unset dates
/// fall back to the configured default range when a request is built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExplorerFilters {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub companies: Vec<String>,
}

/// One page of events plus the inputs that select it.
///
/// Mutations only change the inputs. The caller fetches under [`key`] and
/// hands the result to [`apply`], which ignores results for any key other
/// than the current one.
///
/// [`key`]: EventTable::key
/// [`apply`]: EventTable::apply
#[derive(Debug, Clone)]
pub struct EventTable {
    builder: QueryBuilder,
    query: String,
    filters: ExplorerFilters,
    page: u32,
    page_size: u32,
    events: Vec<UsageEvent>,
    pagination: PaginationInfo,
    loading: bool,
    error: Option<String>,
}

impl EventTable {
    pub fn new(builder: QueryBuilder) -> Self {
        let page_size = builder.defaults().page_size;
        Self {
            builder,
            query: String::new(),
            filters: ExplorerFilters::default(),
            page: 1,
            page_size,
            events: Vec::new(),
            pagination: PaginationInfo::empty(1, page_size),
            loading: false,
            error: None,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn filters(&self) -> &ExplorerFilters {
        &self.filters
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn events(&self) -> &[UsageEvent] {
        &self.events
    }

    pub fn pagination(&self) -> &PaginationInfo {
        &self.pagination
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Replace the search text and go back to the first page.
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.page = 1;
    }

    /// Jump to `page`. Pages past the end are left to the backend, which
    /// answers with an empty page.
    pub fn set_page(&mut self, page: u32) {
        self.page = page;
    }

    pub fn set_page_size(&mut self, page_size: u32) {
        self.page_size = page_size;
        self.page = 1;
    }

    pub fn set_filters(&mut self, filters: ExplorerFilters) {
        self.filters = filters;
        self.page = 1;
    }

    /// Restore every input to its default. Loaded rows stay until the next
    /// result is applied.
    pub fn reset(&mut self) {
        self.query.clear();
        self.filters = ExplorerFilters::default();
        self.page = 1;
        self.page_size = self.builder.defaults().page_size;
    }

    pub fn input(&self) -> QueryInput {
        QueryInput {
            start_date: self.filters.start_date,
            end_date: self.filters.end_date,
            companies: self.filters.companies.clone(),
            query: self.query.clone(),
            page: Some(self.page),
            page_size: Some(self.page_size),
        }
    }

    pub fn params(&self) -> QueryParams {
        self.builder.build(&self.input())
    }

    pub fn key(&self) -> QueryKey {
        QueryKey::new(Endpoint::Events, &self.params())
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    /// Apply a search result fetched under `key`. Returns `false` and
    /// changes nothing when `key` is no longer current.
    ///
    /// Rows are replaced wholesale. Pagination follows the page and page
    /// size the backend answered with, which can differ from the request
    /// when the backend caps the page size. A result without data keeps the
    /// rows already shown next to the error.
    pub fn apply(&mut self, key: &QueryKey, state: QueryState<SearchResponse>) -> bool {
        if *key != self.key() {
            debug!(key = %key, "Discarding result for superseded query");
            return false;
        }

        if let Some(response) = state.data {
            let served = &response.pagination;
            self.pagination =
                PaginationInfo::new(served.current_page, served.page_size, served.total_items);
            self.events = response.events;
        }
        self.loading = state.loading;
        self.error = state.error;
        true
    }

    /// Snapshot of the visible rows and the filters the user set.
    pub fn export_bundle(&self) -> ExportBundle {
        let params = self.params();
        ExportBundle {
            events: self.events.clone(),
            filters: ExportFilters {
                start_date: self.filters.start_date,
                end_date: self.filters.end_date,
                companies: params.companies.into_iter().collect(),
                query: self.query.clone(),
            },
        }
    }
}
