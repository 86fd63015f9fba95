use std::{sync::Arc, time::Duration};

use parking_lot::Mutex;
use tracing::debug;

use super::{EventTable, ExplorerFilters};
use crate::{
    client::AnalyticsService,
    debounce::{DebounceHandle, Debouncer},
    export::ExportBundle,
};

/// Event explorer controller: an [`EventTable`] bound to the backend.
///
/// Discrete changes (page, page size, filters) refresh right away; search
/// text refreshes once typing pauses for the debounce delay. Results are
/// applied only if they still match the table's inputs.
#[derive(Clone)]
pub struct EventExplorer {
    inner: Arc<ExplorerInner>,
}

struct ExplorerInner {
    service: AnalyticsService,
    table: Mutex<EventTable>,
    debouncer: Debouncer,
}

impl EventExplorer {
    pub fn new(service: AnalyticsService, search_debounce: Duration) -> Self {
        let table = EventTable::new(service.builder().clone());
        Self {
            inner: Arc::new(ExplorerInner {
                service,
                table: Mutex::new(table),
                debouncer: Debouncer::new(search_debounce),
            }),
        }
    }

    /// Copy of the current table.
    pub fn table(&self) -> EventTable {
        self.inner.table.lock().clone()
    }

    pub fn export_bundle(&self) -> ExportBundle {
        self.inner.table.lock().export_bundle()
    }

    /// Fetch under the table's current inputs. Returns whether the result
    /// was applied.
    pub async fn refresh(&self) -> bool {
        let (key, params) = {
            let mut table = self.inner.table.lock();
            table.set_loading(true);
            (table.key(), table.params())
        };

        let state = self.inner.service.search_events(&params).await;
        let applied = self.inner.table.lock().apply(&key, state);
        if !applied {
            debug!(key = %key, "Search result arrived after inputs changed");
        }
        applied
    }

    /// Update the search text now and refresh after the debounce delay.
    /// Typing again before the delay elapses supersedes this refresh.
    pub fn set_query_debounced(&self, query: impl Into<String>) -> DebounceHandle<bool> {
        self.inner.table.lock().set_query(query);
        let this = self.clone();
        self.inner
            .debouncer
            .schedule(async move { this.refresh().await })
    }

    /// Apply several input changes, then refresh once.
    pub async fn update(&self, f: impl FnOnce(&mut EventTable)) -> bool {
        f(&mut self.inner.table.lock());
        self.refresh().await
    }

    pub async fn set_page(&self, page: u32) -> bool {
        self.update(|table| table.set_page(page)).await
    }

    pub async fn set_page_size(&self, page_size: u32) -> bool {
        self.update(|table| table.set_page_size(page_size)).await
    }

    pub async fn set_filters(&self, filters: ExplorerFilters) -> bool {
        self.update(|table| table.set_filters(filters)).await
    }

    pub async fn reset(&self) -> bool {
        self.inner.debouncer.cancel();
        self.inner.table.lock().reset();
        self.refresh().await
    }

    pub fn dismiss_error(&self) {
        self.inner.table.lock().dismiss_error();
    }
}
