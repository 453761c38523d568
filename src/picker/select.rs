//! Layer 2: the select drawer session

use std::collections::BTreeMap;

use super::cache::QueryCache;
use super::error::{PickerError, PickerResult};
use crate::domain::{
    Cardinality, ListQuery, ListResponse, Record, RecordId, RecordPort, RecordResult,
};

/// Progress of the current list fetch
#[derive(Clone, Debug, PartialEq)]
pub enum LoadState {
    Idle,
    Loading,
    Loaded,
    Failed(String),
}

/// Handle of one issued list fetch
///
/// A result is applied only if its ticket is still the latest one of an
/// open session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
    pub query: ListQuery,
}

/// State of one open select drawer
///
/// Created empty every time the drawer opens; nothing survives a close.
#[derive(Clone, Debug)]
pub struct SelectSession {
    resource: String,
    cardinality: Cardinality,
    per_page: u32,
    page: u32,
    q: Option<String>,
    selected: Vec<RecordId>,
    rows: Vec<Record>,
    /// Selected rows, captured when selected so other pages and searches keep them
    picked: BTreeMap<RecordId, Record>,
    created: BTreeMap<RecordId, Record>,
    total_pages: Option<u32>,
    state: LoadState,
    generation: u64,
    creating: bool,
    closed: bool,
}

impl SelectSession {
    pub fn new(resource: impl Into<String>, cardinality: Cardinality, per_page: u32) -> Self {
        Self {
            resource: resource.into(),
            cardinality,
            per_page: per_page.max(1),
            page: 1,
            q: None,
            selected: Vec::new(),
            rows: Vec::new(),
            picked: BTreeMap::new(),
            created: BTreeMap::new(),
            total_pages: None,
            state: LoadState::Idle,
            generation: 0,
            creating: false,
            closed: false,
        }
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn cardinality(&self) -> Cardinality {
        self.cardinality
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn search_term(&self) -> Option<&str> {
        self.q.as_deref()
    }

    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    pub fn total_pages(&self) -> Option<u32> {
        self.total_pages
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn selected(&self) -> &[RecordId] {
        &self.selected
    }

    pub fn created(&self) -> &BTreeMap<RecordId, Record> {
        &self.created
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn query(&self) -> ListQuery {
        ListQuery::new(self.page, self.per_page).with_search(self.q.as_deref())
    }

    /// Set the search term; a new term always restarts at page 1
    pub fn search(&mut self, q: &str) {
        self.q = Some(q.trim().to_string()).filter(|q| !q.is_empty());
        self.page = 1;
    }

    pub fn goto_page(&mut self, page: u32) {
        self.page = page.max(1);
    }

    /// Mark a fetch as issued; earlier tickets become stale
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.generation += 1;
        self.state = LoadState::Loading;
        FetchTicket {
            generation: self.generation,
            query: self.query(),
        }
    }

    /// Apply a fetch result; returns false when the result was discarded
    pub fn apply(&mut self, ticket: &FetchTicket, result: RecordResult<ListResponse>) -> bool {
        if self.closed || ticket.generation != self.generation {
            tracing::debug!(
                "Discarding stale list result for {} (page {})",
                self.resource,
                ticket.query.page
            );
            return false;
        }

        match result {
            Ok(response) => {
                self.total_pages = response.pagination.map(|p| p.total_pages);
                self.rows = response.data;
                self.state = LoadState::Loaded;
            }
            Err(e) => {
                tracing::warn!("Failed to list {}: {}", self.resource, e);
                self.state = LoadState::Failed(e.to_string());
            }
        }
        true
    }

    /// Fetch the current page, served from `cache` when possible
    pub async fn fetch(&mut self, port: &dyn RecordPort, cache: &QueryCache) -> PickerResult<()> {
        if self.closed {
            return Err(PickerError::SessionClosed);
        }
        let ticket = self.begin_fetch();

        let result = match cache.get(&self.resource, &ticket.query).await {
            Some(cached) => Ok(cached),
            None => {
                tracing::debug!("Fetching {}", ticket.query.to_url(&self.resource));
                let result = port.list(&self.resource, &ticket.query).await;
                if let Ok(response) = &result {
                    cache.insert(&self.resource, &ticket.query, response.clone()).await;
                }
                result
            }
        };

        let failure = result.as_ref().err().cloned();
        self.apply(&ticket, result);
        match failure {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }

    pub fn is_selected(&self, id: &RecordId) -> bool {
        self.selected.contains(id)
    }

    /// Row click: `one` replaces the selection, `many` toggles membership
    pub fn toggle(&mut self, id: RecordId) {
        match self.cardinality {
            Cardinality::One => {
                if self.is_selected(&id) {
                    self.selected.clear();
                } else {
                    self.selected = vec![id.clone()];
                }
            }
            Cardinality::Many => match self.selected.iter().position(|s| *s == id) {
                Some(index) => {
                    self.selected.remove(index);
                }
                None => self.selected.push(id.clone()),
            },
        }

        if self.is_selected(&id) {
            if let Some(row) = self.rows.iter().find(|row| row.id.as_ref() == Some(&id)) {
                self.picked.insert(id, row.clone());
            }
        }
        let selected = &self.selected;
        self.picked.retain(|id, _| selected.contains(id));
    }

    fn select(&mut self, id: RecordId) {
        if !self.is_selected(&id) {
            self.toggle(id);
        }
    }

    pub fn set_creating(&mut self, creating: bool) {
        self.creating = creating;
    }

    /// Hand over a record created in the create drawer: remember it and select it
    pub fn record_created(&mut self, record: Record) {
        let Some(id) = record.id.clone() else {
            tracing::warn!("Created record for {} has no id; not selecting it", self.resource);
            return;
        };
        self.created.insert(id.clone(), record);
        self.select(id);
    }

    pub fn confirm_enabled(&self) -> bool {
        !self.closed && !self.creating
    }

    /// Selected records in selection order, one per id
    ///
    /// Rows picked on any page or under any search term are kept; created
    /// records fill in ids that were never listed.
    pub fn confirm(&mut self) -> PickerResult<Vec<Record>> {
        if self.closed {
            return Err(PickerError::SessionClosed);
        }
        if self.creating {
            return Err(PickerError::SubmitPending);
        }

        let mut records: Vec<Record> = Vec::with_capacity(self.selected.len());
        for id in &self.selected {
            if records.iter().any(|r| r.id.as_ref() == Some(id)) {
                continue;
            }
            let found = self.picked.get(id).or_else(|| self.created.get(id));
            match found {
                Some(record) => records.push(record.clone()),
                None => tracing::warn!("Selected id {} is no longer loaded", id),
            }
        }

        self.close();
        Ok(records)
    }

    /// Close without emitting anything
    pub fn cancel(&mut self) {
        self.close();
    }

    fn close(&mut self) {
        self.closed = true;
        self.selected.clear();
        self.rows.clear();
        self.picked.clear();
        self.created.clear();
        self.state = LoadState::Idle;
    }
}
