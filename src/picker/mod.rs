//! Relationship picker: attach existing records or create and attach new ones
//!
//! Three layers, each owning its own state:
//! - [`PickerField`] holds the value of the enclosing form field;
//! - [`SelectSession`] is the select drawer (list, search, selection);
//! - [`CreateSession`] is the create drawer nested in it.
//!
//! [`RelationshipPicker`] wires them together over a [`RecordPort`] and a
//! shared [`QueryCache`].

pub mod cache;
pub mod create;
pub mod error;
pub mod field;
pub mod select;

use std::sync::Arc;

use serde_json::Value;

use crate::domain::{RecordPort, SchemaNode};

pub use cache::{QueryCache, QueryKey};
pub use create::{CreateSession, SubmitTicket};
pub use error::{PickerError, PickerResult};
pub use field::PickerField;
pub use select::{FetchTicket, LoadState, SelectSession};

pub const DEFAULT_PER_PAGE: u32 = 10;

/// One relationship picker bound to a RELATIONSHIP_PICKER node
pub struct RelationshipPicker {
    name: String,
    resource: String,
    template: Vec<SchemaNode>,
    per_page: u32,
    field: PickerField,
    port: Arc<dyn RecordPort>,
    cache: QueryCache,
    select: Option<SelectSession>,
    create: Option<CreateSession>,
}

impl RelationshipPicker {
    pub fn new(
        node: &SchemaNode,
        value: Value,
        port: Arc<dyn RecordPort>,
        cache: QueryCache,
    ) -> PickerResult<Self> {
        let name = node.name.clone().unwrap_or_default();
        let resource = node
            .resource
            .clone()
            .filter(|r| !r.is_empty())
            .ok_or_else(|| PickerError::MissingResource(name.clone()))?;

        Ok(Self {
            name,
            resource,
            template: node.template().to_vec(),
            per_page: DEFAULT_PER_PAGE,
            field: PickerField::from_node(node, value),
            port,
            cache,
            select: None,
            create: None,
        })
    }

    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page.max(1);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field(&self) -> &PickerField {
        &self.field
    }

    /// Value to write back into the enclosing form
    pub fn value(&self) -> Value {
        self.field.value()
    }

    pub fn remove(&mut self, index: usize) -> bool {
        self.field.remove(index)
    }

    pub fn can_create(&self) -> bool {
        !self.template.is_empty()
    }

    /// Open the select drawer with a fresh session and load page 1
    ///
    /// A failed fetch leaves the drawer open in [`LoadState::Failed`].
    pub async fn open(&mut self) -> PickerResult<&SelectSession> {
        if !self.field.can_add() {
            return Err(PickerError::AddDisabled(self.name.clone()));
        }
        self.create = None;
        let session = self
            .select
            .insert(SelectSession::new(&self.resource, self.field.cardinality(), self.per_page));
        if let Err(e) = session.fetch(self.port.as_ref(), &self.cache).await {
            tracing::debug!("Picker '{}' opened with a failed fetch: {}", self.name, e);
        }
        Ok(session)
    }

    pub fn session(&self) -> Option<&SelectSession> {
        self.select.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut SelectSession> {
        self.select.as_mut()
    }

    fn open_session(&mut self) -> PickerResult<&mut SelectSession> {
        self.select
            .as_mut()
            .filter(|s| !s.is_closed())
            .ok_or(PickerError::SessionClosed)
    }

    /// New search term, back to page 1, refetch
    pub async fn search(&mut self, q: &str) -> PickerResult<()> {
        let port = Arc::clone(&self.port);
        let cache = self.cache.clone();
        let session = self.open_session()?;
        session.search(q);
        session.fetch(port.as_ref(), &cache).await
    }

    pub async fn goto_page(&mut self, page: u32) -> PickerResult<()> {
        let port = Arc::clone(&self.port);
        let cache = self.cache.clone();
        let session = self.open_session()?;
        session.goto_page(page);
        session.fetch(port.as_ref(), &cache).await
    }

    /// Open the create drawer on top of the select drawer
    pub fn open_create(&mut self) -> PickerResult<&mut CreateSession> {
        if !self.can_create() {
            return Err(PickerError::MissingResource(format!("{} create form", self.name)));
        }
        let resource = self.resource.clone();
        let template = self.template.clone();
        self.open_session()?;
        Ok(self.create.insert(CreateSession::new(resource, template)))
    }

    pub fn create_session(&mut self) -> Option<&mut CreateSession> {
        self.create.as_mut()
    }

    /// Submit the create drawer; on success the record is selected in the select drawer
    pub async fn submit_create(&mut self) -> PickerResult<()> {
        let port = Arc::clone(&self.port);
        let cache = self.cache.clone();
        let create = self.create.as_mut().ok_or(PickerError::SessionClosed)?;
        if let Some(select) = self.select.as_mut() {
            select.set_creating(true);
        }

        let result = create.submit(port.as_ref(), &cache).await;

        let select = self.select.as_mut();
        match result {
            Ok(record) => {
                self.create = None;
                if let Some(select) = select {
                    select.set_creating(false);
                    select.record_created(record);
                }
                Ok(())
            }
            Err(e) => {
                if let Some(select) = select {
                    select.set_creating(false);
                }
                Err(e)
            }
        }
    }

    pub fn cancel_create(&mut self) {
        self.create = None;
        if let Some(select) = self.select.as_mut() {
            select.set_creating(false);
        }
    }

    /// Confirm the select drawer and attach its selection to the field
    pub fn confirm(&mut self) -> PickerResult<Value> {
        let session = self.open_session()?;
        let records = session.confirm()?;
        tracing::debug!("Picker '{}' attaching {} record(s)", self.name, records.len());
        self.field.apply_confirm(records);
        self.select = None;
        self.create = None;
        Ok(self.field.value())
    }

    /// Close the select drawer without touching the field
    pub fn cancel(&mut self) {
        if let Some(session) = self.select.as_mut() {
            session.cancel();
        }
        self.select = None;
        self.create = None;
    }
}
