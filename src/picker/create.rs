//! Layer 3: the create drawer session

use serde_json::{Map, Value};

use super::cache::QueryCache;
use super::error::{PickerError, PickerResult};
use crate::domain::{NodeType, Record, RecordPort, RecordResult, SchemaNode};
use crate::renderer::FormState;

/// Proof that a submit was started; consumed by [`CreateSession::finish`]
#[derive(Debug)]
#[must_use]
pub struct SubmitTicket {
    data: Map<String, Value>,
}

impl SubmitTicket {
    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }
}

/// Isolated form state of one open create drawer
#[derive(Clone, Debug)]
pub struct CreateSession {
    resource: String,
    template: Vec<SchemaNode>,
    form: FormState,
    pending: bool,
    closed: bool,
}

impl CreateSession {
    pub fn new(resource: impl Into<String>, template: Vec<SchemaNode>) -> Self {
        Self {
            resource: resource.into(),
            template,
            form: FormState::new(),
            pending: false,
            closed: false,
        }
    }

    pub fn template(&self) -> &[SchemaNode] {
        &self.template
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn set_value(&mut self, path: &str, value: Value) {
        self.form.apply_change(path, value);
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Check required INPUT_* fields of the template; errors are keyed by binding
    pub fn validate(&mut self) -> bool {
        self.form.clear_errors();

        let mut missing = Vec::new();
        for root in &self.template {
            root.walk(&mut |node| {
                let is_input = node.node_type == NodeType::Field
                    && node.kind.as_deref().map(|k| k.starts_with("INPUT_")).unwrap_or(false);
                if node.required && is_input {
                    if let Some(name) = node.name.as_deref() {
                        missing.push(name.to_string());
                    }
                }
            });
        }

        for name in missing {
            let blank = match self.form.get(&name) {
                None | Some(Value::Null) => true,
                Some(Value::String(s)) => s.trim().is_empty(),
                Some(Value::Array(items)) => items.is_empty(),
                Some(_) => false,
            };
            if blank {
                self.form.set_error(&name, "is required");
            }
        }

        !self.form.has_errors()
    }

    /// Start a submit: validates and flips to pending before any request is made
    ///
    /// A second call while pending fails without side effects.
    pub fn begin_submit(&mut self) -> PickerResult<SubmitTicket> {
        if self.closed {
            return Err(PickerError::SessionClosed);
        }
        if self.pending {
            return Err(PickerError::SubmitPending);
        }
        if !self.validate() {
            return Err(PickerError::Validation(self.form.errors().clone()));
        }

        self.pending = true;
        let data = match self.form.values() {
            Value::Object(values) => values.clone(),
            _ => Map::new(),
        };
        Ok(SubmitTicket { data })
    }

    /// Settle a submit; success closes the drawer, failure keeps the values
    pub fn finish(
        &mut self,
        _ticket: SubmitTicket,
        result: RecordResult<Record>,
    ) -> PickerResult<Record> {
        self.pending = false;
        match result {
            Ok(record) => {
                self.closed = true;
                Ok(record)
            }
            Err(e) => {
                tracing::warn!("Failed to create record in {}: {}", self.resource, e);
                Err(e.into())
            }
        }
    }

    /// Submit once: exactly one create call, then list cache invalidation on success
    pub async fn submit(
        &mut self,
        port: &dyn RecordPort,
        cache: &QueryCache,
    ) -> PickerResult<Record> {
        let ticket = self.begin_submit()?;

        tracing::debug!("Creating record in {}", self.resource);
        let result = port.create(&self.resource, ticket.data().clone()).await;
        if result.is_ok() {
            cache.invalidate(&self.resource).await;
        }

        self.finish(ticket, result)
    }

    pub fn cancel(&mut self) {
        self.closed = true;
    }
}
