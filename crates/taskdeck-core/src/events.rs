//! Server event types, envelope schema, and event bus.
//!
//! Every write in the service layer emits a [`ServerEvent`]; the bus wraps
//! it in an [`EventEnvelope`] and broadcasts it. The api crate streams the
//! envelopes to clients over SSE so open pages can refresh when a view they
//! show is revalidated.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::models::{ProjectStatus, TaskStatus};

// ============================================================================
// Event Envelope
// ============================================================================

/// Versioned wrapper around a domain event.
///
/// ## Wire Format (SSE)
///
/// ```text
/// event: task.deleted
/// id: 019508a0-1234-7def-8000-abcdef123456
/// data: {"event_id":"...","event_type":"task.deleted","occurred_at":"...","payload":{...}}
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct EventEnvelope {
    /// Unique event identifier (UUIDv7 for temporal ordering).
    pub event_id: Uuid,
    /// Namespaced event type (e.g., `"project.created"`).
    pub event_type: String,
    /// When the event occurred (UTC).
    pub occurred_at: DateTime<Utc>,
    /// Type of entity this event relates to (`"project"`, `"task"`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<String>,
    /// ID of the entity this event relates to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,
    /// Payload schema version.
    pub payload_version: u32,
    /// Domain-specific event data.
    pub payload: ServerEvent,
}

impl EventEnvelope {
    pub fn new(event: ServerEvent) -> Self {
        Self {
            event_id: crate::uuid_utils::new_v7(),
            event_type: event.event_type().to_string(),
            occurred_at: Utc::now(),
            entity_type: event.entity_type().map(String::from),
            entity_id: event.entity_id().map(|id| id.to_string()),
            payload_version: 1,
            payload: event,
        }
    }
}

// ============================================================================
// Server Event (domain payloads)
// ============================================================================

/// Domain events, serialized with a `type` tag.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum ServerEvent {
    ProjectCreated {
        project_id: Uuid,
        title: String,
    },
    ProjectStatusChanged {
        project_id: Uuid,
        status: ProjectStatus,
    },
    ProjectDeleted {
        project_id: Uuid,
        /// Tasks removed along with the project.
        task_count: usize,
    },
    TaskCreated {
        task_id: Uuid,
        project_id: Uuid,
        #[serde(skip_serializing_if = "Option::is_none")]
        parent_task: Option<Uuid>,
    },
    TaskStatusChanged {
        task_id: Uuid,
        #[serde(skip_serializing_if = "Option::is_none")]
        project_id: Option<Uuid>,
        status: TaskStatus,
    },
    TaskAttachmentAdded {
        task_id: Uuid,
        name: String,
    },
    TaskDeleted {
        task_id: Uuid,
        #[serde(skip_serializing_if = "Option::is_none")]
        project_id: Option<Uuid>,
        /// Every id removed, root first.
        deleted: Vec<Uuid>,
    },
    /// A cached view was dropped and must be re-rendered.
    ViewRevalidated {
        path: String,
    },
}

impl ServerEvent {
    /// Namespaced event type for the envelope (e.g., `"task.deleted"`).
    pub fn event_type(&self) -> &'static str {
        match self {
            ServerEvent::ProjectCreated { .. } => "project.created",
            ServerEvent::ProjectStatusChanged { .. } => "project.status_changed",
            ServerEvent::ProjectDeleted { .. } => "project.deleted",
            ServerEvent::TaskCreated { .. } => "task.created",
            ServerEvent::TaskStatusChanged { .. } => "task.status_changed",
            ServerEvent::TaskAttachmentAdded { .. } => "task.attachment_added",
            ServerEvent::TaskDeleted { .. } => "task.deleted",
            ServerEvent::ViewRevalidated { .. } => "view.revalidated",
        }
    }

    /// Entity type this event relates to.
    pub fn entity_type(&self) -> Option<&'static str> {
        match self {
            ServerEvent::ProjectCreated { .. }
            | ServerEvent::ProjectStatusChanged { .. }
            | ServerEvent::ProjectDeleted { .. } => Some("project"),
            ServerEvent::TaskCreated { .. }
            | ServerEvent::TaskStatusChanged { .. }
            | ServerEvent::TaskAttachmentAdded { .. }
            | ServerEvent::TaskDeleted { .. } => Some("task"),
            ServerEvent::ViewRevalidated { .. } => None,
        }
    }

    /// Primary entity ID this event relates to.
    pub fn entity_id(&self) -> Option<Uuid> {
        match self {
            ServerEvent::ProjectCreated { project_id, .. }
            | ServerEvent::ProjectStatusChanged { project_id, .. }
            | ServerEvent::ProjectDeleted { project_id, .. } => Some(*project_id),
            ServerEvent::TaskCreated { task_id, .. }
            | ServerEvent::TaskStatusChanged { task_id, .. }
            | ServerEvent::TaskAttachmentAdded { task_id, .. }
            | ServerEvent::TaskDeleted { task_id, .. } => Some(*task_id),
            ServerEvent::ViewRevalidated { .. } => None,
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Broadcast-based event bus.
///
/// Slow receivers that fall behind get a `Lagged` error and miss events.
pub struct EventBus {
    tx: broadcast::Sender<EventEnvelope>,
}

impl EventBus {
    /// Create a new event bus with the given buffer capacity.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Emit an event to all subscribers. Dropped silently when nobody listens.
    pub fn emit(&self, event: ServerEvent) {
        let envelope = EventEnvelope::new(event);
        let subscriber_count = self.tx.receiver_count();
        tracing::debug!(
            subsystem = "events",
            event_type = %envelope.event_type,
            event_id = %envelope.event_id,
            subscriber_count,
            "EventBus emit"
        );
        let _ = self.tx.send(envelope);
    }

    /// Subscribe to receive enveloped events.
    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.tx.subscribe()
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(crate::defaults::EVENT_BUS_CAPACITY)
    }
}

// ============================================================================
// Tests
// ============================================================================
