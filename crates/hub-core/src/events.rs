//! Event catalog for the collaboration hub.
//!
//! These are **transport-agnostic** logical events:
//! - [`InboundEvent`]: what clients send to the hub.
//! - [`OutboundEvent`]: what the hub fans out to rooms.
//! - [`ConnectionEvent`]: everything the hub consumes for one connection,
//!   including transport-level open/close.
//!
//! Wire framing (JSON envelope, newline or WebSocket framing) lives in the
//! `hub-protocol` crate; this module only knows event names and payload
//! shapes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::EventError;

pub const AUTHENTICATE: &str = "authenticate";
pub const JOIN_PROJECT: &str = "join_project";
pub const LEAVE_PROJECT: &str = "leave_project";
pub const TASK_MOVED: &str = "task_moved";
pub const NEW_COMMENT: &str = "new_comment";
pub const NOTIFY_INVITE: &str = "notify_invite";

pub const USERS_UPDATED: &str = "users_updated";
pub const TASK_UPDATED: &str = "task_updated";
pub const COMMENT_RECEIVED: &str = "comment_received";
pub const PROJECT_ADDED: &str = "project_added";

/// Who a connection says it is, as shown in a project roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDescriptor {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl UserDescriptor {
    /// Descriptor carrying only an id.
    pub fn with_id(id: impl Into<String>) -> Self {
        UserDescriptor {
            id: id.into(),
            name: None,
            email: None,
        }
    }
}

/// A client → hub event, already validated.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    /// Join the private notification room keyed by `email`.
    Authenticate { email: String },

    /// Join a project room and appear in its roster.
    JoinProject {
        project_id: String,
        user: UserDescriptor,
    },

    /// Leave a project room without closing the connection.
    LeaveProject { project_id: String },

    /// A task changed column/position; `payload` is relayed verbatim.
    TaskMoved { project_id: String, payload: Value },

    /// A comment was posted; `payload` is relayed verbatim.
    NewComment { project_id: String, payload: Value },

    /// Tell the user behind `email` they were added to `project`.
    NotifyInvite { email: String, project: Value },
}

impl InboundEvent {
    /// Shape a raw `(name, data)` pair into a typed event.
    ///
    /// Every precondition from the protocol table is checked here, so the
    /// hub only ever sees well-formed events.
    pub fn from_wire(name: &str, data: Value) -> Result<Self, EventError> {
        match name {
            AUTHENTICATE => {
                let email = required_str(&data, AUTHENTICATE, "email")?;
                Ok(InboundEvent::Authenticate {
                    email: email.to_string(),
                })
            }
            JOIN_PROJECT => {
                let project_id = required_str(&data, JOIN_PROJECT, "projectId")?.to_string();
                let user = data
                    .get("user")
                    .cloned()
                    .and_then(|raw| serde_json::from_value::<UserDescriptor>(raw).ok())
                    .filter(|user| !user.id.trim().is_empty())
                    .ok_or(EventError::MissingField {
                        event: JOIN_PROJECT,
                        field: "user",
                    })?;
                Ok(InboundEvent::JoinProject { project_id, user })
            }
            LEAVE_PROJECT => {
                let project_id = required_str(&data, LEAVE_PROJECT, "projectId")?;
                Ok(InboundEvent::LeaveProject {
                    project_id: project_id.to_string(),
                })
            }
            TASK_MOVED => {
                let project_id = required_str(&data, TASK_MOVED, "projectId")?.to_string();
                Ok(InboundEvent::TaskMoved {
                    project_id,
                    payload: data,
                })
            }
            NEW_COMMENT => {
                let project_id = required_str(&data, NEW_COMMENT, "projectId")?.to_string();
                Ok(InboundEvent::NewComment {
                    project_id,
                    payload: data,
                })
            }
            NOTIFY_INVITE => {
                let email = required_str(&data, NOTIFY_INVITE, "email")?.to_string();
                let project = match data.get("project") {
                    Some(project @ Value::Object(_)) => project.clone(),
                    _ => {
                        return Err(EventError::MissingField {
                            event: NOTIFY_INVITE,
                            field: "project",
                        })
                    }
                };
                Ok(InboundEvent::NotifyInvite { email, project })
            }
            other => Err(EventError::UnknownEvent(other.to_string())),
        }
    }

    /// Wire name of this event.
    pub fn name(&self) -> &'static str {
        match self {
            InboundEvent::Authenticate { .. } => AUTHENTICATE,
            InboundEvent::JoinProject { .. } => JOIN_PROJECT,
            InboundEvent::LeaveProject { .. } => LEAVE_PROJECT,
            InboundEvent::TaskMoved { .. } => TASK_MOVED,
            InboundEvent::NewComment { .. } => NEW_COMMENT,
            InboundEvent::NotifyInvite { .. } => NOTIFY_INVITE,
        }
    }

    /// Wire payload of this event; the inverse of [`InboundEvent::from_wire`].
    pub fn data(&self) -> Value {
        match self {
            InboundEvent::Authenticate { email } => serde_json::json!({ "email": email }),
            InboundEvent::JoinProject { project_id, user } => {
                serde_json::json!({ "projectId": project_id, "user": user })
            }
            InboundEvent::LeaveProject { project_id } => {
                serde_json::json!({ "projectId": project_id })
            }
            InboundEvent::TaskMoved { payload, .. } | InboundEvent::NewComment { payload, .. } => {
                payload.clone()
            }
            InboundEvent::NotifyInvite { email, project } => {
                serde_json::json!({ "email": email, "project": project })
            }
        }
    }
}

/// A hub → client event.
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundEvent {
    /// Full roster snapshot of a project room.
    UsersUpdated(Vec<UserDescriptor>),

    /// Echo of a `task_moved` payload.
    TaskUpdated(Value),

    /// Echo of a `new_comment` payload.
    CommentReceived(Value),

    /// The `project` object from a `notify_invite`.
    ProjectAdded(Value),
}

impl OutboundEvent {
    pub fn name(&self) -> &'static str {
        match self {
            OutboundEvent::UsersUpdated(_) => USERS_UPDATED,
            OutboundEvent::TaskUpdated(_) => TASK_UPDATED,
            OutboundEvent::CommentReceived(_) => COMMENT_RECEIVED,
            OutboundEvent::ProjectAdded(_) => PROJECT_ADDED,
        }
    }

    pub fn payload(&self) -> Value {
        match self {
            // Serializing plain strings and options cannot fail.
            OutboundEvent::UsersUpdated(users) => serde_json::to_value(users).unwrap_or_default(),
            OutboundEvent::TaskUpdated(v)
            | OutboundEvent::CommentReceived(v)
            | OutboundEvent::ProjectAdded(v) => v.clone(),
        }
    }
}

/// Everything the hub can be told about a single connection.
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionEvent {
    /// Transport accepted the connection.
    Opened,

    /// A decoded client event.
    Inbound(InboundEvent),

    /// Transport lost the connection, cleanly or not.
    Closed,
}

fn required_str<'a>(
    data: &'a Value,
    event: &'static str,
    field: &'static str,
) -> Result<&'a str, EventError> {
    data.get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(EventError::MissingField { event, field })
}
