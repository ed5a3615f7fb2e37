//! Shared state and contracts of every syncable entity.
//!
//! A node mirrors one remote entity (a task or a task group). [`NodeBase`]
//! holds the state common to all of them; [`Node`] is the contract the
//! reconciliation driver drives remote traffic through, and [`LocalNode`]
//! adds the local-row mapping that only user-visible entities have.

use crate::core::cursor::RowCursor;
use crate::core::strings::{
    JSON_COMPLETED, JSON_DELETED, JSON_ID, JSON_LAST_MODIFIED, JSON_NAME, JSON_NOTES,
};
use crate::{Result, SyncError};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

/// Process-local identity of an entity.
///
/// Assigned at construction and kept by `Clone`; list membership is decided by
/// key, never by comparing content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeKey(Uuid);

impl NodeKey {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeKey {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The next step the reconciliation driver must take for one entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SyncAction {
    /// Both sides agree.
    None,
    /// The entity exists only locally.
    AddRemote,
    /// The entity exists only remotely.
    AddLocal,
    DelRemote,
    DelLocal,
    /// Push local state to the remote service.
    UpdateRemote,
    /// Pull remote state into the local store.
    UpdateLocal,
    /// Both sides changed since the last agreed point.
    UpdateConflict,
    /// The entity could not be classified.
    Error,
}

impl SyncAction {
    /// Numeric code used when the action is persisted alongside a row.
    #[must_use]
    pub fn code(self) -> i32 {
        match self {
            Self::None => 0,
            Self::AddRemote => 1,
            Self::AddLocal => 2,
            Self::DelRemote => 3,
            Self::DelLocal => 4,
            Self::UpdateRemote => 5,
            Self::UpdateLocal => 6,
            Self::UpdateConflict => 7,
            Self::Error => 8,
        }
    }

    /// Inverse of [`code`](Self::code).
    #[must_use]
    pub fn from_code(code: i32) -> Option<Self> {
        let action = match code {
            0 => Self::None,
            1 => Self::AddRemote,
            2 => Self::AddLocal,
            3 => Self::DelRemote,
            4 => Self::DelLocal,
            5 => Self::UpdateRemote,
            6 => Self::UpdateLocal,
            7 => Self::UpdateConflict,
            8 => Self::Error,
            _ => return None,
        };
        Some(action)
    }

    /// Returns `true` when the driver has to send a record to the remote service.
    #[must_use]
    pub fn needs_remote_traffic(self) -> bool {
        matches!(self, Self::AddRemote | Self::DelRemote | Self::UpdateRemote)
    }
}

/// Identity, label, timestamp and tombstone shared by every node.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeBase {
    /// Remote identity; `None` until the remote service confirmed creation.
    pub gid: Option<String>,
    pub name: String,
    /// Remote modification time, epoch milliseconds.
    pub last_modified: i64,
    pub deleted: bool,
}

impl NodeBase {
    /// The remote modification time as a UTC timestamp, for display.
    #[must_use]
    pub fn last_modified_at(&self) -> Option<DateTime<Utc>> {
        if self.last_modified == 0 {
            return None;
        }
        Utc.timestamp_millis_opt(self.last_modified).single()
    }
}

/// Contract shared by every entity that is mirrored remotely.
pub trait Node {
    fn base(&self) -> &NodeBase;

    fn base_mut(&mut self) -> &mut NodeBase;

    /// Builds the partial "update me remotely" record tagged with `action_id`.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::ActionFailed`] if the record cannot be built.
    fn update_action(&self, action_id: i64) -> Result<Value>;

    /// Absorbs the fields present in a remote entity; absent fields are kept.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::ActionFailed`] if a present field has the wrong type.
    fn set_content_by_remote_json(&mut self, js: &Value) -> Result<()>;

    fn gid(&self) -> Option<&str> {
        self.base().gid.as_deref()
    }

    fn set_gid(&mut self, gid: impl Into<String>)
    where
        Self: Sized,
    {
        self.base_mut().gid = Some(gid.into());
    }

    fn name(&self) -> &str {
        &self.base().name
    }

    fn set_name(&mut self, name: impl Into<String>)
    where
        Self: Sized,
    {
        self.base_mut().name = name.into();
    }

    fn last_modified(&self) -> i64 {
        self.base().last_modified
    }

    fn set_last_modified(&mut self, last_modified: i64) {
        self.base_mut().last_modified = last_modified;
    }

    fn deleted(&self) -> bool {
        self.base().deleted
    }

    fn set_deleted(&mut self, deleted: bool) {
        self.base_mut().deleted = deleted;
    }
}

/// A node that also has a row in the local store.
pub trait LocalNode: Node {
    /// Maps a local row record onto this node. Unreadable records are logged
    /// and leave the node untouched.
    fn set_content_by_local_json(&mut self, js: &Value);

    /// Builds the local row record for this node, or `None` if there is
    /// nothing to materialize.
    fn local_json_from_content(&mut self) -> Option<Value>;

    /// Decides how this node reconciles against `row`.
    fn sync_action(&self, row: &dyn RowCursor) -> SyncAction;
}

/// The fields a remote entity may carry, each present only if sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RemotePatch {
    #[serde(rename = "id")]
    pub gid: Option<String>,
    pub last_modified: Option<i64>,
    pub name: Option<String>,
    pub notes: Option<String>,
    pub deleted: Option<bool>,
    pub completed: Option<bool>,
}

impl RemotePatch {
    /// Extracts the recognised fields of a remote entity.
    ///
    /// Unknown keys are ignored and `null` counts as absent, for a single field
    /// as well as for the whole entity.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::ActionFailed`] if `js` is not an object, or
    /// [`SyncError::Json`] if a recognised field has the wrong type.
    pub fn from_json(js: &Value) -> Result<Self> {
        if !is_entity(js)? {
            return Ok(Self::default());
        }
        Ok(Self::deserialize(js)?)
    }

    /// Extracts only the fields a task group understands: `id`,
    /// `last_modified` and `name`. Other keys are never looked at.
    ///
    /// # Errors
    ///
    /// Same as [`from_json`](Self::from_json), restricted to the group fields.
    pub fn group_from_json(js: &Value) -> Result<Self> {
        if !is_entity(js)? {
            return Ok(Self::default());
        }
        let group = GroupFields::deserialize(js)?;
        Ok(Self {
            gid: group.gid,
            last_modified: group.last_modified,
            name: group.name,
            ..Self::default()
        })
    }

    /// Returns `base` with the present fields merged in.
    #[must_use]
    pub fn merged(&self, base: &NodeBase) -> NodeBase {
        NodeBase {
            gid: self.gid.clone().or_else(|| base.gid.clone()),
            name: self.name.clone().unwrap_or_else(|| base.name.clone()),
            last_modified: self.last_modified.unwrap_or(base.last_modified),
            deleted: self.deleted.unwrap_or(base.deleted),
        }
    }

    /// Returns `true` if no recognised field was present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Deserialize)]
struct GroupFields {
    #[serde(rename = "id")]
    gid: Option<String>,
    last_modified: Option<i64>,
    name: Option<String>,
}

/// `Ok(false)` for a `null` entity, an error for anything but an object.
fn is_entity(js: &Value) -> Result<bool> {
    if js.is_null() {
        return Ok(false);
    }
    if !js.is_object() {
        return Err(SyncError::action_failed("remote entity is not a JSON object"));
    }
    Ok(true)
}

/// Lists which of the recognised remote keys `js` carries; used in log lines.
pub(crate) fn present_remote_keys(js: &Value) -> Vec<&'static str> {
    [
        JSON_ID,
        JSON_LAST_MODIFIED,
        JSON_NAME,
        JSON_NOTES,
        JSON_DELETED,
        JSON_COMPLETED,
    ]
    .into_iter()
    .filter(|key| js.get(*key).is_some_and(|v| !v.is_null()))
    .collect()
}
