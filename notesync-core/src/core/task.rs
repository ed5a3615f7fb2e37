//! A single note mirrored against a remote task entity.

use crate::core::cursor::{
    RowCursor, GTASK_ID_COLUMN, ID_COLUMN, LOCAL_MODIFIED_COLUMN, SYNC_ID_COLUMN,
};
use crate::core::meta_data::MetaData;
use crate::core::node::{present_remote_keys, LocalNode, Node, NodeBase, NodeKey, RemotePatch, SyncAction};
use crate::core::strings::{
    DATA_CONTENT, DATA_MIME_TYPE, JSON_TYPE_GROUP, JSON_TYPE_TASK, META_HEAD_DATA, META_HEAD_NOTE,
    MIME_TEXT_NOTE, NOTE_ID, NOTE_TYPE, TYPE_NOTE,
};
use crate::core::task_list::sealed::{LinkToken, Linked};
use crate::core::task_list::{ChildTask, ListLink, TaskList};
use crate::core::wire::{to_record, CreateRecord, EntityDelta, UpdateRecord};
use crate::{Result, SyncError};
use serde_json::{json, Value};

/// One note, mirrored as a remote task inside a [`TaskList`].
///
/// `parent` and `prior_sibling` are maintained by the owning list; a task that
/// is not in any list has neither.
#[derive(Debug, Clone, Default)]
pub struct Task {
    key: NodeKey,
    base: NodeBase,
    completed: bool,
    notes: Option<String>,
    meta_info: Option<Value>,
    link: ListLink,
}

impl Task {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a detached task from a remote entity.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::ActionFailed`] if the entity cannot be absorbed.
    pub fn from_remote_json(js: &Value) -> Result<Self> {
        let mut task = Self::new();
        task.set_content_by_remote_json(js)?;
        Ok(task)
    }

    pub fn key(&self) -> NodeKey {
        self.key
    }

    pub fn completed(&self) -> bool {
        self.completed
    }

    pub fn set_completed(&mut self, completed: bool) {
        self.completed = completed;
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn set_notes(&mut self, notes: Option<String>) {
        self.notes = notes;
    }

    /// The local row record retained from the previous sync, if any.
    pub fn meta_info(&self) -> Option<&Value> {
        self.meta_info.as_ref()
    }

    /// Key of the owning list.
    pub fn parent(&self) -> Option<NodeKey> {
        self.link.parent()
    }

    /// Key of the task immediately before this one in its list.
    pub fn prior_sibling(&self) -> Option<NodeKey> {
        self.link.prior_sibling()
    }

    /// Adopts the local row record carried by a link record.
    ///
    /// An unparsable payload clears the retained record: stale state from a
    /// broken previous sync counts as no state at all.
    pub fn set_meta_info(&mut self, meta_data: &MetaData) {
        let Some(notes) = meta_data.notes() else {
            return;
        };
        self.meta_info = match serde_json::from_str::<Value>(notes) {
            Ok(info) if info.is_object() => Some(info),
            Ok(_) => {
                log::warn!("meta info of task {:?} is not an object", self.gid());
                None
            }
            Err(e) => {
                log::warn!("failed to parse meta info of task {:?}: {e}", self.gid());
                None
            }
        };
    }

    /// Returns `false` for empty placeholder tasks that should not be persisted.
    pub fn is_worth_saving(&self) -> bool {
        self.meta_info.is_some()
            || !self.base.name.trim().is_empty()
            || self.notes.as_deref().is_some_and(|n| !n.trim().is_empty())
    }

    /// Builds the "create me remotely" record for this task inside `parent`.
    ///
    /// The record places the task at its current position, after its prior
    /// sibling, so the remote order matches the local one.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::ActionFailed`] if `parent` is missing, is not the
    /// list that owns this task, or has not been created remotely yet, or if
    /// the prior sibling has no remote identity.
    pub fn create_action<C: ChildTask>(
        &self,
        action_id: i64,
        parent: Option<&TaskList<C>>,
    ) -> Result<Value> {
        let parent = parent.ok_or_else(|| {
            SyncError::action_failed("fail to generate task-create record: task has no parent")
        })?;
        if self.parent() != Some(parent.key()) {
            return Err(SyncError::action_failed(
                "fail to generate task-create record: task does not belong to the given list",
            ));
        }
        let index = parent.child_task_index(self.key).ok_or_else(|| {
            SyncError::action_failed("fail to generate task-create record: task missing from its list")
        })?;
        let parent_gid = parent.gid().ok_or_else(|| {
            SyncError::action_failed("fail to generate task-create record: parent list has no remote id")
        })?;
        let prior_sibling_id = match self.prior_sibling() {
            Some(key) => Some(
                parent
                    .child_task(key)
                    .and_then(|sibling| sibling.gid())
                    .ok_or_else(|| {
                        SyncError::action_failed(
                            "fail to generate task-create record: prior sibling has no remote id",
                        )
                    })?,
            ),
            None => None,
        };

        let mut entity_delta = EntityDelta::create(self.name(), JSON_TYPE_TASK);
        entity_delta.notes = self.notes();

        let mut record = CreateRecord::new(action_id, index as i64, entity_delta);
        record.parent_id = Some(parent_gid);
        record.dest_parent_type = Some(JSON_TYPE_GROUP);
        record.list_id = Some(parent_gid);
        record.prior_sibling_id = prior_sibling_id;

        to_record(&record, "task-create")
    }

    fn try_sync_action(&self, row: &dyn RowCursor) -> Result<SyncAction> {
        let Some(note_info) = self.meta_info.as_ref().and_then(|m| m.get(META_HEAD_NOTE)) else {
            log::warn!("it seems that note meta has been deleted");
            return Ok(SyncAction::UpdateRemote);
        };
        if !note_info.is_object() {
            return Err(SyncError::InvalidLocalRecord(
                "retained note record is not an object".to_string(),
            ));
        }

        let Some(note_id) = note_info.get(NOTE_ID) else {
            log::warn!("remote note id seems to be deleted");
            return Ok(SyncAction::UpdateLocal);
        };
        let note_id = json_long(note_id).ok_or_else(|| {
            SyncError::InvalidLocalRecord(format!("retained note id is not a number: {note_id}"))
        })?;

        if row.long(ID_COLUMN)? != note_id {
            log::warn!("note id doesn't match");
            return Ok(SyncAction::UpdateLocal);
        }

        let synced_at = row.long(SYNC_ID_COLUMN)?;
        if row.long(LOCAL_MODIFIED_COLUMN)? == 0 {
            if synced_at == self.last_modified() {
                Ok(SyncAction::None)
            } else {
                Ok(SyncAction::UpdateLocal)
            }
        } else {
            let gtask_id = row.string(GTASK_ID_COLUMN)?;
            if gtask_id.is_none() || gtask_id.as_deref() != self.gid() {
                log::error!("gtask id doesn't match");
                return Ok(SyncAction::Error);
            }
            if synced_at == self.last_modified() {
                Ok(SyncAction::UpdateRemote)
            } else {
                Ok(SyncAction::UpdateConflict)
            }
        }
    }
}

impl Node for Task {
    fn base(&self) -> &NodeBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut NodeBase {
        &mut self.base
    }

    fn update_action(&self, action_id: i64) -> Result<Value> {
        let id = self.gid().ok_or_else(|| {
            SyncError::action_failed("fail to generate task-update record: task has no remote id")
        })?;
        let entity_delta = EntityDelta {
            name: self.name(),
            notes: self.notes(),
            deleted: Some(self.deleted()),
            ..EntityDelta::default()
        };
        to_record(&UpdateRecord::new(action_id, id, entity_delta), "task-update")
    }

    fn set_content_by_remote_json(&mut self, js: &Value) -> Result<()> {
        let patch = RemotePatch::from_json(js).map_err(|e| {
            SyncError::action_failed_with("fail to get task content from remote entity", e)
        })?;
        if patch.is_empty() {
            return Ok(());
        }
        log::debug!("absorbing remote task fields {:?}", present_remote_keys(js));

        self.base = patch.merged(&self.base);
        if let Some(notes) = patch.notes {
            self.notes = Some(notes);
        }
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
        Ok(())
    }
}

impl LocalNode for Task {
    fn set_content_by_local_json(&mut self, js: &Value) {
        match note_text_from_local(js) {
            Ok(Some(text)) => self.base.name = text,
            Ok(None) => log::debug!("local note carries no text field"),
            Err(e) => log::error!("failed to map local note row: {e}"),
        }
    }

    fn local_json_from_content(&mut self) -> Option<Value> {
        let name = self.base.name.clone();
        match self.meta_info.as_mut() {
            None => {
                // created remotely; no local row yet
                if name.is_empty() {
                    log::warn!("the note seems to be an empty one");
                    return None;
                }
                Some(json!({
                    META_HEAD_NOTE: { NOTE_TYPE: TYPE_NOTE },
                    META_HEAD_DATA: [{ DATA_CONTENT: name, DATA_MIME_TYPE: MIME_TEXT_NOTE }],
                }))
            }
            Some(meta_info) => match refresh_meta_info(meta_info, name) {
                Ok(()) => Some(meta_info.clone()),
                Err(e) => {
                    log::error!("failed to build local note row: {e}");
                    None
                }
            },
        }
    }

    fn sync_action(&self, row: &dyn RowCursor) -> SyncAction {
        self.try_sync_action(row).unwrap_or_else(|e| {
            log::error!("failed to derive sync action for task {:?}: {e}", self.gid());
            SyncAction::Error
        })
    }
}

impl ChildTask for Task {
    fn as_task(&self) -> &Task {
        self
    }
}

impl Linked for Task {
    fn link_mut(&mut self, _token: LinkToken) -> &mut ListLink {
        &mut self.link
    }

    fn restore_identity(&mut self, key: NodeKey, link: ListLink, _token: LinkToken) {
        self.key = key;
        self.link = link;
    }
}

/// Reads a plain note's text out of a local row record.
fn note_text_from_local(js: &Value) -> Result<Option<String>> {
    let note = js
        .get(META_HEAD_NOTE)
        .and_then(Value::as_object)
        .ok_or_else(|| SyncError::InvalidLocalRecord("nothing is available".to_string()))?;
    let data = js
        .get(META_HEAD_DATA)
        .and_then(Value::as_array)
        .ok_or_else(|| SyncError::InvalidLocalRecord("note has no data".to_string()))?;

    let row_type = note.get(NOTE_TYPE).and_then(json_long);
    if row_type != Some(TYPE_NOTE) {
        return Err(SyncError::InvalidLocalRecord(format!("invalid type {row_type:?}")));
    }

    Ok(data
        .iter()
        .find(|item| item.get(DATA_MIME_TYPE).and_then(Value::as_str) == Some(MIME_TEXT_NOTE))
        .and_then(|item| item.get(DATA_CONTENT))
        .and_then(Value::as_str)
        .map(str::to_string))
}

/// Writes `name` into the text field-group of a retained record and stamps it
/// as a plain note. Nothing is written unless both sub-records are present.
fn refresh_meta_info(meta_info: &mut Value, name: String) -> Result<()> {
    if !meta_info.get(META_HEAD_NOTE).is_some_and(Value::is_object) {
        return Err(SyncError::InvalidLocalRecord("retained record has no note".to_string()));
    }
    let data = meta_info
        .get_mut(META_HEAD_DATA)
        .and_then(Value::as_array_mut)
        .ok_or_else(|| SyncError::InvalidLocalRecord("retained record has no data".to_string()))?;

    if let Some(text) = data
        .iter_mut()
        .find(|item| item.get(DATA_MIME_TYPE).and_then(Value::as_str) == Some(MIME_TEXT_NOTE))
    {
        text[DATA_CONTENT] = Value::String(name);
    }

    meta_info[META_HEAD_NOTE][NOTE_TYPE] = json!(TYPE_NOTE);
    Ok(())
}

/// Reads an integer that the local store may have written as a number or a
/// numeric string.
pub(crate) fn json_long(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
}
