//! A folder mirrored as a remote task group, owning its tasks in display order.
//!
//! [`TaskList`] is the only place where a child's `parent` and `prior_sibling`
//! links change. After every structural operation the list upholds:
//!
//! - `children[0]` has no prior sibling;
//! - `children[i]`'s prior sibling is `children[i - 1]`;
//! - every child's parent is this list;
//! - no key appears twice.

use crate::core::cursor::{RowCursor, GTASK_ID_COLUMN, LOCAL_MODIFIED_COLUMN, SYNC_ID_COLUMN};
use crate::core::node::{LocalNode, Node, NodeBase, NodeKey, RemotePatch, SyncAction};
use crate::core::strings::{
    FOLDER_CALL_NOTE, FOLDER_DEFAULT, FOLDER_META, FOLDER_PREFIX, ID_CALL_RECORD_FOLDER,
    ID_ROOT_FOLDER, JSON_TYPE_GROUP, META_HEAD_NOTE, NOTE_ID, NOTE_SNIPPET, NOTE_TYPE,
    TYPE_FOLDER, TYPE_SYSTEM,
};
use crate::core::task::{json_long, Task};
use crate::core::wire::{to_record, CreateRecord, EntityDelta, UpdateRecord};
use sealed::{LinkToken, Linked};
use crate::{Result, SyncError};
use serde_json::{json, Value};

/// Position of a task inside its owning list.
///
/// Fields are written only by [`TaskList`]; everyone else can read them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListLink {
    parent: Option<NodeKey>,
    prior_sibling: Option<NodeKey>,
}

impl ListLink {
    pub fn parent(&self) -> Option<NodeKey> {
        self.parent
    }

    pub fn prior_sibling(&self) -> Option<NodeKey> {
        self.prior_sibling
    }

    fn attach(&mut self, parent: NodeKey, prior_sibling: Option<NodeKey>) {
        self.parent = Some(parent);
        self.prior_sibling = prior_sibling;
    }

    fn detach(&mut self) {
        self.parent = None;
        self.prior_sibling = None;
    }
}

pub(crate) mod sealed {
    use super::ListLink;
    use crate::core::node::NodeKey;

    /// Capability to rewrite a child's list position. Only `task_list` can
    /// construct one.
    #[derive(Debug, Clone, Copy)]
    pub struct LinkToken(pub(super) ());

    /// List-side hooks every child provides.
    pub trait Linked {
        fn link_mut(&mut self, token: LinkToken) -> &mut ListLink;

        /// Puts back the key and link the owning list knows this child by.
        fn restore_identity(&mut self, key: NodeKey, link: ListLink, token: LinkToken);
    }
}

/// Anything a [`TaskList`] can hold: a plain [`Task`] or a task-backed link
/// record.
///
/// The list position of a child can only be changed by its list:
///
/// ```compile_fail
/// use notesync_core::{ChildTask, ListLink};
///
/// fn unlink<C: ChildTask>(child: &mut C) {
///     *child.link_mut() = ListLink::default();
/// }
/// ```
pub trait ChildTask: Node + sealed::Linked {
    fn as_task(&self) -> &Task;

    fn key(&self) -> NodeKey {
        self.as_task().key()
    }
}

/// A folder of the local store, mirrored as a remote task group.
#[derive(Debug, Clone)]
pub struct TaskList<C = Task> {
    key: NodeKey,
    base: NodeBase,
    index: i32,
    children: Vec<C>,
}

impl<C: ChildTask> Default for TaskList<C> {
    fn default() -> Self {
        Self {
            key: NodeKey::new(),
            base: NodeBase::default(),
            index: 1,
            children: Vec::new(),
        }
    }
}

impl<C: ChildTask> TaskList<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(&self) -> NodeKey {
        self.key
    }

    /// Ordinal position hint sent with the create record.
    pub fn index(&self) -> i32 {
        self.index
    }

    pub fn set_index(&mut self, index: i32) {
        self.index = index;
    }

    /// Returns `true` if this group is owned by this application.
    pub fn is_app_folder(&self) -> bool {
        self.name().starts_with(FOLDER_PREFIX)
    }

    /// Returns `true` if this group holds the hidden link records.
    pub fn is_meta_folder(&self) -> bool {
        self.name().strip_prefix(FOLDER_PREFIX) == Some(FOLDER_META)
    }

    /// Builds the "create me remotely" record for this list.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::ActionFailed`] if the record cannot be serialized.
    pub fn create_action(&self, action_id: i64) -> Result<Value> {
        let entity_delta = EntityDelta::create(self.name(), JSON_TYPE_GROUP);
        let record = CreateRecord::new(action_id, i64::from(self.index), entity_delta);
        to_record(&record, "tasklist-create")
    }

    /// Builds the create record of the child identified by `key`.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::ActionFailed`] if `key` is not a child of this
    /// list or the child's record cannot be built.
    pub fn child_create_action(&self, key: NodeKey, action_id: i64) -> Result<Value> {
        let child = self.child_task(key).ok_or_else(|| {
            SyncError::action_failed("fail to generate task-create record: task is not in this list")
        })?;
        child.as_task().create_action(action_id, Some(self))
    }

    pub fn child_task_count(&self) -> usize {
        self.children.len()
    }

    /// The children in display order.
    pub fn child_tasks(&self) -> &[C] {
        &self.children
    }

    /// Appends `task` at the end of the list.
    ///
    /// Returns `false` if a task with the same key is already a child.
    pub fn add_child_task(&mut self, mut task: C) -> bool {
        if self.child_task_index(task.key()).is_some() {
            log::warn!("add child task: task {} is already in the list", task.key());
            return false;
        }
        let prior_sibling = self.children.last().map(ChildTask::key);
        task.link_mut(LinkToken(())).attach(self.key, prior_sibling);
        self.children.push(task);
        true
    }

    /// Inserts `task` so that it ends up at `index` (`0..=len`).
    ///
    /// Returns `false` if `index` is out of range or the task is already a
    /// child.
    pub fn add_child_task_at(&mut self, mut task: C, index: usize) -> bool {
        if index > self.children.len() {
            log::error!("add child task: invalid index {index}");
            return false;
        }
        if self.child_task_index(task.key()).is_some() {
            log::warn!("add child task: task {} is already in the list", task.key());
            return false;
        }

        let key = task.key();
        let prior_sibling = index.checked_sub(1).map(|i| self.children[i].key());
        task.link_mut(LinkToken(())).attach(self.key, prior_sibling);
        self.children.insert(index, task);

        if let Some(next) = self.children.get_mut(index + 1) {
            next.link_mut(LinkToken(())).prior_sibling = Some(key);
        }
        true
    }

    /// Removes the child identified by `key` and hands it back detached.
    pub fn remove_child_task(&mut self, key: NodeKey) -> Option<C> {
        let index = self.child_task_index(key)?;
        let mut task = self.children.remove(index);
        task.link_mut(LinkToken(())).detach();

        let prior_sibling = index.checked_sub(1).map(|i| self.children[i].key());
        if let Some(next) = self.children.get_mut(index) {
            next.link_mut(LinkToken(())).prior_sibling = prior_sibling;
        }
        Some(task)
    }

    /// Moves the child identified by `key` to `index` (`0..len`).
    ///
    /// Returns `false` if `index` is out of range or `key` is not a child.
    pub fn move_child_task(&mut self, key: NodeKey, index: usize) -> bool {
        if index >= self.children.len() {
            log::error!("move child task: invalid index {index}");
            return false;
        }
        let Some(position) = self.child_task_index(key) else {
            log::error!("move child task: the task should be in the list");
            return false;
        };
        if position == index {
            return true;
        }
        match self.remove_child_task(key) {
            Some(task) => self.add_child_task_at(task, index),
            None => false,
        }
    }

    pub fn find_child_task_by_gid(&self, gid: &str) -> Option<&C> {
        self.children.iter().find(|task| task.gid() == Some(gid))
    }

    /// Runs `f` on the content of the child whose remote id is `gid`.
    ///
    /// See [`update_child_task`](Self::update_child_task).
    pub fn update_child_task_by_gid<R>(
        &mut self,
        gid: &str,
        f: impl FnOnce(&mut C) -> R,
    ) -> Option<R> {
        let index = self.children.iter().position(|task| task.gid() == Some(gid))?;
        Some(self.update_child_at(index, f))
    }

    /// Position of the child identified by `key`.
    pub fn child_task_index(&self, key: NodeKey) -> Option<usize> {
        self.children.iter().position(|task| task.key() == key)
    }

    pub fn child_task_by_index(&self, index: usize) -> Option<&C> {
        let task = self.children.get(index);
        if task.is_none() {
            log::error!("get task by index: invalid index {index}");
        }
        task
    }

    pub fn child_task(&self, key: NodeKey) -> Option<&C> {
        self.children.iter().find(|task| task.key() == key)
    }

    /// Runs `f` on the content of the child identified by `key`.
    ///
    /// The child keeps its key and list position whatever `f` does to it,
    /// including replacing it wholesale. Returns `None` if `key` is not a
    /// child.
    pub fn update_child_task<R>(&mut self, key: NodeKey, f: impl FnOnce(&mut C) -> R) -> Option<R> {
        let index = self.child_task_index(key)?;
        Some(self.update_child_at(index, f))
    }

    fn update_child_at<R>(&mut self, index: usize, f: impl FnOnce(&mut C) -> R) -> R {
        let child = &mut self.children[index];
        let key = child.key();
        let link = *child.link_mut(LinkToken(()));
        let result = f(&mut *child);
        child.restore_identity(key, link, LinkToken(()));
        result
    }

    fn try_sync_action(&self, row: &dyn RowCursor) -> Result<SyncAction> {
        let synced_at = row.long(SYNC_ID_COLUMN)?;
        if row.long(LOCAL_MODIFIED_COLUMN)? == 0 {
            if synced_at == self.last_modified() {
                return Ok(SyncAction::None);
            }
            return Ok(SyncAction::UpdateLocal);
        }

        let gtask_id = row.string(GTASK_ID_COLUMN)?;
        if gtask_id.is_none() || gtask_id.as_deref() != self.gid() {
            log::error!("gtask id doesn't match");
            return Ok(SyncAction::Error);
        }
        // Folder conflicts resolve to the local side.
        Ok(SyncAction::UpdateRemote)
    }
}

impl<C: ChildTask> Node for TaskList<C> {
    fn base(&self) -> &NodeBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut NodeBase {
        &mut self.base
    }

    fn update_action(&self, action_id: i64) -> Result<Value> {
        let id = self.gid().ok_or_else(|| {
            SyncError::action_failed("fail to generate tasklist-update record: list has no remote id")
        })?;
        let entity_delta = EntityDelta {
            name: self.name(),
            deleted: Some(self.deleted()),
            ..EntityDelta::default()
        };
        to_record(&UpdateRecord::new(action_id, id, entity_delta), "tasklist-update")
    }

    fn set_content_by_remote_json(&mut self, js: &Value) -> Result<()> {
        let patch = RemotePatch::group_from_json(js).map_err(|e| {
            SyncError::action_failed_with("fail to get tasklist content from remote entity", e)
        })?;
        self.base = patch.merged(&self.base);
        Ok(())
    }
}

impl<C: ChildTask> LocalNode for TaskList<C> {
    fn set_content_by_local_json(&mut self, js: &Value) {
        match folder_name_from_local(js) {
            Ok(name) => self.base.name = name,
            Err(e) => log::error!("failed to map local folder row: {e}"),
        }
    }

    fn local_json_from_content(&mut self) -> Option<Value> {
        let name = self.name();
        let folder_name = name.strip_prefix(FOLDER_PREFIX).unwrap_or(name);
        let row_type = if folder_name == FOLDER_DEFAULT || folder_name == FOLDER_CALL_NOTE {
            TYPE_SYSTEM
        } else {
            TYPE_FOLDER
        };
        Some(json!({
            META_HEAD_NOTE: { NOTE_SNIPPET: folder_name, NOTE_TYPE: row_type }
        }))
    }

    fn sync_action(&self, row: &dyn RowCursor) -> SyncAction {
        self.try_sync_action(row).unwrap_or_else(|e| {
            log::error!("failed to derive sync action for list {:?}: {e}", self.gid());
            SyncAction::Error
        })
    }
}

/// Derives the remote group name of a local folder or system row.
fn folder_name_from_local(js: &Value) -> Result<String> {
    let folder = js
        .get(META_HEAD_NOTE)
        .and_then(Value::as_object)
        .ok_or_else(|| SyncError::InvalidLocalRecord("nothing is available".to_string()))?;

    match folder.get(NOTE_TYPE).and_then(json_long) {
        Some(TYPE_FOLDER) => {
            let snippet = folder
                .get(NOTE_SNIPPET)
                .and_then(Value::as_str)
                .ok_or_else(|| SyncError::InvalidLocalRecord("folder has no name".to_string()))?;
            Ok(format!("{FOLDER_PREFIX}{snippet}"))
        }
        Some(TYPE_SYSTEM) => match folder.get(NOTE_ID).and_then(json_long) {
            Some(ID_ROOT_FOLDER) => Ok(format!("{FOLDER_PREFIX}{FOLDER_DEFAULT}")),
            Some(ID_CALL_RECORD_FOLDER) => Ok(format!("{FOLDER_PREFIX}{FOLDER_CALL_NOTE}")),
            other => Err(SyncError::InvalidLocalRecord(format!(
                "invalid system folder {other:?}"
            ))),
        },
        other => Err(SyncError::InvalidLocalRecord(format!("error type {other:?}"))),
    }
}
