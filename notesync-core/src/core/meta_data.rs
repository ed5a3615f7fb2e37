//! Hidden link records pairing a remote task with its local row record.
//!
//! Each synced note gets one [`MetaData`] entry in the application's metadata
//! folder. Its notes carry the note's local row record as serialized JSON,
//! tagged with the remote id of the task it belongs to.

use crate::core::node::{Node, NodeBase, NodeKey};
use crate::core::strings::{META_HEAD_GTASK_ID, META_NOTE_NAME};
use crate::core::task::Task;
use crate::core::task_list::sealed::{LinkToken, Linked};
use crate::core::task_list::{ChildTask, ListLink, TaskList};
use crate::Result;
use serde_json::Value;

/// A link record, stored remotely as an ordinary task.
///
/// Link records are never mapped to local rows and have no
/// [`LocalNode`](crate::LocalNode) impl.
#[derive(Debug, Clone, Default)]
pub struct MetaData {
    task: Task,
    related_gid: Option<String>,
}

impl MetaData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(&self) -> NodeKey {
        self.task.key()
    }

    /// Stores `meta_info` as the payload of this record, linked to the remote
    /// task `gid`.
    pub fn set_meta(&mut self, gid: &str, mut meta_info: Value) {
        match meta_info.as_object_mut() {
            Some(map) => {
                map.insert(META_HEAD_GTASK_ID.to_string(), Value::String(gid.to_string()));
            }
            None => log::warn!("meta info for task {gid} is not an object"),
        }
        self.task.set_notes(Some(meta_info.to_string()));
        self.task.set_name(META_NOTE_NAME);
        self.related_gid = Some(gid.to_string());
    }

    /// Remote id of the task this record describes.
    pub fn related_gid(&self) -> Option<&str> {
        self.related_gid.as_deref()
    }

    /// The serialized payload.
    pub fn notes(&self) -> Option<&str> {
        self.task.notes()
    }

    pub fn set_notes(&mut self, notes: Option<String>) {
        self.task.set_notes(notes);
    }

    pub fn is_worth_saving(&self) -> bool {
        self.task.notes().is_some()
    }

    /// Builds the "create me remotely" record for this link inside `parent`.
    ///
    /// # Errors
    ///
    /// Same as [`Task::create_action`].
    pub fn create_action<C: ChildTask>(
        &self,
        action_id: i64,
        parent: Option<&TaskList<C>>,
    ) -> Result<Value> {
        self.task.create_action(action_id, parent)
    }
}

impl Node for MetaData {
    fn base(&self) -> &NodeBase {
        self.task.base()
    }

    fn base_mut(&mut self) -> &mut NodeBase {
        self.task.base_mut()
    }

    fn update_action(&self, action_id: i64) -> Result<Value> {
        self.task.update_action(action_id)
    }

    fn set_content_by_remote_json(&mut self, js: &Value) -> Result<()> {
        self.task.set_content_by_remote_json(js)?;
        if let Some(notes) = self.task.notes() {
            self.related_gid = related_gid_from_notes(notes);
        }
        Ok(())
    }
}

impl ChildTask for MetaData {
    fn as_task(&self) -> &Task {
        &self.task
    }
}

impl Linked for MetaData {
    fn link_mut(&mut self, token: LinkToken) -> &mut ListLink {
        self.task.link_mut(token)
    }

    fn restore_identity(&mut self, key: NodeKey, link: ListLink, token: LinkToken) {
        self.task.restore_identity(key, link, token);
    }
}

fn related_gid_from_notes(notes: &str) -> Option<String> {
    let payload: Value = match serde_json::from_str(notes.trim()) {
        Ok(payload) => payload,
        Err(e) => {
            log::warn!("failed to get related gid: {e}");
            return None;
        }
    };
    let gid = payload.get(META_HEAD_GTASK_ID).and_then(Value::as_str);
    if gid.is_none() {
        log::warn!("link record carries no {META_HEAD_GTASK_ID}");
    }
    gid.map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_set_meta_tags_payload() {
        let mut meta = MetaData::new();
        assert!(!meta.is_worth_saving());

        meta.set_meta("g42", json!({ "meta_note": { "_id": 3 } }));
        assert_eq!(meta.name(), META_NOTE_NAME);
        assert_eq!(meta.related_gid(), Some("g42"));
        assert!(meta.is_worth_saving());

        let payload: Value = serde_json::from_str(meta.notes().unwrap()).unwrap();
        assert_eq!(payload["meta_gid"], "g42");
        assert_eq!(payload["meta_note"]["_id"], 3);
    }

    #[test]
    fn test_remote_absorb_derives_related_gid() {
        let mut meta = MetaData::new();
        meta.set_content_by_remote_json(&json!({
            "id": "m1",
            "name": META_NOTE_NAME,
            "notes": "  {\"meta_gid\":\"g9\",\"meta_note\":{}}\n"
        }))
        .unwrap();

        assert_eq!(meta.gid(), Some("m1"));
        assert_eq!(meta.related_gid(), Some("g9"));
    }

    #[test]
    fn test_remote_absorb_with_bad_payload_clears_related_gid() {
        let mut meta = MetaData::new();
        meta.set_meta("g1", json!({}));
        meta.set_content_by_remote_json(&json!({ "notes": "not json" })).unwrap();
        assert_eq!(meta.related_gid(), None);

        meta.set_content_by_remote_json(&json!({ "notes": "{\"other\":1}" })).unwrap();
        assert_eq!(meta.related_gid(), None);
    }

    #[test]
    fn test_remote_absorb_without_notes_keeps_related_gid() {
        let mut meta = MetaData::new();
        meta.set_meta("g1", json!({}));
        meta.set_content_by_remote_json(&json!({ "last_modified": 7 })).unwrap();
        assert_eq!(meta.related_gid(), Some("g1"));
        assert_eq!(meta.last_modified(), 7);
    }

    #[test]
    fn test_update_action_carries_payload() {
        let mut meta = MetaData::new();
        meta.set_gid("m1");
        meta.set_meta("g1", json!({}));
        let record = meta.update_action(3).unwrap();
        assert_eq!(record["id"], "m1");
        assert_eq!(record["entity_delta"]["name"], META_NOTE_NAME);
        assert!(record["entity_delta"]["notes"].as_str().unwrap().contains("g1"));
    }

    #[test]
    fn test_create_action_inside_meta_folder() {
        let mut folder: TaskList<MetaData> = TaskList::new();
        folder.set_gid("meta-list");
        let mut meta = MetaData::new();
        meta.set_meta("g1", json!({}));
        let key = meta.key();
        folder.add_child_task(meta);

        let record = folder.child_task(key).unwrap().create_action(8, Some(&folder)).unwrap();
        assert_eq!(record["entity_delta"]["entity_type"], "TASK");
        assert_eq!(record["list_id"], "meta-list");
        assert_eq!(record["index"], 0);
    }
}
