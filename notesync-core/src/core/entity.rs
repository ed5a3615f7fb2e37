//! Closed set of entity kinds the reconciliation driver handles.

use crate::core::cursor::RowCursor;
use crate::core::meta_data::MetaData;
use crate::core::node::{LocalNode, Node, SyncAction};
use crate::core::task::Task;
use crate::core::task_list::TaskList;
use crate::Result;
use serde_json::Value;

/// A remote entity, classified by what it is locally.
#[derive(Debug, Clone)]
pub enum Entity {
    /// A plain note.
    Note(Task),
    /// A folder.
    Folder(TaskList),
    /// A hidden link record; has no local row.
    Link(MetaData),
}

impl Entity {
    pub fn node(&self) -> &dyn Node {
        match self {
            Self::Note(task) => task,
            Self::Folder(list) => list,
            Self::Link(meta) => meta,
        }
    }

    pub fn node_mut(&mut self) -> &mut dyn Node {
        match self {
            Self::Note(task) => task,
            Self::Folder(list) => list,
            Self::Link(meta) => meta,
        }
    }

    /// The local-row view, or `None` for a link record.
    pub fn local(&self) -> Option<&dyn LocalNode> {
        match self {
            Self::Note(task) => Some(task),
            Self::Folder(list) => Some(list),
            Self::Link(_) => None,
        }
    }

    pub fn local_mut(&mut self) -> Option<&mut dyn LocalNode> {
        match self {
            Self::Note(task) => Some(task),
            Self::Folder(list) => Some(list),
            Self::Link(_) => None,
        }
    }

    /// Derives the sync action against `row`; link records have none.
    pub fn sync_action(&self, row: &dyn RowCursor) -> Option<SyncAction> {
        self.local().map(|local| local.sync_action(row))
    }

    /// Builds the update record of whichever entity this is.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::ActionFailed`](crate::SyncError::ActionFailed) if
    /// the record cannot be built.
    pub fn update_action(&self, action_id: i64) -> Result<Value> {
        self.node().update_action(action_id)
    }

    /// Absorbs a remote entity into whichever entity this is.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::ActionFailed`](crate::SyncError::ActionFailed) if a
    /// present field has the wrong type.
    pub fn set_content_by_remote_json(&mut self, js: &Value) -> Result<()> {
        self.node_mut().set_content_by_remote_json(js)
    }
}

impl From<Task> for Entity {
    fn from(task: Task) -> Self {
        Self::Note(task)
    }
}

impl From<TaskList> for Entity {
    fn from(list: TaskList) -> Self {
        Self::Folder(list)
    }
}

impl From<MetaData> for Entity {
    fn from(meta: MetaData) -> Self {
        Self::Link(meta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cursor::NoteRow;
    use serde_json::json;

    #[test]
    fn test_link_has_no_local_view() {
        let mut link = Entity::from(MetaData::new());
        assert!(link.local().is_none());
        assert!(link.local_mut().is_none());
        assert_eq!(link.sync_action(&NoteRow::default()), None);
    }

    #[test]
    fn test_dispatch_to_each_kind() {
        let mut folder: TaskList = TaskList::new();
        folder.set_gid("L1");
        let mut entities = vec![
            Entity::from(Task::new()),
            Entity::from(folder),
            Entity::from(MetaData::new()),
        ];

        for entity in &mut entities {
            entity
                .set_content_by_remote_json(&json!({ "name": "renamed", "last_modified": 5 }))
                .unwrap();
            assert_eq!(entity.node().name(), "renamed");
            assert_eq!(entity.node().last_modified(), 5);
        }

        let row = NoteRow {
            id: 1,
            sync_id: 5,
            local_modified: false,
            gtask_id: None,
        };
        assert_eq!(entities[1].sync_action(&row), Some(SyncAction::None));
        assert_eq!(entities[0].sync_action(&row), Some(SyncAction::UpdateRemote));
        assert!(entities[1].update_action(2).is_ok());
        assert!(entities[0].update_action(2).is_err());
    }

    #[test]
    fn test_local_mut_maps_rows() {
        let mut note = Entity::from(Task::new());
        note.local_mut().unwrap().set_content_by_local_json(&json!({
            "meta_note": { "type": 0 },
            "meta_data": [{ "mime_type": "vnd.android.cursor.item/text_note", "content": "hi" }]
        }));
        assert_eq!(note.node().name(), "hi");

        let js = note.local_mut().unwrap().local_json_from_content().unwrap();
        assert_eq!(js["meta_data"][0]["content"], "hi");
    }
}
