//! Outbound change records sent to the remote task service.
//!
//! Records are built as typed structs and serialized into a JSON object.
//! Optional keys are omitted rather than sent as `null`.

use crate::core::strings::{
    CREATOR_PLACEHOLDER, JSON_ACTION_TYPE_CREATE, JSON_ACTION_TYPE_UPDATE,
};
use crate::{Result, SyncError};
use serde::Serialize;
use serde_json::Value;

/// The partial field set describing what to create or change.
#[derive(Debug, Clone, Default, Serialize)]
pub(crate) struct EntityDelta<'a> {
    pub name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator_id: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted: Option<bool>,
}

impl<'a> EntityDelta<'a> {
    /// Delta for a create record of the given entity type.
    pub fn create(name: &'a str, entity_type: &'static str) -> Self {
        Self {
            name,
            creator_id: Some(CREATOR_PLACEHOLDER),
            entity_type: Some(entity_type),
            ..Self::default()
        }
    }
}

/// "Create me remotely."
#[derive(Debug, Clone, Serialize)]
pub(crate) struct CreateRecord<'a> {
    pub action_type: &'static str,
    pub action_id: i64,
    pub index: i64,
    pub entity_delta: EntityDelta<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dest_parent_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prior_sibling_id: Option<&'a str>,
}

impl<'a> CreateRecord<'a> {
    pub fn new(action_id: i64, index: i64, entity_delta: EntityDelta<'a>) -> Self {
        Self {
            action_type: JSON_ACTION_TYPE_CREATE,
            action_id,
            index,
            entity_delta,
            parent_id: None,
            dest_parent_type: None,
            list_id: None,
            prior_sibling_id: None,
        }
    }
}

/// "Update me remotely." Never carries ordering fields.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct UpdateRecord<'a> {
    pub action_type: &'static str,
    pub action_id: i64,
    pub id: &'a str,
    pub entity_delta: EntityDelta<'a>,
}

impl<'a> UpdateRecord<'a> {
    pub fn new(action_id: i64, id: &'a str, entity_delta: EntityDelta<'a>) -> Self {
        Self {
            action_type: JSON_ACTION_TYPE_UPDATE,
            action_id,
            id,
            entity_delta,
        }
    }
}

/// Serializes `record`, reporting failure as [`SyncError::ActionFailed`].
pub(crate) fn to_record<T: Serialize>(record: &T, what: &str) -> Result<Value> {
    serde_json::to_value(record)
        .map_err(|e| SyncError::action_failed_with(format!("fail to generate {what} record"), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::strings::{
        JSON_ACTION_ID, JSON_ACTION_TYPE, JSON_CREATOR_ID, JSON_DELETED, JSON_DEST_PARENT_TYPE,
        JSON_ENTITY_DELTA, JSON_ENTITY_TYPE, JSON_ID, JSON_INDEX, JSON_LIST_ID, JSON_NAME,
        JSON_NOTES, JSON_PARENT_ID, JSON_PRIOR_SIBLING_ID, JSON_TYPE_GROUP, JSON_TYPE_TASK,
    };
    use serde_json::json;

    #[test]
    fn test_create_record_omits_unset_keys() {
        let record = CreateRecord::new(3, 1, EntityDelta::create("Inbox", "GROUP"));
        let value = to_record(&record, "tasklist-create").unwrap();

        assert_eq!(
            value,
            json!({
                "action_type": "create",
                "action_id": 3,
                "index": 1,
                "entity_delta": { "name": "Inbox", "creator_id": "null", "entity_type": "GROUP" }
            })
        );
    }

    #[test]
    fn test_update_record_shape() {
        let delta = EntityDelta {
            name: "n",
            deleted: Some(false),
            ..EntityDelta::default()
        };
        let value = to_record(&UpdateRecord::new(9, "gid", delta), "task-update").unwrap();
        assert_eq!(value["action_type"], "update");
        assert_eq!(value["id"], "gid");
        assert_eq!(value["entity_delta"], json!({ "name": "n", "deleted": false }));
    }

    fn keys(value: &Value) -> Vec<&str> {
        let mut keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    fn sorted<'a>(mut keys: Vec<&'a str>) -> Vec<&'a str> {
        keys.sort_unstable();
        keys
    }

    #[test]
    fn test_serialized_keys_match_protocol_names() {
        let mut delta = EntityDelta::create("n", JSON_TYPE_TASK);
        delta.notes = Some("body");
        delta.deleted = Some(false);
        let mut record = CreateRecord::new(1, 0, delta);
        record.parent_id = Some("p");
        record.dest_parent_type = Some(JSON_TYPE_GROUP);
        record.list_id = Some("p");
        record.prior_sibling_id = Some("s");
        let create = to_record(&record, "task-create").unwrap();

        assert_eq!(
            keys(&create),
            sorted(vec![
                JSON_ACTION_TYPE,
                JSON_ACTION_ID,
                JSON_INDEX,
                JSON_ENTITY_DELTA,
                JSON_PARENT_ID,
                JSON_DEST_PARENT_TYPE,
                JSON_LIST_ID,
                JSON_PRIOR_SIBLING_ID,
            ])
        );
        assert_eq!(
            keys(&create[JSON_ENTITY_DELTA]),
            sorted(vec![JSON_NAME, JSON_CREATOR_ID, JSON_ENTITY_TYPE, JSON_NOTES, JSON_DELETED])
        );

        let update = to_record(&UpdateRecord::new(2, "g", EntityDelta::default()), "task-update").unwrap();
        assert_eq!(
            keys(&update),
            sorted(vec![JSON_ACTION_TYPE, JSON_ACTION_ID, JSON_ID, JSON_ENTITY_DELTA])
        );
    }
}
