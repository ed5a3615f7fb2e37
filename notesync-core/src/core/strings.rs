//! Key names and well-known values shared by the wire protocol and the local
//! row mapping.

// Remote wire protocol.
pub const JSON_ACTION_TYPE: &str = "action_type";
pub const JSON_ACTION_TYPE_CREATE: &str = "create";
pub const JSON_ACTION_TYPE_UPDATE: &str = "update";
pub const JSON_ACTION_ID: &str = "action_id";
pub const JSON_INDEX: &str = "index";
pub const JSON_ENTITY_DELTA: &str = "entity_delta";
pub const JSON_NAME: &str = "name";
pub const JSON_CREATOR_ID: &str = "creator_id";
pub const JSON_ENTITY_TYPE: &str = "entity_type";
pub const JSON_NOTES: &str = "notes";
pub const JSON_PARENT_ID: &str = "parent_id";
pub const JSON_DEST_PARENT_TYPE: &str = "dest_parent_type";
pub const JSON_LIST_ID: &str = "list_id";
pub const JSON_PRIOR_SIBLING_ID: &str = "prior_sibling_id";
pub const JSON_ID: &str = "id";
pub const JSON_DELETED: &str = "deleted";
pub const JSON_LAST_MODIFIED: &str = "last_modified";
pub const JSON_COMPLETED: &str = "completed";
pub const JSON_TYPE_TASK: &str = "TASK";
pub const JSON_TYPE_GROUP: &str = "GROUP";

/// Sent as `creator_id` in every create record; the service fills in the owner.
pub const CREATOR_PLACEHOLDER: &str = "null";

// Local row mapping.
pub const META_HEAD_NOTE: &str = "meta_note";
pub const META_HEAD_DATA: &str = "meta_data";
pub const META_HEAD_GTASK_ID: &str = "meta_gid";
pub const NOTE_ID: &str = "_id";
pub const NOTE_TYPE: &str = "type";
pub const NOTE_SNIPPET: &str = "snippet";
pub const DATA_CONTENT: &str = "content";
pub const DATA_MIME_TYPE: &str = "mime_type";

/// Mime marker of the field-group that holds a plain note's text.
pub const MIME_TEXT_NOTE: &str = "vnd.android.cursor.item/text_note";

/// Row types of the local store.
pub const TYPE_NOTE: i64 = 0;
pub const TYPE_FOLDER: i64 = 1;
pub const TYPE_SYSTEM: i64 = 2;

/// Row ids of the local store's system folders.
pub const ID_ROOT_FOLDER: i64 = 0;
pub const ID_CALL_RECORD_FOLDER: i64 = -2;

/// Prefix that marks remote groups owned by this application.
pub const FOLDER_PREFIX: &str = "[MIUI_Notes]";
pub const FOLDER_DEFAULT: &str = "Default";
pub const FOLDER_CALL_NOTE: &str = "Call_Note";
pub const FOLDER_META: &str = "METADATA";

/// Name carried by every hidden link record.
pub const META_NOTE_NAME: &str = "[META INFO] DON'T UPDATE AND DELETE";
