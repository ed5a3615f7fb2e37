//! Core library for notesync, which mirrors a local note store against a
//! remote task service.
//!
//! Notes map to remote tasks, folders to remote task groups, and each synced
//! note gets a hidden link record in a dedicated metadata group. The types
//! here build the outbound change records, absorb remote entities, map to and
//! from local row records, and decide the sync action for each entity. The
//! reconciliation driver and the transport live outside this crate.
//!
//! Types are re-exported from their respective sub-modules for convenience;
//! consumers should import from the crate root rather than the `core` module.

pub mod core;

// Re-export commonly used types.
#[doc(inline)]
pub use core::{
    cursor::{NoteRow, RowCursor, GTASK_ID_COLUMN, ID_COLUMN, LOCAL_MODIFIED_COLUMN, SYNC_ID_COLUMN},
    entity::Entity,
    error::{Result, SyncError},
    meta_data::MetaData,
    node::{LocalNode, Node, NodeBase, NodeKey, RemotePatch, SyncAction},
    settings::{default_settings_path, load_settings, save_settings, SyncSettings},
    strings,
    task::Task,
    task_list::{ChildTask, ListLink, TaskList},
};
