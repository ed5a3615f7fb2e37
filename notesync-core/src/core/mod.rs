//! Internal domain modules for the notesync core library.
//!
//! All public types from these modules are re-exported at the crate root
//! with `#[doc(inline)]`; import from there in preference to this module.

pub mod cursor;
pub mod entity;
pub mod error;
pub mod meta_data;
pub mod node;
pub mod settings;
pub mod strings;
pub mod task;
pub mod task_list;
pub(crate) mod wire;

#[doc(inline)]
pub use cursor::{
    NoteRow, RowCursor, GTASK_ID_COLUMN, ID_COLUMN, LOCAL_MODIFIED_COLUMN, SYNC_ID_COLUMN,
};
#[doc(inline)]
pub use entity::Entity;
#[doc(inline)]
pub use error::{Result, SyncError};
#[doc(inline)]
pub use meta_data::MetaData;
#[doc(inline)]
pub use node::{LocalNode, Node, NodeBase, NodeKey, RemotePatch, SyncAction};
#[doc(inline)]
pub use settings::{default_settings_path, load_settings, save_settings, SyncSettings};
#[doc(inline)]
pub use task::Task;
#[doc(inline)]
pub use task_list::{ChildTask, ListLink, TaskList};
