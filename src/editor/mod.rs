//! Rope-backed text buffer for the editor pane.
//!
//! The buffer only knows about text and the cursor. Whether the text has
//! unsaved changes is tracked by [`crate::session::DocumentSession`], which
//! routes every mutation through [`EditorBuffer::apply`].

mod buffer;

pub use buffer::{Cursor, Direction, Edit, EditorBuffer};
