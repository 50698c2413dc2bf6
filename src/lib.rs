//! Menu Tree Editor Core
//!
//! Converts between the nested menu hierarchy stored by the backend and
//! the flat, string-addressable tree consumed by the drag-and-drop UI,
//! derives minimal persistence payloads after a drag move, and cascades
//! checkbox state through the hierarchy.
//!
//! The backend forest is the durable store. A [`FlatTree`] is derived
//! from it on demand, mutated during a drag gesture, and converted back —
//! in full via [`rehierarchize`], or as a minimal diff via
//! [`compute_move_diff`]. All operations are pure and synchronous: each
//! takes a snapshot and returns a new one, so they are safe to call
//! straight from a UI event handler.

mod cascade;
mod error;
mod flatten;
mod models;
mod move_diff;
mod rehierarchize;


pub use cascade::{set_all, toggle};
pub use error::{TreeError, TreeResult};
pub use flatten::flatten;
pub use models::{FlatNode, FlatTree, MenuNode, ROOT_ID};
pub use move_diff::{compute_move_diff, move_node, MovePosition};
pub use rehierarchize::rehierarchize;
