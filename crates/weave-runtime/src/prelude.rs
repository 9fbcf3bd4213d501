//! Prelude module for convenient imports.
//!
//! ```rust
//! use weave_runtime::prelude::*;
//! ```

pub use crate::behavior::{CollectedInputs, HttpImageFetcher, ImageFetcher, collect_inputs};
pub use crate::error::{WorkflowError, WorkflowResult};
pub use crate::graph::{
    Connection, Edge, EdgeChange, EdgeId, Graph, HandleSide, Node, NodeChange, NodeId, NodeKind,
    NodePatch, NodeType, Position,
};
pub use crate::sanitize::sanitize;
pub use crate::session::{AutoSaveConfig, EditorSession, ImageUploader, WorkflowStorage};
pub use crate::store::{GraphStore, Rejection};
pub use crate::workflow::{Workflow, WorkflowId};
