//! Workflow documents: a named graph with identity and timestamps.

use derive_more::{Debug, Display, From, Into};
use jiff::Timestamp;
#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::WorkflowResult;
use crate::graph::{
    Connection, Edge, GeneratorData, Graph, ImageData, Node, NodeId, Position, TextData,
};

/// Name given to workflows created without one.
pub const DEFAULT_WORKFLOW_NAME: &str = "Untitled Workflow";

/// Unique identifier for a workflow document.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[derive(Debug, Display, From, Into)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[debug("{_0}")]
#[display("{_0}")]
#[serde(transparent)]
pub struct WorkflowId(Uuid);

impl WorkflowId {
    /// Creates a new unique workflow ID.
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

/// A persisted workflow document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct Workflow {
    /// Document identity.
    pub id: WorkflowId,
    /// Display name.
    pub name: String,
    /// Graph nodes.
    #[serde(default)]
    pub nodes: Vec<Node>,
    /// Graph edges.
    #[serde(default)]
    pub edges: Vec<Edge>,
    /// Creation time.
    pub created_at: Timestamp,
    /// Last modification time.
    pub updated_at: Timestamp,
}

impl Workflow {
    /// Creates a workflow with a fresh id. An empty name falls back to the default.
    pub fn new(name: impl Into<String>, graph: Graph) -> Self {
        let now = Timestamp::now();
        let name = name.into();
        let name = if name.trim().is_empty() {
            DEFAULT_WORKFLOW_NAME.to_owned()
        } else {
            name
        };

        Self {
            id: WorkflowId::generate(),
            name,
            nodes: graph.nodes,
            edges: graph.edges,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns a copy of the workflow graph.
    pub fn graph(&self) -> Graph {
        Graph::new(self.nodes.clone(), self.edges.clone())
    }

    /// Replaces the graph and bumps `updated_at`.
    pub fn set_graph(&mut self, graph: Graph) {
        self.nodes = graph.nodes;
        self.edges = graph.edges;
        self.touch();
    }

    /// Bumps `updated_at` to now.
    pub fn touch(&mut self) {
        self.updated_at = Timestamp::now();
    }

    /// Serializes the workflow as pretty-printed JSON.
    pub fn export_json(&self) -> WorkflowResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parses a workflow exported with [`export_json`](Self::export_json).
    pub fn import_json(json: &str) -> WorkflowResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Builds the "Product Listing Generator" demo workflow.
    ///
    /// A product photo and its specs feed an analysis generator whose text
    /// output drives three copywriting generators.
    pub fn sample() -> Self {
        let generator = |label: &str, system_prompt: &str, user_prompt: &str| GeneratorData {
            label: label.to_owned(),
            system_prompt: system_prompt.to_owned(),
            user_prompt: user_prompt.to_owned(),
            ..GeneratorData::default()
        };
        let node = |id: &str, x: f64, y: f64, kind: crate::graph::NodeKind| {
            Node::new(NodeId::from(id), Position::new(x, y), kind)
        };

        let nodes = vec![
            node(
                "img_product",
                50.0,
                150.0,
                ImageData {
                    label: "Product Photo".to_owned(),
                    image_url: Some("/images/cetaphil-sample.jpg".to_owned()),
                    image_base64: None,
                }
                .into(),
            ),
            node(
                "text_specs",
                50.0,
                400.0,
                TextData {
                    label: "Product Name & Specs".to_owned(),
                    content: "Cetaphil Paraben, Sulphate-Free Gentle Skin Hydrating Face Wash \
                              Cleanser with Niacinamide, Vitamin B5 for Dry to Normal, \
                              Sensitive Skin - 125ml"
                        .to_owned(),
                }
                .into(),
            ),
            node(
                "llm_analyze",
                450.0,
                200.0,
                generator(
                    "Analyze Product",
                    "You are a product analyst. Analyze the product image and specifications provided.",
                    "Analyze this product and provide key selling points and target audience.",
                )
                .into(),
            ),
            node(
                "llm_instagram",
                900.0,
                50.0,
                generator(
                    "Write Instagram Caption",
                    "Write Instagram caption for the described product.",
                    "Create an engaging Instagram caption for this product with relevant hashtags.",
                )
                .into(),
            ),
            node(
                "llm_seo",
                900.0,
                320.0,
                generator(
                    "Write SEO Meta Description",
                    "Write SEO meta description for the described product.",
                    "Write an SEO-optimized meta description (under 160 characters) for this product.",
                )
                .into(),
            ),
            node(
                "llm_amazon",
                900.0,
                590.0,
                generator(
                    "Write Amazon Listing",
                    "Write Amazon listing for the following described product.",
                    "Based on the product analysis, write a compelling Amazon product listing \
                     with title, bullet points, and description.",
                )
                .into(),
            ),
        ];

        let edge = |id: &str, source: &str, source_handle: Option<&str>, target: &str, handle: &str| {
            Edge {
                id: id.into(),
                ..Edge::from_connection(Connection::new(source, source_handle, target, Some(handle)))
            }
        };

        let edges = vec![
            edge("e1", "img_product", None, "llm_analyze", "image-0"),
            edge("e2", "text_specs", None, "llm_analyze", "prompt"),
            edge("e3", "llm_analyze", Some("output"), "llm_amazon", "prompt"),
            edge("e4", "llm_analyze", Some("output"), "llm_instagram", "prompt"),
            edge("e5", "llm_analyze", Some("output"), "llm_seo", "prompt"),
        ];

        Self::new("Product Listing Generator", Graph::new(nodes, edges))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{MAX_IMAGE_INPUTS, NodeType};
    use crate::store::{GraphStore, validate};

    #[test]
    fn empty_name_uses_default() {
        let workflow = Workflow::new("  ", Graph::default());
        assert_eq!(workflow.name, DEFAULT_WORKFLOW_NAME);
        assert_eq!(workflow.created_at, workflow.updated_at);
    }

    #[test]
    fn export_then_import_preserves_document() {
        let workflow = Workflow::sample();
        let json = workflow.export_json().unwrap();
        assert!(json.contains("\"createdAt\""));
        assert!(json.contains("\"type\": \"llm\""));

        let imported = Workflow::import_json(&json).unwrap();
        assert_eq!(imported, workflow);
    }

    #[test]
    fn import_clamps_image_input_counts() {
        for (stored, expected) in [(0, 1), (3, 3), (200, MAX_IMAGE_INPUTS), (70_000, MAX_IMAGE_INPUTS)] {
            let mut document: serde_json::Value =
                serde_json::from_str(&Workflow::sample().export_json().unwrap()).unwrap();
            for node in document["nodes"].as_array_mut().unwrap() {
                if node["type"] == "llm" {
                    node["data"]["imageInputCount"] = serde_json::json!(stored);
                }
            }

            let imported = Workflow::import_json(&document.to_string()).unwrap();
            let counts: Vec<_> = imported
                .nodes
                .iter()
                .filter_map(|node| node.as_generator())
                .map(|data| data.image_input_count)
                .collect();
            assert!(!counts.is_empty());
            assert!(counts.iter().all(|count| *count == expected), "{stored}: {counts:?}");
        }
    }

    #[test]
    fn import_rejects_malformed_json() {
        assert!(Workflow::import_json("{\"nodes\": [").is_err());
    }

    #[test]
    fn sample_edges_satisfy_connection_rules() {
        let workflow = Workflow::sample();
        assert_eq!(workflow.nodes.len(), 6);
        assert_eq!(
            workflow
                .nodes
                .iter()
                .filter(|node| node.node_type() == NodeType::Generator)
                .count(),
            4
        );

        let mut store = GraphStore::new();
        store.replace(Graph::new(workflow.nodes.clone(), Vec::new()));
        for edge in &workflow.edges {
            let connection = Connection::new(
                edge.source.clone(),
                edge.source_handle.as_deref(),
                edge.target.clone(),
                edge.target_handle.as_deref(),
            );
            assert_eq!(validate(store.graph(), &connection), Ok(()));
            store.connect(connection).unwrap();
        }
    }
}
