//! Node definition types.

use derive_more::{Debug, Display, From, Into};
#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display as StrumDisplay, EnumString};
use uuid::Uuid;

use super::handle::{MAX_IMAGE_INPUTS, SourceHandle, TargetHandle};
use super::position::Position;

/// Unique identifier for a node in a workflow graph.
///
/// Identifiers are opaque strings so documents created elsewhere keep their
/// ids; freshly created nodes get a time-ordered UUID.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[derive(Debug, Display, From, Into)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[debug("{_0}")]
#[display("{_0}")]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Creates a new unique node ID.
    pub fn generate() -> Self {
        Self(format!("node_{}", Uuid::now_v7().simple()))
    }

    /// Creates a node ID from an existing string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// The kind tag of a node, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(AsRefStr, StrumDisplay, EnumString)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub enum NodeType {
    /// Text prompt source.
    #[serde(rename = "text")]
    #[strum(serialize = "text")]
    Text,
    /// Image source.
    #[serde(rename = "image")]
    #[strum(serialize = "image")]
    Image,
    /// Generation step.
    #[serde(rename = "llm")]
    #[strum(serialize = "llm")]
    Generator,
}

/// A workflow node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct Node {
    /// Unique node id.
    pub id: NodeId,
    /// Position on the editor canvas.
    #[serde(default)]
    pub position: Position,
    /// The node kind and its payload.
    #[serde(flatten)]
    pub kind: NodeKind,
    /// Whether the node is selected in the editor.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub selected: bool,
}

impl Node {
    /// Creates a node with the given id, position and payload.
    pub fn new(id: NodeId, position: Position, kind: impl Into<NodeKind>) -> Self {
        Self {
            id,
            position,
            kind: kind.into(),
            selected: false,
        }
    }

    /// Creates a node with a fresh id and the default payload for its type.
    pub fn with_defaults(node_type: NodeType, position: Position) -> Self {
        Self::new(NodeId::generate(), position, NodeKind::default_for(node_type))
    }

    /// Returns the node type tag.
    pub const fn node_type(&self) -> NodeType {
        self.kind.node_type()
    }

    /// Returns the generator payload, if this is a generator node.
    pub fn as_generator(&self) -> Option<&GeneratorData> {
        match &self.kind {
            NodeKind::Generator(data) => Some(data),
            _ => None,
        }
    }

    /// Returns true if this is a generator node with a run in flight.
    pub fn is_generating(&self) -> bool {
        self.as_generator().is_some_and(|data| data.is_loading)
    }

    /// Returns true if the node accepts edges on the given input port.
    pub fn exposes_target(&self, handle: TargetHandle) -> bool {
        match (&self.kind, handle) {
            (NodeKind::Generator(_), TargetHandle::Prompt) => true,
            (NodeKind::Generator(data), TargetHandle::Image(index)) => {
                index < data.image_input_count
            }
            _ => false,
        }
    }

    /// Returns true if the node emits edges from the given output port.
    pub fn exposes_source(&self, handle: SourceHandle) -> bool {
        match (&self.kind, handle) {
            (_, SourceHandle::Output) => true,
            (NodeKind::Generator(_), SourceHandle::ImageOutput) => true,
            _ => false,
        }
    }
}

/// Node kind with its kind-specific payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, From)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(tag = "type", content = "data")]
pub enum NodeKind {
    /// Text prompt source.
    #[serde(rename = "text")]
    Text(TextData),
    /// Image source.
    #[serde(rename = "image")]
    Image(ImageData),
    /// Generation step.
    #[serde(rename = "llm")]
    Generator(GeneratorData),
}

impl NodeKind {
    /// Returns the default payload for a node type.
    pub fn default_for(node_type: NodeType) -> Self {
        match node_type {
            NodeType::Text => Self::Text(TextData::default()),
            NodeType::Image => Self::Image(ImageData::default()),
            NodeType::Generator => Self::Generator(GeneratorData::default()),
        }
    }

    /// Returns the node type tag.
    pub const fn node_type(&self) -> NodeType {
        match self {
            Self::Text(_) => NodeType::Text,
            Self::Image(_) => NodeType::Image,
            Self::Generator(_) => NodeType::Generator,
        }
    }
}

/// Payload of a text node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(default, rename_all = "camelCase")]
pub struct TextData {
    /// Display label.
    pub label: String,
    /// Prompt text.
    pub content: String,
}

impl Default for TextData {
    fn default() -> Self {
        Self {
            label: "Text Input".to_owned(),
            content: String::new(),
        }
    }
}

/// Payload of an image node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(default, rename_all = "camelCase")]
pub struct ImageData {
    /// Display label.
    pub label: String,
    /// Durable reference, or inline bytes as a display fallback.
    pub image_url: Option<String>,
    /// Inline bytes used for provider calls.
    pub image_base64: Option<String>,
}

impl ImageData {
    /// Returns the durable remote reference, if there is one.
    pub fn remote_url(&self) -> Option<&str> {
        self.image_url
            .as_deref()
            .filter(|url| url.starts_with("http"))
    }
}

impl Default for ImageData {
    fn default() -> Self {
        Self {
            label: "Image".to_owned(),
            image_url: None,
            image_base64: None,
        }
    }
}

/// Payload of a generator node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(default, rename_all = "camelCase")]
pub struct GeneratorData {
    /// Display label.
    pub label: String,
    /// Text model identifier.
    pub model: String,
    /// System prompt.
    pub system_prompt: String,
    /// User prompt, used when no prompt input is connected.
    pub user_prompt: String,
    /// Text result of the last run.
    pub response: Option<String>,
    /// Inline image result of the last run.
    pub generated_image: Option<String>,
    /// Whether a run is in flight. Never persisted as true.
    pub is_loading: bool,
    /// Error of the last run.
    pub error: Option<String>,
    /// Number of `image-*` input handles, between 1 and 5.
    #[serde(deserialize_with = "deserialize_image_input_count")]
    pub image_input_count: u8,
}

fn deserialize_image_input_count<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let count = u64::deserialize(deserializer)?;
    let count = u8::try_from(count).unwrap_or(u8::MAX);
    Ok(GeneratorData::clamp_image_inputs(count))
}

impl Default for GeneratorData {
    fn default() -> Self {
        Self {
            label: "LLM".to_owned(),
            model: "gpt-4o".to_owned(),
            system_prompt: String::new(),
            user_prompt: String::new(),
            response: None,
            generated_image: None,
            is_loading: false,
            error: None,
            image_input_count: 1,
        }
    }
}

impl GeneratorData {
    /// Clamps a requested image input count to the supported range.
    pub fn clamp_image_inputs(count: u8) -> u8 {
        count.clamp(1, MAX_IMAGE_INPUTS)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn defaults_match_node_type() {
        let node = Node::with_defaults(NodeType::Generator, Position::new(10.0, 20.0));
        let data = node.as_generator().unwrap();
        assert_eq!(data.label, "LLM");
        assert_eq!(data.model, "gpt-4o");
        assert_eq!(data.image_input_count, 1);
        assert!(node.id.as_str().starts_with("node_"));

        let NodeKind::Image(image) = NodeKind::default_for(NodeType::Image) else {
            panic!("expected image payload");
        };
        assert_eq!(image.label, "Image");
        assert_eq!(image.image_url, None);
    }

    #[test]
    fn generated_ids_are_unique() {
        assert_ne!(NodeId::generate(), NodeId::generate());
    }

    #[test]
    fn serializes_editor_document_shape() {
        let node = Node::new(
            NodeId::from("text_1"),
            Position::new(1.0, 2.0),
            TextData {
                label: "Prompt".to_owned(),
                content: "hello".to_owned(),
            },
        );

        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(
            value,
            json!({
                "id": "text_1",
                "position": {"x": 1.0, "y": 2.0},
                "type": "text",
                "data": {"label": "Prompt", "content": "hello"},
            })
        );
    }

    #[test]
    fn deserializes_partial_generator_payload() {
        let node: Node = serde_json::from_value(json!({
            "id": "llm_1",
            "type": "llm",
            "position": {"x": 0, "y": 0},
            "data": {"systemPrompt": "be brief", "imageInputCount": 3},
            "measured": {"width": 380, "height": 200},
        }))
        .unwrap();

        let data = node.as_generator().unwrap();
        assert_eq!(data.system_prompt, "be brief");
        assert_eq!(data.image_input_count, 3);
        assert_eq!(data.model, "gpt-4o");
        assert!(!node.selected);
    }

    #[test]
    fn generator_exposes_numbered_image_ports() {
        let mut node = Node::with_defaults(NodeType::Generator, Position::default());
        assert!(node.exposes_target(TargetHandle::Prompt));
        assert!(node.exposes_target(TargetHandle::Image(0)));
        assert!(!node.exposes_target(TargetHandle::Image(1)));

        if let NodeKind::Generator(data) = &mut node.kind {
            data.image_input_count = 3;
        }
        assert!(node.exposes_target(TargetHandle::Image(2)));
        assert!(node.exposes_source(SourceHandle::ImageOutput));
    }

    #[test]
    fn sources_expose_no_inputs() {
        let text = Node::with_defaults(NodeType::Text, Position::default());
        assert!(!text.exposes_target(TargetHandle::Prompt));
        assert!(text.exposes_source(SourceHandle::Output));
        assert!(!text.exposes_source(SourceHandle::ImageOutput));
    }

    #[test]
    fn remote_url_requires_http_scheme() {
        let mut image = ImageData::default();
        assert_eq!(image.remote_url(), None);

        image.image_url = Some("data:image/png;base64,AAAA".to_owned());
        assert_eq!(image.remote_url(), None);

        image.image_url = Some("https://cdn.example.com/a.png".to_owned());
        assert_eq!(image.remote_url(), Some("https://cdn.example.com/a.png"));
    }
}
