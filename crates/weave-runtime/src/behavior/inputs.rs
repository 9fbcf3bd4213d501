//! Upstream input collection for generator nodes.

use weave_rig::provider::data_url;

use super::{ImageFetcher, TRACING_TARGET};
use crate::graph::{Graph, NodeId, NodeKind, SourceHandle, TargetHandle};

/// An image contributed by an upstream node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageInput {
    /// Inline `data:` URL, ready for provider calls.
    Inline(String),
    /// Durable reference that must be fetched and encoded first.
    Remote(String),
}

/// What each incoming edge contributes, before any network access.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputPlan {
    /// Text arriving on the `prompt` handle.
    pub prompt_text: String,
    /// Images in ascending `image-*` handle order.
    pub images: Vec<ImageInput>,
}

/// Resolved inputs for a generator run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectedInputs {
    /// Text arriving on the `prompt` handle.
    pub prompt_text: String,
    /// Inline images in ascending `image-*` handle order.
    pub images: Vec<String>,
}

/// Reads the values flowing into a generator node.
///
/// A generator contributes its text through `output` and its image through
/// `image-output`; any other pairing contributes nothing.
///
/// Edges are visited in target handle order (`prompt`, then `image-0`,
/// `image-1`, ...) so the image list is deterministic regardless of the order
/// the edges were created in. Edges with an unknown target handle or a
/// missing source contribute nothing.
pub fn plan_inputs(graph: &Graph, node_id: &NodeId) -> InputPlan {
    let mut incoming: Vec<_> = graph
        .incoming(node_id)
        .filter_map(|edge| Some((edge.target_port()?, edge)))
        .collect();
    incoming.sort_by_key(|(port, _)| *port);

    let mut plan = InputPlan::default();
    for (port, edge) in incoming {
        let Some(source) = graph.node(&edge.source) else {
            continue;
        };

        match (port, &source.kind) {
            (TargetHandle::Prompt, NodeKind::Text(data)) => {
                plan.prompt_text = data.content.clone();
            }
            (TargetHandle::Prompt, NodeKind::Generator(data))
                if edge.source_port() == Some(SourceHandle::Output) =>
            {
                plan.prompt_text = data.response.clone().unwrap_or_default();
            }
            (TargetHandle::Image(_), NodeKind::Image(data)) => {
                let inline = data
                    .image_base64
                    .clone()
                    .or_else(|| data.image_url.clone().filter(|url| data_url::is_inline(url)));

                if let Some(inline) = inline {
                    plan.images.push(ImageInput::Inline(inline));
                } else if let Some(url) = data.remote_url() {
                    plan.images.push(ImageInput::Remote(url.to_owned()));
                }
            }
            (TargetHandle::Image(_), NodeKind::Generator(data))
                if edge.source_port() == Some(SourceHandle::ImageOutput) =>
            {
                if let Some(image) = &data.generated_image {
                    plan.images.push(ImageInput::Inline(image.clone()));
                }
            }
            _ => {}
        }
    }

    plan
}

/// Collects a generator's inputs, fetching remote images as needed.
///
/// A remote image that cannot be fetched is dropped from the list.
pub async fn collect_inputs(
    graph: &Graph,
    node_id: &NodeId,
    fetcher: &dyn ImageFetcher,
) -> CollectedInputs {
    let plan = plan_inputs(graph, node_id);

    let mut images = Vec::with_capacity(plan.images.len());
    for image in plan.images {
        match image {
            ImageInput::Inline(inline) => images.push(inline),
            ImageInput::Remote(url) => match fetcher.fetch(&url).await {
                Ok(inline) => images.push(inline),
                Err(error) => {
                    tracing::warn!(
                        target: TRACING_TARGET,
                        node_id = %node_id,
                        url = %url,
                        error = %error,
                        "Dropping image input that could not be fetched"
                    );
                }
            },
        }
    }

    tracing::debug!(
        target: TRACING_TARGET,
        node_id = %node_id,
        prompt_len = plan.prompt_text.len(),
        image_count = images.len(),
        "Collected generator inputs"
    );

    CollectedInputs {
        prompt_text: plan.prompt_text,
        images,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::graph::{
        Connection, Edge, GeneratorData, ImageData, Node, Position, TextData,
    };
    use crate::{WorkflowError, WorkflowResult};

    struct MapFetcher(HashMap<String, String>);

    #[async_trait::async_trait]
    impl ImageFetcher for MapFetcher {
        async fn fetch(&self, url: &str) -> WorkflowResult<String> {
            self.0
                .get(url)
                .cloned()
                .ok_or_else(|| WorkflowError::fetch(format!("no fixture for {url}")))
        }
    }

    fn node(id: &str, kind: impl Into<NodeKind>) -> Node {
        Node::new(NodeId::from(id), Position::default(), kind)
    }

    fn edge(source: &str, source_handle: Option<&str>, target: &str, handle: &str) -> Edge {
        Edge::from_connection(Connection::new(source, source_handle, target, Some(handle)))
    }

    fn image(base64: Option<&str>, url: Option<&str>) -> ImageData {
        ImageData {
            image_base64: base64.map(str::to_owned),
            image_url: url.map(str::to_owned),
            ..ImageData::default()
        }
    }

    fn generator(images: u8) -> GeneratorData {
        GeneratorData {
            image_input_count: images,
            ..GeneratorData::default()
        }
    }

    #[test]
    fn text_source_feeds_prompt() {
        let graph = Graph::new(
            vec![
                node(
                    "text",
                    TextData {
                        content: "a lighthouse at dusk".to_owned(),
                        ..TextData::default()
                    },
                ),
                node("llm", generator(1)),
            ],
            vec![edge("text", None, "llm", "prompt")],
        );

        let plan = plan_inputs(&graph, &NodeId::from("llm"));
        assert_eq!(plan.prompt_text, "a lighthouse at dusk");
        assert!(plan.images.is_empty());
    }

    #[test]
    fn chained_generator_feeds_text_and_image() {
        let upstream = GeneratorData {
            response: Some("a short tagline".to_owned()),
            generated_image: Some("data:image/png;base64,AAAA".to_owned()),
            ..GeneratorData::default()
        };
        let graph = Graph::new(
            vec![node("up", upstream), node("down", generator(1))],
            vec![
                edge("up", Some("output"), "down", "prompt"),
                edge("up", Some("image-output"), "down", "image-0"),
            ],
        );

        let plan = plan_inputs(&graph, &NodeId::from("down"));
        assert_eq!(plan.prompt_text, "a short tagline");
        assert_eq!(
            plan.images,
            vec![ImageInput::Inline("data:image/png;base64,AAAA".to_owned())]
        );
    }

    #[test]
    fn images_follow_handle_order() {
        let graph = Graph::new(
            vec![
                node("a", image(Some("data:a"), None)),
                node("b", image(None, Some("https://cdn.example.com/b.png"))),
                node("c", image(None, Some("data:c"))),
                node("llm", generator(3)),
            ],
            vec![
                edge("c", None, "llm", "image-2"),
                edge("a", None, "llm", "image-0"),
                edge("b", None, "llm", "image-1"),
            ],
        );

        let plan = plan_inputs(&graph, &NodeId::from("llm"));
        assert_eq!(
            plan.images,
            vec![
                ImageInput::Inline("data:a".to_owned()),
                ImageInput::Remote("https://cdn.example.com/b.png".to_owned()),
                ImageInput::Inline("data:c".to_owned()),
            ]
        );
    }

    #[test]
    fn empty_sources_contribute_nothing() {
        let graph = Graph::new(
            vec![
                node("img", image(None, None)),
                node("up", generator(1)),
                node("llm", generator(2)),
            ],
            vec![
                edge("img", None, "llm", "image-0"),
                edge("up", Some("image-output"), "llm", "image-1"),
                edge("ghost", None, "llm", "prompt"),
            ],
        );

        assert_eq!(plan_inputs(&graph, &NodeId::from("llm")), InputPlan::default());
    }

    #[tokio::test]
    async fn remote_images_are_fetched_or_dropped() {
        let graph = Graph::new(
            vec![
                node("ok", image(None, Some("https://cdn.example.com/ok.png"))),
                node("gone", image(None, Some("https://cdn.example.com/gone.png"))),
                node("llm", generator(2)),
            ],
            vec![
                edge("ok", None, "llm", "image-0"),
                edge("gone", None, "llm", "image-1"),
            ],
        );
        let fetcher = MapFetcher(HashMap::from([(
            "https://cdn.example.com/ok.png".to_owned(),
            "data:image/png;base64,b2s=".to_owned(),
        )]));

        let inputs = collect_inputs(&graph, &NodeId::from("llm"), &fetcher).await;
        assert_eq!(inputs.images, vec!["data:image/png;base64,b2s=".to_owned()]);
    }
}
