//! Image prompt derivation.
//!
//! Without input images the user prompt is used verbatim. With input images
//! a vision call describes their style and composition first; a refusal or a
//! failed call falls back to a templated art-direction prompt, and an empty
//! reply keeps the user prompt.

use super::TRACING_TARGET;
use crate::provider::{TextProvider, TextRequest};

/// Default model for the image description call.
pub const DEFAULT_VISION_MODEL: &str = "gpt-4o";

/// Case-insensitive phrases that mark a description reply as a refusal.
pub const REFUSAL_PHRASES: &[&str] = &[
    "i can't help",
    "i cannot help",
    "sorry",
    "i'm unable",
    "i am unable",
    "cannot assist",
];

const DESCRIBER_INSTRUCTIONS: &str = "You are an image description expert for image generation. \
    Describe visual elements like style, colors, lighting, composition WITHOUT naming specific \
    characters or copyrighted content. Focus on artistic qualities. Output a prompt suitable for \
    generating a similar style image.";

/// Returns true if the reply contains a refusal phrase.
pub fn is_refusal(reply: &str) -> bool {
    let reply = reply.to_lowercase();
    REFUSAL_PHRASES.iter().any(|phrase| reply.contains(phrase))
}

/// Fallback prompt used when the description was refused.
pub fn refusal_fallback(user_prompt: &str) -> String {
    format!(
        "A detailed, realistic digital artwork. {user_prompt}. High quality, professional art style."
    )
}

/// Fallback prompt used when the description call failed.
pub fn failure_fallback(user_prompt: &str) -> String {
    format!("A detailed digital artwork. {user_prompt}. High quality art.")
}

fn description_request(model: &str, user_prompt: &str, images: &[String], max_tokens: u64) -> TextRequest {
    let prompt = format!(
        "Analyze the visual style and composition of this image. Then create a prompt to \
         generate a new version based on: \"{user_prompt}\". Do not mention any copyrighted \
         character names."
    );

    TextRequest::new(model, prompt)
        .with_system_prompt(DESCRIBER_INSTRUCTIONS)
        .with_images(images.to_vec())
        .with_max_tokens(max_tokens)
}

/// Derives the prompt sent to the image provider.
pub async fn derive_image_prompt(
    provider: &dyn TextProvider,
    vision_model: &str,
    user_prompt: &str,
    images: &[String],
    max_tokens: u64,
) -> String {
    if images.is_empty() {
        return user_prompt.to_owned();
    }

    let request = description_request(vision_model, user_prompt, images, max_tokens);
    match provider.complete(request).await {
        Ok(description) if is_refusal(&description) => {
            tracing::info!(
                target: TRACING_TARGET,
                "Image description refused, using fallback prompt"
            );
            refusal_fallback(user_prompt)
        }
        Ok(description) if description.trim().is_empty() => {
            tracing::info!(
                target: TRACING_TARGET,
                "Image description was empty, using the user prompt"
            );
            user_prompt.to_owned()
        }
        Ok(description) => description,
        Err(error) => {
            tracing::warn!(
                target: TRACING_TARGET,
                error = %error,
                "Image description failed, using fallback prompt"
            );
            failure_fallback(user_prompt)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, Result};

    const IMAGE: &str = "data:image/png;base64,iVBORw0KGgo=";

    /// Replies to every call with a fixed description result.
    struct Describer(fn() -> Result<String>);

    #[async_trait::async_trait]
    impl TextProvider for Describer {
        fn provider_name(&self) -> &'static str {
            "fake"
        }

        async fn complete(&self, _request: TextRequest) -> Result<String> {
            (self.0)()
        }
    }

    async fn derive(describer: Describer, images: &[String]) -> String {
        derive_image_prompt(&describer, DEFAULT_VISION_MODEL, "a castle", images, 1024).await
    }

    #[tokio::test]
    async fn without_images_the_prompt_is_verbatim() {
        let describer = Describer(|| panic!("no description call expected"));
        assert_eq!(derive(describer, &[]).await, "a castle");
    }

    #[tokio::test]
    async fn description_replaces_the_prompt() {
        let describer = Describer(|| Ok("misty towers, golden hour".to_owned()));
        let images = vec![IMAGE.to_owned()];
        assert_eq!(derive(describer, &images).await, "misty towers, golden hour");
    }

    #[tokio::test]
    async fn blank_description_keeps_the_user_prompt() {
        let images = vec![IMAGE.to_owned()];
        assert_eq!(derive(Describer(|| Ok(String::new())), &images).await, "a castle");
        assert_eq!(derive(Describer(|| Ok(" \n\t".to_owned())), &images).await, "a castle");
    }

    #[tokio::test]
    async fn refusal_and_failure_use_their_fallbacks() {
        let images = vec![IMAGE.to_owned()];

        let refused = Describer(|| Ok("Sorry, I can't help with that.".to_owned()));
        assert_eq!(derive(refused, &images).await, refusal_fallback("a castle"));

        let failed = Describer(|| Err(Error::provider("openai", "timeout")));
        assert_eq!(derive(failed, &images).await, failure_fallback("a castle"));
    }

    #[test]
    fn refusal_detection_is_case_insensitive() {
        assert!(is_refusal("I'm sorry, but I can't do that."));
        assert!(is_refusal("I CANNOT HELP with this request"));
        assert!(is_refusal("Unfortunately I am unable to describe it"));
        assert!(!is_refusal("A moody watercolor with warm lighting"));
    }

    #[test]
    fn fallbacks_embed_the_user_prompt() {
        assert_eq!(
            refusal_fallback("a castle"),
            "A detailed, realistic digital artwork. a castle. High quality, professional art style."
        );
        assert_eq!(
            failure_fallback("a castle"),
            "A detailed digital artwork. a castle. High quality art."
        );
    }

    #[test]
    fn description_request_carries_images_and_instructions() {
        let images = vec!["data:image/png;base64,AAAA".to_owned()];
        let request = description_request(DEFAULT_VISION_MODEL, "make it snowy", &images, 4096);

        assert_eq!(request.model, DEFAULT_VISION_MODEL);
        assert_eq!(request.images, images);
        assert!(request.user_prompt.contains("\"make it snowy\""));
        assert!(request.system_prompt.unwrap().contains("WITHOUT naming"));
    }
}
