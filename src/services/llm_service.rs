//! LLM access - capability layer
//!
//! Only provides the "call the model" capability; knows nothing about page
//! roles, verification, or workflow order.
//!
//! ## Stack
//! - `async-openai` for API calls
//! - custom API endpoint and model names via [`Config`]
//! - works against any OpenAI-compatible service (Mistral is the default)

use std::future::Future;

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestMessageContentPartImage,
        ChatCompletionRequestMessageContentPartText, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, ChatCompletionRequestUserMessageContent,
        ChatCompletionRequestUserMessageContentPart, CreateChatCompletionRequestArgs, ImageDetail,
        ImageUrl,
    },
    Client,
};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult, LlmError};

/// The model boundary the pipeline depends on.
///
/// The core never assumes the response conforms to a requested JSON schema;
/// it must tolerate arbitrary free text. Tests substitute a scripted stub,
/// production uses [`LlmService`]. Constructed once per process and reused
/// across submissions.
pub trait ChatModel: Send + Sync {
    /// Send one chat request. `images` are base64-encoded page scans; when
    /// non-empty the call goes to the vision model.
    fn invoke(
        &self,
        user_message: &str,
        system_message: Option<&str>,
        images: &[String],
    ) -> impl Future<Output = AppResult<String>> + Send;
}

/// Chat client over an OpenAI-compatible endpoint.
///
/// Holds two model names: a text model for verification and formatting
/// judgments, and a vision model for per-page OCR extraction.
pub struct LlmService {
    client: Client<OpenAIConfig>,
    text_model: String,
    vision_model: String,
}

impl LlmService {
    pub fn new(config: &Config) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        let client = Client::with_config(openai_config);

        Self {
            client,
            text_model: config.llm_model_name.clone(),
            vision_model: config.ocr_model_name.clone(),
        }
    }
}

impl ChatModel for LlmService {
    async fn invoke(
        &self,
        user_message: &str,
        system_message: Option<&str>,
        images: &[String],
    ) -> AppResult<String> {
        // Vision extraction runs slightly warm; text judgments run cold.
        let (model, temperature, max_tokens) = if images.is_empty() {
            (&self.text_model, 0.0f32, 2048u32)
        } else {
            (&self.vision_model, 0.2f32, 2000u32)
        };

        debug!("calling LLM API, model: {}", model);
        debug!("user message length: {} chars", user_message.len());

        let mut messages = Vec::new();

        if let Some(sys_msg) = system_message {
            let system_msg = ChatCompletionRequestSystemMessageArgs::default()
                .content(sys_msg)
                .build()
                .map_err(|e| LlmError::RequestBuildFailed {
                    source: Box::new(e),
                })?;
            messages.push(ChatCompletionRequestMessage::System(system_msg));
        }

        let user_msg = if images.is_empty() {
            ChatCompletionRequestUserMessageArgs::default()
                .content(user_message)
                .build()
                .map_err(|e| LlmError::RequestBuildFailed {
                    source: Box::new(e),
                })?
        } else {
            // Vision API: text part followed by one image part per scan
            let mut content_parts: Vec<ChatCompletionRequestUserMessageContentPart> = Vec::new();

            content_parts.push(ChatCompletionRequestUserMessageContentPart::Text(
                ChatCompletionRequestMessageContentPartText {
                    text: user_message.to_string(),
                },
            ));

            for encoded in images.iter() {
                content_parts.push(ChatCompletionRequestUserMessageContentPart::ImageUrl(
                    ChatCompletionRequestMessageContentPartImage {
                        image_url: ImageUrl {
                            url: format!("data:image/jpeg;base64,{}", encoded),
                            detail: Some(ImageDetail::Auto),
                        },
                    },
                ));
            }

            debug!("using Vision API with {} image(s)", images.len());

            ChatCompletionRequestUserMessageArgs::default()
                .content(ChatCompletionRequestUserMessageContent::Array(
                    content_parts,
                ))
                .build()
                .map_err(|e| LlmError::RequestBuildFailed {
                    source: Box::new(e),
                })?
        };

        messages.push(ChatCompletionRequestMessage::User(user_msg));

        let request = CreateChatCompletionRequestArgs::default()
            .model(model)
            .messages(messages)
            .temperature(temperature)
            .max_tokens(max_tokens)
            .build()
            .map_err(|e| LlmError::RequestBuildFailed {
                source: Box::new(e),
            })?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("LLM API call failed: {}", e);
            AppError::llm_api_failed(model.clone(), e)
        })?;

        debug!("LLM API call succeeded");

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| AppError::llm_empty_content(model.clone()))?;

        Ok(content.trim().to_string())
    }
}
