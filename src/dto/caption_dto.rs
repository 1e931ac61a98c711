use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CaptionRequest {
    #[validate(length(min = 1), url)]
    pub image_url: String,
    pub file_name: Option<String>,
    /// Which variant the caller plans to publish first. Defaults to telegram.
    pub platform: Option<String>,
    /// Forces a template category instead of classifying the file name.
    pub category: Option<String>,
    #[serde(default)]
    pub use_ai: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptionSet {
    pub telegram: String,
    pub x: String,
    pub linkedin: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptionMetadata {
    pub category: String,
    pub template_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub captured_on: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub camera: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptionResponse {
    pub captions: CaptionSet,
    pub active_platform: String,
    pub ai_generated: bool,
    pub alt_text: String,
    pub metadata: CaptionMetadata,
    /// Set when AI generation was requested but the service fell back to
    /// templates. The captions are still usable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
