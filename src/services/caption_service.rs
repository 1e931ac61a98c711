use chrono::Utc;

use crate::captions::classifier;
use crate::captions::templates::{self, Category};
use crate::dto::caption_dto::{CaptionMetadata, CaptionRequest, CaptionResponse, CaptionSet};
use crate::error::{Error, Result};
use crate::services::exif_service::{ExifService, ImageInsights};
use crate::services::vision_service::{VisionAnalysis, VisionService};

const X_CHAR_BUDGET: usize = 250;
const X_HASHTAG_COUNT: usize = 2;
const LINKEDIN_PROMPT: &str = "What do you think? Share it in the comments 👇";

/// Produces the three per-destination captions for an image, either from the
/// template library or from the vision model, enriched with whatever EXIF
/// the image still carries.
#[derive(Clone)]
pub struct CaptionService {
    exif: ExifService,
    vision: VisionService,
}

impl CaptionService {
    pub fn new(exif: ExifService, vision: VisionService) -> Self {
        Self { exif, vision }
    }

    /// AI failures never fail the request: the response falls back to a
    /// template render and says so in `error`.
    pub async fn generate(&self, request: &CaptionRequest) -> Result<CaptionResponse> {
        let insights = self.exif.inspect(&request.image_url).await;
        let platform = normalize_platform(request.platform.as_deref());

        if request.use_ai {
            match self
                .vision
                .describe(&request.image_url, request.file_name.as_deref())
                .await
            {
                Ok(analysis) if !analysis.main_caption.trim().is_empty() => {
                    return Ok(self.render_ai(request, &insights, &analysis, platform));
                }
                Ok(_) => {
                    tracing::warn!("vision model returned an empty caption, using a template");
                    let mut response = self.render_template(request, &insights, platform);
                    response.error =
                        Some("AI returned an empty caption. Using a template instead.".to_string());
                    return Ok(response);
                }
                Err(err) => {
                    tracing::warn!("AI caption generation failed, using a template: {}", err);
                    let mut response = self.render_template(request, &insights, platform);
                    response.error = Some(ai_failure_message(&err));
                    return Ok(response);
                }
            }
        }

        Ok(self.render_template(request, &insights, platform))
    }

    fn render_template(
        &self,
        request: &CaptionRequest,
        insights: &ImageInsights,
        platform: &str,
    ) -> CaptionResponse {
        let category = match request.category.as_deref().and_then(Category::parse) {
            Some(forced) => forced,
            None => classifier::classify(request.file_name.as_deref()).category,
        };
        let mut values = classifier::placeholders_for(category, request.file_name.as_deref());

        let now = Utc::now();
        let config = crate::config::get_config();
        values.insert(
            "DATE".to_string(),
            insights
                .captured_on
                .clone()
                .unwrap_or_else(|| now.format("%B %-d, %Y").to_string()),
        );
        values.insert("MONTH".to_string(), now.format("%B").to_string());
        values.insert("YEAR".to_string(), now.format("%Y").to_string());
        values.insert("BRAND".to_string(), config.brand_name.clone());

        let template = templates::first_for_category(category);
        let telegram_body = templates::fill_template(template.telegram, &values);
        let x_body = templates::fill_template(template.x, &values);
        let linkedin_body = templates::fill_template(template.linkedin, &values);

        CaptionResponse {
            captions: CaptionSet {
                telegram: assemble_full(&telegram_body, insights, template.hashtags),
                x: assemble_x(&x_body, template.hashtags),
                // Template linkedin variants already end on their own
                // engagement line, so no extra prompt here.
                linkedin: assemble_linkedin(&linkedin_body, None, insights, template.hashtags),
            },
            active_platform: platform.to_string(),
            ai_generated: false,
            alt_text: alt_text(request.file_name.as_deref()),
            metadata: CaptionMetadata {
                category: category.as_str().to_string(),
                template_id: Some(template.id.to_string()),
                captured_on: insights.captured_on.clone(),
                camera: insights.camera.clone(),
                location: insights.location.clone(),
            },
            error: None,
        }
    }

    fn render_ai(
        &self,
        request: &CaptionRequest,
        insights: &ImageInsights,
        analysis: &VisionAnalysis,
        platform: &str,
    ) -> CaptionResponse {
        let category = classifier::classify(request.file_name.as_deref()).category;

        let mut body = analysis.main_caption.trim().to_string();
        let cta = analysis.cta.trim();
        if !cta.is_empty() {
            body.push_str("\n\n");
            body.push_str(cta);
        }

        let config = crate::config::get_config();
        let brand_tag = brand_hashtag(&config.brand_name);
        let tags = ["#content", "#marketing", "#branding", brand_tag.as_str()];

        CaptionResponse {
            captions: CaptionSet {
                telegram: assemble_full(&body, insights, &tags),
                x: assemble_x(&body, &tags),
                linkedin: assemble_linkedin(&body, Some(LINKEDIN_PROMPT), insights, &tags),
            },
            active_platform: platform.to_string(),
            ai_generated: true,
            alt_text: alt_text(request.file_name.as_deref()),
            metadata: CaptionMetadata {
                category: category.as_str().to_string(),
                template_id: None,
                captured_on: insights.captured_on.clone(),
                camera: insights.camera.clone(),
                location: insights.location.clone(),
            },
            error: None,
        }
    }
}

fn ai_failure_message(err: &Error) -> String {
    match err {
        Error::Config(_) => {
            "AI captions require an OpenAI API key. Using a template instead.".to_string()
        }
        _ => "AI caption generation failed. Using a template instead.".to_string(),
    }
}

fn normalize_platform(platform: Option<&str>) -> &'static str {
    match platform.map(|p| p.trim().to_lowercase()).as_deref() {
        Some("x") | Some("twitter") => "x",
        Some("linkedin") => "linkedin",
        _ => "telegram",
    }
}

fn alt_text(file_name: Option<&str>) -> String {
    file_name
        .map(classifier::humanize_file_name)
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| "Social media post image".to_string())
}

fn insight_lines(insights: &ImageInsights) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(date) = &insights.captured_on {
        lines.push(format!("📅 {}", date));
    }
    if let Some(camera) = &insights.camera {
        lines.push(format!("📷 Shot on {}", camera));
    }
    if let Some(location) = &insights.location {
        lines.push(format!("📍 {}", location));
    }
    lines
}

/// Telegram gets the whole thing: body, EXIF lines, every hashtag.
fn assemble_full(body: &str, insights: &ImageInsights, hashtags: &[&str]) -> String {
    let mut parts = vec![body.to_string()];
    let lines = insight_lines(insights);
    if !lines.is_empty() {
        parts.push(lines.join("\n"));
    }
    if !hashtags.is_empty() {
        parts.push(hashtags.join(" "));
    }
    parts.join("\n\n")
}

/// X gets a clipped body and at most two hashtags.
fn assemble_x(body: &str, hashtags: &[&str]) -> String {
    let mut out = truncate_chars(body, X_CHAR_BUDGET);
    let tags: Vec<&str> = hashtags.iter().take(X_HASHTAG_COUNT).copied().collect();
    if !tags.is_empty() {
        out.push_str("\n\n");
        out.push_str(&tags.join(" "));
    }
    out
}

fn assemble_linkedin(
    body: &str,
    prompt: Option<&str>,
    insights: &ImageInsights,
    hashtags: &[&str],
) -> String {
    let mut parts = vec![body.to_string()];
    match (&insights.captured_on, &insights.camera) {
        (Some(date), Some(camera)) => {
            parts.push(format!("Captured on {} with a {}", date, camera))
        }
        (Some(date), None) => parts.push(format!("Captured on {}", date)),
        (None, Some(camera)) => parts.push(format!("Shot on a {}", camera)),
        (None, None) => {}
    }
    if let Some(prompt) = prompt {
        parts.push(prompt.to_string());
    }
    if !hashtags.is_empty() {
        parts.push(hashtags.join(" "));
    }
    parts.join("\n\n")
}

/// Cuts on a character boundary and spends three of the budget on the
/// ellipsis, so the result never exceeds `limit` characters.
fn truncate_chars(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let cut: String = text.chars().take(limit.saturating_sub(3)).collect();
    format!("{}...", cut)
}

fn brand_hashtag(brand: &str) -> String {
    let cleaned: String = brand
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect::<String>()
        .to_lowercase();
    if cleaned.is_empty() {
        "#content".to_string()
    } else {
        format!("#{}", cleaned)
    }
}
