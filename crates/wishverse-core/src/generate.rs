//! Image generation against the Gemini `generateContent` endpoint.
//!
//! Request construction (prompt cases, the refinement rule, wire types) is
//! pure and host-testable; `GeminiClient` only does the HTTP round trip.

use crate::data_uri::format_data_uri;
use crate::imaging::reference_payload;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-image";
pub const DEFAULT_ASPECT_RATIO: &str = "3:4";
pub const MAX_REFERENCE_EDGE: u32 = 512;
pub const REFERENCE_JPEG_QUALITY: u8 = 70;

const STYLE_PROMPT: &str = "\
Target Art Style: \"Cardcaptor Sakura\" (CCS) / CLAMP anime illustration style. \
Visual Traits: Detailed ink lines, soft cel-shading, watercolor texture overlays, magical sparkles (kira-kira), ornate composition. \
CRITICAL INSTRUCTION FOR REFERENCE IMAGE: \
If a reference image is provided, you must perform a STRICT STYLE TRANSFER. \
1. PRESERVE THE ORIGINAL CAKE'S COLOR PALETTE AND INGREDIENTS. \
If the input is a brown chocolate cake, the output MUST be a brown chocolate cake. \
If the input is a matcha cake, the output MUST be green. \
DO NOT turn a dark cake into a pink/white cake just because of the \"Sakura\" theme. \
2. PRESERVE THE ORIGINAL CAKE'S SHAPE AND STRUCTURE. \
3. Only change the *rendering style* (line art, shading) and add *external* decorative elements (wings, petals, ribbons) around the subject.";

const NEGATIVE_PROMPT: &str = "Do not include: photorealistic textures, 3D render style, text overlays, \
copyright watermarks, blurry details, distorted perspective. Do not change the flavor or color of the food itself.";

/// Generation settings. Compile-time env provides the defaults; the page can
/// override key and model at startup.
#[derive(Clone, Debug, PartialEq)]
pub struct GeneratorConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub aspect_ratio: String,
    pub max_reference_edge: u32,
    pub jpeg_quality: u8,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            api_key: option_env!("WISHVERSE_API_KEY").unwrap_or_default().to_string(),
            model: option_env!("WISHVERSE_MODEL").unwrap_or(DEFAULT_MODEL).to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            aspect_ratio: DEFAULT_ASPECT_RATIO.to_string(),
            max_reference_edge: MAX_REFERENCE_EDGE,
            jpeg_quality: REFERENCE_JPEG_QUALITY,
        }
    }
}

impl GeneratorConfig {
    /// Apply non-empty runtime overrides.
    pub fn with_overrides(mut self, api_key: Option<String>, model: Option<String>) -> Self {
        if let Some(k) = api_key.filter(|k| !k.trim().is_empty()) {
            self.api_key = k.trim().to_string();
        }
        if let Some(m) = model.filter(|m| !m.trim().is_empty()) {
            self.model = m.trim().to_string();
        }
        self
    }

    pub fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("no API key configured")]
    MissingApiKey,
    #[error("request failed: {0}")]
    Request(String),
    #[error("api returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unreadable response: {0}")]
    Parse(String),
    #[error("response contained no image")]
    NoImage,
}

/// What the creator asks for: prompt text, optional reference image (data
/// URI) and whether this iterates on a previous result.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub reference: Option<String>,
    pub refinement: bool,
}

impl GenerationRequest {
    /// An upload always wins as the reference with refinement off; otherwise
    /// a prior generated image is refined; otherwise plain text-to-image.
    pub fn new(prompt: &str, upload: Option<&str>, previous: Option<&str>) -> Self {
        let (reference, refinement) = match (upload, previous) {
            (Some(u), _) => (Some(u.to_string()), false),
            (None, Some(p)) => (Some(p.to_string()), true),
            (None, None) => (None, false),
        };
        Self {
            prompt: prompt.to_string(),
            reference,
            refinement,
        }
    }

    pub fn text(&self) -> String {
        build_prompt(&self.prompt, self.reference.is_some(), self.refinement)
    }
}

pub fn build_prompt(user: &str, has_reference: bool, refinement: bool) -> String {
    let lead = if has_reference && !refinement {
        format!(
            "Redraw this exact cake in Cardcaptor Sakura anime style. Strict Requirement: Keep the original \
             cake's color (e.g. chocolate stays brown) and flavor. Do not change the cake's material. \
             Add magical CLAMP-style decorations around it. User Note: {user}."
        )
    } else if refinement {
        format!("Refine this anime cake illustration. Enhance the Cardcaptor Sakura style. User Request: \"{user}\".")
    } else {
        format!(
            "Generate a Cardcaptor Sakura style anime cake. User Description: \"{user}\". \
             Colors: Soft Pastels (Sakura Pink, Creamy White, Gold) unless specified otherwise."
        )
    };
    format!("{lead} {STYLE_PROMPT} {NEGATIVE_PROMPT}")
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub data: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageConfig<'a> {
    aspect_ratio: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_modalities: [&'static str; 1],
    image_config: ImageConfig<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest<'a> {
    contents: [Content; 1],
    generation_config: GenerationConfig<'a>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize, Default)]
pub struct Candidate {
    #[serde(default)]
    pub content: Content,
}

/// Build the request body. `reference_b64` is the already-preprocessed bare
/// base64 JPEG.
pub fn request_body<'a>(text: String, reference_b64: Option<String>, aspect_ratio: &'a str) -> GenerateContentRequest<'a> {
    let mut parts = Vec::with_capacity(2);
    if let Some(data) = reference_b64 {
        parts.push(Part {
            inline_data: Some(InlineData {
                mime_type: "image/jpeg".to_string(),
                data,
            }),
            text: None,
        });
    }
    parts.push(Part {
        inline_data: None,
        text: Some(text),
    });
    GenerateContentRequest {
        contents: [Content { parts }],
        generation_config: GenerationConfig {
            response_modalities: ["IMAGE"],
            image_config: ImageConfig { aspect_ratio },
        },
    }
}

/// First inline image of the first candidate, as a data URI.
pub fn image_from_response(resp: &GenerateContentResponse) -> Option<String> {
    let candidate = resp.candidates.first()?;
    candidate
        .content
        .parts
        .iter()
        .filter_map(|p| p.inline_data.as_ref())
        .find(|d| !d.data.is_empty())
        .map(|d| {
            let mime = if d.mime_type.is_empty() { "image/png" } else { &d.mime_type };
            format_data_uri(mime, &d.data)
        })
}

pub fn parse_response(body: &str) -> Result<String, GenerationError> {
    let resp: GenerateContentResponse =
        serde_json::from_str(body).map_err(|e| GenerationError::Parse(e.to_string()))?;
    image_from_response(&resp).ok_or(GenerationError::NoImage)
}

// =============================================================================
// Client
// =============================================================================

pub struct GeminiClient {
    http: reqwest::Client,
    config: GeneratorConfig,
}

impl GeminiClient {
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// One request, no retry. Returns the generated image as a data URI.
    pub async fn generate(&self, req: &GenerationRequest) -> Result<String, GenerationError> {
        if self.config.api_key.is_empty() {
            return Err(GenerationError::MissingApiKey);
        }
        let reference = req
            .reference
            .as_deref()
            .map(|r| reference_payload(r, self.config.max_reference_edge, self.config.jpeg_quality));
        let body = request_body(req.text(), reference, &self.config.aspect_ratio);
        log::info!(
            "[gen] requesting {} (reference: {}, refinement: {})",
            self.config.model,
            req.reference.is_some(),
            req.refinement
        );
        let text = self.send_json(&body).await?;
        let image = parse_response(&text);
        if let Err(e) = &image {
            log::warn!("[gen] {e}");
        }
        image
    }

    async fn send_json(&self, body: &impl Serialize) -> Result<String, GenerationError> {
        let response = self
            .http
            .post(self.config.endpoint())
            .header("x-goog-api-key", &self.config.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| GenerationError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| GenerationError::Request(e.to_string()))?;
        if !(200..300).contains(&status) {
            return Err(GenerationError::Status { status, body: text });
        }
        Ok(text)
    }
}
