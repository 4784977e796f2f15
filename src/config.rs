/// Process configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// Maximum number of images accepted per submission
    pub max_images_per_submission: usize,
    /// Estimated-token ceiling before verification input is down-sampled
    pub verification_token_limit: usize,
    /// Per-page character cap applied when truncating for verification
    pub verification_char_cap: usize,
    /// Per-page character cap applied to extracted OCR text
    pub extraction_char_cap: usize,
    /// Whether to log per-page parse details
    pub verbose_logging: bool,
    // --- LLM configuration ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    /// Text model used for verification and formatter-fallback calls
    pub llm_model_name: String,
    /// Vision model used for per-page OCR extraction
    pub ocr_model_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_images_per_submission: 5,
            verification_token_limit: 100_000,
            verification_char_cap: 25_000,
            extraction_char_cap: 30_000,
            verbose_logging: false,
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.mistral.ai/v1".to_string(),
            llm_model_name: "mistral-large-latest".to_string(),
            ocr_model_name: "pixtral-large-latest".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            max_images_per_submission: std::env::var("MAX_IMAGES_PER_SUBMISSION").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_images_per_submission),
            verification_token_limit: std::env::var("VERIFICATION_TOKEN_LIMIT").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verification_token_limit),
            verification_char_cap: std::env::var("VERIFICATION_CHAR_CAP").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verification_char_cap),
            extraction_char_cap: std::env::var("EXTRACTION_CHAR_CAP").ok().and_then(|v| v.parse().ok()).unwrap_or(default.extraction_char_cap),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            llm_api_key: std::env::var("MISTRAL_API_KEY").unwrap_or(default.llm_api_key),
            llm_api_base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(default.llm_api_base_url),
            llm_model_name: std::env::var("LLM_MODEL_NAME").unwrap_or(default.llm_model_name),
            ocr_model_name: std::env::var("OCR_MODEL_NAME").unwrap_or(default.ocr_model_name),
        }
    }
}
