use serde::{Deserialize, Serialize};

/// Query string accepted by `/parse` and `/debug-html`.
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractionResult {
    pub image: Option<String>,
    pub title: String,
    pub success: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseDebug {
    pub has_og_image: bool,
    pub has_og_title: bool,
    pub html_length: usize,
}

#[derive(Debug, Serialize)]
pub struct ParseResponse {
    #[serde(flatten)]
    pub result: ExtractionResult,
    pub debug: ParseDebug,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugHtmlResponse {
    pub html_preview: String,
    pub full_length: usize,
    pub contains_og_image: bool,
    pub contains_og_title: bool,
}
