use channel_intel::analysis::AnalysisReport;
use channel_intel::{Error, IdentifierSet, Result, VideoRecord};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct ApiExtractRequest {
    pub text: Option<String>,
}

impl ApiExtractRequest {
    pub fn into_text(self) -> String {
        self.text.unwrap_or_default()
    }
}

#[derive(Debug, Serialize)]
pub struct ApiExtractResponse {
    pub total: usize,
    pub identifiers: IdentifierSet,
}

impl ApiExtractResponse {
    pub fn from_identifiers(identifiers: IdentifierSet) -> Self {
        Self {
            total: identifiers.total(),
            identifiers,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ApiAnalyzeRequest {
    pub request_id: Option<String>,
    #[serde(default)]
    pub records: Vec<VideoRecord>,
}

impl ApiAnalyzeRequest {
    pub fn into_records(self) -> Result<Vec<VideoRecord>> {
        if self.records.is_empty() {
            return Err(Error::InvalidInput("records are required".to_string()));
        }
        Ok(self.records)
    }
}

#[derive(Debug, Serialize)]
pub struct ApiAnalyzeResponse {
    pub request_id: String,
    pub report: AnalysisReport,
}
