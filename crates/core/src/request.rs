//! Job submission parameter types and validation.
//!
//! Pure DTOs and validation helpers shared by the REST client and any
//! future callers; no I/O here.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::JobKind;

/// Maximum length of a search or analysis query.
const MAX_QUERY_LEN: usize = 1024;

/// Deepest supported analysis depth.
const MAX_ANALYSIS_DEPTH: u8 = 5;

/// Upper bound on requested training epochs.
const MAX_TRAINING_EPOCHS: u32 = 10_000;

/// Parameters for a unified news search job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchParams {
    /// Free-text query.
    pub query: String,
    /// Cap on returned articles. `None` leaves it to the server default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_results: Option<u32>,
    /// Restrict the search to these source ids. Empty means all sources.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub source_ids: Vec<String>,
}

/// Parameters for a deep-analysis job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeepAnalysisParams {
    /// Topic or question to analyze.
    pub query: String,
    /// Analysis depth, `1..=MAX_ANALYSIS_DEPTH`. `None` uses the server
    /// default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depth: Option<u8>,
    /// Optional focus areas (e.g. "economics", "sources credibility").
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub focus_areas: Vec<String>,
}

/// Parameters for an ML training job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingParams {
    /// Name of the model configuration to train.
    pub model_name: String,
    /// Dataset identifier.
    pub dataset_id: String,
    /// Number of epochs, `1..=MAX_TRAINING_EPOCHS`.
    pub epochs: u32,
}

/// A validated start-job request, one variant per [`JobKind`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", content = "parameters", rename_all = "kebab-case")]
pub enum JobRequest {
    Search(SearchParams),
    DeepAnalysis(DeepAnalysisParams),
    Training(TrainingParams),
}

impl JobRequest {
    /// The job kind this request starts.
    pub fn kind(&self) -> JobKind {
        match self {
            JobRequest::Search(_) => JobKind::Search,
            JobRequest::DeepAnalysis(_) => JobKind::DeepAnalysis,
            JobRequest::Training(_) => JobKind::Training,
        }
    }

    /// Validate the request before submission.
    pub fn validate(&self) -> Result<(), CoreError> {
        match self {
            JobRequest::Search(params) => {
                validate_query(&params.query)?;
                if params.max_results == Some(0) {
                    return Err(CoreError::Validation(
                        "max_results must be greater than zero".to_string(),
                    ));
                }
                Ok(())
            }
            JobRequest::DeepAnalysis(params) => {
                validate_query(&params.query)?;
                if let Some(depth) = params.depth {
                    if depth == 0 || depth > MAX_ANALYSIS_DEPTH {
                        return Err(CoreError::Validation(format!(
                            "Analysis depth must be between 1 and {MAX_ANALYSIS_DEPTH}"
                        )));
                    }
                }
                Ok(())
            }
            JobRequest::Training(params) => {
                if params.model_name.trim().is_empty() {
                    return Err(CoreError::Validation(
                        "model_name must not be empty".to_string(),
                    ));
                }
                if params.dataset_id.trim().is_empty() {
                    return Err(CoreError::Validation(
                        "dataset_id must not be empty".to_string(),
                    ));
                }
                if params.epochs == 0 || params.epochs > MAX_TRAINING_EPOCHS {
                    return Err(CoreError::Validation(format!(
                        "epochs must be between 1 and {MAX_TRAINING_EPOCHS}"
                    )));
                }
                Ok(())
            }
        }
    }
}

/// Validate a free-text query.
///
/// Rules:
/// - Must not be empty or whitespace-only.
/// - Must not exceed `MAX_QUERY_LEN` characters.
fn validate_query(query: &str) -> Result<(), CoreError> {
    if query.trim().is_empty() {
        return Err(CoreError::Validation(
            "Query must not be empty".to_string(),
        ));
    }
    if query.len() > MAX_QUERY_LEN {
        return Err(CoreError::Validation(format!(
            "Query must not exceed {MAX_QUERY_LEN} characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn search(query: &str) -> JobRequest {
        JobRequest::Search(SearchParams {
            query: query.to_string(),
            max_results: None,
            source_ids: Vec::new(),
        })
    }

    #[test]
    fn valid_search_request() {
        assert!(search("central bank rate decision").validate().is_ok());
    }

    #[test]
    fn empty_query_rejected() {
        assert!(search("").validate().is_err());
        assert!(search("   ").validate().is_err());
    }

    #[test]
    fn overlong_query_rejected() {
        let query = "q".repeat(MAX_QUERY_LEN + 1);
        assert!(search(&query).validate().is_err());
    }

    #[test]
    fn zero_max_results_rejected() {
        let request = JobRequest::Search(SearchParams {
            query: "elections".to_string(),
            max_results: Some(0),
            source_ids: Vec::new(),
        });
        assert!(request.validate().is_err());
    }

    #[test]
    fn analysis_depth_bounds() {
        let mut params = DeepAnalysisParams {
            query: "supply chains".to_string(),
            depth: Some(3),
            focus_areas: Vec::new(),
        };
        assert!(JobRequest::DeepAnalysis(params.clone()).validate().is_ok());

        params.depth = Some(0);
        assert!(JobRequest::DeepAnalysis(params.clone()).validate().is_err());

        params.depth = Some(MAX_ANALYSIS_DEPTH + 1);
        assert!(JobRequest::DeepAnalysis(params).validate().is_err());
    }

    #[test]
    fn training_requires_model_and_dataset() {
        let request = JobRequest::Training(TrainingParams {
            model_name: "".to_string(),
            dataset_id: "ds-7".to_string(),
            epochs: 10,
        });
        assert!(request.validate().is_err());

        let request = JobRequest::Training(TrainingParams {
            model_name: "claim-classifier".to_string(),
            dataset_id: "".to_string(),
            epochs: 10,
        });
        assert!(request.validate().is_err());
    }

    #[test]
    fn training_epoch_bounds() {
        let request = JobRequest::Training(TrainingParams {
            model_name: "claim-classifier".to_string(),
            dataset_id: "ds-7".to_string(),
            epochs: 0,
        });
        assert!(request.validate().is_err());
    }

    #[test]
    fn request_serializes_with_kind_tag() {
        let json = serde_json::to_value(search("fact check")).unwrap();
        assert_eq!(json["kind"], "search");
        assert_eq!(json["parameters"]["query"], "fact check");
    }

    #[test]
    fn kind_matches_variant() {
        assert_eq!(search("x").kind(), JobKind::Search);
        let training = JobRequest::Training(TrainingParams {
            model_name: "m".to_string(),
            dataset_id: "d".to_string(),
            epochs: 1,
        });
        assert_eq!(training.kind(), JobKind::Training);
    }
}
