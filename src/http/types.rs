//! Request and response bodies.

use serde::{Deserialize, Serialize};

use super::error::ApiError;
use crate::sorter::{Batch, SortOutcome, WorkItem};

/// `{"to_sort": [[int, ...], ...]}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortRequest {
    pub to_sort: Vec<WorkItem>,
}

impl SortRequest {
    /// Decode a raw request body. Content-Type is not consulted.
    pub fn decode(body: &[u8]) -> Result<Self, ApiError> {
        Ok(serde_json::from_slice(body)?)
    }

    pub fn into_batch(self) -> Batch {
        Batch::from(self.to_sort)
    }
}

/// `{"sorted_arrays": [[int, ...], ...], "time_ns": int}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortResponse {
    pub sorted_arrays: Vec<WorkItem>,
    pub time_ns: i64,
}

impl From<SortOutcome> for SortResponse {
    fn from(outcome: SortOutcome) -> Self {
        let time_ns = outcome.elapsed_ns();
        Self {
            sorted_arrays: outcome.batch.into_items(),
            time_ns,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_valid_body() {
        let req = SortRequest::decode(br#"{"to_sort": [[3,1,2],[5,4],[]]}"#).unwrap();
        assert_eq!(req.to_sort, vec![vec![3, 1, 2], vec![5, 4], vec![]]);
    }

    #[test]
    fn test_decode_ignores_unknown_fields() {
        let req = SortRequest::decode(br#"{"to_sort": [[1]], "extra": true}"#).unwrap();
        assert_eq!(req.to_sort, vec![vec![1]]);
    }

    #[test]
    fn test_decode_rejects_bad_shapes() {
        for body in [
            &b"not-json"[..],
            b"",
            b"{}",
            br#"{"to_sort": null}"#,
            br#"{"to_sort": [1, 2]}"#,
            br#"{"to_sort": [[1.5]]}"#,
            br#"{"to_sort": [["a"]]}"#,
            br#"{"to_sort": [[99999999999999999999]]}"#,
        ] {
            let err = SortRequest::decode(body).unwrap_err();
            assert!(
                matches!(err, ApiError::InvalidPayload(_)),
                "body {:?} should be rejected",
                String::from_utf8_lossy(body)
            );
        }
    }

    #[test]
    fn test_response_shape() {
        let resp = SortResponse {
            sorted_arrays: vec![vec![1, 2], vec![]],
            time_ns: 42,
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json, serde_json::json!({"sorted_arrays": [[1, 2], []], "time_ns": 42}));
    }
}
