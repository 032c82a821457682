/// Success response envelope
///
/// Every successful endpoint answers with the same shape:
///
/// ```json
/// {"success": true, "data": {...}}
/// ```
///
/// List endpoints add pagination metadata:
///
/// ```json
/// {"success": true, "data": [...], "meta": {"total": 42, "limit": 20, "offset": 0}}
/// ```
///
/// The failure counterpart lives in `crate::error`.

use serde::Serialize;

/// Pagination metadata for list responses
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Meta {
    /// Total rows matching the query
    pub total: i64,

    /// Page size used
    pub limit: i64,

    /// Offset used
    pub offset: i64,
}

/// The `{success, data, meta}` envelope
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// Always true on this path
    pub success: bool,

    /// Endpoint payload
    pub data: T,

    /// Pagination metadata (list endpoints only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Wraps a payload
    pub fn new(data: T) -> Self {
        ApiResponse {
            success: true,
            data,
            meta: None,
        }
    }

    /// Wraps a list payload with pagination metadata
    pub fn with_meta(data: T, meta: Meta) -> Self {
        ApiResponse {
            success: true,
            data,
            meta: Some(meta),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_shape() {
        let response = ApiResponse::new(json!({"id": 1}));
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["success"], true);
        assert_eq!(value["data"]["id"], 1);
        assert!(value.get("meta").is_none());
    }

    #[test]
    fn test_envelope_with_meta() {
        let response = ApiResponse::with_meta(
            json!([1, 2, 3]),
            Meta {
                total: 10,
                limit: 3,
                offset: 0,
            },
        );
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["meta"]["total"], 10);
        assert_eq!(value["meta"]["limit"], 3);
        assert_eq!(value["meta"]["offset"], 0);
    }
}
