//! Error types for point cloud search operations.

use std::fmt;

/// Result type for search operations.
pub type SearchResult<T> = Result<T, SearchError>;

/// Errors that can occur while building or querying a spatial index.
#[derive(Debug, Clone)]
pub enum SearchError {
    /// The point set has zero elements; a zero-size index cannot be queried.
    EmptyDataset { context: String },

    /// Point or query dimensionality is zero or inconsistent.
    DimensionMismatch {
        expected: usize,
        actual: usize,
        context: String,
    },

    /// A search was issued before any index was successfully built.
    UninitializedIndex { context: String },

    /// Invalid parameter value.
    InvalidParameter { parameter: String, message: String },

    /// A caller-supplied destination buffer is smaller than the produced result.
    BufferTooSmall {
        required: usize,
        capacity: usize,
        context: String,
    },

    /// Error from an underlying numr operation.
    NumrError(String),
}

impl fmt::Display for SearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyDataset { context } => {
                write!(f, "Empty dataset in {}: at least 1 point is required", context)
            }
            Self::DimensionMismatch {
                expected,
                actual,
                context,
            } => {
                write!(
                    f,
                    "Dimension mismatch in {}: expected {}, got {}",
                    context, expected, actual
                )
            }
            Self::UninitializedIndex { context } => {
                write!(f, "{} called before an index was built", context)
            }
            Self::InvalidParameter { parameter, message } => {
                write!(f, "Invalid parameter '{}': {}", parameter, message)
            }
            Self::BufferTooSmall {
                required,
                capacity,
                context,
            } => {
                write!(
                    f,
                    "Destination buffer too small in {}: need {} elements, capacity is {}",
                    context, required, capacity
                )
            }
            Self::NumrError(msg) => {
                write!(f, "numr error: {}", msg)
            }
        }
    }
}

impl std::error::Error for SearchError {}

impl From<numr::error::Error> for SearchError {
    fn from(err: numr::error::Error) -> Self {
        Self::NumrError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_dimension_mismatch() {
        let err = SearchError::DimensionMismatch {
            expected: 3,
            actual: 2,
            context: "nns_search_knn".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Dimension mismatch in nns_search_knn: expected 3, got 2"
        );
    }

    #[test]
    fn test_display_buffer_too_small() {
        let err = SearchError::BufferTooSmall {
            required: 10,
            capacity: 4,
            context: "search_into".to_string(),
        };
        assert!(err.to_string().contains("need 10 elements"));
        assert!(err.to_string().contains("capacity is 4"));
    }
}
