//! Error types for reading order inference.
//!
//! This module defines all error types that can occur while loading page
//! regions, ordering them and comparing reading orders.

/// Result type alias for reading order operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during reading order inference.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Region outline is empty, degenerate or self-intersecting
    #[error("Malformed geometry for region '{id}': {reason}")]
    MalformedGeometry {
        /// Id of the offending region
        id: String,
        /// Why the outline was rejected
        reason: String,
    },

    /// The relationship classifier found no rule for a pair of items.
    ///
    /// This means the reading order tree is structurally invalid.
    #[error("Unknown relationship between '{item}' and '{other}'")]
    UnknownRelationship {
        /// Item the relationship is classified from
        item: String,
        /// Item the relationship is classified to
        other: String,
    },

    /// Cycle in the spatial precedence graph (strict topology only)
    #[error("Precedence graph contains a cycle through: {}", cycle.join(" -> "))]
    UnclassifiableTopology {
        /// Vertices on the detected cycle, in traversal order
        cycle: Vec<String>,
    },

    /// Scorer returned a different number of scores than candidates
    #[error("Scorer returned {actual} scores for {expected} candidates")]
    IncompleteCandidateSet {
        /// Number of candidates passed to the scorer
        expected: usize,
        /// Number of scores returned
        actual: usize,
    },

    /// Referenced region or item does not exist
    #[error("Unknown region: {0}")]
    UnknownRegion(String),

    /// Id is already taken by another region, item or group
    #[error("Duplicate id: {0}")]
    DuplicateId(String),

    /// Linking two items would break the chain invariant
    #[error("Cannot link '{predecessor}' to '{successor}': {reason}")]
    InvalidChainLink {
        /// Item that would become the predecessor
        predecessor: String,
        /// Item that would become the successor
        successor: String,
        /// Reason the link was refused
        reason: String,
    },

    /// Evaluation needs a reference reading order the page does not carry
    #[error("Document has no reference reading order")]
    MissingReference,

    /// Failure inside an external scorer implementation
    #[error("Scorer error: {0}")]
    Scorer(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_geometry_message() {
        let err = Error::MalformedGeometry {
            id: "r1".to_string(),
            reason: "fewer than three distinct points".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("r1"));
        assert!(msg.contains("three distinct points"));
    }

    #[test]
    fn test_unknown_relationship_message() {
        let err = Error::UnknownRelationship {
            item: "r1".to_string(),
            other: "r7".to_string(),
        };
        assert_eq!(format!("{}", err), "Unknown relationship between 'r1' and 'r7'");
    }

    #[test]
    fn test_cycle_message() {
        let err = Error::UnclassifiableTopology {
            cycle: vec!["a".to_string(), "b".to_string(), "a".to_string()],
        };
        assert!(format!("{}", err).contains("a -> b -> a"));
    }

    #[test]
    fn test_incomplete_candidate_set_message() {
        let err = Error::IncompleteCandidateSet {
            expected: 4,
            actual: 3,
        };
        let msg = format!("{}", err);
        assert!(msg.contains('4'));
        assert!(msg.contains('3'));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<u32>("not json").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.json");
        let err: Error = io_err.into();
        assert!(format!("{}", err).contains("missing.json"));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }
}
