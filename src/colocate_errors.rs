use thiserror::Error;

use crate::constants::EntityId;

#[derive(Error, Debug)]
pub enum ColocateError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Invalid contact parameter: {0}")]
    InvalidContactParameter(String),

    #[error(
        "Segment {segment} of entity {entity} is not time-ordered at sample {index}; early-exit scan requires sorted, finite times"
    )]
    UnsortedSegment {
        entity: EntityId,
        segment: usize,
        index: usize,
    },

    #[error("Unknown entity: {0}")]
    UnknownEntity(EntityId),

    #[error("Malformed sample in {path} at line {line}: {reason}")]
    MalformedSample {
        path: String,
        line: usize,
        reason: String,
    },

    #[error("Unable to perform file operation: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("UTF-8 Path error: {0}")]
    Utf8PathError(String),
}

impl PartialEq for ColocateError {
    fn eq(&self, other: &Self) -> bool {
        use ColocateError::*;
        match (self, other) {
            (InvalidConfiguration(a), InvalidConfiguration(b)) => a == b,
            (InvalidContactParameter(a), InvalidContactParameter(b)) => a == b,
            (
                UnsortedSegment {
                    entity: e1,
                    segment: s1,
                    index: i1,
                },
                UnsortedSegment {
                    entity: e2,
                    segment: s2,
                    index: i2,
                },
            ) => e1 == e2 && s1 == s2 && i1 == i2,
            (UnknownEntity(a), UnknownEntity(b)) => a == b,
            (
                MalformedSample {
                    path: p1,
                    line: l1,
                    reason: r1,
                },
                MalformedSample {
                    path: p2,
                    line: l2,
                    reason: r2,
                },
            ) => p1 == p2 && l1 == l2 && r1 == r2,
            (Utf8PathError(a), Utf8PathError(b)) => a == b,

            // Not comparable: equal when the variant matches
            (IoError(_), IoError(_)) => true,
            (CsvError(_), CsvError(_)) => true,

            _ => false,
        }
    }
}
