use std::fmt;

/// Stable identifier for a class of render failure.
///
/// Codes are user-visible and are expected to remain stable across releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorCode {
    pub code: &'static str,
    pub title: &'static str,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.title)
    }
}

// Specification errors (T0xx): raised while building the statement model.

pub const MALFORMED_DOCUMENT: ErrorCode = ErrorCode {
    code: "T001",
    title: "MALFORMED DOCUMENT",
};
pub const UNKNOWN_STATEMENT: ErrorCode = ErrorCode {
    code: "T002",
    title: "UNKNOWN STATEMENT",
};
pub const UNKNOWN_EXPRESSION: ErrorCode = ErrorCode {
    code: "T003",
    title: "UNKNOWN EXPRESSION",
};
pub const MALFORMED_STATEMENT: ErrorCode = ErrorCode {
    code: "T004",
    title: "MALFORMED STATEMENT",
};
pub const INVALID_TEMPLATE_ID: ErrorCode = ErrorCode {
    code: "T005",
    title: "INVALID TEMPLATE ID",
};
pub const MALFORMED_HASH: ErrorCode = ErrorCode {
    code: "T006",
    title: "MALFORMED HASH",
};
pub const EMPTY_PATH: ErrorCode = ErrorCode {
    code: "T007",
    title: "EMPTY PATH",
};
pub const ATTRIBUTE_OUTSIDE_ELEMENT: ErrorCode = ErrorCode {
    code: "T008",
    title: "ATTRIBUTE OUTSIDE ELEMENT",
};

// Lookup errors (L0xx): raised while evaluating against a frame.

pub const UNRESOLVED_PATH: ErrorCode = ErrorCode {
    code: "L001",
    title: "UNRESOLVED PATH",
};
pub const UNKNOWN_HELPER: ErrorCode = ErrorCode {
    code: "L002",
    title: "UNKNOWN HELPER",
};
pub const UNKNOWN_MODIFIER: ErrorCode = ErrorCode {
    code: "L003",
    title: "UNKNOWN MODIFIER",
};
pub const HELPER_SHAPE_MISMATCH: ErrorCode = ErrorCode {
    code: "L004",
    title: "HELPER SHAPE MISMATCH",
};
pub const UNKNOWN_DYNAMIC_VAR: ErrorCode = ErrorCode {
    code: "L005",
    title: "UNKNOWN DYNAMIC VARIABLE",
};
