//! Error codes and classification
//!
//! Every failure the tokenizer can report has a code here, and every code has
//! metadata in the registry below.

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Universal code wrapper for both error and success codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// ERROR CLASSIFICATION TYPES
// ============================================================================

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

/// Complete metadata for an error code
#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub recoverable: bool,
    pub requires_halt: bool,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

impl ErrorMetadata {
    pub const fn new(
        code: &'static str,
        category: &'static str,
        severity: Severity,
        recoverable: bool,
        requires_halt: bool,
        description: &'static str,
        recommended_action: &'static str,
    ) -> Self {
        Self {
            code,
            category,
            severity,
            recoverable,
            requires_halt,
            description,
            recommended_action,
        }
    }
}

// ============================================================================
// ERROR CODE CONSTANTS
// ============================================================================

/// System error codes
pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
    pub const INITIALIZATION_FAILURE: Code = Code::new("ERR002");
}

/// File processing error codes
pub mod file_processing {
    use super::Code;

    pub const FILE_NOT_FOUND: Code = Code::new("E005");
    pub const FILE_TOO_LARGE: Code = Code::new("E007");
    pub const IO_ERROR: Code = Code::new("E011");
}

/// Character source error codes
pub mod source {
    use super::Code;

    pub const UNGET_UNDERFLOW: Code = Code::new("E015");
    pub const INVALID_ESCAPE: Code = Code::new("E016");
}

/// Lexical analysis error codes
pub mod lexical {
    use super::Code;

    pub const UNTERMINATED_CONSTRUCT: Code = Code::new("E021");
    pub const WHITESPACE_IN_SECTION: Code = Code::new("E022");
    pub const TOKEN_TOO_LARGE: Code = Code::new("E024");
    pub const COMMENT_TOO_LONG: Code = Code::new("E026");
}

/// Dollar expansion error codes
pub mod expansion {
    use super::Code;

    pub const MISSING_VARIABLE_NAME: Code = Code::new("E030");
    pub const UNRESOLVED_VARIABLE: Code = Code::new("E031");
    pub const UNKNOWN_QUOTE: Code = Code::new("E032");
    pub const NOT_A_DURATION: Code = Code::new("E033");
    pub const UNEXPECTED_EOF: Code = Code::new("E034");
    pub const UNEXPECTED_CHARACTER: Code = Code::new("E035");
    pub const NESTING_TOO_DEEP: Code = Code::new("E036");
}

/// Arithmetic expression error codes
pub mod arithmetic {
    use super::Code;

    pub const NOT_A_NUMBER: Code = Code::new("E060");
    pub const UNEXPECTED_TOKEN: Code = Code::new("E061");
    pub const DIVISION_BY_ZERO: Code = Code::new("E062");
    pub const OVERFLOW: Code = Code::new("E063");
}

/// Token pattern matching error codes
pub mod matcher {
    use super::Code;

    pub const DANGLING_OPTIONAL: Code = Code::new("E070");
    pub const LOOKAHEAD_EXCEEDED: Code = Code::new("E071");
}

/// INI document error codes
pub mod document {
    use super::Code;

    pub const DUPLICATE_KEY: Code = Code::new("E090");
    pub const UNEXPECTED_INPUT: Code = Code::new("E091");
    pub const LINES_NOT_REPORTED: Code = Code::new("E092");
}

/// Success codes
pub mod success {
    use super::Code;

    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I001");
    pub const FILE_PROCESSING_SUCCESS: Code = Code::new("I006");
    pub const TOKENIZATION_COMPLETE: Code = Code::new("I020");
    pub const DOCUMENT_COMPLETE: Code = Code::new("I090");
}

// ============================================================================
// ERROR METADATA REGISTRY
// ============================================================================

const ERROR_METADATA: &[ErrorMetadata] = &[
    // System
    ErrorMetadata::new(
        "ERR001",
        "System",
        Severity::Critical,
        false,
        true,
        "Critical internal error",
        "File a bug report with the input that triggered it",
    ),
    ErrorMetadata::new(
        "ERR002",
        "System",
        Severity::Critical,
        false,
        true,
        "System initialization failure",
        "Check configuration and environment variables",
    ),
    // File processing
    ErrorMetadata::new(
        "E005",
        "FileProcessing",
        Severity::Medium,
        false,
        false,
        "Input file not found",
        "Verify the file path exists and is accessible",
    ),
    ErrorMetadata::new(
        "E007",
        "FileProcessing",
        Severity::Medium,
        false,
        false,
        "Input file exceeds the size limit",
        "Split the file or raise max_file_size in the build profile",
    ),
    ErrorMetadata::new(
        "E011",
        "FileProcessing",
        Severity::High,
        false,
        false,
        "Failed to read input",
        "Check that the input is readable UTF-8 text",
    ),
    // Source
    ErrorMetadata::new(
        "E015",
        "Source",
        Severity::Critical,
        false,
        true,
        "Reader rewound past its retained lines",
        "File a bug report: the tokenizer backtracked further than it may",
    ),
    ErrorMetadata::new(
        "E016",
        "Source",
        Severity::High,
        true,
        false,
        "Malformed escape sequence",
        "Write \\u followed by exactly four hex digits",
    ),
    // Lexical
    ErrorMetadata::new(
        "E021",
        "Lexical",
        Severity::High,
        true,
        false,
        "Quoted string or section reaches end of input",
        "Close the construct that starts at the reported location",
    ),
    ErrorMetadata::new(
        "E022",
        "Lexical",
        Severity::High,
        true,
        false,
        "Whitespace inside a section header",
        "Remove whitespace between [ and ]",
    ),
    ErrorMetadata::new(
        "E024",
        "Lexical",
        Severity::High,
        true,
        false,
        "Token exceeds the maximum length",
        "Shorten the token or raise max_token_length in the build profile",
    ),
    ErrorMetadata::new(
        "E026",
        "Lexical",
        Severity::Medium,
        true,
        false,
        "Comment exceeds the maximum length",
        "Shorten the comment or raise max_comment_length in the build profile",
    ),
    // Expansion
    ErrorMetadata::new(
        "E030",
        "Expansion",
        Severity::High,
        true,
        false,
        "No variable name after $",
        "Follow $ with a name, {name}, or (expression)",
    ),
    ErrorMetadata::new(
        "E031",
        "Expansion",
        Severity::High,
        true,
        false,
        "Variable has no value",
        "Define the variable or give ${NAME|default} a default",
    ),
    ErrorMetadata::new(
        "E032",
        "Expansion",
        Severity::High,
        true,
        false,
        "Quote name is not registered",
        "Use one of ms, s, xml, attr, uri, sql or register the quote",
    ),
    ErrorMetadata::new(
        "E033",
        "Expansion",
        Severity::High,
        true,
        false,
        "Value is not a duration",
        "Use a positive integer followed by an optional unit such as 10s",
    ),
    ErrorMetadata::new(
        "E034",
        "Expansion",
        Severity::High,
        true,
        false,
        "Expansion reaches end of input",
        "Close the expansion that starts at the reported location",
    ),
    ErrorMetadata::new(
        "E035",
        "Expansion",
        Severity::High,
        true,
        false,
        "Unexpected character in expansion",
        "Check the expansion syntax at the reported location",
    ),
    ErrorMetadata::new(
        "E036",
        "Expansion",
        Severity::High,
        false,
        true,
        "Expansions nested beyond the depth limit",
        "Reduce nesting or raise max_expansion_depth in the build profile",
    ),
    // Arithmetic
    ErrorMetadata::new(
        "E060",
        "Arithmetic",
        Severity::High,
        true,
        false,
        "Operand is not an integer",
        "Use decimal, 0x hex or 0-prefixed octal integers",
    ),
    ErrorMetadata::new(
        "E061",
        "Arithmetic",
        Severity::High,
        true,
        false,
        "Unexpected token in expression",
        "Alternate operands and operators and balance parentheses",
    ),
    ErrorMetadata::new(
        "E062",
        "Arithmetic",
        Severity::High,
        true,
        false,
        "Division or modulo by zero",
        "Check the divisor of the expression",
    ),
    ErrorMetadata::new(
        "E063",
        "Arithmetic",
        Severity::High,
        true,
        false,
        "Integer overflow",
        "Keep intermediate values within 64-bit signed range",
    ),
    // Matcher
    ErrorMetadata::new(
        "E070",
        "Matcher",
        Severity::Critical,
        false,
        true,
        "OPTIONAL marker not followed by an element",
        "Fix the token pattern in the calling grammar",
    ),
    ErrorMetadata::new(
        "E071",
        "Matcher",
        Severity::High,
        false,
        true,
        "Pattern needs more lookahead than allowed",
        "Raise max_pending_tokens in the build profile",
    ),
    // Document
    ErrorMetadata::new(
        "E090",
        "Document",
        Severity::Medium,
        true,
        false,
        "Key defined twice in one section",
        "Remove or rename one of the definitions",
    ),
    ErrorMetadata::new(
        "E091",
        "Document",
        Severity::Medium,
        true,
        false,
        "Line is neither a section, a key nor blank",
        "Write key = value or [section]",
    ),
    ErrorMetadata::new(
        "E092",
        "Document",
        Severity::High,
        false,
        true,
        "Whitespace policy hides line ends from the document builder",
        "Use the newline or both whitespace policy",
    ),
    // Success
    ErrorMetadata::new(
        "I001",
        "Success",
        Severity::Low,
        true,
        false,
        "System initialization completed",
        "No action required",
    ),
    ErrorMetadata::new(
        "I006",
        "Success",
        Severity::Low,
        true,
        false,
        "File processed successfully",
        "No action required",
    ),
    ErrorMetadata::new(
        "I020",
        "Success",
        Severity::Low,
        true,
        false,
        "Tokenization reached end of input",
        "No action required",
    ),
    ErrorMetadata::new(
        "I090",
        "Success",
        Severity::Low,
        true,
        false,
        "INI document built",
        "No action required",
    ),
];

/// Error metadata registry using OnceLock for thread safety
static ERROR_REGISTRY: OnceLock<HashMap<&'static str, &'static ErrorMetadata>> = OnceLock::new();

fn get_error_registry() -> &'static HashMap<&'static str, &'static ErrorMetadata> {
    ERROR_REGISTRY.get_or_init(|| {
        ERROR_METADATA
            .iter()
            .map(|metadata| (metadata.code, metadata))
            .collect()
    })
}

// ============================================================================
// CLASSIFICATION FUNCTIONS
// ============================================================================

/// Get error metadata for a specific error code
pub fn get_error_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    get_error_registry().get(code).copied()
}

/// Get error severity from error code
pub fn get_severity(code: &str) -> Severity {
    get_error_metadata(code)
        .map(|metadata| metadata.severity)
        .unwrap_or(Severity::Medium)
}

/// Check if error is recoverable
pub fn is_recoverable(code: &str) -> bool {
    get_error_metadata(code)
        .map(|metadata| metadata.recoverable)
        .unwrap_or(true)
}

/// Check if error requires immediate halt
pub fn requires_halt(code: &str) -> bool {
    get_error_metadata(code)
        .map(|metadata| metadata.requires_halt)
        .unwrap_or(false)
}

/// Get human-readable description for error code
pub fn get_description(code: &str) -> &'static str {
    get_error_metadata(code)
        .map(|metadata| metadata.description)
        .unwrap_or("Unknown error")
}

/// Get recommended action for error code
pub fn get_action(code: &str) -> &'static str {
    get_error_metadata(code)
        .map(|metadata| metadata.recommended_action)
        .unwrap_or("No specific action available")
}

/// Get error category from error code
pub fn get_category(code: &str) -> &'static str {
    get_error_metadata(code)
        .map(|metadata| metadata.category)
        .unwrap_or("Unknown")
}
