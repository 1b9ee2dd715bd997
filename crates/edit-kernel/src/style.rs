//! Decoration kinds and style resolution.
//!
//! Highlight and marker kinds are tagged variants rather than free-form class
//! strings; renderers that want CSS-style class names resolve them through
//! the explicit tables here.

/// Syntax scope assigned to a highlight span by the analysis worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Scope {
    /// Language keyword.
    Keyword,
    /// String literal.
    String,
    /// Comment (line or block).
    Comment,
    /// Function or method name.
    Function,
    /// Type name.
    Type,
    /// Variable or parameter name.
    Variable,
    /// Numeric literal.
    Number,
    /// Operator token.
    Operator,
    /// Punctuation or delimiter.
    Punctuation,
}

impl Scope {
    /// Renderer-facing class name for this scope.
    pub fn class_name(self) -> &'static str {
        match self {
            Scope::Keyword => "tok-keyword",
            Scope::String => "tok-string",
            Scope::Comment => "tok-comment",
            Scope::Function => "tok-function",
            Scope::Type => "tok-type",
            Scope::Variable => "tok-variable",
            Scope::Number => "tok-number",
            Scope::Operator => "tok-operator",
            Scope::Punctuation => "tok-punctuation",
        }
    }
}

/// Severity of an error/diagnostic marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Error markers.
    Error,
    /// Warning markers.
    Warning,
    /// Informational markers.
    Information,
    /// Hint markers.
    Hint,
}

impl Severity {
    /// Renderer-facing class name for this severity.
    pub fn class_name(self) -> &'static str {
        match self {
            Severity::Error => "mark-error",
            Severity::Warning => "mark-warning",
            Severity::Information => "mark-info",
            Severity::Hint => "mark-hint",
        }
    }
}
