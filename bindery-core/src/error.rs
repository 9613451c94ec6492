use thiserror::Error;

/// Failure taxonomy of the SQL access layer.
///
/// Every error is raised synchronously to the caller, carried inside
/// [`crate::Error`] and recoverable through `downcast_ref::<SqlError>()`.
/// Nothing is retried and nothing is logged-and-swallowed at this layer.
#[derive(Debug, Error)]
pub enum SqlError {
    /// The source text cannot be scanned unambiguously (unbalanced quoting or
    /// comment delimiters). Fatal to the statement, never retried.
    #[error("malformed SQL at offset {offset}: {reason} in `{sql}`")]
    MalformedSql {
        reason: String,
        offset: usize,
        sql: String,
    },
    /// A named-placeholder token is not a well-formed identifier.
    #[error("malformed parameter at offset {offset}: {reason} in `{sql}`")]
    MalformedParameter {
        reason: String,
        offset: usize,
        sql: String,
    },
    /// A parameter declared by the statement received no value. Raised before
    /// any position is written to the prepared statement.
    #[error("no value bound for parameter `{parameter}`")]
    UnboundParameter { parameter: String },
    /// A value was bound to a name the statement does not declare.
    #[error("no such parameter: `{parameter}`")]
    NoSuchParameter { parameter: String },
    /// A value cannot be expressed as the requested application or SQL type.
    #[error("cannot coerce {value} into {target}")]
    Coercion { value: String, target: &'static str },
    /// A result column resolves to no settable field on the target record.
    #[error("column `{column}` maps to `{field}` which is not a field of `{target}`")]
    UnmappedColumn {
        column: String,
        field: String,
        target: &'static str,
    },
    /// Attempt to mutate dynamic SQL text after it has been sealed.
    #[error("cannot {operation}: the SQL text is sealed")]
    Sealed { operation: &'static str },
    /// A statement wrapper was re-bound after execution without a reset.
    #[error("statement already executed; call reset() first")]
    DirtyStatement,
    /// A template fragment marker has no value at render time.
    #[error("no value set for fragment `{fragment}`")]
    MissingFragment { fragment: String },
}
