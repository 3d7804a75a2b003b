use thiserror::Error as ThisError;

/// Typed failures raised by the mapping core itself. Everything coming out
/// of the execution layer (SQL errors, connectivity) propagates through
/// `anyhow` untranslated.
#[derive(Debug, ThisError)]
pub enum CoreError {
    /// Entity schema declares no id binding. Surfaces on the first operation
    /// against the type, descriptors are built lazily.
    #[error("entity `{0}` declares no id field")]
    MissingId(&'static str),
    #[error("entity `{0}` declares more than one id field")]
    AmbiguousId(&'static str),
    /// The raw statement path only accepts INSERT, UPDATE and DELETE text.
    #[error("raw statement must begin with INSERT, UPDATE or DELETE, got `{0}`")]
    UnsupportedStatement(String),
    /// Every updatable column was skipped; emitting `UPDATE t WHERE ...`
    /// with no SET list would be invalid SQL.
    #[error("update of `{0}` selected no columns")]
    EmptyUpdate(String),
    #[error("result row has no column labeled `{0}`")]
    MissingColumn(String),
}
