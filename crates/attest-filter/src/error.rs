use thiserror::Error;

/// Programming errors when talking to a filter table. Never defaulted or retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterAccessError {
    #[error("undefined accessor `{name}` for {resource}")]
    UnknownAccessor { resource: String, name: String },

    #[error("undefined field `{field}` for {resource}")]
    UnknownField { resource: String, field: String },

    #[error("accessor `{name}` does not accept {arg}")]
    UnsupportedArgument { name: String, arg: &'static str },

    #[error("accessor `{name}` did not produce {expected}")]
    UnexpectedOutput { name: String, expected: &'static str },
}
