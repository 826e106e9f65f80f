use crate::kind::InputType;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("input '{name}' with value '{value}' does not validate to type '{input_type}'")]
    TypeMismatch {
        name: String,
        value: Value,
        input_type: InputType,
    },

    #[error("type '{0}' is not a valid input type")]
    InvalidType(String),

    #[error("input '{name}' is required and does not have a value")]
    Required { name: String },
}
