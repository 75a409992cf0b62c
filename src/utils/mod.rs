pub mod form_validator;

pub use form_validator::{FormValidationError, require_text, validate_email};

use crate::errors::AppError;

impl From<FormValidationError> for AppError {
    fn from(err: FormValidationError) -> Self {
        AppError::validation(err.to_string())
    }
}
