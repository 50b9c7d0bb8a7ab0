use crate::api::{Credentials, SignupRequest};

use super::{require, require_email, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignupForm {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl SignupForm {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_email(&self.email)?;
        require(&self.password, "Password")?;
        if self.password != self.confirm_password {
            return Err(ValidationError::PasswordMismatch);
        }
        Ok(())
    }

    pub fn to_request(&self) -> SignupRequest {
        SignupRequest {
            email: self.email.trim().to_string(),
            password: self.password.clone(),
        }
    }

    /// Credentials for the login that follows a successful signup.
    pub fn to_credentials(&self) -> Credentials {
        Credentials::new(self.email.trim(), self.password.clone())
    }
}
