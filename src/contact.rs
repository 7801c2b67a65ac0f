// Contact form validation and submission.

use std::fmt;
use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;

use crate::error::Result;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is valid")
});

/// Delay of the simulated submission.
pub const SIMULATED_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Email,
    Message,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldError {
    Required(Field),
    InvalidEmail,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldError::Required(Field::Name) => f.write_str("Name is required"),
            FieldError::Required(Field::Email) => f.write_str("Email is required"),
            FieldError::Required(Field::Message) => f.write_str("Message is required"),
            FieldError::InvalidEmail => f.write_str("Email address is invalid"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl ContactForm {
    /// Every problem with the form, in field order. Empty when the form can be sent.
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();

        if self.name.trim().is_empty() {
            errors.push(FieldError::Required(Field::Name));
        }
        let email = self.email.trim();
        if email.is_empty() {
            errors.push(FieldError::Required(Field::Email));
        } else if !EMAIL.is_match(email) {
            errors.push(FieldError::InvalidEmail);
        }
        if self.message.trim().is_empty() {
            errors.push(FieldError::Required(Field::Message));
        }

        errors
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Delivers a validated contact message.
#[async_trait]
pub trait ContactSubmitter: Send + Sync {
    async fn submit(&self, form: &ContactForm) -> Result<()>;
}

/// Stand-in submitter: waits, then reports success. No message leaves the process.
#[derive(Debug, Clone)]
pub struct SimulatedSubmitter {
    delay: Duration,
}

impl Default for SimulatedSubmitter {
    fn default() -> Self {
        Self::new(SIMULATED_DELAY)
    }
}

impl SimulatedSubmitter {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl ContactSubmitter for SimulatedSubmitter {
    async fn submit(&self, form: &ContactForm) -> Result<()> {
        tokio::time::sleep(self.delay).await;
        tracing::info!(name = %form.name, "contact message accepted (simulated)");
        Ok(())
    }
}
