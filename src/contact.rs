//! Contact inquiries: one `contact_submissions` row per message

use std::time::Duration;
use tracing::{info, warn};
use validator::Validate;

use crate::error::{Error, SubmitError, ValidationError};
use crate::gateway::{Collection, DynDataGateway};
use crate::models::NewContactSubmission;
use crate::submission::SubmissionState;

const CONTACT_FAILED: &str = "Error submitting contact form. Please try again.";

#[derive(Debug, Clone, Default, PartialEq, Eq, Validate)]
pub struct ContactForm {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    /// Optional; blank is sent as null
    pub phone: String,
    #[validate(length(min = 1))]
    pub message: String,
}

impl ContactForm {
    fn to_row(&self) -> NewContactSubmission {
        let phone = self.phone.trim();
        NewContactSubmission {
            name: self.name.clone(),
            email: self.email.clone(),
            phone: (!phone.is_empty()).then(|| phone.to_string()),
            message: self.message.clone(),
            is_read: false,
        }
    }
}

pub struct ContactWorkflow {
    gateway: DynDataGateway,
    form: ContactForm,
    state: SubmissionState,
}

impl ContactWorkflow {
    pub fn new(gateway: DynDataGateway, notice_duration: Duration) -> Self {
        Self {
            gateway,
            form: ContactForm::default(),
            state: SubmissionState::new(notice_duration),
        }
    }

    pub fn form(&self) -> &ContactForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut ContactForm {
        &mut self.form
    }

    pub fn is_submitting(&self) -> bool {
        self.state.is_in_flight()
    }

    pub fn success_visible(&self) -> bool {
        self.state.success_visible()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.state.error()
    }

    /// Validate and mark the workflow in flight, returning the row to insert
    pub fn begin_submit(&mut self) -> Result<NewContactSubmission, SubmitError> {
        self.form.validate().map_err(ValidationError::from)?;
        self.state.begin()?;
        Ok(self.form.to_row())
    }

    /// Apply the gateway's answer for a submission started with [`Self::begin_submit`]
    pub fn finish_submit(&mut self, result: Result<(), Error>) -> Result<(), SubmitError> {
        match result {
            Ok(()) => {
                info!("contact submission received");
                self.form = ContactForm::default();
                self.state.succeed();
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "contact submission failed");
                self.state.fail(CONTACT_FAILED);
                Err(SubmitError::Gateway(e))
            }
        }
    }

    /// Validate and insert one unread submission; the form is kept when the insert fails
    pub async fn submit(&mut self) -> Result<(), SubmitError> {
        let row = self.begin_submit()?;
        let result = match serde_json::to_value(&row) {
            Ok(row) => self.gateway.insert(Collection::ContactSubmissions, row).await,
            Err(e) => Err(e.into()),
        };
        self.finish_submit(result)
    }
}
