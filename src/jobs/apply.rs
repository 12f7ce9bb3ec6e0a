//! Auto-apply
//!
//! Stages the resume in a temporary file, opens the application page and
//! fills name, email and resume before clicking the first submit control.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use tempfile::NamedTempFile;

use crate::error::{ApplyError, Result};
use crate::jobs::browser::{BrowserDriver, FormPage, Locator};
use crate::jobs::request::Application;
use crate::utils::format_size;

const NAME_LOCATORS: &[Locator] = &[
    Locator::Css(r#"input[name="name"]"#),
    Locator::Css(r#"input[id*="name"]"#),
    Locator::Css(r#"input[placeholder*="name"]"#),
];

const EMAIL_LOCATORS: &[Locator] = &[
    Locator::Css(r#"input[name="email"]"#),
    Locator::Css(r#"input[id*="email"]"#),
    Locator::Css(r#"input[placeholder*="email"]"#),
];

const RESUME_LOCATORS: &[Locator] = &[
    Locator::Css(r#"input[type="file"]"#),
    Locator::Css(r#"input[name*="resume"]"#),
    Locator::Css(r#"input[name*="cv"]"#),
];

const SUBMIT_LOCATORS: &[Locator] = &[
    Locator::Css(r#"button[type="submit"]"#),
    Locator::Css(r#"input[type="submit"]"#),
    Locator::Text { tag: "button", text: "Apply" },
    Locator::Text { tag: "a", text: "Apply" },
];

/// Fills and submits job application forms
#[derive(Clone)]
pub struct Applicant {
    driver: Arc<dyn BrowserDriver>,
}

impl Applicant {
    /// Create an applicant using `driver` for browser sessions
    pub fn new(driver: Arc<dyn BrowserDriver>) -> Self {
        Self { driver }
    }

    /// Fill and submit the form at `application.job_url`
    ///
    /// The temporary resume file is removed before this returns, whatever
    /// the outcome.
    pub async fn apply(&self, application: &Application) -> Result<()> {
        let resume = stage_resume(&application.resume)?;
        tracing::info!(
            url = %application.job_url,
            resume = %format_size(application.resume.len()),
            "Starting auto-apply"
        );

        let mut page = self.driver.open(&application.job_url).await?;
        let filled = fill_form(page.as_mut(), application, resume.path()).await;

        if let Err(e) = page.close().await {
            tracing::warn!(error = %e, "Failed to close browser session");
        }

        // `resume` is dropped here, deleting the file
        filled
    }
}

/// Write the resume to a `.pdf` temp file that deletes itself on drop
fn stage_resume(bytes: &[u8]) -> Result<NamedTempFile> {
    let mut file = tempfile::Builder::new()
        .prefix("resume-")
        .suffix(".pdf")
        .tempfile()
        .map_err(ApplyError::ResumeFile)?;
    file.write_all(bytes).map_err(ApplyError::ResumeFile)?;
    file.flush().map_err(ApplyError::ResumeFile)?;
    Ok(file)
}

async fn fill_form(page: &mut dyn FormPage, application: &Application, resume: &Path) -> Result<()> {
    let name = first_present(page, "name", NAME_LOCATORS).await?;
    page.fill(&name, &application.name).await?;

    let email = first_present(page, "email", EMAIL_LOCATORS).await?;
    page.fill(&email, &application.email).await?;

    let upload = first_present(page, "resume", RESUME_LOCATORS).await?;
    page.set_input_file(&upload, resume).await?;

    let submit = first_present(page, "submit", SUBMIT_LOCATORS).await?;
    page.click(&submit).await?;

    tracing::info!(url = %application.job_url, submit = %submit, "Application form submitted");
    Ok(())
}

/// The first candidate with at least one match on the page
async fn first_present(page: &mut dyn FormPage, field: &str, candidates: &[Locator]) -> Result<Locator> {
    for locator in candidates {
        if page.count(locator).await? > 0 {
            tracing::debug!(field, locator = %locator, "Matched form field");
            return Ok(*locator);
        }
    }

    Err(ApplyError::SelectorNotFound {
        field: field.to_string(),
    }
    .into())
}
