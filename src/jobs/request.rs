//! `job_finder` request model
//!
//! The wire arguments are a bag of optional fields. They are turned into a
//! [`JobRequest`] with exactly one variant per branch while deserializing, so
//! the finder never has to guess what the caller meant.

use reqwest::Url;
use schemars::JsonSchema;
use serde::Deserialize;
use validator::Validate;

use crate::error::{JobMcpError, Result, ValidationError};
use crate::utils::{decode_base64, non_empty};

/// Substrings of `user_goal` that route an untagged request to search
const SEARCH_KEYWORDS: &[&str] = &["look for", "find", "job"];

/// Explicit branch selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum JobAction {
    Apply,
    Analyze,
    Fetch,
    Search,
}

/// Raw `job_finder` arguments as sent by the client
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct JobFinderArgs {
    /// The user's goal (description, intent, or freeform query)
    pub user_goal: String,

    /// Which branch to run. When omitted it is inferred from the other fields.
    #[serde(default)]
    pub action: Option<JobAction>,

    /// Full job description text, if available.
    #[serde(default)]
    pub job_description: Option<String>,

    /// A URL to fetch a job description from.
    #[serde(default)]
    pub job_url: Option<String>,

    /// Return raw HTML content if True
    #[serde(default)]
    pub raw: bool,

    /// Base64-encoded resume to auto-apply
    #[serde(default, alias = "resume_payload")]
    pub resume_base64: Option<String>,

    /// Applicant full name
    #[serde(default, alias = "applicant_name")]
    pub name: Option<String>,

    /// Applicant email
    #[serde(default, alias = "applicant_email")]
    pub email: Option<String>,
}

/// Everything needed to fill one application form
#[derive(Debug, Clone, Validate)]
pub struct Application {
    pub job_url: Url,

    pub resume: Vec<u8>,

    #[validate(length(min = 1))]
    pub name: String,

    #[validate(email)]
    pub email: String,
}

/// A `job_finder` call, one variant per branch
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "JobFinderArgs")]
pub enum JobRequest {
    AutoApply(Application),
    Analyze {
        description: String,
        user_goal: String,
    },
    Fetch {
        url: Url,
        raw: bool,
        user_goal: String,
    },
    Search {
        query: String,
    },
}

impl JobRequest {
    /// Short branch name for logs
    pub fn branch(&self) -> &'static str {
        match self {
            JobRequest::AutoApply(_) => "apply",
            JobRequest::Analyze { .. } => "analyze",
            JobRequest::Fetch { .. } => "fetch",
            JobRequest::Search { .. } => "search",
        }
    }
}

impl TryFrom<JobFinderArgs> for JobRequest {
    type Error = JobMcpError;

    fn try_from(args: JobFinderArgs) -> Result<Self> {
        let JobFinderArgs {
            user_goal,
            action,
            job_description,
            job_url,
            raw,
            resume_base64,
            name,
            email,
        } = args;

        let job_description = non_empty(job_description);
        let job_url = non_empty(job_url);
        let resume_base64 = non_empty(resume_base64);
        let name = non_empty(name);
        let email = non_empty(email);

        let action = match action {
            Some(action) => action,
            None => infer_action(
                &user_goal,
                job_description.is_some(),
                job_url.is_some(),
                resume_base64.is_some() && name.is_some() && email.is_some(),
            )?,
        };

        match action {
            JobAction::Apply => {
                let application = Application {
                    job_url: parse_url(required(job_url, "job_url")?)?,
                    resume: decode_base64("resume_base64", &required(resume_base64, "resume_base64")?)?,
                    name: required(name, "name")?.trim().to_string(),
                    email: required(email, "email")?.trim().to_string(),
                };
                validate_application(&application)?;
                Ok(JobRequest::AutoApply(application))
            }
            JobAction::Analyze => Ok(JobRequest::Analyze {
                description: required(job_description, "job_description")?,
                user_goal,
            }),
            JobAction::Fetch => Ok(JobRequest::Fetch {
                url: parse_url(required(job_url, "job_url")?)?,
                raw,
                user_goal,
            }),
            JobAction::Search => Ok(JobRequest::Search {
                query: required(non_empty(Some(user_goal)), "user_goal")?,
            }),
        }
    }
}

/// Branch priority for untagged requests: apply, analyze, fetch, search
fn infer_action(
    user_goal: &str,
    has_description: bool,
    has_url: bool,
    has_applicant: bool,
) -> Result<JobAction> {
    if has_url && has_applicant {
        return Ok(JobAction::Apply);
    }
    if has_description {
        return Ok(JobAction::Analyze);
    }
    if has_url {
        return Ok(JobAction::Fetch);
    }

    let goal = user_goal.to_lowercase();
    if SEARCH_KEYWORDS.iter().any(|k| goal.contains(k)) {
        return Ok(JobAction::Search);
    }

    Err(ValidationError::NoBranchMatched.into())
}

fn required(value: Option<String>, field: &str) -> Result<String> {
    value.ok_or_else(|| {
        ValidationError::MissingField {
            field: field.to_string(),
        }
        .into()
    })
}

fn parse_url(raw: String) -> Result<Url> {
    let url = Url::parse(raw.trim()).map_err(|e| ValidationError::InvalidParameter {
        name: "job_url".to_string(),
        message: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ValidationError::InvalidParameter {
            name: "job_url".to_string(),
            message: format!("unsupported scheme '{}'", other),
        }
        .into()),
    }
}

fn validate_application(application: &Application) -> Result<()> {
    let Err(errors) = application.validate() else {
        return Ok(());
    };

    let fields = errors.field_errors();
    if fields.contains_key("email") {
        return Err(ValidationError::InvalidEmail {
            email: application.email.clone(),
        }
        .into());
    }
    Err(ValidationError::InvalidParameter {
        name: fields.keys().next().map(|k| k.to_string()).unwrap_or_default(),
        message: errors.to_string(),
    }
    .into())
}
