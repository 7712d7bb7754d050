use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::form::FormInput;

// ── Wire types ────────────────────────────────────────────────────────────────

/// The wire-ready form of a validated `FormInput`. Goals are reduced to
/// their raw tag values and the infrastructure free text is normalized
/// into a list; everything else passes through as the user typed it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanRequest {
    pub land_area: String,
    pub current_population: String,
    pub zoning: String,
    pub existing_infrastructure: Vec<String>,
    pub sustainability_goals: Vec<String>,
    pub budget: String,
}

impl PlanRequest {
    pub fn from_form(form: &FormInput) -> Self {
        Self {
            land_area: form.land_area().to_string(),
            current_population: form.population().to_string(),
            zoning: form.zoning().to_string(),
            existing_infrastructure: form.infrastructure_list(),
            sustainability_goals: form
                .goals()
                .iter()
                .map(|g| g.tag().to_string())
                .collect(),
            budget: form.budget().to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct PlanBody {
    plan: Option<String>,
    sustainability_score: Option<f64>,
}

/// A successful plan-generation response. The plan text is passed through
/// verbatim — an empty string is a valid plan. The score is an extra the
/// service sends alongside the plan; it is display-only.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedPlan {
    pub text: String,
    pub sustainability_score: Option<f64>,
}

// ── Failure taxonomy ──────────────────────────────────────────────────────────

/// Why a plan request could not be fulfilled. All three variants collapse
/// to one user-visible failure; the distinction exists for the log.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RequestError {
    #[error("could not reach the plan service: {0}")]
    Transport(String),
    #[error("plan service returned HTTP {status}: {detail}")]
    Status { status: u16, detail: String },
    #[error("plan service response was missing the plan text")]
    MalformedBody,
}

// ── Client ────────────────────────────────────────────────────────────────────

pub struct PlanClient {
    http: reqwest::Client,
    endpoint: String,
}

impl PlanClient {
    /// Build a client against `endpoint`. The timeout covers the whole
    /// request; expiry surfaces as `RequestError::Transport`.
    pub fn new(endpoint: String, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http, endpoint })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Issue one plan-generation request. No retries, no caching — an
    /// identical request submitted twice goes out twice.
    pub async fn submit(&self, request: &PlanRequest) -> Result<GeneratedPlan, RequestError> {
        let url = plan_url(&self.endpoint);

        let resp = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| RequestError::Transport(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| RequestError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(RequestError::Status {
                status: status.as_u16(),
                detail: first_line(&body),
            });
        }

        parse_plan(&body)
    }
}

fn plan_url(endpoint: &str) -> String {
    format!("{}/generate_plan", endpoint.trim_end_matches('/'))
}

/// Parse a success body. Anything without a `plan` field — including
/// non-JSON — is a malformed response.
fn parse_plan(body: &str) -> Result<GeneratedPlan, RequestError> {
    let parsed: PlanBody =
        serde_json::from_str(body).map_err(|_| RequestError::MalformedBody)?;
    match parsed.plan {
        Some(text) => Ok(GeneratedPlan {
            text,
            sustainability_score: parsed.sustainability_score,
        }),
        None => Err(RequestError::MalformedBody),
    }
}

/// First line of an error body, bounded, for log/display context.
fn first_line(body: &str) -> String {
    let line = body.lines().next().unwrap_or("").trim();
    if line.chars().count() > 120 {
        let truncated: String = line.chars().take(120).collect();
        format!("{truncated}…")
    } else {
        line.to_string()
    }
}
