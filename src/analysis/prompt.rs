use crate::models::github::RepositorySummary;

const ANALYSIS_TEMPLATE: &str = include_str!("analysis_prompt.txt");
const ANSWER_TEMPLATE: &str = include_str!("answer_prompt.txt");

/// Everything one submission carries. Built per invocation, handed to the
/// composer and discarded. Validation happens before construction.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub resume_text: String,
    pub repositories: Vec<RepositorySummary>,
    pub job_role: String,
    pub company: String,
    pub job_description: String,
}

/// Builds the four-section analysis prompt. Pure: no I/O, no validation.
pub fn compose_analysis_prompt(request: &AnalysisRequest) -> String {
    fill_template(ANALYSIS_TEMPLATE, request)
}

/// Builds the narrower recruiter-question prompt over the same context.
pub fn compose_answer_prompt(request: &AnalysisRequest, question: &str) -> String {
    fill_template(ANSWER_TEMPLATE, request).replace("{question}", question)
}

fn fill_template(template: &str, request: &AnalysisRequest) -> String {
    template
        .replace("{resume_text}", &request.resume_text)
        .replace("{github_repos}", &render_repositories(&request.repositories))
        .replace("{job_role}", &request.job_role)
        .replace("{company}", &request.company)
        .replace("{job_description}", &request.job_description)
}

fn render_repositories(repositories: &[RepositorySummary]) -> String {
    // struct field order keeps the serialized block stable: name, description, readme
    serde_json::to_string_pretty(repositories).unwrap_or_else(|_| "[]".to_string())
}
