mod analysis;
mod collector;
mod models;
mod utils;

use clap::Parser;
use colored::Colorize;
use eyre::Result;
use log::{info, warn};

use crate::analysis::agent::GeminiClient;
use crate::analysis::extract::{SectionTitle, extract_sections};
use crate::analysis::prompt::{AnalysisRequest, compose_analysis_prompt, compose_answer_prompt};
use crate::collector::github::{CollectorError, GitHubCollector, resolve_credential};
use crate::models::github::RepositorySummary;
use crate::utils::cache::RepoCache;
use crate::utils::cli::Args;
use crate::utils::config::{Config, config};
use crate::utils::log::Logger;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    Logger::init(args.verbosity);

    info!(
        "starting jobmatch {}",
        format!("v{}", env!("CARGO_PKG_VERSION")).magenta()
    );

    let config: Config = config(args.config.clone())?;

    let inputs = gather_inputs(&args, &config).await?;

    let username = args
        .username
        .clone()
        .or_else(|| config.github.username.clone());

    let repositories = match &username {
        Some(username) => {
            let credential = resolve_credential(
                args.github_token.clone(),
                config.github.token.clone(),
                std::env::var("GITHUB_TOKEN").ok(),
            );
            fetch_repositories(username, credential, &config, args.refresh).await?
        }
        None => {
            warn!("GitHub username not provided; analysis will proceed without repository context");
            Vec::new()
        }
    };

    let request = AnalysisRequest {
        resume_text: inputs.resume_text,
        repositories,
        job_role: inputs.role,
        company: inputs.company,
        job_description: inputs.job_description,
    };

    let client = GeminiClient::new(
        Some(inputs.api_key),
        config.llm.model.clone(),
        config.llm.endpoint.clone(),
    )?;

    match &args.question {
        Some(question) => {
            info!("answering recruiter question with Gemini");
            let prompt = compose_answer_prompt(&request, question);
            let response = client.generate(&prompt).await?;
            render_answer(question, &response);
        }
        None => {
            info!("analyzing job match with Gemini");
            let prompt = compose_analysis_prompt(&request);
            let response = client.generate(&prompt).await?;
            render_analysis(&response, args.raw);
        }
    }

    Ok(())
}

struct Inputs {
    api_key: String,
    resume_text: String,
    role: String,
    company: String,
    job_description: String,
}

/// Collects and validates everything a submission needs. Missing inputs are
/// reported itemized, all at once, rather than one per run.
async fn gather_inputs(args: &Args, config: &Config) -> Result<Inputs> {
    let mut missing: Vec<String> = Vec::new();

    let api_key = args.api_key.clone().or_else(|| config.llm.api_key.clone());
    if api_key.is_none() {
        missing.push("Gemini API key (--api-key or llm.api_key in the config)".to_string());
    }

    let resume_text = match &args.resume {
        Some(path) => match tokio::fs::read_to_string(path).await {
            Ok(text) if !text.trim().is_empty() => Some(text),
            Ok(_) => {
                missing.push(format!("resume file '{}' is empty", path.display()));
                None
            }
            Err(err) => {
                missing.push(format!("resume file '{}': {err}", path.display()));
                None
            }
        },
        None => {
            missing.push("resume file (--resume)".to_string());
            None
        }
    };

    let role = args.role.clone();
    if role.is_none() {
        missing.push("job position/title (--role)".to_string());
    }

    let company = args.company.clone();
    if company.is_none() {
        missing.push("company name (--company)".to_string());
    }

    let job_description = match (&args.job, &args.job_file) {
        (Some(text), _) => Some(text.clone()),
        (None, Some(path)) => match tokio::fs::read_to_string(path).await {
            Ok(text) => Some(text),
            Err(err) => {
                missing.push(format!("job description file '{}': {err}", path.display()));
                None
            }
        },
        (None, None) => {
            missing.push("job description (--job or --job-file)".to_string());
            None
        }
    };

    match (api_key, resume_text, role, company, job_description) {
        (Some(api_key), Some(resume_text), Some(role), Some(company), Some(job_description)) => {
            Ok(Inputs {
                api_key,
                resume_text,
                role,
                company,
                job_description,
            })
        }
        _ => eyre::bail!(
            "cannot proceed, missing required inputs:\n  - {}",
            missing.join("\n  - ")
        ),
    }
}

async fn fetch_repositories(
    username: &str,
    credential: Option<String>,
    config: &Config,
    refresh: bool,
) -> Result<Vec<RepositorySummary>> {
    let cache = RepoCache::open(config.fetch.cache_ttl_secs)?;
    let authenticated = credential.is_some();

    if let Some(cached) = cache.load(username, authenticated, refresh) {
        info!("using cached repositories for '{username}'");
        return Ok(cached);
    }

    info!("fetching GitHub repositories for '{username}'");
    let collector = GitHubCollector::new(credential, &config.fetch);
    let repositories = collector.fetch(username).await.map_err(|err| match err {
        CollectorError::AuthRateLimited {
            authenticated: false,
        } => eyre::eyre!(
            "{err} Consider adding a GitHub personal access token to significantly increase the rate limit."
        ),
        other => eyre::eyre!(other),
    })?;

    // empty results are stored too; the entry itself marks a confirmed empty fetch
    cache.store(username, authenticated, &repositories)?;

    Ok(repositories)
}

fn render_analysis(response: &str, raw: bool) {
    let extraction = extract_sections(response);

    if let Some(fallback) = &extraction.fallback {
        warn!("could not parse structured sections from the response; showing it raw");
        println!("{fallback}");
        return;
    }

    println!("\n{}", "=== Analysis Results ===".cyan().bold());
    for (title, section) in &extraction.sections {
        println!("\n{}", title.heading().cyan().bold());
        match section {
            Some(section) => {
                println!("{}", section.body);
                if *title == SectionTitle::ResumeObjective {
                    println!("{}", "(copy-paste ready)".green());
                }
            }
            None => println!(
                "{}",
                format!(
                    "Could not extract '{title}' from the response. Re-run with --raw to inspect the raw output."
                )
                .yellow()
            ),
        }
    }

    if raw {
        println!("\n{}", "=== Raw Response ===".cyan().bold());
        println!("{response}");
    }
}

fn render_answer(question: &str, response: &str) {
    println!("\n{}", question.cyan().bold());
    println!("{response}");
}
