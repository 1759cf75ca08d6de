use std::path::PathBuf;

use clap::Parser;
use log::LevelFilter;

#[derive(Parser, Debug)]
#[command(name = "jobmatch")]
#[command(about = "Analyze your resume and GitHub projects against a job description using Gemini", long_about = None)]
pub struct Args {
    /// Path to the configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
    pub config: PathBuf,

    /// Path to your resume as a plain-text file
    #[arg(short, long, value_name = "FILE")]
    pub resume: Option<PathBuf>,

    /// Job position/title (e.g. 'Senior Rust Developer')
    #[arg(long, value_name = "TITLE")]
    pub role: Option<String>,

    /// Company you are applying to
    #[arg(long, value_name = "NAME")]
    pub company: Option<String>,

    /// Job description text, inline
    #[arg(long, value_name = "TEXT", conflicts_with = "job_file")]
    pub job: Option<String>,

    /// Path to a file containing the job description
    #[arg(long, value_name = "FILE")]
    pub job_file: Option<PathBuf>,

    /// GitHub username to pull public repositories from (overrides config)
    #[arg(short, long, value_name = "USER")]
    pub username: Option<String>,

    /// GitHub personal access token for higher rate limits (overrides config)
    #[arg(long, value_name = "TOKEN")]
    pub github_token: Option<String>,

    /// Gemini API key (overrides config)
    #[arg(long, value_name = "KEY")]
    pub api_key: Option<String>,

    /// Answer a single recruiter question instead of the full analysis
    #[arg(short, long, value_name = "TEXT")]
    pub question: Option<String>,

    /// Bypass the repository cache and fetch fresh data
    #[arg(long)]
    pub refresh: bool,

    /// Also print the raw model response
    #[arg(long)]
    pub raw: bool,

    /// Sets the logger's verbosity level
    #[arg(short, long, value_name = "VERBOSITY", default_value_t = LevelFilter::Info)]
    pub verbosity: LevelFilter,
}
