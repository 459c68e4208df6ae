//! Colored terminal rendering.

use chrono::{DateTime, Utc};
use colored::Colorize;

use crate::models::{RateLimitStatus, RepositoryAnalysis, UserAnalysis};

const BAR_WIDTH: usize = 30;
const MAX_LANGUAGES: usize = 8;

fn date(value: &DateTime<Utc>) -> String {
    value.format("%Y-%m-%d").to_string()
}

fn language_bar(pct: f64) -> String {
    let filled = ((pct / 100.0) * BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(BAR_WIDTH);
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}

pub fn render_repository(analysis: &RepositoryAnalysis) -> String {
    let mut output = String::new();

    output.push_str(&format!("\n{}\n", analysis.full_name.bold().cyan()));
    if let Some(ref description) = analysis.description {
        output.push_str(&format!("{}\n", description.italic()));
    }
    output.push_str(&format!("{}\n\n", analysis.url.dimmed()));

    output.push_str(&format!(
        "  {} {}   {} {}   {} {}\n",
        "★".yellow(),
        analysis.stars,
        "Forks:".bold(),
        analysis.forks,
        "Open issues:".bold(),
        analysis.open_issues
    ));
    output.push_str(&format!(
        "  {} {}\n",
        "Last commit:".bold(),
        date(&analysis.last_commit_date)
    ));
    output.push_str(&format!(
        "  {} {}   {} {}\n",
        "Created:".bold(),
        date(&analysis.created_at),
        "Updated:".bold(),
        date(&analysis.updated_at)
    ));
    output.push_str(&format!(
        "  {} {}   {} {} KB   {} {}\n",
        "License:".bold(),
        analysis.license.as_deref().unwrap_or("none"),
        "Size:".bold(),
        analysis.size,
        "Branch:".bold(),
        analysis.default_branch
    ));

    if !analysis.topics.is_empty() {
        output.push_str(&format!(
            "  {} {}\n",
            "Topics:".bold(),
            analysis.topics.join(", ").green()
        ));
    }

    output.push_str(&format!("\n  {}\n", "Languages".bold().underline()));
    if analysis.languages.is_empty() {
        output.push_str(&format!("  {}\n", "no language data".dimmed()));
    } else {
        for (language, pct) in analysis.languages_by_share().into_iter().take(MAX_LANGUAGES) {
            output.push_str(&format!(
                "  {:<14} {} {:>6.2}%\n",
                language,
                language_bar(pct).blue(),
                pct
            ));
        }
    }

    output
}

pub fn render_user(analysis: &UserAnalysis) -> String {
    let mut output = String::new();

    let title = match analysis.name {
        Some(ref name) => format!("{} ({})", name, analysis.username),
        None => analysis.username.clone(),
    };
    output.push_str(&format!("\n{}\n", title.bold().cyan()));
    if let Some(ref bio) = analysis.bio {
        output.push_str(&format!("{}\n", bio.italic()));
    }
    output.push('\n');

    let fields = [
        ("Company", analysis.company.as_deref()),
        ("Location", analysis.location.as_deref()),
        ("Email", analysis.email.as_deref()),
        ("Blog", analysis.blog.as_deref()),
    ];
    for (label, value) in fields {
        if let Some(value) = value {
            output.push_str(&format!("  {} {}\n", format!("{}:", label).bold(), value));
        }
    }

    output.push_str(&format!(
        "  {} {}   {} {}   {} {}\n",
        "Public repos:".bold(),
        analysis.public_repos,
        "Followers:".bold(),
        analysis.followers,
        "Following:".bold(),
        analysis.following
    ));
    output.push_str(&format!(
        "  {} {}\n",
        "Joined:".bold(),
        date(&analysis.created_at)
    ));

    output.push_str(&format!(
        "\n  {} ({} repositories, {} stars)\n",
        "Top repositories".bold().underline(),
        analysis.repositories.len(),
        analysis.total_stars()
    ));

    if analysis.repositories.is_empty() {
        output.push_str(&format!("  {}\n", "no repositories analyzed".dimmed()));
    }

    for (rank, repo) in analysis.repositories.iter().enumerate() {
        let languages: Vec<String> = repo
            .languages_by_share()
            .into_iter()
            .take(3)
            .map(|(name, pct)| format!("{} {:.1}%", name, pct))
            .collect();

        output.push_str(&format!(
            "  {:>2}. {} {} {}  last commit {}\n",
            rank + 1,
            repo.name.bold(),
            "★".yellow(),
            repo.stars,
            date(&repo.last_commit_date)
        ));
        if let Some(ref description) = repo.description {
            output.push_str(&format!("      {}\n", description.dimmed()));
        }
        if !languages.is_empty() {
            output.push_str(&format!("      {}\n", languages.join(", ").blue()));
        }
    }

    output
}

pub fn render_rate_limit(status: &RateLimitStatus) -> String {
    let remaining = format!("{}/{}", status.remaining, status.limit);
    let remaining = if status.is_exhausted() {
        remaining.red().bold()
    } else if status.remaining * 10 < status.limit {
        remaining.yellow()
    } else {
        remaining.green()
    };

    format!(
        "{} {} requests remaining, resets at {}\n",
        "Rate limit:".bold(),
        remaining,
        status.reset_at.format("%Y-%m-%d %H:%M:%S UTC")
    )
}
