use crate::models::{RepositoryAnalysis, UserAnalysis};

fn push_repository_body(output: &mut String, analysis: &RepositoryAnalysis, heading: &str) {
    output.push_str(&format!(
        "{} [{}]({})\n\n",
        heading, analysis.full_name, analysis.url
    ));

    if let Some(ref description) = analysis.description {
        output.push_str(&format!("> {}\n\n", description));
    }

    output.push_str("| Metric | Value |\n|--------|-------|\n");
    output.push_str(&format!("| Stars | {} |\n", analysis.stars));
    output.push_str(&format!("| Forks | {} |\n", analysis.forks));
    output.push_str(&format!("| Open Issues | {} |\n", analysis.open_issues));
    output.push_str(&format!(
        "| Last Commit | {} |\n",
        analysis.last_commit_date.format("%Y-%m-%d")
    ));
    output.push_str(&format!(
        "| Created | {} |\n",
        analysis.created_at.format("%Y-%m-%d")
    ));
    output.push_str(&format!(
        "| Updated | {} |\n",
        analysis.updated_at.format("%Y-%m-%d")
    ));
    output.push_str(&format!(
        "| License | {} |\n",
        analysis.license.as_deref().unwrap_or("None")
    ));
    output.push_str(&format!("| Size | {} KB |\n", analysis.size));
    output.push_str(&format!("| Default Branch | {} |\n", analysis.default_branch));

    if !analysis.topics.is_empty() {
        let topics: Vec<String> = analysis.topics.iter().map(|t| format!("`{}`", t)).collect();
        output.push_str(&format!("\n**Topics:** {}\n", topics.join(" ")));
    }

    if !analysis.languages.is_empty() {
        output.push_str("\n| Language | Share |\n|----------|-------|\n");
        for (language, pct) in analysis.languages_by_share() {
            output.push_str(&format!("| {} | {:.2}% |\n", language, pct));
        }
    }

    output.push('\n');
}

pub fn repository_markdown(analysis: &RepositoryAnalysis) -> String {
    let mut output = String::new();
    push_repository_body(&mut output, analysis, "# Repository Analysis:");
    output
}

pub fn user_markdown(analysis: &UserAnalysis) -> String {
    let mut output = String::new();

    output.push_str(&format!("# Profile Analysis: {}\n\n", analysis.username));

    if let Some(ref name) = analysis.name {
        output.push_str(&format!("**Name:** {}\n\n", name));
    }
    if let Some(ref bio) = analysis.bio {
        output.push_str(&format!("> {}\n\n", bio));
    }

    output.push_str("## Summary\n\n");
    output.push_str("| Field | Value |\n|-------|-------|\n");
    let optional = [
        ("Company", &analysis.company),
        ("Location", &analysis.location),
        ("Email", &analysis.email),
        ("Blog", &analysis.blog),
    ];
    for (label, value) in optional {
        if let Some(value) = value {
            output.push_str(&format!("| {} | {} |\n", label, value));
        }
    }
    output.push_str(&format!("| Public Repositories | {} |\n", analysis.public_repos));
    output.push_str(&format!("| Followers | {} |\n", analysis.followers));
    output.push_str(&format!("| Following | {} |\n", analysis.following));
    output.push_str(&format!(
        "| Member Since | {} |\n",
        analysis.created_at.format("%Y-%m-%d")
    ));

    output.push_str(&format!(
        "\n## Top Repositories ({})\n\n",
        analysis.repositories.len()
    ));

    if analysis.repositories.is_empty() {
        output.push_str("_No repositories analyzed._\n");
    }

    for repo in &analysis.repositories {
        push_repository_body(&mut output, repo, "###");
    }

    output
}
