use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use repolens::analysis::validate_repo_limit;
use repolens::github::{ProgressObserver, SpinnerProgress, TracingProgress};
use repolens::output::{self, OutputFormat};
use repolens::{
    looks_like_account_handle, parse_identifier, resolve_target, Analyzer, AnalyzerConfig,
    Config, Error, GitHubApi, GitHubClient, Lookup, Target,
};

#[derive(Parser, Debug)]
#[command(name = "repolens")]
#[command(version)]
#[command(about = "Summarize GitHub repositories and user profiles")]
struct Cli {
    /// GitHub token sent as a bearer credential
    #[arg(long, global = true, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Hide progress spinners
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Do not check the API quota before analyzing
    #[arg(long, global = true)]
    skip_rate_check: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze a repository (URL, SSH remote or owner/repo)
    Repo {
        target: String,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Analyze a user's profile and top repositories
    User {
        handle: String,

        /// Number of repositories to include (1-50)
        #[arg(short = 'n', long)]
        max_repos: Option<usize>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Detect whether the input is a repository or a user and analyze it
    Analyze {
        input: String,

        /// Number of repositories to include for users (1-50)
        #[arg(short = 'n', long)]
        max_repos: Option<usize>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Show the remaining API quota
    RateLimit,
}

#[derive(Args, Debug)]
struct OutputArgs {
    /// Output format written to stdout
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Also write JSON and Markdown files
    #[arg(long)]
    save: bool,

    /// Directory for saved files
    #[arg(short, long)]
    output_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables before clap reads GITHUB_TOKEN
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    if let Err(e) = init_tracing(cli.verbose) {
        eprintln!("failed to initialize logging: {}", e);
    }

    if cli.no_color {
        colored::control::set_override(false);
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", "error:".red().bold(), e);
            let error = e.downcast_ref::<Error>();
            if let Some(Error::RateLimited { .. }) = error {
                eprintln!("Run `repolens rate-limit` to inspect the current quota.");
            }
            ExitCode::from(error.map(Error::exit_code).unwrap_or(1))
        }
    }
}

fn init_tracing(verbose: bool) -> anyhow::Result<()> {
    let level = if verbose { "repolens=debug" } else { "repolens=info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(level.parse()?)
                .add_directive("reqwest=warn".parse()?),
        )
        .init();
    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::from_env()?;
    if cli.token.is_some() {
        config.github_token = cli.token.clone();
    }

    let progress: Arc<dyn ProgressObserver> = if cli.quiet {
        Arc::new(TracingProgress)
    } else {
        Arc::new(SpinnerProgress::new())
    };

    // Validate input before any request goes out
    let (target, max_repos, output_args) = match cli.command {
        Command::RateLimit => {
            let client = GitHubClient::new(&config)?.with_progress(progress);
            return show_rate_limit(&client).await;
        }
        Command::Repo { target, output } => {
            let identifier = parse_identifier(&target);
            if !identifier.valid {
                return Err(Error::InvalidIdentifier(target).into());
            }
            tracing::debug!("Resolved repository {}", identifier.full_name());
            let target = Target::Repository {
                owner: identifier.owner,
                repo: identifier.repo,
            };
            (target, config.default_max_repos, output)
        }
        Command::User {
            handle,
            max_repos,
            output,
        } => {
            if !looks_like_account_handle(&handle) {
                return Err(Error::InvalidIdentifier(handle).into());
            }
            let max_repos = max_repos.unwrap_or(config.default_max_repos);
            validate_repo_limit(max_repos)?;
            (Target::Account(handle.trim().to_string()), max_repos, output)
        }
        Command::Analyze {
            input,
            max_repos,
            output,
        } => {
            let target = resolve_target(&input)?;
            let max_repos = max_repos.unwrap_or(config.default_max_repos);
            if matches!(target, Target::Account(_)) {
                validate_repo_limit(max_repos)?;
            }
            (target, max_repos, output)
        }
    };

    let client: Arc<dyn GitHubApi> =
        Arc::new(GitHubClient::new(&config)?.with_progress(progress.clone()));

    if !cli.skip_rate_check {
        check_rate_limit(client.as_ref(), progress.as_ref()).await;
    }

    let analyzer = Analyzer::from_shared(client, AnalyzerConfig::from(&config))
        .with_progress(progress);

    match target {
        Target::Repository { owner, repo } => {
            let analysis = analyzer.analyze_repository(&owner, &repo).await?;
            emit(
                &analysis,
                Rendered {
                    text: output::render_repository(&analysis),
                    markdown: output::repository_markdown(&analysis),
                    stem: output::repository_file_stem(&analysis),
                },
                &output_args,
                &config,
            )
        }
        Target::Account(handle) => {
            let analysis = analyzer.analyze_user(&handle, max_repos).await?;
            emit(
                &analysis,
                Rendered {
                    text: output::render_user(&analysis),
                    markdown: output::user_markdown(&analysis),
                    stem: output::user_file_stem(&analysis),
                },
                &output_args,
                &config,
            )
        }
    }
}

/// Warns when the quota is already spent. Never blocks the command.
async fn check_rate_limit(client: &dyn GitHubApi, progress: &dyn ProgressObserver) {
    match client.fetch_rate_limit().await {
        Lookup::Found(status) if status.is_exhausted() => {
            progress.warning(&format!(
                "API rate limit exhausted ({}/{}), resets at {}",
                status.remaining,
                status.limit,
                status.reset_at.format("%H:%M:%S UTC")
            ));
        }
        Lookup::Found(status) => {
            tracing::debug!("{} of {} requests remaining", status.remaining, status.limit);
        }
        Lookup::Missing | Lookup::Unavailable(_) => {
            tracing::debug!("Rate limit check skipped");
        }
    }
}

async fn show_rate_limit(client: &GitHubClient) -> anyhow::Result<()> {
    match client.fetch_rate_limit().await {
        Lookup::Found(status) => {
            print!("{}", output::render_rate_limit(&status));
            Ok(())
        }
        Lookup::Missing => anyhow::bail!("GitHub returned no rate limit information"),
        Lookup::Unavailable(reason) => {
            anyhow::bail!("Could not retrieve rate limit status: {}", reason)
        }
    }
}

struct Rendered {
    text: String,
    markdown: String,
    stem: String,
}

fn emit<T: Serialize>(
    value: &T,
    rendered: Rendered,
    args: &OutputArgs,
    config: &Config,
) -> anyhow::Result<()> {
    let output = match args.format {
        OutputFormat::Json => serde_json::to_string_pretty(value)?,
        OutputFormat::Markdown => rendered.markdown.clone(),
        OutputFormat::Text => rendered.text,
    };
    println!("{}", output);

    if args.save {
        let dir = args.output_dir.as_ref().unwrap_or(&config.output_dir);
        let saved = output::save_analysis(dir, &rendered.stem, value, &rendered.markdown)?;
        eprintln!(
            "{} {} and {}",
            "Saved".green(),
            saved.json.display(),
            saved.markdown.display()
        );
    }

    Ok(())
}
