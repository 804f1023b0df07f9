use anyhow::{Context, Result, bail};
use blossom_client::{BlossomApi, BlossomResponse, DEFAULT_BASE_URL, NewTranscription};
use clap::{Args, Parser, Subcommand};
use serde_json::{Value, json};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(
    name = "blossom-cli",
    version,
    about = "Small async CLI for calling the Blossom API"
)]
struct Cli {
    /// Email address the bot logs into Blossom with.
    #[arg(long, env = "BLOSSOM_EMAIL")]
    email: String,

    /// Password matching `--email`.
    #[arg(long, env = "BLOSSOM_PASSWORD", hide_env_values = true)]
    password: String,

    /// API key sent as `Authorization: Api-Key <key>`.
    #[arg(long, env = "BLOSSOM_API_KEY", hide_env_values = true)]
    api_key: String,

    /// Base URL that API paths are joined onto.
    #[arg(long, env = "BLOSSOM_API_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Emit compact JSON instead of pretty-printed output.
    #[arg(long)]
    compact: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create a volunteer.
    CreateUser { username: String },
    /// Look up a volunteer by username.
    GetUser { username: String },
    /// Record that a volunteer accepted the Code of Conduct.
    AcceptCoc { username: String },
    /// Register a Reddit post as a submission.
    CreateSubmission(CreateSubmissionArgs),
    /// List submissions matching the given filters.
    GetSubmission(FilterArgs),
    /// Delete a submission by id.
    DeleteSubmission { submission_id: String },
    /// Attach a transcription to a submission.
    CreateTranscription(CreateTranscriptionArgs),
    /// List transcriptions matching the given filters.
    GetTranscription(FilterArgs),
    /// Claim a submission for a volunteer.
    Claim(SubmissionUserArgs),
    /// Release a claimed submission.
    Unclaim(SubmissionUserArgs),
    /// Mark a submission as done.
    Done {
        #[command(flatten)]
        target: SubmissionUserArgs,

        /// Skip the transcription check as a moderator.
        #[arg(long)]
        mod_override: bool,
    },
    /// Fetch submissions whose OCR transcriptions are ready to post.
    OcrQueue {
        /// Submission source; Blossom's default is `reddit`.
        #[arg(long)]
        source: Option<String>,
    },
}

#[derive(Debug, Args)]
struct CreateSubmissionArgs {
    /// Reddit id of the post.
    post_id: String,
    /// URL of the post on the transcription subreddit.
    post_url: String,
    /// URL of the original post.
    original_url: String,
    /// URL of the content to transcribe.
    content_url: String,
}

#[derive(Debug, Args)]
struct CreateTranscriptionArgs {
    /// Reddit id of the transcription comment.
    transcription_id: String,
    /// Submission the transcription belongs to.
    submission_id: String,
    /// Volunteer who wrote it.
    username: String,
    /// Permalink of the transcription comment.
    url: String,
    /// Transcription text.
    text: String,
    /// The comment was removed from Reddit.
    #[arg(long)]
    removed_from_reddit: bool,
}

#[derive(Debug, Args)]
struct SubmissionUserArgs {
    submission_id: String,
    username: String,
}

#[derive(Debug, Args)]
struct FilterArgs {
    /// Query filter in form key=value. Repeat as needed.
    #[arg(long = "filter", value_name = "KEY=VALUE")]
    filter: Vec<String>,
}

/// Entry point for the async CLI.
///
/// Parses command-line arguments, builds the client, dispatches the
/// subcommand, and prints the typed response as JSON.
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "blossom_client=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut client = BlossomApi::new(&cli.email, &cli.password, &cli.api_key, &cli.base_url)
        .with_context(|| format!("failed to create client with base URL '{}'", cli.base_url))?;

    let response = dispatch(&mut client, &cli.command)
        .await
        .context("Blossom call failed")?;

    print_json(&render(&response), cli.compact).context("failed to print JSON output")?;
    Ok(())
}

async fn dispatch(client: &mut BlossomApi, command: &Command) -> Result<BlossomResponse> {
    let response = match command {
        Command::CreateUser { username } => client.create_user(username).await?,
        Command::GetUser { username } => client.get_user(username).await?,
        Command::AcceptCoc { username } => client.accept_coc(username).await?,
        Command::CreateSubmission(args) => {
            client
                .create_submission(
                    &args.post_id,
                    &args.post_url,
                    &args.original_url,
                    &args.content_url,
                )
                .await?
        }
        Command::GetSubmission(args) => {
            let filters = parse_pairs(&args.filter)?;
            client.get_submission(&borrow_pairs(&filters)).await?
        }
        Command::DeleteSubmission { submission_id } => {
            client.delete_submission(submission_id).await?
        }
        Command::CreateTranscription(args) => {
            let transcription = NewTranscription {
                transcription_id: &args.transcription_id,
                text: &args.text,
                url: &args.url,
                username: &args.username,
                submission_id: &args.submission_id,
                removed_from_reddit: args.removed_from_reddit,
            };
            client.create_transcription(&transcription).await?
        }
        Command::GetTranscription(args) => {
            let filters = parse_pairs(&args.filter)?;
            client.get_transcription(&borrow_pairs(&filters)).await?
        }
        Command::Claim(target) => client.claim(&target.submission_id, &target.username).await?,
        Command::Unclaim(target) => {
            client
                .unclaim(&target.submission_id, &target.username)
                .await?
        }
        Command::Done {
            target,
            mod_override,
        } => {
            client
                .done(&target.submission_id, &target.username, *mod_override)
                .await?
        }
        Command::OcrQueue { source } => client.get_ocr_transcriptions(source.as_deref()).await?,
    };
    Ok(response)
}

/// Parses repeated `key=value` arguments into owned key/value pairs.
///
/// Returns an error when a value does not include `=` or has an empty key.
fn parse_pairs(values: &[String]) -> Result<Vec<(String, String)>> {
    let mut pairs = Vec::with_capacity(values.len());
    for item in values {
        let Some((key, value)) = item.split_once('=') else {
            bail!("invalid --filter value '{item}': expected key=value");
        };
        if key.is_empty() {
            bail!("invalid --filter value '{item}': empty key");
        }
        pairs.push((key.to_owned(), value.to_owned()));
    }
    Ok(pairs)
}

fn borrow_pairs(pairs: &[(String, String)]) -> Vec<(&str, &str)> {
    pairs
        .iter()
        .map(|(key, value)| (key.as_str(), value.as_str()))
        .collect()
}

fn render(response: &BlossomResponse) -> Value {
    json!({
        "status": response.status.as_str(),
        "data": response.data,
    })
}

/// Prints a JSON value either compact or pretty-formatted.
fn print_json(value: &Value, compact: bool) -> Result<()> {
    if compact {
        println!(
            "{}",
            serde_json::to_string(value).context("Failed to render JSON")?
        );
    } else {
        println!(
            "{}",
            serde_json::to_string_pretty(value).context("Failed to render JSON")?
        );
    }
    Ok(())
}
