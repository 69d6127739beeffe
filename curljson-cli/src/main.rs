//! curljson CLI - Pick a value out of a JSON document for monitoring checks
//!
//! One invocation does one pass:
//! - acquire the document from `--url` or a snapshot `--input`
//! - resolve the `--key` path
//! - print the value, a `zabbix-lld` discovery document, or a `sum`
//! - or save the fetched document with `--output`

use clap::{ArgGroup, Parser};
use curljson_io::{
    encode_default_vhost, run, CachedFile, Credentials, Feature, FetchRequest, HttpFetcher, Limits,
    Macro, Mode, PathSpec, RunRequest, RunSummary, SourceSpec,
};
use std::error::Error;
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::debug;
use tracing_subscriber::EnvFilter;

const VERBOSE_FILTER: &str =
    "warn,curljson=debug,curljson_io=debug,curljson_feature=debug,curljson_format=debug";

#[derive(Parser, Debug)]
#[command(name = "curljson")]
#[command(about = "Fetch JSON over HTTP or from a snapshot and print the value at a key path")]
#[command(version)]
#[command(group(ArgGroup::new("source").required(true).args(["url", "input"])))]
#[command(after_help = "Examples:
  curljson --url rabbitmq:15672/api/queues///myqueue --username guest --password guest --key message_stats.publish
  curljson --url elasticsearch:9200/_search --output /tmp/search.json
  curljson --input /tmp/search.json --age 60 --key hits.hits --feature zabbix-lld --macro '' --macro _source.title
  curljson --input /tmp/search.json --key hits.hits --feature sum --macro _source.views")]
struct Cli {
    /// URL of the JSON document
    #[arg(short = 'l', long)]
    url: Option<String>,
    /// Send DATA as a POST body instead of a GET
    #[arg(short = 's', long, value_name = "DATA", requires = "url")]
    post: Option<String>,
    /// Username for basic access authentication; prompts when given empty
    #[arg(
        short = 'u',
        long,
        value_name = "USER",
        num_args = 0..=1,
        default_missing_value = "",
        env = "CURLJSON_USERNAME"
    )]
    username: Option<String>,
    /// Password for basic access authentication; prompts when given empty
    #[arg(
        short = 'p',
        long,
        value_name = "SECRET",
        num_args = 0..=1,
        default_missing_value = "",
        env = "CURLJSON_PASSWORD",
        hide_env_values = true
    )]
    password: Option<String>,
    /// Read the document from a snapshot file
    #[arg(short = 'i', long, value_name = "FILE")]
    input: Option<PathBuf>,
    /// Maximum snapshot age in seconds (0 disables the check)
    #[arg(short = 'a', long, value_name = "SEC", requires = "input")]
    age: Option<u64>,
    /// Dotted key path of the value; quote segments containing dots
    #[arg(short = 'k', long, default_value = "")]
    key: String,
    /// Save the fetched document to FILE instead of printing
    #[arg(
        short = 'o',
        long,
        value_name = "FILE",
        requires = "url",
        conflicts_with = "feature"
    )]
    output: Option<PathBuf>,
    /// Shape the value: zabbix-lld or sum
    #[arg(short = 'f', long, value_name = "METHOD")]
    feature: Option<String>,
    /// Per-record key path for the feature (repeatable)
    #[arg(short = 'm', long = "macro", value_name = "KEY")]
    macros: Vec<String>,
    /// HTTP timeout in seconds
    #[arg(long, value_name = "SEC")]
    timeout: Option<u64>,
    /// Print intermediate values to stderr
    #[arg(short = 'v', long, visible_alias = "debug")]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if let Some(err) = err.downcast_ref::<curljson_io::CurlJsonError>() {
                debug!(kind = err.kind().as_str(), "run failed");
            }
            eprintln!("{}", err);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { VERBOSE_FILTER } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn execute(cli: Cli) -> Result<(), Box<dyn Error>> {
    debug!(
        url = ?cli.url,
        input = ?cli.input,
        age = ?cli.age,
        key = %cli.key,
        feature = ?cli.feature,
        macros = ?cli.macros,
        output = ?cli.output,
        post = cli.post.is_some(),
        auth = cli.username.is_some() || cli.password.is_some(),
        "source options"
    );

    let credentials = if cli.url.is_some() {
        resolve_credentials(
            cli.username.clone(),
            cli.password.clone(),
            SecretInput::detect(),
            &mut io::stdin().lock(),
            &mut io::stderr(),
        )?
    } else {
        None
    };
    let request = build_request(cli, credentials)?;
    debug!(?request, "ordered options");

    let summary = run(&request, &HttpFetcher)?;
    report_summary(&summary, &mut io::stdout().lock())?;
    Ok(())
}

fn build_request(
    cli: Cli,
    credentials: Option<Credentials>,
) -> Result<RunRequest, Box<dyn Error>> {
    let limits = Limits::default();

    let source = match (cli.url, cli.input) {
        (Some(url), _) => SourceSpec::Live(FetchRequest {
            url: encode_default_vhost(&url),
            body: cli.post,
            credentials,
            timeout: cli.timeout.map(Duration::from_secs),
        }),
        (None, Some(input)) => {
            SourceSpec::Cached(CachedFile::new(input).with_max_age_secs(cli.age.unwrap_or(0)))
        }
        (None, None) => return Err("Either --url or --input is required".into()),
    };

    let key = PathSpec::parse_with_limits(&cli.key, &limits)?;

    let mode = if let Some(path) = cli.output {
        Mode::Save(path)
    } else if let Some(name) = cli.feature {
        let feature: Feature = name.parse()?;
        let macros = cli
            .macros
            .iter()
            .map(|m| Macro::parse_with_limits(m, &limits))
            .collect::<Result<Vec<_>, _>>()?;
        Mode::Feature { feature, macros }
    } else {
        Mode::Value
    };

    let mut request = RunRequest::new(source, key).with_mode(mode);
    request.limits = limits;
    Ok(request)
}

/// How the password prompt reads its answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SecretInput {
    /// Terminal with echo turned off
    Hidden,
    /// Plain line from the input stream
    Line,
}

impl SecretInput {
    fn detect() -> Self {
        if io::stdin().is_terminal() {
            SecretInput::Hidden
        } else {
            SecretInput::Line
        }
    }
}

/// Fill in missing credentials from the terminal.
///
/// An empty username, or a password without a username, asks for the
/// username; likewise for the password.
fn resolve_credentials<R: BufRead, W: Write>(
    username: Option<String>,
    password: Option<String>,
    secret: SecretInput,
    input: &mut R,
    prompt: &mut W,
) -> io::Result<Option<Credentials>> {
    if username.is_none() && password.is_none() {
        return Ok(None);
    }

    let username = match username.filter(|u| !u.is_empty()) {
        Some(u) => u,
        None => ask("Username: ", input, prompt)?,
    };
    let password = match password.filter(|p| !p.is_empty()) {
        Some(p) => p,
        None => match secret {
            SecretInput::Hidden => rpassword::prompt_password("Password: ")?,
            SecretInput::Line => ask("Password: ", input, prompt)?,
        },
    };

    Ok(Some(Credentials { username, password }))
}

fn ask<R: BufRead, W: Write>(label: &str, input: &mut R, prompt: &mut W) -> io::Result<String> {
    write!(prompt, "{}", label)?;
    prompt.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    let trimmed = line.strip_suffix('\n').unwrap_or(&line);
    let trimmed = trimmed.strip_suffix('\r').unwrap_or(trimmed);
    Ok(trimmed.to_string())
}

fn report_summary<W: Write>(summary: &RunSummary, out: &mut W) -> io::Result<()> {
    let metrics = &summary.metrics;
    debug!(
        source = %metrics.source,
        document_bytes = metrics.document_bytes,
        records = ?metrics.records,
        elapsed_ms = metrics.elapsed.as_millis() as u64,
        "run complete"
    );

    match summary.output.render() {
        Some(text) => writeln!(out, "{}", text),
        None => Ok(()),
    }
}
