use anyhow::bail;
use clap::{Parser, ValueEnum};
use core::time::Duration;
use reposum::ServiceConfig;

/// Public GitLab GraphQL endpoint.
pub const GITLAB_API_URL: &str = "https://gitlab.com/api/graphql";

/// Where repository data comes from.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Query the GitLab GraphQL API.
    Gitlab,
    /// Generate numbered repositories locally with random latency.
    Synthetic,
}

/// Runtime configuration for the `reposum` binary.
///
/// One summary is requested for every repository count in
/// `[min_repo_count, max_repo_count]`. All values are parsed from CLI
/// arguments or environment variables (a `.env` file is honored).
#[derive(Parser, Debug, Clone)]
#[command(
    name = "reposum",
    version,
    about = "Summarize the most recent GitLab projects under bounded concurrency"
)]
pub struct CliArgs {
    /// Smallest number of repositories to summarize.
    ///
    /// Environment variable: `MIN_REPO_COUNT`
    #[arg(long, env = "MIN_REPO_COUNT", default_value_t = 5)]
    pub min_repo_count: usize,

    /// Largest number of repositories to summarize.
    ///
    /// Environment variable: `MAX_REPO_COUNT`
    #[arg(long, env = "MAX_REPO_COUNT", default_value_t = 25)]
    pub max_repo_count: usize,

    /// Maximum number of concurrent network requests.
    ///
    /// Environment variable: `MAX_NET_CONNS`
    #[arg(long, env = "MAX_NET_CONNS", default_value_t = reposum::DEFAULT_MAX_CONNECTIONS)]
    pub max_net_conns: usize,

    /// Number of workers processing fetched data. Defaults to the number of
    /// logical CPUs.
    ///
    /// Environment variable: `WORKER_COUNT`
    #[arg(long, env = "WORKER_COUNT")]
    pub worker_count: Option<usize>,

    /// Separator placed between repository names.
    ///
    /// Environment variable: `REPO_NAME_SEP`
    #[arg(long, env = "REPO_NAME_SEP", default_value_t = String::from(reposum::DEFAULT_SEPARATOR))]
    pub separator: String,

    /// Maximum number of summaries requested at once. `0` submits every
    /// repository count immediately.
    ///
    /// Environment variable: `MAX_IN_FLIGHT`
    #[arg(long, env = "MAX_IN_FLIGHT", default_value_t = 0)]
    pub max_in_flight: usize,

    /// Data source to query.
    ///
    /// Environment variable: `REPO_SOURCE`
    #[arg(long, env = "REPO_SOURCE", value_enum, default_value_t = SourceKind::Gitlab)]
    pub source: SourceKind,

    /// GraphQL endpoint used by the `gitlab` source.
    ///
    /// Environment variable: `GITLAB_API_URL`
    #[arg(long, env = "GITLAB_API_URL", default_value_t = String::from(GITLAB_API_URL))]
    pub api_url: String,

    /// Upper bound of the random latency of the `synthetic` source, in
    /// milliseconds.
    ///
    /// Environment variable: `MAX_DELAY_MS`
    #[arg(long, env = "MAX_DELAY_MS", default_value_t = 200)]
    pub max_delay_ms: u64,
}

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub min_repo_count: usize,
    pub max_repo_count: usize,
    pub max_in_flight: usize,
    pub source: SourceKind,
    pub api_url: String,
    pub max_delay: Duration,
    pub service: ServiceConfig,
    request_count: usize,
}

impl RunConfig {
    /// Number of summaries this run requests.
    pub const fn request_count(&self) -> usize {
        self.request_count
    }
}

impl TryFrom<CliArgs> for RunConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if args.min_repo_count > args.max_repo_count {
            bail!(
                "MIN_REPO_COUNT ({}) must not exceed MAX_REPO_COUNT ({})",
                args.min_repo_count,
                args.max_repo_count
            );
        }

        if args.max_net_conns == 0 {
            bail!("MAX_NET_CONNS must be greater than 0");
        }

        let worker_count = args.worker_count.unwrap_or_else(num_cpus::get);
        if worker_count == 0 {
            bail!("WORKER_COUNT must be greater than 0");
        }

        let service = ServiceConfig::new(args.separator, args.max_net_conns, worker_count)?;
        let Some(request_count) = (args.max_repo_count - args.min_repo_count).checked_add(1) else {
            bail!(
                "Repo count range {}..={} is too large",
                args.min_repo_count,
                args.max_repo_count
            );
        };
        let max_in_flight = match args.max_in_flight {
            0 => request_count,
            n => n,
        };

        Ok(Self {
            min_repo_count: args.min_repo_count,
            max_repo_count: args.max_repo_count,
            max_in_flight,
            source: args.source,
            api_url: args.api_url,
            max_delay: Duration::from_millis(args.max_delay_ms),
            service,
            request_count,
        })
    }
}
