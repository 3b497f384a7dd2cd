use std::sync::Arc;

use clap::{Parser, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ghstore_api::GitHubClient;
use ghstore_core::home::HomeCategory;
use ghstore_core::models::{PaginatedRepos, Platform};
use ghstore_core::providers::GitHubProvider;
use ghstore_core::search::CandidateSource;
use ghstore_core::verify::ReleaseSource;
use ghstore_core::{Config, ProgressiveSearch, ReleaseVerifier};

#[derive(Parser)]
#[command(name = "ghstore")]
#[command(version, about = "GitHub as an app store - find repos that actually ship installers", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Search repositories whose latest release ships an installer
    Search {
        /// Search query (blank searches popular repos)
        #[arg(default_value = "")]
        query: String,

        /// Target platform to verify installers for
        #[arg(long, value_enum, default_value_t = PlatformArg::All)]
        platform: PlatformArg,

        /// Result page (page 1 streams progressively and backfills)
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Browse a home category through the same verification pipeline
    Home {
        /// Category to browse
        #[arg(value_enum)]
        category: CategoryArg,

        #[arg(long, value_enum, default_value_t = PlatformArg::All)]
        platform: PlatformArg,

        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Show repository details, latest release, and README
    Show {
        /// Repository name (owner/repo)
        name: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum PlatformArg {
    All,
    Android,
    Windows,
    Macos,
    Linux,
}

impl From<PlatformArg> for Platform {
    fn from(arg: PlatformArg) -> Self {
        match arg {
            PlatformArg::All => Platform::All,
            PlatformArg::Android => Platform::Android,
            PlatformArg::Windows => Platform::Windows,
            PlatformArg::Macos => Platform::Macos,
            PlatformArg::Linux => Platform::Linux,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum CategoryArg {
    Trending,
    New,
    RecentlyUpdated,
}

impl From<CategoryArg> for HomeCategory {
    fn from(arg: CategoryArg) -> Self {
        match arg {
            CategoryArg::Trending => HomeCategory::Trending,
            CategoryArg::New => HomeCategory::New,
            CategoryArg::RecentlyUpdated => HomeCategory::RecentlyUpdated,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging - helps when things go sideways
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ghstore=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;
    let token = config
        .github
        .token
        .clone()
        .or_else(|| std::env::var("GITHUB_TOKEN").ok());

    match cli.command {
        Commands::Search {
            query,
            platform,
            page,
        } => {
            tracing::info!("searching for: {}", query);
            let engine = build_engine(&config, token);
            run_progressive(engine, Mode::Search(query), platform.into(), page).await?;
        }
        Commands::Home {
            category,
            platform,
            page,
        } => {
            let category: HomeCategory = category.into();
            tracing::info!("browsing category: {}", category.display_name());
            let engine = build_engine(&config, token);
            run_progressive(engine, Mode::Browse(category), platform.into(), page).await?;
        }
        Commands::Show { name } => {
            tracing::info!("showing repository: {}", name);
            show_repository(&config, token, &name).await?;
        }
    }

    Ok(())
}

enum Mode {
    Search(String),
    Browse(HomeCategory),
}

fn build_engine(config: &Config, token: Option<String>) -> Arc<ProgressiveSearch> {
    let client = GitHubClient::with_base_url(token, config.github.api_url.clone());
    let provider = Arc::new(GitHubProvider::from_client(client));
    let source: Arc<dyn CandidateSource> = provider.clone();
    let releases: Arc<dyn ReleaseSource> = provider;
    let verifier = Arc::new(ReleaseVerifier::new(releases, config.cache.capacity));

    Arc::new(ProgressiveSearch::with_tuning(
        source,
        verifier,
        config.search.clone(),
    ))
}

async fn run_progressive(
    engine: Arc<ProgressiveSearch>,
    mode: Mode,
    platform: Platform,
    page: u32,
) -> anyhow::Result<()> {
    let (tx, mut rx) = tokio::sync::mpsc::channel(8);

    let worker = tokio::spawn(async move {
        match mode {
            Mode::Search(query) => engine.search(&query, platform, page, &tx).await,
            Mode::Browse(category) => engine.browse(category, platform, page, &tx).await,
        }
    });

    let mut emission = 0;
    while let Some(snapshot) = rx.recv().await {
        emission += 1;
        print_snapshot(emission, &snapshot);
    }

    worker.await??;
    Ok(())
}

fn print_snapshot(emission: usize, snapshot: &PaginatedRepos) {
    if emission > 1 {
        println!();
    }
    println!(
        "-- results ({} verified, {} total matches, more: {}) --",
        snapshot.repos.len(),
        snapshot.total_count,
        if snapshot.has_more { "yes" } else { "no" }
    );
    for repo in &snapshot.repos {
        let description = repo.description.as_deref().unwrap_or("-");
        println!("  {:>6} ★  {}  {}", repo.stars, repo.full_name, description);
    }
    if snapshot.repos.is_empty() {
        println!("  (no repositories with matching installers)");
    }
}

async fn show_repository(config: &Config, token: Option<String>, name: &str) -> anyhow::Result<()> {
    let (owner, repo) = name
        .split_once('/')
        .ok_or_else(|| anyhow::anyhow!("expected owner/repo, got '{}'", name))?;

    let client = GitHubClient::with_base_url(token, config.github.api_url.clone());

    let details = client.get_repository(owner, repo).await?;
    println!("{} ({} ★)", details.full_name, details.stargazers_count);
    if let Some(description) = &details.description {
        println!("{}", description);
    }
    println!("{}", details.html_url);

    match client.latest_release(owner, repo).await? {
        Some(release) => {
            println!("\nLatest release: {}", release.tag_name);
            for asset in &release.assets {
                println!("  {}", asset.name);
            }
            if let Some(body) = &release.body {
                println!("\n{}", body);
            }
        }
        None => println!("\nNo releases published"),
    }

    if let Ok(readme) = client.get_readme(owner, repo).await {
        println!("\n--- README ---\n{}", readme);
    }

    Ok(())
}
