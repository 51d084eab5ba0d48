use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use conan_check_updates::checker::{UpdateStatus, check_updates};
use conan_check_updates::conan::Conan;
use conan_check_updates::version::VersionPart;

#[derive(Parser)]
#[command(name = "conan-check-updates")]
#[command(version, about = "Check Conan dependencies for newer versions")]
struct Cli {
    /// Only check packages matching these name patterns (`*` wildcards)
    #[arg(value_name = "FILTER")]
    filters: Vec<String>,

    /// Conanfile or directory containing one
    #[arg(long, default_value = ".")]
    cwd: PathBuf,

    /// Limit update level
    #[arg(long, value_enum, default_value_t = Target::Major)]
    target: Target,

    /// Also list up-to-date and not-found requirements
    #[arg(long)]
    all: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Target {
    Major,
    Minor,
    Patch,
}

impl From<Target> for VersionPart {
    fn from(target: Target) -> Self {
        match target {
            Target::Major => VersionPart::Major,
            Target::Minor => VersionPart::Minor,
            Target::Patch => VersionPart::Patch,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(cli))
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let conan = Conan::new();
    let results = check_updates(&conan, &cli.cwd, cli.target.into(), &cli.filters).await?;

    let width = results
        .iter()
        .map(|result| result.reference.to_string().len())
        .max()
        .unwrap_or(0);
    for result in &results {
        let name = result.reference.to_string();
        match (result.status, result.update()) {
            (UpdateStatus::Outdated, Some(latest)) => {
                println!("{name:width$}  \u{2192} {latest}");
            }
            (UpdateStatus::UpToDate, _) if cli.all => {
                println!("{name:width$}  up to date");
            }
            (UpdateStatus::NotFound, _) if cli.all => {
                println!("{name:width$}  not found in remotes");
            }
            _ => {}
        }
    }

    Ok(())
}
