#![deny(clippy::mod_module_files)]
use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

mod config;
mod dot;
mod error;
mod graph;
mod object;
mod present;
mod repository;
mod store;

use config::{Backend, GraphConfig};
use graph::Graph;
use object::ObjectId;
use repository::Repository;
use store::{GitCli, LooseObjects, ObjectAccessor};

/// Render the object database of a git repository as a Graphviz DOT graph
#[derive(Parser)]
#[command(name = "git-object-graph", version, about, long_about = None)]
struct Cli {
    /// Path of the repository (work tree root or bare repository)
    repo: PathBuf,

    /// Output path of the DOT file, `-` for stdout [default: ~/git.dot]
    #[arg(short = 'o', long = "out", value_name = "FILE")]
    out: Option<PathBuf>,

    /// How objects are read from the store
    #[arg(long, value_enum)]
    backend: Option<Backend>,

    /// Print every collected object to stdout
    #[arg(long)]
    print_objects: bool,

    /// Log progress to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = GraphConfig::load()?;
    if let Some(out) = cli.out {
        config.output = out;
    }
    if let Some(backend) = cli.backend {
        config.backend = backend;
    }
    config.print_objects |= cli.print_objects;

    analyze(&cli.repo, &config)
}

/// Collect, link and render every object of the repository at `repo`.
fn analyze(repo: &Path, config: &GraphConfig) -> Result<()> {
    let git_dir = store::git_dir_for(repo);
    if !git_dir.join("objects").is_dir() {
        anyhow::bail!("Not a git repository: {}", repo.display());
    }
    tracing::info!("analyzing {} with the {:?} backend", git_dir.display(), config.backend);

    let graph = match config.backend {
        Backend::Git => build_graph(&GitCli::new(&config.git_binary, &git_dir), &git_dir)?,
        Backend::Loose => build_graph(&LooseObjects::new(&git_dir), &git_dir)?,
    };

    if config.print_objects {
        present::print_all(&graph);
    }

    if config.output == Path::new("-") {
        let mut stdout = io::stdout().lock();
        dot::write_dot(&graph, &mut stdout).context("Failed to write graph to stdout")?;
        stdout.flush()?;
    } else {
        dot::write_dot_file(&graph, &config.output)?;
    }

    Ok(())
}

fn build_graph(accessor: &impl ObjectAccessor, git_dir: &Path) -> Result<Graph> {
    let tags = store::list_tag_anchors(git_dir).context("Failed to read tag references")?;
    let heads = store::group_head_labels(
        &store::list_head_anchors(git_dir).context("Failed to read branch references")?,
    );
    let head_hashes: Vec<ObjectId> = heads.iter().map(|(hash, _)| hash.clone()).collect();

    let mut repository = Repository::with_head_labels(heads);
    repository
        .collect_from_anchors(accessor, &tags, &head_hashes)
        .context("Failed to collect objects reachable from tags and branches")?;

    let loose = store::walk_loose_objects(&git_dir.join("objects"))
        .context("Failed to enumerate loose objects")?;
    repository
        .collect_from_loose_objects(accessor, &loose)
        .context("Failed to collect loose objects")?;

    Ok(Graph::build(repository.into_entities()))
}
