use aco_tsp::tsp::{load_tour, load_vertices, save_convergence, save_tour};
use aco_tsp::utils::{pretty_matrix, ToDisplayPath};
use aco_tsp::{AntProps, AntSystem, Graph};
use anyhow::{ensure, Context, Error};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use prettytable::format::consts::FORMAT_BOX_CHARS;
use prettytable::{cell, row, table};
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Instant;
use std::{fs::File, io::BufWriter, io::Write};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "aco-tsp")]
#[command(about = "Approximate euclidean TSP tours with an ant colony")]
#[command(version)]
struct Cli {
    /// Path to the input file
    #[arg(short = 'p', long = "path", default_value = "./data/a280.tsp")]
    path: PathBuf,

    /// Colony size
    #[arg(long = "cs", default_value_t = 50)]
    colony_size: usize,

    /// Number of iterations
    #[arg(long = "it", default_value_t = 100)]
    iterations: usize,

    /// Pheromone weight
    #[arg(short = 'a', default_value_t = 1.0)]
    a: f64,

    /// Visibility weight
    #[arg(short = 'b', default_value_t = 3.0)]
    b: f64,

    /// Evaporation rate
    #[arg(long = "er", default_value_t = 0.2)]
    evaporation_rate: f64,

    /// Random seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Run report
    #[arg(long, default_value = "aco-tsp.out")]
    out: PathBuf,

    /// Best tour, one vertex index per line
    #[arg(long, default_value = "solution.csv")]
    solution: PathBuf,

    /// Best distance after each iteration, as CSV
    #[arg(long)]
    convergence: Option<PathBuf>,

    /// Known tour to compare the result against, one or more indices per line
    #[arg(long)]
    reference: Option<PathBuf>,

    /// Print the pheromone matrix into the report after each iteration
    #[arg(long)]
    dump_pheromones: bool,
}

impl Cli {
    fn props(&self) -> AntProps {
        AntProps {
            colony_size: self.colony_size,
            a: self.a,
            b: self.b,
            evaporation_rate: self.evaporation_rate,
            iterations: self.iterations,
            seed: self.seed,
        }
    }
}

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("aco_tsp=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let props = cli.props();

    info!(path = %cli.path.display(), "reading data and building graph");
    let vertices = load_vertices(&cli.path)
        .with_context(|| format!("failed to read {}", cli.path.display()))?;
    let graph = Graph::new(vertices)?;
    info!(vertices = graph.len(), "graph ready");

    let seed = props
        .seed
        .map_or_else(|| "entropy".to_string(), |s| s.to_string());
    let mut table = table! {
        ["Vertices", graph.len()],
        ["Colony size", props.colony_size],
        ["Iterations", props.iterations],
        ["a (pheromone)", props.a],
        ["b (distance)", props.b],
        ["Evaporation rate", props.evaporation_rate],
        ["Seed", seed]
    };
    table.set_format(*FORMAT_BOX_CHARS);

    let mut out = BufWriter::new(
        File::create(&cli.out).with_context(|| format!("failed to create {}", cli.out.display()))?,
    );
    writeln!(out, "Parameters")?;
    writeln!(out, "{}\n", table)?;

    let mut system = AntSystem::new(graph, &props)?;

    let progress = ProgressBar::new(props.iterations as u64);
    progress.set_style(ProgressStyle::default_bar().template("{bar:40} {pos}/{len} {msg}"));

    let start = Instant::now();
    while let Some(snapshot) = system.step() {
        if snapshot.improved {
            save_tour(&cli.solution, &snapshot.best_tour)
                .with_context(|| format!("failed to write {}", cli.solution.display()))?;
        }

        writeln!(
            out,
            "Iteration {}: best distance {:.2}, path {}",
            snapshot.round,
            snapshot.best_distance,
            snapshot.best_tour.to_display_path()
        )?;
        if cli.dump_pheromones {
            writeln!(
                out,
                "Pheromones:\n{}",
                pretty_matrix(system.graph().pheromones(), 6)
            )?;
        }

        progress.set_message(&format!("best_dist={:.2}", snapshot.best_distance));
        progress.inc(1);
    }
    progress.finish_with_message("done");
    let elapsed = start.elapsed();

    let solution = system.solution();
    let unique: HashSet<_> = solution.tour.iter().collect();
    ensure!(
        unique.len() == solution.tour.len(),
        "best tour visits a vertex twice"
    );

    writeln!(
        out,
        "\nGlobal best: {} with distance {}",
        solution.tour.to_display_path(),
        solution.distance
    )?;
    out.flush()?;

    if let Some(path) = &cli.convergence {
        save_convergence(path, &solution.history)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }

    println!("Elapsed time: {:.2}", elapsed.as_secs_f64());
    println!("Best distance by ACO : {:.2}", solution.distance);

    if let Some(path) = &cli.reference {
        let tour = load_tour(path).with_context(|| format!("failed to read {}", path.display()))?;
        let positions = system.graph().positions_of(&tour)?;
        let distance = system.tour_distance(&positions);
        println!("Best distance : {:.2}", distance);
        println!(
            "Gap : {:.2}%",
            (solution.distance - distance) / distance * 100.0
        );
    }

    Ok(())
}
