use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::info;

use bmssp::{dijkstra, Graph, Solver};

#[derive(Parser, Debug)]
#[command(name = "bmssp")]
#[command(about = "Run BMSSP (or a reference Dijkstra) from vertex 0 on a graph.", long_about = None)]
struct Cli {
    /// Path to a graph file in `n m` header / `from to weight` line format.
    /// With `--generate`, this is where the generated graph is written.
    #[arg(short, long)]
    graph: Option<String>,

    /// Generate a random graph instead of loading one.
    #[arg(long)]
    generate: bool,

    /// RNG seed for --generate; 0 draws from OS entropy.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Vertex count for --generate.
    #[arg(long, default_value_t = 1_000)]
    nodes: usize,

    /// Edge count for --generate.
    #[arg(long, default_value_t = 3_000)]
    edges: usize,

    /// Minimum edge weight for --generate.
    #[arg(long, default_value_t = 1.0)]
    min_len: f64,

    /// Maximum edge weight for --generate.
    #[arg(long, default_value_t = 10.0)]
    max_len: f64,

    #[arg(long, value_enum, default_value_t = Algorithm::Bmssp)]
    algorithm: Algorithm,

    /// Apply the degree-normalization transform before solving.
    #[arg(long, default_value_t = false)]
    normalize: bool,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Algorithm {
    Bmssp,
    Dijkstra,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let graph = if cli.generate {
        let graph = Graph::generate_random(cli.seed, cli.nodes, cli.edges, cli.min_len, cli.max_len)
            .context("generating random graph")?;
        let path = cli.graph.clone().unwrap_or_else(|| {
            std::env::temp_dir()
                .join("bmssp-generated.txt")
                .to_string_lossy()
                .into_owned()
        });
        graph
            .save(&path)
            .with_context(|| format!("writing generated graph to {path}"))?;
        info!("wrote generated graph to {path}");
        graph
    } else {
        let path = cli
            .graph
            .as_ref()
            .context("one of --graph or --generate is required")?;
        Graph::load(path).with_context(|| format!("loading graph from {path}"))?
    };

    let n = graph.num_vertices();

    let distances = if cli.normalize {
        let expanded = graph.to_constant_out_degree();
        let expanded_distances = run(&expanded, cli.algorithm)?;
        expanded_distances[..n].to_vec()
    } else {
        run(&graph, cli.algorithm)?
    };

    for (v, d) in distances.iter().enumerate() {
        println!("d[{v}] = {d}");
    }

    Ok(())
}

fn run(graph: &Graph, algorithm: Algorithm) -> Result<Vec<f64>> {
    match algorithm {
        Algorithm::Bmssp => {
            let mut solver = Solver::new(graph);
            solver.solve().context("running BMSSP")?;
            Ok(solver.distances())
        }
        Algorithm::Dijkstra => Ok(dijkstra::dijkstra_all(graph, 0)),
    }
}
