//! Binary entry point for the Poda pipeline CLI.
#![forbid(unsafe_code)]

#[path = "cli/config.rs"]
mod config;
#[path = "cli/ui.rs"]
mod ui;

use std::error::Error;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use poda::cli::import_export::{
    annotate_marked, export_edges, export_nodes, load_graph, load_marked_ids, read_jsonl,
    write_jsonl, CliError, EdgeImportConfig, ImportConfig, NodeImportConfig,
};
use poda::{DataGenerator, DropMode, JobConfig, Pipeline, VertexRecord};
use tracing_subscriber::EnvFilter;

use config::{CliConfig, JobDefaults};
use ui::Ui;

#[derive(Parser, Debug)]
#[command(
    name = "poda",
    version,
    about = "Partition-parallel deletion commit for property graphs",
    disable_help_subcommand = true
)]
struct Cli {
    #[arg(long, global = true, help = "Path to the CLI config file")]
    config: Option<PathBuf>,

    #[arg(long, global = true, help = "Configuration profile to apply")]
    profile: Option<String>,

    #[arg(long, global = true, help = "Suppress progress output")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the deletion-commit pipeline over a graph.
    Run(RunArgs),
    /// Generate a seeded random annotated graph.
    Generate(GenerateArgs),
}

#[derive(Args, Debug)]
struct RunArgs {
    #[arg(long, help = "JSONL vertex input (alternative to --nodes/--edges)")]
    input: Option<PathBuf>,

    #[arg(long, help = "Nodes CSV input")]
    nodes: Option<PathBuf>,

    #[arg(long, help = "Edges CSV input")]
    edges: Option<PathBuf>,

    #[arg(long, default_value = "id", help = "Nodes CSV id column")]
    node_id_column: String,

    #[arg(long, help = "Nodes CSV column holding the path-annotation count")]
    path_count_column: Option<String>,

    #[arg(long, default_value = "src", help = "Edges CSV source column")]
    edge_src_column: String,

    #[arg(long, default_value = "dst", help = "Edges CSV destination column")]
    edge_dst_column: String,

    #[arg(long, help = "Edges CSV label column")]
    edge_label_column: Option<String>,

    #[arg(long, help = "Static label for all edges")]
    edge_label: Option<String>,

    #[arg(long, help = "File of vertex ids to mark, one per line")]
    marked: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = ModeArg::Drop, help = "Deletion mode")]
    mode: ModeArg,

    #[arg(long, help = "Retain tombstones for dropped vertices")]
    track_state: bool,

    #[arg(long, help = "Number of worker partitions")]
    partitions: Option<usize>,

    #[arg(long, help = "Disable the pre-shuffle partial merger")]
    no_combine: bool,

    #[arg(long, help = "JSONL output for committed vertices")]
    output: Option<PathBuf>,

    #[arg(long, help = "CSV output for committed vertices")]
    nodes_out: Option<PathBuf>,

    #[arg(long, help = "CSV output for surviving edges")]
    edges_out: Option<PathBuf>,

    #[arg(
        long,
        value_delimiter = ',',
        help = "Property columns to include in CSV exports"
    )]
    export_props: Vec<String>,

    #[arg(long, help = "Print the counter report")]
    stats: bool,
}

#[derive(Args, Debug)]
struct GenerateArgs {
    #[arg(long, default_value_t = 1_000, help = "Number of vertices")]
    vertices: usize,

    #[arg(long, default_value_t = 4, help = "Average outgoing degree")]
    avg_degree: usize,

    #[arg(long, default_value_t = 0.2, help = "Fraction of vertices to annotate")]
    annotate: f64,

    #[arg(long, default_value_t = 42, env = "PODA_SEED", help = "Generator seed")]
    seed: u64,

    #[arg(long, help = "JSONL output path")]
    output: PathBuf,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum ModeArg {
    /// Drop vertices that carry path annotations.
    Drop,
    /// Drop vertices without path annotations.
    Keep,
}

impl From<ModeArg> for DropMode {
    fn from(value: ModeArg) -> Self {
        match value {
            ModeArg::Drop => DropMode::Drop,
            ModeArg::Keep => DropMode::Keep,
        }
    }
}

fn main() {
    init_tracing();
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init();
}

fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let config = CliConfig::load(cli.config.clone())?;
    let defaults = config.defaults(cli.profile.as_deref())?;
    let ui = Ui::new(cli.quiet);

    match cli.command {
        Command::Run(args) => run_job(args, &defaults, &ui),
        Command::Generate(args) => generate(args, &ui),
    }
}

fn run_job(args: RunArgs, defaults: &JobDefaults, ui: &Ui) -> Result<(), Box<dyn Error>> {
    let mut vertices = load_input(&args, ui)?;

    if let Some(marked_path) = &args.marked {
        let ids = load_marked_ids(marked_path)?;
        let marked = annotate_marked(&mut vertices, &ids);
        ui.note(&format!("marked {marked} of {} vertices", vertices.len()));
    }

    let job = JobConfig {
        drop_mode: args.mode.into(),
        track_state: args.track_state || defaults.track_state.unwrap_or(false),
        partitions: args
            .partitions
            .or(defaults.partitions)
            .unwrap_or_else(|| JobConfig::default().partitions),
        combine: !args.no_combine && defaults.combine.unwrap_or(true),
    };

    let spinner = ui.spinner("committing pending deletions");
    let pipeline = Pipeline::new(job);
    let output = pipeline.run(vertices)?;
    ui.finish(
        spinner,
        format!("committed {} vertices", output.vertices.len()),
    );

    if let Some(path) = &args.output {
        let written = write_jsonl(path, &output.vertices)?;
        ui.note(&format!("wrote {written} vertices to {}", path.display()));
    }
    if let Some(path) = &args.nodes_out {
        let exported = export_nodes(path, &output.vertices, &args.export_props)?;
        ui.note(&format!("exported {exported} vertices to {}", path.display()));
    }
    if let Some(path) = &args.edges_out {
        let exported = export_edges(path, &output.vertices, &args.export_props)?;
        ui.note(&format!("exported {exported} edges to {}", path.display()));
    }
    if args.stats {
        output.counters.print_report();
    }
    Ok(())
}

fn load_input(args: &RunArgs, ui: &Ui) -> Result<Vec<VertexRecord>, CliError> {
    match (&args.input, &args.nodes) {
        (Some(_), Some(_)) => Err("use either --input or --nodes, not both".into()),
        (Some(path), None) => {
            let vertices = read_jsonl(path)?;
            ui.note(&format!(
                "loaded {} vertices from {}",
                vertices.len(),
                path.display()
            ));
            Ok(vertices)
        }
        (None, Some(nodes)) => {
            let cfg = ImportConfig {
                nodes: NodeImportConfig {
                    path: nodes.clone(),
                    id_column: args.node_id_column.clone(),
                    path_count_column: args.path_count_column.clone(),
                    prop_columns: None,
                },
                edges: args.edges.as_ref().map(|path| EdgeImportConfig {
                    path: path.clone(),
                    src_column: args.edge_src_column.clone(),
                    dst_column: args.edge_dst_column.clone(),
                    label_column: args.edge_label_column.clone(),
                    static_label: args.edge_label.clone(),
                    prop_columns: None,
                }),
            };
            let (vertices, summary) = load_graph(&cfg)?;
            ui.note(&format!(
                "loaded {} vertices and {} edges",
                summary.vertices_loaded, summary.edges_loaded
            ));
            Ok(vertices)
        }
        (None, None) => Err("an input is required (--input or --nodes)".into()),
    }
}

fn generate(args: GenerateArgs, ui: &Ui) -> Result<(), Box<dyn Error>> {
    let mut generator = DataGenerator::new(args.seed);
    let mut vertices = generator.generate_social_network(args.vertices, args.avg_degree);
    let marked = generator.annotate_fraction(&mut vertices, args.annotate);
    let written = write_jsonl(&args.output, &vertices)?;
    ui.note(&format!(
        "generated {written} vertices ({marked} annotated) at {}",
        args.output.display()
    ));
    Ok(())
}
