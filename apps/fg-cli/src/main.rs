use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use fg_document::{DocumentResult, Format, GraphDocument};
use fg_graph::{EventLog, Graph, GraphEvent};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fg")]
#[command(about = "FlowGraph CLI - inspect, convert and merge FBP graph documents", long_about = None)]
struct Cli {
    /// Treat port names as case-sensitive regardless of the document flag
    #[arg(long, global = true)]
    case_sensitive: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a graph and report entries it rejected
    Validate {
        /// Path to the graph document (.json, .yaml or .yml)
        path: PathBuf,
    },
    /// Print a summary of a graph
    Show {
        /// Path to the graph document
        path: PathBuf,
    },
    /// Render a graph as Graphviz DOT
    Dot {
        /// Path to the graph document
        path: PathBuf,
    },
    /// Render a graph as a yUML activity diagram
    Yuml {
        /// Path to the graph document
        path: PathBuf,
    },
    /// Re-encode a graph in canonical form
    Normalize {
        /// Path to the graph document
        path: PathBuf,
        /// Output file (format chosen by extension); defaults to stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Indent JSON written to stdout
        #[arg(long)]
        pretty: bool,
    },
    /// Print the event stream produced by loading a graph
    Events {
        /// Path to the graph document
        path: PathBuf,
        /// Print wire event names instead of journal lines
        #[arg(long)]
        names: bool,
    },
    /// Rebuild BASE to mirror THEIRS and print the resulting events
    Merge {
        /// Graph to overwrite
        base: PathBuf,
        /// Graph whose content wins
        theirs: PathBuf,
        /// Write the merged graph here (format chosen by extension)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Report whether two graphs are structurally equivalent
    Diff {
        a: PathBuf,
        b: PathBuf,
    },
}

fn main() -> DocumentResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cs = cli.case_sensitive;

    match cli.command {
        Commands::Validate { path } => cmd_validate(&path, cs),
        Commands::Show { path } => cmd_show(&path, cs),
        Commands::Dot { path } => {
            println!("{}", fg_document::to_dot(&load(&path, cs)?));
            Ok(())
        }
        Commands::Yuml { path } => {
            println!("{}", fg_document::to_yuml(&load(&path, cs)?));
            Ok(())
        }
        Commands::Normalize {
            path,
            output,
            pretty,
        } => cmd_normalize(&path, output.as_deref(), pretty, cs),
        Commands::Events { path, names } => cmd_events(&path, names, cs),
        Commands::Merge {
            base,
            theirs,
            output,
        } => cmd_merge(&base, &theirs, output.as_deref(), cs),
        Commands::Diff { a, b } => cmd_diff(&a, &b, cs),
    }
}

fn read(path: &Path, case_sensitive: bool) -> DocumentResult<GraphDocument> {
    let mut doc = fg_document::read_document(path)?;
    doc.case_sensitive |= case_sensitive;
    Ok(doc)
}

fn load(path: &Path, case_sensitive: bool) -> DocumentResult<Graph> {
    fg_document::decode(&read(path, case_sensitive)?)
}

fn write(path: &Path, graph: &Graph) -> DocumentResult<PathBuf> {
    match Format::from_path(path) {
        Ok(Format::Yaml) => {
            fg_document::save_yaml(path, graph)?;
            Ok(path.to_path_buf())
        }
        Ok(Format::Json) | Err(_) => fg_document::save_json(path, graph),
    }
}

fn cmd_validate(path: &Path, cs: bool) -> DocumentResult<()> {
    println!("Validating graph: {}", path.display());
    let doc = read(path, cs)?;
    let graph = fg_document::decode(&doc)?;

    let dropped = [
        ("processes", doc.processes.len(), graph.nodes().len()),
        (
            "connections",
            doc.connections.len(),
            graph.edges().len() + graph.initializers().len(),
        ),
        ("inports", doc.inports.len(), graph.inports().len()),
        ("outports", doc.outports.len(), graph.outports().len()),
    ];

    let mut clean = true;
    for (what, declared, kept) in dropped {
        if kept < declared {
            clean = false;
            println!("  {} of {} {} rejected", declared - kept, declared, what);
        }
    }
    if clean {
        println!("✓ Graph is valid");
    }
    Ok(())
}

fn cmd_show(path: &Path, cs: bool) -> DocumentResult<()> {
    let graph = load(path, cs)?;
    let name = if graph.name().is_empty() {
        "(unnamed)"
    } else {
        graph.name()
    };
    println!("Graph: {}", name);
    println!(
        "  Port names: {}",
        if graph.case_sensitive() {
            "case-sensitive"
        } else {
            "case-insensitive"
        }
    );
    for (key, value) in graph.properties() {
        println!("  {} = {}", key, value);
    }

    println!("  Nodes: {}", graph.nodes().len());
    for node in graph.nodes() {
        println!("    {} ({})", node.id, node.component);
    }
    println!("  Edges: {}", graph.edges().len());
    println!("  Initializers: {}", graph.initializers().len());
    for (label, ports) in [("Inports", graph.inports()), ("Outports", graph.outports())] {
        println!("  {}: {}", label, ports.len());
        for (name, port) in ports {
            println!("    {} -> {}.{}", name, port.process, port.port);
        }
    }
    println!("  Groups: {}", graph.groups().len());
    for group in graph.groups() {
        println!("    {} [{}]", group.name, group.nodes.join(", "));
    }
    Ok(())
}

fn cmd_normalize(path: &Path, output: Option<&Path>, pretty: bool, cs: bool) -> DocumentResult<()> {
    let graph = load(path, cs)?;
    match output {
        Some(output) => {
            let written = write(output, &graph)?;
            info!(path = %written.display(), "normalized graph written");
            println!("✓ Wrote {}", written.display());
        }
        None if pretty => println!("{}", fg_document::to_json_pretty(&graph)?),
        None => println!("{}", fg_document::to_json(&graph)?),
    }
    Ok(())
}

fn print_events(events: &[GraphEvent], names: bool) {
    for event in events {
        if names {
            println!("{}", event.name());
        } else {
            println!("{}", event);
        }
    }
}

fn cmd_events(path: &Path, names: bool, cs: bool) -> DocumentResult<()> {
    let doc = read(path, cs)?;
    let mut graph = Graph::with_options(fg_document::graph_options(&doc));
    let log = EventLog::attach(&mut graph);
    fg_document::replay(&doc, &mut graph, None)?;
    print_events(&log.events(), names);
    Ok(())
}

fn cmd_merge(base: &Path, theirs: &Path, output: Option<&Path>, cs: bool) -> DocumentResult<()> {
    let mut graph = load(base, cs)?;
    let theirs = load(theirs, cs)?;

    let log = EventLog::attach(&mut graph);
    graph.start_transaction("merge", None)?;
    fg_graph::merge_resolve_theirs(&mut graph, &theirs);
    graph.end_transaction(None)?;
    print_events(&log.events(), false);

    if let Some(output) = output {
        let written = write(output, &graph)?;
        println!("✓ Wrote {}", written.display());
    }
    Ok(())
}

fn cmd_diff(a: &Path, b: &Path, cs: bool) -> DocumentResult<()> {
    let a_graph = load(a, cs)?;
    let b_graph = load(b, cs)?;
    if fg_document::equivalent(&a_graph, &b_graph) {
        println!("✓ {} and {} are equivalent", a.display(), b.display());
        Ok(())
    } else {
        println!("✗ {} and {} differ", a.display(), b.display());
        std::process::exit(1);
    }
}
