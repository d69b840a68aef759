use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use jsonflow_app::{FlowController, FlowSettings};
use jsonflow_core::{EdgeStyle, Graph};
use jsonflow_graph::GraphModel;
use jsonflow_search::SearchHighlightState;
use serde::Serialize;
use std::io::Read;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Node/edge counts and the node list
    Summary,
    /// The full graph (and highlights, if searching) as JSON
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum EdgeStyleArg {
    Default,
    CustomStepped,
}

impl From<EdgeStyleArg> for EdgeStyle {
    fn from(arg: EdgeStyleArg) -> Self {
        match arg {
            EdgeStyleArg::Default => EdgeStyle::Default,
            EdgeStyleArg::CustomStepped => EdgeStyle::CustomStepped,
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Compile a JSON document into a node/edge graph", long_about = None)]
struct Args {
    /// JSON file to read; `-` reads stdin
    #[arg(default_value = "-")]
    input: PathBuf,

    /// Highlight nodes and properties containing this text
    #[arg(short, long)]
    search: Option<String>,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Summary)]
    format: OutputFormat,

    /// Overrides the edge style from the settings file
    #[arg(long, value_enum)]
    edge_style: Option<EdgeStyleArg>,

    /// Overrides the input size limit from the settings file
    #[arg(long)]
    max_bytes: Option<usize>,
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    graph: &'a Graph,
    #[serde(skip_serializing_if = "Option::is_none")]
    highlight: Option<&'a SearchHighlightState>,
}

fn read_input(input: &PathBuf) -> Result<String> {
    if input.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read stdin")?;
        Ok(text)
    } else {
        std::fs::read_to_string(input).with_context(|| format!("Failed to read {:?}", input))
    }
}

fn print_summary(graph: &Graph, highlight: Option<&SearchHighlightState>) {
    let stats = GraphModel::new(graph).stats();
    println!(
        "{} nodes, {} edges, {} properties, max depth {}",
        stats.node_count, stats.edge_count, stats.property_count, stats.max_depth
    );
    for node in graph.nodes() {
        let marker = match highlight {
            Some(h) if h.node_matches(node.id.as_str()) => "*",
            _ => " ",
        };
        println!(
            "{marker} {:<40} {:<7} {:>3} props {:>3} children  {}x{}",
            node.id.as_str(),
            node.value_kind.to_string(),
            node.properties.len(),
            node.child_container_refs.len(),
            node.estimated_width,
            node.estimated_height
        );
    }
    if let Some(h) = highlight {
        println!("{} matching nodes for {:?}", h.match_count(), h.query());
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let mut settings = FlowSettings::load();
    if let Some(style) = args.edge_style {
        settings.edge_style = style.into();
    }
    if let Some(max_bytes) = args.max_bytes {
        settings.max_input_bytes = max_bytes;
    }

    let text = read_input(&args.input)?;
    tracing::debug!("Read {} bytes from {:?}", text.len(), args.input);
    let controller = FlowController::new(settings);
    let graph = controller
        .set_text(&text)
        .with_context(|| format!("Could not build a graph from {:?}", args.input))?;

    let highlight = args.search.as_deref().map(|q| controller.set_query(q));

    match args.format {
        OutputFormat::Summary => print_summary(&graph, highlight.as_deref()),
        OutputFormat::Json => {
            let output = JsonOutput {
                graph: &graph,
                highlight: highlight.as_deref(),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
