use crate::config::{Config, load_config};
use crate::ir::{FlowchartGraph, Orientation};
use crate::layout::{layout_with_config, plan_layout};
use crate::layout_dump::write_layout_dump;
use crate::render::{render_svg, write_output};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{debug, info};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "fclayout", version, about = "Hierarchical auto-layout for flowchart graphs")]
pub struct Args {
    /// Input graph (.json), Markdown with ```json blocks (.md), or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file. Defaults to stdout if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "json")]
    pub output_format: OutputFormat,

    /// Layout orientation; anything other than 'horizontal' lays out top to bottom
    #[arg(long = "orientation", default_value = "horizontal")]
    pub orientation: String,

    /// Config JSON file (spacing, theme and render overrides)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Write a JSON dump of levels and positions to this path
    #[arg(long = "dumpLayout")]
    pub dump_layout: Option<PathBuf>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long = "log-level", default_value = "warn")]
    pub log_level: String,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Svg,
}

impl OutputFormat {
    fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Svg => "svg",
        }
    }
}

pub fn run(args: &Args) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let orientation = Orientation::from_token(&args.orientation);

    let (input, is_markdown) = read_input(args.input.as_deref())?;
    let sources = if is_markdown {
        extract_graph_blocks(&input)
    } else {
        vec![input]
    };

    if sources.is_empty() {
        return Err(anyhow::anyhow!("No flowchart graphs found in input"));
    }
    info!(graphs = sources.len(), orientation:?; "laying out input");

    if sources.len() == 1 {
        let output = process_graph(&sources[0], orientation, &config, args.output_format)?;
        write_output(&output, args.output.as_deref())?;
        if let Some(path) = args.dump_layout.as_deref() {
            write_dump(&sources[0], orientation, &config, path)?;
        }
        return Ok(());
    }

    // Multiple graphs (Markdown input)
    let ext = args.output_format.extension();
    let outputs = resolve_multi_outputs(args.output.as_deref(), ext, sources.len())?;
    let dumps = match args.dump_layout.as_deref() {
        Some(base) => Some(resolve_multi_outputs(Some(base), "json", sources.len())?),
        None => None,
    };
    for (idx, source) in sources.iter().enumerate() {
        let output = process_graph(source, orientation, &config, args.output_format)
            .with_context(|| format!("graph block {}", idx + 1))?;
        write_output(&output, Some(&outputs[idx]))?;
        if let Some(dumps) = &dumps {
            write_dump(source, orientation, &config, &dumps[idx])?;
        }
    }

    Ok(())
}

fn parse_graph(source: &str) -> Result<FlowchartGraph> {
    let graph: FlowchartGraph = serde_json::from_str(source).context("invalid flowchart graph")?;
    debug!(nodes = graph.nodes.len(), edges = graph.edges.len(); "parsed graph");
    Ok(graph)
}

fn process_graph(
    source: &str,
    orientation: Orientation,
    config: &Config,
    format: OutputFormat,
) -> Result<String> {
    let graph = layout_with_config(parse_graph(source)?, orientation, &config.layout);
    Ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(&graph)?,
        OutputFormat::Svg => render_svg(&graph, orientation, &config.theme, &config.render),
    })
}

fn write_dump(source: &str, orientation: Orientation, config: &Config, path: &Path) -> Result<()> {
    let graph = parse_graph(source)?;
    let plan = plan_layout(&graph, orientation, &config.layout);
    write_layout_dump(path, &plan, &graph)
}

fn read_input(path: Option<&Path>) -> Result<(String, bool)> {
    match path.filter(|path| *path != Path::new("-")) {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            let markdown = matches!(
                path.extension().and_then(|ext| ext.to_str()),
                Some("md" | "markdown")
            );
            Ok((content, markdown))
        }
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf).context("reading stdin")?;
            Ok((buf, false))
        }
    }
}

/// Bodies of every ```json / ```flowchart block (or the `~~~` forms), in
/// document order. An unterminated block at the end is dropped.
fn extract_graph_blocks(input: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut open: Option<(&str, Vec<&str>)> = None;

    for line in input.lines() {
        let trimmed = line.trim();
        let Some((fence, mut body)) = open.take() else {
            open = opening_fence(trimmed).map(|fence| (fence, Vec::new()));
            continue;
        };
        let closes = trimmed
            .strip_prefix(fence)
            .is_some_and(|rest| rest.trim().is_empty());
        if closes {
            blocks.push(body.join("\n"));
        } else {
            body.push(line);
            open = Some((fence, body));
        }
    }

    blocks
}

fn opening_fence(line: &str) -> Option<&'static str> {
    ["```", "~~~"].into_iter().find(|fence| {
        line.strip_prefix(fence).is_some_and(|rest| {
            let tag = rest.trim_start_matches(&fence[..1]).trim();
            tag.starts_with("json") || tag.starts_with("flowchart")
        })
    })
}

/// `<dir>/diagram-N.<ext>` when `output` is a directory, otherwise
/// `<stem>-N.<ext>` next to it.
fn resolve_multi_outputs(output: Option<&Path>, ext: &str, count: usize) -> Result<Vec<PathBuf>> {
    let base = output.context("an output path is required when the input holds several graphs")?;
    let (dir, stem) = if base.is_dir() {
        (base, "diagram")
    } else {
        let stem = base.file_stem().and_then(|stem| stem.to_str()).unwrap_or("diagram");
        (base.parent().unwrap_or_else(|| Path::new(".")), stem)
    };
    Ok((1..=count)
        .map(|n| dir.join(format!("{stem}-{n}.{ext}")))
        .collect())
}
