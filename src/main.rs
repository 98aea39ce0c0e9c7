//! sankey-studio CLI entry point.
//!
//! Parses flow DSL from a file or stdin and emits the requested artifact:
//! the scene JSON (default), the document JSON, CSV, round-tripped DSL, or
//! a flow balance report.

use std::fs;
use std::io::{self, Read, Write};
use std::process;

use clap::Parser;

use sankey_studio::config::DiagramConfig;
use sankey_studio::graph::FlowIR;
use sankey_studio::parsers;
use sankey_studio::serialize::{Document, export_json, from_csv, to_csv, to_dsl};
use sankey_studio::{overrides::OverrideStore, render_scene};

/// Flow DSL to Sankey diagram model.
#[derive(Parser, Debug)]
#[command(
    name = "sankey-studio",
    version = env!("SANKEY_STUDIO_VERSION"),
    about = "Flow DSL to Sankey diagram model"
)]
struct Cli {
    /// Input file (reads from stdin if not provided)
    input: Option<String>,

    /// Treat the input as CSV rows instead of flow DSL
    #[arg(long = "from-csv")]
    from_csv: bool,

    /// Emit the full document schema instead of the rendered scene
    #[arg(long = "document")]
    document: bool,

    /// Emit CSV rows
    #[arg(long = "csv")]
    csv: bool,

    /// Emit round-tripped flow DSL
    #[arg(long = "roundtrip")]
    roundtrip: bool,

    /// Report interior nodes whose inflow and outflow disagree
    #[arg(long = "check")]
    check: bool,

    /// Diagram width in pixels
    #[arg(long = "width", default_value = "960")]
    width: f64,

    /// Diagram height in pixels
    #[arg(long = "height", default_value = "540")]
    height: f64,

    /// Node rectangle thickness in pixels
    #[arg(long = "node-width", default_value = "24")]
    node_width: f64,

    /// Vertical gap between stacked nodes in pixels
    #[arg(short = 'p', long = "padding", default_value = "12")]
    padding: f64,

    /// Write output to this file instead of stdout
    #[arg(short = 'o', long = "output")]
    output: Option<String>,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let text = if let Some(ref path) = cli.input {
        match fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("error: cannot read '{}': {}", path, e);
                process::exit(1);
            }
        }
    } else {
        let mut buf = String::new();
        if let Err(e) = io::stdin().read_to_string(&mut buf) {
            eprintln!("error: cannot read stdin: {}", e);
            process::exit(1);
        }
        buf
    };

    let graph = if cli.from_csv {
        match from_csv(&text) {
            Ok(g) => g,
            Err(e) => {
                eprintln!("error: {}", e);
                process::exit(1);
            }
        }
    } else {
        match parsers::parse(&text) {
            Some(g) => g,
            None => {
                eprintln!("error: no valid flow lines in input");
                process::exit(1);
            }
        }
    };

    let config = DiagramConfig {
        width: cli.width,
        height: cli.height,
        node_width: cli.node_width,
        node_padding: cli.padding,
        ..DiagramConfig::default()
    };

    let rendered = if cli.check {
        let report = FlowIR::from_graph(&graph).balance_report(1e-9);
        if report.is_empty() {
            "all interior nodes balanced\n".to_string()
        } else {
            let mut out = String::new();
            for b in &report {
                out.push_str(&format!(
                    "{}: in {} out {} delta {}\n",
                    b.id, b.inflow, b.outflow, b.delta
                ));
            }
            out
        }
    } else if cli.csv {
        to_csv(&graph)
    } else if cli.roundtrip {
        to_dsl(&graph, &OverrideStore::new())
    } else if cli.document {
        let doc = Document::from_parts(&graph, &OverrideStore::new(), &[], &config);
        match export_json(&doc) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("error: {}", e);
                process::exit(1);
            }
        }
    } else {
        // Scene JSON: the same pipeline the editor runs, with no overrides.
        // Re-parse the original text so labelmove lines still apply.
        let source = if cli.from_csv { to_dsl(&graph, &OverrideStore::new()) } else { text };
        match render_scene(&source, &config) {
            Ok(Some(scene)) => match serde_json::to_string_pretty(&scene) {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("error: {}", e);
                    process::exit(1);
                }
            },
            Ok(None) => {
                eprintln!("error: no valid flow lines in input");
                process::exit(1);
            }
            Err(e) => {
                eprintln!("error: {}", e);
                process::exit(1);
            }
        }
    };

    if let Some(ref path) = cli.output {
        if let Err(e) = fs::write(path, rendered) {
            eprintln!("error: cannot write '{}': {}", path, e);
            process::exit(1);
        }
    } else {
        print!("{}", rendered);
        if let Err(e) = io::stdout().flush() {
            eprintln!("error: cannot flush stdout: {}", e);
            process::exit(1);
        }
    }
}
