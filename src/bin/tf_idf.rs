use std::fs::File;
use std::io::{BufWriter, Write};
use std::rc::Rc;

use clap::Parser;
use compgraph::algorithms::{tf_idf_graph_with_limit, DEFAULT_SORT_MEMORY_LIMIT};
use compgraph::json::{json_parser, row_to_json};
use compgraph::{Graph, GraphResult, NamedSources};

/// Computes TF-IDF for every document/word pair in a JSON-lines input,
/// one `{"doc_id": ..., "text": ...}` row per line.
#[derive(Parser)]
struct Args {
    input_filepath: String,
    output_filepath: String,
    /// Rows buffered per sort run before spilling to disk.
    #[arg(long, default_value_t = DEFAULT_SORT_MEMORY_LIMIT)]
    sort_memory_limit: usize,
}

fn main() -> GraphResult<()> {
    env_logger::init();
    let args = Args::parse();

    let graph = tf_idf_graph_with_limit(&Graph::from_file(&args.input_filepath, Rc::new(json_parser)), args.sort_memory_limit)?;
    let mut out = BufWriter::new(File::create(&args.output_filepath)?);
    for row in graph.run(&NamedSources::new())? {
        writeln!(out, "{}", row_to_json(&row?))?;
    }
    Ok(())
}
