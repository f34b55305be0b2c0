use std::fs::File;
use std::io::{BufWriter, Write};
use std::rc::Rc;

use clap::Parser;
use compgraph::algorithms::{speed_by_hour_graph_with_limit, DEFAULT_SORT_MEMORY_LIMIT};
use compgraph::json::{json_parser, row_to_json};
use compgraph::{Graph, GraphResult, NamedSources};

/// Computes average road speed by weekday and hour from two JSON-lines
/// inputs: travel times (`enter_time`/`leave_time`/`edge_id`) and road
/// segment lengths (`edge_id`/`start`/`end` coordinate pairs).
#[derive(Parser)]
struct Args {
    time_filepath: String,
    length_filepath: String,
    output_filepath: String,
    /// Rows buffered per sort run before spilling to disk.
    #[arg(long, default_value_t = DEFAULT_SORT_MEMORY_LIMIT)]
    sort_memory_limit: usize,
}

fn main() -> GraphResult<()> {
    env_logger::init();
    let args = Args::parse();

    let time_graph = Graph::from_file(&args.time_filepath, Rc::new(json_parser));
    let length_graph = Graph::from_file(&args.length_filepath, Rc::new(json_parser));
    let graph = speed_by_hour_graph_with_limit(&time_graph, &length_graph, args.sort_memory_limit)?;

    let mut out = BufWriter::new(File::create(&args.output_filepath)?);
    for row in graph.run(&NamedSources::new())? {
        writeln!(out, "{}", row_to_json(&row?))?;
    }
    Ok(())
}
