//! Concrete pipelines built from the core operators: word counting, TF-IDF,
//! pointwise mutual information, and average-speed-by-hour-of-week. Each
//! takes already-constructed source graphs (built with `Graph::from_iter` or
//! `Graph::from_file`) rather than a stream name, so callers decide how rows
//! reach the pipeline.

use std::rc::Rc;

use crate::error::{GraphError, GraphResult};
use crate::graph::Graph;
use crate::joiners::InnerJoiner;
use crate::mappers::{
    BinaryArithmeticOperation, DatetimeExtractor, Duration as DurationMapper, Filter, FilterPunctuation, Haversine,
    LowerCase, Product, Project, Split, StrToInt,
};
use crate::reducer::FirstReducer;
use crate::reducers::{Count, Sum, TermFrequency, TopN};
use crate::row::Row;

fn numeric(row: &Row, col: &str) -> GraphResult<f64> {
    row.get(col)
        .and_then(|v| v.as_f64())
        .ok_or_else(|| GraphError::MissingColumn(col.to_string()))
}

/// Row buffer before sort spills to disk, used by every pipeline below unless
/// a caller asks for a different bound; see `Graph::sort`/`Graph::sort_with_limit`.
pub const DEFAULT_SORT_MEMORY_LIMIT: usize = crate::nodes::DEFAULT_MEMORY_LIMIT;

/// Counts occurrences of each word in `text`, sorted ascending by count then word.
pub fn word_count_graph(input: &Rc<Graph>) -> GraphResult<Rc<Graph>> {
    word_count_graph_with_columns(input, "text", "count", DEFAULT_SORT_MEMORY_LIMIT)
}

/// Same as `word_count_graph`, spilling sort runs once `sort_memory_limit` rows accumulate.
pub fn word_count_graph_with_limit(input: &Rc<Graph>, sort_memory_limit: usize) -> GraphResult<Rc<Graph>> {
    word_count_graph_with_columns(input, "text", "count", sort_memory_limit)
}

pub fn word_count_graph_with_columns(
    input: &Rc<Graph>,
    text_column: &str,
    count_column: &str,
    sort_memory_limit: usize,
) -> GraphResult<Rc<Graph>> {
    let text = text_column.to_string();
    Ok(input
        .map(FilterPunctuation::new(text.clone()))
        .map(LowerCase::new(text.clone()))
        .map(Split::new(text.clone())?)
        .sort_with_limit(vec![text.clone()], sort_memory_limit)
        .reduce(Count::new(count_column), vec![text.clone()])
        .sort_with_limit(vec![count_column.to_string(), text], sort_memory_limit))
}

/// TF-IDF for every (document, word) pair, top 3 words per document by score.
pub fn tf_idf_graph(input: &Rc<Graph>) -> GraphResult<Rc<Graph>> {
    tf_idf_graph_with_columns(input, "doc_id", "text", "tf_idf", DEFAULT_SORT_MEMORY_LIMIT)
}

/// Same as `tf_idf_graph`, spilling sort runs once `sort_memory_limit` rows accumulate.
pub fn tf_idf_graph_with_limit(input: &Rc<Graph>, sort_memory_limit: usize) -> GraphResult<Rc<Graph>> {
    tf_idf_graph_with_columns(input, "doc_id", "text", "tf_idf", sort_memory_limit)
}

pub fn tf_idf_graph_with_columns(
    input: &Rc<Graph>,
    doc_column: &str,
    text_column: &str,
    result_column: &str,
    sort_memory_limit: usize,
) -> GraphResult<Rc<Graph>> {
    let doc = doc_column.to_string();
    let text = text_column.to_string();
    let doc_count_column = "doc_count".to_string();
    let total_column = "total".to_string();
    let idf_column = "idf".to_string();

    let split_graph = input
        .map(FilterPunctuation::new(text.clone()))
        .map(LowerCase::new(text.clone()))
        .map(Split::new(text.clone())?);

    let doc_graph = input
        .sort_with_limit(vec![doc.clone()], sort_memory_limit)
        .reduce(FirstReducer, vec![doc.clone()])
        .reduce(Count::new(total_column.clone()), Vec::<String>::new());

    let idf_graph = {
        let total_column = total_column.clone();
        let doc_count_column = doc_count_column.clone();
        split_graph
            .sort_with_limit(vec![doc.clone(), text.clone()], sort_memory_limit)
            .reduce(FirstReducer, vec![doc.clone(), text.clone()])
            .sort_with_limit(vec![text.clone()], sort_memory_limit)
            .reduce(Count::new(doc_count_column.clone()), vec![text.clone()])
            .join(&doc_graph, InnerJoiner::new(), Vec::<String>::new())
            .map(BinaryArithmeticOperation::new(
                move |row: &Row| Ok((numeric(row, &total_column)? / numeric(row, &doc_count_column)?).ln()),
                idf_column.clone(),
            ))
    };

    let tf_graph =
        split_graph.sort_with_limit(vec![doc.clone()], sort_memory_limit).reduce(TermFrequency::new(text.clone()), vec![doc.clone()]);

    let result_column = result_column.to_string();
    Ok(tf_graph
        .sort_with_limit(vec![text.clone()], sort_memory_limit)
        .join(&idf_graph, InnerJoiner::new(), vec![text.clone()])
        .map(Product::new(vec![idf_column, "tf".to_string()], result_column.clone()))
        .map(Project::new(vec![doc, text.clone(), result_column.clone()]))
        .sort_with_limit(vec![text], sort_memory_limit)
        .reduce(TopN::new(result_column, 3), Vec::<String>::new()))
}

/// Top 10 words by pointwise mutual information, per document.
pub fn pmi_graph(input: &Rc<Graph>) -> GraphResult<Rc<Graph>> {
    pmi_graph_with_columns(input, "doc_id", "text", "pmi", DEFAULT_SORT_MEMORY_LIMIT)
}

/// Same as `pmi_graph`, spilling sort runs once `sort_memory_limit` rows accumulate.
pub fn pmi_graph_with_limit(input: &Rc<Graph>, sort_memory_limit: usize) -> GraphResult<Rc<Graph>> {
    pmi_graph_with_columns(input, "doc_id", "text", "pmi", sort_memory_limit)
}

pub fn pmi_graph_with_columns(
    input: &Rc<Graph>,
    doc_column: &str,
    text_column: &str,
    result_column: &str,
    sort_memory_limit: usize,
) -> GraphResult<Rc<Graph>> {
    let doc = doc_column.to_string();
    let text = text_column.to_string();
    let doc_tf_column = "doc_tf".to_string();
    let tf_column = "total_tf".to_string();

    let split_graph = {
        let text_for_filter = text.clone();
        input
            .map(FilterPunctuation::new(text.clone()))
            .map(LowerCase::new(text.clone()))
            .map(Split::new(text.clone())?)
            .map(Filter::new(move |row: &Row| {
                row.get(&text_for_filter).and_then(|v| v.as_str()).is_some_and(|s| s.chars().count() > 4)
            }))
    };

    let freq_graph = {
        let doc_tf_column = doc_tf_column.clone();
        split_graph
            .sort_with_limit(vec![doc.clone(), text.clone()], sort_memory_limit)
            .reduce(Count::new(doc_tf_column.clone()), vec![doc.clone(), text.clone()])
            .map(Filter::new(move |row: &Row| row.get(&doc_tf_column).and_then(|v| v.as_f64()).is_some_and(|n| n > 1.0)))
    };

    let filtered_graph = split_graph.sort_with_limit(vec![doc.clone(), text.clone()], sort_memory_limit).join(
        &freq_graph,
        InnerJoiner::new(),
        vec![doc.clone(), text.clone()],
    );

    let doc_tf_graph = filtered_graph.reduce(TermFrequency::with_result_col(text.clone(), doc_tf_column.clone()), vec![doc.clone()]);

    let total_tf_graph = filtered_graph
        .reduce(TermFrequency::with_result_col(text.clone(), tf_column.clone()), Vec::<String>::new())
        .sort_with_limit(vec![text.clone()], sort_memory_limit);

    let result_column = result_column.to_string();
    Ok({
        let doc_tf_column = doc_tf_column.clone();
        let tf_column = tf_column.clone();
        doc_tf_graph
            .sort_with_limit(vec![text.clone()], sort_memory_limit)
            .join(&total_tf_graph, InnerJoiner::new(), vec![text.clone()])
            .map(BinaryArithmeticOperation::new(
                move |row: &Row| Ok((numeric(row, &doc_tf_column)? / numeric(row, &tf_column)?).ln()),
                result_column.clone(),
            ))
            .map(Project::new(vec![doc.clone(), text, result_column.clone()]))
            .sort_with_limit(vec![doc], sort_memory_limit)
            .reduce(TopN::new(result_column, 10), Vec::<String>::new())
    })
}

/// Average speed in km/h by weekday and hour, joining a travel-time stream
/// against a road-segment-length stream.
pub fn speed_by_hour_graph(time_input: &Rc<Graph>, length_input: &Rc<Graph>) -> GraphResult<Rc<Graph>> {
    speed_by_hour_graph_with_columns(
        time_input,
        length_input,
        "enter_time",
        "leave_time",
        "edge_id",
        "start",
        "end",
        "weekday",
        "hour",
        "speed",
        DEFAULT_SORT_MEMORY_LIMIT,
    )
}

/// Same as `speed_by_hour_graph`, spilling sort runs once `sort_memory_limit` rows accumulate.
pub fn speed_by_hour_graph_with_limit(time_input: &Rc<Graph>, length_input: &Rc<Graph>, sort_memory_limit: usize) -> GraphResult<Rc<Graph>> {
    speed_by_hour_graph_with_columns(
        time_input,
        length_input,
        "enter_time",
        "leave_time",
        "edge_id",
        "start",
        "end",
        "weekday",
        "hour",
        "speed",
        sort_memory_limit,
    )
}

#[allow(clippy::too_many_arguments)]
pub fn speed_by_hour_graph_with_columns(
    time_input: &Rc<Graph>,
    length_input: &Rc<Graph>,
    enter_time_column: &str,
    leave_time_column: &str,
    edge_id_column: &str,
    start_coord_column: &str,
    end_coord_column: &str,
    weekday_result_column: &str,
    hour_result_column: &str,
    speed_result_column: &str,
    sort_memory_limit: usize,
) -> GraphResult<Rc<Graph>> {
    let edge = edge_id_column.to_string();
    let weekday = weekday_result_column.to_string();
    let hour = hour_result_column.to_string();
    let haversine_column = "haversine".to_string();
    let duration_column = "duration".to_string();

    let hav_graph = length_input
        .map(Haversine::new(start_coord_column, end_coord_column, haversine_column.clone()))
        .map(Project::new(vec![edge.clone(), haversine_column.clone()]))
        .sort_with_limit(vec![edge.clone()], sort_memory_limit);

    let time_graph = time_input
        .map(DatetimeExtractor::new(enter_time_column, "%a", weekday.clone()))
        .map(DatetimeExtractor::new(enter_time_column, "%H", hour.clone()))
        .map(StrToInt::new(vec![hour.clone()]))
        .map(DurationMapper::new(enter_time_column, leave_time_column, duration_column.clone()))
        .map(Project::new(vec![edge.clone(), weekday.clone(), hour.clone(), duration_column.clone()]))
        .sort_with_limit(vec![edge.clone()], sort_memory_limit);

    let joint_graph = time_graph
        .join(&hav_graph, InnerJoiner::new(), vec![edge.clone()])
        .sort_with_limit(vec![weekday.clone(), hour.clone()], sort_memory_limit);

    let duration_graph = joint_graph.reduce(
        Sum::new(duration_column.clone()),
        vec![edge.clone(), weekday.clone(), hour.clone()],
    );

    let distance_graph = joint_graph.reduce(
        Sum::new(haversine_column.clone()),
        vec![edge.clone(), weekday.clone(), hour.clone()],
    );

    let speed_result_column = speed_result_column.to_string();
    Ok({
        let haversine_column = haversine_column.clone();
        let duration_column = duration_column.clone();
        duration_graph
            .join(&distance_graph, InnerJoiner::new(), vec![edge, weekday.clone(), hour.clone()])
            .map(BinaryArithmeticOperation::new(
                move |row: &Row| Ok(numeric(row, &haversine_column)? / numeric(row, &duration_column)?),
                speed_result_column.clone(),
            ))
            .map(Project::new(vec![weekday, hour, speed_result_column]))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::NamedSources;
    use crate::row::Value;

    fn source(rows: Vec<Row>) -> crate::nodes::Producer {
        Rc::new(move || Box::new(rows.clone().into_iter()))
    }

    fn row(text: &str) -> Row {
        Row::from([("text".to_string(), Value::Str(text.to_string()))])
    }

    #[test]
    fn word_count_graph_counts_and_orders_ascending() {
        let rows = vec![row("the cat"), row("the dog"), row("the cat")];
        let mut sources = NamedSources::new();
        sources.insert("input".to_string(), source(rows));

        let head = Graph::from_iter("input");
        let graph = word_count_graph(&head).unwrap();
        let out: Vec<_> = graph.run(&sources).unwrap().collect::<Result<_, _>>().unwrap();

        assert_eq!(out.last().unwrap().get("text"), Some(&Value::Str("the".into())));
        assert_eq!(out.last().unwrap().get("count"), Some(&Value::Int(3)));
    }

    #[test]
    fn word_count_graph_with_limit_forces_a_spill_and_still_counts_correctly() {
        let rows = vec![row("the cat"), row("the dog"), row("the cat")];
        let mut sources = NamedSources::new();
        sources.insert("input".to_string(), source(rows));

        let head = Graph::from_iter("input");
        let graph = word_count_graph_with_limit(&head, 1).unwrap();
        let out: Vec<_> = graph.run(&sources).unwrap().collect::<Result<_, _>>().unwrap();

        assert_eq!(out.last().unwrap().get("text"), Some(&Value::Str("the".into())));
        assert_eq!(out.last().unwrap().get("count"), Some(&Value::Int(3)));
    }
}
