use std::collections::BTreeMap;
use std::fs;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use rustc_hash::{FxHashMap, FxHashSet};
use thiserror::Error;

use crate::error::PodaError;
use crate::model::{EdgeRecord, Lifecycle, PropertyValue, VertexId, VertexRecord};

/// Configuration for loading vertices from a CSV file.
#[derive(Debug, Clone)]
pub struct NodeImportConfig {
    /// Path to the CSV file containing node data.
    pub path: PathBuf,
    /// Name of the CSV column containing numeric vertex identifiers.
    pub id_column: String,
    /// Optional CSV column name containing the path-annotation count.
    pub path_count_column: Option<String>,
    /// Optional list of CSV columns to load as vertex properties.
    /// If None, all columns except the id and path-count columns are loaded.
    pub prop_columns: Option<Vec<String>>,
}

/// Configuration for loading edges from a CSV file.
#[derive(Debug, Clone)]
pub struct EdgeImportConfig {
    /// Path to the CSV file containing edge data.
    pub path: PathBuf,
    /// Name of the CSV column containing source vertex identifiers.
    pub src_column: String,
    /// Name of the CSV column containing destination vertex identifiers.
    pub dst_column: String,
    /// Optional CSV column name containing the edge label.
    pub label_column: Option<String>,
    /// Static edge label to apply to all loaded edges.
    pub static_label: Option<String>,
    /// Optional list of CSV columns to load as edge properties.
    /// If None, all columns except src, dst, and label columns are loaded.
    pub prop_columns: Option<Vec<String>>,
}

/// Configuration for the complete load operation.
#[derive(Debug, Clone)]
pub struct ImportConfig {
    /// Node file configuration.
    pub nodes: NodeImportConfig,
    /// Optional edge file configuration.
    pub edges: Option<EdgeImportConfig>,
}

/// Summary statistics from a load operation.
#[derive(Debug, Clone, Default)]
pub struct ImportSummary {
    /// Total number of vertices loaded.
    pub vertices_loaded: u64,
    /// Total number of edges loaded.
    pub edges_loaded: u64,
}

/// Error type for CLI load/store operations.
#[derive(Error, Debug)]
pub enum CliError {
    /// Generic error message.
    #[error("{0}")]
    Message(String),
    /// IO error from file operations.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// CSV parsing or writing error.
    #[error(transparent)]
    Csv(#[from] csv::Error),
    /// JSON parsing or writing error.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    /// Pipeline error.
    #[error(transparent)]
    Pipeline(#[from] PodaError),
}

impl From<&str> for CliError {
    fn from(value: &str) -> Self {
        CliError::Message(value.to_string())
    }
}

impl From<String> for CliError {
    fn from(value: String) -> Self {
        CliError::Message(value)
    }
}

/// Loads a graph from a nodes CSV and an optional edges CSV, assembling
/// mirrored adjacency on both endpoints of every edge.
pub fn load_graph(cfg: &ImportConfig) -> Result<(Vec<VertexRecord>, ImportSummary), CliError> {
    let mut summary = ImportSummary::default();
    let mut vertices: Vec<VertexRecord> = Vec::new();
    let mut index: FxHashMap<VertexId, usize> = FxHashMap::default();

    summary.vertices_loaded = load_nodes(&cfg.nodes, &mut vertices, &mut index)?;

    if let Some(edges_cfg) = &cfg.edges {
        if vertices.is_empty() {
            return Err(CliError::Message(
                "cannot load edges without any vertices".into(),
            ));
        }
        summary.edges_loaded = load_edges(edges_cfg, &mut vertices, &index)?;
    }

    Ok((vertices, summary))
}

fn load_nodes(
    cfg: &NodeImportConfig,
    vertices: &mut Vec<VertexRecord>,
    index: &mut FxHashMap<VertexId, usize>,
) -> Result<u64, CliError> {
    let mut reader = ReaderBuilder::new().flexible(true).from_path(&cfg.path)?;
    let headers = reader.headers()?.clone();
    let id_index = find_column(&headers, &cfg.id_column)?;
    let path_index = match &cfg.path_count_column {
        Some(col) => Some(find_column(&headers, col)?),
        None => None,
    };

    let mut skip = vec![id_index];
    if let Some(idx) = path_index {
        skip.push(idx);
    }
    let prop_columns = resolve_prop_columns(&headers, &cfg.prop_columns, &skip)?;

    let mut loaded = 0u64;
    for result in reader.records() {
        let record = result?;
        let raw_id = get_required(&record, id_index, &cfg.id_column)?;
        let id: VertexId = raw_id.parse().map_err(|_| {
            CliError::Message(format!("node id '{}' is not a 64-bit integer", raw_id))
        })?;
        if index.contains_key(&id) {
            return Err(CliError::Message(format!(
                "duplicate node id '{}' in nodes file",
                id
            )));
        }

        let mut vertex = VertexRecord::new(id);
        if let Some(idx) = path_index {
            if let Some(raw) = record.get(idx).map(str::trim).filter(|s| !s.is_empty()) {
                vertex.path_count = raw.parse().map_err(|_| {
                    CliError::Message(format!(
                        "path count '{}' for node {} is not a non-negative integer",
                        raw, id
                    ))
                })?;
            }
        }
        vertex.properties = build_props(&record, &prop_columns);

        index.insert(id, vertices.len());
        vertices.push(vertex);
        loaded += 1;
    }
    Ok(loaded)
}

fn load_edges(
    cfg: &EdgeImportConfig,
    vertices: &mut [VertexRecord],
    index: &FxHashMap<VertexId, usize>,
) -> Result<u64, CliError> {
    if cfg.static_label.is_none() && cfg.label_column.is_none() {
        return Err(CliError::Message(
            "edge load requires --edge-label or --edge-label-column".into(),
        ));
    }
    let mut reader = ReaderBuilder::new().flexible(true).from_path(&cfg.path)?;
    let headers = reader.headers()?.clone();
    let src_index = find_column(&headers, &cfg.src_column)?;
    let dst_index = find_column(&headers, &cfg.dst_column)?;
    let label_index = match &cfg.label_column {
        Some(col) => Some(find_column(&headers, col)?),
        None => None,
    };

    let mut skip = vec![src_index, dst_index];
    if let Some(idx) = label_index {
        skip.push(idx);
    }
    let prop_columns = resolve_prop_columns(&headers, &cfg.prop_columns, &skip)?;

    let mut loaded = 0u64;
    for result in reader.records() {
        let record = result?;
        let src = parse_endpoint(&record, src_index, &cfg.src_column, index)?;
        let dst = parse_endpoint(&record, dst_index, &cfg.dst_column, index)?;

        let label = match (&cfg.static_label, label_index) {
            (Some(value), _) => value.clone(),
            (None, Some(idx)) => record
                .get(idx)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .ok_or_else(|| CliError::Message("edge label column is empty".into()))?,
            (None, None) => unreachable!("checked above"),
        };

        let (src_id, src_pos) = src;
        let (dst_id, dst_pos) = dst;
        let mut edge = EdgeRecord::new(src_id, dst_id, label);
        edge.properties = build_props(&record, &prop_columns);

        vertices[src_pos].outgoing.push(edge.clone());
        vertices[dst_pos].incoming.push(edge);
        loaded += 1;
    }
    Ok(loaded)
}

fn parse_endpoint(
    record: &StringRecord,
    idx: usize,
    column: &str,
    index: &FxHashMap<VertexId, usize>,
) -> Result<(VertexId, usize), CliError> {
    let raw = get_required(record, idx, column)?;
    let id: VertexId = raw
        .parse()
        .map_err(|_| CliError::Message(format!("edge endpoint '{}' is not a 64-bit integer", raw)))?;
    let pos = *index.get(&id).ok_or_else(|| {
        CliError::Message(format!("edge references unknown vertex id '{}'", id))
    })?;
    Ok((id, pos))
}

/// Reads marked vertex ids from a text file, one id per line. Blank lines
/// and lines starting with `#` are skipped.
pub fn load_marked_ids(path: &Path) -> Result<Vec<VertexId>, CliError> {
    let file = fs::File::open(path)?;
    let mut ids = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let id: VertexId = trimmed.parse().map_err(|_| {
            CliError::Message(format!("marked id '{}' is not a 64-bit integer", trimmed))
        })?;
        ids.push(id);
    }
    Ok(ids)
}

/// Sets a path annotation on every vertex whose id is in `ids`. Returns
/// how many vertices were marked.
pub fn annotate_marked(vertices: &mut [VertexRecord], ids: &[VertexId]) -> usize {
    let wanted: FxHashSet<VertexId> = ids.iter().copied().collect();
    let mut marked = 0;
    for vertex in vertices.iter_mut() {
        if wanted.contains(&vertex.id) {
            vertex.start_path();
            marked += 1;
        }
    }
    marked
}

/// Reads a JSONL stream of vertex records, one JSON object per line.
pub fn read_jsonl(path: &Path) -> Result<Vec<VertexRecord>, CliError> {
    let file = fs::File::open(path)?;
    let mut vertices = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        vertices.push(serde_json::from_str(&line)?);
    }
    Ok(vertices)
}

/// Writes vertex records as JSONL, one JSON object per line. Returns the
/// number of records written.
pub fn write_jsonl(path: &Path, vertices: &[VertexRecord]) -> Result<u64, CliError> {
    let file = fs::File::create(path)?;
    let mut writer = BufWriter::new(file);
    for vertex in vertices {
        serde_json::to_writer(&mut writer, vertex)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(vertices.len() as u64)
}

/// Exports vertices to a CSV file with the given property columns.
pub fn export_nodes(
    path: &Path,
    vertices: &[VertexRecord],
    props: &[String],
) -> Result<u64, CliError> {
    let mut writer = WriterBuilder::new().from_path(path)?;
    let mut header = Vec::with_capacity(3 + props.len());
    header.push("id".to_string());
    header.push("lifecycle".to_string());
    header.push("path_count".to_string());
    header.extend(props.iter().cloned());
    writer.write_record(&header)?;

    for vertex in vertices {
        let mut row = Vec::with_capacity(header.len());
        row.push(vertex.id.to_string());
        row.push(format_lifecycle(vertex.lifecycle).to_string());
        row.push(vertex.path_count.to_string());
        for prop in props {
            row.push(
                vertex
                    .properties
                    .get(prop)
                    .map(format_prop_value)
                    .unwrap_or_default(),
            );
        }
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(vertices.len() as u64)
}

/// Exports surviving edges to a CSV file. Each edge is written once, from
/// its source's outgoing list.
pub fn export_edges(
    path: &Path,
    vertices: &[VertexRecord],
    props: &[String],
) -> Result<u64, CliError> {
    let mut writer = WriterBuilder::new().from_path(path)?;
    let mut header = Vec::with_capacity(3 + props.len());
    header.push("src".to_string());
    header.push("dst".to_string());
    header.push("label".to_string());
    header.extend(props.iter().cloned());
    writer.write_record(&header)?;

    let mut exported = 0u64;
    for vertex in vertices {
        for edge in &vertex.outgoing {
            let mut row = Vec::with_capacity(header.len());
            row.push(edge.source_id.to_string());
            row.push(edge.target_id.to_string());
            row.push(edge.label.clone());
            for prop in props {
                row.push(
                    edge.properties
                        .get(prop)
                        .map(format_prop_value)
                        .unwrap_or_default(),
                );
            }
            writer.write_record(&row)?;
            exported += 1;
        }
    }
    writer.flush()?;
    Ok(exported)
}

struct ColumnSpec {
    name: String,
    index: usize,
}

fn resolve_prop_columns(
    headers: &StringRecord,
    requested: &Option<Vec<String>>,
    skip: &[usize],
) -> Result<Vec<ColumnSpec>, CliError> {
    if let Some(list) = requested {
        let mut cols = Vec::with_capacity(list.len());
        for name in list {
            let idx = find_column(headers, name)?;
            cols.push(ColumnSpec {
                name: name.clone(),
                index: idx,
            });
        }
        Ok(cols)
    } else {
        let mut cols = Vec::new();
        for (idx, header) in headers.iter().enumerate() {
            if skip.contains(&idx) {
                continue;
            }
            cols.push(ColumnSpec {
                name: header.to_string(),
                index: idx,
            });
        }
        Ok(cols)
    }
}

fn find_column(headers: &StringRecord, name: &str) -> Result<usize, CliError> {
    headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case(name))
        .ok_or_else(|| CliError::Message(format!("column '{}' not found", name)))
}

fn get_required<'a>(record: &'a StringRecord, idx: usize, name: &str) -> Result<&'a str, CliError> {
    record
        .get(idx)
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| CliError::Message(format!("missing value for column '{}'", name)))
}

fn build_props(record: &StringRecord, columns: &[ColumnSpec]) -> BTreeMap<String, PropertyValue> {
    let mut props = BTreeMap::new();
    for col in columns {
        if let Some(raw) = record.get(col.index) {
            let raw = raw.trim();
            if raw.is_empty() {
                continue;
            }
            if let Some(value) = parse_value(raw) {
                props.insert(col.name.clone(), value);
            }
        }
    }
    props
}

fn parse_value(raw: &str) -> Option<PropertyValue> {
    let lower = raw.to_ascii_lowercase();
    if lower == "null" {
        return None;
    }
    if lower == "true" {
        return Some(PropertyValue::Bool(true));
    }
    if lower == "false" {
        return Some(PropertyValue::Bool(false));
    }
    if let Ok(int_val) = raw.parse::<i64>() {
        return Some(PropertyValue::Int(int_val));
    }
    if let Ok(float_val) = raw.parse::<f64>() {
        return Some(PropertyValue::Float(float_val));
    }
    Some(PropertyValue::String(raw.to_string()))
}

fn format_lifecycle(lifecycle: Lifecycle) -> &'static str {
    match lifecycle {
        Lifecycle::Normal => "normal",
        Lifecycle::Deleted => "deleted",
    }
}

fn format_prop_value(value: &PropertyValue) -> String {
    match value {
        PropertyValue::Bool(v) => v.to_string(),
        PropertyValue::Int(v) => v.to_string(),
        PropertyValue::Float(v) => v.to_string(),
        PropertyValue::String(v) => v.clone(),
        PropertyValue::Bytes(v) => format!("bytes(len={})", v.len()),
    }
}
