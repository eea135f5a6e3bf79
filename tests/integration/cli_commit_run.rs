#![allow(missing_docs)]

use std::fs;

use assert_cmd::Command;
use serde_json::Value;
use tempfile::tempdir;

fn poda() -> Command {
    Command::cargo_bin("poda").expect("binary builds")
}

#[test]
fn generate_then_run_round_trip() {
    let dir = tempdir().unwrap();
    let graph = dir.path().join("graph.jsonl");
    let committed = dir.path().join("committed.jsonl");

    poda()
        .args(["--quiet", "generate", "--vertices", "200", "--avg-degree", "3"])
        .args(["--annotate", "0.3", "--seed", "7"])
        .arg("--output")
        .arg(&graph)
        .assert()
        .success();

    poda()
        .args(["--quiet", "run", "--mode", "drop", "--partitions", "2"])
        .arg("--input")
        .arg(&graph)
        .arg("--output")
        .arg(&committed)
        .assert()
        .success();

    let annotated: Vec<u64> = fs::read_to_string(&graph)
        .unwrap()
        .lines()
        .filter_map(|line| {
            let value: Value = serde_json::from_str(line).unwrap();
            let path_count = value["path_count"].as_u64().unwrap_or(0);
            (path_count > 0).then(|| value["id"].as_u64().unwrap())
        })
        .collect();
    assert!(!annotated.is_empty(), "seeded generation marks vertices");

    let output = fs::read_to_string(&committed).unwrap();
    for line in output.lines() {
        let value: Value = serde_json::from_str(line).unwrap();
        let id = value["id"].as_u64().unwrap();
        assert!(!annotated.contains(&id), "dropped vertex {id} was emitted");
    }
    assert_eq!(output.lines().count(), 200 - annotated.len());
}

#[test]
fn csv_input_with_marked_file_prunes_neighbors() {
    let dir = tempdir().unwrap();
    let nodes = dir.path().join("nodes.csv");
    let edges = dir.path().join("edges.csv");
    let marked = dir.path().join("marked.txt");
    let committed = dir.path().join("committed.jsonl");

    fs::write(&nodes, "id,name\n1,ana\n2,bo\n3,cy\n").unwrap();
    fs::write(&edges, "src,dst\n1,2\n2,3\n").unwrap();
    fs::write(&marked, "# vertices scheduled for removal\n1\n").unwrap();

    poda()
        .args(["--quiet", "run", "--mode", "drop", "--track-state"])
        .args(["--edge-label", "follows"])
        .arg("--nodes")
        .arg(&nodes)
        .arg("--edges")
        .arg(&edges)
        .arg("--marked")
        .arg(&marked)
        .arg("--output")
        .arg(&committed)
        .assert()
        .success();

    let lines: Vec<Value> = fs::read_to_string(&committed)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(lines.len(), 3);

    let tombstone = lines.iter().find(|v| v["id"] == 1).unwrap();
    assert_eq!(tombstone["lifecycle"], "Deleted");
    assert!(tombstone["outgoing"].as_array().unwrap().is_empty());

    let survivor = lines.iter().find(|v| v["id"] == 2).unwrap();
    assert_eq!(survivor["lifecycle"], "Normal");
    assert!(survivor["incoming"].as_array().unwrap().is_empty());
    let outgoing = survivor["outgoing"].as_array().unwrap();
    assert_eq!(outgoing.len(), 1);
    assert_eq!(outgoing[0]["target_id"], 3);
}

#[test]
fn csv_export_lists_surviving_edges() {
    let dir = tempdir().unwrap();
    let graph = dir.path().join("graph.jsonl");
    let nodes_out = dir.path().join("nodes_out.csv");
    let edges_out = dir.path().join("edges_out.csv");

    poda()
        .args(["--quiet", "generate", "--vertices", "50", "--avg-degree", "2"])
        .args(["--annotate", "0.2", "--seed", "3"])
        .arg("--output")
        .arg(&graph)
        .assert()
        .success();

    poda()
        .args(["--quiet", "run", "--mode", "drop"])
        .arg("--input")
        .arg(&graph)
        .arg("--nodes-out")
        .arg(&nodes_out)
        .arg("--edges-out")
        .arg(&edges_out)
        .assert()
        .success();

    let nodes_csv = fs::read_to_string(&nodes_out).unwrap();
    assert!(nodes_csv.starts_with("id,lifecycle,path_count"));
    let edges_csv = fs::read_to_string(&edges_out).unwrap();
    assert!(edges_csv.starts_with("src,dst,label"));
}

#[test]
fn unknown_profile_is_an_error() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("cli.toml");
    fs::write(&config, "[defaults]\npartitions = 2\n").unwrap();

    poda()
        .args(["--quiet", "--profile", "missing", "run"])
        .arg("--config")
        .arg(&config)
        .arg("--input")
        .arg(dir.path().join("absent.jsonl"))
        .assert()
        .failure();
}
