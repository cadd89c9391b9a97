use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use serde_json::{Value, json};

const BIN: &str = env!("CARGO_BIN_EXE_tool-schema");

/// Definition with one plain subcommand and one nested group.
fn write_definition(dir: &Path) -> PathBuf {
    let yaml = r#"
name: my-cli
description: A test CLI.
subcommands:
  dest: command
  commands:
    - name: subc-1
      description: First subcommand.
      arguments:
        - dest: pos1
          help: Positional argument 1
          required: true
        - dest: foo
          flags: ["-f", "--foo"]
        - dest: bar
          flags: ["--bar"]
          action: store-true
          default: false
    - name: subg-1
      subcommands:
        dest: subcommand
        commands:
          - name: subc-2
            arguments:
              - dest: level
                flags: ["--level"]
                type: integer
                choices: [1, 2, 3]
"#;
    let path = dir.join("cli.yaml");
    fs::write(&path, yaml).expect("failed to write definition");
    path
}

fn run(args: &[&str]) -> Output {
    Command::new(BIN)
        .args(args)
        .output()
        .expect("failed to run tool-schema")
}

fn stdout_json(output: &Output) -> Value {
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

fn paths(records: &Value) -> Vec<&str> {
    records
        .as_array()
        .unwrap()
        .iter()
        .map(|record| record["path"].as_str().unwrap())
        .collect()
}

// ---------------------------------------------------------------------------
// schema
// ---------------------------------------------------------------------------

#[test]
fn schema_emits_one_record_per_command() {
    let dir = tempfile::tempdir().unwrap();
    let definition = write_definition(dir.path());

    let records = stdout_json(&run(&["schema", "--definition", definition.to_str().unwrap()]));
    assert_eq!(
        paths(&records),
        ["my-cli", "my-cli subc-1", "my-cli subg-1", "my-cli subg-1 subc-2"]
    );

    let subc1 = &records[1];
    assert_eq!(subc1["schema"]["required"], json!(["pos1"]));
    assert_eq!(subc1["options"]["foo"]["flag_name"], json!("--foo"));
    assert_eq!(subc1["options"]["bar"]["kind"], json!("switch"));

    let level = &records[3]["schema"]["properties"]["level"];
    assert_eq!(level["type"], json!("integer"));
    assert_eq!(level["enum"], json!([1, 2, 3]));
}

#[test]
fn schema_flags_filter_and_aggregate() {
    let dir = tempfile::tempdir().unwrap();
    let definition = write_definition(dir.path());
    let definition = definition.to_str().unwrap();

    let records = stdout_json(&run(&[
        "schema",
        "--definition",
        definition,
        "--include",
        "^subc-1$",
    ]));
    assert_eq!(paths(&records), ["my-cli", "my-cli subc-1"]);

    let records = stdout_json(&run(&[
        "schema",
        "--definition",
        definition,
        "--aggregate",
        "group",
    ]));
    assert_eq!(paths(&records), ["my-cli", "my-cli subg-1"]);
    assert_eq!(
        records[0]["schema"]["properties"]["subcommand"]["enum"],
        json!(["subc-1", "subg-1"])
    );

    let records = stdout_json(&run(&[
        "schema",
        "--definition",
        definition,
        "--aggregate",
        "root",
        "--name",
        "python -m cli",
    ]));
    assert_eq!(paths(&records), ["python -m cli"]);
}

#[test]
fn schema_reads_walk_config() {
    let dir = tempfile::tempdir().unwrap();
    let definition = write_definition(dir.path());
    let config = dir.path().join("walk.yml");
    fs::write(&config, "aggregate: none\nexclude: \"^subg-1\"\n").unwrap();

    let records = stdout_json(&run(&[
        "schema",
        "--definition",
        definition.to_str().unwrap(),
        "--config",
        config.to_str().unwrap(),
    ]));
    assert_eq!(paths(&records), ["my-cli", "my-cli subc-1"]);

    // Flags take precedence over the config file.
    let records = stdout_json(&run(&[
        "schema",
        "--definition",
        definition.to_str().unwrap(),
        "--config",
        config.to_str().unwrap(),
        "--aggregate",
        "root",
    ]));
    assert_eq!(paths(&records), ["my-cli"]);
}

#[test]
fn schema_yaml_output() {
    let dir = tempfile::tempdir().unwrap();
    let definition = write_definition(dir.path());

    let output = run(&[
        "schema",
        "--definition",
        definition.to_str().unwrap(),
        "--format",
        "yaml",
    ]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("my-cli subc-1"));
    assert!(stdout.contains("schema:"));
}

#[test]
fn schema_strict_types_fails_on_unknown_type() {
    let dir = tempfile::tempdir().unwrap();
    let definition = dir.path().join("cli.json");
    fs::write(
        &definition,
        r#"{"name": "tool", "arguments": [{"dest": "out", "flags": ["--out"], "type": "path"}]}"#,
    )
    .unwrap();
    let definition = definition.to_str().unwrap();

    assert!(run(&["schema", "--definition", definition]).status.success());

    let output = run(&["schema", "--definition", definition, "--strict-types"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error:"));
    assert!(stderr.contains("out"));
}

#[test]
fn schema_invalid_pattern_fails() {
    let dir = tempfile::tempdir().unwrap();
    let definition = write_definition(dir.path());

    let output = run(&[
        "schema",
        "--definition",
        definition.to_str().unwrap(),
        "--exclude",
        "(",
    ]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid pattern"));
}

#[test]
fn schema_missing_definition_fails() {
    let output = run(&["schema", "--definition", "/nonexistent/cli.yaml"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to load definition"));
}

// ---------------------------------------------------------------------------
// construct
// ---------------------------------------------------------------------------

#[test]
fn construct_from_input_file() {
    let dir = tempfile::tempdir().unwrap();
    let definition = write_definition(dir.path());
    let input = dir.path().join("input.json");
    fs::write(&input, r#"{"pos1": "val1", "foo": "val2", "bar": true}"#).unwrap();

    let argv = stdout_json(&run(&[
        "construct",
        "--definition",
        definition.to_str().unwrap(),
        "--path",
        "my-cli subc-1",
        "--input",
        input.to_str().unwrap(),
    ]));
    assert_eq!(argv, json!(["my-cli", "subc-1", "--foo", "val2", "--bar", "val1"]));
}

#[test]
fn construct_from_stdin() {
    let dir = tempfile::tempdir().unwrap();
    let definition = write_definition(dir.path());

    let mut child = Command::new(BIN)
        .args([
            "construct",
            "--definition",
            definition.to_str().unwrap(),
            "--path",
            "my-cli subg-1 subc-2",
        ])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn tool-schema");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(br#"{"level": 2}"#)
        .unwrap();
    let output = child.wait_with_output().unwrap();

    assert_eq!(
        stdout_json(&output),
        json!(["my-cli", "subg-1", "subc-2", "--level", "2"])
    );
}

#[test]
fn construct_unknown_option_fails() {
    let dir = tempfile::tempdir().unwrap();
    let definition = write_definition(dir.path());
    let input = dir.path().join("input.json");
    fs::write(&input, r#"{"nope": 1}"#).unwrap();

    let output = run(&[
        "construct",
        "--definition",
        definition.to_str().unwrap(),
        "--path",
        "my-cli subc-1",
        "--input",
        input.to_str().unwrap(),
    ]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown option `nope`"));
}

#[test]
fn construct_unknown_path_fails() {
    let dir = tempfile::tempdir().unwrap();
    let definition = write_definition(dir.path());
    let input = dir.path().join("input.json");
    fs::write(&input, "{}").unwrap();

    let output = run(&[
        "construct",
        "--definition",
        definition.to_str().unwrap(),
        "--path",
        "my-cli missing",
        "--input",
        input.to_str().unwrap(),
    ]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("No command 'my-cli missing'"));
}

// ---------------------------------------------------------------------------
// describe-self
// ---------------------------------------------------------------------------

#[test]
fn describe_self_walks_own_definition() {
    let records = stdout_json(&run(&["describe-self"]));
    assert_eq!(
        paths(&records),
        [
            "tool-schema",
            "tool-schema schema",
            "tool-schema construct",
            "tool-schema describe-self"
        ]
    );

    let root = &records[0]["schema"];
    assert_eq!(
        root["properties"]["command"]["enum"],
        json!(["schema", "construct", "describe-self"])
    );

    let schema = &records[1]["schema"];
    assert_eq!(schema["required"], json!(["definition"]));
    assert_eq!(
        schema["properties"]["aggregate"]["enum"],
        json!(["none", "group", "root"])
    );
    assert_eq!(schema["properties"]["strict_types"]["type"], json!("boolean"));
}

#[test]
fn describe_self_root_aggregation() {
    let records = stdout_json(&run(&["describe-self", "--aggregate", "root"]));
    assert_eq!(paths(&records), ["tool-schema"]);
    let description = records[0]["schema"]["description"].as_str().unwrap();
    assert!(description.starts_with("## tool-schema\n"));
    assert!(description.contains("## tool-schema construct\n"));
}
