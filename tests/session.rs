//! End-to-end tests for the interactive cleanup session.
//!
//! Input is scripted line by line; messages and prompts are recorded so the
//! tests can check both what was printed and what was asked.

use std::collections::VecDeque;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use arrow::datatypes::DataType;
use tempfile::TempDir;

use cliner::cli::{Prompt, Session, SessionSummary};

const PEOPLE_CSV: &str = "\
name,age,city
Alice,30,NY
Bob,,LA
Alice,30,NY
Carol,25,
";

/// Scripted answers, recording every prompt shown.
struct Script {
    answers: VecDeque<String>,
    asked: Vec<String>,
}

impl Script {
    fn new(answers: &[&str]) -> Self {
        Self {
            answers: answers.iter().map(|a| a.to_string()).collect(),
            asked: Vec::new(),
        }
    }

    fn times_asked(&self, message: &str) -> usize {
        self.asked.iter().filter(|m| m.as_str() == message).count()
    }
}

impl Prompt for &mut Script {
    fn read_line(&mut self, message: &str) -> io::Result<Option<String>> {
        self.asked.push(message.to_string());
        Ok(self.answers.pop_front())
    }
}

fn write_input(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

/// Run a session over `script`, writing exports into `out_dir`.
fn run(script: &mut Script, out_dir: &Path) -> (SessionSummary, String) {
    let mut session = Session::new(script, Vec::new()).with_output_dir(out_dir);
    let summary = session.run().unwrap();
    let output = String::from_utf8(session.into_output()).unwrap();
    (summary, output)
}

fn path_arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn test_drop_missing_then_export_csv() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "people.csv", PEOPLE_CSV);

    let mut script = Script::new(&[path_arg(&input), "1", "1", "n"]);
    let (summary, output) = run(&mut script, dir.path());

    assert!(output.contains("Loaded 4 rows and 3 columns."));
    assert!(output.contains("\nWhat type of cleanup would you like?\n1. Missing values\n"));
    assert!(output.contains("\nDropping missing values...\n"));
    assert!(output.contains("\nDropped 2 missing rows!\n"));
    assert!(output.contains("\nDone!\n"));
    assert!(output.contains("1. csv\n2. xlsx\n3. json\n4. html\n"));

    let exported = dir.path().join("pycliner_output.csv");
    assert_eq!(summary.iterations, 1);
    assert_eq!(summary.exports, vec![exported.clone()]);

    let content = fs::read_to_string(&exported).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines, vec!["name,age,city", "Alice,30,NY", "Alice,30,NY"]);

    assert_eq!(script.times_asked("Path: "), 1);
    assert_eq!(script.times_asked("Would you like to clean again? [y/N]"), 1);
}

#[test]
fn test_drop_duplicates_then_json_keeps_labels() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "people.csv", PEOPLE_CSV);

    let mut script = Script::new(&[path_arg(&input), "3", "3", "N"]);
    let (summary, output) = run(&mut script, dir.path());

    assert!(output.contains("\nDropping duplicate values...\n"));
    assert!(output.contains("\nDropped 1 duplicate rows!\n"));
    assert_eq!(summary.exports.len(), 1);

    let exported = dir.path().join("pycliner_output.json");
    let reloaded = cliner::load::load(&exported).unwrap();
    assert_eq!(reloaded.num_rows(), 3);
    assert_eq!(reloaded.column_names(), vec!["name", "age", "city"]);
    assert_eq!(reloaded.index().values().to_vec(), vec![0, 1, 3]);
}

#[test]
fn test_wrong_types_then_html() {
    let dir = TempDir::new().unwrap();
    let input = write_input(
        &dir,
        "orders.csv",
        "order_id,amount,placed\n1,10,2024-01-01\n2,abc,2024-01-02\n3,30,someday\n",
    );

    let mut script = Script::new(&[path_arg(&input), "2", "4", "n"]);
    let (_, output) = run(&mut script, dir.path());

    assert!(output.contains("\nEliminating values with wrong data types...\n"));
    assert!(!output.contains("Dropped"));

    let html = fs::read_to_string(dir.path().join("pycliner_output.html")).unwrap();
    assert!(html.starts_with("<table border=\"1\" class=\"dataframe\">"));
    assert!(html.contains("<th>order_id</th>"));
    assert_eq!(html.matches("<tr>").count(), 1);
    assert!(html.contains("<td>10.0</td>") || html.contains("<td>10</td>"));
}

#[test]
fn test_wrong_types_table_contents() {
    let dir = TempDir::new().unwrap();
    let input = write_input(
        &dir,
        "orders.csv",
        "order_id,amount,placed\n1,10,2024-01-01\n2,abc,2024-01-02\n3,30,someday\n",
    );

    let mut table = cliner::load::load(&input).unwrap();
    let report = cliner::clean::apply(cliner::clean::Cleanup::WrongTypes, &mut table).unwrap();

    assert_eq!(report.rows_removed, 2);
    assert_eq!(table.num_rows(), 1);
    assert_eq!(table.column(0).data_type(), &DataType::Int64);
    assert_eq!(table.column(1).data_type(), &DataType::Float64);
    assert!(table.column(2).data_type().is_temporal());
}

#[test]
fn test_missing_file_restarts() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.csv");

    let mut script = Script::new(&[path_arg(&missing)]);
    let (summary, output) = run(&mut script, dir.path());

    assert!(output.contains("Error: file not found.\n"));
    assert_eq!(summary.restarts, 1);
    assert_eq!(summary.iterations, 0);
    // Restarted at the path prompt, then input ran out
    assert_eq!(script.times_asked("Path: "), 2);
}

#[test]
fn test_unsupported_file_type() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "notes.txt", "hello\n");

    let mut script = Script::new(&[path_arg(&input)]);
    let (summary, output) = run(&mut script, dir.path());

    assert!(output.contains("Unsupported file type: .txt\n"));
    assert!(!output.contains("Error: Unsupported"));
    assert_eq!(summary.restarts, 1);
}

#[test]
fn test_invalid_cleanup_choice_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "people.csv", PEOPLE_CSV);

    let mut script = Script::new(&[path_arg(&input), "abc"]);
    let (summary, output) = run(&mut script, dir.path());

    assert!(output.contains("Error: Please enter a valid cleanup option.\n"));
    assert!(!output.contains("Done!"));
    assert!(summary.exports.is_empty());
    assert_eq!(script.times_asked("Path: "), 2);
    assert_eq!(script.times_asked("Would you like to clean again? [y/N]"), 0);
}

#[test]
fn test_invalid_export_choice_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "people.csv", PEOPLE_CSV);

    let mut script = Script::new(&[path_arg(&input), "3", "9"]);
    let (summary, output) = run(&mut script, dir.path());

    assert!(output.contains("\nDone!\n"));
    assert!(output.contains("Error: Please enter a valid export option.\n"));
    assert!(summary.exports.is_empty());
    for ext in ["csv", "xlsx", "json", "html"] {
        assert!(!dir.path().join(format!("pycliner_output.{ext}")).exists());
    }
}

#[test]
fn test_any_answer_but_n_cleans_again() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "people.csv", PEOPLE_CSV);
    let path = path_arg(&input);

    let mut script = Script::new(&[path, "3", "1", "y", path, "1", "2", "", path, "3", "1", " n "]);
    let (summary, output) = run(&mut script, dir.path());

    assert_eq!(summary.iterations, 3);
    assert_eq!(summary.restarts, 0);
    assert_eq!(output.matches("Loaded 4 rows and 3 columns.").count(), 3);
    assert!(dir.path().join("pycliner_output.xlsx").exists());
    assert_eq!(script.times_asked("Path: "), 3);
}

#[test]
fn test_export_overwrites_previous_output() {
    let dir = TempDir::new().unwrap();
    let first = write_input(&dir, "people.csv", PEOPLE_CSV);
    let second = write_input(&dir, "other.csv", "x\n1\n2\n");

    let mut script = Script::new(&[
        path_arg(&first),
        "3",
        "1",
        "y",
        path_arg(&second),
        "3",
        "1",
        "n",
    ]);
    let (summary, _) = run(&mut script, dir.path());

    assert_eq!(summary.exports[0], summary.exports[1]);
    let content = fs::read_to_string(&summary.exports[1]).unwrap();
    assert_eq!(content, "x\n1\n2\n");
}

#[test]
fn test_end_of_input_mid_iteration() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "people.csv", PEOPLE_CSV);

    let mut script = Script::new(&[path_arg(&input), "1"]);
    let (summary, output) = run(&mut script, dir.path());

    assert!(output.contains("Dropped 2 missing rows!"));
    assert_eq!(summary, SessionSummary::default());
}

#[test]
fn test_wrong_types_drops_impossible_dates_only() {
    let dir = TempDir::new().unwrap();
    let input = write_input(
        &dir,
        "visits.csv",
        "name,when\nx,2024-01-05\ny,2024-02-30\nz,2024-01-07\n",
    );

    let mut script = Script::new(&[path_arg(&input), "2", "1", "n"]);
    let (summary, output) = run(&mut script, dir.path());

    assert!(output.contains("Loaded 3 rows and 2 columns."));
    assert!(!output.contains("Error:"));
    assert_eq!(summary.iterations, 1);

    let content = fs::read_to_string(dir.path().join("pycliner_output.csv")).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "name,when");
    assert!(lines[1].starts_with("x,2024-01-05"));
    assert!(lines[2].starts_with("z,2024-01-07"));
}

#[test]
fn test_blank_path_is_unsupported() {
    let dir = TempDir::new().unwrap();

    let mut script = Script::new(&["  "]);
    let (summary, output) = run(&mut script, dir.path());

    assert!(output.contains("Unsupported file type: \n"));
    assert!(!output.contains("file not found"));
    assert_eq!(summary.restarts, 1);
}
