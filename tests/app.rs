use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use assert_matches::assert_matches;

use ebd_diversity::app::App;
use ebd_diversity::engine::{EngineRunner, OUTPUT_FILENAME, TABLE_FILENAME, TREE_FILENAME};
use ebd_diversity::error::EbdError;
use ebd_diversity::table::AbundanceTable;
use ebd_diversity::tree::NewickTree;

#[derive(Default)]
struct MockEngine {
    diss: String,
    calls: Mutex<Vec<Vec<String>>>,
    seen_table: Mutex<Option<String>>,
    seen_tree: Mutex<Option<String>>,
}

impl MockEngine {
    fn with_output(diss: &str) -> Self {
        Self {
            diss: diss.to_string(),
            ..Self::default()
        }
    }

    fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }
}

impl EngineRunner for MockEngine {
    fn run(&self, workdir: &Path, args: &[String]) -> Result<(), EbdError> {
        self.calls.lock().unwrap().push(args.to_vec());
        *self.seen_table.lock().unwrap() = fs::read_to_string(workdir.join(TABLE_FILENAME)).ok();
        *self.seen_tree.lock().unwrap() = fs::read_to_string(workdir.join(TREE_FILENAME)).ok();
        fs::write(workdir.join(OUTPUT_FILENAME), &self.diss)
            .map_err(|err| EbdError::Filesystem(err.to_string()))?;
        Ok(())
    }
}

struct FailingEngine {
    status: i32,
}

impl EngineRunner for FailingEngine {
    fn run(&self, _workdir: &Path, _args: &[String]) -> Result<(), EbdError> {
        Err(EbdError::ExternalTool {
            tool: "ExpressBetaDiversity".to_string(),
            status: self.status,
            stderr: "bad tree".to_string(),
        })
    }
}

struct RecordingWorkdirEngine {
    workdir: Mutex<Option<PathBuf>>,
    diss: String,
}

impl EngineRunner for RecordingWorkdirEngine {
    fn run(&self, workdir: &Path, _args: &[String]) -> Result<(), EbdError> {
        *self.workdir.lock().unwrap() = Some(workdir.to_path_buf());
        fs::write(workdir.join(OUTPUT_FILENAME), &self.diss)
            .map_err(|err| EbdError::Filesystem(err.to_string()))?;
        Ok(())
    }
}

fn three_sample_table() -> AbundanceTable {
    let mut table = AbundanceTable::new(
        vec!["S1".to_string(), "S2".to_string(), "S3".to_string()],
        vec!["featureA".to_string(), "featureB".to_string()],
    )
    .unwrap();
    table.set("S1", "featureA", 2.0).unwrap();
    table.set("S2", "featureA", 1.0).unwrap();
    table.set("S2", "featureB", 4.0).unwrap();
    table.set("S3", "featureB", 5.0).unwrap();
    table
}

fn three_sample_diss() -> &'static str {
    "3\nS1\nS2\t0.25\nS3\t0.5\t0.75\n"
}

fn tree() -> NewickTree {
    "((featureA:0.2,featureB:0.3):0.1,outgroup:0.9);"
        .parse()
        .unwrap()
}

#[test]
fn beta_builds_expected_command_and_table_file() {
    let engine = MockEngine::with_output(three_sample_diss());
    let app = App::new(engine);
    let table = three_sample_table();

    let (matrix, provenance) = app.beta(&table, "braycurtis", false).unwrap();

    let app_engine_calls = app.engine().calls();
    assert_eq!(
        app_engine_calls,
        vec![vec![
            "-s".to_string(),
            TABLE_FILENAME.to_string(),
            "-c".to_string(),
            "Bray-Curtis".to_string(),
        ]]
    );

    let written = app.engine().seen_table.lock().unwrap().clone().unwrap();
    assert!(written.starts_with("\tfeatureA\tfeatureB\n"));
    assert!(written.contains("\nS2\t1.0\t4.0"));
    assert!(app.engine().seen_tree.lock().unwrap().is_none());

    assert_eq!(matrix.ids(), ["S1", "S2", "S3"]);
    assert_eq!(matrix.len(), 3);
    for i in 0..3 {
        assert_eq!(matrix.get(i, i), 0.0);
        for j in 0..3 {
            assert_eq!(matrix.get(i, j), matrix.get(j, i));
        }
    }
    assert_eq!(provenance.metric, "braycurtis");
    assert!(!provenance.weighted);
    assert!(!provenance.phylogenetic);
}

#[test]
fn weighted_jaccard_on_phylogenetic_pathway_resolves_soergel() {
    let engine = MockEngine::with_output(three_sample_diss());
    let app = App::new(engine);
    let table = three_sample_table();

    let (_, provenance) = app
        .beta_phylogenetic(&table, &tree(), "jaccard", true)
        .unwrap();

    assert_eq!(
        app.engine().calls(),
        vec![vec![
            "-t".to_string(),
            TREE_FILENAME.to_string(),
            "-s".to_string(),
            TABLE_FILENAME.to_string(),
            "-w".to_string(),
            "-c".to_string(),
            "Soergel".to_string(),
        ]]
    );
    let written_tree = app.engine().seen_tree.lock().unwrap().clone().unwrap();
    assert!(written_tree.contains("featureA"));
    assert!(provenance.weighted);
    assert!(provenance.phylogenetic);
}

#[test]
fn empty_table_fails_before_the_engine_runs() {
    let engine = MockEngine::with_output(three_sample_diss());
    let app = App::new(engine);
    let table = AbundanceTable::new(vec![], vec!["featureA".to_string()]).unwrap();

    let err = app.beta(&table, "braycurtis", false).unwrap_err();
    assert_matches!(err, EbdError::EmptyInput);
    assert!(app.engine().calls().is_empty());

    let err = app
        .beta_phylogenetic(&table, &tree(), "braycurtis", false)
        .unwrap_err();
    assert_matches!(err, EbdError::EmptyInput);
    assert!(app.engine().calls().is_empty());
}

#[test]
fn unknown_metrics_are_rejected_per_pathway() {
    let engine = MockEngine::with_output(three_sample_diss());
    let app = App::new(engine);
    let table = three_sample_table();

    let err = app.beta(&table, "complete_tree", false).unwrap_err();
    assert_matches!(err, EbdError::UnknownMetric(_));

    let err = app
        .beta_phylogenetic(&table, &tree(), "f_st", false)
        .unwrap_err();
    assert_matches!(err, EbdError::UnknownPhylogeneticMetric(_));

    assert!(app.engine().calls().is_empty());
}

#[test]
fn engine_failure_surfaces_exit_status() {
    let app = App::new(FailingEngine { status: 2 });
    let table = three_sample_table();

    let err = app.beta(&table, "euclidean", false).unwrap_err();
    assert_matches!(err, EbdError::ExternalTool { status: 2, .. });
}

#[test]
fn workdir_is_removed_after_the_call() {
    let engine = RecordingWorkdirEngine {
        workdir: Mutex::new(None),
        diss: three_sample_diss().to_string(),
    };
    let app = App::new(engine);
    let table = three_sample_table();

    app.beta(&table, "manhattan", true).unwrap();

    let workdir = app.engine().workdir.lock().unwrap().clone().unwrap();
    assert!(!workdir.exists());
}

#[test]
fn missing_engine_output_is_a_parse_error() {
    struct SilentEngine;
    impl EngineRunner for SilentEngine {
        fn run(&self, _workdir: &Path, _args: &[String]) -> Result<(), EbdError> {
            Ok(())
        }
    }

    let app = App::new(SilentEngine);
    let err = app
        .beta(&three_sample_table(), "braycurtis", false)
        .unwrap_err();
    assert_matches!(err, EbdError::OutputParse(_));
}
