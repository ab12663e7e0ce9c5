use std::fs;

use camino::Utf8Path;
use serde::Serialize;

use crate::artifact::DistanceArtifact;
use crate::engine::{self, EngineRunner};
use crate::error::EbdError;
use crate::matrix::DistanceMatrix;
use crate::metrics;
use crate::provenance::ProvenanceTag;
use crate::table::AbundanceTable;
use crate::tree::NewickTree;
use crate::viz;

#[derive(Debug, Clone, Serialize)]
pub struct BetaResult {
    pub metric: String,
    pub weighted: bool,
    pub phylogenetic: bool,
    pub samples: usize,
    pub artifact_path: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlotResult {
    pub panels: Vec<String>,
    pub samples: usize,
    pub plot_path: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsResult {
    pub phylogenetic: Vec<String>,
    pub non_phylogenetic: Vec<String>,
}

#[derive(Clone)]
pub struct App<E: EngineRunner> {
    engine: E,
}

impl<E: EngineRunner> App<E> {
    pub fn new(engine: E) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn beta(
        &self,
        table: &AbundanceTable,
        metric: &str,
        weighted: bool,
    ) -> Result<(DistanceMatrix, ProvenanceTag), EbdError> {
        metrics::validate_non_phylogenetic(metric)?;
        self.run_engine(table, None, metric, weighted)
    }

    pub fn beta_phylogenetic(
        &self,
        table: &AbundanceTable,
        tree: &NewickTree,
        metric: &str,
        weighted: bool,
    ) -> Result<(DistanceMatrix, ProvenanceTag), EbdError> {
        metrics::validate_phylogenetic(metric)?;
        self.run_engine(table, Some(tree), metric, weighted)
    }

    pub fn save(
        &self,
        matrix: &DistanceMatrix,
        provenance: &ProvenanceTag,
        output: &Utf8Path,
    ) -> Result<BetaResult, EbdError> {
        let artifact = DistanceArtifact::new(matrix, provenance.clone());
        artifact.write(output)?;
        Ok(BetaResult {
            metric: provenance.metric.clone(),
            weighted: provenance.weighted,
            phylogenetic: provenance.phylogenetic,
            samples: matrix.len(),
            artifact_path: Some(output.to_string()),
        })
    }

    pub fn plot(
        &self,
        artifacts: &[DistanceArtifact],
        output: &Utf8Path,
    ) -> Result<PlotResult, EbdError> {
        let panels = viz::plot(artifacts, output)?;
        Ok(PlotResult {
            panels,
            samples: artifacts.first().map(|a| a.ids.len()).unwrap_or(0),
            plot_path: output.to_string(),
        })
    }

    pub fn metrics(&self) -> MetricsResult {
        MetricsResult {
            phylogenetic: metrics::phylogenetic_metrics()
                .into_iter()
                .map(str::to_string)
                .collect(),
            non_phylogenetic: metrics::non_phylogenetic_metrics()
                .into_iter()
                .map(str::to_string)
                .collect(),
        }
    }

    fn run_engine(
        &self,
        table: &AbundanceTable,
        tree: Option<&NewickTree>,
        metric: &str,
        weighted: bool,
    ) -> Result<(DistanceMatrix, ProvenanceTag), EbdError> {
        if table.is_empty() {
            return Err(EbdError::EmptyInput);
        }
        let code = engine::engine_code(metric)
            .ok_or_else(|| EbdError::UnknownMetric(metric.to_string()))?;

        let workdir = tempfile::tempdir()
            .map_err(|err| EbdError::Filesystem(format!("create temp dir: {err}")))?;

        let table_path = workdir.path().join(engine::TABLE_FILENAME);
        fs::write(&table_path, table.to_engine_tsv()?)
            .map_err(|err| EbdError::Filesystem(format!("write table: {err}")))?;

        if let Some(tree) = tree {
            let tree_path = workdir.path().join(engine::TREE_FILENAME);
            fs::write(&tree_path, format!("{}\n", tree.to_newick()))
                .map_err(|err| EbdError::Filesystem(format!("write tree: {err}")))?;
        }

        let args = engine::engine_args(code, weighted, tree.is_some());
        self.engine.run(workdir.path(), &args)?;

        let output_path = workdir.path().join(engine::OUTPUT_FILENAME);
        let output = fs::read_to_string(&output_path).map_err(|err| {
            EbdError::OutputParse(format!("read {}: {err}", engine::OUTPUT_FILENAME))
        })?;
        let matrix = DistanceMatrix::parse_diss(&output)?;

        Ok((matrix, ProvenanceTag::new(metric, weighted, tree.is_some())))
    }
}
