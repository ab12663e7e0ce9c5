use std::fs;

use camino::Utf8Path;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::error::EbdError;
use crate::matrix::DistanceMatrix;
use crate::provenance::ProvenanceTag;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistanceArtifact {
    pub provenance: ProvenanceTag,
    pub ids: Vec<String>,
    pub distances: Vec<Vec<f64>>,
}

impl DistanceArtifact {
    pub fn new(matrix: &DistanceMatrix, provenance: ProvenanceTag) -> Self {
        let n = matrix.len();
        let distances = (0..n)
            .map(|i| (0..n).map(|j| matrix.get(i, j)).collect())
            .collect();
        Self {
            provenance,
            ids: matrix.ids().to_vec(),
            distances,
        }
    }

    pub fn matrix(&self) -> Result<DistanceMatrix, EbdError> {
        let n = self.ids.len();
        if self.distances.len() != n || self.distances.iter().any(|row| row.len() != n) {
            return Err(EbdError::InvalidMatrix(format!(
                "artifact rows do not form an {n}x{n} matrix"
            )));
        }
        let mut data = Array2::<f64>::zeros((n, n));
        for (i, row) in self.distances.iter().enumerate() {
            for (j, value) in row.iter().enumerate() {
                data[[i, j]] = *value;
            }
        }
        DistanceMatrix::from_square(self.ids.clone(), data)
    }

    pub fn write(&self, path: &Utf8Path) -> Result<(), EbdError> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|err| EbdError::Filesystem(err.to_string()))?;
        fs::write(path, json).map_err(|err| {
            EbdError::Filesystem(format!("write artifact {}: {err}", path))
        })?;
        tracing::debug!(path = %path, "wrote distance matrix artifact");
        Ok(())
    }

    pub fn read(path: &Utf8Path) -> Result<Self, EbdError> {
        let text = fs::read_to_string(path).map_err(|err| EbdError::Artifact {
            path: path.as_std_path().to_path_buf(),
            message: err.to_string(),
        })?;
        serde_json::from_str(&text).map_err(|err| EbdError::Artifact {
            path: path.as_std_path().to_path_buf(),
            message: err.to_string(),
        })
    }
}
