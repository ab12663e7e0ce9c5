use std::collections::{HashMap, HashSet};

use crate::error::EbdError;

#[derive(Debug, Clone, Default)]
pub struct AbundanceTable {
    sample_ids: Vec<String>,
    feature_ids: Vec<String>,
    counts: HashMap<(usize, usize), f64>,
}

impl AbundanceTable {
    pub fn new(sample_ids: Vec<String>, feature_ids: Vec<String>) -> Result<Self, EbdError> {
        ensure_unique(&sample_ids, "sample")?;
        ensure_unique(&feature_ids, "feature")?;
        Ok(Self {
            sample_ids,
            feature_ids,
            counts: HashMap::new(),
        })
    }

    pub fn sample_ids(&self) -> &[String] {
        &self.sample_ids
    }

    pub fn feature_ids(&self) -> &[String] {
        &self.feature_ids
    }

    pub fn is_empty(&self) -> bool {
        self.sample_ids.is_empty() || self.feature_ids.is_empty()
    }

    pub fn set(&mut self, sample: &str, feature: &str, value: f64) -> Result<(), EbdError> {
        let row = self
            .sample_index(sample)
            .ok_or_else(|| EbdError::InvalidTable(format!("unknown sample id: {sample}")))?;
        let col = self
            .feature_index(feature)
            .ok_or_else(|| EbdError::InvalidTable(format!("unknown feature id: {feature}")))?;
        if value == 0.0 {
            self.counts.remove(&(row, col));
        } else {
            self.counts.insert((row, col), value);
        }
        Ok(())
    }

    pub fn get(&self, sample: &str, feature: &str) -> f64 {
        match (self.sample_index(sample), self.feature_index(feature)) {
            (Some(row), Some(col)) => self.counts.get(&(row, col)).copied().unwrap_or(0.0),
            _ => 0.0,
        }
    }

    fn sample_index(&self, sample: &str) -> Option<usize> {
        self.sample_ids.iter().position(|id| id == sample)
    }

    fn feature_index(&self, feature: &str) -> Option<usize> {
        self.feature_ids.iter().position(|id| id == feature)
    }

    fn row(&self, row: usize) -> Vec<f64> {
        (0..self.feature_ids.len())
            .map(|col| self.counts.get(&(row, col)).copied().unwrap_or(0.0))
            .collect()
    }

    pub fn to_engine_tsv(&self) -> Result<String, EbdError> {
        if self.is_empty() {
            return Err(EbdError::EmptyInput);
        }

        let mut out = String::new();
        out.push('\t');
        out.push_str(&self.feature_ids.join("\t"));
        for (row, sample_id) in self.sample_ids.iter().enumerate() {
            out.push('\n');
            out.push_str(sample_id);
            for value in self.row(row) {
                out.push('\t');
                out.push_str(&format_count(value));
            }
        }
        out.push('\n');
        Ok(out)
    }

    pub fn parse_tsv(text: &str) -> Result<Self, EbdError> {
        let mut lines = text.lines();
        let header = lines
            .next()
            .ok_or_else(|| EbdError::InvalidTable("missing header row".to_string()))?;
        let mut header_cells = header.split('\t');
        let leading = header_cells.next().unwrap_or_default();
        if !leading.is_empty() {
            return Err(EbdError::InvalidTable(
                "header row must start with an empty cell".to_string(),
            ));
        }
        let feature_ids: Vec<String> = header_cells.map(|cell| cell.to_string()).collect();
        if feature_ids.is_empty() || feature_ids.iter().any(|id| id.is_empty()) {
            return Err(EbdError::InvalidTable(
                "header row must list feature ids".to_string(),
            ));
        }

        let mut sample_ids = Vec::new();
        let mut rows = Vec::new();
        for line in lines {
            if line.is_empty() {
                continue;
            }
            let mut cells = line.split('\t');
            let sample_id = cells.next().unwrap_or_default();
            if sample_id.is_empty() {
                return Err(EbdError::InvalidTable("row without a sample id".to_string()));
            }
            let values = cells
                .map(|cell| {
                    cell.parse::<f64>().map_err(|_| {
                        EbdError::InvalidTable(format!(
                            "non-numeric value {cell:?} in row {sample_id}"
                        ))
                    })
                })
                .collect::<Result<Vec<f64>, EbdError>>()?;
            if values.len() != feature_ids.len() {
                return Err(EbdError::InvalidTable(format!(
                    "row {sample_id} has {} values, expected {}",
                    values.len(),
                    feature_ids.len()
                )));
            }
            sample_ids.push(sample_id.to_string());
            rows.push(values);
        }
        if sample_ids.is_empty() {
            return Err(EbdError::InvalidTable("no sample rows".to_string()));
        }

        let mut table = Self::new(sample_ids, feature_ids)?;
        for (row, values) in rows.into_iter().enumerate() {
            for (col, value) in values.into_iter().enumerate() {
                if value != 0.0 {
                    table.counts.insert((row, col), value);
                }
            }
        }
        Ok(table)
    }
}

fn ensure_unique(ids: &[String], axis: &str) -> Result<(), EbdError> {
    let mut seen = HashSet::new();
    for id in ids {
        if id.is_empty() {
            return Err(EbdError::InvalidTable(format!("empty {axis} id")));
        }
        if !seen.insert(id.as_str()) {
            return Err(EbdError::InvalidTable(format!("duplicate {axis} id: {id}")));
        }
    }
    Ok(())
}

fn format_count(value: f64) -> String {
    if value == value.trunc() && value.abs() < 1e15 {
        format!("{:.1}", value)
    } else {
        format!("{value}")
    }
}
