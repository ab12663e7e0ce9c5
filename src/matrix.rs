use ndarray::Array2;

use crate::error::EbdError;

#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    ids: Vec<String>,
    data: Array2<f64>,
}

impl DistanceMatrix {
    pub fn from_square(ids: Vec<String>, data: Array2<f64>) -> Result<Self, EbdError> {
        let n = ids.len();
        if data.nrows() != n || data.ncols() != n {
            return Err(EbdError::InvalidMatrix(format!(
                "matrix is {}x{} but {n} sample ids were given",
                data.nrows(),
                data.ncols()
            )));
        }
        for i in 0..n {
            if data[[i, i]] != 0.0 {
                return Err(EbdError::InvalidMatrix(format!(
                    "non-zero diagonal at {}",
                    ids[i]
                )));
            }
            for j in 0..i {
                if data[[i, j]] != data[[j, i]] {
                    return Err(EbdError::InvalidMatrix(format!(
                        "asymmetry between {} and {}",
                        ids[i], ids[j]
                    )));
                }
            }
        }
        Ok(Self { ids, data })
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[[i, j]]
    }

    pub fn data(&self) -> &Array2<f64> {
        &self.data
    }

    pub fn parse_diss(text: &str) -> Result<Self, EbdError> {
        let mut lines = text.lines();
        let count_line = lines
            .next()
            .ok_or_else(|| EbdError::OutputParse("empty output".to_string()))?;
        let n: usize = count_line
            .trim()
            .parse()
            .map_err(|_| EbdError::OutputParse(format!("invalid sample count {count_line:?}")))?;

        let mut data = Array2::<f64>::zeros((n, n));
        let mut ids = Vec::with_capacity(n);
        for (i, line) in lines.filter(|line| !line.trim().is_empty()).enumerate() {
            if i >= n {
                return Err(EbdError::OutputParse(format!(
                    "more than {n} sample rows in output"
                )));
            }
            let mut cells = line.split('\t');
            let id = cells.next().unwrap_or_default().trim();
            if id.is_empty() {
                return Err(EbdError::OutputParse(format!("row {i} has no sample id")));
            }
            ids.push(id.to_string());
            for (j, cell) in cells.enumerate() {
                if j >= n {
                    return Err(EbdError::OutputParse(format!(
                        "row {id} has more than {n} distance values"
                    )));
                }
                let value: f64 = cell.trim().parse().map_err(|_| {
                    EbdError::OutputParse(format!("invalid distance {cell:?} in row {id}"))
                })?;
                data[[i, j]] = value;
                data[[j, i]] = value;
            }
        }
        if ids.len() != n {
            return Err(EbdError::OutputParse(format!(
                "expected {n} sample rows, found {}",
                ids.len()
            )));
        }

        Ok(Self { ids, data })
    }
}
