use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvenanceTag {
    pub metric: String,
    pub weighted: bool,
    pub phylogenetic: bool,
    pub created_at: DateTime<Utc>,
}

impl ProvenanceTag {
    pub fn new(metric: &str, weighted: bool, phylogenetic: bool) -> Self {
        Self {
            metric: metric.to_string(),
            weighted,
            phylogenetic,
            created_at: Utc::now(),
        }
    }

    pub fn label(&self) -> String {
        if self.weighted {
            format!("{} (weighted)", self.metric)
        } else {
            self.metric.clone()
        }
    }
}

impl fmt::Display for ProvenanceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_includes_weighting() {
        let tag = ProvenanceTag::new("braycurtis", false, false);
        assert_eq!(tag.label(), "braycurtis");

        let tag = ProvenanceTag::new("jaccard", true, true);
        assert_eq!(tag.label(), "jaccard (weighted)");
        assert!(tag.phylogenetic);
    }
}
