use std::collections::BTreeSet;

use crate::error::EbdError;

pub const PHYLOGENETIC_METRICS: &[&str] = &[
    "braycurtis",
    "canberra",
    "chi_squared",
    "coeff_similarity",
    "complete_tree",
    "euclidean",
    "gower",
    "hellinger",
    "jaccard",
    "kulczynski",
    "lennon",
    "manhattan",
    "mnnd",
    "morisita_horn",
    "mpd",
    "normalized_weighted_unifrac",
    "p_st",
    "pearson",
    "raohp",
    "ruzicka",
    "soergel",
    "sorensen",
    "tamas_coeff",
    "unweighted_unifrac",
    "weighted_corr",
    "weighted_unifrac",
    "whittaker",
    "yue_clayton",
];

pub const NON_PHYLOGENETIC_METRICS: &[&str] = &[
    "braycurtis",
    "canberra",
    "chi_squared",
    "coeff_similarity",
    "euclidean",
    "f_st",
    "gower",
    "hellinger",
    "jaccard",
    "kulczynski",
    "lennon",
    "manhattan",
    "morisita_horn",
    "pearson",
    "raohp",
    "ruzicka",
    "soergel",
    "sorensen",
    "tamas_coeff",
    "weighted_corr",
    "whittaker",
    "yue_clayton",
];

pub fn phylogenetic_metrics() -> BTreeSet<&'static str> {
    PHYLOGENETIC_METRICS.iter().copied().collect()
}

pub fn non_phylogenetic_metrics() -> BTreeSet<&'static str> {
    NON_PHYLOGENETIC_METRICS.iter().copied().collect()
}

pub fn all_metrics() -> BTreeSet<&'static str> {
    let mut metrics = phylogenetic_metrics();
    metrics.extend(non_phylogenetic_metrics());
    metrics
}

pub fn validate_phylogenetic(metric: &str) -> Result<(), EbdError> {
    if PHYLOGENETIC_METRICS.contains(&metric) {
        Ok(())
    } else {
        Err(EbdError::UnknownPhylogeneticMetric(metric.to_string()))
    }
}

pub fn validate_non_phylogenetic(metric: &str) -> Result<(), EbdError> {
    if NON_PHYLOGENETIC_METRICS.contains(&metric) {
        Ok(())
    } else {
        Err(EbdError::UnknownMetric(metric.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn vocabularies_are_disjoint_but_overlapping() {
        let phylo = phylogenetic_metrics();
        let non_phylo = non_phylogenetic_metrics();

        assert!(phylo.contains("braycurtis"));
        assert!(non_phylo.contains("braycurtis"));
        assert!(phylo.contains("unweighted_unifrac"));
        assert!(!non_phylo.contains("unweighted_unifrac"));
        assert!(non_phylo.contains("f_st"));
        assert!(!phylo.contains("f_st"));
    }

    #[test]
    fn union_covers_both_vocabularies() {
        let all = all_metrics();
        for metric in PHYLOGENETIC_METRICS {
            assert!(all.contains(metric));
        }
        for metric in NON_PHYLOGENETIC_METRICS {
            assert!(all.contains(metric));
        }
        assert_eq!(all.len(), 29);
    }

    #[test]
    fn validate_accepts_every_vocabulary_member() {
        for metric in PHYLOGENETIC_METRICS {
            validate_phylogenetic(metric).unwrap();
        }
        for metric in NON_PHYLOGENETIC_METRICS {
            validate_non_phylogenetic(metric).unwrap();
        }
    }

    #[test]
    fn validate_rejects_outsiders() {
        let err = validate_phylogenetic("f_st").unwrap_err();
        assert_matches!(err, EbdError::UnknownPhylogeneticMetric(_));

        let err = validate_non_phylogenetic("complete_tree").unwrap_err();
        assert_matches!(err, EbdError::UnknownMetric(_));

        let err = validate_non_phylogenetic("unifrac").unwrap_err();
        assert_matches!(err, EbdError::UnknownMetric(_));
    }
}
