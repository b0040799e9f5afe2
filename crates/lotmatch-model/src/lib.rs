pub mod candidate;
pub mod cell;
pub mod mapping;
pub mod production;
pub mod report;
pub mod spec;

pub use candidate::{
    CandidateMatch, ParameterDetail, ParameterStatus, SpecificationEvaluation, TypeMatch,
};
pub use cell::{CellValue, format_numeric, parse_f64};
pub use mapping::{ColumnMapping, MatchStrategy, ResolutionStats, ResolvedColumn};
pub use production::{ImputationMask, ProductionRecord};
pub use report::{LotReport, MatchReport, ParameterAcceptance, ReadingSummary};
pub use spec::{ClientSpecification, Family, ParameterKind, ParameterSpec, SpecDatabase};

#[cfg(test)]
mod tests {
    use super::*;

    fn parameter(name: &str, min: f64, max: f64) -> ParameterSpec {
        ParameterSpec {
            name: name.to_string(),
            normalized_name: name.to_lowercase(),
            min,
            max,
            kind: ParameterKind::Other,
            frequency: None,
        }
    }

    #[test]
    fn parameter_range_is_inclusive() {
        let spec = parameter("Bulk density", 10.0, 20.0);
        assert!(spec.accepts(10.0));
        assert!(spec.accepts(20.0));
        assert!(!spec.accepts(9.99));
        assert!(!spec.accepts(20.01));
        assert_eq!(spec.range_label(), "10 - 20");
    }

    #[test]
    fn type_match_orders_by_strength() {
        assert!(TypeMatch::Direct > TypeMatch::Synonym);
        assert!(TypeMatch::Synonym > TypeMatch::None);
        assert_eq!(TypeMatch::Direct.level(), 2);
    }

    #[test]
    fn mapping_stats_count_strategies() {
        let mut mapping = ColumnMapping::new();
        mapping.insert(
            "S1",
            "Moisture",
            Some(ResolvedColumn {
                column: "Moisture".to_string(),
                strategy: MatchStrategy::Exact,
            }),
        );
        mapping.insert("S1", "Ash", None);
        let stats = mapping.stats();
        assert_eq!(stats.resolved(), 1);
        assert_eq!(stats.unresolved, 1);
        assert_eq!(mapping.get("S1", "Moisture").map(|c| c.column.as_str()), Some("Moisture"));
        assert!(mapping.get("S1", "Ash").is_none());
    }

    #[test]
    fn report_serializes() {
        let report = MatchReport {
            source_label: "Flakes GF".to_string(),
            specification_count: 0,
            records_considered: 0,
            imputed_cells: 0,
            resolution: ResolutionStats::default(),
            lots: vec![],
        };
        let json = serde_json::to_string(&report).expect("serialize report");
        let round: MatchReport = serde_json::from_str(&json).expect("deserialize report");
        assert_eq!(round.source_label, "Flakes GF");
    }
}
