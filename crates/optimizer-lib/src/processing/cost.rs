//! Service-level cost aggregation over grouped billing data

use std::collections::BTreeMap;

use crate::error::{OptimizerError, Result};
use crate::models::{round_to, BillingResponse, ServiceCostRecord};

/// Metric read from each billing group
pub const COST_METRIC: &str = "UnblendedCost";

/// Default size of the top-services listing
pub const DEFAULT_TOP_SERVICES: usize = 5;

/// Analyzes one raw billing response
pub struct CostAnalyzer<'a> {
    response: &'a BillingResponse,
}

impl<'a> CostAnalyzer<'a> {
    pub fn new(response: &'a BillingResponse) -> Self {
        Self { response }
    }

    /// Per-service totals across all time buckets, most expensive first
    pub fn extract_service_costs(&self) -> Result<Vec<ServiceCostRecord>> {
        let mut line_items = Vec::new();

        for bucket in &self.response.results_by_time {
            for group in &bucket.groups {
                let service_name = group.keys.first().ok_or_else(|| {
                    OptimizerError::data_shape("billing group without a service key")
                })?;

                let metric = group.metrics.get(COST_METRIC).ok_or_else(|| {
                    OptimizerError::data_shape(format!(
                        "billing group {} has no {} metric",
                        service_name, COST_METRIC
                    ))
                })?;

                let cost_usd: f64 = metric.amount.trim().parse().map_err(|_| {
                    OptimizerError::data_shape(format!(
                        "invalid amount {:?} for {}",
                        metric.amount, service_name
                    ))
                })?;

                if !cost_usd.is_finite() || cost_usd < 0.0 {
                    return Err(OptimizerError::data_shape(format!(
                        "amount {:?} for {} is not a finite non-negative cost",
                        metric.amount, service_name
                    )));
                }

                line_items.push(ServiceCostRecord {
                    service_name: service_name.clone(),
                    cost_usd,
                });
            }
        }

        Ok(aggregate_service_costs(line_items))
    }

    /// Total across all services, rounded to 6 decimals
    pub fn get_total_cost(&self) -> Result<f64> {
        Ok(total_cost(&self.extract_service_costs()?))
    }

    /// The `top_n` most expensive services
    pub fn get_top_services(&self, top_n: usize) -> Result<Vec<ServiceCostRecord>> {
        Ok(top_services(self.extract_service_costs()?, top_n))
    }
}

/// Sum records sharing a service name and sort by cost descending.
/// Ties are ordered by service name.
pub fn aggregate_service_costs<I>(records: I) -> Vec<ServiceCostRecord>
where
    I: IntoIterator<Item = ServiceCostRecord>,
{
    let mut totals: BTreeMap<String, f64> = BTreeMap::new();
    for record in records {
        *totals.entry(record.service_name).or_insert(0.0) += record.cost_usd;
    }

    let mut table: Vec<ServiceCostRecord> = totals
        .into_iter()
        .map(|(service_name, cost_usd)| ServiceCostRecord {
            service_name,
            cost_usd,
        })
        .collect();

    // Stable sort keeps the name order from the BTreeMap for equal costs
    table.sort_by(|a, b| b.cost_usd.total_cmp(&a.cost_usd));
    table
}

/// Sum of an aggregated table, rounded to 6 decimals
pub fn total_cost(table: &[ServiceCostRecord]) -> f64 {
    round_to(table.iter().map(|r| r.cost_usd).sum(), 6)
}

/// Prefix of a sorted table, capped at its length
pub fn top_services(mut table: Vec<ServiceCostRecord>, top_n: usize) -> Vec<ServiceCostRecord> {
    table.truncate(top_n);
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BillingGroup, BillingMetric, BillingTimeBucket};
    use std::collections::HashMap;

    fn group(service: &str, amount: &str) -> BillingGroup {
        let mut metrics = HashMap::new();
        metrics.insert(
            COST_METRIC.to_string(),
            BillingMetric {
                amount: amount.to_string(),
                unit: Some("USD".to_string()),
            },
        );
        BillingGroup {
            keys: vec![service.to_string()],
            metrics,
        }
    }

    fn response(buckets: Vec<Vec<BillingGroup>>) -> BillingResponse {
        BillingResponse {
            results_by_time: buckets
                .into_iter()
                .map(|groups| BillingTimeBucket {
                    time_period: None,
                    groups,
                })
                .collect(),
        }
    }

    #[test]
    fn test_repeated_services_are_summed() {
        let raw = response(vec![vec![
            group("EC2", "10.00"),
            group("EC2", "5.00"),
            group("S3", "2.00"),
        ]]);
        let analyzer = CostAnalyzer::new(&raw);

        let table = analyzer.extract_service_costs().unwrap();
        assert_eq!(
            table,
            vec![
                ServiceCostRecord {
                    service_name: "EC2".to_string(),
                    cost_usd: 15.0
                },
                ServiceCostRecord {
                    service_name: "S3".to_string(),
                    cost_usd: 2.0
                },
            ]
        );
        assert_eq!(analyzer.get_total_cost().unwrap(), 17.0);
    }

    #[test]
    fn test_aggregates_across_time_buckets() {
        let raw = response(vec![
            vec![group("S3", "1.50"), group("EC2", "3.00")],
            vec![group("S3", "4.00")],
        ]);

        let table = CostAnalyzer::new(&raw).extract_service_costs().unwrap();
        assert_eq!(table[0].service_name, "S3");
        assert_eq!(table[0].cost_usd, 5.5);
        assert_eq!(table[1].service_name, "EC2");
    }

    #[test]
    fn test_empty_response() {
        let raw = BillingResponse::default();
        let analyzer = CostAnalyzer::new(&raw);

        assert!(analyzer.extract_service_costs().unwrap().is_empty());
        assert_eq!(analyzer.get_total_cost().unwrap(), 0.0);
        assert!(analyzer.get_top_services(DEFAULT_TOP_SERVICES).unwrap().is_empty());
    }

    #[test]
    fn test_aggregation_is_idempotent() {
        let raw = response(vec![vec![
            group("EC2", "10.00"),
            group("Lambda", "0.25"),
            group("EC2", "5.00"),
            group("S3", "2.00"),
        ]]);
        let table = CostAnalyzer::new(&raw).extract_service_costs().unwrap();

        assert_eq!(aggregate_service_costs(table.clone()), table);
    }

    #[test]
    fn test_total_rounds_to_six_decimals() {
        let raw = response(vec![vec![
            group("EC2", "0.1000001"),
            group("S3", "0.2000002"),
        ]]);
        assert_eq!(CostAnalyzer::new(&raw).get_total_cost().unwrap(), 0.3);
    }

    #[test]
    fn test_top_services_capped_at_table_length() {
        let raw = response(vec![vec![
            group("EC2", "10.00"),
            group("S3", "2.00"),
            group("RDS", "7.00"),
        ]]);
        let analyzer = CostAnalyzer::new(&raw);

        let top = analyzer.get_top_services(2).unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[1].service_name, "RDS");
        assert_eq!(analyzer.get_top_services(10).unwrap().len(), 3);
    }

    #[test]
    fn test_equal_costs_ordered_by_name() {
        let table = aggregate_service_costs(vec![
            ServiceCostRecord {
                service_name: "S3".to_string(),
                cost_usd: 1.0,
            },
            ServiceCostRecord {
                service_name: "EBS".to_string(),
                cost_usd: 1.0,
            },
        ]);
        assert_eq!(table[0].service_name, "EBS");
    }

    #[test]
    fn test_malformed_groups_are_data_shape_errors() {
        let mut missing_key = group("EC2", "1.0");
        missing_key.keys.clear();
        let raw = response(vec![vec![missing_key]]);
        assert!(matches!(
            CostAnalyzer::new(&raw).extract_service_costs(),
            Err(OptimizerError::DataShape(_))
        ));

        let raw = response(vec![vec![group("EC2", "ten dollars")]]);
        assert!(matches!(
            CostAnalyzer::new(&raw).get_total_cost(),
            Err(OptimizerError::DataShape(_))
        ));

        let mut missing_metric = group("EC2", "1.0");
        missing_metric.metrics.clear();
        let raw = response(vec![vec![missing_metric]]);
        assert!(CostAnalyzer::new(&raw).extract_service_costs().is_err());
    }

    #[test]
    fn test_non_finite_and_negative_amounts_are_data_shape_errors() {
        for amount in ["NaN", "inf", "-inf", "-40.00"] {
            let raw = response(vec![vec![group("EC2", amount), group("S3", "250.00")]]);
            let analyzer = CostAnalyzer::new(&raw);

            assert!(
                matches!(
                    analyzer.extract_service_costs(),
                    Err(OptimizerError::DataShape(_))
                ),
                "amount {:?} should be rejected",
                amount
            );
            assert!(analyzer.get_total_cost().is_err());
        }
    }

    #[test]
    fn test_zero_amounts_are_kept() {
        let raw = response(vec![vec![group("EC2", "0.00"), group("S3", "-0.00")]]);
        let table = CostAnalyzer::new(&raw).extract_service_costs().unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(total_cost(&table), 0.0);
    }
}
