//! A/B comparison of two k6 result documents
//!
//! Extracts the metrics we care about from both sides, pairs them up and assembles the three
//! comparison figures.

use tracing as trc;

use crate::{
    chart::{
        palette, BarChart, BarSeries, Figure, Fill, LegendPosition, NumberFormat, Rgb,
        ValueLabels,
    },
    k6::{stat, ResultDocument},
};

pub static LATENCY_FILE: &str = "p95-latency-comparison.png";
pub static THROUGHPUT_FILE: &str = "throughput-comparison.png";
pub static ERROR_RATE_FILE: &str = "error-rate-comparison.png";

/// Operations compared in the latency chart, as (metric, display name)
pub static LATENCY_METRICS: &[(&str, &str)] = &[
    ("http_req_duration", "HTTP Overall"),
    ("order_create_duration", "Order Create"),
    ("stock_reserve_duration", "Stock Reserve"),
    ("customer_create_duration", "Customer Create"),
];

/// Rate metrics compared in the throughput chart, as (metric, title, unit)
pub static THROUGHPUT_METRICS: &[(&str, &str, &str)] = &[
    ("iterations", "Iterations per Second", "iter/s"),
    ("http_reqs", "HTTP Requests per Second", "req/s"),
];

/// Failure ratios compared in the error rate chart, as (metric, display name)
pub static ERROR_METRICS: &[(&str, &str)] = &[
    ("http_req_failed", "HTTP Failures"),
    ("mixed_workload_errors", "Mixed Workload Errors"),
];

/// One side of the comparison
#[derive(Clone, Debug)]
pub struct Variant {
    pub label: String,
    pub results: ResultDocument,
}

impl Variant {
    pub fn new(label: impl Into<String>, results: ResultDocument) -> Self {
        Variant {
            label: label.into(),
            results,
        }
    }
}

/// A single metric stat looked up on both sides
#[derive(Clone, Debug, PartialEq)]
pub struct Comparison {
    pub metric: &'static str,
    pub stat: &'static str,
    pub a: Option<f64>,
    pub b: Option<f64>,
}

impl Comparison {
    pub fn of(a: &Variant, b: &Variant, metric: &'static str, stat: &'static str) -> Self {
        Comparison {
            metric,
            stat,
            a: a.results.value(metric, stat),
            b: b.results.value(metric, stat),
        }
    }

    /// Whether either side reported the metric
    pub fn is_present(&self) -> bool {
        self.a.is_some() || self.b.is_some()
    }

    /// Values to draw, with missing sides shown as zero
    pub fn display(&self) -> (f64, f64) {
        (self.a.unwrap_or(0.), self.b.unwrap_or(0.))
    }

    /// Change from A to B in percent
    pub fn change_pct(&self) -> Option<f64> {
        percent_change(self.a?, self.b?)
    }
}

/// Relative change from `base` to `value` in percent, `None` if `base` is zero
pub fn percent_change(base: f64, value: f64) -> Option<f64> {
    if base == 0. {
        None
    } else {
        Some((value - base) / base * 100.)
    }
}

/// `part` as a percentage of `whole`, `None` if `whole` is zero
pub fn percent_of(part: f64, whole: f64) -> Option<f64> {
    if whole == 0. {
        None
    } else {
        Some(part / whole * 100.)
    }
}

/// Every metric stat that ends up in one of the charts
pub fn comparisons(a: &Variant, b: &Variant) -> Vec<Comparison> {
    let latency = LATENCY_METRICS
        .iter()
        .map(|&(metric, _)| Comparison::of(a, b, metric, stat::P95));
    let throughput = THROUGHPUT_METRICS
        .iter()
        .map(|&(metric, _, _)| Comparison::of(a, b, metric, stat::RATE));
    let errors = ERROR_METRICS
        .iter()
        .map(|&(metric, _)| Comparison::of(a, b, metric, stat::RATE));

    latency.chain(throughput).chain(errors).collect()
}

/// Log a line per comparison
pub fn log_summary(a: &Variant, b: &Variant) {
    for comparison in comparisons(a, b) {
        let (value_a, value_b) = comparison.display();
        let change = comparison
            .change_pct()
            .map(|pct| format!("{:+.1}%", pct))
            .unwrap_or_else(|| "n/a".to_string());

        trc::info!(
            metric = comparison.metric,
            stat = comparison.stat,
            "{}: {:.2} vs {}: {:.2} ({})",
            a.label,
            value_a,
            b.label,
            value_b,
            change
        );
    }
}

fn variant_series(label: &str, color: Rgb, values: Vec<f64>) -> BarSeries {
    BarSeries {
        label: label.to_string(),
        fill: Fill::Solid(color),
        values,
    }
}

/// P95 latency per operation, `None` if neither side reported any of them
pub fn latency_figure(a: &Variant, b: &Variant) -> Option<Figure> {
    let mut categories = Vec::new();
    let mut values_a = Vec::new();
    let mut values_b = Vec::new();

    for &(metric, display_name) in LATENCY_METRICS {
        let comparison = Comparison::of(a, b, metric, stat::P95);
        if !comparison.is_present() {
            trc::debug!(metric, "Metric missing on both sides, leaving it out");
            continue;
        }

        let (value_a, value_b) = comparison.display();
        categories.push(display_name.to_string());
        values_a.push(value_a);
        values_b.push(value_b);
    }

    if categories.is_empty() {
        return None;
    }

    let mut chart = BarChart::new("P95 Latency Comparison", "Latency (ms)");
    chart.categories = categories;
    chart.series = vec![
        variant_series(&a.label, palette::VARIANT_A, values_a),
        variant_series(&b.label, palette::VARIANT_B, values_b),
    ];
    chart.value_labels = ValueLabels::Shown {
        format: NumberFormat::Fixed(1),
        skip_zero: true,
    };
    chart.legend = Some(LegendPosition::UpperRight);

    Some(Figure::new(LATENCY_FILE, (1500, 900)).with_panel(chart))
}

/// Iterations and HTTP requests per second, one panel each
pub fn throughput_figure(a: &Variant, b: &Variant) -> Figure {
    THROUGHPUT_METRICS.iter().fold(
        Figure::new(THROUGHPUT_FILE, (1500, 750)),
        |figure, &(metric, title, unit)| {
            let (value_a, value_b) = Comparison::of(a, b, metric, stat::RATE).display();

            let mut chart = BarChart::new(title, unit);
            chart.categories = vec![a.label.clone(), b.label.clone()];
            chart.series = vec![BarSeries {
                label: unit.to_string(),
                fill: Fill::PerBar(vec![palette::VARIANT_A, palette::VARIANT_B]),
                values: vec![value_a, value_b],
            }];
            chart.bar_width = 0.6;
            chart.value_labels = ValueLabels::Shown {
                format: NumberFormat::Fixed(1),
                skip_zero: false,
            };

            figure.with_panel(chart)
        },
    )
}

/// Failure ratios as percentages
pub fn error_rate_figure(a: &Variant, b: &Variant) -> Figure {
    let (values_a, values_b): (Vec<f64>, Vec<f64>) = ERROR_METRICS
        .iter()
        .map(|&(metric, _)| {
            let (value_a, value_b) = Comparison::of(a, b, metric, stat::RATE).display();
            (value_a * 100., value_b * 100.)
        })
        .unzip();

    let mut chart = BarChart::new("Error Rate Comparison", "Error Rate (%)");
    chart.categories = ERROR_METRICS
        .iter()
        .map(|(_, name)| name.to_string())
        .collect();
    chart.series = vec![
        variant_series(&a.label, palette::VARIANT_A, values_a),
        variant_series(&b.label, palette::VARIANT_B, values_b),
    ];
    chart.y_format = NumberFormat::Percent(1);
    chart.value_labels = ValueLabels::Shown {
        format: NumberFormat::Percent(1),
        skip_zero: true,
    };
    chart.legend = Some(LegendPosition::UpperRight);

    Figure::new(ERROR_RATE_FILE, (1200, 750)).with_panel(chart)
}

/// All comparison figures, in output order
pub fn figures(a: &Variant, b: &Variant) -> Vec<Figure> {
    let mut figures = Vec::with_capacity(3);

    match latency_figure(a, b) {
        Some(figure) => figures.push(figure),
        None => trc::warn!("No latency metrics in either result file, skipping the latency chart"),
    }
    figures.push(throughput_figure(a, b));
    figures.push(error_rate_figure(a, b));

    figures
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::Panel;
    use pretty_assertions::assert_eq;

    fn variant(label: &str, json: &str) -> Variant {
        Variant::new(label, serde_json::from_str(json).unwrap())
    }

    fn baseline() -> Variant {
        variant(
            "Baseline",
            r#"{ "metrics": {
                "http_req_duration": { "values": { "p(95)": 31.92 } },
                "order_create_duration": { "values": { "p(95)": 34.5 } },
                "stock_reserve_duration": { "values": { "p(95)": 12.0 } },
                "customer_create_duration": { "values": { "p(95)": 9.5 } },
                "iterations": { "values": { "rate": 49.6 } },
                "http_reqs": { "values": { "rate": 148.8 } },
                "http_req_failed": { "values": { "rate": 0.0 } },
                "mixed_workload_errors": { "values": { "rate": 0.25 } }
            } }"#,
        )
    }

    fn clustered() -> Variant {
        variant(
            "Clustered",
            r#"{ "metrics": {
                "http_req_duration": { "values": { "p(95)": 38.77 } },
                "stock_reserve_duration": { "values": { "p(95)": 14.0 } },
                "iterations": { "values": { "rate": 49.1 } },
                "http_req_failed": { "values": { "rate": 0.125 } }
            } }"#,
        )
    }

    fn bars(figure: &Figure, panel: usize) -> &BarChart {
        match &figure.panels[panel] {
            Panel::Bars(chart) => chart,
            Panel::Lines(_) => panic!("expected a bar chart"),
        }
    }

    #[test]
    fn percentages() {
        assert_eq!(percent_change(0., 10.), None);
        assert_eq!(percent_change(50., 75.), Some(50.));
        assert_eq!(percent_change(200., 100.), Some(-50.));
        assert_eq!(percent_of(821., 0.), None);
        assert_eq!(percent_of(512., 1024.), Some(50.));
    }

    #[test]
    fn comparison_substitutes_zero_for_missing_side() {
        let comparison = Comparison::of(&baseline(), &clustered(), "order_create_duration", stat::P95);

        assert_eq!(comparison.a, Some(34.5));
        assert_eq!(comparison.b, None);
        assert!(comparison.is_present());
        assert_eq!(comparison.display(), (34.5, 0.));
        assert_eq!(comparison.change_pct(), None);
    }

    #[test]
    fn comparison_reports_change() {
        let comparison = Comparison::of(&baseline(), &clustered(), "stock_reserve_duration", stat::P95);
        let change = comparison.change_pct().unwrap();
        assert!((change - 16.666).abs() < 0.01);
    }

    #[test]
    fn every_charted_metric_is_compared() {
        let comparisons = comparisons(&baseline(), &clustered());
        assert_eq!(comparisons.len(), 8);
        assert_eq!(comparisons[0].metric, "http_req_duration");
        assert_eq!(comparisons[7].metric, "mixed_workload_errors");
    }

    #[test]
    fn three_figures_with_fixed_names() {
        let names: Vec<_> = figures(&baseline(), &clustered())
            .into_iter()
            .map(|f| f.file_name)
            .collect();

        assert_eq!(names, vec![LATENCY_FILE, THROUGHPUT_FILE, ERROR_RATE_FILE]);
    }

    #[test]
    fn latency_keeps_categories_reported_on_one_side() {
        let figure = latency_figure(&baseline(), &clustered()).unwrap();
        let chart = bars(&figure, 0);

        assert_eq!(chart.categories.len(), 4);
        assert_eq!(chart.series[0].label, "Baseline");
        assert_eq!(chart.series[0].values, vec![31.92, 34.5, 12.0, 9.5]);
        assert_eq!(chart.series[1].values, vec![38.77, 0., 14.0, 0.]);
        assert_eq!(chart.legend, Some(LegendPosition::UpperRight));
    }

    #[test]
    fn latency_drops_categories_missing_on_both_sides() {
        let figure = latency_figure(&clustered(), &clustered()).unwrap();
        assert_eq!(
            bars(&figure, 0).categories,
            vec!["HTTP Overall", "Stock Reserve"]
        );
    }

    #[test]
    fn latency_is_skipped_without_any_latency_metric() {
        let empty = variant("Empty", "{}");
        assert!(latency_figure(&empty, &empty).is_none());

        let names: Vec<_> = figures(&empty, &empty)
            .into_iter()
            .map(|f| f.file_name)
            .collect();
        assert_eq!(names, vec![THROUGHPUT_FILE, ERROR_RATE_FILE]);
    }

    #[test]
    fn throughput_has_a_panel_per_rate() {
        let figure = throughput_figure(&baseline(), &clustered());

        assert_eq!(figure.panels.len(), 2);
        let iterations = bars(&figure, 0);
        assert_eq!(iterations.categories, vec!["Baseline", "Clustered"]);
        assert_eq!(iterations.series[0].values, vec![49.6, 49.1]);

        let http = bars(&figure, 1);
        assert_eq!(http.y_desc, "req/s");
        assert_eq!(http.series[0].values, vec![148.8, 0.]);
        assert_eq!(http.value_labels().len(), 2);
    }

    #[test]
    fn error_rates_are_percentages() {
        let figure = error_rate_figure(&baseline(), &clustered());
        let chart = bars(&figure, 0);

        assert_eq!(chart.series[0].values, vec![0., 25.]);
        assert_eq!(chart.series[1].values, vec![12.5, 0.]);

        let labels: Vec<_> = chart.value_labels().into_iter().map(|(_, t)| t).collect();
        assert_eq!(labels, vec!["25.0%", "12.5%"]);
    }
}
