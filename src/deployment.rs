//! Deployment tier comparison charts
//!
//! The numbers are the published results of the deployment comparison runs and are compiled in.
//! Every chart builder is independent of the others.

use crate::{
    chart::{
        palette, Band, BarChart, BarNote, BarSeries, Callout, Figure, Fill, Guide, LegendPosition,
        LineChart, LineSeries, Marker, NumberFormat, Rgb, Scale, ValueLabels,
    },
    compare::{percent_change, percent_of},
};

/// A deployment configuration under test
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tier {
    Local,
    Small,
    Medium,
    Large,
}

impl Tier {
    pub const ALL: [Tier; 4] = [Tier::Local, Tier::Small, Tier::Medium, Tier::Large];

    pub fn label(self) -> &'static str {
        match self {
            Tier::Local => "Local",
            Tier::Small => "AWS Small",
            Tier::Medium => "AWS Medium",
            Tier::Large => "AWS Large",
        }
    }

    pub fn color(self) -> Rgb {
        match self {
            Tier::Local => palette::LOCAL,
            Tier::Small => palette::SMALL,
            Tier::Medium => palette::MEDIUM,
            Tier::Large => palette::LARGE,
        }
    }

    pub fn marker(self) -> Marker {
        match self {
            Tier::Local => Marker::Circle,
            Tier::Small => Marker::Square,
            Tier::Medium => Marker::Diamond,
            Tier::Large => Marker::Triangle,
        }
    }
}

/// Measurements of one tier across the target TPS levels it was tested at
#[derive(Clone, Copy, Debug)]
pub struct TierSeries {
    pub tier: Tier,
    pub tps: &'static [f64],
    pub values: &'static [f64],
}

impl TierSeries {
    pub fn points(&self) -> Vec<(f64, f64)> {
        self.tps.iter().copied().zip(self.values.iter().copied()).collect()
    }

    fn line(&self) -> LineSeries {
        LineSeries {
            label: self.tier.label().to_string(),
            color: self.tier.color(),
            marker: Some(self.tier.marker()),
            dashed: false,
            points: self.points(),
        }
    }
}

const fn series(tier: Tier, tps: &'static [f64], values: &'static [f64]) -> TierSeries {
    TierSeries { tier, tps, values }
}

const TPS_LOCAL: &[f64] = &[10., 25., 50.];
const TPS_SMALL: &[f64] = &[10., 25., 50., 100.];
const TPS_MEDIUM: &[f64] = &[10., 25., 50., 100., 200.];
const TPS_LARGE: &[f64] = &[10., 25., 50., 100., 200., 500.];

/// Achieved iterations per second
pub static THROUGHPUT: [TierSeries; 4] = [
    series(Tier::Local, TPS_LOCAL, &[9.97, 24.95, 49.89]),
    series(Tier::Small, TPS_SMALL, &[9.96, 24.87, 49.64, 99.16]),
    series(Tier::Medium, TPS_MEDIUM, &[9.95, 24.89, 48.86, 94.12, 187.75]),
    series(Tier::Large, TPS_LARGE, &[9.59, 24.02, 47.24, 94.59, 185.50, 274.07]),
];

/// HTTP request duration p95 in ms, all endpoints
pub static HTTP_P95: [TierSeries; 4] = [
    series(Tier::Local, TPS_LOCAL, &[66.01, 21.28, 19.50]),
    series(Tier::Small, TPS_SMALL, &[742.82, 311.57, 141.03, 125.47]),
    series(Tier::Medium, TPS_MEDIUM, &[132.74, 107.16, 87.60, 87.27, 99.05]),
    series(Tier::Large, TPS_LARGE, &[114.21, 73.65, 68.11, 105.22, 144.85, 161.87]),
];

/// Order create duration p95 in ms
pub static ORDER_P95: [TierSeries; 4] = [
    series(Tier::Local, TPS_LOCAL, &[91.48, 21.23, 19.58]),
    series(Tier::Small, TPS_SMALL, &[809.72, 308.63, 141.48, 129.69]),
    series(Tier::Medium, TPS_MEDIUM, &[129.24, 87.82, 85.95, 93.87, 106.77]),
    series(Tier::Large, TPS_LARGE, &[115.30, 82.36, 73.73, 115.19, 154.28, 169.49]),
];

/// Cost per 10K transactions at the highest TPS each cloud tier was tested at
pub static COST_PER_10K: [(&str, Tier, f64); 3] = [
    ("AWS Small (100 TPS)", Tier::Small, 0.021),
    ("AWS Medium (200 TPS)", Tier::Medium, 0.016),
    ("AWS Large (274 iter/s)", Tier::Large, 0.036),
];

/// Latency in ms without clustering and with the clustered store, at 50 TPS
pub struct ClusterOverhead {
    pub metrics: [&'static str; 6],
    pub baseline: [f64; 6],
    pub clustered: [f64; 6],
}

pub static CLUSTER_OVERHEAD: ClusterOverhead = ClusterOverhead {
    metrics: [
        "HTTP p50",
        "HTTP p95",
        "Order p50",
        "Order p95",
        "Saga E2E p50",
        "Saga E2E p95",
    ],
    baseline: [16.46, 31.92, 16.81, 34.50, 219.00, 238.40],
    clustered: [16.39, 38.77, 16.74, 46.89, 220.00, 268.35],
};

/// Resident memory in MiB over a 30 minute run at 50 TPS
pub struct SustainedMemory {
    pub services: [&'static str; 4],
    pub start_mib: [f64; 4],
    pub end_mib: [f64; 4],
    pub limit_mib: [f64; 4],
}

pub static SUSTAINED_MEMORY: SustainedMemory = SustainedMemory {
    services: [
        "order-service",
        "inventory-service",
        "payment-service",
        "account-service",
    ],
    start_mib: [566., 528., 485., 572.],
    end_mib: [1114., 821., 782., 681.],
    limit_mib: [1536., 1024., 1024., 1024.],
};

pub static THROUGHPUT_FILE: &str = "throughput-scaling.png";
pub static LATENCY_FILE: &str = "latency-by-tier.png";
pub static COST_FILE: &str = "cost-efficiency.png";
pub static CLUSTER_OVERHEAD_FILE: &str = "cas-overhead.png";
pub static MEMORY_FILE: &str = "sustained-memory.png";
pub static ORDER_CREATE_FILE: &str = "order-create-scaling.png";

/// Clustered bars above this change from baseline are flagged
const OVERHEAD_ALERT_PCT: f64 = 5.;
/// End of run memory above this share of the limit is flagged
const MEMORY_ALERT_PCT: f64 = 70.;

fn tier_lines(data: &[TierSeries]) -> Vec<LineSeries> {
    data.iter().map(TierSeries::line).collect()
}

fn flag(value: f64, threshold: f64) -> Rgb {
    if value > threshold {
        palette::ALERT
    } else {
        palette::HEALTHY
    }
}

/// Target vs achieved TPS with an ideal 1:1 reference
pub fn throughput_scaling() -> Figure {
    let ideal = TPS_LARGE.iter().map(|tps| (*tps, *tps)).collect();
    let mut series = vec![LineSeries {
        label: "Ideal (1:1)".to_string(),
        color: palette::IDEAL,
        marker: None,
        dashed: true,
        points: ideal,
    }];
    series.extend(tier_lines(&THROUGHPUT));

    Figure::new(THROUGHPUT_FILE, (1200, 1200)).with_panel(LineChart {
        title: "Throughput Scaling: Target vs. Achieved TPS".to_string(),
        x_desc: "Target TPS".to_string(),
        y_desc: "Achieved Iterations/s".to_string(),
        x_range: 0.0..520.,
        y_range: 0.0..520.,
        x_scale: Scale::Linear,
        series,
        callouts: vec![Callout {
            lines: vec![
                "k6 200 VU limit".to_string(),
                "(274 achieved at 500 target)".to_string(),
            ],
            target: (500., 274.),
            text_at: (350., 150.),
            color: palette::LARGE,
        }],
        band: None,
        legend: LegendPosition::UpperLeft,
    })
}

/// HTTP p95 latency across TPS levels per tier
pub fn latency_by_tier() -> Figure {
    Figure::new(LATENCY_FILE, (1500, 900)).with_panel(LineChart {
        title: "P95 Latency vs. Load (All Endpoints)".to_string(),
        x_desc: "Target TPS".to_string(),
        y_desc: "HTTP Request Duration p95 (ms)".to_string(),
        x_range: 8.0..600.,
        y_range: 0.0..800.,
        x_scale: Scale::Log,
        series: tier_lines(&HTTP_P95),
        callouts: vec![Callout {
            lines: vec![
                "Cold-start overhead".to_string(),
                "(JVM warmup at 10 TPS)".to_string(),
            ],
            target: (10., 742.),
            text_at: (30., 650.),
            color: palette::SMALL,
        }],
        band: None,
        legend: LegendPosition::UpperRight,
    })
}

/// Cost per 10K transactions at the highest tested TPS
pub fn cost_efficiency() -> Figure {
    let mut chart = BarChart::new(
        "Cost Efficiency at Max Tested TPS",
        "Cost per 10K Transactions ($)",
    );
    chart.categories = COST_PER_10K.iter().map(|(name, _, _)| name.to_string()).collect();
    chart.series = vec![BarSeries {
        label: "Cost".to_string(),
        fill: Fill::PerBar(COST_PER_10K.iter().map(|(_, tier, _)| tier.color()).collect()),
        values: COST_PER_10K.iter().map(|(_, _, cost)| *cost).collect(),
    }];
    chart.bar_width = 0.5;
    chart.value_labels = ValueLabels::Shown {
        format: NumberFormat::Dollars(3),
        skip_zero: false,
    };
    chart.y_format = NumberFormat::Fixed(3);
    chart.y_max = Some(0.05);
    chart.guide = Some(Guide {
        y: COST_PER_10K[1].2,
        color: palette::MEDIUM,
    });

    Figure::new(COST_FILE, (1200, 750)).with_panel(chart)
}

/// Baseline vs clustered latency, clustered bars labeled with their overhead
pub fn cluster_overhead() -> Figure {
    let data = &CLUSTER_OVERHEAD;

    let mut chart = BarChart::new(
        "CAS Overhead: Baseline vs. Single-Replica Clustered (50 TPS)",
        "Latency (ms)",
    );
    chart.categories = data.metrics.iter().map(|m| m.to_string()).collect();
    chart.series = vec![
        BarSeries {
            label: "Baseline (no clustering)".to_string(),
            fill: Fill::Solid(palette::LOCAL),
            values: data.baseline.to_vec(),
        },
        BarSeries {
            label: "Clustered (CAS + AT_LEAST_ONCE)".to_string(),
            fill: Fill::Solid(palette::CLUSTERED),
            values: data.clustered.to_vec(),
        },
    ];
    chart.notes = data
        .baseline
        .iter()
        .zip(data.clustered.iter())
        .enumerate()
        .filter_map(|(category, (base, clustered))| {
            percent_change(*base, *clustered).map(|pct| BarNote {
                category,
                series: 1,
                text: format!("{:+.0}%", pct),
                color: flag(pct, OVERHEAD_ALERT_PCT),
            })
        })
        .collect();
    chart.legend = Some(LegendPosition::UpperLeft);

    Figure::new(CLUSTER_OVERHEAD_FILE, (1500, 750)).with_panel(chart)
}

/// Memory at start and end of the sustained run against the container limit
pub fn sustained_memory() -> Figure {
    let data = &SUSTAINED_MEMORY;

    let mut chart = BarChart::new(
        "Memory Growth: 30-Minute Sustained Load @ 50 TPS (Clustering Enabled)",
        "Memory (MiB)",
    );
    chart.categories = data.services.iter().map(|s| s.to_string()).collect();
    chart.series = vec![
        BarSeries {
            label: "Start (1 min)".to_string(),
            fill: Fill::Solid(palette::MEMORY_START),
            values: data.start_mib.to_vec(),
        },
        BarSeries {
            label: "End (30 min)".to_string(),
            fill: Fill::Solid(palette::MEMORY_END),
            values: data.end_mib.to_vec(),
        },
        BarSeries {
            label: "Container limit".to_string(),
            fill: Fill::Solid(palette::MEMORY_LIMIT),
            values: data.limit_mib.to_vec(),
        },
    ];
    chart.bar_width = 0.25;
    chart.y_format = NumberFormat::Fixed(0);
    chart.y_max = Some(1700.);
    chart.notes = data
        .end_mib
        .iter()
        .zip(data.limit_mib.iter())
        .enumerate()
        .filter_map(|(category, (end, limit))| {
            percent_of(*end, *limit).map(|pct| BarNote {
                category,
                series: 1,
                text: format!("{:.0}%", pct),
                color: flag(pct, MEMORY_ALERT_PCT),
            })
        })
        .collect();
    chart.legend = Some(LegendPosition::UpperRight);

    Figure::new(MEMORY_FILE, (1350, 750)).with_panel(chart)
}

/// Order create p95 per tier with the acceptable region shaded
pub fn order_create_scaling() -> Figure {
    Figure::new(ORDER_CREATE_FILE, (1500, 900)).with_panel(LineChart {
        title: "Order Create P95 Latency vs. Load".to_string(),
        x_desc: "Target TPS".to_string(),
        y_desc: "Order Create Duration p95 (ms)".to_string(),
        x_range: 8.0..600.,
        y_range: 0.0..900.,
        x_scale: Scale::Log,
        series: tier_lines(&ORDER_P95),
        callouts: Vec::new(),
        band: Some(Band {
            y: 0.0..200.,
            color: palette::ACCEPTABLE_BAND,
            label: Some(("<200ms".to_string(), (480., 180.))),
        }),
        legend: LegendPosition::UpperRight,
    })
}

/// All six deployment charts
pub fn figures() -> Vec<Figure> {
    vec![
        throughput_scaling(),
        latency_by_tier(),
        cost_efficiency(),
        cluster_overhead(),
        sustained_memory(),
        order_create_scaling(),
    ]
}
