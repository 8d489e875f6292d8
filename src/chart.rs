//! Renderer independent description of the charts we produce
//!
//! Everything in here is plain data. The figure builders in [`crate::compare`] and
//! [`crate::deployment`] fill these types in and a [`ChartRenderer`](crate::render::ChartRenderer)
//! turns them into pixels.

use std::ops::Range;

/// A 24-bit RGB color
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Build a color from a `0xRRGGBB` literal
    pub const fn hex(value: u32) -> Self {
        Rgb((value >> 16) as u8, (value >> 8) as u8, value as u8)
    }
}

/// Colors shared by the chart builders
pub mod palette {
    use super::Rgb;

    pub const VARIANT_A: Rgb = Rgb::hex(0x4285F4);
    pub const VARIANT_B: Rgb = Rgb::hex(0xEA4335);

    pub const LOCAL: Rgb = Rgb::hex(0x4CAF50);
    pub const SMALL: Rgb = Rgb::hex(0x2196F3);
    pub const MEDIUM: Rgb = Rgb::hex(0xFF9800);
    pub const LARGE: Rgb = Rgb::hex(0xE91E63);
    pub const IDEAL: Rgb = Rgb::hex(0x9E9E9E);
    pub const CLUSTERED: Rgb = Rgb::hex(0x7C4DFF);

    pub const MEMORY_START: Rgb = Rgb::hex(0x81D4FA);
    pub const MEMORY_END: Rgb = Rgb::hex(0xE57373);
    pub const MEMORY_LIMIT: Rgb = Rgb::hex(0xBDBDBD);

    /// Annotation color for a value over its threshold
    pub const ALERT: Rgb = Rgb::hex(0xD32F2F);
    /// Annotation color for a value within its threshold
    pub const HEALTHY: Rgb = Rgb::hex(0x4CAF50);
    pub const ACCEPTABLE_BAND: Rgb = Rgb::hex(0x008000);
}

/// One output image
#[derive(Clone, Debug)]
pub struct Figure {
    /// File name inside the output directory
    pub file_name: String,
    pub width: u32,
    pub height: u32,
    /// Panels laid out left to right
    pub panels: Vec<Panel>,
}

impl Figure {
    pub fn new(file_name: impl Into<String>, (width, height): (u32, u32)) -> Self {
        Figure {
            file_name: file_name.into(),
            width,
            height,
            panels: Vec::new(),
        }
    }

    pub fn with_panel(mut self, panel: impl Into<Panel>) -> Self {
        self.panels.push(panel.into());
        self
    }
}

#[derive(Clone, Debug)]
pub enum Panel {
    Bars(BarChart),
    Lines(LineChart),
}

impl From<BarChart> for Panel {
    fn from(chart: BarChart) -> Self {
        Panel::Bars(chart)
    }
}

impl From<LineChart> for Panel {
    fn from(chart: LineChart) -> Self {
        Panel::Lines(chart)
    }
}

/// How a number is turned into a label
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NumberFormat {
    /// Fixed number of decimals
    Fixed(usize),
    /// Fixed number of decimals followed by `%`
    Percent(usize),
    /// `$` followed by a fixed number of decimals
    Dollars(usize),
}

impl NumberFormat {
    pub fn format(self, value: f64) -> String {
        match self {
            NumberFormat::Fixed(places) => format!("{:.*}", places, value),
            NumberFormat::Percent(places) => format!("{:.*}%", places, value),
            NumberFormat::Dollars(places) => format!("${:.*}", places, value),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LegendPosition {
    UpperLeft,
    UpperRight,
}

/// Labels drawn on top of each bar
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueLabels {
    Hidden,
    Shown {
        format: NumberFormat,
        /// Leave bars with a height of zero or less unlabeled
        skip_zero: bool,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub enum Fill {
    Solid(Rgb),
    /// One color per category, cycling if there are fewer colors than bars
    PerBar(Vec<Rgb>),
}

impl Fill {
    pub fn color_at(&self, index: usize) -> Rgb {
        match self {
            Fill::Solid(color) => *color,
            Fill::PerBar(colors) if colors.is_empty() => Rgb(0, 0, 0),
            Fill::PerBar(colors) => colors[index % colors.len()],
        }
    }
}

#[derive(Clone, Debug)]
pub struct BarSeries {
    pub label: String,
    pub fill: Fill,
    /// One value per category
    pub values: Vec<f64>,
}

/// Free text drawn above a single bar
#[derive(Clone, Debug, PartialEq)]
pub struct BarNote {
    pub category: usize,
    pub series: usize,
    pub text: String,
    pub color: Rgb,
}

/// A horizontal reference line across the whole plot
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Guide {
    pub y: f64,
    pub color: Rgb,
}

/// A grouped bar chart
///
/// Categories sit at integer x positions and the series of each category are placed side by
/// side around that position.
#[derive(Clone, Debug)]
pub struct BarChart {
    pub title: String,
    pub y_desc: String,
    pub categories: Vec<String>,
    pub series: Vec<BarSeries>,
    /// Width of a single bar in category units
    pub bar_width: f64,
    pub value_labels: ValueLabels,
    pub y_format: NumberFormat,
    /// Fixed upper bound for the y axis, otherwise derived from the data
    pub y_max: Option<f64>,
    pub guide: Option<Guide>,
    pub notes: Vec<BarNote>,
    pub legend: Option<LegendPosition>,
}

/// A single positioned bar, see [`BarChart::bars`]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bar {
    pub category: usize,
    pub series: usize,
    /// Center of the bar on the x axis
    pub x: f64,
    pub value: f64,
    pub color: Rgb,
}

impl BarChart {
    pub fn new(title: impl Into<String>, y_desc: impl Into<String>) -> Self {
        BarChart {
            title: title.into(),
            y_desc: y_desc.into(),
            categories: Vec::new(),
            series: Vec::new(),
            bar_width: 0.35,
            value_labels: ValueLabels::Hidden,
            y_format: NumberFormat::Fixed(1),
            y_max: None,
            guide: None,
            notes: Vec::new(),
            legend: None,
        }
    }

    /// Every bar with its x position
    pub fn bars(&self) -> Vec<Bar> {
        let offsets = bar_offsets(self.series.len(), self.bar_width);

        self.series
            .iter()
            .zip(offsets)
            .enumerate()
            .flat_map(|(series_index, (series, offset))| {
                series
                    .values
                    .iter()
                    .enumerate()
                    .map(move |(category, value)| Bar {
                        category,
                        series: series_index,
                        x: category as f64 + offset,
                        value: *value,
                        color: series.fill.color_at(category),
                    })
            })
            .collect()
    }

    /// The bars that should carry a value label and the label text
    pub fn value_labels(&self) -> Vec<(Bar, String)> {
        match self.value_labels {
            ValueLabels::Hidden => Vec::new(),
            ValueLabels::Shown { format, skip_zero } => self
                .bars()
                .into_iter()
                .filter(|bar| !skip_zero || bar.value > 0.)
                .map(|bar| (bar, format.format(bar.value)))
                .collect(),
        }
    }

    /// Upper bound of the y axis
    pub fn y_top(&self) -> f64 {
        if let Some(max) = self.y_max {
            return max;
        }

        let highest = self
            .series
            .iter()
            .flat_map(|series| series.values.iter().copied())
            .fold(0f64, f64::max);

        if highest > 0. {
            highest * 1.15
        } else {
            1.
        }
    }

    /// The category name at an x axis position, empty between categories
    pub fn category_at(&self, x: f64) -> &str {
        let nearest = x.round();
        if (x - nearest).abs() > 0.01 || nearest < 0. {
            return "";
        }
        self.categories
            .get(nearest as usize)
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Range of the x axis with some room on either side of the outer bars
    pub fn x_range(&self) -> Range<f64> {
        -0.6..(self.categories.len().max(1) as f64 - 0.4)
    }
}

/// Center offsets for `count` bars of `width` sharing one category slot
pub fn bar_offsets(count: usize, width: f64) -> Vec<f64> {
    let middle = (count as f64 - 1.) / 2.;
    (0..count).map(|i| (i as f64 - middle) * width).collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Marker {
    Circle,
    Square,
    Diamond,
    Triangle,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scale {
    Linear,
    Log,
}

#[derive(Clone, Debug)]
pub struct LineSeries {
    pub label: String,
    pub color: Rgb,
    pub marker: Option<Marker>,
    pub dashed: bool,
    pub points: Vec<(f64, f64)>,
}

/// Text placed somewhere on the plot with a pointer line to a data point
#[derive(Clone, Debug, PartialEq)]
pub struct Callout {
    /// Lines of text, drawn top to bottom
    pub lines: Vec<String>,
    pub target: (f64, f64),
    pub text_at: (f64, f64),
    pub color: Rgb,
}

/// A shaded horizontal region with an optional label
#[derive(Clone, Debug, PartialEq)]
pub struct Band {
    pub y: Range<f64>,
    pub color: Rgb,
    pub label: Option<(String, (f64, f64))>,
}

#[derive(Clone, Debug)]
pub struct LineChart {
    pub title: String,
    pub x_desc: String,
    pub y_desc: String,
    pub x_range: Range<f64>,
    pub y_range: Range<f64>,
    pub x_scale: Scale,
    pub series: Vec<LineSeries>,
    pub callouts: Vec<Callout>,
    pub band: Option<Band>,
    pub legend: LegendPosition,
}
