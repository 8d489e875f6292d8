use std::{iter, path::Path};

use eyre::WrapErr;
use plotters::{
    coord::{ranged1d::ValueFormatter, types::RangedCoordf64, Shift},
    prelude::*,
    series::DashedLineSeries,
    style::text_anchor::{HPos, Pos, VPos},
};

use super::{ChartRenderer, Unavailable};
use crate::chart::{
    BarChart, Figure, LegendPosition, LineChart, Marker, Panel, Rgb, Scale,
};

static FONT: &str = "sans-serif";

static TITLE_SIZE: u32 = 34;
static AXIS_DESC_SIZE: u32 = 24;
static LABEL_SIZE: u32 = 19;
static ANNOTATION_SIZE: u32 = 18;

/// Draws figures into PNG files with the plotters bitmap backend
#[derive(Clone, Copy, Debug, Default)]
pub struct PngRenderer;

impl ChartRenderer for PngRenderer {
    fn probe(&self) -> Result<(), Unavailable> {
        // Text is the only part of a chart that needs anything from the system
        (FONT, LABEL_SIZE)
            .into_font()
            .box_size("0.0")
            .map(|_| ())
            .map_err(|e| Unavailable::Fonts(format!("{:?}", e)))
    }

    fn render(&self, figure: &Figure, path: &Path) -> eyre::Result<()> {
        let root = BitMapBackend::new(path, (figure.width, figure.height)).into_drawing_area();
        root.fill(&WHITE)?;

        let areas = root.split_evenly((1, figure.panels.len().max(1)));
        for (panel, area) in figure.panels.iter().zip(areas.iter()) {
            match panel {
                Panel::Bars(chart) => draw_bars(area, chart)?,
                Panel::Lines(chart) => draw_lines(area, chart)?,
            }
        }

        root.present()
            .wrap_err_with(|| format!("Could not write {}", path.display()))?;

        Ok(())
    }
}

fn color(rgb: Rgb) -> RGBColor {
    RGBColor(rgb.0, rgb.1, rgb.2)
}

/// `style` drawn in `rgb`
fn tinted(style: &TextStyle<'static>, rgb: Rgb) -> TextStyle<'static> {
    let mut style = style.clone();
    style.color = color(rgb).to_backend_color();
    style
}

fn annotation_style() -> TextStyle<'static> {
    TextStyle::from((FONT, ANNOTATION_SIZE).into_font())
}

fn legend_position(position: LegendPosition) -> SeriesLabelPosition {
    match position {
        LegendPosition::UpperLeft => SeriesLabelPosition::UpperLeft,
        LegendPosition::UpperRight => SeriesLabelPosition::UpperRight,
    }
}

fn draw_bars<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    plot: &BarChart,
) -> eyre::Result<()>
where
    DB::ErrorType: 'static,
{
    let y_top = plot.y_top();
    let x_range = plot.x_range();

    let mut chart = ChartBuilder::on(area)
        .caption(&plot.title, (FONT, TITLE_SIZE))
        .margin(20)
        .set_label_area_size(LabelAreaPosition::Left, 110)
        .set_label_area_size(LabelAreaPosition::Bottom, 50)
        .build_cartesian_2d(x_range.clone(), 0f64..y_top)?;

    let y_format = plot.y_format;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .light_line_style(TRANSPARENT)
        .bold_line_style(BLACK.mix(0.1))
        .axis_desc_style((FONT, AXIS_DESC_SIZE))
        .label_style((FONT, LABEL_SIZE))
        .y_desc(plot.y_desc.as_str())
        .y_label_formatter(&|y| y_format.format(*y))
        .x_labels(plot.categories.len().max(1))
        .x_label_formatter(&|x| plot.category_at(*x).to_string())
        .draw()?;

    if let Some(guide) = plot.guide {
        chart.draw_series(DashedLineSeries::new(
            vec![(x_range.start, guide.y), (x_range.end, guide.y)],
            4,
            6,
            color(guide.color).mix(0.5).stroke_width(2),
        ))?;
    }

    let half_width = plot.bar_width / 2.;
    let bars = plot.bars();
    for (index, series) in plot.series.iter().enumerate() {
        let drawn = chart.draw_series(bars.iter().filter(|bar| bar.series == index).map(|bar| {
            let mut rect = Rectangle::new(
                [(bar.x - half_width, 0.), (bar.x + half_width, bar.value)],
                color(bar.color).filled(),
            );
            rect.set_margin(0, 0, 2, 2);
            rect
        }))?;

        if plot.legend.is_some() {
            let swatch = color(series.fill.color_at(0));
            drawn
                .label(series.label.as_str())
                .legend(move |(x, y)| Rectangle::new([(x, y - 8), (x + 16, y + 8)], swatch.filled()));
        }
    }

    let above = annotation_style().pos(Pos::new(HPos::Center, VPos::Bottom));

    chart.draw_series(plot.value_labels().into_iter().map(|(bar, text)| {
        EmptyElement::at((bar.x, bar.value)) + Text::new(text, (0, -4), above.clone())
    }))?;

    // Notes stack on top of any value label of the same bar
    let note_offset = if plot.value_labels().is_empty() { -4 } else { -8 - ANNOTATION_SIZE as i32 };
    chart.draw_series(plot.notes.iter().filter_map(|note| {
        let bar = bars
            .iter()
            .find(|bar| bar.category == note.category && bar.series == note.series)?;
        let style = tinted(&above, note.color);
        Some(EmptyElement::at((bar.x, bar.value)) + Text::new(note.text.clone(), (0, note_offset), style))
    }))?;

    if let Some(position) = plot.legend {
        chart
            .configure_series_labels()
            .position(legend_position(position))
            .label_font((FONT, LABEL_SIZE))
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK.mix(0.3))
            .draw()?;
    }

    Ok(())
}

fn draw_lines<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    plot: &LineChart,
) -> eyre::Result<()>
where
    DB::ErrorType: 'static,
{
    let mut builder = ChartBuilder::on(area);
    builder
        .caption(&plot.title, (FONT, TITLE_SIZE))
        .margin(20)
        .set_label_area_size(LabelAreaPosition::Left, 90)
        .set_label_area_size(LabelAreaPosition::Bottom, 70);

    match plot.x_scale {
        Scale::Linear => {
            let chart = builder.build_cartesian_2d(plot.x_range.clone(), plot.y_range.clone())?;
            plot_lines(chart, plot)
        }
        Scale::Log => {
            let chart = builder
                .build_cartesian_2d(plot.x_range.clone().log_scale(), plot.y_range.clone())?;
            plot_lines(chart, plot)
        }
    }
}

fn plot_lines<'a, DB, X>(
    mut chart: ChartContext<'a, DB, Cartesian2d<X, RangedCoordf64>>,
    plot: &LineChart,
) -> eyre::Result<()>
where
    DB: DrawingBackend + 'a,
    DB::ErrorType: 'static,
    X: Ranged<ValueType = f64> + ValueFormatter<f64>,
{
    chart
        .configure_mesh()
        .light_line_style(TRANSPARENT)
        .bold_line_style(BLACK.mix(0.1))
        .axis_desc_style((FONT, AXIS_DESC_SIZE))
        .label_style((FONT, LABEL_SIZE))
        .x_desc(plot.x_desc.as_str())
        .y_desc(plot.y_desc.as_str())
        .x_label_formatter(&|x| format!("{:.0}", x))
        .y_label_formatter(&|y| format!("{:.0}", y))
        .draw()?;

    if let Some(band) = &plot.band {
        chart.draw_series(iter::once(Rectangle::new(
            [
                (plot.x_range.start, band.y.start),
                (plot.x_range.end, band.y.end),
            ],
            color(band.color).mix(0.08).filled(),
        )))?;

        if let Some((text, at)) = &band.label {
            let style = tinted(&annotation_style(), band.color)
                .pos(Pos::new(HPos::Right, VPos::Bottom));
            chart.draw_series(iter::once(Text::new(text.clone(), *at, style)))?;
        }
    }

    for series in &plot.series {
        let stroke = color(series.color);
        let drawn = if series.dashed {
            chart.draw_series(DashedLineSeries::new(
                series.points.clone(),
                10,
                6,
                stroke.stroke_width(3),
            ))?
        } else {
            chart.draw_series(LineSeries::new(series.points.clone(), stroke.stroke_width(3)))?
        };
        drawn
            .label(series.label.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 24, y)], stroke.stroke_width(3)));

        if let Some(marker) = series.marker {
            let points = series.points.iter().copied();
            let fill = stroke.filled();
            match marker {
                Marker::Circle => {
                    chart.draw_series(points.map(|p| Circle::new(p, 7, fill)))?;
                }
                Marker::Square => {
                    chart.draw_series(points.map(|p| {
                        EmptyElement::at(p) + Rectangle::new([(-6, -6), (6, 6)], fill)
                    }))?;
                }
                Marker::Diamond => {
                    chart.draw_series(points.map(|p| {
                        EmptyElement::at(p) + Polygon::new(vec![(0, -8), (8, 0), (0, 8), (-8, 0)], fill)
                    }))?;
                }
                Marker::Triangle => {
                    chart.draw_series(points.map(|p| TriangleMarker::new(p, 9, fill)))?;
                }
            }
        }
    }

    for callout in &plot.callouts {
        let ink = color(callout.color);
        chart.draw_series(iter::once(PathElement::new(
            vec![callout.text_at, callout.target],
            ink.stroke_width(1),
        )))?;
        chart.draw_series(iter::once(Circle::new(callout.target, 4, ink.filled())))?;

        let style = tinted(&annotation_style(), callout.color);
        chart.draw_series(callout.lines.iter().enumerate().map(|(i, line)| {
            let dy = i as i32 * (ANNOTATION_SIZE as i32 + 4);
            EmptyElement::at(callout.text_at) + Text::new(line.clone(), (4, dy), style.clone())
        }))?;
    }

    chart
        .configure_series_labels()
        .position(legend_position(plot.legend))
        .label_font((FONT, LABEL_SIZE))
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK.mix(0.3))
        .draw()?;

    Ok(())
}
