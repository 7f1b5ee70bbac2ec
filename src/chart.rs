//! Chart rendering for the yearly publication table.
//!
//! Draws the count table as a bar chart with the moving-average and trend
//! overlays, per-bar count annotations, a legend, and a caption strip
//! reporting the total number of counted entries, then saves the figure as
//! a PNG.

use crate::counts::YearCounts;
use crate::{BibtrendError, Result};
use plotters::prelude::*;
use plotters::series::DashedLineSeries;
use plotters::style::FontTransform;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::fs;
use std::path::Path;

/// Title drawn above the plot and reused for the preview window.
pub const TITLE: &str = "Number of Articles per Year";

const X_LABEL: &str = "Year";
const Y_LABEL: &str = "Number of Articles";
const CAPTION_STRIP_HEIGHT: u32 = 36;

/// Visual styling for the rendered chart.
///
/// The defaults give a 1000x600 canvas with sky blue bars, an orange
/// moving-average line, and a green dashed trend line.
#[derive(Debug, Clone)]
pub struct ChartStyle {
    /// Canvas width in pixels
    pub width: u32,
    /// Canvas height in pixels
    pub height: u32,
    /// Bar fill color
    pub bar_color: RGBColor,
    /// Moving-average line color
    pub moving_average_color: RGBColor,
    /// Trend line color
    pub trend_color: RGBColor,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 600,
            bar_color: RGBColor(135, 206, 235),
            moving_average_color: RGBColor(255, 165, 0),
            trend_color: RGBColor(0, 128, 0),
        }
    }
}

/// Renders the count table with its derived series and saves the PNG.
///
/// Both derived series must hold exactly one value per table row: the
/// moving average drawn as a solid line and the fitted trend drawn as a
/// dashed line, labeled with `window` in the legend. The caption strip
/// below the plot reports `total_entries`. Label areas are sized so the
/// rotated year labels and the caption are not clipped.
///
/// The parent directory of `path` is created first when it does not exist,
/// so repeated runs overwrite the same file in place.
///
/// # Errors
///
/// Returns [`BibtrendError::InsufficientData`] for an empty table,
/// [`BibtrendError::Io`] if the output directory cannot be created, and
/// [`BibtrendError::Chart`] for series length mismatches or backend
/// drawing failures
pub fn render<P: AsRef<Path>>(
    counts: &YearCounts,
    moving_avg: &[f64],
    trend: &[f64],
    total_entries: u64,
    window: usize,
    style: &ChartStyle,
    path: P,
) -> Result<()> {
    let path = path.as_ref();

    if counts.is_empty() {
        return Err(BibtrendError::InsufficientData { needed: 1, got: 0 });
    }
    if moving_avg.len() != counts.len() || trend.len() != counts.len() {
        return Err(BibtrendError::Chart(
            "derived series must hold one value per table row".to_string(),
        ));
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let rows = counts.rows();
    let (first_year, last_year) = counts
        .year_span()
        .ok_or(BibtrendError::InsufficientData { needed: 1, got: 0 })?;
    let x_range = (f64::from(first_year) - 0.7)..(f64::from(last_year) + 0.7);

    let highest = rows
        .iter()
        .map(|row| row.count as f64)
        .chain(moving_avg.iter().copied())
        .chain(trend.iter().copied())
        .fold(f64::MIN, f64::max);
    let lowest = trend.iter().copied().fold(0.0, f64::min);
    let y_range = lowest..(highest * 1.15);

    let span_years = (last_year - first_year) as usize + 1;
    let x_label_count = span_years.clamp(2, 15);

    let root = BitMapBackend::new(path, (style.width, style.height)).into_drawing_area();
    root.fill(&WHITE).map_err(chart_err)?;

    let (plot_area, caption_area) =
        root.split_vertically(style.height.saturating_sub(CAPTION_STRIP_HEIGHT) as i32);

    let mut chart = ChartBuilder::on(&plot_area)
        .caption(TITLE, ("sans-serif", 24))
        .margin(15)
        .x_label_area_size(60)
        .y_label_area_size(55)
        .build_cartesian_2d(x_range, y_range)
        .map_err(chart_err)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .x_desc(X_LABEL)
        .y_desc(Y_LABEL)
        .x_labels(x_label_count)
        .x_label_formatter(&|x| format!("{}", x.round() as i32))
        .label_style(("sans-serif", 12))
        .x_label_style(
            ("sans-serif", 12)
                .into_font()
                .transform(FontTransform::Rotate90),
        )
        .axis_desc_style(("sans-serif", 16))
        .draw()
        .map_err(chart_err)?;

    chart
        .draw_series(rows.iter().map(|row| {
            let year = f64::from(row.year);
            Rectangle::new(
                [(year - 0.4, 0.0), (year + 0.4, row.count as f64)],
                style.bar_color.filled(),
            )
        }))
        .map_err(chart_err)?;

    let average_color = style.moving_average_color;
    chart
        .draw_series(LineSeries::new(
            rows.iter()
                .zip(moving_avg)
                .map(|(row, &avg)| (f64::from(row.year), avg)),
            average_color.stroke_width(2),
        ))
        .map_err(chart_err)?
        .label(format!("{window}-Year Moving Average"))
        .legend(move |(x, y)| {
            PathElement::new(vec![(x, y), (x + 20, y)], average_color.stroke_width(2))
        });

    let trend_color = style.trend_color;
    chart
        .draw_series(DashedLineSeries::new(
            rows.iter()
                .zip(trend)
                .map(|(row, &value)| (f64::from(row.year), value)),
            6,
            4,
            trend_color.stroke_width(2),
        ))
        .map_err(chart_err)?
        .label("Quadratic Trend")
        .legend(move |(x, y)| {
            PathElement::new(vec![(x, y), (x + 20, y)], trend_color.stroke_width(2))
        });

    let annotation_style = TextStyle::from(("sans-serif", 12).into_font())
        .pos(Pos::new(HPos::Center, VPos::Bottom));
    chart
        .draw_series(rows.iter().filter(|row| row.count > 0).map(|row| {
            Text::new(
                row.count.to_string(),
                (f64::from(row.year), row.count as f64 + 0.1),
                annotation_style.clone(),
            )
        }))
        .map_err(chart_err)?;

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .label_font(("sans-serif", 13))
        .draw()
        .map_err(chart_err)?;

    let caption = format!("Total bibtex entries parsed: {total_entries}");
    let caption_style =
        TextStyle::from(("sans-serif", 14).into_font()).pos(Pos::new(HPos::Center, VPos::Top));
    caption_area
        .draw(&Text::new(
            caption,
            ((style.width / 2) as i32, 8),
            caption_style,
        ))
        .map_err(chart_err)?;

    root.present().map_err(chart_err)?;
    Ok(())
}

fn chart_err(e: impl std::fmt::Display) -> BibtrendError {
    BibtrendError::Chart(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Entry;
    use crate::trend::QuadraticTrend;
    use std::collections::HashMap;

    fn counts_for(years: &[&str]) -> YearCounts {
        let entries: Vec<Entry> = years
            .iter()
            .map(|year| {
                let mut fields = HashMap::new();
                fields.insert("year".to_string(), (*year).to_string());
                Entry {
                    entry_type: "article".to_string(),
                    key: "k".to_string(),
                    fields,
                }
            })
            .collect();
        YearCounts::from_entries(&entries).unwrap()
    }

    fn derived_series(counts: &YearCounts) -> (Vec<f64>, Vec<f64>) {
        let moving_avg = counts.moving_average(3).unwrap();
        let fitted = QuadraticTrend::fit(
            counts
                .rows()
                .iter()
                .map(|row| (f64::from(row.year), row.count as f64)),
        )
        .unwrap();
        let trend = counts
            .rows()
            .iter()
            .map(|row| fitted.evaluate(f64::from(row.year)))
            .collect();
        (moving_avg, trend)
    }

    #[test]
    fn test_render_writes_nonempty_png_and_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("figures").join("articles_per_year.png");

        let counts = counts_for(&["2019", "2019", "2020", "2021", "2021", "2021"]);
        let (moving_avg, trend) = derived_series(&counts);

        render(
            &counts,
            &moving_avg,
            &trend,
            counts.total(),
            3,
            &ChartStyle::default(),
            &path,
        )
        .unwrap();

        let metadata = fs::metadata(&path).unwrap();
        assert!(metadata.len() > 0);
    }

    #[test]
    fn test_render_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");

        let counts = counts_for(&["2020", "2021", "2021", "2022"]);
        let (moving_avg, trend) = derived_series(&counts);

        for _ in 0..2 {
            render(
                &counts,
                &moving_avg,
                &trend,
                counts.total(),
                3,
                &ChartStyle::default(),
                &path,
            )
            .unwrap();
        }
        assert!(path.exists());
    }

    #[test]
    fn test_render_single_year_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("single.png");

        let counts = counts_for(&["2021", "2021"]);
        let (moving_avg, trend) = derived_series(&counts);

        render(
            &counts,
            &moving_avg,
            &trend,
            counts.total(),
            3,
            &ChartStyle::default(),
            &path,
        )
        .unwrap();
        assert!(fs::metadata(&path).unwrap().len() > 0);
    }

    #[test]
    fn test_render_empty_table_is_an_error() {
        let counts = YearCounts::from_entries(&[]).unwrap();
        let result = render(
            &counts,
            &[],
            &[],
            0,
            3,
            &ChartStyle::default(),
            "unused.png",
        );
        assert!(matches!(
            result,
            Err(BibtrendError::InsufficientData { .. })
        ));
    }

    #[test]
    fn test_render_rejects_mismatched_series_lengths() {
        let counts = counts_for(&["2020", "2021"]);
        let result = render(
            &counts,
            &[1.0],
            &[1.0, 1.0],
            2,
            3,
            &ChartStyle::default(),
            "unused.png",
        );
        assert!(matches!(result, Err(BibtrendError::Chart(_))));
    }
}
