//! Zero-argument reporting binary.
//!
//! Reads `file.bib` from the current directory, tabulates publications per
//! year, and saves the annotated trend chart to
//! `figures/articles_per_year.png`, then opens a preview window of the
//! saved figure.

use anyhow::Context;
use bibtrend::{BibtexParser, ChartStyle, QuadraticTrend, YearCounts, chart};

const INPUT_PATH: &str = "file.bib";
const OUTPUT_PATH: &str = "figures/articles_per_year.png";
const MOVING_AVERAGE_WINDOW: usize = 3;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let entries = BibtexParser::new()
        .parse_file(INPUT_PATH)
        .with_context(|| format!("failed to parse {INPUT_PATH}"))?;
    log::info!("parsed {} entries from {INPUT_PATH}", entries.len());

    let counts =
        YearCounts::from_entries(&entries).context("failed to tabulate publication years")?;
    if let Some((first, last)) = counts.year_span() {
        log::info!(
            "counted {} entries with a year field across {first}-{last}",
            counts.total()
        );
    }

    let moving_avg = counts
        .moving_average(MOVING_AVERAGE_WINDOW)
        .context("failed to compute the moving average")?;

    let trend = QuadraticTrend::fit(
        counts
            .rows()
            .iter()
            .map(|row| (f64::from(row.year), row.count as f64)),
    )
    .context("failed to fit the quadratic trend")?;
    let trend_values: Vec<f64> = counts
        .rows()
        .iter()
        .map(|row| trend.evaluate(f64::from(row.year)))
        .collect();

    chart::render(
        &counts,
        &moving_avg,
        &trend_values,
        counts.total(),
        MOVING_AVERAGE_WINDOW,
        &ChartStyle::default(),
        OUTPUT_PATH,
    )
    .with_context(|| format!("failed to render {OUTPUT_PATH}"))?;
    log::info!("saved chart to {OUTPUT_PATH}");

    #[cfg(feature = "preview")]
    if let Err(err) = bibtrend::preview::show(OUTPUT_PATH, chart::TITLE) {
        log::warn!("could not open the preview window: {err}");
    }

    Ok(())
}
