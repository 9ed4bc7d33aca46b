//! Lays out the whole page: headings, content, symbols table and the forecast chart.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{ChartScale, Config};
use crate::content;
use crate::figure::Figure;
use crate::forecast::{self, ForecastOutput, ForecastParams};
use crate::logging::{self, obj, v_str, Domain, Level};
use crate::page::{Block, Page, Table};
use crate::series::{PricePoint, PriceSeries};
use crate::toc::{HeadingLevel, Toc};

pub const CHART_FILE_STEM: &str = "forecast";

/// A laid-out page together with the TOC it was built with.
pub struct Site {
    pub page: Page,
    pub toc: Toc,
    pub forecast: ForecastOutput,
    /// Image files the page links by bare name; copied next to `index.md`.
    pub assets: Vec<PathBuf>,
}

/// Page-relative link for an image in `ASSETS_DIR`, recording the source file.
fn asset_link(cfg: &Config, name: &str, assets: &mut Vec<PathBuf>) -> String {
    let path = Path::new(&cfg.assets_dir).join(name);
    if path.is_file() {
        assets.push(path);
    } else {
        logging::log(
            Level::Warn,
            Domain::Page,
            "asset_missing",
            obj(&[("path", v_str(&path.to_string_lossy()))]),
        );
    }
    name.to_string()
}

/// Forecast chart: Training, Actual Stock Price, Predicted Stock Price, plus the
/// prediction band when `SHOW_INTERVAL` is set.
pub fn forecast_figure(cfg: &Config, out: &ForecastOutput) -> Figure {
    let (train, test, predicted, bands, y_title) = match cfg.chart_scale {
        ChartScale::Log => (
            out.train_log.clone(),
            out.test_log.clone(),
            out.aligned.clone(),
            out.interval.clone(),
            "log(adjusted close)",
        ),
        ChartScale::Price => (
            out.train.clone(),
            out.test.clone(),
            out.aligned_prices(),
            out.interval_prices(),
            "adjusted close",
        ),
    };
    let figure = Figure::new(&format!("Time series forecast for {}", cfg.company))
        .line("Training", &train)
        .line("Actual Stock Price", &test)
        .line("Predicted Stock Price", &predicted);
    let figure = if cfg.show_interval {
        let lower = PriceSeries::from_sorted(bands.iter().map(|b| PricePoint { date: b.date, price: b.lower }).collect());
        let upper = PriceSeries::from_sorted(bands.iter().map(|b| PricePoint { date: b.date, price: b.upper }).collect());
        figure.band(&format!("{:.0}% interval", (1.0 - cfg.interval_alpha) * 100.0), &lower, &upper)
    } else {
        figure
    };
    figure.range_slider(true).y_title(y_title)
}

/// Build the page. A forecast failure aborts the build.
pub fn build(cfg: &Config, prices: &PriceSeries, catalog: Table) -> Result<Site> {
    let forecast = forecast::build(prices, &ForecastParams::from_config(cfg))
        .with_context(|| format!("forecasting {}", cfg.symbol))?;

    let mut toc = Toc::new();
    let mut page = Page::new();
    let mut assets = Vec::new();

    page.push(Block::heading(HeadingLevel::H1, content::PAGE_TITLE))
        .push(Block::image(&asset_link(cfg, content::HERO_IMAGE, &mut assets), None))
        .push(Block::heading(HeadingLevel::H2, "Table of Contents"))
        .push(Block::TocPlaceholder);

    page.push(toc.subheader(content::SECTION_DASHBOARD_GUIDE))
        .push(Block::image(
            &asset_link(cfg, content::LAYOUT_IMAGE, &mut assets),
            Some(content::LAYOUT_CAPTION),
        ))
        .push(Block::markdown("**This chart includes:**"))
        .push(Block::markdown(&content::dashboard_list()));

    page.push(toc.subheader(content::SECTION_KPIS))
        .push(Block::markdown(&content::kpi_glossary()));

    page.push(toc.subheader(content::SECTION_CATALOG))
        .push(Block::markdown(content::CATALOG_INTRO))
        .push(Block::Table(catalog));

    page.push(toc.subheader(content::SECTION_DASHBOARD))
        .push(Block::markdown(content::DASHBOARD_PLACEHOLDER));

    page.push(toc.subheader(content::SECTION_FORECAST))
        .push(Block::Chart {
            figure: forecast_figure(cfg, &forecast),
            file_stem: CHART_FILE_STEM.to_string(),
        })
        .push(Block::markdown(&forecast_summary(cfg, &forecast)));

    page.push(toc.subheader(content::SECTION_REFERENCES))
        .push(Block::markdown(&content::reference_list()));

    page.push(toc.subheader(content::SECTION_AUTHORS));
    for author in content::AUTHORS {
        page.push(Block::Text(author.to_string()));
    }

    page.push(Block::markdown(&content::back_to_top()));

    logging::log(
        Level::Info,
        Domain::Page,
        "page_built",
        obj(&[
            ("symbol", v_str(&cfg.symbol)),
            ("blocks", serde_json::json!(page.blocks().len())),
            ("toc_entries", serde_json::json!(toc.entries().len())),
        ]),
    );

    Ok(Site { page, toc, forecast, assets })
}

/// Write `index.md`, the chart artifacts and the linked images into `out_dir`.
/// Returns the path of the written page.
pub fn write(site: &Site, out_dir: &Path) -> Result<PathBuf> {
    let rendered = site.page.render(&site.toc).context("serializing chart")?;
    fs::create_dir_all(out_dir).with_context(|| format!("creating {}", out_dir.display()))?;

    let index = out_dir.join("index.md");
    fs::write(&index, &rendered.markdown).with_context(|| format!("writing {}", index.display()))?;
    logging::log_artifact("page", &index.to_string_lossy(), rendered.markdown.len());

    for artifact in &rendered.artifacts {
        let path = out_dir.join(&artifact.name);
        fs::write(&path, &artifact.contents).with_context(|| format!("writing {}", path.display()))?;
        logging::log_artifact("chart", &path.to_string_lossy(), artifact.contents.len());
    }

    for source in &site.assets {
        let Some(name) = source.file_name() else { continue };
        let dest = out_dir.join(name);
        // ASSETS_DIR may already be the output directory
        if dest.exists() && fs::canonicalize(source).ok() == fs::canonicalize(&dest).ok() {
            continue;
        }
        let bytes = fs::copy(source, &dest)
            .with_context(|| format!("copying {} to {}", source.display(), dest.display()))?;
        logging::log_artifact("image", &dest.to_string_lossy(), bytes as usize);
    }
    Ok(index)
}

fn forecast_summary(cfg: &Config, out: &ForecastOutput) -> String {
    format!(
        "Model: ARIMA(0,1,0) on log adjusted closes of {} from {} to {}. \
         Trained on {} days, {} held out; {}-step forecast, {} steps shown against actual prices.",
        cfg.symbol,
        cfg.start,
        cfg.end,
        out.train.len(),
        out.test.len(),
        out.forecast.len(),
        out.aligned.len(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn prices(n: usize) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2022, 1, 3).unwrap();
        PriceSeries::from_raw(
            (0..n)
                .map(|i| (start + chrono::Duration::days(i as i64), Some(100.0 + i as f64 + (i % 3) as f64)))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn figure_has_three_named_series_and_slider() {
        let cfg = Config::from_env();
        let out = forecast::build(&prices(100), &ForecastParams::default()).unwrap();
        let fig = forecast_figure(&cfg, &out);
        let names = fig.trace_names();
        assert_eq!(&names[..3], &["Training", "Actual Stock Price", "Predicted Stock Price"]);
        assert_eq!(fig.data[0].x.len(), 75);
        assert_eq!(fig.data[2].x.len(), 25);
        assert_eq!(fig.layout.xaxis.rangeslider.as_ref().map(|r| r.visible), Some(true));
    }

    #[test]
    fn interval_band_only_when_enabled() {
        let mut cfg = Config::from_env();
        cfg.show_interval = false;
        cfg.interval_alpha = 0.5;
        let out = forecast::build(&prices(100), &ForecastParams::default()).unwrap();
        assert_eq!(forecast_figure(&cfg, &out).data.len(), 3);

        cfg.show_interval = true;
        let fig = forecast_figure(&cfg, &out);
        assert_eq!(fig.data.len(), 5);
        assert_eq!(fig.trace_names()[4], "50% interval");
        assert_eq!(fig.data[3].x.len(), out.aligned.len());
    }

    #[test]
    fn price_scale_chart_uses_raw_prices() {
        let mut cfg = Config::from_env();
        cfg.chart_scale = ChartScale::Price;
        let series = prices(40);
        let out = forecast::build(&series, &ForecastParams::default()).unwrap();
        let fig = forecast_figure(&cfg, &out);
        assert_eq!(fig.data[0].y[0], series.values()[0]);
    }
}
