use anyhow::Result;
use serde_json::json;
use std::path::Path;

use stock_picker::catalog;
use stock_picker::config::Config;
use stock_picker::error::ForecastError;
use stock_picker::logging::{log, obj, v_str, Domain, Level, ProfileScope};
use stock_picker::site;
use stock_picker::source::SourceKind;

async fn run(cfg: &Config) -> Result<()> {
    let _scope = ProfileScope::new("render");
    let kind = SourceKind::from_config(cfg);
    log(
        Level::Info,
        Domain::System,
        "startup",
        obj(&[
            ("symbol", v_str(&cfg.symbol)),
            ("start", v_str(&cfg.start.to_string())),
            ("end", v_str(&cfg.end.to_string())),
            ("source", v_str(&format!("{:?}", kind))),
            ("out_dir", v_str(&cfg.out_dir)),
        ]),
    );

    let source = kind.build(cfg);
    let prices = source.fetch_daily(&cfg.symbol, cfg.start, cfg.end).await?;
    let table = catalog::load_catalog(Path::new(&cfg.stocks_csv))?;

    let built = site::build(cfg, &prices, table)?;
    let index = site::write(&built, Path::new(&cfg.out_dir))?;

    println!("Stock Picker page");
    println!("=================");
    println!("Symbol:    {} ({} .. {})", cfg.symbol, cfg.start, cfg.end);
    println!("Prices:    {} trading days", prices.len());
    println!(
        "Split:     {} train / {} test (index {})",
        built.forecast.train.len(),
        built.forecast.test.len(),
        built.forecast.split_index
    );
    println!(
        "Forecast:  {} steps, {} aligned, sigma2 = {:.6}",
        built.forecast.forecast.len(),
        built.forecast.aligned.len(),
        built.forecast.sigma2
    );
    println!("Page:      {}", index.display());
    Ok(())
}

#[tokio::main]
async fn main() {
    let cfg = Config::from_env();
    if let Err(err) = run(&cfg).await {
        let (code, kind) = match err.downcast_ref::<ForecastError>() {
            Some(fe) => (fe.exit_code(), fe.kind()),
            None => (1, "io"),
        };
        log(
            Level::Error,
            Domain::System,
            "render_failed",
            obj(&[
                ("symbol", v_str(&cfg.symbol)),
                ("kind", v_str(kind)),
                ("error", v_str(&format!("{:#}", err))),
                ("exit_code", json!(code)),
            ]),
        );
        eprintln!("error: {:#}", err);
        std::process::exit(code);
    }
}
