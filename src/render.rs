//! Plain-text rendering of forecast reports

use price_forecast::{
    DailyBar, ForecastComponents, ForecastReport, PredictionRecord, ReconciledRow, SeasonalEffect,
    TradeLink,
};
use std::fmt::{self, Write};

fn bars_table(out: &mut String, bars: &[DailyBar]) -> fmt::Result {
    writeln!(out, "{:<12} {:>12} {:>12} {:>14}", "Date", "Open", "Close", "Volume")?;
    for bar in bars {
        let close = bar
            .close
            .map_or_else(|| "-".to_string(), |c| format!("{:.2}", c));
        writeln!(
            out,
            "{:<12} {:>12.2} {:>12} {:>14}",
            bar.date, bar.open, close, bar.volume
        )?;
    }
    Ok(())
}

fn reconciled_table(out: &mut String, rows: &[ReconciledRow]) -> fmt::Result {
    writeln!(out, "{:<12} {:>14} {:>16}", "Date", "Actual Price", "Predicted Price")?;
    for row in rows {
        let actual = row
            .actual_value
            .map_or_else(|| "-".to_string(), |a| format!("{:.2}", a));
        writeln!(
            out,
            "{:<12} {:>14} {:>16.2}",
            row.date, actual, row.predicted_value
        )?;
    }
    Ok(())
}

fn predictions_table(out: &mut String, records: &[PredictionRecord]) -> fmt::Result {
    writeln!(
        out,
        "{:<12} {:>12} {:>12} {:>12}",
        "Date", "Predicted", "Lower", "Upper"
    )?;
    for record in records {
        writeln!(
            out,
            "{:<12} {:>12.2} {:>12.2} {:>12.2}",
            record.date, record.predicted_value, record.lower_bound, record.upper_bound
        )?;
    }
    Ok(())
}

fn effects_table(out: &mut String, title: &str, effects: &[SeasonalEffect]) -> fmt::Result {
    if effects.is_empty() {
        return Ok(());
    }
    writeln!(out, "{}:", title)?;
    for effect in effects {
        writeln!(out, "  {:<6} {:>+10.2}", effect.label, effect.effect)?;
    }
    Ok(())
}

fn components_section(out: &mut String, components: &ForecastComponents) -> fmt::Result {
    writeln!(out, "\nForecast components:")?;
    writeln!(
        out,
        "Trend: {:.2} at start, {:+.4} per day",
        components.trend_start, components.trend_per_day
    )?;
    effects_table(out, "Weekly", &components.weekly)?;
    effects_table(out, "Yearly", &components.yearly)
}

fn write_report(
    out: &mut String,
    report: &ForecastReport,
    trade_links: &[TradeLink],
) -> fmt::Result {
    let heading = format!("{} ({})", report.company, report.symbol);

    writeln!(out, "Stock Data for {}", heading)?;
    writeln!(out, "Last {} rows:", report.recent_bars.len())?;
    bars_table(out, &report.recent_bars)?;

    writeln!(
        out,
        "\nPrediction Results for {} ({} days, {})",
        heading, report.horizon_days, report.model_name
    )?;
    if report.reconciled.is_empty() {
        writeln!(out, "No predictions inside the display window.")?;
    } else {
        reconciled_table(out, &report.reconciled)?;
    }

    writeln!(out, "\nFuture Predictions (after {}):", report.as_of)?;
    predictions_table(out, &report.future_preview)?;

    if let Some(components) = &report.components {
        components_section(out, components)?;
    }

    writeln!(out, "\nAccuracy over {} days with actual prices:", report.score.count)?;
    writeln!(out, "{}", report.score)?;

    if !trade_links.is_empty() {
        writeln!(out, "\nTrade {} on:", report.symbol)?;
        for link in trade_links {
            writeln!(out, "  - {}: {}", link.name, link.url)?;
        }
    }
    Ok(())
}

/// Render every section of a forecast report
pub fn render_report(report: &ForecastReport, trade_links: &[TradeLink]) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail
    if write_report(&mut out, report, trade_links).is_err() {
        tracing::warn!(symbol = %report.symbol, "report rendering stopped early");
    }
    out
}
