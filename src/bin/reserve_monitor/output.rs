//! Rendering of the reserve series to stdout.

use prize_reserve::{chart::ChartData, reserve::ReserveDataPoint};

use crate::{config::OutputFormat, error::Result};

/// Print the series in the requested format.
pub fn print(data: &ChartData, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => print!("{}", table(data)),
        OutputFormat::Json => println!("{}", serde_json::to_string(data)?),
    }
    Ok(())
}

const HEADER: [&str; 8] = [
    "Point",
    "Date",
    "Liquidations",
    "Manual",
    "Rewards",
    "Backstops",
    "Buyback",
    "Reserve",
];

fn row(point: &ReserveDataPoint) -> [String; 8] {
    [
        point.label.tooltip_label(),
        point.label.axis_tick(),
        point.liquidations.to_string(),
        point.manual.to_string(),
        point.rewards.to_string(),
        point.prize_backstops.to_string(),
        point.buyback.to_string(),
        point.reserve.to_string(),
    ]
}

/// Plain text table with right-aligned amount columns.
pub fn table(data: &ChartData) -> String {
    let rows: Vec<[String; 8]> = data.points.iter().map(row).collect();
    let widths: [usize; 8] = std::array::from_fn(|i| {
        rows.iter()
            .map(|r| r[i].len())
            .chain(std::iter::once(HEADER[i].len()))
            .max()
            .unwrap_or_default()
    });

    let mut lines = vec![format!("Amounts in {}", data.prize_token.symbol)];
    if let Some(burn) = &data.burn_token {
        lines.push(format!("Buybacks burn {}", burn.symbol));
    }

    let header = HEADER.map(str::to_string);
    for cells in std::iter::once(&header).chain(&rows) {
        let line = cells
            .iter()
            .zip(widths)
            .enumerate()
            .map(|(i, (cell, width))| match i {
                0 | 1 => format!("{cell:<width$}"),
                _ => format!("{cell:>width$}"),
            })
            .collect::<Vec<_>>()
            .join("  ");
        lines.push(line.trim_end().to_string());
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}
