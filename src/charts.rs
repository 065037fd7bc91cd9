//! Pure transforms from API payloads into what the terminal charts draw.
//! Nothing here sorts or filters; order is whatever the server sent.

use crate::fmt::percent;
use crate::models::{BarChartPayload, ContributionGroupRecord, RepeatedDonor};
use crate::reports::PALETTE;

#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub label: String,
    pub value: f64,
    pub percent: String,
}

/// Proportion legend: each slice with its two-decimal share of the total.
pub fn proportions(values: &[(String, f64)]) -> Vec<LegendEntry> {
    let total: f64 = values.iter().map(|(_, v)| v).sum();
    values
        .iter()
        .map(|(label, value)| LegendEntry {
            label: label.clone(),
            value: *value,
            percent: percent(*value, total),
        })
        .collect()
}

pub fn group_proportions(records: &[ContributionGroupRecord]) -> Vec<LegendEntry> {
    let values: Vec<(String, f64)> = records
        .iter()
        .map(|r| (r.contributor_group.clone(), r.contribution_amount))
        .collect();
    proportions(&values)
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarSeries {
    pub title: Option<String>,
    pub bars: Vec<(String, u64)>,
    pub colors: Vec<String>,
}

/// Labels paired with the first dataset's values, exact amounts kept.
pub fn labelled_values(payload: &BarChartPayload) -> Vec<(String, f64)> {
    let data = payload.datasets.first().map(|d| d.data.as_slice()).unwrap_or(&[]);
    payload.labels.iter().cloned().zip(data.iter().copied()).collect()
}

/// Negative totals draw as empty bars.
fn bar_height(value: f64) -> u64 {
    value.max(0.0).round() as u64
}

/// First dataset of a payload as whole-dollar bars.
pub fn bar_series(payload: &BarChartPayload) -> BarSeries {
    let dataset = payload.datasets.first();
    BarSeries {
        title: dataset.and_then(|d| d.label.clone()),
        bars: labelled_values(payload)
            .into_iter()
            .map(|(label, value)| (label, bar_height(value)))
            .collect(),
        colors: dataset.map(|d| d.background_color.clone()).unwrap_or_default(),
    }
}

/// Repeat-donor list as bars, one per donor in the order given.
pub fn repeated_series(donors: &[RepeatedDonor]) -> BarSeries {
    BarSeries {
        title: Some("Total Donations".to_string()),
        bars: donors
            .iter()
            .map(|d| (d.contributor_name.clone(), bar_height(d.total_amount)))
            .collect(),
        colors: PALETTE.iter().take(donors.len()).map(|c| c.to_string()).collect(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineSeries {
    pub labels: Vec<String>,
    pub points: Vec<(f64, f64)>,
    pub color: Option<String>,
    pub max: f64,
}

pub fn line_series(payload: &BarChartPayload) -> LineSeries {
    let dataset = payload.datasets.first();
    let points: Vec<(f64, f64)> = dataset
        .map(|d| d.data.iter().enumerate().map(|(i, v)| (i as f64, *v)).collect())
        .unwrap_or_default();
    let max = points.iter().map(|(_, y)| *y).fold(0.0, f64::max);
    LineSeries {
        labels: payload.labels.clone(),
        points,
        color: dataset.and_then(|d| d.border_color.clone()),
        max,
    }
}

/// `#4e79a7` -> (0x4e, 0x79, 0xa7).
pub fn parse_hex_color(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some((r, g, b))
}

/// `2025-03` -> `Mar 25`; anything else comes back unchanged.
pub fn month_label(month: &str) -> String {
    let Some((year, mm)) = month.split_once('-') else {
        return month.to_string();
    };
    let name = match mm {
        "01" => "Jan",
        "02" => "Feb",
        "03" => "Mar",
        "04" => "Apr",
        "05" => "May",
        "06" => "Jun",
        "07" => "Jul",
        "08" => "Aug",
        "09" => "Sep",
        "10" => "Oct",
        "11" => "Nov",
        "12" => "Dec",
        _ => return month.to_string(),
    };
    let short_year = year.get(year.len().saturating_sub(2)..).unwrap_or(year);
    format!("{name} {short_year}")
}

/// Pick nice round y-axis tick values (top and mid) given a max data value.
pub fn y_axis_ticks(max_val: f64) -> (f64, f64) {
    let steps = [
        1000.0, 2500.0, 5000.0, 10000.0, 25000.0, 50000.0, 100000.0, 250000.0, 500000.0,
        1000000.0, 2500000.0, 5000000.0, 10000000.0,
    ];
    let top = steps
        .iter()
        .copied()
        .find(|&s| s >= max_val)
        .unwrap_or(max_val);
    (top, top / 2.0)
}

/// Compact dollar label: `$2.5k`, `$1M`, `$300`.
pub fn format_k(val: f64) -> String {
    if val >= 1_000_000.0 {
        let m = val / 1_000_000.0;
        if m == m.floor() {
            format!("${}M", m as u64)
        } else {
            format!("${m:.1}M")
        }
    } else if val >= 1000.0 {
        let k = val / 1000.0;
        if k == k.floor() {
            format!("${}k", k as u64)
        } else {
            format!("${k:.1}k")
        }
    } else {
        format!("${}", val as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ChartDataset;

    #[test]
    fn test_proportions_two_decimals() {
        let legend = proportions(&[("A".into(), 100.0), ("B".into(), 300.0)]);
        assert_eq!(legend[0].percent, "25.00");
        assert_eq!(legend[1].percent, "75.00");
    }

    #[test]
    fn test_proportions_zero_total() {
        let legend = proportions(&[("A".into(), 0.0), ("B".into(), 0.0)]);
        assert!(legend.iter().all(|e| e.percent == "0.00"));
        assert!(proportions(&[]).is_empty());
    }

    #[test]
    fn test_group_proportions_keep_server_order() {
        let records = vec![
            ContributionGroupRecord { contributor_group: "Union".into(), contribution_amount: 1.0 },
            ContributionGroupRecord { contributor_group: "Corporate".into(), contribution_amount: 3.0 },
        ];
        let legend = group_proportions(&records);
        assert_eq!(legend[0].label, "Union");
        assert_eq!(legend[1].percent, "75.00");
    }

    #[test]
    fn test_bar_series_from_payload() {
        let payload = BarChartPayload {
            labels: vec!["A".into(), "B".into()],
            datasets: vec![ChartDataset {
                label: Some("Donation Amount".into()),
                data: vec![5400.4, -10.0],
                background_color: vec!["#4e79a7".into(), "#f28e2b".into()],
                border_color: None,
            }],
        };
        let series = bar_series(&payload);
        assert_eq!(series.bars, vec![("A".to_string(), 5400), ("B".to_string(), 0)]);
        assert_eq!(series.title.as_deref(), Some("Donation Amount"));
        assert_eq!(series.colors.len(), 2);
    }

    #[test]
    fn test_labelled_values_keep_cents_and_sign() {
        let payload = BarChartPayload {
            labels: vec!["Acme".into(), "Refunds Inc".into(), "No Data".into()],
            datasets: vec![ChartDataset {
                label: None,
                data: vec![1250.75, -40.5],
                background_color: vec![],
                border_color: None,
            }],
        };
        assert_eq!(
            labelled_values(&payload),
            vec![("Acme".to_string(), 1250.75), ("Refunds Inc".to_string(), -40.5)]
        );
    }

    #[test]
    fn test_repeated_series_keeps_list_order() {
        let donors = vec![
            RepeatedDonor { contributor_name: "Jane Doe".into(), total_amount: 250.4 },
            RepeatedDonor { contributor_name: "Sal Electric Co".into(), total_amount: 600.0 },
        ];
        let series = repeated_series(&donors);
        assert_eq!(
            series.bars,
            vec![("Jane Doe".to_string(), 250), ("Sal Electric Co".to_string(), 600)]
        );
        assert_eq!(series.colors, vec!["#4e79a7".to_string(), "#f28e2b".to_string()]);
        assert!(repeated_series(&[]).bars.is_empty());
    }

    #[test]
    fn test_bar_series_without_datasets() {
        let payload = BarChartPayload { labels: vec!["A".into()], datasets: vec![] };
        assert!(bar_series(&payload).bars.is_empty());
    }

    #[test]
    fn test_line_series_points() {
        let payload = BarChartPayload {
            labels: vec!["2025-01".into(), "2025-02".into()],
            datasets: vec![ChartDataset {
                label: None,
                data: vec![10.0, 30.0],
                background_color: vec![],
                border_color: Some("#27ae60".into()),
            }],
        };
        let line = line_series(&payload);
        assert_eq!(line.points, vec![(0.0, 10.0), (1.0, 30.0)]);
        assert_eq!(line.max, 30.0);
        assert_eq!(line.color.as_deref(), Some("#27ae60"));
    }

    #[test]
    fn test_hex_and_month_helpers() {
        assert_eq!(parse_hex_color("#4e79a7"), Some((0x4e, 0x79, 0xa7)));
        assert_eq!(parse_hex_color("4e79a7"), None);
        assert_eq!(month_label("2025-03"), "Mar 25");
        assert_eq!(month_label("Q1"), "Q1");
    }

    #[test]
    fn test_axis_ticks_and_labels() {
        assert_eq!(y_axis_ticks(3200.0), (5000.0, 2500.0));
        assert_eq!(format_k(2500.0), "$2.5k");
        assert_eq!(format_k(1_000_000.0), "$1M");
        assert_eq!(format_k(300.0), "$300");
    }
}
