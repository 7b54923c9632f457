use crate::dashboard::{ChartSnapshot, Dashboard, MountPoint};
use std::fmt::Write;

/// Two-decimal percentage: `0.66667` -> `66.67%`.
pub fn format_percent(ratio: f64) -> String {
    if ratio.is_nan() {
        return "NaN".to_string();
    }
    format!("{:.2}%", ratio * 100.0)
}

/// Whole percentage, as used on the rank-distribution axis.
pub fn format_percent_whole(ratio: f64) -> String {
    if ratio.is_nan() {
        return "NaN".to_string();
    }
    format!("{:.0}%", ratio * 100.0)
}

pub fn format_fixed2(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    format!("{:.2}", value)
}

pub fn format_chart(mount: MountPoint, snapshot: &ChartSnapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", mount);

    match snapshot {
        ChartSnapshot::Empty => {
            let _ = writeln!(out, "  (not drawn)");
        }
        ChartSnapshot::Select { options } => {
            for o in options {
                let _ = writeln!(out, "  [{}] {}", o.value, o.key);
            }
        }
        ChartSnapshot::Number { value } => {
            let _ = writeln!(out, "  {}", format_percent(*value));
        }
        ChartSnapshot::Bar { bars } => {
            // Count bars are whole numbers; averages print with cents.
            let whole = mount == MountPoint::GenderBalance;
            for b in bars {
                let v = if whole { format!("{}", b.value) } else { format_fixed2(b.value) };
                let _ = writeln!(out, "  {:<12} {}", b.key.to_string(), v);
            }
        }
        ChartSnapshot::StackedBar { layers } => {
            for layer in layers {
                let cells: Vec<String> = layer
                    .bars
                    .iter()
                    .map(|b| format!("{}={}", b.key, format_percent_whole(b.value)))
                    .collect();
                let _ = writeln!(out, "  {:<12} {}", layer.name, cells.join(" "));
            }
        }
        ChartSnapshot::Scatter { x_domain, points } => {
            match x_domain {
                Some((lo, hi)) => {
                    let _ = writeln!(out, "  x domain [{}, {}]", lo, hi);
                }
                None => {
                    let _ = writeln!(out, "  x domain unknown");
                }
            }
            let shown = points.iter().filter(|p| p.count > 0).count();
            let _ = writeln!(out, "  {} of {} points selected", shown, points.len());
        }
    }
    out
}

/// Plain-text report of every chart, in mount order.
pub fn format_dashboard(dashboard: &Dashboard) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "SALARY DASHBOARD ({} records)", dashboard.index().size());
    let _ = writeln!(out, "--------------------------------------------------");
    for (mount, snapshot) in dashboard.snapshots() {
        out.push_str(&format_chart(mount, snapshot));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::Bar;
    use crate::index::Key;
    use rstest::rstest;

    #[rstest]
    #[case(2.0 / 3.0, "66.67%")]
    #[case(0.5, "50.00%")]
    #[case(0.0, "0.00%")]
    #[case(f64::NAN, "NaN")]
    fn test_format_percent(#[case] ratio: f64, #[case] expected: &str) {
        assert_eq!(format_percent(ratio), expected);
    }

    #[test]
    fn test_average_bars_print_two_decimals() {
        let snapshot = ChartSnapshot::Bar {
            bars: vec![Bar { key: Key::text("Female"), value: 101002.5 }],
        };
        let text = format_chart(MountPoint::AverageSalary, &snapshot);
        assert!(text.starts_with("#average-salary\n"));
        assert!(text.contains("101002.50"), "{}", text);
    }

    #[test]
    fn test_stacked_layers_print_whole_percent() {
        let snapshot = ChartSnapshot::StackedBar {
            layers: vec![crate::dashboard::Layer {
                name: "Prof".into(),
                bars: vec![Bar { key: Key::text("Male"), value: 0.666 }],
            }],
        };
        let text = format_chart(MountPoint::RankDistribution, &snapshot);
        assert!(text.contains("Male=67%"), "{}", text);
    }
}
