// src/dashboard/chart.rs

const HEIGHT: usize = 12;

/// Text line chart over years: `o` marks history, `*` marks forecast.
pub fn render(title: &str, history: &[(i32, f64)], forecast: &[(i32, f64)]) -> String {
    let points: Vec<(i32, f64, char)> = history
        .iter()
        .map(|(y, v)| (*y, *v, 'o'))
        .chain(forecast.iter().map(|(y, v)| (*y, *v, '*')))
        .filter(|(_, v, _)| v.is_finite())
        .collect();

    let mut out = format!("{}\n", title);
    let (Some(first), Some(last)) = (
        points.iter().map(|p| p.0).min(),
        points.iter().map(|p| p.0).max(),
    ) else {
        out.push_str("(no data)\n");
        return out;
    };

    let lo = points.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);
    let hi = points.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max);
    let span = if hi > lo { hi - lo } else { 1.0 };
    let width = (last - first) as usize + 1;

    let mut grid = vec![vec![' '; width]; HEIGHT];
    for (year, value, mark) in &points {
        let col = (year - first) as usize;
        let row = ((hi - value) / span * (HEIGHT - 1) as f64).round() as usize;
        grid[row.min(HEIGHT - 1)][col] = *mark;
    }

    for (i, line) in grid.iter().enumerate() {
        let label = match i {
            0 => format!("{:.4}", hi),
            i if i == HEIGHT - 1 => format!("{:.4}", lo),
            _ => String::new(),
        };
        let cells: String = line.iter().collect();
        out.push_str(&format!("{:>8} |{}\n", label, cells.trim_end()));
    }
    out.push_str(&format!("{:>8} +{}\n", "", "-".repeat(width)));
    let tail = last.to_string();
    let pad = width.saturating_sub(tail.len() + 4).max(1);
    out.push_str(&format!("{:>8}  {}{}{}\n", "", first, " ".repeat(pad), tail));
    out.push_str(&format!("{:>8}  o historical   * forecast\n", ""));
    out
}
