//! Text scatter plot of two numeric columns.

use crate::error::{CopilotError, Result};

pub const DEFAULT_WIDTH: usize = 60;
pub const DEFAULT_HEIGHT: usize = 20;

pub fn render_scatter(
    x_label: &str,
    y_label: &str,
    xs: &[f64],
    ys: &[f64],
    width: usize,
    height: usize,
) -> Result<String> {
    if xs.len() != ys.len() {
        return Err(CopilotError::Plot(format!(
            "`{x_label}` has {} values but `{y_label}` has {}",
            xs.len(),
            ys.len()
        )));
    }
    if width < 2 || height < 2 {
        return Err(CopilotError::Plot("plot area is too small".to_string()));
    }
    if xs.is_empty() {
        return Ok(format!("{y_label} vs {x_label}: no points\n"));
    }

    let (x_min, x_max) = bounds(xs);
    let (y_min, y_max) = bounds(ys);
    let mut grid = vec![vec![' '; width]; height];

    for (&x, &y) in xs.iter().zip(ys) {
        let col = scale(x, x_min, x_max, width);
        let row = height - 1 - scale(y, y_min, y_max, height);
        grid[row][col] = match grid[row][col] {
            ' ' => '*',
            _ => '#',
        };
    }

    let mut output = format!("{y_label} (max {y_max:.2})\n");
    for line in grid {
        output.push('|');
        output.extend(line);
        output.push('\n');
    }
    output.push('+');
    output.push_str(&"-".repeat(width));
    output.push('\n');
    output.push_str(&format!("{x_label}: {x_min:.2} .. {x_max:.2}, {y_label} min {y_min:.2}\n"));
    Ok(output)
}

fn bounds(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)))
}

fn scale(value: f64, min: f64, max: f64, cells: usize) -> usize {
    if max <= min {
        return cells / 2;
    }
    let position = (value - min) / (max - min) * (cells - 1) as f64;
    (position.round() as usize).min(cells - 1)
}
