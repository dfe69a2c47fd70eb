//! # 收敛曲线
//!
//! 使用 `plotters` 绘制每次迭代的 max |误差| 以及收敛阈值线。
//! 输出格式由扩展名决定：`.svg` 为矢量图，其余为 PNG。
//!
//! ## 依赖关系
//! - 被 `commands/history.rs` 调用

use crate::error::{FixpressError, Result};

use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::Path;

fn plot_err<E: std::fmt::Debug>(e: E) -> FixpressError {
    FixpressError::Other(format!("Plotting failed: {:?}", e))
}

/// 绘制收敛曲线，`points` 为 (迭代序号, max |误差|)
pub fn generate_convergence_plot(
    points: &[(usize, f64)],
    threshold: Option<f64>,
    output_path: &Path,
) -> Result<()> {
    if points.is_empty() {
        return Err(FixpressError::Other("No data to plot".to_string()));
    }

    let is_svg = output_path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("svg"))
        .unwrap_or(false);

    if is_svg {
        let root = SVGBackend::new(output_path, (800, 600)).into_drawing_area();
        draw_chart(&root, points, threshold)
    } else {
        let root = BitMapBackend::new(output_path, (800, 600)).into_drawing_area();
        draw_chart(&root, points, threshold)
    }
}

fn draw_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    points: &[(usize, f64)],
    threshold: Option<f64>,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE).map_err(plot_err)?;

    let x_max = points.iter().map(|(x, _)| *x).max().unwrap_or(1) as f64;
    let y_max = points
        .iter()
        .map(|(_, y)| *y)
        .chain(threshold)
        .fold(0.0_f64, f64::max);
    let y_top = if y_max > 0.0 { y_max * 1.1 } else { 1.0 };

    let mut chart = ChartBuilder::on(root)
        .caption("Stress Convergence", ("sans-serif", 24))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0.5..(x_max + 0.5), 0.0..y_top)
        .map_err(plot_err)?;

    chart
        .configure_mesh()
        .x_desc("Iteration")
        .y_desc("max |target - measured| (kB)")
        .draw()
        .map_err(plot_err)?;

    chart
        .draw_series(LineSeries::new(
            points.iter().map(|(x, y)| (*x as f64, *y)),
            BLUE.stroke_width(2),
        ))
        .map_err(plot_err)?
        .label("max |error|")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE.stroke_width(2)));

    chart
        .draw_series(
            points
                .iter()
                .map(|(x, y)| Circle::new((*x as f64, *y), 4, BLUE.filled())),
        )
        .map_err(plot_err)?;

    if let Some(t) = threshold {
        chart
            .draw_series(LineSeries::new(
                vec![(0.5, t), (x_max + 0.5, t)],
                RED.stroke_width(1),
            ))
            .map_err(plot_err)?
            .label("threshold")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(plot_err)?;

    root.present().map_err(plot_err)?;
    Ok(())
}
