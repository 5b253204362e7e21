//! Figure rendering for tracked runs.
//!
//! Runs log a training loss curve as an SVG artifact; the markup is
//! generated directly so no plotting toolchain is needed at runtime.

use std::fmt::Write;

const WIDTH: f64 = 640.0;
const HEIGHT: f64 = 400.0;
const MARGIN: f64 = 48.0;

/// Renders a per-epoch training loss curve as an SVG document.
#[must_use]
pub fn loss_curve_svg(losses: &[f32]) -> String {
    let mut svg = String::new();

    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH}" height="{HEIGHT}" viewBox="0 0 {WIDTH} {HEIGHT}">"#
    );
    let _ = write!(
        svg,
        r#"<rect width="{WIDTH}" height="{HEIGHT}" fill="white"/>"#
    );
    let _ = write!(
        svg,
        r#"<text x="{}" y="24" text-anchor="middle" font-family="sans-serif" font-size="16">Training loss per epoch</text>"#,
        WIDTH / 2.0
    );

    // Axes
    let _ = write!(
        svg,
        r#"<line x1="{MARGIN}" y1="{y0}" x2="{x1}" y2="{y0}" stroke="black"/><line x1="{MARGIN}" y1="{MARGIN}" x2="{MARGIN}" y2="{y0}" stroke="black"/>"#,
        y0 = HEIGHT - MARGIN,
        x1 = WIDTH - MARGIN,
    );

    if !losses.is_empty() {
        let min = losses.iter().copied().fold(f32::INFINITY, f32::min) as f64;
        let max = losses.iter().copied().fold(f32::NEG_INFINITY, f32::max) as f64;
        let span = if max > min { max - min } else { 1.0 };

        let x_step = if losses.len() > 1 {
            (WIDTH - 2.0 * MARGIN) / (losses.len() - 1) as f64
        } else {
            0.0
        };

        let points: Vec<String> = losses
            .iter()
            .enumerate()
            .map(|(i, &loss)| {
                let x = MARGIN + x_step * i as f64;
                let y = HEIGHT - MARGIN
                    - (f64::from(loss) - min) / span * (HEIGHT - 2.0 * MARGIN);
                format!("{x:.1},{y:.1}")
            })
            .collect();

        let _ = write!(
            svg,
            r#"<polyline points="{}" fill="none" stroke="steelblue" stroke-width="2"/>"#,
            points.join(" ")
        );

        let _ = write!(
            svg,
            r#"<text x="{x}" y="{y}" font-family="sans-serif" font-size="12">final loss: {final_loss:.6}</text>"#,
            x = MARGIN + 8.0,
            y = MARGIN + 16.0,
            final_loss = losses[losses.len() - 1],
        );
    }

    svg.push_str("</svg>");
    svg
}
