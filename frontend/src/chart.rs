//! Two-bar probability chart for a single prediction.
//!
//! The service only returns the winning label's score; the other class gets
//! `1 - score`. Rendering produces a standalone SVG element that is embedded
//! directly in the result page.

use crate::types::{Label, PredictionResult};

/// Upper bound of the y axis. Leaves room for value labels above a full bar.
pub const Y_AXIS_MAX: f32 = 1.2;

const WIDTH: f32 = 600.0;
const HEIGHT: f32 = 400.0;
const MARGIN: f32 = 50.0;
const BAR_FILL: f32 = 0.8;
const TICK_STEP: f32 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bar {
    pub label: Label,
    pub probability: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartData {
    pub bars: [Bar; 2],
}

impl ChartData {
    /// Bars in `[POSITIVE, NEGATIVE]` order.
    pub fn from_result(result: &PredictionResult) -> Self {
        let score = result.score.clamp(0.0, 1.0);
        let bar = |label: Label| Bar {
            label,
            probability: if label == result.label {
                score
            } else {
                1.0 - score
            },
        };
        ChartData {
            bars: Label::ALL.map(bar),
        }
    }

    pub fn probabilities(&self) -> [f32; 2] {
        self.bars.map(|b| b.probability)
    }

    pub fn to_svg(&self) -> String {
        let plot_w = WIDTH - 2.0 * MARGIN;
        let plot_h = HEIGHT - 2.0 * MARGIN;
        let y_of = |v: f32| MARGIN + plot_h - v / Y_AXIS_MAX * plot_h;
        let band = plot_w / self.bars.len() as f32;
        let bar_w = band * BAR_FILL;

        let mut svg = format!(
            r#"<svg class="chart" xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {WIDTH} {HEIGHT}" width="100%" height="{HEIGHT}" role="img" aria-label="Class probabilities">"#
        );

        let ticks = (Y_AXIS_MAX / TICK_STEP).round() as usize;
        for i in 0..=ticks {
            let v = i as f32 * TICK_STEP;
            let y = y_of(v);
            svg.push_str(&format!(
                r##"<line x1="{MARGIN}" y1="{y:.1}" x2="{x2}" y2="{y:.1}" stroke="#e5e7eb"/><text x="{tx}" y="{ty:.1}" font-size="12" text-anchor="end" fill="black">{v:.1}</text>"##,
                x2 = MARGIN + plot_w,
                tx = MARGIN - 8.0,
                ty = y + 4.0,
            ));
        }

        for (i, bar) in self.bars.iter().enumerate() {
            let x = MARGIN + band * i as f32 + (band - bar_w) / 2.0;
            let top = y_of(bar.probability);
            let center = x + bar_w / 2.0;
            svg.push_str(&format!(
                r#"<rect class="bar" data-class="{label}" x="{x:.1}" y="{top:.1}" width="{bar_w:.1}" height="{h:.1}" fill="{fill}"/><text x="{center:.1}" y="{vy:.1}" font-size="14" text-anchor="middle" fill="black">{p:.2}</text><text x="{center:.1}" y="{ly:.1}" font-size="12" text-anchor="middle" fill="black">{label}</text>"#,
                label = bar.label,
                h = MARGIN + plot_h - top,
                fill = bar_color(bar.label),
                vy = top - 6.0,
                p = bar.probability,
                ly = MARGIN + plot_h + 18.0,
            ));
        }

        svg.push_str(&format!(
            r#"<text x="{cx}" y="{by}" font-size="13" text-anchor="middle">Class</text><text x="14" y="{cy}" font-size="13" text-anchor="middle" transform="rotate(-90 14 {cy})">Probability</text></svg>"#,
            cx = MARGIN + plot_w / 2.0,
            by = HEIGHT - 8.0,
            cy = MARGIN + plot_h / 2.0,
        ));
        svg
    }
}

fn bar_color(label: Label) -> &'static str {
    match label {
        Label::Positive => "#636efa",
        Label::Negative => "#ef553b",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: [f32; 2], expected: [f32; 2]) {
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-6, "{actual:?} != {expected:?}");
        }
    }

    #[test]
    fn positive_result_fills_complement_for_negative() {
        let chart = ChartData::from_result(&PredictionResult {
            label: Label::Positive,
            score: 0.93,
        });
        assert_eq!(chart.bars.map(|b| b.label), [Label::Positive, Label::Negative]);
        assert_close(chart.probabilities(), [0.93, 0.07]);
    }

    #[test]
    fn negative_result_keeps_class_order() {
        let chart = ChartData::from_result(&PredictionResult {
            label: Label::Negative,
            score: 0.8,
        });
        assert_close(chart.probabilities(), [0.2, 0.8]);
    }

    #[test]
    fn derivation_is_idempotent() {
        let result = PredictionResult {
            label: Label::Positive,
            score: 0.61,
        };
        assert_eq!(ChartData::from_result(&result), ChartData::from_result(&result));
        assert_eq!(
            ChartData::from_result(&result).to_svg(),
            ChartData::from_result(&result).to_svg()
        );
    }

    #[test]
    fn svg_has_two_bars_with_two_decimal_labels() {
        let svg = ChartData::from_result(&PredictionResult {
            label: Label::Positive,
            score: 0.93,
        })
        .to_svg();
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert_eq!(svg.matches(r#"class="bar""#).count(), 2);
        assert!(svg.contains(">0.93<"));
        assert!(svg.contains(">0.07<"));
        assert!(svg.contains(">1.2<"));
        assert!(!svg.contains(">1.4<"));
    }

    #[test]
    fn full_confidence_bar_stays_inside_axis() {
        let chart = ChartData::from_result(&PredictionResult {
            label: Label::Negative,
            score: 1.0,
        });
        assert_close(chart.probabilities(), [0.0, 1.0]);
        let svg = chart.to_svg();
        assert!(svg.contains(">1.00<"));
        assert!(svg.contains(">0.00<"));
    }
}
