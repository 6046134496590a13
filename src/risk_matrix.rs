use crate::metrics::FontMetrics;
use crate::page::{Color, DrawInstruction};

/// The side length of one matrix cell.
const CELL_SIZE: f32 = 55.0;
/// The space reserved on the left and below the grid for the axis labels.
const AXIS_GUTTER: f32 = 20.0;
/// The font size of the cell values and axis labels.
const MATRIX_TEXT_SIZE: f32 = 10.0;
/// The opacity of the cells that do not match the record's probability and severity.
const DIMMED_OPACITY: f32 = 0.4;

const GREEN: Color = Color::new(0.30, 0.69, 0.31);
const YELLOW: Color = Color::new(1.0, 0.84, 0.22);
const RED: Color = Color::new(0.85, 0.19, 0.15);

/// The color band a computed risk value falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskBand {
    Low,
    Medium,
    High,
}

impl RiskBand {
    /// Band a probability-times-severity value: up to 4 is low, up to 9 is medium,
    /// everything above is high.
    pub fn for_value(value: u8) -> RiskBand {
        if value <= 4 {
            RiskBand::Low
        } else if value <= 9 {
            RiskBand::Medium
        } else {
            RiskBand::High
        }
    }

    fn fill_color(self) -> Color {
        match self {
            RiskBand::Low => GREEN,
            RiskBand::Medium => YELLOW,
            RiskBand::High => RED,
        }
    }
}

/// The total width taken by the matrix, gutter included.
pub fn matrix_width() -> f32 {
    AXIS_GUTTER + 5.0 * CELL_SIZE
}

/// The total height taken by the matrix, gutter included.
pub fn matrix_height() -> f32 {
    5.0 * CELL_SIZE + AXIS_GUTTER
}

/// Draw the fixed 5 by 5 probability-times-severity diagram with its top-left grid
/// corner at (`x` + gutter, `top`).
///
/// Grid column `j` holds probability `j + 1` and grid row `i` (counted from the top)
/// holds severity `5 - i`, so severity grows upwards and probability grows to the
/// right. Every cell shows its value on its band color at reduced opacity; the single
/// cell matching the record's pair is drawn at full opacity with a thicker border.
///
/// This is a pure function over the fixed domain and the record's pair: it returns the
/// instructions and leaves cursor bookkeeping to the caller.
pub fn draw_risk_matrix(
    metrics: &FontMetrics,
    probability: u8,
    severity: u8,
    x: f32,
    top: f32,
) -> Vec<DrawInstruction> {
    let mut instructions = Vec::with_capacity(2 * 25 + 2);
    let grid_left = x + AXIS_GUTTER;

    for row in 0..5u8 {
        for column in 0..5u8 {
            let cell_probability = column + 1;
            let cell_severity = 5 - row;
            let value = cell_probability * cell_severity;
            let is_highlighted = cell_probability == probability && cell_severity == severity;

            let cell_x = grid_left + f32::from(column) * CELL_SIZE;
            let cell_top = top - f32::from(row) * CELL_SIZE;

            instructions.push(DrawInstruction::RectOp {
                x: cell_x,
                y: cell_top - CELL_SIZE,
                width: CELL_SIZE,
                height: CELL_SIZE,
                border_color: Color::BLACK,
                border_width: if is_highlighted { 2.0 } else { 0.5 },
                fill_color: Some(RiskBand::for_value(value).fill_color()),
                opacity: if is_highlighted { 1.0 } else { DIMMED_OPACITY },
            });

            let value_text = value.to_string();
            let value_width = metrics.measure_width(&value_text, MATRIX_TEXT_SIZE);
            instructions.push(DrawInstruction::TextRun {
                content: value_text,
                x: cell_x + (CELL_SIZE - value_width) / 2.0,
                y: cell_top - (CELL_SIZE + MATRIX_TEXT_SIZE) / 2.0,
                size: MATRIX_TEXT_SIZE,
                color: Color::BLACK,
                rotation_degrees: 0.0,
            });
        }
    }

    let grid_width = 5.0 * CELL_SIZE;
    let grid_bottom = top - grid_width;

    let probability_label = "Sannsynlighet";
    let probability_label_width = metrics.measure_width(probability_label, MATRIX_TEXT_SIZE);
    instructions.push(DrawInstruction::TextRun {
        content: probability_label.to_string(),
        x: grid_left + (grid_width - probability_label_width) / 2.0,
        y: grid_bottom - AXIS_GUTTER + (AXIS_GUTTER - MATRIX_TEXT_SIZE) / 2.0,
        size: MATRIX_TEXT_SIZE,
        color: Color::BLACK,
        rotation_degrees: 0.0,
    });

    // The severity label runs bottom-to-top along the left edge of the grid.
    let severity_label = "Alvorlighetsgrad";
    let severity_label_width = metrics.measure_width(severity_label, MATRIX_TEXT_SIZE);
    instructions.push(DrawInstruction::TextRun {
        content: severity_label.to_string(),
        x: x + (AXIS_GUTTER - MATRIX_TEXT_SIZE) / 2.0 + MATRIX_TEXT_SIZE,
        y: grid_bottom + (grid_width - severity_label_width) / 2.0,
        size: MATRIX_TEXT_SIZE,
        color: Color::BLACK,
        rotation_degrees: 90.0,
    });

    instructions
}
