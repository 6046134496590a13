use crate::metrics::FontMetrics;
use crate::page::{
    content_width, Color, DrawInstruction, PageManager, Position, LINE_GAP, PAGE_MARGIN,
};
use crate::text_flow::{wrap_paragraph, TextFlowWriter, NOT_SPECIFIED};

/// The fixed height of the header strip row.
const HEADER_ROW_HEIGHT: f32 = 30.0;
/// The inner padding between a cell border and its text.
const CELL_PADDING: f32 = 4.0;
/// The width of the label column of the dynamic metadata table.
const LABEL_COLUMN_WIDTH: f32 = 160.0;
/// The font size of cell labels.
const LABEL_SIZE: f32 = 8.0;
/// The font size of cell values.
const VALUE_SIZE: f32 = 10.0;
/// The vertical gap left beneath a finished table.
const TABLE_GAP: f32 = 10.0;

/// Draws the two bordered table shapes the documents use: the fixed header strip at the
/// top of a record and the label/value metadata table.
pub struct TableRenderer<'a> {
    pages: &'a mut PageManager,
    metrics: FontMetrics,
}

impl<'a> TableRenderer<'a> {
    pub fn new(pages: &'a mut PageManager, metrics: FontMetrics) -> TableRenderer<'a> {
        TableRenderer { pages, metrics }
    }

    /// Draw a single-row strip of N equal-width cells across the content width, each
    /// holding a small label above its value. The row height is fixed; text that would
    /// not fit its cell is measured and clipped, never wrapped. That clipping is a
    /// known limitation of the strip, kept as-is.
    pub fn draw_header_strip(&mut self, cells: &[(String, String)]) {
        if cells.is_empty() {
            return;
        }
        self.pages.ensure_room(HEADER_ROW_HEIGHT + TABLE_GAP);

        let top = self.pages.cursor();
        let column_width = content_width() / cells.len() as f32;
        let inner_width = column_width - 2.0 * CELL_PADDING;

        for (index, (label, value)) in cells.iter().enumerate() {
            let cell_x = PAGE_MARGIN + index as f32 * column_width;
            self.pages.push(DrawInstruction::RectOp {
                x: cell_x,
                y: top - HEADER_ROW_HEIGHT,
                width: column_width,
                height: HEADER_ROW_HEIGHT,
                border_color: Color::GRAY,
                border_width: 0.5,
                fill_color: None,
                opacity: 1.0,
            });
            self.pages.push(DrawInstruction::TextRun {
                content: clip_to_width(&self.metrics, label, LABEL_SIZE, inner_width),
                x: cell_x + CELL_PADDING,
                y: top - CELL_PADDING - LABEL_SIZE,
                size: LABEL_SIZE,
                color: Color::GRAY,
                rotation_degrees: 0.0,
            });
            self.pages.push(DrawInstruction::TextRun {
                content: clip_to_width(&self.metrics, value, VALUE_SIZE, inner_width),
                x: cell_x + CELL_PADDING,
                y: top - HEADER_ROW_HEIGHT + CELL_PADDING,
                size: VALUE_SIZE,
                color: Color::BLACK,
                rotation_degrees: 0.0,
            });
        }

        self.pages.advance_cursor(HEADER_ROW_HEIGHT + TABLE_GAP);
    }

    /// Draw a label/value metadata table where each row grows to fit its wrapped value
    /// text. An absent value renders the fallback literal. Rows are not kept together
    /// across page boundaries: a tall row started near the bottom of a page spills its
    /// remaining lines onto the next page while its border stays on the page where the
    /// row began. That straddling is a known limitation, kept as-is.
    pub fn draw_metadata_table(&mut self, rows: &[(String, Option<String>)]) {
        let line_height = VALUE_SIZE + LINE_GAP;
        let value_x = PAGE_MARGIN + LABEL_COLUMN_WIDTH + CELL_PADDING;
        let value_width = content_width() - LABEL_COLUMN_WIDTH - 2.0 * CELL_PADDING;

        for (label, value) in rows {
            let value = match value {
                Some(value) if !value.trim().is_empty() => value.as_str(),
                _ => NOT_SPECIFIED,
            };

            let value_lines: usize = value
                .split('\n')
                .map(|paragraph| {
                    wrap_paragraph(&self.metrics, paragraph, VALUE_SIZE, value_width)
                        .len()
                        .max(1)
                })
                .sum();
            let row_height = value_lines as f32 * line_height + 2.0 * CELL_PADDING;

            self.pages.ensure_room(line_height + 2.0 * CELL_PADDING);
            let top = self.pages.cursor();

            self.pages.push(DrawInstruction::RectOp {
                x: PAGE_MARGIN,
                y: top - row_height,
                width: content_width(),
                height: row_height,
                border_color: Color::GRAY,
                border_width: 0.5,
                fill_color: None,
                opacity: 1.0,
            });
            self.pages.push(DrawInstruction::LineOp {
                start: Position::new(PAGE_MARGIN + LABEL_COLUMN_WIDTH, top),
                end: Position::new(PAGE_MARGIN + LABEL_COLUMN_WIDTH, top - row_height),
                color: Color::GRAY,
                thickness: 0.5,
            });
            self.pages.push(DrawInstruction::TextRun {
                content: label.clone(),
                x: PAGE_MARGIN + CELL_PADDING,
                y: top - CELL_PADDING - VALUE_SIZE,
                size: VALUE_SIZE,
                color: Color::BLACK,
                rotation_degrees: 0.0,
            });

            self.pages.advance_cursor(CELL_PADDING);
            let mut writer = TextFlowWriter::new(&mut *self.pages, self.metrics);
            writer.write_text_in_column(value, VALUE_SIZE, value_x, value_width);
            self.pages.advance_cursor(CELL_PADDING);
        }

        self.pages.advance_cursor(TABLE_GAP);
    }
}

/// Drop trailing characters until the text measures within `max_width`. No ellipsis is
/// added, matching the silent clip of the original strip cells.
fn clip_to_width(metrics: &FontMetrics, text: &str, size: f32, max_width: f32) -> String {
    if metrics.measure_width(text, size) <= max_width {
        return text.to_string();
    }

    let mut clipped = String::new();
    for character in text.chars() {
        let mut candidate = clipped.clone();
        candidate.push(character);
        if metrics.measure_width(&candidate, size) > max_width {
            break;
        }
        clipped = candidate;
    }
    clipped
}
