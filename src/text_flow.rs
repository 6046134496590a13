use crate::metrics::FontMetrics;
use crate::page::{content_width, Color, DrawInstruction, PageManager, LINE_GAP, PAGE_MARGIN};

/// The literal rendered in place of an optional field the record left empty.
pub const NOT_SPECIFIED: &str = "Ikke spesifisert";

/// Wrap one paragraph (no explicit line breaks inside) into lines whose measured width
/// stays within `max_width`. The wrap is greedy and word-by-word; a single word that is
/// wider than `max_width` on its own is placed alone on its line and allowed to
/// overflow, it is never split mid-word.
pub fn wrap_paragraph(
    metrics: &FontMetrics,
    paragraph: &str,
    size: f32,
    max_width: f32,
) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current_line = String::new();

    for word in paragraph.split_whitespace() {
        if current_line.is_empty() {
            current_line = word.to_string();
            continue;
        }

        let candidate_line = format!("{} {}", current_line, word);
        if metrics.measure_width(&candidate_line, size) <= max_width {
            current_line = candidate_line;
        } else {
            lines.push(std::mem::take(&mut current_line));
            current_line = word.to_string();
        }
    }
    if !current_line.is_empty() {
        lines.push(current_line);
    }

    lines
}

/// Flows paragraphs of body text onto the pages, wrapping them to the content width,
/// advancing the shared cursor and breaking to a new page whenever a line would cross
/// the bottom margin.
pub struct TextFlowWriter<'a> {
    pages: &'a mut PageManager,
    metrics: FontMetrics,
}

impl<'a> TextFlowWriter<'a> {
    pub fn new(pages: &'a mut PageManager, metrics: FontMetrics) -> TextFlowWriter<'a> {
        TextFlowWriter { pages, metrics }
    }

    /// Write free text starting at the left margin, wrapped to the full content width.
    /// Explicit line breaks split the text into paragraphs first; a blank paragraph
    /// leaves one empty line worth of vertical space.
    pub fn write_paragraph(&mut self, text: &str, size: f32) {
        self.write_text_in_column(text, size, PAGE_MARGIN, content_width());
    }

    /// Write a `label: value` block; an absent value renders the fallback literal
    /// instead of being skipped.
    pub fn write_labeled(&mut self, label: &str, value: Option<&str>, size: f32) {
        let value = match value {
            Some(value) if !value.trim().is_empty() => value,
            _ => NOT_SPECIFIED,
        };
        self.write_paragraph(&format!("{}: {}", label, value), size);
    }

    /// Write free text wrapped to an arbitrary column, used by the metadata tables to
    /// flow value text next to its label. Returns the number of lines emitted.
    pub fn write_text_in_column(&mut self, text: &str, size: f32, x: f32, max_width: f32) -> usize {
        let line_height = size + LINE_GAP;
        let mut emitted_lines = 0;

        for paragraph in text.split('\n') {
            let lines = wrap_paragraph(&self.metrics, paragraph, size, max_width);
            if lines.is_empty() {
                // A blank paragraph still takes up one line of vertical space.
                self.pages.ensure_room(line_height);
                self.pages.advance_cursor(line_height);
                emitted_lines += 1;
                continue;
            }

            for line in lines {
                self.pages.ensure_room(line_height);
                self.pages.push(DrawInstruction::TextRun {
                    content: line,
                    x,
                    y: self.pages.cursor() - size,
                    size,
                    color: Color::BLACK,
                    rotation_degrees: 0.0,
                });
                self.pages.advance_cursor(line_height);
                emitted_lines += 1;
            }
        }

        emitted_lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{PAGE_HEIGHT, PAGE_MARGIN};

    fn text_runs(pages: &PageManager) -> Vec<(String, f32)> {
        pages
            .pages()
            .iter()
            .flat_map(|page| page.instructions.iter())
            .filter_map(|instruction| match instruction {
                DrawInstruction::TextRun { content, y, .. } => Some((content.clone(), *y)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn every_wrapped_line_fits_the_maximum_width() {
        let metrics = FontMetrics::regular();
        let text = "Avviket ble oppdaget under den ukentlige vernerunden på byggeplassen \
                    og må lukkes før neste inspeksjon av området";
        for line in wrap_paragraph(&metrics, text, 12.0, 200.0) {
            assert!(metrics.measure_width(&line, 12.0) <= 200.0, "line too wide: {line:?}");
        }
    }

    #[test]
    fn an_oversized_word_is_placed_alone_and_may_overflow() {
        let metrics = FontMetrics::regular();
        let text = "kort ekstraordinærgeneralforsamlingsprotokollvedlegg kort";
        let lines = wrap_paragraph(&metrics, text, 12.0, 60.0);
        assert_eq!(
            lines,
            vec![
                "kort".to_string(),
                "ekstraordinærgeneralforsamlingsprotokollvedlegg".to_string(),
                "kort".to_string(),
            ]
        );
        assert!(metrics.measure_width(&lines[1], 12.0) > 60.0);
    }

    #[test]
    fn wrapping_is_idempotent() {
        let metrics = FontMetrics::regular();
        let text = "Arbeidet omfatter riving av eksisterende vegger montering av nye \
                    systemvegger og oppgradering av det elektriske anlegget i andre etasje";
        let first_pass = wrap_paragraph(&metrics, text, 12.0, 180.0);
        let rejoined = first_pass.join(" ");
        let second_pass = wrap_paragraph(&metrics, &rejoined, 12.0, 180.0);
        assert_eq!(first_pass, second_pass);
    }

    #[test]
    fn lines_advance_the_cursor_and_break_pages_at_the_bottom_margin() {
        let mut pages = PageManager::new();
        let mut writer = TextFlowWriter::new(&mut pages, FontMetrics::regular());
        // Enough single-word paragraphs to run past the bottom of the first page.
        let paragraphs = vec!["linje"; 60].join("\n");
        writer.write_paragraph(&paragraphs, 12.0);

        assert!(pages.page_count() > 1);
        for page in pages.pages() {
            let mut previous_y = f32::INFINITY;
            for instruction in &page.instructions {
                if let DrawInstruction::TextRun { y, .. } = instruction {
                    assert!(*y < previous_y, "cursor moved upwards within a page");
                    assert!(*y >= PAGE_MARGIN - 12.0 - LINE_GAP);
                    previous_y = *y;
                }
            }
        }
    }

    #[test]
    fn a_labeled_block_with_a_missing_value_renders_the_fallback() {
        let mut pages = PageManager::new();
        let mut writer = TextFlowWriter::new(&mut pages, FontMetrics::regular());
        writer.write_labeled("Tiltak", None, 12.0);
        writer.write_labeled("Beskrivelse", Some("Test"), 12.0);

        let runs = text_runs(&pages);
        assert_eq!(runs[0].0, format!("Tiltak: {}", NOT_SPECIFIED));
        assert_eq!(runs[1].0, "Beskrivelse: Test");
    }

    #[test]
    fn the_first_line_sits_one_font_size_below_the_top_margin() {
        let mut pages = PageManager::new();
        let mut writer = TextFlowWriter::new(&mut pages, FontMetrics::regular());
        writer.write_paragraph("Test", 12.0);

        let runs = text_runs(&pages);
        assert_eq!(runs[0].1, PAGE_HEIGHT - PAGE_MARGIN - 12.0);
    }
}
