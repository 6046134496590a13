use crate::metrics::FontMetrics;
use crate::page::{Color, DrawInstruction, PageManager, IMAGE_GAP, LINE_GAP, PAGE_MARGIN};

/// The font size of the caption drawn beneath an image.
const CAPTION_SIZE: f32 = 10.0;
/// The vertical gap between the bottom edge of an image and its caption.
const CAPTION_GAP: f32 = 2.0;

/// A photo attachment whose bytes have been fetched and decoded, so its natural pixel
/// size is known. The natural size is kept as decoded; scaling and rotation are applied
/// at layout time only.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedImage {
    pub reference: String,
    pub natural_width: u32,
    pub natural_height: u32,
    pub caption: Option<String>,
}

/// One entry of an image gallery, in the order the record declared its attachments. An
/// attachment whose bytes could not be fetched or decoded stays in the sequence as
/// `Missing`, so the rendered document accounts for every declared attachment.
#[derive(Debug, Clone, PartialEq)]
pub enum GalleryItem {
    Image(ResolvedImage),
    Missing { reference: String },
}

/// Lays out a sequence of gallery items in a left-to-right, top-to-bottom grid,
/// advancing the shared cursor and breaking pages when a row no longer fits.
pub struct ImagePlacer<'a> {
    pages: &'a mut PageManager,
    metrics: FontMetrics,
}

impl<'a> ImagePlacer<'a> {
    pub fn new(pages: &'a mut PageManager, metrics: FontMetrics) -> ImagePlacer<'a> {
        ImagePlacer { pages, metrics }
    }

    /// Place the items `per_row` to a row. Every image is scaled from its natural pixel
    /// size by the single `scale` factor, which preserves the aspect ratio. A rotation
    /// of an odd number of quarter turns swaps the effective width and height for
    /// layout; the instruction still records the unrotated scaled size together with
    /// the rotation, so the serializer can apply the turn itself.
    ///
    /// The cursor drop at the end of a row is the maximum cell height (image plus
    /// caption allowance) within that row, so rows of mixed-size images stay aligned. A
    /// missing item closes the row in progress and takes a full-width fallback text
    /// line of its own; the items around it keep their declared order.
    pub fn place_images(
        &mut self,
        items: &[GalleryItem],
        per_row: usize,
        scale: f32,
        rotation_degrees: f32,
    ) {
        let per_row = per_row.max(1);
        let quarter_turns = (rotation_degrees / 90.0).round() as i32;
        let swaps_axes = quarter_turns.rem_euclid(2) == 1;

        let mut row = RowState::new();

        for item in items {
            let image = match item {
                GalleryItem::Image(image) => image,
                GalleryItem::Missing { reference } => {
                    self.close_row(&mut row);
                    self.write_fallback_line(reference);
                    continue;
                }
            };

            let scaled_width = image.natural_width as f32 * scale;
            let scaled_height = image.natural_height as f32 * scale;
            let (effective_width, effective_height) = if swaps_axes {
                (scaled_height, scaled_width)
            } else {
                (scaled_width, scaled_height)
            };
            let caption_allowance = match image.caption {
                Some(_) => CAPTION_GAP + CAPTION_SIZE,
                None => 0.0,
            };
            let cell_height = effective_height + caption_allowance;

            if row.placed_in_row == per_row {
                self.close_row(&mut row);
            }
            if self.pages.ensure_room(cell_height) {
                // The page break starts a fresh row at the top of the new page.
                row = RowState::new();
            }

            let top = self.pages.cursor();
            self.pages.push(DrawInstruction::ImageOp {
                image_ref: image.reference.clone(),
                x: row.x,
                y: top - effective_height,
                width: scaled_width,
                height: scaled_height,
                rotation_degrees,
            });
            if let Some(caption) = &image.caption {
                let caption_width = self.metrics.measure_width(caption, CAPTION_SIZE);
                self.pages.push(DrawInstruction::TextRun {
                    content: caption.clone(),
                    x: row.x + (effective_width - caption_width) / 2.0,
                    y: top - effective_height - CAPTION_GAP - CAPTION_SIZE,
                    size: CAPTION_SIZE,
                    color: Color::BLACK,
                    rotation_degrees: 0.0,
                });
            }

            row.x += effective_width + IMAGE_GAP;
            row.placed_in_row += 1;
            row.maximum_cell_height = row.maximum_cell_height.max(cell_height);
        }

        self.close_row(&mut row);
    }

    /// Drop the cursor past the row in progress, if any, and reset the row state.
    fn close_row(&mut self, row: &mut RowState) {
        if row.placed_in_row > 0 {
            self.pages.advance_cursor(row.maximum_cell_height + IMAGE_GAP);
        }
        *row = RowState::new();
    }

    /// One full-width text line standing in for an attachment that could not be loaded.
    fn write_fallback_line(&mut self, reference: &str) {
        let size = CAPTION_SIZE;
        let line_height = size + LINE_GAP;
        self.pages.ensure_room(line_height);
        self.pages.push(DrawInstruction::TextRun {
            content: format!("Bildet kunne ikke lastes: {}", reference),
            x: PAGE_MARGIN,
            y: self.pages.cursor() - size,
            size,
            color: Color::GRAY,
            rotation_degrees: 0.0,
        });
        self.pages.advance_cursor(line_height);
    }
}

struct RowState {
    x: f32,
    placed_in_row: usize,
    maximum_cell_height: f32,
}

impl RowState {
    fn new() -> RowState {
        RowState {
            x: PAGE_MARGIN,
            placed_in_row: 0,
            maximum_cell_height: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain_image(reference: &str, width: u32, height: u32) -> GalleryItem {
        GalleryItem::Image(ResolvedImage {
            reference: reference.to_string(),
            natural_width: width,
            natural_height: height,
            caption: None,
        })
    }

    fn image_ops(pages: &PageManager) -> Vec<(String, f32, f32, f32, f32)> {
        pages
            .pages()
            .iter()
            .flat_map(|page| page.instructions.iter())
            .filter_map(|instruction| match instruction {
                DrawInstruction::ImageOp {
                    image_ref,
                    x,
                    y,
                    width,
                    height,
                    ..
                } => Some((image_ref.clone(), *x, *y, *width, *height)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn five_images_two_per_row_form_three_rows_with_a_short_last_row() {
        let mut pages = PageManager::new();
        let mut placer = ImagePlacer::new(&mut pages, FontMetrics::regular());
        let items: Vec<_> = (0..5)
            .map(|index| plain_image(&format!("photo-{index}.jpg"), 400, 300))
            .collect();
        placer.place_images(&items, 2, 0.5, 0.0);

        let ops = image_ops(&pages);
        assert_eq!(ops.len(), 5);

        // Column index is i mod 2, row index is i / 2.
        let column_x = [PAGE_MARGIN, PAGE_MARGIN + 200.0 + IMAGE_GAP];
        let mut row_tops = Vec::new();
        for (index, (_, x, y, width, height)) in ops.iter().enumerate() {
            assert_eq!(*x, column_x[index % 2]);
            assert_eq!(*width, 200.0);
            assert_eq!(*height, 150.0);
            let top = y + height;
            if index % 2 == 0 {
                row_tops.push(top);
            } else {
                assert_eq!(top, row_tops[index / 2]);
            }
        }
        assert_eq!(row_tops.len(), 3);
        assert!(row_tops[0] > row_tops[1] && row_tops[1] > row_tops[2]);
        // The last row holds a single left-aligned image.
        assert_eq!(ops[4].1, PAGE_MARGIN);
    }

    #[test]
    fn the_row_advance_uses_the_tallest_image_of_the_row() {
        let mut pages = PageManager::new();
        let mut placer = ImagePlacer::new(&mut pages, FontMetrics::regular());
        let items = vec![
            plain_image("short.jpg", 200, 100),
            plain_image("tall.jpg", 200, 400),
            plain_image("next-row.jpg", 200, 100),
        ];
        placer.place_images(&items, 2, 1.0, 0.0);

        let ops = image_ops(&pages);
        let first_row_top = ops[0].2 + ops[0].4;
        let second_row_top = ops[2].2 + ops[2].4;
        // The second row starts below the tall image, not below the last-placed one.
        assert_eq!(second_row_top, first_row_top - 400.0 - IMAGE_GAP);
    }

    #[test]
    fn a_quarter_turn_swaps_the_layout_footprint_but_not_the_stored_size() {
        let mut pages = PageManager::new();
        let mut placer = ImagePlacer::new(&mut pages, FontMetrics::regular());
        let items = vec![
            plain_image("rotated-a.jpg", 400, 200),
            plain_image("rotated-b.jpg", 400, 200),
        ];
        placer.place_images(&items, 2, 1.0, 90.0);

        let ops = image_ops(&pages);
        // Stored size stays 400 by 200.
        assert_eq!((ops[0].3, ops[0].4), (400.0, 200.0));
        // The second image starts one effective width (200) plus the gap further right.
        assert_eq!(ops[1].1, PAGE_MARGIN + 200.0 + IMAGE_GAP);
    }

    #[test]
    fn a_missing_item_becomes_one_fallback_line_in_declared_order() {
        let mut pages = PageManager::new();
        let mut placer = ImagePlacer::new(&mut pages, FontMetrics::regular());
        let items = vec![
            plain_image("a.jpg", 200, 100),
            plain_image("b.jpg", 200, 100),
            GalleryItem::Missing {
                reference: "c.jpg".to_string(),
            },
            plain_image("d.jpg", 200, 100),
            plain_image("e.jpg", 200, 100),
        ];
        placer.place_images(&items, 2, 1.0, 0.0);

        let instructions: Vec<_> = pages
            .pages()
            .iter()
            .flat_map(|page| page.instructions.iter())
            .collect();
        let order: Vec<String> = instructions
            .iter()
            .map(|instruction| match instruction {
                DrawInstruction::ImageOp { image_ref, .. } => image_ref.clone(),
                DrawInstruction::TextRun { content, .. } => content.clone(),
                _ => String::new(),
            })
            .collect();
        assert_eq!(
            order,
            vec![
                "a.jpg",
                "b.jpg",
                "Bildet kunne ikke lastes: c.jpg",
                "d.jpg",
                "e.jpg",
            ]
        );
    }

    #[test]
    fn a_row_that_does_not_fit_moves_to_a_fresh_page() {
        let mut pages = PageManager::new();
        // Eat most of the first page.
        pages.advance_cursor(650.0);
        let mut placer = ImagePlacer::new(&mut pages, FontMetrics::regular());
        placer.place_images(&[plain_image("big.jpg", 300, 300)], 1, 1.0, 0.0);

        assert_eq!(pages.page_count(), 2);
        let ops = image_ops(&pages);
        assert_eq!(ops[0].1, PAGE_MARGIN);
        assert_eq!(ops[0].2 + ops[0].4, crate::page::PAGE_HEIGHT - PAGE_MARGIN);
    }

    #[test]
    fn captions_are_centered_beneath_their_images() {
        let mut pages = PageManager::new();
        let metrics = FontMetrics::regular();
        let mut placer = ImagePlacer::new(&mut pages, metrics);
        placer.place_images(
            &[GalleryItem::Image(ResolvedImage {
                reference: "captioned.jpg".to_string(),
                natural_width: 400,
                natural_height: 300,
                caption: Some("Skade på rekkverk".to_string()),
            })],
            1,
            0.5,
            0.0,
        );

        let caption = pages
            .pages()
            .iter()
            .flat_map(|page| page.instructions.iter())
            .find_map(|instruction| match instruction {
                DrawInstruction::TextRun { content, x, .. } => Some((content.clone(), *x)),
                _ => None,
            })
            .unwrap();
        let caption_width = metrics.measure_width("Skade på rekkverk", CAPTION_SIZE);
        assert_eq!(caption.1, PAGE_MARGIN + (200.0 - caption_width) / 2.0);
    }
}
