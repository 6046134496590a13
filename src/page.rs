use serde::{Deserialize, Serialize};

/// The fixed page width in points (A4 portrait).
pub const PAGE_WIDTH: f32 = 595.28;
/// The fixed page height in points (A4 portrait).
pub const PAGE_HEIGHT: f32 = 841.89;
/// The uniform margin kept free on all four sides of every page.
pub const PAGE_MARGIN: f32 = 50.0;
/// The vertical gap added below each emitted line of text on top of its font size.
pub const LINE_GAP: f32 = 4.0;
/// The horizontal and vertical gap between images placed in a grid.
pub const IMAGE_GAP: f32 = 10.0;

/// The width available to content on every page, between the left and right margins.
pub fn content_width() -> f32 {
    PAGE_WIDTH - 2.0 * PAGE_MARGIN
}

/// An RGB color with components in the 0 to 1 range.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Color {
    pub red: f32,
    pub green: f32,
    pub blue: f32,
}

impl Color {
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0);
    pub const GRAY: Color = Color::new(0.5, 0.5, 0.5);

    pub const fn new(red: f32, green: f32, blue: f32) -> Color {
        Color { red, green, blue }
    }
}

/// A point on a page, in points from the bottom-left corner.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub const fn new(x: f32, y: f32) -> Position {
        Position { x, y }
    }
}

/// One abstract drawing operation on a page. The engine never produces file bytes
/// itself: the ordered instruction lists are handed to an external serializer which
/// encodes them into the final binary document.
///
/// All coordinates use the conventional bottom-left page origin. For `TextRun` the
/// position is the text baseline origin; for `ImageOp` it is the bottom-left corner of
/// the placed image; for `RectOp` it is the bottom-left corner of the rectangle.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum DrawInstruction {
    #[serde(rename_all = "camelCase")]
    TextRun {
        content: String,
        x: f32,
        y: f32,
        size: f32,
        color: Color,
        /// Counterclockwise rotation of the run around its origin. Only the severity
        /// axis label of the risk matrix uses a non-zero value.
        rotation_degrees: f32,
    },
    #[serde(rename_all = "camelCase")]
    ImageOp {
        image_ref: String,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        rotation_degrees: f32,
    },
    #[serde(rename_all = "camelCase")]
    LineOp {
        start: Position,
        end: Position,
        color: Color,
        thickness: f32,
    },
    #[serde(rename_all = "camelCase")]
    RectOp {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        border_color: Color,
        border_width: f32,
        fill_color: Option<Color>,
        opacity: f32,
    },
}

/// A single finished or in-progress page: fixed dimensions plus the ordered list of
/// drawing instructions placed on it so far.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub width: f32,
    pub height: f32,
    pub instructions: Vec<DrawInstruction>,
}

impl Page {
    fn new() -> Page {
        Page {
            width: PAGE_WIDTH,
            height: PAGE_HEIGHT,
            instructions: Vec::new(),
        }
    }
}

/// The owner of the append-only page list and of the single drawing cursor.
///
/// The cursor is the current vertical position on the most recent page. Within one page
/// it only ever moves downwards; the only way it moves back up is the reset to
/// `PAGE_HEIGHT - PAGE_MARGIN` that comes with a fresh page. Earlier pages are never
/// revisited: instructions are always appended to the most recent page, so a page is
/// effectively immutable once a later one exists.
#[derive(Debug)]
pub struct PageManager {
    pages: Vec<Page>,
    cursor: f32,
}

impl PageManager {
    /// Create a manager holding the first, still empty page with the cursor at the top
    /// of its content area.
    pub fn new() -> PageManager {
        PageManager {
            pages: vec![Page::new()],
            cursor: PAGE_HEIGHT - PAGE_MARGIN,
        }
    }

    /// Append a fresh page and reset the cursor to the top of its content area.
    pub fn new_page(&mut self) {
        self.pages.push(Page::new());
        self.cursor = PAGE_HEIGHT - PAGE_MARGIN;
        log::debug!("Started page {}", self.pages.len());
    }

    /// The current vertical drawing position on the most recent page.
    pub fn cursor(&self) -> f32 {
        self.cursor
    }

    /// Move the cursor down by `drop` points. The cursor never moves upwards within a
    /// page, so `drop` must not be negative.
    pub fn advance_cursor(&mut self, drop: f32) {
        debug_assert!(drop >= 0.0, "the cursor must not move upwards within a page");
        self.cursor -= drop;
    }

    /// Make sure at least `needed` points of vertical room remain above the bottom
    /// margin, breaking to a fresh page if they do not. Returns whether a page break
    /// happened.
    pub fn ensure_room(&mut self, needed: f32) -> bool {
        if self.cursor - needed < PAGE_MARGIN {
            self.new_page();
            true
        } else {
            false
        }
    }

    /// Append a drawing instruction to the most recent page.
    pub fn push(&mut self, instruction: DrawInstruction) {
        // `pages` is never empty, the constructor creates the first page.
        if let Some(page) = self.pages.last_mut() {
            page.instructions.push(instruction);
        }
    }

    /// The number of pages created so far.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// The pages created so far, in order.
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Finish the document and hand over the final ordered page list.
    pub fn into_pages(self) -> Vec<Page> {
        self.pages
    }
}

impl Default for PageManager {
    fn default() -> Self {
        PageManager::new()
    }
}
