//! Rapportgen is a paginated layout engine for the structured records of a business
//! management application: deviation reports, change requests, safety-job analyses,
//! risk assessments and aggregated project reports. Given one such record, together
//! with the resolved bytes of its photo attachments, it measures and wraps the text,
//! tracks a drawing cursor down each page, breaks pages, lays out photo grids and
//! draws the bordered tables and the color-coded risk matrix the forms require.
//!
//! The engine deliberately stops at an abstract representation: the output is an
//! ordered list of fixed-size `Page` values, each holding an ordered list of
//! `DrawInstruction` operations. Encoding that representation into an actual binary
//! document, fetching photo bytes over the network and storing the result are all the
//! job of external collaborators, reachable through the `ImageFetcher` and
//! `PageSerializer` traits.

/// The module where the error types of the library are presented.
///
/// Only two situations are fatal for a composition call: a record that cannot be laid
/// out at all and a serializer that fails to encode the finished page list. Both are
/// expressed by the `ComposeError` type, which implements `std::fmt::Display` and
/// `std::error::Error` so it can be propagated and printed by the end user. A photo
/// attachment that cannot be fetched or decoded is deliberately not fatal; such
/// failures are described by `FetchError` and consumed inside the composer.
pub mod error;

/// The module where the width measurement of text is presented.
///
/// All the wrapping and placement decisions of the engine reduce to the question of
/// how wide a piece of text is at a given font size, which `FontMetrics` answers from
/// a static advance-width table of the single proportional face the documents use.
/// The measurement is pure and the table is shared, so any number of documents can be
/// laid out concurrently against the same metrics.
pub mod metrics;

/// The module where the page model and the drawing cursor are presented.
///
/// `PageManager` owns the append-only list of fixed-size pages and the single mutable
/// vertical cursor of the page being drawn. Instructions are only ever appended to the
/// most recent page and the cursor only ever moves downwards, resetting to the top of
/// the content area on every page break. Every other component draws exclusively
/// through this interface.
pub mod page;

/// The module where the flowing of body text is presented. Paragraphs are wrapped
/// word-by-word against the measured content width; a word too wide to fit on any
/// line is placed alone and allowed to overflow rather than being split.
pub mod text_flow;

/// The module where the photo grid layout is presented. Images are placed
/// left-to-right into rows, scaled from their natural pixel size with the aspect
/// ratio preserved, optionally turned a quarter turn, and captioned beneath. An
/// attachment that could not be loaded keeps its position in the sequence as a
/// fallback text line.
pub mod image_grid;

/// The module where the two bordered table shapes are presented: the fixed-height
/// header strip of equal-width cells and the dynamic label/value metadata table.
pub mod table;

/// The module where the 5 by 5 probability-times-severity diagram is presented, as a
/// pure function from the record's pair to drawing instructions.
pub mod risk_matrix;

/// The module where the record input format is presented. Records arrive as JSON
/// documents tagged with their kind and are validated before any layout starts.
pub mod record;

/// The module where the `DocumentComposer` entry point is presented, together with
/// the `ImageFetcher` and `PageSerializer` collaborator traits. The composer selects
/// the fixed section plan of the record kind and runs the layout components against
/// one shared `PageManager`.
pub mod composer;
