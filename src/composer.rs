use image::GenericImageView as _;

use crate::error::{ComposeError, FetchError};
use crate::image_grid::{GalleryItem, ImagePlacer, ResolvedImage};
use crate::metrics::FontMetrics;
use crate::page::{Page, PageManager};
use crate::record::{
    ChangeRecord, DeviationRecord, ProjectReportRecord, Record, RiskAssessmentRecord,
    SafetyJobAnalysisRecord,
};
use crate::risk_matrix::{draw_risk_matrix, matrix_height};
use crate::table::TableRenderer;
use crate::text_flow::{TextFlowWriter, NOT_SPECIFIED};

/// The font size of the document title.
const TITLE_SIZE: f32 = 16.0;
/// The font size of section headings.
const HEADING_SIZE: f32 = 13.0;
/// The font size of body text and labeled blocks.
const BODY_SIZE: f32 = 12.0;
/// The scale factor applied to the natural pixel size of gallery photos.
const IMAGE_SCALE: f32 = 0.25;
/// How many photos are placed per gallery row.
const IMAGES_PER_ROW: usize = 2;

/// The collaborator that turns an attachment reference into raw image bytes. Fetching
/// is the only I/O near the engine and stays outside of it; an implementation is free
/// to prefetch concurrently, since the composer consumes attachments strictly in the
/// order the record declares them.
pub trait ImageFetcher {
    fn fetch(&self, reference: &str) -> Result<Vec<u8>, FetchError>;
}

/// The collaborator that encodes the finished page list into its final binary form.
pub trait PageSerializer {
    type Output;

    fn serialize(
        &self,
        pages: &[Page],
        file_name: &str,
    ) -> Result<Self::Output, Box<dyn std::error::Error>>;
}

/// A serializer that encodes the page list as pretty-printed JSON, keyed by the output
/// file name. The driver binary uses it, and it doubles as the reference serializer in
/// the tests.
pub struct JsonSerializer;

impl PageSerializer for JsonSerializer {
    type Output = (String, Vec<u8>);

    fn serialize(
        &self,
        pages: &[Page],
        file_name: &str,
    ) -> Result<Self::Output, Box<dyn std::error::Error>> {
        use serde::Serialize as _;

        let mut content_buffer = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut content_buffer, formatter);
        pages.serialize(&mut serializer)?;

        Ok((file_name.to_string(), content_buffer))
    }
}

/// Sequences the layout components into a document for one record.
///
/// Every record kind has a fixed, explicit section plan: title, the header strip and
/// metadata table, its labeled text blocks, then the optional image gallery, risk
/// matrix and sub-tables. A project report aggregates the plans of its sub-records,
/// each group starting on a fresh page.
///
/// Each composition call owns its own `PageManager`, so documents can be generated
/// concurrently against the same shared font metrics. Generation either returns the
/// full page list or fails atomically; there is no partial result.
pub struct DocumentComposer<'a, F: ImageFetcher> {
    fetcher: &'a F,
    metrics: FontMetrics,
}

impl<'a, F: ImageFetcher> DocumentComposer<'a, F> {
    pub fn new(fetcher: &'a F) -> DocumentComposer<'a, F> {
        DocumentComposer {
            fetcher,
            metrics: FontMetrics::regular(),
        }
    }

    /// Compose the record into its final ordered page list.
    pub fn compose(&self, record: &Record) -> Result<Vec<Page>, ComposeError> {
        record.validate()?;

        let mut pages = PageManager::new();
        match record {
            Record::Deviation(deviation) => self.compose_deviation(deviation, &mut pages),
            Record::Change(change) => self.compose_change(change, &mut pages),
            Record::SafetyJobAnalysis(analysis) => {
                self.compose_safety_job_analysis(analysis, &mut pages)
            }
            Record::RiskAssessment(assessment) => {
                self.compose_risk_assessment(assessment, &mut pages)
            }
            Record::ProjectReport(report) => self.compose_project_report(report, &mut pages),
        }

        log::debug!(
            "Composed the {} record {} into {} pages",
            record.kind_name(),
            record.id(),
            pages.page_count()
        );
        Ok(pages.into_pages())
    }

    /// Compose the record and hand the page list to the serializer. A serializer
    /// failure is fatal and reports how many pages had been built.
    pub fn compose_and_serialize<S: PageSerializer>(
        &self,
        record: &Record,
        serializer: &S,
        extension: &str,
    ) -> Result<S::Output, ComposeError> {
        let pages = self.compose(record)?;
        let file_name = output_file_name(record, extension);
        serializer
            .serialize(&pages, &file_name)
            .map_err(|error| ComposeError::serialization_failed(pages.len(), error.as_ref()))
    }

    fn compose_deviation(&self, record: &DeviationRecord, pages: &mut PageManager) {
        self.write_front_matter(pages, "Avvik", &record.id, &record.title, &record.metadata);

        let mut writer = TextFlowWriter::new(pages, self.metrics);
        writer.write_labeled("Beskrivelse", record.description.as_deref(), BODY_SIZE);
        writer.write_labeled("Strakstiltak", record.immediate_action.as_deref(), BODY_SIZE);
        writer.write_labeled(
            "Korrigerende tiltak",
            record.corrective_action.as_deref(),
            BODY_SIZE,
        );

        self.write_gallery(pages, &record.attachments, 0.0);
    }

    fn compose_change(&self, record: &ChangeRecord, pages: &mut PageManager) {
        self.write_front_matter(
            pages,
            "Endringsmelding",
            &record.id,
            &record.title,
            &record.metadata,
        );

        let mut writer = TextFlowWriter::new(pages, self.metrics);
        writer.write_labeled("Beskrivelse", record.description.as_deref(), BODY_SIZE);
        writer.write_labeled("Begrunnelse", record.reason.as_deref(), BODY_SIZE);
        writer.write_labeled("Konsekvens", record.consequence.as_deref(), BODY_SIZE);

        self.write_gallery(pages, &record.attachments, 0.0);
    }

    fn compose_safety_job_analysis(
        &self,
        record: &SafetyJobAnalysisRecord,
        pages: &mut PageManager,
    ) {
        self.write_front_matter(
            pages,
            "Sikker jobb-analyse",
            &record.id,
            &record.title,
            &record.metadata,
        );

        let mut writer = TextFlowWriter::new(pages, self.metrics);
        writer.write_labeled("Beskrivelse", record.description.as_deref(), BODY_SIZE);

        if !record.work_tasks.is_empty() {
            let mut writer = TextFlowWriter::new(pages, self.metrics);
            writer.write_paragraph("Arbeidsoppgaver", HEADING_SIZE);
            let mut tables = TableRenderer::new(pages, self.metrics);
            for task in &record.work_tasks {
                tables.draw_header_strip(&[
                    ("Oppgave".to_string(), task.description.clone()),
                    (
                        "Farer".to_string(),
                        task.hazards.clone().unwrap_or_else(|| NOT_SPECIFIED.to_string()),
                    ),
                    (
                        "Tiltak".to_string(),
                        task.measures.clone().unwrap_or_else(|| NOT_SPECIFIED.to_string()),
                    ),
                ]);
            }
        }

        if !record.chemical_products.is_empty() {
            let mut writer = TextFlowWriter::new(pages, self.metrics);
            writer.write_paragraph("Kjemiske produkter", HEADING_SIZE);
            let mut tables = TableRenderer::new(pages, self.metrics);
            for product in &record.chemical_products {
                tables.draw_header_strip(&[
                    ("Produkt".to_string(), product.name.clone()),
                    (
                        "Faresetning".to_string(),
                        product
                            .hazard_statement
                            .clone()
                            .unwrap_or_else(|| NOT_SPECIFIED.to_string()),
                    ),
                ]);
            }
        }

        // Site photos of the analysed work area are shot in portrait and turned a
        // quarter turn when placed.
        self.write_gallery(pages, &record.attachments, 90.0);
    }

    fn compose_risk_assessment(&self, record: &RiskAssessmentRecord, pages: &mut PageManager) {
        self.write_front_matter(
            pages,
            "Risikovurdering",
            &record.id,
            &record.title,
            &record.metadata,
        );

        let mut writer = TextFlowWriter::new(pages, self.metrics);
        writer.write_labeled("Beskrivelse", record.description.as_deref(), BODY_SIZE);

        pages.ensure_room(matrix_height());
        let top = pages.cursor();
        for instruction in draw_risk_matrix(
            &self.metrics,
            record.probability,
            record.severity,
            crate::page::PAGE_MARGIN,
            top,
        ) {
            pages.push(instruction);
        }
        pages.advance_cursor(matrix_height() + crate::page::LINE_GAP);

        let mut writer = TextFlowWriter::new(pages, self.metrics);
        writer.write_labeled("Tiltak", record.mitigation.as_deref(), BODY_SIZE);

        self.write_gallery(pages, &record.attachments, 0.0);
    }

    fn compose_project_report(&self, record: &ProjectReportRecord, pages: &mut PageManager) {
        self.write_front_matter(
            pages,
            "Prosjektrapport",
            &record.id,
            &record.title,
            &record.metadata,
        );

        // Each aggregated record group starts on a page of its own, in exactly the
        // order the report supplies them.
        for sub_record in &record.sub_records {
            pages.new_page();
            match sub_record {
                Record::Deviation(deviation) => self.compose_deviation(deviation, pages),
                Record::Change(change) => self.compose_change(change, pages),
                Record::SafetyJobAnalysis(analysis) => {
                    self.compose_safety_job_analysis(analysis, pages)
                }
                Record::RiskAssessment(assessment) => {
                    self.compose_risk_assessment(assessment, pages)
                }
                // Nested reports are rejected by validation before composition starts.
                Record::ProjectReport(_) => {}
            }
        }
    }

    /// The sections every record opens with: the title, the fixed id/kind header strip
    /// and the metadata table.
    fn write_front_matter(
        &self,
        pages: &mut PageManager,
        kind_label: &str,
        id: &str,
        title: &str,
        metadata: &[crate::record::MetadataPair],
    ) {
        let mut writer = TextFlowWriter::new(pages, self.metrics);
        writer.write_paragraph(title, TITLE_SIZE);

        let mut tables = TableRenderer::new(pages, self.metrics);
        tables.draw_header_strip(&[
            ("Id".to_string(), id.to_string()),
            ("Skjema".to_string(), kind_label.to_string()),
        ]);

        if !metadata.is_empty() {
            let rows: Vec<(String, Option<String>)> = metadata
                .iter()
                .map(|pair| (pair.label.clone(), pair.value.clone()))
                .collect();
            tables.draw_metadata_table(&rows);
        }
    }

    /// Resolve the attachments in their declared order and lay them out as a photo
    /// grid. An attachment that cannot be fetched or decoded stays in the sequence as
    /// a missing item and renders as a fallback line; the failure is logged and
    /// generation continues.
    fn write_gallery(
        &self,
        pages: &mut PageManager,
        attachments: &[crate::record::ImageAttachment],
        rotation_degrees: f32,
    ) {
        if attachments.is_empty() {
            return;
        }

        let mut writer = TextFlowWriter::new(pages, self.metrics);
        writer.write_paragraph("Bilder", HEADING_SIZE);

        let items: Vec<GalleryItem> = attachments
            .iter()
            .map(|attachment| {
                let bytes = match self.fetcher.fetch(&attachment.reference) {
                    Ok(bytes) => bytes,
                    Err(error) => {
                        log::warn!(
                            "Unable to fetch the image {}: {}",
                            attachment.reference,
                            error
                        );
                        return GalleryItem::Missing {
                            reference: attachment.reference.clone(),
                        };
                    }
                };
                match image::load_from_memory(&bytes) {
                    Ok(decoded) => GalleryItem::Image(ResolvedImage {
                        reference: attachment.reference.clone(),
                        natural_width: decoded.width(),
                        natural_height: decoded.height(),
                        caption: attachment.caption.clone(),
                    }),
                    Err(error) => {
                        log::warn!(
                            "Unable to decode the image {}: {}",
                            attachment.reference,
                            error
                        );
                        GalleryItem::Missing {
                            reference: attachment.reference.clone(),
                        }
                    }
                }
            })
            .collect();

        let mut placer = ImagePlacer::new(pages, self.metrics);
        placer.place_images(&items, IMAGES_PER_ROW, IMAGE_SCALE, rotation_degrees);
    }
}

/// The output file name handed to the serializer, of the form
/// `{recordKind}_{recordId}.{extension}`.
pub fn output_file_name(record: &Record, extension: &str) -> String {
    format!("{}_{}.{}", record.kind_name(), record.id(), extension)
}
