use clap::Parser;
use std::path::PathBuf;

use rapportgen::composer::{DocumentComposer, ImageFetcher, JsonSerializer};
use rapportgen::error::FetchError;
use rapportgen::record::Record;

/// Compose a record JSON file into its page instruction list and write the result as
/// JSON next to the record, ready for the downstream document encoder.
#[derive(Parser)]
struct Arguments {
    /// The path of the record JSON file to compose.
    record_path: PathBuf,
    /// The directory the attachment references are resolved against.
    #[arg(long, default_value = ".")]
    images_directory: PathBuf,
    /// The directory the composed page list is written into.
    #[arg(long, default_value = ".")]
    output_directory: PathBuf,
}

/// Resolves attachment references against a local directory. The production fetcher
/// sits in front of the file store of the web application; this one serves the same
/// interface from disk for local use.
struct DirectoryFetcher {
    base_directory: PathBuf,
}

impl ImageFetcher for DirectoryFetcher {
    fn fetch(&self, reference: &str) -> Result<Vec<u8>, FetchError> {
        let image_path = self.base_directory.join(reference);
        std::fs::read(&image_path).map_err(|error| {
            FetchError::with_error(format!("Unable to read the image {:?}", image_path), &error)
        })
    }
}

fn main() {
    env_logger::init();
    let arguments = Arguments::parse();

    let record = match Record::from_path(&arguments.record_path) {
        Ok(record) => record,
        Err(error) => {
            log::error!("{}", error);
            std::process::exit(1);
        }
    };

    let fetcher = DirectoryFetcher {
        base_directory: arguments.images_directory,
    };
    let composer = DocumentComposer::new(&fetcher);
    let serializer = JsonSerializer;

    match composer.compose_and_serialize(&record, &serializer, "json") {
        Ok((file_name, content)) => {
            let output_path = arguments.output_directory.join(&file_name);
            if let Err(error) = std::fs::write(&output_path, content) {
                log::error!("Unable to write the composed document {:?}: {}", output_path, error);
                std::process::exit(1);
            }
            log::info!("Wrote the composed document {:?}", output_path);
        }
        Err(error) => {
            log::error!("{}", error);
            std::process::exit(1);
        }
    }
}
