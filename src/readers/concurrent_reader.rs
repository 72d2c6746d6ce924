use crate::error::{ProcessingError, Result};
use crate::models::{Measurement, RecordStore};
use crate::readers::MeasurementReader;
use crate::utils::progress::ProgressReporter;
use rayon::prelude::*;
use std::path::PathBuf;
use tracing::info;

/// Loads several measurement files in parallel and concatenates them, in
/// argument order, into one record store.
pub struct ConcurrentReader {
    max_workers: usize,
    delimiter: u8,
}

impl ConcurrentReader {
    pub fn new(max_workers: usize) -> Self {
        Self {
            max_workers: max_workers.max(1),
            delimiter: b',',
        }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn load_record_store(
        &self,
        paths: &[PathBuf],
        progress: Option<&ProgressReporter>,
    ) -> Result<RecordStore> {
        if paths.is_empty() {
            return Err(ProcessingError::MissingData(
                "no input files given".to_string(),
            ));
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.max_workers.min(paths.len()))
            .build()
            .map_err(|e| ProcessingError::Config(e.to_string()))?;

        let per_file: Vec<Vec<Measurement>> = pool.install(|| {
            paths
                .par_iter()
                .map(|path| {
                    let reader = MeasurementReader::with_delimiter(self.delimiter);
                    let result = reader.read_measurements(path);

                    if let Some(p) = progress {
                        p.increment(1);
                    }

                    result
                })
                .collect::<Result<Vec<_>>>()
        })?;

        if let Some(p) = progress {
            p.set_message("Building record store...");
        }

        let measurements: Vec<Measurement> = per_file.into_iter().flatten().collect();
        let store = RecordStore::new(measurements);

        info!(
            files = paths.len(),
            rows = store.len(),
            stations = store.stations().len(),
            "record store loaded"
        );

        Ok(store)
    }
}

impl Default for ConcurrentReader {
    fn default() -> Self {
        Self::new(num_cpus::get())
    }
}
