//! Dashboard session
//!
//! idle → file selected → request in flight → results shown / error shown

use std::io::Read;

use crate::client::PredictionService;
use crate::report::Report;
use crate::table::{Table, TableError, UploadedFile};

#[derive(Debug, Clone)]
pub enum Phase {
    Idle,
    FileSelected,
    InFlight,
    Results(Report),
    Failed(String),
}

pub struct Session {
    file: Option<UploadedFile>,
    table: Option<Table>,
    phase: Phase,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            file: None,
            table: None,
            phase: Phase::Idle,
        }
    }

    #[cfg(test)]
    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    #[cfg(test)]
    pub fn table(&self) -> Option<&Table> {
        self.table.as_ref()
    }

    /// Load the file for preview. Reading consumes the stream.
    pub fn select_file(&mut self, mut file: UploadedFile) -> Result<&Table, TableError> {
        match Table::read(&mut file) {
            Ok(table) => {
                log::info!("Selected {} ({} rows)", file.name(), table.len());
                self.file = Some(file);
                self.phase = Phase::FileSelected;
                Ok(self.table.insert(table))
            }
            Err(e) => {
                self.file = None;
                self.table = None;
                self.phase = Phase::Failed(e.to_string());
                Err(e)
            }
        }
    }

    /// Send the selected file to the API and merge the result
    pub async fn submit(&mut self, service: &impl PredictionService) -> &Phase {
        let (Some(file), Some(table)) = (self.file.as_mut(), self.table.as_ref()) else {
            self.phase = Phase::Failed("No file selected".to_string());
            return &self.phase;
        };

        self.phase = Phase::InFlight;

        let mut contents = Vec::new();
        if let Err(e) = file.rewind().and_then(|_| file.read_to_end(&mut contents)) {
            self.phase = Phase::Failed(format!("Failed to read {}: {}", file.name(), e));
            return &self.phase;
        }

        let name = file.name().to_string();
        let table = table.clone();
        self.phase = match service.predict_file(&name, contents).await {
            Ok(response) => match Report::merge(table, &response) {
                Ok(report) => {
                    log::info!("Scored {} rows from {}", response.total_samples, response.filename);
                    Phase::Results(report)
                }
                Err(e) => Phase::Failed(e.to_string()),
            },
            Err(e) => Phase::Failed(e.to_string()),
        };

        if let Phase::Failed(msg) = &self.phase {
            log::warn!("Detection failed: {}", msg);
        }
        &self.phase
    }
}
