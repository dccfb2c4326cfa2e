//! CSV-backed instance stream.
//!
//! Reads a delimited file, infers a header (numeric vs. nominal columns) and
//! replays the rows as [`Instance`]s in file order.

use csv::{ReaderBuilder, StringRecord};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use crate::core::error::{Result, StreamBoostError};
use crate::dataset::instance::{Attribute, AttributeKind, Instance, InstanceHeader};

/// CSV stream configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsvStreamConfig {
    /// Has header row
    pub has_header: bool,
    /// Field delimiter
    pub delimiter: char,
    /// Name of the target column (last column when `None`)
    pub target_column: Option<String>,
    /// Treat the target as nominal even when every value parses as a number
    pub nominal_target: bool,
    /// Cell contents that denote a missing value
    pub missing_tokens: Vec<String>,
    /// Relation name given to the inferred header
    pub relation: String,
    /// Maximum number of rows to read
    pub max_rows: Option<usize>,
}

impl Default for CsvStreamConfig {
    fn default() -> Self {
        CsvStreamConfig {
            has_header: true,
            delimiter: ',',
            target_column: None,
            nominal_target: true,
            missing_tokens: vec![String::new(), "?".to_string()],
            relation: "csv_stream".to_string(),
            max_rows: None,
        }
    }
}

/// Loads CSV data as a replayable instance stream.
#[derive(Debug, Clone, Default)]
pub struct CsvStreamLoader {
    config: CsvStreamConfig,
}

impl CsvStreamLoader {
    /// Create a loader with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a loader with the given configuration
    pub fn with_config(config: CsvStreamConfig) -> Self {
        CsvStreamLoader { config }
    }

    /// Set delimiter character
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.config.delimiter = delimiter;
        self
    }

    /// Select the target column by name
    pub fn with_target_column<S: Into<String>>(mut self, name: S) -> Self {
        self.config.target_column = Some(name.into());
        self
    }

    /// Choose whether a numeric-looking target is read as nominal
    pub fn with_nominal_target(mut self, nominal: bool) -> Self {
        self.config.nominal_target = nominal;
        self
    }

    /// Set maximum rows to read
    pub fn with_max_rows(mut self, max_rows: usize) -> Self {
        self.config.max_rows = Some(max_rows);
        self
    }

    /// Load a CSV file
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<InstanceStream> {
        let path = path.as_ref();
        log::info!("Loading CSV stream: {}", path.display());
        if !path.is_file() {
            return Err(StreamBoostError::dataset(format!(
                "Path is not a file: {}",
                path.display()
            )));
        }
        let file = File::open(path)?;
        self.from_reader(file)
    }

    /// Load CSV data from any reader
    pub fn from_reader<R: Read>(&self, reader: R) -> Result<InstanceStream> {
        let delimiter = u8::try_from(self.config.delimiter).map_err(|_| {
            StreamBoostError::invalid_parameter(
                "delimiter",
                self.config.delimiter.to_string(),
                "must be a single-byte character",
            )
        })?;
        let mut csv_reader = ReaderBuilder::new()
            .has_headers(self.config.has_header)
            .delimiter(delimiter)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut records: Vec<StringRecord> = Vec::new();
        for record in csv_reader.records() {
            if self.config.max_rows.is_some_and(|max| records.len() >= max) {
                break;
            }
            records.push(record?);
        }

        let num_columns = if self.config.has_header {
            csv_reader.headers()?.len()
        } else {
            records.first().map(|r| r.len()).unwrap_or(0)
        };
        if num_columns < 1 {
            return Err(StreamBoostError::dataset("CSV input has no columns"));
        }

        let names: Vec<String> = if self.config.has_header {
            csv_reader.headers()?.iter().map(str::to_string).collect()
        } else {
            (0..num_columns).map(|i| format!("attr{}", i)).collect()
        };

        let target_index = match &self.config.target_column {
            Some(name) => names.iter().position(|n| n == name).ok_or_else(|| {
                StreamBoostError::dataset(format!("Target column '{}' not found", name))
            })?,
            None => num_columns - 1,
        };

        for (row, record) in records.iter().enumerate() {
            if record.len() != num_columns {
                return Err(StreamBoostError::dimension_mismatch(
                    format!("{} columns", num_columns),
                    format!("{} columns in row {}", record.len(), row + 1),
                ));
            }
        }

        let attributes: Vec<Attribute> = (0..num_columns)
            .map(|col| self.infer_attribute(&names[col], col, col == target_index, &records))
            .collect();
        let lookups: Vec<Option<HashMap<&str, usize>>> = attributes
            .iter()
            .map(|attr| match &attr.kind {
                AttributeKind::Nominal { values } => Some(
                    values
                        .iter()
                        .enumerate()
                        .map(|(i, v)| (v.as_str(), i))
                        .collect(),
                ),
                AttributeKind::Numeric => None,
            })
            .collect();

        let mut features = attributes.clone();
        let target = features.remove(target_index);
        let header = Arc::new(InstanceHeader::new(
            self.config.relation.clone(),
            features,
            target,
        ));

        let mut instances = Vec::with_capacity(records.len());
        for record in &records {
            let mut values = Vec::with_capacity(num_columns - 1);
            let mut label = None;
            for (col, cell) in record.iter().enumerate() {
                let value = self.encode_cell(cell, lookups[col].as_ref())?;
                if col == target_index {
                    label = if value.is_nan() { None } else { Some(value) };
                } else {
                    values.push(value);
                }
            }
            instances.push(Instance::new(Arc::clone(&header), values, label)?);
        }

        log::info!(
            "Loaded {} instances with {} features, target '{}' ({})",
            instances.len(),
            header.num_features(),
            header.target.name,
            header.target_kind()
        );

        Ok(InstanceStream { header, instances })
    }

    fn is_missing(&self, cell: &str) -> bool {
        self.config.missing_tokens.iter().any(|t| t == cell)
    }

    fn infer_attribute(
        &self,
        name: &str,
        col: usize,
        is_target: bool,
        records: &[StringRecord],
    ) -> Attribute {
        let cells: Vec<&str> = records
            .iter()
            .map(|r| &r[col])
            .filter(|c| !self.is_missing(c))
            .collect();
        let all_numeric = cells.iter().all(|c| c.parse::<f64>().is_ok());

        if all_numeric && !(is_target && self.config.nominal_target) {
            return Attribute::numeric(name);
        }

        let mut values: Vec<String> = Vec::new();
        for cell in cells {
            if !values.iter().any(|v| v == cell) {
                values.push(cell.to_string());
            }
        }
        if is_target {
            if all_numeric {
                values.sort_by(|a, b| {
                    let (a, b) = (a.parse::<f64>().unwrap_or(f64::NAN), b.parse::<f64>().unwrap_or(f64::NAN));
                    a.total_cmp(&b)
                });
            } else {
                values.sort();
            }
        }
        Attribute::nominal(name, values)
    }

    fn encode_cell(&self, cell: &str, lookup: Option<&HashMap<&str, usize>>) -> Result<f64> {
        if self.is_missing(cell) {
            return Ok(f64::NAN);
        }
        match lookup {
            Some(map) => map
                .get(cell)
                .map(|&i| i as f64)
                .ok_or_else(|| StreamBoostError::dataset(format!("Unknown nominal value '{}'", cell))),
            None => cell
                .parse::<f64>()
                .map_err(|_| StreamBoostError::dataset(format!("Cannot parse '{}' as a number", cell))),
        }
    }
}

/// Instances read from a source, replayed in order.
#[derive(Debug, Clone)]
pub struct InstanceStream {
    header: Arc<InstanceHeader>,
    instances: Vec<Instance>,
}

impl InstanceStream {
    /// Builds a stream from instances sharing `header`.
    pub fn new(header: Arc<InstanceHeader>, instances: Vec<Instance>) -> Self {
        InstanceStream { header, instances }
    }

    /// Shared header
    pub fn header(&self) -> &Arc<InstanceHeader> {
        &self.header
    }

    /// Number of instances
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Whether the stream is empty
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Iterate over the instances in stream order
    pub fn iter(&self) -> std::slice::Iter<'_, Instance> {
        self.instances.iter()
    }
}

impl IntoIterator for InstanceStream {
    type Item = Instance;
    type IntoIter = std::vec::IntoIter<Instance>;

    fn into_iter(self) -> Self::IntoIter {
        self.instances.into_iter()
    }
}

impl<'a> IntoIterator for &'a InstanceStream {
    type Item = &'a Instance;
    type IntoIter = std::slice::Iter<'a, Instance>;

    fn into_iter(self) -> Self::IntoIter {
        self.instances.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::TargetKind;

    const DATA: &str = "x,color,y,label\n\
                        1.5,red,0.5,yes\n\
                        ?,blue,1.0,no\n\
                        2.5,red,,yes\n\
                        3.0,green,2.0,?\n";

    #[test]
    fn test_infers_header() {
        let stream = CsvStreamLoader::new().from_reader(DATA.as_bytes()).unwrap();
        let header = stream.header();
        assert_eq!(stream.len(), 4);
        assert_eq!(header.num_features(), 3);
        assert!(!header.features[0].is_nominal());
        assert_eq!(
            header.features[1].kind,
            AttributeKind::Nominal {
                values: vec!["red".into(), "blue".into(), "green".into()]
            }
        );
        assert_eq!(header.target_kind(), TargetKind::Nominal(2));
        assert_eq!(header.target.name, "label");
    }

    #[test]
    fn test_encodes_values_and_missing() {
        let stream = CsvStreamLoader::new().from_reader(DATA.as_bytes()).unwrap();
        let instances: Vec<&Instance> = stream.iter().collect();
        assert!(instances[1].value(0).is_nan());
        assert_eq!(instances[1].value(1), 1.0);
        assert!(instances[2].value(2).is_nan());
        // sorted target values: ["no", "yes"]
        assert_eq!(instances[0].label(), Some(1.0));
        assert_eq!(instances[1].label(), Some(0.0));
        assert!(instances[3].label_is_missing());
    }

    #[test]
    fn test_numeric_target_and_selection() {
        let stream = CsvStreamLoader::new()
            .with_target_column("y")
            .with_nominal_target(false)
            .from_reader(DATA.as_bytes())
            .unwrap();
        assert_eq!(stream.header().target_kind(), TargetKind::Numeric);
        assert_eq!(stream.header().features[2].name, "label");
        assert_eq!(stream.iter().next().unwrap().label(), Some(0.5));
    }

    #[test]
    fn test_unknown_target_column() {
        let result = CsvStreamLoader::new()
            .with_target_column("missing")
            .from_reader(DATA.as_bytes());
        assert!(result.is_err());
    }

    #[test]
    fn test_max_rows() {
        let stream = CsvStreamLoader::new()
            .with_max_rows(2)
            .from_reader(DATA.as_bytes())
            .unwrap();
        assert_eq!(stream.len(), 2);
    }
}
