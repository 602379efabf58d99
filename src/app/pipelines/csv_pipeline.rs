use crate::domain::model::{
    Bug, BugId, Country, Dataset, Device, DeviceId, LoadSummary, RawDataset, Tester, TesterId,
};
use crate::domain::ports::{DatasetProvider, DatasetSink, Pipeline, Storage};
use crate::utils::error::{MatchError, Result};
use chrono::NaiveDateTime;
use std::sync::Arc;

pub const LAST_LOGIN_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Reads the four dataset CSV files from storage and imports them into a sink.
///
/// Columns are read by position; the first row of every file is a header and
/// blank rows are skipped.
pub struct CsvDatasetPipeline<S: Storage, C: DatasetProvider, K: DatasetSink> {
    storage: S,
    config: C,
    sink: Arc<K>,
}

impl<S: Storage, C: DatasetProvider, K: DatasetSink> CsvDatasetPipeline<S, C, K> {
    pub fn new(storage: S, config: C, sink: Arc<K>) -> Self {
        Self {
            storage,
            config,
            sink,
        }
    }
}

fn parse_rows<T, F>(file: &str, data: &[u8], mut map: F) -> Result<Vec<T>>
where
    F: FnMut(&csv::StringRecord) -> std::result::Result<T, String>,
{
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(data);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.iter().all(|field| field.is_empty()) {
            continue;
        }
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let row = map(&record).map_err(|message| MatchError::DatasetError {
            file: file.to_string(),
            line,
            message,
        })?;
        rows.push(row);
    }
    Ok(rows)
}

fn field<'r>(
    record: &'r csv::StringRecord,
    index: usize,
    name: &str,
) -> std::result::Result<&'r str, String> {
    record
        .get(index)
        .ok_or_else(|| format!("missing column '{}'", name))
}

fn id_field(
    record: &csv::StringRecord,
    index: usize,
    name: &str,
) -> std::result::Result<u64, String> {
    let raw = field(record, index, name)?;
    raw.parse()
        .map_err(|_| format!("'{}' is not a valid {}", raw, name))
}

fn map_device(record: &csv::StringRecord) -> std::result::Result<Device, String> {
    Ok(Device {
        id: DeviceId(id_field(record, 0, "deviceId")?),
        description: field(record, 1, "description")?.to_string(),
    })
}

fn map_tester(record: &csv::StringRecord) -> std::result::Result<Tester, String> {
    let country = field(record, 3, "country")?;
    let country = country
        .parse::<Country>()
        .map_err(|e| format!("unsupported country '{}'", e.0))?;

    let last_login = field(record, 4, "lastLogin")?;
    let last_login = NaiveDateTime::parse_from_str(last_login, LAST_LOGIN_FORMAT)
        .map_err(|e| format!("invalid lastLogin '{}': {}", last_login, e))?
        .and_utc();

    Ok(Tester {
        id: TesterId(id_field(record, 0, "testerId")?),
        first_name: field(record, 1, "firstName")?.to_string(),
        last_name: field(record, 2, "lastName")?.to_string(),
        country,
        last_login,
    })
}

fn map_bug(record: &csv::StringRecord) -> std::result::Result<Bug, String> {
    Ok(Bug {
        id: BugId(id_field(record, 0, "bugId")?),
        device: DeviceId(id_field(record, 1, "deviceId")?),
        tester: TesterId(id_field(record, 2, "testerId")?),
    })
}

fn map_ownership(record: &csv::StringRecord) -> std::result::Result<(TesterId, DeviceId), String> {
    Ok((
        TesterId(id_field(record, 0, "testerId")?),
        DeviceId(id_field(record, 1, "deviceId")?),
    ))
}

#[async_trait::async_trait]
impl<S: Storage, C: DatasetProvider, K: DatasetSink> Pipeline for CsvDatasetPipeline<S, C, K> {
    async fn extract(&self) -> Result<RawDataset> {
        tracing::debug!("Reading dataset files");
        Ok(RawDataset {
            devices: self.storage.read_file(self.config.devices_file()).await?,
            testers: self.storage.read_file(self.config.testers_file()).await?,
            bugs: self.storage.read_file(self.config.bugs_file()).await?,
            ownership: self.storage.read_file(self.config.ownership_file()).await?,
        })
    }

    async fn transform(&self, raw: RawDataset) -> Result<Dataset> {
        Ok(Dataset {
            devices: parse_rows(self.config.devices_file(), &raw.devices, map_device)?,
            testers: parse_rows(self.config.testers_file(), &raw.testers, map_tester)?,
            bugs: parse_rows(self.config.bugs_file(), &raw.bugs, map_bug)?,
            ownership: parse_rows(self.config.ownership_file(), &raw.ownership, map_ownership)?,
        })
    }

    async fn load(&self, dataset: Dataset) -> Result<LoadSummary> {
        self.sink.import(dataset)
    }
}
