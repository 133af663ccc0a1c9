use serde::{Deserialize, Serialize};

use crate::{error::ChartError, level::LevelChart};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum ChartFormat {
    Json,
}

pub trait ChartExporter {
    fn export(&self, chart: &LevelChart, format: ChartFormat) -> Result<Vec<u8>, ChartError>;
}

pub struct JsonExporter;

impl ChartExporter for JsonExporter {
    fn export(&self, chart: &LevelChart, format: ChartFormat) -> Result<Vec<u8>, ChartError> {
        match format {
            ChartFormat::Json => serde_json::to_vec_pretty(chart)
                .map_err(|err| ChartError::Serialization(err.to_string())),
        }
    }
}

impl LevelChart {
    /// Parse and validate a chart from JSON text.
    pub fn from_json(text: &str) -> Result<Self, ChartError> {
        let chart: LevelChart = serde_json::from_str(text)
            .map_err(|err| ChartError::Serialization(err.to_string()))?;
        chart.validated()
    }

    /// Parse and validate a chart from a JSON reader.
    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self, ChartError> {
        let chart: LevelChart = serde_json::from_reader(reader)
            .map_err(|err| ChartError::Serialization(err.to_string()))?;
        chart.validated()
    }
}
