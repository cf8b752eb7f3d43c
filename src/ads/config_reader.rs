use crate::ads::*;

use serde::{Deserialize, Serialize};

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(rename = "sheetName")]
    pub sheet_name: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    #[serde(rename = "factorFile")]
    pub factor_file: Option<String>,
    #[serde(default)]
    pub datasets: Vec<DatasetConfig>,
    #[serde(rename = "outputPath")]
    pub output_path: Option<String>,
    #[serde(rename = "rejectDuplicateYears")]
    pub reject_duplicate_years: Option<bool>,
}

pub fn parse_batch_config(contents: &str, path: &str) -> AdsResult<BatchConfig> {
    serde_json::from_str(contents).context(ParsingJsonSnafu { path })
}

pub fn read_batch_config(path: &str) -> AdsResult<BatchConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config = parse_batch_config(&contents, path)?;
    info!(
        "read_batch_config: {:?}: {} datasets",
        path,
        config.datasets.len()
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_config() {
        let js = r#"{
            "factorFile": "factors.xlsx",
            "datasets": [
                { "filePath": "ads_north.csv", "sheetName": "PMF" },
                { "filePath": "ads_south.csv" }
            ],
            "outputPath": "out/",
            "rejectDuplicateYears": true
        }"#;
        let c = parse_batch_config(js, "batch.json").unwrap();
        assert_eq!(c.factor_file.as_deref(), Some("factors.xlsx"));
        assert_eq!(
            c.datasets,
            vec![
                DatasetConfig {
                    file_path: "ads_north.csv".to_string(),
                    sheet_name: Some("PMF".to_string())
                },
                DatasetConfig {
                    file_path: "ads_south.csv".to_string(),
                    sheet_name: None
                },
            ]
        );
        assert_eq!(c.output_path.as_deref(), Some("out/"));
        assert_eq!(c.reject_duplicate_years, Some(true));
    }

    #[test]
    fn minimal_config() {
        let c = parse_batch_config("{}", "batch.json").unwrap();
        assert_eq!(c.factor_file, None);
        assert!(c.datasets.is_empty());
        assert_eq!(c.reject_duplicate_years, None);
    }

    #[test]
    fn malformed_config() {
        let err = parse_batch_config(r#"{ "datasets": [ { "sheetName": "PMF" } ] }"#, "b.json")
            .unwrap_err();
        assert!(matches!(err, AdsError::ParsingJson { .. }));
        let err = read_batch_config("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, AdsError::OpeningJson { .. }));
    }
}
