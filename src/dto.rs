use serde::{Deserialize, Serialize};

/// A single S3 object.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct DataFile {
    pub bucket: String,
    pub key: String,
}

/// Where the raw product pages of a run are enumerated from.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum DataSource {
    /// Every object under `prefix` in `bucket`.
    S3 {
        bucket: String,
        #[serde(default)]
        prefix: String,
    },
    /// Every regular file in a local directory.
    Directory { path: String },
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DedupConfig {
    pub data: DataSource,
    /// Destination of the CSV cluster report (optional).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<DataFile>,
    #[serde(default = "default_shingle_size")]
    pub shingle_size: usize,
    #[serde(default = "default_num_perm")]
    pub num_perm: usize,
    #[serde(default = "default_num_bands")]
    pub num_bands: usize,
    /// Jaccard threshold used for pruning. Derived from the banding when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
    /// Seed for hash family generation. Drawn from entropy when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

fn default_shingle_size() -> usize {
    1
}

fn default_num_perm() -> usize {
    2000
}

fn default_num_bands() -> usize {
    500
}

/// One row of the cluster report.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct RecordResult {
    pub id: String,
    pub cluster_id: String,
}

/// Response body of a clustering run.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterSummary {
    pub buckets: usize,
    pub leftovers: usize,
    pub invalid: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<DataFile>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn dedup_config_defaults() {
        let config: DedupConfig = serde_json::from_value(json!({
            "data": { "s3": { "bucket": "pages" } }
        }))
        .unwrap();
        assert_eq!(config.shingle_size, 1);
        assert_eq!(config.num_perm, 2000);
        assert_eq!(config.num_bands, 500);
        assert!(config.threshold.is_none());
        assert!(config.seed.is_none());
        assert_eq!(
            config.data,
            DataSource::S3 {
                bucket: "pages".to_string(),
                prefix: String::new()
            }
        );
    }

    #[test]
    fn dedup_config_camel_case_fields() {
        let config: DedupConfig = serde_json::from_value(json!({
            "data": { "directory": { "path": "/tmp/pages" } },
            "output": { "bucket": "out", "key": "clusters.csv" },
            "shingleSize": 2,
            "numPerm": 100,
            "numBands": 25,
            "threshold": 0.5,
            "seed": 7
        }))
        .unwrap();
        assert_eq!(config.shingle_size, 2);
        assert_eq!(config.num_perm, 100);
        assert_eq!(config.num_bands, 25);
        assert_eq!(config.threshold, Some(0.5));
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.output.unwrap().key, "clusters.csv");
    }
}
