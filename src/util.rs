use crate::error::ServiceError;
use futures::stream::TryStreamExt;
use rusoto_core::Region;
use rusoto_s3::{GetObjectRequest, ListObjectsV2Request, PutObjectRequest, S3Client, S3};
use std::env;
use std::str::FromStr;

pub fn get_region() -> Result<Region, ServiceError> {
    match env::var("REGION") {
        Ok(val) => Region::from_str(val.as_str()).map_err(|_| {
            ServiceError::internal_server_error(format!("Unable to parse region {}", val))
        }),
        _ => Err(ServiceError::internal_server_error(
            "Environment variable 'REGION' not found",
        )),
    }
}

/// Lists every object key under `prefix`, following continuation tokens.
pub async fn list_keys_in_s3(
    client: &S3Client,
    bucket: String,
    prefix: String,
) -> Result<Vec<String>, ServiceError> {
    let mut keys = Vec::new();
    let mut continuation_token = None;
    loop {
        let request = ListObjectsV2Request {
            bucket: bucket.clone(),
            prefix: Some(prefix.clone()).filter(|p| !p.is_empty()),
            continuation_token: continuation_token.take(),
            ..Default::default()
        };
        let output = client
            .list_objects_v2(request)
            .await
            .map_err(ServiceError::internal_server_error)?;
        keys.extend(
            output
                .contents
                .unwrap_or_default()
                .into_iter()
                .filter_map(|object| object.key)
                // "directory" placeholder objects
                .filter(|key| !key.ends_with('/')),
        );
        match (output.is_truncated, output.next_continuation_token) {
            (Some(true), Some(token)) => continuation_token = Some(token),
            _ => break,
        }
    }
    Ok(keys)
}

pub async fn download_object_from_s3(
    client: &S3Client,
    bucket: String,
    key: String,
) -> Result<Vec<u8>, ServiceError> {
    let request = GetObjectRequest {
        bucket,
        key,
        ..Default::default()
    };
    let mut object = client
        .get_object(request)
        .await
        .map_err(ServiceError::internal_server_error)?;
    let body = object
        .body
        .take()
        .ok_or(ServiceError::internal_server_error(
            "Unable to extract body",
        ))?;
    body.map_ok(|b| b.to_vec())
        .try_concat()
        .await
        .map_err(ServiceError::internal_server_error)
}

pub async fn upload_object_to_s3(
    client: &S3Client,
    object: Vec<u8>,
    bucket: String,
    key: String,
) -> Result<(), ServiceError> {
    let request = PutObjectRequest {
        bucket,
        key,
        body: Some(object.into()),
        content_type: Some(String::from("text/csv")),
        ..Default::default()
    };
    client
        .put_object(request)
        .await
        .map(|_| ())
        .map_err(ServiceError::internal_server_error)
}
