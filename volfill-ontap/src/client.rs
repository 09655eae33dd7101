// SPDX-License-Identifier: GPL-3.0-only

use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, info};
use volfill_types::{ExportPolicy, NetworkInterface, VolumeDescriptor};

use crate::api::ManagementApi;
use crate::config::ClientConfig;
use crate::error::{ApiError, Result};
use crate::wire::{InterfaceRecord, PolicyRecord, Records, VolumeRecord, parse_error_body};

const VOLUME_FIELDS: &str = "uuid,name,space.size,space.used,nas.path,nas.export_policy.name";

/// Blocking HTTPS client with basic authentication
#[derive(Debug)]
pub struct OntapClient {
    config: ClientConfig,
    http: Client,
}

impl OntapClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .map_err(|e| ApiError::Client(e.to_string()))?;

        Ok(Self { config, http })
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .basic_auth(&self.config.username, Some(&self.config.password))
            .header(reqwest::header::ACCEPT, "application/json")
    }

    fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let url = self.config.url(path);
        debug!("GET {} {:?}", url, query);

        let response = self
            .authorized(self.http.get(&url).query(query))
            .send()
            .map_err(|e| transport(&url, e))?;
        let response = check_status(&url, response)?;

        response.json::<T>().map_err(|e| ApiError::Decode {
            url,
            reason: e.to_string(),
        })
    }

    fn patch(&self, path: &str, body: &serde_json::Value) -> Result<()> {
        let url = self.config.url(path);
        debug!("PATCH {} {}", url, body);

        let response = self
            .authorized(self.http.patch(&url).json(body))
            .send()
            .map_err(|e| transport(&url, e))?;
        check_status(&url, response)?;
        Ok(())
    }
}

fn transport(url: &str, error: reqwest::Error) -> ApiError {
    let reason = if error.is_timeout() {
        "request timed out".to_string()
    } else if error.is_connect() {
        format!("connection failed: {error}")
    } else {
        error.to_string()
    };
    ApiError::Transport {
        url: url.to_string(),
        reason,
    }
}

fn check_status(url: &str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(ApiError::Unauthorized {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    let body = response.text().unwrap_or_default();
    let (message, code) = parse_error_body(&body);
    Err(ApiError::Status {
        status: status.as_u16(),
        url: url.to_string(),
        message,
        code,
    })
}

impl ManagementApi for OntapClient {
    fn find_volume(&self, svm: &str, volume: &str) -> Result<Option<VolumeDescriptor>> {
        let records: Records<VolumeRecord> = self.get(
            "/storage/volumes",
            &[("name", volume), ("svm.name", svm), ("fields", VOLUME_FIELDS)],
        )?;

        match records.into_records().into_iter().next() {
            Some(record) => record
                .into_descriptor(volume)
                .map(Some)
                .map_err(|reason| ApiError::Decode {
                    url: self.config.url("/storage/volumes"),
                    reason,
                }),
            None => Ok(None),
        }
    }

    fn data_interfaces(&self, svm: &str, service: &str) -> Result<Vec<NetworkInterface>> {
        let records: Records<InterfaceRecord> = self.get(
            "/network/ip/interfaces",
            &[("svm.name", svm), ("services", service), ("fields", "name,ip.address")],
        )?;

        Ok(records
            .into_records()
            .into_iter()
            .filter_map(InterfaceRecord::into_interface)
            .collect())
    }

    fn export_policy(&self, svm: &str, name: &str) -> Result<Option<ExportPolicy>> {
        let records: Records<PolicyRecord> = self.get(
            "/protocols/nfs/export-policies",
            &[("name", name), ("svm.name", svm), ("fields", "name,rules")],
        )?;

        Ok(records
            .into_records()
            .into_iter()
            .next()
            .map(|record| record.into_policy(name)))
    }

    fn set_junction_path(&self, volume_uuid: &str, path: &str) -> Result<()> {
        info!("Setting junction path of volume {} to {}", volume_uuid, path);
        self.patch(
            &format!("/storage/volumes/{volume_uuid}"),
            &json!({ "nas": { "path": path } }),
        )
    }
}
