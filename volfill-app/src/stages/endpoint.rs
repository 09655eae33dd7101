// SPDX-License-Identifier: GPL-3.0-only

use tracing::{debug, info};
use volfill_ontap::ManagementApi;
use volfill_types::NetworkInterface;

use crate::error::FillError;

/// First interface of `svm` offering `service`
pub fn locate<A: ManagementApi>(
    api: &A,
    svm: &str,
    service: &str,
) -> Result<NetworkInterface, FillError> {
    let interfaces = api.data_interfaces(svm, service)?;
    debug!("{} {} interface(s) on {}", interfaces.len(), service, svm);

    let interface = interfaces
        .into_iter()
        .next()
        .ok_or_else(|| FillError::NoDataEndpoint {
            svm: svm.to_string(),
            service: service.to_string(),
        })?;

    info!("Using data interface {}", interface.address);
    Ok(interface)
}
