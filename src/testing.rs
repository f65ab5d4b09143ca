//! Shared test doubles for unit tests.

use async_trait::async_trait;
use std::collections::BTreeMap;

use crate::cf::api::types::{
    ApplicationDetail, ApplicationSummary, CopySourceRequest, NetworkPolicy, PushRequest,
    ScaleRequest, StartRequest,
};
use crate::cf::api::{CfApiError, Result};
use crate::cf::CloudOperations;

/// Inert operations handle: every read returns empty, every write succeeds.
/// Used where a test only cares about handle identity or wiring.
pub struct NullOperations;

#[async_trait]
impl CloudOperations for NullOperations {
    async fn get_application(&self, name: &str) -> Result<ApplicationDetail> {
        Err(CfApiError::NotFound(name.to_string()))
    }
    async fn list_applications(&self) -> Result<Vec<ApplicationSummary>> {
        Ok(Vec::new())
    }
    async fn get_environment(&self, _: &str) -> Result<BTreeMap<String, String>> {
        Ok(BTreeMap::new())
    }
    async fn set_environment_variable(&self, _: &str, _: &str, _: &str) -> Result<()> {
        Ok(())
    }
    async fn push(&self, _: &PushRequest) -> Result<()> {
        Ok(())
    }
    async fn copy_source(&self, _: &CopySourceRequest) -> Result<()> {
        Ok(())
    }
    async fn scale(&self, _: &ScaleRequest) -> Result<()> {
        Ok(())
    }
    async fn start(&self, _: &StartRequest) -> Result<()> {
        Ok(())
    }
    async fn stop(&self, _: &str) -> Result<()> {
        Ok(())
    }
    async fn restart(&self, _: &StartRequest) -> Result<()> {
        Ok(())
    }
    async fn delete_application(&self, _: &str) -> Result<()> {
        Ok(())
    }
    async fn list_organizations(&self) -> Result<Vec<String>> {
        Ok(Vec::new())
    }
    async fn list_spaces(&self) -> Result<Vec<String>> {
        Ok(Vec::new())
    }
    async fn list_routes(&self) -> Result<Vec<String>> {
        Ok(Vec::new())
    }
    async fn map_route(&self, _: &str, _: &str) -> Result<()> {
        Ok(())
    }
    async fn unmap_route(&self, _: &str, _: &str) -> Result<()> {
        Ok(())
    }
    async fn list_service_instances(&self) -> Result<Vec<String>> {
        Ok(Vec::new())
    }
    async fn bind_service(&self, _: &str, _: &str) -> Result<()> {
        Ok(())
    }
    async fn unbind_service(&self, _: &str, _: &str) -> Result<()> {
        Ok(())
    }
    async fn list_network_policies(&self) -> Result<Vec<NetworkPolicy>> {
        Ok(Vec::new())
    }
    async fn add_network_policy(&self, _: &str, _: &str, _: &str, _: u16, _: u16) -> Result<()> {
        Ok(())
    }
    async fn remove_network_policy(&self, _: &str, _: &str, _: &str, _: u16, _: u16) -> Result<()> {
        Ok(())
    }
}
