//! End-to-end clone pipeline tests against a scripted operations handle.
//!
//! The mock records every platform call so tests can assert exactly what a
//! clone sends (sizing, pinning, env application, step ordering) and can
//! inject failures at each step to check the error surface and the local
//! temp-directory cleanup guarantee.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use cf_pulse::cf::api::types::{
    ApplicationDetail, ApplicationSummary, CopySourceRequest, NetworkPolicy, PushRequest,
    ScaleRequest, StartRequest,
};
use cf_pulse::cf::api::{CfApiError, Result as ApiResult};
use cf_pulse::cf::retry::RetryPolicy;
use cf_pulse::cf::CloudOperations;
use cf_pulse::clone::{ApplicationCloner, CloneError};

/// Where a scripted failure fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum FailPoint {
    GetApplication,
    GetEnvironment,
    Push,
    SetEnvironmentVariable,
    CopySource,
    Scale,
    Start,
}

#[derive(Default)]
struct Recorded {
    log: Vec<&'static str>,
    pushes: Vec<PushRequest>,
    copies: Vec<CopySourceRequest>,
    scales: Vec<ScaleRequest>,
    starts: Vec<StartRequest>,
    env_sets: Vec<(String, String, String)>,
}

struct MockOps {
    apps: Mutex<HashMap<String, ApplicationDetail>>,
    envs: Mutex<HashMap<String, BTreeMap<String, String>>>,
    failures: Mutex<HashMap<FailPoint, CfApiError>>,
    /// Buildpacks the target reads back with after the copy, when the test
    /// simulates the platform re-detecting the runtime
    post_copy_buildpacks: Mutex<Option<Vec<String>>>,
    recorded: Mutex<Recorded>,
}

impl MockOps {
    fn new() -> Self {
        Self {
            apps: Mutex::new(HashMap::new()),
            envs: Mutex::new(HashMap::new()),
            failures: Mutex::new(HashMap::new()),
            post_copy_buildpacks: Mutex::new(None),
            recorded: Mutex::new(Recorded::default()),
        }
    }

    fn with_source(name: &str, buildpacks: Vec<&str>, env: &[(&str, &str)]) -> Arc<Self> {
        let mock = Self::new();
        mock.apps.lock().unwrap().insert(
            name.to_string(),
            ApplicationDetail {
                name: name.to_string(),
                state: "STARTED".to_string(),
                memory_mb: 512,
                disk_mb: 1024,
                instances: 2,
                buildpacks: buildpacks.into_iter().map(String::from).collect(),
                stack: Some("cflinuxfs4".to_string()),
            },
        );
        mock.envs.lock().unwrap().insert(
            name.to_string(),
            env.iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        );
        Arc::new(mock)
    }

    fn fail_at(&self, point: FailPoint, error: CfApiError) {
        self.failures.lock().unwrap().insert(point, error);
    }

    fn read_back_buildpacks_after_copy(&self, buildpacks: Vec<&str>) {
        *self.post_copy_buildpacks.lock().unwrap() =
            Some(buildpacks.into_iter().map(String::from).collect());
    }

    fn take_failure(&self, point: FailPoint) -> Option<CfApiError> {
        self.failures.lock().unwrap().remove(&point)
    }

    fn record(&self, label: &'static str) {
        self.recorded.lock().unwrap().log.push(label);
    }

    fn position(&self, label: &str) -> usize {
        self.recorded
            .lock()
            .unwrap()
            .log
            .iter()
            .position(|l| *l == label)
            .unwrap_or_else(|| panic!("'{}' was never called", label))
    }
}

fn platform_error() -> CfApiError {
    CfApiError::ServerError {
        status: 500,
        message: "boom".to_string(),
    }
}

#[async_trait]
impl CloudOperations for MockOps {
    async fn get_application(&self, name: &str) -> ApiResult<ApplicationDetail> {
        self.record("get_application");
        if let Some(e) = self.take_failure(FailPoint::GetApplication) {
            return Err(e);
        }
        self.apps
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .ok_or_else(|| CfApiError::NotFound(format!("app '{}'", name)))
    }

    async fn list_applications(&self) -> ApiResult<Vec<ApplicationSummary>> {
        Ok(Vec::new())
    }

    async fn get_environment(&self, name: &str) -> ApiResult<BTreeMap<String, String>> {
        self.record("get_environment");
        if let Some(e) = self.take_failure(FailPoint::GetEnvironment) {
            return Err(e);
        }
        Ok(self
            .envs
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .unwrap_or_default())
    }

    async fn set_environment_variable(&self, app: &str, key: &str, value: &str) -> ApiResult<()> {
        self.record("set_environment_variable");
        if let Some(e) = self.take_failure(FailPoint::SetEnvironmentVariable) {
            return Err(e);
        }
        self.recorded.lock().unwrap().env_sets.push((
            app.to_string(),
            key.to_string(),
            value.to_string(),
        ));
        self.envs
            .lock()
            .unwrap()
            .entry(app.to_string())
            .or_default()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn push(&self, request: &PushRequest) -> ApiResult<()> {
        self.record("push");
        if let Some(e) = self.take_failure(FailPoint::Push) {
            return Err(e);
        }
        self.recorded.lock().unwrap().pushes.push(request.clone());
        // A pushed placeholder exists afterwards, stopped, with the pinned
        // buildpack and the requested sizing.
        self.apps.lock().unwrap().insert(
            request.name.clone(),
            ApplicationDetail {
                name: request.name.clone(),
                state: "STOPPED".to_string(),
                memory_mb: request.memory_mb,
                disk_mb: request.disk_mb,
                instances: request.instances,
                buildpacks: request.buildpack.iter().cloned().collect(),
                stack: Some("cflinuxfs4".to_string()),
            },
        );
        Ok(())
    }

    async fn copy_source(&self, request: &CopySourceRequest) -> ApiResult<()> {
        self.record("copy_source");
        if let Some(e) = self.take_failure(FailPoint::CopySource) {
            return Err(e);
        }
        self.recorded.lock().unwrap().copies.push(request.clone());
        if let Some(buildpacks) = self.post_copy_buildpacks.lock().unwrap().clone() {
            if let Some(target) = self.apps.lock().unwrap().get_mut(&request.target_name) {
                target.buildpacks = buildpacks;
            }
        }
        Ok(())
    }

    async fn scale(&self, request: &ScaleRequest) -> ApiResult<()> {
        self.record("scale");
        if let Some(e) = self.take_failure(FailPoint::Scale) {
            return Err(e);
        }
        self.recorded.lock().unwrap().scales.push(request.clone());
        if let Some(app) = self.apps.lock().unwrap().get_mut(&request.name) {
            if let Some(memory) = request.memory_mb {
                app.memory_mb = memory;
            }
            if let Some(disk) = request.disk_mb {
                app.disk_mb = disk;
            }
            if let Some(instances) = request.instances {
                app.instances = instances;
            }
        }
        Ok(())
    }

    async fn start(&self, request: &StartRequest) -> ApiResult<()> {
        self.record("start");
        if let Some(e) = self.take_failure(FailPoint::Start) {
            return Err(e);
        }
        self.recorded.lock().unwrap().starts.push(request.clone());
        if let Some(app) = self.apps.lock().unwrap().get_mut(&request.name) {
            app.state = "STARTED".to_string();
        }
        Ok(())
    }

    async fn stop(&self, _: &str) -> ApiResult<()> {
        Ok(())
    }

    async fn restart(&self, _: &StartRequest) -> ApiResult<()> {
        Ok(())
    }

    async fn delete_application(&self, _: &str) -> ApiResult<()> {
        Ok(())
    }

    async fn list_organizations(&self) -> ApiResult<Vec<String>> {
        Ok(Vec::new())
    }

    async fn list_spaces(&self) -> ApiResult<Vec<String>> {
        Ok(Vec::new())
    }

    async fn list_routes(&self) -> ApiResult<Vec<String>> {
        Ok(Vec::new())
    }

    async fn map_route(&self, _: &str, _: &str) -> ApiResult<()> {
        Ok(())
    }

    async fn unmap_route(&self, _: &str, _: &str) -> ApiResult<()> {
        Ok(())
    }

    async fn list_service_instances(&self) -> ApiResult<Vec<String>> {
        Ok(Vec::new())
    }

    async fn bind_service(&self, _: &str, _: &str) -> ApiResult<()> {
        Ok(())
    }

    async fn unbind_service(&self, _: &str, _: &str) -> ApiResult<()> {
        Ok(())
    }

    async fn list_network_policies(&self) -> ApiResult<Vec<NetworkPolicy>> {
        Ok(Vec::new())
    }

    async fn add_network_policy(&self, _: &str, _: &str, _: &str, _: u16, _: u16) -> ApiResult<()> {
        Ok(())
    }

    async fn remove_network_policy(
        &self,
        _: &str,
        _: &str,
        _: &str,
        _: u16,
        _: u16,
    ) -> ApiResult<()> {
        Ok(())
    }
}

fn cloner(mock: &Arc<MockOps>) -> ApplicationCloner {
    // Single attempt, no delay: these tests script exact call counts.
    ApplicationCloner::new(
        Arc::clone(mock) as Arc<dyn CloudOperations>,
        RetryPolicy {
            max_attempts: 1,
            delay: Duration::ZERO,
        },
    )
}

/// True if any placeholder directory for `target_app` is left in the
/// system temp directory.
fn leftover_placeholder_dirs(target_app: &str) -> bool {
    let Ok(entries) = fs::read_dir(std::env::temp_dir()) else {
        return false;
    };
    entries.flatten().any(|entry| {
        let name = entry.file_name().to_string_lossy().into_owned();
        name.starts_with("cf-") && name.contains(target_app)
    })
}

#[tokio::test]
async fn clones_billing_api_to_canary() {
    let mock = MockOps::with_source("billing-api", vec!["java_buildpack"], &[("FEATURE_X", "on")]);
    let report = cloner(&mock)
        .clone_application("billing-api", "billing-api-canary")
        .await
        .unwrap();

    assert_eq!(report.source_app, "billing-api");
    assert_eq!(report.target_app, "billing-api-canary");
    assert_eq!(report.runtime, "java_buildpack");
    assert_eq!(report.memory_mb, 512);
    assert_eq!(report.disk_mb, 1024);
    assert_eq!(report.instances, 2);
    assert_eq!(report.environment_variables, 1);

    let target = mock
        .apps
        .lock()
        .unwrap()
        .get("billing-api-canary")
        .cloned()
        .unwrap();
    assert_eq!(target.state, "STARTED");
    assert_eq!(target.memory_mb, 512);
    assert_eq!(target.disk_mb, 1024);
    assert_eq!(target.instances, 2);
    assert_eq!(target.buildpacks, vec!["java_buildpack"]);

    let env = mock
        .envs
        .lock()
        .unwrap()
        .get("billing-api-canary")
        .cloned()
        .unwrap();
    assert_eq!(env.get("FEATURE_X").map(String::as_str), Some("on"));

    assert!(!leftover_placeholder_dirs("billing-api-canary"));
}

#[tokio::test]
async fn placeholder_push_carries_source_sizing_and_pinning() {
    let mock = MockOps::with_source("billing-api", vec!["java_buildpack"], &[]);
    cloner(&mock)
        .clone_application("billing-api", "sizing-check")
        .await
        .unwrap();

    let recorded = mock.recorded.lock().unwrap();
    assert_eq!(recorded.pushes.len(), 1);
    let push = &recorded.pushes[0];
    assert_eq!(push.name, "sizing-check");
    assert!(push.no_start);
    assert_eq!(push.memory_mb, 512);
    assert_eq!(push.disk_mb, 1024);
    assert_eq!(push.instances, 2);
    assert_eq!(push.buildpack.as_deref(), Some("java_buildpack"));
    assert_eq!(push.staging_timeout, Duration::from_secs(3 * 60));
}

#[tokio::test]
async fn copy_does_not_restart_and_rescale_reasserts_sizing() {
    let mock = MockOps::with_source("billing-api", vec!["java_buildpack"], &[]);
    cloner(&mock)
        .clone_application("billing-api", "copy-check")
        .await
        .unwrap();

    let recorded = mock.recorded.lock().unwrap();
    assert_eq!(recorded.copies.len(), 1);
    let copy = &recorded.copies[0];
    assert_eq!(copy.source_name, "billing-api");
    assert_eq!(copy.target_name, "copy-check");
    assert!(!copy.restart);

    assert_eq!(recorded.scales.len(), 1);
    let scale = &recorded.scales[0];
    assert_eq!(scale.memory_mb, Some(512));
    assert_eq!(scale.disk_mb, Some(1024));
    assert_eq!(scale.instances, Some(2));

    assert_eq!(recorded.starts.len(), 1);
    assert_eq!(recorded.starts[0].name, "copy-check");
}

#[tokio::test]
async fn pipeline_steps_run_in_order() {
    let mock = MockOps::with_source("billing-api", vec!["java_buildpack"], &[("A", "1")]);
    cloner(&mock)
        .clone_application("billing-api", "order-check")
        .await
        .unwrap();

    let push = mock.position("push");
    let env = mock.position("set_environment_variable");
    let copy = mock.position("copy_source");
    let scale = mock.position("scale");
    let start = mock.position("start");
    assert!(push < env, "env vars must be applied after the push");
    assert!(env < copy, "copy must follow env application");
    assert!(copy < scale, "rescale must follow the copy");
    assert!(scale < start, "start must follow the rescale");
}

#[tokio::test]
async fn runtime_pinning_holds_for_every_label() {
    let labels = [
        "java_buildpack",
        "java_buildpack_offline",
        "nodejs_buildpack",
        "python_buildpack",
        "go_buildpack",
        "php_buildpack",
        "ruby_buildpack",
        "staticfile_buildpack",
        "binary_buildpack",
    ];
    for label in labels {
        let target = format!("pin-check-{}", label.replace('_', "-"));
        let mock = MockOps::with_source("src-app", vec![label], &[]);
        cloner(&mock)
            .clone_application("src-app", &target)
            .await
            .unwrap();

        let recorded = mock.recorded.lock().unwrap();
        assert_eq!(
            recorded.pushes[0].buildpack.as_deref(),
            Some(label),
            "push must pin the captured label '{}'",
            label
        );
        drop(recorded);
        assert!(!leftover_placeholder_dirs(&target));
    }
}

#[tokio::test]
async fn unassigned_buildpacks_fall_back_to_static_content() {
    let mock = MockOps::with_source("legacy-app", vec![], &[]);
    let report = cloner(&mock)
        .clone_application("legacy-app", "legacy-copy")
        .await
        .unwrap();

    // No buildpack assigned reads as "unknown" and still pins that label.
    assert_eq!(report.runtime, "unknown");
    let recorded = mock.recorded.lock().unwrap();
    assert_eq!(recorded.pushes[0].buildpack.as_deref(), Some("unknown"));
}

#[tokio::test]
async fn environment_variables_are_applied_in_key_order() {
    let mock = MockOps::with_source(
        "env-app",
        vec!["nodejs_buildpack"],
        &[("ZEBRA", "z"), ("ALPHA", "a"), ("MIDDLE", "m")],
    );
    cloner(&mock)
        .clone_application("env-app", "env-copy")
        .await
        .unwrap();

    let recorded = mock.recorded.lock().unwrap();
    let keys: Vec<&str> = recorded
        .env_sets
        .iter()
        .map(|(_, k, _)| k.as_str())
        .collect();
    assert_eq!(keys, vec!["ALPHA", "MIDDLE", "ZEBRA"]);
    assert!(recorded.env_sets.iter().all(|(app, _, _)| app == "env-copy"));
}

#[tokio::test]
async fn empty_environment_performs_no_set_calls() {
    let mock = MockOps::with_source("bare-app", vec!["go_buildpack"], &[]);
    cloner(&mock)
        .clone_application("bare-app", "bare-copy")
        .await
        .unwrap();

    assert!(mock.recorded.lock().unwrap().env_sets.is_empty());
}

#[tokio::test]
async fn environment_read_failure_degrades_to_empty() {
    let mock = MockOps::with_source("env-app", vec!["ruby_buildpack"], &[("K", "v")]);
    mock.fail_at(FailPoint::GetEnvironment, platform_error());

    let report = cloner(&mock)
        .clone_application("env-app", "env-degraded")
        .await
        .unwrap();

    assert_eq!(report.environment_variables, 0);
    assert!(mock.recorded.lock().unwrap().env_sets.is_empty());
}

#[tokio::test]
async fn missing_source_app_fails_snapshot_with_no_leftovers() {
    let mock = Arc::new(MockOps::new());
    let err = cloner(&mock)
        .clone_application("ghost-app", "ghost-copy")
        .await
        .unwrap_err();

    assert!(matches!(err, CloneError::Snapshot { .. }));
    assert!(mock.recorded.lock().unwrap().pushes.is_empty());
    assert!(!leftover_placeholder_dirs("ghost-copy"));
}

#[tokio::test]
async fn push_failure_cleans_up_placeholder_directory() {
    let mock = MockOps::with_source("billing-api", vec!["java_buildpack"], &[]);
    mock.fail_at(FailPoint::Push, platform_error());

    let err = cloner(&mock)
        .clone_application("billing-api", "push-fail-copy")
        .await
        .unwrap_err();

    assert!(matches!(err, CloneError::Deploy { .. }));
    assert!(!leftover_placeholder_dirs("push-fail-copy"));
}

#[tokio::test]
async fn copy_failure_cleans_up_placeholder_directory() {
    let mock = MockOps::with_source("billing-api", vec!["java_buildpack"], &[]);
    mock.fail_at(FailPoint::CopySource, platform_error());

    let err = cloner(&mock)
        .clone_application("billing-api", "copy-fail-copy")
        .await
        .unwrap_err();

    assert!(matches!(err, CloneError::CopySource { .. }));
    assert!(!leftover_placeholder_dirs("copy-fail-copy"));
}

#[tokio::test]
async fn scale_failure_cleans_up_placeholder_directory() {
    let mock = MockOps::with_source("billing-api", vec!["java_buildpack"], &[]);
    mock.fail_at(FailPoint::Scale, platform_error());

    let err = cloner(&mock)
        .clone_application("billing-api", "scale-fail-copy")
        .await
        .unwrap_err();

    assert!(matches!(err, CloneError::Rescale { .. }));
    assert!(!leftover_placeholder_dirs("scale-fail-copy"));
}

#[tokio::test]
async fn start_failure_cleans_up_placeholder_directory() {
    let mock = MockOps::with_source("billing-api", vec!["java_buildpack"], &[]);
    mock.fail_at(FailPoint::Start, platform_error());

    let err = cloner(&mock)
        .clone_application("billing-api", "start-fail-copy")
        .await
        .unwrap_err();

    assert!(matches!(err, CloneError::Start { .. }));
    assert!(!leftover_placeholder_dirs("start-fail-copy"));
}

#[tokio::test]
async fn env_application_failure_surfaces_variable_name() {
    let mock = MockOps::with_source("env-app", vec!["php_buildpack"], &[("ONLY", "one")]);
    mock.fail_at(FailPoint::SetEnvironmentVariable, platform_error());

    let err = cloner(&mock)
        .clone_application("env-app", "env-fail-copy")
        .await
        .unwrap_err();

    match err {
        CloneError::Environment { variable, .. } => assert_eq!(variable, "ONLY"),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!leftover_placeholder_dirs("env-fail-copy"));
}

#[tokio::test]
async fn runtime_mismatch_after_copy_is_a_distinct_error() {
    let mock = MockOps::with_source("billing-api", vec!["java_buildpack"], &[("FEATURE_X", "on")]);
    mock.read_back_buildpacks_after_copy(vec!["nodejs_buildpack"]);

    let err = cloner(&mock)
        .clone_application("billing-api", "mismatch-copy")
        .await
        .unwrap_err();

    match err {
        CloneError::RuntimeMismatch {
            app,
            expected,
            actual,
        } => {
            assert_eq!(app, "mismatch-copy");
            assert_eq!(expected, "java_buildpack");
            assert_eq!(actual, "nodejs_buildpack");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!leftover_placeholder_dirs("mismatch-copy"));
}
