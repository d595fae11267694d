//! In-memory `LoadForgeApi` double for sync tests.
//!
//! Records every call and supports scripted per-call rejections so the
//! engine's fallback and gating behavior can be asserted without any
//! transport.

use crate::api::LoadForgeApi;
use crate::error::{LfError, Result};
use crate::model::{HostCreated, HostSpec, JsonMap, RemoteHost, RemoteTest, RunResult};
use serde_json::{Value, json};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

/// One recorded API call, with enough detail to assert payload shapes.
#[derive(Debug, Clone)]
pub(crate) enum MockCall {
    ListTests,
    ListHosts,
    CreateHost(String),
    CreateTest(JsonMap),
    UpdateTest(i64, JsonMap),
    DeleteTest(i64),
    StartRun(i64, u32),
    GetResult(String),
}

impl MockCall {
    /// Whether this call mutates remote state.
    pub(crate) const fn is_mutation(&self) -> bool {
        matches!(
            self,
            Self::CreateHost(_) | Self::CreateTest(_) | Self::UpdateTest(..) | Self::DeleteTest(_)
        )
    }
}

#[derive(Default)]
pub(crate) struct MockApi {
    /// Remote test inventory returned by `list_tests`.
    pub tests: RefCell<Vec<RemoteTest>>,
    /// Remote host inventory; `create_host` appends here.
    pub hosts: RefCell<Vec<RemoteHost>>,
    /// When set, `list_hosts` rejects.
    pub fail_list_hosts: Cell<bool>,
    /// Statuses to reject successive `update_test` calls with; an empty
    /// queue means success.
    pub update_failures: RefCell<VecDeque<u16>>,
    /// Same, for `create_test`.
    pub create_failures: RefCell<VecDeque<u16>>,
    /// Same, for `delete_test`.
    pub delete_failures: RefCell<VecDeque<u16>>,
    next_host_id: Cell<i64>,
    calls: RefCell<Vec<MockCall>>,
}

impl MockApi {
    pub(crate) fn with_tests(tests: Vec<RemoteTest>) -> Self {
        let api = Self::default();
        *api.tests.borrow_mut() = tests;
        api
    }

    pub(crate) fn calls(&self) -> Vec<MockCall> {
        self.calls.borrow().clone()
    }

    pub(crate) fn mutation_count(&self) -> usize {
        self.calls().iter().filter(|c| c.is_mutation()).count()
    }

    fn record(&self, call: MockCall) {
        self.calls.borrow_mut().push(call);
    }

    fn reject(endpoint: &str, status: u16) -> LfError {
        LfError::Api {
            status,
            endpoint: endpoint.to_string(),
            message: "mock rejection".to_string(),
        }
    }

    fn scripted(queue: &RefCell<VecDeque<u16>>, endpoint: &str) -> Result<()> {
        match queue.borrow_mut().pop_front() {
            Some(status) => Err(Self::reject(endpoint, status)),
            None => Ok(()),
        }
    }
}

impl LoadForgeApi for MockApi {
    fn list_tests(&self) -> Result<Vec<RemoteTest>> {
        self.record(MockCall::ListTests);
        Ok(self.tests.borrow().clone())
    }

    fn create_test(&self, payload: &JsonMap) -> Result<Value> {
        self.record(MockCall::CreateTest(payload.clone()));
        Self::scripted(&self.create_failures, "/tests")?;
        Ok(json!({"id": 900, "name": payload.get("name")}))
    }

    fn update_test(&self, id: i64, payload: &JsonMap) -> Result<Value> {
        self.record(MockCall::UpdateTest(id, payload.clone()));
        Self::scripted(&self.update_failures, "/tests")?;
        Ok(json!({"id": id}))
    }

    fn delete_test(&self, id: i64) -> Result<Value> {
        self.record(MockCall::DeleteTest(id));
        Self::scripted(&self.delete_failures, "/tests")?;
        Ok(Value::Null)
    }

    fn list_hosts(&self) -> Result<Vec<RemoteHost>> {
        self.record(MockCall::ListHosts);
        if self.fail_list_hosts.get() {
            return Err(Self::reject("/hosts", 500));
        }
        Ok(self.hosts.borrow().clone())
    }

    fn create_host(&self, spec: &HostSpec) -> Result<HostCreated> {
        self.record(MockCall::CreateHost(spec.to_string()));
        let id = 100 + self.next_host_id.get();
        self.next_host_id.set(self.next_host_id.get() + 1);
        self.hosts.borrow_mut().push(RemoteHost {
            id,
            protocol: Some(spec.protocol.as_str().to_string()),
            url: Some(spec.host.clone()),
            port: Some(spec.port.into()),
        });
        Ok(HostCreated {
            id: Some(id),
            host_id: None,
        })
    }

    fn start_run(&self, test_id: i64, duration: u32) -> Result<Value> {
        self.record(MockCall::StartRun(test_id, duration));
        Ok(json!({"run_id": 7000}))
    }

    fn get_result(&self, result_id: &str) -> Result<RunResult> {
        self.record(MockCall::GetResult(result_id.to_string()));
        Ok(RunResult::default())
    }
}
