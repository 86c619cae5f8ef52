#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use runbook_exec::{
    ApiRequest, CancelHandle, CapabilityError, CommandDispatcher, CommandInvocation,
    CommandOutput, CommandRunner, CommandStatus, DispatchRequest, DispatchResult, RemoteApi,
    ScriptInvocation, ScriptRunner,
};
use serde_json::{json, Value};

/// Answers each API from a queue of canned results, then with `{}`.
#[derive(Default)]
pub struct MockApi {
    responses: Mutex<HashMap<String, VecDeque<Result<Value, CapabilityError>>>>,
    requests: Mutex<Vec<ApiRequest>>,
    delay: Option<Duration>,
    cancel_on_call: Option<CancelHandle>,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, api: &str, result: Result<Value, CapabilityError>) -> Self {
        self.responses
            .lock()
            .unwrap()
            .entry(api.to_string())
            .or_default()
            .push_back(result);
        self
    }

    pub fn ok(self, api: &str, value: Value) -> Self {
        self.respond(api, Ok(value))
    }

    pub fn fail(self, api: &str, times: usize) -> Self {
        (0..times).fold(self, |api_mock, n| {
            api_mock.respond(api, Err(CapabilityError::Failed(format!("failure {n}"))))
        })
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn cancelling(mut self, handle: CancelHandle) -> Self {
        self.cancel_on_call = Some(handle);
        self
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn calls_to(&self, api: &str) -> usize {
        self.requests().iter().filter(|r| r.api == api).count()
    }
}

#[async_trait]
impl RemoteApi for MockApi {
    async fn call(&self, request: ApiRequest) -> Result<Value, CapabilityError> {
        let api = request.api.clone();
        self.requests.lock().unwrap().push(request);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(handle) = &self.cancel_on_call {
            handle.cancel();
        }
        let next = self
            .responses
            .lock()
            .unwrap()
            .get_mut(&api)
            .and_then(VecDeque::pop_front);
        next.unwrap_or_else(|| Ok(json!({})))
    }
}

/// Echoes the payload back as the handler result.
#[derive(Default)]
pub struct EchoScripts {
    pub invocations: Mutex<Vec<ScriptInvocation>>,
}

#[async_trait]
impl ScriptRunner for EchoScripts {
    async fn run(&self, invocation: ScriptInvocation) -> Result<Value, CapabilityError> {
        let payload = Value::Object(invocation.payload.clone());
        self.invocations.lock().unwrap().push(invocation);
        Ok(payload)
    }
}

/// Exit codes keyed by a substring of the command script; 0 otherwise.
#[derive(Default)]
pub struct MockCommands {
    exit_codes: Vec<(String, i32)>,
    errors: Vec<(String, CapabilityError)>,
    pub invocations: Mutex<Vec<CommandInvocation>>,
}

impl MockCommands {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exit_with(mut self, needle: &str, code: i32) -> Self {
        self.exit_codes.push((needle.to_string(), code));
        self
    }

    pub fn error_with(mut self, needle: &str, error: CapabilityError) -> Self {
        self.errors.push((needle.to_string(), error));
        self
    }

    pub fn scripts(&self) -> Vec<String> {
        self.invocations
            .lock()
            .unwrap()
            .iter()
            .map(|i| i.script.clone())
            .collect()
    }
}

#[async_trait]
impl CommandRunner for MockCommands {
    async fn run(&self, invocation: CommandInvocation) -> Result<CommandOutput, CapabilityError> {
        let error = self
            .errors
            .iter()
            .find(|(needle, _)| invocation.script.contains(needle.as_str()))
            .map(|(_, e)| e.clone());
        if let Some(error) = error {
            self.invocations.lock().unwrap().push(invocation);
            return Err(error);
        }
        let exit_code = self
            .exit_codes
            .iter()
            .find(|(needle, _)| invocation.script.contains(needle.as_str()))
            .map(|(_, code)| *code)
            .unwrap_or(0);
        let stdout = format!("ran: {}", invocation.script);
        self.invocations.lock().unwrap().push(invocation);
        Ok(CommandOutput {
            exit_code,
            stdout,
            stderr: String::new(),
        })
    }
}

/// Reports queued statuses on each wait, then the last one forever.
pub struct MockDispatcher {
    statuses: Mutex<VecDeque<CommandStatus>>,
    last: Mutex<CommandStatus>,
    pub sent: Mutex<Vec<DispatchRequest>>,
    pub waits: Mutex<usize>,
    response_code: i64,
}

impl MockDispatcher {
    pub fn new(statuses: impl IntoIterator<Item = CommandStatus>, response_code: i64) -> Arc<Self> {
        Arc::new(Self {
            statuses: Mutex::new(statuses.into_iter().collect()),
            last: Mutex::new(CommandStatus::Pending),
            sent: Mutex::new(Vec::new()),
            waits: Mutex::new(0),
            response_code,
        })
    }

    pub fn wait_count(&self) -> usize {
        *self.waits.lock().unwrap()
    }
}

#[async_trait]
impl CommandDispatcher for MockDispatcher {
    async fn send(&self, request: DispatchRequest) -> Result<String, CapabilityError> {
        self.sent.lock().unwrap().push(request);
        Ok("cmd-1".to_string())
    }

    async fn wait(&self, command_id: &str) -> Result<CommandStatus, CapabilityError> {
        assert_eq!(command_id, "cmd-1");
        *self.waits.lock().unwrap() += 1;
        let mut last = self.last.lock().unwrap();
        if let Some(next) = self.statuses.lock().unwrap().pop_front() {
            *last = next;
        }
        Ok(*last)
    }

    async fn fetch(&self, _command_id: &str) -> Result<DispatchResult, CapabilityError> {
        Ok(DispatchResult {
            status: *self.last.lock().unwrap(),
            response_code: self.response_code,
            output: "done".to_string(),
        })
    }
}
