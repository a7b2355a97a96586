//! Shared test fixtures: a scripted in-memory register

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use rpo_resolver::rpo::IdentifierEntry;
use rpo_resolver::{CandidateRecord, RegistrySearch, SearchError};
use tokio::time::Instant;

/// One scripted answer to a search
#[derive(Debug, Clone)]
pub enum Reply {
    Records(Vec<CandidateRecord>),
    Status(u16),
    Transport,
    Malformed,
    Panic,
}

#[derive(Debug, Clone)]
pub struct Call {
    pub query: String,
    pub only_active: bool,
    pub at: Instant,
}

type CallHook = Box<dyn Fn(&str) + Send + Sync>;

/// Register stand-in. Each query replays its script in order and repeats the
/// last reply once the script runs out; unknown queries return zero results.
#[derive(Default)]
pub struct ScriptedRegistry {
    scripts: Mutex<HashMap<String, VecDeque<Reply>>>,
    latency: HashMap<String, Duration>,
    calls: Mutex<Vec<Call>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    hook: Option<CallHook>,
}

impl ScriptedRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(self, query: &str, replies: Vec<Reply>) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(query.to_string(), replies.into());
        self
    }

    /// Simulated response time for `query`
    pub fn with_latency(mut self, query: &str, latency: Duration) -> Self {
        self.latency.insert(query.to_string(), latency);
        self
    }

    /// Run `hook` with the query at the start of every call
    pub fn with_hook(mut self, hook: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.hook = Some(Box::new(hook));
        self
    }

    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn queries(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.query).collect()
    }

    pub fn calls_for(&self, query: &str) -> Vec<Call> {
        self.calls().into_iter().filter(|c| c.query == query).collect()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn next_reply(&self, query: &str) -> Reply {
        let mut scripts = self.scripts.lock().unwrap();
        match scripts.get_mut(query) {
            Some(script) if script.len() > 1 => script.pop_front().unwrap(),
            Some(script) => script.front().cloned().unwrap_or(Reply::Records(vec![])),
            None => Reply::Records(vec![]),
        }
    }
}

struct InFlightGuard<'a>(&'a AtomicUsize);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl RegistrySearch for ScriptedRegistry {
    async fn search(
        &self,
        query: &str,
        only_active: bool,
    ) -> Result<Vec<CandidateRecord>, SearchError> {
        self.calls.lock().unwrap().push(Call {
            query: query.to_string(),
            only_active,
            at: Instant::now(),
        });
        if let Some(hook) = &self.hook {
            hook(query);
        }

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let _guard = InFlightGuard(&self.in_flight);

        if let Some(latency) = self.latency.get(query) {
            tokio::time::sleep(*latency).await;
        }

        match self.next_reply(query) {
            Reply::Records(records) => Ok(records),
            Reply::Status(status) => Err(SearchError::Status {
                status,
                body: "scripted".to_string(),
            }),
            Reply::Transport => Err(SearchError::Transport("connection reset".to_string())),
            Reply::Malformed => Err(SearchError::Decode(
                serde_json::from_str::<serde_json::Value>("<html>").unwrap_err(),
            )),
            Reply::Panic => panic!("scripted panic for {query}"),
        }
    }
}

/// Single-record answer with a typed ICO
pub fn company(name: &str, ico: &str) -> Reply {
    Reply::Records(vec![CandidateRecord::new(
        &[name],
        vec![IdentifierEntry::new(ico, Some("ICO"))],
    )])
}

pub fn names(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
