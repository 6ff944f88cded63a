// ABOUTME: Test support utilities.
// ABOUTME: Provides a scripted in-memory orchestrator, settings, and confirmation helpers.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::path::Path;
use std::sync::Once;
use swatch::config::{Config, Settings};
use swatch::deploy::{ConfirmRequest, ConfirmationPolicy};
use swatch::orchestrator::{BuildOptions, ContainerOrchestrator, OrchestratorError, ServiceStatus};
use swatch::types::{Environment, ServiceName};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
#[allow(dead_code)]
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter =
            EnvFilter::from_default_env().add_directive("swatch=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// Configuration with every delay set to zero.
#[allow(dead_code)]
pub const FAST_CONFIG: &str = r#"
router:
  grace_period: 0s
health:
  grace_period: 0s
  timeout: 1s
  retries: 0
  interval: 0s
staging_settle: 0s
environments:
  staging:
    compose_file: docker-compose.staging.yml
  prod:
    compose_file: docker-compose.prod.yml
"#;

/// Settings for `environment` with state and pointer files under `dir`.
#[allow(dead_code)]
pub fn settings(dir: &Path, environment: Environment) -> Settings {
    let mut config = Config::from_yaml(FAST_CONFIG).unwrap();
    config.base_dir = dir.to_path_buf();
    config.for_environment(environment).unwrap()
}

/// One recorded orchestrator call.
#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Build {
        services: Vec<String>,
        no_cache: bool,
    },
    Stop(Vec<String>),
    Remove(Vec<String>),
    Start {
        services: Vec<String>,
        env: BTreeMap<String, String>,
    },
    ListStatus,
}

impl Call {
    /// Whether the call addresses `service` by name.
    #[allow(dead_code)]
    pub fn touches(&self, service: &str) -> bool {
        match self {
            Call::Build { services, .. }
            | Call::Stop(services)
            | Call::Remove(services)
            | Call::Start { services, .. } => services.iter().any(|s| s == service),
            Call::ListStatus => false,
        }
    }
}

/// Operations a fake can be told to fail.
#[allow(dead_code)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Op {
    Build,
    Stop,
    Remove,
    Start,
    ListStatus,
}

type Hook = Box<dyn Fn() + Send + Sync>;

/// In-memory orchestrator tracking which services run.
#[derive(Default)]
pub struct FakeOrchestrator {
    calls: Mutex<Vec<Call>>,
    running: Mutex<BTreeSet<String>>,
    known: Mutex<BTreeSet<String>>,
    project: Vec<String>,
    broken: BTreeSet<String>,
    failing: BTreeSet<Op>,
    hooks: BTreeMap<Op, Hook>,
}

#[allow(dead_code)]
impl FakeOrchestrator {
    /// A project whose services are `backend` and `webui` when addressed as a whole.
    pub fn new() -> Self {
        Self {
            project: vec!["backend".to_string(), "webui".to_string()],
            ..Self::default()
        }
    }

    /// Mark services as already running.
    pub fn with_running(self, services: &[&str]) -> Self {
        {
            let mut running = self.running.lock();
            let mut known = self.known.lock();
            for service in services {
                running.insert(service.to_string());
                known.insert(service.to_string());
            }
        }
        self
    }

    /// Services that exit right after being started.
    pub fn with_broken(mut self, services: &[&str]) -> Self {
        self.broken
            .extend(services.iter().map(|s| s.to_string()));
        self
    }

    /// Make every call of `op` fail.
    pub fn failing(mut self, op: Op) -> Self {
        self.failing.insert(op);
        self
    }

    /// Run `hook` whenever `op` is called.
    pub fn on(mut self, op: Op, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.hooks.insert(op, Box::new(hook));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    /// Calls other than status listings.
    pub fn mutations(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| *c != Call::ListStatus)
            .collect()
    }

    pub fn is_running(&self, service: &str) -> bool {
        self.running.lock().contains(service)
    }

    fn record(&self, call: Call) {
        self.calls.lock().push(call);
    }

    fn check(&self, op: Op) -> Result<(), OrchestratorError> {
        if let Some(hook) = self.hooks.get(&op) {
            hook();
        }
        if self.failing.contains(&op) {
            Err(OrchestratorError::failed(
                format!("docker compose {:?}", op).to_lowercase(),
                "scripted failure",
            ))
        } else {
            Ok(())
        }
    }

    fn resolve(&self, services: &[ServiceName]) -> Vec<String> {
        if services.is_empty() {
            self.project.clone()
        } else {
            services.iter().map(|s| s.to_string()).collect()
        }
    }
}

fn names(services: &[ServiceName]) -> Vec<String> {
    services.iter().map(|s| s.to_string()).collect()
}

#[async_trait]
impl ContainerOrchestrator for FakeOrchestrator {
    async fn build(
        &self,
        services: &[ServiceName],
        options: BuildOptions,
    ) -> Result<(), OrchestratorError> {
        self.record(Call::Build {
            services: names(services),
            no_cache: options.no_cache,
        });
        self.check(Op::Build)
    }

    async fn stop(&self, services: &[ServiceName]) -> Result<(), OrchestratorError> {
        self.record(Call::Stop(names(services)));
        self.check(Op::Stop)?;
        let mut running = self.running.lock();
        if services.is_empty() {
            running.clear();
        } else {
            for service in services {
                running.remove(service.as_str());
            }
        }
        Ok(())
    }

    async fn remove(&self, services: &[ServiceName]) -> Result<(), OrchestratorError> {
        self.record(Call::Remove(names(services)));
        self.check(Op::Remove)?;
        let mut known = self.known.lock();
        for service in self.resolve(services) {
            known.remove(&service);
        }
        Ok(())
    }

    async fn start(
        &self,
        services: &[ServiceName],
        env: &HashMap<String, String>,
    ) -> Result<(), OrchestratorError> {
        self.record(Call::Start {
            services: names(services),
            env: env.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        });
        self.check(Op::Start)?;
        let mut running = self.running.lock();
        let mut known = self.known.lock();
        for service in self.resolve(services) {
            known.insert(service.clone());
            if !self.broken.contains(&service) {
                running.insert(service);
            }
        }
        Ok(())
    }

    async fn list_status(&self) -> Result<Vec<ServiceStatus>, OrchestratorError> {
        self.record(Call::ListStatus);
        self.check(Op::ListStatus)?;
        let running = self.running.lock();
        Ok(self
            .known
            .lock()
            .iter()
            .map(|service| {
                if running.contains(service) {
                    ServiceStatus::running(service)
                } else {
                    ServiceStatus::exited(service)
                }
            })
            .collect())
    }
}

/// Confirmation policy answering from a script and remembering the questions.
#[allow(dead_code)]
pub struct Scripted {
    answers: VecDeque<bool>,
    pub asked: Vec<ConfirmRequest>,
}

#[allow(dead_code)]
impl Scripted {
    pub fn new(answers: &[bool]) -> Self {
        Self {
            answers: answers.iter().copied().collect(),
            asked: Vec::new(),
        }
    }
}

impl ConfirmationPolicy for Scripted {
    fn confirm(&mut self, request: &ConfirmRequest) -> bool {
        self.asked.push(*request);
        self.answers.pop_front().unwrap_or(false)
    }
}
