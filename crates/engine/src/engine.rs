// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The cooperative engine loop.
//!
//! One engine, one task: drain a control datagram (or a stored fallback
//! event), fire due timers, run the current state's actions in order,
//! then sleep adaptively. Transition resolution is first-match-wins over
//! the definition's document order with `*` wildcards. Action failures
//! never escape the dispatch site — they become `error` events.

use crate::action::ActionEnv;
use crate::error::EngineError;
use crate::registry::{ActionRegistry, RegistryError};
use crate::sockets::{auto_parse_payload, ControlSocket, Telemetry};
use crate::timers::TimerSet;
use fsm_config::FsmConfig;
use fsm_core::ratelimit::count_suffix;
use fsm_core::{event, interpolate_config, Clock, Context, Map, RateCounter, SocketNamespace, SystemClock};
use fsm_store::Database;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Idle threshold: no non-idle activity for this long means the loop can
/// sleep at the long interval.
const IDLE_AFTER: Duration = Duration::from_secs(5);
const IDLE_INTERVAL: Duration = Duration::from_millis(500);
const ACTIVE_INTERVAL: Duration = Duration::from_millis(50);

/// Engine construction options.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    machine_name: Option<String>,
    db_path: PathBuf,
    namespace: SocketNamespace,
    initial_context: Option<Map>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            machine_name: None,
            db_path: PathBuf::from(fsm_store::DEFAULT_DB_PATH),
            namespace: SocketNamespace::default(),
            initial_context: None,
        }
    }
}

impl EngineOptions {
    pub fn new() -> Self {
        Self::default()
    }

    fsm_core::setters! {
        into {
            db_path: PathBuf,
        }
        set {
            namespace: SocketNamespace,
        }
        option {
            machine_name: String,
            initial_context: Map,
        }
    }
}

/// Cooperative stop flag, flipped from a signal handler or another task.
#[derive(Clone)]
pub struct ShutdownHandle {
    running: Arc<AtomicBool>,
}

impl ShutdownHandle {
    pub fn stop(&self) {
        self.running.store(false, Ordering::Relaxed);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }
}

/// One running state machine process.
pub struct Engine {
    config: FsmConfig,
    machine_name: String,
    current_state: String,
    context: Context,
    env: ActionEnv,
    registry: ActionRegistry,
    control: ControlSocket,
    timers: TimerSet,
    counters: RateCounter,
    clock: SystemClock,
    sleep_count: u64,
    last_activity: Instant,
    running: Arc<AtomicBool>,
}

impl Engine {
    /// Build an engine with the built-in action registry.
    ///
    /// Must be called within a tokio runtime (the control socket
    /// registers with the reactor). Store and socket problems here are
    /// unrecoverable startup failures.
    pub fn new(config: FsmConfig, options: EngineOptions) -> Result<Self, EngineError> {
        Self::with_registry(config, options, ActionRegistry::builtin())
    }

    /// Build an engine with a caller-supplied registry (embedders add or
    /// shadow action types before passing it in).
    pub fn with_registry(
        config: FsmConfig,
        options: EngineOptions,
        registry: ActionRegistry,
    ) -> Result<Self, EngineError> {
        let machine_name = options
            .machine_name
            .clone()
            .or_else(|| config.machine_name().map(String::from))
            .unwrap_or_else(|| "unknown".to_string());

        let db = Database::open(&options.db_path)?;
        let control = ControlSocket::bind(&options.namespace, &machine_name)?;
        let telemetry = Telemetry::new(&machine_name, &options.namespace, db.clone());
        let env = ActionEnv {
            db,
            machine_name: machine_name.clone(),
            namespace: options.namespace.clone(),
            telemetry,
        };

        let mut context = Context::new();
        if let Some(initial) = options.initial_context {
            context.merge(initial);
        }

        let current_state = config.initial_state.clone();
        tracing::info!(
            machine = %machine_name,
            state = %current_state,
            "loaded state machine config"
        );

        Ok(Self {
            config,
            machine_name,
            current_state,
            context,
            env,
            registry,
            control,
            timers: TimerSet::new(),
            counters: RateCounter::new(),
            clock: SystemClock,
            sleep_count: 0,
            last_activity: Instant::now(),
            running: Arc::new(AtomicBool::new(true)),
        })
    }

    pub fn machine_name(&self) -> &str {
        &self.machine_name
    }

    pub fn current_state(&self) -> &str {
        &self.current_state
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            running: Arc::clone(&self.running),
        }
    }

    /// Run until the terminal `stopped` state or a cooperative stop.
    pub async fn run(&mut self) -> Result<(), EngineError> {
        self.context.set("machine_name", self.machine_name.clone());
        self.update_machine_state();
        tracing::info!(
            machine = %self.machine_name,
            state = %self.current_state,
            "starting state machine execution"
        );

        // The initial state counts as entered: its timed transitions are
        // armed even if the synthetic start event matches nothing.
        self.arm_timers();
        self.process_event(event::START);

        while self.running.load(Ordering::Relaxed) {
            if !self.drain_control_socket() {
                self.drain_store_events();
            }
            self.fire_due_timers();

            if self.current_state == event::STOPPED {
                tracing::info!(machine = %self.machine_name, "reached terminal state");
                break;
            }

            self.run_state_actions().await;

            if self.current_state == event::STOPPED {
                tracing::info!(machine = %self.machine_name, "reached terminal state");
                break;
            }
            if !self.running.load(Ordering::Relaxed) {
                break;
            }

            self.idle_wait().await;
        }

        self.update_machine_state();
        tracing::info!(machine = %self.machine_name, "state machine exited");
        Ok(())
    }

    /// Dispatch an event through the transition table.
    ///
    /// Returns true when a transition fired. A missing transition is a
    /// legal drop, logged at debug.
    pub fn process_event(&mut self, event_name: &str) -> bool {
        const ROUTINE: [&str; 3] = ["cleanup_done", event::NO_EVENTS, event::NO_JOBS];
        if !ROUTINE.contains(&event_name) {
            tracing::debug!(
                machine = %self.machine_name,
                event = event_name,
                state = %self.current_state,
                "processing event"
            );
        }

        let Some(transition) = self.config.find_transition(&self.current_state, event_name) else {
            if event_name != "cleanup_done" {
                tracing::debug!(
                    machine = %self.machine_name,
                    event = event_name,
                    state = %self.current_state,
                    "no transition found"
                );
            }
            return false;
        };

        let to = transition.to.clone();
        let is_self_loop = to == self.current_state;
        let is_idle = event::is_idle_event(event_name);

        let key = format!("transition:{}--{}-->{}", self.current_state, event_name, to);
        let count = self.counters.tick(&key);
        self.log_transition(event_name, &to, is_self_loop, is_idle, count);

        let previous = std::mem::replace(&mut self.current_state, to);
        if !is_idle || !is_self_loop {
            self.last_activity = Instant::now();
        }

        // Entering a state (including re-entry) restarts its timers and
        // cancels the previous state's.
        self.arm_timers();

        // Idle self-loops are suppressed from telemetry but still counted
        if !(is_self_loop && is_idle) {
            self.env.telemetry.emit(
                "state_change",
                json!({
                    "from_state": previous,
                    "to_state": self.current_state,
                    "event_trigger": event_name,
                    "timestamp": self.clock.epoch_secs(),
                }),
            );
            let job_id = self.context.current_job_id();
            if let Err(e) = self.env.db.pipeline_results().record_state_change(
                &self.machine_name,
                &self.current_state,
                event_name,
                job_id.as_deref(),
            ) {
                tracing::debug!(error = %e, "failed to record state change");
            }
            self.update_machine_state();
        }

        true
    }

    fn log_transition(
        &mut self,
        event_name: &str,
        to: &str,
        is_self_loop: bool,
        is_idle: bool,
        count: u64,
    ) {
        let log_at_debug = is_self_loop && is_idle;
        let should_log = if log_at_debug {
            count == 1 || count % 100 == 0
        } else {
            count == 1 || !is_idle || !is_self_loop || count % 10 == 0
        };
        if !should_log {
            return;
        }

        let actions: Vec<&str> = self
            .config
            .actions_for(to)
            .iter()
            .filter_map(|a| a.action_type())
            .collect();
        let actions_text = if actions.is_empty() {
            "no actions".to_string()
        } else {
            actions.join(" / ")
        };
        let suffix = count_suffix(count);
        if log_at_debug {
            tracing::debug!(
                machine = %self.machine_name,
                "{} --{}--> {}: {}{}",
                self.current_state, event_name, to, actions_text, suffix
            );
        } else {
            tracing::info!(
                machine = %self.machine_name,
                "{} --{}--> {}: {}{}",
                self.current_state, event_name, to, actions_text, suffix
            );
        }
    }

    /// Drain one datagram from the control socket, if any.
    fn drain_control_socket(&mut self) -> bool {
        let Some(incoming) = self.control.try_recv() else {
            return false;
        };

        tracing::info!(
            machine = %self.machine_name,
            event = %incoming.event_type,
            "received event"
        );
        self.emit_receipt(&incoming.event_type, &incoming.record);
        self.context.set("event_data", incoming.record);
        self.process_event(&incoming.event_type);
        true
    }

    /// Deliver the oldest pending stored event, completing the
    /// at-least-once fallback path. The row is marked processed after
    /// dispatch so a crash mid-delivery re-delivers rather than drops.
    fn drain_store_events(&mut self) -> bool {
        let pending = match self.env.db.machine_events().pending(&self.machine_name) {
            Ok(pending) => pending,
            Err(e) => {
                tracing::debug!(error = %e, "pending event poll failed");
                return false;
            }
        };
        let Some(stored) = pending.into_iter().next() else {
            return false;
        };

        let mut record = json!({
            "type": stored.event_type,
            "payload": stored.payload.clone().map(Value::String).unwrap_or_else(|| json!({})),
            "job_id": stored.job_id,
            "source_machine": stored.source_machine,
        });
        auto_parse_payload(&mut record, &stored.event_type);

        tracing::info!(
            machine = %self.machine_name,
            event = %stored.event_type,
            event_id = stored.id,
            "delivering stored event"
        );
        self.emit_receipt(&stored.event_type, &record);
        self.context.set("event_data", record);
        self.process_event(&stored.event_type);

        if let Err(e) = self.env.db.machine_events().mark_processed(stored.id) {
            tracing::warn!(event_id = stored.id, error = %e, "failed to mark event processed");
        }
        true
    }

    fn emit_receipt(&self, event_type: &str, record: &Value) {
        let payload_keys: Vec<&str> = record
            .get("payload")
            .and_then(Value::as_object)
            .map(|m| m.keys().map(String::as_str).collect())
            .unwrap_or_default();
        self.env.telemetry.emit(
            "activity_log",
            json!({
                "message": format!("Received {event_type}"),
                "level": "info",
                "event_type": event_type,
                "payload_keys": payload_keys,
            }),
        );
    }

    fn fire_due_timers(&mut self) {
        for timer_event in self.timers.fired(Instant::now()) {
            self.process_event(&timer_event);
        }
    }

    fn arm_timers(&mut self) {
        let timed = self.config.timed_transitions_from(&self.current_state);
        self.timers.arm(&timed, Instant::now());
    }

    /// Execute the actions configured for the current state, in order.
    ///
    /// The list is captured at entry: an action that changes state does
    /// not cut the list short, it changes which state's actions run on
    /// the next loop pass. Job context is propagated and due timers fire
    /// between every pair of actions.
    async fn run_state_actions(&mut self) {
        self.context
            .set("current_state", self.current_state.clone());
        let actions: Vec<Value> = self
            .config
            .actions_for(&self.current_state)
            .iter()
            .map(|a| a.as_value().clone())
            .collect();

        for action in actions {
            self.execute_action(&action).await;
            self.propagate_job_context();
            self.fire_due_timers();
            if !self.running.load(Ordering::Relaxed) {
                break;
            }
        }
    }

    /// Interpolate one action config against a context snapshot and run
    /// it: intrinsic `log` and `sleep` inline, everything else through
    /// the registry.
    async fn execute_action(&mut self, raw: &Value) {
        let interpolated = interpolate_config(raw, &self.context);
        let Some(config) = interpolated.as_object() else {
            return;
        };
        let Some(action_type) = config.get("type").and_then(Value::as_str) else {
            tracing::error!(machine = %self.machine_name, "action missing 'type' field");
            return;
        };
        let action_type = action_type.to_string();

        match action_type.as_str() {
            "log" => self.intrinsic_log(config),
            "sleep" => self.intrinsic_sleep(config).await,
            _ => self.execute_pluggable(&action_type, config).await,
        }
    }

    /// Rate-limited structured log; never blocks, never emits an event.
    fn intrinsic_log(&mut self, config: &Map) {
        let message = config
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("No message");
        let level = config.get("level").and_then(Value::as_str).unwrap_or("info");
        if let Some(count) = self.counters.allow(&format!("log:{message}"), 10) {
            let suffix = count_suffix(count);
            match level {
                "error" => tracing::error!(machine = %self.machine_name, "{message}{suffix}"),
                "warning" | "warn" => {
                    tracing::warn!(machine = %self.machine_name, "{message}{suffix}")
                }
                "debug" => tracing::debug!(machine = %self.machine_name, "{message}{suffix}"),
                _ => tracing::info!(machine = %self.machine_name, "{message}{suffix}"),
            }
        }
    }

    /// Suspend for the configured seconds, then dispatch `wake_up`.
    async fn intrinsic_sleep(&mut self, config: &Map) {
        let duration = config
            .get("duration")
            .and_then(Value::as_f64)
            .unwrap_or(1.0);
        self.sleep_count += 1;
        if duration > 10.0 || self.sleep_count == 1 || self.sleep_count % 10 == 0 {
            tracing::info!(
                machine = %self.machine_name,
                duration,
                cycle = self.sleep_count,
                "sleeping"
            );
        }
        tokio::time::sleep(Duration::from_secs_f64(duration.max(0.0))).await;
        self.process_event(event::WAKE_UP);
    }

    async fn execute_pluggable(&mut self, action_type: &str, config: &Map) {
        let action = match self.registry.create(action_type, config) {
            Ok(action) => action,
            Err(RegistryError::Unknown(tag)) => {
                let available = self.registry.available().join(", ");
                self.action_failed(
                    action_type,
                    format!("Could not load action '{tag}' - not registered (available: {available})"),
                );
                return;
            }
            Err(RegistryError::Action(e)) => {
                self.action_failed(
                    action_type,
                    format!("Error loading action {action_type}: {e}"),
                );
                return;
            }
        };

        match action.execute(&self.env, &mut self.context).await {
            Ok(Some(event_name)) => {
                self.process_event(&event_name);
            }
            Ok(None) => {}
            Err(e) => {
                self.action_failed(
                    action_type,
                    format!("Error executing action {action_type}: {e}"),
                );
            }
        }
    }

    /// The single error funnel: record context fields, emit an error
    /// telemetry record, dispatch `error`. The FSM keeps running.
    fn action_failed(&mut self, action_type: &str, message: String) {
        tracing::error!(machine = %self.machine_name, "{message}");
        self.context.set("last_error", message.clone());
        self.context.set("last_error_action", action_type);
        let job_id = self.context.current_job_id();
        self.env.telemetry.emit(
            "error",
            json!({
                "error_message": message,
                "job_id": job_id,
                "timestamp": self.clock.epoch_secs(),
            }),
        );
        self.process_event(event::ERROR);
    }

    fn propagate_job_context(&mut self) {
        if let Some(keys) = self.context.propagate_current_job() {
            if keys.is_empty() {
                return;
            }
            if let Some(count) = self.counters.allow("propagation", 100) {
                if count == 1 {
                    tracing::info!(
                        machine = %self.machine_name,
                        ?keys,
                        "job context propagation started"
                    );
                } else {
                    tracing::warn!(
                        machine = %self.machine_name,
                        count,
                        ?keys,
                        "job context propagated repeatedly"
                    );
                }
            }
        }
    }

    fn update_machine_state(&self) {
        if let Err(e) = self.env.db.machine_states().upsert(
            &self.machine_name,
            &self.current_state,
            Some(std::process::id() as i64),
            None,
        ) {
            tracing::debug!(error = %e, "failed to update machine_state");
        }
    }

    /// Adaptive sleep doubling as the bounded control-socket wait: long
    /// when idle, short when active, clipped to the next timer deadline,
    /// and cut short by a readable datagram.
    async fn idle_wait(&self) {
        let idle = self.last_activity.elapsed() > IDLE_AFTER;
        let mut interval = if idle { IDLE_INTERVAL } else { ACTIVE_INTERVAL };
        if let Some(deadline) = self.timers.next_deadline() {
            interval = interval.min(deadline.saturating_duration_since(Instant::now()));
        }
        if interval.is_zero() {
            return;
        }
        self.control.readable_timeout(interval).await;
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
