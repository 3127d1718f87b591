//! The dispatcher service: message intake, per-action tasks, and the
//! listening endpoint.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use gestureflow_common::config::{AppConfig, DispatcherConfig, DisplayConfig};
use gestureflow_common::error::GestureflowResult;
use gestureflow_platform_core::DisplaySize;
use gestureflow_protocol::message::ActionMessage;
use gestureflow_transport::TransportServer;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::action::map_message;
use crate::backends::{HelperExecutor, NativeExecutor, ScriptExecutor};
use crate::executor::ActionExecutor;
use crate::tiers::TierRoutes;

/// Intake queue depth between the listener and the dispatcher.
const INTAKE_CAPACITY: usize = 256;

#[derive(Debug, Default)]
struct Counters {
    received: AtomicU64,
    ignored: AtomicU64,
    completed: AtomicU64,
    host_conditions: AtomicU64,
    failures: AtomicU64,
}

/// Point-in-time dispatch counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub received: u64,
    /// Messages that map to no action.
    pub ignored: u64,
    /// Executed or forwarded.
    pub completed: u64,
    pub host_conditions: u64,
    pub failures: u64,
}

pub struct Dispatcher {
    routes: Arc<TierRoutes>,
    escalate: bool,
    counters: Arc<Counters>,
}

impl Dispatcher {
    pub fn new(routes: TierRoutes, escalate: bool) -> Self {
        Self {
            routes: Arc::new(routes),
            escalate,
            counters: Arc::new(Counters::default()),
        }
    }

    /// Probe and start every configured tier, then resolve routes.
    pub fn from_config(config: &DispatcherConfig, display: DisplaySize) -> GestureflowResult<Self> {
        let mut executors: Vec<Arc<dyn ActionExecutor>> = Vec::new();

        if config.native_enabled {
            if let Some(native) = NativeExecutor::detect(display) {
                executors.push(Arc::new(native));
            }
        } else {
            tracing::info!("Native tier disabled by configuration");
        }

        if let Some(command) = &config.helper {
            match HelperExecutor::spawn(command) {
                Ok(helper) => executors.push(Arc::new(helper)),
                Err(e) => tracing::warn!(error = %e, "Helper tier unavailable"),
            }
        }

        if let Some(command) = &config.script {
            executors.push(Arc::new(ScriptExecutor::powershell(command.clone())));
        }

        let routes = TierRoutes::resolve(executors)?;
        if config.escalate_on_failure {
            tracing::info!("Per-call escalation to lower tiers enabled");
        }
        Ok(Self::new(routes, config.escalate_on_failure))
    }

    pub fn routes(&self) -> &TierRoutes {
        &self.routes
    }

    pub fn stats(&self) -> DispatchStats {
        let c = &self.counters;
        DispatchStats {
            received: c.received.load(Ordering::Relaxed),
            ignored: c.ignored.load(Ordering::Relaxed),
            completed: c.completed.load(Ordering::Relaxed),
            host_conditions: c.host_conditions.load(Ordering::Relaxed),
            failures: c.failures.load(Ordering::Relaxed),
        }
    }

    /// Map one message and start its action on a separate task. Returns
    /// `None` for messages that map to nothing.
    pub fn handle(&self, message: ActionMessage) -> Option<JoinHandle<()>> {
        self.counters.received.fetch_add(1, Ordering::Relaxed);

        let Some(action) = map_message(&message) else {
            self.counters.ignored.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(?message, "No action mapped");
            return None;
        };

        let routes = self.routes.clone();
        let counters = self.counters.clone();
        let escalate = self.escalate;

        Some(tokio::spawn(async move {
            match routes.execute(&action, escalate).await {
                Ok(outcome) if outcome.is_host_condition() => {
                    counters.host_conditions.fetch_add(1, Ordering::Relaxed);
                    tracing::info!(?action, %outcome, "Presentation host not ready");
                }
                Ok(outcome) => {
                    counters.completed.fetch_add(1, Ordering::Relaxed);
                    tracing::debug!(?action, %outcome, "Action done");
                }
                Err(_) => {
                    counters.failures.fetch_add(1, Ordering::Relaxed);
                }
            }
        }))
    }

    /// Consume messages until every sender is gone. Intake never waits for
    /// an action to finish.
    pub async fn run(&self, mut rx: mpsc::Receiver<ActionMessage>) {
        while let Some(message) = rx.recv().await {
            self.handle(message);
        }
    }

    /// Shut down every executor (closes the helper process).
    pub async fn shutdown(&self) {
        for executor in self.routes.executors() {
            executor.shutdown().await;
        }
    }
}

/// Pixel size used to scale pointer actions: the configured override, else
/// the detected primary monitor, else 1920x1080.
pub fn resolve_display(config: &DisplayConfig) -> DisplaySize {
    if let (Some(width), Some(height)) = (config.width, config.height) {
        return DisplaySize::new(width, height);
    }
    detect_display()
}

#[cfg(target_os = "linux")]
fn detect_display() -> DisplaySize {
    match gestureflow_platform_linux::detect_monitors() {
        Ok(monitors) => gestureflow_platform_core::active_display(&monitors),
        Err(e) => {
            tracing::warn!(error = %e, "Display detection failed, using fallback size");
            DisplaySize::FALLBACK
        }
    }
}

#[cfg(not(target_os = "linux"))]
fn detect_display() -> DisplaySize {
    DisplaySize::FALLBACK
}

/// Bind the endpoint, start the executors, and dispatch until `shutdown`
/// resolves. Bind failure and an unroutable action class are fatal.
pub async fn serve<F>(config: &AppConfig, shutdown: F) -> GestureflowResult<DispatchStats>
where
    F: Future<Output = ()>,
{
    let server = TransportServer::bind(&config.transport.address).await?;
    let display = resolve_display(&config.display);
    let (width, height) = (display.width, display.height);
    tracing::info!(
        width,
        height,
        "Pointer display"
    );

    let dispatcher = Dispatcher::from_config(&config.dispatcher, display)?;
    let (tx, rx) = mpsc::channel(INTAKE_CAPACITY);
    let listener = tokio::spawn(server.serve(tx));

    tokio::select! {
        _ = dispatcher.run(rx) => {}
        _ = shutdown => {
            tracing::info!("Shutdown requested");
        }
    }

    listener.abort();
    dispatcher.shutdown().await;
    let stats = dispatcher.stats();
    tracing::info!(
        received = stats.received,
        completed = stats.completed,
        host_conditions = stats.host_conditions,
        failures = stats.failures,
        "Dispatcher stopped"
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::TargetAction;
    use crate::backends::native::recording::{recording_executor, Injected};
    use crate::backends::ScriptBuilder;
    use gestureflow_common::config::ExternalCommand;
    use gestureflow_protocol::gesture::GestureLabel;

    struct ExitZero;

    impl ScriptBuilder for ExitZero {
        fn build(&self, _action: &TargetAction) -> String {
            "exit 0".to_string()
        }
    }

    /// Recording native tier for pointer/zoom, `sh` script tier for the rest.
    fn dispatcher() -> (Dispatcher, Arc<std::sync::Mutex<Vec<Injected>>>) {
        let (native, log) = recording_executor(DisplaySize::new(1000, 500));
        let script = ScriptExecutor::new(
            ExternalCommand {
                program: "sh".to_string(),
                args: vec!["-c".to_string()],
            },
            Box::new(ExitZero),
        );
        let routes = TierRoutes::resolve(vec![
            Arc::new(native) as Arc<dyn ActionExecutor>,
            Arc::new(script) as Arc<dyn ActionExecutor>,
        ])
        .unwrap();
        (Dispatcher::new(routes, false), log)
    }

    #[tokio::test]
    async fn test_pointer_goes_to_native_tier() {
        let (dispatcher, log) = dispatcher();
        dispatcher
            .handle(ActionMessage::pointer(0.5, 0.5))
            .unwrap()
            .await
            .unwrap();
        assert_eq!(*log.lock().unwrap(), vec![Injected::Move(500, 250)]);
        assert_eq!(dispatcher.stats().completed, 1);
    }

    #[tokio::test]
    async fn test_presentation_goes_to_script_tier() {
        let (dispatcher, log) = dispatcher();
        dispatcher
            .handle(ActionMessage::gesture(GestureLabel::SwipeRight))
            .unwrap()
            .await
            .unwrap();
        assert!(log.lock().unwrap().is_empty());
        assert_eq!(dispatcher.stats().completed, 1);
    }

    #[tokio::test]
    async fn test_none_gesture_is_ignored() {
        let (dispatcher, _log) = dispatcher();
        assert!(dispatcher
            .handle(ActionMessage::gesture(GestureLabel::None))
            .is_none());
        let stats = dispatcher.stats();
        assert_eq!(stats.received, 1);
        assert_eq!(stats.ignored, 1);
    }

    #[test]
    fn test_display_override() {
        let config = DisplayConfig {
            width: Some(2560),
            height: Some(1440),
        };
        assert_eq!(resolve_display(&config), DisplaySize::new(2560, 1440));
    }
}
