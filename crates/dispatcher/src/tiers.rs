//! Startup-time tier resolution.
//!
//! Executors are offered in priority order. Each action class gets the
//! ordered list of executors that support it; the first entry is the
//! class's fixed backend for the life of the process.

use std::sync::Arc;

use gestureflow_common::error::{GestureflowError, GestureflowResult};

use crate::action::{ActionClass, TargetAction};
use crate::executor::{ActionExecutor, ActionOutcome};

pub struct TierRoutes {
    routes: [Vec<Arc<dyn ActionExecutor>>; 3],
}

impl TierRoutes {
    /// Resolve routes from available executors, highest priority first.
    /// Fails when any action class is left without a backend.
    pub fn resolve(executors: Vec<Arc<dyn ActionExecutor>>) -> GestureflowResult<Self> {
        let mut executors = executors;
        executors.sort_by_key(|e| e.tier());

        let routes = ActionClass::ALL.map(|class| {
            executors
                .iter()
                .filter(|e| e.supports(class))
                .cloned()
                .collect::<Vec<_>>()
        });

        for class in ActionClass::ALL {
            let chain = &routes[class.index()];
            match chain.first() {
                Some(primary) => {
                    tracing::info!(
                        class = %class,
                        backend = %primary.name(),
                        fallbacks = chain.len() - 1,
                        "Resolved executor"
                    );
                }
                None => {
                    return Err(GestureflowError::backend_unavailable(format!(
                        "no execution backend available for {class} actions"
                    )));
                }
            }
        }

        Ok(Self { routes })
    }

    /// Executors for `class`, primary first. Never empty.
    pub fn chain(&self, class: ActionClass) -> &[Arc<dyn ActionExecutor>] {
        &self.routes[class.index()]
    }

    pub fn primary(&self, class: ActionClass) -> &Arc<dyn ActionExecutor> {
        &self.routes[class.index()][0]
    }

    /// Backend names per class, for reporting.
    pub fn describe(&self) -> Vec<(ActionClass, Vec<String>)> {
        ActionClass::ALL
            .iter()
            .map(|class| {
                let names = self
                    .chain(*class)
                    .iter()
                    .map(|e| e.name().to_string())
                    .collect();
                (*class, names)
            })
            .collect()
    }

    /// Every distinct executor, in priority order.
    pub fn executors(&self) -> Vec<Arc<dyn ActionExecutor>> {
        let mut all: Vec<Arc<dyn ActionExecutor>> = Vec::new();
        for chain in &self.routes {
            for executor in chain {
                if !all.iter().any(|e| Arc::ptr_eq(e, executor)) {
                    all.push(executor.clone());
                }
            }
        }
        all.sort_by_key(|e| e.tier());
        all
    }

    /// Run `action` on its class's primary backend. With `escalate`, a
    /// failed call is retried on each lower-priority backend in turn; the
    /// last error is returned when all fail.
    pub async fn execute(
        &self,
        action: &TargetAction,
        escalate: bool,
    ) -> GestureflowResult<ActionOutcome> {
        let chain = self.chain(action.class());
        let attempts = if escalate { chain.len() } else { 1 };

        let mut last_err = None;
        for executor in chain.iter().take(attempts) {
            match executor.execute(action).await {
                Ok(outcome) => return Ok(outcome),
                Err(e) => {
                    tracing::warn!(
                        tier = %executor.tier(),
                        backend = %executor.name(),
                        ?action,
                        error = %e,
                        "Action failed"
                    );
                    last_err = Some(e);
                }
            }
        }
        Err(last_err.unwrap_or_else(|| {
            GestureflowError::backend_unavailable(format!(
                "no backend for {} actions",
                action.class()
            ))
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::Tier;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU64, Ordering};

    struct Scripted {
        name: &'static str,
        tier: Tier,
        classes: Vec<ActionClass>,
        fail: bool,
        calls: AtomicU64,
    }

    impl Scripted {
        fn new(name: &'static str, tier: Tier, classes: &[ActionClass], fail: bool) -> Arc<Self> {
            Arc::new(Self {
                name,
                tier,
                classes: classes.to_vec(),
                fail,
                calls: AtomicU64::new(0),
            })
        }

        fn calls(&self) -> u64 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ActionExecutor for Scripted {
        fn name(&self) -> &str {
            self.name
        }

        fn tier(&self) -> Tier {
            self.tier
        }

        fn supports(&self, class: ActionClass) -> bool {
            self.classes.contains(&class)
        }

        async fn execute(&self, _action: &TargetAction) -> GestureflowResult<ActionOutcome> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(GestureflowError::execution(format!("{} failed", self.name)))
            } else {
                Ok(ActionOutcome::Executed)
            }
        }
    }

    const ALL: &[ActionClass] = &ActionClass::ALL;

    fn resolve(executors: &[&Arc<Scripted>]) -> GestureflowResult<TierRoutes> {
        TierRoutes::resolve(
            executors
                .iter()
                .map(|e| Arc::clone(*e) as Arc<dyn ActionExecutor>)
                .collect(),
        )
    }

    #[test]
    fn test_priority_order_wins_regardless_of_input_order() {
        let native = Scripted::new(
            "native",
            Tier::Native,
            &[ActionClass::Pointer, ActionClass::Zoom],
            false,
        );
        let helper = Scripted::new("helper", Tier::Helper, ALL, false);
        let routes = resolve(&[&helper, &native]).unwrap();

        assert_eq!(routes.primary(ActionClass::Pointer).name(), "native");
        assert_eq!(routes.primary(ActionClass::Zoom).name(), "native");
        assert_eq!(routes.primary(ActionClass::Presentation).name(), "helper");
        assert_eq!(routes.chain(ActionClass::Pointer).len(), 2);
        assert_eq!(routes.executors().len(), 2);
    }

    #[test]
    fn test_class_without_backend_is_fatal() {
        let native = Scripted::new(
            "native",
            Tier::Native,
            &[ActionClass::Pointer, ActionClass::Zoom],
            false,
        );
        let err = resolve(&[&native]).err().unwrap();
        assert!(matches!(err, GestureflowError::BackendUnavailable { .. }));
        assert!(err.to_string().contains("presentation"));
    }

    #[tokio::test]
    async fn test_failure_stays_on_fixed_backend_by_default() {
        let helper = Scripted::new("helper", Tier::Helper, ALL, true);
        let script = Scripted::new("script", Tier::Script, ALL, false);
        let routes = resolve(&[&helper, &script]).unwrap();

        assert!(routes.execute(&TargetAction::Next, false).await.is_err());
        assert_eq!(helper.calls(), 1);
        assert_eq!(script.calls(), 0);
    }

    #[tokio::test]
    async fn test_escalation_tries_next_tier() {
        let helper = Scripted::new("helper", Tier::Helper, ALL, true);
        let script = Scripted::new("script", Tier::Script, ALL, false);
        let routes = resolve(&[&helper, &script]).unwrap();

        let outcome = routes.execute(&TargetAction::Next, true).await.unwrap();
        assert_eq!(outcome, ActionOutcome::Executed);
        assert_eq!(helper.calls(), 1);
        assert_eq!(script.calls(), 1);
    }
}
