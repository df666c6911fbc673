//! Per-phase duration measurement.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::core::execution::{Context, ExecutionResult, SubscriptionResult};
use crate::plugin_system::{
    AfterHook, ContextHook, ContextHookContext, ExecuteHook, ExecuteHookContext, HookOutcome,
    ParseHook, ParseHookContext, ParseOutcome, Phase, Plugin, PluginContext, PluginError,
    PluginMetadata, SubscribeHook, SubscribeHookContext, ValidateHook, ValidateHookContext,
    ValidationOutcome,
};

/// Receives the operation id, the measured phase and its duration.
pub type TimingCallback = Arc<dyn Fn(&str, Phase, Duration) + Send + Sync>;

/// Measures how long parse, validate, context building, execute and
/// subscribe take. The measured span covers the underlying operation plus
/// the after-hooks of plugins registered later.
pub struct TimingPlugin {
    metadata: PluginMetadata,
    hooks: Arc<TimingHooks>,
}

struct TimingHooks {
    callback: Option<TimingCallback>,
}

impl TimingPlugin {
    /// Report through `tracing::debug!`.
    pub fn new() -> Self {
        Self::build(None)
    }

    pub fn with_callback(callback: TimingCallback) -> Self {
        Self::build(Some(callback))
    }

    fn build(callback: Option<TimingCallback>) -> Self {
        Self {
            metadata: PluginMetadata::new("timing", "Timing"),
            hooks: Arc::new(TimingHooks { callback }),
        }
    }
}

impl Default for TimingPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for TimingPlugin {
    fn metadata(&self) -> &PluginMetadata {
        &self.metadata
    }

    fn register(&self, context: &mut PluginContext<'_>) -> Result<(), PluginError> {
        context.on_parse(self.hooks.clone())?;
        context.on_validate(self.hooks.clone())?;
        context.on_context_building(self.hooks.clone())?;
        context.on_execute(self.hooks.clone())?;
        context.on_subscribe(self.hooks.clone())?;
        Ok(())
    }
}

impl TimingHooks {
    fn measure<T: Send + 'static>(&self, operation_id: &str, phase: Phase) -> AfterHook<T> {
        let started = Instant::now();
        let callback = self.callback.clone();
        let operation_id = operation_id.to_string();
        AfterHook::observe(move |_output: &mut T| {
            let elapsed = started.elapsed();
            match callback {
                Some(report) => report(&operation_id, phase, elapsed),
                None => tracing::debug!(
                    operation_id = %operation_id,
                    phase = %phase,
                    elapsed_ms = elapsed.as_secs_f64() * 1000.0,
                    "phase timing"
                ),
            }
        })
    }
}

#[async_trait]
impl ParseHook for TimingHooks {
    async fn on_parse(&self, ctx: &mut ParseHookContext<'_>) -> HookOutcome<ParseOutcome> {
        Ok(Some(self.measure(ctx.operation_id(), Phase::Parse)))
    }
}

#[async_trait]
impl ValidateHook for TimingHooks {
    async fn on_validate(
        &self,
        ctx: &mut ValidateHookContext<'_>,
    ) -> HookOutcome<ValidationOutcome> {
        Ok(Some(self.measure(ctx.operation_id(), Phase::Validate)))
    }
}

#[async_trait]
impl ContextHook for TimingHooks {
    async fn on_context_building(&self, ctx: &mut ContextHookContext<'_>) -> HookOutcome<Context> {
        Ok(Some(self.measure(ctx.operation_id(), Phase::ContextBuilding)))
    }
}

#[async_trait]
impl ExecuteHook for TimingHooks {
    async fn on_execute(&self, ctx: &mut ExecuteHookContext<'_>) -> HookOutcome<ExecutionResult> {
        Ok(Some(self.measure(ctx.operation_id(), Phase::Execute)))
    }
}

#[async_trait]
impl SubscribeHook for TimingHooks {
    async fn on_subscribe(
        &self,
        ctx: &mut SubscribeHookContext<'_>,
    ) -> HookOutcome<SubscriptionResult> {
        Ok(Some(self.measure(ctx.operation_id(), Phase::Subscribe)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[tokio::test]
    async fn test_reports_phase_duration() {
        let reports = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&reports);
        let plugin = TimingPlugin::with_callback(Arc::new(move |id: &str, phase: Phase, elapsed: Duration| {
            sink.lock().push((id.to_string(), phase, elapsed));
        }));

        let mut ctx = ContextHookContext::new("op-3", Context::new());
        let after = plugin
            .hooks
            .on_context_building(&mut ctx)
            .await
            .unwrap()
            .unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
        after.call(Context::new()).await.unwrap();

        let reports = reports.lock();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].0, "op-3");
        assert_eq!(reports[0].1, Phase::ContextBuilding);
        assert!(reports[0].2 >= Duration::from_millis(5));
    }
}
