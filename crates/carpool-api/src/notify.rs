//! Notification dispatch.
//!
//! The real delivery channel (email, push, chat) lives outside this
//! repository; [`TracingNotifier`] is the in-process stand-in that logs
//! each event. Handlers treat every notifier as best-effort: a failure is
//! logged and never rolls back a store write.

use std::convert::Infallible;

use carpool_core::event::{Notifier, SchedulingEvent};
use uuid::Uuid;

/// A [`Notifier`] that emits each event as a structured tracing record.
#[derive(Debug, Clone, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
  type Error = Infallible;

  async fn notify(
    &self,
    family_id: Uuid,
    event: SchedulingEvent,
  ) -> Result<(), Infallible> {
    tracing::info!(%family_id, ?event, "notification dispatched");
    Ok(())
  }
}

/// Fire-and-forget dispatch helper used by the handlers.
pub async fn dispatch<N: Notifier>(
  notifier:  &N,
  family_id: Uuid,
  event:     SchedulingEvent,
) {
  if let Err(e) = notifier.notify(family_id, event).await {
    tracing::warn!(%family_id, error = %e, "notification failed; continuing");
  }
}
