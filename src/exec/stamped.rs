// src/exec/stamped.rs

use std::sync::Arc;

use crate::engine::TaskOutcome;
use crate::exec::check::{Check, CheckContext};
use crate::stamp::StampCache;

/// Runs the wrapped check at most once per stamp window.
///
/// A fresh stamp makes the check pass without running. After the inner
/// check passes the stamp is renewed; a failed run leaves the stamp alone so
/// the next invocation retries. A stamp that cannot be written is a
/// [`TaskOutcome::Fault`].
pub struct StampedCheck {
    id: String,
    stamps: StampCache,
    inner: Arc<dyn Check>,
}

impl StampedCheck {
    pub fn new(id: impl Into<String>, stamps: StampCache, inner: Arc<dyn Check>) -> Self {
        Self {
            id: id.into(),
            stamps,
            inner,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl Check for StampedCheck {
    fn execute(&self, ctx: &CheckContext<'_>) -> TaskOutcome {
        let ran = self.stamps.ensure_fresh(&self.id, || match self.inner.execute(ctx) {
            TaskOutcome::Success => Ok(()),
            failed => Err(failed),
        });

        match ran {
            Ok(Ok(true)) => TaskOutcome::Success,
            Ok(Ok(false)) => {
                ctx.logger.log(format!(
                    "Skipping {}--ran recently. (Delete {} to force a re-run.)",
                    ctx.task,
                    self.stamps.stamp_path(&self.id).display()
                ));
                TaskOutcome::Success
            }
            Ok(Err(inner)) => inner,
            Err(e) => TaskOutcome::fault(format!("recording stamp `{}`: {e:#}", self.id)),
        }
    }

    fn describe(&self) -> String {
        format!("{} (stamped as `{}`)", self.inner.describe(), self.id)
    }
}
