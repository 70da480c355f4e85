//! Waiting for invocations to leave the `new`/`running` states

use std::time::Duration;

use gx_client_api::GalaxyApi;
use gx_rest_api_contract::Invocation;
use tracing::{debug, info};

use crate::error::{HarnessError, HarnessResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            max_attempts: 300,
        }
    }
}

impl PollConfig {
    pub fn fast() -> Self {
        Self {
            interval: Duration::from_millis(1),
            max_attempts: 50,
        }
    }
}

/// Re-fetch `invocation` until its state is terminal.
///
/// The invocation passed in is returned unchanged if it is already terminal.
pub async fn wait_for_invocation(
    api: &dyn GalaxyApi,
    workflow_id: &str,
    mut invocation: Invocation,
    config: PollConfig,
) -> HarnessResult<Invocation> {
    let mut attempts = 0;
    while invocation.state.is_in_progress() {
        if attempts >= config.max_attempts {
            return Err(HarnessError::Timeout {
                invocation_id: invocation.id,
                attempts,
            });
        }
        tokio::time::sleep(config.interval).await;
        invocation = api.show_invocation(workflow_id, &invocation.id).await?;
        attempts += 1;
        debug!(invocation_id = %invocation.id, state = ?invocation.state, attempts, "polled invocation");
    }

    info!(
        invocation_id = %invocation.id,
        state = ?invocation.state,
        attempts,
        "invocation finished scheduling"
    );
    Ok(invocation)
}
