use tracing::{debug, info};

use crate::bridge::DeviceBridge;
use crate::cancel::CancelToken;
use crate::devices::list_devices;
use crate::error::TargetError;
use crate::resolve::ResolutionResult;
use crate::retry::{poll_until, Clock, PollOutcome, PollPolicy};

/// Polls the bridge until an emulator called `name` is listed as `device`.
///
/// Bridge errors during a check are treated like "not yet"; only running out of
/// attempts is fatal.
pub async fn wait_ready<B, C>(
    bridge: &B,
    clock: &C,
    name: &str,
    policy: PollPolicy,
    cancel: &CancelToken,
) -> Result<PollOutcome<ResolutionResult>, TargetError>
where
    B: DeviceBridge,
    C: Clock,
{
    info!("wait-ready:{name} - starting");
    let outcome = poll_until(clock, policy, cancel, move |state| {
        info!(
            "checking if {name} has booted up: attempt {}/{}",
            state.attempts, state.max_attempts
        );
        async move {
            let devices = list_devices(bridge).await?;
            Ok::<_, TargetError>(
                devices
                    .iter()
                    .find(|device| device.is_ready() && (device.id == name || device.name == name))
                    .map(ResolutionResult::from_device),
            )
        }
    })
    .await
    .map_err(|exhausted| TargetError::Timeout {
        name: name.to_string(),
        attempts: exhausted.attempts,
    })?;

    match &outcome {
        PollOutcome::Ready(result) => debug!("{name} is ready as {}", result.device_id()),
        PollOutcome::Cancelled => info!("waiting for {name} cancelled"),
    }
    Ok(outcome)
}
