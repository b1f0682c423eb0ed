//! Device targeting for Tizen deployments.
//!
//! Enumerates devices through the `sdb` bridge, resolves a user supplied target
//! to a concrete device, launches (and if needed creates) emulators and waits for
//! them to come up.

pub mod bridge;
pub mod cancel;
pub mod devices;
pub mod emulator;
pub mod error;
pub mod readiness;
pub mod resolve;
pub mod retry;
pub mod target;

pub use bridge::{connect_target, DeviceBridge, Sdb};
pub use cancel::{cancel_pair, CancelHandle, CancelToken};
pub use devices::{list_devices, parse_devices, Device};
pub use emulator::{
    launch_emulator, launch_or_create, EmCli, EmulatorControl, DEFAULT_EMULATOR_PROFILE,
};
pub use error::TargetError;
pub use readiness::wait_ready;
pub use resolve::{find_connected, match_device, resolve, Resolution, ResolutionResult};
pub use retry::{poll_until, recover_once, Clock, PollOutcome, PollPolicy, PollState, TokioClock};
pub use target::TargetSpec;
