//! mDNS presence announcement for the pairing flow.
//!
//! The host advertises itself as `_iw._tcp` so the mobile client can find it
//! without manual addressing. The announcement is refreshed on an interval so
//! a DHCP address change never leaves a stale record behind.

mod advertiser;
mod cycle;
mod host;

pub use advertiser::{AdvertiseError, Advertiser};
pub use cycle::start_refresh_cycle;
pub use host::HostIdentity;
