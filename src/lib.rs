//! Workspace placeholder crate.
//!
//! Exposes feature flags that map onto `core-service` so a host application
//! can depend on `filtercam-workspace` alone. `desktop-shims` pulls in the
//! reqwest HTTP client and the CPU filter backend; `headless` wires only the
//! core and expects the host to inject every bridge.

#[cfg(any(feature = "desktop-shims", feature = "headless"))]
pub use core_service::{CoreError, CoreService};
