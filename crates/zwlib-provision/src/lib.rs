//! Credential provisioning interfaces for zwlib devices.
//!
//! The capture protocol (a vendor SmartConfig session or similar) and the
//! persisted credential format live outside this crate; what lives here is
//! the seam between them: a [`CredentialSource`] that yields a network
//! credential pair within a bounded wait, a [`CredentialStore`] that
//! persists validated credentials under the device's derived host name, and
//! a [`Provisioner`] that drives one run under an explicit
//! [`ProvisionPolicy`] — no process-wide state, and the timeout and the
//! single restart-on-timeout retry are plain data a test can pin down.

pub mod credentials;
pub mod error;
pub mod provisioner;

pub use credentials::{derive_host_name, Credentials};
pub use error::{ProvisionError, Result};
pub use provisioner::{CredentialSource, CredentialStore, ProvisionPolicy, Provisioner};
