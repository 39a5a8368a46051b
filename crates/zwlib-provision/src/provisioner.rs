use std::time::Duration;

use zwlib_codec::DEVICE_ID_LEN;

use crate::credentials::{derive_host_name, Credentials};
use crate::error::{ProvisionError, Result};

/// Yields network credentials captured out of band (e.g. a vendor
/// SmartConfig session). One call covers one bounded listening round.
pub trait CredentialSource {
    /// Wait up to `wait` for a credential pair. `Ok(None)` means the round
    /// timed out without capturing anything.
    fn wait_for_credentials(&mut self, wait: Duration) -> Result<Option<Credentials>>;

    /// Tear down and restart the capture session after a timed-out round.
    fn restart(&mut self) -> Result<()>;
}

/// Durably stores validated credentials keyed by the derived host name.
/// The persisted format is the implementor's concern.
pub trait CredentialStore {
    fn store(&mut self, host_name: &str, credentials: &Credentials) -> Result<()>;
}

/// How long to listen per round and how often to restart after a timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProvisionPolicy {
    /// Bounded wait per capture round.
    pub wait: Duration,
    /// Restarts permitted after a timed-out round.
    pub restarts: u32,
}

impl Default for ProvisionPolicy {
    fn default() -> Self {
        Self {
            wait: Duration::from_secs(60),
            restarts: 1,
        }
    }
}

/// Drives one provisioning run: wait for credentials, validate them, and
/// persist them under the device's derived host name.
///
/// All state is explicit in the arguments; the driver owns nothing between
/// runs and can be called from any ordinary synchronous call site.
#[derive(Debug, Default)]
pub struct Provisioner {
    policy: ProvisionPolicy,
}

impl Provisioner {
    pub fn new(policy: ProvisionPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> ProvisionPolicy {
        self.policy
    }

    pub fn run(
        &self,
        source: &mut dyn CredentialSource,
        store: &mut dyn CredentialStore,
        device_id: &[u8; DEVICE_ID_LEN],
    ) -> Result<Credentials> {
        let attempts = self.policy.restarts + 1;

        for attempt in 1..=attempts {
            tracing::debug!(attempt, wait = ?self.policy.wait, "waiting for credentials");

            match source.wait_for_credentials(self.policy.wait)? {
                Some(credentials) => {
                    credentials.validate()?;
                    let host_name = derive_host_name(device_id);
                    store.store(&host_name, &credentials)?;
                    tracing::info!(ssid = %credentials.ssid, host_name = %host_name, "credentials stored");
                    return Ok(credentials);
                }
                None if attempt < attempts => {
                    tracing::info!(attempt, "capture timed out, restarting");
                    source.restart()?;
                }
                None => {}
            }
        }

        Err(ProvisionError::TimedOut {
            attempts,
            wait: self.policy.wait,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ScriptedSource {
        rounds: Vec<Option<Credentials>>,
        waits: Vec<Duration>,
        restarts: u32,
    }

    impl ScriptedSource {
        fn new(rounds: Vec<Option<Credentials>>) -> Self {
            Self {
                rounds,
                waits: Vec::new(),
                restarts: 0,
            }
        }
    }

    impl CredentialSource for ScriptedSource {
        fn wait_for_credentials(&mut self, wait: Duration) -> Result<Option<Credentials>> {
            self.waits.push(wait);
            Ok(self.rounds.remove(0))
        }

        fn restart(&mut self) -> Result<()> {
            self.restarts += 1;
            Ok(())
        }
    }

    #[derive(Default)]
    struct MemoryStore {
        entries: Vec<(String, Credentials)>,
    }

    impl CredentialStore for MemoryStore {
        fn store(&mut self, host_name: &str, credentials: &Credentials) -> Result<()> {
            self.entries.push((host_name.to_owned(), credentials.clone()));
            Ok(())
        }
    }

    fn policy() -> ProvisionPolicy {
        ProvisionPolicy {
            wait: Duration::from_millis(10),
            restarts: 1,
        }
    }

    #[test]
    fn first_round_success_stores_under_derived_name() {
        let mut source = ScriptedSource::new(vec![Some(Credentials::new("lab-net", "hunter2"))]);
        let mut store = MemoryStore::default();

        let got = Provisioner::new(policy())
            .run(&mut source, &mut store, &[0, 0, 0, 0, 0xAB, 0xCD])
            .unwrap();

        assert_eq!(got.ssid, "lab-net");
        assert_eq!(source.restarts, 0);
        assert_eq!(store.entries.len(), 1);
        assert_eq!(store.entries[0].0, "bitabcd");
        assert_eq!(store.entries[0].1, got);
    }

    #[test]
    fn timeout_restarts_once_then_succeeds() {
        let mut source = ScriptedSource::new(vec![
            None,
            Some(Credentials::new("lab-net", "hunter2")),
        ]);
        let mut store = MemoryStore::default();

        Provisioner::new(policy())
            .run(&mut source, &mut store, &[0; DEVICE_ID_LEN])
            .unwrap();

        assert_eq!(source.restarts, 1);
        assert_eq!(source.waits, vec![Duration::from_millis(10); 2]);
    }

    #[test]
    fn exhausted_restarts_time_out() {
        let mut source = ScriptedSource::new(vec![None, None]);
        let mut store = MemoryStore::default();

        let err = Provisioner::new(policy())
            .run(&mut source, &mut store, &[0; DEVICE_ID_LEN])
            .unwrap_err();

        assert!(matches!(
            err,
            ProvisionError::TimedOut { attempts: 2, .. }
        ));
        // The final timed-out round is terminal; nothing restarts after it.
        assert_eq!(source.restarts, 1);
        assert!(store.entries.is_empty());
    }

    #[test]
    fn invalid_credentials_never_reach_the_store() {
        let mut source = ScriptedSource::new(vec![Some(Credentials::new("", "x"))]);
        let mut store = MemoryStore::default();

        let err = Provisioner::new(policy())
            .run(&mut source, &mut store, &[0; DEVICE_ID_LEN])
            .unwrap_err();

        assert!(matches!(err, ProvisionError::InvalidCredentials { .. }));
        assert!(store.entries.is_empty());
    }

    #[test]
    fn source_failure_propagates() {
        struct FailingSource;

        impl CredentialSource for FailingSource {
            fn wait_for_credentials(&mut self, _wait: Duration) -> Result<Option<Credentials>> {
                Err(ProvisionError::SourceFailed("radio gone".into()))
            }

            fn restart(&mut self) -> Result<()> {
                Ok(())
            }
        }

        let mut store = MemoryStore::default();
        let err = Provisioner::new(policy())
            .run(&mut FailingSource, &mut store, &[0; DEVICE_ID_LEN])
            .unwrap_err();

        assert!(matches!(err, ProvisionError::SourceFailed(_)));
    }

    #[test]
    fn zero_restart_policy_is_single_shot() {
        let mut source = ScriptedSource::new(vec![None]);
        let mut store = MemoryStore::default();
        let single = ProvisionPolicy {
            wait: Duration::from_millis(5),
            restarts: 0,
        };

        let err = Provisioner::new(single)
            .run(&mut source, &mut store, &[0; DEVICE_ID_LEN])
            .unwrap_err();

        assert!(matches!(err, ProvisionError::TimedOut { attempts: 1, .. }));
        assert_eq!(source.restarts, 0);
    }
}
