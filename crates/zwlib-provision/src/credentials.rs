use zwlib_codec::DEVICE_ID_LEN;

use crate::error::{ProvisionError, Result};

/// A captured network credential pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub ssid: String,
    pub password: String,
}

impl Credentials {
    pub fn new(ssid: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            ssid: ssid.into(),
            password: password.into(),
        }
    }

    /// A credential pair is usable when it names a network. An open network
    /// may legitimately have an empty password.
    pub fn validate(&self) -> Result<()> {
        if self.ssid.is_empty() {
            return Err(ProvisionError::InvalidCredentials {
                reason: "empty ssid",
            });
        }
        Ok(())
    }
}

/// Derive the stable host name credentials are stored under: `bit` followed
/// by the last two device-id bytes as four hex digits.
pub fn derive_host_name(device_id: &[u8; DEVICE_ID_LEN]) -> String {
    let tail = u16::from(device_id[DEVICE_ID_LEN - 2]) << 8 | u16::from(device_id[DEVICE_ID_LEN - 1]);
    format!("bit{tail:04x}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_name_uses_device_id_tail() {
        assert_eq!(derive_host_name(&[0, 0, 0, 0, 0xAB, 0xCD]), "bitabcd");
        assert_eq!(derive_host_name(&[0xFF; DEVICE_ID_LEN]), "bitffff");
        assert_eq!(derive_host_name(&[0; DEVICE_ID_LEN]), "bit0000");
    }

    #[test]
    fn empty_ssid_is_invalid() {
        let err = Credentials::new("", "secret").validate().unwrap_err();
        assert!(matches!(err, ProvisionError::InvalidCredentials { .. }));
    }

    #[test]
    fn open_network_password_is_valid() {
        assert!(Credentials::new("lab-net", "").validate().is_ok());
    }
}
