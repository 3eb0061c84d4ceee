//! Bit decomposition of the authenticator data flags byte (WebAuthn §6.1).

use modular_bitfield::prelude::*;

#[bitfield]
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatorDataFlags {
    pub user_present: bool,
    rfu_1: bool,
    pub user_verified: bool,
    rfu_2: B3,
    pub attested_credential_data: bool,
    pub extension_data: bool,
}

impl AuthenticatorDataFlags {
    pub fn from_byte(byte: u8) -> Self {
        Self::from_bytes([byte])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_individual_bits() {
        let flags = AuthenticatorDataFlags::from_byte(0b1100_0001);
        assert!(flags.user_present());
        assert!(!flags.user_verified());
        assert!(flags.attested_credential_data());
        assert!(flags.extension_data());
    }

    #[test]
    fn user_verified_bit_is_bit_two() {
        let flags = AuthenticatorDataFlags::from_byte(0b0000_0100);
        assert!(!flags.user_present());
        assert!(flags.user_verified());
        assert!(!flags.attested_credential_data());
        assert!(!flags.extension_data());
    }
}
