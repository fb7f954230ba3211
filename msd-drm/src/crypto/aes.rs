use crate::{DrmError, Result};
use aes::cipher::{BlockDecryptMut, KeyInit, KeyIvInit, block_padding::Pkcs7};

type Aes128EcbDec = ecb::Decryptor<aes::Aes128>;
type Aes192CbcDec = cbc::Decryptor<aes::Aes192>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// AES-128-ECB decryption with PKCS#7 padding, for NetEase key and metadata
/// chunks.
pub(crate) fn decrypt_ecb_128(key: &[u8; 16], data: &[u8]) -> Result<Vec<u8>> {
    Aes128EcbDec::new(key.into())
        .decrypt_padded_vec_mut::<Pkcs7>(data)
        .map_err(|_| DrmError::KeyValidation("aes-ecb padding".to_owned()))
}

/// AES-192-CBC decryption with PKCS#7 padding, for the second Ximalaya desktop
/// stage.
pub(crate) fn decrypt_cbc_192(key: &[u8; 24], iv: &[u8; 16], data: &[u8]) -> Result<Vec<u8>> {
    Aes192CbcDec::new(key.into(), iv.into())
        .decrypt_padded_vec_mut::<Pkcs7>(data)
        .map_err(|_| DrmError::KeyValidation("aes-cbc padding".to_owned()))
}

/// AES-256-CBC decryption with PKCS#7 padding, for the first Ximalaya desktop
/// stage.
pub(crate) fn decrypt_cbc_256(key: &[u8; 32], iv: &[u8; 16], data: &[u8]) -> Result<Vec<u8>> {
    Aes256CbcDec::new(key.into(), iv.into())
        .decrypt_padded_vec_mut::<Pkcs7>(data)
        .map_err(|_| DrmError::KeyValidation("aes-cbc padding".to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use aes::cipher::BlockEncryptMut;

    #[test]
    fn ecb_round_trip() {
        let key = b"hzHRAmso5kInbaxW";
        let plain = b"neteasecloudmusic";

        let encrypted = ecb::Encryptor::<aes::Aes128>::new(key.into())
            .encrypt_padded_vec_mut::<Pkcs7>(plain);
        assert_eq!(decrypt_ecb_128(key, &encrypted).unwrap(), plain);
    }

    #[test]
    fn cbc_round_trip() {
        let key = b"ximalayaximalayaximalayaximalaya";
        let iv = b"0123456789abcdef";
        let plain = b"two stage pipeline";

        let encrypted = cbc::Encryptor::<aes::Aes256>::new(key.into(), iv.into())
            .encrypt_padded_vec_mut::<Pkcs7>(plain);
        assert_eq!(decrypt_cbc_256(key, iv, &encrypted).unwrap(), plain);
    }

    #[test]
    fn ragged_ciphertext_is_a_key_error() {
        let key = b"hzHRAmso5kInbaxW";
        assert!(matches!(
            decrypt_ecb_128(key, &[0u8; 15]),
            Err(DrmError::KeyValidation(_))
        ));
    }
}
