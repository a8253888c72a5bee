pub mod append;
pub mod attest;
pub mod audit;
pub mod challenge;
pub mod create;
pub mod did;
pub mod init;
pub mod integrity;
pub mod keygen;
pub mod ledger;
pub mod prove;
pub mod register;
pub mod revoke;
pub mod sign;
pub mod verify;

use std::path::Path;

use sigil_core::Did;

/// Key material given either inline or as a path to a file holding it.
pub(crate) fn read_key_arg(value: &str) -> anyhow::Result<String> {
    let path = Path::new(value);
    if path.is_file() {
        Ok(std::fs::read_to_string(path)?)
    } else {
        Ok(value.to_string())
    }
}

pub(crate) fn parse_did(value: &str) -> anyhow::Result<Did> {
    Ok(Did::new(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_key_arg_inline_and_file() {
        assert_eq!(read_key_arg("abc").unwrap(), "abc");

        let path = std::env::temp_dir().join(format!("sigil-key-test-{}", rand::random::<u64>()));
        std::fs::write(&path, "-----BEGIN PUBLIC KEY-----\n").unwrap();
        let text = read_key_arg(path.to_str().unwrap()).unwrap();
        assert!(text.starts_with("-----BEGIN PUBLIC KEY-----"));
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_parse_did() {
        assert!(parse_did("did:sigil:abc_-").is_ok());
        assert!(parse_did("did:web:example.com").is_err());
    }
}
