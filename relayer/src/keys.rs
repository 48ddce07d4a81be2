//! The relayer's keyring: it persists only its keyring (encrypted on
//! disk). Two key kinds are stored, one per chain a relayer signs on: an
//! XRPL master-seed key (Ed25519/secp256k1 per `ripple-keypairs`) and a
//! Coreum secp256k1 key (`cosmrs`). The OS keyring is tried first; when it's
//! unavailable (headless servers commonly have none), an age/scrypt
//! encrypted file under the data directory is used instead.

use std::fs;
use std::path::PathBuf;

use age::secrecy::Secret;
use cosmrs::crypto::secp256k1::SigningKey as CosmosSigningKey;
use cosmrs::crypto::PublicKey;
use cosmrs::AccountId;
use contract_client::{ContractClientError, CoreumSigner};
use serde::{Deserialize, Serialize};

use crate::error::{RelayerError, Result};

const KEYRING_SERVICE: &str = "coreumbridge-xrpl-relayer";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum KeyKind {
    Xrpl,
    Coreum,
}

/// Raw secret material for one stored key. XRPL keys are stored as their
/// 16-byte master seed (base58, family seed form); Coreum keys as the raw
/// 32-byte secp256k1 scalar, hex-encoded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyMaterial {
    pub kind: KeyKind,
    pub secret: String,
}

/// Where a name's secret actually lives, so `keys list` can report it
/// without touching the secret itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    OsKeyring,
    EncryptedFile,
}

pub struct KeyStore {
    data_dir: PathBuf,
}

impl KeyStore {
    pub fn new() -> Result<Self> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| RelayerError::Keyring("no OS data directory available".into()))?
            .join("coreumbridge-xrpl-relayer")
            .join("keys");
        fs::create_dir_all(&data_dir).map_err(|e| RelayerError::Keyring(format!("creating {}: {e}", data_dir.display())))?;
        Ok(Self { data_dir })
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.data_dir.join(format!("{name}.age"))
    }

    pub fn add(&self, name: &str, material: &KeyMaterial, passphrase: &str) -> Result<Backend> {
        let json = serde_json::to_vec(material).map_err(|e| RelayerError::Keyring(e.to_string()))?;

        let entry = keyring::Entry::new(KEYRING_SERVICE, name).map_err(|e| RelayerError::Keyring(e.to_string()))?;
        if entry.set_password(&base64::Engine::encode(&base64::engine::general_purpose::STANDARD, &json)).is_ok() {
            return Ok(Backend::OsKeyring);
        }

        self.write_encrypted(name, &json, passphrase)?;
        Ok(Backend::EncryptedFile)
    }

    fn write_encrypted(&self, name: &str, plaintext: &[u8], passphrase: &str) -> Result<()> {
        let encryptor = age::Encryptor::with_user_passphrase(Secret::new(passphrase.to_string()));
        let mut encrypted = vec![];
        let mut writer = encryptor
            .wrap_output(&mut encrypted)
            .map_err(|e| RelayerError::Keyring(format!("encrypting key {name}: {e}")))?;
        use std::io::Write;
        writer.write_all(plaintext).map_err(|e| RelayerError::Keyring(e.to_string()))?;
        writer.finish().map_err(|e| RelayerError::Keyring(e.to_string()))?;
        fs::write(self.file_path(name), encrypted).map_err(|e| RelayerError::Keyring(e.to_string()))?;
        Ok(())
    }

    pub fn get(&self, name: &str, passphrase: Option<&str>) -> Result<KeyMaterial> {
        let entry = keyring::Entry::new(KEYRING_SERVICE, name).map_err(|e| RelayerError::Keyring(e.to_string()))?;
        if let Ok(encoded) = entry.get_password() {
            let json = base64::Engine::decode(&base64::engine::general_purpose::STANDARD, encoded)
                .map_err(|e| RelayerError::Keyring(e.to_string()))?;
            return serde_json::from_slice(&json).map_err(|e| RelayerError::Keyring(e.to_string()));
        }

        let passphrase = passphrase.ok_or_else(|| {
            RelayerError::Keyring(format!("key {name} not in OS keyring and no passphrase given to decrypt the file fallback"))
        })?;
        let encrypted = fs::read(self.file_path(name)).map_err(|e| RelayerError::Keyring(format!("reading key {name}: {e}")))?;
        let decryptor = match age::Decryptor::new(&encrypted[..]).map_err(|e| RelayerError::Keyring(e.to_string()))? {
            age::Decryptor::Passphrase(d) => d,
            _ => return Err(RelayerError::Keyring("unexpected age recipient type".into())),
        };
        let mut plaintext = vec![];
        use std::io::Read;
        let mut reader = decryptor
            .decrypt(&Secret::new(passphrase.to_string()), None)
            .map_err(|e| RelayerError::Keyring(format!("decrypting key {name}: {e}")))?;
        reader.read_to_end(&mut plaintext).map_err(|e| RelayerError::Keyring(e.to_string()))?;
        serde_json::from_slice(&plaintext).map_err(|e| RelayerError::Keyring(e.to_string()))
    }

    pub fn list(&self) -> Result<Vec<String>> {
        let mut names = vec![];
        for entry in fs::read_dir(&self.data_dir).map_err(|e| RelayerError::Keyring(e.to_string()))? {
            let entry = entry.map_err(|e| RelayerError::Keyring(e.to_string()))?;
            if let Some(stem) = entry.path().file_stem().and_then(|s| s.to_str()) {
                if entry.path().extension().and_then(|e| e.to_str()) == Some("age") {
                    names.push(stem.to_string());
                }
            }
        }
        Ok(names)
    }

    pub fn delete(&self, name: &str) -> Result<()> {
        let entry = keyring::Entry::new(KEYRING_SERVICE, name).map_err(|e| RelayerError::Keyring(e.to_string()))?;
        let _ = entry.delete_credential();
        let path = self.file_path(name);
        if path.exists() {
            fs::remove_file(&path).map_err(|e| RelayerError::Keyring(e.to_string()))?;
        }
        Ok(())
    }
}

/// Bridges a stored Coreum key to the [`CoreumSigner`] trait `contract-client`
/// expects, so the client never holds the raw key itself.
pub struct CoreumKeyringSigner {
    signing_key: CosmosSigningKey,
    account_id: AccountId,
}

impl CoreumKeyringSigner {
    pub fn from_hex_secret(secret_hex: &str, account_prefix: &str) -> Result<Self> {
        let bytes = hex::decode(secret_hex).map_err(|e| RelayerError::Keyring(format!("invalid coreum key hex: {e}")))?;
        let signing_key = CosmosSigningKey::from_slice(&bytes).map_err(|e| RelayerError::Keyring(e.to_string()))?;
        let account_id = signing_key
            .public_key()
            .account_id(account_prefix)
            .map_err(|e| RelayerError::Keyring(e.to_string()))?;
        Ok(Self { signing_key, account_id })
    }
}

impl CoreumSigner for CoreumKeyringSigner {
    fn account_id(&self) -> AccountId {
        self.account_id.clone()
    }

    fn public_key(&self) -> PublicKey {
        self.signing_key.public_key()
    }

    fn sign(&self, bytes: &[u8]) -> contract_client::Result<Vec<u8>> {
        self.signing_key
            .sign(bytes)
            .map(|sig| sig.to_vec())
            .map_err(|e| ContractClientError::TxBuild(format!("signing tx: {e}")))
    }
}

/// XRPL side of a relayer's identity: signs the multi-signing blobs built by
/// `xrpl_client::binary`. `ripple-keypairs` derives a deterministic keypair
/// from the stored family seed.
pub struct XrplKeyringSigner {
    public_key_hex: String,
    private_key_hex: String,
    pub address: String,
}

impl XrplKeyringSigner {
    pub fn from_family_seed(seed: &str) -> Result<Self> {
        let keypair = ripple_keypairs::derive_keypair(seed, false).map_err(|e| RelayerError::Keyring(e.to_string()))?;
        let address = ripple_keypairs::derive_address(&keypair.public_key).map_err(|e| RelayerError::Keyring(e.to_string()))?;
        Ok(Self { public_key_hex: keypair.public_key, private_key_hex: keypair.private_key, address })
    }

    pub fn public_key_bytes(&self) -> Result<Vec<u8>> {
        hex::decode(&self.public_key_hex).map_err(|e| RelayerError::Keyring(e.to_string()))
    }

    pub fn sign(&self, message: &[u8]) -> Result<Vec<u8>> {
        ripple_keypairs::sign(message, &self.private_key_hex).map_err(|e| RelayerError::Keyring(e.to_string()))
    }
}
