//! `SecretsBroker` adapter (C11): `secret_parcels`, encrypted at rest with
//! AES-256-GCM. The broker holds the data key directly; key management
//! (rotation, KMS-backed unwrap) is out of scope for this layer.

use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rag_domain::error::{Error, Result};
use rag_domain::ports::secrets::SecretsBroker;
use rand::RngCore;
use sea_orm::{ConnectionTrait, DbBackend, Statement};
use serde_json::Value as Json;

use super::Db;

fn db_err(e: sea_orm::DbErr) -> Error {
    Error::database_with_source("postgres", e)
}

/// Postgres-backed secrets broker. Wraps [`Db`] with the AES-256-GCM
/// data key used to seal/open each parcel.
pub struct SecretsStore {
    db: Db,
    cipher: Aes256Gcm,
    stage: String,
}

/// `/`, `@`, `.` are the only characters the original naming scheme
/// re-encodes; everything else passes through.
fn safe_key(raw: &str) -> String {
    raw.replace('/', "_").replace('@', "_at_").replace('.', "_")
}

impl SecretsStore {
    /// `key` must be exactly 32 bytes (the raw AES-256 data key). `stage`
    /// is the deployment stage folded into each parcel's name
    /// (`rag-ds/{stage}/{safe_key}`), matching the original scheme.
    pub fn new(db: Db, key: &[u8], stage: impl Into<String>) -> Result<Self> {
        if key.len() != 32 {
            return Err(Error::internal("secrets data key must be 32 bytes"));
        }
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
        Ok(Self {
            db,
            cipher,
            stage: stage.into(),
        })
    }

    /// `rag-ds/{stage}/{safe_key}` — the on-disk parcel name, preserved
    /// from the original so operators can correlate parcels across a
    /// reimplementation and the original.
    fn parcel_name(&self, document_key: &str) -> String {
        format!("rag-ds/{}/{}", self.stage, safe_key(document_key))
    }
}

#[async_trait]
impl SecretsBroker for SecretsStore {
    async fn put(&self, document_key: &str, parcel: &Json) -> Result<()> {
        let plaintext = serde_json::to_vec(parcel)?;

        let mut nonce_bytes = [0u8; 12];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(nonce, plaintext.as_ref())
            .map_err(|e| Error::internal(format!("secret encryption failed: {e}")))?;

        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "INSERT INTO secret_parcels (document_key, ciphertext, nonce, created_at)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (document_key) DO UPDATE SET
                ciphertext = EXCLUDED.ciphertext,
                nonce = EXCLUDED.nonce,
                created_at = EXCLUDED.created_at",
            [
                self.parcel_name(document_key).into(),
                base64_encode(&ciphertext).into(),
                base64_encode(&nonce_bytes).into(),
                Utc::now().into(),
            ],
        );
        self.db.conn.execute(stmt).await.map_err(db_err)?;
        Ok(())
    }

    async fn get(&self, document_key: &str) -> Result<Json> {
        let name = self.parcel_name(document_key);
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "SELECT ciphertext, nonce FROM secret_parcels WHERE document_key = $1",
            [name.clone().into()],
        );
        let row = self
            .db
            .conn
            .query_one(stmt)
            .await
            .map_err(db_err)?
            .ok_or_else(|| Error::not_found(format!("secret parcel for {name}")))?;

        let ciphertext_b64: String = row.try_get("", "ciphertext").map_err(db_err)?;
        let nonce_b64: String = row.try_get("", "nonce").map_err(db_err)?;
        let ciphertext = base64_decode(&ciphertext_b64)?;
        let nonce_bytes = base64_decode(&nonce_b64)?;
        let nonce = Nonce::from_slice(&nonce_bytes);

        let plaintext = self
            .cipher
            .decrypt(nonce, ciphertext.as_ref())
            .map_err(|e| Error::corruption(format!("secret decryption failed: {e}")))?;
        Ok(serde_json::from_slice(&plaintext)?)
    }

    async fn delete(&self, document_key: &str) -> Result<()> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "DELETE FROM secret_parcels WHERE document_key = $1",
            [self.parcel_name(document_key).into()],
        );
        self.db.conn.execute(stmt).await.map_err(db_err)?;
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<(String, DateTime<Utc>)>> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "SELECT document_key, created_at FROM secret_parcels",
            [],
        );
        let rows = self.db.conn.query_all(stmt).await.map_err(db_err)?;
        rows.into_iter()
            .map(|row| {
                Ok((
                    row.try_get("", "document_key").map_err(db_err)?,
                    row.try_get("", "created_at").map_err(db_err)?,
                ))
            })
            .collect()
    }
}

fn base64_encode(bytes: &[u8]) -> String {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

fn base64_decode(s: &str) -> Result<Vec<u8>> {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD
        .decode(s)
        .map_err(|e| Error::corruption(format!("invalid base64 in secret parcel: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_store() -> SecretsStore {
        // `Db` is never touched by this round-trip test; only the cipher matters.
        SecretsStore {
            db: Db {
                conn: sea_orm::DatabaseConnection::Disconnected,
            },
            cipher: Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&[7u8; 32])),
            stage: "test".to_owned(),
        }
    }

    #[test]
    fn parcel_name_reencodes_unsafe_characters() {
        let store = test_store();
        assert_eq!(
            store.parcel_name("bucket/user@example.com/doc.pdf"),
            "rag-ds/test/bucket_user_at_example_com_doc_pdf"
        );
    }

    #[test]
    fn encrypt_then_decrypt_round_trips() {
        let store = test_store();
        let parcel = json!({"api_key": "s3cr3t"});
        let plaintext = serde_json::to_vec(&parcel).unwrap();

        let mut nonce_bytes = [0u8; 12];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);
        let ciphertext = store.cipher.encrypt(nonce, plaintext.as_ref()).unwrap();

        let decrypted = store.cipher.decrypt(nonce, ciphertext.as_ref()).unwrap();
        let round_tripped: Json = serde_json::from_slice(&decrypted).unwrap();
        assert_eq!(round_tripped, parcel);
    }
}
