use anyhow::{Context, Result};
use log::debug;
use native_tls::Identity;
use std::path::Path;
use tokio_native_tls::TlsAcceptor;

/// Build a server-side TLS acceptor from a PEM certificate chain and a PKCS#8 PEM private key.
pub async fn load_acceptor(cert_path: impl AsRef<Path>, key_path: impl AsRef<Path>) -> Result<TlsAcceptor> {
    let (cert_path, key_path) = (cert_path.as_ref(), key_path.as_ref());
    debug!("Loading TLS certificate {} and key {}", cert_path.display(), key_path.display());
    let cert = tokio::fs::read(cert_path).await.with_context(|| format!("Failed to read certificate {}", cert_path.display()))?;
    let key = tokio::fs::read(key_path).await.with_context(|| format!("Failed to read private key {}", key_path.display()))?;
    let identity = Identity::from_pkcs8(&cert, &key).context("Certificate and key do not form a usable identity")?;
    let acceptor = native_tls::TlsAcceptor::new(identity)?;
    Ok(TlsAcceptor::from(acceptor))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_certificate_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_acceptor(dir.path().join("cert.pem"), dir.path().join("key.pem")).await.unwrap_err();
        assert!(err.to_string().contains("Failed to read certificate"));
    }

    #[tokio::test]
    async fn test_garbage_pem_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let cert = dir.path().join("cert.pem");
        let key = dir.path().join("key.pem");
        tokio::fs::write(&cert, "not a certificate").await.unwrap();
        tokio::fs::write(&key, "not a key").await.unwrap();
        assert!(load_acceptor(&cert, &key).await.is_err());
    }
}
