//! TLS certificate presence as evidence for registration.
//!
//! The probe only cares whether something on port 443 presents a
//! certificate, so trust validation is switched off entirely.

use crate::error::DomainScanError;
use crate::types::Signature;
use async_trait::async_trait;
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{ClientConfig, DigitallySignedStruct, SignatureScheme};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;
use tracing::debug;

/// Something that can count the certificates a host presents on 443.
#[async_trait]
pub trait TlsSource: Send + Sync {
    async fn peer_certificate_count(&self, domain: &str) -> Result<usize, DomainScanError>;
}

/// Accepts every certificate chain.
#[derive(Debug)]
struct AcceptAnyCertificate;

impl ServerCertVerifier for AcceptAnyCertificate {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        vec![
            SignatureScheme::ECDSA_NISTP256_SHA256,
            SignatureScheme::ECDSA_NISTP384_SHA384,
            SignatureScheme::ED25519,
            SignatureScheme::RSA_PSS_SHA256,
            SignatureScheme::RSA_PSS_SHA384,
            SignatureScheme::RSA_PSS_SHA512,
            SignatureScheme::RSA_PKCS1_SHA256,
            SignatureScheme::RSA_PKCS1_SHA384,
            SignatureScheme::RSA_PKCS1_SHA512,
        ]
    }
}

/// TLS source built on rustls with the ring provider.
#[derive(Clone)]
pub struct RustlsTlsSource {
    connector: TlsConnector,
    /// Bound on TCP connect plus handshake
    timeout: Duration,
}

impl RustlsTlsSource {
    pub fn new(timeout: Duration) -> Result<Self, DomainScanError> {
        let provider = Arc::new(rustls::crypto::ring::default_provider());
        let config = ClientConfig::builder_with_provider(provider)
            .with_safe_default_protocol_versions()
            .map_err(|e| DomainScanError::config(format!("TLS client setup failed: {}", e)))?
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(AcceptAnyCertificate))
            .with_no_client_auth();

        Ok(Self {
            connector: TlsConnector::from(Arc::new(config)),
            timeout,
        })
    }
}

#[async_trait]
impl TlsSource for RustlsTlsSource {
    async fn peer_certificate_count(&self, domain: &str) -> Result<usize, DomainScanError> {
        let server_name = ServerName::try_from(domain.to_string())
            .map_err(|e| DomainScanError::tls(domain, e.to_string()))?;

        let handshake = async {
            let stream = TcpStream::connect((domain, 443))
                .await
                .map_err(|e| DomainScanError::tls(domain, format!("connect: {}", e)))?;
            let tls = self
                .connector
                .connect(server_name, stream)
                .await
                .map_err(|e| DomainScanError::tls(domain, format!("handshake: {}", e)))?;

            let (_, session) = tls.get_ref();
            Ok(session.peer_certificates().map_or(0, |certs| certs.len()))
        };

        tokio::time::timeout(self.timeout, handshake)
            .await
            .map_err(|_| DomainScanError::timeout("TLS dial", self.timeout))?
    }
}

/// Turns a certificate count into the SSL signature.
#[derive(Clone)]
pub struct TlsProbe {
    source: Arc<dyn TlsSource>,
}

impl TlsProbe {
    pub fn new(source: Arc<dyn TlsSource>) -> Self {
        Self { source }
    }

    pub async fn signature(&self, domain: &str) -> Option<Signature> {
        match self.source.peer_certificate_count(domain).await {
            Ok(count) if count > 0 => Some(Signature::Ssl),
            Ok(_) => None,
            Err(e) => {
                debug!(domain, error = %e, "TLS probe yielded no evidence");
                None
            }
        }
    }
}
