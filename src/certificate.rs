use x509_parser::{parse_x509_certificate, pem::parse_x509_pem};

use crate::{utils::decode_xml_base64, SamlError};

/// An X.509 certificate trusted to have signed a response.
///
/// Holds the DER encoding; two certificates are equal when their DER bytes are.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Certificate {
    der: Vec<u8>,
}

impl Certificate {
    pub fn from_der(der: impl Into<Vec<u8>>) -> Result<Self, SamlError> {
        let der = der.into();
        parse_x509_certificate(&der).map_err(|_| SamlError::InvalidCertificate)?;
        Ok(Certificate { der })
    }

    /// Decodes the base64 body found in `ds:X509Certificate` elements.
    pub fn from_base64(encoded: &str) -> Result<Self, SamlError> {
        let der = decode_xml_base64(encoded).map_err(|_| SamlError::InvalidCertificate)?;
        Self::from_der(der)
    }

    /// Loads the first PEM block of `pem`; text before it is ignored.
    pub fn from_pem(pem: &str) -> Result<Self, SamlError> {
        let (_, pem) = parse_x509_pem(pem.as_bytes()).map_err(|_| SamlError::InvalidCertificate)?;
        if pem.label != "CERTIFICATE" {
            return Err(SamlError::InvalidCertificate);
        }
        Self::from_der(pem.contents)
    }

    pub fn as_der(&self) -> &[u8] {
        &self.der
    }
}
