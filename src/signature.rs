use thiserror::Error;

use crate::Certificate;

/// The element an enveloped signature has to cover.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignedElement {
    /// The whole `samlp:Response` envelope.
    #[default]
    Response,
    /// Only the `saml:Assertion` embedded in the response.
    Assertion,
}

/// A `ds:Signature` found in a response.
///
/// Only the placement and reference are decoded; the signature itself is handed
/// untouched to a [`SignatureVerifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub element: SignedElement,
    pub reference_uri: String,
}

/// What a [`SignatureVerifier`] gets to check: the decoded document exactly as
/// received, and the element the signature was found to cover.
#[derive(Debug, Clone, Copy)]
pub struct SignedDocument<'a> {
    pub xml: &'a [u8],
    pub element: SignedElement,
    pub element_id: &'a str,
}

#[derive(Debug, Error)]
pub enum SignatureError {
    #[error("unusable verification key: {0}")]
    InvalidKey(String),
    #[error("malformed signature: {0}")]
    Malformed(String),
    #[error("signature does not match the signed content")]
    Mismatch,
}

/// XML-DSig verification of a signed document against a single trusted certificate.
pub trait SignatureVerifier {
    fn verify_signature(
        &self,
        document: &SignedDocument<'_>,
        certificate: &Certificate,
    ) -> Result<(), SignatureError>;
}

#[cfg(feature = "xmlsec")]
pub use self::xmlsec_verifier::XmlSecVerifier;

#[cfg(feature = "xmlsec")]
mod xmlsec_verifier {
    use xmlsec::{XmlSecDocumentExt as _, XmlSecKey, XmlSecKeyFormat, XmlSecSignatureContext};

    use super::{SignatureError, SignatureVerifier, SignedDocument, SignedElement};
    use crate::{utils::parse_document, Certificate, ASSERTION_NS, PROTOCOL_NS};

    /// [`SignatureVerifier`] backed by libxmlsec1.
    #[derive(Debug, Default, Clone, Copy)]
    pub struct XmlSecVerifier;

    impl SignatureVerifier for XmlSecVerifier {
        fn verify_signature(
            &self,
            signed: &SignedDocument<'_>,
            certificate: &Certificate,
        ) -> Result<(), SignatureError> {
            let document = parse_document(signed.xml)
                .map_err(|e| SignatureError::Malformed(e.to_string()))?;

            let key = XmlSecKey::from_memory(certificate.as_der(), XmlSecKeyFormat::CertDer, None)
                .map_err(|e| SignatureError::InvalidKey(format!("{e:?}")))?;

            let mut sigctx = XmlSecSignatureContext::new();
            sigctx.insert_key(key);

            // References are resolved through ID attributes, which libxml only knows about
            // when told explicitly.
            document
                .specify_idattr(
                    "//saml2p:Response",
                    "ID",
                    Some(&[("saml2p", PROTOCOL_NS)]),
                )
                .map_err(|e| SignatureError::Malformed(format!("{e:?}")))?;
            if signed.element == SignedElement::Assertion {
                document
                    .specify_idattr(
                        "//saml2:Assertion",
                        "ID",
                        Some(&[("saml2", ASSERTION_NS)]),
                    )
                    .map_err(|e| SignatureError::Malformed(format!("{e:?}")))?;
            }

            match sigctx.verify_document(&document) {
                Ok(true) => Ok(()),
                Ok(false) => Err(SignatureError::Mismatch),
                Err(e) => Err(SignatureError::Malformed(format!("{e:?}"))),
            }
        }
    }
}
