use libxml::parser::XmlParseError;
use thiserror::Error;

mod certificate;
mod idp_metadata;
mod model;
mod response;
mod signature;
mod utils;

pub use certificate::Certificate;
pub use idp_metadata::{
    parse_idp_metadata, EntityDescriptor, IdpMetadata, KeyDescriptor, ProtocolBinding,
    SingleSignOnService,
};
pub use model::{
    Assertion, Attribute, AttributeStatement, Conditions, Issuer, NameId, Response, Subject,
    SubjectConfirmation, SubjectConfirmationData,
};
#[cfg(feature = "xmlsec")]
pub use response::verify;
pub use response::{
    decode_response, extract_response_issuer, ResponseVerifier, ResponseVerifierBuilder,
};
#[cfg(feature = "xmlsec")]
pub use signature::XmlSecVerifier;
pub use signature::{Signature, SignatureError, SignatureVerifier, SignedDocument, SignedElement};
use time::format_description::well_known::iso8601::{self, TimePrecision};

pub const PROTOCOL_NS: &str = "urn:oasis:names:tc:SAML:2.0:protocol";
pub const ASSERTION_NS: &str = "urn:oasis:names:tc:SAML:2.0:assertion";
pub const METADATA_NS: &str = "urn:oasis:names:tc:SAML:2.0:metadata";
pub const XMLDSIG_NS: &str = "http://www.w3.org/2000/09/xmldsig#";

pub const NAME_ID_FORMAT_EMAIL_ADDRESS: &str =
    "urn:oasis:names:tc:SAML:1.1:nameid-format:emailAddress";

// xs:dateTime isn't actually ISO8601, because implementors often don't support higher precisions.
pub const DATE_TIME_FORMAT: iso8601::Iso8601<
    {
        iso8601::Config::DEFAULT
            .set_time_precision(TimePrecision::Second {
                decimal_digits: None,
            })
            .encode()
    },
> = iso8601::Iso8601;

#[derive(Debug, Error)]
pub enum SamlError {
    #[error("response is not valid base64")]
    InvalidResponse,
    #[error("response is not well-formed XML: {0:?}")]
    InvalidXml(XmlParseError),
    #[error("malformed response: {0}")]
    MalformedResponse(&'static str),
    #[error("invalid xs:dateTime value {0:?}")]
    InvalidTimestamp(String),
    #[error("response is not signed")]
    NotSigned,
    #[error("signature verification failed: {0}")]
    InvalidSignature(#[from] SignatureError),
    #[error("assertion issuer does not match the expected issuer")]
    InvalidIssuer,
    #[error("subject confirmation recipient does not match the expected recipient")]
    InvalidRecipient,
    #[error("assertion is expired or not yet valid")]
    AssertionExpired,
    #[error("invalid metadata: {0}")]
    InvalidMetadata(&'static str),
    #[error("metadata contains no signing certificate")]
    NoCertificate,
    #[error("certificate is not a valid X.509 certificate")]
    InvalidCertificate,
    #[error("metadata contains no HTTP-Redirect single sign-on service")]
    NoRedirectBinding,
    #[error("invalid single sign-on location: {0}")]
    InvalidLocation(#[source] url::ParseError),
    #[error("verifier is missing {0}")]
    MissingConfiguration(&'static str),
    #[error("failed to serialize response: {0}")]
    Serialization(String),
}

impl SamlError {
    /// Whether the input could not be decoded into a response at all.
    pub fn is_decoding(&self) -> bool {
        matches!(
            self,
            SamlError::InvalidResponse
                | SamlError::InvalidXml(_)
                | SamlError::MalformedResponse(_)
                | SamlError::InvalidTimestamp(_)
        )
    }
}
