use time::OffsetDateTime;
use tracing::{debug, warn};

use crate::{
    model::{Assertion, Response},
    utils::{decode_xml_base64, parse_document, saml_context},
    Certificate, SamlError, Signature, SignatureVerifier, SignedDocument, SignedElement,
};

pub fn decode_response(input: &str) -> Result<Vec<u8>, SamlError> {
    decode_xml_base64(input).map_err(|_| SamlError::InvalidResponse)
}

/// Reads the issuer a response claims to come from, without verifying anything.
///
/// Useful to pick which identity provider's certificate to hand to the verifier.
/// Falls back to the assertion issuer when the response itself names none.
pub fn extract_response_issuer(input: &[u8]) -> Result<String, SamlError> {
    let document = parse_document(input)?;

    let mut context = saml_context(&document)?;
    for xpath in [
        "/saml2p:Response/saml2:Issuer/text()",
        "/saml2p:Response/saml2:Assertion/saml2:Issuer/text()",
    ] {
        let issuer = context
            .findvalue(xpath, None)
            .map_err(|_| SamlError::InvalidIssuer)?;
        if !issuer.is_empty() {
            return Ok(issuer);
        }
    }
    Err(SamlError::InvalidIssuer)
}

/// Verifies a base64-encoded response with the libxmlsec1 signature verifier.
///
/// `now` is the instant every validity window is checked against.
#[cfg(feature = "xmlsec")]
pub fn verify(
    encoded_response: &str,
    expected_issuer: &str,
    certificate: &Certificate,
    expected_recipient: &str,
    now: OffsetDateTime,
) -> Result<Response, SamlError> {
    ResponseVerifier::builder()
        .issuer(expected_issuer)
        .recipient(expected_recipient)
        .certificate(certificate.clone())
        .build()?
        .verify(encoded_response, now)
}

/// Checks signed responses from one identity provider on behalf of one service provider.
pub struct ResponseVerifier {
    expected_issuer: String,
    expected_recipient: String,
    certificate: Certificate,
    signed_element: SignedElement,
    signature_verifier: Box<dyn SignatureVerifier + Send + Sync>,
}

impl std::fmt::Debug for ResponseVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseVerifier")
            .field("expected_issuer", &self.expected_issuer)
            .field("expected_recipient", &self.expected_recipient)
            .field("signed_element", &self.signed_element)
            .finish_non_exhaustive()
    }
}

impl ResponseVerifier {
    pub fn builder() -> ResponseVerifierBuilder {
        ResponseVerifierBuilder::new()
    }

    /// Decodes `encoded_response` and returns it only if every check passes.
    ///
    /// Checks run in a fixed order and stop at the first failure: shape, signature
    /// presence, signature validity, issuer, recipient, then the validity windows.
    /// Nothing claimed by the response is looked at before its signature verified.
    pub fn verify(
        &self,
        encoded_response: &str,
        now: OffsetDateTime,
    ) -> Result<Response, SamlError> {
        let xml = decode_response(encoded_response)?;
        let response = Response::from_xml(&xml)?;

        let element_id = signed_element_id(&response, self.signed_element).inspect_err(|_| {
            warn!(signed_element = ?self.signed_element, "SAML response is not signed");
        })?;

        let document = SignedDocument {
            xml: &xml,
            element: self.signed_element,
            element_id,
        };
        self.signature_verifier
            .verify_signature(&document, &self.certificate)
            .inspect_err(|e| warn!(error = %e, "SAML response signature rejected"))?;

        let assertion = &response.assertion;
        self.check_issuer(assertion)?;
        self.check_recipient(assertion)?;
        check_validity(assertion, now)?;

        debug!(
            response_id = %response.id,
            assertion_id = %assertion.id,
            "SAML response verified"
        );
        Ok(response)
    }

    fn check_issuer(&self, assertion: &Assertion) -> Result<(), SamlError> {
        if assertion.issuer.value != self.expected_issuer {
            warn!(expected = %self.expected_issuer, "SAML assertion issuer mismatch");
            return Err(SamlError::InvalidIssuer);
        }
        Ok(())
    }

    fn check_recipient(&self, assertion: &Assertion) -> Result<(), SamlError> {
        let data = &assertion.subject.subject_confirmation.subject_confirmation_data;
        if data.recipient != self.expected_recipient {
            warn!(expected = %self.expected_recipient, "SAML subject confirmation recipient mismatch");
            return Err(SamlError::InvalidRecipient);
        }
        Ok(())
    }
}

/// ID of the element the response signature covers, if it covers `scope`.
fn signed_element_id(response: &Response, scope: SignedElement) -> Result<&str, SamlError> {
    let Some(Signature {
        element,
        reference_uri,
    }) = &response.signature
    else {
        return Err(SamlError::NotSigned);
    };
    if *element != scope {
        return Err(SamlError::NotSigned);
    }

    let id = match scope {
        SignedElement::Response => response.id.as_str(),
        SignedElement::Assertion => response.assertion.id.as_str(),
    };
    let covered = match reference_uri.strip_prefix('#') {
        Some(reference) => !id.is_empty() && reference == id,
        // an empty reference is the whole document, i.e. the response
        None => reference_uri.is_empty() && scope == SignedElement::Response,
    };
    if !covered {
        return Err(SamlError::NotSigned);
    }
    Ok(id)
}

// Lower bounds are inclusive and upper bounds exclusive. A missing upper bound
// is treated as already passed.
fn check_validity(assertion: &Assertion, now: OffsetDateTime) -> Result<(), SamlError> {
    let conditions = &assertion.conditions;
    let confirmation = &assertion.subject.subject_confirmation.subject_confirmation_data;

    let not_yet_valid = conditions.not_before.is_some_and(|not_before| now < not_before);
    let expired = [conditions.not_on_or_after, confirmation.not_on_or_after]
        .into_iter()
        .any(|not_on_or_after| not_on_or_after.map_or(true, |end| now >= end));

    if not_yet_valid || expired {
        warn!(%now, not_yet_valid, expired, "SAML assertion outside its validity window");
        return Err(SamlError::AssertionExpired);
    }
    Ok(())
}

#[derive(Default)]
pub struct ResponseVerifierBuilder {
    issuer: Option<String>,
    recipient: Option<String>,
    certificate: Option<Certificate>,
    signed_element: SignedElement,
    signature_verifier: Option<Box<dyn SignatureVerifier + Send + Sync>>,
}

impl ResponseVerifierBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// The identity provider entity ID the assertion issuer must equal.
    pub fn issuer(self, issuer: &str) -> Self {
        ResponseVerifierBuilder {
            issuer: Some(issuer.into()),
            ..self
        }
    }

    /// The assertion consumer service URL the subject confirmation must name.
    pub fn recipient(self, recipient: &str) -> Self {
        ResponseVerifierBuilder {
            recipient: Some(recipient.into()),
            ..self
        }
    }

    pub fn certificate(self, certificate: Certificate) -> Self {
        ResponseVerifierBuilder {
            certificate: Some(certificate),
            ..self
        }
    }

    pub fn signed_element(self, signed_element: SignedElement) -> Self {
        ResponseVerifierBuilder {
            signed_element,
            ..self
        }
    }

    pub fn signature_verifier(
        self,
        verifier: impl SignatureVerifier + Send + Sync + 'static,
    ) -> Self {
        ResponseVerifierBuilder {
            signature_verifier: Some(Box::new(verifier)),
            ..self
        }
    }

    pub fn build(self) -> Result<ResponseVerifier, SamlError> {
        Ok(ResponseVerifier {
            expected_issuer: self
                .issuer
                .ok_or(SamlError::MissingConfiguration("expected issuer"))?,
            expected_recipient: self
                .recipient
                .ok_or(SamlError::MissingConfiguration("expected recipient"))?,
            certificate: self
                .certificate
                .ok_or(SamlError::MissingConfiguration("trusted certificate"))?,
            signed_element: self.signed_element,
            signature_verifier: match self.signature_verifier {
                Some(verifier) => verifier,
                None => default_signature_verifier()?,
            },
        })
    }
}

#[cfg(feature = "xmlsec")]
fn default_signature_verifier() -> Result<Box<dyn SignatureVerifier + Send + Sync>, SamlError> {
    Ok(Box::new(crate::XmlSecVerifier))
}

#[cfg(not(feature = "xmlsec"))]
fn default_signature_verifier() -> Result<Box<dyn SignatureVerifier + Send + Sync>, SamlError> {
    Err(SamlError::MissingConfiguration("signature verifier"))
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use base64::{prelude::BASE64_STANDARD, Engine};
    use time::{macros::datetime, Duration};

    use super::*;
    use crate::SignatureError;

    const SAMPLE_RESPONSE: &str = include_str!("../static/response.xml");
    const ASSERTION_SIGNED_RESPONSE: &str = include_str!("../static/assertion_signed_response.xml");
    const SAMPLE_CERT_PEM: &str = include_str!("../static/idp.cert");

    const NOW: OffsetDateTime = datetime!(2020-05-23 01:46:00 UTC);

    type Call = (SignedElement, String, Vec<u8>);

    /// Accepts or rejects every signature, recording what it was asked to check.
    #[derive(Clone)]
    struct StubVerifier {
        valid: bool,
        calls: Arc<Mutex<Vec<Call>>>,
    }

    impl StubVerifier {
        fn new(valid: bool) -> Self {
            StubVerifier {
                valid,
                calls: Arc::default(),
            }
        }

        fn calls(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        fn last_call(&self) -> Option<Call> {
            self.calls.lock().unwrap().last().cloned()
        }
    }

    impl SignatureVerifier for StubVerifier {
        fn verify_signature(
            &self,
            document: &SignedDocument<'_>,
            certificate: &Certificate,
        ) -> Result<(), SignatureError> {
            assert!(!document.xml.is_empty());
            self.calls.lock().unwrap().push((
                document.element,
                document.element_id.to_string(),
                certificate.as_der().to_vec(),
            ));
            if self.valid {
                Ok(())
            } else {
                Err(SignatureError::Mismatch)
            }
        }
    }

    fn certificate() -> Certificate {
        Certificate::from_pem(SAMPLE_CERT_PEM).unwrap()
    }

    fn verifier(stub: &StubVerifier) -> ResponseVerifier {
        ResponseVerifier::builder()
            .issuer("alice")
            .recipient("bob")
            .certificate(certificate())
            .signature_verifier(stub.clone())
            .build()
            .unwrap()
    }

    fn encode(xml: &str) -> String {
        BASE64_STANDARD.encode(xml)
    }

    fn verify_at(xml: &str, now: OffsetDateTime) -> Result<Response, SamlError> {
        verifier(&StubVerifier::new(true)).verify(&encode(xml), now)
    }

    #[test]
    fn can_verify_response() {
        let stub = StubVerifier::new(true);
        let response = verifier(&stub).verify(&encode(SAMPLE_RESPONSE), NOW).unwrap();

        assert_eq!(stub.calls(), 1);
        assert_eq!(
            stub.last_call(),
            Some((
                SignedElement::Response,
                "_response1".to_string(),
                certificate().as_der().to_vec()
            ))
        );
        assert_eq!(response.assertion.issuer.value, "alice");
        assert_eq!(
            response
                .assertion
                .subject
                .subject_confirmation
                .subject_confirmation_data
                .recipient,
            "bob"
        );
        assert_eq!(response.assertion.subject.name_id.value, "jdoe@example.com");
        let attributes: Vec<_> = response
            .assertion
            .attribute_statement
            .attributes
            .iter()
            .map(|a| (a.name.as_str(), a.name_format.as_str(), a.value.as_str()))
            .collect();
        assert_eq!(
            attributes,
            [("attr1", "fmt1", "value1"), ("attr2", "fmt2", "value2")]
        );
    }

    #[test]
    fn accepts_line_wrapped_base64() {
        let encoded = encode(SAMPLE_RESPONSE);
        let wrapped = encoded
            .as_bytes()
            .chunks(76)
            .map(|chunk| std::str::from_utf8(chunk).unwrap())
            .collect::<Vec<_>>()
            .join("\r\n");
        let stub = StubVerifier::new(true);
        assert!(verifier(&stub).verify(&wrapped, NOW).is_ok());
    }

    #[test]
    fn rejects_undecodable_input() {
        let stub = StubVerifier::new(true);
        let verifier = verifier(&stub);

        assert!(matches!(
            verifier.verify("not base64!", NOW),
            Err(SamlError::InvalidResponse)
        ));
        let err = verifier.verify(&encode("<unclosed"), NOW).unwrap_err();
        assert!(err.is_decoding(), "{err:?}");
        assert_eq!(stub.calls(), 0);
    }

    #[test]
    fn rejects_unsigned_response() {
        let unsigned = SAMPLE_RESPONSE.replace("ds:Signature", "ds:NotASignature");
        let stub = StubVerifier::new(true);

        assert!(matches!(
            verifier(&stub).verify(&encode(&unsigned), NOW),
            Err(SamlError::NotSigned)
        ));
        assert_eq!(stub.calls(), 0);
    }

    #[test]
    fn unsigned_is_reported_regardless_of_content() {
        let unsigned = SAMPLE_RESPONSE
            .replace("ds:Signature", "ds:NotASignature")
            .replace("<saml2:Issuer>alice</saml2:Issuer>", "<saml2:Issuer>mallory</saml2:Issuer>");
        assert!(matches!(
            verify_at(&unsigned, NOW + Duration::days(365)),
            Err(SamlError::NotSigned)
        ));
    }

    #[test]
    fn rejects_signature_not_covering_response() {
        let elsewhere = SAMPLE_RESPONSE.replace(r##"URI="#_response1""##, r##"URI="#_assertion1""##);
        assert!(matches!(
            verify_at(&elsewhere, NOW),
            Err(SamlError::NotSigned)
        ));

        let no_id = SAMPLE_RESPONSE.replace(r#"ID="_response1""#, "");
        assert!(matches!(verify_at(&no_id, NOW), Err(SamlError::NotSigned)));

        let whole_document = SAMPLE_RESPONSE.replace(r##"URI="#_response1""##, r#"URI="""#);
        assert!(verify_at(&whole_document, NOW).is_ok());
    }

    #[test]
    fn signature_scope_must_match() {
        let stub = StubVerifier::new(true);

        // Response-level verifier does not accept a signature over the assertion only.
        assert!(matches!(
            verifier(&stub).verify(&encode(ASSERTION_SIGNED_RESPONSE), NOW),
            Err(SamlError::NotSigned)
        ));

        let assertion_verifier = ResponseVerifier::builder()
            .issuer("alice")
            .recipient("bob")
            .certificate(certificate())
            .signed_element(SignedElement::Assertion)
            .signature_verifier(stub.clone())
            .build()
            .unwrap();
        let response = assertion_verifier
            .verify(&encode(ASSERTION_SIGNED_RESPONSE), NOW)
            .unwrap();
        assert_eq!(response.assertion.id, "_assertion2");
        assert_eq!(
            stub.last_call(),
            Some((
                SignedElement::Assertion,
                "_assertion2".to_string(),
                certificate().as_der().to_vec()
            ))
        );
        assert!(matches!(
            assertion_verifier.verify(&encode(SAMPLE_RESPONSE), NOW),
            Err(SamlError::NotSigned)
        ));
        assert_eq!(stub.calls(), 1);
    }

    #[test]
    fn signature_is_checked_before_content() {
        let stub = StubVerifier::new(false);
        let verifier = verifier(&stub);

        let wrong_issuer =
            SAMPLE_RESPONSE.replace("<saml2:Issuer>alice</saml2:Issuer>", "<saml2:Issuer>eve</saml2:Issuer>");
        for (xml, now) in [
            (SAMPLE_RESPONSE.to_string(), NOW),
            (wrong_issuer, NOW),
            (SAMPLE_RESPONSE.to_string(), NOW + Duration::days(1)),
        ] {
            assert!(matches!(
                verifier.verify(&encode(&xml), now),
                Err(SamlError::InvalidSignature(SignatureError::Mismatch))
            ));
        }
        assert_eq!(stub.calls(), 3);
    }

    #[test]
    fn rejects_wrong_issuer() {
        let wrong_issuer =
            SAMPLE_RESPONSE.replace("<saml2:Issuer>alice</saml2:Issuer>", "<saml2:Issuer>Alice</saml2:Issuer>");
        assert!(matches!(
            verify_at(&wrong_issuer, NOW),
            Err(SamlError::InvalidIssuer)
        ));

        let stub = StubVerifier::new(true);
        let other_idp = ResponseVerifier::builder()
            .issuer("carol")
            .recipient("bob")
            .certificate(certificate())
            .signature_verifier(stub)
            .build()
            .unwrap();
        assert!(matches!(
            other_idp.verify(&encode(SAMPLE_RESPONSE), NOW),
            Err(SamlError::InvalidIssuer)
        ));
    }

    #[test]
    fn rejects_wrong_recipient() {
        let wrong_recipient = SAMPLE_RESPONSE.replace(r#"Recipient="bob""#, r#"Recipient="bob/""#);
        assert!(matches!(
            verify_at(&wrong_recipient, NOW),
            Err(SamlError::InvalidRecipient)
        ));

        let missing_recipient = SAMPLE_RESPONSE.replace(r#"Recipient="bob""#, "");
        assert!(matches!(
            verify_at(&missing_recipient, NOW),
            Err(SamlError::InvalidRecipient)
        ));
    }

    #[test]
    fn issuer_is_checked_before_recipient_and_time() {
        let both = SAMPLE_RESPONSE
            .replace("<saml2:Issuer>alice</saml2:Issuer>", "<saml2:Issuer>eve</saml2:Issuer>")
            .replace(r#"Recipient="bob""#, r#"Recipient="eve""#);
        assert!(matches!(
            verify_at(&both, NOW + Duration::days(1)),
            Err(SamlError::InvalidIssuer)
        ));

        let recipient_and_time = SAMPLE_RESPONSE.replace(r#"Recipient="bob""#, r#"Recipient="eve""#);
        assert!(matches!(
            verify_at(&recipient_and_time, NOW + Duration::days(1)),
            Err(SamlError::InvalidRecipient)
        ));
    }

    #[test]
    fn enforces_conditions_window() {
        let not_before = datetime!(2020-05-23 01:45:00 UTC);
        let not_on_or_after = datetime!(2020-05-23 01:47:00 UTC);

        assert!(verify_at(SAMPLE_RESPONSE, not_before).is_ok());
        assert!(matches!(
            verify_at(SAMPLE_RESPONSE, not_before - Duration::seconds(1)),
            Err(SamlError::AssertionExpired)
        ));
        assert!(verify_at(SAMPLE_RESPONSE, not_on_or_after - Duration::seconds(1)).is_ok());
        assert!(matches!(
            verify_at(SAMPLE_RESPONSE, not_on_or_after),
            Err(SamlError::AssertionExpired)
        ));
        assert!(matches!(
            verify_at(SAMPLE_RESPONSE, not_on_or_after + Duration::minutes(1)),
            Err(SamlError::AssertionExpired)
        ));
    }

    #[test]
    fn enforces_subject_confirmation_expiry() {
        // Conditions stay open for longer than the confirmation data.
        let xml = SAMPLE_RESPONSE.replace(
            r#"NotBefore="2020-05-23T01:45:00Z" NotOnOrAfter="2020-05-23T01:47:00Z""#,
            r#"NotBefore="2020-05-23T01:45:00Z" NotOnOrAfter="2020-05-23T02:00:00Z""#,
        );
        let expiry = datetime!(2020-05-23 01:47:00 UTC);

        assert!(verify_at(&xml, expiry - Duration::seconds(1)).is_ok());
        assert!(matches!(
            verify_at(&xml, expiry),
            Err(SamlError::AssertionExpired)
        ));
    }

    #[test]
    fn missing_bounds() {
        let no_not_before = SAMPLE_RESPONSE.replace(r#"NotBefore="2020-05-23T01:45:00Z" "#, "");
        assert!(verify_at(&no_not_before, datetime!(1970-01-01 00:00:00 UTC)).is_ok());

        let no_conditions_end = SAMPLE_RESPONSE.replace(
            r#"NotBefore="2020-05-23T01:45:00Z" NotOnOrAfter="2020-05-23T01:47:00Z""#,
            r#"NotBefore="2020-05-23T01:45:00Z""#,
        );
        assert!(matches!(
            verify_at(&no_conditions_end, NOW),
            Err(SamlError::AssertionExpired)
        ));

        let no_confirmation_end =
            SAMPLE_RESPONSE.replace(r#"NotOnOrAfter="2020-05-23T01:47:00Z" Recipient="bob""#, r#"Recipient="bob""#);
        assert!(matches!(
            verify_at(&no_confirmation_end, NOW),
            Err(SamlError::AssertionExpired)
        ));
    }

    #[test]
    fn builder_requires_settings() {
        let err = ResponseVerifier::builder()
            .recipient("bob")
            .certificate(certificate())
            .build()
            .unwrap_err();
        assert!(matches!(err, SamlError::MissingConfiguration("expected issuer")));

        let err = ResponseVerifier::builder()
            .issuer("alice")
            .certificate(certificate())
            .build()
            .unwrap_err();
        assert!(matches!(err, SamlError::MissingConfiguration("expected recipient")));

        let err = ResponseVerifier::builder()
            .issuer("alice")
            .recipient("bob")
            .build()
            .unwrap_err();
        assert!(matches!(err, SamlError::MissingConfiguration("trusted certificate")));
    }

    #[test]
    fn can_extract_issuer() {
        assert_eq!(
            extract_response_issuer(SAMPLE_RESPONSE.as_bytes()).unwrap(),
            "alice"
        );

        let assertion_only = SAMPLE_RESPONSE.replacen("<saml2:Issuer>alice</saml2:Issuer>", "", 1);
        assert_eq!(
            extract_response_issuer(assertion_only.as_bytes()).unwrap(),
            "alice"
        );

        let none = assertion_only.replace("<saml2:Issuer>alice</saml2:Issuer>", "");
        assert!(matches!(
            extract_response_issuer(none.as_bytes()),
            Err(SamlError::InvalidIssuer)
        ));
    }

    #[cfg(feature = "xmlsec")]
    #[test]
    fn xmlsec_accepts_signed_response() {
        let response = verify(&encode(SAMPLE_RESPONSE), "alice", &certificate(), "bob", NOW).unwrap();
        assert_eq!(response.id, "_response1");
        assert_eq!(response.assertion.subject.name_id.value, "jdoe@example.com");
        let names: Vec<_> = response
            .assertion
            .attribute_statement
            .attributes
            .iter()
            .map(|a| a.name.as_str())
            .collect();
        assert_eq!(names, ["attr1", "attr2"]);
    }

    #[cfg(feature = "xmlsec")]
    #[test]
    fn xmlsec_accepts_signed_assertion() {
        let verifier = ResponseVerifier::builder()
            .issuer("alice")
            .recipient("bob")
            .certificate(certificate())
            .signed_element(SignedElement::Assertion)
            .build()
            .unwrap();
        let response = verifier
            .verify(&encode(ASSERTION_SIGNED_RESPONSE), NOW)
            .unwrap();
        assert_eq!(response.assertion.id, "_assertion2");
        assert_eq!(response.assertion.attribute_statement.attributes[0].value, "admins");
    }

    #[cfg(feature = "xmlsec")]
    #[test]
    fn xmlsec_rejects_tampered_content() {
        let tampered = SAMPLE_RESPONSE.replace("jdoe@example.com", "jdoa@example.com");
        let err = verify(&encode(&tampered), "alice", &certificate(), "bob", NOW).unwrap_err();
        assert!(matches!(err, SamlError::InvalidSignature(_)), "{err:?}");

        let verifier = ResponseVerifier::builder()
            .issuer("alice")
            .recipient("bob")
            .certificate(certificate())
            .signed_element(SignedElement::Assertion)
            .build()
            .unwrap();
        let tampered = ASSERTION_SIGNED_RESPONSE.replace(">admins<", ">admint<");
        let err = verifier.verify(&encode(&tampered), NOW).unwrap_err();
        assert!(matches!(err, SamlError::InvalidSignature(_)), "{err:?}");
    }

    #[cfg(feature = "xmlsec")]
    #[test]
    fn xmlsec_rejects_untrusted_certificate() {
        let other = Certificate::from_pem(include_str!("../static/other.cert")).unwrap();
        let err = verify(&encode(SAMPLE_RESPONSE), "alice", &other, "bob", NOW).unwrap_err();
        assert!(matches!(err, SamlError::InvalidSignature(_)), "{err:?}");
    }

    #[cfg(feature = "xmlsec")]
    #[test]
    fn xmlsec_checks_time_after_signature() {
        let err = verify(
            &encode(SAMPLE_RESPONSE),
            "alice",
            &certificate(),
            "bob",
            datetime!(2020-05-23 01:48:00 UTC),
        )
        .unwrap_err();
        assert!(matches!(err, SamlError::AssertionExpired), "{err:?}");
    }
}
