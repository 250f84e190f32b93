use libxml::{tree::Node, xpath::Context};
use time::OffsetDateTime;

use crate::{
    utils::{
        attribute, find_nodes, find_text, first_node, is_element, parse_document, parse_instant,
        saml_context,
    },
    SamlError, Signature, SignedElement, DATE_TIME_FORMAT, NAME_ID_FORMAT_EMAIL_ADDRESS,
    PROTOCOL_NS,
};

/// A decoded `samlp:Response`.
///
/// Decoding is permissive: elements and attributes missing from the document come
/// out empty. Whether the content is acceptable is decided by the verifier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Response {
    pub id: String,
    pub assertion: Assertion,
    pub signature: Option<Signature>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assertion {
    pub id: String,
    pub issuer: Issuer,
    pub subject: Subject,
    pub conditions: Conditions,
    pub attribute_statement: AttributeStatement,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Issuer {
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Subject {
    pub name_id: NameId,
    pub subject_confirmation: SubjectConfirmation,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameId {
    pub format: String,
    pub value: String,
}

impl NameId {
    /// The subject's email address, if the identifier is in the `emailAddress` format.
    pub fn email_address(&self) -> Option<&str> {
        (self.format == NAME_ID_FORMAT_EMAIL_ADDRESS).then_some(self.value.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubjectConfirmation {
    pub method: String,
    pub subject_confirmation_data: SubjectConfirmationData,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubjectConfirmationData {
    pub recipient: String,
    pub not_on_or_after: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conditions {
    pub not_before: Option<OffsetDateTime>,
    pub not_on_or_after: Option<OffsetDateTime>,
}

/// Attributes released by the identity provider, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeStatement {
    pub attributes: Vec<Attribute>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub name_format: String,
    /// Text of the first `AttributeValue`.
    pub value: String,
}

impl Response {
    /// Parses a response document without checking anything beyond its shape.
    pub fn from_xml(input: &[u8]) -> Result<Self, SamlError> {
        let document = parse_document(input)?;

        let root = document
            .get_root_element()
            .ok_or(SamlError::MalformedResponse("document has no root element"))?;
        if !is_element(&root, PROTOCOL_NS, "Response") {
            return Err(SamlError::MalformedResponse(
                "root element is not a SAML 2.0 Response",
            ));
        }

        let mut context = saml_context(&document)?;

        if find_nodes(&mut context, "//ds:Signature", None)?.len() > 1 {
            return Err(SamlError::MalformedResponse("more than one signature"));
        }

        let mut assertions = find_nodes(&mut context, "/saml2p:Response/saml2:Assertion", None)?;
        if assertions.len() > 1 {
            return Err(SamlError::MalformedResponse("more than one assertion"));
        }
        let assertion = match assertions.pop() {
            Some(node) => Assertion::decode(&mut context, &node)?,
            None => Assertion::default(),
        };

        Ok(Response {
            id: attribute(&root, "ID"),
            assertion,
            signature: decode_signature(&mut context)?,
        })
    }

    /// Serializes the response back into XML. The signature is not carried over.
    pub fn to_xml(&self) -> Result<String, SamlError> {
        let response = wire::Response::from_model(self)?;
        yaserde::ser::to_string(&response).map_err(SamlError::Serialization)
    }
}

fn decode_signature(context: &mut Context) -> Result<Option<Signature>, SamlError> {
    for (xpath, element) in [
        ("/saml2p:Response/ds:Signature", SignedElement::Response),
        (
            "/saml2p:Response/saml2:Assertion/ds:Signature",
            SignedElement::Assertion,
        ),
    ] {
        if let Some(node) = first_node(context, xpath, None)? {
            let reference_uri = first_node(context, "ds:SignedInfo/ds:Reference", Some(&node))?
                .map(|reference| attribute(&reference, "URI"))
                .unwrap_or_default();
            return Ok(Some(Signature {
                element,
                reference_uri,
            }));
        }
    }
    Ok(None)
}

fn decode_child<T: Default>(
    context: &mut Context,
    xpath: &str,
    parent: &Node,
    decode: impl FnOnce(&mut Context, &Node) -> Result<T, SamlError>,
) -> Result<T, SamlError> {
    match first_node(context, xpath, Some(parent))? {
        Some(node) => decode(context, &node),
        None => Ok(T::default()),
    }
}

impl Assertion {
    fn decode(context: &mut Context, node: &Node) -> Result<Self, SamlError> {
        Ok(Assertion {
            id: attribute(node, "ID"),
            issuer: Issuer {
                value: find_text(context, "saml2:Issuer", node)?,
            },
            subject: decode_child(context, "saml2:Subject", node, Subject::decode)?,
            conditions: decode_child(context, "saml2:Conditions", node, |_, node| {
                Conditions::decode(node)
            })?,
            attribute_statement: AttributeStatement::decode(context, node)?,
        })
    }
}

impl Subject {
    fn decode(context: &mut Context, node: &Node) -> Result<Self, SamlError> {
        let name_id = first_node(context, "saml2:NameID", Some(node))?
            .map(|name_id| NameId {
                format: attribute(&name_id, "Format"),
                value: name_id.get_content(),
            })
            .unwrap_or_default();

        Ok(Subject {
            name_id,
            subject_confirmation: decode_child(
                context,
                "saml2:SubjectConfirmation",
                node,
                SubjectConfirmation::decode,
            )?,
        })
    }
}

impl SubjectConfirmation {
    fn decode(context: &mut Context, node: &Node) -> Result<Self, SamlError> {
        Ok(SubjectConfirmation {
            method: attribute(node, "Method"),
            subject_confirmation_data: decode_child(
                context,
                "saml2:SubjectConfirmationData",
                node,
                |_, data| {
                    Ok(SubjectConfirmationData {
                        recipient: attribute(data, "Recipient"),
                        not_on_or_after: parse_instant(&attribute(data, "NotOnOrAfter"))?,
                    })
                },
            )?,
        })
    }
}

impl Conditions {
    fn decode(node: &Node) -> Result<Self, SamlError> {
        Ok(Conditions {
            not_before: parse_instant(&attribute(node, "NotBefore"))?,
            not_on_or_after: parse_instant(&attribute(node, "NotOnOrAfter"))?,
        })
    }
}

impl AttributeStatement {
    /// Collects the attributes of every statement in `assertion`, in document order.
    fn decode(context: &mut Context, assertion: &Node) -> Result<Self, SamlError> {
        let mut attributes = Vec::new();
        for attr in find_nodes(
            context,
            "saml2:AttributeStatement/saml2:Attribute",
            Some(assertion),
        )? {
            attributes.push(Attribute {
                name: attribute(&attr, "Name"),
                name_format: attribute(&attr, "NameFormat"),
                value: find_text(context, "saml2:AttributeValue", &attr)?,
            });
        }
        Ok(AttributeStatement { attributes })
    }
}

fn format_instant(instant: Option<OffsetDateTime>) -> Result<Option<String>, SamlError> {
    instant
        .map(|instant| instant.format(&DATE_TIME_FORMAT))
        .transpose()
        .map_err(|e| SamlError::Serialization(e.to_string()))
}

mod wire {
    use yaserde::YaSerialize;

    use super::format_instant;
    use crate::SamlError;

    #[derive(YaSerialize)]
    #[yaserde(
      namespaces = {
        "saml2p" = "urn:oasis:names:tc:SAML:2.0:protocol",
        "saml2" = "urn:oasis:names:tc:SAML:2.0:assertion",
      },
      prefix = "saml2p"
    )]
    pub struct Response {
        #[yaserde(attribute = true, rename = "ID")]
        id: String,
        #[yaserde(attribute = true, rename = "Version")]
        version: String,
        #[yaserde(rename = "Assertion", prefix = "saml2")]
        assertion: Assertion,
    }

    #[derive(YaSerialize)]
    struct Assertion {
        #[yaserde(attribute = true, rename = "ID")]
        id: String,
        #[yaserde(attribute = true, rename = "Version")]
        version: String,
        #[yaserde(rename = "Issuer", prefix = "saml2")]
        issuer: Issuer,
        #[yaserde(rename = "Subject", prefix = "saml2")]
        subject: Subject,
        #[yaserde(rename = "Conditions", prefix = "saml2")]
        conditions: Conditions,
        #[yaserde(rename = "AttributeStatement", prefix = "saml2")]
        attribute_statement: AttributeStatement,
    }

    #[derive(YaSerialize)]
    struct Issuer {
        #[yaserde(text = true)]
        content: String,
    }

    #[derive(YaSerialize)]
    struct Subject {
        #[yaserde(rename = "NameID", prefix = "saml2")]
        name_id: NameId,
        #[yaserde(rename = "SubjectConfirmation", prefix = "saml2")]
        subject_confirmation: SubjectConfirmation,
    }

    #[derive(YaSerialize)]
    struct NameId {
        #[yaserde(attribute = true, rename = "Format")]
        format: String,
        #[yaserde(text = true)]
        content: String,
    }

    #[derive(YaSerialize)]
    struct SubjectConfirmation {
        #[yaserde(attribute = true, rename = "Method")]
        method: String,
        #[yaserde(rename = "SubjectConfirmationData", prefix = "saml2")]
        subject_confirmation_data: SubjectConfirmationData,
    }

    #[derive(YaSerialize)]
    struct SubjectConfirmationData {
        #[yaserde(attribute = true, rename = "Recipient")]
        recipient: String,
        #[yaserde(attribute = true, rename = "NotOnOrAfter")]
        not_on_or_after: Option<String>,
    }

    #[derive(YaSerialize)]
    struct Conditions {
        #[yaserde(attribute = true, rename = "NotBefore")]
        not_before: Option<String>,
        #[yaserde(attribute = true, rename = "NotOnOrAfter")]
        not_on_or_after: Option<String>,
    }

    #[derive(YaSerialize)]
    struct AttributeStatement {
        #[yaserde(rename = "Attribute", prefix = "saml2")]
        attributes: Vec<Attribute>,
    }

    #[derive(YaSerialize)]
    struct Attribute {
        #[yaserde(attribute = true, rename = "Name")]
        name: String,
        #[yaserde(attribute = true, rename = "NameFormat")]
        name_format: String,
        #[yaserde(rename = "AttributeValue", prefix = "saml2")]
        value: AttributeValue,
    }

    #[derive(YaSerialize)]
    struct AttributeValue {
        #[yaserde(text = true)]
        content: String,
    }

    impl Response {
        pub fn from_model(response: &super::Response) -> Result<Self, SamlError> {
            let assertion = &response.assertion;
            let subject = &assertion.subject;
            let confirmation = &subject.subject_confirmation;
            Ok(Response {
                id: response.id.clone(),
                version: "2.0".to_string(),
                assertion: Assertion {
                    id: assertion.id.clone(),
                    version: "2.0".to_string(),
                    issuer: Issuer {
                        content: assertion.issuer.value.clone(),
                    },
                    subject: Subject {
                        name_id: NameId {
                            format: subject.name_id.format.clone(),
                            content: subject.name_id.value.clone(),
                        },
                        subject_confirmation: SubjectConfirmation {
                            method: confirmation.method.clone(),
                            subject_confirmation_data: SubjectConfirmationData {
                                recipient: confirmation.subject_confirmation_data.recipient.clone(),
                                not_on_or_after: format_instant(
                                    confirmation.subject_confirmation_data.not_on_or_after,
                                )?,
                            },
                        },
                    },
                    conditions: Conditions {
                        not_before: format_instant(assertion.conditions.not_before)?,
                        not_on_or_after: format_instant(assertion.conditions.not_on_or_after)?,
                    },
                    attribute_statement: AttributeStatement {
                        attributes: assertion
                            .attribute_statement
                            .attributes
                            .iter()
                            .map(|attribute| Attribute {
                                name: attribute.name.clone(),
                                name_format: attribute.name_format.clone(),
                                value: AttributeValue {
                                    content: attribute.value.clone(),
                                },
                            })
                            .collect(),
                    },
                },
            })
        }
    }
}
