use base64::{prelude::BASE64_STANDARD, Engine};
use libxml::{
    parser::{Parser as XmlParser, ParserOptions},
    tree::{Document, Node},
    xpath::Context,
};
use time::{format_description::well_known::Iso8601, OffsetDateTime};

use crate::{SamlError, ASSERTION_NS, METADATA_NS, PROTOCOL_NS, XMLDSIG_NS};

pub fn decode_xml_base64(input: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let stripped = input.replace([' ', '\n', '\r', '\t'], "");
    BASE64_STANDARD.decode(stripped)
}

/// Parses a document, refusing anything that is not well-formed.
///
/// libxml2 repairs broken markup by default; a repaired tree is not what was signed.
pub fn parse_document(input: &[u8]) -> Result<Document, SamlError> {
    let parser = XmlParser::default();
    parser
        .parse_string_with_options(
            input,
            ParserOptions {
                recover: false,
                ..Default::default()
            },
        )
        .map_err(SamlError::InvalidXml)
}

/// XPath context with the `saml2p`, `saml2`, `md` and `ds` prefixes registered.
pub fn saml_context(document: &Document) -> Result<Context, SamlError> {
    let mut context =
        Context::new(document).map_err(|_| SamlError::MalformedResponse("no XPath context"))?;
    for (prefix, href) in [
        ("saml2p", PROTOCOL_NS),
        ("saml2", ASSERTION_NS),
        ("md", METADATA_NS),
        ("ds", XMLDSIG_NS),
    ] {
        context
            .register_namespace(prefix, href)
            .map_err(|_| SamlError::MalformedResponse("failed to register namespace"))?;
    }
    Ok(context)
}

pub fn find_nodes(
    context: &mut Context,
    xpath: &str,
    node: Option<&Node>,
) -> Result<Vec<Node>, SamlError> {
    context
        .findnodes(xpath, node)
        .map_err(|_| SamlError::MalformedResponse("XPath evaluation failed"))
}

pub fn first_node(
    context: &mut Context,
    xpath: &str,
    node: Option<&Node>,
) -> Result<Option<Node>, SamlError> {
    Ok(find_nodes(context, xpath, node)?.into_iter().next())
}

/// String value of the first node matching `xpath`, empty when nothing matches.
pub fn find_text(context: &mut Context, xpath: &str, node: &Node) -> Result<String, SamlError> {
    context
        .findvalue(xpath, Some(node))
        .map_err(|_| SamlError::MalformedResponse("XPath evaluation failed"))
}

pub fn attribute(node: &Node, name: &str) -> String {
    node.get_attribute(name).unwrap_or_default()
}

pub fn is_element(node: &Node, namespace: &str, name: &str) -> bool {
    node.get_name() == name
        && node
            .get_namespace()
            .is_some_and(|ns| ns.get_href() == namespace)
}

pub fn parse_instant(value: &str) -> Result<Option<OffsetDateTime>, SamlError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    OffsetDateTime::parse(value, &Iso8601::DEFAULT)
        .map(Some)
        .map_err(|_| SamlError::InvalidTimestamp(value.to_owned()))
}
