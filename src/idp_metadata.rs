use std::{fmt::Display, str::FromStr};

use tracing::debug;
use url::Url;

use crate::{
    utils::{attribute, find_nodes, find_text, is_element, parse_document, saml_context},
    Certificate, SamlError, METADATA_NS,
};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProtocolBinding {
    Post,
    #[default]
    Redirect,
}

impl Display for ProtocolBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ProtocolBinding::Post => write!(f, "urn:oasis:names:tc:SAML:2.0:bindings:HTTP-POST"),
            ProtocolBinding::Redirect => {
                write!(f, "urn:oasis:names:tc:SAML:2.0:bindings:HTTP-Redirect")
            }
        }
    }
}

impl FromStr for ProtocolBinding {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "urn:oasis:names:tc:SAML:2.0:bindings:HTTP-POST" => Ok(ProtocolBinding::Post),
            "urn:oasis:names:tc:SAML:2.0:bindings:HTTP-Redirect" => Ok(ProtocolBinding::Redirect),
            _ => Err(()),
        }
    }
}

/// The parts of an identity provider's `md:EntityDescriptor` needed to talk to it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityDescriptor {
    pub entity_id: String,
    pub key_descriptors: Vec<KeyDescriptor>,
    pub sso_services: Vec<SingleSignOnService>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyDescriptor {
    /// The `use` attribute; empty means the key serves any purpose.
    pub key_use: String,
    /// Base64 body of the first `ds:X509Certificate`, if any.
    pub certificate: Option<String>,
}

impl KeyDescriptor {
    fn signing_certificate(&self) -> Option<&str> {
        if !self.key_use.is_empty() && self.key_use != "signing" {
            return None;
        }
        self.certificate.as_deref()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SingleSignOnService {
    pub binding: String,
    pub location: String,
}

#[derive(Debug)]
#[non_exhaustive]
pub struct IdpMetadata {
    pub entity_id: String,
    pub signing_certificate: Certificate,
    pub redirect_location: Url,
}

impl EntityDescriptor {
    pub fn from_xml(input: &[u8]) -> Result<Self, SamlError> {
        let document = parse_document(input)?;

        let root = document
            .get_root_element()
            .ok_or(SamlError::InvalidMetadata("document has no root element"))?;
        if !is_element(&root, METADATA_NS, "EntityDescriptor") {
            return Err(SamlError::InvalidMetadata(
                "root element is not an EntityDescriptor",
            ));
        }

        let mut context = saml_context(&document)?;

        let mut key_descriptors = Vec::new();
        for node in find_nodes(
            &mut context,
            "/md:EntityDescriptor/md:IDPSSODescriptor/md:KeyDescriptor",
            None,
        )? {
            let certificate = find_text(
                &mut context,
                "ds:KeyInfo/ds:X509Data/ds:X509Certificate",
                &node,
            )?;
            let certificate = certificate.trim();
            key_descriptors.push(KeyDescriptor {
                key_use: attribute(&node, "use"),
                certificate: (!certificate.is_empty()).then(|| certificate.to_owned()),
            });
        }

        let sso_services = find_nodes(
            &mut context,
            "/md:EntityDescriptor/md:IDPSSODescriptor/md:SingleSignOnService",
            None,
        )?
        .iter()
        .map(|node| SingleSignOnService {
            binding: attribute(node, "Binding"),
            location: attribute(node, "Location"),
        })
        .collect();

        Ok(EntityDescriptor {
            entity_id: attribute(&root, "entityID"),
            key_descriptors,
            sso_services,
        })
    }

    /// Location of the first single sign-on service using `binding`.
    pub fn sso_location(&self, binding: ProtocolBinding) -> Option<&str> {
        self.sso_services
            .iter()
            .find(|service| service.binding.parse::<ProtocolBinding>() == Ok(binding))
            .map(|service| service.location.as_str())
    }

    /// Picks the entity ID, the first usable signing certificate and the
    /// HTTP-Redirect single sign-on location.
    pub fn resolve(&self) -> Result<IdpMetadata, SamlError> {
        let encoded_certificate = self
            .key_descriptors
            .iter()
            .enumerate()
            .find_map(|(index, key)| {
                let certificate = key.signing_certificate();
                if certificate.is_none() {
                    debug!(index, key_use = %key.key_use, "skipping key descriptor");
                }
                certificate
            })
            .ok_or(SamlError::NoCertificate)?;
        let signing_certificate = Certificate::from_base64(encoded_certificate)?;

        let location = self
            .sso_location(ProtocolBinding::Redirect)
            .ok_or(SamlError::NoRedirectBinding)?;
        let redirect_location = Url::parse(location).map_err(SamlError::InvalidLocation)?;

        Ok(IdpMetadata {
            entity_id: self.entity_id.clone(),
            signing_certificate,
            redirect_location,
        })
    }
}

pub fn parse_idp_metadata(input: &[u8]) -> Result<IdpMetadata, SamlError> {
    EntityDescriptor::from_xml(input)?.resolve()
}
