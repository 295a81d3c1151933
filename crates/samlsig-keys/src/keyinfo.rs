#![forbid(unsafe_code)]

//! `ds:KeyInfo` processing: certificate extraction on the way in, X509Data
//! rendering on the way out.

use samlsig_core::ns::{self, node};
use samlsig_xml::document::{compact_text, find_child_elements};

/// Base64 bodies of every `X509Data/X509Certificate` under a `ds:KeyInfo`,
/// whitespace stripped, in document order.
pub fn extract_certificates(key_info: roxmltree::Node<'_, '_>) -> Vec<String> {
    find_child_elements(key_info, ns::DSIG, node::X509_DATA)
        .into_iter()
        .flat_map(|data| find_child_elements(data, ns::DSIG, node::X509_CERTIFICATE))
        .map(compact_text)
        .filter(|body| !body.is_empty())
        .collect()
}

/// Render a `ds:KeyInfo` element carrying one `ds:X509Data` per
/// certificate.  Returns an empty string when there is nothing to embed.
pub fn write_key_info(certificates: &[String]) -> String {
    if certificates.is_empty() {
        return String::new();
    }
    let p = ns::DSIG_PREFIX;
    let mut out = format!("<{p}:{}>", node::KEY_INFO);
    for cert in certificates {
        let body: String = cert.chars().filter(|c| !c.is_whitespace()).collect();
        out.push_str(&format!(
            "<{p}:{data}><{p}:{x509}>{body}</{p}:{x509}></{p}:{data}>",
            data = node::X509_DATA,
            x509 = node::X509_CERTIFICATE,
        ));
    }
    out.push_str(&format!("</{p}:{}>", node::KEY_INFO));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn certificates_in_document_order() {
        let xml = r#"<ds:KeyInfo xmlns:ds="http://www.w3.org/2000/09/xmldsig#">
            <ds:X509Data><ds:X509Certificate>
                AAAA
                BBBB
            </ds:X509Certificate></ds:X509Data>
            <ds:KeyName>ignored</ds:KeyName>
            <ds:X509Data>
                <ds:X509Certificate>CCCC</ds:X509Certificate>
                <ds:X509Certificate>DDDD</ds:X509Certificate>
                <ds:X509Certificate>   </ds:X509Certificate>
            </ds:X509Data>
        </ds:KeyInfo>"#;
        let doc = roxmltree::Document::parse(xml).unwrap();
        assert_eq!(
            extract_certificates(doc.root_element()),
            ["AAAABBBB", "CCCC", "DDDD"]
        );
    }

    #[test]
    fn rendered_key_info_round_trips() {
        let certs = vec!["AAAA".to_owned(), "BB\nBB".to_owned()];
        let rendered = write_key_info(&certs);
        assert_eq!(
            rendered,
            "<ds:KeyInfo><ds:X509Data><ds:X509Certificate>AAAA</ds:X509Certificate></ds:X509Data>\
             <ds:X509Data><ds:X509Certificate>BBBB</ds:X509Certificate></ds:X509Data></ds:KeyInfo>"
        );

        let wrapped = format!(
            r#"<ds:Signature xmlns:ds="http://www.w3.org/2000/09/xmldsig#">{rendered}</ds:Signature>"#
        );
        let doc = roxmltree::Document::parse(&wrapped).unwrap();
        let key_info = doc.root_element().first_element_child().unwrap();
        assert_eq!(extract_certificates(key_info), ["AAAA", "BBBB"]);
    }

    #[test]
    fn nothing_to_render() {
        assert_eq!(write_key_info(&[]), "");
    }
}
