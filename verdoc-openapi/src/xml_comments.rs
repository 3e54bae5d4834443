//! XML documentation comments
//!
//! Reads `<doc><members><member name="...">` files and applies member
//! summaries and remarks to generated operations. A member applies to an
//! operation when it is a method (`M:`) member and the last segment of its
//! name (parameters stripped) equals the operation id, so
//! `M:Api.UsersController.list_users(System.Int32)` and
//! `M:api::users::list_users` both document `list_users`. Type (`T:`) and
//! property (`P:`) members never document operations. When two methods share
//! a short name the first one in the file wins.

use crate::spec::Operation;
use crate::{OpenApiError, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::Path;
use verdoc_core::logging::{debug, warn};

#[derive(Debug, Deserialize)]
struct DocFile {
    #[serde(default)]
    assembly: Option<AssemblyElement>,
    #[serde(default)]
    members: MembersElement,
}

#[derive(Debug, Deserialize)]
struct AssemblyElement {
    name: String,
}

#[derive(Debug, Default, Deserialize)]
struct MembersElement {
    #[serde(default)]
    member: Vec<MemberElement>,
}

#[derive(Debug, Deserialize)]
struct MemberElement {
    #[serde(rename = "@name")]
    name: String,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    remarks: Option<String>,
}

/// Documentation for one member
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberDoc {
    pub summary: Option<String>,
    pub remarks: Option<String>,
}

/// Parsed documentation file
#[derive(Debug, Clone, Default)]
pub struct XmlComments {
    assembly: Option<String>,
    /// operation id -> documentation
    members: HashMap<String, MemberDoc>,
}

fn collapse_whitespace(text: Option<String>) -> Option<String> {
    let text = text?;
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    (!collapsed.is_empty()).then_some(collapsed)
}

/// Short method name: `M:Ns.Type.method(args)` -> `method`.
///
/// `None` for anything that is not a method member.
fn member_key(name: &str) -> Option<&str> {
    let name = name.strip_prefix("M:")?;
    let name = name.split('(').next().unwrap_or(name);
    let name = name.rsplit("::").next().unwrap_or(name);
    let key = name.rsplit('.').next().unwrap_or(name);
    (!key.is_empty()).then_some(key)
}

impl XmlComments {
    /// Parse documentation from an XML string
    pub fn parse(xml: &str, origin: &Path) -> Result<Self> {
        let doc: DocFile = quick_xml::de::from_str(xml).map_err(|e| OpenApiError::XmlComments {
            path: origin.to_path_buf(),
            message: e.to_string(),
        })?;

        let mut members: HashMap<String, (String, MemberDoc)> = HashMap::new();
        for m in doc.members.member {
            let Some(key) = member_key(&m.name) else {
                continue;
            };

            match members.entry(key.to_string()) {
                Entry::Occupied(existing) => {
                    warn!(
                        member = %m.name,
                        kept = %existing.get().0,
                        key = key,
                        "XML comment members share an operation id; ignoring later member"
                    );
                }
                Entry::Vacant(slot) => {
                    let docs = MemberDoc {
                        summary: collapse_whitespace(m.summary),
                        remarks: collapse_whitespace(m.remarks),
                    };
                    slot.insert((m.name, docs));
                }
            }
        }
        let members = members
            .into_iter()
            .map(|(key, (_, docs))| (key, docs))
            .collect();

        Ok(Self {
            assembly: doc.assembly.map(|a| a.name),
            members,
        })
    }

    /// Load documentation from a file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let xml = std::fs::read_to_string(path)?;
        let comments = Self::parse(&xml, path)?;

        debug!(
            path = %path.display(),
            members = comments.members.len(),
            "Loaded XML comments"
        );
        Ok(comments)
    }

    /// Assembly name recorded in the file
    pub fn assembly(&self) -> Option<&str> {
        self.assembly.as_deref()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn member(&self, operation_id: &str) -> Option<&MemberDoc> {
        self.members.get(operation_id)
    }

    /// Fill in the summary and description of an operation.
    ///
    /// Values already set on the operation are kept.
    pub fn apply(&self, operation: &mut Operation) {
        let Some(docs) = operation
            .operation_id
            .as_deref()
            .and_then(|id| self.member(id))
        else {
            return;
        };

        if operation.summary.is_none() {
            operation.summary = docs.summary.clone();
        }
        if operation.description.is_none() {
            operation.description = docs.remarks.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"<?xml version="1.0"?>
<doc>
    <assembly>
        <name>orders-service</name>
    </assembly>
    <members>
        <member name="M:Orders.OrdersController.list_orders(System.Int32)">
            <summary>
                Lists orders
                for the current customer.
            </summary>
            <remarks>Paged by 50.</remarks>
            <param name="page">Page number</param>
        </member>
        <member name="M:orders::handlers::get_order">
            <summary>Gets one order.</summary>
        </member>
        <member name="T:Orders.Order">
            <summary>An order.</summary>
        </member>
    </members>
</doc>"#;

    fn parsed() -> XmlComments {
        XmlComments::parse(DOC, Path::new("orders-service.xml")).unwrap()
    }

    #[test]
    fn test_member_key() {
        assert_eq!(member_key("M:A.B.list(System.Int32)"), Some("list"));
        assert_eq!(member_key("M:crate::api::get"), Some("get"));
        assert_eq!(member_key("T:Orders.Order"), None);
        assert_eq!(member_key("P:Orders.Order.id"), None);
        assert_eq!(member_key("plain"), None);
    }

    #[test]
    fn test_parse_members() {
        let comments = parsed();
        assert_eq!(comments.assembly(), Some("orders-service"));
        assert_eq!(comments.len(), 2);
        assert!(comments.member("Order").is_none());

        let list = comments.member("list_orders").unwrap();
        assert_eq!(
            list.summary.as_deref(),
            Some("Lists orders for the current customer.")
        );
        assert_eq!(list.remarks.as_deref(), Some("Paged by 50."));
        assert!(comments.member("get_order").unwrap().remarks.is_none());
    }

    #[test]
    fn test_apply_keeps_existing_summary() {
        let comments = parsed();

        let mut documented = Operation {
            operation_id: Some("list_orders".into()),
            ..Operation::default()
        };
        comments.apply(&mut documented);
        assert_eq!(
            documented.summary.as_deref(),
            Some("Lists orders for the current customer.")
        );
        assert_eq!(documented.description.as_deref(), Some("Paged by 50."));

        let mut explicit = Operation {
            operation_id: Some("get_order".into()),
            summary: Some("Fetch".into()),
            ..Operation::default()
        };
        comments.apply(&mut explicit);
        assert_eq!(explicit.summary.as_deref(), Some("Fetch"));
    }

    #[test]
    fn test_colliding_methods_keep_first() {
        let xml = r#"<doc>
    <members>
        <member name="M:Orders.Get"><summary>Gets an order.</summary></member>
        <member name="M:Users.Get"><summary>Gets a user.</summary></member>
        <member name="T:Get"><summary>A type.</summary></member>
    </members>
</doc>"#;
        let comments = XmlComments::parse(xml, Path::new("api.xml")).unwrap();

        assert_eq!(comments.len(), 1);
        assert_eq!(
            comments.member("Get").unwrap().summary.as_deref(),
            Some("Gets an order.")
        );
    }

    #[test]
    fn test_type_members_do_not_document_operations() {
        let xml = r#"<doc>
    <members>
        <member name="T:Orders.list_orders"><summary>Not an operation.</summary></member>
        <member name="P:Orders.Order.list_orders"><summary>Nor this.</summary></member>
    </members>
</doc>"#;
        let comments = XmlComments::parse(xml, Path::new("api.xml")).unwrap();
        assert!(comments.is_empty());

        let mut operation = Operation {
            operation_id: Some("list_orders".into()),
            ..Operation::default()
        };
        comments.apply(&mut operation);
        assert!(operation.summary.is_none());
    }

    #[test]
    fn test_malformed_xml() {
        let err = XmlComments::parse("<doc><members>", Path::new("broken.xml")).unwrap_err();
        assert!(matches!(err, OpenApiError::XmlComments { path, .. } if path == Path::new("broken.xml")));
    }
}
