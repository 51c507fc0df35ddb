use crate::types::TypeReference;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Run-stable identity of one member.
///
/// Unique within its declaring type. Renders as
/// `Module:Declaring.Type::Member(System.Int32):System.String`, which is also the
/// key callers can use to correlate members across runs.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberStableId {
    pub module: String,
    pub declaring_type: String,
    pub member: String,
    pub signature: String,
}

impl MemberStableId {
    pub fn new(
        module: impl Into<String>,
        declaring_type: impl Into<String>,
        member: impl Into<String>,
        signature: impl Into<String>,
    ) -> Self {
        Self {
            module: module.into(),
            declaring_type: declaring_type.into(),
            member: member.into(),
            signature: signature.into(),
        }
    }

    /// `(p1,p2):ret`
    pub fn method_signature<'a>(
        params: impl IntoIterator<Item = &'a TypeReference>,
        ret: &TypeReference,
    ) -> String {
        format!("({}):{ret}", join_canonical(params))
    }

    /// `(p1,p2)`
    pub fn constructor_signature<'a>(params: impl IntoIterator<Item = &'a TypeReference>) -> String {
        format!("({})", join_canonical(params))
    }

    /// `:T`, or `[k1,k2]:T` for indexers.
    pub fn property_signature<'a>(
        index: impl IntoIterator<Item = &'a TypeReference>,
        ty: &TypeReference,
    ) -> String {
        let index = join_canonical(index);
        if index.is_empty() {
            format!(":{ty}")
        } else {
            format!("[{index}]:{ty}")
        }
    }

    /// The same member re-keyed on another declaring type, used for inherited
    /// and interface-sourced copies.
    pub fn rehomed(&self, module: &str, declaring_type: &str) -> Self {
        Self {
            module: module.to_string(),
            declaring_type: declaring_type.to_string(),
            member: self.member.clone(),
            signature: self.signature.clone(),
        }
    }
}

impl fmt::Display for MemberStableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}::{}{}",
            self.module, self.declaring_type, self.member, self.signature
        )
    }
}

fn join_canonical<'a>(refs: impl IntoIterator<Item = &'a TypeReference>) -> String {
    refs.into_iter()
        .map(|r| r.to_string())
        .collect::<Vec<_>>()
        .join(",")
}
