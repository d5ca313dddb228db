use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Permission type value object: one kind of action that can be granted on a screen.
///
/// The declaration order is the canonical display order of the matrix columns.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, utoipa::ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum PermissionType {
    View,
    Create,
    Edit,
    Delete,
    EditConfidential,
    Export,
}

impl PermissionType {
    /// Every permission type, in column order.
    pub const ALL: [PermissionType; 6] = [
        PermissionType::View,
        PermissionType::Create,
        PermissionType::Edit,
        PermissionType::Delete,
        PermissionType::EditConfidential,
        PermissionType::Export,
    ];

    /// Returns the wire tag of the permission type.
    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionType::View => "view",
            PermissionType::Create => "create",
            PermissionType::Edit => "edit",
            PermissionType::Delete => "delete",
            PermissionType::EditConfidential => "edit_confidential",
            PermissionType::Export => "export",
        }
    }

    /// Returns the label shown in the matrix header.
    pub fn label(&self) -> &'static str {
        match self {
            PermissionType::View => "Visualizar",
            PermissionType::Create => "Criar",
            PermissionType::Edit => "Editar",
            PermissionType::Delete => "Excluir",
            PermissionType::EditConfidential => "Editar sigiloso",
            PermissionType::Export => "Exportar",
        }
    }
}

impl fmt::Display for PermissionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown permission type: {0}")]
pub struct UnknownPermissionType(pub String);

impl FromStr for PermissionType {
    type Err = UnknownPermissionType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PermissionType::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| UnknownPermissionType(s.to_string()))
    }
}
