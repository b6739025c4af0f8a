use serde::{Deserialize, Serialize};

/// Access and mutability modifiers on a schema action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AccessModifier {
    /// Callable by anyone through the SDK
    Public,
    /// Callable only from other actions on the node
    Private,
    /// Read-only; routed through call messages, never transactions
    View,
    /// Restricted to the schema owner
    Owner,
}

/// A declared action parameter.
///
/// # Example (JSON representation)
///
/// ```json
/// { "name": "$id", "type": "uuid" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionParameter {
    /// Parameter name including the `$` prefix
    pub name: String,

    /// Declared type, e.g. `text`, `uuid`, `numeric(10,2)`, `int8[]`
    #[serde(rename = "type")]
    pub param_type: String,
}

/// An action (procedure) declared by a schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionDefinition {
    /// Action name, lowercase on the node
    pub name: String,

    /// Declared parameters, in call order
    #[serde(default)]
    pub parameters: Vec<ActionParameter>,

    /// Access and mutability modifiers
    #[serde(default)]
    pub modifiers: Vec<AccessModifier>,
}

impl ActionDefinition {
    /// Whether the action may be invoked through the SDK at all.
    pub fn is_public(&self) -> bool {
        self.modifiers.contains(&AccessModifier::Public)
    }

    /// Whether the action is read-only and must go through the call path.
    pub fn is_view(&self) -> bool {
        self.modifiers.contains(&AccessModifier::View)
    }
}

/// A table column as reported by the node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub name: String,

    #[serde(rename = "type")]
    pub column_type: String,
}

/// A table declared by a schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDescriptor {
    pub name: String,

    #[serde(default)]
    pub columns: Vec<ColumnDescriptor>,
}

/// A deployed schema as resolved from the node.
///
/// The SDK holds a read-only cached copy keyed by dbid; the node owns the
/// authoritative version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDescriptor {
    /// Owner identifier, hex-encoded
    pub owner: String,

    /// Schema name
    pub name: String,

    #[serde(default)]
    pub tables: Vec<TableDescriptor>,

    #[serde(default)]
    pub actions: Vec<ActionDefinition>,
}

impl SchemaDescriptor {
    /// Look up an action by its lowercased name.
    pub fn action(&self, name: &str) -> Option<&ActionDefinition> {
        self.actions.iter().find(|a| a.name == name)
    }
}
