/// Column options declared with `#[orm(...)]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct FieldFlags {
    pub pk: bool,
    /// Generated by the database, never written by inserts.
    pub auto: bool,
    /// Stored as JSON text.
    pub json: bool,
    /// Empty JSON values are stored as the empty string.
    pub omit_empty: bool,
    /// A `Dynamic` slot resolved through the model's fielder.
    pub dynamic: bool,
    pub table_suffix: bool,
}

/// Field entry emitted by `#[derive(Model)]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    pub name: &'static str,
    pub column: &'static str,
    pub flags: FieldFlags,
    /// The declared type is the `Dynamic` placeholder.
    pub placeholder: bool,
    /// The declared type is an owning indirection (`Box<_>`).
    pub indirect: bool,
}

/// Registered metadata of one mapped field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Position in the model's field table, the address used by
    /// `Model::column_value` and `Model::load_column`.
    pub index: usize,
    pub name: &'static str,
    /// `<type>.<field>`, used in diagnostics.
    pub full_name: String,
    pub column: &'static str,
    pub flags: FieldFlags,
}

impl FieldDescriptor {
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.flags.json || self.flags.dynamic
    }

    /// Whether the field matches `name` as field or column name.
    #[must_use]
    pub fn answers_to(&self, name: &str) -> bool {
        self.name == name || self.column == name
    }
}
