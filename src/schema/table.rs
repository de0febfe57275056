//! Table, column, relation and enum descriptors.

/// SQL type of a column. `Enum` names a type created from an [`EnumDef`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnType {
    Uuid,
    Text,
    Boolean,
    BigInt,
    Integer,
    Char(u8),
    Timestamptz,
    Jsonb,
    Enum(&'static str),
}

impl ColumnType {
    /// Type name usable both in DDL and in `$n::type` casts.
    pub fn sql(&self) -> String {
        match self {
            ColumnType::Uuid => "uuid".into(),
            ColumnType::Text => "text".into(),
            ColumnType::Boolean => "boolean".into(),
            ColumnType::BigInt => "bigint".into(),
            ColumnType::Integer => "integer".into(),
            ColumnType::Char(n) => format!("char({})", n),
            ColumnType::Timestamptz => "timestamptz".into(),
            ColumnType::Jsonb => "jsonb".into(),
            ColumnType::Enum(name) => (*name).to_string(),
        }
    }

    pub fn is_enum(&self) -> bool {
        matches!(self, ColumnType::Enum(_))
    }
}

/// Timestamps maintained by the store rather than by callers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnRole {
    Plain,
    CreatedAt,
    UpdatedAt,
}

#[derive(Clone, Copy, Debug)]
pub struct ColumnDef {
    pub name: &'static str,
    pub ty: ColumnType,
    pub nullable: bool,
    /// SQL expression used as column default.
    pub default: Option<&'static str>,
    pub unique: bool,
    /// CHECK expression, e.g. `price_minor >= 0`.
    pub check: Option<&'static str>,
    pub role: ColumnRole,
}

impl ColumnDef {
    /// NOT NULL column without default.
    pub const fn new(name: &'static str, ty: ColumnType) -> Self {
        ColumnDef {
            name,
            ty,
            nullable: false,
            default: None,
            unique: false,
            check: None,
            role: ColumnRole::Plain,
        }
    }

    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub const fn default_sql(mut self, expr: &'static str) -> Self {
        self.default = Some(expr);
        self
    }

    pub const fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub const fn check(mut self, expr: &'static str) -> Self {
        self.check = Some(expr);
        self
    }

    pub const fn created_at(name: &'static str) -> Self {
        let mut c = ColumnDef::new(name, ColumnType::Timestamptz).default_sql("now()");
        c.role = ColumnRole::CreatedAt;
        c
    }

    pub const fn updated_at(name: &'static str) -> Self {
        let mut c = ColumnDef::new(name, ColumnType::Timestamptz).default_sql("now()");
        c.role = ColumnRole::UpdatedAt;
        c
    }
}

#[derive(Clone, Copy, Debug)]
pub struct ForeignKey {
    pub column: &'static str,
    pub references: &'static str,
    pub referenced_column: &'static str,
    /// `CASCADE`, `SET NULL`, ...; `None` keeps the PostgreSQL default.
    pub on_delete: Option<&'static str>,
}

/// Title-like and description-like columns matched by free-text search.
#[derive(Clone, Copy, Debug)]
pub struct SearchFields {
    pub title: &'static str,
    pub description: &'static str,
}

/// Related collection that list queries may expand in place (`rows of related WHERE foreign_key = our pk`).
#[derive(Clone, Copy, Debug)]
pub struct RelationDef {
    /// Key the expanded rows are placed under.
    pub name: &'static str,
    pub related: &'static TableDef,
    /// Column of the related table pointing at our primary key.
    pub foreign_key: &'static str,
}

#[derive(Debug)]
pub struct TableDef {
    pub name: &'static str,
    pub primary_key: &'static str,
    pub columns: &'static [ColumnDef],
    pub foreign_keys: &'static [ForeignKey],
    pub search: Option<SearchFields>,
    pub active: Option<&'static str>,
    pub expand: Option<RelationDef>,
}

impl TableDef {
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn created_at(&self) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.role == ColumnRole::CreatedAt)
    }

    pub fn updated_at(&self) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.role == ColumnRole::UpdatedAt)
    }

    /// Column list ordering follows declaration order.
    pub fn column_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns.iter().map(|c| c.name)
    }
}

/// PostgreSQL enum type.
#[derive(Debug)]
pub struct EnumDef {
    pub name: &'static str,
    pub values: &'static [&'static str],
}
