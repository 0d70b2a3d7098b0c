use crate::{ID_KEY, model::entity::EntityModel};
use std::fmt;

///
/// FieldModel
/// Runtime metadata for one declared field.
///

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldModel {
    /// Field name as declared on the struct.
    pub name: &'static str,
    /// Declared semantic type.
    pub kind: FieldKind,
    /// Mapping role and its options.
    pub role: FieldRole,
}

impl FieldModel {
    #[must_use]
    pub const fn id(name: &'static str, strategy: IdStrategy) -> Self {
        Self {
            name,
            kind: FieldKind::Text,
            role: FieldRole::Id(strategy),
        }
    }

    #[must_use]
    pub const fn property(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            role: FieldRole::Property(PropertyOptions::new()),
        }
    }

    #[must_use]
    pub const fn property_with(
        name: &'static str,
        kind: FieldKind,
        options: PropertyOptions,
    ) -> Self {
        Self {
            name,
            kind,
            role: FieldRole::Property(options),
        }
    }

    #[must_use]
    pub const fn embed(
        name: &'static str,
        target: &'static EntityModel,
        options: EmbedOptions,
    ) -> Self {
        Self {
            name,
            kind: FieldKind::Entity(target),
            role: FieldRole::Embed(options),
        }
    }

    #[must_use]
    pub const fn embed_list(name: &'static str, kind: FieldKind, options: EmbedOptions) -> Self {
        Self {
            name,
            kind,
            role: FieldRole::EmbedList(options),
        }
    }

    #[must_use]
    pub const fn reference(
        name: &'static str,
        target: &'static EntityModel,
        options: RefOptions,
    ) -> Self {
        Self {
            name,
            kind: FieldKind::Entity(target),
            role: FieldRole::Ref(options),
        }
    }

    #[must_use]
    pub const fn reference_list(
        name: &'static str,
        kind: FieldKind,
        options: RefListOptions,
    ) -> Self {
        Self {
            name,
            kind,
            role: FieldRole::RefList(options),
        }
    }

    #[must_use]
    pub const fn is_identity(&self) -> bool {
        matches!(self.role, FieldRole::Id(_))
    }

    /// Alternate storage name declared by the role, if any.
    #[must_use]
    pub const fn alternate_name(&self) -> Option<&'static str> {
        match self.role {
            FieldRole::Id(_) => None,
            FieldRole::Property(o) => o.name,
            FieldRole::Embed(o) | FieldRole::EmbedList(o) => o.name,
            FieldRole::Ref(o) => o.name,
            FieldRole::RefList(o) => o.name,
        }
    }

    /// Key under which the field lives in a stored document.
    #[must_use]
    pub const fn storage_name(&self) -> &'static str {
        if self.is_identity() {
            return ID_KEY;
        }

        match self.alternate_name() {
            Some(name) => name,
            None => self.name,
        }
    }

    /// Entity model this field points at, looking through collection kinds.
    #[must_use]
    pub const fn target_model(&self) -> Option<&'static EntityModel> {
        self.kind.entity_model()
    }

    /// Whether changes to the referenced entity must re-index the owner.
    #[must_use]
    pub const fn propagates_index(&self) -> bool {
        match self.role {
            FieldRole::Ref(o) => o.propagate_index,
            FieldRole::RefList(o) => o.propagate_index,
            _ => false,
        }
    }

    /// Whether the field stores raw keys rather than native references.
    #[must_use]
    pub const fn is_manual_reference(&self) -> bool {
        match self.role {
            FieldRole::Ref(o) => o.manual,
            FieldRole::RefList(o) => o.manual,
            _ => false,
        }
    }
}

///
/// FieldKind
///
/// Declared semantic type of a field. Collection kinds point at their
/// element kind through a `&'static`, so element kinds are declared as
/// separate statics.
///

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FieldKind {
    Text,
    Primitive(ScalarKind),
    Boxed(ScalarKind),
    Date,
    Timestamp,
    Blob,
    Array(&'static Self),
    List(&'static Self),
    Set(&'static Self),
    Queue(&'static Self),
    /// String-keyed map; the reference is the value kind.
    Map(&'static Self),
    Entity(&'static EntityModel),
}

impl FieldKind {
    /// Element kind of a collection, `None` for everything else.
    #[must_use]
    pub const fn element(&self) -> Option<&'static Self> {
        match self {
            Self::Array(k) | Self::List(k) | Self::Set(k) | Self::Queue(k) | Self::Map(k) => {
                Some(*k)
            }
            _ => None,
        }
    }

    #[must_use]
    pub const fn entity_model(&self) -> Option<&'static EntityModel> {
        match self {
            Self::Entity(model) => Some(*model),
            Self::Array(k) | Self::List(k) | Self::Set(k) | Self::Queue(k) | Self::Map(k) => {
                k.entity_model()
            }
            _ => None,
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Primitive(s) => write!(f, "{s}"),
            Self::Boxed(s) => write!(f, "{s}?"),
            Self::Date => write!(f, "date"),
            Self::Timestamp => write!(f, "timestamp"),
            Self::Blob => write!(f, "blob"),
            Self::Array(k) => write!(f, "[{k}]"),
            Self::List(k) => write!(f, "list<{k}>"),
            Self::Set(k) => write!(f, "set<{k}>"),
            Self::Queue(k) => write!(f, "queue<{k}>"),
            Self::Map(k) => write!(f, "map<text, {k}>"),
            Self::Entity(m) => write!(f, "{}", m.path),
        }
    }
}

///
/// ScalarKind
/// Primitive scalar families.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ScalarKind {
    Bool,
    Char,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
}

impl ScalarKind {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Char => "char",
            Self::Byte => "byte",
            Self::Short => "short",
            Self::Int => "int",
            Self::Long => "long",
            Self::Float => "float",
            Self::Double => "double",
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

///
/// IdStrategy
/// How identity values are produced, and so which native key type the
/// store holds.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum IdStrategy {
    /// Store-generated opaque id.
    #[default]
    Generated,
    /// Monotonically increasing integer.
    Incrementing,
    /// Caller-supplied text.
    UserDefined,
}

///
/// FieldRole
///

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FieldRole {
    Id(IdStrategy),
    Property(PropertyOptions),
    Embed(EmbedOptions),
    EmbedList(EmbedOptions),
    Ref(RefOptions),
    RefList(RefListOptions),
}

///
/// PropertyOptions
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct PropertyOptions {
    pub name: Option<&'static str>,
}

impl PropertyOptions {
    #[must_use]
    pub const fn new() -> Self {
        Self { name: None }
    }

    #[must_use]
    pub const fn named(name: &'static str) -> Self {
        Self { name: Some(name) }
    }
}

///
/// EmbedOptions
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct EmbedOptions {
    pub name: Option<&'static str>,
}

impl EmbedOptions {
    #[must_use]
    pub const fn new() -> Self {
        Self { name: None }
    }

    #[must_use]
    pub const fn named(name: &'static str) -> Self {
        Self { name: Some(name) }
    }
}

///
/// RefOptions
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct RefOptions {
    pub name: Option<&'static str>,
    pub manual: bool,
    pub cascade_read: bool,
    pub propagate_index: bool,
}

impl RefOptions {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            name: None,
            manual: false,
            cascade_read: false,
            propagate_index: false,
        }
    }

    #[must_use]
    pub const fn named(mut self, name: &'static str) -> Self {
        self.name = Some(name);
        self
    }

    #[must_use]
    pub const fn manual(mut self) -> Self {
        self.manual = true;
        self
    }

    #[must_use]
    pub const fn cascade_read(mut self) -> Self {
        self.cascade_read = true;
        self
    }

    #[must_use]
    pub const fn propagate_index(mut self) -> Self {
        self.propagate_index = true;
        self
    }
}

///
/// RefListOptions
///
/// `sort` uses the store's sort-spec syntax, e.g. `{'level': -1}`, and only
/// applies to cascading reads.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct RefListOptions {
    pub name: Option<&'static str>,
    pub manual: bool,
    pub cascade_read: bool,
    pub propagate_index: bool,
    pub sort: Option<&'static str>,
}

impl RefListOptions {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            name: None,
            manual: false,
            cascade_read: false,
            propagate_index: false,
            sort: None,
        }
    }

    #[must_use]
    pub const fn named(mut self, name: &'static str) -> Self {
        self.name = Some(name);
        self
    }

    #[must_use]
    pub const fn manual(mut self) -> Self {
        self.manual = true;
        self
    }

    #[must_use]
    pub const fn cascade_read(mut self) -> Self {
        self.cascade_read = true;
        self
    }

    #[must_use]
    pub const fn propagate_index(mut self) -> Self {
        self.propagate_index = true;
        self
    }

    #[must_use]
    pub const fn sorted(mut self, sort: &'static str) -> Self {
        self.sort = Some(sort);
        self
    }
}
