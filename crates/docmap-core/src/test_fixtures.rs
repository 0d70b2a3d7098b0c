//! Shared test entities.
//!
//! Models are plain statics; element kinds of collection fields are
//! declared as their own statics so they can be referenced by address.
use crate::{
    model::{
        entity::EntityModel,
        field::{
            EmbedOptions, FieldKind, FieldModel, IdStrategy, PropertyOptions, RefListOptions,
            RefOptions, ScalarKind,
        },
        index::{Compare, IndexFilter},
    },
    traits::EntityKind,
    types::{Blob, Date, Timestamp},
    value::{DbRef, Document},
};
use docmap_derive::FieldValues;
use std::collections::{BTreeMap, BTreeSet, VecDeque};

///
/// KINDS
///

pub(crate) static TEXT_KIND: FieldKind = FieldKind::Text;
pub(crate) static SHORT_KIND: FieldKind = FieldKind::Primitive(ScalarKind::Short);
pub(crate) static INT_KIND: FieldKind = FieldKind::Boxed(ScalarKind::Int);
pub(crate) static LONG_KIND: FieldKind = FieldKind::Boxed(ScalarKind::Long);
pub(crate) static PERSON_KIND: FieldKind = FieldKind::Entity(&PERSON_MODEL);
pub(crate) static ADDRESS_KIND: FieldKind = FieldKind::Entity(&ADDRESS_MODEL);
pub(crate) static NODE_KIND: FieldKind = FieldKind::Entity(&NODE_MODEL);

///
/// BASES
///

static BASE_FIELDS: [FieldModel; 1] = [FieldModel::id("id", IdStrategy::Generated)];

/// Abstract ancestor with a store-generated id.
pub(crate) static BASE_MODEL: EntityModel =
    EntityModel::new("docmap::test_fixtures::Base", "base", &BASE_FIELDS);

static KEYED_FIELDS: [FieldModel; 1] = [FieldModel::id("id", IdStrategy::UserDefined)];

/// Abstract ancestor with a caller-supplied id.
pub(crate) static KEYED_MODEL: EntityModel =
    EntityModel::new("docmap::test_fixtures::Keyed", "keyed", &KEYED_FIELDS);

///
/// Person
///

static PERSON_FIELDS: [FieldModel; 3] = [
    FieldModel::property("name", FieldKind::Text),
    FieldModel::property("age", FieldKind::Primitive(ScalarKind::Int)),
    FieldModel::property("level", FieldKind::Boxed(ScalarKind::Int)),
];

pub(crate) static PERSON_MODEL: EntityModel =
    EntityModel::new("docmap::test_fixtures::Person", "person", &PERSON_FIELDS)
        .with_parent(&KEYED_MODEL);

#[derive(Clone, Debug, Default, FieldValues)]
pub(crate) struct Person {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) age: i32,
    pub(crate) level: Option<i32>,
}

impl EntityKind for Person {
    const MODEL: &'static EntityModel = &PERSON_MODEL;
}

impl Person {
    pub(crate) fn new(id: &str, name: &str, age: i32) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            age,
            level: None,
        }
    }
}

///
/// Address
/// Embedded only; declares no identity.
///

static ADDRESS_FIELDS: [FieldModel; 2] = [
    FieldModel::property("city", FieldKind::Text),
    FieldModel::property("zip", FieldKind::Text),
];

pub(crate) static ADDRESS_MODEL: EntityModel =
    EntityModel::new("docmap::test_fixtures::Address", "address", &ADDRESS_FIELDS);

#[derive(Clone, Debug, Default, FieldValues)]
pub(crate) struct Address {
    pub(crate) city: String,
    pub(crate) zip: Option<String>,
}

impl EntityKind for Address {
    const MODEL: &'static EntityModel = &ADDRESS_MODEL;
}

///
/// Article
/// Cascading author, lazy reviewers; indexed only while published.
///

static ARTICLE_FIELDS: [FieldModel; 4] = [
    FieldModel::property("title", FieldKind::Text),
    FieldModel::property("published", FieldKind::Primitive(ScalarKind::Bool)),
    FieldModel::reference(
        "author",
        &PERSON_MODEL,
        RefOptions::new().cascade_read().propagate_index(),
    ),
    FieldModel::reference_list(
        "reviewers",
        FieldKind::List(&PERSON_KIND),
        RefListOptions::new().propagate_index(),
    ),
];

static ARTICLE_FILTERS: [IndexFilter; 1] = [IndexFilter::new("published", Compare::Is, "true")];

pub(crate) static ARTICLE_MODEL: EntityModel =
    EntityModel::new("docmap::test_fixtures::Article", "article", &ARTICLE_FIELDS)
        .with_parent(&BASE_MODEL)
        .with_index_filters(&ARTICLE_FILTERS);

#[derive(Clone, Debug, Default, FieldValues)]
pub(crate) struct Article {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) published: bool,
    pub(crate) author: Option<Person>,
    pub(crate) reviewers: Vec<Person>,
}

impl EntityKind for Article {
    const MODEL: &'static EntityModel = &ARTICLE_MODEL;
}

///
/// Note
/// Same author edge as `Article`, without cascade.
///

static NOTE_FIELDS: [FieldModel; 2] = [
    FieldModel::property("body", FieldKind::Text),
    FieldModel::reference("author", &PERSON_MODEL, RefOptions::new()),
];

pub(crate) static NOTE_MODEL: EntityModel =
    EntityModel::new("docmap::test_fixtures::Note", "note", &NOTE_FIELDS).with_parent(&BASE_MODEL);

#[derive(Clone, Debug, Default, FieldValues)]
pub(crate) struct Note {
    pub(crate) id: String,
    pub(crate) body: String,
    pub(crate) author: Option<Person>,
}

impl EntityKind for Note {
    const MODEL: &'static EntityModel = &NOTE_MODEL;
}

///
/// Team
/// Every reference-collection and embedded shape.
///

static TEAM_FIELDS: [FieldModel; 11] = [
    FieldModel::property("name", FieldKind::Text),
    FieldModel::reference(
        "leader",
        &PERSON_MODEL,
        RefOptions::new().named("boss").manual().propagate_index(),
    ),
    FieldModel::reference_list(
        "members",
        FieldKind::List(&PERSON_KIND),
        RefListOptions::new().cascade_read().sorted("{'age': -1}"),
    ),
    FieldModel::reference_list(
        "squad",
        FieldKind::Array(&PERSON_KIND),
        RefListOptions::new().cascade_read(),
    ),
    FieldModel::reference_list(
        "bench",
        FieldKind::Array(&PERSON_KIND),
        RefListOptions::new(),
    ),
    FieldModel::reference_list(
        "roster",
        FieldKind::Map(&PERSON_KIND),
        RefListOptions::new().cascade_read(),
    ),
    FieldModel::reference_list(
        "backups",
        FieldKind::Set(&PERSON_KIND),
        RefListOptions::new().manual(),
    ),
    FieldModel::embed("home", &ADDRESS_MODEL, EmbedOptions::new()),
    FieldModel::embed_list(
        "offices",
        FieldKind::List(&ADDRESS_KIND),
        EmbedOptions::named("branches"),
    ),
    FieldModel::embed_list("sites", FieldKind::Map(&ADDRESS_KIND), EmbedOptions::new()),
    FieldModel::embed_list(
        "history",
        FieldKind::Queue(&ADDRESS_KIND),
        EmbedOptions::new(),
    ),
];

pub(crate) static TEAM_MODEL: EntityModel =
    EntityModel::new("docmap::test_fixtures::Team", "team", &TEAM_FIELDS).with_parent(&BASE_MODEL);

#[derive(Clone, Debug, Default, FieldValues)]
pub(crate) struct Team {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) leader: Option<Person>,
    pub(crate) members: Vec<Person>,
    pub(crate) squad: Vec<Option<Person>>,
    pub(crate) bench: Vec<Option<Person>>,
    pub(crate) roster: BTreeMap<String, Option<Person>>,
    pub(crate) backups: Vec<Person>,
    pub(crate) home: Option<Address>,
    pub(crate) offices: Vec<Address>,
    pub(crate) sites: BTreeMap<String, Address>,
    pub(crate) history: VecDeque<Address>,
}

impl EntityKind for Team {
    const MODEL: &'static EntityModel = &TEAM_MODEL;
}

///
/// Node
/// Cascades into its own model, singly and as a list.
///

static NODE_FIELDS: [FieldModel; 3] = [
    FieldModel::property("label", FieldKind::Text),
    FieldModel::reference("next", &NODE_MODEL, RefOptions::new().cascade_read()),
    FieldModel::reference_list(
        "links",
        FieldKind::List(&NODE_KIND),
        RefListOptions::new().cascade_read(),
    ),
];

pub(crate) static NODE_MODEL: EntityModel =
    EntityModel::new("docmap::test_fixtures::Node", "node", &NODE_FIELDS).with_parent(&KEYED_MODEL);

#[derive(Clone, Debug, Default, FieldValues)]
pub(crate) struct Node {
    pub(crate) id: String,
    pub(crate) label: String,
    pub(crate) next: Option<Box<Node>>,
    pub(crate) links: Vec<Node>,
}

impl EntityKind for Node {
    const MODEL: &'static EntityModel = &NODE_MODEL;
}

///
/// Sample
/// One field per coercion rule.
///

static SAMPLE_FIELDS: [FieldModel; 19] = [
    FieldModel::property("byte_val", FieldKind::Primitive(ScalarKind::Byte)),
    FieldModel::property("short_val", FieldKind::Primitive(ScalarKind::Short)),
    FieldModel::property("int_val", FieldKind::Primitive(ScalarKind::Int)),
    FieldModel::property("long_val", FieldKind::Primitive(ScalarKind::Long)),
    FieldModel::property("float_val", FieldKind::Primitive(ScalarKind::Float)),
    FieldModel::property("double_val", FieldKind::Primitive(ScalarKind::Double)),
    FieldModel::property("flag", FieldKind::Primitive(ScalarKind::Bool)),
    FieldModel::property("initial", FieldKind::Primitive(ScalarKind::Char)),
    FieldModel::property("count", FieldKind::Boxed(ScalarKind::Int)),
    FieldModel::property_with("label", FieldKind::Text, PropertyOptions::named("lbl")),
    FieldModel::property("created", FieldKind::Date),
    FieldModel::property("updated", FieldKind::Timestamp),
    FieldModel::property("payload", FieldKind::Blob),
    FieldModel::property("scores", FieldKind::Array(&SHORT_KIND)),
    FieldModel::property("tags", FieldKind::List(&TEXT_KIND)),
    FieldModel::property("labels", FieldKind::Set(&TEXT_KIND)),
    FieldModel::property("pending", FieldKind::Queue(&LONG_KIND)),
    FieldModel::property("attrs", FieldKind::Map(&INT_KIND)),
    FieldModel::property("ratio", FieldKind::Boxed(ScalarKind::Float)),
];

pub(crate) static SAMPLE_MODEL: EntityModel =
    EntityModel::new("docmap::test_fixtures::Sample", "sample", &SAMPLE_FIELDS)
        .with_parent(&BASE_MODEL);

#[derive(Clone, Debug, Default, FieldValues)]
pub(crate) struct Sample {
    pub(crate) id: String,
    pub(crate) byte_val: i8,
    pub(crate) short_val: i16,
    pub(crate) int_val: i32,
    pub(crate) long_val: i64,
    pub(crate) float_val: f32,
    pub(crate) double_val: f64,
    pub(crate) flag: bool,
    pub(crate) initial: char,
    pub(crate) count: Option<i32>,
    pub(crate) label: String,
    pub(crate) created: Date,
    pub(crate) updated: Timestamp,
    pub(crate) payload: Blob,
    pub(crate) scores: Vec<i16>,
    pub(crate) tags: Vec<String>,
    pub(crate) labels: BTreeSet<String>,
    pub(crate) pending: VecDeque<i64>,
    pub(crate) attrs: BTreeMap<String, i32>,
    pub(crate) ratio: Option<f32>,
}

impl EntityKind for Sample {
    const MODEL: &'static EntityModel = &SAMPLE_MODEL;
}

///
/// Counter / Tag
/// Identity strategies other than generated.
///

static COUNTER_FIELDS: [FieldModel; 2] = [
    FieldModel::id("id", IdStrategy::Incrementing),
    FieldModel::property("hits", FieldKind::Primitive(ScalarKind::Long)),
];

pub(crate) static COUNTER_MODEL: EntityModel =
    EntityModel::new("docmap::test_fixtures::Counter", "counter", &COUNTER_FIELDS);

#[derive(Clone, Debug, Default, FieldValues)]
pub(crate) struct Counter {
    pub(crate) id: String,
    pub(crate) hits: i64,
}

impl EntityKind for Counter {
    const MODEL: &'static EntityModel = &COUNTER_MODEL;
}

static TAG_FIELDS: [FieldModel; 2] = [
    FieldModel::id("id", IdStrategy::UserDefined),
    FieldModel::property("label", FieldKind::Text),
];

pub(crate) static TAG_MODEL: EntityModel =
    EntityModel::new("docmap::test_fixtures::Tag", "tag", &TAG_FIELDS);

#[derive(Clone, Debug, Default, FieldValues)]
pub(crate) struct Tag {
    pub(crate) id: String,
    pub(crate) label: String,
}

impl EntityKind for Tag {
    const MODEL: &'static EntityModel = &TAG_MODEL;
}

///
/// DOCUMENTS
///

pub(crate) fn person_doc(id: &str, name: &str, age: i32) -> Document {
    Document::new()
        .with("_id", id)
        .with("name", name)
        .with("age", age)
}

pub(crate) fn person_ref(id: &str) -> DbRef {
    DbRef::new("person", id)
}

pub(crate) fn node_ref(id: &str) -> DbRef {
    DbRef::new("node", id)
}
