use docmap::{
    Error,
    config::OdmConfig,
    core::{
        index::{IndexError, Indexer},
        store::MemoryStore,
    },
    prelude::*,
};
use parking_lot::Mutex;
use std::sync::Arc;

///
/// ENTITIES
///

static PERSON_FIELDS: [FieldModel; 3] = [
    FieldModel::id("id", IdStrategy::UserDefined),
    FieldModel::property("name", FieldKind::Text),
    FieldModel::property("level", FieldKind::Primitive(ScalarKind::Int)),
];

static PERSON_MODEL: EntityModel = EntityModel::new("odm::Person", "person", &PERSON_FIELDS);

#[derive(Clone, Debug, Default, FieldValues)]
struct Person {
    id: String,
    name: String,
    level: i32,
}

impl EntityKind for Person {
    const MODEL: &'static EntityModel = &PERSON_MODEL;
}

static ARTICLE_FIELDS: [FieldModel; 4] = [
    FieldModel::id("id", IdStrategy::Generated),
    FieldModel::property("title", FieldKind::Text),
    FieldModel::property("draft", FieldKind::Primitive(ScalarKind::Bool)),
    FieldModel::reference(
        "author",
        &PERSON_MODEL,
        RefOptions::new().cascade_read().propagate_index(),
    ),
];

static ARTICLE_FILTERS: [IndexFilter; 1] = [IndexFilter::new("draft", Compare::Is, "false")];

static ARTICLE_MODEL: EntityModel = EntityModel::new("odm::Article", "article", &ARTICLE_FIELDS)
    .with_index_filters(&ARTICLE_FILTERS);

#[derive(Clone, Debug, Default, FieldValues)]
struct Article {
    id: String,
    title: String,
    draft: bool,
    author: Option<Person>,
}

impl EntityKind for Article {
    const MODEL: &'static EntityModel = &ARTICLE_MODEL;
}

static NOTE_FIELDS: [FieldModel; 3] = [
    FieldModel::id("id", IdStrategy::Generated),
    FieldModel::property("title", FieldKind::Text),
    FieldModel::reference("author", &PERSON_MODEL, RefOptions::new()),
];

static NOTE_MODEL: EntityModel = EntityModel::new("odm::Note", "note", &NOTE_FIELDS);

#[derive(Clone, Debug, Default, FieldValues)]
struct Note {
    id: String,
    title: String,
    author: Option<Person>,
}

impl EntityKind for Note {
    const MODEL: &'static EntityModel = &NOTE_MODEL;
}

///
/// SETUP
///

#[derive(Debug, Default)]
struct RecordingIndexer {
    calls: Mutex<Vec<String>>,
}

impl Indexer for RecordingIndexer {
    fn update(&self, entity: &dyn Entity) -> Result<(), IndexError> {
        let title = match entity.get_value("title") {
            Some(FieldValue::Text(title)) => title,
            _ => String::new(),
        };
        self.calls.lock().push(format!("update:{title}"));

        Ok(())
    }

    fn remove(&self, model: &'static EntityModel, id: &str) -> Result<(), IndexError> {
        self.calls.lock().push(format!("remove:{}:{id}", model.name));

        Ok(())
    }
}

struct Harness {
    odm: Odm,
    store: Arc<MemoryStore>,
    indexer: Arc<RecordingIndexer>,
}

fn harness() -> Harness {
    let store = Arc::new(MemoryStore::new());
    let indexer = Arc::new(RecordingIndexer::default());
    let odm = Odm::new(
        OdmConfig::default(),
        Arc::clone(&store) as Arc<dyn DocumentStore>,
        Arc::clone(&indexer) as Arc<dyn Indexer>,
    )
    .unwrap();
    odm.register::<Person>()
        .register::<Article>()
        .register::<Note>();

    store
        .insert(
            "person",
            &Document::new()
                .with("_id", "P7")
                .with("name", "gus")
                .with("level", 3),
        )
        .unwrap();

    Harness {
        odm,
        store,
        indexer,
    }
}

fn authored(id: &str, title: &str, author: &str) -> Document {
    Document::new()
        .with("_id", id)
        .with("title", title)
        .with("author", DbRef::new("person", author))
}

///
/// TESTS
///

#[test]
fn cascading_author_is_fetched_once() {
    let h = harness();

    let article: Article = h.odm.mapper().from_document(&authored("A1", "Hello", "P7"));

    assert_eq!(article.id, "A1");
    assert_eq!(article.title, "Hello");
    let author = article.author.expect("author");
    assert_eq!(author.id, "P7");
    assert_eq!(author.name, "gus");
    assert_eq!(author.level, 3);
    assert_eq!(h.store.stats().fetches(), 1);
}

#[test]
fn lazy_author_is_a_stub() {
    let h = harness();

    let note: Note = h.odm.mapper().from_document(&authored("N1", "Hello", "P7"));

    let author = note.author.expect("author");
    assert_eq!(author.id, "P7");
    assert_eq!(author.name, "");
    assert_eq!(h.store.stats().fetches(), 0);
}

#[test]
fn entity_changed_reindexes_each_referencing_article() {
    let h = harness();
    for doc in [
        authored("A1", "one", "P7"),
        authored("A2", "two", "P7").with("draft", true),
        authored("A3", "three", "P1"),
    ] {
        h.store.insert("article", &doc).unwrap();
    }
    h.store.insert("note", &authored("N1", "note", "P7")).unwrap();

    let submitted = h.odm.entity_changed::<Person>("P7").unwrap();
    let stats = h.odm.shutdown();

    assert_eq!(submitted, 2);
    assert_eq!(stats.submitted, 2);
    assert_eq!(stats.completed, 2);

    let mut calls = h.indexer.calls.lock().clone();
    calls.sort();
    assert_eq!(calls, ["remove:article:A2", "update:one"]);
}

#[test]
fn stored_document_reads_back_by_id() {
    let h = harness();
    let id = ObjectId::from_parts(1_700_000_000_000, 1).to_string();
    let article = Article {
        id: id.clone(),
        title: "saved".into(),
        draft: false,
        author: Some(Person {
            id: "P7".into(),
            ..Person::default()
        }),
    };

    let doc = h.odm.mapper().to_document(&article).unwrap();
    assert_eq!(doc.get("author"), Some(&Value::Ref(DbRef::new("person", "P7"))));
    h.store.insert("article", &doc).unwrap();

    let loaded: Article = h.odm.mapper().find_by_id(&id).unwrap().expect("article");

    assert_eq!(loaded.id, id);
    assert_eq!(loaded.title, "saved");
    assert_eq!(loaded.author.expect("author").name, "gus");
    assert_eq!(h.odm.mapper().count::<Article>(&Filter::All).unwrap(), 1);
}

#[test]
fn invalid_config_is_refused() {
    let mut config = OdmConfig::default();
    config.index.queue_capacity = 0;

    let err = Odm::new(
        config,
        Arc::new(MemoryStore::new()),
        Arc::new(RecordingIndexer::default()),
    )
    .err()
    .expect("config error");

    assert!(matches!(err, Error::Config(_)));
}
