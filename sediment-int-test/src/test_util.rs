use sediment::collection::{Property, Schema, ValueKind};
use sediment::common::{Defaults, DefaultsProvider};
use sediment::errors::SedimentResult;
use sediment::Sediment;
use std::sync::atomic::{AtomicI64, Ordering};

/// Deterministic defaults: ids "id-1", "id-2", ... and a strictly
/// increasing millisecond clock starting at 1000.
pub struct SeqDefaults {
    ids: AtomicI64,
    clock: AtomicI64,
}

impl SeqDefaults {
    pub fn new() -> Self {
        SeqDefaults {
            ids: AtomicI64::new(0),
            clock: AtomicI64::new(1000),
        }
    }
}

impl Default for SeqDefaults {
    fn default() -> Self {
        SeqDefaults::new()
    }
}

impl DefaultsProvider for SeqDefaults {
    fn uuid(&self) -> String {
        format!("id-{}", self.ids.fetch_add(1, Ordering::SeqCst) + 1)
    }

    fn timestamp(&self) -> i64 {
        self.clock.fetch_add(1, Ordering::SeqCst)
    }
}

#[derive(Clone)]
pub struct TestContext {
    db: Sediment,
}

impl TestContext {
    pub fn db(&self) -> Sediment {
        self.db.clone()
    }
}

/// Opens a fresh in-memory instance with deterministic defaults.
pub fn create_test_context() -> SedimentResult<TestContext> {
    let db = Sediment::builder()
        .defaults(Defaults::new(SeqDefaults::new()))
        .open()?;
    Ok(TestContext { db })
}

/// Opens a fresh in-memory instance with the standard (random/wall-clock)
/// defaults, for tests that exercise real id generation.
pub fn create_standard_context() -> SedimentResult<TestContext> {
    let db = Sediment::builder().open()?;
    Ok(TestContext { db })
}

/// Runs a test against a fresh context and closes the instance afterwards,
/// also when the test body fails.
pub fn run_test<T>(test: T)
where
    T: FnOnce(TestContext) -> SedimentResult<()>,
{
    let ctx = create_test_context().expect("failed to create test context");
    let result = test(ctx.clone());
    let _ = ctx.db().close();
    if let Err(e) = result {
        panic!("test failed: {:?}", e);
    }
}

/// The schema most tests use: a unique email, a secondary city bucket, and
/// a chronological listing over `created`.
pub fn users_schema() -> Schema {
    Schema::builder("users")
        .property(Property::new("email").kind(ValueKind::String).required().unique())
        .property(Property::new("name").kind(ValueKind::String))
        .property(Property::new("city").kind(ValueKind::String).secondary())
        .property(Property::new("created").order())
        .build()
}

/// A schema with a reference to `users`, for grouping tests.
pub fn posts_schema() -> Schema {
    Schema::builder("posts")
        .property(Property::new("title").kind(ValueKind::String).required())
        .property(Property::new("author").required().reference("users"))
        .property(Property::new("created").order())
        .build()
}
