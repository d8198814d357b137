use sediment::collection::{sized, Property, Schema, ValueKind};
use sediment::doc;
use sediment::errors::SedimentResult;
use sediment::Sediment;

fn main() -> SedimentResult<()> {
    println!("Starting stress test...");
    let db = Sediment::builder().open()?;

    let users = db.model(
        Schema::builder("users")
            .property(Property::new("email").kind(ValueKind::String).required().unique())
            .property(Property::new("city").kind(ValueKind::String).secondary())
            .property(Property::new("created").order())
            .build(),
    )?;

    let count = 100000;
    let start = std::time::Instant::now();
    for i in 0..count {
        users.insert(&doc! {
            "email": format!("user-{}@example.com", i),
            "city": format!("city-{}", i % 50),
        })?;
    }
    println!("Inserted {} documents in {:?}", count, start.elapsed());

    let start = std::time::Instant::now();
    let mut fetched = 0;
    for i in 0..count {
        if users
            .get_by("email", format!("user-{}@example.com", i))?
            .is_some()
        {
            fetched += 1;
        }
    }
    println!("Fetched {} documents by email in {:?}", fetched, start.elapsed());

    let start = std::time::Instant::now();
    let mut listed = 0;
    let mut page = 1;
    loop {
        let batch = users.list(&sized(1000).page(page))?;
        if batch.is_empty() {
            break;
        }
        listed += batch.len();
        page += 1;
    }
    println!("Listed {} documents in {:?}", listed, start.elapsed());

    db.close()?;
    Ok(())
}
