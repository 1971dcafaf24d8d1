//! Bulk-insert timing through the batched mutation surface.

use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;

use quarry::prelude::*;

#[derive(Parser)]
#[command(name = "bench", about = "Bulk-insert timing for quarry")]
struct Args {
    /// Number of rows to insert.
    #[arg(long, default_value_t = 100_000)]
    rows: usize,

    /// Database file; in-memory when omitted.
    #[arg(long)]
    path: Option<PathBuf>,
}

struct Sample {
    id: i64,
    label: String,
    score: f64,
}

impl FromRow for Sample {
    fn from_row(row: &RowView<'_>) -> MaterializeResult<Self> {
        Ok(Self {
            id: row.get("id")?,
            label: row.get("label")?,
            score: row.get("score")?,
        })
    }
}

impl Entity for Sample {
    fn descriptor() -> TableDescriptor {
        TableDescriptor::new("Sample")
            .table("samples")
            .column(
                ColumnDescriptor::new("id", DeclaredType::BigInt)
                    .primary_key()
                    .auto_increment(),
            )
            .column(ColumnDescriptor::new("label", DeclaredType::Text).required())
            .column(ColumnDescriptor::new("score", DeclaredType::Real))
    }

    fn values(&self) -> Vec<Value> {
        vec![self.id.into(), self.label.clone().into(), self.score.into()]
    }

    fn key_assigned(&mut self, key: i64) {
        self.id = key;
    }
}

fn main() -> Result<(), Error> {
    let args = Args::parse();
    let db = match &args.path {
        Some(path) => Database::open(path)?,
        None => Database::open_in_memory()?,
    };
    db.create_table::<Sample>()?;

    let mut rows: Vec<Sample> = (0..args.rows)
        .map(|i| Sample {
            id: 0,
            label: format!("row-{i}"),
            score: i as f64 / 7.0,
        })
        .collect();

    let started = Instant::now();
    db.insert_all(&mut rows)?;
    let elapsed = started.elapsed();
    println!(
        "inserted {} rows in {:.3}s ({:.0} rows/s)",
        rows.len(),
        elapsed.as_secs_f64(),
        rows.len() as f64 / elapsed.as_secs_f64(),
    );

    let count = db.table::<Sample>().count()?;
    println!("row count: {count}");
    Ok(())
}
