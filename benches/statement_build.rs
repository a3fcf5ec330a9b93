//! Criterion benchmarks for statement assembly, plus a single-row lookup through
//! the facade against raw `rusqlite` to show execution overhead.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rusqlite::{Connection, params};
use sql_fluent::prelude::*;

const ROWS: i64 = 1_000;

fn select_with_predicates(predicates: usize) -> StatementBuilder {
    let mut builder = StatementBuilder::with_seed(42);
    builder
        .from_aliased("orders", "o")
        .left_join(("customers", "c"), "c.id = o.customer_id")
        .select(["o.id", "o.price", "c.name"])
        .expect("valid projection")
        .order_by("o.price", "desc")
        .expect("valid direction")
        .limit_offset(50, 100);
    for i in 0..predicates {
        builder
            .and_where("o.product_id", "!=", i64::try_from(i).unwrap_or_default())
            .expect("valid operator");
    }
    builder
}

fn insert_batch(rows: usize) -> StatementBuilder {
    let batch: Vec<Vec<(&str, RowValues)>> = (0..rows)
        .map(|i| {
            let i = i64::try_from(i).unwrap_or_default();
            vec![
                ("customer_id", RowValues::Int(i % 17)),
                ("product_id", RowValues::Int(i % 5)),
                ("price", RowValues::Float(1.5)),
            ]
        })
        .collect();
    let mut builder = StatementBuilder::new();
    builder.from("orders").set_insert(batch).expect("uniform rows");
    builder
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");
    for predicates in [1usize, 8, 32] {
        let builder = select_with_predicates(predicates);
        group.throughput(Throughput::Elements(predicates as u64));
        group.bench_with_input(
            BenchmarkId::new("select_predicates", predicates),
            &builder,
            |b, builder| b.iter(|| black_box(builder.build().expect("builds"))),
        );
    }
    for rows in [1usize, 100, 1_000] {
        let builder = insert_batch(rows);
        group.throughput(Throughput::Elements(rows as u64));
        group.bench_with_input(BenchmarkId::new("insert_rows", rows), &builder, |b, builder| {
            b.iter(|| black_box(builder.build().expect("builds")));
        });
    }
    group.finish();
}

fn seeded_database() -> Database<SqliteBackend> {
    let mut db = Database::sqlite_builder(":memory:")
        .build()
        .expect("open in-memory database");
    db.run("CREATE TABLE orders (id INTEGER PRIMARY KEY, customer_id INTEGER, product_id INTEGER, price REAL)")
        .expect("create table");
    let builder = insert_batch(usize::try_from(ROWS).unwrap_or_default());
    db.insert(&builder).expect("seed rows");
    db
}

fn shuffled_ids() -> Vec<i64> {
    let mut ids: Vec<i64> = (1..=ROWS).collect();
    ids.shuffle(&mut StdRng::seed_from_u64(1_234_567_890));
    ids
}

fn bench_lookup(c: &mut Criterion) {
    let ids = shuffled_ids();
    let mut group = c.benchmark_group("single_row_lookup");

    let mut db = seeded_database();
    group.bench_function("sql_fluent", |b| {
        let mut cursor = ids.iter().cycle();
        b.iter(|| {
            let id = *cursor.next().unwrap_or(&1);
            black_box(db.from("orders").find(id).expect("lookup"))
        });
    });

    let raw = seeded_database().into_backend().into_connection();
    group.bench_function("rusqlite", |b| {
        let mut cursor = ids.iter().cycle();
        let mut stmt = raw
            .prepare_cached("SELECT id, price FROM orders WHERE id = ?1")
            .expect("prepare");
        b.iter(|| {
            let id = *cursor.next().unwrap_or(&1);
            let price: f64 = stmt
                .query_row(params![id], |row| row.get(1))
                .expect("row");
            black_box(price)
        });
    });
    group.finish();
}

criterion_group!(benches, bench_build, bench_lookup);
criterion_main!(benches);
