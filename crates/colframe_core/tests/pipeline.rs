use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::NaiveDate;
use colframe_core::agg::{count_false, count_true, median, sum};
use colframe_core::builder::ingest::FrameIngest;
use colframe_core::builder::registry::{ColumnBuilders, ColumnType};
use colframe_core::config::EngineConfig;
use colframe_core::expr::condition::{ge, is_not_null};
use colframe_core::expr::map::DoubleExp1;
use colframe_core::expr::sorter::Sorter;
use colframe_core::expr::{col, lit};
use colframe_core::frame::mapped::row_mapper;
use colframe_core::scalar::decimal::Decimal;
use colframe_core::{DataFrame, DataType, Index, ScalarValue};

fn people() -> DataFrame {
    let mut conf = EngineConfig::default();
    conf.set_from_scalar("date_format", "%d/%m/%Y".into()).unwrap();

    let rules = ColumnBuilders::new()
        .column_type("age", ColumnType::Int32)
        .column_type("score", ColumnType::Int64)
        .column_type("score", ColumnType::Decimal)
        .column_type("joined", ColumnType::Date(None))
        .column_type("active", ColumnType::Boolean);

    let index = Index::for_labels(["name", "age", "score", "joined", "active"]).unwrap();
    let mut ingest = FrameIngest::new(index, &rules, &conf).unwrap();
    for record in [
        ["ann", "31", "1.0", "01/02/2020", "true"],
        ["bob", "42", "", "15/06/2021", "false"],
        ["cid", "25", "1.3", "", "true"],
        ["dee", "58", "2.0", "30/11/2019", ""],
    ] {
        ingest.add_record(&record).unwrap();
    }
    ingest.finish().unwrap()
}

#[test]
fn ingest_chain_aggregate() {
    logutil::init_test();

    let df = people();
    assert_eq!(4, df.height().unwrap());
    assert_eq!(DataType::Decimal, df.column("score").unwrap().datatype());
    assert_eq!(
        ScalarValue::Date(NaiveDate::from_ymd_opt(2021, 6, 15).unwrap()),
        df.get("joined", 1).unwrap()
    );

    let adults = df
        .filter(|row| Ok(row.get_by_name("age")?.try_as_i64()? >= 30))
        .map_column("name", |row| Ok(row.get(0)?.try_as_str()?.to_uppercase().into()))
        .unwrap()
        .materialize();

    assert_eq!(3, adults.height().unwrap());
    assert_eq!(ScalarValue::from("BOB"), adults.get("name", 1).unwrap());

    let totals = adults
        .agg(&[
            sum(col("age")),
            median(col("score")),
            count_true(col("active")),
            count_false(col("active")),
        ])
        .unwrap();

    assert_eq!(
        vec![vec![
            ScalarValue::Int64(131),
            ScalarValue::Decimal(Decimal::parse("1.5").unwrap()),
            ScalarValue::Int64(1),
            ScalarValue::Int64(1),
        ]],
        totals.to_rows().unwrap()
    );
}

#[test]
fn expressions_over_ingested_frame() {
    let df = people();

    let scored = df.select_rows(is_not_null(col("score")).as_ref()).unwrap();
    assert_eq!(3, scored.height().unwrap());

    let older = df.select_rows(ge(col("age"), lit(42)).as_ref()).unwrap();
    let names: Vec<_> = older.column("name").unwrap().to_values();
    assert_eq!(vec![ScalarValue::from("bob"), "dee".into()], names);

    let halved = df
        .with_column("half_age", &DoubleExp1::map_val("half", col("age"), |v| v / 2.0))
        .unwrap();
    assert_eq!(ScalarValue::Float64(12.5), halved.get("half_age", 2).unwrap());

    let sorted = df.sort(&[Sorter::desc(col("score"))]).unwrap();
    let names: Vec<_> = sorted.column("name").unwrap().to_values();
    assert_eq!(
        vec![ScalarValue::from("dee"), "cid".into(), "ann".into(), "bob".into()],
        names
    );
}

#[test]
fn concurrent_first_access_builds_once() {
    logutil::init_test();

    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();

    let source = DataFrame::from_rows(
        Index::for_labels(["a"]).unwrap(),
        (0..100_i64).map(|v| vec![ScalarValue::Int64(v)]),
    )
    .unwrap();

    let mapped = source.map(
        Index::for_labels(["a", "b"]).unwrap(),
        row_mapper(move |from, to| {
            counter.fetch_add(1, Ordering::SeqCst);
            let a = from.get(0)?.try_as_i64()?;
            to.set(0, a)?.set(1, a * 2)?;
            Ok(())
        }),
    );

    let materialized = mapped.materialize();
    assert!(materialized.ptr_eq(&materialized.materialize()));

    std::thread::scope(|s| {
        for _ in 0..8 {
            s.spawn(|| {
                let rows = materialized.to_rows().unwrap();
                assert_eq!(100, rows.len());
                assert_eq!(vec![ScalarValue::Int64(99), ScalarValue::Int64(198)], rows[99]);
            });
        }
    });

    assert_eq!(100, calls.load(Ordering::SeqCst));

    // The lazy chain reruns the mapper on every scan.
    mapped.to_rows().unwrap();
    assert_eq!(200, calls.load(Ordering::SeqCst));
}

#[test]
fn hconcat_and_head() {
    let left = DataFrame::from_rows(
        Index::for_labels(["a"]).unwrap(),
        vec![vec![ScalarValue::Int32(1)], vec![ScalarValue::Int32(2)]],
    )
    .unwrap();
    let right = DataFrame::from_rows(
        Index::for_labels(["b"]).unwrap(),
        vec![vec![ScalarValue::Int32(10)]],
    )
    .unwrap();

    let zipped = left.hconcat(&right);
    assert_eq!(
        vec![vec![ScalarValue::Int32(1), ScalarValue::Int32(10)]],
        zipped.to_rows().unwrap()
    );

    let doubled = left.hconcat(&left);
    assert_eq!(vec!["a", "a_"], doubled.columns().labels().collect::<Vec<_>>());
    assert_eq!(2, doubled.head(5).height().unwrap());
    assert_eq!(1, doubled.head(1).height().unwrap());
}
