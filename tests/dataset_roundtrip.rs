//! End-to-end exercise over small deterministic files: read raw
//! delimited data, bind roles, remap identifiers, split, and export.

use std::fs;
use std::path::Path;

use recdata::data::format::{from_inline, from_tabular, RoleSpec};
use recdata::filters::{Context, ContextValue, Filter, FilterPipeline, HoldOut};
use recdata::io::read::{read_tsv, read_txt};
use recdata::io::write::{ColumnChoice, ExportOptions};
use recdata::{Error, Value};

fn write_sample(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("interactions.tsv");
    let mut lines = vec!["user\titem\tscore".to_string()];
    for user in 1..=4 {
        for item in 0..6 {
            lines.push(format!("u{user}\ti{item}\t{}", (user + item) % 5 + 1));
        }
    }
    fs::write(&path, lines.join("\n")).unwrap();
    path
}

#[test]
fn tabular_read_map_split_export() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_sample(dir.path());

    let raw = read_tsv(&path, Some(0)).unwrap();
    assert_eq!(raw.len(), 24);

    let spec = RoleSpec::new().user("user").item("item").rating("score");
    let mut dataset = from_tabular(&raw, &spec).unwrap();
    assert_eq!(dataset.user_col(), Some("user_id"));
    assert_eq!(dataset.n_users().unwrap(), 4);
    assert_eq!(dataset.n_items().unwrap(), 6);

    // remap to dense ids and back
    dataset.map_users_and_items(0, true).unwrap();
    let public = dataset.data().clone();
    dataset.to_private().unwrap();
    assert!(dataset.is_private());
    let ids: Vec<Value> = dataset.data().distinct(0);
    assert_eq!(ids, (0..4).map(Value::Int).collect::<Vec<_>>());
    dataset.to_public().unwrap();
    assert_eq!(dataset.data(), &public);

    // split per user, deterministically
    let mut holdout = HoldOut::new().test_ratio(0.5).unwrap().seed(7);
    let split = holdout.split(&dataset).unwrap();
    assert_eq!(split.test.data().len(), 12);
    assert_eq!(split.train.data().len(), 12);
    assert!(holdout.succeeded());

    // export train with ratings under a custom label
    let out = dir.path().join("splits").join("train.tsv");
    let options = ExportOptions::tsv()
        .with_rating(ColumnChoice::Renamed("relevance".to_string()));
    assert!(matches!(
        split.train.export(&out, &options),
        Err(Error::DirectoryNotFound(_))
    ));
    split
        .train
        .export(&out, &options.clone().force_create(true))
        .unwrap();

    let reread = read_tsv(&out, Some(0)).unwrap();
    assert_eq!(reread.len(), 12);
    assert_eq!(
        reread.header(),
        Some(&["user_id".to_string(), "item_id".into(), "relevance".into()][..])
    );
}

#[test]
fn inline_read_expands_and_exports_implicit_ratings() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("adjacency.txt");
    fs::write(&path, "7 10 11 12\n8 13\n").unwrap();

    let raw = read_txt(&path, None).unwrap();
    let dataset = from_inline(&raw).unwrap();
    assert_eq!(dataset.data().len(), 4);
    assert!(dataset.is_implicit());

    let out = dir.path().join("dataset.tsv");
    let options = ExportOptions::tsv().with_rating(ColumnChoice::Keep);
    dataset.export(&out, &options).unwrap();

    let written = fs::read_to_string(&out).unwrap();
    assert_eq!(
        written,
        "user_id\titem_id\trating\n7\t10\t1\n7\t11\t1\n7\t12\t1\n8\t13\t1\n"
    );
}

#[test]
fn pipeline_binarizes_then_splits() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_sample(dir.path());

    let raw = read_tsv(&path, Some(0)).unwrap();
    let spec = RoleSpec::new().user("user").item("item").rating("score");
    let dataset = from_tabular(&raw, &spec).unwrap();

    let mut pipeline = FilterPipeline::new(vec![
        Box::new(recdata::filters::BinarizeRatings::new(3.0).unwrap()),
        Box::new(HoldOut::new().test_ratio(0.5).unwrap()),
    ]);
    let mut ctx = Context::new();
    ctx.insert("data".to_string(), ContextValue::Data(dataset));
    let out = pipeline.apply(ctx).unwrap();
    assert!(pipeline.succeeded());

    let train = match &out["train"] {
        ContextValue::Data(dataset) => dataset,
        _ => panic!("expected a dataset under 'train'"),
    };
    assert_eq!(train.data().len(), 12);
    // ratings in the threaded dataset are now binary
    let rating_index = train.data().column_index("rating").unwrap();
    assert!(train
        .data()
        .column(rating_index)
        .all(|v| *v == Value::Int(0) || *v == Value::Int(1)));
}

#[test]
fn repeated_splits_with_same_seed_export_identically() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_sample(dir.path());
    let raw = read_tsv(&path, Some(0)).unwrap();
    let spec = RoleSpec::new().user("user").item("item").rating("score");

    let run_split = |seed: u64, out_name: &str| {
        let dataset = from_tabular(&raw, &spec).unwrap();
        let mut holdout = HoldOut::new()
            .test_ratio(0.2)
            .unwrap()
            .val_ratio(0.25)
            .unwrap()
            .seed(seed);
        let split = holdout.split(&dataset).unwrap();
        let out = dir.path().join(out_name);
        split.test.export(&out, &ExportOptions::tsv()).unwrap();
        fs::read_to_string(out).unwrap()
    };

    assert_eq!(run_split(11, "a.tsv"), run_split(11, "b.tsv"));
    assert_ne!(run_split(11, "c.tsv"), run_split(12, "d.tsv"));
}
