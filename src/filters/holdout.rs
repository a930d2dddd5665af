use std::collections::HashMap;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::data::dataset::{Interactions, Role};
use crate::data::value::Value;
use crate::error::{Error, Result};
use crate::filters::{Context, ContextValue, Filter};

// ---------------------------------------------------------------------------
// HoldOut – per-group stratified train/validation/test split
// ---------------------------------------------------------------------------

/// The three partitions produced by [`HoldOut::split`].
#[derive(Debug, Clone)]
pub struct Split {
    pub train: Interactions,
    pub val: Interactions,
    pub test: Interactions,
}

/// Splits every group (by default: every user) independently, so each
/// group is represented proportionally in all partitions.
///
/// Ratios apply sequentially: `test_ratio` is taken from the whole group,
/// `val_ratio` from what is left for training. Held-out counts round
/// down, so a group too small for a non-zero ratio keeps all its rows in
/// train — a group with any rows is never absent from the training
/// partition.
///
/// Shuffling is seeded per group from `seed`, making identical inputs
/// produce identical partitions.
#[derive(Debug, Clone)]
pub struct HoldOut {
    group_col: Option<String>,
    test_ratio: f64,
    val_ratio: f64,
    seed: u64,
    succeeded: bool,
}

impl Default for HoldOut {
    fn default() -> Self {
        HoldOut::new()
    }
}

impl HoldOut {
    /// A splitter with both ratios at 0 grouping on the user role.
    pub fn new() -> Self {
        HoldOut {
            group_col: None,
            test_ratio: 0.0,
            val_ratio: 0.0,
            seed: 42,
            succeeded: false,
        }
    }

    /// Fraction of each group held out for test. Validated on assignment.
    pub fn test_ratio(mut self, ratio: f64) -> Result<Self> {
        check_ratio(ratio)?;
        self.test_ratio = ratio;
        Ok(self)
    }

    /// Fraction of each group's post-test training rows held out for
    /// validation. Validated on assignment.
    pub fn val_ratio(mut self, ratio: f64) -> Result<Self> {
        check_ratio(ratio)?;
        self.val_ratio = ratio;
        Ok(self)
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Group on an explicit column instead of the user role.
    pub fn group_by(mut self, column: impl Into<String>) -> Self {
        self.group_col = Some(column.into());
        self
    }

    /// Partition the dataset into train/validation/test.
    pub fn split(&mut self, dataset: &Interactions) -> Result<Split> {
        let frame = dataset.data();
        let group_index = match &self.group_col {
            Some(name) => frame
                .column_index(name)
                .ok_or_else(|| Error::ColumnNotFound(name.clone().into()))?,
            None => dataset.role_index(Role::User)?,
        };

        // group rows by value, keeping first-seen group order
        let mut groups: HashMap<&Value, Vec<usize>> = HashMap::new();
        let mut order: Vec<&Value> = Vec::new();
        for (row, value) in frame.column(group_index).enumerate() {
            groups
                .entry(value)
                .or_insert_with(|| {
                    order.push(value);
                    Vec::new()
                })
                .push(row);
        }

        let mut train_rows = Vec::new();
        let mut val_rows = Vec::new();
        let mut test_rows = Vec::new();

        for (nth, value) in order.iter().enumerate() {
            let mut rows = groups[value].clone();
            let mut rng = ChaCha8Rng::seed_from_u64(self.seed ^ nth as u64);
            rows.shuffle(&mut rng);

            let n_test = (rows.len() as f64 * self.test_ratio).floor() as usize;
            let (test, rest) = rows.split_at(n_test);
            let n_val = (rest.len() as f64 * self.val_ratio).floor() as usize;
            let (val, train) = rest.split_at(n_val);

            test_rows.extend_from_slice(test);
            val_rows.extend_from_slice(val);
            train_rows.extend_from_slice(train);
        }

        self.succeeded =
            train_rows.len() + val_rows.len() + test_rows.len() == frame.len();
        Ok(Split {
            train: dataset.derive(frame.select_rows(&train_rows)),
            val: dataset.derive(frame.select_rows(&val_rows)),
            test: dataset.derive(frame.select_rows(&test_rows)),
        })
    }
}

fn check_ratio(ratio: f64) -> Result<()> {
    if (0.0..=1.0).contains(&ratio) {
        Ok(())
    } else {
        Err(Error::RatioOutOfRange(ratio))
    }
}

impl Filter for HoldOut {
    /// Context contract: reads `data`, writes `train`, `val`, `test`.
    fn apply(&mut self, mut ctx: Context) -> Result<Context> {
        let split = match ctx.get("data") {
            Some(ContextValue::Data(dataset)) => self.split(dataset)?,
            _ => return Err(Error::FilterInput("data".to_string())),
        };
        ctx.insert("train".to_string(), ContextValue::Data(split.train));
        ctx.insert("val".to_string(), ContextValue::Data(split.val));
        ctx.insert("test".to_string(), ContextValue::Data(split.test));
        Ok(ctx)
    }

    fn succeeded(&self) -> bool {
        self.succeeded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::frame::Frame;

    /// 2 users × 10 interactions each.
    fn two_groups() -> Interactions {
        let mut frame = Frame::new(vec!["user_id".into(), "item_id".into()]);
        for user in [1, 2] {
            for item in 0..10 {
                frame
                    .push_row(vec![Value::Int(user), Value::Int(item)])
                    .unwrap();
            }
        }
        Interactions::new(frame)
    }

    fn sorted_rows(dataset: &Interactions) -> Vec<Vec<Value>> {
        let mut rows = dataset.data().rows().to_vec();
        rows.sort();
        rows
    }

    #[test]
    fn ratios_are_validated_on_assignment() {
        assert!(matches!(
            HoldOut::new().test_ratio(1.5),
            Err(Error::RatioOutOfRange(_))
        ));
        assert!(matches!(
            HoldOut::new().val_ratio(-0.1),
            Err(Error::RatioOutOfRange(_))
        ));
    }

    #[test]
    fn sequential_ratios_partition_each_group() {
        let dataset = two_groups();
        let mut holdout = HoldOut::new()
            .test_ratio(0.2)
            .unwrap()
            .val_ratio(0.25)
            .unwrap();
        let split = holdout.split(&dataset).unwrap();
        // per group: 2 test, then 2 of the remaining 8 for validation
        assert_eq!(split.test.data().len(), 4);
        assert_eq!(split.val.data().len(), 4);
        assert_eq!(split.train.data().len(), 12);
        assert!(holdout.succeeded());
    }

    #[test]
    fn same_seed_reproduces_partitions() {
        let dataset = two_groups();
        let mut first = HoldOut::new()
            .test_ratio(0.2)
            .unwrap()
            .val_ratio(0.25)
            .unwrap();
        let mut second = first.clone();
        let a = first.split(&dataset).unwrap();
        let b = second.split(&dataset).unwrap();
        assert_eq!(a.train.data(), b.train.data());
        assert_eq!(a.val.data(), b.val.data());
        assert_eq!(a.test.data(), b.test.data());
    }

    #[test]
    fn union_reconstructs_the_table() {
        let dataset = two_groups();
        let mut holdout = HoldOut::new()
            .test_ratio(0.2)
            .unwrap()
            .val_ratio(0.25)
            .unwrap();
        let split = holdout.split(&dataset).unwrap();
        let mut rows = Vec::new();
        rows.extend(split.train.data().rows().to_vec());
        rows.extend(split.val.data().rows().to_vec());
        rows.extend(split.test.data().rows().to_vec());
        rows.sort();
        assert_eq!(rows, sorted_rows(&dataset));
    }

    #[test]
    fn different_seeds_usually_differ() {
        let dataset = two_groups();
        let mut a = HoldOut::new().test_ratio(0.5).unwrap().seed(1);
        let mut b = HoldOut::new().test_ratio(0.5).unwrap().seed(2);
        let sa = a.split(&dataset).unwrap();
        let sb = b.split(&dataset).unwrap();
        assert_ne!(sa.test.data(), sb.test.data());
    }

    #[test]
    fn single_row_group_stays_in_train() {
        let frame = Frame::from_rows(
            vec!["user_id".into(), "item_id".into()],
            vec![vec![Value::Int(1), Value::Int(10)]],
        )
        .unwrap();
        let dataset = Interactions::new(frame);
        let mut holdout = HoldOut::new().test_ratio(0.5).unwrap();
        let split = holdout.split(&dataset).unwrap();
        assert_eq!(split.train.data().len(), 1);
        assert_eq!(split.test.data().len(), 0);
        assert!(holdout.succeeded());
    }

    #[test]
    fn grouping_column_can_be_explicit() {
        let frame = Frame::from_rows(
            vec!["session".into(), "item_id".into()],
            vec![
                vec![Value::Int(1), Value::Int(10)],
                vec![Value::Int(1), Value::Int(11)],
                vec![Value::Int(2), Value::Int(12)],
                vec![Value::Int(2), Value::Int(13)],
            ],
        )
        .unwrap();
        let dataset = Interactions::new(frame);
        let mut holdout = HoldOut::new().group_by("session").test_ratio(0.5).unwrap();
        let split = holdout.split(&dataset).unwrap();
        assert_eq!(split.test.data().len(), 2);
        assert_eq!(split.train.data().len(), 2);
    }

    #[test]
    fn splitter_without_user_role_fails() {
        let frame = Frame::new(vec!["a".into(), "b".into()]);
        let dataset = Interactions::new(frame);
        let mut holdout = HoldOut::new();
        assert!(matches!(
            holdout.split(&dataset),
            Err(Error::RoleColumnMissing(Role::User))
        ));
    }

    #[test]
    fn derived_partitions_inherit_role_metadata() {
        let dataset = two_groups();
        let mut holdout = HoldOut::new().test_ratio(0.2).unwrap();
        let split = holdout.split(&dataset).unwrap();
        assert_eq!(split.train.user_col(), Some("user_id"));
        assert_eq!(split.train.item_col(), Some("item_id"));
    }
}
