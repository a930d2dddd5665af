use log::debug;

use crate::data::dataset::{Interactions, Role};
use crate::data::frame::Frame;
use crate::data::value::Value;
use crate::error::{Error, Result};
use crate::filters::{get_text, take_table, Context, ContextValue, Filter};

// ---------------------------------------------------------------------------
// Binarize – threshold a numeric column into two levels
// ---------------------------------------------------------------------------

/// Derives a binary column from a numeric one: cells `≥ threshold` become
/// `over`, everything else (including non-numeric cells) becomes `under`.
/// With `drop` the source column is removed afterwards; with `replace` the
/// derived column takes over the source column's name.
///
/// Thresholds and bounds are validated at construction. Mutation is
/// explicit: [`Binarize::apply_to`] rewrites a table in place, while
/// [`Binarize::applied`] leaves the input untouched and returns a copy.
#[derive(Debug, Clone)]
pub struct Binarize {
    threshold: f64,
    over: f64,
    under: f64,
    drop: bool,
    replace: bool,
    succeeded: bool,
}

impl Binarize {
    /// A binarizer mapping to 1 above `threshold` and 0 below, dropping
    /// and replacing the source column.
    pub fn new(threshold: f64) -> Result<Self> {
        if !threshold.is_finite() {
            return Err(Error::NonFiniteBound(threshold));
        }
        Ok(Binarize {
            threshold,
            over: 1.0,
            under: 0.0,
            drop: true,
            replace: true,
            succeeded: false,
        })
    }

    /// Override the two output levels.
    pub fn bounds(mut self, over: f64, under: f64) -> Result<Self> {
        if !over.is_finite() {
            return Err(Error::NonFiniteBound(over));
        }
        if !under.is_finite() {
            return Err(Error::NonFiniteBound(under));
        }
        self.over = over;
        self.under = under;
        Ok(self)
    }

    /// Keep or drop the source column after deriving the binary one.
    pub fn drop_original(mut self, yes: bool) -> Self {
        self.drop = yes;
        self
    }

    /// Rename the derived column to the source column's name.
    pub fn replace_name(mut self, yes: bool) -> Self {
        self.replace = yes;
        self
    }

    /// Binarize `column` of `frame` in place.
    pub fn apply_to(&mut self, frame: &mut Frame, column: &str) -> Result<()> {
        let index = frame
            .column_index(column)
            .ok_or_else(|| Error::ColumnNotFound(column.into()))?;
        let rows_before = frame.len();
        debug!("binarize: {rows_before} transactions found");

        let derived: Vec<Value> = frame
            .column(index)
            .map(|cell| {
                let positive = cell.as_f64().is_some_and(|v| v >= self.threshold);
                level(if positive { self.over } else { self.under })
            })
            .collect();

        let derived_name = format!("{column}_bin");
        frame.add_column(&derived_name, derived)?;
        let mut derived_index = frame.width() - 1;
        if self.drop {
            frame.drop_column(index);
            derived_index -= 1;
        }
        if self.replace {
            frame.rename_column(derived_index, column);
        }

        debug!(
            "binarize: {} transactions removed, {} retained",
            rows_before - frame.len(),
            frame.len()
        );
        self.succeeded = frame.len() == rows_before;
        Ok(())
    }

    /// Binarize into a copy, leaving `frame` untouched.
    pub fn applied(&mut self, frame: &Frame, column: &str) -> Result<Frame> {
        let mut copy = frame.clone();
        self.apply_to(&mut copy, column)?;
        Ok(copy)
    }
}

/// Integral levels come out as `Int` so a 1/0 binarization round-trips
/// through delimited text unchanged.
fn level(v: f64) -> Value {
    if v.fract() == 0.0 {
        Value::Int(v as i64)
    } else {
        Value::Float(v)
    }
}

impl Filter for Binarize {
    /// Context contract: reads `table` and `column`, writes `table`.
    fn apply(&mut self, mut ctx: Context) -> Result<Context> {
        let column = get_text(&ctx, "column")?.to_string();
        let mut frame = take_table(&mut ctx, "table")?;
        self.apply_to(&mut frame, &column)?;
        ctx.insert("table".to_string(), ContextValue::Table(frame));
        Ok(ctx)
    }

    fn succeeded(&self) -> bool {
        self.succeeded
    }
}

// ---------------------------------------------------------------------------
// BinarizeRatings – resolve the target column from the rating role
// ---------------------------------------------------------------------------

/// [`Binarize`] bound to a dataset's rating column, resolved at call time.
#[derive(Debug, Clone)]
pub struct BinarizeRatings {
    inner: Binarize,
}

impl BinarizeRatings {
    pub fn new(threshold: f64) -> Result<Self> {
        Ok(BinarizeRatings {
            inner: Binarize::new(threshold)?,
        })
    }

    pub fn bounds(mut self, over: f64, under: f64) -> Result<Self> {
        self.inner = self.inner.bounds(over, under)?;
        Ok(self)
    }

    /// Binarize the rating column in place. Fails with
    /// `RoleColumnMissing` when the dataset has no rating column.
    pub fn apply_to(&mut self, dataset: &mut Interactions) -> Result<()> {
        let index = dataset.role_index(Role::Rating)?;
        let column = dataset.data().column_names()[index].clone();
        self.inner.apply_to(dataset.frame_mut(), &column)
    }

    /// Binarize the rating column of a copy, leaving `dataset` untouched.
    pub fn applied(&mut self, dataset: &Interactions) -> Result<Interactions> {
        let mut copy = dataset.clone();
        self.apply_to(&mut copy)?;
        Ok(copy)
    }
}

impl Filter for BinarizeRatings {
    /// Context contract: reads and writes `data`.
    fn apply(&mut self, mut ctx: Context) -> Result<Context> {
        let mut dataset = crate::filters::take_data(&mut ctx, "data")?;
        self.apply_to(&mut dataset)?;
        ctx.insert("data".to_string(), ContextValue::Data(dataset));
        Ok(ctx)
    }

    fn succeeded(&self) -> bool {
        self.inner.succeeded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::frame::Frame;

    fn ratings_frame() -> Frame {
        Frame::from_rows(
            vec!["user_id".into(), "rating".into()],
            vec![
                vec![Value::Int(1), Value::Int(0)],
                vec![Value::Int(1), Value::Int(1)],
                vec![Value::Int(2), Value::Int(3)],
                vec![Value::Int(2), Value::Int(5)],
            ],
        )
        .unwrap()
    }

    #[test]
    fn thresholds_at_three() {
        let mut frame = ratings_frame();
        let mut binarize = Binarize::new(3.0).unwrap();
        binarize.apply_to(&mut frame, "rating").unwrap();

        let values: Vec<Value> = frame
            .column(frame.column_index("rating").unwrap())
            .cloned()
            .collect();
        assert_eq!(
            values,
            vec![Value::Int(0), Value::Int(0), Value::Int(1), Value::Int(1)]
        );
        assert_eq!(frame.len(), 4);
        assert!(binarize.succeeded());
        // replaced in place: still exactly two columns
        assert_eq!(frame.width(), 2);
    }

    #[test]
    fn keeps_original_when_asked() {
        let mut frame = ratings_frame();
        let mut binarize = Binarize::new(3.0)
            .unwrap()
            .drop_original(false)
            .replace_name(false);
        binarize.apply_to(&mut frame, "rating").unwrap();
        assert_eq!(frame.width(), 3);
        assert!(frame.column_index("rating_bin").is_some());
    }

    #[test]
    fn custom_bounds() {
        let mut frame = ratings_frame();
        let mut binarize = Binarize::new(3.0).unwrap().bounds(2.5, -1.0).unwrap();
        binarize.apply_to(&mut frame, "rating").unwrap();
        let index = frame.column_index("rating").unwrap();
        assert_eq!(frame.rows()[0][index], Value::Float(-1.0));
        assert_eq!(frame.rows()[3][index], Value::Float(2.5));
    }

    #[test]
    fn rejects_nan_threshold() {
        assert!(matches!(
            Binarize::new(f64::NAN),
            Err(Error::NonFiniteBound(_))
        ));
    }

    #[test]
    fn missing_column_fails() {
        let mut frame = ratings_frame();
        let mut binarize = Binarize::new(3.0).unwrap();
        assert!(matches!(
            binarize.apply_to(&mut frame, "score"),
            Err(Error::ColumnNotFound(_))
        ));
    }

    #[test]
    fn applied_leaves_input_untouched() {
        let frame = ratings_frame();
        let mut binarize = Binarize::new(3.0).unwrap();
        let derived = binarize.applied(&frame, "rating").unwrap();
        assert_eq!(frame, ratings_frame());
        assert_ne!(&derived, &frame);
    }

    #[test]
    fn binarize_ratings_resolves_role() {
        let mut dataset = Interactions::new(ratings_frame());
        let mut binarize = BinarizeRatings::new(3.0).unwrap();
        binarize.apply_to(&mut dataset).unwrap();
        let index = dataset.data().column_index("rating").unwrap();
        assert_eq!(dataset.data().rows()[3][index], Value::Int(1));
        // the rating role still resolves after replace
        assert_eq!(dataset.rating_col(), Some("rating"));
    }

    #[test]
    fn binarize_ratings_without_rating_role_fails() {
        let frame = Frame::new(vec!["user_id".into(), "item_id".into()]);
        let mut dataset = Interactions::new(frame);
        let mut binarize = BinarizeRatings::new(3.0).unwrap();
        assert!(matches!(
            binarize.apply_to(&mut dataset),
            Err(Error::RoleColumnMissing(Role::Rating))
        ));
    }
}
