//! Composable transformation passes over interaction datasets.
//!
//! A [`Filter`] is a single-purpose transformation with a uniform
//! invocation contract: it receives the accumulated context bundle by
//! value, returns the updated bundle, and records whether its
//! postcondition held in [`Filter::succeeded`]. A [`FilterPipeline`]
//! threads one bundle through an ordered list of filters; any stage error
//! aborts the pipeline and propagates unchanged.

pub mod binarize;
pub mod holdout;

use std::collections::BTreeMap;

use crate::data::dataset::Interactions;
use crate::data::frame::Frame;
use crate::error::{Error, Result};

pub use binarize::{Binarize, BinarizeRatings};
pub use holdout::{HoldOut, Split};

/// One named value exchanged between pipeline stages.
#[derive(Debug, Clone)]
pub enum ContextValue {
    Data(Interactions),
    Table(Frame),
    Num(f64),
    Flag(bool),
    Text(String),
}

/// The accumulating keyword bundle threaded through a pipeline.
pub type Context = BTreeMap<String, ContextValue>;

/// A unit of transformation over datasets or raw tables.
pub trait Filter {
    /// Consume the context, perform the transformation, return the
    /// context with this filter's outputs merged in (later keys overwrite
    /// earlier ones).
    fn apply(&mut self, ctx: Context) -> Result<Context>;

    /// Whether the postcondition of the most recent invocation held.
    fn succeeded(&self) -> bool;
}

/// Remove a dataset from the bundle.
pub fn take_data(ctx: &mut Context, key: &str) -> Result<Interactions> {
    match ctx.remove(key) {
        Some(ContextValue::Data(dataset)) => Ok(dataset),
        _ => Err(Error::FilterInput(key.to_string())),
    }
}

/// Remove a raw table from the bundle.
pub fn take_table(ctx: &mut Context, key: &str) -> Result<Frame> {
    match ctx.remove(key) {
        Some(ContextValue::Table(frame)) => Ok(frame),
        _ => Err(Error::FilterInput(key.to_string())),
    }
}

/// Borrow a string value from the bundle.
pub fn get_text<'a>(ctx: &'a Context, key: &str) -> Result<&'a str> {
    match ctx.get(key) {
        Some(ContextValue::Text(text)) => Ok(text),
        _ => Err(Error::FilterInput(key.to_string())),
    }
}

/// Sequential composition of filters sharing one context bundle.
pub struct FilterPipeline {
    stages: Vec<Box<dyn Filter>>,
}

impl FilterPipeline {
    pub fn new(stages: Vec<Box<dyn Filter>>) -> Self {
        FilterPipeline { stages }
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }
}

impl Filter for FilterPipeline {
    fn apply(&mut self, ctx: Context) -> Result<Context> {
        let mut ctx = ctx;
        for stage in &mut self.stages {
            ctx = stage.apply(ctx)?;
        }
        Ok(ctx)
    }

    fn succeeded(&self) -> bool {
        self.stages.iter().all(|stage| stage.succeeded())
    }
}
