//! Curve store: one published forward curve per metal
//!
//! `put` swaps the whole curve atomically; readers hold an `Arc` snapshot
//! and never observe a partially replaced curve. Lookups between points
//! use linear interpolation; dates outside the covered range fail with
//! `OutOfRange` rather than extrapolating; callers treat that as a
//! valuation failure, never a clamp.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use types::curve::ForwardCurve;
use types::errors::CurveError;
use types::metal::Metal;

/// Shared store of published curves, keyed by metal.
#[derive(Debug, Default)]
pub struct CurveStore {
    curves: RwLock<HashMap<Metal, Arc<ForwardCurve>>>,
}

impl CurveStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a curve, replacing any previous curve for the metal.
    pub fn put(&self, curve: ForwardCurve) {
        let metal = curve.metal;
        let mut curves = self.curves.write().expect("curve store lock poisoned");
        curves.insert(metal, Arc::new(curve));
        tracing::info!(%metal, "curve published");
    }

    /// Fetch the current curve snapshot for a metal.
    pub fn get(&self, metal: Metal) -> Result<Arc<ForwardCurve>, CurveError> {
        let curves = self.curves.read().expect("curve store lock poisoned");
        curves
            .get(&metal)
            .cloned()
            .ok_or(CurveError::NotFound { metal })
    }

    /// Interpolated curve value at a date.
    pub fn price_at(&self, metal: Metal, date: NaiveDate) -> Result<Decimal, CurveError> {
        let curve = self.get(metal)?;
        price_on(&curve, date)
    }

    /// Metals with a published curve.
    pub fn metals(&self) -> Vec<Metal> {
        let curves = self.curves.read().expect("curve store lock poisoned");
        let mut metals: Vec<Metal> = curves.keys().copied().collect();
        metals.sort();
        metals
    }
}

/// Linear interpolation on a curve snapshot.
///
/// Exact point dates return the stored value; dates between points are
/// interpolated between the bracketing pair, weighted by calendar days.
pub fn price_on(curve: &ForwardCurve, date: NaiveDate) -> Result<Decimal, CurveError> {
    if !curve.covers(date) {
        return Err(CurveError::OutOfRange {
            metal: curve.metal,
            date,
            first: curve.first_date(),
            last: curve.last_date(),
        });
    }

    let points = curve.points();
    match points.binary_search_by_key(&date, |p| p.date) {
        Ok(i) => Ok(points[i].value),
        Err(i) => {
            // covers() guarantees bracketing points on both sides
            let lo = &points[i - 1];
            let hi = &points[i];
            let span = Decimal::from((hi.date - lo.date).num_days());
            let offset = Decimal::from((date - lo.date).num_days());
            Ok(lo.value + (hi.value - lo.value) * offset / span)
        }
    }
}
