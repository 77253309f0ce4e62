//! Keyed curves sampled by the Curve node.
//!
//! A curve holds keys sorted by time. Sampling before the first key or after
//! the last clamps to that key; between keys the value is blended with the
//! same per-type rule as the Lerp node (see [`crate::blend`]).

use serde::{Deserialize, Serialize};

use crate::blend::blend_values;
use crate::error::CurveError;
use crate::value::{Value, ValueType};

/// How values between two keys are computed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CurveInterpolation {
    #[default]
    Linear,
    /// Hold the previous key until the next one.
    Step,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CurveKey {
    pub time: f32,
    pub value: Value,
}

/// A typed keyframe curve.
///
/// Loading goes through the same checks as [`Curve::add_key`]: keys are
/// sorted by time and every key must match the curve's value type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CurveDef")]
pub struct Curve {
    value_type: ValueType,
    keys: Vec<CurveKey>,
    #[serde(default)]
    interpolation: CurveInterpolation,
}

/// Serialized form of a [`Curve`], validated on load.
#[derive(Deserialize)]
struct CurveDef {
    value_type: ValueType,
    #[serde(default)]
    keys: Vec<CurveKey>,
    #[serde(default)]
    interpolation: CurveInterpolation,
}

impl TryFrom<CurveDef> for Curve {
    type Error = CurveError;

    fn try_from(def: CurveDef) -> Result<Self, Self::Error> {
        let mut keys = def.keys;
        for key in &keys {
            if !key.time.is_finite() {
                return Err(CurveError::NonFiniteTime);
            }
            let found = key.value.value_type();
            if found != def.value_type {
                return Err(CurveError::KeyTypeMismatch {
                    time: key.time,
                    expected: def.value_type,
                    found,
                });
            }
        }
        // Stable, so keys sharing a time keep their authored order.
        keys.sort_by(|a, b| a.time.total_cmp(&b.time));
        Ok(Self {
            value_type: def.value_type,
            keys,
            interpolation: def.interpolation,
        })
    }
}

impl Curve {
    pub fn new(value_type: ValueType) -> Self {
        Self {
            value_type,
            keys: Vec::new(),
            interpolation: CurveInterpolation::Linear,
        }
    }

    /// Insert a key, keeping keys sorted by time.
    ///
    /// Returns `false` and leaves the curve unchanged if the value has the
    /// wrong type or the time is not finite.
    pub fn add_key(&mut self, time: f32, value: impl Into<Value>) -> bool {
        let value = value.into();
        if value.value_type() != self.value_type || !time.is_finite() {
            return false;
        }
        let at = self.keys.partition_point(|k| k.time <= time);
        self.keys.insert(at, CurveKey { time, value });
        true
    }

    /// Builder form of [`Curve::add_key`]. Mistyped keys are dropped.
    pub fn with_key(mut self, time: f32, value: impl Into<Value>) -> Self {
        self.add_key(time, value);
        self
    }

    pub fn with_interpolation(mut self, interpolation: CurveInterpolation) -> Self {
        self.interpolation = interpolation;
        self
    }

    #[inline]
    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    pub fn keys(&self) -> &[CurveKey] {
        &self.keys
    }

    /// Time of the last key, or 0 for an empty curve.
    pub fn duration(&self) -> f32 {
        self.keys.last().map_or(0.0, |k| k.time)
    }

    /// Value at `time`. An empty curve yields the type's default value.
    pub fn sample(&self, time: f32) -> Value {
        let (first, last) = match (self.keys.first(), self.keys.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return self.value_type.default_value(),
        };
        if time <= first.time {
            return first.value.clone();
        }
        if time >= last.time {
            return last.value.clone();
        }

        let next = self.keys.partition_point(|k| k.time <= time);
        let (a, b) = (&self.keys[next - 1], &self.keys[next]);
        if self.interpolation == CurveInterpolation::Step {
            return a.value.clone();
        }
        let span = b.time - a.time;
        if span <= f32::EPSILON {
            return b.value.clone();
        }
        let t = (time - a.time) / span;
        blend_values(&a.value, &b.value, t).unwrap_or_else(|| a.value.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Color;
    use glam::Quat;

    #[test]
    fn test_linear_sampling() {
        let curve = Curve::new(ValueType::Float)
            .with_key(0.0, 0.0f32)
            .with_key(1.0, 10.0f32);
        assert_eq!(curve.sample(-1.0), Value::Float(0.0));
        assert_eq!(curve.sample(0.25), Value::Float(2.5));
        assert_eq!(curve.sample(5.0), Value::Float(10.0));
    }

    #[test]
    fn test_keys_sorted() {
        let curve = Curve::new(ValueType::Float)
            .with_key(1.0, 1.0f32)
            .with_key(0.0, 0.0f32)
            .with_key(0.5, 5.0f32);
        let times: Vec<f32> = curve.keys().iter().map(|k| k.time).collect();
        assert_eq!(times, vec![0.0, 0.5, 1.0]);
        assert_eq!(curve.duration(), 1.0);
    }

    #[test]
    fn test_wrong_type_rejected() {
        let mut curve = Curve::new(ValueType::Color);
        assert!(!curve.add_key(0.0, 1.0f32));
        assert!(curve.add_key(0.0, Color::WHITE));
        assert!(!curve.add_key(f32::NAN, Color::WHITE));
        assert_eq!(curve.keys().len(), 1);
    }

    #[test]
    fn test_step_interpolation() {
        let curve = Curve::new(ValueType::Int)
            .with_key(0.0, 1i32)
            .with_key(1.0, 2i32)
            .with_interpolation(CurveInterpolation::Step);
        assert_eq!(curve.sample(0.99), Value::Int(1));
        assert_eq!(curve.sample(1.0), Value::Int(2));
    }

    #[test]
    fn test_quaternion_curve_slerps() {
        let curve = Curve::new(ValueType::Quaternion)
            .with_key(0.0, Quat::IDENTITY)
            .with_key(1.0, Quat::from_rotation_z(std::f32::consts::PI * 0.5));
        let q = curve.sample(0.5).get::<Quat>().expect("quat");
        assert!((q.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_empty_curve_default() {
        assert_eq!(Curve::new(ValueType::Float).sample(0.3), Value::Float(0.0));
    }

    fn float_curve_json() -> serde_json::Value {
        let curve = Curve::new(ValueType::Float)
            .with_key(0.0, 0.0f32)
            .with_key(1.0, 10.0f32);
        serde_json::to_value(&curve).expect("serialize")
    }

    #[test]
    fn test_loaded_keys_are_sorted() {
        let mut json = float_curve_json();
        if let Some(keys) = json["keys"].as_array_mut() {
            keys.reverse();
        }
        assert_eq!(json["keys"][0]["time"], serde_json::json!(1.0));

        let curve: Curve = serde_json::from_value(json).expect("deserialize");
        let times: Vec<f32> = curve.keys().iter().map(|k| k.time).collect();
        assert_eq!(times, vec![0.0, 1.0]);
        assert_eq!(curve.sample(0.5), Value::Float(5.0));
    }

    #[test]
    fn test_loaded_key_type_mismatch_rejected() {
        let mut json = float_curve_json();
        json["keys"][1]["value"] = serde_json::to_value(Value::Int(3)).expect("serialize");
        let err = serde_json::from_value::<Curve>(json).expect_err("mismatched key");
        assert!(err.to_string().contains("expected Float"), "{}", err);
    }
}
