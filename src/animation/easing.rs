//! Easing curves, named the way animation tooling usually names them.
//!
//! `"linear"`, and `"powerN.in"`, `"powerN.out"`, `"powerN.inOut"` for N in 1..=4.
//! `powerN` is a polynomial of degree N + 1, so `power1` is quadratic and
//! `power3` quartic.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Easing {
    Linear,
    In(u8),
    Out(u8),
    InOut(u8),
}

impl Easing {
    /// Map linear progress `t ∈ [0, 1]` onto the curve.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::In(n) => t.powi(exponent(n)),
            Easing::Out(n) => 1.0 - (1.0 - t).powi(exponent(n)),
            Easing::InOut(n) => {
                let p = exponent(n);
                if t < 0.5 {
                    0.5 * (2.0 * t).powi(p)
                } else {
                    1.0 - 0.5 * (2.0 - 2.0 * t).powi(p)
                }
            }
        }
    }
}

fn exponent(power: u8) -> i32 {
    i32::from(power) + 1
}

impl Default for Easing {
    fn default() -> Self {
        Easing::Out(3)
    }
}

impl FromStr for Easing {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "linear" || s == "none" {
            return Ok(Easing::Linear);
        }
        let invalid = || format!("unknown easing '{s}' (expected linear or powerN.in|out|inOut)");
        let (name, direction) = s.split_once('.').ok_or_else(invalid)?;
        let power: u8 = name
            .strip_prefix("power")
            .and_then(|n| n.parse().ok())
            .filter(|n| (1..=4).contains(n))
            .ok_or_else(invalid)?;
        match direction {
            "in" => Ok(Easing::In(power)),
            "out" => Ok(Easing::Out(power)),
            "inOut" => Ok(Easing::InOut(power)),
            _ => Err(invalid()),
        }
    }
}

impl TryFrom<String> for Easing {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Easing> for String {
    fn from(easing: Easing) -> Self {
        easing.to_string()
    }
}

impl fmt::Display for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Easing::Linear => write!(f, "linear"),
            Easing::In(n) => write!(f, "power{n}.in"),
            Easing::Out(n) => write!(f, "power{n}.out"),
            Easing::InOut(n) => write!(f, "power{n}.inOut"),
        }
    }
}
