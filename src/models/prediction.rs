use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single model's decision, decoded from the loosely typed wire value.
///
/// The endpoint may answer with a label (`"emergency"`) or a numeric code (`1`);
/// anything else is kept verbatim in `Unknown`.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Emergency,
    NoEmergency,
    NoAdmission,
    Unknown(Value),
}

impl Verdict {
    pub fn decode(raw: &Value) -> Self {
        match raw {
            Value::String(label) => match label.as_str() {
                "emergency" => Verdict::Emergency,
                "no_emergency" => Verdict::NoEmergency,
                "no_admission" => Verdict::NoAdmission,
                _ => Verdict::Unknown(raw.clone()),
            },
            Value::Number(_) => match numeric_code(raw) {
                Some(1) => Verdict::Emergency,
                Some(0) => Verdict::NoEmergency,
                Some(-1) => Verdict::NoAdmission,
                _ => Verdict::Unknown(raw.clone()),
            },
            _ => Verdict::Unknown(raw.clone()),
        }
    }

    /// Label form used when this crate produces a verdict itself.
    pub fn wire_label(&self) -> Option<&'static str> {
        match self {
            Verdict::Emergency => Some("emergency"),
            Verdict::NoEmergency => Some("no_emergency"),
            Verdict::NoAdmission => Some("no_admission"),
            Verdict::Unknown(_) => None,
        }
    }

    pub fn is_emergency(&self) -> bool {
        matches!(self, Verdict::Emergency)
    }
}

// Integral numbers only; 1.0 counts as 1.
fn numeric_code(raw: &Value) -> Option<i64> {
    raw.as_i64().or_else(|| {
        raw.as_f64()
            .filter(|f| f.fract() == 0.0 && f.abs() <= 1.0)
            .map(|f| f as i64)
    })
}

/// The raw value a model returned together with its decoded verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub struct ModelVerdict {
    raw: Value,
    verdict: Verdict,
}

impl ModelVerdict {
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    pub fn verdict(&self) -> &Verdict {
        &self.verdict
    }

    /// Exact equality of the raw values: `"emergency"` and `1` differ,
    /// `1` and `1.0` do not.
    pub fn same_raw(&self, other: &ModelVerdict) -> bool {
        match (&self.raw, &other.raw) {
            (Value::Number(a), Value::Number(b)) => match (a.as_f64(), b.as_f64()) {
                (Some(a), Some(b)) => a == b,
                _ => a == b,
            },
            (a, b) => a == b,
        }
    }
}

impl Default for ModelVerdict {
    fn default() -> Self {
        ModelVerdict::from(Value::Null)
    }
}

impl From<Value> for ModelVerdict {
    fn from(raw: Value) -> Self {
        let verdict = Verdict::decode(&raw);
        ModelVerdict { raw, verdict }
    }
}

impl From<ModelVerdict> for Value {
    fn from(verdict: ModelVerdict) -> Self {
        verdict.raw
    }
}

impl From<Verdict> for ModelVerdict {
    fn from(verdict: Verdict) -> Self {
        let raw = match &verdict {
            Verdict::Unknown(raw) => raw.clone(),
            known => Value::from(known.wire_label().unwrap_or_default()),
        };
        ModelVerdict { raw, verdict }
    }
}

impl From<&str> for ModelVerdict {
    fn from(label: &str) -> Self {
        ModelVerdict::from(Value::from(label))
    }
}

impl From<i32> for ModelVerdict {
    fn from(code: i32) -> Self {
        ModelVerdict::from(Value::from(code))
    }
}

/// Body returned by the prediction endpoint.
///
/// A missing key decodes as an `Unknown` verdict rather than failing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    #[serde(rename = "random_forest_prediction", default)]
    pub random_forest: ModelVerdict,
    #[serde(rename = "logistic_regression_prediction", default)]
    pub logistic_regression: ModelVerdict,
}

impl PredictionResponse {
    pub fn new(random_forest: impl Into<ModelVerdict>, logistic_regression: impl Into<ModelVerdict>) -> Self {
        PredictionResponse {
            random_forest: random_forest.into(),
            logistic_regression: logistic_regression.into(),
        }
    }
}
