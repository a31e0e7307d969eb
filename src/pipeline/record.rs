use crate::error::{NexusError, NexusResult};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

/// Open key/value record, the shape every payload can be viewed as
pub type Record = Map<String, Value>;

/// Annotation attached by the transform stage
pub const TRANSFORM_METADATA: &str = "enriched with metadata and validation";

/// Sensor name used when a raw record has no `sensor` field
pub const DEFAULT_SENSOR: &str = "Unknown";

/// Temperature used when a raw record has no `temp` field
pub const DEFAULT_TEMP: f64 = 0.0;

/// The three built-in stage behaviours
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageKind {
    Input,
    Transform,
    Output,
}

impl StageKind {
    /// Value written to the `stage` field
    pub fn label(&self) -> &'static str {
        match self {
            StageKind::Input => "input",
            StageKind::Transform => "transform",
            StageKind::Output => "output",
        }
    }

    /// Name of the boolean status field this stage reports through
    pub fn status_field(&self) -> &'static str {
        match self {
            StageKind::Input => "validated",
            StageKind::Transform => "transformed",
            StageKind::Output => "formatted",
        }
    }
}

/// Successful input validation
#[derive(Debug, Clone, PartialEq)]
pub struct InputRecord {
    pub sensor: Value,
    pub temp: Value,
    /// The raw record exactly as received
    pub data: Record,
}

impl InputRecord {
    fn field(&self, key: &str) -> Option<Value> {
        match key {
            "validated" => Some(Value::Bool(true)),
            "sensor" => Some(self.sensor.clone()),
            "temp" => Some(self.temp.clone()),
            "data" => Some(Value::Object(self.data.clone())),
            "stage" => Some(Value::from(StageKind::Input.label())),
            _ => None,
        }
    }

    fn to_record(&self) -> Record {
        let mut record = Record::new();
        record.insert("validated".into(), Value::Bool(true));
        record.insert("sensor".into(), self.sensor.clone());
        record.insert("temp".into(), self.temp.clone());
        record.insert("data".into(), Value::Object(self.data.clone()));
        record.insert("stage".into(), Value::from(StageKind::Input.label()));
        record
    }
}

/// Enriched reading; fields are carried over as found, `null` when absent
#[derive(Debug, Clone, PartialEq)]
pub struct TransformRecord {
    pub sensor: Value,
    pub temp: Value,
    pub data: Value,
    pub validated: Value,
}

impl TransformRecord {
    fn field(&self, key: &str) -> Option<Value> {
        match key {
            "sensor" => Some(self.sensor.clone()),
            "temp" => Some(self.temp.clone()),
            "data" => Some(self.data.clone()),
            "validated" => Some(self.validated.clone()),
            "transformed" => Some(Value::Bool(true)),
            "metadata" => Some(Value::from(TRANSFORM_METADATA)),
            "stage" => Some(Value::from(StageKind::Transform.label())),
            _ => None,
        }
    }

    fn to_record(&self) -> Record {
        let mut record = Record::new();
        record.insert("sensor".into(), self.sensor.clone());
        record.insert("temp".into(), self.temp.clone());
        record.insert("data".into(), self.data.clone());
        record.insert("validated".into(), self.validated.clone());
        record.insert("transformed".into(), Value::Bool(true));
        record.insert("metadata".into(), Value::from(TRANSFORM_METADATA));
        record.insert("stage".into(), Value::from(StageKind::Transform.label()));
        record
    }
}

/// Formatted, human-readable result
#[derive(Debug, Clone, PartialEq)]
pub struct OutputRecord {
    pub result: String,
}

impl OutputRecord {
    fn field(&self, key: &str) -> Option<Value> {
        match key {
            "formatted" => Some(Value::Bool(true)),
            "result" => Some(Value::from(self.result.as_str())),
            "stage" => Some(Value::from(StageKind::Output.label())),
            _ => None,
        }
    }

    fn to_record(&self) -> Record {
        let mut record = Record::new();
        record.insert("formatted".into(), Value::Bool(true));
        record.insert("result".into(), Value::from(self.result.as_str()));
        record.insert("stage".into(), Value::from(StageKind::Output.label()));
        record
    }
}

/// Soft failure reported by a built-in stage
///
/// Viewed as a record this carries the stage's status field set to `false`
/// plus `error`. Input failures also carry `data: null`; the others carry the
/// `stage` label instead.
#[derive(Debug, Clone, PartialEq)]
pub struct StageFailure {
    pub kind: StageKind,
    pub error: String,
}

impl StageFailure {
    pub fn new(kind: StageKind, error: impl Into<String>) -> Self {
        Self {
            kind,
            error: error.into(),
        }
    }

    fn field(&self, key: &str) -> Option<Value> {
        if key == self.kind.status_field() {
            return Some(Value::Bool(false));
        }
        match (key, self.kind) {
            ("error", _) => Some(Value::from(self.error.as_str())),
            ("data", StageKind::Input) => Some(Value::Null),
            ("stage", StageKind::Transform | StageKind::Output) => {
                Some(Value::from(self.kind.label()))
            }
            _ => None,
        }
    }

    fn to_record(&self) -> Record {
        let mut record = Record::new();
        record.insert(self.kind.status_field().into(), Value::Bool(false));
        record.insert("error".into(), Value::from(self.error.as_str()));
        match self.kind {
            StageKind::Input => {
                record.insert("data".into(), Value::Null);
            }
            StageKind::Transform | StageKind::Output => {
                record.insert("stage".into(), Value::from(self.kind.label()));
            }
        }
        record
    }
}

/// Value flowing between stages and between chained pipelines
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Anything supplied by a caller, record or not
    Raw(Value),
    Input(InputRecord),
    Transform(TransformRecord),
    Output(OutputRecord),
    Failed(StageFailure),
}

impl Payload {
    /// Look up a field, yielding `null` when it is absent
    ///
    /// # Errors
    /// Returns `NexusError::FieldLookupUnsupported` for raw values that are
    /// not records (strings, numbers, arrays, ...).
    pub fn field(&self, key: &str) -> NexusResult<Value> {
        let value = match self {
            Payload::Raw(Value::Object(map)) => map.get(key).cloned(),
            Payload::Raw(other) => {
                return Err(NexusError::FieldLookupUnsupported(
                    value_kind(other).to_string(),
                ))
            }
            Payload::Input(record) => record.field(key),
            Payload::Transform(record) => record.field(key),
            Payload::Output(record) => record.field(key),
            Payload::Failed(failure) => failure.field(key),
        };
        Ok(value.unwrap_or(Value::Null))
    }

    /// Record view of this payload, `None` for non-record raw values
    pub fn as_record(&self) -> Option<Record> {
        match self {
            Payload::Raw(Value::Object(map)) => Some(map.clone()),
            Payload::Raw(_) => None,
            Payload::Input(record) => Some(record.to_record()),
            Payload::Transform(record) => Some(record.to_record()),
            Payload::Output(record) => Some(record.to_record()),
            Payload::Failed(failure) => Some(failure.to_record()),
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Payload::Raw(value) => value.clone(),
            _ => self.as_record().map(Value::Object).unwrap_or(Value::Null),
        }
    }

    /// Extract the formatted `result` field
    ///
    /// # Errors
    /// Returns `NexusError::MissingResult` when the payload has no result,
    /// which is the case for anything that did not pass an output stage.
    pub fn result(&self) -> NexusResult<String> {
        match self {
            Payload::Output(record) => Ok(record.result.clone()),
            Payload::Raw(Value::Object(map)) => map
                .get("result")
                .map(render_value)
                .ok_or_else(|| NexusError::MissingResult(self.describe())),
            _ => Err(NexusError::MissingResult(self.describe())),
        }
    }

    /// Stage that produced this payload, `None` for raw input
    pub fn stage_kind(&self) -> Option<StageKind> {
        match self {
            Payload::Raw(_) => None,
            Payload::Input(_) => Some(StageKind::Input),
            Payload::Transform(_) => Some(StageKind::Transform),
            Payload::Output(_) => Some(StageKind::Output),
            Payload::Failed(failure) => Some(failure.kind),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Payload::Failed(_))
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Payload::Failed(failure) => Some(&failure.error),
            _ => None,
        }
    }

    /// Short human description used in error messages
    pub fn describe(&self) -> String {
        match self {
            Payload::Raw(Value::Object(_)) => "raw record".to_string(),
            Payload::Raw(other) => format!("{} value", value_kind(other)),
            Payload::Input(_) => "input record".to_string(),
            Payload::Transform(_) => "transform record".to_string(),
            Payload::Output(_) => "output record".to_string(),
            Payload::Failed(failure) => format!("failed {} record", failure.kind.label()),
        }
    }
}

impl Serialize for Payload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Payload::Raw(value)
    }
}

impl From<Record> for Payload {
    fn from(record: Record) -> Self {
        Payload::Raw(Value::Object(record))
    }
}

impl From<String> for Payload {
    fn from(value: String) -> Self {
        Payload::Raw(Value::String(value))
    }
}

impl From<&str> for Payload {
    fn from(value: &str) -> Self {
        Payload::Raw(Value::from(value))
    }
}

impl From<Payload> for Value {
    fn from(payload: Payload) -> Self {
        match payload {
            Payload::Raw(value) => value,
            other => other.to_value(),
        }
    }
}

/// JSON type name of a value
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "record",
    }
}

/// Render a value for the output message
///
/// Strings are written without quotes and `null` reads as `None`; everything
/// else uses its JSON text, so booleans read `true`/`false` and nested
/// records or arrays read as compact JSON such as `{"a":1}`.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::Null => "None".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
