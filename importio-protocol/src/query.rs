use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// A request against one or more connectors.
///
/// ```
/// use importio_rs_protocol::Query;
/// use uuid::Uuid;
///
/// let connector = Uuid::parse_str("caff10dc-3bf8-402e-b1b8-c799a77c3e8c").unwrap();
/// let query = Query::new()
///     .connector(connector)
///     .input("searchterm", "avengers");
/// assert_eq!(query.connector_guids(), &[connector]);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Query {
    connector_guids: Vec<Uuid>,
    #[serde(default)]
    input: Map<String, Value>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a connector to query.
    pub fn connector(mut self, guid: Uuid) -> Self {
        self.connector_guids.push(guid);
        self
    }

    /// Set a named input parameter, replacing any previous value.
    pub fn input(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.input.insert(name.into(), value.into());
        self
    }

    pub fn connector_guids(&self) -> &[Uuid] {
        &self.connector_guids
    }

    pub fn inputs(&self) -> &Map<String, Value> {
        &self.input
    }
}
