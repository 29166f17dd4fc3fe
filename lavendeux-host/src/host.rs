//! Request handling
//!
//! One JSON request per line in, one JSON response per line out. Requests
//! without an `id` are processed but not answered.

use lavendeux_core::{BindingError, TaggedValue};
use lavendeux_extension::{ExtensionRegistry, MemoryState};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use std::env;
use std::io::{self, BufRead, Write};
use std::rc::Rc;
use tracing::{debug, info, warn};

pub const PARSE_ERROR: &str = "PARSE_ERROR";
pub const METHOD_NOT_FOUND: &str = "METHOD_NOT_FOUND";
pub const INVALID_PARAMS: &str = "INVALID_PARAMS";

/// Host settings read from the environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostConfig {
    /// Provide the state capability to the extension
    pub state: bool,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self { state: true }
    }
}

impl HostConfig {
    pub fn from_env() -> Self {
        Self::from_state_setting(env::var("LAVENDEUX_STATE").ok().as_deref())
    }

    fn from_state_setting(setting: Option<&str>) -> Self {
        let state = match setting.map(|s| s.trim().to_ascii_lowercase()) {
            None => true,
            Some(s) => match s.as_str() {
                "off" | "false" | "0" | "no" => false,
                "on" | "true" | "1" | "yes" | "" => true,
                other => {
                    warn!(value = %other, "unrecognised LAVENDEUX_STATE, keeping state on");
                    true
                }
            },
        };
        Self { state }
    }
}

#[derive(Debug, Deserialize)]
pub struct Request {
    pub id: Option<JsonValue>,
    pub method: String,
    #[serde(default)]
    pub params: Option<JsonValue>,
}

#[derive(Debug, Serialize)]
pub struct Response {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<HostError>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HostError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl HostError {
    fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            suggestions: Vec::new(),
        }
    }
}

impl From<BindingError> for HostError {
    fn from(e: BindingError) -> Self {
        Self {
            code: e.code().to_string(),
            message: e.to_string(),
            suggestions: e.suggestions().to_vec(),
        }
    }
}

/// Parameters of a `call` request
#[derive(Debug, Deserialize)]
struct CallParams {
    name: String,
    #[serde(default)]
    args: Vec<JsonValue>,
}

/// A loaded extension plus the state the host keeps for it
pub struct Host {
    registry: ExtensionRegistry,
    store: Option<Rc<MemoryState>>,
}

impl Host {
    pub fn new(mut registry: ExtensionRegistry, config: &HostConfig) -> Self {
        let store = config.state.then(|| Rc::new(MemoryState::new()));
        if let Some(store) = &store {
            registry.set_state_store(store.clone());
        }
        info!(
            extension = %registry.name(),
            version = %registry.version(),
            functions = registry.functions().len(),
            decorators = registry.decorators().len(),
            state = config.state,
            "extension loaded"
        );
        Self { registry, store }
    }

    pub fn handle_request(&self, request: &Request) -> Response {
        let result = match request.method.as_str() {
            "extension" => Ok(json!(self.registry.details())),
            "describe" => Ok(json!(self.registry.describe())),
            "call" => self.handle_call(&request.params),
            "state" => Ok(self.state_json()),
            _ => Err(HostError::new(
                METHOD_NOT_FOUND,
                format!("Method not found: {}", request.method),
            )),
        };

        match result {
            Ok(r) => Response {
                id: request.id.clone(),
                result: Some(r),
                error: None,
            },
            Err(e) => Response {
                id: request.id.clone(),
                result: None,
                error: Some(e),
            },
        }
    }

    fn handle_call(&self, params: &Option<JsonValue>) -> Result<JsonValue, HostError> {
        let params = params
            .clone()
            .ok_or_else(|| HostError::new(INVALID_PARAMS, "Missing params"))?;
        let params: CallParams = serde_json::from_value(params)
            .map_err(|e| HostError::new(INVALID_PARAMS, format!("Invalid params: {}", e)))?;

        let args = params
            .args
            .iter()
            .map(TaggedValue::from_wire)
            .collect::<Result<Vec<_>, _>>()?;

        let value = self.registry.call(&params.name, &args)?;
        Ok(value.to_wire())
    }

    fn state_json(&self) -> JsonValue {
        let state = self.store.as_ref().map(|s| s.snapshot()).unwrap_or_default();
        JsonValue::Object(
            state
                .iter()
                .map(|(k, v)| (k.clone(), v.to_wire()))
                .collect(),
        )
    }

    /// Handle one input line; `None` when nothing should be written back
    pub fn handle_line(&self, line: &str) -> Option<Response> {
        let request: Request = match serde_json::from_str(line) {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "unparseable request");
                return Some(Response {
                    id: None,
                    result: None,
                    error: Some(HostError::new(PARSE_ERROR, format!("Parse error: {}", e))),
                });
            }
        };

        debug!(method = %request.method, "processing");
        let response = self.handle_request(&request);
        if let Some(error) = &response.error {
            debug!(method = %request.method, code = %error.code, "request failed");
        }

        // Notifications receive no response
        if request.id.is_none() {
            debug!(method = %request.method, "notification processed");
            return None;
        }
        Some(response)
    }

    /// Serve until EOF
    pub fn serve<R: BufRead, W: Write>(&self, reader: R, mut writer: W) -> io::Result<()> {
        for line in reader.lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            if let Some(response) = self.handle_line(line) {
                let text = serde_json::to_string(&response).map_err(io::Error::other)?;
                writeln!(writer, "{}", text)?;
                writer.flush()?;
            }
        }
        info!("input closed");
        Ok(())
    }
}
