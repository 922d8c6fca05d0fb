//! JSON request/response boundary.
//!
//! Requests are JSON objects with camelCase keys (`manifestPath`, `onlyLib`,
//! `verbose`, ...); absent fields take their defaults. A successful response
//! is the serialized [`BuildResult`]; a failure is an envelope:
//!
//! ```json
//! { "error": { "kind": "CompilationFailed", "message": "...", "diagnostics": "..." } }
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::artifact::BuildResult;
use crate::error::{BuildError, ErrorKind};
use crate::invoker::BuildInvoker;
use crate::request::{BuildRequest, PartialBuildRequest};
use crate::toolchain::Toolchain;

/// Serialized form of a [`BuildError`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireError {
  pub kind: ErrorKind,
  pub message: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub diagnostics: Option<String>,
}

impl From<&BuildError> for WireError {
  fn from(err: &BuildError) -> Self {
    Self {
      kind: err.kind(),
      message: err.to_string(),
      diagnostics: err.diagnostics().map(str::to_string),
    }
  }
}

/// Either side of a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Response {
  Err { error: WireError },
  Ok(BuildResult),
}

impl From<Result<BuildResult, BuildError>> for Response {
  fn from(result: Result<BuildResult, BuildError>) -> Self {
    match result {
      Ok(result) => Response::Ok(result),
      Err(err) => Response::Err { error: (&err).into() },
    }
  }
}

/// Decode and default a request.
pub fn decode_request(input: &[u8]) -> Result<BuildRequest, BuildError> {
  let partial: PartialBuildRequest =
    serde_json::from_slice(input).map_err(|e| BuildError::InvalidRequest(format!("malformed request: {}", e)))?;
  partial.resolve()
}

pub fn encode_result(result: &BuildResult) -> Result<Vec<u8>, serde_json::Error> {
  serde_json::to_vec_pretty(result)
}

pub fn encode_error(err: &BuildError) -> Result<Vec<u8>, serde_json::Error> {
  serde_json::to_vec_pretty(&Response::Err { error: err.into() })
}

/// Decode `input`, build it, and encode the outcome.
///
/// Always produces a response body; failures of any stage become the error
/// envelope.
pub async fn dispatch<T: Toolchain>(invoker: &BuildInvoker<T>, input: &[u8]) -> Vec<u8> {
  let outcome = match decode_request(input) {
    Ok(request) => invoker.build(&request).await,
    Err(err) => Err(err),
  };

  let encoded = match &outcome {
    Ok(result) => encode_result(result),
    Err(err) => {
      debug!(kind = %err.kind(), "request failed");
      encode_error(err)
    }
  };

  encoded.unwrap_or_else(|e| {
    debug!(error = %e, "failed to encode response");
    br#"{"error":{"kind":"IOError","message":"failed to encode response"}}"#.to_vec()
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::request::Verbosity;
  use crate::util::testutil::{FakeTarget, FakeToolchain, write_package};
  use serde_json::{Value, json};
  use tempfile::TempDir;

  mod decode {
    use super::*;

    #[test]
    fn only_manifest_path_gets_defaults() {
      let request = decode_request(br#"{"manifestPath": "/work/Cargo.toml"}"#).unwrap();

      assert!(request.only_lib);
      assert_eq!(request.verbose, Verbosity::Standard);
    }

    #[test]
    fn explicit_fields_override_defaults() {
      let request = decode_request(br#"{"manifestPath": "/w/Cargo.toml", "onlyLib": false, "verbose": 2}"#).unwrap();

      assert!(!request.only_lib);
      assert_eq!(request.verbose, Verbosity::VeryVerbose);
    }

    #[test]
    fn malformed_json_is_invalid_request() {
      let err = decode_request(b"{not json").unwrap_err();
      assert_eq!(err.kind(), ErrorKind::InvalidRequest);
    }

    #[test]
    fn out_of_range_verbosity_is_invalid_request() {
      let err = decode_request(br#"{"manifestPath": "/w/Cargo.toml", "verbose": 7}"#).unwrap_err();
      assert_eq!(err.kind(), ErrorKind::InvalidRequest);
    }

    #[test]
    fn missing_manifest_path_is_invalid_request() {
      let err = decode_request(b"{}").unwrap_err();
      assert_eq!(err.kind(), ErrorKind::InvalidRequest);
    }
  }

  mod encode {
    use super::*;

    #[test]
    fn error_envelope_carries_kind_and_diagnostics() {
      let err = BuildError::CompilationFailed {
        diagnostics: "error: expected `;`".to_string(),
        code: Some(101),
      };

      let value: Value = serde_json::from_slice(&encode_error(&err).unwrap()).unwrap();

      assert_eq!(value["error"]["kind"], "CompilationFailed");
      assert_eq!(value["error"]["diagnostics"], "error: expected `;`");
    }

    #[test]
    fn io_errors_use_the_ioerror_kind() {
      let err = BuildError::Io(std::io::Error::other("disk full"));
      let value: Value = serde_json::from_slice(&encode_error(&err).unwrap()).unwrap();

      assert_eq!(value["error"]["kind"], "IOError");
      assert!(value["error"].get("diagnostics").is_none());
    }

    #[test]
    fn result_uses_camel_case_keys() {
      let result = BuildResult {
        output_root: "/t/release".into(),
        artifacts: vec![crate::artifact::Artifact {
          name: "ffi".to_string(),
          output_path: "/t/release/libffi.so".into(),
          is_lib: true,
          is_dylib: false,
          is_cdylib: true,
        }],
      };

      let value: Value = serde_json::from_slice(&encode_result(&result).unwrap()).unwrap();

      assert_eq!(
        value,
        json!({
          "outputRoot": "/t/release",
          "artifacts": [{
            "name": "ffi",
            "outputPath": "/t/release/libffi.so",
            "isLib": true,
            "isDylib": false,
            "isCdylib": true
          }]
        })
      );
    }
  }

  mod dispatching {
    use super::*;

    #[tokio::test]
    async fn successful_build_round_trips_as_response() {
      let temp = TempDir::new().unwrap();
      let manifest_path = write_package(&temp.path().join("pkg"), "demo", None, false);
      let invoker = BuildInvoker::new(FakeToolchain::new(
        temp.path().join("target"),
        vec![FakeTarget::new("demo", &["lib"])],
      ));

      let input = json!({ "manifestPath": manifest_path }).to_string();
      let output = dispatch(&invoker, input.as_bytes()).await;

      match serde_json::from_slice::<Response>(&output).unwrap() {
        Response::Ok(result) => assert_eq!(result.artifacts.len(), 1),
        Response::Err { error } => panic!("unexpected error: {:?}", error),
      }
    }

    #[tokio::test]
    async fn bad_input_yields_error_envelope() {
      let temp = TempDir::new().unwrap();
      let invoker = BuildInvoker::new(FakeToolchain::new(temp.path().join("target"), vec![]));

      let output = dispatch(&invoker, b"[]").await;

      match serde_json::from_slice::<Response>(&output).unwrap() {
        Response::Err { error } => assert_eq!(error.kind, ErrorKind::InvalidRequest),
        Response::Ok(_) => panic!("expected an error envelope"),
      }
      assert_eq!(invoker.toolchain().compile_count(), 0);
    }
  }
}
