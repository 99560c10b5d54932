//! Shared protocol types for communication between the UI front-end and
//! the host process that owns the data file.
//!
//! The protocol is JSON-over-stdio: one JSON object per line in each direction.
//! Only the three commands in [`Command`] exist; a line naming anything else
//! does not parse.

use order_sheets_core::Dataset;
use serde::{Deserialize, Serialize};

/// A command sent from the UI to the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// Monotonically increasing request ID for correlating responses.
    pub id: u64,
    /// The command to execute.
    #[serde(flatten)]
    pub command: Command,
}

/// Commands the UI can send to the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", content = "params")]
pub enum Command {
    /// Read the data file at the configured default path.
    ReadExcel,

    /// Overwrite the data file at the default path with these rows.
    SaveExcel { dataset: Dataset },

    /// Let the user pick a spreadsheet and read it.
    SelectAndReadExcel,
}

impl Command {
    /// Wire name of the command
    pub fn name(&self) -> &'static str {
        match self {
            Command::ReadExcel => "ReadExcel",
            Command::SaveExcel { .. } => "SaveExcel",
            Command::SelectAndReadExcel => "SelectAndReadExcel",
        }
    }
}

/// A response sent from the host back to the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// The request ID this response corresponds to (0 if the request was unreadable).
    pub id: u64,
    /// The result of the command.
    #[serde(flatten)]
    pub result: ResponseResult,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum ResponseResult {
    #[serde(rename = "ok")]
    Ok {
        #[serde(skip_serializing_if = "Option::is_none")]
        data: Option<ResponseData>,
    },
    #[serde(rename = "error")]
    Error { message: String },
}

/// Data returned in successful responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseData {
    /// Rows read from a file.
    Dataset { dataset: Dataset },
    /// Whether a save succeeded.
    Saved { saved: bool },
}

impl Response {
    pub fn dataset(id: u64, dataset: Dataset) -> Self {
        Self {
            id,
            result: ResponseResult::Ok {
                data: Some(ResponseData::Dataset { dataset }),
            },
        }
    }

    pub fn saved(id: u64, saved: bool) -> Self {
        Self {
            id,
            result: ResponseResult::Ok {
                data: Some(ResponseData::Saved { saved }),
            },
        }
    }

    pub fn error<S: Into<String>>(id: u64, message: S) -> Self {
        Self {
            id,
            result: ResponseResult::Error {
                message: message.into(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use order_sheets_core::RowRecord;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_request_wire_format() {
        let req = Request {
            id: 3,
            command: Command::ReadExcel,
        };
        assert_eq!(
            serde_json::to_string(&req).unwrap(),
            r#"{"id":3,"cmd":"ReadExcel"}"#
        );

        let mut record = RowRecord::new();
        record.set("id", 1);
        let req = Request {
            id: 4,
            command: Command::SaveExcel {
                dataset: vec![record].into(),
            },
        };
        assert_eq!(
            serde_json::to_string(&req).unwrap(),
            r#"{"id":4,"cmd":"SaveExcel","params":{"dataset":[{"id":1}]}}"#
        );
    }

    #[test]
    fn test_request_parse() {
        let req: Request = serde_json::from_str(r#"{"id":9,"cmd":"SelectAndReadExcel"}"#).unwrap();
        assert_eq!(req.id, 9);
        assert_eq!(req.command, Command::SelectAndReadExcel);
    }

    #[test]
    fn test_unknown_commands_rejected() {
        for line in [
            r#"{"id":1,"cmd":"ReadFile","params":{"path":"/etc/passwd"}}"#,
            r#"{"id":1,"cmd":"Eval","params":{"code":"1+1"}}"#,
            r#"{"id":1}"#,
        ] {
            assert!(serde_json::from_str::<Request>(line).is_err(), "{line}");
        }
    }

    #[test]
    fn test_response_roundtrip() {
        for resp in [
            Response::dataset(1, Dataset::new()),
            Response::saved(2, false),
            Response::error(0, "JSON parse error"),
        ] {
            let json = serde_json::to_string(&resp).unwrap();
            let back: Response = serde_json::from_str(&json).unwrap();
            assert_eq!(back, resp);
        }
        assert_eq!(
            serde_json::to_string(&Response::saved(2, true)).unwrap(),
            r#"{"id":2,"status":"ok","data":{"saved":true}}"#
        );
    }
}
