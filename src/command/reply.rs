//! Command replies and their RESP2 wire form.

/// Value handed back to the dispatch layer for one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Flat array of bulk strings (`[k1, v1, k2, v2, ...]`).
    MultiBulk(Vec<Vec<u8>>),
    /// Simple status such as `OK`.
    Status(String),
    Error(String),
}

impl Reply {
    pub fn ok() -> Self {
        Reply::Status("OK".to_string())
    }

    pub fn error(message: impl Into<String>) -> Self {
        Reply::Error(message.into())
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Reply::Error(_))
    }

    /// Encode as RESP2 bytes.
    pub fn encode(&self) -> Vec<u8> {
        match self {
            Reply::MultiBulk(items) => {
                let mut out = format!("*{}\r\n", items.len()).into_bytes();
                for item in items {
                    out.extend_from_slice(format!("${}\r\n", item.len()).as_bytes());
                    out.extend_from_slice(item);
                    out.extend_from_slice(b"\r\n");
                }
                out
            }
            Reply::Status(status) => format!("+{}\r\n", status).into_bytes(),
            // CR/LF would break the simple-string framing.
            Reply::Error(message) => format!("-{}\r\n", message.replace(['\r', '\n'], " ")).into_bytes(),
        }
    }
}
