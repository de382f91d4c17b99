use std::fmt;

/// The reply shapes the command set produces.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Simple(String),
    Bulk(Option<String>), // None is the null bulk string
    Array(Vec<Reply>),
}

impl Reply {
    pub fn to_resp(&self) -> String {
        match self {
            Reply::Simple(s) => format!("+{}\r\n", s),
            Reply::Bulk(Some(s)) => format!("${}\r\n{}\r\n", s.len(), s),
            Reply::Bulk(None) => "$-1\r\n".to_string(),
            Reply::Array(items) => {
                let mut result = format!("*{}\r\n", items.len());
                for item in items {
                    result.push_str(&item.to_resp());
                }
                result
            }
        }
    }

    pub fn ok() -> Self {
        Reply::Simple("OK".to_string())
    }

    pub fn pong() -> Self {
        Reply::Simple("PONG".to_string())
    }

    pub fn nil() -> Self {
        Reply::Bulk(None)
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_resp())
    }
}
