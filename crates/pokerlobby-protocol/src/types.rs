//! Typed payloads carried inside frames.
//!
//! These are the structures that get packed into the bytes after a frame
//! header. Each one is a flat record; the codec writes it as a map keyed by
//! field name, so the serde names below ARE the wire format. Rust field
//! names follow Rust conventions and `#[serde(rename = "...")]` maps them to
//! the keys the lobby server uses.

// Serde is Rust's standard framework for **ser**ializing and
// **de**serializing data. The derives generate the code that walks each
// field in declaration order.
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Requests (client → server)
// ---------------------------------------------------------------------------

/// LOGIN request: credentials for an existing account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub user: String,
    pub pass: String,
}

impl LoginRequest {
    pub fn new(user: impl Into<String>, pass: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            pass: pass.into(),
        }
    }
}

/// SIGNUP request: a new account with its profile.
///
/// Profile keys match the ones the server returns in [`LoginResponse`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SignupRequest {
    pub user: String,
    pub pass: String,
    #[serde(rename = "fullname")]
    pub full_name: String,
    pub email: String,
    pub phone: String,
    /// Date of birth, free-form as typed by the user.
    pub dob: String,
    pub country: String,
    pub gender: String,
}

/// CREATE_TABLE request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTableRequest {
    #[serde(rename = "tableName")]
    pub table_name: String,
    /// Seats at the table. The server enforces its own range.
    #[serde(rename = "maxPlayer")]
    pub max_players: u8,
    #[serde(rename = "minBet")]
    pub min_bet: i32,
}

/// JOIN_TABLE request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinTableRequest {
    #[serde(rename = "tableId")]
    pub table_id: i32,
}

// ---------------------------------------------------------------------------
// Responses (server → client)
// ---------------------------------------------------------------------------

/// The minimal reply: just a result code.
///
/// Used for CREATE_TABLE, JOIN_TABLE, LEAVE_TABLE, SIGNUP, and for LOGIN
/// failures. `result_code` mirrors the header's message type; the header
/// is what the client trusts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseResponse {
    #[serde(rename = "res")]
    pub result_code: u16,
}

impl BaseResponse {
    pub fn new(result_code: u16) -> Self {
        Self { result_code }
    }
}

/// LOGIN success reply: the account profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct LoginResponse {
    #[serde(rename = "res")]
    pub result_code: u16,
    #[serde(rename = "userId")]
    pub user_id: i32,
    pub username: String,
    /// Chip balance.
    pub balance: i32,
    #[serde(rename = "fullname")]
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub dob: String,
    pub country: String,
    pub gender: String,
}

/// One entry of the lobby's table list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PokerTable {
    pub id: i32,
    #[serde(rename = "tableName")]
    pub table_name: String,
    #[serde(rename = "maxPlayer")]
    pub max_players: i32,
    #[serde(rename = "minBet")]
    pub min_bet: i32,
    #[serde(rename = "currentPlayer")]
    pub current_players: i32,
}

/// TABLE_LIST reply.
///
/// `count` is sent alongside the list and must agree with `tables.len()`;
/// the client checks that before handing the list out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableListResponse {
    #[serde(rename = "size")]
    pub count: i32,
    pub tables: Vec<PokerTable>,
}

/// One row of the scoreboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserScore {
    pub rank: i32,
    pub id: i32,
    pub balance: i32,
}

/// SCOREBOARD reply, ordered by rank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreboardResponse {
    pub users: Vec<UserScore>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Codec, MsgPackCodec};

    /// Decodes raw MessagePack into a generic value so we can look at the
    /// keys that actually went on the wire.
    fn keys_of<T: Serialize>(value: &T) -> Vec<String> {
        let bytes = MsgPackCodec.encode(value).unwrap();
        let map: std::collections::BTreeMap<String, serde::de::IgnoredAny> =
            rmp_serde::from_slice(&bytes).unwrap();
        map.into_keys().collect()
    }

    #[test]
    fn test_create_table_wire_keys() {
        let req = CreateTableRequest {
            table_name: "high rollers".into(),
            max_players: 6,
            min_bet: 50,
        };
        assert_eq!(keys_of(&req), vec!["maxPlayer", "minBet", "tableName"]);
    }

    #[test]
    fn test_login_response_wire_keys() {
        let keys = keys_of(&LoginResponse::default());
        assert!(keys.contains(&"res".to_string()));
        assert!(keys.contains(&"userId".to_string()));
        assert!(keys.contains(&"fullname".to_string()));
        assert!(!keys.contains(&"result_code".to_string()));
    }

    #[test]
    fn test_table_list_uses_size_key() {
        let resp = TableListResponse {
            count: 0,
            tables: vec![],
        };
        assert_eq!(keys_of(&resp), vec!["size", "tables"]);
    }

    #[test]
    fn test_join_table_wire_keys() {
        assert_eq!(keys_of(&JoinTableRequest { table_id: 7 }), vec!["tableId"]);
    }
}
