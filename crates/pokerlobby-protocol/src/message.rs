//! The message-type catalogue.
//!
//! Every frame header carries a 16-bit message type. Codes come in triples
//! per operation: the request code `N` (a multiple of 100), the success
//! reply `N + 1`, and the failure reply `N + 2`. There are no exceptions to
//! that arithmetic, so the catalogue only lists the base codes and derives
//! the rest.
//!
//! ```text
//! LOGIN         100 → 101 ok / 102 not ok
//! CREATE_TABLE  300 → 301 ok / 302 not ok
//! ...
//! ```

use std::fmt;

/// A raw message type as it appears in a frame header.
///
/// Newtype over `u16` so a message type can't be confused with a length
/// or a table id. Any `u16` is representable; whether it is *meaningful*
/// depends on which [`Operation`] you ask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageType(pub u16);

impl MessageType {
    /// Returns the raw code.
    pub fn code(self) -> u16 {
        self.0
    }
}

impl From<u16> for MessageType {
    fn from(code: u16) -> Self {
        Self(code)
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Operation
// ---------------------------------------------------------------------------

/// One request kind in the lobby protocol, identified by its base code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum Operation {
    Login = 100,
    Signup = 200,
    CreateTable = 300,
    JoinTable = 400,
    TableList = 500,
    UpdateGameState = 600,
    LeaveTable = 700,
    Scoreboard = 800,
    FriendList = 900,
}

impl Operation {
    /// Every operation in the catalogue, in code order.
    pub const ALL: [Operation; 9] = [
        Operation::Login,
        Operation::Signup,
        Operation::CreateTable,
        Operation::JoinTable,
        Operation::TableList,
        Operation::UpdateGameState,
        Operation::LeaveTable,
        Operation::Scoreboard,
        Operation::FriendList,
    ];

    /// The base code, which is also the request message type.
    pub fn base(self) -> u16 {
        self as u16
    }

    /// Message type a client sends to start this operation.
    pub fn request(self) -> MessageType {
        MessageType(self.base())
    }

    /// Message type of a successful reply (`base + 1`).
    pub fn success(self) -> MessageType {
        MessageType(self.base() + 1)
    }

    /// Message type of a failed reply (`base + 2`).
    pub fn failure(self) -> MessageType {
        MessageType(self.base() + 2)
    }

    /// Interprets a reply's message type for this operation.
    ///
    /// Returns `None` for anything other than `base + 1` or `base + 2`.
    /// Callers must treat `None` as an error: an unrecognized reply is never
    /// a silent success.
    pub fn classify(self, message_type: MessageType) -> Option<Outcome> {
        if message_type == self.success() {
            Some(Outcome::Success)
        } else if message_type == self.failure() {
            Some(Outcome::Failure)
        } else {
            None
        }
    }

    /// Looks up the operation a message type belongs to, if any.
    ///
    /// Works for request, success and failure codes alike.
    pub fn from_message_type(message_type: MessageType) -> Option<Operation> {
        let code = message_type.code();
        if code % 100 > 2 {
            return None;
        }
        let base = code - code % 100;
        Self::ALL.into_iter().find(|op| op.base() == base)
    }

    /// Upper-case protocol name, for logs.
    pub fn name(self) -> &'static str {
        match self {
            Operation::Login => "LOGIN",
            Operation::Signup => "SIGNUP",
            Operation::CreateTable => "CREATE_TABLE",
            Operation::JoinTable => "JOIN_TABLE",
            Operation::TableList => "TABLE_LIST",
            Operation::UpdateGameState => "UPDATE_GAMESTATE",
            Operation::LeaveTable => "LEAVE_TABLE",
            Operation::Scoreboard => "SCOREBOARD",
            Operation::FriendList => "FRIEND_LIST",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How the server answered a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The reply carried `base + 1`.
    Success,
    /// The reply carried `base + 2`.
    Failure,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalogue_base_codes() {
        let bases: Vec<u16> = Operation::ALL.iter().map(|op| op.base()).collect();
        assert_eq!(bases, vec![100, 200, 300, 400, 500, 600, 700, 800, 900]);
    }

    #[test]
    fn test_success_and_failure_follow_base_arithmetic() {
        for op in Operation::ALL {
            assert_eq!(op.request().code(), op.base());
            assert_eq!(op.success().code(), op.base() + 1);
            assert_eq!(op.failure().code(), op.base() + 2);
        }
    }

    #[test]
    fn test_create_table_classification() {
        let op = Operation::CreateTable;
        assert_eq!(op.classify(MessageType(301)), Some(Outcome::Success));
        assert_eq!(op.classify(MessageType(302)), Some(Outcome::Failure));
        assert_eq!(op.classify(MessageType(300)), None);
        assert_eq!(op.classify(MessageType(303)), None);
        // Another operation's success code is not ours.
        assert_eq!(op.classify(MessageType(401)), None);
    }

    #[test]
    fn test_from_message_type() {
        assert_eq!(
            Operation::from_message_type(MessageType(100)),
            Some(Operation::Login)
        );
        assert_eq!(
            Operation::from_message_type(MessageType(802)),
            Some(Operation::Scoreboard)
        );
        assert_eq!(Operation::from_message_type(MessageType(103)), None);
        assert_eq!(Operation::from_message_type(MessageType(1000)), None);
        assert_eq!(Operation::from_message_type(MessageType(1)), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Operation::UpdateGameState.to_string(), "UPDATE_GAMESTATE");
        assert_eq!(MessageType(501).to_string(), "501");
    }
}
