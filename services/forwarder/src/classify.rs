use eventpipe_protocol::header_names;
use rdkafka::message::{Message, OwnedMessage};

/// Which entity variant a running forwarder process is (SPEC_FULL.md
/// §4.5). Differs only in the classification predicate applied to each
/// message before dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Entity {
    All,
    Errors,
    Transactions,
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Entity::All => "all",
            Entity::Errors => "errors",
            Entity::Transactions => "transactions",
        };
        write!(f, "{s}")
    }
}

impl Entity {
    /// True when this variant should dispatch the message, read purely
    /// off the `transaction_forwarder` header — never from the decoded
    /// body, since classification happens before decode cost is paid.
    pub fn accepts(&self, msg: &OwnedMessage) -> bool {
        match self {
            Entity::All => true,
            Entity::Errors => !is_transaction_header(msg),
            Entity::Transactions => is_transaction_header(msg),
        }
    }
}

fn is_transaction_header(msg: &OwnedMessage) -> bool {
    let Some(headers) = msg.headers() else { return false };
    for i in 0..headers.count() {
        let header = headers.get(i);
        if header.key == header_names::TRANSACTION_FORWARDER {
            return header.value == Some(b"1".as_slice());
        }
    }
    false
}
