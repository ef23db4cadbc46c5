use serde::{Deserialize, Serialize};

use super::qid::{Qid, QidType};

/// One entry of a `Rreaddir` reply.
///
/// `offset` is the cookie the client sends back to continue the listing: the
/// index of the next entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dirent {
    pub qid: Qid,
    pub offset: u64,
    pub typ: QidType,
    pub name: String,
}
