// Facebook Graph API access: post fetching for the screening pipeline.
//
// `client` wraps reqwest with the Graph base URL; `posts` pulls a bounded
// page of recent post texts and never fails the caller.

pub mod client;
pub mod posts;
