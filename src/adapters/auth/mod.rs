//! Access control adapters.
//!
//! Implementations of the `AccessChecker` port:
//!
//! - `allow_list` - Email and domain allow-lists from configuration

mod allow_list;

pub use allow_list::AllowListAccessChecker;
