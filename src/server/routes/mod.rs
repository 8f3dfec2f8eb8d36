mod entries;
mod lookup;

pub use entries::{EntryRequest, MutationResponse, add_entry_handler, remove_entry_handler};
pub use lookup::{LookupRequest, lookup_handler};
