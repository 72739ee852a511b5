pub mod fields;
pub mod order;
pub mod state;
pub mod store;

pub use fields::{ derive_field_key, FieldDescriptor, FieldKind, FieldRegistry };
pub use order::{ FieldOrder, FieldSection, Visibility };
pub use state::Journal;
pub use store::{ EntryStore, JournalStats };
