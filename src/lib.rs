pub mod core;
pub mod export;
pub mod journal;
pub mod persistence;
pub mod theme;

pub use crate::core::{ Entry, FieldValue, JournalError };
pub use crate::journal::{
    FieldDescriptor,
    FieldKind,
    FieldOrder,
    FieldRegistry,
    FieldSection,
    Journal,
    JournalStats,
    Visibility,
};
pub use crate::persistence::{ JournalData, JournalStore };
pub use crate::theme::ThemeSettings;
