//! # card_registry
//!
//! Validated personal credit card registry. Work in progress.
//!
//! ## Features
//!
//! - Luhn validation of card numbers (13 to 19 digits)
//! - CPF validation with both check digits and repeated-digit rejection
//! - Birth date parsing with an 18 to 120 year age policy
//! - Input masks for card number, CPF and date, safe to run on every keystroke
//! - JSON file record store behind a validating registry
//! - Multiple interfaces: library, CLI, REST API, WASM
//!
//! ## Quick Start
//!
//! ```rust
//! use card_registry::{is_valid_card_number, is_valid_cpf, is_valid_date};
//! use card_registry::clock::FixedClock;
//! use chrono::NaiveDate;
//!
//! assert!(is_valid_card_number("4532 0151 1283 0366"));
//! assert!(!is_valid_card_number("1234567890123"));
//!
//! assert!(is_valid_cpf("111.444.777-35"));
//! assert!(!is_valid_cpf("111.111.111-11"));
//!
//! let today = FixedClock(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap());
//! assert!(is_valid_date("15/06/2006", &today));  // exactly 18
//! assert!(!is_valid_date("16/06/2006", &today)); // one day short
//! assert!(!is_valid_date("31/02/2000", &today)); // no such day
//! ```
//!
//! ## Validating a Submission
//!
//! Every field is checked and every failure reported together:
//!
//! ```rust
//! use card_registry::{validate_card, ErrorKind, Field, NewCard};
//! use card_registry::clock::FixedClock;
//! use chrono::NaiveDate;
//!
//! let today = FixedClock(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap());
//! let card = NewCard::new("Maria Silva", "1234567890123", "25/05/2004", "11111111111");
//!
//! let errors = validate_card(&card, &today);
//! assert_eq!(errors.len(), 2);
//! assert_eq!(errors[0].field(), Field::CardNumber);
//! assert_eq!(errors[1].kind(), ErrorKind::Checksum);
//! ```
//!
//! ## Input Masks
//!
//! ```rust
//! use card_registry::{format_card_number, format_cpf, format_date};
//!
//! assert_eq!(format_card_number("1234567890123456"), "1234 5678 9012 3456");
//! assert_eq!(format_cpf("12345678909"), "123.456.789-09");
//! assert_eq!(format_date("25052004"), "25/05/2004");
//! ```
//!
//! ## Storing Cards
//!
//! ```rust
//! use card_registry::registry::{CardRegistry, RegistryError};
//! use card_registry::store::MemoryStore;
//! use card_registry::{CardUpdate, NewCard};
//!
//! let registry = CardRegistry::new(MemoryStore::new());
//! let card = registry
//!     .create(&NewCard::new("Maria Silva", "4532015112830366", "25/05/1990", "111.444.777-35"))
//!     .unwrap();
//!
//! // Only supplied fields are re-validated
//! let update = CardUpdate { holder_name: Some("Maria Souza".into()), ..Default::default() };
//! assert_eq!(registry.update(card.id(), &update).unwrap().holder_name(), "Maria Souza");
//!
//! registry.delete(card.id()).unwrap();
//! assert!(matches!(registry.get(card.id()), Err(RegistryError::NotFound(_))));
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `generate` | Random test payload generation |
//! | `cli` | Command-line tool |
//! | `server` | REST API with Swagger UI |
//! | `wasm` | WebAssembly support |
//! | `parallel` | Rayon-based batch re-validation |
//!
//! ## Security
//!
//! - Stored records wipe their fields from memory when dropped
//! - `Debug` output masks card numbers, CPFs and birth dates
//! - Log lines carry record ids and masked card numbers only
//! - No unsafe code (`#![deny(unsafe_code)]`)

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod batch;
pub mod birth_date;
pub mod clock;
pub mod cpf;
pub mod error;
pub mod format;
pub mod generate;
pub mod holder;
pub mod luhn;
pub mod mask;
pub mod record;
pub mod registry;
pub mod store;
pub mod validate;

#[cfg(feature = "server")]
pub mod api;

#[cfg(feature = "wasm")]
mod wasm;

// Re-export main types at crate root
pub use batch::{AuditReport, BatchValidator};
pub use birth_date::is_valid_date;
pub use clock::{Clock, FixedClock, SystemClock};
pub use cpf::is_valid_cpf;
pub use error::{ErrorKind, Field, StoreError, ValidationError};
pub use format::{format_card_number, format_cpf, format_date};
pub use holder::is_valid_holder_name;
pub use luhn::is_valid_card_number;
pub use record::{CardRecord, CardUpdate, NewCard};
pub use registry::{CardRegistry, RegistryError};
pub use validate::{
    is_valid_card, validate_card, validate_new_card, validate_update, ValidCard, ValidUpdate,
};
