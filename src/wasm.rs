//! WebAssembly bindings for the input masks and validators.
//!
//! The formatters are meant to run on every keystroke in the browser, with
//! the same rules the server applies on submit.
//!
//! # Usage from JavaScript
//!
//! ```javascript
//! import init, { formatCardNumber, formatCPF, formatDate, isValidCPF } from 'card_registry';
//!
//! await init();
//!
//! input.value = formatCardNumber(input.value);   // "4532 0151 1283 0366"
//! cpfInput.value = formatCPF(cpfInput.value);   // "111.444.777-35"
//! dateInput.value = formatDate(dateInput.value); // "25/05/2004"
//!
//! if (!isValidCPF(cpfInput.value)) {
//!     showError("CPF inválido");
//! }
//! ```

use chrono::NaiveDate;
use wasm_bindgen::prelude::*;

use crate::birth_date::parse_calendar_date;
use crate::clock::{Clock, FixedClock};
use crate::record::NewCard;

/// Reads today's date from the JavaScript `Date` object.
struct BrowserClock;

impl Clock for BrowserClock {
    fn today(&self) -> NaiveDate {
        let now = js_sys::Date::new_0();
        NaiveDate::from_ymd_opt(
            now.get_full_year() as i32,
            now.get_month() + 1,
            now.get_date(),
        )
        .unwrap_or_default()
    }
}

/// Result of validating a whole submission, returned to JavaScript.
#[wasm_bindgen]
pub struct CardValidation {
    errors: Vec<String>,
}

#[wasm_bindgen]
impl CardValidation {
    /// Whether every field passed.
    #[wasm_bindgen(getter)]
    pub fn valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Error messages in field order.
    #[wasm_bindgen(getter)]
    pub fn errors(&self) -> js_sys::Array {
        self.errors.iter().map(|e| JsValue::from_str(e)).collect()
    }
}

/// Masks a card number in groups of four.
///
/// # Example
/// ```javascript
/// formatCardNumber("45320151");  // "4532 0151"
/// ```
#[wasm_bindgen(js_name = formatCardNumber)]
pub fn format_card_number(input: &str) -> String {
    crate::format::format_card_number(input)
}

/// Masks a CPF as `XXX.XXX.XXX-XX`.
#[wasm_bindgen(js_name = formatCPF)]
pub fn format_cpf(input: &str) -> String {
    crate::format::format_cpf(input)
}

/// Masks a date as `DD/MM/YYYY`.
#[wasm_bindgen(js_name = formatDate)]
pub fn format_date(input: &str) -> String {
    crate::format::format_date(input)
}

/// Checks a card number: 13 to 19 digits passing Luhn, spaces allowed.
#[wasm_bindgen(js_name = isValidCardNumber)]
pub fn is_valid_card_number(input: &str) -> bool {
    crate::luhn::is_valid_card_number(input)
}

/// Checks a CPF's length and both check digits.
#[wasm_bindgen(js_name = isValidCPF)]
pub fn is_valid_cpf(input: &str) -> bool {
    crate::cpf::is_valid_cpf(input)
}

/// Checks a `DD/MM/YYYY` birth date for an adult holder.
///
/// `today` is the reference date as `DD/MM/YYYY`; when omitted the
/// browser's current date is used. An unparseable `today` fails the check.
///
/// # Example
/// ```javascript
/// isValidDate("25/05/2004", "15/06/2024");  // true
/// isValidDate("31/02/2000");                // false
/// ```
#[wasm_bindgen(js_name = isValidDate)]
pub fn is_valid_date(input: &str, today: Option<String>) -> bool {
    match today {
        Some(today) => match parse_calendar_date(&today) {
            Ok(date) => crate::birth_date::is_valid_date(input, &FixedClock(date)),
            Err(_) => false,
        },
        None => crate::birth_date::is_valid_date(input, &BrowserClock),
    }
}

/// Validates all four fields of a submission against today's date.
///
/// # Example
/// ```javascript
/// const result = validateCard("Maria Silva", "4532 0151 1283 0366", "25/05/2004", "111.444.777-35");
/// if (!result.valid) {
///     result.errors.forEach(e => console.log(e));
/// }
/// ```
#[wasm_bindgen(js_name = validateCard)]
pub fn validate_card(holder_name: &str, card_number: &str, birth_date: &str, cpf: &str) -> CardValidation {
    let card = NewCard::new(holder_name, card_number, birth_date, cpf);
    let errors = crate::validate::validate_card(&card, &BrowserClock)
        .iter()
        .map(ToString::to_string)
        .collect();

    CardValidation { errors }
}
