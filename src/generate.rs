//! Test payload generation.
//!
//! Produces card numbers that pass Luhn, CPFs with correct check digits and
//! birth dates inside the accepted age range, so whole [`NewCard`]
//! submissions can be generated for demos, load tests and fixtures.
//!
//! # Example
//!
//! ```
//! use card_registry::generate::{cpf_from_base, generate_card_number_deterministic};
//! use card_registry::{is_valid_card_number, is_valid_cpf};
//!
//! // Deterministic generation needs no randomness
//! let number = generate_card_number_deterministic("4", 16);
//! assert!(number.starts_with('4'));
//! assert!(is_valid_card_number(&number));
//!
//! let cpf = cpf_from_base([1, 1, 1, 4, 4, 4, 7, 7, 7]);
//! assert_eq!(cpf, "11144477735");
//! assert!(is_valid_cpf(&cpf));
//! ```
//!
//! # Security Note
//!
//! Generated card numbers are mathematically valid (pass Luhn) but are not
//! connected to real accounts, and generated CPFs do not belong to real
//! people. They should only be used for testing.

use chrono::{Months, NaiveDate};

use crate::birth_date::format_birth_date;
use crate::cpf::check_digits;
use crate::luhn;
use crate::record::NewCard;

#[cfg(feature = "generate")]
use crate::birth_date::MINIMUM_AGE;
#[cfg(feature = "generate")]
use chrono::Days;
#[cfg(feature = "generate")]
use rand::seq::SliceRandom;
#[cfg(feature = "generate")]
use rand::Rng;

/// Issuer prefixes and lengths used for random card numbers.
pub const CARD_PREFIXES: &[(&str, usize)] = &[
    ("4", 16),      // Visa
    ("51", 16),     // Mastercard
    ("55", 16),     // Mastercard
    ("34", 15),     // Amex
    ("37", 15),     // Amex
    ("6011", 16),   // Discover
    ("36", 14),     // Diners Club
    ("509", 16),    // Elo
    ("606282", 16), // Hipercard
];

#[cfg(feature = "generate")]
const FIRST_NAMES: &[&str] = &[
    "Ana", "Bruno", "Camila", "Diego", "Fernanda", "Gabriel", "Helena", "João", "Larissa",
    "Marcos", "Maria", "Rafael", "Sofia", "Thiago",
];

#[cfg(feature = "generate")]
const LAST_NAMES: &[&str] = &[
    "Almeida", "Araújo", "Barbosa", "Carvalho", "Costa", "Ferreira", "Gomes", "Lima",
    "Oliveira", "Pereira", "Ribeiro", "Santos", "Silva", "Souza",
];

/// Oldest age given to generated holders, well inside the accepted range.
#[cfg(feature = "generate")]
const MAX_GENERATED_AGE: u32 = 90;

/// Generates a valid card number deterministically with a custom prefix.
///
/// Fills middle digits with zeros and calculates a valid check digit.
/// Non-digit characters in `prefix` are ignored.
///
/// # Panics
///
/// Panics if the prefix has as many digits as `length` or more.
pub fn generate_card_number_deterministic(prefix: &str, length: usize) -> String {
    let mut digits = prefix_digits(prefix);
    assert!(
        digits.len() < length,
        "Prefix length must be less than total length"
    );

    digits.resize(length - 1, 0);
    finish_card_number(digits)
}

/// Builds a CPF from its nine base digits by appending both check digits.
///
/// Base digits above 9 are reduced modulo 10.
pub fn cpf_from_base(base: [u8; 9]) -> String {
    let base = base.map(|d| d % 10);
    let (first, second) = check_digits(&base);

    base.iter()
        .chain([first, second].iter())
        .map(|&d| (b'0' + d) as char)
        .collect()
}

/// Birth date, as `DD/MM/YYYY`, of someone who turns `age` on `today`.
///
/// # Panics
///
/// Panics if the result falls outside chrono's date range.
pub fn birth_date_for_age(today: NaiveDate, age: u32) -> String {
    format_birth_date(today - Months::new(age * 12))
}

/// A fixed, valid submission for a holder aged 30 on `today`.
///
/// # Example
///
/// ```
/// use card_registry::generate::sample_card;
/// use card_registry::{validate_card, clock::FixedClock};
/// use chrono::NaiveDate;
///
/// let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
/// let card = sample_card(today);
/// assert_eq!(card.birth_date, "15/06/1994");
/// assert!(validate_card(&card, &FixedClock(today)).is_empty());
/// ```
pub fn sample_card(today: NaiveDate) -> NewCard {
    NewCard::new(
        "Maria Silva",
        generate_card_number_deterministic("4", 16),
        birth_date_for_age(today, 30),
        cpf_from_base([1, 1, 1, 4, 4, 4, 7, 7, 7]),
    )
}

/// Generates a random valid card number with the given prefix and length.
///
/// Requires the `generate` feature.
///
/// # Panics
///
/// Panics if the prefix has as many digits as `length` or more.
#[cfg(feature = "generate")]
pub fn generate_card_number(prefix: &str, length: usize) -> String {
    let mut rng = rand::thread_rng();
    generate_card_number_with_rng(prefix, length, &mut rng)
}

/// Generates a valid card number using a provided RNG.
///
/// This is useful for reproducible test generation with seeded RNGs.
#[cfg(feature = "generate")]
pub fn generate_card_number_with_rng<R: Rng + ?Sized>(
    prefix: &str,
    length: usize,
    rng: &mut R,
) -> String {
    let mut digits = prefix_digits(prefix);
    assert!(
        digits.len() < length,
        "Prefix length must be less than total length"
    );

    // Fill with random digits (except last one which will be check digit)
    while digits.len() < length - 1 {
        digits.push(rng.gen_range(0..10));
    }

    finish_card_number(digits)
}

/// Generates a valid CPF that is not a repeated-digit sequence.
#[cfg(feature = "generate")]
pub fn generate_cpf_with_rng<R: Rng + ?Sized>(rng: &mut R) -> String {
    loop {
        let base: [u8; 9] = std::array::from_fn(|_| rng.gen_range(0..10));
        if base.iter().any(|&d| d != base[0]) {
            return cpf_from_base(base);
        }
    }
}

/// Generates a birth date for a holder aged between 18 and 90 on `today`.
#[cfg(feature = "generate")]
pub fn generate_birth_date_with_rng<R: Rng + ?Sized>(today: NaiveDate, rng: &mut R) -> String {
    let years = rng.gen_range(MINIMUM_AGE..MAX_GENERATED_AGE);
    let extra_days = rng.gen_range(0..365);
    format_birth_date(today - Months::new(years * 12) - Days::new(extra_days))
}

/// Generates a complete valid submission.
#[cfg(feature = "generate")]
pub fn generate_card_with_rng<R: Rng + ?Sized>(today: NaiveDate, rng: &mut R) -> NewCard {
    let (prefix, length) = CARD_PREFIXES.choose(rng).copied().unwrap_or(("4", 16));
    let first = FIRST_NAMES.choose(rng).copied().unwrap_or("Maria");
    let last = LAST_NAMES.choose(rng).copied().unwrap_or("Silva");

    NewCard::new(
        format!("{first} {last}"),
        generate_card_number_with_rng(prefix, length, rng),
        generate_birth_date_with_rng(today, rng),
        generate_cpf_with_rng(rng),
    )
}

/// Generates `count` valid submissions using the thread-local RNG.
///
/// Requires the `generate` feature.
#[cfg(feature = "generate")]
pub fn generate_cards(today: NaiveDate, count: usize) -> Vec<NewCard> {
    let mut rng = rand::thread_rng();
    (0..count)
        .map(|_| generate_card_with_rng(today, &mut rng))
        .collect()
}

/// Card generator builder for more complex generation scenarios.
#[derive(Debug, Clone)]
pub struct CardGenerator {
    prefix: String,
    length: usize,
    today: NaiveDate,
}

impl CardGenerator {
    /// Creates a generator producing 16-digit Visa-style numbers, with ages
    /// measured against `today`.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            prefix: "4".to_string(),
            length: 16,
            today,
        }
    }

    /// Sets the card length.
    pub fn length(mut self, length: usize) -> Self {
        self.length = length;
        self
    }

    /// Sets the prefix.
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Generates a card number deterministically.
    pub fn card_number_deterministic(&self) -> String {
        generate_card_number_deterministic(&self.prefix, self.length)
    }

    /// Generates a full submission deterministically.
    pub fn generate_deterministic(&self) -> NewCard {
        let mut card = sample_card(self.today);
        card.card_number = self.card_number_deterministic();
        card
    }

    /// Generates a full submission with randomness.
    #[cfg(feature = "generate")]
    pub fn generate(&self) -> NewCard {
        let mut rng = rand::thread_rng();
        let mut card = generate_card_with_rng(self.today, &mut rng);
        card.card_number = generate_card_number_with_rng(&self.prefix, self.length, &mut rng);
        card
    }

    /// Generates multiple submissions.
    #[cfg(feature = "generate")]
    pub fn generate_many(&self, count: usize) -> Vec<NewCard> {
        (0..count).map(|_| self.generate()).collect()
    }
}

fn prefix_digits(prefix: &str) -> Vec<u8> {
    prefix
        .chars()
        .filter_map(|c| c.to_digit(10).map(|d| d as u8))
        .collect()
}

fn finish_card_number(mut digits: Vec<u8>) -> String {
    let check_digit = luhn::generate_check_digit(&digits);
    digits.push(check_digit);
    digits.iter().map(|&d| (b'0' + d) as char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::cpf::is_valid_cpf;
    use crate::luhn::is_valid_card_number;
    use crate::validate::validate_card;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    #[test]
    fn test_deterministic_card_number() {
        let card = generate_card_number_deterministic("4", 16);
        assert_eq!(card.len(), 16);
        assert!(card.starts_with('4'));
        assert!(is_valid_card_number(&card));
        assert_eq!(card, generate_card_number_deterministic("4", 16));
    }

    #[test]
    fn test_deterministic_all_prefixes() {
        for &(prefix, length) in CARD_PREFIXES {
            let card = generate_card_number_deterministic(prefix, length);
            assert_eq!(card.len(), length, "prefix {prefix}");
            assert!(is_valid_card_number(&card), "prefix {prefix}");
        }
    }

    #[test]
    #[should_panic(expected = "Prefix length")]
    fn test_prefix_too_long() {
        generate_card_number_deterministic("4111", 4);
    }

    #[test]
    fn test_cpf_from_base() {
        assert_eq!(cpf_from_base([5, 2, 9, 9, 8, 2, 2, 4, 7]), "52998224725");
        assert_eq!(cpf_from_base([1, 2, 3, 4, 5, 6, 7, 8, 9]), "12345678909");
    }

    #[test]
    fn test_birth_date_for_age() {
        assert_eq!(birth_date_for_age(today(), 18), "15/06/2006");
        let leap = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(birth_date_for_age(leap, 18), "28/02/2006");
    }

    #[test]
    fn test_sample_card_is_valid() {
        let card = sample_card(today());
        assert!(validate_card(&card, &FixedClock(today())).is_empty());
    }

    #[test]
    fn test_builder_deterministic() {
        let card = CardGenerator::new(today())
            .prefix("34")
            .length(15)
            .card_number_deterministic();
        assert!(card.starts_with("34"));
        assert_eq!(card.len(), 15);
        assert!(is_valid_card_number(&card));
    }

    #[cfg(feature = "generate")]
    #[test]
    fn test_random_cards_are_valid() {
        let clock = FixedClock(today());
        for card in generate_cards(today(), 200) {
            assert!(
                validate_card(&card, &clock).is_empty(),
                "generated invalid card {card:?}"
            );
        }
    }

    #[cfg(feature = "generate")]
    #[test]
    fn test_seeded_generation_is_reproducible() {
        use rand::rngs::StdRng;
        use rand::SeedableRng;

        let a = generate_card_with_rng(today(), &mut StdRng::seed_from_u64(7));
        let b = generate_card_with_rng(today(), &mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
    }

    #[cfg(feature = "generate")]
    #[test]
    fn test_random_cpf() {
        let mut rng = rand::thread_rng();
        for _ in 0..200 {
            assert!(is_valid_cpf(&generate_cpf_with_rng(&mut rng)));
        }
    }

    #[cfg(feature = "generate")]
    #[test]
    fn test_builder_random() {
        let cards = CardGenerator::new(today()).prefix("509").generate_many(10);
        assert_eq!(cards.len(), 10);
        assert!(cards.iter().all(|c| c.card_number.starts_with("509")));
    }
}
