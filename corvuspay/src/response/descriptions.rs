//! Localized transaction-type descriptions.
//!
//! The gateway reports `transaction_type` as a numeric code between 0 and 18.
//! Each supported locale maps every code to a fixed description and has its own
//! sentinel for codes outside the table.

use serde::Serialize;

/// Supported description locales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Locale {
    /// English.
    English,
    /// Croatian.
    Croatian,
    /// Serbian, Latin script.
    SerbianLatin,
    /// Serbian, Cyrillic script.
    SerbianCyrillic,
}

impl Locale {
    /// All locales, in the order descriptions are reported.
    pub const ALL: [Self; 4] = [Self::English, Self::Croatian, Self::SerbianLatin, Self::SerbianCyrillic];

    /// Description for codes missing from the table.
    #[must_use]
    pub const fn unknown_type(self) -> &'static str {
        match self {
            Self::English => "Unknown transaction type",
            Self::Croatian | Self::SerbianLatin => "Nepoznat tip transakcije",
            Self::SerbianCyrillic => "Непознат тип трансакције",
        }
    }

    const fn table(self) -> &'static [&'static str; 19] {
        match self {
            Self::English => &ENGLISH,
            Self::Croatian => &CROATIAN,
            Self::SerbianLatin => &SERBIAN_LATIN,
            Self::SerbianCyrillic => &SERBIAN_CYRILLIC,
        }
    }

    /// Describes a raw `transaction_type` code.
    ///
    /// Only canonical decimal codes match the table: `"07"` or `"+7"` are unknown.
    ///
    /// ```
    /// use corvuspay::response::descriptions::Locale;
    ///
    /// assert_eq!(Locale::English.describe("0"), "Regular transaction");
    /// assert_eq!(Locale::Croatian.describe("99"), "Nepoznat tip transakcije");
    /// ```
    #[must_use]
    pub fn describe(self, code: &str) -> &'static str {
        canonical_index(code)
            .and_then(|index| self.table().get(index))
            .copied()
            .unwrap_or_else(|| self.unknown_type())
    }
}

/// Descriptions of one transaction type in every locale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionDescriptions {
    /// English.
    pub en: &'static str,
    /// Croatian.
    pub hr: &'static str,
    /// Serbian, Latin script.
    pub sr: &'static str,
    /// Serbian, Cyrillic script.
    pub cyr: &'static str,
}

impl TransactionDescriptions {
    /// Resolves `code` in all four locales.
    #[must_use]
    pub fn for_code(code: &str) -> Self {
        Self {
            en: Locale::English.describe(code),
            hr: Locale::Croatian.describe(code),
            sr: Locale::SerbianLatin.describe(code),
            cyr: Locale::SerbianCyrillic.describe(code),
        }
    }

    /// Returns the description for `locale`.
    #[must_use]
    pub const fn get(&self, locale: Locale) -> &'static str {
        match locale {
            Locale::English => self.en,
            Locale::Croatian => self.hr,
            Locale::SerbianLatin => self.sr,
            Locale::SerbianCyrillic => self.cyr,
        }
    }
}

fn canonical_index(code: &str) -> Option<usize> {
    let canonical = !code.is_empty()
        && code.bytes().all(|b| b.is_ascii_digit())
        && (code == "0" || !code.starts_with('0'));
    if canonical { code.parse().ok() } else { None }
}

static ENGLISH: [&str; 19] = [
    "Regular transaction",
    "Initial subscription transaction",
    "Next subscription",
    "Saving a card for CardStorage",
    "Using a card from CardStorage",
    "Saving a card for Corvus Wallet",
    "Using a card from Corvus Wallet",
    "Saving a card during fast registration",
    "PIS transaction",
    "PIS transaction from Corvus Wallet",
    "paysafecard",
    "Virtual Terminal",
    "POS transaction",
    "QR Code transaction",
    "Mobile Wallet transaction",
    "Crypto transaction",
    "Google Pay transaction",
    "Apple Pay transaction",
    "IPS transaction",
];

static CROATIAN: [&str; 19] = [
    "Redovna transakcija",
    "Početna transakcija pretplate",
    "Sljedeća pretplata",
    "Spremanje kartice za CardStorage",
    "Korištenje kartice iz CardStorage",
    "Spremanje kartice za Corvus Wallet",
    "Korištenje kartice iz Corvus Wallet",
    "Spremanje kartice tijekom brze registracije",
    "PIS transakcija",
    "PIS transakcija iz Corvus Wallet",
    "paysafecard",
    "Virtualni terminal",
    "POS transakcija",
    "QR kod transakcija",
    "Mobilni novčanik transakcija",
    "Kripto transakcija",
    "Google Pay transakcija",
    "Apple Pay transakcija",
    "IPS transakcija",
];

static SERBIAN_LATIN: [&str; 19] = [
    "Redovna transakcija",
    "Početna transakcija pretplate",
    "Sledeća pretplata",
    "Čuvanje kartice za CardStorage",
    "Korišćenje kartice iz CardStorage",
    "Čuvanje kartice za Corvus Wallet",
    "Korišćenje kartice iz Corvus Wallet",
    "Čuvanje kartice tokom brze registracije",
    "PIS transakcija",
    "PIS transakcija iz Corvus Wallet",
    "paysafecard",
    "Virtuelni terminal",
    "POS transakcija",
    "QR kod transakcija",
    "Mobilni novčanik transakcija",
    "Kripto transakcija",
    "Google Pay transakcija",
    "Apple Pay transakcija",
    "IPS transakcija",
];

static SERBIAN_CYRILLIC: [&str; 19] = [
    "Редовна трансакција",
    "Почетна трансакција претплате",
    "Следећа претплата",
    "Чување картице за CardStorage",
    "Коришћење картице из CardStorage",
    "Чување картице за Corvus Wallet",
    "Коришћење картице из Corvus Wallet",
    "Чување картице током брзе регистрације",
    "PIS трансакција",
    "PIS трансакција из Corvus Wallet",
    "paysafecard",
    "Виртуелни терминал",
    "POS трансакција",
    "QR код трансакција",
    "Мобилни новчаник трансакција",
    "Крипто трансакција",
    "Google Pay трансакција",
    "Apple Pay трансакција",
    "IPS трансакција",
];
