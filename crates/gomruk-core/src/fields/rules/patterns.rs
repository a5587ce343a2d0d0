//! Regex patterns for company and identity field extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Company name. Group 1 marks a personal "GIVEN NAME" or "Father's name" label, which vetoes the match.
    pub static ref COMPANY_NAME_LABELED: Regex = Regex::new(
        r"(?i)((?:GIVEN|Father'?s?)\s+)?\b(?:Company\s+Name|Name|Company)\s*:\s*([^\n]+)"
    ).unwrap();

    pub static ref COMPANY_NAME_LEGAL_SUFFIX: Regex = Regex::new(
        r"\b([A-Z][A-Z&.,\- ]*(?:LOGISTICS|CORPORATION|CORP|LLC|INC|LTD))\b"
    ).unwrap();

    // Tokens that end a company name captured from a label.
    pub static ref COMPANY_NAME_TERMINATORS: Regex = Regex::new(
        r"(?i)\b(?:SWIFT|Account|Address|Tax\s*ID|Bank|IBAN|Phone|Tel|E-?mail)\b|VÖEN"
    ).unwrap();

    // Company address
    pub static ref COMPANY_ADDRESS_COUNTRY: Regex = Regex::new(
        r"(?i:COMPANY\s+Address|Address)\s*:\s*([^\n]+?)\s*,?\s*\b(?i:USA|AMERICA|AMERİKA|UNITED\s+STATES)\b"
    ).unwrap();

    pub static ref COMPANY_ADDRESS_LABELED: Regex = Regex::new(
        r"(?i)COMPANY\s+Address\s*:\s*([^\n]+)"
    ).unwrap();

    pub static ref COMPANY_ADDRESS_TERMINATORS: Regex = Regex::new(
        r"(?i)\b(?:Tax\s*ID|TIN|SWIFT|Account|Bank|IBAN|Phone|Tel|E-?mail)\b|VÖEN"
    ).unwrap();

    pub static ref STREET_ADDRESS: Regex = Regex::new(
        r"(?i)(\d+\s+[A-Z\s,]+(?:ST|STREET|AVE|AVENUE|ROAD|RD)[^,\n]+,\s*[A-Z\s]+,\s*[A-Z]{2}\s+\d{5})"
    ).unwrap();

    // Tax ID (US EIN or Azerbaijani VÖEN)
    pub static ref TAX_ID_LABELED: Regex = Regex::new(
        r"(?i:\bTax\s*ID|VÖEN|\bVOEN|\bTIN)\b\s*:?\s*(\d{2}-\d{7}|\d{10})\b"
    ).unwrap();

    // VIN: 17 characters, no I/O/Q
    pub static ref VIN: Regex = Regex::new(
        r"\b([A-HJ-NPR-Z0-9]{17})\b"
    ).unwrap();

    // Personal identification (FIN) code
    pub static ref FIN_LABELED: Regex = Regex::new(
        r"(?i:\bFİN|\bFIN|\bPIN)\b(?i:\s*kod[ua]?)?\s*:?\s*([A-Z0-9]{7})\b"
    ).unwrap();

    pub static ref FIN_STANDALONE: Regex = Regex::new(
        r"\b([A-Z0-9]{7})\b"
    ).unwrap();

    // Passport
    pub static ref PASSPORT_LABELED: Regex = Regex::new(
        r"(?i:\bPass?port)(?i:\s+(?:No|Nömrəsi|number))?\.?\s*[:№#]?\s*([A-Z]{2}\d{7})\b"
    ).unwrap();

    pub static ref PASSPORT_STANDALONE: Regex = Regex::new(
        r"(?i)\b(AA\d{7}|AZE\d{7})\b"
    ).unwrap();

    // Phone
    pub static ref PHONE_LABELED: Regex = Regex::new(
        r"(?i:\b(?:Tel|Phone|Mob(?:ile)?|Telefon))\.?\s*:?\s*(\+?\d[\d ()\-]{5,18}\d)"
    ).unwrap();

    pub static ref PHONE_AZ: Regex = Regex::new(
        r"((?:\+994|\b994)[\s-]?\(?\d{2}\)?[\s-]?\d{3}[\s-]?\d{2}[\s-]?\d{2})\b"
    ).unwrap();

    // Email
    pub static ref EMAIL: Regex = Regex::new(
        r"\b([A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,})\b"
    ).unwrap();

    // ID card block: surname, given name and patronymic in that order.
    pub static ref IDENTITY_BLOCK: Regex = Regex::new(
        r"(?i:SOYADI\s*/\s*SURNAME)[:\s]+([A-ZƏĞİÖŞÜÇ]+)\b(?s:.{0,120}?)(?i:ADI\s*/\s*GIVEN\s+NAME)[:\s]+([A-ZƏĞİÖŞÜÇ]+)\b(?s:.{0,120}?)(?i:ATASININ\s+ADI|PATRONYMIC)[^:\n]*[:\s]+([A-ZƏĞİÖŞÜÇ]+(?:[ \t]+(?:OĞLU|OGLU|QIZI))?)"
    ).unwrap();

    pub static ref PATRONYMIC_SUFFIX: Regex = Regex::new(
        r"\s+(?:OĞLU|OGLU|QIZI)$"
    ).unwrap();

    // Individual identity labels. Group 1 of the name pattern vetoes company labels.
    pub static ref GIVEN_NAME_LABELED: Regex = Regex::new(
        r"(Company\s+|COMPANY\s+)?\b(?:Adı|Ad|Name|İsim|Buyer)[\s:]+([A-ZƏĞİÖŞÜÇ][a-zəğıöşüç]+)"
    ).unwrap();

    pub static ref SURNAME_LABELED: Regex = Regex::new(
        r"\b(?:Soyadı|Soyad|Surname|Familiya)[\s:]+([A-ZƏĞİÖŞÜÇ][a-zəğıöşüç]+)"
    ).unwrap();

    pub static ref FATHER_NAME_LABELED: Regex = Regex::new(
        r"\b(?:Atasının adı|Ata adı|Father's name|Father|Atası)[\s:]+([A-ZƏĞİÖŞÜÇ][a-zəğıöşüç]+)"
    ).unwrap();

    // Personal address (Azerbaijani postcode first)
    pub static ref PERSONAL_ADDRESS: Regex = Regex::new(
        r"(?i:Ünvan|Address)[,:\s]+(AZ\d{4}[^\n]+)"
    ).unwrap();
}
