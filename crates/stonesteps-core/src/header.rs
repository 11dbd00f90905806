use std::fmt;

/// Keywords owned by the FITS codec. They describe the data array and are
/// regenerated on every write, so a [`Header`] never stores them.
pub const STRUCTURAL_KEYWORDS: &[&str] = &[
    "SIMPLE", "BITPIX", "NAXIS", "NAXIS1", "NAXIS2", "NAXIS3", "EXTEND", "BSCALE", "BZERO", "END",
];

pub fn is_structural(keyword: &str) -> bool {
    STRUCTURAL_KEYWORDS
        .iter()
        .any(|k| k.eq_ignore_ascii_case(keyword))
}

/// Value of a single header card.
#[derive(Clone, Debug, PartialEq)]
pub enum HeaderValue {
    Logical(bool),
    Integer(i64),
    Real(f64),
    Text(String),
}

impl HeaderValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(i) => Some(*i as f64),
            Self::Real(r) => Some(*r),
            Self::Text(s) => s.trim().parse().ok(),
            Self::Logical(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for HeaderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Logical(b) => write!(f, "{}", if *b { "T" } else { "F" }),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Real(r) => write!(f, "{r}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<bool> for HeaderValue {
    fn from(v: bool) -> Self {
        Self::Logical(v)
    }
}

impl From<i64> for HeaderValue {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<f64> for HeaderValue {
    fn from(v: f64) -> Self {
        Self::Real(v)
    }
}

impl From<&str> for HeaderValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for HeaderValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

/// One `KEYWORD = value / comment` record.
#[derive(Clone, Debug, PartialEq)]
pub struct Card {
    pub keyword: String,
    pub value: HeaderValue,
    pub comment: Option<String>,
}

/// Ordered FITS header: valued cards plus free-text HISTORY and COMMENT lines.
///
/// Keywords are stored upper case and looked up case-insensitively. Setting an
/// existing keyword replaces its value in place, so card order survives a
/// read-modify-write cycle.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Header {
    cards: Vec<Card>,
    history: Vec<String>,
    comments: Vec<String>,
}

impl Header {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn comments(&self) -> &[String] {
        &self.comments
    }

    pub fn get(&self, keyword: &str) -> Option<&HeaderValue> {
        self.card(keyword).map(|c| &c.value)
    }

    pub fn card(&self, keyword: &str) -> Option<&Card> {
        self.cards
            .iter()
            .find(|c| c.keyword.eq_ignore_ascii_case(keyword))
    }

    pub fn contains(&self, keyword: &str) -> bool {
        self.card(keyword).is_some()
    }

    pub fn get_f64(&self, keyword: &str) -> Option<f64> {
        self.get(keyword).and_then(HeaderValue::as_f64)
    }

    pub fn get_str(&self, keyword: &str) -> Option<&str> {
        self.get(keyword).and_then(HeaderValue::as_str)
    }

    pub fn set(&mut self, keyword: &str, value: impl Into<HeaderValue>) {
        self.set_with_comment(keyword, value, None::<String>);
    }

    pub fn set_with_comment(
        &mut self,
        keyword: &str,
        value: impl Into<HeaderValue>,
        comment: Option<impl Into<String>>,
    ) {
        let keyword = keyword.to_ascii_uppercase();
        let value = value.into();
        let comment = comment.map(Into::into);
        match self.cards.iter_mut().find(|c| c.keyword == keyword) {
            Some(card) => {
                card.value = value;
                if comment.is_some() {
                    card.comment = comment;
                }
            }
            None => self.cards.push(Card {
                keyword,
                value,
                comment,
            }),
        }
    }

    pub fn push_history(&mut self, line: impl Into<String>) {
        self.history.push(line.into());
    }

    pub fn push_comment(&mut self, line: impl Into<String>) {
        self.comments.push(line.into());
    }
}
