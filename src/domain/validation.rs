use std::fmt;

/// 検証対象のフィールド。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Author,
    Price,
    Year,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Title => "title",
            Field::Author => "author",
            Field::Price => "price",
            Field::Year => "year",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{0} must not be empty")]
    Empty(Field),

    #[error("{field} is not a valid number: '{input}'")]
    NotANumber { field: Field, input: String },

    #[error("{field} must be a positive number, got {input}")]
    NotPositive { field: Field, input: String },
}

impl ValidationError {
    pub fn field(&self) -> Field {
        match self {
            ValidationError::Empty(field) => *field,
            ValidationError::NotANumber { field, .. } => *field,
            ValidationError::NotPositive { field, .. } => *field,
        }
    }
}

/// 数値として解釈でき、有限かつ正であればtrue。
pub fn is_valid_positive_number(text: &str) -> bool {
    parse_price(text).is_ok()
}

/// 価格入力を解釈する。前後の空白は無視。
pub fn parse_price(text: &str) -> Result<f64, ValidationError> {
    let trimmed = text.trim();
    let value: f64 = trimmed
        .parse()
        .ok()
        .filter(|v: &f64| v.is_finite())
        .ok_or_else(|| ValidationError::NotANumber {
            field: Field::Price,
            input: trimmed.to_string(),
        })?;
    check_price(value)
}

/// 年の入力を解釈する。整数のみ受け付ける。
pub fn parse_year(text: &str) -> Result<i32, ValidationError> {
    let trimmed = text.trim();
    let value: i32 = trimmed.parse().map_err(|_| ValidationError::NotANumber {
        field: Field::Year,
        input: trimmed.to_string(),
    })?;
    check_year(value)
}

pub fn check_price(value: f64) -> Result<f64, ValidationError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ValidationError::NotPositive {
            field: Field::Price,
            input: value.to_string(),
        })
    }
}

pub fn check_year(value: i32) -> Result<i32, ValidationError> {
    if value > 0 {
        Ok(value)
    } else {
        Err(ValidationError::NotPositive {
            field: Field::Year,
            input: value.to_string(),
        })
    }
}

/// 必須テキスト。空白のみなら拒否し、それ以外は入力のまま返す。
pub fn require_text(field: Field, text: &str) -> Result<String, ValidationError> {
    if text.trim().is_empty() {
        return Err(ValidationError::Empty(field));
    }
    Ok(text.to_string())
}
