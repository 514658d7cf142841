// src/forecast/definitions/cell_value.rs

/// Classification of a forecast cell string.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellValue {
    /// Intentionally empty; distinct from zero.
    Blank,
    Zero,
    Number(f64),
    /// Non-numeric text. Serialized as blank.
    Invalid,
}

impl CellValue {
    pub fn classify(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return CellValue::Blank;
        }
        match trimmed.parse::<f64>() {
            Ok(n) if !n.is_finite() => CellValue::Invalid,
            Ok(n) if n == 0.0 => CellValue::Zero,
            Ok(n) => CellValue::Number(n),
            Err(_) => CellValue::Invalid,
        }
    }

    /// Non-empty and non-zero.
    pub fn is_filled(self) -> bool {
        matches!(self, CellValue::Number(_))
    }

    pub fn is_invalid(self) -> bool {
        matches!(self, CellValue::Invalid)
    }

    /// Numeric value after coercion; blank and invalid give `None`.
    pub fn as_number(self) -> Option<f64> {
        match self {
            CellValue::Zero => Some(0.0),
            CellValue::Number(n) => Some(n),
            CellValue::Blank | CellValue::Invalid => None,
        }
    }
}
